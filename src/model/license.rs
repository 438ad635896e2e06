//! License records and license choices.

use super::component::AttachedText;
use serde::{Deserialize, Serialize};

/// How a license is identified: by SPDX id or by free-text name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LicenseIdentity {
    Id(String),
    Name(String),
}

/// A single license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLicense", into = "RawLicense")]
pub struct License {
    pub identity: LicenseIdentity,
    pub text: Option<AttachedText>,
    pub url: Option<String>,
}

impl License {
    /// License known by its SPDX identifier.
    pub fn spdx(id: impl Into<String>) -> Self {
        Self {
            identity: LicenseIdentity::Id(id.into()),
            text: None,
            url: None,
        }
    }

    /// License without an SPDX identifier.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            identity: LicenseIdentity::Name(name.into()),
            text: None,
            url: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match &self.identity {
            LicenseIdentity::Id(id) => Some(id),
            LicenseIdentity::Name(_) => None,
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match &self.identity {
            LicenseIdentity::Name(name) => Some(name),
            LicenseIdentity::Id(_) => None,
        }
    }

    /// Id or name, whichever identifies this license.
    #[must_use]
    pub fn label(&self) -> &str {
        match &self.identity {
            LicenseIdentity::Id(s) | LicenseIdentity::Name(s) => s,
        }
    }
}

/// Wire shape shared by JSON and the other codecs: exactly one of id/name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct RawLicense {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<AttachedText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl TryFrom<RawLicense> for License {
    type Error = String;

    fn try_from(raw: RawLicense) -> Result<Self, Self::Error> {
        let identity = match (raw.id, raw.name) {
            (Some(id), None) => LicenseIdentity::Id(id),
            (None, Some(name)) => LicenseIdentity::Name(name),
            (Some(_), Some(_)) => return Err("license has both an id and a name".to_string()),
            (None, None) => return Err("license has neither an id nor a name".to_string()),
        };
        Ok(Self {
            identity,
            text: raw.text,
            url: raw.url,
        })
    }
}

impl From<License> for RawLicense {
    fn from(license: License) -> Self {
        let (id, name) = match license.identity {
            LicenseIdentity::Id(id) => (Some(id), None),
            LicenseIdentity::Name(name) => (None, Some(name)),
        };
        Self {
            id,
            name,
            text: license.text,
            url: license.url,
        }
    }
}

/// A license entry: a license record or an SPDX expression, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseChoice {
    #[serde(rename = "license")]
    License(License),
    #[serde(rename = "expression")]
    Expression(String),
}

impl LicenseChoice {
    #[must_use]
    pub fn license(&self) -> Option<&License> {
        match self {
            Self::License(l) => Some(l),
            Self::Expression(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shapes() {
        let choices = vec![
            LicenseChoice::License(License::spdx("MIT")),
            LicenseChoice::Expression("Apache-2.0 OR MIT".to_string()),
            LicenseChoice::License(License::named("Custom")),
        ];
        let value = serde_json::to_value(&choices).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"license": {"id": "MIT"}},
                {"expression": "Apache-2.0 OR MIT"},
                {"license": {"name": "Custom"}}
            ])
        );

        let back: Vec<LicenseChoice> = serde_json::from_value(value).unwrap();
        assert_eq!(back, choices);
    }

    #[test]
    fn test_rejects_ambiguous_license() {
        let both = serde_json::json!({"id": "MIT", "name": "MIT License"});
        assert!(serde_json::from_value::<License>(both).is_err());
        let neither = serde_json::json!({"url": "https://example.com"});
        assert!(serde_json::from_value::<License>(neither).is_err());
    }

    #[test]
    fn test_label() {
        assert_eq!(License::spdx("MIT").label(), "MIT");
        assert_eq!(License::named("Foo").label(), "Foo");
        assert_eq!(License::named("Foo").id(), None);
    }
}
