//! CycloneDX specification versions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A CycloneDX specification version.
///
/// Variants are declared oldest first so the derived `Ord` follows the
/// feature set: every version is a superset of the ones before it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
pub enum SpecVersion {
    #[serde(rename = "1.0")]
    #[value(name = "1.0")]
    V1_0,
    #[serde(rename = "1.1")]
    #[value(name = "1.1")]
    V1_1,
    #[serde(rename = "1.2")]
    #[value(name = "1.2")]
    V1_2,
    #[serde(rename = "1.3")]
    #[value(name = "1.3")]
    V1_3,
    #[serde(rename = "1.4")]
    #[value(name = "1.4")]
    V1_4,
    #[serde(rename = "1.5")]
    #[value(name = "1.5")]
    #[default]
    V1_5,
}

impl SpecVersion {
    /// The version of the in-memory model. Every deserialized document is
    /// lifted to this version, and serialization walks down from it.
    pub const CANONICAL: Self = Self::V1_5;

    /// All versions, oldest first.
    pub const ALL: [Self; 6] = [
        Self::V1_0,
        Self::V1_1,
        Self::V1_2,
        Self::V1_3,
        Self::V1_4,
        Self::V1_5,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1_0 => "1.0",
            Self::V1_1 => "1.1",
            Self::V1_2 => "1.2",
            Self::V1_3 => "1.3",
            Self::V1_4 => "1.4",
            Self::V1_5 => "1.5",
        }
    }

    /// The next older version, if any.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::V1_0 => None,
            Self::V1_1 => Some(Self::V1_0),
            Self::V1_2 => Some(Self::V1_1),
            Self::V1_3 => Some(Self::V1_2),
            Self::V1_4 => Some(Self::V1_3),
            Self::V1_5 => Some(Self::V1_4),
        }
    }

    /// The next newer version, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::V1_0 => Some(Self::V1_1),
            Self::V1_1 => Some(Self::V1_2),
            Self::V1_2 => Some(Self::V1_3),
            Self::V1_3 => Some(Self::V1_4),
            Self::V1_4 => Some(Self::V1_5),
            Self::V1_5 => None,
        }
    }

    /// XML namespace of the schema for this version.
    #[must_use]
    pub fn xml_namespace(self) -> String {
        format!("http://cyclonedx.org/schema/bom/{}", self.as_str())
    }

    /// Recover the version from an XML namespace URI.
    #[must_use]
    pub fn from_xml_namespace(namespace: &str) -> Option<Self> {
        namespace
            .trim()
            .trim_end_matches('/')
            .strip_prefix("http://cyclonedx.org/schema/bom/")
            .and_then(|v| v.parse().ok())
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s.trim())
            .ok_or_else(|| format!("unknown CycloneDX specification version '{s}'"))
    }
}

/// Output versions of the SPDX projections.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
    clap::ValueEnum,
)]
pub enum SpdxVersion {
    #[serde(rename = "2.1")]
    #[value(name = "2.1")]
    V2_1,
    #[serde(rename = "2.2")]
    #[value(name = "2.2")]
    #[default]
    V2_2,
}

impl SpdxVersion {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V2_1 => "SPDX-2.1",
            Self::V2_2 => "SPDX-2.2",
        }
    }
}

impl fmt::Display for SpdxVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
