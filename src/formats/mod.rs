//! Format registry.
//!
//! Three closed format sets are in play, one per context:
//!
//! - [`BomFormat`]: formats the I/O adapter can read.
//! - [`ConvertFormat`]: formats `convert` and friends can write.
//! - [`ValidateFormat`]: formats the structural validator accepts.
//!
//! They overlap but are not the same set, so crossing from one to another
//! always goes through an explicit mapping that can answer "not
//! representable" (`None`). Never compare or cast them by position.

mod detection;

pub use detection::{detect_format, detect_output_format};

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Formats a BOM can be read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BomFormat {
    /// Detect from the file name
    #[default]
    Autodetect,
    /// CycloneDX JSON
    Json,
    /// CycloneDX XML
    Xml,
    /// CycloneDX protocol buffers
    Protobuf,
    /// CycloneDX CSV component list
    Csv,
    /// SPDX tag-value
    #[value(name = "spdxtag")]
    SpdxTag,
    /// SPDX JSON
    #[value(name = "spdxjson")]
    SpdxJson,
}

/// Formats a BOM can be written as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConvertFormat {
    /// Detect from the output file name
    #[default]
    Autodetect,
    /// CycloneDX JSON
    Json,
    /// CycloneDX XML
    Xml,
    /// CycloneDX protocol buffers
    Protobuf,
    /// CycloneDX CSV component list
    Csv,
    /// SPDX tag-value
    #[value(name = "spdxtag")]
    SpdxTag,
    /// SPDX JSON
    #[value(name = "spdxjson")]
    SpdxJson,
    /// Human-readable Markdown summary
    Markdown,
}

/// Formats the validator accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ValidateFormat {
    /// Detect from the file name
    #[default]
    Autodetect,
    /// CycloneDX JSON
    Json,
    /// CycloneDX XML
    Xml,
}

impl BomFormat {
    pub const ALL: [Self; 7] = [
        Self::Autodetect,
        Self::Json,
        Self::Xml,
        Self::Protobuf,
        Self::Csv,
        Self::SpdxTag,
        Self::SpdxJson,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Autodetect => "autodetect",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Protobuf => "protobuf",
            Self::Csv => "csv",
            Self::SpdxTag => "spdxtag",
            Self::SpdxJson => "spdxjson",
        }
    }

    /// The same format as a write target.
    #[must_use]
    pub const fn as_convert_format(self) -> ConvertFormat {
        match self {
            Self::Autodetect => ConvertFormat::Autodetect,
            Self::Json => ConvertFormat::Json,
            Self::Xml => ConvertFormat::Xml,
            Self::Protobuf => ConvertFormat::Protobuf,
            Self::Csv => ConvertFormat::Csv,
            Self::SpdxTag => ConvertFormat::SpdxTag,
            Self::SpdxJson => ConvertFormat::SpdxJson,
        }
    }

    /// The same format for the validator, if it validates it.
    #[must_use]
    pub const fn as_validate_format(self) -> Option<ValidateFormat> {
        match self {
            Self::Autodetect => Some(ValidateFormat::Autodetect),
            Self::Json => Some(ValidateFormat::Json),
            Self::Xml => Some(ValidateFormat::Xml),
            Self::Protobuf | Self::Csv | Self::SpdxTag | Self::SpdxJson => None,
        }
    }
}

impl ConvertFormat {
    pub const ALL: [Self; 8] = [
        Self::Autodetect,
        Self::Json,
        Self::Xml,
        Self::Protobuf,
        Self::Csv,
        Self::SpdxTag,
        Self::SpdxJson,
        Self::Markdown,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Autodetect => "autodetect",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Protobuf => "protobuf",
            Self::Csv => "csv",
            Self::SpdxTag => "spdxtag",
            Self::SpdxJson => "spdxjson",
            Self::Markdown => "markdown",
        }
    }

    /// The same format as a read source. Markdown is write-only.
    #[must_use]
    pub const fn as_bom_format(self) -> Option<BomFormat> {
        match self {
            Self::Autodetect => Some(BomFormat::Autodetect),
            Self::Json => Some(BomFormat::Json),
            Self::Xml => Some(BomFormat::Xml),
            Self::Protobuf => Some(BomFormat::Protobuf),
            Self::Csv => Some(BomFormat::Csv),
            Self::SpdxTag => Some(BomFormat::SpdxTag),
            Self::SpdxJson => Some(BomFormat::SpdxJson),
            Self::Markdown => None,
        }
    }

    /// Whether the output is a CycloneDX document that carries a schema version.
    #[must_use]
    pub const fn is_cyclonedx(self) -> bool {
        matches!(self, Self::Json | Self::Xml | Self::Protobuf)
    }
}

impl ValidateFormat {
    pub const ALL: [Self; 3] = [Self::Autodetect, Self::Json, Self::Xml];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Autodetect => "autodetect",
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }

    #[must_use]
    pub const fn as_bom_format(self) -> BomFormat {
        match self {
            Self::Autodetect => BomFormat::Autodetect,
            Self::Json => BomFormat::Json,
            Self::Xml => BomFormat::Xml,
        }
    }
}

impl fmt::Display for BomFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ConvertFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ValidateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bom_to_convert_is_total_and_injective() {
        let mapped: Vec<_> = BomFormat::ALL
            .iter()
            .map(|f| f.as_convert_format())
            .collect();
        for (i, a) in mapped.iter().enumerate() {
            assert_eq!(a.as_str(), BomFormat::ALL[i].as_str());
            for b in &mapped[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_convert_to_bom_roundtrips_or_is_unrepresentable() {
        for f in ConvertFormat::ALL {
            match f.as_bom_format() {
                Some(bom) => assert_eq!(bom.as_convert_format(), f),
                None => assert_eq!(f, ConvertFormat::Markdown),
            }
        }
    }

    #[test]
    fn test_validate_mapping_is_explicit() {
        for f in ValidateFormat::ALL {
            assert_eq!(f.as_bom_format().as_validate_format(), Some(f));
        }
        for f in BomFormat::ALL {
            if let Some(v) = f.as_validate_format() {
                assert_eq!(v.as_str(), f.as_str());
            }
        }
        assert_eq!(BomFormat::Csv.as_validate_format(), None);
        assert_eq!(BomFormat::Protobuf.as_validate_format(), None);
    }

    #[test]
    fn test_names_match_clap_values() {
        for f in ConvertFormat::ALL {
            let value = f.to_possible_value().unwrap();
            assert_eq!(value.get_name(), f.as_str());
        }
        for f in BomFormat::ALL {
            let value = f.to_possible_value().unwrap();
            assert_eq!(value.get_name(), f.as_str());
        }
    }
}
