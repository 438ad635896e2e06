//! Configuration types.

use crate::formats::ConvertFormat;
use crate::model::{SpdxVersion, SpecVersion};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Everything a config file can set. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Output defaults for commands that write a BOM or report
    pub output: OutputConfig,
    /// Defaults for `merge`
    pub merge: MergeConfig,
    /// Defaults for `validate`
    pub validate: ValidateConfig,
    /// Logging behavior
    pub behavior: BehaviorConfig,
}

impl AppConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Sections
// ============================================================================

/// Output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format when neither `--output-format` nor the output file name
    /// decides it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<ConvertFormat>,
    /// CycloneDX schema version to write (newest when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_version: Option<SpecVersion>,
    /// SPDX version for tag-value output
    pub spdx_version: SpdxVersion,
    /// Pretty-print JSON reports
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_format: None,
            spec_version: None,
            spdx_version: SpdxVersion::default(),
            pretty: true,
        }
    }
}

/// Merge defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MergeConfig {
    /// Merge hierarchically instead of flat
    pub hierarchical: bool,
    /// Group of the merged subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Name of the merged subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Version of the merged subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Validation defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ValidateConfig {
    /// Exit with a failure code when the BOM is not valid
    pub fail_on_errors: bool,
}

/// Logging behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Only log errors
    pub quiet: bool,
    /// Log debug detail
    pub verbose: bool,
}
