//! Configuration validation.

use super::types::{AppConfig, BehaviorConfig, MergeConfig, OutputConfig};
use crate::codec::supported_versions;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.output.validate());
        errors.extend(self.merge.validate());
        errors.extend(self.behavior.validate());
        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let (Some(format), Some(version)) = (self.default_format, self.spec_version) {
            if let Some((oldest, newest)) = supported_versions(format) {
                if version < oldest || version > newest {
                    errors.push(ConfigError {
                        field: "output.spec_version".to_string(),
                        message: format!(
                            "{format} output supports versions {oldest} to {newest}, got {version}"
                        ),
                    });
                }
            }
        }
        errors
    }
}

impl Validatable for MergeConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.hierarchical && (self.name.is_none() || self.version.is_none()) {
            errors.push(ConfigError {
                field: "merge".to_string(),
                message: "hierarchical merging needs both name and version".to_string(),
            });
        }
        errors
    }
}

impl Validatable for BehaviorConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.quiet && self.verbose {
            errors.push(ConfigError {
                field: "behavior".to_string(),
                message: "'quiet' and 'verbose' are both set; 'verbose' takes precedence"
                    .to_string(),
            });
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::ConvertFormat;
    use crate::model::SpecVersion;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().is_valid());
    }

    #[test]
    fn test_version_outside_format_range() {
        let config = OutputConfig {
            default_format: Some(ConvertFormat::Protobuf),
            spec_version: Some(SpecVersion::V1_2),
            ..OutputConfig::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "output.spec_version");

        let config = OutputConfig {
            default_format: Some(ConvertFormat::Csv),
            spec_version: Some(SpecVersion::V1_0),
            ..OutputConfig::default()
        };
        assert!(config.is_valid());
    }

    #[test]
    fn test_hierarchical_without_subject() {
        let config = MergeConfig {
            hierarchical: true,
            name: Some("x".to_string()),
            ..MergeConfig::default()
        };
        assert!(!config.is_valid());
    }

    #[test]
    fn test_quiet_and_verbose() {
        let config = BehaviorConfig {
            quiet: true,
            verbose: true,
        };
        assert_eq!(config.validate()[0].field, "behavior");
    }
}
