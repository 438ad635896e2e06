//! Configuration for bom-tools.
//!
//! Settings come from an optional YAML file, discovered in the usual places,
//! with command-line flags layered on top.
//!
//! ```yaml
//! output:
//!   default_format: json
//!   spec_version: "1.4"
//! merge:
//!   hierarchical: true
//!   name: platform
//!   version: "2.0"
//! validate:
//!   fail_on_errors: true
//! ```
//!
//! Place it at `.bom-tools.yaml` in the project root or under
//! `~/.config/bom-tools/`.

pub mod file;
mod types;
mod validation;

pub use types::{AppConfig, BehaviorConfig, MergeConfig, OutputConfig, ValidateConfig};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    ConfigFileError,
};

/// JSON Schema for the configuration file, for editor completion.
pub fn generate_json_schema() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lists_sections() {
        let schema = generate_json_schema().unwrap();
        for section in ["output", "merge", "validate", "behavior"] {
            assert!(schema.contains(section), "missing {section}");
        }
    }
}
