//! Configuration file loading and discovery.

use super::types::AppConfig;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".bom-tools.yaml",
    ".bom-tools.yml",
    "bom-tools.yaml",
    "bom-tools.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/bom-tools/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    let cwd = std::env::current_dir().ok();
    if let Some(path) = cwd.as_deref().and_then(find_config_in_dir) {
        return Some(path);
    }

    if let Some(path) = cwd.as_deref().and_then(find_git_root).and_then(|root| find_config_in_dir(&root)) {
        return Some(path);
    }

    if let Some(path) = dirs::config_dir().and_then(|dir| find_config_in_dir(&dir.join("bom-tools"))) {
        return Some(path);
    }

    dirs::home_dir().and_then(|home| find_config_in_dir(&home))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up from `start`.
fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigFileError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err)
    }
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl AppConfig {
    /// Merge another config into this one, with `other` taking precedence.
    ///
    /// Options override when set, booleans override when true.
    pub fn merge(&mut self, other: &Self) {
        if other.output.default_format.is_some() {
            self.output.default_format = other.output.default_format;
        }
        if other.output.spec_version.is_some() {
            self.output.spec_version = other.output.spec_version;
        }
        if other.output.spdx_version != crate::model::SpdxVersion::default() {
            self.output.spdx_version = other.output.spdx_version;
        }
        if !other.output.pretty {
            self.output.pretty = false;
        }

        if other.merge.hierarchical {
            self.merge.hierarchical = true;
        }
        if other.merge.group.is_some() {
            self.merge.group.clone_from(&other.merge.group);
        }
        if other.merge.name.is_some() {
            self.merge.name.clone_from(&other.merge.name);
        }
        if other.merge.version.is_some() {
            self.merge.version.clone_from(&other.merge.version);
        }

        if other.validate.fail_on_errors {
            self.validate.fail_on_errors = true;
        }

        if other.behavior.quiet {
            self.behavior.quiet = true;
        }
        if other.behavior.verbose {
            self.behavior.verbose = true;
        }
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// A commented example config with every option.
#[must_use]
pub fn generate_example_config() -> String {
    r#"# bom-tools configuration
#
# Place this file at:
#   - .bom-tools.yaml in your project root
#   - ~/.config/bom-tools/bom-tools.yaml for global config
#
# Command-line flags always override file settings.

output:
  # Format when the output file name does not decide it:
  # json, xml, protobuf, csv, spdxtag, spdxjson, markdown
  # default_format: json
  # CycloneDX schema version to write: 1.0 to 1.5
  # spec_version: "1.5"
  # SPDX version for tag-value output: 2.1 or 2.2
  spdx_version: "2.2"
  # Pretty-print JSON reports (diff, analyze)
  pretty: true

merge:
  # Nest each input under a new subject instead of concatenating
  hierarchical: false
  # Subject of the merged BOM (name and version are needed when hierarchical)
  # group: org.example
  # name: platform
  # version: "1.0.0"

validate:
  # Exit with code 1 when the BOM is not valid
  fail_on_errors: false

behavior:
  quiet: false
  verbose: false
"#
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::ConvertFormat;
    use crate::model::SpecVersion;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_dir() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(".bom-tools.yaml");
        std::fs::write(&config_path, "validate:\n  fail_on_errors: true\n").unwrap();

        let found = find_config_in_dir(tmp.path());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_dir_not_found() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(find_config_in_dir(tmp.path()), None);
    }

    #[test]
    fn test_find_git_root() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join(".git")).unwrap();
        let nested = tmp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_git_root(&nested), Some(tmp.path().to_path_buf()));
    }

    #[test]
    fn test_load_config_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.yaml");
        let yaml = r#"
output:
  default_format: spdxjson
  spec_version: "1.3"
merge:
  hierarchical: true
  name: platform
"#;
        std::fs::write(&config_path, yaml).unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.output.default_format, Some(ConvertFormat::SpdxJson));
        assert_eq!(config.output.spec_version, Some(SpecVersion::V1_3));
        assert!(config.output.pretty);
        assert!(config.merge.hierarchical);
        assert_eq!(config.merge.name.as_deref(), Some("platform"));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config_file(Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(ConfigFileError::NotFound(_))));
    }

    #[test]
    fn test_broken_file_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("broken.yaml");
        std::fs::write(&config_path, "output: [not, a, map]\n").unwrap();
        let (config, loaded_from) = load_or_default(Some(&config_path));
        assert_eq!(config, AppConfig::default());
        assert_eq!(loaded_from, None);
    }

    #[test]
    fn test_config_merge() {
        let mut base = AppConfig::default();
        base.merge.name = Some("file-name".to_string());
        let mut overrides = AppConfig::default();
        overrides.merge.version = Some("2".to_string());
        overrides.validate.fail_on_errors = true;

        base.merge(&overrides);

        assert_eq!(base.merge.name.as_deref(), Some("file-name"));
        assert_eq!(base.merge.version.as_deref(), Some("2"));
        assert!(base.validate.fail_on_errors);
    }

    #[test]
    fn test_example_config_parses() {
        let config: AppConfig = serde_yaml::from_str(&generate_example_config()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_discover_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("custom-config.yaml");
        std::fs::write(&config_path, "behavior:\n  quiet: true\n").unwrap();

        let discovered = discover_config_file(Some(&config_path));
        assert_eq!(discovered, Some(config_path));
    }
}
