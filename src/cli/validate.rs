//! Validate command handler.
//!
//! Implements the `validate` subcommand: structural validation of a
//! CycloneDX JSON or XML document, against a given schema version or the
//! newest one it satisfies.

use crate::config::AppConfig;
use crate::error::BomError;
use crate::formats::{BomFormat, ValidateFormat};
use crate::model::SpecVersion;
use crate::pipeline::{exit_codes, read_input, resolve_input_format};
use crate::validation::{validate, ValidationOutcome};
use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

/// Arguments for the `validate` subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Input BOM filename, will read from stdin if no value provided
    #[arg(long)]
    pub input_file: Option<PathBuf>,

    /// Input file format
    #[arg(long, value_enum, default_value = "autodetect")]
    pub input_format: ValidateFormat,

    /// Schema version to validate against (newest passing version when omitted)
    #[arg(long, value_enum)]
    pub input_version: Option<SpecVersion>,

    /// Fail on validation errors (return a non-zero exit code)
    #[arg(long)]
    pub fail_on_errors: bool,
}

/// Resolve `Autodetect` and reject formats the validator cannot check.
fn resolve_format(path: Option<&Path>, format: ValidateFormat) -> Result<ValidateFormat, BomError> {
    if format != ValidateFormat::Autodetect {
        return Ok(format);
    }
    let detected = resolve_input_format(path, BomFormat::Autodetect)?;
    match detected.as_validate_format() {
        Some(format) if format != ValidateFormat::Autodetect => Ok(format),
        _ => Err(BomError::parameter(format!(
            "Validation of {detected} input is not supported, only json and xml"
        ))),
    }
}

fn schema_label(format: ValidateFormat) -> &'static str {
    match format {
        ValidateFormat::Xml => "XML",
        _ => "JSON",
    }
}

fn print_outcome(outcome: &ValidationOutcome) {
    if let Some(version) = outcome.version {
        println!(
            "Validating against {} schema {version}...",
            schema_label(outcome.format)
        );
    }
    for message in &outcome.result.messages {
        println!("{message}");
    }
    if outcome.result.valid {
        println!("BOM validated successfully.");
    } else {
        println!("BOM is not valid.");
    }
}

/// Run the validate command, returning the desired exit code.
///
/// An invalid document is only a failure with `--fail-on-errors` (or
/// `validate.fail_on_errors` in the config file).
pub fn run_validate(args: &ValidateArgs, config: &AppConfig) -> Result<i32> {
    let format = resolve_format(args.input_file.as_deref(), args.input_format)?;
    let bytes = read_input(args.input_file.as_deref())?;

    let outcome = validate(&bytes, format, args.input_version)?;
    tracing::debug!(
        "Validated as {format} {:?}: valid={}",
        outcome.version,
        outcome.result.valid
    );
    print_outcome(&outcome);

    let fail_on_errors = args.fail_on_errors || config.validate.fail_on_errors;
    if !outcome.result.valid && fail_on_errors {
        return Ok(exit_codes::OK_FAIL);
    }
    Ok(exit_codes::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_format() {
        assert_eq!(
            resolve_format(Some(Path::new("bom.xml")), ValidateFormat::Autodetect).unwrap(),
            ValidateFormat::Xml
        );
        assert_eq!(
            resolve_format(None, ValidateFormat::Json).unwrap(),
            ValidateFormat::Json
        );

        let err = resolve_format(Some(Path::new("bom.cdx.bin")), ValidateFormat::Autodetect)
            .unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::PARAMETER_VALIDATION_ERROR);

        let err = resolve_format(Some(Path::new("bom.txt")), ValidateFormat::Autodetect)
            .unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::PARAMETER_VALIDATION_ERROR);
    }
}
