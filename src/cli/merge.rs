//! Merge command handler.

use super::{output_format, show_progress, write_bom, write_options};
use crate::config::AppConfig;
use crate::error::BomError;
use crate::formats::{BomFormat, ConvertFormat};
use crate::merge::{load_inputs, merge, MergeEvent, MergeOptions};
use crate::model::SpecVersion;
use crate::pipeline::{exit_codes, OutputTarget};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the `merge` subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct MergeArgs {
    /// Input BOM filenames
    #[arg(long, num_args = 1.., required = true)]
    pub input_files: Vec<PathBuf>,

    /// Output BOM filename, will write to stdout if no value provided
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Input file format, applied to every input
    #[arg(long, value_enum, default_value = "autodetect")]
    pub input_format: BomFormat,

    /// Output file format (detected from the output file name when omitted)
    #[arg(long, value_enum)]
    pub output_format: Option<ConvertFormat>,

    /// CycloneDX schema version to write
    #[arg(long, value_enum)]
    pub output_version: Option<SpecVersion>,

    /// Perform a hierarchical merge
    #[arg(long)]
    pub hierarchical: bool,

    /// Group of the software the merged BOM describes
    #[arg(long)]
    pub group: Option<String>,

    /// Name of the software the merged BOM describes (required for hierarchical merging)
    #[arg(long)]
    pub name: Option<String>,

    /// Version of the software the merged BOM describes (required for hierarchical merging)
    #[arg(long)]
    pub version: Option<String>,
}

impl MergeArgs {
    /// Flags over the `merge` section of the config file.
    fn merge_options(&self, config: &AppConfig) -> MergeOptions {
        MergeOptions {
            hierarchical: self.hierarchical || config.merge.hierarchical,
            group: self.group.clone().or_else(|| config.merge.group.clone()),
            name: self.name.clone().or_else(|| config.merge.name.clone()),
            version: self.version.clone().or_else(|| config.merge.version.clone()),
        }
    }
}

fn print_event(event: &MergeEvent) {
    match event {
        MergeEvent::InputLoaded { path, components } => {
            println!("Processing input file {}", path.display());
            println!("    Contains {components} components");
        }
        MergeEvent::Writing { total } => {
            println!("Writing output file...");
            println!("    Total {total} components");
        }
    }
}

/// Run the merge command, returning the desired exit code.
///
/// Options and the output format are checked before any input is read;
/// every input is read before anything is merged.
pub fn run_merge(args: &MergeArgs, config: &AppConfig) -> Result<i32> {
    let options = args.merge_options(config);
    options.validate().map_err(BomError::from)?;

    let format = output_format(args.output_format, args.output_file.as_deref(), config)?;
    let write = write_options(config, args.output_version, None);
    let target = OutputTarget::from_option(args.output_file.clone());
    let progress = show_progress(&target, config);

    let boms = load_inputs(&args.input_files, args.input_format, |event| {
        if progress {
            print_event(&event);
        }
    })?;

    let outcome = merge(&boms, &options).map_err(BomError::from)?;
    if progress {
        print_event(&outcome.writing_event());
    }
    write_bom(&outcome.bom, format, &write, &target)?;
    Ok(exit_codes::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let mut config = AppConfig::default();
        config.merge.name = Some("from-config".to_string());
        config.merge.version = Some("1".to_string());

        let args = MergeArgs {
            name: Some("from-flag".to_string()),
            ..MergeArgs::default()
        };
        let options = args.merge_options(&config);
        assert_eq!(options.name.as_deref(), Some("from-flag"));
        assert_eq!(options.version.as_deref(), Some("1"));
        assert!(!options.hierarchical);
    }

    #[test]
    fn test_hierarchical_without_subject_fails_before_io() {
        let args = MergeArgs {
            input_files: vec![PathBuf::from("/nonexistent/a.json")],
            hierarchical: true,
            name: Some("Thing".to_string()),
            ..MergeArgs::default()
        };
        let err = run_merge(&args, &AppConfig::default()).unwrap_err();
        assert_eq!(
            super::super::exit_code_for(&err),
            exit_codes::PARAMETER_VALIDATION_ERROR
        );
        assert!(err.to_string().contains("Name and version must be specified"));
    }
}
