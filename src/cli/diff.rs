//! Diff command handler.
//!
//! Implements the `diff` subcommand for comparing two BOMs.

use crate::config::AppConfig;
use crate::diff::diff;
use crate::formats::BomFormat;
use crate::pipeline::{exit_codes, load_bom};
use crate::reports::{DiffReporter, OutputFormat, ReportGenerator};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the `diff` subcommand
#[derive(Args, Debug, Clone)]
pub struct DiffArgs {
    /// From BOM filename
    pub from_file: PathBuf,

    /// To BOM filename
    pub to_file: PathBuf,

    /// From file format
    #[arg(long, value_enum, default_value = "autodetect")]
    pub from_format: BomFormat,

    /// To file format
    #[arg(long, value_enum, default_value = "autodetect")]
    pub to_format: BomFormat,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,

    /// Report component versions that have been added, removed or modified
    #[arg(long)]
    pub component_versions: bool,
}

/// Run the diff command. The report goes to stdout.
pub fn run_diff(args: &DiffArgs, config: &AppConfig) -> Result<i32> {
    let from = load_bom(Some(&args.from_file), args.from_format)?;
    let to = load_bom(Some(&args.to_file), args.to_format)?;

    if !args.component_versions {
        tracing::warn!("No comparison requested, pass --component-versions");
    }
    let result = diff(&from, &to, args.component_versions);

    DiffReporter::new(&result)
        .pretty(config.output.pretty)
        .write_report(args.output_format, &mut std::io::stdout().lock())?;
    Ok(exit_codes::OK)
}
