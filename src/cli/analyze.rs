//! Analyze command handler.

use crate::analyze::analyze;
use crate::config::AppConfig;
use crate::formats::BomFormat;
use crate::pipeline::{exit_codes, load_bom};
use crate::reports::{AnalysisReporter, OutputFormat, ReportGenerator};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the `analyze` subcommand
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Input BOM filename, will read from stdin if no value provided
    #[arg(long)]
    pub input_file: Option<PathBuf>,

    /// Input file format
    #[arg(long, value_enum, default_value = "autodetect")]
    pub input_format: BomFormat,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,

    /// Report components that have multiple versions in use
    #[arg(long)]
    pub multiple_component_versions: bool,
}

/// Run the analyze command. The report goes to stdout.
pub fn run_analyze(args: &AnalyzeArgs, config: &AppConfig) -> Result<i32> {
    let bom = load_bom(args.input_file.as_deref(), args.input_format)?;
    let result = analyze(&bom, args.multiple_component_versions);

    AnalysisReporter::new(&bom, &result)
        .pretty(config.output.pretty)
        .write_report(args.output_format, &mut std::io::stdout().lock())?;
    Ok(exit_codes::OK)
}
