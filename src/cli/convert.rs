//! Convert command handler.
//!
//! Implements the `convert` subcommand: read one BOM, write it in another
//! format and/or an older schema version.

use super::{output_format, show_progress, write_bom, write_options};
use crate::config::AppConfig;
use crate::formats::{BomFormat, ConvertFormat};
use crate::model::{SpdxVersion, SpecVersion};
use crate::pipeline::{exit_codes, load_bom, OutputTarget};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the `convert` subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ConvertArgs {
    /// Input BOM filename, will read from stdin if no value provided
    #[arg(long)]
    pub input_file: Option<PathBuf>,

    /// Output BOM filename, will write to stdout if no value provided
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Input file format
    #[arg(long, value_enum, default_value = "autodetect")]
    pub input_format: BomFormat,

    /// Output file format (detected from the output file name when omitted)
    #[arg(long, value_enum)]
    pub output_format: Option<ConvertFormat>,

    /// CycloneDX schema version to write
    #[arg(long, value_enum)]
    pub output_version: Option<SpecVersion>,

    /// SPDX version for tag-value output
    #[arg(long, value_enum)]
    pub spdx_version: Option<SpdxVersion>,
}

/// Run the convert command, returning the desired exit code.
///
/// Both formats are resolved before the input is read, so a bad
/// combination fails without touching any file.
pub fn run_convert(args: &ConvertArgs, config: &AppConfig) -> Result<i32> {
    let format = output_format(args.output_format, args.output_file.as_deref(), config)?;
    let options = write_options(config, args.output_version, args.spdx_version);
    let target = OutputTarget::from_option(args.output_file.clone());

    let bom = load_bom(args.input_file.as_deref(), args.input_format)?;

    if show_progress(&target, config) {
        println!("Writing output file...");
    }
    write_bom(&bom, format, &options, &target)?;
    Ok(exit_codes::OK)
}
