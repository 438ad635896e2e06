//! Add-files command handler.

use super::{output_format, show_progress, write_bom, write_options};
use crate::config::AppConfig;
use crate::edit::{add_files, FileOutcome};
use crate::error::BomError;
use crate::formats::{BomFormat, ConvertFormat};
use crate::model::Bom;
use crate::pipeline::{exit_codes, load_bom, OutputTarget};
use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

/// Arguments for the `add-files` subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct AddFilesArgs {
    /// Input BOM filename
    #[arg(long, conflicts_with = "no_input")]
    pub input_file: Option<PathBuf>,

    /// There is no input BOM; start from an empty one
    #[arg(long)]
    pub no_input: bool,

    /// Output BOM filename, will write to stdout if no value provided
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Input file format
    #[arg(long, value_enum, default_value = "autodetect")]
    pub input_format: BomFormat,

    /// Output file format (detected from the output file name when omitted)
    #[arg(long, value_enum)]
    pub output_format: Option<ConvertFormat>,

    /// Base path for file names (defaults to the current working directory)
    #[arg(long)]
    pub base_path: Option<PathBuf>,

    /// Files to add, relative to the base path (defaults to every file under it)
    pub files: Vec<PathBuf>,
}

/// Every regular file under `dir`, sorted, recursively.
fn files_under(dir: &Path) -> Result<Vec<PathBuf>, BomError> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = std::fs::read_dir(&current).map_err(|e| BomError::io(&current, e))?;
        for entry in entries {
            let path = entry.map_err(|e| BomError::io(&current, e))?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.is_file() {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Run the add-files command, returning the desired exit code.
pub fn run_add_files(args: &AddFilesArgs, config: &AppConfig) -> Result<i32> {
    let format = output_format(args.output_format, args.output_file.as_deref(), config)?;
    let target = OutputTarget::from_option(args.output_file.clone());
    let progress = show_progress(&target, config);

    let mut bom = if args.no_input {
        Bom::new()
    } else {
        load_bom(args.input_file.as_deref(), args.input_format)?
    };

    let base = match &args.base_path {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    if progress {
        println!("Processing base path {}", base.display());
    }

    let files = if args.files.is_empty() {
        files_under(&base)?
    } else {
        args.files.clone()
    };
    let report = add_files(&mut bom, &base, &files)?;

    if progress {
        for outcome in &report.outcomes {
            match outcome {
                FileOutcome::Added { name } => println!("Adding file {name}"),
                FileOutcome::Skipped { name } => {
                    println!("Skipping file {name} as it is already in the BOM");
                }
            }
        }
        println!("Writing output file...");
    }
    tracing::info!(
        "{} files added, {} already present",
        report.added(),
        report.skipped()
    );

    write_bom(&bom, format, &write_options(config, None, None), &target)?;
    Ok(exit_codes::OK)
}
