//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler takes its parsed arguments plus the effective [`AppConfig`]
//! and returns the process exit code. Errors carry a [`BomError`] where one
//! applies; [`exit_code_for`] maps them.

mod add_files;
mod analyze;
mod convert;
mod diff;
mod merge;
mod rename;
mod validate;

pub use add_files::{run_add_files, AddFilesArgs};
pub use analyze::{run_analyze, AnalyzeArgs};
pub use convert::{run_convert, ConvertArgs};
pub use diff::{run_diff, DiffArgs};
pub use merge::{run_merge, MergeArgs};
pub use rename::{run_rename_entity, RenameEntityArgs};
pub use validate::{run_validate, ValidateArgs};

use crate::codec::{self, WriteOptions};
use crate::config::AppConfig;
use crate::error::{BomError, Result};
use crate::formats::{detect_output_format, ConvertFormat};
use crate::model::{Bom, SpdxVersion, SpecVersion};
use crate::pipeline::{exit_codes, resolve_output_format, write_output, OutputTarget};
use std::path::Path;

/// Exit code for an error that reached the command boundary.
///
/// Errors that are not a [`BomError`] anywhere in their chain are I/O
/// failures of the command itself.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<BomError>())
        .map_or(exit_codes::IO_ERROR, BomError::exit_code)
}

/// Output format from the flag, the file name, then the config default.
pub(crate) fn output_format(
    flag: Option<ConvertFormat>,
    path: Option<&Path>,
    config: &AppConfig,
) -> Result<ConvertFormat> {
    if let Some(format) = flag {
        return resolve_output_format(path, format);
    }
    match (detect_output_format(path), config.output.default_format) {
        (ConvertFormat::Autodetect, Some(default)) => {
            tracing::debug!("Using configured output format {default}");
            Ok(default)
        }
        (detected, _) => resolve_output_format(path, detected),
    }
}

/// Writer settings from flags, falling back to the config file.
pub(crate) fn write_options(
    config: &AppConfig,
    spec_version: Option<SpecVersion>,
    spdx_version: Option<SpdxVersion>,
) -> WriteOptions {
    WriteOptions {
        spec_version: spec_version.or(config.output.spec_version),
        spdx_version: spdx_version.unwrap_or(config.output.spdx_version),
        ..WriteOptions::default()
    }
}

/// Serialize `bom` and write it out. What the encoding dropped is logged.
pub(crate) fn write_bom(
    bom: &Bom,
    format: ConvertFormat,
    options: &WriteOptions,
    target: &OutputTarget,
) -> Result<()> {
    let serialized = codec::serialize_with(bom, format, options)?;
    for warning in &serialized.warnings {
        tracing::warn!("{warning}");
    }
    write_output(&serialized.bytes, target)
}

/// Progress lines go to stdout, so they are only shown when the BOM
/// itself is not written there.
pub(crate) fn show_progress(target: &OutputTarget, config: &AppConfig) -> bool {
    !target.is_stdout() && !config.behavior.quiet
}
