//! Input loading.
//!
//! Resolves the input format, reads the bytes (a file or standard input)
//! and hands them to the I/O adapter.

use crate::codec;
use crate::error::{BomError, ErrorContext, Result};
use crate::formats::{detect_format, detect_output_format, BomFormat, ConvertFormat};
use crate::model::Bom;
use std::io::Read;
use std::path::Path;

/// Resolve `Autodetect` from the file name.
///
/// Standard input has no name, so it needs an explicit format.
pub fn resolve_input_format(path: Option<&Path>, format: BomFormat) -> Result<BomFormat> {
    if format != BomFormat::Autodetect {
        return Ok(format);
    }
    let Some(path) = path else {
        return Err(BomError::format_resolution(
            "Unable to auto-detect input format when reading from stdin, please specify a value for --input-format",
        ));
    };
    match detect_format(path) {
        BomFormat::Autodetect => Err(BomError::format_resolution(format!(
            "Unable to auto-detect input format of {}, please specify a value for --input-format",
            path.display()
        ))),
        detected => Ok(detected),
    }
}

/// Resolve `Autodetect` from the output file name.
pub fn resolve_output_format(path: Option<&Path>, format: ConvertFormat) -> Result<ConvertFormat> {
    if format != ConvertFormat::Autodetect {
        return Ok(format);
    }
    match detect_output_format(path) {
        ConvertFormat::Autodetect => Err(BomError::format_resolution(match path {
            Some(path) => format!(
                "Unable to auto-detect output format of {}, please specify a value for --output-format",
                path.display()
            ),
            None => "Unable to auto-detect output format when writing to stdout, please specify a value for --output-format"
                .to_string(),
        })),
        detected => Ok(detected),
    }
}

/// Read a whole file, or standard input when `path` is `None`.
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path).map_err(|e| BomError::io(path, e)),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .context("reading standard input")?;
            Ok(buf)
        }
    }
}

/// Read and decode one BOM.
pub fn load_bom(path: Option<&Path>, format: BomFormat) -> Result<Bom> {
    let format = resolve_input_format(path, format)?;
    let bytes = read_input(path)?;
    let bom = codec::deserialize(&bytes, format).with_context(|| match path {
        Some(path) => format!("reading {}", path.display()),
        None => "reading standard input".to_string(),
    })?;
    tracing::info!(
        "Loaded {} ({format}, {} components)",
        path.map_or_else(|| "stdin".to_string(), |p| p.display().to_string()),
        bom.components.len()
    );
    Ok(bom)
}
