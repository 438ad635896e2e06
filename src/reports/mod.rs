//! Rendering of command results.
//!
//! - [`DiffReporter`] and [`AnalysisReporter`] render `diff` and `analyze`
//!   results as text or JSON.
//! - [`to_markdown`] renders a whole BOM as a Markdown summary.
//!
//! # Security
//!
//! The `escape` module provides utilities for safe output generation.
//! All user-controllable data (component names, versions, etc.) should
//! be escaped before embedding in SPDX text blocks or Markdown.

mod analysis;
mod diff;
pub mod escape;
mod markdown;
mod types;

pub use analysis::AnalysisReporter;
pub use diff::DiffReporter;
pub use markdown::to_markdown;
pub use types::OutputFormat;

use std::io::Write;
use thiserror::Error;

/// Errors that can occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Format error: {0}")]
    FormatError(#[from] std::fmt::Error),
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String, ReportError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Render the report in `format`.
    fn generate(&self, format: OutputFormat) -> Result<String, ReportError>;

    /// Write the report to a writer
    fn write_report(&self, format: OutputFormat, writer: &mut dyn Write) -> Result<(), ReportError> {
        let report = self.generate(format)?;
        writer.write_all(report.as_bytes())?;
        Ok(())
    }
}
