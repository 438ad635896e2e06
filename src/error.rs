//! Unified error types for bom-tools.
//!
//! Every variant maps onto one of the process exit codes in
//! [`crate::pipeline::exit_codes`], so the command layer can report any
//! failure with a message and the right status without inspecting strings.

use crate::pipeline::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for bom-tools operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BomError {
    /// Input or output format could not be resolved
    #[error("{message}")]
    FormatResolution { message: String },

    /// Format recognized but not handled for this operation
    #[error("Unsupported format: {format}{}", version_suffix(.version))]
    UnsupportedFormat {
        format: String,
        version: Option<String>,
    },

    /// Errors while decoding a document
    #[error("Failed to parse BOM: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseErrorKind,
    },

    /// Errors while encoding a document
    #[error("Failed to write {format}: {message}")]
    Serialize { format: String, message: String },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid parameter combination
    #[error("{0}")]
    Parameter(String),
}

fn version_suffix(version: &Option<String>) -> String {
    version
        .as_ref()
        .map(|v| format!(" (version {v})"))
        .unwrap_or_default()
}

/// Specific parse error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Invalid XML structure: {0}")]
    InvalidXml(String),

    #[error("Invalid protobuf message: {0}")]
    InvalidProtobuf(String),

    #[error("Invalid CSV: {0}")]
    InvalidCsv(String),

    #[error("Invalid SPDX document: {0}")]
    InvalidSpdx(String),

    #[error("Unsupported specification version: {version} (supported: {supported})")]
    UnsupportedVersion { version: String, supported: String },

    #[error("Invalid field value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Convenient Result type for bom-tools operations
pub type Result<T> = std::result::Result<T, BomError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl BomError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseErrorKind) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: Some(path.into()),
            message: source.to_string(),
            source,
        }
    }

    pub fn unsupported(format: impl Into<String>, version: Option<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
            version,
        }
    }

    pub fn format_resolution(message: impl Into<String>) -> Self {
        Self::FormatResolution {
            message: message.into(),
        }
    }

    pub fn serialize(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialize {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn parameter(message: impl Into<String>) -> Self {
        Self::Parameter(message.into())
    }

    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::FormatResolution { .. } | Self::Parameter(_) => {
                exit_codes::PARAMETER_VALIDATION_ERROR
            }
            Self::UnsupportedFormat { .. } => exit_codes::UNSUPPORTED_FORMAT,
            Self::Parse { .. } | Self::Serialize { .. } | Self::Io { .. } => exit_codes::IO_ERROR,
        }
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for BomError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for BomError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(
            "JSON deserialization",
            ParseErrorKind::InvalidJson(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings chain outermost first, so a failure deep inside a codec
/// reads like `loading a.json: JSON deserialization: ...`.
///
/// ```
/// use bom_tools::error::{BomError, ErrorContext, ParseErrorKind, Result};
///
/// fn decode() -> Result<()> {
///     Err(BomError::parse("component", ParseErrorKind::InvalidJson("eof".into())))
/// }
///
/// let err = decode().context("loading bom.json").unwrap_err();
/// assert!(err.to_string().contains("loading bom.json: component"));
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<BomError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: BomError, new_ctx: &str) -> BomError {
    match err {
        BomError::Parse {
            context: existing,
            source,
        } => BomError::Parse {
            context: chain_context(new_ctx, &existing),
            source,
        },
        BomError::Io {
            path,
            message,
            source,
        } => BomError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        BomError::Serialize { format, message } => BomError::Serialize {
            format,
            message: chain_context(new_ctx, &message),
        },
        BomError::FormatResolution { message } => BomError::FormatResolution {
            message: chain_context(new_ctx, &message),
        },
        BomError::Parameter(msg) => BomError::Parameter(chain_context(new_ctx, &msg)),
        // The user-facing text of this variant is fixed
        unsupported @ BomError::UnsupportedFormat { .. } => unsupported,
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}
