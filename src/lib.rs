//! **Convert, merge, diff and validate Software Bills of Materials.**
//!
//! `bom-tools` reads CycloneDX documents (JSON, XML, protocol buffers, CSV)
//! and SPDX documents (tag-value, JSON) into one in-memory model, and
//! writes them back out in any of those formats, at any CycloneDX schema
//! version from 1.0 to 1.5. It powers the `bom-tools` command-line tool and
//! can be used directly as a library.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: the [`Bom`](model::Bom) document model. Every document
//!   is held at the newest schema version, [`SpecVersion::CANONICAL`](model::SpecVersion::CANONICAL).
//! - **[`formats`]**: the format registry and file-name based detection.
//! - **[`codec`]**: [`deserialize`](codec::deserialize) and
//!   [`serialize`](codec::serialize), the only way bytes become a `Bom` and
//!   back.
//! - **[`downgrade`]**: the per-version steps that project a canonical
//!   document onto an older schema, reporting what they drop.
//! - **[`merge`]**: flat and hierarchical merging of several BOMs.
//! - **[`spdx`]**: the SPDX tag-value and JSON projections.
//! - **[`diff`]** and **[`analyze`]**: component version comparisons.
//! - **[`validation`]**: structural validation against a schema version.
//! - **[`edit`]**: bom-ref renaming and adding files as components.
//! - **[`reports`]**: text, JSON and Markdown rendering of results.
//!
//! ## Getting Started: Converting a BOM
//!
//! ```
//! use bom_tools::codec::{deserialize, serialize};
//! use bom_tools::formats::{BomFormat, ConvertFormat};
//! use bom_tools::model::SpecVersion;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let json = br#"{
//!         "bomFormat": "CycloneDX",
//!         "specVersion": "1.4",
//!         "version": 1,
//!         "components": [{"type": "library", "name": "serde", "version": "1.0.200"}]
//!     }"#;
//!     let bom = deserialize(json, BomFormat::Json)?;
//!
//!     let xml = serialize(&bom, ConvertFormat::Xml, Some(SpecVersion::V1_1))?;
//!     for warning in &xml.warnings {
//!         eprintln!("dropped: {warning}");
//!     }
//!     assert!(String::from_utf8(xml.bytes)?.contains("http://cyclonedx.org/schema/bom/1.1"));
//!     Ok(())
//! }
//! ```
//!
//! ## Command-Line Interface (CLI)
//!
//! This documentation is for the library crate. The command-line tool's
//! handlers live in [`cli`]; run `bom-tools --help` for usage.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::struct_excessive_bools,
    // Variable names like `old`/`new` are clear in context
    clippy::similar_names
)]

pub mod analyze;
pub mod cli;
pub mod codec;
pub mod config;
pub mod diff;
pub mod downgrade;
pub mod edit;
pub mod error;
pub mod formats;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod reports;
pub mod spdx;
pub mod validation;

/// Name this tool records in `metadata.tools` of documents it modifies.
pub const TOOL_NAME: &str = "bom-tools";

// Re-export main types for convenience
pub use codec::{deserialize, serialize, Serialized};
pub use config::{AppConfig, ConfigError, Validatable};
pub use error::{BomError, ErrorContext, Result};
pub use formats::{BomFormat, ConvertFormat, ValidateFormat};
pub use model::{Bom, Component, SpecVersion};
pub use validation::{validate, ValidationResult};
