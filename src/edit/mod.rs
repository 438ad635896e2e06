//! In-place edits of a loaded BOM.

mod add_files;
mod rename;

pub use add_files::{add_files, AddFilesReport, FileOutcome};
pub use rename::{rename_bom_ref, RenameReport};

use crate::model::{Bom, Tool};
use chrono::Utc;

/// Stamp an edited document: fresh timestamp, and this tool listed among
/// the metadata tools.
pub(crate) fn touch_metadata(bom: &mut Bom) {
    let metadata = bom.metadata_mut();
    metadata.timestamp = Some(Utc::now());
    let this = Tool::this_tool();
    if !metadata
        .tools
        .iter()
        .any(|t| t.name == this.name && t.version == this.version)
    {
        metadata.tools.push(this);
    }
}
