//! SPDX 2.2 JSON.

use super::{
    into_bom, package_spdx_id, project, project_package, SpdxDocument, SpdxRelationship,
    TagValueOptions, DOCUMENT_SPDX_ID,
};
use crate::error::{BomError, ParseErrorKind, Result};
use crate::model::{Bom, Dependency, SpdxVersion};
use std::collections::{HashMap, HashSet};

const SUBJECT_SPDX_ID: &str = "SPDXRef-RootPackage";

fn push_edges(
    node: &Dependency,
    ids: &HashMap<&str, String>,
    seen: &mut HashSet<(String, String)>,
    out: &mut Vec<SpdxRelationship>,
) {
    for child in &node.dependencies {
        match (ids.get(node.reference.as_str()), ids.get(child.reference.as_str())) {
            (Some(from), Some(to)) => {
                if seen.insert((from.clone(), to.clone())) {
                    out.push(SpdxRelationship {
                        spdx_element_id: from.clone(),
                        relationship_type: "DEPENDS_ON".to_string(),
                        related_spdx_element: to.clone(),
                    });
                }
            }
            _ => tracing::debug!(
                "Dropping dependency {} -> {}: not a package in the SPDX document",
                node.reference,
                child.reference
            ),
        }
        push_edges(child, ids, seen, out);
    }
}

/// Build the SPDX 2.2 document for `bom`, relationships included.
#[must_use]
pub fn to_spdx_document(bom: &Bom, options: &TagValueOptions) -> SpdxDocument {
    let mut doc = project(bom, SpdxVersion::V2_2, options);

    let mut ids: HashMap<&str, String> = HashMap::new();
    for (component, package) in bom.components.iter().zip(&doc.packages) {
        if let Some(bom_ref) = component.bom_ref.as_deref() {
            ids.insert(bom_ref, package.spdx_id.clone());
        }
    }

    let mut relationships = Vec::new();
    if let Some(subject) = bom.subject() {
        let spdx_id = match subject.bom_ref.as_deref() {
            Some(r) if !r.is_empty() => package_spdx_id(subject, 0),
            _ => SUBJECT_SPDX_ID.to_string(),
        };
        let package = project_package(
            subject,
            spdx_id.clone(),
            SpdxVersion::V2_2,
            &mut doc.has_extracted_licensing_infos,
        );
        if let Some(bom_ref) = subject.bom_ref.as_deref() {
            ids.insert(bom_ref, spdx_id.clone());
        }
        doc.packages.insert(0, package);
        relationships.push(SpdxRelationship {
            spdx_element_id: DOCUMENT_SPDX_ID.to_string(),
            relationship_type: "DESCRIBES".to_string(),
            related_spdx_element: spdx_id,
        });
    } else {
        relationships.extend(doc.packages.iter().map(|p| SpdxRelationship {
            spdx_element_id: DOCUMENT_SPDX_ID.to_string(),
            relationship_type: "DESCRIBES".to_string(),
            related_spdx_element: p.spdx_id.clone(),
        }));
    }

    let mut seen = HashSet::new();
    for root in &bom.dependencies {
        push_edges(root, &ids, &mut seen, &mut relationships);
    }
    doc.relationships = relationships;
    doc
}

/// Write `bom` as a pretty-printed SPDX 2.2 JSON document.
pub fn write_json(bom: &Bom, options: &TagValueOptions) -> Result<Vec<u8>> {
    let doc = to_spdx_document(bom, options);
    serde_json::to_vec_pretty(&doc).map_err(|e| BomError::serialize("spdxjson", e.to_string()))
}

/// Read an SPDX 2.x JSON document into a canonical BOM.
pub fn read_json(bytes: &[u8]) -> Result<Bom> {
    let doc: SpdxDocument = serde_json::from_slice(bytes)
        .map_err(|e| BomError::parse("SPDX JSON", ParseErrorKind::InvalidSpdx(e.to_string())))?;
    into_bom(&doc)
}
