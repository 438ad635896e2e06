//! Single-rung transforms.
//!
//! `to_v1_N` functions produce version 1.N from 1.N+1. `from_v1_N` functions
//! lift 1.N to 1.N+1 and undo the coercions of the matching downgrade.

use super::{for_each_component, Losses};
use crate::model::{
    Bom, Component, ExternalReference, ExternalReferenceType, LicenseChoice, SpecVersion,
};

// ============================================================================
// Sweeps shared by every rung
// ============================================================================

/// Coerce enum values and drop list entries newer than `target`.
fn sweep_component(c: &mut Component, path: &str, target: SpecVersion, losses: &mut Losses<'_>) {
    if c.component_type.since() > target {
        let to = c.component_type.fallback();
        losses.coerced(format!("{path}.type"), c.component_type.as_str(), to.as_str());
        c.component_type = to;
    }

    if let Some(scope) = c.scope {
        if scope.since() > target {
            losses.dropped(format!("{path}.scope"), &format!("scope '{scope}'"));
            c.scope = None;
        }
    }

    let before = c.hashes.len();
    c.hashes.retain(|h| {
        let keep = h.alg.since() <= target;
        if !keep {
            losses.dropped(format!("{path}.hashes"), &format!("hash algorithm {}", h.alg));
        }
        keep
    });
    if before != c.hashes.len() {
        tracing::trace!("{path}: {} hashes dropped", before - c.hashes.len());
    }

    sweep_references(&mut c.external_references, &format!("{path}.externalReferences"), target, losses);
}

fn sweep_references(
    refs: &mut [ExternalReference],
    path: &str,
    target: SpecVersion,
    losses: &mut Losses<'_>,
) {
    for (i, r) in refs.iter_mut().enumerate() {
        if r.reference_type.since() > target {
            let from = serde_json::to_value(r.reference_type)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            losses.coerced(format!("{path}[{i}].type"), &from, "other");
            r.reference_type = ExternalReferenceType::Other;
        }
    }
}

fn sweep(bom: &mut Bom, target: SpecVersion, losses: &mut Losses<'_>) {
    for_each_component(bom, |c, path| sweep_component(c, path, target, losses));
    sweep_references(&mut bom.external_references, "externalReferences", target, losses);
}

// ============================================================================
// Downgrade rungs
// ============================================================================

pub(super) fn to_v1_4(mut bom: Bom, losses: &mut Losses<'_>) -> Bom {
    sweep(&mut bom, SpecVersion::V1_4, losses);
    bom
}

pub(super) fn to_v1_3(mut bom: Bom, losses: &mut Losses<'_>) -> Bom {
    if !bom.vulnerabilities.is_empty() {
        losses.dropped("vulnerabilities", "vulnerabilities");
        bom.vulnerabilities.clear();
    }
    // version is mandatory before 1.4
    for_each_component(&mut bom, |c, path| {
        if c.version.is_none() {
            losses.coerced(format!("{path}.version"), "(absent)", "");
            c.version = Some(String::new());
        }
    });
    sweep(&mut bom, SpecVersion::V1_3, losses);
    bom
}

pub(super) fn to_v1_2(mut bom: Bom, losses: &mut Losses<'_>) -> Bom {
    if !bom.compositions.is_empty() {
        losses.dropped("compositions", "compositions");
        bom.compositions.clear();
    }
    if let Some(metadata) = bom.metadata.as_mut() {
        if !metadata.properties.is_empty() {
            losses.dropped("metadata.properties", "properties");
            metadata.properties.clear();
        }
    }
    for_each_component(&mut bom, |c, path| {
        if !c.properties.is_empty() {
            losses.dropped(format!("{path}.properties"), "properties");
            c.properties.clear();
        }
        for (i, r) in c.external_references.iter_mut().enumerate() {
            if !r.hashes.is_empty() {
                losses.dropped(
                    format!("{path}.externalReferences[{i}].hashes"),
                    "external reference hashes",
                );
                r.hashes.clear();
            }
        }
    });
    for r in &mut bom.external_references {
        if !r.hashes.is_empty() {
            losses.dropped("externalReferences.hashes", "external reference hashes");
            r.hashes.clear();
        }
    }
    sweep(&mut bom, SpecVersion::V1_2, losses);
    bom
}

pub(super) fn to_v1_1(mut bom: Bom, losses: &mut Losses<'_>) -> Bom {
    // Sweep first so losses inside the subject are reported before the
    // whole metadata block goes.
    sweep(&mut bom, SpecVersion::V1_1, losses);
    for_each_component(&mut bom, |c, path| {
        if c.swid.take().is_some() {
            losses.dropped(format!("{path}.swid"), "swid");
        }
        if c.supplier.take().is_some() {
            losses.dropped(format!("{path}.supplier"), "supplier");
        }
        if c.author.take().is_some() {
            losses.dropped(format!("{path}.author"), "author");
        }
        if c.mime_type.take().is_some() {
            losses.dropped(format!("{path}.mime-type"), "mime-type");
        }
    });
    if bom.metadata.take().is_some() {
        losses.dropped("metadata", "metadata");
    }
    if !bom.dependencies.is_empty() {
        losses.dropped("dependencies", "dependencies");
        bom.dependencies.clear();
    }
    if !bom.services.is_empty() {
        losses.dropped("services", "services");
        bom.services.clear();
    }
    bom
}

pub(super) fn to_v1_0(mut bom: Bom, losses: &mut Losses<'_>) -> Bom {
    if bom.serial_number.take().is_some() {
        losses.dropped("serialNumber", "serialNumber");
    }
    if !bom.external_references.is_empty() {
        losses.dropped("externalReferences", "external references");
        bom.external_references.clear();
    }
    sweep(&mut bom, SpecVersion::V1_0, losses);
    for_each_component(&mut bom, |c, path| {
        if c.bom_ref.take().is_some() {
            losses.dropped(format!("{path}.bom-ref"), "bom-ref");
        }
        if !c.external_references.is_empty() {
            losses.dropped(format!("{path}.externalReferences"), "external references");
            c.external_references.clear();
        }
        let licenses = std::mem::take(&mut c.licenses);
        for (i, choice) in licenses.into_iter().enumerate() {
            match choice {
                LicenseChoice::Expression(expr) => {
                    losses.dropped(
                        format!("{path}.licenses[{i}]"),
                        &format!("license expression '{expr}'"),
                    );
                }
                LicenseChoice::License(mut license) => {
                    if license.text.take().is_some() {
                        losses.dropped(format!("{path}.licenses[{i}].text"), "license text");
                    }
                    if license.url.take().is_some() {
                        losses.dropped(format!("{path}.licenses[{i}].url"), "license url");
                    }
                    c.licenses.push(LicenseChoice::License(license));
                }
            }
        }
    });
    bom
}

// ============================================================================
// Upgrade rungs
// ============================================================================

// Nothing introduced by 1.1, 1.2, 1.3 or 1.5 needs lifting: older documents
// simply lack the newer fields.

pub(super) fn from_v1_0(bom: Bom) -> Bom {
    bom
}

pub(super) fn from_v1_1(bom: Bom) -> Bom {
    bom
}

pub(super) fn from_v1_2(bom: Bom) -> Bom {
    bom
}

/// Undo the empty-version placeholder older schemas force on writers.
pub(super) fn from_v1_3(mut bom: Bom) -> Bom {
    for_each_component(&mut bom, |c, _| {
        if c.version.as_deref() == Some("") {
            c.version = None;
        }
    });
    bom
}

pub(super) fn from_v1_4(bom: Bom) -> Bom {
    bom
}
