//! SPDX tag-value format.

use super::{
    into_bom, project, SpdxChecksum, SpdxCreationInfo, SpdxDocument, SpdxExtractedLicense,
    SpdxExternalRef, SpdxPackage, SpdxRelationship, TagValueOptions, NOASSERTION,
};
use crate::error::{BomError, ParseErrorKind, Result};
use crate::model::{Bom, SpdxVersion};
use crate::reports::escape::escape_html;

/// Render `bom` as an SPDX tag-value document.
///
/// Only top-level components are written, one package block each, in
/// document order. Named licenses are collected into `LicenseRef-n`
/// blocks at the end.
#[must_use]
pub fn write_tag_value(bom: &Bom, version: SpdxVersion, options: &TagValueOptions) -> String {
    let doc = project(bom, version, options);
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("SPDXVersion: {}", doc.spdx_version));
    lines.push(format!("DataLicense: {}", doc.data_license));
    lines.push(format!("SPDXID: {}", doc.spdx_id));
    lines.push(format!("DocumentName: {}", doc.name));
    if let Some(namespace) = &doc.document_namespace {
        lines.push(format!("DocumentNamespace: {namespace}"));
    }
    if let Some(list_version) = &doc.creation_info.license_list_version {
        lines.push(format!("LicenseListVersion: {list_version}"));
    }
    for creator in &doc.creation_info.creators {
        lines.push(format!("Creator: {creator}"));
    }
    if let Some(created) = &doc.creation_info.created {
        lines.push(format!("Created: {created}"));
    }
    if let Some(comment) = &doc.creation_info.comment {
        lines.push(format!("CreatorComment: <text>{comment}</text>"));
    }
    if let Some(comment) = &doc.comment {
        lines.push(format!("DocumentComment: <text>{comment}</text>"));
    }

    for package in &doc.packages {
        write_package(package, &mut lines);
    }

    for license in &doc.has_extracted_licensing_infos {
        lines.push(String::new());
        lines.push(format!("LicenseID: {}", license.license_id));
        if let Some(text) = &license.extracted_text {
            lines.push(format!(
                "ExtractedText: <text>\"{}\": {}</text>",
                license.name,
                escape_html(text)
            ));
        }
        lines.push(format!("LicenseName: {}", license.name));
        for url in &license.see_also {
            lines.push(format!("LicenseCrossReference: {url}"));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn write_package(package: &SpdxPackage, lines: &mut Vec<String>) {
    lines.push(String::new());
    lines.push(format!("PackageName: {}", package.name));
    lines.push(format!("SPDXID: {}", package.spdx_id));
    lines.push(format!(
        "PackageVersion: {}",
        package.version_info.as_deref().unwrap_or_default()
    ));
    if let Some(supplier) = &package.supplier {
        lines.push(format!("PackageSupplier: {supplier}"));
    }
    if let Some(originator) = &package.originator {
        lines.push(format!("PackageOriginator: {originator}"));
    }
    lines.push(format!(
        "PackageDownloadLocation: {}",
        package.download_location.as_deref().unwrap_or(NOASSERTION)
    ));
    lines.push(format!(
        "FilesAnalyzed: {}",
        package.files_analyzed.unwrap_or(false)
    ));
    for checksum in &package.checksums {
        lines.push(format!(
            "PackageChecksum: {}: {}",
            checksum.algorithm, checksum.checksum_value
        ));
    }
    if let Some(homepage) = &package.homepage {
        lines.push(format!("PackageHomePage: {homepage}"));
    }
    lines.push(format!(
        "PackageLicenseConcluded: {}",
        package.license_concluded.as_deref().unwrap_or(NOASSERTION)
    ));
    lines.push(format!(
        "PackageLicenseDeclared: {}",
        package.license_declared.as_deref().unwrap_or(NOASSERTION)
    ));
    match package.copyright_text.as_deref() {
        None | Some(NOASSERTION) => lines.push(format!("PackageCopyrightText: {NOASSERTION}")),
        Some(text) => lines.push(format!(
            "PackageCopyrightText: <text>{}</text>",
            escape_html(text)
        )),
    }
    for reference in &package.external_refs {
        lines.push(format!(
            "ExternalRef: {} {} {}",
            reference.reference_category, reference.reference_type, reference.reference_locator
        ));
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Undo the `<text>` wrapping and HTML escaping of a multi-line value.
fn unwrap_text(value: &str) -> String {
    let inner = value
        .strip_prefix("<text>")
        .and_then(|v| v.strip_suffix("</text>"))
        .unwrap_or(value);
    unescape_html(inner)
}

fn unescape_html(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let entity = &tail[1..end];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix('#')
                .and_then(|n| n.parse::<u32>().ok())
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn parse_relationship_line(value: &str) -> Option<SpdxRelationship> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() >= 3 {
        Some(SpdxRelationship {
            spdx_element_id: parts[0].to_string(),
            relationship_type: parts[1].to_string(),
            related_spdx_element: parts[2].to_string(),
        })
    } else {
        None
    }
}

fn parse_external_ref_line(value: &str) -> Option<SpdxExternalRef> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() >= 3 {
        Some(SpdxExternalRef {
            reference_category: parts[0].to_string(),
            reference_type: parts[1].to_string(),
            reference_locator: parts[2].to_string(),
        })
    } else {
        None
    }
}

fn parse_checksum_line(value: &str) -> Option<SpdxChecksum> {
    let (algorithm, checksum) = value.split_once(':')?;
    Some(SpdxChecksum {
        algorithm: algorithm.trim().to_string(),
        checksum_value: checksum.trim().to_string(),
    })
}

/// Join `<text>` values that span several lines into one logical line.
fn logical_lines(content: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut pending: Option<(String, String)> = None;

    for line in content.lines() {
        if let Some((key, mut value)) = pending.take() {
            value.push('\n');
            value.push_str(line);
            if line.contains("</text>") {
                out.push((key, value));
            } else {
                pending = Some((key, value));
            }
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = trimmed.split_once(':') {
            let key = key.trim().to_string();
            let value = value.trim().to_string();
            if value.starts_with("<text>") && !value.contains("</text>") {
                pending = Some((key, value));
            } else {
                out.push((key, value));
            }
        }
    }
    if let Some(unterminated) = pending {
        out.push(unterminated);
    }
    out
}

/// Parse a tag-value document into its SPDX structure.
pub fn parse_tag_value(content: &str) -> Result<SpdxDocument> {
    let mut doc = SpdxDocument::default();
    let mut creation_info = SpdxCreationInfo::default();
    let mut current_package: Option<SpdxPackage> = None;
    let mut current_license: Option<SpdxExtractedLicense> = None;

    for (key, value) in logical_lines(content) {
        match key.as_str() {
            "SPDXVersion" => doc.spdx_version = value,
            "DataLicense" => doc.data_license = value,
            "SPDXID" => match current_package.as_mut() {
                Some(pkg) => pkg.spdx_id = value,
                None => doc.spdx_id = value,
            },
            "DocumentName" => doc.name = value,
            "DocumentNamespace" => doc.document_namespace = Some(value),
            "DocumentComment" => doc.comment = Some(unwrap_text(&value)),
            "Creator" => creation_info.creators.push(value),
            "Created" => creation_info.created = Some(value),
            "CreatorComment" => creation_info.comment = Some(unwrap_text(&value)),
            "LicenseListVersion" => creation_info.license_list_version = Some(value),
            "PackageName" => {
                if let Some(pkg) = current_package.take() {
                    doc.packages.push(pkg);
                }
                current_package = Some(SpdxPackage {
                    name: value,
                    ..SpdxPackage::default()
                });
            }
            "Relationship" => {
                if let Some(rel) = parse_relationship_line(&value) {
                    doc.relationships.push(rel);
                }
            }
            "LicenseID" => {
                if let Some(pkg) = current_package.take() {
                    doc.packages.push(pkg);
                }
                if let Some(license) = current_license.take() {
                    doc.has_extracted_licensing_infos.push(license);
                }
                current_license = Some(SpdxExtractedLicense {
                    license_id: value,
                    extracted_text: None,
                    name: String::new(),
                    see_also: Vec::new(),
                });
            }
            _ => {
                if let Some(license) = current_license.as_mut() {
                    apply_license_field(license, &key, &value);
                } else if let Some(pkg) = current_package.as_mut() {
                    apply_package_field(pkg, &key, value);
                }
            }
        }
    }

    if let Some(pkg) = current_package {
        doc.packages.push(pkg);
    }
    if let Some(license) = current_license {
        doc.has_extracted_licensing_infos.push(license);
    }
    doc.creation_info = creation_info;

    if doc.spdx_version.is_empty() {
        return Err(BomError::parse(
            "SPDX",
            ParseErrorKind::InvalidSpdx("missing SPDXVersion tag".to_string()),
        ));
    }
    Ok(doc)
}

fn apply_package_field(pkg: &mut SpdxPackage, key: &str, value: String) {
    match key {
        "PackageVersion" => pkg.version_info = Some(value),
        "PackageSupplier" => pkg.supplier = Some(value),
        "PackageOriginator" => pkg.originator = Some(value),
        "PackageDownloadLocation" => pkg.download_location = Some(value),
        "FilesAnalyzed" => pkg.files_analyzed = Some(value.eq_ignore_ascii_case("true")),
        "PackageHomePage" => pkg.homepage = Some(value),
        "PackageLicenseConcluded" => pkg.license_concluded = Some(value),
        "PackageLicenseDeclared" => pkg.license_declared = Some(value),
        "PackageCopyrightText" => pkg.copyright_text = Some(unwrap_text(&value)),
        "PackageDescription" => pkg.description = Some(unwrap_text(&value)),
        "PackageChecksum" => {
            if let Some(checksum) = parse_checksum_line(&value) {
                pkg.checksums.push(checksum);
            }
        }
        "ExternalRef" => {
            if let Some(ext_ref) = parse_external_ref_line(&value) {
                pkg.external_refs.push(ext_ref);
            }
        }
        _ => {}
    }
}

fn apply_license_field(license: &mut SpdxExtractedLicense, key: &str, value: &str) {
    match key {
        "LicenseName" => license.name = value.to_string(),
        "LicenseCrossReference" => license.see_also.push(value.to_string()),
        "ExtractedText" => {
            let text = unwrap_text(value);
            // the writer prefixes the license name in quotes
            let text = match text.strip_prefix('"').and_then(|t| t.split_once("\": ")) {
                Some((_, rest)) => rest.to_string(),
                None => text,
            };
            license.extracted_text = Some(text);
        }
        _ => {}
    }
}

/// Read a tag-value document into a canonical BOM.
pub fn read_tag_value(bytes: &[u8]) -> Result<Bom> {
    let content = std::str::from_utf8(bytes).map_err(|e| {
        BomError::parse("SPDX", ParseErrorKind::InvalidSpdx(format!("not UTF-8: {e}")))
    })?;
    let doc = parse_tag_value(content)?;
    into_bom(&doc)
}
