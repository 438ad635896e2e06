//! SPDX 2.x projection of a BOM.
//!
//! Both SPDX writers (tag-value and JSON) go through the same projection,
//! [`project`], so they agree on package ids, checksums and license
//! numbering. Both readers produce an [`SpdxDocument`] and share
//! [`into_bom`] to get back to the model.
//!
//! SPDX cannot represent most of CycloneDX. The projection keeps top-level
//! components only and drops everything SPDX has no field for.

mod json;
mod tag_value;

pub use json::{read_json, write_json};
pub use tag_value::{read_tag_value, write_tag_value};

use crate::error::{BomError, ParseErrorKind, Result};
use crate::model::{
    AttachedText, Bom, Component, ComponentType, Dependency, ExternalReference,
    ExternalReferenceType, Hash, HashAlgorithm, License, LicenseChoice, Metadata,
    OrganizationalContact, OrganizationalEntity, SpdxVersion, SpecVersion, Tool,
};
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

pub(crate) const NOASSERTION: &str = "NOASSERTION";
pub(crate) const DOCUMENT_SPDX_ID: &str = "SPDXRef-DOCUMENT";
const DATA_LICENSE: &str = "CC0-1.0";
const LICENSE_LIST_VERSION: &str = "3.14";
const UNNAMED_DOCUMENT: &str = "Generated from CycloneDX BOM without metadata component specified";
const CREATOR_TOOL: &str = "Tool: CycloneDX-CLI";
pub(crate) const CREATOR_COMMENT: &str =
    "This SPDX document was created by conversion from a CycloneDX BOM.";
pub(crate) const DOCUMENT_COMMENT: &str = "SPDX does not support all features of CycloneDX. Some information is missing from the original CycloneDX BOM.";

/// Inputs the writers would otherwise take from the clock or a random
/// source. Pin both to get byte-stable output.
#[derive(Debug, Clone)]
pub struct TagValueOptions {
    /// `Created` timestamp, written to whole seconds.
    pub created: DateTime<Utc>,
    /// Namespace suffix used when the BOM has no serial number. A random
    /// UUID when `None`.
    pub document_id: Option<String>,
}

impl Default for TagValueOptions {
    fn default() -> Self {
        Self {
            created: Utc::now(),
            document_id: None,
        }
    }
}

// ============================================================================
// Document structures (SPDX 2.2 JSON field names)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpdxDocument {
    pub spdx_version: String,
    pub data_license: String,
    #[serde(rename = "SPDXID")]
    pub spdx_id: String,
    pub name: String,
    #[serde(default)]
    pub document_namespace: Option<String>,
    #[serde(default)]
    pub creation_info: SpdxCreationInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<SpdxPackage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub has_extracted_licensing_infos: Vec<SpdxExtractedLicense>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<SpdxRelationship>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpdxCreationInfo {
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub creators: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_list_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpdxPackage {
    #[serde(rename = "SPDXID")]
    pub spdx_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originator: Option<String>,
    #[serde(default)]
    pub download_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_analyzed: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checksums: Vec<SpdxChecksum>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_concluded: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_declared: Option<String>,
    /// Raw text; the tag-value writer wraps it in `<text>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_refs: Vec<SpdxExternalRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpdxChecksum {
    pub algorithm: String,
    pub checksum_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpdxExternalRef {
    pub reference_category: String,
    pub reference_type: String,
    pub reference_locator: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpdxRelationship {
    pub spdx_element_id: String,
    pub relationship_type: String,
    pub related_spdx_element: String,
}

/// A license without an SPDX id, referenced as `LicenseRef-n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpdxExtractedLicense {
    pub license_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub see_also: Vec<String>,
}

// ============================================================================
// BOM -> SPDX
// ============================================================================

static INVALID_ID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9.\-]").expect("static regex"));

/// SPDX element ids allow letters, digits, `.` and `-` only.
pub(crate) fn sanitize_spdx_id(value: &str) -> String {
    INVALID_ID_CHARS.replace_all(value, "-").into_owned()
}

/// `[{group}.]{name}[-{version}]` of the subject.
fn document_name(bom: &Bom) -> String {
    let Some(subject) = bom.subject() else {
        return UNNAMED_DOCUMENT.to_string();
    };
    let mut name = subject.name.clone();
    if let Some(version) = &subject.version {
        name = format!("{name}-{version}");
    }
    if let Some(group) = &subject.group {
        name = format!("{group}.{name}");
    }
    name
}

fn document_ref(bom: &Bom, options: &TagValueOptions) -> String {
    match bom.serial_number.as_deref() {
        Some(serial) if !serial.is_empty() => serial
            .strip_prefix("urn:uuid:")
            .unwrap_or(serial)
            .to_string(),
        _ => options
            .document_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
    }
}

fn checksum_algorithm(alg: HashAlgorithm, version: SpdxVersion) -> Option<&'static str> {
    match (alg, version) {
        (HashAlgorithm::Sha1, _) => Some("SHA1"),
        (HashAlgorithm::Sha256, _) => Some("SHA256"),
        (HashAlgorithm::Md5, SpdxVersion::V2_2) => Some("MD5"),
        (HashAlgorithm::Sha384, SpdxVersion::V2_2) => Some("SHA384"),
        (HashAlgorithm::Sha512, SpdxVersion::V2_2) => Some("SHA512"),
        _ => None,
    }
}

fn cpe_reference_type(cpe: &str) -> Option<&'static str> {
    let lower = cpe.to_ascii_lowercase();
    if lower.starts_with("cpe:2.2:") {
        Some("cpe22Type")
    } else if lower.starts_with("cpe:2.3:") {
        Some("cpe23Type")
    } else {
        None
    }
}

/// Build the declared-license expression, registering each named license
/// as a fresh `LicenseRef-n`.
fn declared_license(licenses: &[LicenseChoice], extracted: &mut Vec<SpdxExtractedLicense>) -> String {
    if licenses.is_empty() {
        return NOASSERTION.to_string();
    }
    let parts: Vec<String> = licenses
        .iter()
        .map(|choice| match choice {
            LicenseChoice::Expression(expr) => format!("({expr})"),
            LicenseChoice::License(license) => match license.id() {
                Some(id) => id.to_string(),
                None => {
                    let license_id = format!("LicenseRef-{}", extracted.len() + 1);
                    extracted.push(SpdxExtractedLicense {
                        license_id: license_id.clone(),
                        extracted_text: license
                            .text
                            .as_ref()
                            .map(|t| t.content.clone())
                            .filter(|t| !t.is_empty()),
                        name: license.label().to_string(),
                        see_also: license.url.iter().filter(|u| !u.is_empty()).cloned().collect(),
                    });
                    license_id
                }
            },
        })
        .collect();
    if parts.len() > 1 {
        format!("({})", parts.join(" AND "))
    } else {
        parts.join("")
    }
}

fn package_spdx_id(component: &Component, index: usize) -> String {
    match component.bom_ref.as_deref() {
        Some(bom_ref) if !bom_ref.is_empty() => format!("SPDXRef-{}", sanitize_spdx_id(bom_ref)),
        _ => format!("SPDXRef-{}", index + 1),
    }
}

fn project_package(
    component: &Component,
    spdx_id: String,
    version: SpdxVersion,
    extracted: &mut Vec<SpdxExtractedLicense>,
) -> SpdxPackage {
    let name = match &component.group {
        Some(group) => format!("{group} {}", component.name),
        None => component.name.clone(),
    };

    let checksums = component
        .hashes
        .iter()
        .filter_map(|h| {
            checksum_algorithm(h.alg, version).map(|algorithm| SpdxChecksum {
                algorithm: algorithm.to_string(),
                checksum_value: h.content.clone(),
            })
        })
        .collect();

    let mut external_refs = Vec::new();
    if let Some(purl) = component.purl.as_deref().filter(|p| !p.is_empty()) {
        external_refs.push(SpdxExternalRef {
            reference_category: "PACKAGE-MANAGER".to_string(),
            reference_type: "purl".to_string(),
            reference_locator: purl.to_string(),
        });
    }
    if let Some(cpe) = component.cpe.as_deref().filter(|c| !c.is_empty()) {
        if let Some(reference_type) = cpe_reference_type(cpe) {
            external_refs.push(SpdxExternalRef {
                reference_category: "SECURITY".to_string(),
                reference_type: reference_type.to_string(),
                reference_locator: cpe.to_string(),
            });
        }
    }

    SpdxPackage {
        spdx_id,
        name,
        version_info: component.version.clone(),
        supplier: component
            .supplier
            .as_ref()
            .map(|s| format!("Organization: {} ()", s.name.as_deref().unwrap_or_default())),
        originator: component
            .author
            .as_ref()
            .or(component.publisher.as_ref())
            .map(|person| format!("Person: {person} ()")),
        download_location: Some(NOASSERTION.to_string()),
        files_analyzed: Some(false),
        checksums,
        homepage: component
            .external_references
            .iter()
            .find(|r| r.reference_type == ExternalReferenceType::Website)
            .map(|r| r.url.clone()),
        license_concluded: Some(NOASSERTION.to_string()),
        license_declared: Some(declared_license(&component.licenses, extracted)),
        copyright_text: Some(
            component
                .copyright
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| NOASSERTION.to_string()),
        ),
        description: None,
        external_refs,
    }
}

fn creators(bom: &Bom) -> Vec<String> {
    let mut creators = Vec::new();
    if let Some(metadata) = &bom.metadata {
        for author in &metadata.authors {
            creators.push(format!(
                "Person: {} ({})",
                author.name.as_deref().unwrap_or_default(),
                author.email.as_deref().unwrap_or_default()
            ));
        }
        for tool in &metadata.tools {
            creators.push(format!(
                "Tool: {}-{}",
                tool.name.as_deref().unwrap_or_default(),
                tool.version.as_deref().unwrap_or_default()
            ));
        }
    }
    creators.push(CREATOR_TOOL.to_string());
    creators
}

/// Project `bom` onto an SPDX document.
///
/// Packages are the top-level components in order. Relationships are not
/// filled in here; the JSON writer adds them.
#[must_use]
pub fn project(bom: &Bom, version: SpdxVersion, options: &TagValueOptions) -> SpdxDocument {
    let name = document_name(bom);
    let namespace = format!("http://spdx.org/spdxdocs/{name}-{}", document_ref(bom, options));

    let mut extracted = Vec::new();
    let packages = bom
        .components
        .iter()
        .enumerate()
        .map(|(i, c)| project_package(c, package_spdx_id(c, i), version, &mut extracted))
        .collect();

    SpdxDocument {
        spdx_version: version.as_str().to_string(),
        data_license: DATA_LICENSE.to_string(),
        spdx_id: DOCUMENT_SPDX_ID.to_string(),
        name,
        document_namespace: Some(namespace),
        creation_info: SpdxCreationInfo {
            created: Some(options.created.to_rfc3339_opts(SecondsFormat::Secs, true)),
            creators: creators(bom),
            license_list_version: Some(LICENSE_LIST_VERSION.to_string()),
            comment: Some(CREATOR_COMMENT.to_string()),
        },
        comment: Some(DOCUMENT_COMMENT.to_string()),
        packages,
        has_extracted_licensing_infos: extracted,
        relationships: Vec::new(),
    }
}

// ============================================================================
// SPDX -> BOM
// ============================================================================

fn invalid(field: &str, message: impl Into<String>) -> BomError {
    BomError::parse(
        "SPDX",
        ParseErrorKind::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        },
    )
}

fn is_unset(value: &str) -> bool {
    value.is_empty() || value == NOASSERTION || value == "NONE"
}

/// `Organization: ACME (ops@acme.test)` -> (`ACME`, `ops@acme.test`).
fn split_actor(value: &str) -> (String, Option<String>) {
    let value = value
        .strip_prefix("Organization:")
        .or_else(|| value.strip_prefix("Person:"))
        .or_else(|| value.strip_prefix("Tool:"))
        .unwrap_or(value)
        .trim();
    match value.rfind(" (") {
        Some(open) if value.ends_with(')') => {
            let email = value[open + 2..value.len() - 1].trim();
            (
                value[..open].trim().to_string(),
                (!email.is_empty()).then(|| email.to_string()),
            )
        }
        _ => (value.to_string(), None),
    }
}

/// Strip one pair of parentheses when it encloses the whole string.
fn strip_wrapping_parens(value: &str) -> Option<&str> {
    let inner = value.strip_prefix('(')?.strip_suffix(')')?;
    let mut depth = 0usize;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            _ => {}
        }
    }
    (depth == 0).then_some(inner)
}

/// Split on ` AND ` outside parentheses.
fn split_conjunction(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b' ' if depth == 0 && value[i..].starts_with(" AND ") => {
                parts.push(&value[start..i]);
                i += 5;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&value[start..]);
    parts
}

/// Reverse of [`declared_license`].
fn licenses_from_declared(
    declared: &str,
    extracted: &HashMap<&str, &SpdxExtractedLicense>,
) -> Vec<LicenseChoice> {
    let declared = declared.trim();
    if is_unset(declared) {
        return Vec::new();
    }
    let whole = strip_wrapping_parens(declared).unwrap_or(declared);
    let parts = split_conjunction(whole);
    if parts.len() == 1 && whole != declared {
        return vec![LicenseChoice::Expression(whole.to_string())];
    }
    parts
        .into_iter()
        .map(str::trim)
        .map(|part| {
            if let Some(inner) = strip_wrapping_parens(part) {
                LicenseChoice::Expression(inner.to_string())
            } else if let Some(info) = extracted.get(part) {
                LicenseChoice::License(License {
                    identity: crate::model::LicenseIdentity::Name(info.name.clone()),
                    text: info.extracted_text.as_ref().map(|content| AttachedText {
                        content_type: None,
                        encoding: None,
                        content: content.clone(),
                    }),
                    url: info.see_also.first().cloned(),
                })
            } else if spdx::license_id(part).is_some() {
                LicenseChoice::License(License::spdx(part))
            } else {
                LicenseChoice::Expression(part.to_string())
            }
        })
        .collect()
}

fn hash_from_checksum(checksum: &SpdxChecksum) -> Option<Hash> {
    let alg = match checksum.algorithm.to_ascii_uppercase().as_str() {
        "MD5" => HashAlgorithm::Md5,
        "SHA1" => HashAlgorithm::Sha1,
        "SHA256" => HashAlgorithm::Sha256,
        "SHA384" => HashAlgorithm::Sha384,
        "SHA512" => HashAlgorithm::Sha512,
        "SHA3-256" => HashAlgorithm::Sha3_256,
        "SHA3-384" => HashAlgorithm::Sha3_384,
        "SHA3-512" => HashAlgorithm::Sha3_512,
        "BLAKE2B-256" => HashAlgorithm::Blake2b256,
        "BLAKE2B-384" => HashAlgorithm::Blake2b384,
        "BLAKE2B-512" => HashAlgorithm::Blake2b512,
        "BLAKE3" => HashAlgorithm::Blake3,
        other => {
            tracing::debug!("Skipping unsupported SPDX checksum algorithm {other}");
            return None;
        }
    };
    Some(Hash::new(alg, checksum.checksum_value.clone()))
}

fn bom_ref_of(spdx_id: &str) -> String {
    spdx_id.strip_prefix("SPDXRef-").unwrap_or(spdx_id).to_string()
}

fn component_from_package(
    package: &SpdxPackage,
    extracted: &HashMap<&str, &SpdxExtractedLicense>,
) -> Component {
    let mut component = Component::new(ComponentType::Library, package.name.clone());
    component.bom_ref = Some(bom_ref_of(&package.spdx_id));
    component.version = package.version_info.clone().filter(|v| !v.is_empty());
    component.supplier = package
        .supplier
        .as_deref()
        .filter(|s| !is_unset(s))
        .map(|s| OrganizationalEntity::named(split_actor(s).0));
    component.author = package
        .originator
        .as_deref()
        .filter(|s| !is_unset(s))
        .map(|s| split_actor(s).0);
    component.description = package.description.clone();
    component.copyright = package
        .copyright_text
        .as_deref()
        .filter(|c| !is_unset(c))
        .map(str::to_string);
    component.hashes = package.checksums.iter().filter_map(hash_from_checksum).collect();
    component.licenses = package
        .license_declared
        .as_deref()
        .map(|d| licenses_from_declared(d, extracted))
        .unwrap_or_default();

    for reference in &package.external_refs {
        match (
            reference.reference_category.replace('_', "-").as_str(),
            reference.reference_type.as_str(),
        ) {
            ("PACKAGE-MANAGER", "purl") => {
                component.purl = Some(reference.reference_locator.clone());
            }
            ("SECURITY", "cpe22Type" | "cpe23Type") => {
                component.cpe = Some(reference.reference_locator.clone());
            }
            _ => {}
        }
    }
    if let Some(homepage) = package.homepage.as_deref().filter(|h| !is_unset(h)) {
        component.external_references.push(ExternalReference {
            reference_type: ExternalReferenceType::Website,
            url: homepage.to_string(),
            comment: None,
            hashes: Vec::new(),
        });
    }
    component
}

fn metadata_from_creation(info: &SpdxCreationInfo) -> Metadata {
    let mut metadata = Metadata {
        timestamp: info
            .created
            .as_deref()
            .and_then(|c| DateTime::parse_from_rfc3339(c).ok())
            .map(|dt| dt.with_timezone(&Utc)),
        ..Metadata::default()
    };
    for creator in &info.creators {
        let creator = creator.trim();
        if creator == CREATOR_TOOL {
            continue;
        }
        if creator.starts_with("Person:") {
            let (name, email) = split_actor(creator);
            metadata.authors.push(OrganizationalContact {
                name: Some(name),
                email,
                phone: None,
            });
        } else if let Some(tool) = creator.strip_prefix("Tool:") {
            let tool = tool.trim();
            let (name, version) = match tool.rsplit_once('-') {
                Some((name, version)) if !version.is_empty() => {
                    (name.to_string(), Some(version.to_string()))
                }
                _ => (tool.to_string(), None),
            };
            metadata.tools.push(Tool {
                vendor: None,
                name: Some(name),
                version,
                hashes: Vec::new(),
            });
        }
    }
    metadata
}

/// Serial number recovered from a namespace ending in a UUID.
fn serial_from_namespace(namespace: &str) -> Option<String> {
    let tail = namespace.get(namespace.len().checked_sub(36)?..)?;
    uuid::Uuid::parse_str(tail)
        .ok()
        .map(|u| format!("urn:uuid:{u}"))
}

/// Convert a parsed SPDX document into a canonical BOM.
///
/// The single package the document `DESCRIBES` becomes the subject.
/// `DEPENDS_ON` and `DEPENDENCY_OF` relationships become dependencies.
pub fn into_bom(doc: &SpdxDocument) -> Result<Bom> {
    if !doc.spdx_version.starts_with("SPDX-2.") {
        return Err(BomError::parse(
            "SPDX",
            ParseErrorKind::UnsupportedVersion {
                version: doc.spdx_version.clone(),
                supported: "SPDX-2.1, SPDX-2.2".to_string(),
            },
        ));
    }

    let extracted: HashMap<&str, &SpdxExtractedLicense> = doc
        .has_extracted_licensing_infos
        .iter()
        .map(|info| (info.license_id.as_str(), info))
        .collect();

    let described: Vec<&str> = doc
        .relationships
        .iter()
        .filter(|r| r.spdx_element_id == doc.spdx_id && r.relationship_type == "DESCRIBES")
        .map(|r| r.related_spdx_element.as_str())
        .collect();
    let subject_id = match described.as_slice() {
        [only] => Some(*only),
        _ => None,
    };

    let mut bom = Bom::new();
    bom.spec_version = SpecVersion::CANONICAL;
    bom.serial_number = doc
        .document_namespace
        .as_deref()
        .and_then(serial_from_namespace);

    let mut metadata = metadata_from_creation(&doc.creation_info);
    for package in &doc.packages {
        if package.spdx_id.is_empty() {
            return Err(invalid("SPDXID", format!("package '{}' has no SPDXID", package.name)));
        }
        let component = component_from_package(package, &extracted);
        if Some(package.spdx_id.as_str()) == subject_id {
            metadata.component = Some(Component {
                component_type: ComponentType::Application,
                ..component
            });
        } else {
            bom.components.push(component);
        }
    }
    bom.metadata = Some(metadata);

    let mut edges: Vec<(String, Vec<String>)> = Vec::new();
    for rel in &doc.relationships {
        let (from, to) = match rel.relationship_type.as_str() {
            "DEPENDS_ON" => (&rel.spdx_element_id, &rel.related_spdx_element),
            "DEPENDENCY_OF" => (&rel.related_spdx_element, &rel.spdx_element_id),
            _ => continue,
        };
        let from = bom_ref_of(from);
        let to = bom_ref_of(to);
        match edges.iter_mut().find(|(r, _)| *r == from) {
            Some((_, targets)) => targets.push(to),
            None => edges.push((from, vec![to])),
        }
    }
    bom.dependencies = edges
        .into_iter()
        .map(|(from, targets)| {
            Dependency::new(from).with_dependencies(targets.into_iter().map(Dependency::new).collect())
        })
        .collect();

    tracing::debug!(
        "Converted SPDX document '{}' with {} packages",
        doc.name,
        doc.packages.len()
    );
    Ok(bom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(super) fn pinned() -> TagValueOptions {
        TagValueOptions {
            created: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single().unwrap(),
            document_id: Some("00000000-0000-4000-8000-000000000000".to_string()),
        }
    }

    #[test]
    fn test_sanitize_spdx_id() {
        assert_eq!(sanitize_spdx_id("pkg:npm/acme@1.0.0"), "pkg-npm-acme-1.0.0");
        assert_eq!(sanitize_spdx_id("a.b-c"), "a.b-c");
    }

    #[test]
    fn test_document_name() {
        let mut bom = Bom::new();
        assert_eq!(document_name(&bom), UNNAMED_DOCUMENT);
        bom.metadata_mut().component = Some(
            Component::new(ComponentType::Application, "app")
                .with_group("acme")
                .with_version("1.2"),
        );
        assert_eq!(document_name(&bom), "acme.app-1.2");
    }

    #[test]
    fn test_license_refs_are_fresh_per_occurrence() {
        let mut extracted = Vec::new();
        let licenses = vec![
            LicenseChoice::License(License::named("Custom")),
            LicenseChoice::License(License::spdx("MIT")),
            LicenseChoice::Expression("Apache-2.0 OR BSD-3-Clause".to_string()),
        ];
        assert_eq!(
            declared_license(&licenses, &mut extracted),
            "(LicenseRef-1 AND MIT AND (Apache-2.0 OR BSD-3-Clause))"
        );
        let again = vec![LicenseChoice::License(License::named("Custom"))];
        assert_eq!(declared_license(&again, &mut extracted), "LicenseRef-2");
        assert_eq!(extracted.len(), 2);
    }

    #[test]
    fn test_declared_license_round_trip() {
        let licenses = vec![
            LicenseChoice::License(License::named("Custom")),
            LicenseChoice::License(License::spdx("MIT")),
            LicenseChoice::Expression("Apache-2.0 OR BSD-3-Clause".to_string()),
        ];
        let mut extracted = Vec::new();
        let declared = declared_license(&licenses, &mut extracted);
        let lookup: HashMap<&str, &SpdxExtractedLicense> = extracted
            .iter()
            .map(|e| (e.license_id.as_str(), e))
            .collect();
        assert_eq!(licenses_from_declared(&declared, &lookup), licenses);
    }

    #[test]
    fn test_single_expression_round_trip() {
        let lookup = HashMap::new();
        assert_eq!(
            licenses_from_declared("(MIT OR ISC)", &lookup),
            vec![LicenseChoice::Expression("MIT OR ISC".to_string())]
        );
        assert!(licenses_from_declared("NOASSERTION", &lookup).is_empty());
    }

    #[test]
    fn test_md5_only_for_v2_2() {
        assert_eq!(checksum_algorithm(HashAlgorithm::Md5, SpdxVersion::V2_1), None);
        assert_eq!(checksum_algorithm(HashAlgorithm::Md5, SpdxVersion::V2_2), Some("MD5"));
        assert_eq!(checksum_algorithm(HashAlgorithm::Sha1, SpdxVersion::V2_1), Some("SHA1"));
        assert_eq!(checksum_algorithm(HashAlgorithm::Sha512, SpdxVersion::V2_1), None);
        assert_eq!(checksum_algorithm(HashAlgorithm::Blake3, SpdxVersion::V2_2), None);
    }

    #[test]
    fn test_cpe_reference_types() {
        assert_eq!(cpe_reference_type("cpe:2.3:a:acme:x:1:*:*:*:*:*:*:*"), Some("cpe23Type"));
        assert_eq!(cpe_reference_type("CPE:2.2:a:acme"), Some("cpe22Type"));
        assert_eq!(cpe_reference_type("cpe:/a:acme:x:1"), None);
    }

    #[test]
    fn test_document_ref_sources() {
        let mut bom = Bom::new();
        let options = pinned();
        assert_eq!(document_ref(&bom, &options), "00000000-0000-4000-8000-000000000000");
        bom.serial_number = Some("urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79".to_string());
        assert_eq!(document_ref(&bom, &options), "3e671687-395b-41f5-a30f-a58921a69b79");
        bom.serial_number = Some("custom-serial".to_string());
        assert_eq!(document_ref(&bom, &options), "custom-serial");
    }

    #[test]
    fn test_split_actor() {
        assert_eq!(
            split_actor("Person: Jane Doe (jane@example.com)"),
            ("Jane Doe".to_string(), Some("jane@example.com".to_string()))
        );
        assert_eq!(split_actor("Organization: ACME ()"), ("ACME".to_string(), None));
    }

    #[test]
    fn test_into_bom_picks_described_subject() {
        let doc = SpdxDocument {
            spdx_version: "SPDX-2.2".to_string(),
            spdx_id: DOCUMENT_SPDX_ID.to_string(),
            name: "doc".to_string(),
            document_namespace: Some(
                "http://spdx.org/spdxdocs/doc-3e671687-395b-41f5-a30f-a58921a69b79".to_string(),
            ),
            packages: vec![
                SpdxPackage {
                    spdx_id: "SPDXRef-app".to_string(),
                    name: "app".to_string(),
                    ..SpdxPackage::default()
                },
                SpdxPackage {
                    spdx_id: "SPDXRef-lib".to_string(),
                    name: "lib".to_string(),
                    version_info: Some("1.0".to_string()),
                    ..SpdxPackage::default()
                },
            ],
            relationships: vec![
                SpdxRelationship {
                    spdx_element_id: DOCUMENT_SPDX_ID.to_string(),
                    relationship_type: "DESCRIBES".to_string(),
                    related_spdx_element: "SPDXRef-app".to_string(),
                },
                SpdxRelationship {
                    spdx_element_id: "SPDXRef-app".to_string(),
                    relationship_type: "DEPENDS_ON".to_string(),
                    related_spdx_element: "SPDXRef-lib".to_string(),
                },
            ],
            ..SpdxDocument::default()
        };
        let bom = into_bom(&doc).unwrap();
        assert_eq!(bom.subject().map(|c| c.name.as_str()), Some("app"));
        assert_eq!(bom.components.len(), 1);
        assert_eq!(
            bom.serial_number.as_deref(),
            Some("urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79")
        );
        assert_eq!(bom.dependencies[0].reference, "app");
        assert_eq!(bom.dependencies[0].dependencies[0].reference, "lib");
    }

    #[test]
    fn test_into_bom_rejects_spdx_3() {
        let doc = SpdxDocument {
            spdx_version: "SPDX-3.0".to_string(),
            ..SpdxDocument::default()
        };
        assert!(into_bom(&doc).is_err());
    }
}
