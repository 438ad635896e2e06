//! CycloneDX protocol buffers codec.
//!
//! Messages are declared with `prost` derives instead of generated from
//! `.proto` files; field numbers follow `bom-1.5.proto`. Enumerations are
//! kept as raw `int32` fields and mapped by hand, so unknown values from
//! newer writers surface as parse errors rather than silently defaulting.

use crate::error::{BomError, ParseErrorKind, Result};
use crate::model::{
    AttachedText, Bom, Component, ComponentType, Dependency, ExternalReference,
    ExternalReferenceType, Hash, HashAlgorithm, License, LicenseChoice, LicenseIdentity, Metadata,
    OrganizationalContact, OrganizationalEntity, Property, Scope, SpecVersion, Swid, Tool,
};
use chrono::{DateTime, Utc};
use prost::Message;

// ============================================================================
// Messages
// ============================================================================

#[derive(Clone, PartialEq, Message)]
struct PbBom {
    #[prost(string, tag = "1")]
    spec_version: String,
    #[prost(int32, optional, tag = "2")]
    version: Option<i32>,
    #[prost(string, optional, tag = "3")]
    serial_number: Option<String>,
    #[prost(message, optional, tag = "4")]
    metadata: Option<PbMetadata>,
    #[prost(message, repeated, tag = "5")]
    components: Vec<PbComponent>,
    #[prost(message, repeated, tag = "7")]
    external_references: Vec<PbExternalReference>,
    #[prost(message, repeated, tag = "8")]
    dependencies: Vec<PbDependency>,
}

#[derive(Clone, PartialEq, Message)]
struct PbMetadata {
    #[prost(message, optional, tag = "1")]
    timestamp: Option<prost_types::Timestamp>,
    #[prost(message, repeated, tag = "2")]
    tools: Vec<PbTool>,
    #[prost(message, repeated, tag = "3")]
    authors: Vec<PbContact>,
    #[prost(message, optional, tag = "4")]
    component: Option<PbComponent>,
    #[prost(message, optional, tag = "6")]
    supplier: Option<PbEntity>,
    #[prost(message, repeated, tag = "8")]
    properties: Vec<PbProperty>,
}

#[derive(Clone, PartialEq, Message)]
struct PbTool {
    #[prost(string, optional, tag = "1")]
    vendor: Option<String>,
    #[prost(string, optional, tag = "2")]
    name: Option<String>,
    #[prost(string, optional, tag = "3")]
    version: Option<String>,
    #[prost(message, repeated, tag = "4")]
    hashes: Vec<PbHash>,
}

#[derive(Clone, PartialEq, Message)]
struct PbContact {
    #[prost(string, optional, tag = "2")]
    name: Option<String>,
    #[prost(string, optional, tag = "3")]
    email: Option<String>,
    #[prost(string, optional, tag = "4")]
    phone: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
struct PbEntity {
    #[prost(string, optional, tag = "2")]
    name: Option<String>,
    #[prost(string, repeated, tag = "3")]
    url: Vec<String>,
    #[prost(message, repeated, tag = "4")]
    contact: Vec<PbContact>,
}

#[derive(Clone, PartialEq, Message)]
struct PbComponent {
    #[prost(int32, tag = "1")]
    component_type: i32,
    #[prost(string, optional, tag = "2")]
    mime_type: Option<String>,
    #[prost(string, optional, tag = "3")]
    bom_ref: Option<String>,
    #[prost(message, optional, tag = "4")]
    supplier: Option<PbEntity>,
    #[prost(string, optional, tag = "5")]
    author: Option<String>,
    #[prost(string, optional, tag = "6")]
    publisher: Option<String>,
    #[prost(string, optional, tag = "7")]
    group: Option<String>,
    #[prost(string, tag = "8")]
    name: String,
    #[prost(string, optional, tag = "9")]
    version: Option<String>,
    #[prost(string, optional, tag = "10")]
    description: Option<String>,
    #[prost(int32, optional, tag = "11")]
    scope: Option<i32>,
    #[prost(message, repeated, tag = "12")]
    hashes: Vec<PbHash>,
    #[prost(message, repeated, tag = "13")]
    licenses: Vec<PbLicenseChoice>,
    #[prost(string, optional, tag = "14")]
    copyright: Option<String>,
    #[prost(string, optional, tag = "15")]
    cpe: Option<String>,
    #[prost(string, optional, tag = "16")]
    purl: Option<String>,
    #[prost(message, optional, tag = "17")]
    swid: Option<PbSwid>,
    #[prost(bool, optional, tag = "18")]
    modified: Option<bool>,
    #[prost(message, repeated, tag = "20")]
    external_references: Vec<PbExternalReference>,
    #[prost(message, repeated, tag = "21")]
    properties: Vec<PbProperty>,
    #[prost(message, repeated, tag = "22")]
    components: Vec<PbComponent>,
}

#[derive(Clone, PartialEq, Message)]
struct PbHash {
    #[prost(int32, tag = "1")]
    alg: i32,
    #[prost(string, tag = "2")]
    value: String,
}

#[derive(Clone, PartialEq, Message)]
struct PbLicenseChoice {
    #[prost(oneof = "PbChoice", tags = "1, 2")]
    choice: Option<PbChoice>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
enum PbChoice {
    #[prost(message, tag = "1")]
    License(PbLicense),
    #[prost(string, tag = "2")]
    Expression(String),
}

#[derive(Clone, PartialEq, Message)]
struct PbLicense {
    #[prost(oneof = "PbLicenseId", tags = "1, 2")]
    license: Option<PbLicenseId>,
    #[prost(message, optional, tag = "3")]
    text: Option<PbAttachedText>,
    #[prost(string, optional, tag = "4")]
    url: Option<String>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
enum PbLicenseId {
    #[prost(string, tag = "1")]
    Id(String),
    #[prost(string, tag = "2")]
    Name(String),
}

#[derive(Clone, PartialEq, Message)]
struct PbAttachedText {
    #[prost(string, optional, tag = "1")]
    content_type: Option<String>,
    #[prost(string, optional, tag = "2")]
    encoding: Option<String>,
    #[prost(string, tag = "3")]
    value: String,
}

#[derive(Clone, PartialEq, Message)]
struct PbSwid {
    #[prost(string, tag = "1")]
    tag_id: String,
    #[prost(string, tag = "2")]
    name: String,
    #[prost(string, optional, tag = "3")]
    version: Option<String>,
    #[prost(int32, optional, tag = "4")]
    tag_version: Option<i32>,
    #[prost(bool, optional, tag = "5")]
    patch: Option<bool>,
    #[prost(message, optional, tag = "6")]
    text: Option<PbAttachedText>,
    #[prost(string, optional, tag = "7")]
    url: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
struct PbExternalReference {
    #[prost(int32, tag = "1")]
    reference_type: i32,
    #[prost(string, tag = "2")]
    url: String,
    #[prost(string, optional, tag = "3")]
    comment: Option<String>,
    #[prost(message, repeated, tag = "4")]
    hashes: Vec<PbHash>,
}

#[derive(Clone, PartialEq, Message)]
struct PbProperty {
    #[prost(string, tag = "1")]
    name: String,
    #[prost(string, optional, tag = "2")]
    value: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
struct PbDependency {
    #[prost(string, tag = "1")]
    reference: String,
    #[prost(message, repeated, tag = "2")]
    dependencies: Vec<PbDependency>,
}

// ============================================================================
// Enumeration tables
// ============================================================================

const CLASSIFICATIONS: [(ComponentType, i32); 10] = [
    (ComponentType::Application, 1),
    (ComponentType::Framework, 2),
    (ComponentType::Library, 3),
    (ComponentType::OperatingSystem, 4),
    (ComponentType::Device, 5),
    (ComponentType::File, 6),
    (ComponentType::Container, 7),
    (ComponentType::Firmware, 8),
    (ComponentType::MachineLearningModel, 11),
    (ComponentType::Data, 12),
];

const SCOPES: [(Scope, i32); 3] = [
    (Scope::Required, 1),
    (Scope::Optional, 2),
    (Scope::Excluded, 3),
];

const HASH_ALGS: [(HashAlgorithm, i32); 12] = [
    (HashAlgorithm::Md5, 1),
    (HashAlgorithm::Sha1, 2),
    (HashAlgorithm::Sha256, 3),
    (HashAlgorithm::Sha384, 4),
    (HashAlgorithm::Sha512, 5),
    (HashAlgorithm::Sha3_256, 6),
    (HashAlgorithm::Sha3_384, 7),
    (HashAlgorithm::Sha3_512, 8),
    (HashAlgorithm::Blake2b256, 9),
    (HashAlgorithm::Blake2b384, 10),
    (HashAlgorithm::Blake2b512, 11),
    (HashAlgorithm::Blake3, 12),
];

const REFERENCE_TYPES: [(ExternalReferenceType, i32); 39] = [
    (ExternalReferenceType::Other, 0),
    (ExternalReferenceType::Vcs, 1),
    (ExternalReferenceType::IssueTracker, 2),
    (ExternalReferenceType::Website, 3),
    (ExternalReferenceType::Advisories, 4),
    (ExternalReferenceType::Bom, 5),
    (ExternalReferenceType::MailingList, 6),
    (ExternalReferenceType::Social, 7),
    (ExternalReferenceType::Chat, 8),
    (ExternalReferenceType::Documentation, 9),
    (ExternalReferenceType::Support, 10),
    (ExternalReferenceType::Distribution, 11),
    (ExternalReferenceType::License, 12),
    (ExternalReferenceType::BuildMeta, 13),
    (ExternalReferenceType::BuildSystem, 14),
    (ExternalReferenceType::SecurityContact, 15),
    (ExternalReferenceType::Attestation, 16),
    (ExternalReferenceType::ThreatModel, 17),
    (ExternalReferenceType::AdversaryModel, 18),
    (ExternalReferenceType::RiskAssessment, 19),
    (ExternalReferenceType::DistributionIntake, 20),
    (ExternalReferenceType::VulnerabilityAssertion, 21),
    (ExternalReferenceType::ExploitabilityStatement, 22),
    (ExternalReferenceType::PentestReport, 23),
    (ExternalReferenceType::StaticAnalysisReport, 24),
    (ExternalReferenceType::DynamicAnalysisReport, 25),
    (ExternalReferenceType::RuntimeAnalysisReport, 26),
    (ExternalReferenceType::ComponentAnalysisReport, 27),
    (ExternalReferenceType::MaturityReport, 28),
    (ExternalReferenceType::CertificationReport, 29),
    (ExternalReferenceType::QualityMetrics, 30),
    (ExternalReferenceType::CodifiedInfrastructure, 31),
    (ExternalReferenceType::ModelCard, 32),
    (ExternalReferenceType::Poam, 33),
    (ExternalReferenceType::Log, 34),
    (ExternalReferenceType::Configuration, 35),
    (ExternalReferenceType::Evidence, 36),
    (ExternalReferenceType::Formulation, 37),
    (ExternalReferenceType::ReleaseNotes, 38),
];

fn to_wire<T: PartialEq + Copy>(table: &[(T, i32)], value: T) -> i32 {
    table
        .iter()
        .find(|(v, _)| *v == value)
        .map_or(0, |(_, n)| *n)
}

fn from_wire<T: Copy>(table: &[(T, i32)], n: i32, field: &str) -> Result<T> {
    table
        .iter()
        .find(|(_, wire)| *wire == n)
        .map(|(v, _)| *v)
        .ok_or_else(|| {
            BomError::parse(
                "CycloneDX protobuf",
                ParseErrorKind::InvalidValue {
                    field: field.to_string(),
                    message: format!("unknown enumeration value {n}"),
                },
            )
        })
}

// ============================================================================
// Model -> messages
// ============================================================================

fn hashes_to_pb(hashes: &[Hash]) -> Vec<PbHash> {
    hashes
        .iter()
        .map(|h| PbHash {
            alg: to_wire(&HASH_ALGS, h.alg),
            value: h.content.clone(),
        })
        .collect()
}

fn text_to_pb(text: &AttachedText) -> PbAttachedText {
    PbAttachedText {
        content_type: text.content_type.clone(),
        encoding: text.encoding.clone(),
        value: text.content.clone(),
    }
}

fn contact_to_pb(c: &OrganizationalContact) -> PbContact {
    PbContact {
        name: c.name.clone(),
        email: c.email.clone(),
        phone: c.phone.clone(),
    }
}

fn entity_to_pb(e: &OrganizationalEntity) -> PbEntity {
    PbEntity {
        name: e.name.clone(),
        url: e.url.clone(),
        contact: e.contact.iter().map(contact_to_pb).collect(),
    }
}

fn references_to_pb(refs: &[ExternalReference]) -> Vec<PbExternalReference> {
    refs.iter()
        .map(|r| PbExternalReference {
            reference_type: to_wire(&REFERENCE_TYPES, r.reference_type),
            url: r.url.clone(),
            comment: r.comment.clone(),
            hashes: hashes_to_pb(&r.hashes),
        })
        .collect()
}

fn properties_to_pb(props: &[Property]) -> Vec<PbProperty> {
    props
        .iter()
        .map(|p| PbProperty {
            name: p.name.clone(),
            value: p.value.clone(),
        })
        .collect()
}

fn license_to_pb(choice: &LicenseChoice) -> PbLicenseChoice {
    let choice = match choice {
        LicenseChoice::Expression(e) => PbChoice::Expression(e.clone()),
        LicenseChoice::License(l) => PbChoice::License(PbLicense {
            license: Some(match &l.identity {
                LicenseIdentity::Id(id) => PbLicenseId::Id(id.clone()),
                LicenseIdentity::Name(name) => PbLicenseId::Name(name.clone()),
            }),
            text: l.text.as_ref().map(text_to_pb),
            url: l.url.clone(),
        }),
    };
    PbLicenseChoice {
        choice: Some(choice),
    }
}

fn component_to_pb(c: &Component) -> PbComponent {
    PbComponent {
        component_type: to_wire(&CLASSIFICATIONS, c.component_type),
        mime_type: c.mime_type.clone(),
        bom_ref: c.bom_ref.clone(),
        supplier: c.supplier.as_ref().map(entity_to_pb),
        author: c.author.clone(),
        publisher: c.publisher.clone(),
        group: c.group.clone(),
        name: c.name.clone(),
        version: c.version.clone(),
        description: c.description.clone(),
        scope: c.scope.map(|s| to_wire(&SCOPES, s)),
        hashes: hashes_to_pb(&c.hashes),
        licenses: c.licenses.iter().map(license_to_pb).collect(),
        copyright: c.copyright.clone(),
        cpe: c.cpe.clone(),
        purl: c.purl.clone(),
        swid: c.swid.as_ref().map(|s| PbSwid {
            tag_id: s.tag_id.clone(),
            name: s.name.clone(),
            version: s.version.clone(),
            tag_version: s.tag_version,
            patch: s.patch,
            text: s.text.as_ref().map(text_to_pb),
            url: s.url.clone(),
        }),
        modified: c.modified,
        external_references: references_to_pb(&c.external_references),
        properties: properties_to_pb(&c.properties),
        components: c.components.iter().map(component_to_pb).collect(),
    }
}

fn dependency_to_pb(d: &Dependency) -> PbDependency {
    PbDependency {
        reference: d.reference.clone(),
        dependencies: d.dependencies.iter().map(dependency_to_pb).collect(),
    }
}

fn timestamp_to_pb(t: &DateTime<Utc>) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: t.timestamp(),
        nanos: i32::try_from(t.timestamp_subsec_nanos()).unwrap_or(0),
    }
}

fn metadata_to_pb(m: &Metadata) -> PbMetadata {
    PbMetadata {
        timestamp: m.timestamp.as_ref().map(timestamp_to_pb),
        tools: m
            .tools
            .iter()
            .map(|t| PbTool {
                vendor: t.vendor.clone(),
                name: t.name.clone(),
                version: t.version.clone(),
                hashes: hashes_to_pb(&t.hashes),
            })
            .collect(),
        authors: m.authors.iter().map(contact_to_pb).collect(),
        component: m.component.as_ref().map(component_to_pb),
        supplier: m.supplier.as_ref().map(entity_to_pb),
        properties: properties_to_pb(&m.properties),
    }
}

// ============================================================================
// Messages -> model
// ============================================================================

fn hashes_from_pb(hashes: Vec<PbHash>) -> Result<Vec<Hash>> {
    hashes
        .into_iter()
        .map(|h| Ok(Hash::new(from_wire(&HASH_ALGS, h.alg, "hash.alg")?, h.value)))
        .collect()
}

fn text_from_pb(text: PbAttachedText) -> AttachedText {
    AttachedText {
        content_type: text.content_type,
        encoding: text.encoding,
        content: text.value,
    }
}

fn contact_from_pb(c: PbContact) -> OrganizationalContact {
    OrganizationalContact {
        name: c.name,
        email: c.email,
        phone: c.phone,
    }
}

fn entity_from_pb(e: PbEntity) -> OrganizationalEntity {
    OrganizationalEntity {
        name: e.name,
        url: e.url,
        contact: e.contact.into_iter().map(contact_from_pb).collect(),
    }
}

fn references_from_pb(refs: Vec<PbExternalReference>) -> Result<Vec<ExternalReference>> {
    refs.into_iter()
        .map(|r| {
            Ok(ExternalReference {
                reference_type: from_wire(
                    &REFERENCE_TYPES,
                    r.reference_type,
                    "externalReference.type",
                )?,
                url: r.url,
                comment: r.comment,
                hashes: hashes_from_pb(r.hashes)?,
            })
        })
        .collect()
}

fn properties_from_pb(props: Vec<PbProperty>) -> Vec<Property> {
    props
        .into_iter()
        .map(|p| Property {
            name: p.name,
            value: p.value,
        })
        .collect()
}

fn license_from_pb(choice: PbLicenseChoice) -> Result<LicenseChoice> {
    match choice.choice {
        Some(PbChoice::Expression(e)) => Ok(LicenseChoice::Expression(e)),
        Some(PbChoice::License(l)) => {
            let identity = match l.license {
                Some(PbLicenseId::Id(id)) => LicenseIdentity::Id(id),
                Some(PbLicenseId::Name(name)) => LicenseIdentity::Name(name),
                None => {
                    return Err(BomError::parse(
                        "CycloneDX protobuf",
                        ParseErrorKind::InvalidValue {
                            field: "license".to_string(),
                            message: "license has neither an id nor a name".to_string(),
                        },
                    ))
                }
            };
            Ok(LicenseChoice::License(License {
                identity,
                text: l.text.map(text_from_pb),
                url: l.url,
            }))
        }
        None => Err(BomError::parse(
            "CycloneDX protobuf",
            ParseErrorKind::InvalidValue {
                field: "licenses".to_string(),
                message: "empty license choice".to_string(),
            },
        )),
    }
}

fn component_from_pb(c: PbComponent) -> Result<Component> {
    Ok(Component {
        component_type: from_wire(&CLASSIFICATIONS, c.component_type, "component.type")?,
        mime_type: c.mime_type,
        bom_ref: c.bom_ref,
        supplier: c.supplier.map(entity_from_pb),
        author: c.author,
        publisher: c.publisher,
        group: c.group,
        name: c.name,
        version: c.version,
        description: c.description,
        scope: c
            .scope
            .map(|s| from_wire(&SCOPES, s, "component.scope"))
            .transpose()?,
        hashes: hashes_from_pb(c.hashes)?,
        licenses: c
            .licenses
            .into_iter()
            .map(license_from_pb)
            .collect::<Result<_>>()?,
        copyright: c.copyright,
        cpe: c.cpe,
        purl: c.purl,
        swid: c.swid.map(|s| Swid {
            tag_id: s.tag_id,
            name: s.name,
            version: s.version,
            tag_version: s.tag_version,
            patch: s.patch,
            text: s.text.map(text_from_pb),
            url: s.url,
        }),
        modified: c.modified,
        external_references: references_from_pb(c.external_references)?,
        properties: properties_from_pb(c.properties),
        components: c
            .components
            .into_iter()
            .map(component_from_pb)
            .collect::<Result<_>>()?,
    })
}

fn dependency_from_pb(d: PbDependency) -> Dependency {
    Dependency::new(d.reference)
        .with_dependencies(d.dependencies.into_iter().map(dependency_from_pb).collect())
}

fn timestamp_from_pb(t: &prost_types::Timestamp) -> Result<DateTime<Utc>> {
    u32::try_from(t.nanos)
        .ok()
        .and_then(|nanos| DateTime::from_timestamp(t.seconds, nanos))
        .ok_or_else(|| {
            BomError::parse(
                "CycloneDX protobuf",
                ParseErrorKind::InvalidValue {
                    field: "metadata.timestamp".to_string(),
                    message: format!("out of range: {}s {}ns", t.seconds, t.nanos),
                },
            )
        })
}

fn metadata_from_pb(m: PbMetadata) -> Result<Metadata> {
    Ok(Metadata {
        timestamp: m.timestamp.as_ref().map(timestamp_from_pb).transpose()?,
        tools: m
            .tools
            .into_iter()
            .map(|t| {
                Ok(Tool {
                    vendor: t.vendor,
                    name: t.name,
                    version: t.version,
                    hashes: hashes_from_pb(t.hashes)?,
                })
            })
            .collect::<Result<_>>()?,
        authors: m.authors.into_iter().map(contact_from_pb).collect(),
        component: m.component.map(component_from_pb).transpose()?,
        supplier: m.supplier.map(entity_from_pb),
        properties: properties_from_pb(m.properties),
    })
}

// ============================================================================
// Decode / encode
// ============================================================================

/// Decode a message, keeping the version it declares.
pub(crate) fn decode(bytes: &[u8]) -> Result<Bom> {
    let msg = PbBom::decode(bytes).map_err(|e| {
        BomError::parse(
            "CycloneDX protobuf",
            ParseErrorKind::InvalidProtobuf(e.to_string()),
        )
    })?;

    let spec_version: SpecVersion = msg.spec_version.parse().map_err(|_| {
        BomError::parse(
            "CycloneDX protobuf",
            ParseErrorKind::UnsupportedVersion {
                version: msg.spec_version.clone(),
                supported: "1.3-1.5".to_string(),
            },
        )
    })?;

    Ok(Bom {
        spec_version,
        serial_number: msg.serial_number,
        version: msg.version,
        metadata: msg.metadata.map(metadata_from_pb).transpose()?,
        components: msg
            .components
            .into_iter()
            .map(component_from_pb)
            .collect::<Result<_>>()?,
        external_references: references_from_pb(msg.external_references)?,
        dependencies: msg.dependencies.into_iter().map(dependency_from_pb).collect(),
        services: Vec::new(),
        compositions: Vec::new(),
        vulnerabilities: Vec::new(),
    })
}

/// Encode at the document's own version. Services, compositions and
/// vulnerabilities are not written.
pub(crate) fn encode(bom: &Bom) -> Vec<u8> {
    let msg = PbBom {
        spec_version: bom.spec_version.to_string(),
        version: bom.version,
        serial_number: bom.serial_number.clone(),
        metadata: bom.metadata.as_ref().map(metadata_to_pb),
        components: bom.components.iter().map(component_to_pb).collect(),
        external_references: references_to_pb(&bom.external_references),
        dependencies: bom.dependencies.iter().map(dependency_to_pb).collect(),
    };
    msg.encode_to_vec()
}
