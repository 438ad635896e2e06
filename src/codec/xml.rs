//! CycloneDX XML codec.
//!
//! XML wraps every collection in a container element
//! (`<components><component>..`) and carries the schema version in the
//! default namespace instead of a field, so the model is mirrored here by
//! structs shaped for quick-xml's serde support.

use crate::error::{BomError, ParseErrorKind, Result};
use crate::model::{
    AttachedText, Bom, Component, ComponentType, Dependency, ExternalReference,
    ExternalReferenceType, Hash, HashAlgorithm, License, LicenseChoice, Metadata,
    OrganizationalContact, OrganizationalEntity, Property, RawLicense, Scope, SpecVersion, Swid,
    Tool,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// XML mirror structures
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "bom")]
struct XmlBom {
    #[serde(rename = "@xmlns", default)]
    xmlns: Option<String>,
    #[serde(rename = "@serialNumber", default, skip_serializing_if = "Option::is_none")]
    serial_number: Option<String>,
    #[serde(rename = "@version", default, skip_serializing_if = "Option::is_none")]
    version: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<XmlMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    components: Option<XmlComponents>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    services: Option<XmlServices>,
    #[serde(
        rename = "externalReferences",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    external_references: Option<XmlExternalReferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dependencies: Option<XmlDependencies>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    compositions: Option<XmlCompositions>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tools: Option<XmlTools>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    authors: Option<XmlAuthors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    component: Option<XmlComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    supplier: Option<OrganizationalEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    properties: Option<XmlProperties>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlTools {
    #[serde(rename = "tool", default)]
    tool: Vec<XmlTool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlTool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hashes: Option<XmlHashes>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlAuthors {
    #[serde(rename = "author", default)]
    author: Vec<OrganizationalContact>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlComponents {
    #[serde(rename = "component", default)]
    component: Vec<XmlComponent>,
}

/// Attributes first: quick-xml writes them in field order.
#[derive(Debug, Serialize, Deserialize)]
struct XmlComponent {
    #[serde(rename = "@type", default)]
    component_type: ComponentType,
    #[serde(rename = "@mime-type", default, skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(rename = "@bom-ref", default, skip_serializing_if = "Option::is_none")]
    bom_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    supplier: Option<OrganizationalEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<Scope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hashes: Option<XmlHashes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    licenses: Option<XmlLicenses>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cpe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    purl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    swid: Option<XmlSwid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    modified: Option<bool>,
    #[serde(
        rename = "externalReferences",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    external_references: Option<XmlExternalReferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    properties: Option<XmlProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    components: Option<XmlComponents>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlHashes {
    #[serde(rename = "hash", default)]
    hash: Vec<XmlHash>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlHash {
    #[serde(rename = "@alg")]
    alg: HashAlgorithm,
    #[serde(rename = "$text", default)]
    content: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlLicenses {
    #[serde(rename = "$value", default)]
    choices: Vec<XmlLicenseChoice>,
}

#[derive(Debug, Serialize, Deserialize)]
enum XmlLicenseChoice {
    #[serde(rename = "license")]
    License(XmlLicense),
    #[serde(rename = "expression")]
    Expression(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlLicense {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<XmlAttachedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlAttachedText {
    #[serde(rename = "@content-type", default, skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
    #[serde(rename = "@encoding", default, skip_serializing_if = "Option::is_none")]
    encoding: Option<String>,
    #[serde(rename = "$text", default)]
    content: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlSwid {
    #[serde(rename = "@tagId")]
    tag_id: String,
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@version", default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(rename = "@tagVersion", default, skip_serializing_if = "Option::is_none")]
    tag_version: Option<i32>,
    #[serde(rename = "@patch", default, skip_serializing_if = "Option::is_none")]
    patch: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<XmlAttachedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlExternalReferences {
    #[serde(rename = "reference", default)]
    reference: Vec<XmlExternalReference>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlExternalReference {
    #[serde(rename = "@type")]
    reference_type: ExternalReferenceType,
    url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hashes: Option<XmlHashes>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlProperties {
    #[serde(rename = "property", default)]
    property: Vec<XmlProperty>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlProperty {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "$text", default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlDependencies {
    #[serde(rename = "dependency", default)]
    dependency: Vec<XmlDependency>,
}

/// Dependencies nest to any depth in XML.
#[derive(Debug, Serialize, Deserialize)]
struct XmlDependency {
    #[serde(rename = "@ref")]
    reference: String,
    #[serde(rename = "dependency", default, skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<XmlDependency>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlServices {
    #[serde(rename = "service", default)]
    service: Vec<XmlService>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlService {
    #[serde(rename = "@bom-ref", default, skip_serializing_if = "Option::is_none")]
    bom_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provider: Option<OrganizationalEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    endpoints: Option<XmlEndpoints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    authenticated: Option<bool>,
    #[serde(
        rename = "x-trust-boundary",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    trust_boundary: Option<bool>,
    #[serde(
        rename = "externalReferences",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    external_references: Option<XmlExternalReferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    properties: Option<XmlProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    services: Option<XmlServices>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlEndpoints {
    #[serde(rename = "endpoint", default)]
    endpoint: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlCompositions {
    #[serde(rename = "composition", default)]
    composition: Vec<XmlComposition>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlComposition {
    aggregate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    assemblies: Option<XmlAssemblies>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dependencies: Option<XmlCompositionDependencies>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlAssemblies {
    #[serde(rename = "assembly", default)]
    assembly: Vec<XmlRef>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlCompositionDependencies {
    #[serde(rename = "dependency", default)]
    dependency: Vec<XmlRef>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlRef {
    #[serde(rename = "@ref")]
    reference: String,
}

// ============================================================================
// Pass-through sections
// ============================================================================

// The model keeps services and compositions as JSON values. These are the
// JSON shapes of the parts XML can hold.

const SERVICE_FIELDS: &[&str] = &[
    "bom-ref",
    "provider",
    "group",
    "name",
    "version",
    "description",
    "endpoints",
    "authenticated",
    "x-trust-boundary",
    "externalReferences",
    "properties",
    "services",
];

const COMPOSITION_FIELDS: &[&str] = &["aggregate", "assemblies", "dependencies"];

#[derive(Debug, Serialize, Deserialize)]
struct JsonService {
    #[serde(rename = "bom-ref", default, skip_serializing_if = "Option::is_none")]
    bom_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provider: Option<OrganizationalEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    endpoints: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    authenticated: Option<bool>,
    #[serde(
        rename = "x-trust-boundary",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    trust_boundary: Option<bool>,
    #[serde(rename = "externalReferences", default, skip_serializing_if = "Vec::is_empty")]
    external_references: Vec<ExternalReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    properties: Vec<Property>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    services: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonComposition {
    aggregate: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    assemblies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<String>,
}

fn unknown_keys(value: &Value, known: &[&str], path: &str, out: &mut Vec<String>) {
    match value.as_object() {
        Some(fields) => out.extend(
            fields
                .keys()
                .filter(|key| !known.contains(&key.as_str()))
                .map(|key| format!("{path}.{key}")),
        ),
        None => out.push(path.to_string()),
    }
}

fn unwritable_services(services: &[Value], prefix: &str, out: &mut Vec<String>) {
    for (i, service) in services.iter().enumerate() {
        let path = format!("{prefix}[{i}]");
        match serde_json::from_value::<JsonService>(service.clone()) {
            Ok(parsed) => {
                unknown_keys(service, SERVICE_FIELDS, &path, out);
                unwritable_services(&parsed.services, &format!("{path}.services"), out);
            }
            Err(_) => out.push(path),
        }
    }
}

/// Paths of the service and composition content XML cannot hold. A whole
/// entry is listed when it lacks a required field.
pub(crate) fn unwritable_fields(bom: &Bom) -> Vec<String> {
    let mut out = Vec::new();
    unwritable_services(&bom.services, "services", &mut out);
    for (i, composition) in bom.compositions.iter().enumerate() {
        let path = format!("compositions[{i}]");
        if serde_json::from_value::<JsonComposition>(composition.clone()).is_ok() {
            unknown_keys(composition, COMPOSITION_FIELDS, &path, &mut out);
        } else {
            out.push(path);
        }
    }
    out
}

fn service_to_xml(service: &Value) -> Option<XmlService> {
    let s: JsonService = serde_json::from_value(service.clone()).ok()?;
    Some(XmlService {
        bom_ref: s.bom_ref,
        provider: s.provider,
        group: s.group,
        name: s.name,
        version: s.version,
        description: s.description,
        endpoints: (!s.endpoints.is_empty()).then_some(XmlEndpoints {
            endpoint: s.endpoints,
        }),
        authenticated: s.authenticated,
        trust_boundary: s.trust_boundary,
        external_references: references_to_xml(&s.external_references),
        properties: properties_to_xml(&s.properties),
        services: services_to_xml(&s.services),
    })
}

fn services_to_xml(services: &[Value]) -> Option<XmlServices> {
    let service: Vec<_> = services.iter().filter_map(service_to_xml).collect();
    (!service.is_empty()).then_some(XmlServices { service })
}

fn compositions_to_xml(compositions: &[Value]) -> Option<XmlCompositions> {
    let refs = |list: Vec<String>| -> Vec<XmlRef> {
        list.into_iter().map(|reference| XmlRef { reference }).collect()
    };
    let composition: Vec<_> = compositions
        .iter()
        .filter_map(|c| serde_json::from_value::<JsonComposition>(c.clone()).ok())
        .map(|c| XmlComposition {
            aggregate: c.aggregate,
            assemblies: (!c.assemblies.is_empty()).then(|| XmlAssemblies {
                assembly: refs(c.assemblies),
            }),
            dependencies: (!c.dependencies.is_empty()).then(|| XmlCompositionDependencies {
                dependency: refs(c.dependencies),
            }),
        })
        .collect();
    (!composition.is_empty()).then_some(XmlCompositions { composition })
}

fn to_json_value(section: &str, value: impl Serialize) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| {
        BomError::parse(
            "CycloneDX XML",
            ParseErrorKind::InvalidValue {
                field: section.to_string(),
                message: e.to_string(),
            },
        )
    })
}

fn services_from_xml(services: Option<XmlServices>) -> Result<Vec<Value>> {
    services
        .map(|s| s.service)
        .unwrap_or_default()
        .into_iter()
        .map(|s| {
            let service = JsonService {
                bom_ref: s.bom_ref,
                provider: s.provider,
                group: s.group,
                name: s.name,
                version: s.version,
                description: s.description,
                endpoints: s.endpoints.map(|e| e.endpoint).unwrap_or_default(),
                authenticated: s.authenticated,
                trust_boundary: s.trust_boundary,
                external_references: references_from_xml(s.external_references),
                properties: properties_from_xml(s.properties),
                services: services_from_xml(s.services)?,
            };
            to_json_value("services", service)
        })
        .collect()
}

fn compositions_from_xml(compositions: Option<XmlCompositions>) -> Result<Vec<Value>> {
    let refs = |list: Vec<XmlRef>| -> Vec<String> { list.into_iter().map(|r| r.reference).collect() };
    compositions
        .map(|c| c.composition)
        .unwrap_or_default()
        .into_iter()
        .map(|c| {
            let composition = JsonComposition {
                aggregate: c.aggregate,
                assemblies: c.assemblies.map(|a| refs(a.assembly)).unwrap_or_default(),
                dependencies: c.dependencies.map(|d| refs(d.dependency)).unwrap_or_default(),
            };
            to_json_value("compositions", composition)
        })
        .collect()
}

// ============================================================================
// Model -> XML
// ============================================================================

fn hashes_to_xml(hashes: &[Hash]) -> Option<XmlHashes> {
    if hashes.is_empty() {
        return None;
    }
    Some(XmlHashes {
        hash: hashes
            .iter()
            .map(|h| XmlHash {
                alg: h.alg,
                content: h.content.clone(),
            })
            .collect(),
    })
}

fn text_to_xml(text: &AttachedText) -> XmlAttachedText {
    XmlAttachedText {
        content_type: text.content_type.clone(),
        encoding: text.encoding.clone(),
        content: text.content.clone(),
    }
}

fn license_to_xml(license: &License) -> XmlLicense {
    let raw = RawLicense::from(license.clone());
    XmlLicense {
        id: raw.id,
        name: raw.name,
        text: raw.text.as_ref().map(text_to_xml),
        url: raw.url,
    }
}

fn references_to_xml(refs: &[ExternalReference]) -> Option<XmlExternalReferences> {
    if refs.is_empty() {
        return None;
    }
    Some(XmlExternalReferences {
        reference: refs
            .iter()
            .map(|r| XmlExternalReference {
                reference_type: r.reference_type,
                url: r.url.clone(),
                comment: r.comment.clone(),
                hashes: hashes_to_xml(&r.hashes),
            })
            .collect(),
    })
}

fn properties_to_xml(props: &[Property]) -> Option<XmlProperties> {
    if props.is_empty() {
        return None;
    }
    Some(XmlProperties {
        property: props
            .iter()
            .map(|p| XmlProperty {
                name: p.name.clone(),
                value: p.value.clone(),
            })
            .collect(),
    })
}

fn component_to_xml(c: &Component) -> XmlComponent {
    XmlComponent {
        component_type: c.component_type,
        mime_type: c.mime_type.clone(),
        bom_ref: c.bom_ref.clone(),
        supplier: c.supplier.clone(),
        author: c.author.clone(),
        publisher: c.publisher.clone(),
        group: c.group.clone(),
        name: c.name.clone(),
        version: c.version.clone(),
        description: c.description.clone(),
        scope: c.scope,
        hashes: hashes_to_xml(&c.hashes),
        licenses: if c.licenses.is_empty() {
            None
        } else {
            Some(XmlLicenses {
                choices: c
                    .licenses
                    .iter()
                    .map(|choice| match choice {
                        LicenseChoice::License(l) => XmlLicenseChoice::License(license_to_xml(l)),
                        LicenseChoice::Expression(e) => XmlLicenseChoice::Expression(e.clone()),
                    })
                    .collect(),
            })
        },
        copyright: c.copyright.clone(),
        cpe: c.cpe.clone(),
        purl: c.purl.clone(),
        swid: c.swid.as_ref().map(|s| XmlSwid {
            tag_id: s.tag_id.clone(),
            name: s.name.clone(),
            version: s.version.clone(),
            tag_version: s.tag_version,
            patch: s.patch,
            text: s.text.as_ref().map(text_to_xml),
            url: s.url.clone(),
        }),
        modified: c.modified,
        external_references: references_to_xml(&c.external_references),
        properties: properties_to_xml(&c.properties),
        components: components_to_xml(&c.components),
    }
}

fn components_to_xml(components: &[Component]) -> Option<XmlComponents> {
    if components.is_empty() {
        return None;
    }
    Some(XmlComponents {
        component: components.iter().map(component_to_xml).collect(),
    })
}

fn dependency_to_xml(dep: &Dependency) -> XmlDependency {
    XmlDependency {
        reference: dep.reference.clone(),
        dependencies: dep.dependencies.iter().map(dependency_to_xml).collect(),
    }
}

fn metadata_to_xml(m: &Metadata) -> XmlMetadata {
    XmlMetadata {
        timestamp: m.timestamp,
        tools: if m.tools.is_empty() {
            None
        } else {
            Some(XmlTools {
                tool: m
                    .tools
                    .iter()
                    .map(|t| XmlTool {
                        vendor: t.vendor.clone(),
                        name: t.name.clone(),
                        version: t.version.clone(),
                        hashes: hashes_to_xml(&t.hashes),
                    })
                    .collect(),
            })
        },
        authors: if m.authors.is_empty() {
            None
        } else {
            Some(XmlAuthors {
                author: m.authors.clone(),
            })
        },
        component: m.component.as_ref().map(component_to_xml),
        supplier: m.supplier.clone(),
        properties: properties_to_xml(&m.properties),
    }
}

// ============================================================================
// XML -> model
// ============================================================================

fn hashes_from_xml(hashes: Option<XmlHashes>) -> Vec<Hash> {
    hashes
        .map(|h| {
            h.hash
                .into_iter()
                .map(|h| Hash::new(h.alg, h.content.trim()))
                .collect()
        })
        .unwrap_or_default()
}

fn text_from_xml(text: XmlAttachedText) -> AttachedText {
    AttachedText {
        content_type: text.content_type,
        encoding: text.encoding,
        content: text.content,
    }
}

fn licenses_from_xml(licenses: Option<XmlLicenses>) -> Result<Vec<LicenseChoice>> {
    let Some(licenses) = licenses else {
        return Ok(Vec::new());
    };
    licenses
        .choices
        .into_iter()
        .map(|choice| match choice {
            XmlLicenseChoice::Expression(e) => Ok(LicenseChoice::Expression(e)),
            XmlLicenseChoice::License(l) => {
                let raw = RawLicense {
                    id: l.id,
                    name: l.name,
                    text: l.text.map(text_from_xml),
                    url: l.url,
                };
                License::try_from(raw).map(LicenseChoice::License).map_err(|message| {
                    BomError::parse(
                        "CycloneDX XML",
                        ParseErrorKind::InvalidValue {
                            field: "license".to_string(),
                            message,
                        },
                    )
                })
            }
        })
        .collect()
}

fn references_from_xml(refs: Option<XmlExternalReferences>) -> Vec<ExternalReference> {
    refs.map(|r| {
        r.reference
            .into_iter()
            .map(|r| ExternalReference {
                reference_type: r.reference_type,
                url: r.url,
                comment: r.comment,
                hashes: hashes_from_xml(r.hashes),
            })
            .collect()
    })
    .unwrap_or_default()
}

fn properties_from_xml(props: Option<XmlProperties>) -> Vec<Property> {
    props
        .map(|p| {
            p.property
                .into_iter()
                .map(|p| Property {
                    name: p.name,
                    value: p.value,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn component_from_xml(c: XmlComponent) -> Result<Component> {
    Ok(Component {
        component_type: c.component_type,
        mime_type: c.mime_type,
        bom_ref: c.bom_ref,
        supplier: c.supplier,
        author: c.author,
        publisher: c.publisher,
        group: c.group,
        name: c.name,
        version: c.version,
        description: c.description,
        scope: c.scope,
        hashes: hashes_from_xml(c.hashes),
        licenses: licenses_from_xml(c.licenses)?,
        copyright: c.copyright,
        cpe: c.cpe,
        purl: c.purl,
        swid: c.swid.map(|s| Swid {
            tag_id: s.tag_id,
            name: s.name,
            version: s.version,
            tag_version: s.tag_version,
            patch: s.patch,
            text: s.text.map(text_from_xml),
            url: s.url,
        }),
        modified: c.modified,
        external_references: references_from_xml(c.external_references),
        properties: properties_from_xml(c.properties),
        components: components_from_xml(c.components)?,
    })
}

fn components_from_xml(components: Option<XmlComponents>) -> Result<Vec<Component>> {
    components
        .map(|c| c.component)
        .unwrap_or_default()
        .into_iter()
        .map(component_from_xml)
        .collect()
}

fn dependency_from_xml(dep: XmlDependency) -> Dependency {
    Dependency::new(dep.reference)
        .with_dependencies(dep.dependencies.into_iter().map(dependency_from_xml).collect())
}

fn metadata_from_xml(m: XmlMetadata) -> Result<Metadata> {
    Ok(Metadata {
        timestamp: m.timestamp,
        tools: m
            .tools
            .map(|t| t.tool)
            .unwrap_or_default()
            .into_iter()
            .map(|t| Tool {
                vendor: t.vendor,
                name: t.name,
                version: t.version,
                hashes: hashes_from_xml(t.hashes),
            })
            .collect(),
        authors: m.authors.map(|a| a.author).unwrap_or_default(),
        component: m.component.map(component_from_xml).transpose()?,
        supplier: m.supplier,
        properties: properties_from_xml(m.properties),
    })
}

// ============================================================================
// Decode / encode
// ============================================================================

/// Decode a document, taking its version from the namespace.
pub(crate) fn decode(bytes: &[u8]) -> Result<Bom> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        BomError::parse("CycloneDX XML", ParseErrorKind::InvalidXml(e.to_string()))
    })?;
    let doc: XmlBom = quick_xml::de::from_str(text).map_err(|e| {
        BomError::parse("CycloneDX XML", ParseErrorKind::InvalidXml(e.to_string()))
    })?;

    let namespace = doc.xmlns.as_deref().unwrap_or_default();
    let spec_version = SpecVersion::from_xml_namespace(namespace).ok_or_else(|| {
        BomError::parse(
            "CycloneDX XML",
            ParseErrorKind::UnsupportedVersion {
                version: namespace.to_string(),
                supported: "http://cyclonedx.org/schema/bom/1.0 to 1.5".to_string(),
            },
        )
    })?;

    Ok(Bom {
        spec_version,
        serial_number: doc.serial_number,
        version: doc.version,
        metadata: doc.metadata.map(metadata_from_xml).transpose()?,
        components: components_from_xml(doc.components)?,
        external_references: references_from_xml(doc.external_references),
        dependencies: doc
            .dependencies
            .map(|d| d.dependency)
            .unwrap_or_default()
            .into_iter()
            .map(dependency_from_xml)
            .collect(),
        services: services_from_xml(doc.services)?,
        compositions: compositions_from_xml(doc.compositions)?,
        vulnerabilities: Vec::new(),
    })
}

/// Encode at the document's own version. Vulnerabilities and whatever
/// [`unwritable_fields`] reports are not written.
pub(crate) fn encode(bom: &Bom) -> Result<Vec<u8>> {
    let doc = XmlBom {
        xmlns: Some(bom.spec_version.xml_namespace()),
        serial_number: bom.serial_number.clone(),
        version: bom.version,
        metadata: bom.metadata.as_ref().map(metadata_to_xml),
        components: components_to_xml(&bom.components),
        services: services_to_xml(&bom.services),
        external_references: references_to_xml(&bom.external_references),
        dependencies: if bom.dependencies.is_empty() {
            None
        } else {
            Some(XmlDependencies {
                dependency: bom.dependencies.iter().map(dependency_to_xml).collect(),
            })
        },
        compositions: compositions_to_xml(&bom.compositions),
    };

    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut body);
    serializer.indent(' ', 2);
    doc.serialize(serializer)
        .map_err(|e| BomError::serialize("xml", e.to_string()))?;

    let mut out = String::with_capacity(body.len() + 40);
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str(&body);
    out.push('\n');
    Ok(out.into_bytes())
}
