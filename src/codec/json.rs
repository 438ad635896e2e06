//! CycloneDX JSON codec.
//!
//! The model's component types already carry the JSON shape; this module
//! adds the document envelope (`bomFormat`, `specVersion`), flattens the
//! dependency forest into `dependsOn` lists and accepts both forms of
//! `metadata.tools`.

use crate::error::{BomError, ParseErrorKind, Result};
use crate::model::{
    Bom, Component, Dependency, ExternalReference, Hash, Metadata, OrganizationalContact,
    OrganizationalEntity, Property, SpecVersion, Tool,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const BOM_FORMAT: &str = "CycloneDX";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonBom {
    #[serde(default)]
    bom_format: Option<String>,
    spec_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<JsonMetadata>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    services: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    external_references: Vec<ExternalReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<JsonDependency>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    compositions: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    vulnerabilities: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
    /// Array form (up to 1.4) or `{components, services}` object form (1.5).
    #[serde(default, deserialize_with = "deserialize_tools", skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    authors: Vec<OrganizationalContact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    component: Option<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    supplier: Option<OrganizationalEntity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    properties: Vec<Property>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonDependency {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "dependsOn", default, skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<String>,
}

/// Tool entry in the 1.5 object form: a component or service.
#[derive(Debug, Deserialize)]
struct ToolEntry {
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    hashes: Vec<Hash>,
}

#[derive(Debug, Deserialize)]
struct ToolsObject {
    #[serde(default)]
    components: Vec<ToolEntry>,
    #[serde(default)]
    services: Vec<ToolEntry>,
}

/// Accept `tools` as the legacy array or as the 1.5 object with
/// components/services.
fn deserialize_tools<'de, D>(deserializer: D) -> std::result::Result<Vec<Tool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, MapAccess, SeqAccess, Visitor};
    use std::fmt;

    struct ToolsVisitor;

    impl<'de> Visitor<'de> for ToolsVisitor {
        type Value = Vec<Tool>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an array of tools or an object with components/services")
        }

        fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut tools = Vec::new();
            while let Some(tool) = seq.next_element::<Tool>()? {
                tools.push(tool);
            }
            Ok(tools)
        }

        fn visit_map<M>(self, map: M) -> std::result::Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let object: ToolsObject =
                Deserialize::deserialize(de::value::MapAccessDeserializer::new(map))?;
            Ok(object
                .components
                .into_iter()
                .chain(object.services)
                .map(|entry| Tool {
                    vendor: entry.group,
                    name: entry.name,
                    version: entry.version,
                    hashes: entry.hashes,
                })
                .collect())
        }
    }

    deserializer.deserialize_any(ToolsVisitor)
}

// ============================================================================
// Dependency flattening
// ============================================================================

/// One entry per node that has children, depth first. JSON documents hold a
/// single level of `dependsOn`, so deeper edges become their own entries.
fn flatten_dependencies(deps: &[Dependency]) -> Vec<JsonDependency> {
    fn visit(dep: &Dependency, out: &mut Vec<JsonDependency>, depth: usize) {
        if depth > 0 && dep.dependencies.is_empty() {
            return;
        }
        out.push(JsonDependency {
            reference: dep.reference.clone(),
            depends_on: dep
                .dependencies
                .iter()
                .map(|d| d.reference.clone())
                .collect(),
        });
        for child in &dep.dependencies {
            visit(child, out, depth + 1);
        }
    }

    let mut out = Vec::new();
    for dep in deps {
        visit(dep, &mut out, 0);
    }
    out
}

fn nest_dependencies(deps: Vec<JsonDependency>) -> Vec<Dependency> {
    deps.into_iter()
        .map(|d| {
            Dependency::new(d.reference)
                .with_dependencies(d.depends_on.into_iter().map(Dependency::new).collect())
        })
        .collect()
}

// ============================================================================
// Decode / encode
// ============================================================================

fn parse_spec_version(raw: &str) -> Result<SpecVersion> {
    raw.parse().map_err(|_| {
        BomError::parse(
            "CycloneDX JSON",
            ParseErrorKind::UnsupportedVersion {
                version: raw.to_string(),
                supported: "1.0-1.5".to_string(),
            },
        )
    })
}

/// Decode a document, keeping the version it declares.
pub(crate) fn decode(bytes: &[u8]) -> Result<Bom> {
    let doc: JsonBom = serde_json::from_slice(bytes).map_err(|e| {
        BomError::parse("CycloneDX JSON", ParseErrorKind::InvalidJson(e.to_string()))
    })?;

    if let Some(format) = doc.bom_format.as_deref() {
        if format != BOM_FORMAT {
            return Err(BomError::parse(
                "CycloneDX JSON",
                ParseErrorKind::InvalidValue {
                    field: "bomFormat".to_string(),
                    message: format!("expected '{BOM_FORMAT}', found '{format}'"),
                },
            ));
        }
    }

    Ok(Bom {
        spec_version: parse_spec_version(&doc.spec_version)?,
        serial_number: doc.serial_number,
        version: doc.version,
        metadata: doc.metadata.map(|m| Metadata {
            timestamp: m.timestamp,
            tools: m.tools,
            authors: m.authors,
            component: m.component,
            supplier: m.supplier,
            properties: m.properties,
        }),
        components: doc.components,
        external_references: doc.external_references,
        dependencies: nest_dependencies(doc.dependencies),
        services: doc.services,
        compositions: doc.compositions,
        vulnerabilities: doc.vulnerabilities,
    })
}

/// Encode as pretty-printed JSON at the document's own version.
pub(crate) fn encode(bom: &Bom) -> Result<Vec<u8>> {
    let doc = JsonBom {
        bom_format: Some(BOM_FORMAT.to_string()),
        spec_version: bom.spec_version.to_string(),
        serial_number: bom.serial_number.clone(),
        version: bom.version,
        metadata: bom.metadata.as_ref().map(|m| JsonMetadata {
            timestamp: m.timestamp,
            tools: m.tools.clone(),
            authors: m.authors.clone(),
            component: m.component.clone(),
            supplier: m.supplier.clone(),
            properties: m.properties.clone(),
        }),
        components: bom.components.clone(),
        services: bom.services.clone(),
        external_references: bom.external_references.clone(),
        dependencies: flatten_dependencies(&bom.dependencies),
        compositions: bom.compositions.clone(),
        vulnerabilities: bom.vulnerabilities.clone(),
    };
    serde_json::to_vec_pretty(&doc).map_err(|e| BomError::serialize("json", e.to_string()))
}
