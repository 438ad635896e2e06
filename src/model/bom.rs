//! The BOM document root.

use super::component::{Component, ExternalReference, Hash, OrganizationalContact, OrganizationalEntity, Property};
use super::version::SpecVersion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A tool that produced or transformed the document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hashes: Vec<Hash>,
}

impl Tool {
    /// The tool entry describing this program.
    #[must_use]
    pub fn this_tool() -> Self {
        Self {
            vendor: Some("CycloneDX".to_string()),
            name: Some(crate::TOOL_NAME.to_string()),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
            hashes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Metadata {
    pub timestamp: Option<DateTime<Utc>>,
    pub tools: Vec<Tool>,
    pub authors: Vec<OrganizationalContact>,
    /// The subject of the document.
    pub component: Option<Component>,
    pub supplier: Option<OrganizationalEntity>,
    pub properties: Vec<Property>,
}

/// Directed dependency edge: `reference` depends on each nested entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub reference: String,
    pub dependencies: Vec<Dependency>,
}

impl Dependency {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            dependencies: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_dependencies(mut self, dependencies: Vec<Self>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Visit every edge depth first. A reference already on the current path
    /// is visited but not descended into, so cyclic input terminates.
    pub fn walk<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a Self, usize),
    {
        let mut path = HashSet::new();
        self.walk_inner(0, &mut path, f);
    }

    fn walk_inner<'a, F>(&'a self, depth: usize, path: &mut HashSet<&'a str>, f: &mut F)
    where
        F: FnMut(&'a Self, usize),
    {
        f(self, depth);
        if !path.insert(self.reference.as_str()) {
            return;
        }
        for child in &self.dependencies {
            child.walk_inner(depth + 1, path, f);
        }
        path.remove(self.reference.as_str());
    }
}

/// A bill of materials.
///
/// `services`, `compositions` and `vulnerabilities` are carried opaquely:
/// nothing in this crate interprets them beyond dropping them when an older
/// specification version cannot hold them.
#[derive(Debug, Clone, PartialEq)]
pub struct Bom {
    pub spec_version: SpecVersion,
    pub serial_number: Option<String>,
    pub version: Option<i32>,
    pub metadata: Option<Metadata>,
    pub components: Vec<Component>,
    pub external_references: Vec<ExternalReference>,
    pub dependencies: Vec<Dependency>,
    pub services: Vec<serde_json::Value>,
    pub compositions: Vec<serde_json::Value>,
    pub vulnerabilities: Vec<serde_json::Value>,
}

impl Default for Bom {
    fn default() -> Self {
        Self {
            spec_version: SpecVersion::CANONICAL,
            serial_number: None,
            version: Some(1),
            metadata: None,
            components: Vec::new(),
            external_references: Vec::new(),
            dependencies: Vec::new(),
            services: Vec::new(),
            compositions: Vec::new(),
            vulnerabilities: Vec::new(),
        }
    }
}

impl Bom {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The subject component, if the document names one.
    #[must_use]
    pub fn subject(&self) -> Option<&Component> {
        self.metadata.as_ref().and_then(|m| m.component.as_ref())
    }

    /// Metadata, created on first use.
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        self.metadata.get_or_insert_with(Metadata::default)
    }

    /// Every component in document order, nested ones after their parent.
    /// The subject component is not included.
    #[must_use]
    pub fn all_components(&self) -> Vec<&Component> {
        self.components.iter().flat_map(Component::flatten).collect()
    }

    /// Give the document a fresh identity: new `urn:uuid` serial, version 1.
    pub fn reset_identity(&mut self) {
        self.serial_number = Some(new_serial_number());
        self.version = Some(1);
    }
}

/// A fresh `urn:uuid:` serial number.
#[must_use]
pub fn new_serial_number() -> String {
    format!("urn:uuid:{}", uuid::Uuid::new_v4())
}
