//! Component version diff between two BOMs.
//!
//! Components are compared by identity (`"{group}:{name}"`) and then by
//! version. Nested components take part like top-level ones; the subject
//! component does not.
//!
//! ```
//! use bom_tools::diff::component_version_diff;
//! use bom_tools::model::{Bom, Component, ComponentType};
//!
//! let mut from = Bom::new();
//! from.components.push(Component::new(ComponentType::Library, "serde").with_version("1.0.100"));
//! let mut to = Bom::new();
//! to.components.push(Component::new(ComponentType::Library, "serde").with_version("1.0.200"));
//!
//! let result = component_version_diff(&from, &to);
//! let item = &result[":serde"];
//! assert_eq!(item.removed[0].version.as_deref(), Some("1.0.100"));
//! assert_eq!(item.added[0].version.as_deref(), Some("1.0.200"));
//! ```

use crate::model::{Bom, Component};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Diff entries keyed by component identity, in first-seen order.
pub type DiffResult = IndexMap<String, DiffItem>;

/// Versions of one component identity, bucketed by what happened to them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffItem {
    pub added: Vec<Component>,
    pub removed: Vec<Component>,
    pub unchanged: Vec<Component>,
}

impl DiffItem {
    /// True when something was added or removed under this identity.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }

    /// Number of components across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.unchanged.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of `diff`. Sections are `None` when the comparison was not run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomDiff {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_versions: Option<DiffResult>,
}

/// Run the requested comparisons.
#[must_use]
pub fn diff(from: &Bom, to: &Bom, component_versions: bool) -> BomDiff {
    BomDiff {
        component_versions: component_versions.then(|| component_version_diff(from, to)),
    }
}

/// A flattened copy: diff entries do not carry their nested components,
/// those are listed under their own identity.
fn detached(component: &Component) -> Component {
    Component {
        components: Vec::new(),
        ..component.clone()
    }
}

fn group_by_identity(bom: &Bom, keys: &mut IndexSet<String>) -> IndexMap<String, Vec<Component>> {
    let mut grouped: IndexMap<String, Vec<Component>> = IndexMap::new();
    for component in bom.all_components() {
        let key = component.identity_key();
        keys.insert(key.clone());
        grouped.entry(key).or_default().push(detached(component));
    }
    grouped
}

/// Diff component versions of `from` against `to`.
///
/// Every (group, name, version) present on both sides is unchanged and
/// drops out of both sides, duplicates included. What remains on the `to`
/// side is added and what remains on the `from` side is removed. Each
/// triple is listed once, in the bucket it lands in.
#[must_use]
pub fn component_version_diff(from: &Bom, to: &Bom) -> DiffResult {
    let mut keys = IndexSet::new();
    let mut from_groups = group_by_identity(from, &mut keys);
    let mut to_groups = group_by_identity(to, &mut keys);

    let mut result = DiffResult::with_capacity(keys.len());
    for key in keys {
        let old = from_groups.swap_remove(&key).unwrap_or_default();
        let mut new = to_groups.swap_remove(&key).unwrap_or_default();
        let mut item = DiffItem::default();

        for component in old {
            if new.iter().any(|c| c.same_version_as(&component)) {
                new.retain(|c| !c.same_version_as(&component));
                item.unchanged.push(component);
            } else if !item.unchanged.iter().any(|c| c.same_version_as(&component)) {
                push_once(&mut item.removed, component);
            }
        }
        for component in new {
            push_once(&mut item.added, component);
        }

        result.insert(key, item);
    }

    tracing::debug!(
        "Diffed {} component identities, {} changed",
        result.len(),
        result.values().filter(|i| i.has_changes()).count()
    );
    result
}

fn push_once(bucket: &mut Vec<Component>, component: Component) {
    if !bucket.iter().any(|c| c.same_version_as(&component)) {
        bucket.push(component);
    }
}
