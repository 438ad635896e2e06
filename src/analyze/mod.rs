//! BOM analysis.
//!
//! Currently one check: components that appear with more than one version.

use crate::model::{Bom, Component};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Result of `analyze`. Sections are `None` when the check was not run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_component_versions: Option<IndexMap<String, Vec<Component>>>,
}

/// Run the requested checks.
#[must_use]
pub fn analyze(bom: &Bom, multiple_component_versions: bool) -> AnalysisResult {
    AnalysisResult {
        multiple_component_versions: multiple_component_versions
            .then(|| self::multiple_component_versions(bom)),
    }
}

/// Identities (`"{group}:{name}"`) present with more than one distinct
/// version, nested components included.
///
/// Each list holds one component per distinct version. Lists are sorted
/// ascending by semver when every version parses as semver, otherwise they
/// keep document order.
#[must_use]
pub fn multiple_component_versions(bom: &Bom) -> IndexMap<String, Vec<Component>> {
    let mut grouped: IndexMap<String, Vec<Component>> = IndexMap::new();
    for component in bom.all_components() {
        let versions = grouped.entry(component.identity_key()).or_default();
        if !versions.iter().any(|c| c.version == component.version) {
            versions.push(Component {
                components: Vec::new(),
                ..component.clone()
            });
        }
    }

    grouped.retain(|_, versions| versions.len() > 1);
    for versions in grouped.values_mut() {
        sort_by_semver(versions);
    }
    tracing::debug!("{} components with multiple versions", grouped.len());
    grouped
}

fn sort_by_semver(components: &mut [Component]) {
    let parsed: Option<Vec<semver::Version>> = components
        .iter()
        .map(|c| c.version.as_deref().and_then(|v| semver::Version::parse(v).ok()))
        .collect();
    let Some(parsed) = parsed else {
        return;
    };
    let mut keyed: Vec<(semver::Version, Component)> =
        parsed.into_iter().zip(components.iter().cloned()).collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    for (slot, (_, component)) in components.iter_mut().zip(keyed) {
        *slot = component;
    }
}
