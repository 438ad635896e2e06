//! Rename a bom-ref and every reference to it.

use super::touch_metadata;
use crate::model::{Bom, Component, Dependency};
use serde_json::Value;

/// Places rewritten by [`rename_bom_ref`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameReport {
    /// Entities whose own bom-ref was renamed
    pub definitions: usize,
    /// Dependency edges and other back-references rewritten
    pub references: usize,
}

impl RenameReport {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.definitions + self.references
    }

    /// True when `old` was not mentioned anywhere.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

fn rename_in_components(components: &mut [Component], old: &str, new: &str) -> usize {
    let mut count = 0;
    for component in components {
        if component.bom_ref.as_deref() == Some(old) {
            component.bom_ref = Some(new.to_string());
            count += 1;
        }
        count += rename_in_components(&mut component.components, old, new);
    }
    count
}

/// The tree is owned, so recursion ends even when a reference repeats
/// along a path.
fn rename_in_dependencies(dependencies: &mut [Dependency], old: &str, new: &str) -> usize {
    let mut count = 0;
    for dependency in dependencies {
        if dependency.reference == old {
            dependency.reference = new.to_string();
            count += 1;
        }
        count += rename_in_dependencies(&mut dependency.dependencies, old, new);
    }
    count
}

fn rename_string(value: Option<&mut Value>, old: &str, new: &str) -> usize {
    match value {
        Some(Value::String(s)) if s == old => {
            *s = new.to_string();
            1
        }
        _ => 0,
    }
}

fn rename_list(value: Option<&mut Value>, old: &str, new: &str) -> usize {
    match value {
        Some(Value::Array(items)) => items
            .iter_mut()
            .map(|item| rename_string(Some(item), old, new))
            .sum(),
        _ => 0,
    }
}

fn rename_in_services(services: &mut [Value], old: &str, new: &str) -> usize {
    let mut count = 0;
    for service in services {
        count += rename_string(service.get_mut("bom-ref"), old, new);
        if let Some(Value::Array(nested)) = service.get_mut("services") {
            count += rename_in_services(nested, old, new);
        }
    }
    count
}

/// Rename the entity identified by `old` to `new`, together with every
/// reference to it.
///
/// Covers component bom-refs (the subject and nested components included),
/// dependency references at any depth, service bom-refs, composition
/// assemblies and dependencies, and vulnerability targets. The document then
/// gets a new identity, since it is no longer the one its serial named.
pub fn rename_bom_ref(bom: &mut Bom, old: &str, new: &str) -> RenameReport {
    let mut report = RenameReport::default();

    if let Some(subject) = bom.metadata.as_mut().and_then(|m| m.component.as_mut()) {
        report.definitions += rename_in_components(std::slice::from_mut(subject), old, new);
    }
    report.definitions += rename_in_components(&mut bom.components, old, new);
    report.definitions += rename_in_services(&mut bom.services, old, new);
    for vulnerability in &mut bom.vulnerabilities {
        report.definitions += rename_string(vulnerability.get_mut("bom-ref"), old, new);
        if let Some(Value::Array(affects)) = vulnerability.get_mut("affects") {
            for target in affects {
                report.references += rename_string(target.get_mut("ref"), old, new);
            }
        }
    }

    report.references += rename_in_dependencies(&mut bom.dependencies, old, new);
    for composition in &mut bom.compositions {
        report.references += rename_list(composition.get_mut("assemblies"), old, new);
        report.references += rename_list(composition.get_mut("dependencies"), old, new);
    }

    tracing::debug!(
        "Renamed '{old}' to '{new}': {} definitions, {} references",
        report.definitions,
        report.references
    );

    bom.reset_identity();
    touch_metadata(bom);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ComponentType;

    fn sample() -> Bom {
        let mut bom = Bom::new();
        bom.serial_number = Some("urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79".to_string());
        bom.version = Some(4);
        bom.metadata_mut().component =
            Some(Component::new(ComponentType::Application, "app").with_bom_ref("app"));
        let mut parent = Component::new(ComponentType::Library, "parent").with_bom_ref("parent");
        parent
            .components
            .push(Component::new(ComponentType::Library, "old").with_bom_ref("old"));
        bom.components.push(parent);
        bom.dependencies = vec![
            Dependency::new("app").with_dependencies(vec![
                Dependency::new("parent").with_dependencies(vec![Dependency::new("old")]),
            ]),
            Dependency::new("old"),
        ];
        bom
    }

    #[test]
    fn test_renames_definition_and_references() {
        let mut bom = sample();
        let report = rename_bom_ref(&mut bom, "old", "new");
        assert_eq!(
            report,
            RenameReport {
                definitions: 1,
                references: 2
            }
        );
        assert_eq!(bom.components[0].components[0].bom_ref.as_deref(), Some("new"));
        assert_eq!(bom.dependencies[0].dependencies[0].dependencies[0].reference, "new");
        assert_eq!(bom.dependencies[1].reference, "new");
    }

    #[test]
    fn test_subject_can_be_renamed() {
        let mut bom = sample();
        let report = rename_bom_ref(&mut bom, "app", "root");
        assert_eq!(report.total(), 2);
        assert_eq!(bom.subject().and_then(|c| c.bom_ref.as_deref()), Some("root"));
    }

    #[test]
    fn test_unknown_ref_is_reported_empty() {
        let mut bom = sample();
        let before = bom.components.clone();
        let report = rename_bom_ref(&mut bom, "ghost", "x");
        assert!(report.is_empty());
        assert_eq!(bom.components, before);
    }

    #[test]
    fn test_document_gets_new_identity() {
        let mut bom = sample();
        rename_bom_ref(&mut bom, "old", "new");
        assert_eq!(bom.version, Some(1));
        assert_ne!(
            bom.serial_number.as_deref(),
            Some("urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79")
        );
        assert!(bom.metadata.unwrap().timestamp.is_some());
    }

    #[test]
    fn test_pass_through_sections() {
        let mut bom = Bom::new();
        bom.services.push(serde_json::json!({"bom-ref": "old", "name": "svc"}));
        bom.compositions
            .push(serde_json::json!({"aggregate": "complete", "assemblies": ["old", "other"]}));
        bom.vulnerabilities
            .push(serde_json::json!({"id": "CVE-1", "affects": [{"ref": "old"}]}));
        let report = rename_bom_ref(&mut bom, "old", "new");
        assert_eq!(report.definitions, 1);
        assert_eq!(report.references, 2);
        assert_eq!(bom.compositions[0]["assemblies"], serde_json::json!(["new", "other"]));
    }
}
