//! Flat merge: plain concatenation.

use crate::model::Bom;

/// Concatenate `boms` in order.
///
/// Components, dependencies, services, compositions, vulnerabilities,
/// external references and metadata tools are appended as they are. Nothing
/// is de-duplicated and no reference is rewritten. The result has no subject
/// and no serial number.
#[must_use]
pub fn flat_merge(boms: &[Bom]) -> Bom {
    let mut result = Bom::new();
    for bom in boms {
        if let Some(tools) = bom.metadata.as_ref().map(|m| &m.tools) {
            if !tools.is_empty() {
                result.metadata_mut().tools.extend(tools.iter().cloned());
            }
        }
        result.components.extend(bom.components.iter().cloned());
        result.dependencies.extend(bom.dependencies.iter().cloned());
        result.services.extend(bom.services.iter().cloned());
        result.compositions.extend(bom.compositions.iter().cloned());
        result.vulnerabilities.extend(bom.vulnerabilities.iter().cloned());
        result
            .external_references
            .extend(bom.external_references.iter().cloned());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Component, ComponentType, Dependency, Tool};

    fn bom(names: &[&str]) -> Bom {
        let mut bom = Bom::new();
        bom.serial_number = Some(crate::model::new_serial_number());
        for name in names {
            bom.components
                .push(Component::new(ComponentType::Library, *name).with_bom_ref(*name));
            bom.dependencies.push(Dependency::new(*name));
        }
        bom
    }

    fn names(bom: &Bom) -> Vec<&str> {
        bom.components.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_concatenates_in_order_without_dedup() {
        let merged = flat_merge(&[bom(&["a", "b"]), bom(&["b", "c"])]);
        assert_eq!(names(&merged), ["a", "b", "b", "c"]);
        assert_eq!(merged.dependencies.len(), 4);
        assert!(merged.serial_number.is_none());
        assert!(merged.metadata.is_none());
    }

    #[test]
    fn test_empty_input_is_identity() {
        let a = bom(&["a"]);
        let merged = flat_merge(&[Bom::new(), a.clone(), Bom::new()]);
        assert_eq!(merged.components, a.components);
        assert_eq!(merged.dependencies, a.dependencies);
        assert_eq!(flat_merge(&[]), Bom::new());
    }

    #[test]
    fn test_associative() {
        let (a, b, c) = (bom(&["a"]), bom(&["b", "b2"]), bom(&["c"]));
        let left = flat_merge(&[flat_merge(&[a.clone(), b.clone()]), c.clone()]);
        let right = flat_merge(&[a, flat_merge(&[b, c])]);
        assert_eq!(left, right);
    }

    #[test]
    fn test_tools_and_pass_through_sections() {
        let mut a = bom(&[]);
        a.metadata_mut().tools.push(Tool {
            name: Some("one".to_string()),
            ..Tool::default()
        });
        a.services.push(serde_json::json!({"name": "api"}));
        let mut b = bom(&[]);
        b.metadata_mut().tools.push(Tool {
            name: Some("two".to_string()),
            ..Tool::default()
        });
        b.vulnerabilities.push(serde_json::json!({"id": "CVE-1"}));

        let merged = flat_merge(&[a, b]);
        let tools: Vec<_> = merged
            .metadata
            .unwrap()
            .tools
            .into_iter()
            .filter_map(|t| t.name)
            .collect();
        assert_eq!(tools, ["one", "two"]);
        assert_eq!(merged.services.len(), 1);
        assert_eq!(merged.vulnerabilities.len(), 1);
    }
}
