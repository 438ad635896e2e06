//! Hierarchical merge: every input becomes a child of one subject.

use crate::model::{Bom, Component, ComponentType, Dependency};
use serde_json::Value;

/// `"{group}.{name}@{version}"`, or `"{name}@{version}"` without a group.
/// The `@{version}` part is left out when there is no version.
#[must_use]
pub fn bom_ref_namespace(component: &Component) -> String {
    let mut namespace = match &component.group {
        Some(group) => format!("{group}.{}", component.name),
        None => component.name.clone(),
    };
    if let Some(version) = &component.version {
        namespace.push('@');
        namespace.push_str(version);
    }
    namespace
}

fn namespaced(namespace: &str, reference: &str) -> String {
    format!("{namespace}:{reference}")
}

fn namespace_components(namespace: &str, components: &mut [Component]) {
    for component in components {
        if let Some(bom_ref) = &component.bom_ref {
            component.bom_ref = Some(namespaced(namespace, bom_ref));
        }
        namespace_components(namespace, &mut component.components);
    }
}

/// Namespace every reference, except the input's own subject, which is
/// pointed at the child that replaces it.
fn namespace_dependencies(
    namespace: &str,
    subject: Option<(&str, &str)>,
    dependencies: &mut [Dependency],
) {
    for dependency in dependencies {
        dependency.reference = match subject {
            Some((from, to)) if dependency.reference == from => to.to_string(),
            _ => namespaced(namespace, &dependency.reference),
        };
        namespace_dependencies(namespace, subject, &mut dependency.dependencies);
    }
}

/// Prefix the string at `value[key]`.
fn namespace_field(namespace: &str, value: &mut Value, key: &str) {
    if let Some(Value::String(reference)) = value.get_mut(key) {
        *reference = namespaced(namespace, reference);
    }
}

/// Prefix every string in the array at `value[key]`.
fn namespace_list(namespace: &str, value: &mut Value, key: &str) {
    if let Some(Value::Array(references)) = value.get_mut(key) {
        for reference in references {
            if let Value::String(r) = reference {
                *r = namespaced(namespace, r);
            }
        }
    }
}

fn namespace_services(namespace: &str, services: &mut [Value]) {
    for service in services {
        namespace_field(namespace, service, "bom-ref");
        if let Some(Value::Array(nested)) = service.get_mut("services") {
            namespace_services(namespace, nested);
        }
    }
}

fn namespace_compositions(namespace: &str, compositions: &mut [Value]) {
    for composition in compositions {
        namespace_list(namespace, composition, "assemblies");
        namespace_list(namespace, composition, "dependencies");
    }
}

fn namespace_vulnerabilities(namespace: &str, vulnerabilities: &mut [Value]) {
    for vulnerability in vulnerabilities {
        namespace_field(namespace, vulnerability, "bom-ref");
        if let Some(Value::Array(affects)) = vulnerability.get_mut("affects") {
            for target in affects {
                namespace_field(namespace, target, "ref");
            }
        }
    }
}

/// The child standing in for input number `index` (zero based).
///
/// An input without a subject is represented by an application named after
/// its serial number, or `bom-{index + 1}` when it has none.
fn child_component(bom: &Bom, index: usize) -> Component {
    bom.subject().cloned().unwrap_or_else(|| {
        let name = bom
            .serial_number
            .clone()
            .unwrap_or_else(|| format!("bom-{}", index + 1));
        tracing::debug!("Input {} has no subject, using '{name}'", index + 1);
        Component::new(ComponentType::Application, name)
    })
}

/// Merge `boms` under `subject`.
///
/// For each input, its subject (see [`child_component`] for inputs without
/// one) becomes a top-level component of the result, with the input's
/// components nested beneath it. Every bom-ref below the child and every
/// dependency reference of the input is prefixed with the child's
/// [`bom_ref_namespace`], so identical references from different inputs
/// cannot collide. References to the input's own subject are pointed at the
/// child instead; when the input has no dependency entry for its subject,
/// the child gets one listing the input's top-level components. The subject
/// depends on every child.
#[must_use]
pub fn hierarchical_merge(boms: &[Bom], subject: Option<Component>) -> Bom {
    let mut result = Bom::new();
    let subject = subject.map(|mut s| {
        if s.bom_ref.is_none() {
            s.bom_ref = Some(bom_ref_namespace(&s));
        }
        s
    });

    let mut children = Vec::with_capacity(boms.len());
    for (index, bom) in boms.iter().enumerate() {
        let mut child = child_component(bom, index);
        let namespace = bom_ref_namespace(&child);
        child.components.extend(bom.components.iter().cloned());
        namespace_components(&namespace, &mut child.components);
        let child_ref = child.bom_ref.get_or_insert_with(|| namespace.clone()).clone();
        children.push(Dependency::new(child_ref.clone()));

        let subject_ref = bom.subject().and_then(|s| s.bom_ref.as_deref());
        let mut dependencies = bom.dependencies.clone();
        namespace_dependencies(
            &namespace,
            subject_ref.map(|from| (from, child_ref.as_str())),
            &mut dependencies,
        );
        // the child owns the input's top-level components in the graph
        if !dependencies.iter().any(|d| d.reference == child_ref) {
            let owned = child
                .components
                .iter()
                .filter_map(|c| c.bom_ref.clone())
                .map(Dependency::new)
                .collect();
            dependencies.push(Dependency::new(child_ref.clone()).with_dependencies(owned));
        }
        result.components.push(child);
        result.dependencies.extend(dependencies);

        let mut services = bom.services.clone();
        namespace_services(&namespace, &mut services);
        result.services.extend(services);

        let mut compositions = bom.compositions.clone();
        namespace_compositions(&namespace, &mut compositions);
        result.compositions.extend(compositions);

        let mut vulnerabilities = bom.vulnerabilities.clone();
        namespace_vulnerabilities(&namespace, &mut vulnerabilities);
        result.vulnerabilities.extend(vulnerabilities);

        result
            .external_references
            .extend(bom.external_references.iter().cloned());
        if let Some(metadata) = &bom.metadata {
            if !metadata.tools.is_empty() {
                result.metadata_mut().tools.extend(metadata.tools.iter().cloned());
            }
        }
    }

    if let Some(subject) = subject {
        if let Some(subject_ref) = subject.bom_ref.clone() {
            result
                .dependencies
                .push(Dependency::new(subject_ref).with_dependencies(children));
        }
        result.metadata_mut().component = Some(subject);
    }
    result
}
