//! Markdown summary of a BOM.
//!
//! Output-only: there is no reader for this format.

use super::escape::{escape_markdown_inline, escape_markdown_list};
use crate::model::{Bom, Component, Dependency};
use chrono::SecondsFormat;
use std::fmt::Write;

/// Render `bom` as a Markdown document.
#[must_use]
pub fn to_markdown(bom: &Bom) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_document(bom, &mut out);
    out
}

fn write_document(bom: &Bom, out: &mut String) -> std::fmt::Result {
    match bom.subject() {
        Some(subject) => writeln!(
            out,
            "# {} ({})",
            escape_markdown_inline(&subject.name),
            subject.component_type
        )?,
        None => writeln!(out, "# SBOM")?,
    }
    writeln!(out)?;
    writeln!(
        out,
        "BOM {} CycloneDX {}",
        bom.serial_number.as_deref().unwrap_or_default(),
        bom.spec_version
    )?;
    let timestamp = bom
        .metadata
        .as_ref()
        .and_then(|m| m.timestamp)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true));
    writeln!(
        out,
        "Version {}, Timestamp {}",
        bom.version.map(|v| v.to_string()).unwrap_or_default(),
        timestamp.as_deref().unwrap_or("-")
    )?;
    writeln!(out)?;

    if let Some(metadata) = &bom.metadata {
        if !metadata.tools.is_empty() {
            let tools: Vec<String> = metadata
                .tools
                .iter()
                .map(|t| {
                    escape_markdown_inline(&format!(
                        "{} {} ({})",
                        t.name.as_deref().unwrap_or_default(),
                        t.version.as_deref().unwrap_or_default(),
                        t.vendor.as_deref().unwrap_or_default()
                    ))
                })
                .collect();
            writeln!(out, "BOM done with tools: {}", tools.join(", "))?;
            writeln!(out)?;
        } else if !metadata.authors.is_empty() {
            let authors: Vec<String> = metadata
                .authors
                .iter()
                .filter_map(|a| a.name.as_deref())
                .map(escape_markdown_inline)
                .collect();
            writeln!(out, "BOM authored by: {}", authors.join(", "))?;
            writeln!(out)?;
        }

        if let Some(subject) = &metadata.component {
            write_subject(subject, out)?;
        }
    }

    if !bom.external_references.is_empty() {
        writeln!(out, "## ExternalReferences")?;
        writeln!(out, "not supported yet")?;
        writeln!(out)?;
    }

    if !bom.components.is_empty() {
        writeln!(out, "## Components")?;
        for component in &bom.components {
            write_component(component, out)?;
        }
        writeln!(out)?;
    }

    if !bom.services.is_empty() {
        writeln!(out, "## Services")?;
        writeln!(out, "not supported yet")?;
        writeln!(out)?;
    }

    if !bom.dependencies.is_empty() {
        writeln!(out, "## Dependencies")?;
        let mut path = Vec::new();
        for dependency in &bom.dependencies {
            write_dependency(dependency, 0, &mut path, out)?;
        }
        writeln!(out)?;
    }

    if !bom.compositions.is_empty() {
        writeln!(out, "## Compositions")?;
        writeln!(out, "not supported yet")?;
        writeln!(out)?;
    }

    if !bom.vulnerabilities.is_empty() {
        writeln!(out, "## Vulnerabilities")?;
        writeln!(out, "not supported yet")?;
        writeln!(out)?;
    }
    Ok(())
}

/// ` _group:_ **g** _name:_ **n** _version:_ **v**`
fn write_coordinates(component: &Component, out: &mut String) -> std::fmt::Result {
    if let Some(group) = &component.group {
        write!(out, " _group:_ **{}**", escape_markdown_inline(group))?;
    }
    write!(out, " _name:_ **{}**", escape_markdown_inline(&component.name))?;
    if let Some(version) = &component.version {
        write!(out, " _version:_ **{}**", escape_markdown_inline(version))?;
    }
    Ok(())
}

fn write_subject(subject: &Component, out: &mut String) -> std::fmt::Result {
    write!(out, ">")?;
    write_coordinates(subject, out)?;
    if let Some(cpe) = &subject.cpe {
        write!(out, " _CPE:_ **{}**", escape_markdown_inline(cpe))?;
    }
    writeln!(out)?;
    if let Some(description) = &subject.description {
        writeln!(out, ">")?;
        writeln!(out, "> {}", escape_markdown_inline(description))?;
    }
    writeln!(out)?;

    if !subject.external_references.is_empty() {
        let links: Vec<String> = subject
            .external_references
            .iter()
            .map(|r| format!("[{}]({})", r.reference_type, r.url))
            .collect();
        writeln!(out, "Component external references: {}", links.join(", "))?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_component(component: &Component, out: &mut String) -> std::fmt::Result {
    write!(out, "1. {}", component.component_type)?;
    write_coordinates(component, out)?;
    if let Some(scope) = component.scope {
        write!(out, " _scope:_ {scope}")?;
    }
    if let Some(purl) = &component.purl {
        writeln!(out, " \\")?;
        write!(out, "   _purl:_ {}", escape_markdown_list(purl))?;
    }
    writeln!(out)
}

/// Nested `- ref` list. A reference already on the current path is printed
/// once more and not descended into.
fn write_dependency<'a>(
    dependency: &'a Dependency,
    depth: usize,
    path: &mut Vec<&'a str>,
    out: &mut String,
) -> std::fmt::Result {
    writeln!(
        out,
        "{}- {}",
        "  ".repeat(depth),
        escape_markdown_list(&dependency.reference)
    )?;
    if path.contains(&dependency.reference.as_str()) {
        return Ok(());
    }
    path.push(&dependency.reference);
    for child in &dependency.dependencies {
        write_dependency(child, depth + 1, path, out)?;
    }
    path.pop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentType, Scope, Tool};

    fn sample() -> Bom {
        let mut bom = Bom::new();
        bom.serial_number = Some("urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79".to_string());
        let metadata = bom.metadata_mut();
        metadata.tools.push(Tool {
            vendor: Some("acme".to_string()),
            name: Some("scanner".to_string()),
            version: Some("1.0".to_string()),
            hashes: Vec::new(),
        });
        let mut subject = Component::new(ComponentType::Application, "webapp").with_version("2.0");
        subject.description = Some("The *main* app".to_string());
        metadata.component = Some(subject);

        let mut lib = Component::new(ComponentType::Library, "left_pad")
            .with_group("npm")
            .with_version("1.3.0");
        lib.scope = Some(Scope::Required);
        lib.purl = Some("pkg:npm/left_pad@1.3.0".to_string());
        bom.components.push(lib);
        bom.dependencies = vec![Dependency::new("webapp")
            .with_dependencies(vec![Dependency::new("pkg:npm/left_pad@1.3.0")])];
        bom
    }

    #[test]
    fn test_markdown_document() {
        let md = to_markdown(&sample());
        let expected = "\
# webapp (application)

BOM urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79 CycloneDX 1.5
Version 1, Timestamp -

BOM done with tools: scanner 1.0 (acme)

> _name:_ **webapp** _version:_ **2.0**
>
> The \\*main\\* app

## Components
1. library _group:_ **npm** _name:_ **left\\_pad** _version:_ **1.3.0** _scope:_ required \\
   _purl:_ pkg:npm/left\\_pad@1.3.0

## Dependencies
- webapp
  - pkg:npm/left\\_pad@1.3.0

";
        assert_eq!(md, expected);
    }

    #[test]
    fn test_empty_bom() {
        let md = to_markdown(&Bom::new());
        assert!(md.starts_with("# SBOM\n"));
        assert!(!md.contains("## Components"));
    }

    #[test]
    fn test_unsupported_sections_are_flagged() {
        let mut bom = Bom::new();
        bom.services.push(serde_json::json!({"name": "api"}));
        bom.vulnerabilities.push(serde_json::json!({"id": "CVE-1"}));
        let md = to_markdown(&bom);
        assert!(md.contains("## Services\nnot supported yet\n"));
        assert!(md.contains("## Vulnerabilities\nnot supported yet\n"));
        assert!(!md.contains("## Compositions"));
    }

    #[test]
    fn test_dependency_cycle_terminates() {
        let mut bom = Bom::new();
        bom.dependencies = vec![Dependency::new("a").with_dependencies(vec![Dependency::new("b")
            .with_dependencies(vec![Dependency::new("a")
                .with_dependencies(vec![Dependency::new("b")])])])];
        let md = to_markdown(&bom);
        assert!(md.contains("- a\n  - b\n    - a\n\n"));
    }
}
