//! Structural BOM validation.
//!
//! Not a schema validator: a document is parsed with the regular codecs and
//! then checked against the rules the schemas encode that matter in
//! practice. Field legality per version comes from the downgrade chain, so
//! the validator and the writer can never disagree about what a version
//! allows.

use crate::codec::decode_raw;
use crate::downgrade::unsupported_fields;
use crate::error::{BomError, Result};
use crate::formats::ValidateFormat;
use crate::model::{Bom, Component, LicenseChoice, LicenseIdentity, SpecVersion};
use packageurl::PackageUrl;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::LazyLock;

static SERIAL_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^urn:uuid:[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("static regex")
});

static HEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]+$").expect("static regex"));

/// Verdict for one format and version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub messages: Vec<String>,
}

impl ValidationResult {
    fn from_messages(messages: Vec<String>) -> Self {
        Self {
            valid: messages.is_empty(),
            messages,
        }
    }
}

/// What [`validate`] checked and what it found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub format: ValidateFormat,
    /// The version validated against: the requested one, or the version
    /// that passed when probing. `None` when no probe passed.
    pub version: Option<SpecVersion>,
    pub result: ValidationResult,
}

/// Versions each format can be validated at, newest first.
#[must_use]
pub fn probe_order(format: ValidateFormat) -> &'static [SpecVersion] {
    match format {
        ValidateFormat::Xml => &[
            SpecVersion::V1_5,
            SpecVersion::V1_4,
            SpecVersion::V1_3,
            SpecVersion::V1_2,
            SpecVersion::V1_1,
            SpecVersion::V1_0,
        ],
        ValidateFormat::Json => &[
            SpecVersion::V1_5,
            SpecVersion::V1_4,
            SpecVersion::V1_3,
            SpecVersion::V1_2,
        ],
        ValidateFormat::Autodetect => &[],
    }
}

fn schema_name(format: ValidateFormat) -> &'static str {
    match format {
        ValidateFormat::Xml => "XML",
        _ => "JSON",
    }
}

/// Validate `bytes` as `format`.
///
/// With a `version` the document must declare exactly that version and
/// satisfy it. Without one, versions are tried newest first until one
/// passes.
pub fn validate(
    bytes: &[u8],
    format: ValidateFormat,
    version: Option<SpecVersion>,
) -> Result<ValidationOutcome> {
    let probes = probe_order(format);
    if probes.is_empty() {
        return Err(BomError::parameter(format!(
            "Unable to validate {format} input, please specify a value for --input-format"
        )));
    }
    if let Some(v) = version {
        if !probes.contains(&v) {
            return Err(BomError::unsupported(format.as_str(), Some(v.to_string())));
        }
    }

    let decoded = decode_raw(bytes, format.as_bom_format());

    if let Some(v) = version {
        let result = match &decoded {
            Ok(bom) => check(bom, v),
            Err(e) => ValidationResult::from_messages(vec![e.to_string()]),
        };
        return Ok(ValidationOutcome {
            format,
            version: Some(v),
            result,
        });
    }

    let bom = match decoded {
        Ok(bom) => bom,
        Err(e) => {
            return Ok(ValidationOutcome {
                format,
                version: None,
                result: ValidationResult {
                    valid: false,
                    messages: vec![
                        e.to_string(),
                        format!("Unable to validate against any {} schemas.", schema_name(format)),
                    ],
                },
            })
        }
    };

    let mut declared_messages = Vec::new();
    for &probe in probes {
        let result = check(&bom, probe);
        tracing::debug!("Probed {format} {probe}: valid={}", result.valid);
        if result.valid {
            return Ok(ValidationOutcome {
                format,
                version: Some(probe),
                result,
            });
        }
        if probe == bom.spec_version {
            declared_messages = result.messages;
        }
    }

    declared_messages.push(format!(
        "Unable to validate against any {} schemas.",
        schema_name(format)
    ));
    Ok(ValidationOutcome {
        format,
        version: None,
        result: ValidationResult {
            valid: false,
            messages: declared_messages,
        },
    })
}

/// Every rule, for a document already decoded at its declared version.
#[must_use]
pub fn check(bom: &Bom, version: SpecVersion) -> ValidationResult {
    if bom.spec_version != version {
        return ValidationResult::from_messages(vec![format!(
            "Document declares specification version {}, expected {version}.",
            bom.spec_version
        )]);
    }

    // Includes the mandatory component version before 1.4.
    let mut messages: Vec<String> = unsupported_fields(bom, version)
        .iter()
        .map(ToString::to_string)
        .collect();

    if let Some(serial) = &bom.serial_number {
        if !SERIAL_NUMBER.is_match(serial) {
            messages.push(format!("serialNumber: '{serial}' is not a urn:uuid"));
        }
    }

    let mut refs = HashSet::new();
    let mut visit = |component: &Component, path: &str, messages: &mut Vec<String>| {
        check_component(component, path, messages);
        if let Some(bom_ref) = &component.bom_ref {
            if !refs.insert(bom_ref.clone()) {
                messages.push(format!("{path}.bom-ref: '{bom_ref}' is not unique"));
            }
        }
    };
    if let Some(subject) = bom.subject() {
        for_each_nested(subject, "metadata.component", &mut |c, p| visit(c, p, &mut messages));
    }
    for (i, component) in bom.components.iter().enumerate() {
        for_each_nested(component, &format!("components[{i}]"), &mut |c, p| {
            visit(c, p, &mut messages);
        });
    }
    for service in &bom.services {
        if let Some(bom_ref) = service.get("bom-ref").and_then(|r| r.as_str()) {
            refs.insert(bom_ref.to_string());
        }
    }

    for (i, root) in bom.dependencies.iter().enumerate() {
        root.walk(&mut |dependency, _| {
            if !refs.contains(&dependency.reference) {
                messages.push(format!(
                    "dependencies[{i}]: reference '{}' does not match any bom-ref",
                    dependency.reference
                ));
            }
        });
    }

    ValidationResult::from_messages(messages)
}

fn for_each_nested<F>(component: &Component, path: &str, f: &mut F)
where
    F: FnMut(&Component, &str),
{
    f(component, path);
    for (i, child) in component.components.iter().enumerate() {
        for_each_nested(child, &format!("{path}.components[{i}]"), f);
    }
}

fn check_component(component: &Component, path: &str, messages: &mut Vec<String>) {
    if component.name.trim().is_empty() {
        messages.push(format!("{path}.name: must not be empty"));
    }

    for (i, hash) in component.hashes.iter().enumerate() {
        let content = hash.content.as_str();
        let well_formed = HEX.is_match(content)
            && match hash.alg.hex_len() {
                Some(len) => content.len() == len,
                None => matches!(content.len(), 64 | 96 | 128),
            };
        if !well_formed {
            messages.push(format!(
                "{path}.hashes[{i}]: '{content}' is not a valid {} digest",
                hash.alg
            ));
        }
    }

    if let Some(purl) = &component.purl {
        if let Err(e) = PackageUrl::from_str(purl) {
            messages.push(format!("{path}.purl: '{purl}' is not a package URL ({e})"));
        }
    }

    for (i, choice) in component.licenses.iter().enumerate() {
        match choice {
            LicenseChoice::License(license) => {
                if let LicenseIdentity::Id(id) = &license.identity {
                    if spdx::license_id(id).is_none() {
                        messages.push(format!(
                            "{path}.licenses[{i}]: '{id}' is not a known SPDX license id"
                        ));
                    }
                }
            }
            LicenseChoice::Expression(expression) => {
                if let Err(e) = spdx::Expression::parse(expression) {
                    messages.push(format!(
                        "{path}.licenses[{i}]: '{expression}' is not a valid SPDX expression ({})",
                        e.reason
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentType, Dependency, Hash, HashAlgorithm, License, Scope};

    const SERIAL: &str = "urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79";

    fn json(spec: &str, components: &str) -> Vec<u8> {
        format!(
            r#"{{"bomFormat":"CycloneDX","specVersion":"{spec}","serialNumber":"{SERIAL}","version":1,"components":{components}}}"#
        )
        .into_bytes()
    }

    fn valid_bom() -> Bom {
        let mut bom = Bom::new();
        bom.serial_number = Some(SERIAL.to_string());
        let mut c = Component::new(ComponentType::Library, "acme")
            .with_version("1.0")
            .with_bom_ref("acme");
        c.purl = Some("pkg:cargo/acme@1.0".to_string());
        c.licenses = vec![
            LicenseChoice::License(License::spdx("MIT")),
            LicenseChoice::Expression("Apache-2.0 OR MIT".to_string()),
        ];
        c.hashes = vec![Hash::new(HashAlgorithm::Sha1, "a".repeat(40))];
        bom.components.push(c);
        bom.dependencies.push(Dependency::new("acme"));
        bom
    }

    #[test]
    fn test_valid_document_passes() {
        let result = check(&valid_bom(), SpecVersion::V1_5);
        assert!(result.valid, "{:?}", result.messages);
    }

    #[test]
    fn test_each_rule_reports() {
        let mut bom = valid_bom();
        bom.serial_number = Some("not-a-urn".to_string());
        let c = &mut bom.components[0];
        c.purl = Some("acme".to_string());
        c.hashes[0].content = "xyz".to_string();
        c.licenses[0] = LicenseChoice::License(License::spdx("Not-A-License"));
        c.licenses[1] = LicenseChoice::Expression("MIT AND (".to_string());
        let mut dup = Component::new(ComponentType::Library, "").with_bom_ref("acme");
        dup.version = Some("1".to_string());
        bom.components.push(dup);
        bom.dependencies.push(Dependency::new("ghost"));

        let result = check(&bom, SpecVersion::V1_5);
        assert!(!result.valid);
        let all = result.messages.join("\n");
        for needle in [
            "serialNumber",
            "components[0].purl",
            "components[0].hashes[0]",
            "'Not-A-License' is not a known SPDX license id",
            "components[0].licenses[1]",
            "components[1].name: must not be empty",
            "components[1].bom-ref: 'acme' is not unique",
            "reference 'ghost'",
        ] {
            assert!(all.contains(needle), "missing '{needle}' in:\n{all}");
        }
    }

    #[test]
    fn test_field_legality_follows_version() {
        let mut bom = valid_bom();
        bom.spec_version = SpecVersion::V1_1;
        bom.dependencies.clear();
        bom.components[0].scope = Some(Scope::Excluded);
        let result = check(&bom, SpecVersion::V1_1);
        assert!(!result.valid);
        assert!(result.messages.iter().any(|m| m.contains("components[0].scope")));
    }

    #[test]
    fn test_declared_version_must_match() {
        let outcome = validate(&json("1.4", "[]"), ValidateFormat::Json, Some(SpecVersion::V1_5)).unwrap();
        assert!(!outcome.result.valid);
        assert_eq!(
            outcome.result.messages,
            ["Document declares specification version 1.4, expected 1.5."]
        );
    }

    #[test]
    fn test_probing_finds_the_declared_version() {
        let bytes = json("1.3", r#"[{"type":"library","name":"a","version":"1"}]"#);
        let outcome = validate(&bytes, ValidateFormat::Json, None).unwrap();
        assert!(outcome.result.valid);
        assert_eq!(outcome.version, Some(SpecVersion::V1_3));
    }

    #[test]
    fn test_probing_failure_message() {
        let bytes = json("1.5", r#"[{"type":"library","name":""}]"#);
        let outcome = validate(&bytes, ValidateFormat::Json, None).unwrap();
        assert!(!outcome.result.valid);
        assert_eq!(outcome.version, None);
        assert_eq!(
            outcome.result.messages.last().map(String::as_str),
            Some("Unable to validate against any JSON schemas.")
        );

        let outcome = validate(b"<not-a-bom", ValidateFormat::Xml, None).unwrap();
        assert_eq!(
            outcome.result.messages.last().map(String::as_str),
            Some("Unable to validate against any XML schemas.")
        );
    }

    #[test]
    fn test_unsupported_requests() {
        let err = validate(b"{}", ValidateFormat::Autodetect, None).unwrap_err();
        assert_eq!(
            err.exit_code(),
            crate::pipeline::exit_codes::PARAMETER_VALIDATION_ERROR
        );
        let err = validate(b"{}", ValidateFormat::Json, Some(SpecVersion::V1_1)).unwrap_err();
        assert_eq!(err.exit_code(), crate::pipeline::exit_codes::UNSUPPORTED_FORMAT);
    }

    #[test]
    fn test_cyclic_dependencies_terminate() {
        let mut bom = valid_bom();
        bom.components.push(Component::new(ComponentType::Library, "b").with_version("1").with_bom_ref("b"));
        bom.dependencies = vec![Dependency::new("acme").with_dependencies(vec![Dependency::new("b")
            .with_dependencies(vec![Dependency::new("acme")])])];
        assert!(check(&bom, SpecVersion::V1_5).valid);
    }
}
