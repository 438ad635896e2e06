//! BOM I/O adapter.
//!
//! [`deserialize`] and [`serialize`] are the only ways bytes become a
//! [`Bom`] and back. Reading always lifts the document to the canonical
//! version; writing projects a copy onto the requested version first, so
//! callers never see a half-downgraded model.
//!
//! | Format    | Read | Write | Versions  |
//! |-----------|------|-------|-----------|
//! | json      | yes  | yes   | 1.2 - 1.5 |
//! | xml       | yes  | yes   | 1.0 - 1.5 |
//! | protobuf  | yes  | yes   | 1.3 - 1.5 |
//! | csv       | yes  | yes   | n/a       |
//! | spdxtag   | yes  | yes   | n/a       |
//! | spdxjson  | yes  | yes   | n/a       |
//! | markdown  | no   | yes   | n/a       |

mod csv;
mod json;
mod protobuf;
mod xml;

use crate::downgrade::{downgrade, upgrade, DowngradeWarning};
use crate::error::{BomError, Result};
use crate::formats::{BomFormat, ConvertFormat};
use crate::model::{Bom, SpdxVersion, SpecVersion};
use crate::reports::to_markdown;
use crate::spdx::{self, TagValueOptions};

/// Encoded output plus whatever the encoding lost.
#[derive(Debug, Clone)]
pub struct Serialized {
    pub bytes: Vec<u8>,
    pub warnings: Vec<DowngradeWarning>,
}

/// Knobs for [`serialize_with`].
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Schema version for CycloneDX outputs. Canonical when `None`.
    pub spec_version: Option<SpecVersion>,
    /// SPDX version for tag-value output.
    pub spdx_version: SpdxVersion,
    /// Timestamp and document id for SPDX outputs.
    pub tag_value: TagValueOptions,
}

/// Schema versions a CycloneDX encoding can be written at.
#[must_use]
pub const fn supported_versions(format: ConvertFormat) -> Option<(SpecVersion, SpecVersion)> {
    match format {
        ConvertFormat::Json => Some((SpecVersion::V1_2, SpecVersion::V1_5)),
        ConvertFormat::Xml => Some((SpecVersion::V1_0, SpecVersion::V1_5)),
        ConvertFormat::Protobuf => Some((SpecVersion::V1_3, SpecVersion::V1_5)),
        ConvertFormat::Autodetect
        | ConvertFormat::Csv
        | ConvertFormat::SpdxTag
        | ConvertFormat::SpdxJson
        | ConvertFormat::Markdown => None,
    }
}

/// Decode without lifting to the canonical version.
pub(crate) fn decode_raw(bytes: &[u8], format: BomFormat) -> Result<Bom> {
    tracing::debug!("Decoding {} bytes as {format}", bytes.len());
    match format {
        BomFormat::Json => json::decode(bytes),
        BomFormat::Xml => xml::decode(bytes),
        BomFormat::Protobuf => protobuf::decode(bytes),
        BomFormat::Csv => csv::decode(bytes),
        BomFormat::SpdxTag => spdx::read_tag_value(bytes),
        BomFormat::SpdxJson => spdx::read_json(bytes),
        BomFormat::Autodetect => Err(BomError::unsupported(format.as_str(), None)),
    }
}

/// Decode `bytes` as `format` into a canonical-version BOM.
///
/// `Autodetect` is not a format; resolve it from the file name first.
pub fn deserialize(bytes: &[u8], format: BomFormat) -> Result<Bom> {
    let bom = decode_raw(bytes, format)?;
    if bom.spec_version < SpecVersion::CANONICAL {
        tracing::debug!("Read a v{} document", bom.spec_version);
    }
    Ok(upgrade(bom))
}

/// Encode `bom` as `format`, at `version` for CycloneDX formats.
///
/// `bom` itself is never modified.
pub fn serialize(bom: &Bom, format: ConvertFormat, version: Option<SpecVersion>) -> Result<Serialized> {
    serialize_with(
        bom,
        format,
        &WriteOptions {
            spec_version: version,
            ..WriteOptions::default()
        },
    )
}

/// Pass-through content the target encoding has no place for. XML holds
/// services and compositions but not vulnerabilities; protobuf holds none.
fn unsupported_sections(bom: &Bom, format: ConvertFormat, version: SpecVersion) -> Vec<DowngradeWarning> {
    let warning = |path: String, message: String| DowngradeWarning {
        version,
        path,
        message,
    };
    let mut sections = vec![("vulnerabilities", bom.vulnerabilities.len())];
    let mut warnings = Vec::new();
    if format == ConvertFormat::Xml {
        warnings.extend(xml::unwritable_fields(bom).into_iter().map(|path| {
            let message = format!("{path} cannot be written as {format}, dropped");
            warning(path, message)
        }));
    } else {
        sections.push(("services", bom.services.len()));
        sections.push(("compositions", bom.compositions.len()));
    }
    warnings.extend(
        sections
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(section, count)| {
                warning(
                    section.to_string(),
                    format!("{count} {section} cannot be written as {format}, dropped"),
                )
            }),
    );
    warnings
}

/// [`serialize`] with full control over the output.
pub fn serialize_with(bom: &Bom, format: ConvertFormat, options: &WriteOptions) -> Result<Serialized> {
    if let Some((oldest, newest)) = supported_versions(format) {
        let target = options.spec_version.unwrap_or(SpecVersion::CANONICAL);
        if target < oldest || target > newest {
            return Err(BomError::unsupported(
                format.as_str(),
                Some(target.to_string()),
            ));
        }

        let projected = downgrade(upgrade(bom.clone()), target);
        let mut warnings = projected.warnings;
        let out = projected.bom;

        let bytes = match format {
            ConvertFormat::Json => json::encode(&out)?,
            ConvertFormat::Xml => {
                warnings.extend(unsupported_sections(&out, format, target));
                xml::encode(&out)?
            }
            _ => {
                warnings.extend(unsupported_sections(&out, format, target));
                protobuf::encode(&out)
            }
        };
        tracing::debug!("Encoded {format} v{target}: {} bytes", bytes.len());
        return Ok(Serialized { bytes, warnings });
    }

    if let Some(version) = options.spec_version {
        tracing::debug!("{format} output has no schema version, ignoring v{version}");
    }
    let bytes = match format {
        ConvertFormat::Csv => csv::encode(bom)?,
        ConvertFormat::SpdxTag => {
            spdx::write_tag_value(bom, options.spdx_version, &options.tag_value).into_bytes()
        }
        ConvertFormat::SpdxJson => spdx::write_json(bom, &options.tag_value)?,
        ConvertFormat::Markdown => to_markdown(bom).into_bytes(),
        _ => return Err(BomError::unsupported(format.as_str(), None)),
    };
    tracing::debug!("Encoded {format}: {} bytes", bytes.len());
    Ok(Serialized {
        bytes,
        warnings: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;
    use crate::model::{Component, ComponentType, Scope};

    fn sample() -> Bom {
        let mut bom = Bom::new();
        bom.serial_number = Some("urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79".to_string());
        let mut c = Component::new(ComponentType::Library, "acme")
            .with_version("1.0")
            .with_bom_ref("acme");
        c.scope = Some(Scope::Required);
        bom.components.push(c);
        bom
    }

    #[test]
    fn test_autodetect_is_not_a_format() {
        let err = deserialize(b"{}", BomFormat::Autodetect).unwrap_err();
        assert!(matches!(err, BomError::UnsupportedFormat { .. }));
        let err = serialize(&sample(), ConvertFormat::Autodetect, None).unwrap_err();
        assert!(matches!(err, BomError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_version_ranges() {
        let bom = sample();
        assert!(serialize(&bom, ConvertFormat::Xml, Some(SpecVersion::V1_0)).is_ok());
        assert!(serialize(&bom, ConvertFormat::Json, Some(SpecVersion::V1_2)).is_ok());
        assert!(serialize(&bom, ConvertFormat::Protobuf, Some(SpecVersion::V1_3)).is_ok());

        for (format, version) in [
            (ConvertFormat::Json, SpecVersion::V1_1),
            (ConvertFormat::Protobuf, SpecVersion::V1_2),
        ] {
            let err = serialize(&bom, format, Some(version)).unwrap_err();
            assert_eq!(
                err.exit_code(),
                crate::pipeline::exit_codes::UNSUPPORTED_FORMAT
            );
        }
    }

    #[test]
    fn test_serialize_does_not_mutate_input() {
        let bom = sample();
        let before = bom.clone();
        let out = serialize(&bom, ConvertFormat::Xml, Some(SpecVersion::V1_0)).unwrap();
        assert!(!out.warnings.is_empty());
        assert_eq!(bom, before);
    }

    #[test]
    fn test_json_round_trip_at_every_version() {
        let bom = sample();
        for version in [SpecVersion::V1_2, SpecVersion::V1_3, SpecVersion::V1_4, SpecVersion::V1_5] {
            let out = serialize(&bom, ConvertFormat::Json, Some(version)).unwrap();
            let back = deserialize(&out.bytes, BomFormat::Json).unwrap();
            assert_eq!(back.spec_version, SpecVersion::CANONICAL);
            assert_eq!(back.components[0].name, "acme");
            assert_eq!(back.components[0].version.as_deref(), Some("1.0"));
        }
    }

    #[test]
    fn test_raw_decode_keeps_declared_version() {
        let out = serialize(&sample(), ConvertFormat::Xml, Some(SpecVersion::V1_1)).unwrap();
        let raw = decode_raw(&out.bytes, BomFormat::Xml).unwrap();
        assert_eq!(raw.spec_version, SpecVersion::V1_1);
        let lifted = deserialize(&out.bytes, BomFormat::Xml).unwrap();
        assert_eq!(lifted.spec_version, SpecVersion::CANONICAL);
    }

    #[test]
    fn test_binary_formats_report_dropped_sections() {
        let mut bom = sample();
        bom.services.push(serde_json::json!({"name": "api", "data": []}));
        bom.vulnerabilities.push(serde_json::json!({"id": "CVE-2024-0001"}));

        let xml = serialize(&bom, ConvertFormat::Xml, None).unwrap();
        let paths: Vec<_> = xml.warnings.iter().map(|w| w.path.as_str()).collect();
        assert_eq!(paths, ["services[0].data", "vulnerabilities"]);

        let proto = serialize(&bom, ConvertFormat::Protobuf, None).unwrap();
        let paths: Vec<_> = proto.warnings.iter().map(|w| w.path.as_str()).collect();
        assert_eq!(paths, ["vulnerabilities", "services"]);

        let json = serialize(&bom, ConvertFormat::Json, None).unwrap();
        assert!(json.warnings.is_empty());
    }

    #[test]
    fn test_non_cyclonedx_formats_ignore_version() {
        let bom = sample();
        let csv = serialize(&bom, ConvertFormat::Csv, Some(SpecVersion::V1_0)).unwrap();
        assert!(csv.warnings.is_empty());
        let text = String::from_utf8(csv.bytes).unwrap();
        assert!(text.contains("acme"));

        let md = serialize(&bom, ConvertFormat::Markdown, Some(SpecVersion::V1_2)).unwrap();
        assert!(String::from_utf8(md.bytes).unwrap().contains("## Components"));
    }

    #[test]
    fn test_parse_errors_carry_the_format() {
        let err = deserialize(b"not json", BomFormat::Json).unwrap_err();
        match err {
            BomError::Parse { source, .. } => {
                assert!(matches!(source, ParseErrorKind::InvalidJson(_)));
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }
}
