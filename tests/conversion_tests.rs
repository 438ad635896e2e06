//! End-to-end conversion scenarios over the fixtures in `tests/fixtures`.

use bom_tools::codec::{deserialize, serialize, serialize_with, WriteOptions};
use bom_tools::formats::{BomFormat, ConvertFormat};
use bom_tools::model::{HashAlgorithm, LicenseChoice, SpdxVersion, SpecVersion};
use bom_tools::spdx::TagValueOptions;
use bom_tools::Bom;
use chrono::{TimeZone, Utc};
use std::path::Path;

fn fixture(name: &str) -> Vec<u8> {
    std::fs::read(Path::new("tests/fixtures").join(name)).expect("fixture should exist")
}

fn load(name: &str, format: BomFormat) -> Bom {
    deserialize(&fixture(name), format).expect("fixture should parse")
}

fn pinned() -> TagValueOptions {
    TagValueOptions {
        created: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single().unwrap(),
        document_id: Some("00000000-0000-4000-8000-000000000000".to_string()),
    }
}

#[test]
fn scenario_1_xml_1_2_to_canonical_json() {
    let bom = load("bom-1.2.xml", BomFormat::Xml);
    let out = serialize(&bom, ConvertFormat::Json, None).unwrap();
    assert!(out.warnings.is_empty());

    let value: serde_json::Value = serde_json::from_slice(&out.bytes).unwrap();
    assert_eq!(value["bomFormat"], "CycloneDX");
    assert_eq!(value["specVersion"], "1.5");
    assert_eq!(value["components"][0]["name"], "tomcat-catalina");
    assert_eq!(value["components"][0]["version"], "9.0.14");
    assert_eq!(value["components"][0]["hashes"][0]["alg"], "SHA-256");
    assert_eq!(
        value["components"][0]["hashes"][0]["content"],
        "f498a8ff2dd007e29c2074f5e4b01a9a01775c3ff3aeaf6906ea503bc5791b7b"
    );
    assert_eq!(value["components"][0]["licenses"][0]["license"]["id"], "MIT");

    let back = deserialize(&out.bytes, BomFormat::Json).unwrap();
    assert_eq!(back.components, bom.components);
    assert_eq!(back.dependencies, bom.dependencies);
}

#[test]
fn scenario_2_json_1_3_to_xml_1_0_drops_newer_fields() {
    let bom = load("bom-1.3.json", BomFormat::Json);
    let out = serialize(&bom, ConvertFormat::Xml, Some(SpecVersion::V1_0)).unwrap();
    let xml = String::from_utf8(out.bytes).unwrap();

    assert!(xml.contains("http://cyclonedx.org/schema/bom/1.0"));
    assert!(!xml.contains("<scope>"));
    assert!(!xml.contains("<swid"));
    for alg in ["SHA-384", "SHA-512", "SHA3-", "BLAKE"] {
        assert!(!xml.contains(alg), "{alg} should have been dropped");
    }
    assert!(xml.contains("SHA-256"));

    let paths: Vec<&str> = out.warnings.iter().map(|w| w.path.as_str()).collect();
    assert!(paths.iter().any(|p| p.contains("scope")), "{paths:?}");
    assert!(paths.iter().any(|p| p.contains("swid")), "{paths:?}");

    // the input model is untouched
    let component = &bom.components[0];
    assert!(component.scope.is_some());
    assert!(component.hashes.iter().any(|h| h.alg == HashAlgorithm::Sha512));
}

#[test]
fn scenario_5_xml_1_2_to_spdx_tag_2_1() {
    let bom = load("bom-1.2.xml", BomFormat::Xml);
    let options = WriteOptions {
        spdx_version: SpdxVersion::V2_1,
        tag_value: pinned(),
        ..WriteOptions::default()
    };
    let out = serialize_with(&bom, ConvertFormat::SpdxTag, &options).unwrap();
    let spdx = String::from_utf8(out.bytes).unwrap();

    assert!(spdx.starts_with("SPDXVersion: SPDX-2.1\n"));
    assert!(spdx.contains("\nDataLicense: CC0-1.0\n"));
    assert_eq!(spdx.matches("PackageName: ").count(), bom.components.len());
    assert_eq!(spdx.matches("\nSPDXID: SPDXRef-").count(), bom.components.len() + 1);

    insta::assert_snapshot!("scenario_5_spdx_tag", spdx);
}

#[test]
fn spdx_tag_round_trip_keeps_components() {
    let bom = load("bom-1.3.json", BomFormat::Json);
    let out = serialize_with(
        &bom,
        ConvertFormat::SpdxTag,
        &WriteOptions {
            tag_value: pinned(),
            ..WriteOptions::default()
        },
    )
    .unwrap();
    let back = deserialize(&out.bytes, BomFormat::SpdxTag).unwrap();

    assert_eq!(back.components.len(), 2);
    assert_eq!(back.components[1].name, "slf4j-api");
    assert_eq!(
        back.components[1].licenses,
        vec![LicenseChoice::Expression("MIT OR Apache-2.0".to_string())]
    );
}

#[test]
fn spdx_output_is_deterministic() {
    let bom = load("bom-1.3.json", BomFormat::Json);
    let options = WriteOptions {
        tag_value: pinned(),
        ..WriteOptions::default()
    };
    for format in [ConvertFormat::SpdxTag, ConvertFormat::SpdxJson] {
        let a = serialize_with(&bom, format, &options).unwrap();
        let b = serialize_with(&bom, format, &options).unwrap();
        assert_eq!(a.bytes, b.bytes, "{format} output differs between runs");
    }
}

#[test]
fn every_cyclonedx_format_round_trips_at_every_supported_version() {
    let bom = load("bom-1.3.json", BomFormat::Json);
    let formats = [
        (ConvertFormat::Json, BomFormat::Json),
        (ConvertFormat::Xml, BomFormat::Xml),
        (ConvertFormat::Protobuf, BomFormat::Protobuf),
    ];
    for (write, read) in formats {
        let (oldest, newest) = bom_tools::codec::supported_versions(write).unwrap();
        for version in SpecVersion::ALL.into_iter().filter(|v| (oldest..=newest).contains(v)) {
            let out = serialize(&bom, write, Some(version)).unwrap();
            let back = deserialize(&out.bytes, read)
                .unwrap_or_else(|e| panic!("{write} {version}: {e}"));
            assert_eq!(back.components.len(), 2, "{write} {version}");
            assert_eq!(back.components[0].name, "commons-lang3", "{write} {version}");
            assert_eq!(
                back.components[0].version.as_deref(),
                Some("3.12.0"),
                "{write} {version}"
            );
        }
    }
}

#[test]
fn xml_keeps_services_and_compositions() {
    let mut bom = load("bom-1.3.json", BomFormat::Json);
    bom.services = vec![serde_json::json!({
        "bom-ref": "svc-billing",
        "name": "billing",
        "version": "1.0",
        "endpoints": ["https://billing.example.com"],
        "authenticated": true,
    })];
    bom.compositions = vec![serde_json::json!({
        "aggregate": "incomplete",
        "assemblies": ["svc-billing"],
    })];

    let out = serialize(&bom, ConvertFormat::Xml, Some(SpecVersion::V1_5)).unwrap();
    assert!(out.warnings.is_empty(), "{:?}", out.warnings);
    let back = deserialize(&out.bytes, BomFormat::Xml).unwrap();
    assert_eq!(back.services, bom.services);
    assert_eq!(back.compositions, bom.compositions);

    let old = serialize(&bom, ConvertFormat::Xml, Some(SpecVersion::V1_1)).unwrap();
    let paths: Vec<_> = old.warnings.iter().map(|w| w.path.as_str()).collect();
    assert!(paths.contains(&"services"), "{paths:?}");
    assert!(paths.contains(&"compositions"), "{paths:?}");
    assert!(deserialize(&old.bytes, BomFormat::Xml).unwrap().services.is_empty());
}

#[test]
fn csv_keeps_the_component_list() {
    let bom = load("bom-1.3.json", BomFormat::Json);
    let out = serialize(&bom, ConvertFormat::Csv, None).unwrap();
    let back = deserialize(&out.bytes, BomFormat::Csv).unwrap();

    let names: Vec<&str> = back.components.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["commons-lang3", "slf4j-api"]);
    assert_eq!(back.components[0].group.as_deref(), Some("org.apache.commons"));
    assert_eq!(back.components[0].hashes.len(), 3);
}

#[test]
fn markdown_summarizes_the_bom() {
    let bom = load("bom-1.3.json", BomFormat::Json);
    let out = serialize(&bom, ConvertFormat::Markdown, None).unwrap();
    let md = String::from_utf8(out.bytes).unwrap();
    assert!(md.starts_with("# webapp (application)\n"));
    assert!(md.contains("## Components\n1. library"));
    assert!(md.contains("## Dependencies\n- webapp\n"));
}
