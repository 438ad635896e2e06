//! Merge scenarios over the `sbom1.json` / `sbom2.json` fixtures.

use bom_tools::codec::{deserialize, serialize};
use bom_tools::formats::{BomFormat, ConvertFormat, ValidateFormat};
use bom_tools::merge::{load_inputs, merge, MergeEvent, MergeOptions};
use bom_tools::model::SpecVersion;
use bom_tools::validation::validate;
use bom_tools::Bom;
use std::path::PathBuf;

fn inputs() -> Vec<PathBuf> {
    ["sbom1.json", "sbom2.json"]
        .iter()
        .map(|name| PathBuf::from("tests/fixtures").join(name))
        .collect()
}

fn load() -> Vec<Bom> {
    load_inputs(&inputs(), BomFormat::Autodetect, |_| {}).expect("fixtures should load")
}

fn names(components: &[bom_tools::Component]) -> Vec<&str> {
    components.iter().map(|c| c.name.as_str()).collect()
}

#[test]
fn load_reports_each_input() {
    let mut events = Vec::new();
    load_inputs(&inputs(), BomFormat::Autodetect, |e| events.push(e)).unwrap();
    assert_eq!(
        events,
        vec![
            MergeEvent::InputLoaded {
                path: inputs()[0].clone(),
                components: 2,
            },
            MergeEvent::InputLoaded {
                path: inputs()[1].clone(),
                components: 3,
            },
        ]
    );
}

#[test]
fn load_fails_on_the_first_missing_input() {
    let mut paths = inputs();
    paths.insert(1, PathBuf::from("tests/fixtures/missing.json"));
    let mut loaded = 0;
    let err = load_inputs(&paths, BomFormat::Autodetect, |_| loaded += 1).unwrap_err();
    assert_eq!(loaded, 1);
    assert!(err.to_string().contains("missing.json"), "{err}");
}

#[test]
fn scenario_3_flat_merge_keeps_first_subject() {
    let boms = load();
    let outcome = merge(&boms, &MergeOptions::default()).unwrap();
    let bom = &outcome.bom;

    assert_eq!(bom.subject(), boms[0].subject());
    assert_eq!(
        bom.components.len(),
        boms[0].components.len() + boms[1].components.len()
    );
    // no de-duplication: both lodash versions survive
    assert_eq!(
        names(&bom.components),
        ["react", "lodash", "serde", "lodash", "tokio"]
    );
    assert_eq!(bom.dependencies.len(), 2);
    assert_eq!(bom.version, Some(1));
    assert_ne!(bom.serial_number, boms[0].serial_number);
    assert_eq!(
        outcome.writing_event(),
        MergeEvent::Writing { total: 5 }
    );
}

#[test]
fn flat_merge_with_explicit_subject() {
    let options = MergeOptions {
        group: Some("acme".to_string()),
        name: Some("platform".to_string()),
        version: Some("7".to_string()),
        ..MergeOptions::default()
    };
    let bom = merge(&load(), &options).unwrap().bom;
    let subject = bom.subject().unwrap();
    assert_eq!(subject.group.as_deref(), Some("acme"));
    assert_eq!(subject.name, "platform");
    assert_eq!(subject.version.as_deref(), Some("7"));
}

#[test]
fn scenario_4_hierarchical_merge_nests_inputs() {
    let options = MergeOptions {
        hierarchical: true,
        name: Some("Thing".to_string()),
        version: Some("1".to_string()),
        ..MergeOptions::default()
    };
    let bom = merge(&load(), &options).unwrap().bom;

    let subject = bom.subject().unwrap();
    assert_eq!(subject.name, "Thing");
    assert_eq!(subject.version.as_deref(), Some("1"));
    assert_eq!(subject.bom_ref.as_deref(), Some("Thing@1"));

    assert_eq!(names(&bom.components), ["frontend", "backend"]);
    let frontend = &bom.components[0];
    assert_eq!(names(&frontend.components), ["react", "lodash"]);
    assert_eq!(
        frontend.components[0].bom_ref.as_deref(),
        Some("acme.frontend@2.0.0:pkg:npm/react@18.2.0")
    );
    let backend = &bom.components[1];
    assert_eq!(names(&backend.components), ["serde", "lodash", "tokio"]);
    assert_eq!(
        backend.components[1].bom_ref.as_deref(),
        Some("acme.backend@1.4.2:pkg:npm/lodash@4.17.21")
    );

    let root = bom
        .dependencies
        .iter()
        .find(|d| d.reference == "Thing@1")
        .expect("subject dependency node");
    let children: Vec<&str> = root.dependencies.iter().map(|d| d.reference.as_str()).collect();
    assert_eq!(children, ["frontend", "backend"]);

    let edges = |reference: &str| -> Vec<String> {
        bom.dependencies
            .iter()
            .find(|d| d.reference == reference)
            .map(|d| d.dependencies.iter().map(|c| c.reference.clone()).collect())
            .unwrap_or_default()
    };
    assert_eq!(
        edges("frontend"),
        [
            "acme.frontend@2.0.0:pkg:npm/react@18.2.0",
            "acme.frontend@2.0.0:pkg:npm/lodash@4.17.21",
        ]
    );
    assert_eq!(
        edges("backend"),
        [
            "acme.backend@1.4.2:pkg:cargo/serde@1.0.200",
            "acme.backend@1.4.2:pkg:cargo/tokio@1.37.0",
        ]
    );
    assert!(bom.dependencies.iter().all(|d| !d.reference.ends_with(":frontend")));
}

#[test]
fn hierarchical_merge_passes_validation() {
    let bom = merge(
        &load(),
        &MergeOptions {
            hierarchical: true,
            name: Some("Thing".to_string()),
            version: Some("1".to_string()),
            ..MergeOptions::default()
        },
    )
    .unwrap()
    .bom;

    let out = serialize(&bom, ConvertFormat::Json, None).unwrap();
    let outcome = validate(&out.bytes, ValidateFormat::Json, None).unwrap();
    assert!(outcome.result.valid, "{:?}", outcome.result.messages);
    assert_eq!(outcome.version, Some(SpecVersion::CANONICAL));
}
