//! Command handlers end to end: files in, exit codes out.

use bom_tools::cli::{
    exit_code_for, run_add_files, run_analyze, run_convert, run_diff, run_merge,
    run_rename_entity, run_validate, AddFilesArgs, AnalyzeArgs, ConvertArgs, DiffArgs, MergeArgs,
    RenameEntityArgs, ValidateArgs,
};
use bom_tools::codec::deserialize;
use bom_tools::formats::{BomFormat, ConvertFormat, ValidateFormat};
use bom_tools::model::SpecVersion;
use bom_tools::pipeline::exit_codes;
use bom_tools::reports::OutputFormat;
use bom_tools::AppConfig;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new("tests/fixtures").join(name)
}

fn quiet() -> AppConfig {
    let mut config = AppConfig::default();
    config.behavior.quiet = true;
    config
}

fn read_json(path: &Path) -> bom_tools::Bom {
    let bytes = std::fs::read(path).expect("output should exist");
    deserialize(&bytes, BomFormat::Json).expect("output should parse")
}

#[test]
fn convert_xml_to_json_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("bom.json");
    let args = ConvertArgs {
        input_file: Some(fixture("bom-1.2.xml")),
        output_file: Some(out.clone()),
        ..ConvertArgs::default()
    };
    assert_eq!(run_convert(&args, &quiet()).unwrap(), exit_codes::OK);

    let bom = read_json(&out);
    assert_eq!(bom.components[0].name, "tomcat-catalina");
}

#[test]
fn convert_to_unsupported_version_exits_4() {
    let dir = TempDir::new().unwrap();
    let args = ConvertArgs {
        input_file: Some(fixture("bom-1.3.json")),
        output_file: Some(dir.path().join("bom.json")),
        output_version: Some(SpecVersion::V1_1),
        ..ConvertArgs::default()
    };
    let err = run_convert(&args, &quiet()).unwrap_err();
    assert_eq!(exit_code_for(&err), exit_codes::UNSUPPORTED_FORMAT);
    assert!(!dir.path().join("bom.json").exists());
}

#[test]
fn convert_missing_input_exits_2() {
    let dir = TempDir::new().unwrap();
    let args = ConvertArgs {
        input_file: Some(dir.path().join("nope.json")),
        output_file: Some(dir.path().join("out.xml")),
        ..ConvertArgs::default()
    };
    let err = run_convert(&args, &quiet()).unwrap_err();
    assert_eq!(exit_code_for(&err), exit_codes::IO_ERROR);
}

#[test]
fn convert_undetectable_output_exits_3() {
    let dir = TempDir::new().unwrap();
    let args = ConvertArgs {
        input_file: Some(fixture("bom-1.3.json")),
        output_file: Some(dir.path().join("out.txt")),
        ..ConvertArgs::default()
    };
    let err = run_convert(&args, &quiet()).unwrap_err();
    assert_eq!(exit_code_for(&err), exit_codes::PARAMETER_VALIDATION_ERROR);
}

#[test]
fn convert_uses_configured_default_format() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.txt");
    let mut config = quiet();
    config.output.default_format = Some(ConvertFormat::Json);
    let args = ConvertArgs {
        input_file: Some(fixture("bom-1.2.xml")),
        output_file: Some(out.clone()),
        ..ConvertArgs::default()
    };
    assert_eq!(run_convert(&args, &config).unwrap(), exit_codes::OK);
    assert_eq!(read_json(&out).components.len(), 1);
}

#[test]
fn validate_invalid_document() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("broken.json");
    std::fs::write(&input, "{ this is not json").unwrap();

    let mut args = ValidateArgs {
        input_file: Some(input),
        ..ValidateArgs::default()
    };
    assert_eq!(run_validate(&args, &quiet()).unwrap(), exit_codes::OK);

    args.fail_on_errors = true;
    assert_eq!(run_validate(&args, &quiet()).unwrap(), exit_codes::OK_FAIL);

    args.fail_on_errors = false;
    let mut config = quiet();
    config.validate.fail_on_errors = true;
    assert_eq!(run_validate(&args, &config).unwrap(), exit_codes::OK_FAIL);
}

#[test]
fn validate_valid_fixture() {
    let args = ValidateArgs {
        input_file: Some(fixture("bom-1.2.xml")),
        fail_on_errors: true,
        ..ValidateArgs::default()
    };
    assert_eq!(run_validate(&args, &quiet()).unwrap(), exit_codes::OK);
}

#[test]
fn validate_protobuf_is_a_parameter_error() {
    let args = ValidateArgs {
        input_file: Some(PathBuf::from("bom.cdx.bin")),
        input_format: ValidateFormat::Autodetect,
        ..ValidateArgs::default()
    };
    let err = run_validate(&args, &quiet()).unwrap_err();
    assert_eq!(exit_code_for(&err), exit_codes::PARAMETER_VALIDATION_ERROR);
}

#[test]
fn merge_hierarchical_without_subject_exits_3() {
    let dir = TempDir::new().unwrap();
    let args = MergeArgs {
        input_files: vec![fixture("sbom1.json"), fixture("sbom2.json")],
        output_file: Some(dir.path().join("merged.json")),
        hierarchical: true,
        name: Some("Thing".to_string()),
        ..MergeArgs::default()
    };
    let err = run_merge(&args, &quiet()).unwrap_err();
    assert_eq!(exit_code_for(&err), exit_codes::PARAMETER_VALIDATION_ERROR);
    assert!(err.to_string().contains("Name and version must be specified"));
}

#[test]
fn merge_flat_to_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("merged.json");
    let args = MergeArgs {
        input_files: vec![fixture("sbom1.json"), fixture("sbom2.json")],
        output_file: Some(out.clone()),
        ..MergeArgs::default()
    };
    assert_eq!(run_merge(&args, &quiet()).unwrap(), exit_codes::OK);
    let bom = read_json(&out);
    assert_eq!(bom.components.len(), 5);
    assert_eq!(bom.subject().map(|s| s.name.as_str()), Some("frontend"));
}

#[test]
fn diff_and_analyze_succeed_on_fixtures() {
    let args = DiffArgs {
        from_file: fixture("sbom1.json"),
        to_file: fixture("sbom2.json"),
        from_format: BomFormat::Autodetect,
        to_format: BomFormat::Autodetect,
        output_format: OutputFormat::Json,
        component_versions: true,
    };
    assert_eq!(run_diff(&args, &quiet()).unwrap(), exit_codes::OK);

    let args = AnalyzeArgs {
        input_file: Some(fixture("bom-1.3.json")),
        input_format: BomFormat::Autodetect,
        output_format: OutputFormat::Text,
        multiple_component_versions: true,
    };
    assert_eq!(run_analyze(&args, &quiet()).unwrap(), exit_codes::OK);
}

#[test]
fn rename_entity_rewrites_definition_and_references() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("renamed.json");
    let args = RenameEntityArgs {
        input_file: Some(fixture("bom-1.3.json")),
        output_file: Some(out.clone()),
        old_ref: "pkg:maven/org.slf4j/slf4j-api@1.7.36".to_string(),
        new_ref: "slf4j".to_string(),
        ..RenameEntityArgs::default()
    };
    assert_eq!(run_rename_entity(&args, &quiet()).unwrap(), exit_codes::OK);

    let bom = read_json(&out);
    assert_eq!(bom.components[1].bom_ref.as_deref(), Some("slf4j"));
    let refs: Vec<&str> = bom.dependencies[0]
        .dependencies
        .iter()
        .map(|d| d.reference.as_str())
        .collect();
    assert!(refs.contains(&"slf4j"), "{refs:?}");
}

#[test]
fn add_files_without_input_hashes_every_file() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("dist");
    std::fs::create_dir_all(base.join("lib")).unwrap();
    std::fs::write(base.join("app.bin"), b"app").unwrap();
    std::fs::write(base.join("lib/util.so"), b"util").unwrap();
    let out = dir.path().join("files.json");

    let args = AddFilesArgs {
        no_input: true,
        output_file: Some(out.clone()),
        base_path: Some(base),
        ..AddFilesArgs::default()
    };
    assert_eq!(run_add_files(&args, &quiet()).unwrap(), exit_codes::OK);

    let bom = read_json(&out);
    let names: Vec<&str> = bom.components.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["app.bin", "lib/util.so"]);
    assert!(bom.components.iter().all(|c| c.hashes.len() == 4));
}
