//! Add file components to a BOM.

use super::touch_metadata;
use crate::error::{BomError, Result};
use crate::model::{new_serial_number, Bom, Component, ComponentType, Hash, HashAlgorithm};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component as PathComponent, Path, PathBuf};

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Added { name: String },
    /// A component with the same name and version was already present.
    Skipped { name: String },
}

/// Result of [`add_files`], one entry per input file in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddFilesReport {
    pub outcomes: Vec<FileOutcome>,
}

impl AddFilesReport {
    #[must_use]
    pub fn added(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Added { .. }))
            .count()
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.added()
    }
}

/// SHA-1, SHA-256, SHA-384 and SHA-512 of a file in one pass.
fn file_hashes(path: &Path) -> Result<Vec<Hash>> {
    let file = File::open(path).map_err(|e| BomError::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut sha1 = Sha1::new();
    let mut sha256 = Sha256::new();
    let mut sha384 = Sha384::new();
    let mut sha512 = Sha512::new();

    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf).map_err(|e| BomError::io(path, e))?;
        if n == 0 {
            break;
        }
        sha1.update(&buf[..n]);
        sha256.update(&buf[..n]);
        sha384.update(&buf[..n]);
        sha512.update(&buf[..n]);
    }

    Ok(vec![
        Hash::new(HashAlgorithm::Sha1, hex::encode(sha1.finalize())),
        Hash::new(HashAlgorithm::Sha256, hex::encode(sha256.finalize())),
        Hash::new(HashAlgorithm::Sha384, hex::encode(sha384.finalize())),
        Hash::new(HashAlgorithm::Sha512, hex::encode(sha512.finalize())),
    ])
}

/// `path` relative to `base`, `/`-separated on every platform.
fn component_name(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            PathComponent::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Hash each file and add it as a `file` component.
///
/// Relative paths are resolved against `base`. The component is named by
/// its path relative to `base` and versioned `0.0.0-{first 12 hex digits of
/// its SHA-1}`, so the same content under the same name is recognised and
/// skipped on a second run. Paths are taken literally; no pattern expansion
/// happens here.
pub fn add_files(bom: &mut Bom, base: &Path, files: &[PathBuf]) -> Result<AddFilesReport> {
    let mut report = AddFilesReport::default();

    for file in files {
        let full = if file.is_absolute() {
            file.clone()
        } else {
            base.join(file)
        };
        let name = component_name(base, &full);
        let hashes = file_hashes(&full)?;
        let short = hashes[0].content.get(..12).unwrap_or_default();
        let version = format!("0.0.0-{short}");

        let exists = bom
            .all_components()
            .iter()
            .any(|c| c.name == name && c.version.as_deref() == Some(version.as_str()));
        if exists {
            tracing::debug!("Skipping {name}: already in the BOM");
            report.outcomes.push(FileOutcome::Skipped { name });
            continue;
        }

        let mut component = Component::new(ComponentType::File, name.clone()).with_version(version);
        component.hashes = hashes;
        bom.components.push(component);
        report.outcomes.push(FileOutcome::Added { name });
    }

    if bom.serial_number.is_none() {
        bom.serial_number = Some(new_serial_number());
    }
    touch_metadata(bom);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src").join("main.c"), b"int main() { return 0; }\n").unwrap();
        fs::write(dir.path().join("empty.txt"), b"").unwrap();
        dir
    }

    #[test]
    fn test_adds_hashed_file_components() {
        let dir = fixture();
        let mut bom = Bom::new();
        let report = add_files(&mut bom, dir.path(), &[PathBuf::from("empty.txt")]).unwrap();
        assert_eq!(report.added(), 1);

        let c = &bom.components[0];
        assert_eq!(c.component_type, ComponentType::File);
        assert_eq!(c.name, "empty.txt");
        // SHA-1 of the empty input
        assert_eq!(c.hashes[0].content, "da39a3ee5e6b4b0d3255bfef95601890afd80709");
        assert_eq!(c.version.as_deref(), Some("0.0.0-da39a3ee5e6b"));
        assert_eq!(
            c.hashes[1].content,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(c.hashes.len(), 4);
        assert!(bom.serial_number.is_some());
    }

    #[test]
    fn test_names_are_base_relative_with_forward_slashes() {
        let dir = fixture();
        let mut bom = Bom::new();
        let absolute = dir.path().join("src").join("main.c");
        add_files(&mut bom, dir.path(), &[absolute]).unwrap();
        assert_eq!(bom.components[0].name, "src/main.c");
    }

    #[test]
    fn test_second_run_skips_known_files() {
        let dir = fixture();
        let mut bom = Bom::new();
        let files = [PathBuf::from("empty.txt"), PathBuf::from("src/main.c")];
        add_files(&mut bom, dir.path(), &files).unwrap();
        let serial = bom.serial_number.clone();

        let report = add_files(&mut bom, dir.path(), &files).unwrap();
        assert_eq!(report.added(), 0);
        assert_eq!(report.skipped(), 2);
        assert_eq!(bom.components.len(), 2);
        assert_eq!(bom.serial_number, serial);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = fixture();
        let mut bom = Bom::new();
        let err = add_files(&mut bom, dir.path(), &[PathBuf::from("nope.bin")]).unwrap_err();
        assert_eq!(err.exit_code(), crate::pipeline::exit_codes::IO_ERROR);
    }
}
