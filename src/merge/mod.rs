//! BOM merging.
//!
//! Two strategies:
//!
//! - [`flat_merge`] concatenates every list of every input, in input order,
//!   without de-duplication.
//! - [`hierarchical_merge`] turns each input into a child component of a
//!   new subject and namespaces the input's references under that child.
//!
//! [`merge`] is the entry point the command layer uses: it validates the
//! options, picks the strategy, and gives the result a fresh identity.

mod flat;
mod hierarchical;

pub use flat::flat_merge;
pub use hierarchical::{bom_ref_namespace, hierarchical_merge};

use crate::error::{BomError, Result};
use crate::formats::BomFormat;
use crate::model::{Bom, Component, ComponentType};
use crate::pipeline::load_bom;
use std::path::PathBuf;
use thiserror::Error;

/// Merge parameter errors. Raised before any input is read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MergeError {
    #[error("Name and version must be specified when performing a hierarchical merge.")]
    MissingHierarchicalSubject,
}

impl From<MergeError> for BomError {
    fn from(err: MergeError) -> Self {
        Self::Parameter(err.to_string())
    }
}

/// How to merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOptions {
    pub hierarchical: bool,
    pub group: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
}

impl MergeOptions {
    /// Check the options on their own, before any input is loaded.
    pub fn validate(&self) -> std::result::Result<(), MergeError> {
        if self.hierarchical && (self.name.is_none() || self.version.is_none()) {
            return Err(MergeError::MissingHierarchicalSubject);
        }
        Ok(())
    }

    /// The subject described by the options, if any coordinate was given.
    #[must_use]
    pub fn subject(&self) -> Option<Component> {
        if self.group.is_none() && self.name.is_none() && self.version.is_none() {
            return None;
        }
        let mut subject = Component::new(
            ComponentType::Application,
            self.name.clone().unwrap_or_default(),
        );
        subject.group.clone_from(&self.group);
        subject.version.clone_from(&self.version);
        Some(subject)
    }
}

/// Progress reported while merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeEvent {
    /// An input was read; `components` counts its top-level components.
    InputLoaded { path: PathBuf, components: usize },
    /// The merged document is about to be written.
    Writing { total: usize },
}

/// A merged BOM.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub bom: Bom,
}

impl MergeOutcome {
    #[must_use]
    pub fn writing_event(&self) -> MergeEvent {
        MergeEvent::Writing {
            total: self.bom.components.len(),
        }
    }
}

/// Read every input before merging anything.
///
/// The first unreadable or undetectable input aborts the whole load, with
/// the file named in the error.
pub fn load_inputs<F>(paths: &[PathBuf], format: BomFormat, mut on_event: F) -> Result<Vec<Bom>>
where
    F: FnMut(MergeEvent),
{
    let mut boms = Vec::with_capacity(paths.len());
    for path in paths {
        let bom = load_bom(Some(path.as_path()), format)?;
        on_event(MergeEvent::InputLoaded {
            path: path.clone(),
            components: bom.components.len(),
        });
        boms.push(bom);
    }
    Ok(boms)
}

/// Merge `boms` according to `options`.
///
/// In flat mode the subject is taken from the options when any coordinate
/// was given, otherwise from the first input that has one. The result
/// always has document version 1 and a fresh serial number.
pub fn merge(boms: &[Bom], options: &MergeOptions) -> std::result::Result<MergeOutcome, MergeError> {
    options.validate()?;

    let mut bom = if options.hierarchical {
        hierarchical_merge(boms, options.subject())
    } else {
        let mut merged = flat_merge(boms);
        let subject = options
            .subject()
            .or_else(|| boms.iter().find_map(|b| b.subject().cloned()));
        merged.metadata_mut().component = subject;
        merged
    };
    bom.reset_identity();

    tracing::debug!(
        "Merged {} inputs ({}): {} top-level components",
        boms.len(),
        if options.hierarchical { "hierarchical" } else { "flat" },
        bom.components.len()
    );
    Ok(MergeOutcome { bom })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(subject: Option<&str>, components: &[&str]) -> Bom {
        let mut bom = Bom::new();
        if let Some(name) = subject {
            bom.metadata_mut().component =
                Some(Component::new(ComponentType::Application, name).with_version("1"));
        }
        bom.components = components
            .iter()
            .map(|n| Component::new(ComponentType::Library, *n))
            .collect();
        bom
    }

    #[test]
    fn test_hierarchical_requires_name_and_version() {
        let options = MergeOptions {
            hierarchical: true,
            name: Some("Thing".to_string()),
            ..MergeOptions::default()
        };
        assert_eq!(options.validate(), Err(MergeError::MissingHierarchicalSubject));
        let err: BomError = merge(&[], &options).unwrap_err().into();
        assert_eq!(
            err.exit_code(),
            crate::pipeline::exit_codes::PARAMETER_VALIDATION_ERROR
        );
    }

    #[test]
    fn test_flat_subject_first_match_wins() {
        let boms = [input(None, &["a"]), input(Some("second"), &["b"]), input(Some("third"), &[])];
        let outcome = merge(&boms, &MergeOptions::default()).unwrap();
        assert_eq!(outcome.bom.subject().map(|c| c.name.as_str()), Some("second"));
        assert_eq!(outcome.writing_event(), MergeEvent::Writing { total: 2 });
    }

    #[test]
    fn test_flat_subject_override() {
        let boms = [input(Some("first"), &["a"])];
        let options = MergeOptions {
            group: Some("acme".to_string()),
            ..MergeOptions::default()
        };
        let outcome = merge(&boms, &options).unwrap();
        let subject = outcome.bom.subject().unwrap();
        assert_eq!(subject.group.as_deref(), Some("acme"));
        assert_eq!(subject.name, "");
        assert_eq!(subject.component_type, ComponentType::Application);
    }

    #[test]
    fn test_result_gets_fresh_identity() {
        let mut bom = input(None, &["a"]);
        bom.version = Some(9);
        bom.serial_number = Some("urn:uuid:00000000-0000-4000-8000-000000000000".to_string());
        let outcome = merge(&[bom.clone(), bom], &MergeOptions::default()).unwrap();
        assert_eq!(outcome.bom.version, Some(1));
        let serial = outcome.bom.serial_number.unwrap();
        assert!(serial.starts_with("urn:uuid:"));
        assert_ne!(serial, "urn:uuid:00000000-0000-4000-8000-000000000000");
    }

    #[test]
    fn test_load_inputs_reports_progress_and_stops_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a.json");
        std::fs::write(
            &good,
            r#"{"bomFormat":"CycloneDX","specVersion":"1.5","version":1,"components":[{"type":"library","name":"x"}]}"#,
        )
        .unwrap();

        let mut events = Vec::new();
        let boms = load_inputs(&[good.clone()], BomFormat::Autodetect, |e| events.push(e)).unwrap();
        assert_eq!(boms.len(), 1);
        assert_eq!(
            events,
            [MergeEvent::InputLoaded {
                path: good.clone(),
                components: 1
            }]
        );

        let missing = dir.path().join("b.json");
        let err = load_inputs(&[good, missing], BomFormat::Autodetect, |_| {}).unwrap_err();
        assert!(err.to_string().contains("b.json"));
    }
}
