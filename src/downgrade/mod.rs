//! Version downgrade and upgrade chains.
//!
//! The in-memory model lives at [`SpecVersion::CANONICAL`]. Writing an older
//! version walks a table of single-step transforms, one rung at a time, from
//! the document's version down to the target:
//!
//! ```text
//! 1.5 -> 1.4 -> 1.3 -> 1.2 -> 1.1 -> 1.0
//! ```
//!
//! Every step is lossy by nature: fields the older schema cannot hold are
//! dropped and enum values it does not know are coerced to the nearest value
//! it does. Nothing here fails. Each loss is recorded as a
//! [`DowngradeWarning`] so callers can decide whether to surface it.
//!
//! Adding a schema version means appending one entry to each table.

mod steps;

use crate::model::{Bom, Component, SpecVersion};
use std::fmt;

/// One field dropped or value coerced by a downgrade step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DowngradeWarning {
    /// Version produced by the step that lost the data.
    pub version: SpecVersion,
    /// Location in the document, e.g. `components[2].scope`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for DowngradeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (v{}): {}", self.path, self.version, self.message)
    }
}

/// Result of [`downgrade`].
#[derive(Debug, Clone)]
pub struct Downgraded {
    pub bom: Bom,
    pub warnings: Vec<DowngradeWarning>,
}

/// Collects warnings for one step.
pub(crate) struct Losses<'a> {
    version: SpecVersion,
    warnings: &'a mut Vec<DowngradeWarning>,
}

impl Losses<'_> {
    pub(crate) fn dropped(&mut self, path: impl Into<String>, what: &str) {
        self.warnings.push(DowngradeWarning {
            version: self.version,
            path: path.into(),
            message: format!("{what} is not supported, dropped"),
        });
    }

    pub(crate) fn coerced(&mut self, path: impl Into<String>, from: &str, to: &str) {
        self.warnings.push(DowngradeWarning {
            version: self.version,
            path: path.into(),
            message: format!("'{from}' is not supported, written as '{to}'"),
        });
    }
}

type DowngradeFn = fn(Bom, &mut Losses<'_>) -> Bom;
type UpgradeFn = fn(Bom) -> Bom;

struct DowngradeStep {
    /// Version this step produces.
    to: SpecVersion,
    apply: DowngradeFn,
}

struct UpgradeStep {
    to: SpecVersion,
    apply: UpgradeFn,
}

/// Newest first.
const DOWNGRADE_STEPS: [DowngradeStep; 5] = [
    DowngradeStep {
        to: SpecVersion::V1_4,
        apply: steps::to_v1_4,
    },
    DowngradeStep {
        to: SpecVersion::V1_3,
        apply: steps::to_v1_3,
    },
    DowngradeStep {
        to: SpecVersion::V1_2,
        apply: steps::to_v1_2,
    },
    DowngradeStep {
        to: SpecVersion::V1_1,
        apply: steps::to_v1_1,
    },
    DowngradeStep {
        to: SpecVersion::V1_0,
        apply: steps::to_v1_0,
    },
];

/// Oldest first.
const UPGRADE_STEPS: [UpgradeStep; 5] = [
    UpgradeStep {
        to: SpecVersion::V1_1,
        apply: steps::from_v1_0,
    },
    UpgradeStep {
        to: SpecVersion::V1_2,
        apply: steps::from_v1_1,
    },
    UpgradeStep {
        to: SpecVersion::V1_3,
        apply: steps::from_v1_2,
    },
    UpgradeStep {
        to: SpecVersion::V1_4,
        apply: steps::from_v1_3,
    },
    UpgradeStep {
        to: SpecVersion::V1_5,
        apply: steps::from_v1_4,
    },
];

/// Project `bom` onto an older specification version.
///
/// Walks every rung between the document's version and `target`. A target
/// equal to (or newer than) the document's version takes zero steps and
/// returns the document unchanged.
///
/// ```
/// use bom_tools::downgrade::downgrade;
/// use bom_tools::model::{Bom, Component, ComponentType, Scope, SpecVersion};
///
/// let mut component = Component::new(ComponentType::Library, "acme").with_version("1");
/// component.scope = Some(Scope::Required);
/// let mut bom = Bom::new();
/// bom.components.push(component);
///
/// let out = downgrade(bom, SpecVersion::V1_0);
/// assert_eq!(out.bom.spec_version, SpecVersion::V1_0);
/// assert_eq!(out.bom.components[0].scope, None);
/// assert!(!out.warnings.is_empty());
/// ```
#[must_use]
pub fn downgrade(bom: Bom, target: SpecVersion) -> Downgraded {
    let start = bom.spec_version;
    let mut warnings = Vec::new();

    let bom = DOWNGRADE_STEPS
        .iter()
        .filter(|step| step.to < start && step.to >= target)
        .fold(bom, |bom, step| {
            tracing::debug!("Downgrading BOM from {} to {}", bom.spec_version, step.to);
            let mut losses = Losses {
                version: step.to,
                warnings: &mut warnings,
            };
            let mut bom = (step.apply)(bom, &mut losses);
            bom.spec_version = step.to;
            bom
        });

    Downgraded { bom, warnings }
}

/// Lift a document read at an older version into the canonical model.
#[must_use]
pub fn upgrade(bom: Bom) -> Bom {
    let start = bom.spec_version;
    UPGRADE_STEPS
        .iter()
        .filter(|step| step.to > start)
        .fold(bom, |bom, step| {
            tracing::debug!("Upgrading BOM from {} to {}", bom.spec_version, step.to);
            let mut bom = (step.apply)(bom);
            bom.spec_version = step.to;
            bom
        })
}

/// Everything in `bom` that `version` cannot represent.
///
/// Runs the downgrade chain on a copy treated as canonical and returns what
/// it would lose. An empty list means the document fits the version.
#[must_use]
pub fn unsupported_fields(bom: &Bom, version: SpecVersion) -> Vec<DowngradeWarning> {
    let mut probe = bom.clone();
    probe.spec_version = SpecVersion::CANONICAL;
    downgrade(probe, version).warnings
}

/// Visit the subject and every component, nested ones included, with a
/// document path for each.
pub(crate) fn for_each_component<F>(bom: &mut Bom, mut f: F)
where
    F: FnMut(&mut Component, &str),
{
    fn visit<F>(component: &mut Component, path: &str, f: &mut F)
    where
        F: FnMut(&mut Component, &str),
    {
        f(component, path);
        for (i, child) in component.components.iter_mut().enumerate() {
            visit(child, &format!("{path}.components[{i}]"), f);
        }
    }

    if let Some(subject) = bom.metadata.as_mut().and_then(|m| m.component.as_mut()) {
        visit(subject, "metadata.component", &mut f);
    }
    for (i, component) in bom.components.iter_mut().enumerate() {
        visit(component, &format!("components[{i}]"), &mut f);
    }
}
