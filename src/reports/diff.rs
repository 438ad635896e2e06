//! `diff` command output.

use super::{OutputFormat, ReportError, ReportGenerator};
use crate::diff::BomDiff;
use crate::model::Component;
use std::fmt::Write;

/// Renders a [`BomDiff`].
pub struct DiffReporter<'a> {
    diff: &'a BomDiff,
    pretty: bool,
}

impl<'a> DiffReporter<'a> {
    #[must_use]
    pub const fn new(diff: &'a BomDiff) -> Self {
        Self { diff, pretty: true }
    }

    /// Indent JSON output. On by default.
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn generate_text(&self) -> Result<String, ReportError> {
        let mut out = String::new();
        let Some(versions) = &self.diff.component_versions else {
            return Ok(out);
        };

        writeln!(out, "Component versions that have changed:")?;
        writeln!(out)?;

        let mut changes = false;
        for item in versions.values().filter(|item| item.has_changes()) {
            changes = true;
            for component in &item.removed {
                writeln!(out, "- {}", describe(component))?;
            }
            for component in &item.unchanged {
                writeln!(out, "= {}", describe(component))?;
            }
            for component in &item.added {
                writeln!(out, "+ {}", describe(component))?;
            }
            writeln!(out)?;
        }
        if !changes {
            writeln!(out, "None")?;
        }
        writeln!(out)?;
        Ok(out)
    }
}

fn describe(component: &Component) -> String {
    format!(
        "{} {} @ {}",
        component.group.as_deref().unwrap_or_default(),
        component.name,
        component.version.as_deref().unwrap_or_default()
    )
}

impl ReportGenerator for DiffReporter<'_> {
    fn generate(&self, format: OutputFormat) -> Result<String, ReportError> {
        match format {
            OutputFormat::Text => self.generate_text(),
            OutputFormat::Json => {
                let mut json = super::to_json(self.diff, self.pretty)?;
                json.push('\n');
                Ok(json)
            }
        }
    }
}
