//! `analyze` command output.

use super::{OutputFormat, ReportError, ReportGenerator};
use crate::analyze::AnalysisResult;
use crate::model::Bom;
use chrono::SecondsFormat;
use std::fmt::Write;

/// Renders an [`AnalysisResult`] together with the analyzed BOM's header.
pub struct AnalysisReporter<'a> {
    bom: &'a Bom,
    result: &'a AnalysisResult,
    pretty: bool,
}

impl<'a> AnalysisReporter<'a> {
    #[must_use]
    pub const fn new(bom: &'a Bom, result: &'a AnalysisResult) -> Self {
        Self {
            bom,
            result,
            pretty: true,
        }
    }

    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn generate_text(&self) -> Result<String, ReportError> {
        let mut out = String::new();
        match self.bom.subject() {
            Some(subject) => writeln!(
                out,
                "Analysis results for {}@{}:",
                subject.name,
                subject.version.as_deref().unwrap_or_default()
            )?,
            None => writeln!(out, "Analysis results:")?,
        }
        if let Some(serial) = self.bom.serial_number.as_deref().filter(|s| !s.is_empty()) {
            writeln!(out, "BOM Serial Number: {serial}")?;
        }
        if let Some(version) = self.bom.version {
            writeln!(out, "BOM Version: {version}")?;
        }
        if let Some(timestamp) = self.bom.metadata.as_ref().and_then(|m| m.timestamp) {
            writeln!(
                out,
                "Timestamp: {}",
                timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
            )?;
        }
        writeln!(out)?;

        if let Some(multiple) = &self.result.multiple_component_versions {
            writeln!(out, "Components with multiple versions:")?;
            writeln!(out)?;
            if multiple.is_empty() {
                writeln!(out, "None")?;
            } else {
                for (key, components) in multiple {
                    write!(out, "{key} versions:")?;
                    for component in components {
                        write!(out, " {}", component.version.as_deref().unwrap_or_default())?;
                    }
                    writeln!(out)?;
                }
            }
            writeln!(out)?;
        }
        Ok(out)
    }
}

impl ReportGenerator for AnalysisReporter<'_> {
    fn generate(&self, format: OutputFormat) -> Result<String, ReportError> {
        match format {
            OutputFormat::Text => self.generate_text(),
            OutputFormat::Json => {
                let mut json = super::to_json(self.result, self.pretty)?;
                json.push('\n');
                Ok(json)
            }
        }
    }
}
