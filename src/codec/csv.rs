//! Flat CSV component list.
//!
//! One row per top-level component. Nested components, bom-refs, external
//! references and everything outside `components` are not represented.

use crate::error::{BomError, ParseErrorKind, Result};
use crate::model::{
    AttachedText, Bom, Component, ComponentType, Hash, HashAlgorithm, License, LicenseChoice,
    OrganizationalEntity, Scope, Swid,
};
use std::collections::HashMap;

const LEADING_COLUMNS: [&str; 24] = [
    "Type",
    "MimeType",
    "Supplier",
    "Author",
    "Publisher",
    "Group",
    "Name",
    "Version",
    "Scope",
    "LicenseExpressions",
    "LicenseNames",
    "Copyright",
    "Cpe",
    "Purl",
    "Modified",
    "SwidTagId",
    "SwidName",
    "SwidVersion",
    "SwidTagVersion",
    "SwidPatch",
    "SwidTextContentType",
    "SwidTextEncoding",
    "SwidTextContent",
    "SwidUrl",
];

fn invalid(field: &str, message: impl Into<String>) -> BomError {
    BomError::parse(
        "CSV",
        ParseErrorKind::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        },
    )
}

fn csv_error(e: &csv::Error) -> BomError {
    BomError::parse("CSV", ParseErrorKind::InvalidCsv(e.to_string()))
}

// ============================================================================
// Write
// ============================================================================

fn opt(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn component_row(c: &Component) -> Vec<String> {
    let mut expressions = Vec::new();
    let mut names = Vec::new();
    for choice in &c.licenses {
        match choice {
            LicenseChoice::Expression(e) => expressions.push(e.clone()),
            LicenseChoice::License(l) => match l.id() {
                Some(id) => expressions.push(id.to_string()),
                None => names.push(l.label().replace(',', "_")),
            },
        }
    }

    let swid = c.swid.as_ref();
    let swid_text = swid.and_then(|s| s.text.as_ref());

    let mut row = vec![
        c.component_type.as_str().to_string(),
        opt(c.mime_type.as_deref()),
        opt(c.supplier.as_ref().and_then(|s| s.name.as_deref())),
        opt(c.author.as_deref()),
        opt(c.publisher.as_deref()),
        opt(c.group.as_deref()),
        c.name.clone(),
        opt(c.version.as_deref()),
        c.scope.map(|s| s.as_str().to_string()).unwrap_or_default(),
        expressions.join(","),
        names.join(","),
        opt(c.copyright.as_deref()),
        opt(c.cpe.as_deref()),
        opt(c.purl.as_deref()),
        c.modified.map(|m| m.to_string()).unwrap_or_default(),
        opt(swid.map(|s| s.tag_id.as_str())),
        opt(swid.map(|s| s.name.as_str())),
        opt(swid.and_then(|s| s.version.as_deref())),
        swid.and_then(|s| s.tag_version)
            .map(|v| v.to_string())
            .unwrap_or_default(),
        swid.and_then(|s| s.patch)
            .map(|p| p.to_string())
            .unwrap_or_default(),
        opt(swid_text.and_then(|t| t.content_type.as_deref())),
        opt(swid_text.and_then(|t| t.encoding.as_deref())),
        opt(swid_text.map(|t| t.content.as_str())),
        opt(swid.and_then(|s| s.url.as_deref())),
    ];

    for alg in HashAlgorithm::ALL {
        row.push(opt(c
            .hashes
            .iter()
            .find(|h| h.alg == alg)
            .map(|h| h.content.as_str())));
    }

    row.push(
        c.description
            .as_deref()
            .unwrap_or_default()
            .replace(['\r', '\n'], ""),
    );
    row
}

pub(crate) fn encode(bom: &Bom) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let header: Vec<&str> = LEADING_COLUMNS
        .iter()
        .copied()
        .chain(HashAlgorithm::ALL.iter().map(|a| a.as_str()))
        .chain(std::iter::once("Description"))
        .collect();
    writer
        .write_record(&header)
        .map_err(|e| BomError::serialize("csv", e.to_string()))?;

    for component in &bom.components {
        writer
            .write_record(component_row(component))
            .map_err(|e| BomError::serialize("csv", e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| BomError::serialize("csv", e.to_string()))
}

// ============================================================================
// Read
// ============================================================================

/// A data row addressed by case-insensitive column name.
struct Row<'a> {
    columns: &'a HashMap<String, usize>,
    record: &'a csv::StringRecord,
}

impl Row<'_> {
    /// Trimmed cell, `None` when the column is missing or blank.
    fn get(&self, column: &str) -> Option<String> {
        self.columns
            .get(&column.to_ascii_lowercase())
            .and_then(|&i| self.record.get(i))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn parse<T: std::str::FromStr>(&self, column: &str) -> Result<Option<T>> {
        self.get(column)
            .map(|v| {
                v.parse()
                    .map_err(|_| invalid(column, format!("cannot parse '{v}'")))
            })
            .transpose()
    }

    fn parse_bool(&self, column: &str) -> Result<Option<bool>> {
        self.get(column)
            .map(|v| match v.to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(invalid(column, format!("expected true or false, found '{v}'"))),
            })
            .transpose()
    }
}

fn licenses(row: &Row<'_>) -> Vec<LicenseChoice> {
    let mut out = Vec::new();
    if let Some(expressions) = row.get("LicenseExpressions") {
        for entry in expressions.split(',').filter(|e| !e.is_empty()) {
            if entry.contains(' ') {
                out.push(LicenseChoice::Expression(entry.to_string()));
            } else {
                out.push(LicenseChoice::License(License::spdx(entry)));
            }
        }
    }
    if let Some(names) = row.get("LicenseNames") {
        for name in names.split(',').filter(|n| !n.is_empty()) {
            out.push(LicenseChoice::License(License::named(name)));
        }
    }
    out
}

fn component_from_row(row: &Row<'_>, line: usize) -> Result<Component> {
    let name = row
        .get("Name")
        .ok_or_else(|| invalid("Name", format!("missing on row {line}")))?;

    let component_type = match row.get("Type") {
        Some(t) => t
            .parse::<ComponentType>()
            .map_err(|message| invalid("Type", message))?,
        None => ComponentType::Library,
    };

    let scope = match row.get("Scope") {
        Some(s) => Some(s.parse::<Scope>().map_err(|message| invalid("Scope", message))?),
        None => None,
    };

    let swid = match row.get("SwidTagId") {
        Some(tag_id) => Some(Swid {
            tag_id,
            name: row.get("SwidName").unwrap_or_default(),
            version: row.get("SwidVersion"),
            tag_version: row.parse("SwidTagVersion")?,
            patch: row.parse_bool("SwidPatch")?,
            text: row.get("SwidTextContent").map(|content| AttachedText {
                content_type: row.get("SwidTextContentType"),
                encoding: row.get("SwidTextEncoding"),
                content,
            }),
            url: row.get("SwidUrl"),
        }),
        None => None,
    };

    let hashes = HashAlgorithm::ALL
        .into_iter()
        .filter_map(|alg| row.get(alg.as_str()).map(|content| Hash::new(alg, content)))
        .collect();

    Ok(Component {
        component_type,
        mime_type: row.get("MimeType"),
        supplier: row.get("Supplier").map(OrganizationalEntity::named),
        author: row.get("Author"),
        publisher: row.get("Publisher"),
        group: row.get("Group"),
        name,
        version: row.get("Version"),
        description: row.get("Description"),
        scope,
        hashes,
        licenses: licenses(row),
        copyright: row.get("Copyright"),
        cpe: row.get("Cpe"),
        purl: row.get("Purl"),
        swid,
        modified: row.parse_bool("Modified")?,
        ..Component::default()
    })
}

/// Decode a component list. The result is a canonical-version BOM.
pub(crate) fn decode(bytes: &[u8]) -> Result<Bom> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let columns: HashMap<String, usize> = reader
        .headers()
        .map_err(|e| csv_error(&e))?
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
        .collect();

    let mut bom = Bom::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| csv_error(&e))?;
        let row = Row {
            columns: &columns,
            record: &record,
        };
        // +2: one-based, after the header
        bom.components.push(component_from_row(&row, i + 2)?);
    }
    tracing::debug!("Read {} components from CSV", bom.components.len());
    Ok(bom)
}
