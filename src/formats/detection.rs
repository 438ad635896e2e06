//! File-extension based format detection.
//!
//! Detection never fails: an unknown extension yields the `Autodetect`
//! sentinel, and callers must treat that as "could not detect".

use super::{BomFormat, ConvertFormat};
use std::path::Path;

/// Lower-cased file name, or `None` for paths without one.
fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_ascii_lowercase)
}

/// Detect an input format from a file name.
///
/// `.spdx.json` is checked before the single-extension rules so it is not
/// taken for plain CycloneDX JSON.
///
/// ```
/// use bom_tools::formats::{detect_format, BomFormat};
/// use std::path::Path;
///
/// assert_eq!(detect_format(Path::new("bom.xml")), BomFormat::Xml);
/// assert_eq!(detect_format(Path::new("bom.spdx.json")), BomFormat::SpdxJson);
/// assert_eq!(detect_format(Path::new("bom.txt")), BomFormat::Autodetect);
/// ```
#[must_use]
pub fn detect_format(path: &Path) -> BomFormat {
    let Some(name) = file_name(path) else {
        return BomFormat::Autodetect;
    };

    let detected = if name.ends_with(".spdx.json") {
        BomFormat::SpdxJson
    } else if name.ends_with(".json") {
        BomFormat::Json
    } else if name.ends_with(".xml") {
        BomFormat::Xml
    } else if name.ends_with(".cdx") || name.ends_with(".bin") {
        BomFormat::Protobuf
    } else if name.ends_with(".csv") {
        BomFormat::Csv
    } else if name.ends_with(".spdx") {
        BomFormat::SpdxTag
    } else {
        BomFormat::Autodetect
    };

    tracing::debug!("Detected format '{}' for {}", detected, path.display());
    detected
}

/// Detect an output format from a file name.
///
/// Adds the write-only Markdown format (`.md`) to the input rules.
/// Standard output (`None`) can never be detected.
#[must_use]
pub fn detect_output_format(path: Option<&Path>) -> ConvertFormat {
    let Some(path) = path else {
        return ConvertFormat::Autodetect;
    };
    match file_name(path) {
        Some(name) if name.ends_with(".md") => ConvertFormat::Markdown,
        _ => detect_format(path).as_convert_format(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension() {
        let cases = [
            ("bom.json", BomFormat::Json),
            ("bom.xml", BomFormat::Xml),
            ("bom.cdx", BomFormat::Protobuf),
            ("bom.bin", BomFormat::Protobuf),
            ("bom.csv", BomFormat::Csv),
            ("bom.spdx.json", BomFormat::SpdxJson),
            ("dir/BOM.XML", BomFormat::Xml),
            ("bom.yaml", BomFormat::Autodetect),
            ("bom", BomFormat::Autodetect),
        ];
        for (name, expected) in cases {
            assert_eq!(detect_format(Path::new(name)), expected, "{name}");
        }
    }

    #[test]
    fn test_spdx_suffix_priority() {
        assert_eq!(detect_format(Path::new("bom.spdx")), BomFormat::SpdxTag);
        assert_eq!(detect_format(Path::new("bom.spdx.json")), BomFormat::SpdxJson);
        assert_eq!(detect_format(Path::new("bom.spdx.xml")), BomFormat::Xml);
    }

    #[test]
    fn test_detect_output_format() {
        assert_eq!(
            detect_output_format(Some(Path::new("out.spdx"))),
            ConvertFormat::SpdxTag
        );
        assert_eq!(
            detect_output_format(Some(Path::new("out.md"))),
            ConvertFormat::Markdown
        );
        assert_eq!(
            detect_output_format(Some(Path::new("out.spdx.json"))),
            ConvertFormat::SpdxJson
        );
        assert_eq!(
            detect_output_format(Some(Path::new("out.cdx"))),
            ConvertFormat::Protobuf
        );
        assert_eq!(detect_output_format(None), ConvertFormat::Autodetect);
    }

    #[test]
    fn test_directory_path_is_undetected() {
        assert_eq!(detect_format(Path::new("/")), BomFormat::Autodetect);
    }
}
