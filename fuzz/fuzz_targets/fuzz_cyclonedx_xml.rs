#![no_main]
use bom_tools::codec::{deserialize, serialize};
use bom_tools::formats::{BomFormat, ConvertFormat};
use bom_tools::model::SpecVersion;
use libfuzzer_sys::fuzz_target;

/// Fuzz the CycloneDX XML reader, then write the result at the oldest version.
fuzz_target!(|data: &[u8]| {
    if let Ok(bom) = deserialize(data, BomFormat::Xml) {
        let _ = serialize(&bom, ConvertFormat::Xml, Some(SpecVersion::V1_0));
    }
});
