#![no_main]
use bom_tools::codec::{deserialize, serialize};
use bom_tools::formats::{BomFormat, ConvertFormat};
use libfuzzer_sys::fuzz_target;

/// Fuzz every reader with the same bytes.
///
/// Whatever decodes must also encode back to its own format.
fuzz_target!(|data: &[u8]| {
    for (read, write) in [
        (BomFormat::Json, ConvertFormat::Json),
        (BomFormat::Xml, ConvertFormat::Xml),
        (BomFormat::Protobuf, ConvertFormat::Protobuf),
        (BomFormat::Csv, ConvertFormat::Csv),
        (BomFormat::SpdxTag, ConvertFormat::SpdxTag),
        (BomFormat::SpdxJson, ConvertFormat::SpdxJson),
    ] {
        if let Ok(bom) = deserialize(data, read) {
            let _ = serialize(&bom, write, None);
        }
    }
});
