#![no_main]
use bom_tools::codec::{deserialize, serialize};
use bom_tools::formats::{BomFormat, ConvertFormat};
use bom_tools::model::SpecVersion;
use libfuzzer_sys::fuzz_target;

const MAX_WRAPPED_INPUT_LEN: usize = 10_000;

/// Fuzz the CycloneDX JSON reader and the downgrade chain behind the writer.
///
/// Input is also wrapped in a minimal document so component parsing is
/// reached more often than envelope rejection.
fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let mut inputs = vec![s.to_string()];
    if s.len() < MAX_WRAPPED_INPUT_LEN {
        inputs.push(format!(
            r#"{{"bomFormat":"CycloneDX","specVersion":"1.5","components":[{s}]}}"#,
        ));
    }
    for input in inputs {
        if let Ok(bom) = deserialize(input.as_bytes(), BomFormat::Json) {
            for version in [SpecVersion::V1_2, SpecVersion::V1_5] {
                let _ = serialize(&bom, ConvertFormat::Json, Some(version));
            }
        }
    }
});
