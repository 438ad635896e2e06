#![no_main]
use libfuzzer_sys::fuzz_target;
use std::path::Path;

/// Fuzz file-name format detection for inputs and outputs.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let path = Path::new(s);
        let _ = bom_tools::formats::detect_format(path);
        let _ = bom_tools::formats::detect_output_format(Some(path));
    }
});
