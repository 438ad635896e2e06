#![no_main]
use bom_tools::spdx::read_tag_value;
use libfuzzer_sys::fuzz_target;

/// Fuzz the SPDX tag-value reader.
fuzz_target!(|data: &[u8]| {
    let _ = read_tag_value(data);
});
