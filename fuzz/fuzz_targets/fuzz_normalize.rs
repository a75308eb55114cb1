#![no_main]
use jarscope::model::CanonicalId;
use libfuzzer_sys::fuzz_target;

/// Fuzz the location normalizer.
///
/// Normalization must be total over arbitrary UTF-8, and the derived
/// accessors must not panic on whatever it produces.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Some(id) = CanonicalId::from_raw(s) {
            let _ = id.kind();
            let _ = id.file_name();
            let _ = id.container();
        }
    }
});
