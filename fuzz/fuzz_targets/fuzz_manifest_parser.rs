#![no_main]
use jarscope::manifest::{parse_manifest, ManifestParser};
use libfuzzer_sys::fuzz_target;

/// Fuzz the manifest parser with arbitrary text, both in one piece and fed
/// line by line.
fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let whole = parse_manifest(&text);

    let mut parser = ManifestParser::new();
    for line in text.lines() {
        parser.feed_line(line);
    }
    assert_eq!(parser.finish(), whole);
});
