#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut banks = banks::Banks::new(banks::Options::default());
    for format in [linkfile::Format::Map, linkfile::Format::Rgbds] {
        if let Ok(areas) = format.parse(data) {
            for area in areas {
                banks.check(area);
            }
        }
    }
    let _ = banks.finalize_and_render(&mut std::io::sink());
});
