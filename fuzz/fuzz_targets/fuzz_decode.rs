#![no_main]
use bmpcodec::{DecodeOptions, Limits};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let options = DecodeOptions {
        sixteen_bit_alpha: data.first().is_some_and(|b| b & 1 == 1),
        limits: Some(Limits {
            max_pixels: Some(1 << 20),
            ..Default::default()
        }),
    };

    // Must never panic, whatever the bytes are
    let _ = bmpcodec::probe(data);
    let _ = bmpcodec::decode_with_options(data, &options, enough::Unstoppable);
});
