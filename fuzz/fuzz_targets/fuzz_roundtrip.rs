#![no_main]
use bmpcodec::{DecodeOptions, EncodeOptions, Limits};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let options = DecodeOptions {
        sixteen_bit_alpha: false,
        limits: Some(Limits {
            max_pixels: Some(1 << 20),
            ..Default::default()
        }),
    };
    let Ok(decoded) = bmpcodec::decode_with_options(data, &options, enough::Unstoppable) else {
        return;
    };

    // 32-bit output preserves every channel, so a second decode of the
    // re-encoded bytes must reproduce the pixels exactly.
    let encode_options = EncodeOptions {
        alpha: true,
        ..Default::default()
    };
    let reencoded = bmpcodec::encode(
        decoded.pixels(),
        decoded.width,
        decoded.height,
        &encode_options,
        enough::Unstoppable,
    )
    .expect("decoded image failed to re-encode");

    let decoded2 = bmpcodec::decode(&reencoded, enough::Unstoppable)
        .expect("re-encoded data failed to decode");
    assert_eq!(decoded.pixels(), decoded2.pixels(), "roundtrip pixel mismatch");
    assert_eq!(decoded.width, decoded2.width);
    assert_eq!(decoded.height, decoded2.height);
});
