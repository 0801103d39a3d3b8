//! Encode→decode round trips for the uncompressed 24- and 32-bit output.

use bmpcodec::*;
use enough::Unstoppable;

/// Checkerboard in the decoder's [alpha, blue, green, red] layout.
fn checkerboard(w: usize, h: usize, alpha: u8) -> Vec<u8> {
    let mut pixels = vec![0u8; w * h * 4];
    for y in 0..h {
        for x in 0..w {
            let off = (y * w + x) * 4;
            pixels[off] = alpha;
            if (x + y) % 2 == 0 {
                pixels[off + 1] = 200;
                pixels[off + 2] = 100;
                pixels[off + 3] = 50;
            } else {
                pixels[off + 1] = 10;
                pixels[off + 2] = 20;
                pixels[off + 3] = 30;
            }
        }
    }
    pixels
}

#[test]
fn bmp24_roundtrip() {
    let (w, h) = (4usize, 3usize);
    // 24-bit decode forces alpha to 0, so start from alpha 0 for equality
    let pixels = checkerboard(w, h, 0);

    let encoded = encode(
        &pixels,
        w as u32,
        h as u32,
        &EncodeOptions::default(),
        Unstoppable,
    )
    .unwrap();
    assert_eq!(&encoded[0..2], b"BM");
    assert_eq!(encoded.len(), 54 + h * (w * 3).div_ceil(4) * 4);

    let decoded = decode(&encoded, Unstoppable).unwrap();
    assert_eq!(decoded.width, w as u32);
    assert_eq!(decoded.height, h as u32);
    assert_eq!(decoded.pixels(), &pixels[..]);
}

#[test]
fn bmp24_roundtrip_odd_width_padding() {
    let (w, h) = (3usize, 2usize);
    let pixels = checkerboard(w, h, 0);

    let encoded = encode(
        &pixels,
        w as u32,
        h as u32,
        &EncodeOptions::default(),
        Unstoppable,
    )
    .unwrap();
    // 3 * 3 = 9 bytes per row, padded to 12
    assert_eq!(encoded.len(), 54 + h * 12);

    let decoded = decode(&encoded, Unstoppable).unwrap();
    assert_eq!(decoded.pixels(), &pixels[..]);
}

#[test]
fn bmp32_roundtrip_preserves_alpha() {
    let (w, h) = (3usize, 3usize);
    let pixels = checkerboard(w, h, 128);

    let encoded = encode(
        &pixels,
        w as u32,
        h as u32,
        &EncodeOptions {
            alpha: true,
            ..Default::default()
        },
        Unstoppable,
    )
    .unwrap();
    assert_eq!(encoded.len(), 54 + w * h * 4);

    let decoded = decode(&encoded, Unstoppable).unwrap();
    assert_eq!(decoded.pixels(), &pixels[..]);
}

#[test]
fn quality_option_is_ignored() {
    let pixels = checkerboard(2, 2, 0);
    let plain = encode(&pixels, 2, 2, &EncodeOptions::default(), Unstoppable).unwrap();
    let with_quality = encode(
        &pixels,
        2,
        2,
        &EncodeOptions {
            quality: Some(80),
            ..Default::default()
        },
        Unstoppable,
    )
    .unwrap();
    assert_eq!(plain, with_quality);
}

#[test]
fn short_input_buffer_rejected() {
    let pixels = vec![0u8; 7]; // needs 2 * 1 * 4 = 8
    assert!(matches!(
        encode(&pixels, 2, 1, &EncodeOptions::default(), Unstoppable),
        Err(BmpError::BufferTooSmall { needed: 8, actual: 7 })
    ));
}

#[test]
fn encoded_header_is_bottom_up_uncompressed() {
    let pixels = checkerboard(2, 2, 0);
    let encoded = encode(&pixels, 2, 2, &EncodeOptions::default(), Unstoppable).unwrap();

    let info = probe(&encoded).unwrap();
    assert_eq!(info.width, 2);
    assert_eq!(info.height, 2);
    assert_eq!(info.bits_per_pixel, 24);
    assert_eq!(info.compression, Compression::None);
    assert!(info.bottom_up);
}
