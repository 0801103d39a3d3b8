//! BMP encoder: uncompressed 24-bit and 32-bit output from the decoder's
//! [alpha, blue, green, red] pixel buffer.

use alloc::vec::Vec;

use enough::Stop;

use crate::error::BmpError;

/// Options for an encode call.
#[derive(Clone, Debug, Default)]
pub struct EncodeOptions {
    /// Write 32-bit output with an alpha channel instead of 24-bit.
    pub alpha: bool,
    /// Accepted for interface compatibility; the uncompressed encoder has
    /// no quality knob and ignores it.
    pub quality: Option<u8>,
}

/// Encode an [alpha, blue, green, red] pixel buffer to BMP bytes.
pub(crate) fn encode_pixels(
    pixels: &[u8],
    width: u32,
    height: u32,
    options: &EncodeOptions,
    stop: &dyn Stop,
) -> Result<Vec<u8>, BmpError> {
    let w = width as usize;
    let h = height as usize;
    let expected = w
        .checked_mul(h)
        .and_then(|wh| wh.checked_mul(4))
        .ok_or(BmpError::DimensionsTooLarge { width, height })?;
    if pixels.len() < expected {
        return Err(BmpError::BufferTooSmall {
            needed: expected,
            actual: pixels.len(),
        });
    }

    stop.check()?;

    if options.alpha {
        encode_32bit(pixels, width, height, w, h, stop)
    } else {
        encode_24bit(pixels, width, height, w, h, stop)
    }
}

fn encode_24bit(
    pixels: &[u8],
    width: u32,
    height: u32,
    w: usize,
    h: usize,
    stop: &dyn Stop,
) -> Result<Vec<u8>, BmpError> {
    let row_stride = w
        .checked_mul(3)
        .and_then(|r| r.checked_add(3))
        .map(|r| r & !3)
        .ok_or(BmpError::DimensionsTooLarge { width, height })?;
    let pixel_data_size = row_stride
        .checked_mul(h)
        .ok_or(BmpError::DimensionsTooLarge { width, height })?;
    let file_size = pixel_data_size
        .checked_add(54)
        .ok_or(BmpError::DimensionsTooLarge { width, height })?;

    let mut out = Vec::with_capacity(file_size);
    write_bmp_header(&mut out, file_size, pixel_data_size, width, height, 24);

    let pad_bytes = row_stride - w * 3;
    for row in (0..h).rev() {
        if row % 16 == 0 {
            stop.check()?;
        }
        for col in 0..w {
            let off = (row * w + col) * 4;
            out.push(pixels[off + 1]); // blue
            out.push(pixels[off + 2]); // green
            out.push(pixels[off + 3]); // red
        }
        out.extend(core::iter::repeat_n(0u8, pad_bytes));
    }

    Ok(out)
}

fn encode_32bit(
    pixels: &[u8],
    width: u32,
    height: u32,
    w: usize,
    h: usize,
    stop: &dyn Stop,
) -> Result<Vec<u8>, BmpError> {
    let row_stride = w
        .checked_mul(4)
        .ok_or(BmpError::DimensionsTooLarge { width, height })?;
    let pixel_data_size = row_stride
        .checked_mul(h)
        .ok_or(BmpError::DimensionsTooLarge { width, height })?;
    let file_size = pixel_data_size
        .checked_add(54)
        .ok_or(BmpError::DimensionsTooLarge { width, height })?;

    let mut out = Vec::with_capacity(file_size);
    write_bmp_header(&mut out, file_size, pixel_data_size, width, height, 32);

    for row in (0..h).rev() {
        if row % 16 == 0 {
            stop.check()?;
        }
        for col in 0..w {
            let off = (row * w + col) * 4;
            out.push(pixels[off + 1]); // blue
            out.push(pixels[off + 2]); // green
            out.push(pixels[off + 3]); // red
            out.push(pixels[off]); // alpha
        }
    }

    Ok(out)
}

fn write_bmp_header(
    out: &mut Vec<u8>,
    file_size: usize,
    pixel_data_size: usize,
    width: u32,
    height: u32,
    bpp: u16,
) {
    // File header (14 bytes)
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(file_size as u32).to_le_bytes());
    out.extend_from_slice(&[0u8; 4]); // reserved
    out.extend_from_slice(&54u32.to_le_bytes()); // data offset

    // BITMAPINFOHEADER (40 bytes)
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(height as i32).to_le_bytes()); // positive = bottom-up
    out.extend_from_slice(&1u16.to_le_bytes()); // planes
    out.extend_from_slice(&bpp.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // compression
    out.extend_from_slice(&(pixel_data_size as u32).to_le_bytes());
    out.extend_from_slice(&2835u32.to_le_bytes()); // h resolution (72 DPI)
    out.extend_from_slice(&2835u32.to_le_bytes()); // v resolution
    out.extend_from_slice(&0u32.to_le_bytes()); // colors used
    out.extend_from_slice(&0u32.to_le_bytes()); // important colors
}
