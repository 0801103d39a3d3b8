//! # bmpcodec
//!
//! Windows BMP decoder and uncompressed encoder.
//!
//! ## Decoding
//!
//! Decodes 1, 4, 8, 15, 16, 24, and 32 bits-per-pixel BMP streams,
//! including RLE4/RLE8 compression and 16-bit bitfield masks, into one
//! normalized pixel buffer: `width * height * 4` bytes, row-major
//! top-down, each pixel stored as `[alpha, blue, green, red]`.
//!
//! 16-bit images can optionally be reinterpreted as 5-5-5 with a one-bit
//! alpha flag via [`DecodeOptions::sixteen_bit_alpha`].
//!
//! ## Encoding
//!
//! Encodes the same buffer layout back to uncompressed 24-bit (default) or
//! 32-bit BMP bytes. No palette output, no compression.
//!
//! ## Non-Goals
//!
//! - File I/O and CLI surfaces — callers bring their own bytes
//! - Color/compression quality negotiation (the `quality` option is
//!   accepted and ignored)
//!
//! ## Usage
//!
//! ```no_run
//! use bmpcodec::{EncodeOptions, Unstoppable};
//!
//! let data: &[u8] = &[]; // your BMP bytes
//!
//! // Probe without decoding
//! let info = bmpcodec::probe(data)?;
//! let _ = (info.width, info.height);
//!
//! // Decode
//! let decoded = bmpcodec::decode(data, Unstoppable)?;
//! assert_eq!(
//!     decoded.pixels().len(),
//!     decoded.width as usize * decoded.height as usize * 4
//! );
//!
//! // Re-encode as uncompressed 24-bit BMP
//! let encoded = bmpcodec::encode(
//!     decoded.pixels(),
//!     decoded.width,
//!     decoded.height,
//!     &EncodeOptions::default(),
//!     Unstoppable,
//! )?;
//! # Ok::<(), bmpcodec::BmpError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod cursor;
mod decode;
mod encode;
mod error;
mod header;
mod limits;

use alloc::vec::Vec;

// Re-exports
pub use decode::{DecodeOptions, DecodeOutput};
pub use encode::EncodeOptions;
pub use enough::{Stop, Unstoppable};
pub use error::BmpError;
pub use header::{Compression, ImageInfo};
pub use limits::Limits;

/// Decode a BMP byte stream with default options.
pub fn decode(data: &[u8], stop: impl Stop) -> Result<DecodeOutput, BmpError> {
    decode::decode_pixels(data, &DecodeOptions::default(), &stop)
}

/// Decode a BMP byte stream.
pub fn decode_with_options(
    data: &[u8],
    options: &DecodeOptions,
    stop: impl Stop,
) -> Result<DecodeOutput, BmpError> {
    decode::decode_pixels(data, options, &stop)
}

/// Parse only the header: dimensions, bit depth, compression, row order.
pub fn probe(data: &[u8]) -> Result<ImageInfo, BmpError> {
    let mut cursor = cursor::Cursor::new(data);
    let header = header::BitmapHeader::parse(&mut cursor, false)?;
    Ok(ImageInfo::from_header(&header))
}

/// Encode an `[alpha, blue, green, red]` pixel buffer to BMP bytes.
pub fn encode(
    pixels: &[u8],
    width: u32,
    height: u32,
    options: &EncodeOptions,
    stop: impl Stop,
) -> Result<Vec<u8>, BmpError> {
    encode::encode_pixels(pixels, width, height, options, &stop)
}
