//! BMP file header and palette parsing.

use alloc::format;

use crate::cursor::Cursor;
use crate::error::BmpError;

/// Compression mode from the header's compression field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Uncompressed (BI_RGB).
    None,
    /// 8-bit run-length encoding (BI_RLE8).
    Rle8,
    /// 4-bit run-length encoding (BI_RLE4).
    Rle4,
    /// Channel bitmasks follow the header (BI_BITFIELDS).
    Bitfields,
}

impl Compression {
    fn from_u32(num: u32) -> Option<Self> {
        match num {
            0 => Some(Self::None),
            1 => Some(Self::Rle8),
            2 => Some(Self::Rle4),
            3 => Some(Self::Bitfields),
            _ => None,
        }
    }
}

/// One indexed color from the palette table.
#[derive(Clone, Copy, Default, Debug)]
pub(crate) struct PaletteEntry {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// The fourth byte of each palette entry. Stored but never used.
    #[allow(dead_code)]
    pub reserved: u8,
}

/// Parsed fixed-offset header fields. Every field is recorded from the
/// stream even when decoding never reads it back.
///
/// `height` is stored as its absolute value; a negative height in the file
/// clears `bottom_up` instead.
#[allow(dead_code)]
pub(crate) struct BitmapHeader {
    pub file_size: u32,
    pub pixel_data_offset: u32,
    pub header_size: u32,
    pub width: u32,
    pub height: u32,
    pub bottom_up: bool,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: Compression,
    pub raw_size: u32,
    pub h_res: u32,
    pub v_res: u32,
    pub color_count: u32,
    pub important_colors: u32,
}

impl BitmapHeader {
    /// Parse the 54-byte header from the start of the stream.
    ///
    /// The cursor is left at the first byte after the header, where the
    /// palette (if any) and then the pixel data follow. The pixel data
    /// offset field is recorded but never used for seeking.
    ///
    /// When `sixteen_bit_alpha` is set, a 16-bit depth is reinterpreted as
    /// 15-bit (5-5-5 plus a one-bit alpha flag) for all later dispatch.
    pub(crate) fn parse(
        cursor: &mut Cursor<'_>,
        sixteen_bit_alpha: bool,
    ) -> Result<Self, BmpError> {
        if cursor.read_u8()? != b'B' || cursor.read_u8()? != b'M' {
            return Err(BmpError::NotABitmap);
        }

        let file_size = cursor.get_u32_le()?;
        let _reserved = cursor.get_u32_le()?;
        let pixel_data_offset = cursor.get_u32_le()?;
        let header_size = cursor.get_u32_le()?;
        let width = cursor.get_u32_le()?;
        let height = cursor.get_i32_le()?;
        let planes = cursor.get_u16_le()?;
        let mut bits_per_pixel = cursor.get_u16_le()?;
        let compression_field = cursor.get_u32_le()?;
        let raw_size = cursor.get_u32_le()?;
        let h_res = cursor.get_u32_le()?;
        let v_res = cursor.get_u32_le()?;
        let color_count = cursor.get_u32_le()?;
        let important_colors = cursor.get_u32_le()?;

        if bits_per_pixel == 16 && sixteen_bit_alpha {
            bits_per_pixel = 15;
        }

        if !matches!(bits_per_pixel, 1 | 4 | 8 | 15 | 16 | 24 | 32) {
            return Err(BmpError::Unsupported(format!(
                "bit depth {bits_per_pixel} unsupported"
            )));
        }

        let compression = Compression::from_u32(compression_field).ok_or_else(|| {
            BmpError::Unsupported(format!("compression scheme {compression_field}"))
        })?;

        if width == 0 {
            return Err(BmpError::InvalidHeader("width is zero".into()));
        }
        if height == 0 {
            return Err(BmpError::InvalidHeader("height is zero".into()));
        }

        let bottom_up = height > 0;

        Ok(Self {
            file_size,
            pixel_data_offset,
            header_size,
            width,
            height: height.unsigned_abs(),
            bottom_up,
            planes,
            bits_per_pixel,
            compression,
            raw_size,
            h_res,
            v_res,
            color_count,
            important_colors,
        })
    }

    /// Number of palette entries declared by the header.
    pub(crate) fn palette_len(&self) -> usize {
        if self.color_count == 0 {
            1usize << self.bits_per_pixel
        } else {
            self.color_count as usize
        }
    }
}

/// Read the palette table that follows the header for indexed depths.
///
/// Entries are stored as [blue, green, red, reserved]. The table is kept as
/// a fixed 256-entry array so nibble and byte indices never go out of
/// bounds; entries past the declared count stay zeroed.
pub(crate) fn read_palette(
    cursor: &mut Cursor<'_>,
    header: &BitmapHeader,
) -> Result<[PaletteEntry; 256], BmpError> {
    let len = header.palette_len();
    let mut palette = [PaletteEntry::default(); 256];
    for i in 0..len {
        let blue = cursor.read_u8()?;
        let green = cursor.read_u8()?;
        let red = cursor.read_u8()?;
        let reserved = cursor.read_u8()?;
        if i < 256 {
            palette[i] = PaletteEntry {
                red,
                green,
                blue,
                reserved,
            };
        }
    }
    Ok(palette)
}

/// Header-only description of a BMP stream, without decoding pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u16,
    pub compression: Compression,
    /// Whether rows are stored bottom-up (the BMP default).
    pub bottom_up: bool,
}

impl ImageInfo {
    pub(crate) fn from_header(header: &BitmapHeader) -> Self {
        Self {
            width: header.width,
            height: header.height,
            bits_per_pixel: header.bits_per_pixel,
            compression: header.compression,
            bottom_up: header.bottom_up,
        }
    }
}
