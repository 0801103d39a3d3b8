//! Byte cursor over `&[u8]` with little-endian reads.

use crate::error::BmpError;

/// Read cursor over the input byte stream.
///
/// Reads are strict: any read past the end of the data fails with
/// [`BmpError::TruncatedData`]. `advance` is the exception — row-padding
/// skips move the position without touching the data, so a file that ends
/// exactly at the last pixel still decodes.
pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, BmpError> {
        if self.pos < self.data.len() {
            let b = self.data[self.pos];
            self.pos += 1;
            Ok(b)
        } else {
            Err(BmpError::TruncatedData)
        }
    }

    pub(crate) fn get_u16_le(&mut self) -> Result<u16, BmpError> {
        if self.pos + 2 > self.data.len() {
            return Err(BmpError::TruncatedData);
        }
        let val = u16::from_le_bytes([self.data[self.pos], self.data[self.pos + 1]]);
        self.pos += 2;
        Ok(val)
    }

    pub(crate) fn get_u32_le(&mut self) -> Result<u32, BmpError> {
        if self.pos + 4 > self.data.len() {
            return Err(BmpError::TruncatedData);
        }
        let val = u32::from_le_bytes([
            self.data[self.pos],
            self.data[self.pos + 1],
            self.data[self.pos + 2],
            self.data[self.pos + 3],
        ]);
        self.pos += 4;
        Ok(val)
    }

    pub(crate) fn get_i32_le(&mut self) -> Result<i32, BmpError> {
        self.get_u32_le().map(|v| v as i32)
    }

    /// Move the position forward without reading. Never fails; a position
    /// past the end only matters if a later read happens.
    pub(crate) fn advance(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn le_reads_advance_position() {
        let mut c = Cursor::new(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
        assert_eq!(c.get_u16_le().unwrap(), 0x0201);
        assert_eq!(c.get_u32_le().unwrap(), 0x0605_0403);
        assert!(matches!(c.read_u8(), Err(BmpError::TruncatedData)));
    }

    #[test]
    fn advance_past_end_is_harmless_until_read() {
        let mut c = Cursor::new(&[0xAA]);
        c.advance(10);
        assert!(matches!(c.read_u8(), Err(BmpError::TruncatedData)));
    }
}
