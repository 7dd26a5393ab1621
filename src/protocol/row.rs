use crate::error::{Error, Result};
use crate::protocol::value::NullBitmap;

/// Header byte of a binary row packet
pub const BINARY_ROW_HEADER: u8 = 0x00;

/// A binary row split into its NULL bitmap and the offset of its fields.
#[derive(Debug, Clone, Copy)]
pub struct BinaryRowPayload<'a> {
    pub(crate) null_bitmap: NullBitmap<'a>,
    /// Offset of the first field inside the full row buffer
    pub(crate) values_offset: usize,
}

impl<'a> BinaryRowPayload<'a> {
    /// Frame a row: 1 header byte, `(num_columns + 9) / 8` bitmap bytes, then fields.
    pub fn parse(row: &'a [u8], num_columns: usize) -> Result<Self> {
        let bitmap_len = NullBitmap::result_set_len(num_columns);
        let values_offset = 1 + bitmap_len;
        let (header, rest) = row.split_first().ok_or(Error::UnexpectedEof)?;
        if *header != BINARY_ROW_HEADER {
            return Err(Error::ProtocolCorruption(format!(
                "binary row starts with 0x{:02X}",
                header
            )));
        }
        if rest.len() < bitmap_len {
            return Err(Error::UnexpectedEof);
        }
        Ok(Self {
            null_bitmap: NullBitmap::for_result_set(&rest[..bitmap_len]),
            values_offset,
        })
    }

    pub fn null_bitmap(&self) -> NullBitmap<'a> {
        self.null_bitmap
    }

    pub fn values_offset(&self) -> usize {
        self.values_offset
    }
}

/// A text row: every field is length-prefixed, NULL is the `0xFB` prefix.
#[derive(Debug, Clone, Copy)]
pub struct TextRowPayload<'a>(pub &'a [u8]);

impl<'a> TextRowPayload<'a> {
    pub fn bytes(&self) -> &'a [u8] {
        self.0
    }
}
