//! Row packet builders shared by the integration tests.

#![allow(dead_code)]

use zero_rowcodec::protocol::primitive::{write_bytes_lenenc, write_null};

/// Builds a binary-encoded row: header, NULL bitmap, then the field bytes.
pub struct BinaryRow {
    num_columns: usize,
    bitmap: Vec<u8>,
    values: Vec<u8>,
}

impl BinaryRow {
    pub fn new(num_columns: usize) -> Self {
        Self {
            num_columns,
            bitmap: vec![0; (num_columns + 9) / 8],
            values: Vec::new(),
        }
    }

    pub fn null(mut self, idx: usize) -> Self {
        let bit = idx + 2;
        self.bitmap[bit / 8] |= 1 << (bit % 8);
        self
    }

    pub fn i8(mut self, v: i8) -> Self {
        self.values.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i16(mut self, v: i16) -> Self {
        self.values.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.values.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i64(mut self, v: i64) -> Self {
        self.values.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u64(mut self, v: u64) -> Self {
        self.values.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f64(mut self, v: f64) -> Self {
        self.values.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn lenenc(mut self, data: &[u8]) -> Self {
        write_bytes_lenenc(&mut self.values, data);
        self
    }

    /// Packed DATE/DATETIME: `len` is 0, 4, 7 or 11
    pub fn datetime(self, parts: (u16, u8, u8, u8, u8, u8, u32), len: u8) -> Self {
        let (year, month, day, hour, minute, second, micros) = parts;
        let mut packed = Vec::new();
        if len >= 4 {
            packed.extend_from_slice(&year.to_le_bytes());
            packed.extend_from_slice(&[month, day]);
        }
        if len >= 7 {
            packed.extend_from_slice(&[hour, minute, second]);
        }
        if len >= 11 {
            packed.extend_from_slice(&micros.to_le_bytes());
        }
        self.lenenc(&packed)
    }

    /// Unprefixed bytes, for composite fields
    pub fn raw(mut self, data: &[u8]) -> Self {
        self.values.extend_from_slice(data);
        self
    }

    pub fn build(self) -> Vec<u8> {
        assert_eq!(self.bitmap.len(), (self.num_columns + 9) / 8);
        let mut row = vec![0x00];
        row.extend_from_slice(&self.bitmap);
        row.extend_from_slice(&self.values);
        row
    }
}

/// Builds a text-encoded row; `None` fields are written as the NULL marker.
pub fn text_row(fields: &[Option<&str>]) -> Vec<u8> {
    let mut row = Vec::new();
    for field in fields {
        match field {
            Some(data) => write_bytes_lenenc(&mut row, data.as_bytes()),
            None => write_null(&mut row),
        }
    }
    row
}

/// Print decoder traces in the test output (`cargo test -- --nocapture`).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}
