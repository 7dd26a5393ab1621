/// Wire-level field representations shared by both row encodings
use crate::col::ColumnDefinition;
use crate::constant::ColumnType;
use crate::error::{Error, Result, eyre};
use crate::protocol::primitive::*;
use zerocopy::byteorder::big_endian::U32 as U32BE;
use zerocopy::byteorder::little_endian::{U16 as U16LE, U32 as U32LE};
use zerocopy::{FromBytes, Immutable, KnownLayout};

/// One field of a row, decoded just far enough to be wire-format independent.
///
/// Conversions to the requested representation happen in `decode::convert`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    /// Signed integer (TINYINT, SMALLINT, MEDIUMINT, INT, BIGINT, YEAR, NUMBER)
    SignedInt(i64),
    /// Unsigned integer column
    UnsignedInt(u64),
    /// FLOAT / BINARY_FLOAT
    Float(f32),
    /// DOUBLE / BINARY_DOUBLE
    Double(f64),
    /// Characters: every text-encoded scalar, and binary-encoded strings and decimals
    Text(&'a [u8]),
    /// Opaque bytes: BIT, RAW, GEOMETRY, binary collation blobs, intervals
    Bytes(&'a [u8]),
    /// Packed DATE/DATETIME/TIMESTAMP family
    DateTime(DateTimeParts),
    /// Packed TIME
    Time(TimeParts),
}

impl<'a> Field<'a> {
    /// Interpret the exact bytes of a binary-encoded field.
    pub fn from_binary(col: &ColumnDefinition, data: &'a [u8]) -> Result<Self> {
        let is_unsigned = col.is_unsigned();

        match col.column_type {
            ColumnType::TINYINT => {
                let (val, _) = read_int_1(data)?;
                Ok(if is_unsigned {
                    Field::UnsignedInt(u64::from(val))
                } else {
                    Field::SignedInt(i64::from(val as i8))
                })
            }

            ColumnType::SMALLINT | ColumnType::YEAR => {
                let (val, _) = read_int_2(data)?;
                Ok(if is_unsigned {
                    Field::UnsignedInt(u64::from(val))
                } else {
                    Field::SignedInt(i64::from(val as i16))
                })
            }

            ColumnType::MEDIUMINT | ColumnType::INTEGER | ColumnType::NUMBER => {
                let (val, _) = read_int_4(data)?;
                Ok(if is_unsigned {
                    Field::UnsignedInt(u64::from(val))
                } else {
                    Field::SignedInt(i64::from(val as i32))
                })
            }

            ColumnType::BIGINT => {
                let (val, _) = read_int_8(data)?;
                Ok(if is_unsigned {
                    Field::UnsignedInt(val)
                } else {
                    Field::SignedInt(val as i64)
                })
            }

            ColumnType::FLOAT | ColumnType::BINARY_FLOAT => {
                let (val, _) = read_int_4(data)?;
                Ok(Field::Float(f32::from_bits(val)))
            }

            ColumnType::DOUBLE | ColumnType::BINARY_DOUBLE => {
                let (val, _) = read_int_8(data)?;
                Ok(Field::Double(f64::from_bits(val)))
            }

            ColumnType::DATE
            | ColumnType::NEWDATE
            | ColumnType::DATETIME
            | ColumnType::TIMESTAMP => Ok(Field::DateTime(DateTimeParts::from_packed(data, false)?)),

            ColumnType::TIMESTAMP_NANO | ColumnType::TIMESTAMP_TZ | ColumnType::TIMESTAMP_LTZ => {
                Ok(Field::DateTime(DateTimeParts::from_packed(data, true)?))
            }

            ColumnType::TIME => Ok(Field::Time(TimeParts::from_packed(data)?)),

            _ => Ok(Self::opaque_or_text(col, data)),
        }
    }

    /// Interpret the bytes of a text-encoded field.
    pub fn from_text(col: &ColumnDefinition, data: &'a [u8]) -> Self {
        Self::opaque_or_text(col, data)
    }

    fn opaque_or_text(col: &ColumnDefinition, data: &'a [u8]) -> Self {
        match col.column_type {
            ColumnType::BIT
            | ColumnType::RAW
            | ColumnType::GEOMETRY
            | ColumnType::ARRAY
            | ColumnType::STRUCT
            | ColumnType::COMPLEX
            | ColumnType::CURSOR => Field::Bytes(data),
            ColumnType::INTERVALYM | ColumnType::INTERVALDS => Field::Bytes(data),
            ty if ty.is_blob() && col.is_binary() => Field::Bytes(data),
            ColumnType::ORA_BLOB => Field::Bytes(data),
            _ => Field::Text(data),
        }
    }
}

// ============================================================================
// Temporal Types
// ============================================================================

/// DATE/DATETIME/TIMESTAMP - 4 bytes (date only)
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
pub struct Timestamp4 {
    pub year: U16LE,
    pub month: u8,
    pub day: u8,
}

/// DATE/DATETIME/TIMESTAMP - 7 bytes (without fraction)
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
pub struct Timestamp7 {
    pub year: U16LE,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// DATE/DATETIME/TIMESTAMP - 11 bytes (with fraction)
///
/// The fraction is microseconds for MySQL types and nanoseconds for the
/// Oracle TIMESTAMP family.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
pub struct Timestamp11 {
    pub year: U16LE,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub fraction: U32LE,
}

/// TIME - 8 bytes
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
pub struct Time8 {
    pub is_negative: u8,
    pub days: U32LE,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// TIME - 12 bytes: negative (1), days (4 LE), hour (1), minute (1), second (1), microsecond (4 LE)
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
pub struct Time12 {
    pub is_negative: u8,
    pub days: U32LE,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub microsecond: U32LE,
}

/// INTERVAL YEAR TO MONTH - 5 bytes, Oracle biased encoding
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
pub struct IntervalYm5 {
    pub year: U32BE,
    pub month: u8,
}

/// INTERVAL DAY TO SECOND - 11 bytes, Oracle biased encoding
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
pub struct IntervalDs11 {
    pub day: U32BE,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub fraction: U32BE,
}

/// Calendar fields of a date-time value, however it was encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTimeParts {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub nanos: u32,
    /// Offset east of UTC in seconds, for TIMESTAMP WITH TIME ZONE
    pub offset_seconds: Option<i32>,
    /// Packed byte length, or the text length for text-encoded values
    pub len: usize,
}

impl DateTimeParts {
    /// Decode the packed layout. `nano_fraction` selects the Oracle variant whose
    /// 4-byte fraction is nanoseconds, optionally followed by a scale byte and
    /// a signed hour/minute zone offset.
    pub fn from_packed(data: &[u8], nano_fraction: bool) -> Result<Self> {
        let len = data.len();
        let mut parts = DateTimeParts {
            len,
            ..Default::default()
        };
        match len {
            0 => {}
            4..=6 => {
                let ts = Timestamp4::ref_from_prefix(data).map_err(Error::from_debug)?.0;
                parts.set_date(ts.year.get(), ts.month, ts.day);
            }
            7..=10 => {
                let ts = Timestamp7::ref_from_prefix(data).map_err(Error::from_debug)?.0;
                parts.set_date(ts.year.get(), ts.month, ts.day);
                parts.set_time(ts.hour, ts.minute, ts.second);
            }
            _ if len >= 11 => {
                let (ts, rest) = Timestamp11::ref_from_prefix(data).map_err(Error::from_debug)?;
                parts.set_date(ts.year.get(), ts.month, ts.day);
                parts.set_time(ts.hour, ts.minute, ts.second);
                let fraction = ts.fraction.get();
                let limit = if nano_fraction { 1_000_000_000 } else { 1_000_000 };
                if fraction >= limit {
                    return Err(Error::ProtocolCorruption(format!(
                        "fractional seconds out of range: {}",
                        fraction
                    )));
                }
                parts.nanos = if nano_fraction { fraction } else { fraction * 1000 };
                // rest: [scale][offset hour][offset minute][region...]
                if nano_fraction && let [_scale, hour, minute, ..] = rest {
                    let hours = i32::from(*hour as i8);
                    let minutes = i32::from(*minute as i8);
                    parts.offset_seconds = Some(hours * 3600 + minutes * 60);
                }
            }
            _ => {
                return Err(Error::LibraryBug(eyre!(
                    "invalid timestamp length: {}",
                    len
                )));
            }
        }
        Ok(parts)
    }

    fn set_date(&mut self, year: u16, month: u8, day: u8) {
        self.year = year;
        self.month = month;
        self.day = day;
    }

    fn set_time(&mut self, hour: u8, minute: u8, second: u8) {
        self.hour = hour;
        self.minute = minute;
        self.second = second;
    }

    /// `0000-00-00`, including the empty binary encoding
    pub fn is_zero_date(&self) -> bool {
        self.len == 0 || (self.year == 0 && self.month == 0 && self.day == 0)
    }
}

/// Fields of a TIME value. `hour` stays below 24; whole days are in `days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeParts {
    pub negative: bool,
    pub days: u32,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub micros: u32,
    /// Packed byte length, or the text length for text-encoded values
    pub len: usize,
}

impl TimeParts {
    pub fn from_packed(data: &[u8]) -> Result<Self> {
        let len = data.len();
        match len {
            0 => Ok(TimeParts::default()),
            8..=11 => {
                let t = Time8::ref_from_prefix(data).map_err(Error::from_debug)?.0;
                Ok(TimeParts {
                    negative: t.is_negative != 0,
                    days: t.days.get(),
                    hour: t.hour,
                    minute: t.minute,
                    second: t.second,
                    micros: 0,
                    len,
                })
            }
            _ if len >= 12 => {
                let t = Time12::ref_from_prefix(data).map_err(Error::from_debug)?.0;
                let micros = t.microsecond.get();
                if micros >= 1_000_000 {
                    return Err(Error::ProtocolCorruption(format!(
                        "TIME microseconds out of range: {}",
                        micros
                    )));
                }
                Ok(TimeParts {
                    negative: t.is_negative != 0,
                    days: t.days.get(),
                    hour: t.hour,
                    minute: t.minute,
                    second: t.second,
                    micros,
                    len,
                })
            }
            _ => Err(Error::LibraryBug(eyre!("invalid time length: {}", len))),
        }
    }

    /// Hours including whole days
    pub fn total_hours(&self) -> u64 {
        u64::from(self.days) * 24 + u64::from(self.hour)
    }
}

// ============================================================================
// NULL Bitmap
// ============================================================================

/// NULL bitmap of a binary row or of a composite value.
///
/// Each bit marks one column NULL (1 = NULL). Result set rows and composite
/// values reserve the two lowest bits, so column `i` lives at bit `i + 2`.
#[derive(Debug, Clone, Copy)]
pub struct NullBitmap<'a> {
    bitmap: &'a [u8],
    offset: usize,
}

impl<'a> NullBitmap<'a> {
    /// Create a NULL bitmap for result sets (offset = 2)
    pub fn for_result_set(bitmap: &'a [u8]) -> Self {
        Self { bitmap, offset: 2 }
    }

    /// Byte length of a result set bitmap for `num_columns` columns
    pub fn result_set_len(num_columns: usize) -> usize {
        (num_columns + 7 + 2) >> 3
    }

    /// Check if the column at the given index is NULL
    pub fn is_null(&self, idx: usize) -> bool {
        let bit_pos = idx + self.offset;
        let byte_pos = bit_pos >> 3;
        let bit_offset = bit_pos & 7;

        match self.bitmap.get(byte_pos) {
            Some(byte) => (byte & (1 << bit_offset)) != 0,
            None => false,
        }
    }

    /// Get the raw bitmap bytes
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bitmap
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::ColumnFlags;

    fn col(column_type: ColumnType) -> ColumnDefinition {
        ColumnDefinition::new("c", column_type)
    }

    #[test]
    fn field_signed_integers() {
        let value = Field::from_binary(&col(ColumnType::TINYINT), &[214]).unwrap();
        assert_eq!(value, Field::SignedInt(-42));

        let value = Field::from_binary(&col(ColumnType::SMALLINT), &[0x18, 0xFC]).unwrap();
        assert_eq!(value, Field::SignedInt(-1000));

        let value =
            Field::from_binary(&col(ColumnType::INTEGER), &[0x60, 0x79, 0xFE, 0xFF]).unwrap();
        assert_eq!(value, Field::SignedInt(-100000));
    }

    #[test]
    fn field_unsigned_integers() {
        let unsigned = col(ColumnType::TINYINT).with_flags(ColumnFlags::UNSIGNED_FLAG);
        assert_eq!(Field::from_binary(&unsigned, &[200]).unwrap(), Field::UnsignedInt(200));

        let unsigned = col(ColumnType::BIGINT).with_flags(ColumnFlags::UNSIGNED_FLAG);
        let bytes = u64::MAX.to_le_bytes();
        let value = Field::from_binary(&unsigned, &bytes).unwrap();
        assert_eq!(value, Field::UnsignedInt(u64::MAX));
    }

    #[test]
    fn field_float_double() {
        let bytes = 1.5f32.to_le_bytes();
        let value = Field::from_binary(&col(ColumnType::FLOAT), &bytes).unwrap();
        assert_eq!(value, Field::Float(1.5));

        let data = std::f64::consts::PI.to_le_bytes();
        let value = Field::from_binary(&col(ColumnType::BINARY_DOUBLE), &data).unwrap();
        assert_eq!(value, Field::Double(std::f64::consts::PI));
    }

    #[test]
    fn field_truncated_integer() {
        assert!(matches!(
            Field::from_binary(&col(ColumnType::BIGINT), &[1, 2, 3]),
            Err(Error::UnexpectedEof)
        ));
    }

    #[test]
    fn packed_timestamp() {
        let parts = DateTimeParts::from_packed(&[], false).unwrap();
        assert!(parts.is_zero_date());

        let mut data = 2024u16.to_le_bytes().to_vec();
        data.extend_from_slice(&[12, 25]);
        let parts = DateTimeParts::from_packed(&data, false).unwrap();
        assert_eq!((parts.year, parts.month, parts.day), (2024, 12, 25));
        assert_eq!(parts.hour, 0);

        data.extend_from_slice(&[15, 30, 45]);
        let parts = DateTimeParts::from_packed(&data, false).unwrap();
        assert_eq!((parts.hour, parts.minute, parts.second), (15, 30, 45));
        assert_eq!(parts.nanos, 0);

        data.extend_from_slice(&123_456u32.to_le_bytes());
        let parts = DateTimeParts::from_packed(&data, false).unwrap();
        assert_eq!(parts.nanos, 123_456_000);
        assert!(!parts.is_zero_date());
    }

    #[test]
    fn packed_timestamp_with_zone() {
        let mut data = 2024u16.to_le_bytes().to_vec();
        data.extend_from_slice(&[1, 2, 3, 4, 5]);
        data.extend_from_slice(&987_654_321u32.to_le_bytes());
        data.extend_from_slice(&[9, (-5i8) as u8, (-30i8) as u8]);
        let parts = DateTimeParts::from_packed(&data, true).unwrap();
        assert_eq!(parts.nanos, 987_654_321);
        assert_eq!(parts.offset_seconds, Some(-(5 * 3600 + 30 * 60)));
    }

    #[test]
    fn packed_timestamp_invalid_length() {
        assert!(matches!(
            DateTimeParts::from_packed(&[1, 2], false),
            Err(Error::LibraryBug(_))
        ));
    }

    #[test]
    fn packed_time() {
        let parts = TimeParts::from_packed(&[]).unwrap();
        assert_eq!(parts, TimeParts::default());

        let mut data = vec![1u8];
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&[12, 30, 45]);
        let parts = TimeParts::from_packed(&data).unwrap();
        assert!(parts.negative);
        assert_eq!(parts.days, 1);
        assert_eq!(parts.total_hours(), 36);
        assert_eq!((parts.minute, parts.second, parts.micros), (30, 45, 0));

        data.extend_from_slice(&500u32.to_le_bytes());
        let parts = TimeParts::from_packed(&data).unwrap();
        assert_eq!(parts.micros, 500);
    }

    #[test]
    fn text_and_opaque_fields() {
        assert_eq!(
            Field::from_text(&col(ColumnType::VARCHAR), b"hi"),
            Field::Text(b"hi")
        );
        assert_eq!(Field::from_text(&col(ColumnType::BIT), &[1]), Field::Bytes(&[1]));
        let blob = col(ColumnType::BLOB).with_charset(crate::constant::BINARY_CHARSET);
        assert_eq!(Field::from_binary(&blob, &[0xDE]).unwrap(), Field::Bytes(&[0xDE]));
        assert_eq!(
            Field::from_binary(&col(ColumnType::BLOB), b"text").unwrap(),
            Field::Text(b"text")
        );
    }

    #[test]
    fn null_bitmap_result_set() {
        // bit 2 -> column 0, bit 12 -> column 10
        let bitmap = [0b00000100, 0b00010000];
        let null_bitmap = NullBitmap::for_result_set(&bitmap);

        assert!(null_bitmap.is_null(0));
        assert!(!null_bitmap.is_null(1));
        assert!(!null_bitmap.is_null(2));
        assert!(null_bitmap.is_null(10));
        assert!(!null_bitmap.is_null(100));
    }

    #[test]
    fn null_bitmap_len() {
        assert_eq!(NullBitmap::result_set_len(1), 1);
        assert_eq!(NullBitmap::result_set_len(6), 1);
        assert_eq!(NullBitmap::result_set_len(7), 2);
        assert_eq!(NullBitmap::result_set_len(14), 2);
        assert_eq!(NullBitmap::result_set_len(15), 3);
    }

    #[test]
    fn packed_fraction_out_of_range() {
        let mut time = vec![0, 0, 0, 0, 0, 1, 2, 3];
        time.extend_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            TimeParts::from_packed(&time),
            Err(Error::ProtocolCorruption(_))
        ));

        let mut datetime = vec![0xE8, 0x07, 1, 2, 3, 4, 5];
        datetime.extend_from_slice(&1_000_000u32.to_le_bytes());
        assert!(DateTimeParts::from_packed(&datetime, false).is_err());
        assert_eq!(DateTimeParts::from_packed(&datetime, true).unwrap().nanos, 1_000_000);
    }
}
