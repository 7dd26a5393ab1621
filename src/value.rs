//! Owned values produced by the row decoders.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use zerocopy::FromBytes;

use crate::error::{Error, Result};
use crate::protocol::value::{IntervalDs11, IntervalYm5};

/// A dynamically typed column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    /// YEAR when years are not read as dates
    Short(i16),
    Int(i32),
    Long(i64),
    /// Unsigned BIGINT
    BigInt(i128),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<FixedOffset>),
    IntervalYearMonth(IntervalYearMonth),
    IntervalDaySecond(IntervalDaySecond),
    Complex(ComplexValue),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// ============================================================================
// Composite values
// ============================================================================

/// A value nested inside a COMPLEX column.
#[derive(Debug, Clone, PartialEq)]
pub enum ComplexValue {
    Number(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDateTime),
    Timestamp(NaiveDateTime),
    Array(ComplexArray),
    Struct(ComplexStruct),
    Cursor(CursorHandle),
}

/// Ordered collection; `None` elements were NULL in the collection bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexArray {
    pub type_name: String,
    pub elements: Vec<Option<ComplexValue>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComplexStruct {
    pub type_name: String,
    pub attributes: Vec<(String, Option<ComplexValue>)>,
}

impl ComplexStruct {
    /// Attribute by name; `None` for a NULL or unknown attribute
    pub fn get(&self, name: &str) -> Option<&ComplexValue> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.as_ref())
    }
}

// ============================================================================
// Cursors
// ============================================================================

/// Server-side cursor returned inside a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorHandle {
    pub id: u32,
    pub open: bool,
}

/// Performs I/O on behalf of a [`CursorHandle`]; implemented by the connection layer.
pub trait CursorHandler {
    /// Fetch up to `fetch_size` further rows of the cursor.
    fn fetch(&mut self, cursor: &CursorHandle, fetch_size: usize) -> Result<()>;

    fn close(&mut self, cursor: &CursorHandle) -> Result<()>;
}

impl CursorHandle {
    pub fn fetch_with<H: CursorHandler + ?Sized>(&self, handler: &mut H, fetch_size: usize) -> Result<()> {
        self.ensure_open()?;
        handler.fetch(self, fetch_size)
    }

    pub fn close_with<H: CursorHandler + ?Sized>(&mut self, handler: &mut H) -> Result<()> {
        self.ensure_open()?;
        handler.close(self)?;
        self.open = false;
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(Error::ProtocolCorruption("cursor is not open".to_string()))
        }
    }
}

// ============================================================================
// Intervals
// ============================================================================

const INTERVAL_OFFSET: i64 = 0x8000_0000;
const INTERVAL_FIELD_OFFSET: i32 = 60;

/// INTERVAL YEAR TO MONTH
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntervalYearMonth {
    pub years: i32,
    pub months: i32,
}

impl IntervalYearMonth {
    /// Decode the 5-byte biased wire form
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let raw = IntervalYm5::ref_from_bytes(data).map_err(|_e| interval_len_error("YEAR TO MONTH", data))?;
        Ok(Self {
            years: unbias_u32(raw.year.get()),
            months: i32::from(raw.month) - INTERVAL_FIELD_OFFSET,
        })
    }

    /// Parse `[+-]Y-M`
    pub fn parse(text: &str) -> Option<Self> {
        let (negative, body) = split_sign(text.trim());
        let (years, months) = body.split_once('-')?;
        let years: i32 = years.trim().parse().ok()?;
        let months: i32 = months.trim().parse().ok()?;
        let sign = if negative { -1 } else { 1 };
        Some(Self {
            years: sign * years,
            months: sign * months,
        })
    }

    fn is_negative(&self) -> bool {
        self.years < 0 || self.months < 0
    }
}

impl fmt::Display for IntervalYearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            f.write_str("-")?;
        }
        write!(f, "{}-{}", self.years.unsigned_abs(), self.months.unsigned_abs())
    }
}

/// INTERVAL DAY TO SECOND
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntervalDaySecond {
    pub days: i32,
    pub hours: i32,
    pub minutes: i32,
    pub seconds: i32,
    pub nanos: i32,
}

impl IntervalDaySecond {
    /// Decode the 11-byte biased wire form
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let raw = IntervalDs11::ref_from_bytes(data).map_err(|_e| interval_len_error("DAY TO SECOND", data))?;
        Ok(Self {
            days: unbias_u32(raw.day.get()),
            hours: i32::from(raw.hour) - INTERVAL_FIELD_OFFSET,
            minutes: i32::from(raw.minute) - INTERVAL_FIELD_OFFSET,
            seconds: i32::from(raw.second) - INTERVAL_FIELD_OFFSET,
            nanos: unbias_u32(raw.fraction.get()),
        })
    }

    /// Parse `[+-]D HH:MM:SS[.f]`
    pub fn parse(text: &str) -> Option<Self> {
        let (negative, body) = split_sign(text.trim());
        let (days, clock) = body.split_once(' ')?;
        let days: i32 = days.parse().ok()?;
        let mut clock_parts = clock.trim().splitn(3, ':');
        let hours: i32 = clock_parts.next()?.parse().ok()?;
        let minutes: i32 = clock_parts.next()?.parse().ok()?;
        let seconds = clock_parts.next()?;
        let (seconds, fraction) = seconds.split_once('.').unwrap_or((seconds, ""));
        let seconds: i32 = seconds.parse().ok()?;
        let nanos = i32::try_from(crate::decode::temporal::fraction_to_nanos(fraction)?).ok()?;
        let sign = if negative { -1 } else { 1 };
        Some(Self {
            days: sign * days,
            hours: sign * hours,
            minutes: sign * minutes,
            seconds: sign * seconds,
            nanos: sign * nanos,
        })
    }

    fn is_negative(&self) -> bool {
        self.days < 0 || self.hours < 0 || self.minutes < 0 || self.seconds < 0 || self.nanos < 0
    }
}

impl fmt::Display for IntervalDaySecond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            f.write_str("-")?;
        }
        let fraction = format!("{:09}", self.nanos.unsigned_abs());
        let fraction = fraction.trim_end_matches('0');
        write!(
            f,
            "{} {}:{}:{}.{}",
            self.days.unsigned_abs(),
            self.hours.unsigned_abs(),
            self.minutes.unsigned_abs(),
            self.seconds.unsigned_abs(),
            if fraction.is_empty() { "0" } else { fraction }
        )
    }
}

fn unbias_u32(raw: u32) -> i32 {
    // the bias keeps the result within i32
    (i64::from(raw) - INTERVAL_OFFSET) as i32
}

fn split_sign(text: &str) -> (bool, &str) {
    match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    }
}

fn interval_len_error(kind: &str, data: &[u8]) -> Error {
    Error::ProtocolCorruption(format!(
        "INTERVAL {} value has {} bytes",
        kind,
        data.len()
    ))
}
