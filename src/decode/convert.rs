//! Conversions from a located [`Field`] to the representation an accessor asks for.

use std::borrow::Cow;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use simdutf8::basic::from_utf8;
use tracing::debug;

use crate::col::ColumnDefinition;
use crate::constant::{ColumnType, LATIN1_CHARSET};
use crate::error::{Error, Result};
use crate::policy::FormattingPolicy;
use crate::protocol::value::Field;

#[expect(clippy::unwrap_used)]
static INTEGER_WITH_FRACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+\.[0-9]+$").unwrap());

/// Column and policy a conversion runs under.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ctx<'c> {
    pub col: &'c ColumnDefinition,
    pub policy: &'c FormattingPolicy,
}

impl<'c> Ctx<'c> {
    pub fn new(col: &'c ColumnDefinition, policy: &'c FormattingPolicy) -> Self {
        Self { col, policy }
    }

    pub fn ty(&self) -> ColumnType {
        self.col.column_type
    }

    pub fn name(&self) -> &str {
        &self.col.name
    }

    /// Decode character data in the column's charset.
    pub fn text<'b>(&self, bytes: &'b [u8]) -> Cow<'b, str> {
        if self.col.charset == LATIN1_CHARSET {
            return Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect());
        }
        match from_utf8(bytes) {
            Ok(s) => Cow::Borrowed(s),
            Err(_) => String::from_utf8_lossy(bytes),
        }
    }

    pub fn out_of_range(&self, value: impl ToString, target: &'static str) -> Error {
        Error::out_of_range(self.name(), value, target)
    }

    pub fn malformed(&self, value: impl ToString, message: impl Into<String>) -> Error {
        Error::malformed(self.name(), value, message)
    }

    pub fn unsupported(&self, accessor: &'static str) -> Error {
        Error::unsupported(accessor, self.ty())
    }

    /// Left-pad with zeros to the declared width of a ZEROFILL column.
    pub fn zero_fill(&self, s: String) -> String {
        let width = self.col.column_length as usize;
        if self.col.is_zerofill() && s.len() < width {
            let mut padded = "0".repeat(width - s.len());
            padded.push_str(&s);
            padded
        } else {
            s
        }
    }

    /// Apply `maxFieldSize` to a string result.
    pub fn limit_chars(&self, s: Cow<'_, str>) -> String {
        let max = self.policy.max_field_size;
        if max > 0 && s.len() > max && s.chars().count() > max {
            s.chars().take(max).collect()
        } else {
            s.into_owned()
        }
    }

    /// Apply `maxFieldSize` to a byte result.
    pub fn limit_bytes(&self, bytes: &[u8]) -> Vec<u8> {
        bytes[..self.policy.field_limit(bytes.len())].to_vec()
    }
}

/// BIT value: the bytes as one big-endian unsigned integer.
pub(crate) fn parse_bit(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

// ============================================================================
// Integers
// ============================================================================

/// Integer bounds and the name used in out-of-range messages.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IntTarget {
    pub min: i64,
    pub max: i64,
    pub name: &'static str,
    pub accessor: &'static str,
}

pub(crate) const BYTE: IntTarget = IntTarget {
    min: i8::MIN as i64,
    max: i8::MAX as i64,
    name: "Byte",
    accessor: "getByte",
};
pub(crate) const SHORT: IntTarget = IntTarget {
    min: i16::MIN as i64,
    max: i16::MAX as i64,
    name: "Short",
    accessor: "getShort",
};
pub(crate) const INT: IntTarget = IntTarget {
    min: i32::MIN as i64,
    max: i32::MAX as i64,
    name: "Integer",
    accessor: "getInt",
};
pub(crate) const LONG: IntTarget = IntTarget {
    min: i64::MIN,
    max: i64::MAX,
    name: "Long",
    accessor: "getLong",
};

/// Convert to an integer within `target`'s bounds.
pub(crate) fn to_integer(ctx: Ctx<'_>, field: Field<'_>, target: IntTarget) -> Result<i64> {
    let value = match field {
        Field::SignedInt(v) => v,
        Field::UnsignedInt(v) => i64::try_from(v).map_err(|_e| ctx.out_of_range(v, target.name))?,
        Field::Float(f) => float_to_i64(ctx, f64::from(f), target)?,
        Field::Double(d) => float_to_i64(ctx, d, target)?,
        // BIT(64) keeps its bit pattern
        Field::Bytes(b) | Field::Text(b) if ctx.ty() == ColumnType::BIT => parse_bit(b) as i64,
        Field::Text(t) if ctx.ty().is_numeric_source() => return parse_integer_text(ctx, t, target),
        _ => return Err(ctx.unsupported(target.accessor)),
    };
    range_check(ctx, value, target)
}

fn range_check(ctx: Ctx<'_>, value: i64, target: IntTarget) -> Result<i64> {
    if value < target.min || value > target.max {
        Err(ctx.out_of_range(value, target.name))
    } else {
        Ok(value)
    }
}

fn float_to_i64(ctx: Ctx<'_>, value: f64, target: IntTarget) -> Result<i64> {
    if value.is_nan() {
        return Ok(0);
    }
    let truncated = value.trunc();
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err(ctx.out_of_range(value, target.name));
    }
    Ok(truncated as i64)
}

/// Numeric text: exact integer, then integer part of `-?\d+\.\d+`, then floating
/// point; out of range when every attempt fails.
fn parse_integer_text(ctx: Ctx<'_>, bytes: &[u8], target: IntTarget) -> Result<i64> {
    if bytes.is_empty() {
        return empty_numeric(ctx).map(|()| 0);
    }
    let text = ctx.text(bytes);
    let trimmed = text.trim();

    if let Ok(v) = trimmed.parse::<i64>() {
        return range_check(ctx, v, target);
    }

    if INTEGER_WITH_FRACTION.is_match(trimmed)
        && let Some((int_part, _)) = trimmed.split_once('.')
        && let Ok(v) = int_part.parse::<i64>()
    {
        debug!(column = ctx.name(), value = trimmed, "truncated fractional integer text");
        return range_check(ctx, v, target);
    }

    if let Ok(d) = trimmed.parse::<f64>() {
        debug!(column = ctx.name(), value = trimmed, "integer text parsed as floating point");
        let truncated = d.trunc();
        if !ctx.policy.oracle
            && ctx.policy.compliant_truncation
            && (truncated < target.min as f64 || truncated >= target.max as f64 + 1.0)
        {
            return Err(ctx.out_of_range(trimmed, target.name));
        }
        // only the cast to i64 saturates; the target width is always checked
        return range_check(ctx, truncated as i64, target);
    }

    Err(ctx.out_of_range(trimmed, target.name))
}

fn empty_numeric(ctx: Ctx<'_>) -> Result<()> {
    if ctx.policy.empty_string_is_zero {
        Ok(())
    } else {
        Err(ctx.malformed("", "Can't convert empty string ('') to numeric"))
    }
}

/// Arbitrary precision integer; unsigned BIGINT keeps its full value.
pub(crate) fn to_big_integer(ctx: Ctx<'_>, field: Field<'_>) -> Result<i128> {
    match field {
        Field::SignedInt(v) => Ok(i128::from(v)),
        Field::UnsignedInt(v) => Ok(i128::from(v)),
        Field::Float(_) | Field::Double(_) => to_integer(ctx, field, LONG).map(i128::from),
        Field::Bytes(b) | Field::Text(b) if ctx.ty() == ColumnType::BIT => Ok(i128::from(parse_bit(b))),
        Field::Text(t) if ctx.ty().is_numeric_source() => {
            if t.is_empty() {
                return empty_numeric(ctx).map(|()| 0);
            }
            let text = ctx.text(t);
            let trimmed = text.trim();
            if let Ok(v) = trimmed.parse::<i128>() {
                return Ok(v);
            }
            parse_decimal(ctx, trimmed)?
                .trunc()
                .to_i128()
                .ok_or_else(|| ctx.out_of_range(trimmed, "BigInteger"))
        }
        _ => Err(ctx.unsupported("getBigInteger")),
    }
}

// ============================================================================
// Floating point
// ============================================================================

pub(crate) fn to_f64(ctx: Ctx<'_>, field: Field<'_>) -> Result<f64> {
    match field {
        Field::SignedInt(v) => Ok(v as f64),
        Field::UnsignedInt(v) => Ok(v as f64),
        Field::Float(f) => Ok(f64::from(f)),
        Field::Double(d) => Ok(d),
        Field::Bytes(b) | Field::Text(b) if ctx.ty() == ColumnType::BIT => Ok(parse_bit(b) as f64),
        Field::Text(t) if ctx.ty().is_numeric_source() => {
            if t.is_empty() {
                return empty_numeric(ctx).map(|()| 0.0);
            }
            let text = ctx.text(t);
            let trimmed = text.trim();
            trimmed
                .parse::<f64>()
                .map_err(|_e| ctx.malformed(trimmed, "Incorrect format for getDouble"))
        }
        _ => Err(ctx.unsupported("getDouble")),
    }
}

pub(crate) fn to_f32(ctx: Ctx<'_>, field: Field<'_>) -> Result<f32> {
    match field {
        Field::Float(f) => Ok(f),
        Field::Text(t) if ctx.ty().is_numeric_source() && ctx.ty() != ColumnType::BIT => {
            if t.is_empty() {
                return empty_numeric(ctx).map(|()| 0.0);
            }
            let text = ctx.text(t);
            let trimmed = text.trim();
            trimmed
                .parse::<f32>()
                .map_err(|_e| ctx.malformed(trimmed, "Incorrect format for getFloat"))
        }
        _ => to_f64(ctx, field).map(|d| d as f32),
    }
}

// ============================================================================
// Decimal
// ============================================================================

pub(crate) fn parse_decimal(ctx: Ctx<'_>, text: &str) -> Result<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|e| ctx.malformed(text, format!("Bad format for BigDecimal: {}", e)))
}

pub(crate) fn to_decimal(ctx: Ctx<'_>, field: Field<'_>) -> Result<Decimal> {
    let scale = u32::from(ctx.col.decimals);
    match field {
        Field::SignedInt(v) => Ok(rescale_bigint(ctx, Decimal::from(v), scale)),
        Field::UnsignedInt(v) => Ok(rescale_bigint(ctx, Decimal::from(v), scale)),
        Field::Float(f) => parse_decimal(ctx, &f.to_string()),
        Field::Double(d) => {
            let value = parse_decimal(ctx, &d.to_string())?;
            if ctx.policy.mysql5 {
                let mut rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
                rounded.rescale(scale);
                Ok(rounded)
            } else {
                Ok(value)
            }
        }
        Field::Bytes(b) | Field::Text(b) if ctx.ty() == ColumnType::BIT => Ok(Decimal::from(parse_bit(b))),
        Field::Text(t) if ctx.ty().is_numeric_source() => {
            if t.is_empty() {
                return empty_numeric(ctx).map(|()| Decimal::ZERO);
            }
            let text = ctx.text(t);
            parse_decimal(ctx, text.trim())
        }
        _ => Err(ctx.unsupported("getBigDecimal")),
    }
}

fn rescale_bigint(ctx: Ctx<'_>, mut value: Decimal, scale: u32) -> Decimal {
    if ctx.ty() == ColumnType::BIGINT && scale > 0 {
        value.rescale(scale);
    }
    value
}

// ============================================================================
// Boolean
// ============================================================================

pub(crate) fn to_bool(ctx: Ctx<'_>, field: Field<'_>) -> Result<bool> {
    let ty = ctx.ty();
    match field {
        Field::Bytes(b) | Field::Text(b) if ty == ColumnType::BIT => Ok(parse_bit(b) != 0),
        Field::DateTime(_) | Field::Time(_) => Err(ctx.unsupported("getBoolean")),
        _ if ty.is_integer() || ty.is_float() || ty.is_decimal() || ty == ColumnType::YEAR => {
            let v = to_integer(ctx, field, LONG)?;
            Ok(v > 0 || v == -1)
        }
        Field::Text(t) if ctx.col.is_binary() => Ok(bytes_to_bool(t)),
        Field::Text(t) => Ok(string_to_bool(&ctx.text(t))),
        Field::Bytes(b) => Ok(bytes_to_bool(b)),
        _ => Err(ctx.unsupported("getBoolean")),
    }
}

pub(crate) fn string_to_bool(s: &str) -> bool {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true")
        || s.eq_ignore_ascii_case("t")
        || s.eq_ignore_ascii_case("y")
        || s.eq_ignore_ascii_case("yes")
    {
        return true;
    }
    if s.is_empty()
        || s.eq_ignore_ascii_case("false")
        || s.eq_ignore_ascii_case("f")
        || s.eq_ignore_ascii_case("n")
        || s.eq_ignore_ascii_case("no")
    {
        return false;
    }
    if let Ok(v) = s.parse::<i64>() {
        return v > 0 || v == -1;
    }
    if let Ok(d) = s.parse::<f64>() {
        return d > 0.0 || d == -1.0;
    }
    true
}

pub(crate) fn bytes_to_bool(b: &[u8]) -> bool {
    !(b.is_empty() || b == b"0" || b.iter().all(|&x| x == 0))
}

// ============================================================================
// Strings
// ============================================================================

/// `Double.toString` style rendering: always a decimal point, exponent outside [1e-3, 1e7).
pub(crate) fn java_double_string(d: f64) -> String {
    java_style(d, format!("{:?}", d), format!("{:e}", d))
}

/// `Float.toString` style rendering
pub(crate) fn java_float_string(f: f32) -> String {
    java_style(f64::from(f), format!("{:?}", f), format!("{:e}", f))
}

fn java_style(value: f64, plain: String, scientific: String) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    if value == 0.0 || (1e-3..1e7).contains(&magnitude) {
        if plain.contains('.') {
            return plain;
        }
        // `{:?}` of a large integral value may use an exponent
        return format!("{:.1}", value);
    }
    // `1.5e-5` -> `1.5E-5`, `1e10` -> `1.0E10`
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    if mantissa.contains('.') {
        format!("{}E{}", mantissa, exponent)
    } else {
        format!("{}.0E{}", mantissa, exponent)
    }
}

/// String form of a non-temporal field.
pub(crate) fn scalar_string(ctx: Ctx<'_>, field: Field<'_>) -> Result<String> {
    let ty = ctx.ty();
    match field {
        Field::SignedInt(v) => Ok(ctx.zero_fill(v.to_string())),
        Field::UnsignedInt(v) => Ok(ctx.zero_fill(v.to_string())),
        Field::Float(f) if ty == ColumnType::BINARY_FLOAT => Ok(java_float_string(f)),
        Field::Float(f) => Ok(ctx.zero_fill(java_float_string(f))),
        Field::Double(d) if ty == ColumnType::BINARY_DOUBLE => Ok(java_double_string(d)),
        Field::Double(d) => Ok(ctx.zero_fill(java_double_string(d))),
        Field::Bytes(b) | Field::Text(b) if ty == ColumnType::BIT => Ok(parse_bit(b).to_string()),
        Field::Bytes(b) | Field::Text(b) if ty == ColumnType::RAW => Ok(hex::encode_upper(b)),
        Field::Text(t) if ty == ColumnType::BINARY_FLOAT || ty == ColumnType::BINARY_DOUBLE => {
            let text = ctx.text(t);
            match text.trim().parse::<f64>() {
                Ok(d) if ty == ColumnType::BINARY_FLOAT => Ok(java_float_string(d as f32)),
                Ok(d) => Ok(java_double_string(d)),
                Err(_) => Ok(text.into_owned()),
            }
        }
        Field::Text(t) if ty.is_float() || ty.is_decimal() => Ok(ctx.zero_fill(ctx.text(t).into_owned())),
        Field::Text(t) | Field::Bytes(t) => Ok(ctx.limit_chars(ctx.text(t))),
        Field::DateTime(_) | Field::Time(_) => Err(ctx.unsupported("getString")),
    }
}
