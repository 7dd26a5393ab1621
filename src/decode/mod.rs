//! Row decoders for the binary and text result set encodings.
//!
//! Both encodings implement [`RowDecoder`]: they only differ in how a field is
//! located and how its bytes become a [`Field`]. Every typed accessor is a
//! provided method that converts that [`Field`], so the two encodings cannot
//! disagree on conversion rules.

mod binary;
pub(crate) mod composite;
pub(crate) mod convert;
pub(crate) mod temporal;
mod text;

#[cfg(test)]
mod convert_test;

pub use binary::BinaryRowDecoder;
pub use text::TextRowDecoder;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use crate::col::ColumnDefinition;
use crate::constant::ColumnType;
use crate::cursor::CursorState;
use crate::decode::convert::{BYTE, Ctx, INT, LONG, SHORT};
use crate::error::{Error, Result};
use crate::policy::FormattingPolicy;
use crate::protocol::value::Field;
use crate::row::{FromColumn, FromRow};
use crate::value::{
    ComplexArray, ComplexStruct, ComplexValue, CursorHandle, IntervalDaySecond, IntervalYearMonth, Value,
};

/// Positions over one row at a time and converts fields on demand.
///
/// Call [`position`](Self::position) before reading a column; accessors then
/// read the field at the current position. A NULL field yields the type's
/// default (`0`, `false`, `None`) and [`was_null`](Self::was_null) reports it.
pub trait RowDecoder<'a> {
    /// Columns of the result set this decoder was created for
    fn columns(&self) -> &'a [ColumnDefinition];

    fn policy(&self) -> &FormattingPolicy;

    fn state(&self) -> &CursorState;

    fn state_mut(&mut self) -> &mut CursorState;

    /// Make `row` the current row and forget the previous position.
    fn bind(&mut self, row: &'a [u8]) -> Result<()>;

    /// Locate column `index` of the bound row.
    fn position(&mut self, index: usize) -> Result<()>;

    /// The field at the current position, `None` when it is NULL.
    fn field(&self, col: &ColumnDefinition) -> Result<Option<Field<'a>>>;

    /// Exact bytes of the field at the current position.
    fn raw_bytes(&self) -> Result<Option<&'a [u8]>>;

    /// Materialized COMPLEX or CURSOR value at the current position.
    fn complex(&mut self, col: &ColumnDefinition) -> Result<Option<ComplexValue>>;

    /// Whether the last positioned field was NULL, including zero dates read as NULL.
    fn was_null(&self) -> bool {
        self.state().was_null()
    }

    fn as_i8(&mut self, col: &ColumnDefinition) -> Result<i8> {
        let v = read_integer(self, col, BYTE)?;
        Ok(v as i8)
    }

    fn as_i16(&mut self, col: &ColumnDefinition) -> Result<i16> {
        let v = read_integer(self, col, SHORT)?;
        Ok(v as i16)
    }

    fn as_i32(&mut self, col: &ColumnDefinition) -> Result<i32> {
        let v = read_integer(self, col, INT)?;
        Ok(v as i32)
    }

    fn as_i64(&mut self, col: &ColumnDefinition) -> Result<i64> {
        read_integer(self, col, LONG)
    }

    /// Arbitrary precision integer; holds every BIGINT UNSIGNED value.
    fn as_big_integer(&mut self, col: &ColumnDefinition) -> Result<Option<i128>> {
        match self.field(col)? {
            Some(field) => convert::to_big_integer(Ctx::new(col, self.policy()), field).map(Some),
            None => Ok(None),
        }
    }

    fn as_f32(&mut self, col: &ColumnDefinition) -> Result<f32> {
        match self.field(col)? {
            Some(field) => convert::to_f32(Ctx::new(col, self.policy()), field),
            None => Ok(0.0),
        }
    }

    fn as_f64(&mut self, col: &ColumnDefinition) -> Result<f64> {
        match self.field(col)? {
            Some(field) => convert::to_f64(Ctx::new(col, self.policy()), field),
            None => Ok(0.0),
        }
    }

    fn as_decimal(&mut self, col: &ColumnDefinition) -> Result<Option<Decimal>> {
        match self.field(col)? {
            Some(field) => convert::to_decimal(Ctx::new(col, self.policy()), field).map(Some),
            None => Ok(None),
        }
    }

    fn as_bool(&mut self, col: &ColumnDefinition) -> Result<bool> {
        match self.field(col)? {
            Some(field) => convert::to_bool(Ctx::new(col, self.policy()), field),
            None => Ok(false),
        }
    }

    fn as_string(&mut self, col: &ColumnDefinition) -> Result<Option<String>> {
        let Some(field) = self.field(col)? else {
            return Ok(None);
        };
        let ctx = Ctx::new(col, self.policy());
        let ty = col.column_type;
        let value = match ty {
            ColumnType::NULL => None,
            ColumnType::TIME => temporal::time_string(ctx, field)?,
            ColumnType::DATE | ColumnType::NEWDATE => temporal::date_string(ctx, field)?,
            ColumnType::YEAR => temporal::year_string(ctx, field)?,
            _ if ty.is_timestamp() => temporal::timestamp_string(ctx, field)?,
            ColumnType::INTERVALYM => Some(temporal::to_interval_year_month(ctx, field)?.to_string()),
            ColumnType::INTERVALDS => Some(temporal::to_interval_day_second(ctx, field)?.to_string()),
            ColumnType::COMPLEX | ColumnType::CURSOR | ColumnType::ARRAY | ColumnType::STRUCT => {
                return Err(Error::unsupported("getString", ty));
            }
            _ => Some(convert::scalar_string(ctx, field)?),
        };
        if value.is_none() {
            self.state_mut().mark_zero_date();
        }
        Ok(value)
    }

    fn as_bytes(&mut self, col: &ColumnDefinition) -> Result<Option<Vec<u8>>> {
        if col.column_type.is_composite() {
            return Err(Error::unsupported("getBytes", col.column_type));
        }
        Ok(self.raw_bytes()?.map(|bytes| Ctx::new(col, self.policy()).limit_bytes(bytes)))
    }

    /// Calendar date. `lenient` lets out-of-range fields roll over instead of failing
    /// under MySQL 8 rules.
    fn as_date(
        &mut self,
        col: &ColumnDefinition,
        tz: Option<FixedOffset>,
        lenient: bool,
    ) -> Result<Option<NaiveDate>> {
        let Some(field) = self.field(col)? else {
            return Ok(None);
        };
        let ctx = Ctx::new(col, self.policy());
        let value = if col.column_type == ColumnType::TIMESTAMP_TZ || col.column_type == ColumnType::TIMESTAMP_LTZ {
            temporal::to_timestamp(ctx, field, tz, lenient)?.map(|t| t.date())
        } else {
            temporal::to_date(ctx, field, lenient)?
        };
        zero_date_null(self, value)
    }

    fn as_time(&mut self, col: &ColumnDefinition, tz: Option<FixedOffset>) -> Result<Option<NaiveTime>> {
        let Some(field) = self.field(col)? else {
            return Ok(None);
        };
        let ctx = Ctx::new(col, self.policy());
        let value = if col.column_type == ColumnType::TIMESTAMP_TZ || col.column_type == ColumnType::TIMESTAMP_LTZ {
            temporal::to_timestamp(ctx, field, tz, false)?.map(|t| t.time())
        } else {
            temporal::to_time(ctx, field)?
        };
        zero_date_null(self, value)
    }

    fn as_timestamp(
        &mut self,
        col: &ColumnDefinition,
        tz: Option<FixedOffset>,
        lenient: bool,
    ) -> Result<Option<NaiveDateTime>> {
        let Some(field) = self.field(col)? else {
            return Ok(None);
        };
        let value = temporal::to_timestamp(Ctx::new(col, self.policy()), field, tz, lenient)?;
        zero_date_null(self, value)
    }

    fn as_timestamp_with_zone(
        &mut self,
        col: &ColumnDefinition,
        tz: Option<FixedOffset>,
    ) -> Result<Option<DateTime<FixedOffset>>> {
        let Some(field) = self.field(col)? else {
            return Ok(None);
        };
        let value = temporal::to_timestamp_with_zone(Ctx::new(col, self.policy()), field, tz)?;
        zero_date_null(self, value)
    }

    fn as_interval_year_month(&mut self, col: &ColumnDefinition) -> Result<Option<IntervalYearMonth>> {
        match self.field(col)? {
            Some(field) => temporal::to_interval_year_month(Ctx::new(col, self.policy()), field).map(Some),
            None => Ok(None),
        }
    }

    fn as_interval_day_second(&mut self, col: &ColumnDefinition) -> Result<Option<IntervalDaySecond>> {
        match self.field(col)? {
            Some(field) => temporal::to_interval_day_second(Ctx::new(col, self.policy()), field).map(Some),
            None => Ok(None),
        }
    }

    fn as_array(&mut self, col: &ColumnDefinition) -> Result<Option<ComplexArray>> {
        match self.complex(col)? {
            None => Ok(None),
            Some(ComplexValue::Array(array)) => Ok(Some(array)),
            Some(_) => Err(Error::unsupported("getArray", col.column_type)),
        }
    }

    fn as_struct(&mut self, col: &ColumnDefinition) -> Result<Option<ComplexStruct>> {
        match self.complex(col)? {
            None => Ok(None),
            Some(ComplexValue::Struct(object)) => Ok(Some(object)),
            Some(_) => Err(Error::unsupported("getStruct", col.column_type)),
        }
    }

    fn as_cursor(&mut self, col: &ColumnDefinition) -> Result<Option<CursorHandle>> {
        if col.column_type != ColumnType::CURSOR {
            return Err(Error::unsupported("getCursor", col.column_type));
        }
        match self.complex(col)? {
            None => Ok(None),
            Some(ComplexValue::Cursor(cursor)) => Ok(Some(cursor)),
            Some(_) => Err(Error::unsupported("getCursor", col.column_type)),
        }
    }

    /// The column's natural representation.
    fn as_value(&mut self, col: &ColumnDefinition) -> Result<Value> {
        if self.state().is_null() {
            return Ok(Value::Null);
        }
        let ty = col.column_type;
        let policy = *self.policy();
        let value = match ty {
            ColumnType::NULL | ColumnType::CURSOR => Value::Null,
            ColumnType::BIT if col.column_length == 1 => Value::Bool(self.as_bool(col)?),
            ColumnType::BIT => self.as_bytes(col)?.map_or(Value::Null, Value::Bytes),
            ColumnType::TINYINT if policy.tiny_int1_is_bit && col.column_length == 1 => {
                Value::Bool(self.as_i64(col)? != 0)
            }
            ColumnType::TINYINT | ColumnType::SMALLINT | ColumnType::MEDIUMINT => Value::Int(self.as_i32(col)?),
            ColumnType::INTEGER if col.is_unsigned() => Value::Long(self.as_i64(col)?),
            ColumnType::INTEGER => Value::Int(self.as_i32(col)?),
            ColumnType::BIGINT if col.is_unsigned() => self.as_big_integer(col)?.map_or(Value::Null, Value::BigInt),
            ColumnType::BIGINT => Value::Long(self.as_i64(col)?),
            ColumnType::FLOAT | ColumnType::BINARY_FLOAT => Value::Float(self.as_f32(col)?),
            ColumnType::DOUBLE | ColumnType::BINARY_DOUBLE => Value::Double(self.as_f64(col)?),
            ColumnType::OLDDECIMAL | ColumnType::JSON | ColumnType::UROWID => {
                self.as_string(col)?.map_or(Value::Null, Value::String)
            }
            _ if ty.is_decimal() => self.as_decimal(col)?.map_or(Value::Null, Value::Decimal),
            _ if ty.is_textual() && col.is_binary() => self.as_bytes(col)?.map_or(Value::Null, Value::Bytes),
            _ if ty.is_textual() => self.as_string(col)?.map_or(Value::Null, Value::String),
            ColumnType::DATETIME if policy.oracle && !policy.map_date_to_timestamp => {
                self.as_date(col, None, false)?.map_or(Value::Null, Value::Date)
            }
            ColumnType::TIMESTAMP_TZ | ColumnType::TIMESTAMP_LTZ => self
                .as_timestamp_with_zone(col, None)?
                .map_or(Value::Null, Value::TimestampTz),
            _ if ty.is_timestamp() => self.as_timestamp(col, None, false)?.map_or(Value::Null, Value::Timestamp),
            ColumnType::DATE => self.as_date(col, None, false)?.map_or(Value::Null, Value::Date),
            ColumnType::TIME => self.as_time(col, None)?.map_or(Value::Null, Value::Time),
            ColumnType::YEAR if policy.year_is_date => self.as_date(col, None, false)?.map_or(Value::Null, Value::Date),
            ColumnType::YEAR => Value::Short(self.as_i16(col)?),
            ColumnType::INTERVALYM => self
                .as_interval_year_month(col)?
                .map_or(Value::Null, Value::IntervalYearMonth),
            ColumnType::INTERVALDS => self
                .as_interval_day_second(col)?
                .map_or(Value::Null, Value::IntervalDaySecond),
            ColumnType::COMPLEX => self.complex(col)?.map_or(Value::Null, Value::Complex),
            ColumnType::NEWDATE | ColumnType::SET => return Err(Error::unsupported("getObject", ty)),
            _ => self.as_bytes(col)?.map_or(Value::Null, Value::Bytes),
        };
        Ok(value)
    }

    /// Position on `index` and extract it as `T`.
    fn get<T: FromColumn<'a>>(&mut self, index: usize) -> Result<T>
    where
        Self: Sized,
    {
        let col = check_index(self.columns(), index)?;
        self.position(index)?;
        T::from_column(self, col)
    }

    /// Extract the whole bound row.
    fn decode_row<R: FromRow<'a>>(&mut self) -> Result<R>
    where
        Self: Sized,
    {
        R::from_row(self)
    }
}

fn read_integer<'a, D: RowDecoder<'a> + ?Sized>(
    decoder: &mut D,
    col: &ColumnDefinition,
    target: convert::IntTarget,
) -> Result<i64> {
    match decoder.field(col)? {
        Some(field) => convert::to_integer(Ctx::new(col, decoder.policy()), field, target),
        None => Ok(0),
    }
}

/// A temporal accessor returned `None` for a non-NULL field: the zero date became NULL.
fn zero_date_null<'a, D: RowDecoder<'a> + ?Sized, T>(decoder: &mut D, value: Option<T>) -> Result<Option<T>> {
    if value.is_none() {
        decoder.state_mut().mark_zero_date();
    }
    Ok(value)
}

fn check_index(columns: &[ColumnDefinition], index: usize) -> Result<&ColumnDefinition> {
    columns.get(index).ok_or_else(|| {
        Error::BadUsageError(format!(
            "column index {} out of range for {} columns",
            index,
            columns.len()
        ))
    })
}
