//! Typed extraction of columns and whole rows on top of [`RowDecoder`].

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use crate::col::ColumnDefinition;
use crate::decode::RowDecoder;
use crate::error::{Error, Result};
use crate::value::{ComplexArray, ComplexStruct, CursorHandle, IntervalDaySecond, IntervalYearMonth, Value};

/// A type that can be read from the field the decoder is positioned on.
///
/// Non-`Option` types reject NULL; wrap them in `Option` to accept it.
pub trait FromColumn<'a>: Sized {
    fn from_column<D: RowDecoder<'a> + ?Sized>(decoder: &mut D, col: &ColumnDefinition) -> Result<Self>;
}

/// A type that can be built from a whole row.
pub trait FromRow<'a>: Sized {
    fn from_row<D: RowDecoder<'a> + ?Sized>(decoder: &mut D) -> Result<Self>;
}

fn null_error<T>(col: &ColumnDefinition) -> Error {
    Error::BadUsageError(format!(
        "Cannot decode NULL in column '{}' to {}",
        col.name,
        std::any::type_name::<T>()
    ))
}

fn reject_null<'a, T, D: RowDecoder<'a> + ?Sized>(decoder: &D, col: &ColumnDefinition) -> Result<()> {
    if decoder.state().is_null() {
        Err(null_error::<T>(col))
    } else {
        Ok(())
    }
}

impl<'a, T: FromColumn<'a>> FromColumn<'a> for Option<T> {
    fn from_column<D: RowDecoder<'a> + ?Sized>(decoder: &mut D, col: &ColumnDefinition) -> Result<Self> {
        if decoder.state().is_null() {
            return Ok(None);
        }
        match T::from_column(decoder, col) {
            Ok(value) => Ok(Some(value)),
            // a zero date read as NULL
            Err(_) if decoder.was_null() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Scalars whose accessor returns the type directly.
macro_rules! impl_from_column_scalar {
    ($($T:ty => $accessor:ident),+ $(,)?) => {
        $(
            impl<'a> FromColumn<'a> for $T {
                fn from_column<D: RowDecoder<'a> + ?Sized>(decoder: &mut D, col: &ColumnDefinition) -> Result<Self> {
                    reject_null::<$T, D>(decoder, col)?;
                    decoder.$accessor(col)
                }
            }
        )+
    };
}

impl_from_column_scalar!(
    i8 => as_i8,
    i16 => as_i16,
    i32 => as_i32,
    i64 => as_i64,
    f32 => as_f32,
    f64 => as_f64,
    bool => as_bool,
);

/// NULL is [`Value::Null`].
impl<'a> FromColumn<'a> for Value {
    fn from_column<D: RowDecoder<'a> + ?Sized>(decoder: &mut D, col: &ColumnDefinition) -> Result<Self> {
        decoder.as_value(col)
    }
}

/// Types whose accessor returns `Option`; `None` from a non-NULL field is a zero date.
macro_rules! impl_from_column_optional {
    ($($T:ty => |$decoder:ident, $col:ident| $read:expr),+ $(,)?) => {
        $(
            impl<'a> FromColumn<'a> for $T {
                fn from_column<D: RowDecoder<'a> + ?Sized>($decoder: &mut D, $col: &ColumnDefinition) -> Result<Self> {
                    reject_null::<$T, D>($decoder, $col)?;
                    $read?.ok_or_else(|| null_error::<$T>($col))
                }
            }
        )+
    };
}

impl_from_column_optional!(
    i128 => |decoder, col| decoder.as_big_integer(col),
    Decimal => |decoder, col| decoder.as_decimal(col),
    String => |decoder, col| decoder.as_string(col),
    Vec<u8> => |decoder, col| decoder.as_bytes(col),
    NaiveDate => |decoder, col| decoder.as_date(col, None, false),
    NaiveTime => |decoder, col| decoder.as_time(col, None),
    NaiveDateTime => |decoder, col| decoder.as_timestamp(col, None, false),
    DateTime<FixedOffset> => |decoder, col| decoder.as_timestamp_with_zone(col, None),
    IntervalYearMonth => |decoder, col| decoder.as_interval_year_month(col),
    IntervalDaySecond => |decoder, col| decoder.as_interval_day_second(col),
    ComplexArray => |decoder, col| decoder.as_array(col),
    ComplexStruct => |decoder, col| decoder.as_struct(col),
    CursorHandle => |decoder, col| decoder.as_cursor(col),
);

macro_rules! impl_from_column_unsigned {
    ($($T:ty),+) => {
        $(
            impl<'a> FromColumn<'a> for $T {
                fn from_column<D: RowDecoder<'a> + ?Sized>(decoder: &mut D, col: &ColumnDefinition) -> Result<Self> {
                    let value = i128::from_column(decoder, col)?;
                    <$T>::try_from(value).map_err(|_e| Error::out_of_range(&col.name, value, stringify!($T)))
                }
            }
        )+
    };
}

impl_from_column_unsigned!(u8, u16, u32, u64);

macro_rules! impl_from_row_tuple {
    ($($idx:tt: $T:ident),+) => {
        impl<'a, $($T: FromColumn<'a>),+> FromRow<'a> for ($($T,)+) {
            #[expect(non_snake_case)]
            fn from_row<Dec: RowDecoder<'a> + ?Sized>(decoder: &mut Dec) -> Result<Self> {
                let cols = decoder.columns();
                $(
                    let col = cols.get($idx).ok_or_else(|| {
                        Error::BadUsageError(format!(
                            "row has {} columns, tuple needs column {}",
                            cols.len(),
                            $idx
                        ))
                    })?;
                    decoder.position($idx)?;
                    let $T = $T::from_column(decoder, col)?;
                )+
                Ok(($($T,)+))
            }
        }
    };
}

impl_from_row_tuple!(0: A);
impl_from_row_tuple!(0: A, 1: B);
impl_from_row_tuple!(0: A, 1: B, 2: C);
impl_from_row_tuple!(0: A, 1: B, 2: C, 3: D);
impl_from_row_tuple!(0: A, 1: B, 2: C, 3: D, 4: E);
impl_from_row_tuple!(0: A, 1: B, 2: C, 3: D, 4: E, 5: F);
impl_from_row_tuple!(0: A, 1: B, 2: C, 3: D, 4: E, 5: F, 6: G);
impl_from_row_tuple!(0: A, 1: B, 2: C, 3: D, 4: E, 5: F, 6: G, 7: H);
impl_from_row_tuple!(0: A, 1: B, 2: C, 3: D, 4: E, 5: F, 6: G, 7: H, 8: I);
impl_from_row_tuple!(0: A, 1: B, 2: C, 3: D, 4: E, 5: F, 6: G, 7: H, 8: I, 9: J);
impl_from_row_tuple!(0: A, 1: B, 2: C, 3: D, 4: E, 5: F, 6: G, 7: H, 8: I, 9: J, 10: K);
impl_from_row_tuple!(0: A, 1: B, 2: C, 3: D, 4: E, 5: F, 6: G, 7: H, 8: I, 9: J, 10: K, 11: L);
