use chrono::{FixedOffset, NaiveDate, NaiveTime, Timelike};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use crate::col::ColumnDefinition;
use crate::constant::{ColumnFlags, ColumnType};
use crate::decode::convert::*;
use crate::decode::temporal::*;
use crate::error::Error;
use crate::opts::{Dialect, Opts, ZeroDateTimeBehavior};
use crate::policy::FormattingPolicy;
use crate::protocol::value::{DateTimeParts, Field, TimeParts};

fn mysql(version: u8) -> FormattingPolicy {
    let opts = Opts {
        compatible_mysql_version: version,
        ..Default::default()
    };
    FormattingPolicy::resolve(&opts, Dialect::Mysql)
}

fn oracle() -> FormattingPolicy {
    FormattingPolicy::resolve(&Opts::default(), Dialect::Oracle)
}

fn col(ty: ColumnType) -> ColumnDefinition {
    ColumnDefinition::new("c", ty)
}

fn datetime(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8, nanos: u32) -> DateTimeParts {
    DateTimeParts {
        year,
        month,
        day,
        hour,
        minute,
        second,
        nanos,
        offset_seconds: None,
        len: 11,
    }
}

// ============================================================================
// Integers
// ============================================================================

#[test]
fn integer_text_fallback_chain() {
    let policy = mysql(5);
    let c = col(ColumnType::VARCHAR);
    let ctx = Ctx::new(&c, &policy);

    assert_eq!(to_integer(ctx, Field::Text(b"42"), LONG).unwrap(), 42);
    assert_eq!(to_integer(ctx, Field::Text(b" -7 "), LONG).unwrap(), -7);
    assert_eq!(to_integer(ctx, Field::Text(b"12.75"), LONG).unwrap(), 12);
    assert_eq!(to_integer(ctx, Field::Text(b"1e3"), LONG).unwrap(), 1000);
    assert!(matches!(
        to_integer(ctx, Field::Text(b"abc"), LONG),
        Err(Error::OutOfRange { target: "Long", .. })
    ));
}

#[test]
fn oracle_integer_text_float_fallback_skips_truncation_check() {
    let policy = oracle();
    let c = col(ColumnType::VARCHAR2);
    let ctx = Ctx::new(&c, &policy);
    assert_eq!(to_integer(ctx, Field::Text(b"3.9"), LONG).unwrap(), 3);
    assert_eq!(to_integer(ctx, Field::Text(b"1e3"), LONG).unwrap(), 1000);
    // the target width still applies
    assert!(matches!(
        to_integer(ctx, Field::Text(b"1e10"), INT),
        Err(Error::OutOfRange { target: "Integer", .. })
    ));
}

#[test]
fn integer_text_truncation_policy() {
    let strict = mysql(5);
    let c = col(ColumnType::DOUBLE);
    assert!(matches!(
        to_integer(Ctx::new(&c, &strict), Field::Text(b"1e10"), INT),
        Err(Error::OutOfRange { target: "Integer", .. })
    ));

    let mut relaxed = mysql(5);
    relaxed.compliant_truncation = false;
    let ctx = Ctx::new(&c, &relaxed);
    for (target, name) in [(BYTE, "Byte"), (INT, "Integer")] {
        let err = to_integer(ctx, Field::Text(b"1e10"), target).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Out of range value for column 'c' : value 10000000000 is not in {} range", name)
        );
    }
    assert_eq!(to_integer(ctx, Field::Text(b"1e10"), LONG).unwrap(), 10_000_000_000);
    // beyond i64 the cast saturates
    assert_eq!(to_integer(ctx, Field::Text(b"1e30"), LONG).unwrap(), i64::MAX);
}

#[test]
fn narrowing_boundaries() {
    let policy = mysql(5);
    let c = col(ColumnType::BIGINT);
    let ctx = Ctx::new(&c, &policy);
    let cases = [
        (BYTE, "Byte", i64::from(i8::MIN), i64::from(i8::MAX)),
        (SHORT, "Short", i64::from(i16::MIN), i64::from(i16::MAX)),
        (INT, "Integer", i64::from(i32::MIN), i64::from(i32::MAX)),
    ];
    for (target, name, min, max) in cases {
        assert_eq!(to_integer(ctx, Field::SignedInt(min), target).unwrap(), min);
        assert_eq!(to_integer(ctx, Field::SignedInt(max), target).unwrap(), max);
        for v in [min - 1, max + 1] {
            let err = to_integer(ctx, Field::SignedInt(v), target).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Out of range value for column 'c' : value {} is not in {} range", v, name)
            );
        }
    }
}

#[test]
fn long_boundaries_from_text() {
    let policy = mysql(5);
    let c = col(ColumnType::VARCHAR);
    let ctx = Ctx::new(&c, &policy);
    assert_eq!(
        to_integer(ctx, Field::Text(b"-9223372036854775808"), LONG).unwrap(),
        i64::MIN
    );
    assert_eq!(
        to_integer(ctx, Field::Text(b"9223372036854775807"), LONG).unwrap(),
        i64::MAX
    );
    assert!(matches!(
        to_integer(ctx, Field::Text(b"9223372036854775808"), LONG),
        Err(Error::OutOfRange { target: "Long", .. })
    ));
}

#[test]
fn text_blob_is_numeric() {
    let policy = mysql(8);
    let text = col(ColumnType::BLOB);
    let ctx = Ctx::new(&text, &policy);
    assert_eq!(to_integer(ctx, Field::Text(b"5"), INT).unwrap(), 5);
    assert_eq!(to_f64(ctx, Field::Text(b"2.5")).unwrap(), 2.5);
    assert_eq!(to_decimal(ctx, Field::Text(b"2.5")).unwrap(), Decimal::new(25, 1));

    let binary = col(ColumnType::BLOB).with_charset(63);
    assert!(matches!(
        to_integer(Ctx::new(&binary, &policy), Field::Bytes(b"5"), INT),
        Err(Error::UnsupportedConversion { .. })
    ));
}

#[test]
fn unsigned_bigint_limits() {
    let policy = mysql(5);
    let c = col(ColumnType::BIGINT).with_flags(ColumnFlags::UNSIGNED_FLAG);
    let ctx = Ctx::new(&c, &policy);
    assert!(matches!(
        to_integer(ctx, Field::UnsignedInt(u64::MAX), LONG),
        Err(Error::OutOfRange { .. })
    ));
    assert_eq!(
        to_big_integer(ctx, Field::UnsignedInt(u64::MAX)).unwrap(),
        18_446_744_073_709_551_615
    );
}

#[test]
fn floating_point_to_integer() {
    let policy = mysql(5);
    let c = col(ColumnType::DOUBLE);
    let ctx = Ctx::new(&c, &policy);
    assert_eq!(to_integer(ctx, Field::Double(-2.7), LONG).unwrap(), -2);
    assert!(matches!(
        to_integer(ctx, Field::Double(1e19), LONG),
        Err(Error::OutOfRange { .. })
    ));
}

#[test]
fn empty_string_policy() {
    let c = col(ColumnType::VARCHAR);
    let policy = mysql(5);
    assert_eq!(to_integer(Ctx::new(&c, &policy), Field::Text(b""), INT).unwrap(), 0);
    assert_eq!(to_decimal(Ctx::new(&c, &policy), Field::Text(b"")).unwrap(), Decimal::ZERO);

    let mut strict = mysql(5);
    strict.empty_string_is_zero = false;
    assert!(matches!(
        to_integer(Ctx::new(&c, &strict), Field::Text(b""), INT),
        Err(Error::MalformedValue { .. })
    ));
}

#[test]
fn temporal_columns_reject_numeric_accessors() {
    let policy = mysql(5);
    let c = col(ColumnType::DATETIME);
    let field = Field::DateTime(datetime(2024, 1, 1, 0, 0, 0, 0));
    assert!(matches!(
        to_integer(Ctx::new(&c, &policy), field, LONG),
        Err(Error::UnsupportedConversion {
            accessor: "getLong",
            column_type: ColumnType::DATETIME
        })
    ));
}

// ============================================================================
// Boolean, decimal, strings
// ============================================================================

#[test]
fn boolean_rules() {
    let policy = mysql(5);
    let int = col(ColumnType::INTEGER);
    let ctx = Ctx::new(&int, &policy);
    assert!(to_bool(ctx, Field::SignedInt(-1)).unwrap());
    assert!(to_bool(ctx, Field::SignedInt(2)).unwrap());
    assert!(!to_bool(ctx, Field::SignedInt(-2)).unwrap());
    assert!(!to_bool(ctx, Field::SignedInt(0)).unwrap());

    let text = col(ColumnType::VARCHAR);
    let ctx = Ctx::new(&text, &policy);
    assert!(to_bool(ctx, Field::Text(b"yes")).unwrap());
    assert!(!to_bool(ctx, Field::Text(b"false")).unwrap());
    assert!(!to_bool(ctx, Field::Text(b"0")).unwrap());

    let bit = col(ColumnType::BIT);
    assert!(to_bool(Ctx::new(&bit, &policy), Field::Bytes(&[0, 1])).unwrap());
}

#[test]
fn decimal_scale_rules() {
    let bigint = col(ColumnType::BIGINT).with_decimals(2);
    let policy = mysql(5);
    let value = to_decimal(Ctx::new(&bigint, &policy), Field::SignedInt(5)).unwrap();
    assert_eq!(value.to_string(), "5.00");

    let double = col(ColumnType::DOUBLE).with_decimals(2);
    let value = to_decimal(Ctx::new(&double, &policy), Field::Double(1.005)).unwrap();
    assert_eq!(value.to_string(), "1.01");

    let policy8 = mysql(8);
    let value = to_decimal(Ctx::new(&double, &policy8), Field::Double(1.005)).unwrap();
    assert_eq!(value.to_string(), "1.005");

    let text = col(ColumnType::DECIMAL);
    let value = to_decimal(Ctx::new(&text, &policy), Field::Text(b"2.5e2")).unwrap();
    assert_eq!(value, Decimal::from(250));
}

#[test]
fn float_rendering() {
    assert_eq!(java_double_string(1.0), "1.0");
    assert_eq!(java_double_string(123.25), "123.25");
    assert_eq!(java_double_string(0.001), "0.001");
    assert_eq!(java_double_string(1e10), "1.0E10");
    assert_eq!(java_double_string(1.5e-5), "1.5E-5");
    assert_eq!(java_double_string(1e7), "1.0E7");
    assert_eq!(java_float_string(0.1), "0.1");
    assert_eq!(java_double_string(f64::NEG_INFINITY), "-Infinity");
}

#[test]
fn scalar_strings() {
    let policy = mysql(5);
    let zerofill = col(ColumnType::INTEGER)
        .with_flags(ColumnFlags::ZEROFILL_FLAG)
        .with_length(5);
    assert_eq!(scalar_string(Ctx::new(&zerofill, &policy), Field::SignedInt(42)).unwrap(), "00042");

    let raw = col(ColumnType::RAW);
    assert_eq!(scalar_string(Ctx::new(&raw, &policy), Field::Bytes(&[0xDE, 0xAD])).unwrap(), "DEAD");

    let double = col(ColumnType::DOUBLE);
    assert_eq!(scalar_string(Ctx::new(&double, &policy), Field::Double(2.0)).unwrap(), "2.0");

    let mut limited = mysql(5);
    limited.max_field_size = 3;
    let text = col(ColumnType::VARCHAR);
    assert_eq!(scalar_string(Ctx::new(&text, &limited), Field::Text(b"hello")).unwrap(), "hel");
}

#[test]
fn latin1_text() {
    let policy = mysql(5);
    let c = col(ColumnType::VARCHAR).with_charset(crate::constant::LATIN1_CHARSET);
    assert_eq!(scalar_string(Ctx::new(&c, &policy), Field::Text(&[0x63, 0x61, 0x66, 0xE9])).unwrap(), "caf\u{e9}");
}

// ============================================================================
// Temporal
// ============================================================================

#[test]
fn zero_date_policies() {
    let c = col(ColumnType::DATE);
    let zero = Field::DateTime(DateTimeParts::default());

    let err = to_date(Ctx::new(&c, &mysql(5)), zero, false).unwrap_err();
    assert_eq!(err.to_string(), "Value '0000-00-00' can not be represented as DATE");
    let err = to_date(Ctx::new(&c, &mysql(8)), zero, false).unwrap_err();
    assert_eq!(err.to_string(), "Zero date value prohibited");

    let mut policy = mysql(5);
    policy.zero_date = ZeroDateTimeBehavior::ConvertToNull;
    assert_eq!(to_date(Ctx::new(&c, &policy), zero, false).unwrap(), None);

    policy.zero_date = ZeroDateTimeBehavior::Round;
    assert_eq!(
        to_date(Ctx::new(&c, &policy), zero, false).unwrap(),
        NaiveDate::from_ymd_opt(1, 1, 1)
    );
}

#[test]
fn zero_text_date_is_never_rounded() {
    let mut policy = mysql(5);
    policy.zero_date = ZeroDateTimeBehavior::Round;
    let date = col(ColumnType::DATE);
    assert_eq!(to_date(Ctx::new(&date, &policy), Field::Text(b"0000-00-00"), false).unwrap(), None);
    let varchar = col(ColumnType::VARCHAR);
    assert_eq!(to_date(Ctx::new(&varchar, &policy), Field::Text(b"0000-00-00"), false).unwrap(), None);

    policy.zero_date = ZeroDateTimeBehavior::Exception;
    assert!(matches!(
        to_date(Ctx::new(&date, &policy), Field::Text(b"0000-00-00"), false),
        Err(Error::ZeroDate(_))
    ));
}

#[test]
fn two_digit_years() {
    let policy = mysql(5);
    let year2 = col(ColumnType::YEAR).with_length(2);
    let ctx = Ctx::new(&year2, &policy);
    assert_eq!(year_value(ctx, Field::SignedInt(69)).unwrap(), 2069);
    assert_eq!(year_value(ctx, Field::SignedInt(70)).unwrap(), 1970);

    let year4 = col(ColumnType::YEAR).with_length(4);
    assert_eq!(year_value(Ctx::new(&year4, &policy), Field::SignedInt(5)).unwrap(), 5);
    assert_eq!(year_value(Ctx::new(&year4, &mysql(8)), Field::SignedInt(5)).unwrap(), 2005);
    assert_eq!(
        to_date(Ctx::new(&year2, &policy), Field::Text(b"99"), false).unwrap(),
        NaiveDate::from_ymd_opt(1999, 1, 1)
    );
}

#[test]
fn time_beyond_one_day() {
    let c = col(ColumnType::TIME);
    let parts = TimeParts {
        days: 1,
        hour: 1,
        len: 8,
        ..Default::default()
    };

    let err = to_time(Ctx::new(&c, &mysql(8)), Field::Time(parts)).unwrap_err();
    assert!(
        matches!(&err, Error::MalformedValue { message, .. } if message == "The value '25:0:0' is an invalid TIME value."),
        "{err}"
    );

    let legacy = to_time(Ctx::new(&c, &mysql(5)), Field::Time(parts)).unwrap();
    assert_eq!(legacy, NaiveTime::from_hms_opt(1, 0, 0));

    let negative = TimeParts {
        negative: true,
        hour: 1,
        len: 8,
        ..Default::default()
    };
    let wrapped = to_time(Ctx::new(&c, &mysql(5)), Field::Time(negative)).unwrap();
    assert_eq!(wrapped, NaiveTime::from_hms_opt(23, 0, 0));
}

#[test]
fn lenient_calendar() {
    let c = col(ColumnType::DATETIME);
    let field = Field::DateTime(datetime(2023, 13, 1, 0, 0, 0, 0));

    assert!(to_timestamp(Ctx::new(&c, &mysql(8)), field, None, false).is_err());
    let rolled = to_timestamp(Ctx::new(&c, &mysql(8)), field, None, true).unwrap().unwrap();
    assert_eq!(rolled.date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    let legacy = to_timestamp(Ctx::new(&c, &mysql(5)), field, None, false).unwrap().unwrap();
    assert_eq!(legacy, rolled);
}

#[test]
fn timestamp_strings_by_dialect() {
    let c = col(ColumnType::DATETIME).with_length(19);
    let whole = Field::DateTime(datetime(2024, 1, 2, 3, 4, 5, 0));
    assert_eq!(
        timestamp_string(Ctx::new(&c, &mysql(5)), whole).unwrap().unwrap(),
        "2024-01-02 03:04:05.0"
    );
    assert_eq!(
        timestamp_string(Ctx::new(&c, &mysql(8)), whole).unwrap().unwrap(),
        "2024-01-02 03:04:05"
    );

    let millis = col(ColumnType::DATETIME).with_length(23).with_decimals(3);
    let fractional = Field::DateTime(datetime(2024, 1, 2, 3, 4, 5, 120_000_000));
    assert_eq!(
        timestamp_string(Ctx::new(&millis, &mysql(8)), fractional).unwrap().unwrap(),
        "2024-01-02 03:04:05.120"
    );
    assert_eq!(
        timestamp_string(Ctx::new(&millis, &mysql(5)), fractional).unwrap().unwrap(),
        "2024-01-02 03:04:05.12"
    );

    let nano = col(ColumnType::TIMESTAMP_NANO);
    assert_eq!(
        timestamp_string(Ctx::new(&nano, &oracle()), whole).unwrap().unwrap(),
        "2024-01-02 03:04:05"
    );

    let zero = Field::DateTime(DateTimeParts::default());
    assert_eq!(
        timestamp_string(Ctx::new(&c, &mysql(8)), zero).unwrap().unwrap(),
        "0000-00-00 00:00:00"
    );
}

#[test]
fn time_strings() {
    let c = col(ColumnType::TIME).with_decimals(6);
    let parts = TimeParts {
        negative: true,
        days: 1,
        hour: 2,
        minute: 3,
        second: 4,
        micros: 500,
        len: 12,
    };
    assert_eq!(
        time_string(Ctx::new(&c, &mysql(8)), Field::Time(parts)).unwrap().unwrap(),
        "-26:03:04.000500"
    );
    assert_eq!(
        time_string(Ctx::new(&c, &mysql(5)), Field::Time(parts)).unwrap().unwrap(),
        "-26:03:04"
    );
    assert_eq!(
        time_string(Ctx::new(&c, &mysql(8)), Field::Time(TimeParts::default())).unwrap().unwrap(),
        "00:00:00.000000"
    );
    assert_eq!(
        time_string(Ctx::new(&c, &mysql(5)), Field::Text(b"10:11:12.000")).unwrap().unwrap(),
        "10:11:12"
    );
}

#[test]
fn zoned_timestamps() {
    let c = col(ColumnType::TIMESTAMP_TZ);
    let mut parts = datetime(2024, 6, 1, 12, 0, 0, 0);
    parts.offset_seconds = Some(5 * 3600 + 30 * 60);
    let field = Field::DateTime(parts);
    let policy = oracle();

    let own = to_timestamp_with_zone(Ctx::new(&c, &policy), field, None).unwrap().unwrap();
    assert_eq!(own.offset().local_minus_utc(), 5 * 3600 + 30 * 60);
    assert_eq!(own.hour(), 12);

    let utc = FixedOffset::east_opt(0).unwrap();
    let converted = to_timestamp_with_zone(Ctx::new(&c, &policy), field, Some(utc)).unwrap().unwrap();
    assert_eq!(converted.hour(), 6);
    assert_eq!(converted.minute(), 30);
    assert_eq!(converted, own);
}

#[test]
fn timestamp_text_with_offset() {
    let policy = mysql(5);
    let c = col(ColumnType::VARCHAR);
    let parts = parse_datetime_text(Ctx::new(&c, &policy), "2024-01-02 03:04:05.5 +02:00").unwrap();
    assert_eq!((parts.hour, parts.minute, parts.second), (3, 4, 5));
    assert_eq!(parts.nanos, 500_000_000);
    assert_eq!(parts.offset_seconds, Some(7200));
    assert!(parse_datetime_text(Ctx::new(&c, &policy), "2024/01/02").is_err());
}

#[test]
fn date_text_digit_loop() {
    let policy = mysql(5);
    let c = col(ColumnType::DATE);
    let err = parse_date_text(Ctx::new(&c, &policy), "2024-0x-01").unwrap_err();
    assert!(err.to_string().contains("cannot parse data in date string '2024-0x-01'"));
}
