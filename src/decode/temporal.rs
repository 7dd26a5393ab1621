//! Date, time, timestamp and interval conversions.
//!
//! Conversions that may turn a zero date into NULL return `Ok(None)`; the
//! caller records that on the cursor so `was_null` reports it.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};

use crate::constant::ColumnType;
use crate::decode::convert::Ctx;
use crate::error::{Error, Result};
use crate::opts::{ZeroDateTimeBehavior, parse_utc_offset};
use crate::protocol::value::{DateTimeParts, Field, TimeParts};
use crate::value::{IntervalDaySecond, IntervalYearMonth};

const SECONDS_PER_DAY: i64 = 86_400;

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

fn rounded_zero_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or_default()
}

/// Nanoseconds of a fractional-second digit string; digits past the ninth are dropped.
pub fn fraction_to_nanos(fraction: &str) -> Option<u32> {
    let digits: String = fraction.chars().take_while(char::is_ascii_digit).take(9).collect();
    if digits.len() != fraction.len().min(9) && fraction.chars().take(9).any(|c| !c.is_ascii_digit()) {
        return None;
    }
    if digits.is_empty() {
        return Some(0);
    }
    let value: u32 = digits.parse().ok()?;
    Some(value * 10u32.pow(9 - digits.len() as u32))
}

// ============================================================================
// Text parsing
// ============================================================================

fn two_digits(s: &str, at: usize) -> Option<u8> {
    s.get(at..at + 2)?.parse().ok()
}

/// `YYYY-MM-DD[( |T)HH:MM:SS[.f]][ offset]`
pub(crate) fn parse_datetime_text(ctx: Ctx<'_>, text: &str) -> Result<DateTimeParts> {
    let s = text.trim();
    let bad = || ctx.malformed(s, "Bad format for Timestamp");
    let bytes = s.as_bytes();
    if bytes.len() < 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(bad());
    }
    let mut parts = DateTimeParts {
        year: s.get(0..4).and_then(|y| y.parse().ok()).ok_or_else(bad)?,
        month: two_digits(s, 5).ok_or_else(bad)?,
        day: two_digits(s, 8).ok_or_else(bad)?,
        len: s.len(),
        ..Default::default()
    };
    let Some(rest) = s.get(10..).filter(|r| !r.is_empty()) else {
        return Ok(parts);
    };
    let rest = rest.strip_prefix([' ', 'T']).ok_or_else(bad)?;
    parts.hour = two_digits(rest, 0).ok_or_else(bad)?;
    parts.minute = two_digits(rest, 3).ok_or_else(bad)?;
    parts.second = two_digits(rest, 6).ok_or_else(bad)?;
    let mut tail = rest.get(8..).unwrap_or_default();
    if let Some(fraction) = tail.strip_prefix('.') {
        let end = fraction.find(|c: char| !c.is_ascii_digit()).unwrap_or(fraction.len());
        let (digits, after) = fraction.split_at(end);
        parts.nanos = fraction_to_nanos(digits).ok_or_else(bad)?;
        tail = after;
    }
    let zone = tail.trim();
    if !zone.is_empty() {
        match parse_utc_offset(zone) {
            Some(offset) => parts.offset_seconds = Some(offset.local_minus_utc()),
            None => tracing::debug!(column = ctx.name(), zone, "unrecognized zone in timestamp text"),
        }
    }
    Ok(parts)
}

/// DATE text: digit groups separated by `-`.
pub(crate) fn parse_date_text(ctx: Ctx<'_>, text: &str) -> Result<DateTimeParts> {
    let mut groups = [0u32; 3];
    let mut idx = 0;
    for c in text.chars() {
        match c {
            '0'..='9' => {
                let digit = c.to_digit(10).unwrap_or_default();
                let group = &mut groups[idx];
                *group = group.saturating_mul(10).saturating_add(digit);
            }
            '-' if idx < 2 => idx += 1,
            _ => {
                return Err(ctx.malformed(
                    text,
                    format!("cannot parse data in date string '{}'", text),
                ));
            }
        }
    }
    let [year, month, day] = groups;
    Ok(DateTimeParts {
        year: u16::try_from(year).map_err(|_e| ctx.malformed(text, "year out of range"))?,
        month: u8::try_from(month).map_err(|_e| ctx.malformed(text, "month out of range"))?,
        day: u8::try_from(day).map_err(|_e| ctx.malformed(text, "day out of range"))?,
        len: text.len(),
        ..Default::default()
    })
}

/// `[-]H+:MM[:SS[.f]]`
pub(crate) fn parse_time_text(ctx: Ctx<'_>, text: &str) -> Result<TimeParts> {
    let s = text.trim();
    let bad = || ctx.malformed(s, "Bad format for Time");
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (clock, fraction) = body.split_once('.').unwrap_or((body, ""));
    let mut fields = clock.split(':');
    let hours: u64 = fields.next().and_then(|h| h.parse().ok()).ok_or_else(bad)?;
    let minute: u8 = fields.next().and_then(|m| m.parse().ok()).ok_or_else(bad)?;
    let second: u8 = match fields.next() {
        Some(sec) => sec.parse().map_err(|_e| bad())?,
        None => 0,
    };
    if fields.next().is_some() || minute > 59 || second > 59 {
        return Err(bad());
    }
    let nanos = fraction_to_nanos(fraction).ok_or_else(bad)?;
    Ok(TimeParts {
        negative,
        days: u32::try_from(hours / 24).map_err(|_e| bad())?,
        hour: (hours % 24) as u8,
        minute,
        second,
        micros: nanos / 1000,
        len: s.len(),
    })
}

fn datetime_parts(ctx: Ctx<'_>, field: Field<'_>, accessor: &'static str) -> Result<DateTimeParts> {
    match field {
        Field::DateTime(parts) => Ok(parts),
        Field::Text(t) if matches!(ctx.ty(), ColumnType::DATE | ColumnType::NEWDATE) => {
            parse_date_text(ctx, &ctx.text(t))
        }
        Field::Text(t) => parse_datetime_text(ctx, &ctx.text(t)),
        _ => Err(ctx.unsupported(accessor)),
    }
}

fn time_parts(ctx: Ctx<'_>, field: Field<'_>, accessor: &'static str) -> Result<TimeParts> {
    match field {
        Field::Time(parts) => Ok(parts),
        Field::Text(t) => parse_time_text(ctx, &ctx.text(t)),
        _ => Err(ctx.unsupported(accessor)),
    }
}

// ============================================================================
// Building values
// ============================================================================

enum ZeroDate {
    Null,
    Round,
}

fn on_zero_date(ctx: Ctx<'_>, raw: &str, sql_type: &str) -> Result<ZeroDate> {
    match ctx.policy.zero_date {
        ZeroDateTimeBehavior::Exception if ctx.policy.mysql8 => {
            Err(Error::ZeroDate("Zero date value prohibited".to_string()))
        }
        ZeroDateTimeBehavior::Exception => Err(Error::ZeroDate(format!(
            "Value '{}' can not be represented as {}",
            raw, sql_type
        ))),
        ZeroDateTimeBehavior::ConvertToNull => Ok(ZeroDate::Null),
        ZeroDateTimeBehavior::Round => Ok(ZeroDate::Round),
    }
}

fn strict_calendar(ctx: Ctx<'_>, lenient: bool) -> bool {
    ctx.policy.mysql8 && !lenient
}

/// Calendar date of `parts`. Lenient mode rolls overflowing fields over the
/// way a lenient Gregorian calendar does (month 13 is January of the next year).
fn build_date(ctx: Ctx<'_>, parts: &DateTimeParts, strict: bool) -> Result<NaiveDate> {
    let display = || format!("{:04}-{:02}-{:02}", parts.year, parts.month, parts.day);
    if strict {
        if parts.year == 0 {
            return Err(ctx.malformed(display(), "ILLEGAL YEAR"));
        }
        return NaiveDate::from_ymd_opt(i32::from(parts.year), u32::from(parts.month), u32::from(parts.day))
            .ok_or_else(|| ctx.malformed(display(), "invalid date"));
    }
    let first = NaiveDate::from_ymd_opt(i32::from(parts.year), 1, 1)
        .ok_or_else(|| ctx.malformed(display(), "year out of range"))?;
    let month_shifted = if parts.month == 0 {
        first.checked_sub_months(Months::new(1))
    } else {
        first.checked_add_months(Months::new(u32::from(parts.month) - 1))
    };
    month_shifted
        .and_then(|d| d.checked_add_signed(Duration::days(i64::from(parts.day) - 1)))
        .ok_or_else(|| ctx.malformed(display(), "date out of range"))
}

fn build_datetime(ctx: Ctx<'_>, parts: &DateTimeParts, strict: bool) -> Result<NaiveDateTime> {
    let date = build_date(ctx, parts, strict)?;
    if strict {
        let time = NaiveTime::from_hms_nano_opt(
            u32::from(parts.hour),
            u32::from(parts.minute),
            u32::from(parts.second),
            parts.nanos,
        )
        .ok_or_else(|| {
            ctx.malformed(
                format!("{:02}:{:02}:{:02}", parts.hour, parts.minute, parts.second),
                "invalid time",
            )
        })?;
        return Ok(date.and_time(time));
    }
    let offset = Duration::hours(i64::from(parts.hour))
        + Duration::minutes(i64::from(parts.minute))
        + Duration::seconds(i64::from(parts.second))
        + Duration::nanoseconds(i64::from(parts.nanos));
    date.and_time(NaiveTime::MIN)
        .checked_add_signed(offset)
        .ok_or_else(|| ctx.malformed(format!("{:?}", parts), "timestamp out of range"))
}

/// Time of day of a TIME value. MySQL 8 rejects values outside a day; legacy
/// mode wraps them modulo 24 hours.
fn time_of_day(ctx: Ctx<'_>, parts: &TimeParts) -> Result<NaiveTime> {
    let nanos = parts.micros.saturating_mul(1000);
    if ctx.policy.mysql8 {
        let hours = parts.total_hours();
        if hours >= 24 || (parts.negative && (hours, parts.minute, parts.second) != (0, 0, 0)) {
            let sign = if parts.negative { "-" } else { "" };
            let value = format!("{}{}:{}:{}", sign, hours, parts.minute, parts.second);
            let message = format!("The value '{}' is an invalid TIME value.", value);
            return Err(ctx.malformed(value, message));
        }
        return NaiveTime::from_hms_nano_opt(hours as u32, u32::from(parts.minute), u32::from(parts.second), nanos)
            .ok_or_else(|| ctx.malformed(format!("{:?}", parts), "invalid time"));
    }
    let secs = signed_seconds(parts).rem_euclid(SECONDS_PER_DAY);
    NaiveTime::from_num_seconds_from_midnight_opt(secs as u32, nanos)
        .ok_or_else(|| ctx.malformed(format!("{:?}", parts), "invalid time"))
}

fn signed_seconds(parts: &TimeParts) -> i64 {
    let magnitude = parts.total_hours() as i64 * 3600 + i64::from(parts.minute) * 60 + i64::from(parts.second);
    if parts.negative { -magnitude } else { magnitude }
}

/// YEAR value with two-digit years expanded.
pub(crate) fn year_value(ctx: Ctx<'_>, field: Field<'_>) -> Result<i32> {
    let mut year = match field {
        Field::SignedInt(v) => i32::try_from(v).map_err(|_e| ctx.out_of_range(v, "Year"))?,
        Field::UnsignedInt(v) => i32::try_from(v).map_err(|_e| ctx.out_of_range(v, "Year"))?,
        Field::Text(t) => {
            let text = ctx.text(t);
            let trimmed = text.trim();
            if trimmed.is_empty() {
                0
            } else {
                trimmed.parse().map_err(|_e| ctx.malformed(trimmed, "Bad format for Year"))?
            }
        }
        _ => return Err(ctx.unsupported("getDate")),
    };
    if ctx.col.column_length == 2 && year < 100 {
        year += if year <= 69 { 2000 } else { 1900 };
    }
    if ctx.policy.mysql8 && year < 100 {
        year += if year <= 69 { 2000 } else { 1900 };
    }
    Ok(year)
}

fn year_date(ctx: Ctx<'_>, field: Field<'_>) -> Result<Option<NaiveDate>> {
    let year = year_value(ctx, field)?;
    if year == 0 && ctx.policy.mysql5 {
        return match on_zero_date(ctx, "0000", "DATE")? {
            ZeroDate::Null => Ok(None),
            ZeroDate::Round => Ok(Some(rounded_zero_date())),
        };
    }
    NaiveDate::from_ymd_opt(year, 1, 1)
        .map(Some)
        .ok_or_else(|| ctx.malformed(year, "year out of range"))
}

// ============================================================================
// Accessors
// ============================================================================

pub(crate) fn to_date(ctx: Ctx<'_>, field: Field<'_>, lenient: bool) -> Result<Option<NaiveDate>> {
    let ty = ctx.ty();
    match ty {
        ColumnType::TIME => {
            time_parts(ctx, field, "getDate")?;
            Ok(Some(epoch()))
        }
        ColumnType::YEAR => year_date(ctx, field),
        ColumnType::DATE | ColumnType::NEWDATE => {
            let parts = datetime_parts(ctx, field, "getDate")?;
            if parts.is_zero_date() {
                // text rows only round zero timestamps, never dates
                return match on_zero_date(ctx, "0000-00-00", "DATE")? {
                    ZeroDate::Round if !matches!(field, Field::Text(_)) => Ok(Some(rounded_zero_date())),
                    ZeroDate::Null | ZeroDate::Round => Ok(None),
                };
            }
            build_date(ctx, &parts, strict_calendar(ctx, lenient)).map(Some)
        }
        _ if ty.is_timestamp() => Ok(to_timestamp(ctx, field, None, lenient)?.map(|t| t.date())),
        _ if ty.is_textual() => match field {
            Field::Text(t) => {
                let text = ctx.text(t);
                let parts = parse_datetime_text(ctx, &text)?;
                if parts.is_zero_date() {
                    return if ctx.policy.oracle {
                        Ok(None)
                    } else {
                        on_zero_date(ctx, text.trim(), "DATE").map(|_| None)
                    };
                }
                build_date(ctx, &parts, strict_calendar(ctx, lenient)).map(Some)
            }
            _ => Err(ctx.unsupported("getDate")),
        },
        _ => Err(ctx.unsupported("getDate")),
    }
}

pub(crate) fn to_time(ctx: Ctx<'_>, field: Field<'_>) -> Result<Option<NaiveTime>> {
    let ty = ctx.ty();
    match ty {
        ColumnType::TIME => time_of_day(ctx, &time_parts(ctx, field, "getTime")?).map(Some),
        ColumnType::DATE | ColumnType::NEWDATE => {
            let parts = datetime_parts(ctx, field, "getTime")?;
            if parts.is_zero_date() {
                zero_date_midnight(ctx, "0000-00-00", "TIME")?;
            }
            Ok(Some(NaiveTime::MIN))
        }
        ColumnType::YEAR if ctx.policy.mysql8 => Ok(Some(NaiveTime::MIN)),
        _ if ty.is_timestamp() => {
            let parts = datetime_parts(ctx, field, "getTime")?;
            if parts.is_zero_date() {
                zero_date_midnight(ctx, "0000-00-00 00:00:00", "TIME")?;
                return Ok(Some(NaiveTime::MIN));
            }
            NaiveTime::from_hms_nano_opt(
                u32::from(parts.hour),
                u32::from(parts.minute),
                u32::from(parts.second),
                parts.nanos,
            )
            .map(Some)
            .ok_or_else(|| ctx.malformed(format!("{:?}", parts), "invalid time"))
        }
        _ if ty.is_textual() => match field {
            Field::Text(t) => time_of_day(ctx, &parse_time_text(ctx, &ctx.text(t))?).map(Some),
            _ => Err(ctx.unsupported("getTime")),
        },
        _ => Err(ctx.unsupported("getTime")),
    }
}

/// A zero date read as a time of day: an error under the legacy exception
/// policy, midnight otherwise.
fn zero_date_midnight(ctx: Ctx<'_>, raw: &str, sql_type: &str) -> Result<()> {
    if ctx.policy.mysql8 {
        return Ok(());
    }
    on_zero_date(ctx, raw, sql_type).map(|_| ())
}

/// `tz` only affects zoned columns; naive columns are returned as stored.
pub(crate) fn to_timestamp(
    ctx: Ctx<'_>,
    field: Field<'_>,
    tz: Option<FixedOffset>,
    lenient: bool,
) -> Result<Option<NaiveDateTime>> {
    let ty = ctx.ty();
    match ty {
        ColumnType::TIME => {
            let parts = time_parts(ctx, field, "getTimestamp")?;
            if ctx.policy.mysql8 {
                return Ok(Some(epoch().and_time(time_of_day(ctx, &parts)?)));
            }
            // MySQL 5 drops the day count; other modes keep it
            let hours = if ctx.policy.mysql5 {
                i64::from(parts.hour)
            } else {
                parts.total_hours() as i64
            };
            let magnitude = Duration::hours(hours)
                + Duration::minutes(i64::from(parts.minute))
                + Duration::seconds(i64::from(parts.second))
                + Duration::microseconds(i64::from(parts.micros));
            let delta = if parts.negative { -magnitude } else { magnitude };
            epoch()
                .and_time(NaiveTime::MIN)
                .checked_add_signed(delta)
                .map(Some)
                .ok_or_else(|| ctx.malformed(format!("{:?}", parts), "time out of range"))
        }
        ColumnType::YEAR => Ok(year_date(ctx, field)?.map(|d| d.and_time(NaiveTime::MIN))),
        ColumnType::TIMESTAMP_TZ | ColumnType::TIMESTAMP_LTZ => {
            let zone = tz.unwrap_or(ctx.policy.session_zone);
            Ok(to_timestamp_with_zone(ctx, field, Some(zone))?.map(|t| t.naive_local()))
        }
        ColumnType::DATE | ColumnType::NEWDATE => {
            let parts = datetime_parts(ctx, field, "getTimestamp")?;
            naive_datetime(ctx, parts, "0000-00-00", lenient)
        }
        _ if ty.is_timestamp() => {
            let parts = datetime_parts(ctx, field, "getTimestamp")?;
            naive_datetime(ctx, parts, "0000-00-00 00:00:00", lenient)
        }
        _ if ty.is_textual() => match field {
            Field::Text(t) => {
                let text = ctx.text(t);
                let trimmed = text.trim();
                if ctx.policy.oracle && trimmed.len() < 19 {
                    return Err(ctx.malformed(
                        trimmed,
                        "Timestamp format must be yyyy-mm-dd hh:mm:ss[.fffffffff]",
                    ));
                }
                let parts = parse_datetime_text(ctx, trimmed)?;
                if parts.is_zero_date() && ctx.policy.oracle {
                    return Ok(None);
                }
                naive_datetime(ctx, parts, trimmed, lenient)
            }
            _ => Err(ctx.unsupported("getTimestamp")),
        },
        _ => Err(ctx.unsupported("getTimestamp")),
    }
}

fn naive_datetime(
    ctx: Ctx<'_>,
    mut parts: DateTimeParts,
    raw: &str,
    lenient: bool,
) -> Result<Option<NaiveDateTime>> {
    if parts.is_zero_date() {
        match on_zero_date(ctx, raw, "TIMESTAMP")? {
            ZeroDate::Null => return Ok(None),
            ZeroDate::Round => {
                parts.year = 1;
                parts.month = 1;
                parts.day = 1;
            }
        }
    }
    build_datetime(ctx, &parts, strict_calendar(ctx, lenient)).map(Some)
}

/// Instant of the field. Zoned columns carry their own offset (or the session
/// zone for LTZ); naive values are interpreted in `tz`, defaulting to the
/// session zone. A given `tz` is also the zone of the result.
pub(crate) fn to_timestamp_with_zone(
    ctx: Ctx<'_>,
    field: Field<'_>,
    tz: Option<FixedOffset>,
) -> Result<Option<DateTime<FixedOffset>>> {
    let session = ctx.policy.session_zone;
    let (naive, own_zone) = match ctx.ty() {
        ColumnType::TIMESTAMP_TZ | ColumnType::TIMESTAMP_LTZ => {
            let parts = datetime_parts(ctx, field, "getTimestamp")?;
            let own = match parts.offset_seconds {
                Some(secs) if ctx.ty() == ColumnType::TIMESTAMP_TZ => FixedOffset::east_opt(secs)
                    .ok_or_else(|| ctx.malformed(secs, "invalid zone offset"))?,
                _ => session,
            };
            let Some(naive) = naive_datetime(ctx, parts, "0000-00-00 00:00:00", true)? else {
                return Ok(None);
            };
            (naive, own)
        }
        _ => {
            let Some(naive) = to_timestamp(ctx, field, None, false)? else {
                return Ok(None);
            };
            (naive, tz.unwrap_or(session))
        }
    };
    let instant = own_zone
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| ctx.malformed(naive, "ambiguous local time"))?;
    Ok(Some(match tz {
        Some(zone) => instant.with_timezone(&zone),
        None => instant,
    }))
}

// ============================================================================
// String forms
// ============================================================================

/// Fraction digits of `nanos` without trailing zeros.
fn trimmed_fraction(nanos: u32, width: usize) -> String {
    let digits = format!("{:09}", nanos);
    let digits = digits.get(..width).unwrap_or(&digits);
    digits.trim_end_matches('0').to_string()
}

fn pad_fraction(mut fraction: String, decimals: u8) -> String {
    while fraction.len() < usize::from(decimals.min(9)) {
        fraction.push('0');
    }
    fraction
}

fn zero_date_string(ctx: Ctx<'_>, literal: &str, rounded: &str, sql_type: &str) -> Result<Option<String>> {
    if ctx.policy.mysql8 {
        return Ok(Some(literal.to_string()));
    }
    match on_zero_date(ctx, literal, sql_type)? {
        ZeroDate::Null => Ok(None),
        ZeroDate::Round => Ok(Some(rounded.to_string())),
    }
}

pub(crate) fn date_string(ctx: Ctx<'_>, field: Field<'_>) -> Result<Option<String>> {
    let parts = datetime_parts(ctx, field, "getString")?;
    if parts.is_zero_date() {
        return zero_date_string(ctx, "0000-00-00", "0001-01-01", "DATE");
    }
    match field {
        Field::Text(t) => Ok(Some(ctx.text(t).into_owned())),
        _ => {
            let date = build_date(ctx, &parts, false)?;
            Ok(Some(format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())))
        }
    }
}

pub(crate) fn time_string(ctx: Ctx<'_>, field: Field<'_>) -> Result<Option<String>> {
    match field {
        Field::Time(parts) => {
            if parts.len == 0 {
                let mut s = "00:00:00".to_string();
                if (1..=6).contains(&ctx.col.decimals) {
                    s.push('.');
                    s.push_str(&"0".repeat(usize::from(ctx.col.decimals)));
                }
                return Ok(Some(s));
            }
            let sign = if parts.negative { "-" } else { "" };
            let mut s = format!(
                "{}{:02}:{:02}:{:02}",
                sign,
                parts.total_hours(),
                parts.minute,
                parts.second
            );
            if ctx.policy.oracle {
                s.push_str(&format!(".{:06}", parts.micros));
            } else if ctx.policy.mysql8 && parts.micros != 0 {
                let fraction = trimmed_fraction(parts.micros.saturating_mul(1000), 6);
                s.push('.');
                s.push_str(&pad_fraction(fraction, ctx.col.decimals));
            }
            Ok(Some(s))
        }
        Field::Text(t) => {
            let text = ctx.text(t).into_owned();
            if ctx.policy.mysql5 {
                parse_time_text(ctx, &text)?;
            }
            match text.split_once('.') {
                Some((clock, fraction))
                    if (ctx.policy.maximize_mysql_compat && ctx.policy.legacy_datetime)
                        || ctx.policy.mysql5
                        || fraction.chars().all(|c| c == '0') =>
                {
                    Ok(Some(clock.to_string()))
                }
                _ => Ok(Some(text)),
            }
        }
        _ => Err(ctx.unsupported("getString")),
    }
}

pub(crate) fn timestamp_string(ctx: Ctx<'_>, field: Field<'_>) -> Result<Option<String>> {
    let ty = ctx.ty();
    if matches!(ty, ColumnType::TIMESTAMP_TZ | ColumnType::TIMESTAMP_LTZ) {
        if let Field::Text(t) = field {
            return Ok(Some(ctx.text(t).into_owned()));
        }
        let Some(zoned) = to_timestamp_with_zone(ctx, field, None)? else {
            return Ok(None);
        };
        let fraction = trimmed_fraction(zoned.nanosecond(), 9);
        let fraction = if fraction.is_empty() { "0".to_string() } else { fraction };
        return Ok(Some(format!(
            "{}.{} {}",
            zoned.format("%Y-%m-%d %H:%M:%S"),
            fraction,
            zoned.format("%:z")
        )));
    }

    let parts = datetime_parts(ctx, field, "getString")?;
    if parts.is_zero_date() {
        return zero_date_string(ctx, "0000-00-00 00:00:00", "0001-01-01 00:00:00", "TIMESTAMP");
    }
    if let Field::Text(t) = field
        && !ctx.policy.oracle
        && !ctx.policy.mysql8
    {
        return Ok(Some(ctx.text(t).into_owned()));
    }
    let value = build_datetime(ctx, &parts, false)?;
    let base = value.format("%Y-%m-%d %H:%M:%S").to_string();
    let fraction = trimmed_fraction(value.nanosecond(), 9);
    let s = if ctx.policy.oracle {
        if !fraction.is_empty() {
            format!("{}.{}", base, fraction)
        } else if ty == ColumnType::TIMESTAMP_NANO || ctx.policy.ojdbc8 {
            base
        } else {
            format!("{}.0", base)
        }
    } else if ctx.policy.mysql8 {
        if fraction.is_empty() {
            base
        } else {
            format!("{}.{}", base, pad_fraction(fraction, ctx.col.decimals))
        }
    } else if fraction.is_empty() {
        format!("{}.0", base)
    } else {
        format!("{}.{}", base, fraction)
    };
    Ok(Some(s))
}

pub(crate) fn year_string(ctx: Ctx<'_>, field: Field<'_>) -> Result<Option<String>> {
    if let Field::Text(t) = field {
        let text = ctx.text(t);
        if text.as_ref() == "0000" {
            if ctx.policy.mysql5 && ctx.policy.year_is_date {
                return Ok(Some("0001-01-01".to_string()));
            }
            if ctx.policy.mysql8 {
                return Ok(Some("0".to_string()));
            }
        }
        if !ctx.policy.year_is_date {
            return Ok(Some(text.into_owned()));
        }
    }
    if ctx.policy.year_is_date {
        return Ok(year_date(ctx, field)?.map(|d| format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day())));
    }
    let year = year_value(ctx, field)?;
    if ctx.policy.mysql5 {
        Ok(Some(format!("{:0width$}", year, width = ctx.col.column_length.max(4) as usize)))
    } else {
        Ok(Some(year.to_string()))
    }
}

// ============================================================================
// Intervals
// ============================================================================

/// Biased wire bytes start with 0x7F or 0x80; text starts with a sign or digit.
fn looks_biased(bytes: &[u8]) -> bool {
    matches!(bytes.first(), Some(0x7F | 0x80))
}

pub(crate) fn to_interval_year_month(ctx: Ctx<'_>, field: Field<'_>) -> Result<IntervalYearMonth> {
    let (Field::Bytes(b) | Field::Text(b)) = field else {
        return Err(ctx.unsupported("getIntervalYearMonth"));
    };
    if ctx.ty() != ColumnType::INTERVALYM {
        return Err(ctx.unsupported("getIntervalYearMonth"));
    }
    if b.is_empty() {
        return Ok(IntervalYearMonth::default());
    }
    if b.len() == 5 && looks_biased(b) {
        return IntervalYearMonth::from_bytes(b);
    }
    let text = ctx.text(b);
    IntervalYearMonth::parse(&text).ok_or_else(|| ctx.malformed(text.as_ref(), "Bad format for INTERVAL YEAR TO MONTH"))
}

pub(crate) fn to_interval_day_second(ctx: Ctx<'_>, field: Field<'_>) -> Result<IntervalDaySecond> {
    let (Field::Bytes(b) | Field::Text(b)) = field else {
        return Err(ctx.unsupported("getIntervalDaySecond"));
    };
    if ctx.ty() != ColumnType::INTERVALDS {
        return Err(ctx.unsupported("getIntervalDaySecond"));
    }
    if b.is_empty() {
        return Ok(IntervalDaySecond::default());
    }
    if b.len() == 11 && looks_biased(b) {
        return IntervalDaySecond::from_bytes(b);
    }
    let text = ctx.text(b);
    IntervalDaySecond::parse(&text).ok_or_else(|| ctx.malformed(text.as_ref(), "Bad format for INTERVAL DAY TO SECOND"))
}

/// Leaf DATE or TIMESTAMP inside a composite value; `None` for the empty encoding.
pub(crate) fn composite_datetime(data: &[u8], nano_fraction: bool) -> Result<Option<NaiveDateTime>> {
    let parts = DateTimeParts::from_packed(data, nano_fraction)?;
    if parts.is_zero_date() {
        return Ok(None);
    }
    let date = NaiveDate::from_ymd_opt(i32::from(parts.year), u32::from(parts.month), u32::from(parts.day));
    let time = NaiveTime::from_hms_nano_opt(
        u32::from(parts.hour),
        u32::from(parts.minute),
        u32::from(parts.second),
        parts.nanos,
    );
    match (date, time) {
        (Some(d), Some(t)) => Ok(Some(d.and_time(t))),
        _ => Err(Error::ProtocolCorruption(format!("invalid date in composite value: {:?}", parts))),
    }
}
