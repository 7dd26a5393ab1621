use chrono::FixedOffset;
use smart_default::SmartDefault;

use crate::error::Error;

/// SQL dialect the server speaks for this result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Mysql,
    Oracle,
}

/// What to do with an all-zero date or timestamp (`0000-00-00`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroDateTimeBehavior {
    /// Fail the accessor
    #[default]
    Exception,
    /// Return NULL
    ConvertToNull,
    /// Substitute `0001-01-01`
    Round,
}

/// Session options read by the decoders.
///
/// ```rs
/// let mut opts = Opts::default();
/// opts.compatible_mysql_version = 8;
///
/// let opts = Opts::try_from("oceanbase://localhost/test?zeroDateTimeBehavior=convertToNull");
/// ```
#[derive(Debug, Clone, SmartDefault)]
pub struct Opts {
    /// Dialect assumed when the caller does not pass one explicitly
    pub mode: Dialect,

    /// `5` selects legacy temporal formatting, `8` the modern rules
    #[default(5)]
    pub compatible_mysql_version: u8,

    /// `8` drops a zero fractional second from Oracle timestamp strings
    #[default(8)]
    pub compatible_ojdbc_version: u8,

    pub zero_date_time_behavior: ZeroDateTimeBehavior,

    #[default(true)]
    pub use_legacy_datetime_code: bool,

    /// Range check the floating point fallback of integer conversions
    #[default(true)]
    pub jdbc_compliant_truncation: bool,

    /// Truncate strings (characters) and byte results; 0 is unlimited
    pub max_field_size: usize,

    #[default(true)]
    pub year_is_date_type: bool,

    /// Report TINYINT(1) as a boolean in dynamically typed values
    #[default(true)]
    pub tiny_int1_is_bit: bool,

    /// Read `''` as 0 from numeric accessors
    #[default(true)]
    pub empty_strings_convert_to_zero: bool,

    /// Oracle `DATE` columns are reported as timestamps
    #[default(true)]
    pub map_date_to_timestamp: bool,

    pub maximize_mysql_compatibility: bool,

    /// Zone of the session, used for values without an explicit offset
    #[default(chrono::Offset::fix(&chrono::Utc))]
    pub session_time_zone: FixedOffset,
}

impl Opts {
    pub fn dialect(&self) -> Dialect {
        self.mode
    }
}

impl TryFrom<&str> for Opts {
    type Error = Error;

    fn try_from(url: &str) -> Result<Self, Self::Error> {
        let parsed = url::Url::parse(url)
            .map_err(|e| Error::BadConfigError(format!("Failed to parse URL: {}", e)))?;

        if parsed.scheme() != "mysql" && parsed.scheme() != "oceanbase" {
            return Err(Error::BadConfigError(format!(
                "Invalid URL scheme '{}', expected 'mysql' or 'oceanbase'",
                parsed.scheme()
            )));
        }

        let mut opts = Self::default();
        for (key, value) in parsed.query_pairs() {
            match key.as_ref() {
                "mode" => {
                    opts.mode = match value.to_ascii_lowercase().as_str() {
                        "oracle" => Dialect::Oracle,
                        "mysql" => Dialect::Mysql,
                        _ => return Err(bad_value(&key, &value)),
                    }
                }
                "compatibleMysqlVersion" => {
                    opts.compatible_mysql_version = value.parse().map_err(|_e| bad_value(&key, &value))?;
                }
                "compatibleOjdbcVersion" => {
                    opts.compatible_ojdbc_version = value.parse().map_err(|_e| bad_value(&key, &value))?;
                }
                "zeroDateTimeBehavior" => {
                    opts.zero_date_time_behavior = match value.as_ref() {
                        "exception" => ZeroDateTimeBehavior::Exception,
                        "convertToNull" => ZeroDateTimeBehavior::ConvertToNull,
                        "round" => ZeroDateTimeBehavior::Round,
                        _ => return Err(bad_value(&key, &value)),
                    }
                }
                "useLegacyDatetimeCode" => opts.use_legacy_datetime_code = parse_bool(&key, &value)?,
                "jdbcCompliantTruncation" => {
                    opts.jdbc_compliant_truncation = parse_bool(&key, &value)?;
                }
                "maxFieldSize" => {
                    opts.max_field_size = value.parse().map_err(|_e| bad_value(&key, &value))?;
                }
                "yearIsDateType" => opts.year_is_date_type = parse_bool(&key, &value)?,
                "tinyInt1isBit" => opts.tiny_int1_is_bit = parse_bool(&key, &value)?,
                "emptyStringsConvertToZero" => {
                    opts.empty_strings_convert_to_zero = parse_bool(&key, &value)?;
                }
                "mapDateToTimestamp" => opts.map_date_to_timestamp = parse_bool(&key, &value)?,
                "maximizeMysqlCompatibility" => {
                    opts.maximize_mysql_compatibility = parse_bool(&key, &value)?;
                }
                "serverTimezone" => {
                    opts.session_time_zone =
                        parse_utc_offset(&value).ok_or_else(|| bad_value(&key, &value))?;
                }
                other => tracing::debug!(option = other, "ignoring unrecognized option"),
            }
        }

        Ok(opts)
    }
}

fn bad_value(key: &str, value: &str) -> Error {
    Error::BadConfigError(format!("Invalid value '{}' for option '{}'", value, key))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, Error> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(bad_value(key, value)),
    }
}

/// Parse `UTC`, `Z`, `GMT`, `+08:00`, `-0530`, `GMT+8` style offsets.
pub(crate) fn parse_utc_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    let rest = s
        .strip_prefix("UTC")
        .or_else(|| s.strip_prefix("GMT"))
        .unwrap_or(s);
    if rest.is_empty() || rest == "Z" {
        return FixedOffset::east_opt(0);
    }

    let (sign, digits) = match rest.as_bytes().first()? {
        b'+' => (1, rest.get(1..)?),
        b'-' => (-1, rest.get(1..)?),
        // `+` decodes to a space in URL queries
        b'0'..=b'9' => (1, rest),
        _ => return None,
    };
    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h.parse::<i32>().ok()?, m.parse::<i32>().ok()?),
        None if digits.len() == 4 => (
            digits.get(..2)?.parse::<i32>().ok()?,
            digits.get(2..)?.parse::<i32>().ok()?,
        ),
        None => (digits.parse::<i32>().ok()?, 0),
    };
    if hours > 18 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
