use chrono::FixedOffset;

use crate::opts::{Dialect, Opts, ZeroDateTimeBehavior};

/// Dialect and compatibility switches, resolved once from [`Opts`] for a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormattingPolicy {
    pub oracle: bool,
    /// MySQL dialect with `compatibleMysqlVersion=8`
    pub mysql8: bool,
    /// MySQL dialect with `compatibleMysqlVersion=5`
    pub mysql5: bool,
    pub ojdbc8: bool,
    pub zero_date: ZeroDateTimeBehavior,
    pub legacy_datetime: bool,
    pub compliant_truncation: bool,
    pub year_is_date: bool,
    pub tiny_int1_is_bit: bool,
    pub empty_string_is_zero: bool,
    pub map_date_to_timestamp: bool,
    pub maximize_mysql_compat: bool,
    pub max_field_size: usize,
    pub session_zone: FixedOffset,
}

impl FormattingPolicy {
    pub fn resolve(opts: &Opts, dialect: Dialect) -> Self {
        let oracle = dialect == Dialect::Oracle;
        Self {
            oracle,
            mysql8: !oracle && opts.compatible_mysql_version == 8,
            mysql5: !oracle && opts.compatible_mysql_version == 5,
            ojdbc8: opts.compatible_ojdbc_version == 8,
            zero_date: opts.zero_date_time_behavior,
            legacy_datetime: opts.use_legacy_datetime_code,
            compliant_truncation: opts.jdbc_compliant_truncation,
            year_is_date: opts.year_is_date_type,
            tiny_int1_is_bit: opts.tiny_int1_is_bit,
            empty_string_is_zero: opts.empty_strings_convert_to_zero,
            map_date_to_timestamp: opts.map_date_to_timestamp,
            maximize_mysql_compat: opts.maximize_mysql_compatibility,
            max_field_size: opts.max_field_size,
            session_zone: opts.session_time_zone,
        }
    }

    /// Length of a string or byte result after applying `maxFieldSize`.
    pub fn field_limit(&self, len: usize) -> usize {
        if self.max_field_size == 0 {
            len
        } else {
            len.min(self.max_field_size)
        }
    }
}
