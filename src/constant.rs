use crate::opts::Dialect;

/// Charset number marking binary (non-text) data
pub const BINARY_CHARSET: u16 = 63;
/// latin1_swedish_ci
pub const LATIN1_CHARSET: u16 = 8;

bitflags::bitflags! {
    /// Column definition flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ColumnFlags: u16 {
        const NOT_NULL_FLAG = 0x0001;
        const PRI_KEY_FLAG = 0x0002;
        const UNIQUE_KEY_FLAG = 0x0004;
        const MULTIPLE_KEY_FLAG = 0x0008;
        const BLOB_FLAG = 0x0010;
        const UNSIGNED_FLAG = 0x0020;
        const ZEROFILL_FLAG = 0x0040;
        const BINARY_FLAG = 0x0080;
        const ENUM_FLAG = 0x0100;
        const AUTO_INCREMENT_FLAG = 0x0200;
        const TIMESTAMP_FLAG = 0x0400;
        const SET_FLAG = 0x0800;
        const NO_DEFAULT_VALUE_FLAG = 0x1000;
        const ON_UPDATE_NOW_FLAG = 0x2000;
        const NUM_FLAG = 0x8000;
    }
}

/// Logical column type.
///
/// The same wire code can mean different logical types depending on the
/// dialect; see [`ColumnType::from_wire`].
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    OLDDECIMAL,
    TINYINT,
    SMALLINT,
    INTEGER,
    FLOAT,
    DOUBLE,
    NULL,
    TIMESTAMP,
    BIGINT,
    MEDIUMINT,
    DATE,
    TIME,
    DATETIME,
    YEAR,
    NEWDATE,
    VARCHAR,
    BIT,
    JSON,
    DECIMAL,
    ENUM,
    SET,
    TINYBLOB,
    MEDIUMBLOB,
    LONGBLOB,
    BLOB,
    VARSTRING,
    STRING,
    GEOMETRY,
    // composite
    COMPLEX,
    ARRAY,
    STRUCT,
    CURSOR,
    // oracle dialect
    TIMESTAMP_TZ,
    TIMESTAMP_LTZ,
    TIMESTAMP_NANO,
    RAW,
    INTERVALYM,
    INTERVALDS,
    NUMBER_FLOAT,
    NVARCHAR2,
    NCHAR,
    UROWID,
    ORA_BLOB,
    ORA_CLOB,
    BINARY_FLOAT,
    BINARY_DOUBLE,
    NUMBER,
    VARCHAR2,
    OBDECIMAL,
}

impl ColumnType {
    /// Map a wire type code to the logical type for the given dialect.
    pub fn from_wire(code: u8, dialect: Dialect) -> Option<Self> {
        let oracle = dialect == Dialect::Oracle;
        let ty = match code {
            0x00 => Self::OLDDECIMAL,
            0x01 => Self::TINYINT,
            0x02 => Self::SMALLINT,
            0x03 if oracle => Self::NUMBER,
            0x03 => Self::INTEGER,
            0x04 if oracle => Self::BINARY_FLOAT,
            0x04 => Self::FLOAT,
            0x05 if oracle => Self::BINARY_DOUBLE,
            0x05 => Self::DOUBLE,
            0x06 => Self::NULL,
            0x07 => Self::TIMESTAMP,
            0x08 => Self::BIGINT,
            0x09 => Self::MEDIUMINT,
            0x0a => Self::DATE,
            0x0b => Self::TIME,
            0x0c => Self::DATETIME,
            0x0d => Self::YEAR,
            0x0e => Self::NEWDATE,
            0x0f | 0xfd if oracle => Self::VARCHAR2,
            0x0f => Self::VARCHAR,
            0x10 => Self::BIT,
            0xa0 => Self::COMPLEX,
            0xa1 => Self::ARRAY,
            0xa2 => Self::STRUCT,
            0xa3 => Self::CURSOR,
            0xc8 => Self::TIMESTAMP_TZ,
            0xc9 => Self::TIMESTAMP_LTZ,
            0xca => Self::TIMESTAMP_NANO,
            0xcb => Self::RAW,
            0xcc => Self::INTERVALYM,
            0xcd => Self::INTERVALDS,
            0xce => Self::NUMBER_FLOAT,
            0xcf => Self::NVARCHAR2,
            0xd0 => Self::NCHAR,
            0xd1 => Self::UROWID,
            0xd2 => Self::ORA_BLOB,
            0xd3 => Self::ORA_CLOB,
            0xf5 => Self::JSON,
            0xf6 if oracle => Self::OBDECIMAL,
            0xf6 => Self::DECIMAL,
            0xf7 => Self::ENUM,
            0xf8 => Self::SET,
            0xf9 => Self::TINYBLOB,
            0xfa => Self::MEDIUMBLOB,
            0xfb => Self::LONGBLOB,
            0xfc => Self::BLOB,
            0xfd => Self::VARSTRING,
            0xfe => Self::STRING,
            0xff => Self::GEOMETRY,
            _ => return None,
        };
        Some(ty)
    }

    /// Byte width of the field in the binary encoding, when known from the tag alone.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            Self::BIGINT | Self::DOUBLE | Self::BINARY_DOUBLE => Some(8),
            Self::INTEGER | Self::MEDIUMINT | Self::FLOAT | Self::NUMBER | Self::BINARY_FLOAT => {
                Some(4)
            }
            Self::SMALLINT | Self::YEAR => Some(2),
            Self::TINYINT => Some(1),
            _ => None,
        }
    }

    /// Composite and cursor fields carry no length prefix in the binary encoding.
    pub fn is_composite(self) -> bool {
        matches!(self, Self::COMPLEX | Self::CURSOR)
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::TINYINT | Self::SMALLINT | Self::MEDIUMINT | Self::INTEGER | Self::BIGINT
        )
    }

    pub fn is_float(self) -> bool {
        matches!(
            self,
            Self::FLOAT | Self::DOUBLE | Self::BINARY_FLOAT | Self::BINARY_DOUBLE
        )
    }

    pub fn is_decimal(self) -> bool {
        matches!(
            self,
            Self::DECIMAL | Self::OLDDECIMAL | Self::OBDECIMAL | Self::NUMBER_FLOAT | Self::NUMBER
        )
    }

    /// Character columns whose text may be parsed as a number on request.
    pub fn is_textual(self) -> bool {
        matches!(
            self,
            Self::VARCHAR
                | Self::VARSTRING
                | Self::STRING
                | Self::VARCHAR2
                | Self::NVARCHAR2
                | Self::NCHAR
                | Self::ENUM
                | Self::SET
                | Self::ORA_CLOB
        )
    }

    /// Columns a numeric accessor may read. TEXT columns arrive as BLOB types;
    /// binary-charset BLOBs never reach the text parsers since they decode as bytes.
    pub fn is_numeric_source(self) -> bool {
        self.is_integer()
            || self.is_float()
            || self.is_decimal()
            || self.is_textual()
            || self.is_blob()
            || matches!(self, Self::BIT | Self::YEAR)
    }

    /// Date-time columns carrying a calendar date plus a time of day.
    pub fn is_timestamp(self) -> bool {
        matches!(
            self,
            Self::TIMESTAMP
                | Self::DATETIME
                | Self::TIMESTAMP_NANO
                | Self::TIMESTAMP_TZ
                | Self::TIMESTAMP_LTZ
        )
    }

    pub fn is_interval(self) -> bool {
        matches!(self, Self::INTERVALYM | Self::INTERVALDS)
    }

    pub fn is_blob(self) -> bool {
        matches!(
            self,
            Self::TINYBLOB | Self::MEDIUMBLOB | Self::LONGBLOB | Self::BLOB | Self::ORA_BLOB
        )
    }
}
