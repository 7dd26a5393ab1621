use thiserror::Error;

use crate::constant::ColumnType;

pub use color_eyre::eyre::eyre;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Out of range value for column '{column}' : value {value} is not in {target} range")]
    OutOfRange {
        column: String,
        value: String,
        target: &'static str,
    },

    #[error("Malformed value '{value}' for column '{column}': {message}")]
    MalformedValue {
        column: String,
        value: String,
        message: String,
    },

    #[error("{0}")]
    ZeroDate(String),

    #[error("Protocol corruption: {0}")]
    ProtocolCorruption(String),

    #[error("{accessor} not available for data field type {column_type:?}")]
    UnsupportedConversion {
        accessor: &'static str,
        column_type: ColumnType,
    },

    #[error("Unexpected end of row buffer")]
    UnexpectedEof,

    #[error("Bad config error: {0}")]
    BadConfigError(String),

    #[error("Bad usage: {0}")]
    BadUsageError(String),

    #[error("Column '{0}' is missing from the row")]
    MissingColumn(&'static str),

    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    #[error("Library bug: {0}")]
    LibraryBug(color_eyre::Report),
}

impl Error {
    /// Wrap a `Debug`-only error (zerocopy cast errors) as a library bug.
    pub fn from_debug(err: impl std::fmt::Debug) -> Self {
        Error::LibraryBug(eyre!("{:?}", err))
    }

    pub(crate) fn out_of_range(column: &str, value: impl ToString, target: &'static str) -> Self {
        Error::OutOfRange {
            column: column.to_string(),
            value: value.to_string(),
            target,
        }
    }

    pub(crate) fn malformed(column: &str, value: impl ToString, message: impl Into<String>) -> Self {
        Error::MalformedValue {
            column: column.to_string(),
            value: value.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(accessor: &'static str, column_type: ColumnType) -> Self {
        Error::UnsupportedConversion {
            accessor,
            column_type,
        }
    }

    /// True for the errors that indicate a decoder/server wire mismatch.
    pub fn is_protocol_corruption(&self) -> bool {
        matches!(
            self,
            Error::ProtocolCorruption(_) | Error::UnexpectedEof | Error::LibraryBug(_)
        )
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(err: std::convert::Infallible) -> Self {
        match err {}
    }
}

pub type Result<T> = std::result::Result<T, Error>;
