//! Row decoding for the MySQL-compatible wire protocol, including the
//! OceanBase Oracle-mode extensions.
//!
//! A connection layer hands over column definitions and raw row packets; a
//! [`BinaryRowDecoder`] or [`TextRowDecoder`] positions over the fields of one
//! row and converts them on demand through the shared [`RowDecoder`] accessors.

pub mod col;
pub mod constant;
pub mod cursor;
pub mod decode;
pub mod error;
mod opts;
pub mod policy;
pub mod protocol;
pub mod row;
pub mod value;


pub use col::{ColumnDefinition, ComplexType};
pub use decode::{BinaryRowDecoder, RowDecoder, TextRowDecoder};
pub use opts::{Dialect, Opts, ZeroDateTimeBehavior};
pub use value::Value;

#[cfg(feature = "derive")]
pub mod r#macro {
    pub use zero_rowcodec_derive::FromRow;
}
