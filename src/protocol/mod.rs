pub mod primitive;
mod row;
pub mod value;

#[cfg(test)]
mod primitive_test;

pub use row::{BINARY_ROW_HEADER, BinaryRowPayload, TextRowPayload};
