//! Materialization of COMPLEX (collection/object) and CURSOR fields.
//!
//! These fields carry no outer length prefix in the binary encoding, so their
//! extent is only known after decoding them.

use std::str::FromStr;

use rust_decimal::Decimal;
use simdutf8::basic::from_utf8;
use tracing::instrument;

use crate::col::{ComplexAttribute, ComplexType};
use crate::decode::temporal::composite_datetime;
use crate::error::{Error, Result};
use crate::protocol::primitive::{read_int_4, read_int_lenenc, read_string_fix, read_string_lenenc};
use crate::protocol::value::NullBitmap;
use crate::value::{ComplexArray, ComplexStruct, ComplexValue, CursorHandle};

/// Decode a COMPLEX field; returns the value and the bytes it occupied.
#[instrument(skip_all, level = "trace", fields(type_name = ty.type_name()))]
pub(crate) fn decode_complex(data: &[u8], ty: &ComplexType) -> Result<(ComplexValue, usize)> {
    let (value, rest) = match ty {
        ComplexType::Collection { name, element } => {
            let (array, rest) = decode_collection(data, name, element)?;
            (ComplexValue::Array(array), rest)
        }
        ComplexType::Object { name, attributes } => {
            let (object, rest) = decode_object(data, name, attributes)?;
            (ComplexValue::Struct(object), rest)
        }
        leaf => {
            let (value, rest) = decode_element(data, leaf)?;
            // a top-level leaf is never NULL here; the row bitmap covers that
            (value.ok_or_else(|| Error::ProtocolCorruption("empty COMPLEX leaf".to_string()))?, rest)
        }
    };
    Ok((value, data.len() - rest.len()))
}

/// A CURSOR field is the 4-byte cursor id.
pub(crate) fn decode_cursor(data: &[u8]) -> Result<(ComplexValue, usize)> {
    if data.is_empty() {
        return Err(Error::ProtocolCorruption("cursor is not open".to_string()));
    }
    let (id, _) = read_int_4(data)?;
    Ok((ComplexValue::Cursor(CursorHandle { id, open: true }), 4))
}

/// Element count, NULL bitmap over the elements, then each non-NULL element.
fn element_bitmap(data: &[u8], count: usize) -> Result<(NullBitmap<'_>, &[u8])> {
    let (bitmap, rest) = read_string_fix(data, NullBitmap::result_set_len(count))?;
    Ok((NullBitmap::for_result_set(bitmap), rest))
}

fn decode_collection<'a>(
    data: &'a [u8],
    name: &str,
    element: &ComplexType,
) -> Result<(ComplexArray, &'a [u8])> {
    let (count, mut rest) = read_int_lenenc(data)?;
    let count = usize::try_from(count).map_err(Error::from_debug)?;
    let (nulls, after_bitmap) = element_bitmap(rest, count)?;
    rest = after_bitmap;

    // every non-NULL element takes at least one byte
    let mut elements = Vec::with_capacity(count.min(rest.len()));
    for i in 0..count {
        if nulls.is_null(i) {
            elements.push(None);
            continue;
        }
        let (value, next) = decode_element(rest, element)?;
        elements.push(value);
        rest = next;
    }
    Ok((
        ComplexArray {
            type_name: name.to_string(),
            elements,
        },
        rest,
    ))
}

fn decode_object<'a>(
    data: &'a [u8],
    name: &str,
    attributes: &[ComplexAttribute],
) -> Result<(ComplexStruct, &'a [u8])> {
    let (nulls, mut rest) = element_bitmap(data, attributes.len())?;
    let mut values = Vec::with_capacity(attributes.len());
    for (i, attr) in attributes.iter().enumerate() {
        if nulls.is_null(i) {
            values.push((attr.name.clone(), None));
            continue;
        }
        let (value, next) = decode_element(rest, &attr.ty)?;
        values.push((attr.name.clone(), value));
        rest = next;
    }
    Ok((
        ComplexStruct {
            type_name: name.to_string(),
            attributes: values,
        },
        rest,
    ))
}

fn decode_element<'a>(data: &'a [u8], ty: &ComplexType) -> Result<(Option<ComplexValue>, &'a [u8])> {
    match ty {
        ComplexType::Collection { name, element } => {
            let (array, rest) = decode_collection(data, name, element)?;
            Ok((Some(ComplexValue::Array(array)), rest))
        }
        ComplexType::Object { name, attributes } => {
            let (object, rest) = decode_object(data, name, attributes)?;
            Ok((Some(ComplexValue::Struct(object)), rest))
        }
        leaf => {
            let (bytes, rest) = read_string_lenenc(data)?;
            Ok((decode_leaf(bytes, leaf)?, rest))
        }
    }
}

fn decode_leaf(bytes: &[u8], ty: &ComplexType) -> Result<Option<ComplexValue>> {
    let value = match ty {
        ComplexType::Number => {
            let text = leaf_text(bytes);
            let number = Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .map_err(|e| Error::ProtocolCorruption(format!("NUMBER attribute '{}': {}", text, e)))?;
            ComplexValue::Number(number)
        }
        ComplexType::Varchar2 | ComplexType::Char | ComplexType::Clob => ComplexValue::Text(leaf_text(bytes)),
        ComplexType::Raw | ComplexType::Blob => ComplexValue::Bytes(bytes.to_vec()),
        ComplexType::Date => return Ok(composite_datetime(bytes, false)?.map(ComplexValue::Date)),
        ComplexType::Timestamp => return Ok(composite_datetime(bytes, true)?.map(ComplexValue::Timestamp)),
        ComplexType::Collection { .. } | ComplexType::Object { .. } => {
            return Err(Error::LibraryBug(crate::error::eyre!(
                "nested type {} decoded as a leaf",
                ty.type_name()
            )));
        }
    };
    Ok(Some(value))
}

fn leaf_text(bytes: &[u8]) -> String {
    match from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}
