use tracing::trace;

use crate::col::ColumnDefinition;
use crate::cursor::{CachedComposite, CursorState};
use crate::decode::{RowDecoder, check_index, composite};
use crate::error::{Error, Result};
use crate::opts::{Dialect, Opts};
use crate::policy::FormattingPolicy;
use crate::protocol::BinaryRowPayload;
use crate::protocol::primitive::{LengthPrefix, read_length_prefix};
use crate::protocol::value::Field;
use crate::value::ComplexValue;

/// Decoder for rows of the binary (prepared statement) encoding.
///
/// Fields are located lazily: positioning scans forward from the last located
/// field, and only restarts from the first field when moving backwards.
#[derive(Debug)]
pub struct BinaryRowDecoder<'a> {
    columns: &'a [ColumnDefinition],
    policy: FormattingPolicy,
    row: &'a [u8],
    payload: Option<BinaryRowPayload<'a>>,
    state: CursorState,
}

impl<'a> BinaryRowDecoder<'a> {
    pub fn new(columns: &'a [ColumnDefinition], opts: &Opts, dialect: Dialect) -> Self {
        Self {
            columns,
            policy: FormattingPolicy::resolve(opts, dialect),
            row: &[],
            payload: None,
            state: CursorState::default(),
        }
    }

    fn payload(&self) -> Result<BinaryRowPayload<'a>> {
        self.payload
            .ok_or_else(|| Error::BadUsageError("no row bound to the decoder".to_string()))
    }

    /// Data offset and length of column `idx`, whose encoding starts at `offset`.
    fn measure(&mut self, idx: usize, offset: usize) -> Result<(usize, usize)> {
        let col = check_index(self.columns, idx)?;
        let ty = col.column_type;
        if let Some(width) = ty.fixed_width() {
            return self.bounded(offset, width);
        }
        if ty.is_composite() {
            let end = self.materialize(idx, offset)?;
            return Ok((offset, end - offset));
        }
        let data = self.row.get(offset..).ok_or(Error::UnexpectedEof)?;
        match read_length_prefix(data)? {
            (LengthPrefix::Null, _) => Err(Error::ProtocolCorruption(format!(
                "NULL length prefix in binary row for column '{}' not marked NULL in the bitmap",
                col.name
            ))),
            (LengthPrefix::Length(len), rest) => {
                let data_offset = offset + (data.len() - rest.len());
                let len = usize::try_from(len).map_err(|_e| Error::UnexpectedEof)?;
                self.bounded(data_offset, len)
            }
        }
    }

    fn bounded(&self, offset: usize, len: usize) -> Result<(usize, usize)> {
        match offset.checked_add(len) {
            Some(end) if end <= self.row.len() => Ok((offset, len)),
            _ => Err(Error::UnexpectedEof),
        }
    }

    /// Decode the composite at `idx` once per row; returns the offset past it.
    fn materialize(&mut self, idx: usize, offset: usize) -> Result<usize> {
        if let Some(cached) = self.state.composite(idx) {
            return Ok(cached.end);
        }
        let col = check_index(self.columns, idx)?;
        let data = self.row.get(offset..).ok_or(Error::UnexpectedEof)?;
        let (value, consumed) = if col.column_type == crate::constant::ColumnType::CURSOR {
            composite::decode_cursor(data)?
        } else {
            let ty = col.complex_type.as_deref().ok_or_else(|| {
                Error::BadUsageError(format!("COMPLEX column '{}' has no type descriptor", col.name))
            })?;
            composite::decode_complex(data, ty)?
        };
        let end = offset + consumed;
        self.state.store_composite(idx, CachedComposite { end, value });
        Ok(end)
    }
}

impl<'a> RowDecoder<'a> for BinaryRowDecoder<'a> {
    fn columns(&self) -> &'a [ColumnDefinition] {
        self.columns
    }

    fn policy(&self) -> &FormattingPolicy {
        &self.policy
    }

    fn state(&self) -> &CursorState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut CursorState {
        &mut self.state
    }

    fn bind(&mut self, row: &'a [u8]) -> Result<()> {
        self.payload = Some(BinaryRowPayload::parse(row, self.columns.len())?);
        self.row = row;
        self.state.reset(self.columns.len());
        Ok(())
    }

    fn position(&mut self, index: usize) -> Result<()> {
        check_index(self.columns, index)?;
        let payload = self.payload()?;
        let nulls = payload.null_bitmap();
        if nulls.is_null(index) {
            self.state.land_null_bitmap(index);
            return Ok(());
        }
        if self.state.reland(index) {
            return Ok(());
        }

        let (mut idx, mut offset) = match self.state.resume_point(index) {
            Some(resume) => resume,
            None => {
                trace!(target_index = index, "scanning binary row from the first field");
                (0, payload.values_offset())
            }
        };
        while idx < index {
            if !nulls.is_null(idx) {
                let (data_offset, len) = self.measure(idx, offset)?;
                offset = data_offset + len;
            }
            idx += 1;
        }
        let (data_offset, len) = self.measure(index, offset)?;
        self.state.land(index, data_offset, len);
        Ok(())
    }

    fn field(&self, col: &ColumnDefinition) -> Result<Option<Field<'a>>> {
        match self.raw_bytes()? {
            Some(data) => Field::from_binary(col, data).map(Some),
            None => Ok(None),
        }
    }

    fn raw_bytes(&self) -> Result<Option<&'a [u8]>> {
        let Some(len) = self.state.length() else {
            return Ok(None);
        };
        let offset = self.state.offset();
        let row: &'a [u8] = self.row;
        row.get(offset..offset + len).map(Some).ok_or(Error::UnexpectedEof)
    }

    fn complex(&mut self, col: &ColumnDefinition) -> Result<Option<ComplexValue>> {
        if !col.column_type.is_composite() {
            return Err(Error::unsupported("getObject", col.column_type));
        }
        let Some(index) = self.state.current_index() else {
            return Err(Error::BadUsageError("no column positioned".to_string()));
        };
        if self.state.is_null() {
            return Ok(None);
        }
        self.materialize(index, self.state.offset())?;
        Ok(self.state.composite(index).map(|cached| cached.value.clone()))
    }
}
