use tracing::trace;

use crate::col::ColumnDefinition;
use crate::cursor::CursorState;
use crate::decode::{RowDecoder, check_index};
use crate::error::{Error, Result};
use crate::opts::{Dialect, Opts};
use crate::policy::FormattingPolicy;
use crate::protocol::TextRowPayload;
use crate::protocol::primitive::{LengthPrefix, read_length_prefix};
use crate::protocol::value::Field;
use crate::value::ComplexValue;

/// Decoder for rows of the text (plain query) encoding.
#[derive(Debug)]
pub struct TextRowDecoder<'a> {
    columns: &'a [ColumnDefinition],
    policy: FormattingPolicy,
    row: TextRowPayload<'a>,
    state: CursorState,
}

impl<'a> TextRowDecoder<'a> {
    pub fn new(columns: &'a [ColumnDefinition], opts: &Opts, dialect: Dialect) -> Self {
        Self {
            columns,
            policy: FormattingPolicy::resolve(opts, dialect),
            row: TextRowPayload(&[]),
            state: CursorState::default(),
        }
    }
}

impl<'a> RowDecoder<'a> for TextRowDecoder<'a> {
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
        self.row = TextRowPayload(row);
        self.state.reset(self.columns.len());
        Ok(())
    }

    fn position(&mut self, index: usize) -> Result<()> {
        check_index(self.columns, index)?;
        if self.state.reland(index) {
            return Ok(());
        }

        let row = self.row.bytes();
        let (mut idx, mut offset) = match self.state.resume_point(index) {
            Some(resume) => resume,
            None => {
                trace!(target_index = index, "scanning text row from the first field");
                (0, 0)
            }
        };
        loop {
            let data = row.get(offset..).ok_or(Error::UnexpectedEof)?;
            let (prefix, rest) = read_length_prefix(data)?;
            let data_offset = offset + (data.len() - rest.len());
            match prefix {
                LengthPrefix::Null => {
                    if idx == index {
                        self.state.land_null_marker(index, data_offset);
                        return Ok(());
                    }
                    offset = data_offset;
                }
                LengthPrefix::Length(len) => {
                    let len = usize::try_from(len).map_err(|_e| Error::UnexpectedEof)?;
                    let end = data_offset.checked_add(len).ok_or(Error::UnexpectedEof)?;
                    if end > row.len() {
                        return Err(Error::UnexpectedEof);
                    }
                    if idx == index {
                        self.state.land(index, data_offset, len);
                        return Ok(());
                    }
                    offset = end;
                }
            }
            idx += 1;
        }
    }

    fn field(&self, col: &ColumnDefinition) -> Result<Option<Field<'a>>> {
        Ok(self.raw_bytes()?.map(|data| Field::from_text(col, data)))
    }

    fn raw_bytes(&self) -> Result<Option<&'a [u8]>> {
        let Some(len) = self.state.length() else {
            return Ok(None);
        };
        let offset = self.state.offset();
        self.row
            .bytes()
            .get(offset..offset + len)
            .map(Some)
            .ok_or(Error::UnexpectedEof)
    }

    /// Composite values only exist in the binary encoding.
    fn complex(&mut self, col: &ColumnDefinition) -> Result<Option<ComplexValue>> {
        Err(Error::unsupported("getObject", col.column_type))
    }
}
