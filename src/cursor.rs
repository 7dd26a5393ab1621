use crate::value::ComplexValue;

/// Whether the most recently positioned field is SQL NULL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullState {
    #[default]
    NotNull,
    Null,
    /// A zero date an accessor turned into NULL
    ZeroDate,
}

/// The last field whose bytes were located; scans resume from its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Anchor {
    index: usize,
    offset: usize,
    length: usize,
    null: bool,
}

/// Materialized composite field and the offset one past its encoding.
#[derive(Debug, Clone)]
pub(crate) struct CachedComposite {
    pub end: usize,
    pub value: ComplexValue,
}

/// Mutable position of a decoder inside the bound row.
///
/// Offsets are absolute within the row buffer. After a successful
/// `position(i)`, [`current_index`](Self::current_index) is `i` and, unless the
/// field is NULL, `offset`/`length` describe exactly its data bytes.
#[derive(Debug, Default)]
pub struct CursorState {
    current: Option<usize>,
    anchor: Option<Anchor>,
    null: NullState,
    composites: Vec<Option<CachedComposite>>,
}

impl CursorState {
    /// Forget everything about the previous row.
    pub fn reset(&mut self, num_columns: usize) {
        self.current = None;
        self.anchor = None;
        self.null = NullState::NotNull;
        self.composites.clear();
        self.composites.resize_with(num_columns, || None);
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// First data byte of the current field
    pub fn offset(&self) -> usize {
        self.anchor.map_or(0, |a| a.offset)
    }

    /// Byte length of the current field, `None` when it is NULL
    pub fn length(&self) -> Option<usize> {
        match (self.null, self.anchor) {
            (NullState::NotNull | NullState::ZeroDate, Some(a)) => Some(a.length),
            _ => None,
        }
    }

    pub fn null_state(&self) -> NullState {
        self.null
    }

    /// Accessors short-circuit on this.
    pub fn is_null(&self) -> bool {
        self.null == NullState::Null
    }

    /// Whether the last read produced SQL NULL, including converted zero dates
    pub fn was_null(&self) -> bool {
        self.null != NullState::NotNull
    }

    /// Index and offset to continue a forward scan towards `target`, if the
    /// anchor lies strictly before it.
    pub fn resume_point(&self, target: usize) -> Option<(usize, usize)> {
        match self.anchor {
            Some(a) if a.index < target => Some((a.index + 1, a.offset + a.length)),
            _ => None,
        }
    }

    /// Return to the anchored field if it is `index`, restoring its NULL state.
    pub fn reland(&mut self, index: usize) -> bool {
        match self.anchor {
            Some(a) if a.index == index => {
                self.current = Some(index);
                self.null = if a.null {
                    NullState::Null
                } else {
                    NullState::NotNull
                };
                true
            }
            _ => false,
        }
    }

    /// Record a located field.
    pub fn land(&mut self, index: usize, offset: usize, length: usize) {
        self.current = Some(index);
        self.anchor = Some(Anchor {
            index,
            offset,
            length,
            null: false,
        });
        self.null = NullState::NotNull;
    }

    /// Record a NULL field announced by its own prefix; it still anchors the scan.
    pub fn land_null_marker(&mut self, index: usize, offset: usize) {
        self.current = Some(index);
        self.anchor = Some(Anchor {
            index,
            offset,
            length: 0,
            null: true,
        });
        self.null = NullState::Null;
    }

    /// Record a NULL field known from a bitmap; the anchor stays on the last located field.
    pub fn land_null_bitmap(&mut self, index: usize) {
        self.current = Some(index);
        self.null = NullState::Null;
    }

    pub fn mark_null(&mut self) {
        self.null = NullState::Null;
    }

    pub fn mark_zero_date(&mut self) {
        self.null = NullState::ZeroDate;
    }

    pub(crate) fn composite(&self, index: usize) -> Option<&CachedComposite> {
        self.composites.get(index).and_then(Option::as_ref)
    }

    pub(crate) fn store_composite(&mut self, index: usize, composite: CachedComposite) {
        if let Some(slot) = self.composites.get_mut(index) {
            *slot = Some(composite);
        }
    }
}
