use std::sync::Arc;

use crate::constant::{BINARY_CHARSET, ColumnFlags, ColumnType};

/// Column definition of a result set, supplied by the connection layer.
#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    pub name: String,
    pub charset: u16,
    /// Declared display length
    pub column_length: u32,
    pub column_type: ColumnType,
    pub flags: ColumnFlags,
    /// Declared scale (fractional digits for temporal types)
    pub decimals: u8,
    /// Shape of a COMPLEX column
    pub complex_type: Option<Arc<ComplexType>>,
}

impl ColumnDefinition {
    /// utf8mb4 column with no flags and no declared length
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            charset: 45,
            column_length: 0,
            column_type,
            flags: ColumnFlags::empty(),
            decimals: 0,
            complex_type: None,
        }
    }

    pub fn with_flags(mut self, flags: ColumnFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_length(mut self, column_length: u32) -> Self {
        self.column_length = column_length;
        self
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_charset(mut self, charset: u16) -> Self {
        self.charset = charset;
        self
    }

    pub fn with_complex_type(mut self, complex_type: ComplexType) -> Self {
        self.complex_type = Some(Arc::new(complex_type));
        self
    }

    pub fn is_unsigned(&self) -> bool {
        self.flags.contains(ColumnFlags::UNSIGNED_FLAG)
    }

    pub fn is_zerofill(&self) -> bool {
        self.flags.contains(ColumnFlags::ZEROFILL_FLAG)
    }

    /// Binary collation: text accessors must not decode the bytes as characters.
    pub fn is_binary(&self) -> bool {
        self.charset == BINARY_CHARSET
    }
}

/// Type descriptor of a COMPLEX column, resolved by the connection layer
/// from the server's type catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplexType {
    /// Ordered homogeneous collection (VARRAY / nested table)
    Collection {
        name: String,
        element: Box<ComplexType>,
    },
    /// Object type with named attributes
    Object {
        name: String,
        attributes: Vec<ComplexAttribute>,
    },
    Number,
    Varchar2,
    Char,
    Raw,
    Date,
    Timestamp,
    Clob,
    Blob,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexAttribute {
    pub name: String,
    pub ty: ComplexType,
}

impl ComplexType {
    pub fn collection(name: impl Into<String>, element: ComplexType) -> Self {
        Self::Collection {
            name: name.into(),
            element: Box::new(element),
        }
    }

    pub fn object<N: Into<String>>(
        name: impl Into<String>,
        attributes: impl IntoIterator<Item = (N, ComplexType)>,
    ) -> Self {
        Self::Object {
            name: name.into(),
            attributes: attributes
                .into_iter()
                .map(|(name, ty)| ComplexAttribute {
                    name: name.into(),
                    ty,
                })
                .collect(),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Self::Collection { name, .. } | Self::Object { name, .. } => name,
            Self::Number => "NUMBER",
            Self::Varchar2 => "VARCHAR2",
            Self::Char => "CHAR",
            Self::Raw => "RAW",
            Self::Date => "DATE",
            Self::Timestamp => "TIMESTAMP",
            Self::Clob => "CLOB",
            Self::Blob => "BLOB",
        }
    }
}
