use thiserror::Error;

/// Structural problems with an inbound query. Always a client error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("request body is missing or is not a JSON object")]
    MissingBody,
    #[error("request is missing required field '{field}'")]
    MissingField { field: &'static str },
    #[error("field '{field}' must contain at least one entry")]
    EmptyList { field: &'static str },
    #[error("field '{field}' has an invalid value: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("'{key}' must be a JSON string, number, boolean or null")]
    NonPrimitiveExtra { key: String },

    #[error("ticker cannot be blank")]
    BlankTicker,
    #[error("field name cannot be blank")]
    BlankField,
    #[error("'{value}' is not an ISO-8601 date (expected YYYY-MM-DD)")]
    InvalidDate { value: String },
}

impl RequestError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingBody => "request.missing_body",
            Self::MissingField { .. } => "request.missing_field",
            Self::EmptyList { .. } => "request.empty_list",
            Self::InvalidField { .. } => "request.invalid_field",
            Self::NonPrimitiveExtra { .. } => "request.non_primitive_extra",
            Self::BlankTicker => "request.blank_ticker",
            Self::BlankField => "request.blank_field",
            Self::InvalidDate { .. } => "request.invalid_date",
        }
    }
}

/// A value reached the encoder without any JSON representation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("non-finite number {value} has no JSON representation")]
    NonFiniteNumber { value: String },
    #[error("could not format '{context}' as ISO-8601: {reason}")]
    DateFormat { context: String, reason: String },
    #[error("could not serialize table: {0}")]
    Table(String),
    #[error("column '{name}' collides with the index key of the records")]
    IndexColumnClash { name: String },
}

impl EncodeError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NonFiniteNumber { .. } => "encode.non_finite_number",
            Self::DateFormat { .. } => "encode.date_format",
            Self::Table(_) => "encode.table",
            Self::IndexColumnClash { .. } => "encode.index_column_clash",
        }
    }
}

/// Shape violations while building a [`crate::Table`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("row has {actual} cells but the table has {expected} columns")]
    RowWidth { expected: usize, actual: usize },
    #[error("index has {actual} entries but the table has {expected} rows")]
    IndexLength { expected: usize, actual: usize },
    #[error("table is indexed; rows need an index value")]
    IndexRequired,
    #[error("table has no index")]
    NotIndexed,
    #[error("duplicate column '{name}'")]
    DuplicateColumn { name: String },
    #[error("records text is not a JSON array of objects")]
    NotRecords,
}

/// A response document could not be read at all.
///
/// Individual leaves never produce this: a leaf that resists reconstruction
/// is kept as received.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected {expected} at '{path}', found {found}")]
    UnexpectedShape {
        expected: &'static str,
        path: String,
        found: &'static str,
    },
    #[error(transparent)]
    InvalidKey(#[from] RequestError),
}
