use std::collections::BTreeMap;

use serde_json::Value as JsonValue;
use time::{Date, PrimitiveDateTime};

use crate::{EntityKey, FieldKey, Table};

/// A decoded (or to-be-encoded) leaf of a result document.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(Date),
    DateTime(PrimitiveDateTime),
    Table(Table),
    /// Arrays and objects that need no reconstruction.
    Json(JsonValue),
}

impl FieldValue {
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(int) => Some(*int as f64),
            Self::Float(float) => Some(*float),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<Table> for FieldValue {
    fn from(value: Table) -> Self {
        Self::Table(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Date> for FieldValue {
    fn from(value: Date) -> Self {
        Self::Date(value)
    }
}

impl From<PrimitiveDateTime> for FieldValue {
    fn from(value: PrimitiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

/// Field values of one entity.
pub type FieldMap = BTreeMap<FieldKey, FieldValue>;

/// Reply to a reference-data query: entity → field → value.
pub type ReferenceData = BTreeMap<EntityKey, FieldMap>;

/// Per-entity historical series, each indexed by date.
pub type HistoricalData = BTreeMap<EntityKey, Table>;

/// Reply to a historical-data query.
///
/// On the wire, [`HistoricalOutcome::NoData`] travels as the JSON string
/// `"Error"`.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoricalOutcome {
    NoData,
    Data(HistoricalData),
}

impl HistoricalOutcome {
    pub const NO_DATA_SENTINEL: &'static str = "Error";

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }

    pub fn data(&self) -> Option<&HistoricalData> {
        match self {
            Self::NoData => None,
            Self::Data(data) => Some(data),
        }
    }

    pub fn into_data(self) -> Option<HistoricalData> {
        match self {
            Self::NoData => None,
            Self::Data(data) => Some(data),
        }
    }
}
