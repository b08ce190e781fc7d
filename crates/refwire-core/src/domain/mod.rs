//! # Domain Models
//!
//! Value types exchanged between the terminal provider, the server and the
//! query client.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`EntityKey`] | Instrument identifier (`"SPX Index"`) |
//! | [`FieldKey`] | Data attribute identifier (`"PX_LAST"`) |
//! | [`FieldValue`] | Scalar, date, datetime or table leaf |
//! | [`Table`] | Ordered rows of named columns with optional index |
//! | [`Cell`] | One table cell |
//! | [`HistoricalOutcome`] | Historical reply, or the no-data signal |
//!
//! Dates are [`time::Date`], datetimes are naive [`time::PrimitiveDateTime`]:
//! the terminal reports exchange-local times without an offset.

mod iso;
mod keys;
mod table;
mod value;

pub use iso::{format_date, format_datetime, parse_iso, parse_request_date, IsoTemporal};
pub use keys::{EntityKey, FieldKey};
pub use table::{Cell, ColumnKind, Table, TableIndex, DATE_INDEX_LABEL};
pub use value::{FieldMap, FieldValue, HistoricalData, HistoricalOutcome, ReferenceData};
