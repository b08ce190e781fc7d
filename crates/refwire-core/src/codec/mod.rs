//! # Tabular Data Exchange Codec
//!
//! The producing side renders results through [`AsTransportable`]; the
//! consuming side runs every string leaf through the reconstruction
//! [`CASCADE`].
//!
//! ## Wire contract
//!
//! | Value | Wire form |
//! |-------|-----------|
//! | Date | `"YYYY-MM-DD"` |
//! | DateTime | `"YYYY-MM-DDTHH:MM:SS"`, `.ffffff` appended when non-zero |
//! | Table | JSON string holding records text: `"[{\"col\":1}]"` |
//! | No historical data | `"Error"` |
//! | Everything else | native JSON |
//!
//! Tables are deliberately double-encoded. A plain JSON array or object on the
//! wire is a native value and is left alone by the decoder; only strings are
//! candidates for reconstruction.
//!
//! ```rust
//! use refwire_core::codec::{encode, reconstruct_text};
//! use refwire_core::{Cell, FieldValue, Table};
//!
//! let mut table = Table::new(["PX_LAST"]).unwrap();
//! table.push_row(vec![Cell::Float(1426.19)]).unwrap();
//!
//! let wire: String = serde_json::from_str(&encode(&table).unwrap()).unwrap();
//! assert!(matches!(reconstruct_text(&wire), FieldValue::Table(_)));
//! ```

mod decode;
mod encode;

pub use decode::{
    attempt_table, attempt_temporal, decode_historical, decode_reference, decode_table,
    normalize_columns, reconstruct, reconstruct_text, reconstruct_with, Attempt, CASCADE,
};
pub use encode::{encode, table_records, AsTransportable, UNLABELED_INDEX_KEY};
