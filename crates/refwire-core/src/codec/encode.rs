use std::collections::BTreeMap;

use serde_json::{Map, Number, Value as JsonValue};

use crate::domain::{format_date, format_datetime};
use crate::{Cell, EncodeError, FieldValue, HistoricalOutcome, Table};

/// Index key written into records when the table's index has no label.
pub const UNLABELED_INDEX_KEY: &str = "index";

/// Capability of rendering oneself as a JSON-safe value.
///
/// The encoder never inspects concrete types: every leaf reaches the wire
/// through this trait, and containers delegate to their elements.
pub trait AsTransportable {
    fn to_transportable(&self) -> Result<JsonValue, EncodeError>;
}

/// Serializes any transportable value to JSON text.
pub fn encode<T>(value: &T) -> Result<String, EncodeError>
where
    T: AsTransportable + ?Sized,
{
    let document = value.to_transportable()?;
    serde_json::to_string(&document).map_err(|error| EncodeError::Table(error.to_string()))
}

/// Records form of a table: one `{column: cell}` object per row.
///
/// Indexed tables write the index value first in each record, under the index
/// label. A column sharing that key is an error.
pub fn table_records(table: &Table) -> Result<Vec<JsonValue>, EncodeError> {
    let index = table.index();
    let index_key = index
        .and_then(|index| index.label.as_deref())
        .unwrap_or(UNLABELED_INDEX_KEY);
    if index.is_some() && table.column_position(index_key).is_some() {
        return Err(EncodeError::IndexColumnClash {
            name: index_key.to_owned(),
        });
    }

    table
        .rows()
        .iter()
        .enumerate()
        .map(|(position, row)| {
            let mut record = Map::with_capacity(row.len() + 1);
            if let Some(key) = index.and_then(|index| index.values.get(position)) {
                record.insert(index_key.to_owned(), key.to_transportable()?);
            }
            for (column, cell) in table.columns().iter().zip(row) {
                record.insert(column.clone(), cell.to_transportable()?);
            }
            Ok(JsonValue::Object(record))
        })
        .collect()
}

fn float_to_json(value: f64) -> Result<JsonValue, EncodeError> {
    Number::from_f64(value)
        .map(JsonValue::Number)
        .ok_or_else(|| EncodeError::NonFiniteNumber {
            value: value.to_string(),
        })
}

impl AsTransportable for Cell {
    fn to_transportable(&self) -> Result<JsonValue, EncodeError> {
        Ok(match self {
            Self::Null => JsonValue::Null,
            Self::Bool(flag) => JsonValue::Bool(*flag),
            Self::Int(int) => JsonValue::from(*int),
            Self::Float(float) => float_to_json(*float)?,
            Self::Text(text) => JsonValue::String(text.clone()),
            Self::Date(date) => JsonValue::String(format_date(*date)?),
            Self::DateTime(datetime) => JsonValue::String(format_datetime(*datetime)?),
            Self::Json(value) => value.clone(),
        })
    }
}

/// A table travels as a JSON *string* holding its records text, so the
/// consumer re-parses it through the table path instead of walking it as a
/// plain object.
impl AsTransportable for Table {
    fn to_transportable(&self) -> Result<JsonValue, EncodeError> {
        let records = table_records(self)?;
        let text = serde_json::to_string(&records)
            .map_err(|error| EncodeError::Table(error.to_string()))?;
        Ok(JsonValue::String(text))
    }
}

impl AsTransportable for FieldValue {
    fn to_transportable(&self) -> Result<JsonValue, EncodeError> {
        match self {
            Self::Null => Ok(JsonValue::Null),
            Self::Bool(flag) => Ok(JsonValue::Bool(*flag)),
            Self::Int(int) => Ok(JsonValue::from(*int)),
            Self::Float(float) => float_to_json(*float),
            Self::Text(text) => Ok(JsonValue::String(text.clone())),
            Self::Date(date) => format_date(*date).map(JsonValue::String),
            Self::DateTime(datetime) => format_datetime(*datetime).map(JsonValue::String),
            Self::Table(table) => table.to_transportable(),
            Self::Json(value) => Ok(value.clone()),
        }
    }
}

impl AsTransportable for HistoricalOutcome {
    fn to_transportable(&self) -> Result<JsonValue, EncodeError> {
        match self {
            Self::NoData => Ok(JsonValue::String(Self::NO_DATA_SENTINEL.to_owned())),
            Self::Data(series) => series.to_transportable(),
        }
    }
}

impl<K, V> AsTransportable for BTreeMap<K, V>
where
    K: AsRef<str>,
    V: AsTransportable,
{
    fn to_transportable(&self) -> Result<JsonValue, EncodeError> {
        let mut object = Map::with_capacity(self.len());
        for (key, value) in self {
            object.insert(key.as_ref().to_owned(), value.to_transportable()?);
        }
        Ok(JsonValue::Object(object))
    }
}

impl<T: AsTransportable> AsTransportable for [T] {
    fn to_transportable(&self) -> Result<JsonValue, EncodeError> {
        self.iter()
            .map(AsTransportable::to_transportable)
            .collect::<Result<Vec<_>, _>>()
            .map(JsonValue::Array)
    }
}

impl<T: AsTransportable> AsTransportable for Vec<T> {
    fn to_transportable(&self) -> Result<JsonValue, EncodeError> {
        self.as_slice().to_transportable()
    }
}

impl<T: AsTransportable> AsTransportable for Option<T> {
    fn to_transportable(&self) -> Result<JsonValue, EncodeError> {
        match self {
            Some(value) => value.to_transportable(),
            None => Ok(JsonValue::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::{date, datetime};

    use super::*;
    use crate::{EntityKey, FieldKey, ReferenceData};

    fn key(value: &str) -> EntityKey {
        EntityKey::parse(value).expect("ticker")
    }

    #[test]
    fn bare_dates_become_iso_strings() {
        assert_eq!(
            FieldValue::Date(date!(1926 - 09 - 23))
                .to_transportable()
                .expect("encode"),
            json!("1926-09-23")
        );
        assert_eq!(
            FieldValue::DateTime(datetime!(1926-05-26 15:23:45.525))
                .to_transportable()
                .expect("encode"),
            json!("1926-05-26T15:23:45.525000")
        );
    }

    #[test]
    fn tables_are_double_encoded() {
        let mut table = Table::new(["NAME", "PX_LAST"]).expect("columns");
        table
            .push_row(vec![Cell::from("S&P 500"), Cell::Float(1426.19)])
            .expect("row");

        let encoded = table.to_transportable().expect("encode");
        let text = encoded.as_str().expect("table must travel as a string");
        assert_eq!(text, r#"[{"NAME":"S&P 500","PX_LAST":1426.19}]"#);
    }

    #[test]
    fn index_is_written_first_under_its_label() {
        let mut table = Table::indexed("date", ["PX_LAST"]).expect("columns");
        table
            .push_indexed_row(Cell::Date(date!(2012 - 01 - 03)), vec![Cell::Float(1277.06)])
            .expect("row");

        let records = table_records(&table).expect("records");
        assert_eq!(
            serde_json::to_string(&records).expect("json"),
            r#"[{"date":"2012-01-03","PX_LAST":1277.06}]"#
        );
    }

    #[test]
    fn column_named_like_the_index_key_is_rejected() {
        let mut table = Table::new(["index", "PX_LAST"]).expect("columns");
        table
            .push_row(vec![Cell::from("a"), Cell::Float(1.0)])
            .expect("row");
        table.set_index(None, vec![Cell::Int(7)]).expect("index");

        let err = table_records(&table).expect_err("must fail");
        assert_eq!(
            err,
            EncodeError::IndexColumnClash {
                name: String::from("index")
            }
        );
        assert_eq!(err.code(), "encode.index_column_clash");

        let mut labeled = Table::indexed("date", ["date"]).expect("columns");
        labeled
            .push_indexed_row(Cell::Date(date!(2012 - 01 - 03)), vec![Cell::Int(1)])
            .expect("row");
        assert!(encode(&labeled).is_err());
    }

    #[test]
    fn reference_document_nests_entity_then_field() {
        let mut data = ReferenceData::new();
        data.entry(key("SPX Index"))
            .or_default()
            .insert(FieldKey::parse("PX_LAST").expect("field"), FieldValue::Float(1426.19));

        assert_eq!(
            encode(&data).expect("encode"),
            r#"{"SPX Index":{"PX_LAST":1426.19}}"#
        );
    }

    #[test]
    fn no_data_is_the_error_sentinel() {
        assert_eq!(encode(&HistoricalOutcome::NoData).expect("encode"), r#""Error""#);
    }

    #[test]
    fn non_finite_numbers_are_fatal() {
        let err = FieldValue::Float(f64::NAN)
            .to_transportable()
            .expect_err("must fail");
        assert!(matches!(err, EncodeError::NonFiniteNumber { .. }));

        let mut table = Table::new(["PX_LAST"]).expect("columns");
        table.push_row(vec![Cell::Float(f64::INFINITY)]).expect("row");
        assert!(encode(&table).is_err());
    }
}
