use serde_json::Value as JsonValue;
use tracing::trace;

use crate::domain::parse_iso;
use crate::{
    Cell, ColumnKind, DecodeError, EntityKey, FieldKey, FieldValue, HistoricalData,
    HistoricalOutcome, IsoTemporal, ReferenceData, Table,
};

/// One reconstruction step: returns a typed value when it recognizes the text.
pub type Attempt = fn(&str) -> Option<FieldValue>;

/// Reconstruction steps in application order.
///
/// Every step runs, and a later success replaces an earlier one: a string
/// accepted by both the temporal and the table step ends up a table.
pub const CASCADE: &[Attempt] = &[attempt_temporal, attempt_table];

/// Reconstructs the most specific value for one JSON leaf.
///
/// Non-strings are already native and are only mapped across.
pub fn reconstruct(value: &JsonValue) -> FieldValue {
    match value {
        JsonValue::String(text) => reconstruct_text(text),
        other => from_native(other),
    }
}

pub fn reconstruct_text(text: &str) -> FieldValue {
    reconstruct_with(CASCADE, text)
}

/// Runs `attempts` in order over `text`, last success wins.
pub fn reconstruct_with(attempts: &[Attempt], text: &str) -> FieldValue {
    let mut reconstructed = None;
    for attempt in attempts {
        if let Some(value) = attempt(text) {
            reconstructed = Some(value);
        }
    }

    reconstructed.unwrap_or_else(|| {
        trace!(len = text.len(), "leaf kept as text");
        FieldValue::Text(text.to_owned())
    })
}

pub fn attempt_temporal(text: &str) -> Option<FieldValue> {
    parse_iso(text).map(|parsed| match parsed {
        IsoTemporal::Date(date) => FieldValue::Date(date),
        IsoTemporal::DateTime(datetime) => FieldValue::DateTime(datetime),
    })
}

pub fn attempt_table(text: &str) -> Option<FieldValue> {
    if !text.trim_start().starts_with('[') {
        return None;
    }

    let parsed: JsonValue = serde_json::from_str(text).ok()?;
    let records = parsed.as_array()?;
    let mut table = Table::from_records(records).ok()?;
    normalize_columns(&mut table);
    Some(FieldValue::Table(table))
}

/// Column-wise clean-up after a table is read from records.
///
/// Untyped columns get their text cells coerced to datetimes (cells that do not
/// parse are left alone); integer cells in float columns are widened.
pub fn normalize_columns(table: &mut Table) {
    let kinds: Vec<Option<ColumnKind>> = table
        .columns()
        .iter()
        .map(|column| table.column_kind(column))
        .collect();

    for (position, kind) in kinds.into_iter().enumerate() {
        match kind {
            Some(ColumnKind::Object) => {
                for cell in table.column_cells_mut(position) {
                    let coerced = cell
                        .as_text()
                        .and_then(parse_iso)
                        .map(IsoTemporal::to_datetime);
                    if let Some(datetime) = coerced {
                        *cell = Cell::DateTime(datetime);
                    }
                }
            }
            Some(ColumnKind::Float) => {
                for cell in table.column_cells_mut(position) {
                    if let Cell::Int(int) = cell {
                        *cell = Cell::Float(*int as f64);
                    }
                }
            }
            _ => {}
        }
    }
}

fn from_native(value: &JsonValue) -> FieldValue {
    match value {
        JsonValue::Null => FieldValue::Null,
        JsonValue::Bool(flag) => FieldValue::Bool(*flag),
        JsonValue::Number(number) => match number.as_i64() {
            Some(int) => FieldValue::Int(int),
            None => number
                .as_f64()
                .map_or_else(|| FieldValue::Json(value.clone()), FieldValue::Float),
        },
        JsonValue::String(text) => FieldValue::Text(text.clone()),
        JsonValue::Array(_) | JsonValue::Object(_) => FieldValue::Json(value.clone()),
    }
}

const fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

fn expect_object<'a>(
    value: &'a JsonValue,
    path: &str,
) -> Result<&'a serde_json::Map<String, JsonValue>, DecodeError> {
    value.as_object().ok_or_else(|| DecodeError::UnexpectedShape {
        expected: "an object",
        path: path.to_owned(),
        found: json_kind(value),
    })
}

/// Decodes a reference-data response body.
pub fn decode_reference(body: &str) -> Result<ReferenceData, DecodeError> {
    let document: JsonValue = serde_json::from_str(body)?;
    let entities = expect_object(&document, "$")?;

    let mut data = ReferenceData::new();
    for (entity, fields) in entities {
        let key = EntityKey::parse(entity)?;
        let fields = expect_object(fields, entity)?;
        let values = data.entry(key).or_default();
        for (field, leaf) in fields {
            values.insert(FieldKey::parse(field)?, reconstruct(leaf));
        }
    }
    Ok(data)
}

/// Decodes a historical-data response body.
///
/// The no-data sentinel is accepted both as a JSON string and as bare text.
pub fn decode_historical(body: &str) -> Result<HistoricalOutcome, DecodeError> {
    if body.trim() == HistoricalOutcome::NO_DATA_SENTINEL {
        return Ok(HistoricalOutcome::NoData);
    }

    let document: JsonValue = serde_json::from_str(body)?;
    if document.as_str() == Some(HistoricalOutcome::NO_DATA_SENTINEL) {
        return Ok(HistoricalOutcome::NoData);
    }

    let entities = expect_object(&document, "$")?;
    let mut data = HistoricalData::new();
    for (entity, series) in entities {
        let table = leaf_table(series, entity)?;
        data.insert(EntityKey::parse(entity)?, table.into_date_indexed());
    }
    Ok(HistoricalOutcome::Data(data))
}

/// Decodes a response whose whole body is one table (catalog queries).
pub fn decode_table(body: &str) -> Result<Table, DecodeError> {
    let document: JsonValue = serde_json::from_str(body)?;
    leaf_table(&document, "$")
}

/// Reads a table from a string leaf, or from records that arrived un-nested.
fn leaf_table(value: &JsonValue, path: &str) -> Result<Table, DecodeError> {
    let reconstructed = match value {
        JsonValue::Array(records) => Table::from_records(records).ok().map(|mut table| {
            normalize_columns(&mut table);
            table
        }),
        other => reconstruct(other).into_table(),
    };

    reconstructed.ok_or_else(|| DecodeError::UnexpectedShape {
        expected: "table records",
        path: path.to_owned(),
        found: json_kind(value),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::{date, datetime};

    use super::*;

    #[test]
    fn date_only_strings_become_dates() {
        assert_eq!(
            reconstruct(&json!("1926-09-23")),
            FieldValue::Date(date!(1926 - 09 - 23))
        );
    }

    #[test]
    fn datetimes_keep_microseconds() {
        assert_eq!(
            reconstruct(&json!("1926-05-26T15:23:45.525000")),
            FieldValue::DateTime(datetime!(1926-05-26 15:23:45.525))
        );
        assert_eq!(
            reconstruct(&json!("1926-05-26T15:02:12")),
            FieldValue::DateTime(datetime!(1926-05-26 15:02:12))
        );
    }

    #[test]
    fn unrecognized_strings_are_preserved() {
        assert_eq!(
            reconstruct(&json!("2013/07/17")),
            FieldValue::Text(String::from("2013/07/17"))
        );
        assert_eq!(
            reconstruct(&json!("[1, 2, 3]")),
            FieldValue::Text(String::from("[1, 2, 3]"))
        );
        assert_eq!(
            reconstruct(&json!("[{\"broken\": ")),
            FieldValue::Text(String::from("[{\"broken\": "))
        );
    }

    #[test]
    fn native_values_pass_through() {
        assert_eq!(reconstruct(&json!(null)), FieldValue::Null);
        assert_eq!(reconstruct(&json!(true)), FieldValue::Bool(true));
        assert_eq!(reconstruct(&json!(42)), FieldValue::Int(42));
        assert_eq!(reconstruct(&json!(1.5)), FieldValue::Float(1.5));
        assert_eq!(
            reconstruct(&json!({"a": [1]})),
            FieldValue::Json(json!({"a": [1]}))
        );
    }

    #[test]
    fn table_text_is_reconstructed_with_date_columns() {
        let text = r#"[{"DATE":"2012-01-03","PX_LAST":1277,"NOTE":"x"},
                       {"DATE":"2012-01-04","PX_LAST":1277.3,"NOTE":"2012-01-05T10:00:00"}]"#;
        let table = reconstruct_text(text).into_table().expect("table");

        assert_eq!(table.columns(), ["DATE", "PX_LAST", "NOTE"]);
        assert_eq!(
            table.cell(0, "DATE"),
            Some(&Cell::DateTime(datetime!(2012-01-03 0:00)))
        );
        assert_eq!(table.cell(0, "PX_LAST"), Some(&Cell::Float(1277.0)));
        assert_eq!(table.cell(0, "NOTE"), Some(&Cell::Text(String::from("x"))));
        assert_eq!(
            table.cell(1, "NOTE"),
            Some(&Cell::DateTime(datetime!(2012-01-05 10:00)))
        );
    }

    #[test]
    fn later_success_overrides_earlier_one() {
        fn always_date(_: &str) -> Option<FieldValue> {
            Some(FieldValue::Date(date!(2000 - 01 - 01)))
        }
        fn never(_: &str) -> Option<FieldValue> {
            None
        }

        let text = r#"[{"a":1}]"#;
        let both = reconstruct_with(&[always_date, attempt_table], text);
        assert!(matches!(both, FieldValue::Table(_)));

        let date_then_failure = reconstruct_with(&[always_date, never], text);
        assert_eq!(date_then_failure, FieldValue::Date(date!(2000 - 01 - 01)));
    }

    #[test]
    fn historical_sentinel_means_no_data() {
        assert!(decode_historical("\"Error\"").expect("decode").is_no_data());
        assert!(decode_historical("Error").expect("decode").is_no_data());
    }

    #[test]
    fn historical_series_are_date_indexed() {
        let body = json!({
            "SPX Index": r#"[{"index":"2012-01-03","PX_LAST":1277.06}]"#
        })
        .to_string();

        let outcome = decode_historical(&body).expect("decode");
        let data = outcome.data().expect("data");
        let table = &data[&EntityKey::parse("SPX Index").expect("ticker")];
        assert_eq!(table.index_label(), Some("date"));
        assert_eq!(table.columns(), ["PX_LAST"]);
    }

    #[test]
    fn reference_body_must_be_nested_objects() {
        let err = decode_reference(r#"{"SPX Index": 3}"#).expect_err("must fail");
        assert!(matches!(err, DecodeError::UnexpectedShape { .. }));
    }
}
