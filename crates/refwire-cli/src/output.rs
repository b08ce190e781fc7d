//! Rendering of decoded replies for the terminal.
//!
//! Tables are expanded to their records so the printed document is plain
//! JSON rather than JSON text nested inside strings.

use std::io::Write;

use refwire_core::codec::table_records;
use refwire_core::{
    AsTransportable, FieldValue, HistoricalOutcome, ReferenceData, Table,
};
use serde_json::{Map, Value};

use crate::error::CliError;

pub fn reference_view(data: &ReferenceData) -> Result<Value, CliError> {
    let mut entities = Map::with_capacity(data.len());
    for (ticker, fields) in data {
        let mut values = Map::with_capacity(fields.len());
        for (field, value) in fields {
            values.insert(field.to_string(), value_view(value)?);
        }
        entities.insert(ticker.to_string(), Value::Object(values));
    }
    Ok(Value::Object(entities))
}

pub fn historical_view(outcome: &HistoricalOutcome) -> Result<Value, CliError> {
    let Some(data) = outcome.data() else {
        return Ok(Value::Null);
    };

    let mut entities = Map::with_capacity(data.len());
    for (ticker, table) in data {
        entities.insert(ticker.to_string(), table_view(table)?);
    }
    Ok(Value::Object(entities))
}

pub fn table_view(table: &Table) -> Result<Value, CliError> {
    Ok(Value::Array(table_records(table)?))
}

fn value_view(value: &FieldValue) -> Result<Value, CliError> {
    match value {
        FieldValue::Table(table) => table_view(table),
        other => Ok(other.to_transportable()?),
    }
}

pub fn render(value: &Value, pretty: bool) -> Result<(), CliError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use refwire_core::{Cell, EntityKey, FieldKey};
    use serde_json::json;

    use super::*;

    #[test]
    fn nested_tables_are_expanded() {
        let mut members = Table::new(["Member", "Weight"]).expect("columns");
        members
            .push_row(vec![Cell::from("AAPL UW"), Cell::Float(7.1)])
            .expect("row");

        let mut data = ReferenceData::new();
        data.entry(EntityKey::parse("SPX Index").expect("ticker"))
            .or_default()
            .insert(
                FieldKey::parse("INDX_MWEIGHT").expect("field"),
                FieldValue::Table(members),
            );

        assert_eq!(
            reference_view(&data).expect("view"),
            json!({"SPX Index": {"INDX_MWEIGHT": [{"Member": "AAPL UW", "Weight": 7.1}]}})
        );
    }

    #[test]
    fn no_data_renders_as_null() {
        assert_eq!(
            historical_view(&HistoricalOutcome::NoData).expect("view"),
            Value::Null
        );
    }
}
