mod catalog;
mod historical;
mod reference;
mod serve;

use refwire_core::{EntityKey, Extras, FieldKey, QueryClient};
use serde_json::Value;

use crate::cli::{Command, ConnectArgs};
use crate::error::CliError;
use crate::output;

pub async fn run(command: &Command) -> Result<(), CliError> {
    let view = match command {
        Command::Serve(config) => return serve::run(config).await,
        Command::Reference(args) => reference::run(args).await?,
        Command::Historical(args) => historical::run(args).await?,
        Command::FieldsInfo(args) => catalog::info(args).await?,
        Command::Fields(args) => catalog::search(args).await?,
        Command::FieldsByCategory(args) => catalog::search_by_category(args).await?,
        Command::Version(connect) => Value::String(client(connect).version().await?),
    };

    let pretty = command.connect().is_some_and(|connect| connect.pretty);
    output::render(&view, pretty)
}

fn client(connect: &ConnectArgs) -> QueryClient {
    QueryClient::new(connect.host.clone(), connect.port).with_timeout_ms(connect.timeout_ms)
}

fn tickers(raw: &[String]) -> Result<Vec<EntityKey>, CliError> {
    Ok(raw
        .iter()
        .map(|ticker| EntityKey::parse(ticker))
        .collect::<Result<Vec<_>, _>>()?)
}

fn fields(raw: &[String]) -> Result<Vec<FieldKey>, CliError> {
    Ok(raw
        .iter()
        .map(|field| FieldKey::parse(field))
        .collect::<Result<Vec<_>, _>>()?)
}

/// Reads `KEY=VALUE` pairs. Values that parse as a JSON primitive keep their
/// type; anything else is sent as a string.
fn extras(raw: &[String]) -> Result<Extras, CliError> {
    let mut extras = Extras::new();
    for pair in raw {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(CliError::Argument(format!(
                "extra '{pair}' must look like KEY=VALUE"
            )));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::Argument(format!("extra '{pair}' has an empty key")));
        }

        let value = match serde_json::from_str::<Value>(value) {
            Ok(parsed @ (Value::Bool(_) | Value::Number(_) | Value::Null)) => parsed,
            _ => Value::String(value.to_owned()),
        };
        extras.insert(key.to_owned(), value);
    }
    Ok(extras)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extras_keep_primitive_types() {
        let parsed = extras(&[
            String::from("periodicitySelection=WEEKLY"),
            String::from("maxDataPoints=50"),
            String::from("adjustmentSplit=true"),
        ])
        .expect("valid extras");

        assert_eq!(parsed.get("periodicitySelection"), Some(&json!("WEEKLY")));
        assert_eq!(parsed.get("maxDataPoints"), Some(&json!(50)));
        assert_eq!(parsed.get("adjustmentSplit"), Some(&json!(true)));
    }

    #[test]
    fn extras_need_a_key_and_a_separator() {
        assert!(matches!(
            extras(&[String::from("WEEKLY")]),
            Err(CliError::Argument(_))
        ));
        assert!(matches!(
            extras(&[String::from("=WEEKLY")]),
            Err(CliError::Argument(_))
        ));
    }
}
