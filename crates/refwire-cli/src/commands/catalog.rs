use serde_json::Value;

use crate::cli::{FieldsInfoArgs, SearchArgs};
use crate::error::CliError;
use crate::output;

use super::{client, fields};

pub async fn info(args: &FieldsInfoArgs) -> Result<Value, CliError> {
    let table = client(&args.connect)
        .field_info(fields(&args.fields)?)
        .await?;
    output::table_view(&table)
}

pub async fn search(args: &SearchArgs) -> Result<Value, CliError> {
    let table = client(&args.connect)
        .field_search(&args.search_spec)
        .await?;
    output::table_view(&table)
}

pub async fn search_by_category(args: &SearchArgs) -> Result<Value, CliError> {
    let table = client(&args.connect)
        .field_search_by_category(&args.search_spec)
        .await?;
    output::table_view(&table)
}
