use refwire_core::HistoricalRequest;
use serde_json::Value;
use tracing::warn;

use crate::cli::HistoricalArgs;
use crate::error::CliError;
use crate::output;

use super::{client, extras, fields, tickers};

pub async fn run(args: &HistoricalArgs) -> Result<Value, CliError> {
    let mut request = HistoricalRequest::new(
        tickers(&args.tickers)?,
        fields(&args.fields)?,
        args.start,
        args.end,
    )?;
    for (key, value) in extras(&args.extras)? {
        request = request.with_extra(key, value)?;
    }

    let outcome = client(&args.connect).historical_data(&request).await?;
    if outcome.is_no_data() {
        warn!(start = %args.start, end = %args.end, "server reported no data for the range");
    }
    output::historical_view(&outcome)
}
