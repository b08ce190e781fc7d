use refwire_core::ReferenceRequest;
use serde_json::Value;

use crate::cli::ReferenceArgs;
use crate::error::CliError;
use crate::output;

use super::{client, extras, fields, tickers};

pub async fn run(args: &ReferenceArgs) -> Result<Value, CliError> {
    let mut request = ReferenceRequest::new(tickers(&args.tickers)?, fields(&args.fields)?)?;
    for (key, value) in extras(&args.extras)? {
        request = request.with_extra(key, value)?;
    }

    let data = client(&args.connect).reference_data(&request).await?;
    output::reference_view(&data)
}
