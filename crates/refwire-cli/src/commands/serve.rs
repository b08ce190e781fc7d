use std::sync::Arc;

use refwire_core::SyntheticProvider;
use refwire_server::ServeConfig;

use crate::error::CliError;

pub async fn run(config: &ServeConfig) -> Result<(), CliError> {
    refwire_server::run(config, Arc::new(SyntheticProvider::new())).await?;
    Ok(())
}
