//! # Refwire Server
//!
//! HTTP front of a market-data provider. Every query route takes a GET
//! request with a JSON body and answers with a transportable JSON document.
//!
//! | Route | Body | Reply |
//! |-------|------|-------|
//! | `/reference_data` | `{ticker_list, field_list, ...}` | `{ticker: {field: value}}` |
//! | `/historical_data` | `{ticker_list, field_list, start_date, end_date, ...}` | `{ticker: table}` or `"Error"` |
//! | `/fields_info` | `{field_list, ...}` | table |
//! | `/fields` | `{search_spec, ...}` | table |
//! | `/fields_by_category` | `{search_spec, ...}` | table |
//! | `/version` | none | plain text |
//!
//! Malformed queries get a 400 with a `{code, message}` body; provider and
//! encoding failures get a 500 with the same shape.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use refwire_core::{DataProvider, Endpoint};
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod config;
mod error;
mod handlers;
pub mod logging;

pub use config::{read_version, ServeConfig};
pub use error::{ApiError, ServerError};

/// Shared, read-only state of every handler.
#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn DataProvider>,
    version: Arc<str>,
}

impl AppState {
    pub fn new(provider: Arc<dyn DataProvider>, version: impl Into<String>) -> Self {
        Self {
            provider,
            version: Arc::from(version.into()),
        }
    }

    pub fn provider(&self) -> &dyn DataProvider {
        self.provider.as_ref()
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            Endpoint::ReferenceData.path(),
            get(handlers::reference_data),
        )
        .route(
            Endpoint::HistoricalData.path(),
            get(handlers::historical_data),
        )
        .route(Endpoint::FieldsInfo.path(), get(handlers::fields_info))
        .route(Endpoint::Fields.path(), get(handlers::fields))
        .route(
            Endpoint::FieldsByCategory.path(),
            get(handlers::fields_by_category),
        )
        .route(Endpoint::Version.path(), get(handlers::version))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until the process stops.
pub async fn run(config: &ServeConfig, provider: Arc<dyn DataProvider>) -> Result<(), ServerError> {
    let addr = config.bind_addr();
    let state = AppState::new(provider, config.version());
    let provider_name = state.provider().name();
    let version = state.version().to_owned();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!(%addr, provider = provider_name, %version, "query server listening");
    axum::serve(listener, router(state))
        .await
        .map_err(ServerError::Serve)
}
