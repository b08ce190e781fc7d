//! Query client handle.
//!
//! Every [`QueryClient`] carries its own target and transport; there is no
//! process-wide connection state to rebind.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::debug;

use crate::codec::{decode_historical, decode_reference, decode_table};
use crate::http_client::{
    HttpClient, HttpError, HttpRequest, ReqwestHttpClient, DEFAULT_TIMEOUT_MS,
};
use crate::request::{CatalogRequest, Endpoint, HistoricalRequest, ReferenceRequest};
use crate::{
    DecodeError, EncodeError, FieldKey, HistoricalOutcome, ReferenceData, RequestError, Table,
};

/// Failure of one remote query.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("transport failure: {0}")]
    Transport(#[from] HttpError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl ClientError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Request(error) => error.code(),
            Self::Encode(error) => error.code(),
            Self::Status { .. } => "client.status",
            Self::Transport(_) => "client.transport",
            Self::Decode(_) => "client.decode",
        }
    }
}

/// Handle on one remote query server.
#[derive(Clone)]
pub struct QueryClient {
    scheme: String,
    host: String,
    port: u16,
    timeout_ms: u64,
    http_client: Arc<dyn HttpClient>,
}

impl QueryClient {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: String::from("http"),
            host: host.into(),
            port,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            http_client: Arc::new(ReqwestHttpClient::default()),
        }
    }

    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = http_client;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// Point-in-time values per ticker and field.
    pub async fn reference_data(
        &self,
        request: &ReferenceRequest,
    ) -> Result<ReferenceData, ClientError> {
        let body = self
            .call(Endpoint::ReferenceData, Some(request.to_json()))
            .await?;
        Ok(decode_reference(&body)?)
    }

    /// Date-indexed series per ticker, or [`HistoricalOutcome::NoData`].
    pub async fn historical_data(
        &self,
        request: &HistoricalRequest,
    ) -> Result<HistoricalOutcome, ClientError> {
        let body = self
            .call(Endpoint::HistoricalData, Some(request.to_json()?))
            .await?;
        Ok(decode_historical(&body)?)
    }

    pub async fn field_info(&self, fields: Vec<FieldKey>) -> Result<Table, ClientError> {
        self.catalog(&CatalogRequest::field_info(fields)?).await
    }

    pub async fn field_search(&self, search_spec: &str) -> Result<Table, ClientError> {
        self.catalog(&CatalogRequest::field_search(search_spec)?)
            .await
    }

    pub async fn field_search_by_category(
        &self,
        search_spec: &str,
    ) -> Result<Table, ClientError> {
        self.catalog(&CatalogRequest::field_search_by_category(search_spec)?)
            .await
    }

    /// Sends any catalog request, extra parameters included.
    pub async fn catalog(&self, request: &CatalogRequest) -> Result<Table, ClientError> {
        let body = self
            .call(request.kind.endpoint(), Some(request.to_json()))
            .await?;
        Ok(decode_table(&body)?)
    }

    /// Deployment marker reported by the server.
    pub async fn version(&self) -> Result<String, ClientError> {
        let body = self.call(Endpoint::Version, None).await?;
        Ok(body.trim().to_owned())
    }

    async fn call(
        &self,
        endpoint: Endpoint,
        payload: Option<JsonValue>,
    ) -> Result<String, ClientError> {
        let url = format!("{}{}", self.base_url(), endpoint.path());
        let mut request = HttpRequest::get(&url).with_timeout_ms(self.timeout_ms);
        if let Some(payload) = payload {
            request = request.with_json_body(payload.to_string());
        }

        debug!(%endpoint, %url, "sending query");
        let response = self.http_client.execute(request).await?;
        debug!(%endpoint, status = response.status, bytes = response.body.len(), "query answered");

        if !response.is_success() {
            return Err(ClientError::Status {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response.body)
    }
}

impl Debug for QueryClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("base_url", &self.base_url())
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}
