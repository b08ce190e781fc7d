//! # Refwire Core
//!
//! Shared contracts for the refwire query service: the tabular data exchange
//! codec, the request envelopes, the provider boundary and the client handle.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`codec`] | Transportable encoding and the reconstruction cascade |
//! | [`domain`] | Keys, field values, tables and historical outcomes |
//! | [`error`] | Request, encode, table and decode errors |
//! | [`request`] | Query envelopes and endpoints |
//! | [`provider`] | Data provider trait and the synthetic provider |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`client`] | Query client handle |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use refwire_core::{EntityKey, FieldKey, QueryClient, ReferenceRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = QueryClient::new("localhost", 5555);
//!     let request = ReferenceRequest::new(
//!         vec![EntityKey::parse("SPX Index")?],
//!         vec![FieldKey::parse("PX_LAST")?],
//!     )?;
//!
//!     let data = client.reference_data(&request).await?;
//!     for (ticker, fields) in &data {
//!         println!("{ticker}: {:?}", fields);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   GET + JSON body   ┌──────────────┐
//! │ QueryClient  │────────────────────▶│ query server │
//! │ (decode)     │◀────────────────────│ (encode)     │
//! └──────────────┘   transportable     └──────┬───────┘
//!                    JSON document            │
//!                                             ▼
//!                                      ┌──────────────┐
//!                                      │ DataProvider │
//!                                      └──────────────┘
//! ```

pub mod client;
pub mod codec;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod provider;
pub mod request;

pub use client::{ClientError, QueryClient};
pub use codec::{encode, AsTransportable};
pub use domain::*;
pub use error::{DecodeError, EncodeError, RequestError, TableError};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use provider::{DataProvider, ProviderError, ProviderErrorKind, SyntheticProvider};
pub use request::{
    CatalogKind, CatalogRequest, Endpoint, Extras, HistoricalRequest, ReferenceRequest,
};
