use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use refwire_core::{EncodeError, ProviderError, ProviderErrorKind, RequestError};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Failure of one query, rendered as a JSON `{code, message}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Request(_) => StatusCode::BAD_REQUEST,
            Self::Provider(error) if error.kind() == ProviderErrorKind::InvalidRequest => {
                StatusCode::BAD_REQUEST
            }
            Self::Provider(_) | Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Request(error) => error.code(),
            Self::Provider(error) => error.code(),
            Self::Encode(error) => error.code(),
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Provider(error) => error.message().to_owned(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), error = %self, "query failed");
        } else {
            warn!(code = self.code(), error = %self, "query rejected");
        }

        let body = json!({
            "code": self.code(),
            "message": self.message(),
        });
        (status, Json(body)).into_response()
    }
}

/// Startup and serve-loop failures.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("could not bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server stopped: {0}")]
    Serve(#[source] std::io::Error),
    #[error("could not prepare log directory {}: {source}", .path.display())]
    LogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("logging is already initialized: {0}")]
    Logging(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_errors_are_client_errors() {
        let error = ApiError::from(RequestError::MissingBody);
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.code(), "request.missing_body");
    }

    #[test]
    fn provider_status_follows_kind() {
        let refused = ApiError::from(ProviderError::invalid_request("bad periodicity"));
        assert_eq!(refused.status(), StatusCode::BAD_REQUEST);

        let down = ApiError::from(ProviderError::unavailable("session lost"));
        assert_eq!(down.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(down.code(), "provider.unavailable");
    }

    #[test]
    fn encode_errors_are_server_errors() {
        let error = ApiError::from(EncodeError::NonFiniteNumber {
            value: String::from("NaN"),
        });
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
