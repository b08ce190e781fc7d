use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use refwire_core::{
    encode, CatalogKind, CatalogRequest, Endpoint, HistoricalRequest, ReferenceRequest,
    RequestError,
};
use serde_json::Value as JsonValue;
use tracing::info;
use uuid::Uuid;

use crate::{ApiError, AppState};

pub(crate) async fn reference_data(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4();
    let request = ReferenceRequest::from_json(parse_body(&body)?)?;
    info!(
        %request_id,
        endpoint = %Endpoint::ReferenceData,
        tickers = ?request.tickers,
        fields = ?request.fields,
        extra = ?request.extra,
        "query started"
    );

    let data = state.provider().reference_data(request).await?;
    let payload = encode(&data)?;
    info!(%request_id, entities = data.len(), bytes = payload.len(), "query finished");
    Ok(json_response(payload))
}

pub(crate) async fn historical_data(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4();
    let request = HistoricalRequest::from_json(parse_body(&body)?)?;
    info!(
        %request_id,
        endpoint = %Endpoint::HistoricalData,
        tickers = ?request.tickers,
        fields = ?request.fields,
        start_date = %request.start_date,
        end_date = %request.end_date,
        extra = ?request.extra,
        "query started"
    );

    let outcome = state.provider().historical_data(request).await?;
    let payload = encode(&outcome)?;
    info!(
        %request_id,
        no_data = outcome.is_no_data(),
        bytes = payload.len(),
        "query finished"
    );
    Ok(json_response(payload))
}

pub(crate) async fn fields_info(state: State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    catalog(state, CatalogKind::FieldInfo, body).await
}

pub(crate) async fn fields(state: State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    catalog(state, CatalogKind::FieldSearch, body).await
}

pub(crate) async fn fields_by_category(
    state: State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    catalog(state, CatalogKind::CategorySearch, body).await
}

async fn catalog(
    State(state): State<AppState>,
    kind: CatalogKind,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4();
    let request = CatalogRequest::from_json(kind, parse_body(&body)?)?;
    info!(
        %request_id,
        endpoint = %kind.endpoint(),
        params = ?request.params,
        "query started"
    );

    let table = state.provider().catalog(request).await?;
    let payload = encode(&table)?;
    info!(%request_id, rows = table.row_count(), bytes = payload.len(), "query finished");
    Ok(json_response(payload))
}

pub(crate) async fn version(State(state): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.version().to_owned(),
    )
        .into_response()
}

/// Query bodies must be one JSON object; anything else counts as missing.
fn parse_body(body: &Bytes) -> Result<JsonValue, RequestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RequestError::MissingBody);
    }
    match serde_json::from_slice::<JsonValue>(body) {
        Ok(value @ JsonValue::Object(_)) => Ok(value),
        _ => Err(RequestError::MissingBody),
    }
}

fn json_response(payload: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], payload).into_response()
}
