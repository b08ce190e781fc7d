//! Behavior tests for the query client against a scripted transport.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use refwire_core::{
    ClientError, DecodeError, EntityKey, FieldKey, FieldValue, HistoricalRequest, HttpClient,
    HttpError, HttpRequest, HttpResponse, QueryClient, ReferenceRequest,
};
use serde_json::{json, Value};
use time::macros::date;

/// Replies with one canned response and records every request it sees.
struct ScriptedHttpClient {
    response: Result<HttpResponse, HttpError>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    fn replying(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(HttpResponse {
                status,
                body: body.to_owned(),
            }),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing(error: HttpError) -> Arc<Self> {
        Arc::new(Self {
            response: Err(error),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn recorded(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .clone()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .push(request);
        let response = self.response.clone();
        Box::pin(async move { response })
    }
}

fn client_with(transport: Arc<ScriptedHttpClient>) -> QueryClient {
    QueryClient::new("bbg-gateway", 5555)
        .with_timeout_ms(1_500)
        .with_http_client(transport)
}

fn reference_request() -> ReferenceRequest {
    ReferenceRequest::new(
        vec![
            EntityKey::parse("SPX Index").expect("ticker"),
            EntityKey::parse("SX5E Index").expect("ticker"),
        ],
        vec![
            FieldKey::parse("PX_LAST").expect("field"),
            FieldKey::parse("LAST_UPDATE_DT").expect("field"),
        ],
    )
    .expect("request")
    .with_extra("tests", "toto")
    .expect("primitive extra")
}

#[tokio::test]
async fn reference_query_sends_a_get_with_the_json_envelope() {
    // Given: a server that answers with an empty document
    let transport = ScriptedHttpClient::replying(200, "{}");
    let client = client_with(transport.clone());

    // When: a reference query is issued
    client
        .reference_data(&reference_request())
        .await
        .expect("query succeeds");

    // Then: the request targets the route with the envelope as body
    let requests = transport.recorded();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "http://bbg-gateway:5555/reference_data");
    assert_eq!(requests[0].timeout_ms, 1_500);
    let body: Value =
        serde_json::from_str(requests[0].body.as_deref().expect("body")).expect("json body");
    assert_eq!(
        body,
        json!({
            "ticker_list": ["SPX Index", "SX5E Index"],
            "field_list": ["PX_LAST", "LAST_UPDATE_DT"],
            "tests": "toto"
        })
    );
}

#[tokio::test]
async fn reference_reply_is_reconstructed_per_ticker() {
    let transport = ScriptedHttpClient::replying(
        200,
        r#"{"SPX Index": {"PX_LAST": 1426.19, "LAST_UPDATE_DT": "2012-12-31"},
            "SX5E Index": {"PX_LAST": 2635.93, "LAST_UPDATE_DT": "2012-12-31"}}"#,
    );
    let data = client_with(transport)
        .reference_data(&reference_request())
        .await
        .expect("query succeeds");

    assert_eq!(data.len(), 2);
    let spx = &data[&EntityKey::parse("SPX Index").expect("ticker")];
    assert_eq!(
        spx[&FieldKey::parse("LAST_UPDATE_DT").expect("field")],
        FieldValue::Date(date!(2012 - 12 - 31))
    );
    assert_eq!(
        spx[&FieldKey::parse("PX_LAST").expect("field")],
        FieldValue::Float(1426.19)
    );
}

#[tokio::test]
async fn historical_sentinel_reply_is_no_data() {
    let transport = ScriptedHttpClient::replying(200, r#""Error""#);
    let request = HistoricalRequest::new(
        vec![EntityKey::parse("SPX Index").expect("ticker")],
        vec![FieldKey::parse("PX_LAST").expect("field")],
        date!(2012 - 01 - 07),
        date!(2012 - 01 - 08),
    )
    .expect("request");

    let outcome = client_with(transport.clone())
        .historical_data(&request)
        .await
        .expect("query succeeds");

    assert!(outcome.is_no_data());
    let body: Value = serde_json::from_str(
        transport.recorded()[0]
            .body
            .as_deref()
            .expect("body"),
    )
    .expect("json body");
    assert_eq!(body["start_date"], json!("2012-01-07"));
}

#[tokio::test]
async fn server_rejection_surfaces_status_and_body() {
    let transport = ScriptedHttpClient::replying(
        400,
        r#"{"code":"request.missing_field","message":"request is missing required field 'ticker_list'"}"#,
    );

    let error = client_with(transport)
        .reference_data(&reference_request())
        .await
        .expect_err("must fail");

    match error {
        ClientError::Status { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("request.missing_field"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn transport_failure_is_reported_as_transport() {
    let transport = ScriptedHttpClient::failing(HttpError::timeout("request timeout"));

    let error = client_with(transport)
        .version()
        .await
        .expect_err("must fail");

    assert!(matches!(error, ClientError::Transport(ref cause) if cause.timed_out()));
    assert_eq!(error.code(), "client.transport");
}

#[tokio::test]
async fn malformed_reply_is_a_decode_error() {
    let transport = ScriptedHttpClient::replying(200, "<html>gateway</html>");

    let error = client_with(transport)
        .reference_data(&reference_request())
        .await
        .expect_err("must fail");

    assert!(matches!(error, ClientError::Decode(DecodeError::Json(_))));
}

#[tokio::test]
async fn catalog_reply_is_one_table() {
    let transport = ScriptedHttpClient::replying(
        200,
        r#""[{\"mnemonic\":\"PX_LAST\",\"description\":\"Last Price\",\"datatype\":\"Double\"}]""#,
    );

    let table = client_with(transport.clone())
        .field_search("last price")
        .await
        .expect("query succeeds");

    assert_eq!(table.columns(), ["mnemonic", "description", "datatype"]);
    assert_eq!(table.row_count(), 1);
    assert_eq!(transport.recorded()[0].url, "http://bbg-gateway:5555/fields");
}

#[tokio::test]
async fn version_reply_is_trimmed_text() {
    let transport = ScriptedHttpClient::replying(200, "Fix historical index label\n");

    let version = client_with(transport.clone())
        .version()
        .await
        .expect("query succeeds");

    assert_eq!(version, "Fix historical index label");
    assert!(transport.recorded()[0].body.is_none());
}
