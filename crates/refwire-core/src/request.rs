//! Query envelopes and the endpoints they travel to.
//!
//! # Endpoints
//!
//! | Endpoint | Request | Reply |
//! |----------|---------|-------|
//! | `/reference_data` | [`ReferenceRequest`] | [`crate::ReferenceData`] |
//! | `/historical_data` | [`HistoricalRequest`] | [`crate::HistoricalOutcome`] |
//! | `/fields_info` | [`CatalogRequest`] | [`crate::Table`] |
//! | `/fields` | [`CatalogRequest`] | [`crate::Table`] |
//! | `/fields_by_category` | [`CatalogRequest`] | [`crate::Table`] |
//! | `/version` | none | plain text |
//!
//! Bodies are JSON objects. Keys other than the ones a request type knows
//! about are carried through untouched to the provider.

use std::fmt::{Display, Formatter};

use serde_json::{Map, Value as JsonValue};
use time::Date;

use crate::domain::{format_date, parse_request_date};
use crate::{EncodeError, EntityKey, FieldKey, RequestError};

/// Open-ended provider parameters (`key → JSON value`).
pub type Extras = Map<String, JsonValue>;

const TICKER_LIST: &str = "ticker_list";
const FIELD_LIST: &str = "field_list";
const START_DATE: &str = "start_date";
const END_DATE: &str = "end_date";
const SEARCH_SPEC: &str = "search_spec";

/// Query endpoint exposed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ReferenceData,
    HistoricalData,
    FieldsInfo,
    Fields,
    FieldsByCategory,
    Version,
}

impl Endpoint {
    pub const ALL: [Self; 6] = [
        Self::ReferenceData,
        Self::HistoricalData,
        Self::FieldsInfo,
        Self::Fields,
        Self::FieldsByCategory,
        Self::Version,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReferenceData => "reference_data",
            Self::HistoricalData => "historical_data",
            Self::FieldsInfo => "fields_info",
            Self::Fields => "fields",
            Self::FieldsByCategory => "fields_by_category",
            Self::Version => "version",
        }
    }

    pub const fn path(self) -> &'static str {
        match self {
            Self::ReferenceData => "/reference_data",
            Self::HistoricalData => "/historical_data",
            Self::FieldsInfo => "/fields_info",
            Self::Fields => "/fields",
            Self::FieldsByCategory => "/fields_by_category",
            Self::Version => "/version",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload for reference (point-in-time) data.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRequest {
    pub tickers: Vec<EntityKey>,
    pub fields: Vec<FieldKey>,
    pub extra: Extras,
}

impl ReferenceRequest {
    pub fn new(tickers: Vec<EntityKey>, fields: Vec<FieldKey>) -> Result<Self, RequestError> {
        require_entries(TICKER_LIST, &tickers)?;
        require_entries(FIELD_LIST, &fields)?;
        Ok(Self {
            tickers,
            fields,
            extra: Extras::new(),
        })
    }

    pub fn with_extra(
        mut self,
        key: impl Into<String>,
        value: impl Into<JsonValue>,
    ) -> Result<Self, RequestError> {
        insert_extra(&mut self.extra, key.into(), value.into())?;
        Ok(self)
    }

    /// Reads a request body, keeping unknown keys as extras.
    pub fn from_json(body: JsonValue) -> Result<Self, RequestError> {
        let mut body = into_object(body)?;
        let tickers = take_list(&mut body, TICKER_LIST, EntityKey::parse)?;
        let fields = take_list(&mut body, FIELD_LIST, FieldKey::parse)?;
        check_extras(&body)?;
        Ok(Self {
            tickers,
            fields,
            extra: body,
        })
    }

    pub fn to_json(&self) -> JsonValue {
        let mut body = Extras::with_capacity(self.extra.len() + 2);
        body.insert(TICKER_LIST.to_owned(), keys_to_json(&self.tickers));
        body.insert(FIELD_LIST.to_owned(), keys_to_json(&self.fields));
        body.extend(self.extra.clone());
        JsonValue::Object(body)
    }
}

/// Request payload for historical series between two dates.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalRequest {
    pub tickers: Vec<EntityKey>,
    pub fields: Vec<FieldKey>,
    pub start_date: Date,
    pub end_date: Date,
    pub extra: Extras,
}

impl HistoricalRequest {
    pub fn new(
        tickers: Vec<EntityKey>,
        fields: Vec<FieldKey>,
        start_date: Date,
        end_date: Date,
    ) -> Result<Self, RequestError> {
        require_entries(TICKER_LIST, &tickers)?;
        require_entries(FIELD_LIST, &fields)?;
        Ok(Self {
            tickers,
            fields,
            start_date,
            end_date,
            extra: Extras::new(),
        })
    }

    pub fn with_extra(
        mut self,
        key: impl Into<String>,
        value: impl Into<JsonValue>,
    ) -> Result<Self, RequestError> {
        insert_extra(&mut self.extra, key.into(), value.into())?;
        Ok(self)
    }

    pub fn from_json(body: JsonValue) -> Result<Self, RequestError> {
        let mut body = into_object(body)?;
        let tickers = take_list(&mut body, TICKER_LIST, EntityKey::parse)?;
        let fields = take_list(&mut body, FIELD_LIST, FieldKey::parse)?;
        let start_date = take_date(&mut body, START_DATE)?;
        let end_date = take_date(&mut body, END_DATE)?;
        check_extras(&body)?;
        Ok(Self {
            tickers,
            fields,
            start_date,
            end_date,
            extra: body,
        })
    }

    pub fn to_json(&self) -> Result<JsonValue, EncodeError> {
        let mut body = Extras::with_capacity(self.extra.len() + 4);
        body.insert(TICKER_LIST.to_owned(), keys_to_json(&self.tickers));
        body.insert(FIELD_LIST.to_owned(), keys_to_json(&self.fields));
        body.insert(
            START_DATE.to_owned(),
            JsonValue::String(format_date(self.start_date)?),
        );
        body.insert(
            END_DATE.to_owned(),
            JsonValue::String(format_date(self.end_date)?),
        );
        body.extend(self.extra.clone());
        Ok(JsonValue::Object(body))
    }
}

/// Field-catalog lookups. The provider owns their semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    /// Documentation for named fields (`field_list`).
    FieldInfo,
    /// Free-text field search (`search_spec`).
    FieldSearch,
    /// Field search grouped by category (`search_spec`).
    CategorySearch,
}

impl CatalogKind {
    pub const fn endpoint(self) -> Endpoint {
        match self {
            Self::FieldInfo => Endpoint::FieldsInfo,
            Self::FieldSearch => Endpoint::Fields,
            Self::CategorySearch => Endpoint::FieldsByCategory,
        }
    }
}

/// Catalog request, forwarded verbatim once its required key is present.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRequest {
    pub kind: CatalogKind,
    pub params: Extras,
}

impl CatalogRequest {
    pub fn field_info(fields: Vec<FieldKey>) -> Result<Self, RequestError> {
        require_entries(FIELD_LIST, &fields)?;
        let mut params = Extras::new();
        params.insert(FIELD_LIST.to_owned(), keys_to_json(&fields));
        Ok(Self {
            kind: CatalogKind::FieldInfo,
            params,
        })
    }

    pub fn field_search(search_spec: &str) -> Result<Self, RequestError> {
        Self::search(CatalogKind::FieldSearch, search_spec)
    }

    pub fn field_search_by_category(search_spec: &str) -> Result<Self, RequestError> {
        Self::search(CatalogKind::CategorySearch, search_spec)
    }

    fn search(kind: CatalogKind, search_spec: &str) -> Result<Self, RequestError> {
        let mut params = Extras::new();
        params.insert(SEARCH_SPEC.to_owned(), JsonValue::from(search_spec));
        Self::from_json(kind, JsonValue::Object(params))
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn from_json(kind: CatalogKind, body: JsonValue) -> Result<Self, RequestError> {
        let params = into_object(body)?;
        match kind {
            CatalogKind::FieldInfo => {
                let mut probe = params.clone();
                take_list(&mut probe, FIELD_LIST, FieldKey::parse)?;
            }
            CatalogKind::FieldSearch | CatalogKind::CategorySearch => {
                let spec = params
                    .get(SEARCH_SPEC)
                    .ok_or(RequestError::MissingField { field: SEARCH_SPEC })?;
                let blank = spec.as_str().map_or(true, |text| text.trim().is_empty());
                if blank {
                    return Err(RequestError::InvalidField {
                        field: SEARCH_SPEC,
                        reason: String::from("expected a non-blank string"),
                    });
                }
            }
        }
        Ok(Self { kind, params })
    }

    pub fn search_spec(&self) -> Option<&str> {
        self.params.get(SEARCH_SPEC).and_then(JsonValue::as_str)
    }

    /// Field names of a field-info request, in request order.
    pub fn field_list(&self) -> Vec<FieldKey> {
        self.params
            .get(FIELD_LIST)
            .and_then(JsonValue::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(JsonValue::as_str)
                    .filter_map(|item| FieldKey::parse(item).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(self.params.clone())
    }
}

fn require_entries<T>(field: &'static str, entries: &[T]) -> Result<(), RequestError> {
    if entries.is_empty() {
        return Err(RequestError::EmptyList { field });
    }
    Ok(())
}

fn into_object(body: JsonValue) -> Result<Extras, RequestError> {
    match body {
        JsonValue::Object(object) => Ok(object),
        _ => Err(RequestError::MissingBody),
    }
}

fn take_list<T>(
    body: &mut Extras,
    field: &'static str,
    parse: fn(&str) -> Result<T, RequestError>,
) -> Result<Vec<T>, RequestError> {
    let value = body
        .remove(field)
        .ok_or(RequestError::MissingField { field })?;
    let items = value.as_array().ok_or_else(|| RequestError::InvalidField {
        field,
        reason: String::from("expected an array of strings"),
    })?;
    require_entries(field, items)?;

    items
        .iter()
        .map(|item| {
            let text = item.as_str().ok_or_else(|| RequestError::InvalidField {
                field,
                reason: format!("expected a string entry, found {item}"),
            })?;
            parse(text)
        })
        .collect()
}

fn take_date(body: &mut Extras, field: &'static str) -> Result<Date, RequestError> {
    let value = body
        .remove(field)
        .ok_or(RequestError::MissingField { field })?;
    let text = value.as_str().ok_or_else(|| RequestError::InvalidField {
        field,
        reason: String::from("expected an ISO-8601 date string"),
    })?;
    parse_request_date(text)
}

fn check_extras(extra: &Extras) -> Result<(), RequestError> {
    match extra.iter().find(|(_, value)| !is_primitive(value)) {
        Some((key, _)) => Err(RequestError::NonPrimitiveExtra { key: key.clone() }),
        None => Ok(()),
    }
}

fn insert_extra(extra: &mut Extras, key: String, value: JsonValue) -> Result<(), RequestError> {
    if !is_primitive(&value) {
        return Err(RequestError::NonPrimitiveExtra { key });
    }
    extra.insert(key, value);
    Ok(())
}

const fn is_primitive(value: &JsonValue) -> bool {
    !matches!(value, JsonValue::Array(_) | JsonValue::Object(_))
}

fn keys_to_json<K: AsRef<str>>(keys: &[K]) -> JsonValue {
    JsonValue::Array(
        keys.iter()
            .map(|key| JsonValue::String(key.as_ref().to_owned()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::date;

    use super::*;

    #[test]
    fn reference_body_keeps_order_duplicates_and_extras() {
        let request = ReferenceRequest::from_json(json!({
            "ticker_list": ["SX5E Index", "SPX Index", "SX5E Index"],
            "field_list": ["PX_LAST"],
            "tests": "toto"
        }))
        .expect("valid request");

        let tickers: Vec<&str> = request.tickers.iter().map(EntityKey::as_str).collect();
        assert_eq!(tickers, ["SX5E Index", "SPX Index", "SX5E Index"]);
        assert_eq!(request.extra.get("tests"), Some(&json!("toto")));
        assert!(!request.extra.contains_key("ticker_list"));
    }

    #[test]
    fn missing_and_empty_lists_are_rejected() {
        let missing = ReferenceRequest::from_json(json!({"field_list": ["PX_LAST"]}))
            .expect_err("must fail");
        assert_eq!(
            missing,
            RequestError::MissingField {
                field: "ticker_list"
            }
        );

        let empty = ReferenceRequest::from_json(json!({
            "ticker_list": ["SPX Index"],
            "field_list": []
        }))
        .expect_err("must fail");
        assert_eq!(empty, RequestError::EmptyList { field: "field_list" });
    }

    #[test]
    fn non_object_body_is_missing_body() {
        assert_eq!(
            ReferenceRequest::from_json(json!(null)),
            Err(RequestError::MissingBody)
        );
    }

    #[test]
    fn nested_extras_are_rejected() {
        let err = ReferenceRequest::from_json(json!({
            "ticker_list": ["SPX Index"],
            "field_list": ["PX_LAST"],
            "overrides": {"EQY_FUND_CRNCY": "EUR"}
        }))
        .expect_err("must fail");
        assert!(matches!(err, RequestError::NonPrimitiveExtra { key } if key == "overrides"));
    }

    #[test]
    fn historical_request_requires_dates() {
        let err = HistoricalRequest::from_json(json!({
            "ticker_list": ["SPX Index"],
            "field_list": ["PX_LAST"],
            "start_date": "2012-01-01"
        }))
        .expect_err("must fail");
        assert_eq!(err, RequestError::MissingField { field: "end_date" });

        let err = HistoricalRequest::from_json(json!({
            "ticker_list": ["SPX Index"],
            "field_list": ["PX_LAST"],
            "start_date": "2012/01/01",
            "end_date": "2014-01-01"
        }))
        .expect_err("must fail");
        assert!(matches!(err, RequestError::InvalidDate { .. }));
    }

    #[test]
    fn historical_body_serializes_iso_dates() {
        let request = HistoricalRequest::new(
            vec![EntityKey::parse("SPX Index").expect("ticker")],
            vec![FieldKey::parse("PX_LAST").expect("field")],
            date!(2012 - 01 - 01),
            date!(2014 - 01 - 01),
        )
        .expect("request")
        .with_extra("periodicitySelection", "WEEKLY")
        .expect("primitive extra");

        assert_eq!(
            request.to_json().expect("json"),
            json!({
                "ticker_list": ["SPX Index"],
                "field_list": ["PX_LAST"],
                "start_date": "2012-01-01",
                "end_date": "2014-01-01",
                "periodicitySelection": "WEEKLY"
            })
        );
    }

    #[test]
    fn catalog_requests_check_their_required_key() {
        assert_eq!(
            CatalogRequest::from_json(CatalogKind::FieldSearch, json!({"category": "x"})),
            Err(RequestError::MissingField {
                field: "search_spec"
            })
        );

        let request = CatalogRequest::from_json(
            CatalogKind::FieldInfo,
            json!({"field_list": ["PX_LAST", "NAME"], "field_type": "Static"}),
        )
        .expect("valid");
        assert_eq!(request.field_list().len(), 2);
        assert_eq!(request.params.get("field_type"), Some(&json!("Static")));
        assert_eq!(request.kind.endpoint().path(), "/fields_info");
    }
}
