//! Provider boundary.
//!
//! The server never talks to the terminal directly; it calls a
//! [`DataProvider`] and encodes whatever comes back. [`SyntheticProvider`]
//! answers every query with deterministic values derived from the ticker and
//! field names, which keeps the service runnable and testable offline.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde_json::Value as JsonValue;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time, Weekday};
use tracing::debug;

use crate::request::{CatalogKind, CatalogRequest, HistoricalRequest, ReferenceRequest};
use crate::{
    Cell, EntityKey, FieldKey, FieldMap, FieldValue, HistoricalData, HistoricalOutcome,
    ReferenceData, Table, TableError, DATE_INDEX_LABEL,
};

/// Provider-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The request is well-formed but the provider refuses its parameters.
    InvalidRequest,
    /// The provider session could not be reached.
    Unavailable,
    Internal,
}

/// Structured failure reported by a [`DataProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
}

impl ProviderError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::InvalidRequest => "provider.invalid_request",
            ProviderErrorKind::Unavailable => "provider.unavailable",
            ProviderErrorKind::Internal => "provider.internal",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ProviderError {}

impl From<TableError> for ProviderError {
    fn from(error: TableError) -> Self {
        Self::internal(error.to_string())
    }
}

/// Market-data session contract used by the query server.
///
/// | Method | Reply |
/// |--------|-------|
/// | [`reference_data`](DataProvider::reference_data) | entity → field → value |
/// | [`historical_data`](DataProvider::historical_data) | entity → date-indexed table, or no data |
/// | [`catalog`](DataProvider::catalog) | one table describing fields |
///
/// Implementations must be `Send + Sync`: the server shares one instance
/// across all handlers.
pub trait DataProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn reference_data<'a>(
        &'a self,
        req: ReferenceRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ReferenceData, ProviderError>> + Send + 'a>>;

    /// Returns [`HistoricalOutcome::NoData`] when the range holds no
    /// observation; that is not an error.
    fn historical_data<'a>(
        &'a self,
        req: HistoricalRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HistoricalOutcome, ProviderError>> + Send + 'a>>;

    /// Field-catalog lookups. Search semantics belong to the provider.
    fn catalog<'a>(
        &'a self,
        req: CatalogRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Table, ProviderError>> + Send + 'a>>;
}

/// Sampling of a historical series, read from the `periodicitySelection` extra.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Periodicity {
    Daily,
    Weekly,
    Monthly,
}

impl Periodicity {
    pub const EXTRA_KEY: &'static str = "periodicitySelection";

    pub fn from_extra(value: Option<&JsonValue>) -> Result<Self, ProviderError> {
        let Some(value) = value else {
            return Ok(Self::Daily);
        };
        match value.as_str().map(str::to_ascii_uppercase).as_deref() {
            Some("DAILY") => Ok(Self::Daily),
            Some("WEEKLY") => Ok(Self::Weekly),
            Some("MONTHLY") => Ok(Self::Monthly),
            _ => Err(ProviderError::invalid_request(format!(
                "unsupported {} '{value}' (expected DAILY, WEEKLY or MONTHLY)",
                Self::EXTRA_KEY
            ))),
        }
    }

    fn keeps(self, day: Date) -> bool {
        match self {
            Self::Daily => true,
            Self::Weekly => day.weekday() == Weekday::Friday,
            Self::Monthly => next_business_day(day).month() != day.month(),
        }
    }
}

/// Upper bound on the rows of one synthetic series.
pub const MAX_HISTORY_ROWS: usize = 20_000;

struct CatalogEntry {
    mnemonic: &'static str,
    description: &'static str,
    datatype: &'static str,
    category: &'static str,
}

const FIELD_CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        mnemonic: "PX_LAST",
        description: "Last Price",
        datatype: "Double",
        category: "Market Activity",
    },
    CatalogEntry {
        mnemonic: "PX_OPEN",
        description: "Open Price",
        datatype: "Double",
        category: "Market Activity",
    },
    CatalogEntry {
        mnemonic: "PX_HIGH",
        description: "High Price",
        datatype: "Double",
        category: "Market Activity",
    },
    CatalogEntry {
        mnemonic: "PX_LOW",
        description: "Low Price",
        datatype: "Double",
        category: "Market Activity",
    },
    CatalogEntry {
        mnemonic: "PX_VOLUME",
        description: "Volume",
        datatype: "Int64",
        category: "Market Activity",
    },
    CatalogEntry {
        mnemonic: "NAME",
        description: "Name",
        datatype: "String",
        category: "Descriptive",
    },
    CatalogEntry {
        mnemonic: "CRNCY",
        description: "Currency",
        datatype: "String",
        category: "Descriptive",
    },
    CatalogEntry {
        mnemonic: "LAST_UPDATE_DT",
        description: "Date of Last Update",
        datatype: "Date",
        category: "Market Activity",
    },
    CatalogEntry {
        mnemonic: "LAST_UPDATE",
        description: "Time of Last Update",
        datatype: "Datetime",
        category: "Market Activity",
    },
    CatalogEntry {
        mnemonic: "INDX_MWEIGHT",
        description: "Index Member Weightings",
        datatype: "BulkFormat",
        category: "Index Data",
    },
];

const MEMBER_SUFFIXES: [&str; 5] = ["UN", "UW", "GY", "FP", "LN"];

/// Deterministic stand-in for a terminal session.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    as_of: Date,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self {
            as_of: OffsetDateTime::now_utc().date(),
        }
    }
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the date reported by point-in-time fields.
    pub fn with_as_of(as_of: Date) -> Self {
        Self { as_of }
    }

    fn reference_value(
        &self,
        ticker: &EntityKey,
        field: &FieldKey,
    ) -> Result<FieldValue, ProviderError> {
        let seed = seed_of(&[ticker.as_str(), field.as_str()]);
        let value = match field.as_str() {
            "NAME" => FieldValue::Text(format!("{} Synthetic", ticker.as_str())),
            "CRNCY" => FieldValue::from("USD"),
            "PX_VOLUME" => FieldValue::Int(volume(seed)),
            "LAST_UPDATE_DT" => FieldValue::Date(self.as_of),
            "LAST_UPDATE" => FieldValue::DateTime(PrimitiveDateTime::new(
                self.as_of,
                intraday_time(seed)?,
            )),
            "INDX_MWEIGHT" => FieldValue::Table(member_weights(ticker)?),
            _ => FieldValue::Float(price(seed, 0)),
        };
        Ok(value)
    }

    fn series(
        &self,
        ticker: &EntityKey,
        fields: &[FieldKey],
        days: &[Date],
    ) -> Result<Table, ProviderError> {
        let mut table = Table::indexed(DATE_INDEX_LABEL, fields.iter().map(FieldKey::as_str))?;
        let seeds: Vec<u64> = fields
            .iter()
            .map(|field| seed_of(&[ticker.as_str(), field.as_str()]))
            .collect();

        for (offset, day) in days.iter().enumerate() {
            let cells = fields
                .iter()
                .zip(&seeds)
                .map(|(field, seed)| match field.as_str() {
                    "PX_VOLUME" => Cell::Int(volume(seed.wrapping_add(offset as u64))),
                    _ => Cell::Float(price(*seed, offset)),
                })
                .collect();
            table.push_indexed_row(Cell::Date(*day), cells)?;
        }
        Ok(table)
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn reference_data<'a>(
        &'a self,
        req: ReferenceRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ReferenceData, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            debug!(
                tickers = req.tickers.len(),
                fields = req.fields.len(),
                extras = req.extra.len(),
                "synthetic reference lookup"
            );

            let mut data = ReferenceData::new();
            for ticker in &req.tickers {
                let mut values = FieldMap::new();
                for field in &req.fields {
                    values.insert(field.clone(), self.reference_value(ticker, field)?);
                }
                data.insert(ticker.clone(), values);
            }
            Ok(data)
        })
    }

    fn historical_data<'a>(
        &'a self,
        req: HistoricalRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HistoricalOutcome, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            let periodicity = Periodicity::from_extra(req.extra.get(Periodicity::EXTRA_KEY))?;
            let days = observation_days(req.start_date, req.end_date, periodicity)?;
            if days.is_empty() {
                debug!(start = %req.start_date, end = %req.end_date, "range holds no observation");
                return Ok(HistoricalOutcome::NoData);
            }

            let fields = distinct(&req.fields);
            let mut data = HistoricalData::new();
            for ticker in &req.tickers {
                data.insert(ticker.clone(), self.series(ticker, &fields, &days)?);
            }
            Ok(HistoricalOutcome::Data(data))
        })
    }

    fn catalog<'a>(
        &'a self,
        req: CatalogRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Table, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            let entries: Vec<&CatalogEntry> = match req.kind {
                CatalogKind::FieldInfo => {
                    let wanted = req.field_list();
                    FIELD_CATALOG
                        .iter()
                        .filter(|entry| wanted.iter().any(|field| field.as_str() == entry.mnemonic))
                        .collect()
                }
                CatalogKind::FieldSearch | CatalogKind::CategorySearch => {
                    let needle = req.search_spec().unwrap_or_default().to_ascii_lowercase();
                    FIELD_CATALOG
                        .iter()
                        .filter(|entry| {
                            entry.mnemonic.to_ascii_lowercase().contains(&needle)
                                || entry.description.to_ascii_lowercase().contains(&needle)
                        })
                        .collect()
                }
            };

            catalog_table(req.kind, &entries)
        })
    }
}

fn catalog_table(kind: CatalogKind, entries: &[&CatalogEntry]) -> Result<Table, ProviderError> {
    let mut table = match kind {
        CatalogKind::CategorySearch => {
            Table::new(["category", "mnemonic", "description", "datatype"])?
        }
        CatalogKind::FieldInfo | CatalogKind::FieldSearch => {
            Table::new(["mnemonic", "description", "datatype"])?
        }
    };

    let mut ordered = entries.to_vec();
    if kind == CatalogKind::CategorySearch {
        ordered.sort_by_key(|entry| entry.category);
    }

    for entry in ordered {
        let mut row = Vec::with_capacity(4);
        if kind == CatalogKind::CategorySearch {
            row.push(Cell::from(entry.category));
        }
        row.push(Cell::from(entry.mnemonic));
        row.push(Cell::from(entry.description));
        row.push(Cell::from(entry.datatype));
        table.push_row(row)?;
    }
    Ok(table)
}

fn member_weights(ticker: &EntityKey) -> Result<Table, ProviderError> {
    let seed = seed_of(&[ticker.as_str(), "INDX_MWEIGHT"]);
    let mut table = Table::new(["Member Ticker and Exchange Code", "Percentage Weight"])?;
    let raw: Vec<u64> = (0..MEMBER_SUFFIXES.len() as u64)
        .map(|slot| 1 + seed.wrapping_add(slot * 7919) % 97)
        .collect();
    let total: u64 = raw.iter().sum();

    for (slot, (suffix, weight)) in MEMBER_SUFFIXES.iter().zip(&raw).enumerate() {
        let member = format!("M{:03} {suffix}", ((seed % 1000) as usize + slot * 31) % 1000);
        let share = (*weight as f64 * 10_000.0 / total as f64).round() / 100.0;
        table.push_row(vec![Cell::from(member), Cell::Float(share)])?;
    }
    Ok(table)
}

/// Business days in `[start, end]` kept by `periodicity`.
fn observation_days(
    start: Date,
    end: Date,
    periodicity: Periodicity,
) -> Result<Vec<Date>, ProviderError> {
    let mut days = Vec::new();
    let mut day = start;
    while day <= end {
        if is_business_day(day) && periodicity.keeps(day) {
            if days.len() == MAX_HISTORY_ROWS {
                return Err(ProviderError::invalid_request(format!(
                    "history from {start} to {end} exceeds {MAX_HISTORY_ROWS} rows"
                )));
            }
            days.push(day);
        }
        match day.next_day() {
            Some(next) => day = next,
            None => break,
        }
    }
    Ok(days)
}

/// Series columns are unique; repeated fields keep their first position.
fn distinct(fields: &[FieldKey]) -> Vec<FieldKey> {
    let mut unique: Vec<FieldKey> = Vec::with_capacity(fields.len());
    for field in fields {
        if !unique.contains(field) {
            unique.push(field.clone());
        }
    }
    unique
}

fn is_business_day(day: Date) -> bool {
    !matches!(day.weekday(), Weekday::Saturday | Weekday::Sunday)
}

fn next_business_day(day: Date) -> Date {
    let mut next = day.saturating_add(Duration::days(1));
    while !is_business_day(next) {
        next = next.saturating_add(Duration::days(1));
    }
    next
}

fn intraday_time(seed: u64) -> Result<Time, ProviderError> {
    let minutes = 9 * 60 + 30 + seed % 390;
    Time::from_hms((minutes / 60) as u8, (minutes % 60) as u8, (seed % 60) as u8)
        .map_err(|error| ProviderError::internal(error.to_string()))
}

fn price(seed: u64, offset: usize) -> f64 {
    let base = 90.0 + (seed % 4_100) as f64 / 10.0;
    let drift = (seed.wrapping_add(offset as u64 * 7) % 200) as f64 / 100.0;
    ((base + drift) * 100.0).round() / 100.0
}

fn volume(seed: u64) -> i64 {
    (250_000 + seed % 1_750_000) as i64
}

fn seed_of(parts: &[&str]) -> u64 {
    parts
        .iter()
        .flat_map(|part| part.bytes().chain(std::iter::once(0)))
        .fold(13_u64, |acc, byte| acc.wrapping_mul(29).wrapping_add(byte as u64))
}
