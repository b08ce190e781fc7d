//! ISO-8601 text forms shared by the encoder and the decoder.
//!
//! Three shapes are recognized, and only these: `YYYY-MM-DD`,
//! `YYYY-MM-DDTHH:MM:SS` and `YYYY-MM-DDTHH:MM:SS.f+`. Anything looser
//! (slashes, spaces, offsets) is not a date for the purposes of the codec.

use time::macros::format_description;
use time::{Date, PrimitiveDateTime};

use crate::{EncodeError, RequestError};

/// A successfully parsed ISO temporal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsoTemporal {
    Date(Date),
    DateTime(PrimitiveDateTime),
}

impl IsoTemporal {
    /// The value as a datetime, midnight for plain dates.
    pub fn to_datetime(self) -> PrimitiveDateTime {
        match self {
            Self::Date(date) => date.midnight(),
            Self::DateTime(datetime) => datetime,
        }
    }

    pub fn date(self) -> Date {
        match self {
            Self::Date(date) => date,
            Self::DateTime(datetime) => datetime.date(),
        }
    }
}

pub fn parse_iso(input: &str) -> Option<IsoTemporal> {
    if let Ok(date) = Date::parse(input, format_description!("[year]-[month]-[day]")) {
        return Some(IsoTemporal::Date(date));
    }

    if let Ok(datetime) = PrimitiveDateTime::parse(
        input,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Some(IsoTemporal::DateTime(datetime));
    }

    PrimitiveDateTime::parse(
        input,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    )
    .ok()
    .map(IsoTemporal::DateTime)
}

/// Parses a request date. Datetimes are accepted and truncated to their day.
pub fn parse_request_date(input: &str) -> Result<Date, RequestError> {
    parse_iso(input.trim())
        .map(IsoTemporal::date)
        .ok_or_else(|| RequestError::InvalidDate {
            value: input.to_owned(),
        })
}

pub fn format_date(date: Date) -> Result<String, EncodeError> {
    date.format(format_description!("[year]-[month]-[day]"))
        .map_err(|error| EncodeError::DateFormat {
            context: date.to_string(),
            reason: error.to_string(),
        })
}

/// Formats a datetime, writing microseconds only when they are non-zero.
pub fn format_datetime(datetime: PrimitiveDateTime) -> Result<String, EncodeError> {
    let formatted = if datetime.microsecond() == 0 {
        datetime.format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]"
        ))
    } else {
        datetime.format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]"
        ))
    };

    formatted.map_err(|error| EncodeError::DateFormat {
        context: datetime.to_string(),
        reason: error.to_string(),
    })
}
