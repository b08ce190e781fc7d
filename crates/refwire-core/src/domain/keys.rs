use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::RequestError;

/// Instrument identifier as the terminal knows it, e.g. `"SPX Index"`.
///
/// The text is opaque: it is trimmed but otherwise kept verbatim, since
/// terminal tickers carry meaningful spaces and mixed case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityKey(String);

impl EntityKey {
    pub fn parse(input: &str) -> Result<Self, RequestError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(RequestError::BlankTicker);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Named data attribute of an entity, e.g. `"PX_LAST"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldKey(String);

impl FieldKey {
    pub fn parse(input: &str) -> Result<Self, RequestError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(RequestError::BlankField);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! key_conversions {
    ($ty:ident) => {
        impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $ty {
            type Error = RequestError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl TryFrom<&str> for $ty {
            type Error = RequestError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }
    };
}

key_conversions!(EntityKey);
key_conversions!(FieldKey);
