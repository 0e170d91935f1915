//! Station name type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when parsing an invalid station name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station name: {reason}")]
pub struct InvalidStationName {
    reason: &'static str,
}

/// The name that uniquely identifies a station in the network.
///
/// Names are compared by value, case-sensitively. A name is never empty and
/// never has surrounding whitespace.
///
/// # Examples
///
/// ```
/// use trip_station::domain::StationName;
///
/// let name = StationName::parse("Alpha").unwrap();
/// assert_eq!(name.as_str(), "Alpha");
/// assert_eq!(name, StationName::parse("Alpha").unwrap());
///
/// assert!(StationName::parse("").is_err());
/// assert!(StationName::parse(" Alpha").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationName(String);

impl StationName {
    /// Parse a station name.
    pub fn parse(s: &str) -> Result<Self, InvalidStationName> {
        if s.is_empty() {
            return Err(InvalidStationName {
                reason: "must not be empty",
            });
        }
        if s.trim() != s {
            return Err(InvalidStationName {
                reason: "must not have surrounding whitespace",
            });
        }
        if s.chars().any(char::is_control) {
            return Err(InvalidStationName {
                reason: "must not contain control characters",
            });
        }
        Ok(Self(s.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StationName {
    type Error = InvalidStationName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StationName> for String {
    fn from(name: StationName) -> Self {
        name.0
    }
}

impl PartialEq<str> for StationName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl fmt::Debug for StationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationName({})", self.0)
    }
}

impl fmt::Display for StationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
