//! Trip selection policies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a trip type name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown trip type: {0}")]
pub struct UnknownTripType(String);

/// How sibling replies are ranked when a search collates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TripType {
    /// Earliest arrival at the destination.
    #[default]
    FastestTrip,
}

impl TripType {
    /// Every supported trip type, in display order.
    pub const ALL: [TripType; 1] = [TripType::FastestTrip];

    /// The name used on the wire and in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::FastestTrip => "FastestTrip",
        }
    }
}

impl FromStr for TripType {
    type Err = UnknownTripType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TripType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTripType(s.to_string()))
    }
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
