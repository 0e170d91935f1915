//! Domain types for the trip planner.
//!
//! This module contains the core domain model types shared by the
//! timetable, the protocol and the web layer. All types enforce their
//! invariants at construction time, so code that receives these types can
//! trust their validity.

mod leg;
mod station;
mod time;
mod trip_type;

pub use leg::TripLeg;
pub use station::{InvalidStationName, StationName};
pub use time::{ClockTime, TimeError};
pub use trip_type::{TripType, UnknownTripType};
