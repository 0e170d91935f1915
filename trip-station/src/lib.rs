//! Distributed trip planner station.
//!
//! Each station knows only its own timetable and the UDP addresses of its
//! neighbours. A client asks any station for the fastest trip to another;
//! the stations flood the search between themselves and collate the
//! answers on the way back, so no station ever holds the whole network.

pub mod config;
pub mod domain;
pub mod protocol;
pub mod station;
pub mod timetable;
pub mod web;
