//! CSV timetable parsing.
//!
//! File layout:
//!
//! ```text
//! Alpha,115.8613,-31.9523
//! 09:00,Bus_1,Stop1,09:20,Beta
//! 09:30,Train_2,Platform2,10:05,Gamma
//! ```
//!
//! The first row names the station and its longitude and latitude; every
//! following row is one leg: departure, route, departing stop, arrival,
//! destination.

use std::io::Read;
use std::path::Path;

use tracing::warn;

use crate::domain::{ClockTime, StationName, TripLeg};

use super::catalog::{Coordinates, Timetable};
use super::error::TimetableError;

/// Number of fields in a leg row.
const LEG_FIELDS: usize = 5;

impl Timetable {
    /// Load a timetable file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TimetableError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| TimetableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(bytes.as_slice())
    }

    /// Parse a timetable from CSV text.
    pub fn from_reader(reader: impl Read) -> Result<Self, TimetableError> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = csv.records();

        let header = records.next().ok_or(TimetableError::MissingHeader)??;
        let (station, coordinates) = parse_header(&header)?;

        let mut legs: Vec<TripLeg> = Vec::new();
        for record in records {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());

            // Tolerate blank trailing lines
            if record.iter().all(str::is_empty) {
                continue;
            }

            let leg = parse_leg(&record, line)?;
            if let Some(prev) = legs.last()
                && leg.departure < prev.departure
            {
                warn!(
                    station = %station,
                    line,
                    "timetable rows are not in departure order; earliest-trip lookup assumes they are"
                );
            }
            legs.push(leg);
        }

        Ok(Timetable::new(station, coordinates, legs))
    }
}

fn parse_header(record: &csv::StringRecord) -> Result<(StationName, Coordinates), TimetableError> {
    if record.len() < 3 {
        return Err(TimetableError::InvalidHeader(format!(
            "expected station,longitude,latitude but found {} fields",
            record.len()
        )));
    }

    let station = StationName::parse(&record[0])
        .map_err(|e| TimetableError::InvalidHeader(e.to_string()))?;
    let longitude = parse_coordinate(&record[1], "longitude")?;
    let latitude = parse_coordinate(&record[2], "latitude")?;

    Ok((
        station,
        Coordinates {
            longitude,
            latitude,
        },
    ))
}

fn parse_coordinate(field: &str, what: &str) -> Result<f64, TimetableError> {
    field
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| TimetableError::InvalidHeader(format!("invalid {what}: {field:?}")))
}

fn parse_leg(record: &csv::StringRecord, line: u64) -> Result<TripLeg, TimetableError> {
    if record.len() != LEG_FIELDS {
        return Err(TimetableError::row(
            line,
            format!("expected {LEG_FIELDS} fields, found {}", record.len()),
        ));
    }

    let departure =
        ClockTime::parse_hhmm(&record[0]).map_err(|e| TimetableError::row_time(line, e))?;
    let arrival =
        ClockTime::parse_hhmm(&record[3]).map_err(|e| TimetableError::row_time(line, e))?;
    let destination =
        StationName::parse(&record[4]).map_err(|e| TimetableError::row_station(line, e))?;

    Ok(TripLeg::new(
        departure,
        &record[1],
        &record[2],
        arrival,
        destination,
    ))
}
