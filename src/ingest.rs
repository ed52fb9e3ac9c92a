//! Trip table ingestion
//!
//! Reads the published trip CSV and normalizes each row into a
//! [`TripRecord`]. Rows that cannot be normalized are skipped, never fatal;
//! the [`IngestReport`] keeps a per-reason count so the caller can surface
//! how much of the input was discarded.
//!
//! # Example
//!
//! ```
//! use ridelink::ingest::read_trips;
//!
//! let data = "ride_id,started_at,start_station_name,end_station_name,member_casual\n\
//!             A1,2025-10-06 08:01:00.000000,Park Plaza,Kendall T,member\n\
//!             A2,not-a-time,Park Plaza,Kendall T,member\n";
//! let report = read_trips(data.as_bytes()).unwrap();
//! assert_eq!(report.trips.len(), 1);
//! assert_eq!(report.dropped, 1);
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::trip::{parse_timestamp, MemberType, TimestampError, TripRecord};

/// One raw row of the trip table; extra columns are ignored
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTripRow {
    pub ride_id: String,
    pub started_at: String,
    pub start_station_name: String,
    pub end_station_name: String,
    pub member_casual: String,
}

/// Why a raw row could not become a [`TripRecord`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("unknown member type '{0}'")]
    UnknownMemberType(String),

    #[error(transparent)]
    Timestamp(#[from] TimestampError),
}

impl RowError {
    pub fn reason(&self) -> DropReason {
        match self {
            RowError::MissingField(_) => DropReason::MissingField,
            RowError::UnknownMemberType(_) => DropReason::UnknownMemberType,
            RowError::Timestamp(_) => DropReason::MalformedTimestamp,
        }
    }
}

/// Drop categories tallied in an [`IngestReport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DropReason {
    MalformedTimestamp,
    MissingField,
    UnknownMemberType,
    /// Row the CSV decoder itself rejected (wrong column count, bad UTF-8)
    UnreadableRow,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DropReason::MalformedTimestamp => "malformed timestamp",
            DropReason::MissingField => "missing field",
            DropReason::UnknownMemberType => "unknown member type",
            DropReason::UnreadableRow => "unreadable row",
        };
        f.write_str(label)
    }
}

/// Normalize one raw row
pub fn parse_row(row: RawTripRow) -> Result<TripRecord, RowError> {
    let started_at = parse_timestamp(&row.started_at)?;

    if row.ride_id.trim().is_empty() {
        return Err(RowError::MissingField("ride_id"));
    }
    if row.start_station_name.trim().is_empty() {
        return Err(RowError::MissingField("start_station_name"));
    }
    if row.end_station_name.trim().is_empty() {
        return Err(RowError::MissingField("end_station_name"));
    }

    let member_type: MemberType = row
        .member_casual
        .parse()
        .map_err(|_| RowError::UnknownMemberType(row.member_casual.clone()))?;

    Ok(TripRecord::new(
        row.ride_id,
        row.start_station_name,
        row.end_station_name,
        started_at,
        member_type,
    ))
}

/// Result of reading one trip table
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Normalized trips in input order
    pub trips: Vec<TripRecord>,
    /// Total rows skipped
    pub dropped: usize,
    pub drop_reasons: BTreeMap<DropReason, usize>,
}

impl IngestReport {
    /// Rows seen, kept or not
    pub fn rows_seen(&self) -> usize {
        self.trips.len() + self.dropped
    }

    /// Distinct ride ids among the parsed trips
    pub fn rider_count(&self) -> usize {
        self.trips
            .iter()
            .map(TripRecord::ride_id)
            .collect::<HashSet<_>>()
            .len()
    }

    fn record_drop(&mut self, reason: DropReason) {
        self.dropped += 1;
        *self.drop_reasons.entry(reason).or_insert(0) += 1;
    }
}

/// Read trips from any CSV source with a header row
///
/// # Errors
/// Fails only on I/O errors or a missing header row. Malformed rows are
/// counted and skipped.
pub fn read_trips<R: Read>(reader: R) -> Result<IngestReport> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .headers()
        .context("Failed to read trip table header")?;

    let mut report = IngestReport::default();

    for (line, record) in csv_reader.deserialize::<RawTripRow>().enumerate() {
        let raw = match record {
            Ok(raw) => raw,
            Err(e) if e.is_io_error() => {
                return Err(e).context("I/O error while reading trip table");
            }
            Err(e) => {
                tracing::trace!(row = line + 1, error = %e, "unreadable row");
                report.record_drop(DropReason::UnreadableRow);
                continue;
            }
        };

        match parse_row(raw) {
            Ok(trip) => report.trips.push(trip),
            Err(e) => {
                tracing::trace!(row = line + 1, error = %e, "dropping row");
                report.record_drop(e.reason());
            }
        }
    }

    if report.dropped > 0 {
        tracing::warn!(
            dropped = report.dropped,
            kept = report.trips.len(),
            "skipped rows that could not be normalized"
        );
    }
    tracing::debug!(trips = report.trips.len(), "ingested trip table");

    Ok(report)
}

/// Open and read a trip CSV file
pub fn read_trips_from_path<P: AsRef<Path>>(path: P) -> Result<IngestReport> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open trip data file: {}", path.display()))?;
    read_trips(file).with_context(|| format!("Failed to read trip data: {}", path.display()))
}
