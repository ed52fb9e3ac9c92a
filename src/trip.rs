//! Trip records and their time-of-day derivations
//!
//! A [`TripRecord`] is the normalized unit every analysis stage works on.
//! Records are immutable once built; the route key is derived at
//! construction so every downstream stage groups on the same string.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Timestamp layout of the `started_at` column (`YYYY-MM-DD HH:MM:SS.ffffff`)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Separator placed between start and end station in a route key
pub const ROUTE_SEPARATOR: &str = " -> ";

/// Minutes in a day; minute-of-day values are always below this
pub const MINUTES_PER_DAY: u32 = 1440;

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Failure to turn a raw `started_at` value into a timestamp
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("empty timestamp")]
    Empty,

    #[error("malformed timestamp '{raw}': {source}")]
    Malformed {
        raw: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Parse a `started_at` value.
///
/// Surrounding whitespace is ignored. The fractional-seconds part is
/// optional.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, TimestampError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TimestampError::Empty);
    }

    NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT).map_err(|source| {
        TimestampError::Malformed {
            raw: trimmed.to_string(),
            source,
        }
    })
}

/// Rider category as published in the `member_casual` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberType {
    Member,
    Casual,
}

impl MemberType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberType::Member => "member",
            MemberType::Casual => "casual",
        }
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "member" => Ok(MemberType::Member),
            "casual" => Ok(MemberType::Casual),
            other => Err(format!("unknown member type '{}'", other)),
        }
    }
}

/// Build the directional route key for a station pair
pub fn route_key(start_station: &str, end_station: &str) -> String {
    format!("{}{}{}", start_station, ROUTE_SEPARATOR, end_station)
}

/// A single normalized bike-share trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRecord {
    ride_id: String,
    start_station: String,
    end_station: String,
    route_key: String,
    started_at: NaiveDateTime,
    member_type: MemberType,
}

impl TripRecord {
    pub fn new(
        ride_id: impl Into<String>,
        start_station: impl Into<String>,
        end_station: impl Into<String>,
        started_at: NaiveDateTime,
        member_type: MemberType,
    ) -> Self {
        let start_station = start_station.into();
        let end_station = end_station.into();
        let route_key = route_key(&start_station, &end_station);

        Self {
            ride_id: ride_id.into(),
            start_station,
            end_station,
            route_key,
            started_at,
            member_type,
        }
    }

    pub fn ride_id(&self) -> &str {
        &self.ride_id
    }

    pub fn start_station(&self) -> &str {
        &self.start_station
    }

    pub fn end_station(&self) -> &str {
        &self.end_station
    }

    /// Route key (`start -> end`)
    pub fn route_key(&self) -> &str {
        &self.route_key
    }

    pub fn started_at(&self) -> NaiveDateTime {
        self.started_at
    }

    pub fn member_type(&self) -> MemberType {
        self.member_type
    }

    pub fn date(&self) -> NaiveDate {
        self.started_at.date()
    }

    pub fn hour(&self) -> u32 {
        self.started_at.hour()
    }

    /// `hour * 60 + minute`, ignoring date and seconds
    pub fn minute_of_day(&self) -> u32 {
        self.started_at.hour() * 60 + self.started_at.minute()
    }

    pub fn weekday(&self) -> Weekday {
        self.started_at.weekday()
    }

    /// Monday through Friday
    pub fn is_weekday(&self) -> bool {
        self.weekday().num_days_from_monday() < 5
    }

    /// Three-letter day name (`Mon` .. `Sun`)
    pub fn day_name(&self) -> &'static str {
        DAY_NAMES[self.weekday().num_days_from_monday() as usize]
    }

    /// Calendar date as `YYYY-MM-DD`
    pub fn date_string(&self) -> String {
        self.started_at.format("%Y-%m-%d").to_string()
    }

    /// Clock time as `HH:MM`
    pub fn time_string(&self) -> String {
        self.started_at.format("%H:%M").to_string()
    }
}

/// Format a minute-of-day value as `HH:MM`
pub fn format_minute_of_day(minute_of_day: u32) -> String {
    format!("{:02}:{:02}", minute_of_day / 60, minute_of_day % 60)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Build a trip on 2025-10-06 (a Monday) unless `date` overrides it
    pub fn trip_at(id: &str, start: &str, end: &str, date: &str, time: &str) -> TripRecord {
        let started_at = parse_timestamp(&format!("{} {}:00.000000", date, time))
            .expect("test timestamp must parse");
        TripRecord::new(id, start, end, started_at, MemberType::Member)
    }

    pub fn route_trip(id: &str, time: &str) -> TripRecord {
        trip_at(id, "Park Plaza", "Kendall T", "2025-10-06", time)
    }
}
