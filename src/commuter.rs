//! Per-rider route profiling, commute profiling and cross-reference queries
//!
//! Weekday trips in the morning (06–09h) or evening (16–19h) windows are
//! treated as commutes. A rider with enough of them, and a dominant route,
//! exposes a likely home station and a likely work station.

use std::collections::HashMap;

use crate::aggregate::PatternType;
use crate::route_index::group_ordered;
use crate::trip::{MemberType, TripRecord};

/// Default minimum number of commute trips for a rider to be profiled
pub const DEFAULT_MIN_COMMUTES: usize = 3;

/// Number of most frequent routes kept per rider
pub const TOP_ROUTES: usize = 3;

/// Route counts in first-seen order
fn count_routes<'a, I>(trips: I) -> Vec<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a TripRecord>,
{
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    let mut slots: HashMap<&'a str, usize> = HashMap::new();

    for trip in trips {
        let route = trip.route_key();
        match slots.get(route).copied() {
            Some(slot) => counts[slot].1 += 1,
            None => {
                slots.insert(route, counts.len());
                counts.push((route, 1));
            }
        }
    }

    counts
}

/// Route habits of one rider id with more than one trip
#[derive(Debug, Clone, PartialEq)]
pub struct RiderRouteProfile {
    pub ride_id: String,
    /// Member type of the rider's first trip
    pub member_type: MemberType,
    pub total_trips: usize,
    pub unique_routes: usize,
    /// Up to three most frequent routes, by count (ties: first seen)
    pub top_routes: Vec<(String, usize)>,
}

impl RiderRouteProfile {
    /// Profile every rider with more than one trip, riders in first-seen order
    pub fn analyze(trips: &[TripRecord]) -> Vec<RiderRouteProfile> {
        group_ordered(trips, TripRecord::ride_id)
            .into_iter()
            .filter(|(_, rider_trips)| rider_trips.len() > 1)
            .map(|(ride_id, rider_trips)| {
                let mut routes = count_routes(rider_trips.iter().copied());
                let unique_routes = routes.len();
                // stable sort keeps first-seen order among equal counts
                routes.sort_by(|a, b| b.1.cmp(&a.1));
                routes.truncate(TOP_ROUTES);

                RiderRouteProfile {
                    ride_id: ride_id.to_string(),
                    member_type: rider_trips[0].member_type(),
                    total_trips: rider_trips.len(),
                    unique_routes,
                    top_routes: routes
                        .into_iter()
                        .map(|(route, count)| (route.to_string(), count))
                        .collect(),
                }
            })
            .collect()
    }

    /// Percentage of this rider's trips taken on a route with `count` trips
    pub fn share_percent(&self, count: usize) -> f64 {
        count as f64 / self.total_trips as f64 * 100.0
    }
}

/// Commute behaviour of one rider id
#[derive(Debug, Clone, PartialEq)]
pub struct CommuterProfile {
    pub ride_id: String,
    pub total_trips: usize,
    pub morning_commutes: usize,
    pub evening_commutes: usize,
    /// Member type of the rider's first trip
    pub member_type: MemberType,
    /// Most frequent commute route and its count (ties: first seen)
    pub typical_route: Option<(String, usize)>,
}

impl CommuterProfile {
    pub fn total_commutes(&self) -> usize {
        self.morning_commutes + self.evening_commutes
    }

    /// Fraction of the rider's trips that are commutes (0.0–1.0)
    pub fn commute_ratio(&self) -> f64 {
        self.total_commutes() as f64 / self.total_trips as f64
    }

    /// `(likely home, likely work)` station names from the typical route
    pub fn likely_home_and_work<'a>(&self, trips: &'a [TripRecord]) -> Option<(&'a str, &'a str)> {
        let (route, _) = self.typical_route.as_ref()?;
        trips
            .iter()
            .find(|t| t.ride_id() == self.ride_id && t.route_key() == route)
            .map(|t| (t.start_station(), t.end_station()))
    }

    /// Profile every rider with at least `min_commutes` commute trips
    ///
    /// Riders are reported in first-seen order.
    pub fn detect(trips: &[TripRecord], min_commutes: usize) -> Vec<CommuterProfile> {
        group_ordered(trips, TripRecord::ride_id)
            .into_iter()
            .filter_map(|(ride_id, rider_trips)| {
                Self::profile(ride_id, &rider_trips, min_commutes)
            })
            .collect()
    }

    fn profile(ride_id: &str, trips: &[&TripRecord], min_commutes: usize) -> Option<Self> {
        let mut morning = 0;
        let mut evening = 0;
        let mut commutes: Vec<&TripRecord> = Vec::new();

        for &trip in trips.iter().filter(|t| t.is_weekday()) {
            match PatternType::from_hour(trip.hour()) {
                PatternType::MorningCommute => morning += 1,
                PatternType::EveningCommute => evening += 1,
                PatternType::RegularPattern => continue,
            }
            commutes.push(trip);
        }

        if morning + evening < min_commutes || trips.is_empty() {
            return None;
        }

        // first route reaching the highest count wins ties
        let mut typical: Option<(&str, usize)> = None;
        for (route, count) in count_routes(commutes) {
            if typical.map_or(true, |(_, best)| count > best) {
                typical = Some((route, count));
            }
        }

        Some(Self {
            ride_id: ride_id.to_string(),
            total_trips: trips.len(),
            morning_commutes: morning,
            evening_commutes: evening,
            member_type: trips[0].member_type(),
            typical_route: typical.map(|(r, c)| (r.to_string(), c)),
        })
    }
}

/// Cross-reference attack: what an observer who knows two facts can narrow to
///
/// Matches riders whose first trip is a member trip and who have a weekday
/// morning trip starting at a station whose name contains `station_contains`.
#[derive(Debug, Clone)]
pub struct TargetProfile {
    pub station_contains: String,
}

impl TargetProfile {
    pub fn new(station_contains: impl Into<String>) -> Self {
        Self {
            station_contains: station_contains.into(),
        }
    }

    fn matches(&self, trip: &TripRecord) -> bool {
        trip.is_weekday()
            && PatternType::from_hour(trip.hour()) == PatternType::MorningCommute
            && trip.start_station().contains(&self.station_contains)
    }

    /// First matching trip of every matching rider, riders in first-seen order
    pub fn find_matches<'a>(&self, trips: &'a [TripRecord]) -> Vec<&'a TripRecord> {
        group_ordered(trips, TripRecord::ride_id)
            .into_iter()
            .filter(|(_, rider_trips)| rider_trips[0].member_type() == MemberType::Member)
            .filter_map(|(_, rider_trips)| rider_trips.into_iter().find(|t| self.matches(t)))
            .collect()
    }
}
