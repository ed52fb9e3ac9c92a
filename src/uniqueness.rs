//! Route rarity analysis
//!
//! A route that only a handful of trips ever take is close to a fingerprint:
//! anyone who knows one of those trips can single out the rider.

use crate::route_index::RouteIndex;
use crate::trip::TripRecord;

/// Default upper bound (inclusive) on trip count for a route to be "rare"
pub const DEFAULT_RARE_THRESHOLD: usize = 3;

/// Usage of one route across the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteFrequency {
    pub route: String,
    pub trip_count: usize,
    /// Distinct rider ids that took the route, first-seen order
    pub riders: Vec<String>,
}

/// Route frequency table plus the subset of rare routes
#[derive(Debug, Clone)]
pub struct RouteUniqueness {
    /// Every route in first-seen order
    pub routes: Vec<RouteFrequency>,
    /// Routes with `trip_count <= rare_threshold`, least used first
    pub rare_routes: Vec<RouteFrequency>,
    pub rare_threshold: usize,
}

impl RouteUniqueness {
    pub fn analyze(trips: &[TripRecord], rare_threshold: usize) -> Self {
        let index = RouteIndex::build(trips);

        let routes: Vec<RouteFrequency> = index
            .iter()
            .map(|group| {
                let mut riders: Vec<String> = Vec::new();
                for trip in &group.trips {
                    if !riders.iter().any(|r| r == trip.ride_id()) {
                        riders.push(trip.ride_id().to_string());
                    }
                }
                RouteFrequency {
                    route: group.route.to_string(),
                    trip_count: group.len(),
                    riders,
                }
            })
            .collect();

        let mut rare_routes: Vec<RouteFrequency> = routes
            .iter()
            .filter(|r| r.trip_count <= rare_threshold)
            .cloned()
            .collect();
        rare_routes.sort_by_key(|r| r.trip_count);

        Self {
            routes,
            rare_routes,
            rare_threshold,
        }
    }

    pub fn unique_route_count(&self) -> usize {
        self.routes.len()
    }

    /// Share of routes that are rare, in percent (0.0 for an empty batch)
    pub fn rare_share_percent(&self) -> f64 {
        if self.routes.is_empty() {
            return 0.0;
        }
        self.rare_routes.len() as f64 / self.routes.len() as f64 * 100.0
    }
}
