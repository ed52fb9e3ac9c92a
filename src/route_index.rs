//! Insertion-ordered grouping of trips by route
//!
//! Cluster discovery and result ordering both depend on the order in which
//! route groups are visited, so groups are kept in first-seen key order
//! rather than hash order.

use std::collections::HashMap;

use crate::trip::TripRecord;

/// Group trips by a string key, preserving first-seen key order and the
/// original relative order of trips inside each group.
pub fn group_ordered<'a, F>(trips: &'a [TripRecord], key: F) -> Vec<(&'a str, Vec<&'a TripRecord>)>
where
    F: Fn(&'a TripRecord) -> &'a str,
{
    let mut groups: Vec<(&'a str, Vec<&'a TripRecord>)> = Vec::new();
    let mut positions: HashMap<&'a str, usize> = HashMap::new();

    for trip in trips {
        let k = key(trip);
        match positions.get(k) {
            Some(&idx) => groups[idx].1.push(trip),
            None => {
                positions.insert(k, groups.len());
                groups.push((k, vec![trip]));
            }
        }
    }

    groups
}

/// All trips sharing one route key, in input order
#[derive(Debug, Clone)]
pub struct RouteGroup<'a> {
    pub route: &'a str,
    pub trips: Vec<&'a TripRecord>,
}

impl RouteGroup<'_> {
    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}

/// Mapping from route key to its trips, iterated in first-seen order
#[derive(Debug, Default)]
pub struct RouteIndex<'a> {
    groups: Vec<RouteGroup<'a>>,
    lookup: HashMap<&'a str, usize>,
}

impl<'a> RouteIndex<'a> {
    pub fn build(trips: &'a [TripRecord]) -> Self {
        let groups: Vec<RouteGroup<'a>> = group_ordered(trips, TripRecord::route_key)
            .into_iter()
            .map(|(route, trips)| RouteGroup { route, trips })
            .collect();

        let lookup = groups
            .iter()
            .enumerate()
            .map(|(idx, group)| (group.route, idx))
            .collect();

        tracing::debug!(
            trips = trips.len(),
            routes = groups.len(),
            "built route index"
        );

        Self { groups, lookup }
    }

    pub fn get(&self, route: &str) -> Option<&RouteGroup<'a>> {
        self.lookup.get(route).map(|&idx| &self.groups[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteGroup<'a>> {
        self.groups.iter()
    }

    /// Number of distinct routes
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::test_support::trip_at;

    #[test]
    fn test_empty_input_yields_empty_index() {
        let index = RouteIndex::build(&[]);
        assert!(index.is_empty());
        assert_eq!(index.iter().count(), 0);
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let trips = vec![
            trip_at("1", "Zeta", "Alpha", "2025-10-06", "08:00"),
            trip_at("2", "Alpha", "Zeta", "2025-10-06", "08:05"),
            trip_at("3", "Zeta", "Alpha", "2025-10-06", "08:10"),
            trip_at("4", "Middle", "Alpha", "2025-10-06", "08:15"),
        ];
        let index = RouteIndex::build(&trips);

        let routes: Vec<&str> = index.iter().map(|g| g.route).collect();
        assert_eq!(routes, vec!["Zeta -> Alpha", "Alpha -> Zeta", "Middle -> Alpha"]);
    }

    #[test]
    fn test_preserves_relative_order_within_group() {
        let trips = vec![
            trip_at("c", "A", "B", "2025-10-06", "09:00"),
            trip_at("x", "B", "A", "2025-10-06", "09:00"),
            trip_at("a", "A", "B", "2025-10-06", "07:00"),
            trip_at("b", "A", "B", "2025-10-06", "08:00"),
        ];
        let index = RouteIndex::build(&trips);

        let group = index.get("A -> B").unwrap();
        let ids: Vec<&str> = group.trips.iter().map(|t| t.ride_id()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(group.len(), 3);
    }

    #[test]
    fn test_direction_matters() {
        let trips = vec![
            trip_at("1", "A", "B", "2025-10-06", "09:00"),
            trip_at("2", "B", "A", "2025-10-06", "09:00"),
        ];
        let index = RouteIndex::build(&trips);
        assert_eq!(index.len(), 2);
        assert!(index.get("A -> B").is_some());
        assert!(index.get("B -> A").is_some());
        assert!(index.get("A -> C").is_none());
    }
}
