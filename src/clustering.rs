// Greedy seed-and-scan temporal clustering
//
// Within one route group, the first unconsumed trip seeds a cluster. A single
// forward scan from the seed absorbs every later unconsumed trip whose
// minute-of-day lies within the proximity window of ANY trip already in the
// cluster, so a cluster can grow along a chain of short links.
//
// Contract (non-)invariant: the result depends on input order. A trip that
// sits before a seed can never join that seed's cluster, even when it is
// temporally close. Permuting the input can change the partition. This is
// an explicit index-based scan; a connected-components pass would be order
// invariant and would produce different clusters.

use crate::config::{DatePolicy, DetectionConfig, DistancePolicy};
use crate::trip::{TripRecord, MINUTES_PER_DAY};

/// A non-empty set of same-route trips linked by the chain-growth rule
#[derive(Debug, Clone)]
pub struct Cluster<'a> {
    route: &'a str,
    members: Vec<&'a TripRecord>,
}

impl<'a> Cluster<'a> {
    fn seeded(seed: &'a TripRecord) -> Self {
        Self {
            route: seed.route_key(),
            members: vec![seed],
        }
    }

    pub fn route(&self) -> &'a str {
        self.route
    }

    /// Members in discovery order (seed first)
    pub fn members(&self) -> &[&'a TripRecord] {
        &self.members
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn ride_ids(&self) -> Vec<&'a str> {
        self.members.iter().map(|t| t.ride_id()).collect()
    }

    /// Arithmetic mean of member minute-of-day values, no wraparound correction
    pub fn avg_minute_of_day(&self) -> f64 {
        let total: u64 = self.members.iter().map(|t| u64::from(t.minute_of_day())).sum();
        total as f64 / self.members.len() as f64
    }
}

/// Partitions a route group into proximity clusters
#[derive(Debug, Clone, Copy)]
pub struct TemporalClusterer {
    proximity_minutes: u32,
    distance_policy: DistancePolicy,
    date_policy: DatePolicy,
}

impl Default for TemporalClusterer {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}

impl TemporalClusterer {
    pub fn new(
        proximity_minutes: u32,
        distance_policy: DistancePolicy,
        date_policy: DatePolicy,
    ) -> Self {
        Self {
            proximity_minutes,
            distance_policy,
            date_policy,
        }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(
            config.proximity_minutes,
            config.distance_policy,
            config.date_policy,
        )
    }

    /// Minute-of-day distance between two trips under the configured policies
    ///
    /// Returns `None` when the date policy forbids comparing the pair at all.
    pub fn distance(&self, a: &TripRecord, b: &TripRecord) -> Option<u32> {
        if self.date_policy == DatePolicy::SameDay && a.date() != b.date() {
            return None;
        }

        let raw = a.minute_of_day().abs_diff(b.minute_of_day());
        Some(match self.distance_policy {
            DistancePolicy::Linear => raw,
            DistancePolicy::Circular => raw.min(MINUTES_PER_DAY - raw),
        })
    }

    fn joins(&self, cluster: &Cluster<'_>, candidate: &TripRecord) -> bool {
        cluster
            .members
            .iter()
            .filter_map(|member| self.distance(member, candidate))
            .min()
            .is_some_and(|gap| gap <= self.proximity_minutes)
    }

    /// Partition `trips` (one route, input order) into clusters
    ///
    /// Every trip lands in exactly one cluster. Size-1 clusters are kept;
    /// filtering happens during aggregation.
    pub fn cluster<'a>(&self, trips: &[&'a TripRecord]) -> Vec<Cluster<'a>> {
        let mut consumed = vec![false; trips.len()];
        let mut clusters = Vec::new();

        for seed_idx in 0..trips.len() {
            if consumed[seed_idx] {
                continue;
            }

            let mut cluster = Cluster::seeded(trips[seed_idx]);
            consumed[seed_idx] = true;

            for idx in seed_idx + 1..trips.len() {
                if consumed[idx] {
                    continue;
                }
                if self.joins(&cluster, trips[idx]) {
                    cluster.members.push(trips[idx]);
                    consumed[idx] = true;
                }
            }

            clusters.push(cluster);
        }

        clusters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::test_support::{route_trip, trip_at};

    fn ids<'a>(clusters: &[Cluster<'a>]) -> Vec<Vec<&'a str>> {
        clusters.iter().map(|c| c.ride_ids()).collect()
    }

    fn run(trips: &[TripRecord]) -> Vec<Vec<String>> {
        let refs: Vec<&TripRecord> = trips.iter().collect();
        TemporalClusterer::default()
            .cluster(&refs)
            .iter()
            .map(|c| c.ride_ids().into_iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_empty_group_yields_no_clusters() {
        assert!(TemporalClusterer::default().cluster(&[]).is_empty());
    }

    #[test]
    fn test_single_trip_is_singleton_cluster() {
        assert_eq!(run(&[route_trip("a", "08:00")]), vec![vec!["a"]]);
    }

    #[test]
    fn test_chain_growth() {
        // 10:45 is 45 minutes from the seed but 25 from 10:20
        let trips = vec![
            route_trip("a", "10:00"),
            route_trip("b", "10:20"),
            route_trip("c", "10:45"),
        ];
        assert_eq!(run(&trips), vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let trips = vec![route_trip("a", "08:00"), route_trip("b", "08:30")];
        assert_eq!(run(&trips), vec![vec!["a", "b"]]);

        let trips = vec![route_trip("a", "08:00"), route_trip("b", "08:31")];
        assert_eq!(run(&trips), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn test_chain_only_grows_forward() {
        // c (10:45) is scanned before b (10:20) joins, so it is not reachable
        // through b during the seed's single pass
        let trips = vec![
            route_trip("a", "10:00"),
            route_trip("c", "10:45"),
            route_trip("b", "10:20"),
        ];
        assert_eq!(run(&trips), vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn test_earlier_trip_never_joins_later_seed() {
        // x (07:00) is seeded first and consumes nothing; y/z cluster later
        let trips = vec![
            route_trip("x", "07:00"),
            route_trip("y", "12:00"),
            route_trip("z", "12:10"),
        ];
        assert_eq!(run(&trips), vec![vec!["x"], vec!["y", "z"]]);
    }

    #[test]
    fn test_order_sensitivity_of_seed() {
        // A 09:00, B 09:25, C 09:50: with A first, B joins, then C joins via B
        let forward = vec![
            route_trip("A", "09:00"),
            route_trip("B", "09:25"),
            route_trip("C", "09:50"),
        ];
        assert_eq!(run(&forward), vec![vec!["A", "B", "C"]]);

        // A seeds but C is scanned before B: C misses, B joins, C starts its own
        let shuffled = vec![
            route_trip("A", "09:00"),
            route_trip("C", "09:50"),
            route_trip("B", "09:25"),
        ];
        assert_eq!(run(&shuffled), vec![vec!["A", "B"], vec!["C"]]);
    }

    #[test]
    fn test_midnight_does_not_wrap_by_default() {
        let trips = vec![
            trip_at("late", "A", "B", "2025-10-06", "23:50"),
            trip_at("early", "A", "B", "2025-10-07", "00:05"),
        ];
        assert_eq!(run(&trips), vec![vec!["late"], vec!["early"]]);
    }

    #[test]
    fn test_circular_policy_wraps_midnight() {
        let trips = vec![
            trip_at("late", "A", "B", "2025-10-06", "23:50"),
            trip_at("early", "A", "B", "2025-10-07", "00:05"),
        ];
        let refs: Vec<&TripRecord> = trips.iter().collect();
        let clusterer =
            TemporalClusterer::new(30, DistancePolicy::Circular, DatePolicy::IgnoreDate);
        assert_eq!(ids(&clusterer.cluster(&refs)), vec![vec!["late", "early"]]);
        assert_eq!(clusterer.distance(&trips[0], &trips[1]), Some(15));
    }

    #[test]
    fn test_date_ignored_by_default() {
        let trips = vec![
            trip_at("mon", "A", "B", "2025-10-06", "08:00"),
            trip_at("thu", "A", "B", "2025-10-09", "08:10"),
        ];
        assert_eq!(run(&trips), vec![vec!["mon", "thu"]]);
    }

    #[test]
    fn test_same_day_policy_separates_dates() {
        let trips = vec![
            trip_at("mon", "A", "B", "2025-10-06", "08:00"),
            trip_at("thu", "A", "B", "2025-10-09", "08:10"),
            trip_at("mon2", "A", "B", "2025-10-06", "08:20"),
        ];
        let refs: Vec<&TripRecord> = trips.iter().collect();
        let clusterer = TemporalClusterer::new(30, DistancePolicy::Linear, DatePolicy::SameDay);
        assert_eq!(
            ids(&clusterer.cluster(&refs)),
            vec![vec!["mon", "mon2"], vec!["thu"]]
        );
        assert_eq!(clusterer.distance(&trips[0], &trips[1]), None);
    }

    #[test]
    fn test_partition_covers_every_trip_once() {
        let trips: Vec<TripRecord> = ["06:00", "06:20", "09:00", "06:40", "23:59", "09:29", "13:00"]
            .iter()
            .enumerate()
            .map(|(i, t)| route_trip(&i.to_string(), t))
            .collect();
        let clusters = run(&trips);

        let mut seen: Vec<String> = clusters.into_iter().flatten().collect();
        seen.sort();
        let mut expected: Vec<String> = (0..trips.len()).map(|i| i.to_string()).collect();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_avg_minute_of_day() {
        let trips = vec![route_trip("a", "10:00"), route_trip("b", "10:15")];
        let refs: Vec<&TripRecord> = trips.iter().collect();
        let clusters = TemporalClusterer::default().cluster(&refs);
        assert_eq!(clusters[0].avg_minute_of_day(), 607.5);
        assert_eq!(clusters[0].route(), "Park Plaza -> Kendall T");
    }
}
