//! Explicit detection stages
//!
//! Trips flow strictly forward:
//! `RouteIndex` → `TemporalClusterer` → `RiskClassifier` → `ResultAggregator`.
//! Every stage returns data; nothing here reads files or prints.

use crate::aggregate::{DetectionOutcome, ResultAggregator};
use crate::clustering::{Cluster, TemporalClusterer};
use crate::config::DetectionConfig;
use crate::route_index::RouteIndex;
use crate::trip::TripRecord;

/// Cluster every route group, in route first-seen order then discovery order
pub fn cluster_routes<'a>(
    index: &RouteIndex<'a>,
    clusterer: &TemporalClusterer,
) -> Vec<Cluster<'a>> {
    index
        .iter()
        .flat_map(|group| clusterer.cluster(&group.trips))
        .collect()
}

/// Run the full detection pipeline over one batch of trips
///
/// # Example
/// ```
/// use ridelink::config::DetectionConfig;
/// use ridelink::pipeline::detect_patterns;
///
/// let outcome = detect_patterns(&[], &DetectionConfig::default());
/// assert!(outcome.is_no_patterns());
/// ```
pub fn detect_patterns(trips: &[TripRecord], config: &DetectionConfig) -> DetectionOutcome {
    let index = RouteIndex::build(trips);
    let clusters = cluster_routes(&index, &TemporalClusterer::from_config(config));

    tracing::debug!(
        routes = index.len(),
        clusters = clusters.len(),
        "clustered route groups"
    );

    ResultAggregator::from_config(config).aggregate(&clusters)
}
