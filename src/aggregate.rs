//! Expansion of qualifying clusters into ranked per-trip result rows

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clustering::Cluster;
use crate::config::DetectionConfig;
use crate::risk::{RiskClassifier, RiskTier};
use crate::trip::{format_minute_of_day, MemberType};

/// Time-of-day interpretation of a cluster's average start time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternType {
    #[serde(rename = "Morning Commute")]
    MorningCommute,
    #[serde(rename = "Evening Commute")]
    EveningCommute,
    #[serde(rename = "Regular Pattern")]
    RegularPattern,
}

impl PatternType {
    /// 06–09h is a morning commute, 16–19h an evening commute (inclusive)
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=9 => PatternType::MorningCommute,
            16..=19 => PatternType::EveningCommute,
            _ => PatternType::RegularPattern,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::MorningCommute => "Morning Commute",
            PatternType::EveningCommute => "Evening Commute",
            PatternType::RegularPattern => "Regular Pattern",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One trip of one qualifying cluster, carrying the cluster-level fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(rename = "Pattern_ID")]
    pub pattern_id: String,
    #[serde(rename = "Trips_In_Pattern")]
    pub trips_in_pattern: usize,
    #[serde(rename = "Privacy_Risk")]
    pub privacy_risk: RiskTier,
    #[serde(rename = "Likely_Same_Person")]
    pub likely_same_person: String,
    #[serde(rename = "Pattern_Type")]
    pub pattern_type: PatternType,
    #[serde(rename = "Route")]
    pub route: String,
    #[serde(rename = "Start_Station")]
    pub start_station: String,
    #[serde(rename = "End_Station")]
    pub end_station: String,
    #[serde(rename = "Avg_Time_Window")]
    pub avg_time_window: String,
    #[serde(rename = "This_Trip_Date")]
    pub this_trip_date: String,
    #[serde(rename = "This_Trip_Time")]
    pub this_trip_time: String,
    #[serde(rename = "This_Trip_Day")]
    pub this_trip_day: String,
    #[serde(rename = "Ride_ID")]
    pub ride_id: String,
    #[serde(rename = "Member_Type")]
    pub member_type: MemberType,
    #[serde(rename = "De_Anonymization_Method")]
    pub de_anonymization_method: String,
}

/// Terminal state of a detection run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionOutcome {
    /// At least one qualifying cluster; rows ranked by pattern size
    Patterns(Vec<ResultRow>),
    /// No cluster reached the minimum pattern size anywhere
    NoPatterns,
}

impl DetectionOutcome {
    pub fn rows(&self) -> &[ResultRow] {
        match self {
            DetectionOutcome::Patterns(rows) => rows,
            DetectionOutcome::NoPatterns => &[],
        }
    }

    pub fn is_no_patterns(&self) -> bool {
        matches!(self, DetectionOutcome::NoPatterns)
    }

    pub fn into_rows(self) -> Option<Vec<ResultRow>> {
        match self {
            DetectionOutcome::Patterns(rows) => Some(rows),
            DetectionOutcome::NoPatterns => None,
        }
    }
}

/// Builds the ranked result set from all routes' clusters
#[derive(Debug, Clone, Copy)]
pub struct ResultAggregator {
    classifier: RiskClassifier,
    proximity_minutes: u32,
    pattern_id_prefix_len: usize,
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}

impl ResultAggregator {
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            classifier: RiskClassifier::from_config(config),
            proximity_minutes: config.proximity_minutes,
            pattern_id_prefix_len: config.pattern_id_prefix_len,
        }
    }

    /// `Pattern_ID`: route-key prefix plus the `HH:MM` average window
    pub fn pattern_id(&self, route: &str, avg_time_window: &str) -> String {
        let prefix: String = route.chars().take(self.pattern_id_prefix_len).collect();
        format!("{}|{}", prefix, avg_time_window)
    }

    /// Append the rows of one cluster; returns false when it does not qualify
    pub fn push_cluster(&self, cluster: &Cluster<'_>, rows: &mut Vec<ResultRow>) -> bool {
        let size = cluster.size();
        let Some(risk) = self.classifier.classify(size) else {
            return false;
        };

        // truncate, not round: 607.5 minutes is 10:07
        let avg_minute = cluster.avg_minute_of_day().floor() as u32;
        let avg_time_window = format_minute_of_day(avg_minute);
        let pattern_type = PatternType::from_hour(avg_minute / 60);
        let pattern_id = self.pattern_id(cluster.route(), &avg_time_window);
        let likely_same_person = risk.confidence.likely_same_person();
        let method = format!(
            "{} trips on same route within {}min window",
            size, self.proximity_minutes
        );

        rows.extend(cluster.members().iter().map(|trip| ResultRow {
            pattern_id: pattern_id.clone(),
            trips_in_pattern: size,
            privacy_risk: risk.tier,
            likely_same_person: likely_same_person.clone(),
            pattern_type,
            route: trip.route_key().to_string(),
            start_station: trip.start_station().to_string(),
            end_station: trip.end_station().to_string(),
            avg_time_window: avg_time_window.clone(),
            this_trip_date: trip.date_string(),
            this_trip_time: trip.time_string(),
            this_trip_day: trip.day_name().to_string(),
            ride_id: trip.ride_id().to_string(),
            member_type: trip.member_type(),
            de_anonymization_method: method.clone(),
        }));

        true
    }

    /// Expand clusters in the given order and rank rows by pattern size
    ///
    /// The sort is stable: rows of equal size keep route order, then cluster
    /// discovery order, then member order.
    pub fn aggregate(&self, clusters: &[Cluster<'_>]) -> DetectionOutcome {
        let mut rows = Vec::new();
        let mut qualifying = 0usize;

        for cluster in clusters {
            if self.push_cluster(cluster, &mut rows) {
                qualifying += 1;
            }
        }

        rows.sort_by(|a, b| b.trips_in_pattern.cmp(&a.trips_in_pattern));

        tracing::debug!(
            patterns = qualifying,
            rows = rows.len(),
            "aggregated qualifying clusters"
        );

        if rows.is_empty() {
            DetectionOutcome::NoPatterns
        } else {
            DetectionOutcome::Patterns(rows)
        }
    }
}
