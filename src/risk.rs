//! Re-identification risk tiers
//!
//! Maps a cluster's size to a tier and a confidence label. Sizes below the
//! minimum pattern size carry no linkage signal and are not classified.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::DetectionConfig;

/// Risk tier of a pattern, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Medium,
    High,
    Critical,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
            RiskTier::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strongly the trips of a pattern are believed to share one rider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    #[serde(rename = "High Confidence")]
    HighConfidence,
    #[serde(rename = "Probable")]
    Probable,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::HighConfidence => "High Confidence",
            Confidence::Probable => "Probable",
        }
    }

    /// Value of the `Likely_Same_Person` column
    pub fn likely_same_person(&self) -> String {
        format!("YES - {}", self.as_str())
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tier and confidence assigned to one cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskAssessment {
    pub tier: RiskTier,
    pub confidence: Confidence,
}

/// Pure size → risk mapping with configurable cut-offs
#[derive(Debug, Clone, Copy)]
pub struct RiskClassifier {
    min_pattern_size: usize,
    high_threshold: usize,
    critical_threshold: usize,
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}

impl RiskClassifier {
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            min_pattern_size: config.min_pattern_size,
            high_threshold: config.high_threshold,
            critical_threshold: config.critical_threshold,
        }
    }

    /// Classify a cluster size; `None` means the cluster is not a pattern
    pub fn classify(&self, size: usize) -> Option<RiskAssessment> {
        let (tier, confidence) = if size >= self.critical_threshold {
            (RiskTier::Critical, Confidence::HighConfidence)
        } else if size >= self.high_threshold {
            (RiskTier::High, Confidence::HighConfidence)
        } else if size >= self.min_pattern_size {
            (RiskTier::Medium, Confidence::Probable)
        } else {
            return None;
        };

        Some(RiskAssessment { tier, confidence })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tiers() {
        let classifier = RiskClassifier::default();

        assert_eq!(classifier.classify(0), None);
        assert_eq!(classifier.classify(1), None);

        let medium = classifier.classify(2).unwrap();
        assert_eq!(medium.tier, RiskTier::Medium);
        assert_eq!(medium.confidence, Confidence::Probable);

        let high = classifier.classify(3).unwrap();
        assert_eq!(high.tier, RiskTier::High);
        assert_eq!(high.confidence, Confidence::HighConfidence);

        for size in [4, 5, 50] {
            let critical = classifier.classify(size).unwrap();
            assert_eq!(critical.tier, RiskTier::Critical);
            assert_eq!(critical.confidence, Confidence::HighConfidence);
        }
    }

    #[test]
    fn test_custom_thresholds() {
        let config = DetectionConfig {
            min_pattern_size: 3,
            high_threshold: 5,
            critical_threshold: 8,
            ..DetectionConfig::default()
        };
        let classifier = RiskClassifier::from_config(&config);

        assert_eq!(classifier.classify(2), None);
        assert_eq!(classifier.classify(4).unwrap().tier, RiskTier::Medium);
        assert_eq!(classifier.classify(7).unwrap().tier, RiskTier::High);
        assert_eq!(classifier.classify(8).unwrap().tier, RiskTier::Critical);
    }

    #[test]
    fn test_labels() {
        assert_eq!(RiskTier::Critical.to_string(), "CRITICAL");
        assert_eq!(
            Confidence::HighConfidence.likely_same_person(),
            "YES - High Confidence"
        );
        assert_eq!(Confidence::Probable.likely_same_person(), "YES - Probable");
    }

    #[test]
    fn test_tier_ordering() {
        assert!(RiskTier::Critical > RiskTier::High);
        assert!(RiskTier::High > RiskTier::Medium);
    }
}
