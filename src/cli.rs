//! CLI argument parsing for ridelink

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::commuter::DEFAULT_MIN_COMMUTES;
use crate::config::{DatePolicy, DetectionConfig, DistancePolicy};
use crate::uniqueness::DEFAULT_RARE_THRESHOLD;

/// Output format for detected patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// CSV, one row per linked trip (default)
    Csv,
    /// JSON report with summary and rows
    Json,
    /// Human-readable summary
    Text,
}

#[derive(Parser, Debug)]
#[command(name = "ridelink")]
#[command(version)]
#[command(about = "Find anonymous bike-share trips that likely belong to the same rider", long_about = None)]
pub struct Cli {
    /// Trip data CSV (ride_id, started_at, start_station_name, end_station_name, member_casual)
    #[arg(value_name = "TRIPS_CSV")]
    pub input: PathBuf,

    /// Where to write results ("-" for stdout)
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        default_value = "deanonymization_results.csv"
    )]
    pub output: PathBuf,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "csv")]
    pub format: OutputFormat,

    /// TOML file with detection thresholds (flags below override it)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Proximity window in minutes (default: 30)
    #[arg(long = "window", value_name = "MINUTES")]
    pub window: Option<u32>,

    /// Smallest cluster reported as a pattern (default: 2)
    #[arg(long = "min-size", value_name = "TRIPS")]
    pub min_size: Option<usize>,

    /// Cluster size rated HIGH risk (default: 3)
    #[arg(long = "high-threshold", value_name = "TRIPS")]
    pub high_threshold: Option<usize>,

    /// Cluster size rated CRITICAL risk (default: 4)
    #[arg(long = "critical-threshold", value_name = "TRIPS")]
    pub critical_threshold: Option<usize>,

    /// Measure time distance across midnight (23:50 and 00:05 are 15 minutes apart)
    #[arg(long = "circular-time")]
    pub circular_time: bool,

    /// Only link trips started on the same calendar date
    #[arg(long = "same-day")]
    pub same_day: bool,

    /// Also report riders who repeat the same routes
    #[arg(long = "repeated-routes")]
    pub repeated_routes: bool,

    /// Also report routes rare enough to identify a rider
    #[arg(long = "uniqueness")]
    pub uniqueness: bool,

    /// Trip count at or below which a route counts as rare
    #[arg(
        long = "rare-threshold",
        value_name = "TRIPS",
        default_value_t = DEFAULT_RARE_THRESHOLD
    )]
    pub rare_threshold: usize,

    /// Also report riders with weekday commute habits
    #[arg(long = "commuters")]
    pub commuters: bool,

    /// Minimum commute trips for a rider to be reported
    #[arg(
        long = "min-commutes",
        value_name = "TRIPS",
        default_value_t = DEFAULT_MIN_COMMUTES
    )]
    pub min_commutes: usize,

    /// Count members with a weekday morning trip from a station containing this text
    #[arg(long = "target-station", value_name = "TEXT")]
    pub target_station: Option<String>,

    /// Enable debug logging to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Resolve the detection config: defaults, then `--config`, then flags
    pub fn detection_config(&self) -> Result<DetectionConfig> {
        let mut config = match &self.config {
            Some(path) => DetectionConfig::from_toml(path)?,
            None => DetectionConfig::default(),
        };

        if let Some(window) = self.window {
            config.proximity_minutes = window;
        }
        if let Some(min_size) = self.min_size {
            config.min_pattern_size = min_size;
        }
        if let Some(high) = self.high_threshold {
            config.high_threshold = high;
        }
        if let Some(critical) = self.critical_threshold {
            config.critical_threshold = critical;
        }
        if self.circular_time {
            config.distance_policy = DistancePolicy::Circular;
        }
        if self.same_day {
            config.date_policy = DatePolicy::SameDay;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn writes_to_stdout(&self) -> bool {
        self.output.as_os_str() == "-"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_parses_input() {
        let cli = Cli::parse_from(["ridelink", "trips.csv"]);
        assert_eq!(cli.input, PathBuf::from("trips.csv"));
        assert_eq!(cli.output, PathBuf::from("deanonymization_results.csv"));
        assert_eq!(cli.format, OutputFormat::Csv);
        assert!(!cli.writes_to_stdout());
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(Cli::try_parse_from(["ridelink"]).is_err());
    }

    #[test]
    fn test_cli_stdout_output() {
        let cli = Cli::parse_from(["ridelink", "trips.csv", "-o", "-", "--format", "json"]);
        assert!(cli.writes_to_stdout());
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_defaults_give_default_config() {
        let cli = Cli::parse_from(["ridelink", "trips.csv"]);
        assert_eq!(cli.detection_config().unwrap(), DetectionConfig::default());
        assert_eq!(cli.rare_threshold, 3);
        assert_eq!(cli.min_commutes, 3);
    }

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::parse_from([
            "ridelink",
            "trips.csv",
            "--window",
            "20",
            "--critical-threshold",
            "6",
            "--circular-time",
            "--same-day",
        ]);
        let config = cli.detection_config().unwrap();
        assert_eq!(config.proximity_minutes, 20);
        assert_eq!(config.critical_threshold, 6);
        assert_eq!(config.distance_policy, DistancePolicy::Circular);
        assert_eq!(config.date_policy, DatePolicy::SameDay);
    }

    #[test]
    fn test_cli_flags_override_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "proximity_minutes = 45\nhigh_threshold = 4\ncritical_threshold = 6").unwrap();
        file.flush().unwrap();

        let cli = Cli::parse_from([
            "ridelink",
            "trips.csv",
            "--config",
            file.path().to_str().unwrap(),
            "--window",
            "10",
        ]);
        let config = cli.detection_config().unwrap();
        assert_eq!(config.proximity_minutes, 10);
        assert_eq!(config.high_threshold, 4);
        assert_eq!(config.critical_threshold, 6);
    }

    #[test]
    fn test_cli_rejects_invalid_thresholds() {
        let cli = Cli::parse_from(["ridelink", "trips.csv", "--min-size", "1"]);
        assert!(cli.detection_config().is_err());
    }
}
