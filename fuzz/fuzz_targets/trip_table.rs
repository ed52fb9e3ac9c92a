#![no_main]

use libfuzzer_sys::fuzz_target;
use ridelink::config::DetectionConfig;
use ridelink::ingest::read_trips;
use ridelink::pipeline::detect_patterns;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as a trip table: ingestion must skip bad rows, never panic
    if let Ok(report) = read_trips(data) {
        let outcome = detect_patterns(&report.trips, &DetectionConfig::default());
        assert!(outcome.rows().iter().all(|r| r.trips_in_pattern >= 2));
    }
});
