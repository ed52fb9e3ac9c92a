//! Ridelink - re-identification risk analysis for anonymized bike-share trips
//!
//! Groups trips by route, clusters each route's trips by time of day with a
//! greedy chain-growth scan, grades every cluster's re-identification risk,
//! and produces a ranked per-trip result set.

pub mod aggregate;
pub mod cli;
pub mod clustering;
pub mod commuter;
pub mod config;
pub mod csv_output;
pub mod ingest;
pub mod json_output;
pub mod pipeline;
pub mod risk;
pub mod route_index;
pub mod summary;
pub mod trip;
pub mod uniqueness;
