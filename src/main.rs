use anyhow::{Context, Result};
use clap::Parser;
use ridelink::aggregate::{DetectionOutcome, ResultRow};
use ridelink::cli::{Cli, OutputFormat};
use ridelink::commuter::{CommuterProfile, RiderRouteProfile, TargetProfile};
use ridelink::csv_output::ResultCsvOutput;
use ridelink::ingest::{self, IngestReport};
use ridelink::json_output::{JsonInputStats, JsonReport};
use ridelink::pipeline;
use ridelink::summary::PatternSummary;
use ridelink::trip::TripRecord;
use ridelink::uniqueness::RouteUniqueness;
use std::fs;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

const RULE: &str = "================================================================================";

/// Initialize tracing subscriber; `--debug` raises the level to TRACE
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Render the result rows in the requested format
fn render_results(format: OutputFormat, rows: &[ResultRow], report: &IngestReport) -> Result<String> {
    let rendered = match format {
        OutputFormat::Csv => ResultCsvOutput::from_rows(rows).to_csv(),
        OutputFormat::Json => {
            let stats = JsonInputStats {
                rows_seen: report.rows_seen(),
                trips_parsed: report.trips.len(),
                rows_dropped: report.dropped,
            };
            let mut json = JsonReport::new(stats, rows)
                .to_json()
                .context("Failed to serialize JSON report")?;
            json.push('\n');
            json
        }
        OutputFormat::Text => {
            let mut out = PatternSummary::from_rows(rows).to_report_string();
            out.push('\n');
            for row in rows {
                out.push_str(&format!(
                    "[{}] {} x{} {} ({}) {} {} {} ride {}\n",
                    row.privacy_risk,
                    row.pattern_id,
                    row.trips_in_pattern,
                    row.pattern_type,
                    row.likely_same_person,
                    row.this_trip_date,
                    row.this_trip_day,
                    row.this_trip_time,
                    row.ride_id
                ));
            }
            out
        }
    };

    Ok(rendered)
}

fn print_repeated_routes(out: &mut dyn Write, profiles: &[RiderRouteProfile]) -> io::Result<()> {
    writeln!(out, "\nREPEATED ROUTE ANALYSIS")?;
    writeln!(out, "Riders with more than one trip: {}", profiles.len())?;
    for profile in profiles.iter().take(10) {
        writeln!(
            out,
            "Rider: {} (Member type: {})",
            profile.ride_id, profile.member_type
        )?;
        writeln!(out, "  Total trips: {}", profile.total_trips)?;
        writeln!(out, "  Unique routes: {}", profile.unique_routes)?;
        writeln!(out, "  Most frequent routes:")?;
        for (route, count) in &profile.top_routes {
            writeln!(
                out,
                "    {}: {} times ({:.1}%)",
                route,
                count,
                profile.share_percent(*count)
            )?;
        }
    }
    Ok(())
}

fn print_uniqueness(out: &mut dyn Write, analysis: &RouteUniqueness) -> io::Result<()> {
    writeln!(out, "\nUNIQUENESS ANALYSIS")?;
    writeln!(out, "Total unique routes: {}", analysis.unique_route_count())?;
    writeln!(
        out,
        "Routes taken <={} times: {} ({:.1}%)",
        analysis.rare_threshold,
        analysis.rare_routes.len(),
        analysis.rare_share_percent()
    )?;
    for route in analysis.rare_routes.iter().take(15) {
        let riders: Vec<&str> = route.riders.iter().take(3).map(String::as_str).collect();
        writeln!(out, "  {}", route.route)?;
        writeln!(
            out,
            "    Taken {} time(s) by: {}",
            route.trip_count,
            riders.join(", ")
        )?;
    }
    Ok(())
}

fn print_commuters(
    out: &mut dyn Write,
    profiles: &[CommuterProfile],
    trips: &[TripRecord],
) -> io::Result<()> {
    writeln!(out, "\nCOMMUTER PATTERN DETECTION")?;
    writeln!(out, "Riders with weekday commute habits: {}", profiles.len())?;
    for profile in profiles.iter().take(10) {
        writeln!(out, "Rider: {}", profile.ride_id)?;
        writeln!(out, "  Commute ratio: {:.1}%", profile.commute_ratio() * 100.0)?;
        writeln!(out, "  Morning commutes: {}", profile.morning_commutes)?;
        writeln!(out, "  Evening commutes: {}", profile.evening_commutes)?;
        writeln!(out, "  Member type: {}", profile.member_type)?;
        if let Some((route, count)) = &profile.typical_route {
            writeln!(out, "  Typical route: {} ({} times)", route, count)?;
        }
        if let Some((home, work)) = profile.likely_home_and_work(trips) {
            writeln!(out, "  Likely lives near '{}' and works near '{}'", home, work)?;
        }
    }
    Ok(())
}

fn print_target(out: &mut dyn Write, station: &str, matches: &[&TripRecord]) -> io::Result<()> {
    writeln!(out, "\nCROSS-REFERENCE ATTACK SIMULATION")?;
    writeln!(
        out,
        "Target profile: member with a weekday morning trip from '{}'",
        station
    )?;
    writeln!(out, "Found {} potential matches", matches.len())?;
    for trip in matches.iter().take(5) {
        writeln!(
            out,
            "  Rider: {}  {} -> {}",
            trip.ride_id(),
            trip.start_station(),
            trip.end_station()
        )?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = args.detection_config()?;
    tracing::debug!(?config, "resolved detection config");

    let report = ingest::read_trips_from_path(&args.input)?;
    tracing::info!(
        rows = report.rows_seen(),
        parsed = report.trips.len(),
        dropped = report.dropped,
        "loaded trip data"
    );

    // narration goes to stderr when the results themselves go to stdout
    let mut narration: Box<dyn Write> = if args.writes_to_stdout() {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };

    writeln!(narration, "{}", RULE)?;
    writeln!(narration, "DE-ANONYMIZATION ANALYSIS")?;
    writeln!(narration, "{}", RULE)?;
    writeln!(narration, "Total rows in dataset: {}", report.rows_seen())?;
    writeln!(narration, "Total riders: {}", report.rider_count())?;
    writeln!(narration, "Successfully parsed: {} trips", report.trips.len())?;
    if report.dropped > 0 {
        let reasons: Vec<String> = report
            .drop_reasons
            .iter()
            .map(|(reason, count)| format!("{}: {}", reason, count))
            .collect();
        writeln!(
            narration,
            "Skipped rows: {} ({})",
            report.dropped,
            reasons.join(", ")
        )?;
    }

    let outcome = pipeline::detect_patterns(&report.trips, &config);

    match &outcome {
        DetectionOutcome::NoPatterns => {
            eprintln!("No repeated patterns found.");
            eprintln!("Try adjusting thresholds or check if dataset has enough trips.");
        }
        DetectionOutcome::Patterns(rows) => {
            let rendered = render_results(args.format, rows, &report)?;
            if args.writes_to_stdout() {
                io::stdout().write_all(rendered.as_bytes())?;
            } else {
                fs::write(&args.output, rendered).with_context(|| {
                    format!("Failed to write results: {}", args.output.display())
                })?;
            }

            let summary = PatternSummary::from_rows(rows);
            writeln!(narration, "\n{}", summary.to_report_string())?;
            if !args.writes_to_stdout() {
                writeln!(narration, "Output saved to: {}", args.output.display())?;
            }
        }
    }

    if args.repeated_routes {
        let profiles = RiderRouteProfile::analyze(&report.trips);
        print_repeated_routes(narration.as_mut(), &profiles)?;
    }

    if args.uniqueness {
        let analysis = RouteUniqueness::analyze(&report.trips, args.rare_threshold);
        print_uniqueness(narration.as_mut(), &analysis)?;
    }

    if args.commuters {
        let profiles = CommuterProfile::detect(&report.trips, args.min_commutes);
        print_commuters(narration.as_mut(), &profiles, &report.trips)?;
    }

    if let Some(station) = &args.target_station {
        let matches = TargetProfile::new(station.as_str()).find_matches(&report.trips);
        print_target(narration.as_mut(), station, &matches)?;
    }

    narration.flush()?;
    Ok(())
}
