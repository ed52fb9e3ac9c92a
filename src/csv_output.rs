//! CSV output format for de-anonymization results
//!
//! One line per linked trip, in the column order spreadsheet users of the
//! published analysis expect.

use crate::aggregate::ResultRow;

/// Column header, in output order
pub const RESULT_COLUMNS: [&str; 15] = [
    "Pattern_ID",
    "Trips_In_Pattern",
    "Privacy_Risk",
    "Likely_Same_Person",
    "Pattern_Type",
    "Route",
    "Start_Station",
    "End_Station",
    "Avg_Time_Window",
    "This_Trip_Date",
    "This_Trip_Time",
    "This_Trip_Day",
    "Ride_ID",
    "Member_Type",
    "De_Anonymization_Method",
];

/// CSV output formatter
#[derive(Debug, Default)]
pub struct ResultCsvOutput {
    rows: Vec<ResultRow>,
}

impl ResultCsvOutput {
    /// Create a new CSV output formatter
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: &[ResultRow]) -> Self {
        Self {
            rows: rows.to_vec(),
        }
    }

    pub fn add_row(&mut self, row: ResultRow) {
        self.rows.push(row);
    }

    fn header(&self) -> String {
        RESULT_COLUMNS.join(",")
    }

    /// Escape CSV field (RFC 4180: commas, quotes, CR and LF force quoting)
    fn escape_field(field: &str) -> String {
        if field.contains(&[',', '"', '\n', '\r'][..]) {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn format_row(&self, row: &ResultRow) -> String {
        let fields = [
            Self::escape_field(&row.pattern_id),
            row.trips_in_pattern.to_string(),
            row.privacy_risk.to_string(),
            Self::escape_field(&row.likely_same_person),
            row.pattern_type.to_string(),
            Self::escape_field(&row.route),
            Self::escape_field(&row.start_station),
            Self::escape_field(&row.end_station),
            row.avg_time_window.clone(),
            row.this_trip_date.clone(),
            row.this_trip_time.clone(),
            row.this_trip_day.clone(),
            Self::escape_field(&row.ride_id),
            row.member_type.to_string(),
            Self::escape_field(&row.de_anonymization_method),
        ];

        fields.join(",")
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.header());
        output.push('\n');

        for row in &self.rows {
            output.push_str(&self.format_row(row));
            output.push('\n');
        }

        output
    }
}
