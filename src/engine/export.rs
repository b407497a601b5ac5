//! Tabular export of reports and record listings

use chrono::FixedOffset;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use indexmap::IndexSet;
use serde::Serialize;
use utoipa::ToSchema;

use super::{aggregate::PeriodReport, directory::LocationDirectory};
use crate::{
    error::{AppError, AppResult},
    models::{VisitorRecord, VisitorType},
};

/// Byte order mark so spreadsheet tools detect UTF-8
pub const UTF8_BOM: &str = "\u{FEFF}";

/// Columns present in every period export, before the per-location ones
pub const PERIOD_FIXED_HEADERS: [&str; 7] = [
    "Period",
    "Total Records",
    "Total Visitors",
    "Male",
    "Female",
    "Domestic",
    "International",
];

pub const RECORD_HEADERS: [&str; 10] = [
    "Date",
    "Time",
    "Location Code",
    "Location Name",
    "Visitor Name",
    "Male",
    "Female",
    "Total",
    "Type",
    "Notes",
];

/// Header row plus data rows, all cells already rendered as text
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Flatten a period report: fixed columns, then one column per location seen.
///
/// Dynamic headers are the directory's current display names, so renaming
/// a location changes the next export without touching the data.
pub fn period_table(report: &PeriodReport, directory: &LocationDirectory) -> ReportTable {
    // Pass 1: location codes in order of first appearance
    let mut codes: IndexSet<&str> = IndexSet::new();
    for period in &report.periods {
        for code in period.per_location.keys() {
            codes.insert(code.as_str());
        }
    }

    let mut headers: Vec<String> = PERIOD_FIXED_HEADERS.iter().map(|h| h.to_string()).collect();
    headers.extend(codes.iter().map(|code| directory.display_name(code).to_string()));

    // Pass 2: one row per period
    let rows = report
        .periods
        .iter()
        .map(|period| {
            let mut row = vec![
                period.label.clone(),
                period.total_records.to_string(),
                period.total_visitors.to_string(),
                period.total_male.to_string(),
                period.total_female.to_string(),
                period.per_type.domestic.to_string(),
                period.per_type.international.to_string(),
            ];
            row.extend(codes.iter().map(|code| {
                period
                    .per_location
                    .get(*code)
                    .map(|bucket| bucket.total)
                    .unwrap_or(0)
                    .to_string()
            }));
            row
        })
        .collect();

    ReportTable { headers, rows }
}

/// Flatten a record listing, one row per check-in
pub fn records_table(
    records: &[VisitorRecord],
    directory: &LocationDirectory,
    offset: &FixedOffset,
) -> AppResult<ReportTable> {
    let mut rows = Vec::with_capacity(records.len());

    for record in records {
        let local = record.check_in_time.with_timezone(offset);
        let type_label = match record.category()? {
            VisitorType::Domestic => "Domestic",
            VisitorType::International => "International",
        };
        let visitor_name = if record.visitor_name.trim().is_empty() {
            "-".to_string()
        } else {
            record.visitor_name.clone()
        };

        rows.push(vec![
            local.format("%Y-%m-%d").to_string(),
            local.format("%H:%M:%S").to_string(),
            record.location_code.clone(),
            directory.display_name(&record.location_code).to_string(),
            visitor_name,
            record.male_count.to_string(),
            record.female_count.to_string(),
            record.total_visitors().to_string(),
            type_label.to_string(),
            record
                .notes
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }

    Ok(ReportTable {
        headers: RECORD_HEADERS.iter().map(|h| h.to_string()).collect(),
        rows,
    })
}

/// Render a table as comma-separated text with every field quoted
pub fn to_csv(table: &ReportTable) -> AppResult<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(&table.headers)
        .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV flush failed: {}", e)))?;
    let body = String::from_utf8(bytes)
        .map_err(|e| AppError::Internal(format!("CSV is not UTF-8: {}", e)))?;

    Ok(format!("{}{}", UTF8_BOM, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::aggregate::{period_report, PeriodFilter};
    use crate::models::visitor_record::fixtures::record;

    fn wita() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    fn directory() -> LocationDirectory {
        LocationDirectory::new()
            .with("GB", "Gedung Balai", true)
            .with("PIP", "Pasar \"Terapung\", Lok Baintan", true)
            .with("MK", "Menara Pandang", true)
    }

    fn sample_records() -> Vec<VisitorRecord> {
        vec![
            record(1, "GB", 2, 1, "domestic", (2024, 1, 5, 2, 0)),
            record(2, "PIP", 0, 3, "international", (2024, 1, 6, 2, 0)),
            record(3, "MK", 1, 0, "domestic", (2024, 3, 1, 2, 0)),
            record(4, "GB", 0, 0, "domestic", (2024, 3, 2, 2, 0)),
        ]
    }

    fn parse(csv_text: &str) -> Vec<Vec<String>> {
        let body = csv_text.strip_prefix(UTF8_BOM).expect("missing BOM");
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(body.as_bytes());
        reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_period_table_dynamic_columns() {
        let report = period_report(&sample_records(), &PeriodFilter::default(), &wita()).unwrap();
        let table = period_table(&report, &directory());

        assert_eq!(
            &table.headers[7..],
            &["Gedung Balai", "Menara Pandang", "Pasar \"Terapung\", Lok Baintan"]
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], "March 2024");
        // PIP had no visits in March
        assert_eq!(table.rows[0][9], "0");
        assert_eq!(table.rows[1][7..], ["3", "0", "3"]);
    }

    #[test]
    fn test_headers_follow_directory_renames() {
        let report = period_report(&sample_records(), &PeriodFilter::default(), &wita()).unwrap();
        let renamed = directory().with("GB", "Balai Kota", true);
        let table = period_table(&report, &renamed);
        assert_eq!(table.headers[7], "Balai Kota");
    }

    #[test]
    fn test_csv_quotes_everything_and_starts_with_bom() {
        let table = ReportTable {
            headers: vec!["a".into(), "b".into()],
            rows: vec![vec!["say \"hi\"".into(), "x,y".into()]],
        };
        let text = to_csv(&table).unwrap();
        assert_eq!(text, "\u{FEFF}\"a\",\"b\"\n\"say \"\"hi\"\"\",\"x,y\"\n");
    }

    #[test]
    fn test_csv_round_trip_reproduces_counts() {
        let report = period_report(&sample_records(), &PeriodFilter::default(), &wita()).unwrap();
        let table = period_table(&report, &directory());
        let rows = parse(&to_csv(&table).unwrap());

        assert_eq!(rows[0], table.headers);
        for (period, row) in report.periods.iter().zip(&rows[1..]) {
            assert_eq!(row[0], period.label);
            assert_eq!(row[1].parse::<i64>().unwrap(), period.total_records);
            assert_eq!(row[2].parse::<i64>().unwrap(), period.total_visitors);
            assert_eq!(row[3].parse::<i64>().unwrap(), period.total_male);
            assert_eq!(row[4].parse::<i64>().unwrap(), period.total_female);
            assert_eq!(row[5].parse::<i64>().unwrap(), period.per_type.domestic);
            assert_eq!(row[6].parse::<i64>().unwrap(), period.per_type.international);
            let per_location: i64 = row[7..].iter().map(|c| c.parse::<i64>().unwrap()).sum();
            assert_eq!(per_location, period.total_visitors);
        }
    }

    #[test]
    fn test_empty_report_has_only_fixed_headers() {
        let report = period_report(&[], &PeriodFilter::default(), &wita()).unwrap();
        let table = period_table(&report, &directory());
        assert_eq!(table.headers.len(), PERIOD_FIXED_HEADERS.len());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_records_table_uses_local_time() {
        let mut records = vec![record(1, "GB", 2, 1, "international", (2024, 1, 5, 17, 30))];
        records[0].visitor_name = String::new();
        let table = records_table(&records, &directory(), &wita()).unwrap();
        assert_eq!(
            table.rows[0],
            vec![
                "2024-01-06", "01:30:00", "GB", "Gedung Balai", "-", "2", "1", "3",
                "International", "-",
            ]
        );
    }
}
