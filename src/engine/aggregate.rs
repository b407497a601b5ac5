//! Grouping of check-in records into daily, monthly and period buckets

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, FixedOffset, NaiveDate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{
    directory::LocationDirectory,
    filter::{self, local_date, RecordFilter},
};
use crate::{
    error::{AppError, AppResult},
    models::{VisitorRecord, VisitorType},
};

// ---------------------------------------------------------------------------
// Daily
// ---------------------------------------------------------------------------

/// Counts for one location on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LocationDailyStats {
    pub location_code: String,
    pub location_name: String,
    /// Number of check-in records
    pub total_visits: i64,
    pub total_male: i64,
    pub total_female: i64,
    pub total_visitors: i64,
    /// Number of check-ins by international visitors
    pub international_visits: i64,
}

impl LocationDailyStats {
    fn empty(code: &str, directory: &LocationDirectory) -> Self {
        Self {
            location_code: code.to_string(),
            location_name: directory.display_name(code).to_string(),
            total_visits: 0,
            total_male: 0,
            total_female: 0,
            total_visitors: 0,
            international_visits: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub per_location: Vec<LocationDailyStats>,
}

/// Per-location counts for a single local date.
///
/// Every active location is reported, with zeros when it had no visits.
/// Inactive or unknown locations only show up when they have records that
/// day, so the sum over rows always equals the sum over matching records.
pub fn daily(
    records: &[VisitorRecord],
    directory: &LocationDirectory,
    date: NaiveDate,
    location_code: Option<&str>,
    offset: &FixedOffset,
) -> AppResult<DailyStats> {
    let location_code = location_code.map(|c| c.trim().to_uppercase());
    let location_code = location_code.as_deref();
    let mut rows: BTreeMap<String, LocationDailyStats> = BTreeMap::new();

    match location_code {
        Some(code) => {
            if !directory.contains(code) {
                return Err(AppError::LocationNotFound(code.to_string()));
            }
            rows.insert(code.to_string(), LocationDailyStats::empty(code, directory));
        }
        None => {
            for code in directory.active_codes() {
                rows.insert(code.to_string(), LocationDailyStats::empty(code, directory));
            }
        }
    }

    for record in records {
        if local_date(&record.check_in_time, offset) != date {
            continue;
        }
        if location_code.map_or(false, |code| !record.location_code.eq_ignore_ascii_case(code)) {
            continue;
        }
        let category = record.category()?;

        let row = rows
            .entry(record.location_code.clone())
            .or_insert_with(|| LocationDailyStats::empty(&record.location_code, directory));
        row.total_visits += 1;
        row.total_male += i64::from(record.male_count);
        row.total_female += i64::from(record.female_count);
        row.total_visitors += record.total_visitors();
        if category == VisitorType::International {
            row.international_visits += 1;
        }
    }

    Ok(DailyStats {
        date,
        per_location: rows.into_values().collect(),
    })
}

// ---------------------------------------------------------------------------
// Monthly
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthlyEntry {
    /// Calendar month, 1-12
    pub month: u32,
    /// Sum of male and female counts
    pub visitors: i64,
    /// Number of check-in records
    pub records: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlyStats {
    pub year: i32,
    pub total_visitors: i64,
    /// Active locations covered by the report
    pub total_locations: i64,
    /// Always twelve entries, January first
    pub monthly: Vec<MonthlyEntry>,
}

/// Visitor totals for each month of a year
pub fn monthly(
    records: &[VisitorRecord],
    directory: &LocationDirectory,
    year: i32,
    location_code: Option<&str>,
    offset: &FixedOffset,
) -> AppResult<MonthlyStats> {
    let location_code = location_code.map(|c| c.trim().to_uppercase());
    let location_code = location_code.as_deref();
    if let Some(code) = location_code {
        if !directory.contains(code) {
            return Err(AppError::LocationNotFound(code.to_string()));
        }
    }

    let mut months: Vec<MonthlyEntry> = (1..=12)
        .map(|month| MonthlyEntry {
            month,
            visitors: 0,
            records: 0,
        })
        .collect();

    for record in records {
        let day = local_date(&record.check_in_time, offset);
        if day.year() != year {
            continue;
        }
        if location_code.map_or(false, |code| !record.location_code.eq_ignore_ascii_case(code)) {
            continue;
        }
        record.category()?;

        let entry = &mut months[day.month0() as usize];
        entry.visitors += record.total_visitors();
        entry.records += 1;
    }

    let total_locations = match location_code {
        Some(code) => i64::from(directory.is_active(code)),
        None => directory.active_count() as i64,
    };

    Ok(MonthlyStats {
        year,
        total_visitors: months.iter().map(|m| m.visitors).sum(),
        total_locations,
        monthly: months,
    })
}

// ---------------------------------------------------------------------------
// Period report
// ---------------------------------------------------------------------------

/// Filter for the period ("rekap") report
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams, ToSchema)]
pub struct PeriodFilter {
    /// Restrict to one year
    pub year: Option<i32>,
    /// Restrict to one month (1-12), usually combined with `year`
    pub month: Option<u32>,
    pub location_code: Option<String>,
    /// `domestic`, `international`, or `all`
    pub visitor_type: Option<String>,
    /// First local date included (YYYY-MM-DD)
    pub date_from: Option<NaiveDate>,
    /// Last local date included (YYYY-MM-DD)
    pub date_to: Option<NaiveDate>,
}

impl PeriodFilter {
    pub fn record_filter(&self) -> RecordFilter {
        RecordFilter {
            location_code: self.location_code.clone(),
            date_from: self.date_from,
            date_to: self.date_to,
            visitor_type: self.visitor_type.clone(),
            page: None,
            page_size: None,
        }
    }

    fn matches_period(&self, day: NaiveDate) -> bool {
        self.year.map_or(true, |y| day.year() == y) && self.month.map_or(true, |m| day.month() == m)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct LocationBucket {
    /// Visitors at this location in the period
    pub total: i64,
    /// Check-in records at this location in the period
    pub records: i64,
}

/// Visitor sums by category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct TypeBreakdown {
    pub domestic: i64,
    pub international: i64,
}

impl TypeBreakdown {
    fn add(&mut self, category: VisitorType, visitors: i64) {
        match category {
            VisitorType::Domestic => self.domestic += visitors,
            VisitorType::International => self.international += visitors,
        }
    }
}

/// One calendar month of the period report
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PeriodStats {
    /// Sort key, `YYYY-MM`
    pub period: String,
    pub year: i32,
    pub month: u32,
    /// Human readable label, e.g. `January 2024`
    pub label: String,
    pub total_records: i64,
    pub total_visitors: i64,
    pub total_male: i64,
    pub total_female: i64,
    /// Location code to totals, in order of first appearance
    #[schema(value_type = Object)]
    pub per_location: IndexMap<String, LocationBucket>,
    pub per_type: TypeBreakdown,
}

impl PeriodStats {
    fn new(year: i32, month: u32) -> Self {
        let label = NaiveDate::from_ymd_opt(year, month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| format!("{:04}-{:02}", year, month));
        Self {
            period: format!("{:04}-{:02}", year, month),
            year,
            month,
            label,
            total_records: 0,
            total_visitors: 0,
            total_male: 0,
            total_female: 0,
            per_location: IndexMap::new(),
            per_type: TypeBreakdown::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct PeriodTotals {
    pub total_records: i64,
    pub total_visitors: i64,
    pub total_male: i64,
    pub total_female: i64,
    pub total_domestic: i64,
    pub total_international: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PeriodReport {
    /// Non-empty months, newest first
    pub periods: Vec<PeriodStats>,
    pub totals: PeriodTotals,
}

/// Group records by month, location and visitor type
pub fn period_report(
    records: &[VisitorRecord],
    filter: &PeriodFilter,
    offset: &FixedOffset,
) -> AppResult<PeriodReport> {
    if let Some(month) = filter.month {
        if !(1..=12).contains(&month) {
            return Err(AppError::Validation(format!("Invalid month {}", month)));
        }
    }

    let mut buckets: BTreeMap<(i32, u32), PeriodStats> = BTreeMap::new();

    // Newest first, so per-location order follows the most recent activity
    for record in filter::select(records, &filter.record_filter(), offset) {
        let day = local_date(&record.check_in_time, offset);
        if !filter.matches_period(day) {
            continue;
        }
        let category = record.category()?;
        let visitors = record.total_visitors();

        let stats = buckets
            .entry((day.year(), day.month()))
            .or_insert_with(|| PeriodStats::new(day.year(), day.month()));
        stats.total_records += 1;
        stats.total_visitors += visitors;
        stats.total_male += i64::from(record.male_count);
        stats.total_female += i64::from(record.female_count);

        let location = stats
            .per_location
            .entry(record.location_code.clone())
            .or_default();
        location.total += visitors;
        location.records += 1;

        stats.per_type.add(category, visitors);
    }

    let periods: Vec<PeriodStats> = buckets.into_values().rev().collect();

    let mut totals = PeriodTotals::default();
    for p in &periods {
        totals.total_records += p.total_records;
        totals.total_visitors += p.total_visitors;
        totals.total_male += p.total_male;
        totals.total_female += p.total_female;
        totals.total_domestic += p.per_type.domestic;
        totals.total_international += p.per_type.international;
    }

    tracing::debug!(periods = periods.len(), records = totals.total_records, "Built period report");

    Ok(PeriodReport { periods, totals })
}

// ---------------------------------------------------------------------------
// Years
// ---------------------------------------------------------------------------

/// Distinct local years with data, plus `current_year`, newest first
pub fn available_years(records: &[VisitorRecord], current_year: i32, offset: &FixedOffset) -> Vec<i32> {
    let mut years: BTreeSet<i32> = records
        .iter()
        .map(|r| local_date(&r.check_in_time, offset).year())
        .collect();
    years.insert(current_year);
    years.into_iter().rev().collect()
}
