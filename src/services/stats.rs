//! Visitor statistics service

use chrono::{Datelike, FixedOffset, NaiveDate, Utc};

use super::locations::LocationsService;
use crate::{
    engine::{
        aggregate::{self, DailyStats, MonthlyStats, PeriodFilter, PeriodReport},
        export,
    },
    error::AppResult,
    models::VisitorType,
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
    locations: LocationsService,
    offset: FixedOffset,
}

fn normalize_code(code: Option<String>) -> Option<String> {
    code.map(|c| c.trim().to_uppercase()).filter(|c| !c.is_empty())
}

impl StatsService {
    pub fn new(repository: Repository, locations: LocationsService, offset: FixedOffset) -> Self {
        Self {
            repository,
            locations,
            offset,
        }
    }

    /// Current date in the reporting timezone
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }

    /// Per-location counts for one day, today by default
    pub async fn daily(&self, date: Option<NaiveDate>, location_code: Option<String>) -> AppResult<DailyStats> {
        let date = date.unwrap_or_else(|| self.today());
        let location_code = normalize_code(location_code);

        let records = self.repository.records.list_all().await?;
        let directory = self.locations.directory().await?;
        aggregate::daily(&records, &directory, date, location_code.as_deref(), &self.offset)
    }

    /// Month-by-month totals for a year, the current year by default
    pub async fn monthly(&self, year: Option<i32>, location_code: Option<String>) -> AppResult<MonthlyStats> {
        let year = year.unwrap_or_else(|| self.today().year());
        let location_code = normalize_code(location_code);

        let records = self.repository.records.list_all().await?;
        let directory = self.locations.directory().await?;
        aggregate::monthly(&records, &directory, year, location_code.as_deref(), &self.offset)
    }

    pub async fn period_report(&self, filter: &PeriodFilter) -> AppResult<PeriodReport> {
        let filter = self.normalize_filter(filter)?;
        let records = self.repository.records.list_all().await?;
        aggregate::period_report(&records, &filter, &self.offset)
    }

    /// Period report flattened to CSV, one row per month
    pub async fn export_period_csv(&self, filter: &PeriodFilter) -> AppResult<String> {
        let report = self.period_report(filter).await?;
        let directory = self.locations.directory().await?;
        let table = export::period_table(&report, &directory);
        tracing::debug!(rows = table.rows.len(), columns = table.headers.len(), "Exporting period report");
        export::to_csv(&table)
    }

    /// Years with recorded visits, always including the current one
    pub async fn available_years(&self) -> AppResult<Vec<i32>> {
        let records = self.repository.records.list_all().await?;
        Ok(aggregate::available_years(&records, self.today().year(), &self.offset))
    }

    fn normalize_filter(&self, filter: &PeriodFilter) -> AppResult<PeriodFilter> {
        let mut filter = filter.clone();
        filter.location_code = normalize_code(filter.location_code);
        if let Some(vt) = filter.record_filter().type_constraint() {
            vt.parse::<VisitorType>()?;
        }
        Ok(filter)
    }
}
