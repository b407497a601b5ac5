//! Statistics endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    engine::{DailyStats, MonthlyStats, PeriodFilter, PeriodReport},
    error::AppResult,
    AppState,
};

use super::{AuthenticatedUser, CsvFile};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DailyQuery {
    /// Local date (YYYY-MM-DD), today by default
    pub date: Option<NaiveDate>,
    pub location_code: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct MonthlyQuery {
    /// Calendar year, the current one by default
    pub year: Option<i32>,
    pub location_code: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct YearsResponse {
    /// Newest first
    pub years: Vec<i32>,
}

/// Per-location counts for one day
#[utoipa::path(
    get,
    path = "/stats/daily",
    tag = "stats",
    security(("bearer_auth" = [])),
    params(DailyQuery),
    responses(
        (status = 200, description = "Daily statistics", body = DailyStats),
        (status = 404, description = "Unknown location", body = crate::error::ErrorResponse),
        (status = 422, description = "Stored record has an unknown visitor type", body = crate::error::ErrorResponse)
    )
)]
pub async fn daily_stats(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<DailyQuery>,
) -> AppResult<Json<DailyStats>> {
    claims.require_staff()?;

    let stats = state.services.stats.daily(query.date, query.location_code).await?;
    Ok(Json(stats))
}

/// Visitor totals for each month of a year
#[utoipa::path(
    get,
    path = "/stats/monthly",
    tag = "stats",
    security(("bearer_auth" = [])),
    params(MonthlyQuery),
    responses(
        (status = 200, description = "Monthly statistics", body = MonthlyStats),
        (status = 404, description = "Unknown location", body = crate::error::ErrorResponse)
    )
)]
pub async fn monthly_stats(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<MonthlyQuery>,
) -> AppResult<Json<MonthlyStats>> {
    claims.require_staff()?;

    let stats = state.services.stats.monthly(query.year, query.location_code).await?;
    Ok(Json(stats))
}

/// Records grouped by month, location and visitor type
#[utoipa::path(
    get,
    path = "/stats/periods",
    tag = "stats",
    security(("bearer_auth" = [])),
    params(PeriodFilter),
    responses(
        (status = 200, description = "Period report, newest month first", body = PeriodReport),
        (status = 400, description = "Invalid filter", body = crate::error::ErrorResponse)
    )
)]
pub async fn period_report(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(filter): Query<PeriodFilter>,
) -> AppResult<Json<PeriodReport>> {
    claims.require_staff()?;

    let report = state.services.stats.period_report(&filter).await?;
    Ok(Json(report))
}

/// Period report as CSV
#[utoipa::path(
    get,
    path = "/stats/periods/export",
    tag = "stats",
    security(("bearer_auth" = [])),
    params(PeriodFilter),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String)
    )
)]
pub async fn export_period_report(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(filter): Query<PeriodFilter>,
) -> AppResult<CsvFile> {
    claims.require_staff()?;

    let body = state.services.stats.export_period_csv(&filter).await?;
    let filename = format!(
        "visitor_report_{}.csv",
        state.services.stats.today().format("%Y%m%d")
    );
    Ok(CsvFile { filename, body })
}

/// Years that have data
#[utoipa::path(
    get,
    path = "/stats/years",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Available years", body = YearsResponse)
    )
)]
pub async fn available_years(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<YearsResponse>> {
    claims.require_staff()?;

    let years = state.services.stats.available_years().await?;
    Ok(Json(YearsResponse { years }))
}
