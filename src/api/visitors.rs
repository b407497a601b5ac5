//! Visitor record endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    engine::{RecordFilter, RecordPage},
    error::AppResult,
    models::visitor_record::{
        CreateVisitorRecord, QrCheckIn, QrCheckInResponse, UpdateVisitorRecord, VisitorRecord,
    },
    AppState,
};

use super::{AuthenticatedUser, CsvFile};

/// List visitor records, newest first
#[utoipa::path(
    get,
    path = "/visitors",
    tag = "visitors",
    security(("bearer_auth" = [])),
    params(RecordFilter),
    responses(
        (status = 200, description = "Page of visitor records", body = RecordPage),
        (status = 400, description = "Invalid filter", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_visitors(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(filter): Query<RecordFilter>,
) -> AppResult<Json<RecordPage>> {
    claims.require_staff()?;

    let page = state.services.visitors.list(&filter).await?;
    Ok(Json(page))
}

/// Get a visitor record by ID
#[utoipa::path(
    get,
    path = "/visitors/{id}",
    tag = "visitors",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Record ID")),
    responses(
        (status = 200, description = "Visitor record", body = VisitorRecord),
        (status = 404, description = "Record not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_visitor(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<VisitorRecord>> {
    claims.require_staff()?;

    let record = state.services.visitors.get(id).await?;
    Ok(Json(record))
}

/// Record a check-in
#[utoipa::path(
    post,
    path = "/visitors",
    tag = "visitors",
    security(("bearer_auth" = [])),
    request_body = CreateVisitorRecord,
    responses(
        (status = 201, description = "Record created", body = VisitorRecord),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown or inactive location", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_visitor(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateVisitorRecord>,
) -> AppResult<(StatusCode, Json<VisitorRecord>)> {
    claims.require_staff()?;

    let record = state.services.visitors.create(&data).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Public check-in from a location's QR form
#[utoipa::path(
    post,
    path = "/visitors/qr",
    tag = "visitors",
    request_body = QrCheckIn,
    responses(
        (status = 201, description = "Check-in recorded", body = QrCheckInResponse),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown or inactive location", body = crate::error::ErrorResponse)
    )
)]
pub async fn qr_check_in(
    State(state): State<AppState>,
    Json(form): Json<QrCheckIn>,
) -> AppResult<(StatusCode, Json<QrCheckInResponse>)> {
    let response = state.services.visitors.create_from_qr(&form).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Edit a visitor record
#[utoipa::path(
    put,
    path = "/visitors/{id}",
    tag = "visitors",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Record ID")),
    request_body = UpdateVisitorRecord,
    responses(
        (status = 200, description = "Record updated", body = VisitorRecord),
        (status = 404, description = "Record or location not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_visitor(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(data): Json<UpdateVisitorRecord>,
) -> AppResult<Json<VisitorRecord>> {
    claims.require_staff()?;

    let record = state.services.visitors.update(id, &data).await?;
    Ok(Json(record))
}

/// Delete a visitor record
#[utoipa::path(
    delete,
    path = "/visitors/{id}",
    tag = "visitors",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Record ID")),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 403, description = "Administrator role required", body = crate::error::ErrorResponse),
        (status = 404, description = "Record not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_visitor(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.visitors.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Export every matching record as CSV
#[utoipa::path(
    get,
    path = "/visitors/export",
    tag = "visitors",
    security(("bearer_auth" = [])),
    params(RecordFilter),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String)
    )
)]
pub async fn export_visitors(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(filter): Query<RecordFilter>,
) -> AppResult<CsvFile> {
    claims.require_staff()?;

    let body = state.services.visitors.export_csv(&filter).await?;
    let filename = format!(
        "visitors_{}.csv",
        state.services.stats.today().format("%Y%m%d")
    );
    Ok(CsvFile { filename, body })
}
