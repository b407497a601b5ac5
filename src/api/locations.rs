//! Location directory endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::{
        location::{CreateLocation, Location, LocationQuery, QrPayload, UpdateLocation},
        FormType,
    },
    AppState,
};

use super::AuthenticatedUser;

/// Query parameters for the QR payload
#[derive(Debug, Deserialize, IntoParams)]
pub struct QrQuery {
    /// Form variant, `individual` by default
    pub form_type: Option<FormType>,
}

/// List locations
#[utoipa::path(
    get,
    path = "/locations",
    tag = "locations",
    security(("bearer_auth" = [])),
    params(LocationQuery),
    responses(
        (status = 200, description = "Locations ordered by name", body = Vec<Location>)
    )
)]
pub async fn list_locations(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<Vec<Location>>> {
    claims.require_staff()?;

    let locations = state.services.locations.list(query.include_inactive).await?;
    Ok(Json(locations))
}

/// Get a location by code
#[utoipa::path(
    get,
    path = "/locations/{code}",
    tag = "locations",
    security(("bearer_auth" = [])),
    params(("code" = String, Path, description = "Location code")),
    responses(
        (status = 200, description = "Location details", body = Location),
        (status = 404, description = "Location not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_location(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(code): Path<String>,
) -> AppResult<Json<Location>> {
    claims.require_staff()?;

    let location = state.services.locations.get(&code).await?;
    Ok(Json(location))
}

/// Create a location
#[utoipa::path(
    post,
    path = "/locations",
    tag = "locations",
    security(("bearer_auth" = [])),
    request_body = CreateLocation,
    responses(
        (status = 201, description = "Location created", body = Location),
        (status = 400, description = "Invalid code or name", body = crate::error::ErrorResponse),
        (status = 409, description = "Code already in use", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_location(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateLocation>,
) -> AppResult<(StatusCode, Json<Location>)> {
    claims.require_admin()?;

    let location = state.services.locations.create(&data).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// Update a location
#[utoipa::path(
    put,
    path = "/locations/{code}",
    tag = "locations",
    security(("bearer_auth" = [])),
    params(("code" = String, Path, description = "Location code")),
    request_body = UpdateLocation,
    responses(
        (status = 200, description = "Location updated", body = Location),
        (status = 404, description = "Location not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_location(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(code): Path<String>,
    Json(data): Json<UpdateLocation>,
) -> AppResult<Json<Location>> {
    claims.require_admin()?;

    let location = state.services.locations.update(&code, &data).await?;
    Ok(Json(location))
}

/// Deactivate a location (its records are kept)
#[utoipa::path(
    delete,
    path = "/locations/{code}",
    tag = "locations",
    security(("bearer_auth" = [])),
    params(("code" = String, Path, description = "Location code")),
    responses(
        (status = 204, description = "Location deactivated"),
        (status = 404, description = "Location not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_location(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(code): Path<String>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.locations.delete(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Payload of the public check-in QR code for a location
#[utoipa::path(
    get,
    path = "/locations/{code}/qr",
    tag = "locations",
    security(("bearer_auth" = [])),
    params(("code" = String, Path, description = "Location code"), QrQuery),
    responses(
        (status = 200, description = "QR payload", body = QrPayload),
        (status = 404, description = "Location not found or inactive", body = crate::error::ErrorResponse)
    )
)]
pub async fn location_qr(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(code): Path<String>,
    Query(query): Query<QrQuery>,
) -> AppResult<Json<QrPayload>> {
    claims.require_admin()?;

    let form_type = query.form_type.unwrap_or(FormType::Individual);
    let payload = state.services.locations.qr_payload(&code, form_type).await?;
    Ok(Json(payload))
}
