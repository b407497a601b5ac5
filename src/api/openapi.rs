//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, locations, stats, visitors};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tourism Visitors API",
        version = "1.0.0",
        description = "Tourist site check-in logging and visitor statistics REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Locations
        locations::list_locations,
        locations::get_location,
        locations::create_location,
        locations::update_location,
        locations::delete_location,
        locations::location_qr,
        // Visitors
        visitors::list_visitors,
        visitors::get_visitor,
        visitors::create_visitor,
        visitors::qr_check_in,
        visitors::update_visitor,
        visitors::delete_visitor,
        visitors::export_visitors,
        // Stats
        stats::daily_stats,
        stats::monthly_stats,
        stats::period_report,
        stats::export_period_report,
        stats::available_years,
    ),
    components(
        schemas(
            // Locations
            crate::models::location::Location,
            crate::models::location::CreateLocation,
            crate::models::location::UpdateLocation,
            crate::models::location::QrPayload,
            crate::models::FormType,
            crate::models::Gender,
            // Visitors
            crate::models::visitor_record::VisitorRecord,
            crate::models::visitor_record::CreateVisitorRecord,
            crate::models::visitor_record::UpdateVisitorRecord,
            crate::models::visitor_record::QrCheckIn,
            crate::models::visitor_record::QrCheckInResponse,
            crate::models::RecordSource,
            crate::models::VisitorType,
            crate::engine::filter::RecordFilter,
            crate::engine::filter::RecordPage,
            crate::engine::filter::Pagination,
            // Stats
            stats::DailyQuery,
            stats::MonthlyQuery,
            stats::YearsResponse,
            crate::engine::aggregate::DailyStats,
            crate::engine::aggregate::LocationDailyStats,
            crate::engine::aggregate::MonthlyStats,
            crate::engine::aggregate::MonthlyEntry,
            crate::engine::aggregate::PeriodFilter,
            crate::engine::aggregate::PeriodReport,
            crate::engine::aggregate::PeriodStats,
            crate::engine::aggregate::PeriodTotals,
            crate::engine::aggregate::LocationBucket,
            crate::engine::aggregate::TypeBreakdown,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "locations", description = "Tourism location directory"),
        (name = "visitors", description = "Visitor check-in records"),
        (name = "stats", description = "Visitor statistics and reports")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
