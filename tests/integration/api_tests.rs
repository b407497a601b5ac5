//! API integration tests
//!
//! The full router is driven in-process over the in-memory stores.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderMap, Method, Request, StatusCode,
    },
    Router,
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use tourism_visitors_server::{
    api,
    config::AppConfig,
    models::{
        location::CreateLocation, user::UserClaims, visitor_record::NewVisitorRecord, RecordSource,
        Role, VisitorType,
    },
    repository::Repository,
    services::Services,
    AppState,
};

struct TestApp {
    router: Router,
    repository: Repository,
    staff: String,
    admin: String,
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response is not JSON")
    }

    fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("response is not UTF-8")
    }
}

fn token(secret: &str, role: Role) -> String {
    let now = Utc::now();
    UserClaims {
        sub: "petugas".to_string(),
        role,
        exp: (now + Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
    }
    .create_token(secret)
    .expect("Failed to sign token")
}

async fn test_app() -> TestApp {
    let config = AppConfig::default();
    let repository = Repository::in_memory();
    let offset = config.reporting.offset().unwrap();
    let services = Services::new(repository.clone(), offset, config.server.public_base_url.clone());

    for (code, name) in [
        ("GB", "Gedung Balai"),
        ("MSJ", "Masjid Sultan Suriansyah"),
        ("PIP", "Pasar Terapung"),
    ] {
        repository
            .locations
            .insert(
                code,
                &CreateLocation {
                    code: code.to_string(),
                    name: name.to_string(),
                    address: None,
                },
            )
            .await
            .unwrap();
    }

    let staff = token(&config.auth.jwt_secret, Role::Staff);
    let admin = token(&config.auth.jwt_secret, Role::Admin);
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    TestApp {
        router: api::router(state),
        repository,
        staff,
        admin,
    }
}

/// Insert a record checked in at a fixed UTC time
async fn seed(
    app: &TestApp,
    code: &str,
    male: i32,
    female: i32,
    visitor_type: VisitorType,
    at: (i32, u32, u32, u32, u32),
) {
    let (y, mo, d, h, mi) = at;
    app.repository
        .records
        .insert(&NewVisitorRecord {
            record_uuid: Uuid::new_v4(),
            location_code: code.to_string(),
            visitor_name: "Rombongan".to_string(),
            male_count: male,
            female_count: female,
            visitor_type,
            check_in_time: Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap(),
            notes: None,
            source: RecordSource::Manual,
        })
        .await
        .unwrap();
}

async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    TestResponse {
        status,
        headers,
        body,
    }
}

/// Seed the March 2024 scenario used by the statistics tests
async fn seed_march(app: &TestApp) {
    // 2024-03-10 09:00 WITA
    seed(app, "GB", 3, 2, VisitorType::Domestic, (2024, 3, 10, 1, 0)).await;
    // 2024-03-10 13:00 WITA
    seed(app, "GB", 1, 0, VisitorType::International, (2024, 3, 10, 5, 0)).await;
    // 2024-03-10 01:00 WITA, still the previous day in UTC
    seed(app, "PIP", 0, 4, VisitorType::Domestic, (2024, 3, 9, 17, 0)).await;
    // 2024-03-11 00:30 WITA
    seed(app, "PIP", 2, 2, VisitorType::Domestic, (2024, 3, 10, 16, 30)).await;
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app().await;

    let response = send(&app, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "healthy");

    let response = send(&app, Method::GET, "/api/v1/ready", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "ready");
}

#[tokio::test]
async fn test_requires_bearer_token() {
    let app = test_app().await;

    let response = send(&app, Method::GET, "/api/v1/visitors", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = send(&app, Method::GET, "/api/v1/visitors", Some("not-a-jwt"), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_visitor_unknown_location() {
    let app = test_app().await;
    let before = app.repository.records.count().await.unwrap();

    let response = send(
        &app,
        Method::POST,
        "/api/v1/visitors",
        Some(&app.staff),
        Some(json!({
            "location_code": "ZZ",
            "visitor_name": "Budi",
            "male_count": 1,
            "female_count": 0
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["error"], "NoSuchLocation");
    assert_eq!(app.repository.records.count().await.unwrap(), before);
}

#[tokio::test]
async fn test_create_and_get_visitor() {
    let app = test_app().await;

    let response = send(
        &app,
        Method::POST,
        "/api/v1/visitors",
        Some(&app.staff),
        Some(json!({
            "location_code": "gb",
            "visitor_name": "Budi",
            "male_count": 2,
            "female_count": 1,
            "visitor_type": "international"
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let created = response.json();
    assert_eq!(created["location_code"], "GB");
    assert_eq!(created["location_name"], "Gedung Balai");

    let id = created["id"].as_i64().unwrap();
    let response = send(&app, Method::GET, &format!("/api/v1/visitors/{}", id), Some(&app.staff), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["visitor_type"], "international");
}

#[tokio::test]
async fn test_create_visitor_rejects_negative_count() {
    let app = test_app().await;

    let response = send(
        &app,
        Method::POST,
        "/api/v1/visitors",
        Some(&app.staff),
        Some(json!({
            "location_code": "GB",
            "male_count": -1,
            "female_count": 2
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.repository.records.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_list_page_past_end() {
    let app = test_app().await;
    for day in 1..=5 {
        seed(&app, "GB", 1, 1, VisitorType::Domestic, (2024, 5, day, 2, 0)).await;
    }

    let response = send(
        &app,
        Method::GET,
        "/api/v1/visitors?page=2&page_size=10",
        Some(&app.staff),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert!(body["records"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["total"], 5);
    assert_eq!(body["pagination"]["pages"], 1);
}

#[tokio::test]
async fn test_list_is_newest_first_and_filtered() {
    let app = test_app().await;
    seed_march(&app).await;

    let response = send(
        &app,
        Method::GET,
        "/api/v1/visitors?location_code=PIP&date_from=2024-03-10&date_to=2024-03-10",
        Some(&app.staff),
        None,
    )
    .await;
    let body = response.json();
    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["female_count"], 4);

    let response = send(&app, Method::GET, "/api/v1/visitors", Some(&app.staff), None).await;
    let body = response.json();
    let times: Vec<&str> = body["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["check_in_time"].as_str().unwrap())
        .collect();
    let mut sorted = times.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(times, sorted);
}

#[tokio::test]
async fn test_daily_stats_per_location() {
    let app = test_app().await;
    seed_march(&app).await;

    let response = send(
        &app,
        Method::GET,
        "/api/v1/stats/daily?date=2024-03-10",
        Some(&app.staff),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    let rows = body["per_location"].as_array().unwrap();
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0]["location_code"], "GB");
    assert_eq!(rows[0]["total_visits"], 2);
    assert_eq!(rows[0]["total_male"], 4);
    assert_eq!(rows[0]["total_female"], 2);
    assert_eq!(rows[0]["total_visitors"], 6);
    assert_eq!(rows[0]["international_visits"], 1);

    assert_eq!(rows[1]["location_code"], "MSJ");
    assert_eq!(rows[1]["total_visits"], 0);

    assert_eq!(rows[2]["location_code"], "PIP");
    assert_eq!(rows[2]["total_visitors"], 4);
    assert_eq!(rows[2]["location_name"], "Pasar Terapung");
}

#[tokio::test]
async fn test_daily_stats_unknown_location() {
    let app = test_app().await;

    let response = send(
        &app,
        Method::GET,
        "/api/v1/stats/daily?date=2024-03-10&location_code=ZZ",
        Some(&app.staff),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_monthly_stats_has_twelve_months() {
    let app = test_app().await;
    seed_march(&app).await;

    let response = send(
        &app,
        Method::GET,
        "/api/v1/stats/monthly?year=2024",
        Some(&app.staff),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    let months = body["monthly"].as_array().unwrap();
    assert_eq!(months.len(), 12);
    assert_eq!(months[2]["month"], 3);
    assert_eq!(months[2]["visitors"], 14);
    assert_eq!(months[2]["records"], 4);
    assert_eq!(months[0]["visitors"], 0);
    assert_eq!(body["total_visitors"], 14);
    assert_eq!(body["total_locations"], 3);

    let response = send(
        &app,
        Method::GET,
        "/api/v1/stats/monthly?year=2023",
        Some(&app.staff),
        None,
    )
    .await;
    let body = response.json();
    assert_eq!(body["monthly"].as_array().unwrap().len(), 12);
    assert_eq!(body["total_visitors"], 0);
}

#[tokio::test]
async fn test_period_report_and_years() {
    let app = test_app().await;
    seed_march(&app).await;
    seed(&app, "MSJ", 5, 5, VisitorType::International, (2023, 12, 30, 4, 0)).await;

    let response = send(&app, Method::GET, "/api/v1/stats/periods", Some(&app.staff), None).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    let periods = body["periods"].as_array().unwrap();
    assert_eq!(periods.len(), 2);
    assert_eq!(periods[0]["period"], "2024-03");
    assert_eq!(periods[0]["label"], "March 2024");
    assert_eq!(periods[1]["period"], "2023-12");
    assert_eq!(body["totals"]["total_visitors"], 24);
    assert_eq!(body["totals"]["total_international"], 11);

    let response = send(&app, Method::GET, "/api/v1/stats/years", Some(&app.staff), None).await;
    let years: Vec<i64> = response.json()["years"]
        .as_array()
        .unwrap()
        .iter()
        .map(|y| y.as_i64().unwrap())
        .collect();
    assert!(years.contains(&2024));
    assert!(years.contains(&2023));
}

#[tokio::test]
async fn test_period_report_rejects_bad_month() {
    let app = test_app().await;

    let response = send(
        &app,
        Method::GET,
        "/api/v1/stats/periods?year=2024&month=13",
        Some(&app.staff),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_export_visitors_csv() {
    let app = test_app().await;
    seed_march(&app).await;

    let response = send(&app, Method::GET, "/api/v1/visitors/export", Some(&app.staff), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[CONTENT_TYPE], "text/csv; charset=utf-8");
    assert!(response.headers[CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .starts_with("attachment; filename=\"visitors_"));
    assert!(response.body.starts_with(&[0xEF, 0xBB, 0xBF]));

    let text = response.text();
    let mut reader = csv::ReaderBuilder::new().from_reader(text.trim_start_matches('\u{FEFF}').as_bytes());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "Date");
    assert_eq!(&headers[3], "Location Name");

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 4);
    // Newest first, in local time
    assert_eq!(&rows[0][0], "2024-03-11");
    assert_eq!(&rows[0][1], "00:30:00");
    assert_eq!(&rows[0][3], "Pasar Terapung");
}

#[tokio::test]
async fn test_export_period_report_csv() {
    let app = test_app().await;
    seed_march(&app).await;

    let response = send(
        &app,
        Method::GET,
        "/api/v1/stats/periods/export?year=2024",
        Some(&app.staff),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let text = response.text();
    assert!(text.starts_with('\u{FEFF}'));

    let mut reader = csv::ReaderBuilder::new().from_reader(text.trim_start_matches('\u{FEFF}').as_bytes());
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers[0], "Period");
    assert_eq!(headers.len(), 9);
    assert!(headers.contains(&"Gedung Balai".to_string()));
    assert!(headers.contains(&"Pasar Terapung".to_string()));

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "March 2024");
    assert_eq!(&rows[0][2], "14");
}

#[tokio::test]
async fn test_delete_visitor_requires_admin() {
    let app = test_app().await;
    seed(&app, "GB", 1, 0, VisitorType::Domestic, (2024, 3, 10, 1, 0)).await;

    let response = send(&app, Method::DELETE, "/api/v1/visitors/1", Some(&app.staff), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(app.repository.records.count().await.unwrap(), 1);

    let response = send(&app, Method::DELETE, "/api/v1/visitors/1", Some(&app.admin), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = send(&app, Method::DELETE, "/api/v1/visitors/1", Some(&app.admin), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_visitor() {
    let app = test_app().await;
    seed(&app, "GB", 1, 0, VisitorType::Domestic, (2024, 3, 10, 1, 0)).await;

    let response = send(
        &app,
        Method::PUT,
        "/api/v1/visitors/1",
        Some(&app.staff),
        Some(json!({ "location_code": "PIP", "female_count": 3 })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["location_code"], "PIP");
    assert_eq!(body["location_name"], "Pasar Terapung");
    assert_eq!(body["female_count"], 3);
    assert_eq!(body["check_in_time"], "2024-03-10T01:00:00Z");

    let response = send(
        &app,
        Method::PUT,
        "/api/v1/visitors/1",
        Some(&app.staff),
        Some(json!({ "visitor_type": "tourist" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_public_qr_check_in() {
    let app = test_app().await;

    let response = send(
        &app,
        Method::POST,
        "/api/v1/visitors/qr",
        None,
        Some(json!({
            "location_code": "PIP",
            "form_type": "group",
            "group_name": "SMPN 3 Banjarmasin",
            "male_count": 12,
            "female_count": 15
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.json()["id"].as_i64().unwrap();

    let response = send(&app, Method::GET, &format!("/api/v1/visitors/{}", id), Some(&app.staff), None).await;
    let record = response.json();
    assert_eq!(record["source"], "qr");
    assert_eq!(record["visitor_name"], "SMPN 3 Banjarmasin");
    assert_eq!(record["male_count"], 12);
    assert_eq!(record["female_count"], 15);
}

#[tokio::test]
async fn test_location_admin_operations() {
    let app = test_app().await;
    let body = json!({ "code": "kb1", "name": "Kampung Biru" });

    let response = send(&app, Method::POST, "/api/v1/locations", Some(&app.staff), Some(body.clone())).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = send(&app, Method::POST, "/api/v1/locations", Some(&app.admin), Some(body.clone())).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json()["code"], "KB1");

    let response = send(&app, Method::POST, "/api/v1/locations", Some(&app.admin), Some(body)).await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = send(
        &app,
        Method::GET,
        "/api/v1/locations/KB1/qr?form_type=foreign",
        Some(&app.admin),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json()["url"],
        "http://localhost:3000/visitor-form/KB1/foreign"
    );

    let response = send(&app, Method::DELETE, "/api/v1/locations/KB1", Some(&app.admin), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = send(&app, Method::GET, "/api/v1/locations", Some(&app.staff), None).await;
    let codes: Vec<String> = response.json()
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["code"].as_str().unwrap().to_string())
        .collect();
    assert!(!codes.contains(&"KB1".to_string()));

    let response = send(
        &app,
        Method::POST,
        "/api/v1/visitors",
        Some(&app.staff),
        Some(json!({ "location_code": "KB1", "male_count": 1 })),
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
