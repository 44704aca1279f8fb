//! End-to-end API tests against an in-memory database and a throwaway
//! upload directory.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::http::header;
use actix_web::{App, test, web};
use litter_map_server::rate_limit::RateLimiter;
use litter_map_server::{AppState, api_routes, multipart_config, query_config};
use serde_json::Value;
use uuid::Uuid;

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";
const MAX_FILE_SIZE: usize = 5_242_880;

async fn test_state(rate_limiter: RateLimiter) -> web::Data<AppState> {
    let db = switchy_database_connection::init_sqlite_rusqlite(None).expect("in-memory sqlite");
    litter_map_database::ensure_schema(db.as_ref())
        .await
        .expect("schema");

    let upload_dir = std::env::temp_dir().join(format!("litter-map-test-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&upload_dir).expect("upload dir");

    web::Data::new(AppState {
        db: Arc::from(db),
        rate_limiter,
        upload_dir,
        max_file_size: MAX_FILE_SIZE,
        started_at: Instant::now(),
    })
}

async fn relaxed_state() -> web::Data<AppState> {
    test_state(RateLimiter::new(10_000, Duration::from_secs(60))).await
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .app_data(multipart_config($state.max_file_size))
                .app_data(query_config())
                .service(api_routes()),
        )
        .await
    };
}

fn push_text_field(body: &mut Vec<u8>, name: &str, value: &str) {
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
        .as_bytes(),
    );
}

fn push_file_field(body: &mut Vec<u8>, name: &str, filename: &str, content_type: &str, data: &[u8]) {
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
             filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");
}

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        push_text_field(&mut body, name, value);
    }
    if let Some((filename, content_type, data)) = file {
        push_file_field(&mut body, "photo", filename, content_type, data);
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn create_request(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/trash")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart_body(fields, file))
}

fn plastic_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("trash_type", "plastic"),
        ("latitude", "40.7128"),
        ("longitude", "-74.0060"),
    ]
}

#[actix_web::test]
async fn creates_entry_with_valid_data() {
    let state = relaxed_state().await;
    let app = init_app!(state);

    let mut fields = plastic_fields();
    fields.push(("user_name", "Test User"));

    let resp = test::call_service(&app, create_request(&fields, None).to_request()).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    assert!(body.get("id").is_some());
    assert!(body.get("timestamp").is_some());
    assert_eq!(body["trash_type"], "plastic");
    assert_eq!(body["latitude"], 40.7128);
    assert_eq!(body["longitude"], -74.0060);
    assert_eq!(body["user_name"], "Test User");
}

#[actix_web::test]
async fn creates_anonymous_entry_without_user_name() {
    let state = relaxed_state().await;
    let app = init_app!(state);

    let resp = test::call_service(&app, create_request(&plastic_fields(), None).to_request()).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    assert!(body.get("user_name").is_none());
}

#[actix_web::test]
async fn rejects_missing_trash_type() {
    let state = relaxed_state().await;
    let app = init_app!(state);

    let fields = [("latitude", "40.7128"), ("longitude", "-74.0060")];
    let resp = test::call_service(&app, create_request(&fields, None).to_request()).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
    assert!(body["error"]["message"].as_str().unwrap().contains("trash_type"));
}

#[actix_web::test]
async fn rejects_invalid_trash_type() {
    let state = relaxed_state().await;
    let app = init_app!(state);

    let fields = [
        ("trash_type", "styrofoam"),
        ("latitude", "40.7128"),
        ("longitude", "-74.0060"),
    ];
    let resp = test::call_service(&app, create_request(&fields, None).to_request()).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[actix_web::test]
async fn rejects_missing_latitude() {
    let state = relaxed_state().await;
    let app = init_app!(state);

    let fields = [("trash_type", "plastic"), ("longitude", "-74.0060")];
    let resp = test::call_service(&app, create_request(&fields, None).to_request()).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
    assert!(body["error"]["message"].as_str().unwrap().contains("latitude"));
}

#[actix_web::test]
async fn rejects_out_of_range_latitude_without_persisting() {
    let state = relaxed_state().await;
    let app = init_app!(state);

    let fields = [
        ("trash_type", "plastic"),
        ("latitude", "95"),
        ("longitude", "-74.0060"),
    ];
    let resp = test::call_service(&app, create_request(&fields, None).to_request()).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
    assert!(body["error"]["message"].as_str().unwrap().contains("latitude"));

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/trash").to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 0);
}

#[actix_web::test]
async fn rejects_out_of_range_longitude() {
    let state = relaxed_state().await;
    let app = init_app!(state);

    let fields = [
        ("trash_type", "plastic"),
        ("latitude", "40.7128"),
        ("longitude", "-200"),
    ];
    let resp = test::call_service(&app, create_request(&fields, None).to_request()).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"]["message"].as_str().unwrap().contains("longitude"));
}

#[actix_web::test]
async fn uploads_photo_and_serves_it_back() {
    let state = relaxed_state().await;
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        create_request(
            &plastic_fields(),
            Some(("photo-test.jpg", "image/jpeg", b"test-photo-data")),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    let photo_url = body["photo_url"].as_str().unwrap();
    assert!(photo_url.starts_with("/photos/"));
    assert!(photo_url.ends_with(".jpg"));

    let filename = photo_url.rsplit('/').next().unwrap();
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/photos/{filename}"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap();
    assert!(content_type.to_str().unwrap().starts_with("image/"));

    let served = test::read_body(resp).await;
    assert_eq!(&served[..], b"test-photo-data");
}

#[actix_web::test]
async fn rejects_unsupported_photo_type_without_storing_it() {
    let state = relaxed_state().await;
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        create_request(
            &plastic_fields(),
            Some(("photo.gif", "image/gif", b"gif-data")),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 415);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "UNSUPPORTED_MEDIA");

    let leftover = std::fs::read_dir(&state.upload_dir).unwrap().count();
    assert_eq!(leftover, 0, "no file may be left behind");
}

#[actix_web::test]
async fn lists_entries_with_filters() {
    let state = relaxed_state().await;
    let app = init_app!(state);

    for (trash_type, lat) in [("plastic", "40.71"), ("plastic", "40.72"), ("glass", "41.0")] {
        let fields = [
            ("trash_type", trash_type),
            ("latitude", lat),
            ("longitude", "-74.0"),
        ];
        let resp = test::call_service(&app, create_request(&fields, None).to_request()).await;
        assert_eq!(resp.status(), 201);
    }

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/trash").to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["entries"].as_array().unwrap().len(), 3);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/trash?trash_type=plastic")
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 2);
    for entry in body["entries"].as_array().unwrap() {
        assert_eq!(entry["trash_type"], "plastic");
    }

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/trash?start_date=2000-01-01&end_date=2099-01-01")
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 3);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/trash?trash_type=hazardous")
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["entries"].as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn paginates_the_filtered_list() {
    let state = relaxed_state().await;
    let app = init_app!(state);

    for _ in 0..3 {
        let resp =
            test::call_service(&app, create_request(&plastic_fields(), None).to_request()).await;
        assert_eq!(resp.status(), 201);
    }

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/trash?page=1&limit=2")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["entries"].as_array().unwrap().len(), 2);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/trash?page=2&limit=2")
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["entries"].as_array().unwrap().len(), 1);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/trash?page=5&limit=2")
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["entries"].as_array().unwrap().len(), 0);
    assert_eq!(body["total"], 3);
}

#[actix_web::test]
async fn round_trips_a_created_entry_through_the_list() {
    let state = relaxed_state().await;
    let app = init_app!(state);

    let mut fields = plastic_fields();
    fields.push(("user_name", "asha"));
    let resp = test::call_service(&app, create_request(&fields, None).to_request()).await;
    let created: Value = test::read_body_json(resp).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/trash").to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    let listed = &body["entries"].as_array().unwrap()[0];

    assert_eq!(*listed, created);
}

#[actix_web::test]
async fn computes_statistics_over_seeded_entries() {
    let state = relaxed_state().await;
    let app = init_app!(state);

    for (trash_type, lat, lng) in [
        ("plastic", "12.90", "74.80"),
        ("plastic", "12.901", "74.801"),
        ("glass", "20.0", "80.0"),
    ] {
        let fields = [
            ("trash_type", trash_type),
            ("latitude", lat),
            ("longitude", lng),
        ];
        let resp = test::call_service(&app, create_request(&fields, None).to_request()).await;
        assert_eq!(resp.status(), 201);
    }

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/stats").to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;

    assert_eq!(body["total_count"], 3);
    assert_eq!(body["most_common_type"], "plastic");
    assert_eq!(body["type_breakdown"]["plastic"], 2);
    assert_eq!(body["type_breakdown"]["glass"], 1);
    assert!(body["date_range"].get("start").is_some());
    assert!(body["date_range"].get("end").is_some());

    let hotspots = body["hotspots"].as_array().unwrap();
    assert_eq!(hotspots.len(), 2);
    assert_eq!(hotspots[0]["count"], 2);
    assert_eq!(hotspots[0]["radius"], 1000.0);
}

#[actix_web::test]
async fn stats_with_future_start_date_are_empty() {
    let state = relaxed_state().await;
    let app = init_app!(state);

    let resp = test::call_service(&app, create_request(&plastic_fields(), None).to_request()).await;
    assert_eq!(resp.status(), 201);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/stats?start_date=2099-01-01")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total_count"], 0);
    assert_eq!(body["most_common_type"], "");
    assert_eq!(body["hotspots"].as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn missing_photo_returns_not_found() {
    let state = relaxed_state().await;
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/photos/non-existent-photo.jpg")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "FILE_NOT_FOUND");
}

#[actix_web::test]
async fn invalid_photo_filename_is_rejected() {
    let state = relaxed_state().await;
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/photos/invalid-file.txt")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "INVALID_FILENAME");
}

#[actix_web::test]
async fn health_reports_version_and_uptime() {
    let state = relaxed_state().await;
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/health").to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["healthy"], true);
    assert!(body.get("version").is_some());
    assert!(body.get("uptime").is_some());
}

#[actix_web::test]
async fn requests_over_quota_are_rejected() {
    let state = test_state(RateLimiter::new(2, Duration::from_secs(60))).await;
    let app = init_app!(state);

    for _ in 0..2 {
        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/health").to_request(),
        )
        .await;
        assert_eq!(resp.status(), 200);
    }

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/health").to_request(),
    )
    .await;
    assert_eq!(resp.status(), 429);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "RATE_LIMIT_EXCEEDED");
}
