#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the litter map application.
//!
//! Serves the REST API for logging litter sightings, listing them with
//! filters and pagination, computing statistics and hotspot clusters,
//! and serving uploaded photos. Entries live in a single-table `SQLite`
//! database; photo binaries are stored on disk under the upload
//! directory and referenced by relative URL.

pub mod error;
mod handlers;
pub mod rate_limit;
mod upload;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_cors::Cors;
use actix_files::Files;
use actix_multipart::form::MultipartFormConfig;
use actix_web::dev::HttpServiceFactory;
use actix_web::{App, HttpServer, middleware, web};
use switchy_database::Database;

use crate::error::ApiError;
use crate::rate_limit::RateLimiter;

/// Default maximum photo upload size: 5 MB.
const DEFAULT_MAX_FILE_SIZE: usize = 5_242_880;

/// Shared application state.
pub struct AppState {
    /// Entries database connection.
    pub db: Arc<dyn Database>,
    /// Injected request rate limiter, applied to the `/api` scope.
    pub rate_limiter: RateLimiter,
    /// Directory holding uploaded photo files.
    pub upload_dir: PathBuf,
    /// Maximum accepted photo size in bytes.
    pub max_file_size: usize,
    /// Server start time, reported by the health endpoint.
    pub started_at: Instant,
}

/// Builds the `/api` scope with all routes and the rate-limit
/// middleware. Shared between [`run_server`] and the integration
/// tests.
pub fn api_routes() -> impl HttpServiceFactory {
    web::scope("/api")
        .wrap(middleware::from_fn(rate_limit::rate_limit_middleware))
        .route("/health", web::get().to(handlers::health))
        .route("/trash", web::post().to(handlers::create_trash))
        .route("/trash", web::get().to(handlers::list_trash))
        .route("/stats", web::get().to(handlers::get_stats))
        .route("/photos/{filename}", web::get().to(handlers::get_photo))
}

/// Multipart extractor config: caps the request size and maps
/// extraction failures to the API error shape.
#[must_use]
pub fn multipart_config(max_file_size: usize) -> MultipartFormConfig {
    MultipartFormConfig::default()
        .total_limit(max_file_size.saturating_mul(2))
        .error_handler(|err, _req| {
            ApiError::InvalidInput(format!("Invalid multipart request: {err}")).into()
        })
}

/// Query extractor config mapping deserialization failures to the API
/// error shape.
#[must_use]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::InvalidInput(err.to_string()).into())
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Starts the litter map API server.
///
/// Opens the `SQLite` entries database, ensures the upload directory
/// exists, and starts the Actix-Web HTTP server. This is a regular
/// async function — the caller is responsible for providing the async
/// runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind
/// or encounters a runtime error.
///
/// # Panics
///
/// Panics if the database cannot be opened or the upload directory
/// cannot be created.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let db_path = std::env::var("DB_PATH").unwrap_or_else(|_| "data/trash.db".to_string());
    let upload_dir =
        PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "data/photos".to_string()));
    let max_file_size: usize = env_or("MAX_FILE_SIZE", DEFAULT_MAX_FILE_SIZE);
    let rate_limit_max: u32 = env_or("RATE_LIMIT_MAX_REQUESTS", 10);
    let rate_limit_window: u64 = env_or("RATE_LIMIT_WINDOW_SECS", 60);

    std::fs::create_dir_all(&upload_dir).expect("Failed to create upload directory");

    log::info!("Opening entries database...");
    let db = litter_map_database::open_db(Path::new(&db_path))
        .await
        .expect("Failed to open entries database");

    let state = web::Data::new(AppState {
        db: Arc::from(db),
        rate_limiter: RateLimiter::new(rate_limit_max, Duration::from_secs(rate_limit_window)),
        upload_dir: upload_dir.clone(),
        max_file_size,
        started_at: Instant::now(),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env_or("PORT", 8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .app_data(multipart_config(state.max_file_size))
            .app_data(query_config())
            .service(api_routes())
            // Serve uploaded photos directly
            .service(Files::new("/photos", upload_dir.clone()))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
