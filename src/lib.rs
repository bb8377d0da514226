//! Apex Motors - library for app logic and testing

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod logging;
pub mod rate_limit;
pub mod routes;
pub mod state;

#[cfg(test)]
mod test_support;

use axum::{
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get, patch, post},
    Json, Router,
};
use std::{any::Any, net::SocketAddr, path::Path};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowOrigin, Any as AnyOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::error::{AppError, ErrorResponse};
use crate::state::AppState;

/// Configure CORS from `ALLOWED_ORIGINS`; an empty list allows any origin.
pub fn configure_cors(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(AnyOrigin)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Something went wrong!".to_string(),
        }),
    )
        .into_response()
}

/// Content-Security-Policy for the site and API responses.
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
style-src 'self' 'unsafe-inline' https://fonts.googleapis.com https://cdnjs.cloudflare.com; \
script-src 'self' 'unsafe-inline'; \
font-src 'self' https://fonts.gstatic.com https://cdnjs.cloudflare.com; \
img-src 'self' https://images.unsplash.com data: blob:; \
connect-src 'self'";

async fn api_not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}

async fn api_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

fn api_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/health/database", get(routes::health::health_database))
        // Public
        .route("/api/cars", get(routes::cars::list_cars))
        .route("/api/cars/featured/special", get(routes::cars::get_featured_car))
        .route("/api/cars/{id}", get(routes::cars::get_car))
        .route("/api/testimonials", get(routes::showcase::list_testimonials))
        .route("/api/gallery", get(routes::showcase::list_gallery))
        .route("/api/contact", post(routes::leads::submit_contact))
        .route("/api/test-drive", post(routes::leads::book_test_drive))
        // Admin
        .route("/api/admin/login", post(routes::auth::login))
        .route("/api/admin/stats", get(routes::admin::stats))
        .route("/api/admin/contacts", get(routes::leads::list_contacts))
        .route(
            "/api/admin/contacts/{id}",
            patch(routes::leads::update_contact_status),
        )
        .route("/api/admin/test-drives", get(routes::leads::list_test_drives))
        .route(
            "/api/admin/test-drives/{id}",
            patch(routes::leads::update_test_drive_status)
                .delete(routes::leads::delete_test_drive),
        )
        .route("/api/admin/cars", post(routes::cars::create_car))
        .route(
            "/api/admin/cars/{id}",
            patch(routes::cars::update_car).delete(routes::cars::delete_car),
        )
        .route("/api/{*path}", any(api_not_found))
        .method_not_allowed_fallback(api_method_not_allowed)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::enforce,
        ))
}

/// Create and configure the application router.
///
/// Requests must carry `ConnectInfo<SocketAddr>` for the rate limiter, so
/// serve it with `into_make_service_with_connect_info`.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors(&state.config);
    let public_dir = Path::new(&state.config.public_dir);
    let spa = ServeDir::new(public_dir).fallback(ServeFile::new(public_dir.join("index.html")));

    Router::new()
        .merge(api_router(&state))
        .route_service("/admin", ServeFile::new(public_dir.join("admin.html")))
        .fallback_service(spa)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("same-origin"),
        ))
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024))
        .layer(cors)
        .with_state(state)
}

/// Wait for Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Run the server (used by main).
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();

    // Guards must outlive the server or buffered log lines are lost.
    let _log_guards = logging::init(&config);

    routes::health::init_start_time();

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Refusing to start: {}", e))?;

    let pool = db::init_pool(&db::DbConfig::from_app_config(&config)).await?;
    let report = db::seed::bootstrap(&pool, &config.admin_seed).await;
    tracing::info!(
        admins = report.admins,
        cars = report.cars,
        testimonials = report.testimonials,
        "Database ready"
    );

    let addr = config.bind_addr();
    let state = AppState::new(pool.clone(), config);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Apex Motors server listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    pool.close().await;
    tracing::info!("Database pool closed, shutdown complete");

    Ok(())
}
