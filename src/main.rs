mod models;
mod handlers;
mod services;
mod middleware;
mod config;
mod errors;

use anyhow::Context;
use axum::{
    routing::{get, patch, post},
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
};
use tower_http::{
    services::ServeDir,
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;
use crate::{
    services::{seed::seed_defaults, StoreService},
    config::Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // In-memory store with demo data
    let store = StoreService::new();
    seed_defaults(&store, &config)
        .await
        .context("Failed to seed the store")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_app(store, config);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind server to {}", addr))?;
    tracing::info!("Server running on {}", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;
    Ok(())
}

fn build_app(store: StoreService, config: Config) -> Router {
    let static_dir = config.server.static_dir.clone();
    let max_body_size = config.server.max_body_size;
    let state = (store, config);

    Router::new()
        // Auth routes
        .route("/api/auth/login", post(handlers::handle_login))
        .route("/api/auth/register", post(handlers::handle_register))
        .route("/api/auth/forgot-password", post(handlers::handle_forgot_password))

        // Aggregates
        .route("/api/dashboard/stats", get(handlers::get_dashboard_stats))
        .route("/api/reports/summary", get(handlers::get_report_summary))

        // Rosters
        .route("/api/users", get(handlers::list_users))
        .route("/api/users/:id", get(handlers::get_user).patch(handlers::update_user))
        .route("/api/courses", get(handlers::list_courses).post(handlers::create_course))
        .route("/api/courses/:id", patch(handlers::update_course))
        .route("/api/students", get(handlers::list_students).post(handlers::admit_student))
        .route("/api/students/:id", get(handlers::get_student).patch(handlers::update_student))

        // Marks and fees
        .route("/api/marks", get(handlers::list_marks).post(handlers::create_marks))
        .route("/api/marks/:id", patch(handlers::update_marks))
        .route("/api/fees", get(handlers::list_fees).post(handlers::create_fees))
        .route("/api/fees/:id", patch(handlers::update_fees))

        // Pre-built web client, if one is deployed next to the binary
        .fallback_service(ServeDir::new(static_dir))

        // Add middleware
        .layer(from_fn_with_state(state.clone(), middleware::require_admin))
        .layer(TraceLayer::new_for_http())

        // Body limits from config
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_size))

        // Add state
        .with_state(state)
}
