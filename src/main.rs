//! Membership signup backend
//!
//! Collects member signups through a form, stores them in SQLite and serves
//! list, edit, delete and maintenance views for the committee.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod validation;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, LogFormat};
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!("Starting signup backend for {}", config.club_name);
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Unique BOS numbers: {}", config.unique_bos);

    if config.admin_psk.is_none() {
        tracing::warn!("No admin PSK configured (SIGNUP_ADMIN_PSK). Admin views are open!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path, config.unique_bos).await?;
    let repo = Arc::new(Repository::new(pool));

    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.admin_psk.clone();

    // Committee views
    let admin_routes = Router::new()
        .route("/list", get(api::list_members))
        .route("/emails", get(api::export_emails))
        .route("/clean", get(api::clean_members))
        .route("/edit/{id}", get(api::edit_form).post(api::edit_member))
        .route(
            "/delete/{id}",
            get(api::delete_member).post(api::delete_member),
        )
        .layer(middleware::from_fn(move |req, next| {
            auth::admin_guard(psk.clone(), req, next)
        }));

    // Signup form and health check (no auth required)
    let public_routes = Router::new()
        .route("/", get(api::signup_form).post(api::signup))
        .route("/health", get(health_check));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
