//! MuniServe Grievance Portal Backend
//!
//! A production-grade REST backend with SQLite persistence: citizens file
//! grievances, municipal staff triage and resolve them, and a single
//! authoritative session token per account preempts concurrent logins.

mod api;
mod config;
mod db;
mod errors;
mod grievance;
mod models;
mod session;
mod triage;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::RecordStore;
use grievance::GrievanceLifecycle;
use session::SessionAuthority;
use triage::TriageAdvisor;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: RecordStore,
    pub sessions: Arc<SessionAuthority>,
    pub grievances: Arc<GrievanceLifecycle>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting MuniServe Grievance Portal Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if the triage advisor has no credential; grievance creation
    // still works, classifications just degrade to the fallback
    if config.gemini_api_key.is_none() {
        tracing::warn!(
            "No Gemini API key configured (MUNISERVE_GEMINI_API_KEY). Triage runs in fallback mode."
        );
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let store = RecordStore::new(pool);

    // Seed the fixed management accounts on first run
    session::seed_official_accounts(&store).await?;

    // Wire up the core services
    let triage = Arc::new(TriageAdvisor::new(&config));
    let sessions = Arc::new(SessionAuthority::new(store.clone()));
    let grievances = Arc::new(GrievanceLifecycle::new(store.clone(), triage));

    // Create application state
    let state = AppState {
        store,
        sessions,
        grievances,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // Auth / sessions
        .route("/auth/login", post(api::login))
        .route("/auth/signup", post(api::signup))
        .route("/auth/session", get(api::current_session))
        .route("/auth/session/check", post(api::check_session))
        .route("/auth/logout", post(api::logout))
        .route("/auth/profile", put(api::update_profile))
        // Grievances
        .route("/grievances", get(api::list_grievances))
        .route("/grievances", post(api::create_grievance))
        .route("/grievances/batch/status", put(api::bulk_transition_grievances))
        .route("/grievances/{id}", get(api::get_grievance))
        .route("/grievances/{id}", delete(api::delete_grievance))
        .route("/grievances/{id}/status", put(api::transition_grievance))
        // Announcements
        .route("/announcements", get(api::list_announcements))
        .route("/announcements", post(api::create_announcement))
        .route("/announcements/{id}", delete(api::delete_announcement));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
