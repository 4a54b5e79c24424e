use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;

use config::Config;
use services::assistant::AssistantClient;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub assistant: AssistantClient,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tidewell_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    // Database
    let db = db::create_pool(&config.database_url).await;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations applied");

    // One assistant client for the whole process; per-request construction
    // would rebuild the connection pool every call.
    let assistant = AssistantClient::new(&config);

    let state = AppState {
        db,
        config: config.clone(),
        assistant,
    };

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .route(
            "/api/auth/forgot-password",
            post(handlers::auth::forgot_password),
        )
        .route(
            "/api/auth/reset-password/:token",
            post(handlers::auth::reset_password),
        );

    let protected_routes = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout))
        // Profile & stats
        .route("/api/user/profile", get(handlers::user::get_profile))
        .route("/api/user/profile", put(handlers::user::update_profile))
        .route("/api/user/password", put(handlers::user::change_password))
        .route("/api/user/account", delete(handlers::user::delete_account))
        .route("/api/user/stats", get(handlers::user::get_stats))
        // Journal
        .route("/api/journal", get(handlers::journal::list_entries))
        .route("/api/journal", post(handlers::journal::create_entry))
        .route("/api/journal/:id", get(handlers::journal::get_entry))
        .route("/api/journal/:id", put(handlers::journal::update_entry))
        .route("/api/journal/:id", delete(handlers::journal::delete_entry))
        // Moods
        .route("/api/mood", post(handlers::mood::log_mood))
        .route("/api/mood", get(handlers::mood::mood_history))
        .route("/api/mood/stats", get(handlers::mood::get_mood_stats))
        // AI assistant
        .route("/api/chat", post(handlers::chat::send_message))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .frontend_url
                .parse::<axum::http::HeaderValue>()
                .expect("FRONTEND_URL must be a valid origin"),
        )
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app)
        .await
        .expect("Server exited with error");
}
