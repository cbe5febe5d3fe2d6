//! Artist Portfolio API - admin backend library for app logic and testing

pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod resources;
pub mod routes;
pub mod serverless;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware, Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::{
    auth::AdminAccount,
    clock::{Clock, SystemClock},
    config::{AdminPassword, Config},
    error::StartupError,
    state::AppState,
};

/// Configure CORS from a comma-separated origin list.
/// Falls back to allowing any origin when none is configured.
pub fn configure_cors(allowed_origins: Option<&str>) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .map(|s| {
            s.split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect()
        })
        .unwrap_or_default();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Create and configure the application router.
pub fn create_app(state: AppState, cors: CorsLayer, max_body_bytes: usize) -> Router {
    routes::router(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        // Compress responses with gzip/br/zstd automatically
        .layer(CompressionLayer::new())
        // Multipart uploads read through the extractor limit; everything else through the layer
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(cors)
}

/// Builds shared state from configuration, hashing a plain-text admin
/// password if one was supplied.
pub async fn build_state(config: &Config, clock: Arc<dyn Clock>) -> Result<AppState, StartupError> {
    let store = db::connect(&config.database).await?;

    let admin = match &config.admin_password {
        AdminPassword::Hashed(hash) => {
            AdminAccount::from_hash(&config.admin_username, hash.clone(), config.bcrypt_cost)
        }
        AdminPassword::Plain(plain) => {
            let username = config.admin_username.clone();
            let plain = plain.clone();
            let cost = config.bcrypt_cost;
            tokio::task::spawn_blocking(move || AdminAccount::from_plaintext(username, &plain, cost))
                .await
                .map_err(|e| StartupError::Io(std::io::Error::other(e)))??
        }
    };

    Ok(AppState::new(
        store,
        &config.jwt_secret,
        admin,
        clock,
        &config.download_base_url,
    ))
}

/// Run the server (used by main).
pub async fn run() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();

    // Guards MUST be held for the programme's lifetime; dropping them early
    // shuts down background log-writer threads and loses buffered log lines.
    let _log_guards = logging::init(&logging::config::LogConfig::from_env());

    routes::health::init_start_time();

    let config = Config::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    let state = build_state(&config, Arc::new(SystemClock)).await?;
    let cors = configure_cors(config.allowed_origins.as_deref());
    let app = create_app(state, cors, config.max_body_bytes);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|_| {
            StartupError::Config(config::ConfigError::Invalid {
                name: "HOST",
                value: config.host.clone(),
            })
        })?;
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
