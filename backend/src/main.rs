//! AgroApp - Irrigation Water Requirement Prediction Server
//!
//! Predicts the average water requirement of a crop (mm per cycle) from
//! soil, weather and plant data, for single records and uploaded batches.

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod routes;
mod services;

pub use config::Config;

use error::{AppError, AppResult};
use external::ArtifactLoader;
use services::PredictionService;
use shared::PipelineArtifacts;

/// Loaded artifacts, or the reason they could not be loaded
#[derive(Clone)]
pub enum ArtifactState {
    Ready(Arc<PipelineArtifacts>),
    Unavailable(Arc<str>),
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub artifacts: ArtifactState,
    pub config: Arc<Config>,
}

impl AppState {
    /// Artifacts for a prediction request, or 503 when they failed to load
    pub fn artifacts(&self) -> AppResult<Arc<PipelineArtifacts>> {
        match &self.artifacts {
            ArtifactState::Ready(artifacts) => Ok(artifacts.clone()),
            ArtifactState::Unavailable(reason) => {
                Err(AppError::ArtifactsUnavailable(reason.to_string()))
            }
        }
    }

    pub fn prediction_service(&self) -> AppResult<PredictionService> {
        Ok(PredictionService::new(
            self.artifacts()?,
            self.config.batch.clone(),
        ))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agro_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting AgroApp prediction server");
    tracing::info!("Environment: {}", config.environment);

    // Load trained artifacts
    let artifacts = match ArtifactLoader::new(config.artifacts.clone()).load() {
        Ok(artifacts) => {
            tracing::info!("Prediction artifacts ready: {:?}", artifacts);
            ArtifactState::Ready(Arc::new(artifacts))
        }
        Err(e) if config.artifacts.required => {
            tracing::error!("Failed to load prediction artifacts: {}", e);
            return Err(e.into());
        }
        Err(e) => {
            tracing::error!(
                "Failed to load prediction artifacts, prediction routes disabled: {}",
                e
            );
            ArtifactState::Unavailable(e.to_string().into())
        }
    };

    // Create application state
    let state = AppState {
        artifacts,
        config: Arc::new(config.clone()),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.config.batch.max_upload_bytes;

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "AgroApp Water Requirement Prediction API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
