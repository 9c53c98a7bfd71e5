use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::controllers::{health, tts::TtsController};
use crate::error::AppError;
use crate::infrastructure::config::Config;
use crate::infrastructure::middleware::request_id_middleware;

async fn not_found() -> AppError {
    AppError::NotFound("No such route".to_string())
}

/// Build the application router with all routes and layers
pub fn build_router(tts_controller: Arc<TtsController>, permissive_cors: bool) -> Router {
    let tts_routes = Router::new()
        .route("/api/tts/voices", get(TtsController::list_voices))
        .route("/api/tts/synthesize", post(TtsController::synthesize))
        .route("/api/tts/conversation", post(TtsController::conversation))
        .with_state(tts_controller);

    let app = Router::new()
        .route("/health", get(health::health))
        .merge(tts_routes)
        .fallback(not_found)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http());

    if permissive_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    tts_controller: Arc<TtsController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(tts_controller, config.is_development());

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
