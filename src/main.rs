use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tts_studio_backend::controllers::tts::TtsController;
use tts_studio_backend::domain::tts::{TokioSleeper, TtsService};
use tts_studio_backend::infrastructure::config::{Config, LogFormat};
use tts_studio_backend::infrastructure::http::start_http_server;
use tts_studio_backend::infrastructure::repositories::GeminiTtsRepository;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting TTS Studio Backend on {}:{}",
        config.host,
        config.port
    );

    let settings = config.synthesis_settings();
    tracing::info!(
        model = %config.gemini_model,
        max_chars_per_batch = settings.max_chars_per_batch,
        per_line_overhead = settings.per_line_overhead,
        inter_item_delay_ms = settings.inter_item_delay.as_millis() as u64,
        base_retry_delay_ms = settings.base_retry_delay.as_millis() as u64,
        max_retries = settings.max_retries,
        "Synthesis settings loaded"
    );

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Speech endpoint client
    let tts_repo = Arc::new(GeminiTtsRepository::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_base_url.clone(),
        config.gemini_timeout(),
    )?);
    tracing::info!(base_url = %config.gemini_base_url, "Speech endpoint client initialized");

    // 2. Service
    let tts_service = Arc::new(TtsService::new(tts_repo, settings, Arc::new(TokioSleeper)));

    // 3. Controller
    let tts_controller = Arc::new(TtsController::new(tts_service));

    start_http_server(Arc::new(config), tts_controller).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "tts_studio_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "tts_studio_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
