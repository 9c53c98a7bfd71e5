use axum::Router;
use once_cell::sync::Lazy;
use std::sync::Arc;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;
use tts_studio_backend::{
    controllers::tts::TtsController,
    domain::tts::{SynthesisSettings, TtsService},
    infrastructure::http::build_router,
};

pub mod speech_mocks;

use api_client::TestClient;
use speech_mocks::{InstantSleeper, ScriptedSpeechEndpoint};

// Install a test subscriber once so failures come with the pipeline logs
static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tts_studio_backend=debug".into()),
        )
        .with_test_writer()
        .try_init();
});

pub struct TestContext {
    pub client: TestClient,
    pub endpoint: Arc<ScriptedSpeechEndpoint>,
    pub sleeper: Arc<InstantSleeper>,
    #[allow(dead_code)]
    pub settings: SynthesisSettings,
}

impl TestContext {
    /// Start a server backed by the given speech endpoint double
    pub async fn with_endpoint(endpoint: Arc<ScriptedSpeechEndpoint>) -> Self {
        Self::with_settings(endpoint, SynthesisSettings::default()).await
    }

    pub async fn with_settings(
        endpoint: Arc<ScriptedSpeechEndpoint>,
        settings: SynthesisSettings,
    ) -> Self {
        Lazy::force(&TRACING);

        let sleeper = Arc::new(InstantSleeper::default());
        let app = create_app(endpoint.clone(), sleeper.clone(), settings.clone());

        // Start server
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to be ready
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        Self {
            client: TestClient::new(&base_url),
            endpoint,
            sleeper,
            settings,
        }
    }
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async { TestContext::with_endpoint(ScriptedSpeechEndpoint::tagged()).await }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // Server task ends with the test runtime
        }
    }
}

fn create_app(
    endpoint: Arc<ScriptedSpeechEndpoint>,
    sleeper: Arc<InstantSleeper>,
    settings: SynthesisSettings,
) -> Router {
    let tts_service = Arc::new(TtsService::new(endpoint, settings, sleeper));
    let tts_controller = Arc::new(TtsController::new(tts_service));

    build_router(tts_controller, false)
}
