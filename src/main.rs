use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notemapper::config::AppConfig;
use notemapper::routes;
use notemapper::state::AppState;
use notemapper::vision::{GeminiExtractor, NoteExtractor, VisionConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notemapper=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // Initialize the vision extractor (non-fatal: scanning disabled if config missing).
    let extractor: Option<Arc<dyn NoteExtractor>> = match VisionConfig::from_env().and_then(|cfg| {
        let model = cfg.model.clone();
        GeminiExtractor::new(cfg).map(|client| (client, model))
    }) {
        Ok((client, model)) => {
            tracing::info!(%model, "vision extractor initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "vision extractor not configured; scanning disabled");
            None
        }
    };

    if !config.credentials.is_set() {
        tracing::info!("no canvas credentials in environment; waiting for /api/set-credentials");
    }

    let port = config.port;
    let state = AppState::new(&config, extractor).expect("HTTP client init failed");
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "notemapper listening");
    axum::serve(listener, app).await.expect("server failed");
}
