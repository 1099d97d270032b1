mod app;
mod cache;
mod config;
mod error;
mod handlers;
mod history;
mod metrics;
mod profile;
mod retry;
mod web;

use anyhow::{Context, Result};
use chef::{LanguageModel, OllamaClient, ScriptedModel};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, LlmConfig, LlmProvider, LoggingConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let model = build_model(&config.llm)?;
    tracing::info!(
        provider = ?config.llm.provider,
        model = model.model_name(),
        "Language model configured"
    );

    let state = Arc::new(app::AppState::new(&config, model));
    let app = app::router(state);

    let address = config.server.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));

    if logging.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_model(config: &LlmConfig) -> Result<Arc<dyn LanguageModel>> {
    match config.provider {
        LlmProvider::Ollama => {
            let client = OllamaClient::new(config.base_url.clone(), config.model.clone())
                .with_options(config.generation_options())
                .with_json_mode(config.json_mode)
                .with_timeout(Duration::from_secs(config.timeout_secs))
                .context("Failed to build language model client")?;
            Ok(Arc::new(client))
        }
        LlmProvider::Fake => Ok(Arc::new(ScriptedModel::default())),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutting down");
}
