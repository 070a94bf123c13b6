//! Omacare multi-provider router
//!
//! Serves `/api/compare`: a prompt (or webinar URL) is shaped for the chosen
//! use case, sent to one or more LLM providers concurrently, and the answers
//! are merged into a single JSON object for the browser client.

mod api;
mod core;
mod fetchers;
mod models;
mod pipeline;

use crate::api::endpoints::{AppState, create_router};
use crate::core::config::Config;
use crate::core::logging::init_logging;
use crate::core::provider::{Provider, ProviderSet};
use crate::core::providers::{AnthropicProvider, OllamaProvider, OpenAIProvider};
use crate::fetchers::YouTubeCaptions;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Check for --help flag
    if std::env::args().any(|arg| arg == "--help") {
        print_help();
        return;
    }

    dotenv::dotenv().ok();

    let config = match Config::from_env() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            eprintln!("Configuration Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.log_level);

    print_startup_banner(&config);

    for id in config.missing_credentials() {
        warn!("No credentials configured for {}; its slot will report an error", id);
    }

    let state = match build_state(config.clone()) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize providers: {:#}", e);
            std::process::exit(1);
        }
    };

    for id in crate::core::provider::ProviderId::ALL {
        info!("Provider {} -> {}", id, state.providers.get(id).provider_name());
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Server listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Construct the long-lived provider and caption clients
fn build_state(config: Arc<Config>) -> Result<AppState> {
    let chatgpt: Arc<dyn Provider> = Arc::new(
        OpenAIProvider::new(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            config.openai_model.clone(),
            config.request_timeout,
        )
        .context("OpenAI provider")?,
    );
    let haiku: Arc<dyn Provider> = Arc::new(
        AnthropicProvider::new(
            config.anthropic_api_key.clone(),
            config.anthropic_base_url.clone(),
            config.anthropic_model.clone(),
            config.request_timeout,
        )
        .context("Anthropic provider")?,
    );
    let ollama: Arc<dyn Provider> = Arc::new(
        OllamaProvider::new(
            config.ollama_base_url.clone(),
            config.ollama_model.clone(),
            config.request_timeout,
        )
        .context("Ollama provider")?,
    );
    let captions = Arc::new(
        YouTubeCaptions::new(
            config.captions_base_url.clone(),
            config.captions_lang.clone(),
            config.request_timeout,
        )
        .context("Caption source")?,
    );

    Ok(AppState {
        config,
        providers: ProviderSet {
            chatgpt,
            haiku,
            ollama,
        },
        captions,
    })
}

/// Print startup banner with configuration
fn print_startup_banner(config: &Config) {
    println!("🚀 Omacare router v{}", env!("CARGO_PKG_VERSION"));
    println!("✅ Configuration loaded successfully");
    println!("   ChatGPT: {} ({})", config.openai_model, config.openai_base_url);
    println!("   Haiku:   {} ({})", config.anthropic_model, config.anthropic_base_url);
    println!("   Ollama:  {} ({})", config.ollama_model, config.ollama_base_url);
    println!("   Captions: {} [{}]", config.captions_base_url, config.captions_lang);
    println!("   Request Timeout: {}s", config.request_timeout);
    println!("   Server: {}:{}", config.host, config.port);
    println!();
}

/// Print help message
fn print_help() {
    println!("Omacare router v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: omacare-router [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --help    Display this help message");
    println!();
    println!("Environment variables (a .env file is loaded if present):");
    println!("  CONFIG_PATH - TOML configuration file (default: config.toml, optional)");
    println!("  OPENAI_API_KEY - API key for the chatgpt provider");
    println!("  ANTHROPIC_API_KEY - API key for the haiku provider");
    println!("  RUST_LOG - Log filter, overrides [server] log_level");
    println!();
    println!("Configuration sections:");
    println!("  [server]    host (0.0.0.0), port (3000), log_level (info)");
    println!("  [request]   request_timeout (90)");
    println!("  [openai]    base_url, model (gpt-3.5-turbo)");
    println!("  [anthropic] base_url, model (claude-3-haiku-20240307)");
    println!("  [ollama]    base_url (http://localhost:11434), model (llama3)");
    println!("  [captions]  base_url (https://www.youtube.com), lang (en)");
}
