mod config;
mod errors;
mod explain;
mod llm_client;
mod rate_limit;
mod report;
mod risk;
mod routes;
mod state;
mod sustainability;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::explain::{Explainer, FallbackExplainer, LlmExplainer};
use crate::llm_client::LlmClient;
use crate::rate_limit::RateLimiter;
use crate::report::default_page_config;
use crate::risk::{RiskEngine, RiskProfile};
use crate::routes::{build_router, cors_layer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on invalid values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareBridge API v{}", env!("CARGO_PKG_VERSION"));

    // Build the risk engine from the configured profile
    let profile = RiskProfile::by_name(&config.risk_profile)?;
    info!(
        "Risk profile: {} (v{}, {} keywords)",
        profile.name,
        profile.version,
        profile.weights.len()
    );
    let engine = RiskEngine::new(profile).with_hospital_map(config.include_hospital_map);

    // Initialize explainer (static fallback unless an API key is configured)
    let explainer: Arc<dyn Explainer> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), config.explain_timeout)?;
            info!("LLM explainer enabled (model: {})", llm_client::MODEL);
            Arc::new(LlmExplainer::new(llm))
        }
        None => {
            info!("ANTHROPIC_API_KEY not set, using static explanations");
            Arc::new(FallbackExplainer)
        }
    };

    info!(
        "Rate limit: {} requests per {}s",
        config.rate_limit.max_requests,
        config.rate_limit.period.as_secs()
    );

    // Build app state
    let state = AppState {
        engine: Arc::new(engine),
        explainer,
        rate_limiter: Arc::new(RateLimiter::new(config.rate_limit)),
        page_config: default_page_config(),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allowed_origins));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
