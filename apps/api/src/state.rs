use std::sync::Arc;

use crate::config::Config;
use crate::explain::Explainer;
use crate::rate_limit::RateLimiter;
use crate::report::font_metrics::PageConfig;
use crate::risk::RiskEngine;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is either immutable or internally synchronised.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Built once from the configured risk profile; read-only afterwards.
    pub engine: Arc<RiskEngine>,
    /// Pluggable explanation source. Default: FallbackExplainer.
    pub explainer: Arc<dyn Explainer>,
    pub rate_limiter: Arc<RateLimiter>,
    pub page_config: PageConfig,
}
