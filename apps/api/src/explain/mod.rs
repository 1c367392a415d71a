//! Explanation enrichment — pluggable, trait-based source of a plain-language note
//! to accompany a risk assessment.
//!
//! Default: `FallbackExplainer` (static text, no network).
//! With `ANTHROPIC_API_KEY`: `LlmExplainer` (Claude via `llm_client`).
//!
//! `AppState` holds an `Arc<dyn Explainer>`. Callers go through `explain_or_fallback`,
//! which never fails and never touches the classification.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::llm_client::prompts::{explain_prompt, EXPLAIN_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};
use crate::risk::RiskTier;

pub const EXPLANATION_FALLBACK: &str = "AI explanation unavailable. \
    Please rely on the risk assessment above and consult a healthcare professional \
    if symptoms persist or worsen.";

#[async_trait]
pub trait Explainer: Send + Sync {
    async fn explain(&self, symptoms: &str, risk: RiskTier) -> Result<String, LlmError>;

    /// Short backend label, for logs and the health endpoint.
    fn backend(&self) -> &'static str;
}

/// Returns the static fallback text. Used when no API key is configured.
pub struct FallbackExplainer;

#[async_trait]
impl Explainer for FallbackExplainer {
    async fn explain(&self, _symptoms: &str, _risk: RiskTier) -> Result<String, LlmError> {
        Ok(EXPLANATION_FALLBACK.to_string())
    }

    fn backend(&self) -> &'static str {
        "static"
    }
}

/// Claude-backed explainer.
pub struct LlmExplainer {
    llm: LlmClient,
}

impl LlmExplainer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Explainer for LlmExplainer {
    async fn explain(&self, symptoms: &str, risk: RiskTier) -> Result<String, LlmError> {
        let prompt = explain_prompt(symptoms, risk);
        self.llm.complete(&prompt, EXPLAIN_SYSTEM).await
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

/// Asks the explainer for a note within `timeout`.
/// Any error, timeout or empty answer yields the fallback text.
pub async fn explain_or_fallback(
    explainer: &dyn Explainer,
    symptoms: &str,
    risk: RiskTier,
    timeout: Duration,
) -> String {
    let outcome = tokio::time::timeout(timeout, explainer.explain(symptoms, risk))
        .await
        .unwrap_or(Err(LlmError::Timeout));

    match outcome {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            warn!(backend = explainer.backend(), "explainer returned empty text, using fallback");
            EXPLANATION_FALLBACK.to_string()
        }
        Err(e) => {
            warn!(backend = explainer.backend(), "explainer failed, using fallback: {e}");
            EXPLANATION_FALLBACK.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingExplainer;

    #[async_trait]
    impl Explainer for FailingExplainer {
        async fn explain(&self, _symptoms: &str, _risk: RiskTier) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 401,
                message: "invalid x-api-key".to_string(),
            })
        }

        fn backend(&self) -> &'static str {
            "failing"
        }
    }

    struct SlowExplainer;

    #[async_trait]
    impl Explainer for SlowExplainer {
        async fn explain(&self, _symptoms: &str, _risk: RiskTier) -> Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }

        fn backend(&self) -> &'static str {
            "slow"
        }
    }

    struct EchoExplainer;

    #[async_trait]
    impl Explainer for EchoExplainer {
        async fn explain(&self, symptoms: &str, risk: RiskTier) -> Result<String, LlmError> {
            Ok(format!("  {symptoms} looks {risk}  "))
        }

        fn backend(&self) -> &'static str {
            "echo"
        }
    }

    const TIMEOUT: Duration = Duration::from_secs(10);

    #[tokio::test]
    async fn test_failure_falls_back() {
        let text = explain_or_fallback(&FailingExplainer, "fever", RiskTier::Low, TIMEOUT).await;
        assert_eq!(text, EXPLANATION_FALLBACK);
    }

    #[tokio::test]
    async fn test_static_backend_returns_fallback() {
        let text = explain_or_fallback(&FallbackExplainer, "fever", RiskTier::Low, TIMEOUT).await;
        assert_eq!(text, EXPLANATION_FALLBACK);
    }

    #[tokio::test]
    async fn test_successful_answer_is_trimmed() {
        let text = explain_or_fallback(&EchoExplainer, "fever", RiskTier::High, TIMEOUT).await;
        assert_eq!(text, "fever looks High");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_explainer_times_out_to_fallback() {
        let text = explain_or_fallback(&SlowExplainer, "fever", RiskTier::Low, TIMEOUT).await;
        assert_eq!(text, EXPLANATION_FALLBACK);
    }
}
