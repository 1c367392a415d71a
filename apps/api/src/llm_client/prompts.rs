// Prompt fragments for the explanation enrichment.

use crate::risk::RiskTier;

pub const EXPLAIN_SYSTEM: &str = "You are a cautious health information assistant. \
    Explain in at most three plain sentences why the given symptoms may carry the stated \
    risk level and what general self-care or next step is sensible. \
    Do NOT diagnose. Do NOT name medications or doses. \
    Do NOT contradict the stated risk level. Respond with plain text only.";

/// Builds the user prompt for one explanation request.
pub fn explain_prompt(symptoms: &str, risk: RiskTier) -> String {
    format!(
        "Reported symptoms: {}\nAssessed risk level: {}\n\nExplain this assessment to the patient.",
        symptoms.trim(),
        risk.label()
    )
}
