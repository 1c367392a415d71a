//! Sustainability lookups — cosmetic, tier-derived metrics shown on reports.
//!
//! All functions are total: `None` stands for an unrecognised tier label.

use serde::Serialize;

use crate::risk::RiskTier;

/// Estimated savings from avoiding an unnecessary visit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnvironmentalImpact {
    #[serde(rename = "co2_saved")]
    pub co2_saved_kg: f64,
    #[serde(rename = "paper_saved")]
    pub paper_saved_sheets: f64,
}

pub fn green_score(tier: Option<RiskTier>) -> u32 {
    match tier {
        Some(RiskTier::Low) => 90,
        Some(RiskTier::Moderate) => 60,
        Some(RiskTier::High) => 25,
        Some(RiskTier::Emergency) => 5,
        None => 0,
    }
}

pub fn environmental_impact(tier: Option<RiskTier>) -> EnvironmentalImpact {
    let (co2_saved_kg, paper_saved_sheets) = match tier {
        Some(RiskTier::Low) => (4.5, 1.0),
        Some(RiskTier::Moderate) => (2.0, 0.5),
        Some(RiskTier::High) => (0.5, 0.0),
        Some(RiskTier::Emergency) | None => (0.0, 0.0),
    };
    EnvironmentalImpact {
        co2_saved_kg,
        paper_saved_sheets,
    }
}

pub fn medical_summary(tier: Option<RiskTier>) -> &'static str {
    match tier {
        Some(RiskTier::Low) => {
            "Low health risk detected. Preventive care reduces unnecessary \
             hospital visits and environmental impact."
        }
        Some(RiskTier::Moderate) => {
            "Moderate risk detected. Early consultation recommended \
             to prevent condition escalation."
        }
        Some(RiskTier::High) => {
            "High risk symptoms detected. Immediate medical consultation \
             strongly recommended."
        }
        Some(RiskTier::Emergency) => "Emergency symptoms detected. Seek immediate medical help.",
        None => "Health status could not be determined.",
    }
}
