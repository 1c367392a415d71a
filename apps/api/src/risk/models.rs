use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Qualitative risk tier returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
    #[serde(rename = "EMERGENCY", alias = "Emergency")]
    Emergency,
}

impl RiskTier {
    /// Wire label, as the front-end expects it.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Emergency => "EMERGENCY",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTier(pub String);

impl fmt::Display for UnknownTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown risk tier '{}'", self.0)
    }
}

impl std::error::Error for UnknownTier {}

impl FromStr for RiskTier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "moderate" => Ok(Self::Moderate),
            "high" => Ok(Self::High),
            "emergency" => Ok(Self::Emergency),
            _ => Err(UnknownTier(s.to_string())),
        }
    }
}

/// Validated engine input. Built fresh per request, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymptomReport {
    pub symptoms: String,
    /// 0 means the age was not given.
    pub age: u32,
    /// Carried through to reports; not used for scoring.
    pub location: Option<String>,
}

/// Engine output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk: RiskTier,
    /// Synthetic percentage, rounded to two decimals.
    pub confidence: f64,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital_map: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_parses_any_casing() {
        assert_eq!("moderate".parse::<RiskTier>().unwrap(), RiskTier::Moderate);
        assert_eq!("EMERGENCY".parse::<RiskTier>().unwrap(), RiskTier::Emergency);
        assert_eq!(" Emergency ".parse::<RiskTier>().unwrap(), RiskTier::Emergency);
        assert!("Critical".parse::<RiskTier>().is_err());
    }

    #[test]
    fn test_tier_wire_labels() {
        assert_eq!(serde_json::to_string(&RiskTier::Low).unwrap(), "\"Low\"");
        assert_eq!(
            serde_json::to_string(&RiskTier::Emergency).unwrap(),
            "\"EMERGENCY\""
        );
        let parsed: RiskTier = serde_json::from_str("\"Emergency\"").unwrap();
        assert_eq!(parsed, RiskTier::Emergency);
    }

    #[test]
    fn test_hospital_map_omitted_when_absent() {
        let assessment = RiskAssessment {
            risk: RiskTier::Low,
            confidence: 65.0,
            explanation: "Rest".to_string(),
            hospital_map: None,
        };
        let value = serde_json::to_value(&assessment).unwrap();
        assert!(value.get("hospital_map").is_none());
        assert_eq!(value["risk"], "Low");
    }
}
