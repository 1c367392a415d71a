//! Axum route handler for the risk assessment API, plus the request shape shared
//! with the report endpoint.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::risk::{RiskAssessment, SymptomReport};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

/// Raw request body for `/analyze` and `/generate-report`.
///
/// `age` stays loosely typed here: clients send numbers, numeric strings, or nothing.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub location: Option<String>,
}

impl AnalyzeRequest {
    /// Validates and normalises the request into engine input.
    pub fn into_report(self) -> Result<SymptomReport, AppError> {
        Ok(SymptomReport {
            symptoms: self.symptoms.unwrap_or_default(),
            age: coerce_age(self.age.as_ref())?,
            location: self
                .location
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
        })
    }
}

/// Coerces a JSON age into a non-negative whole number.
///
/// Missing or `null` → 0 (unknown). Integral floats are truncated. Numeric strings are
/// trimmed and parsed as integers. Anything negative or non-numeric is rejected.
pub fn coerce_age(value: Option<&Value>) -> Result<u32, AppError> {
    let invalid = || {
        AppError::Validation(
            "Invalid input data: age must be a non-negative whole number".to_string(),
        )
    };

    match value {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => {
            if let Some(u) = n.as_u64() {
                u32::try_from(u).map_err(|_| invalid())
            } else if n.as_i64().is_some() {
                // Only negative integers reach here.
                Err(invalid())
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f >= 0.0 && f < u32::MAX as f64 => {
                        Ok(f.trunc() as u32)
                    }
                    _ => Err(invalid()),
                }
            }
        }
        Some(Value::String(s)) => {
            let parsed: i64 = s.trim().parse().map_err(|_| invalid())?;
            u32::try_from(parsed).map_err(|_| invalid())
        }
        Some(_) => Err(invalid()),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /analyze
///
/// Scores free-text symptoms and returns the risk tier, confidence, advice and an
/// optional care-search link.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<RiskAssessment>, AppError> {
    let Json(request) = payload?;
    let report = request.into_report()?;

    let assessment = state
        .engine
        .assess(&report.symptoms, report.age, report.location.as_deref());

    info!(
        risk = %assessment.risk,
        confidence = assessment.confidence,
        "analysis complete"
    );

    Ok(Json(assessment))
}
