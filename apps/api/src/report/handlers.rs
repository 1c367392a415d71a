//! Axum route handler for PDF report downloads.

use anyhow::Context;
use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::config::MEDICAL_DISCLAIMER;
use crate::errors::AppError;
use crate::explain::explain_or_fallback;
use crate::report::pdf::{render_report, ReportInput, REPORT_FILENAME};
use crate::risk::handlers::AnalyzeRequest;
use crate::state::AppState;
use crate::sustainability::{environmental_impact, green_score, medical_summary};

/// POST /generate-report
///
/// Same input as `/analyze`. Runs the assessment, adds the sustainability figures and
/// an explanation note, and returns the rendered PDF as an attachment.
/// Rendering is CPU-bound and runs inside `spawn_blocking`.
pub async fn handle_generate_report(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let report = request.into_report()?;

    let assessment = state
        .engine
        .assess(&report.symptoms, report.age, report.location.as_deref());
    let tier = Some(assessment.risk);

    let ai_insight = explain_or_fallback(
        state.explainer.as_ref(),
        &report.symptoms,
        assessment.risk,
        state.config.explain_timeout,
    )
    .await;

    let report_id = Uuid::new_v4();
    let input = ReportInput {
        report_id,
        generated_at: Utc::now(),
        age: report.age,
        location: report.location,
        symptoms: report.symptoms,
        medical_summary: medical_summary(tier).to_string(),
        green_score: green_score(tier),
        impact: environmental_impact(tier),
        assessment,
        ai_insight,
        disclaimer: MEDICAL_DISCLAIMER.to_string(),
    };

    let page_config = state.page_config.clone();
    let pdf = tokio::task::spawn_blocking(move || render_report(&input, &page_config))
        .await
        .context("Report rendering task failed")??;

    info!(%report_id, bytes = pdf.len(), "report generated");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{REPORT_FILENAME}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}
