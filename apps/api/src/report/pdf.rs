//! PDF report renderer.
//!
//! Produces a single A4 page using the PDF standard fonts (Helvetica / Helvetica-Bold),
//! so nothing has to be embedded. Body text is word-wrapped with the Helvetica width
//! table; anything that does not fit on the page is cut and marked with an ellipsis line.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use uuid::Uuid;

use crate::report::font_metrics::{PageConfig, HELVETICA};
use crate::risk::RiskAssessment;
use crate::sustainability::EnvironmentalImpact;

pub const REPORT_TITLE: &str = "CareBridge AI Health Report";
pub const REPORT_FILENAME: &str = "CareBridge_Report.pdf";

/// Everything printed on the report. Built by the handler, consumed once.
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub age: u32,
    pub location: Option<String>,
    pub symptoms: String,
    pub assessment: RiskAssessment,
    pub medical_summary: String,
    pub green_score: u32,
    pub impact: EnvironmentalImpact,
    pub ai_insight: String,
    pub disclaimer: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Style {
    Title,
    Heading,
    Body,
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    style: Style,
    text: String,
}

/// Renders the report and returns the PDF bytes.
pub fn render_report(input: &ReportInput, config: &PageConfig) -> Result<Vec<u8>> {
    let lines = fit_to_page(layout_lines(input, config), config);
    let content = build_content(&lines, config);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let encoded = content
        .encode()
        .context("Failed to encode report content stream")?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), config.width_pt.into(), config.height_pt.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .context("Failed to serialize PDF report")?;
    Ok(buf)
}

fn layout_lines(input: &ReportInput, config: &PageConfig) -> Vec<Line> {
    let width = config.text_width_em();
    let a = &input.assessment;
    let mut lines = vec![Line {
        style: Style::Title,
        text: REPORT_TITLE.to_string(),
    }];

    let body = |lines: &mut Vec<Line>, text: &str| {
        lines.extend(HELVETICA.wrap(text, width).into_iter().map(|text| Line {
            style: Style::Body,
            text,
        }));
    };
    let heading = |lines: &mut Vec<Line>, text: &str| {
        lines.push(Line {
            style: Style::Heading,
            text: text.to_string(),
        });
    };

    body(
        &mut lines,
        &format!(
            "Report ID: {} | Generated: {}",
            input.report_id,
            input.generated_at.format("%Y-%m-%d %H:%M UTC")
        ),
    );

    heading(&mut lines, "Patient Details");
    let age = if input.age == 0 {
        "Not specified".to_string()
    } else {
        input.age.to_string()
    };
    body(&mut lines, &format!("Age: {age}"));
    if let Some(location) = input.location.as_deref().filter(|l| !l.trim().is_empty()) {
        body(&mut lines, &format!("Location: {}", location.trim()));
    }
    let symptoms = if input.symptoms.trim().is_empty() {
        "None reported"
    } else {
        input.symptoms.trim()
    };
    body(&mut lines, &format!("Symptoms: {symptoms}"));

    heading(&mut lines, "Risk Assessment");
    body(&mut lines, &format!("Risk Level: {}", a.risk));
    body(&mut lines, &format!("Confidence: {}%", a.confidence));
    body(&mut lines, &format!("Advice: {}", a.explanation));
    if let Some(map) = a.hospital_map.as_deref() {
        body(&mut lines, &format!("Find care: {map}"));
    }

    heading(&mut lines, "Medical Summary");
    body(&mut lines, input.medical_summary.as_str());

    heading(&mut lines, "Sustainability");
    body(&mut lines, &format!("Green Score: {}/100", input.green_score));
    body(
        &mut lines,
        &format!(
            "Estimated CO2 saved: {} kg | Paper saved: {} sheets",
            input.impact.co2_saved_kg, input.impact.paper_saved_sheets
        ),
    );

    heading(&mut lines, "AI Insight");
    body(&mut lines, input.ai_insight.as_str());

    heading(&mut lines, "Disclaimer");
    body(&mut lines, input.disclaimer.as_str());

    lines
}

fn line_height(style: Style, config: &PageConfig) -> f32 {
    match style {
        Style::Title => config.title_size_pt * 1.6,
        Style::Heading => config.heading_size_pt * 2.0,
        Style::Body => config.line_height_pt,
    }
}

/// Drops lines that would run past the bottom margin, replacing the last kept line with "...".
fn fit_to_page(lines: Vec<Line>, config: &PageConfig) -> Vec<Line> {
    let available = config.height_pt - 2.0 * config.margin_pt;
    let mut used = 0.0_f32;
    let mut kept = Vec::with_capacity(lines.len());
    let total = lines.len();

    for line in lines {
        let h = line_height(line.style, config);
        if used + h > available {
            break;
        }
        used += h;
        kept.push(line);
    }

    if kept.len() < total {
        if let Some(last) = kept.last_mut() {
            *last = Line {
                style: Style::Body,
                text: "...".to_string(),
            };
        }
    }
    kept
}

fn build_content(lines: &[Line], config: &PageConfig) -> Content {
    let mut operations = Vec::with_capacity(lines.len() * 5);
    let mut y = config.height_pt - config.margin_pt;

    for line in lines {
        y -= line_height(line.style, config);
        let (font, size) = match line.style {
            Style::Title => ("F2", config.title_size_pt),
            Style::Heading => ("F2", config.heading_size_pt),
            Style::Body => ("F1", config.font_size_pt),
        };
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec![font.into(), size.into()]));
        operations.push(Operation::new("Td", vec![config.margin_pt.into(), y.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(to_win_ansi(&line.text))],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    Content { operations }
}

/// Encodes text for the WinAnsi standard fonts. Latin-1 letters pass through;
/// control characters become spaces; anything else becomes '?'.
fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u32 as u8,
            _ if c.is_control() => b' ',
            _ => b'?',
        })
        .collect()
}
