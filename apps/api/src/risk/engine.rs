//! Risk engine — keyword scoring followed by threshold classification.
//!
//! Algorithm:
//! 1. Lowercase and trim the symptom text.
//! 2. Emergency override: if an emergency keyword matches (per the profile's match
//!    mode), return the Emergency tier immediately. No scoring happens.
//! 3. Sum the weights of every table keyword found as a substring, noting each hit.
//! 4. Age adjustment: senior and child bonuses. Age 0 is "unknown" and adds nothing.
//! 5. Tier by cumulative score against the profile thresholds.
//! 6. confidence = min(cap, base + score × step), rounded to 2 decimals.
//!
//! The engine holds only its immutable profile, so one instance is shared by all requests.

use tracing::debug;

use crate::risk::models::{RiskAssessment, RiskTier};
use crate::risk::profile::{EmergencyMatch, RiskProfile};

pub const LOW_ADVICE: &str = "Rest, hydrate and monitor symptoms";
pub const MODERATE_ADVICE: &str = "Consult doctor if symptoms persist";
pub const HIGH_ADVICE: &str = "Medical consultation strongly recommended";
pub const EMERGENCY_ADVICE: &str =
    "Critical symptom detected. Seek emergency medical help immediately.";

pub const EMERGENCY_CONFIDENCE: f64 = 95.0;

pub const HOME_CARE_URL: &str = "https://www.google.com/search?q=home+care+tips";
pub const CLINIC_SEARCH_URL: &str = "https://www.google.com/maps/search/clinic+near+me";
pub const HOSPITAL_SEARCH_URL: &str = "https://www.google.com/maps/search/hospital+near+me";

const SENIOR_NOTE: &str = "Senior age risk factor";
const CHILD_NOTE: &str = "Child age risk factor";

/// Intermediate result of the weighted scoring pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub score: u32,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RiskEngine {
    profile: RiskProfile,
    include_hospital_map: bool,
}

impl RiskEngine {
    pub fn new(profile: RiskProfile) -> Self {
        Self {
            profile,
            include_hospital_map: true,
        }
    }

    pub fn with_hospital_map(mut self, include: bool) -> Self {
        self.include_hospital_map = include;
        self
    }

    pub fn profile(&self) -> &RiskProfile {
        &self.profile
    }

    /// Classifies a symptom description. Total over its input domain; never fails.
    ///
    /// `location` is accepted for interface parity and does not influence the result.
    pub fn assess(&self, symptoms: &str, age: u32, _location: Option<&str>) -> RiskAssessment {
        let normalized = symptoms.trim().to_lowercase();

        if self.is_emergency(&normalized) {
            debug!(profile = self.profile.name, "emergency override triggered");
            return RiskAssessment {
                risk: RiskTier::Emergency,
                confidence: EMERGENCY_CONFIDENCE,
                explanation: EMERGENCY_ADVICE.to_string(),
                hospital_map: self.map_for(RiskTier::Emergency),
            };
        }

        let breakdown = self.score(&normalized, age);
        let risk = self.classify(breakdown.score);
        let confidence = self.confidence(breakdown.score);

        debug!(
            profile = self.profile.name,
            score = breakdown.score,
            tier = %risk,
            "symptoms assessed"
        );

        RiskAssessment {
            risk,
            confidence,
            explanation: build_explanation(&breakdown.notes, advice_for(risk)),
            hospital_map: self.map_for(risk),
        }
    }

    /// Emergency override check against already-normalised text.
    pub fn is_emergency(&self, normalized: &str) -> bool {
        let keywords = &self.profile.emergency_keywords;
        match self.profile.emergency_match {
            EmergencyMatch::ExactSegment => normalized
                .split(',')
                .map(str::trim)
                .any(|segment| keywords.iter().any(|k| k == segment)),
            EmergencyMatch::Substring => keywords.iter().any(|k| normalized.contains(k.as_str())),
        }
    }

    /// Weighted keyword pass plus age adjustment, against already-normalised text.
    pub fn score(&self, normalized: &str, age: u32) -> ScoreBreakdown {
        let mut score = 0u32;
        let mut notes = Vec::new();

        for entry in self.profile.weights.iter() {
            if normalized.contains(entry.keyword.as_str()) {
                score = score.saturating_add(entry.weight);
                notes.push(format!("{} detected", title_case(&entry.keyword)));
            }
        }

        if age >= self.profile.senior_age {
            score = score.saturating_add(self.profile.senior_bonus);
            notes.push(SENIOR_NOTE.to_string());
        }

        if age > 0 && age <= self.profile.child_max_age {
            score = score.saturating_add(self.profile.child_bonus);
            notes.push(CHILD_NOTE.to_string());
        }

        ScoreBreakdown { score, notes }
    }

    pub fn classify(&self, score: u32) -> RiskTier {
        if score <= self.profile.low_max {
            RiskTier::Low
        } else if score <= self.profile.moderate_max {
            RiskTier::Moderate
        } else {
            RiskTier::High
        }
    }

    pub fn confidence(&self, score: u32) -> f64 {
        let p = &self.profile;
        let raw = (p.confidence_base + score as f64 * p.confidence_step).clamp(0.0, p.confidence_cap);
        round2(raw)
    }

    fn map_for(&self, tier: RiskTier) -> Option<String> {
        self.include_hospital_map
            .then(|| hospital_search_url(tier).to_string())
    }
}

pub fn advice_for(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::Low => LOW_ADVICE,
        RiskTier::Moderate => MODERATE_ADVICE,
        RiskTier::High => HIGH_ADVICE,
        RiskTier::Emergency => EMERGENCY_ADVICE,
    }
}

pub fn hospital_search_url(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::Low => HOME_CARE_URL,
        RiskTier::Moderate => CLINIC_SEARCH_URL,
        RiskTier::High | RiskTier::Emergency => HOSPITAL_SEARCH_URL,
    }
}

/// Notes joined with `" | "`, then `". "` and the advice. Advice alone when there are no notes.
fn build_explanation(notes: &[String], advice: &str) -> String {
    if notes.is_empty() {
        return advice.to_string();
    }
    format!("{}. {}", notes.join(" | "), advice)
}

/// Uppercases the first letter of every alphabetic run ("chest pain" → "Chest Pain").
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
