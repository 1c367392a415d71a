//! Risk profiles — versioned, immutable rule sets consumed by the risk engine.
//!
//! A profile bundles the ordered symptom weight table, the emergency override
//! keywords, the tier thresholds, the age adjustments and the confidence curve.
//! Profiles are built once at startup and never mutated afterwards.

use anyhow::{bail, Result};

// ────────────────────────────────────────────────────────────────────────────
// Weight table
// ────────────────────────────────────────────────────────────────────────────

/// A single keyword → severity weight entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomWeight {
    pub keyword: String,
    pub weight: u32,
}

/// Ordered keyword table. Iteration order is the order detection notes are emitted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomWeightTable {
    entries: Vec<SymptomWeight>,
}

impl SymptomWeightTable {
    /// Builds a table from `(keyword, weight)` pairs.
    ///
    /// Keywords are trimmed and lowercased; empty keywords are rejected.
    pub fn new<I, K>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, u32)>,
        K: AsRef<str>,
    {
        let mut entries = Vec::new();
        for (keyword, weight) in pairs {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if keyword.is_empty() {
                bail!("symptom weight table contains an empty keyword");
            }
            entries.push(SymptomWeight { keyword, weight });
        }
        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymptomWeight> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Profile
// ────────────────────────────────────────────────────────────────────────────

/// How the emergency override keywords are matched against the symptom text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmergencyMatch {
    /// Keyword must equal one of the comma-separated, trimmed segments.
    ExactSegment,
    /// Keyword may appear anywhere in the text.
    Substring,
}

#[derive(Debug, Clone)]
pub struct RiskProfile {
    pub name: &'static str,
    pub version: u32,
    pub weights: SymptomWeightTable,
    pub emergency_keywords: Vec<String>,
    pub emergency_match: EmergencyMatch,
    /// Highest score still classified Low.
    pub low_max: u32,
    /// Highest score still classified Moderate.
    pub moderate_max: u32,
    pub senior_age: u32,
    pub senior_bonus: u32,
    /// Ages in `1..=child_max_age` get the child bonus. Age 0 means unknown.
    pub child_max_age: u32,
    pub child_bonus: u32,
    pub confidence_base: f64,
    pub confidence_step: f64,
    pub confidence_cap: f64,
}

pub const CANONICAL_PROFILE: &str = "canonical";
pub const LEGACY_PROFILE: &str = "legacy";

impl RiskProfile {
    /// The current rule set (version 2).
    pub fn canonical() -> Result<Self> {
        Ok(Self {
            name: CANONICAL_PROFILE,
            version: 2,
            weights: SymptomWeightTable::new([
                ("fever", 2),
                ("cough", 2),
                ("breathing", 5),
                ("shortness", 5),
                ("chest pain", 8),
                ("headache", 1),
                ("dizziness", 2),
                ("vomiting", 3),
                ("fatigue", 1),
            ])?,
            emergency_keywords: vec!["chest pain".to_string(), "emergency".to_string()],
            emergency_match: EmergencyMatch::ExactSegment,
            low_max: 4,
            moderate_max: 10,
            senior_age: 60,
            senior_bonus: 4,
            child_max_age: 5,
            child_bonus: 3,
            confidence_base: 65.0,
            confidence_step: 2.5,
            confidence_cap: 98.0,
        })
    }

    /// The first rule set (version 1). Kept so older clients can be served unchanged.
    pub fn legacy() -> Result<Self> {
        Ok(Self {
            name: LEGACY_PROFILE,
            version: 1,
            weights: SymptomWeightTable::new([
                ("fever", 2),
                ("cough", 2),
                ("breathing", 5),
                ("shortness", 5),
                ("chest pain", 6),
                ("headache", 1),
            ])?,
            emergency_keywords: vec!["chest pain".to_string(), "emergency".to_string()],
            emergency_match: EmergencyMatch::Substring,
            low_max: 3,
            moderate_max: 7,
            senior_age: 60,
            senior_bonus: 3,
            child_max_age: 5,
            child_bonus: 2,
            confidence_base: 70.0,
            confidence_step: 3.0,
            confidence_cap: 95.0,
        })
    }

    /// Resolves a profile by name (case-insensitive).
    pub fn by_name(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            CANONICAL_PROFILE => Self::canonical(),
            LEGACY_PROFILE => Self::legacy(),
            other => bail!(
                "Unknown risk profile '{other}' (expected '{CANONICAL_PROFILE}' or '{LEGACY_PROFILE}')"
            ),
        }
    }
}
