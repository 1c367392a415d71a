// Risk assessment: versioned keyword profiles, the scoring engine, and the /analyze handler.

pub mod engine;
pub mod handlers;
pub mod models;
pub mod profile;

pub use engine::RiskEngine;
pub use models::{RiskAssessment, RiskTier, SymptomReport};
pub use profile::RiskProfile;
