//! Value objects crossing the engine boundary.

use serde::{Deserialize, Serialize};

/// Outcome of matching a keyword list against a resume.
///
/// `matched` and `missing` preserve the keywords' original casing and input
/// order; `semantically_matched` is the subset of `matched` produced by the
/// embedding fallback rather than a literal-text tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub semantically_matched: Vec<String>,
    /// In [0, 100], rounded to one decimal place.
    pub match_percentage: f64,
    pub total_keywords: usize,
    pub matched_count: usize,
}

impl MatchResult {
    pub fn empty() -> Self {
        Self {
            matched: Vec::new(),
            missing: Vec::new(),
            semantically_matched: Vec::new(),
            match_percentage: 0.0,
            total_keywords: 0,
            matched_count: 0,
        }
    }
}

/// Full scoring breakdown, every sub-score on a 0–100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsScore {
    pub overall_score: u32,
    pub keyword_match: u32,
    pub section_completeness: u32,
    pub role_alignment: u32,
    pub formatting_score: u32,
    pub content_quality: u32,
    pub explanation: String,
    pub missing_keywords: Vec<String>,
    pub suggestions: Vec<String>,
}

fn default_quality_score() -> u32 {
    70
}

/// The structured response requested from the qualitative scoring call.
/// Deserialized leniently: a field the model omits takes its fallback value
/// rather than failing the whole response.
#[derive(Debug, Clone, Deserialize)]
pub struct QualitativeScores {
    #[serde(default = "default_quality_score")]
    pub role_alignment: u32,
    #[serde(default = "default_quality_score")]
    pub content_quality: u32,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}
