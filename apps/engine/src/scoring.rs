//! Score aggregation — deterministic sub-scores plus externally-sourced
//! qualitative signals, combined into one weighted 0–100 score.
//!
//! The qualitative call is the only fallible step, and its failure is a
//! first-class branch: the aggregator matches on the error and substitutes
//! fixed default scores. A scoring request therefore never fails outright.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::llm::GenerativeModel;
use crate::models::QualitativeScores;
use crate::prompts::{ATS_SCORING_PROMPT_TEMPLATE, GENERAL_QUALITY_PROMPT_TEMPLATE};

pub const WEIGHT_KEYWORD_MATCH: f64 = 0.30;
pub const WEIGHT_SECTION_COMPLETENESS: f64 = 0.20;
pub const WEIGHT_FORMATTING: f64 = 0.10;
pub const WEIGHT_ROLE_ALIGNMENT: f64 = 0.25;
pub const WEIGHT_CONTENT_QUALITY: f64 = 0.15;

/// Default for both qualitative sub-scores when the external call fails.
pub const FALLBACK_QUALITY_SCORE: u32 = 70;

/// The five canonical resume sections and their heading aliases.
const RESUME_SECTIONS: &[&[&str]] = &[
    &["summary", "profile", "objective"],
    &["experience", "work history", "employment"],
    &["education", "academic", "degree"],
    &["skills", "technical skills", "competencies"],
    &["projects", "portfolio"],
];

// Characters outside this class tend to confuse ATS parsers.
static ATS_UNSAFE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\-()\[\]/.,:;@+]").unwrap());

// MM/YYYY or "Month YYYY"
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}/\d{4}\b|\b[A-Za-z]+\s+\d{4}\b").unwrap());

/// Section completeness: fraction of the five canonical sections whose
/// heading (or an alias) appears anywhere in the text, scaled to 0–100.
pub fn score_sections(resume_text: &str) -> u32 {
    let text_lower = resume_text.to_lowercase();
    let found = RESUME_SECTIONS
        .iter()
        .filter(|aliases| aliases.iter().any(|alias| text_lower.contains(alias)))
        .count();

    ((found as f64 / RESUME_SECTIONS.len() as f64) * 100.0).round() as u32
}

/// Formatting score: starts at 100, penalized for ATS-hostile traits,
/// floored at 0.
pub fn score_formatting(resume_text: &str, config: &EngineConfig) -> u32 {
    let mut penalty = 0u32;

    let unsafe_chars = ATS_UNSAFE_RE.find_iter(resume_text).count();
    if unsafe_chars > config.unsafe_char_limit {
        penalty += config.unsafe_char_penalty;
    }

    if !DATE_RE.is_match(resume_text) {
        penalty += config.missing_dates_penalty;
    }

    if resume_text.chars().count() < config.min_resume_chars {
        penalty += config.short_resume_penalty;
    }

    100u32.saturating_sub(penalty)
}

/// The weighted overall score. Each input is already clamped to 0–100.
pub fn weighted_overall(
    keyword_match: u32,
    section_completeness: u32,
    formatting: u32,
    role_alignment: u32,
    content_quality: u32,
) -> u32 {
    (f64::from(keyword_match) * WEIGHT_KEYWORD_MATCH
        + f64::from(section_completeness) * WEIGHT_SECTION_COMPLETENESS
        + f64::from(formatting) * WEIGHT_FORMATTING
        + f64::from(role_alignment) * WEIGHT_ROLE_ALIGNMENT
        + f64::from(content_quality) * WEIGHT_CONTENT_QUALITY)
        .round() as u32
}

/// Requests the qualitative sub-scores from the model. The error is handed
/// back to the aggregator, which owns the fallback policy.
pub async fn qualitative_scores(
    resume_text: &str,
    job_description: Option<&str>,
    temperature: f32,
    llm: &dyn GenerativeModel,
) -> Result<QualitativeScores, EngineError> {
    let prompt = match job_description {
        Some(jd) => ATS_SCORING_PROMPT_TEMPLATE
            .replace("{resume_text}", resume_text)
            .replace("{job_description}", jd),
        None => GENERAL_QUALITY_PROMPT_TEMPLATE.replace("{resume_text}", resume_text),
    };

    let value: Value = llm.generate_structured(&prompt, temperature).await?;
    serde_json::from_value(value).map_err(|e| EngineError::MalformedResponse(e.to_string()))
}

/// The qualitative fields the aggregator falls back to when the external
/// call fails, phrased per mode.
pub fn fallback_qualitative(with_job_description: bool) -> QualitativeScores {
    if with_job_description {
        QualitativeScores {
            role_alignment: FALLBACK_QUALITY_SCORE,
            content_quality: FALLBACK_QUALITY_SCORE,
            explanation: "AI scoring unavailable. Using default scores.".to_string(),
            missing_keywords: Vec::new(),
            suggestions: vec!["Ensure API credentials are configured correctly.".to_string()],
        }
    } else {
        QualitativeScores {
            role_alignment: FALLBACK_QUALITY_SCORE,
            content_quality: FALLBACK_QUALITY_SCORE,
            explanation: "Resume scored without job description. Assessed for general quality."
                .to_string(),
            missing_keywords: Vec::new(),
            suggestions: vec![
                "Add a job description for targeted optimization suggestions.".to_string()
            ],
        }
    }
}

/// Resolves the qualitative result: success passes through (scores clamped),
/// failure logs and selects the fallback for the mode.
pub fn resolve_qualitative(
    result: Result<QualitativeScores, EngineError>,
    with_job_description: bool,
) -> QualitativeScores {
    match result {
        Ok(mut scores) => {
            scores.role_alignment = scores.role_alignment.min(100);
            scores.content_quality = scores.content_quality.min(100);
            if scores.explanation.is_empty() {
                scores.explanation = if with_job_description {
                    "Resume evaluated against job requirements."
                } else {
                    "Resume assessed for general quality."
                }
                .to_string();
            }
            scores
        }
        Err(e) => {
            warn!("qualitative scoring failed, using defaults: {e}");
            fallback_qualitative(with_job_description)
        }
    }
}
