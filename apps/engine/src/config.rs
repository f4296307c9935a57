use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cache::KEYWORD_CACHE_TTL_SECS;
use crate::text::JD_TOP_N;

/// Engine tunables. Every threshold that drives a scoring decision lives
/// here with its documented default, so deployments can adjust without a
/// code change.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory holding the durable keyword-expansion cache.
    pub cache_dir: PathBuf,
    /// Keyword-expansion cache TTL in seconds.
    pub cache_ttl_secs: i64,
    /// Path to the canonical→aliases skills ontology JSON.
    pub ontology_path: PathBuf,
    /// Keywords extracted/requested per job description.
    pub jd_keyword_count: usize,
    /// Cosine-similarity floor for the semantic matching fallback.
    pub semantic_similarity_threshold: f64,
    /// Disallowed-character count above which the formatting penalty applies.
    pub unsafe_char_limit: usize,
    pub unsafe_char_penalty: u32,
    /// Penalty when no MM/YYYY or "Month YYYY" date appears anywhere.
    pub missing_dates_penalty: u32,
    /// Resumes shorter than this many characters look incomplete.
    pub min_resume_chars: usize,
    pub short_resume_penalty: u32,
    /// Temperature for the qualitative scoring calls. Low for consistency.
    pub scoring_temperature: f32,
    /// Temperature for keyword expansion. Zero: we want a list, not prose.
    pub expansion_temperature: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("data/jd_keyword_cache"),
            cache_ttl_secs: KEYWORD_CACHE_TTL_SECS,
            ontology_path: PathBuf::from("data/skills_ontology.json"),
            jd_keyword_count: JD_TOP_N,
            semantic_similarity_threshold: 0.78,
            unsafe_char_limit: 10,
            unsafe_char_penalty: 20,
            missing_dates_penalty: 15,
            min_resume_chars: 200,
            short_resume_penalty: 30,
            scoring_temperature: 0.3,
            expansion_temperature: 0.0,
        }
    }
}

impl EngineConfig {
    /// Loads the config, letting environment variables override the
    /// operational defaults. Scoring thresholds keep their defaults; they are
    /// adjusted in code by the constructing service when needed.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let mut config = Self::default();
        if let Ok(dir) = std::env::var("ATS_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Ok(ttl) = std::env::var("ATS_CACHE_TTL_SECS") {
            config.cache_ttl_secs = ttl
                .parse::<i64>()
                .context("ATS_CACHE_TTL_SECS must be an integer number of seconds")?;
        }
        if let Ok(path) = std::env::var("ATS_ONTOLOGY_PATH") {
            config.ontology_path = PathBuf::from(path);
        }
        if let Ok(threshold) = std::env::var("ATS_SEMANTIC_THRESHOLD") {
            config.semantic_similarity_threshold = threshold
                .parse::<f64>()
                .context("ATS_SEMANTIC_THRESHOLD must be a float in [0,1]")?;
        }
        Ok(config)
    }
}

pub(crate) fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
