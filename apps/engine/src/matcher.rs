//! Keyword matching — tiered literal matching with an embedding fallback.
//!
//! Each keyword is tried against the resume in a fixed precedence order,
//! stopping at the first tier that succeeds:
//!
//! 1. exact — normalized keyword is a substring of the normalized resume
//! 2. acronym → expansion ("ml" matches a resume saying "machine learning")
//! 3. expansion → acronym ("amazon web services" matches a resume saying "aws")
//! 4. canonical — the keyword's canonical skill name appears in the resume
//!
//! Keywords still missing afterwards get one best-effort semantic pass: the
//! resume is embedded once, each missing keyword individually, and a cosine
//! similarity at or above the threshold counts as a match. If the resume
//! itself cannot be embedded the whole pass is skipped; a single keyword
//! embedding failure skips only that keyword.

use tracing::debug;

use crate::llm::GenerativeModel;
use crate::models::MatchResult;
use crate::ontology::{acronym_for, expand_acronym, Ontology};
use crate::text::normalize;

/// Matches `keywords` against `resume_text`, preserving each keyword's
/// original casing in the result.
pub async fn match_keywords(
    resume_text: &str,
    keywords: &[String],
    llm: &dyn GenerativeModel,
    ontology: &Ontology,
    semantic_threshold: f64,
) -> MatchResult {
    let resume_normalized = normalize(resume_text);

    let mut matched: Vec<String> = Vec::new();
    let mut missing: Vec<String> = Vec::new();

    for keyword in keywords {
        if matches_literally(&resume_normalized, keyword, ontology) {
            matched.push(keyword.clone());
        } else {
            missing.push(keyword.clone());
        }
    }

    let mut semantically_matched: Vec<String> = Vec::new();
    if !missing.is_empty() {
        missing = semantic_pass(
            resume_text,
            missing,
            &mut matched,
            &mut semantically_matched,
            llm,
            semantic_threshold,
        )
        .await;
    }

    let total = keywords.len();
    let percentage = if total > 0 {
        (matched.len() as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    MatchResult {
        matched_count: matched.len(),
        matched,
        missing,
        semantically_matched,
        match_percentage: (percentage * 10.0).round() / 10.0,
        total_keywords: total,
    }
}

fn matches_literally(resume_normalized: &str, keyword: &str, ontology: &Ontology) -> bool {
    let keyword_norm = normalize(keyword);
    if keyword_norm.is_empty() {
        return false;
    }

    // Tier 1: exact substring
    if resume_normalized.contains(&keyword_norm) {
        return true;
    }

    // Tier 2: keyword is an acronym whose expansion the resume spells out
    if let Some(expansion) = expand_acronym(&keyword_norm) {
        if resume_normalized.contains(expansion) {
            return true;
        }
    }

    // Tier 3: keyword is an expansion the resume abbreviates
    if let Some(acronym) = acronym_for(&keyword_norm) {
        if resume_normalized.contains(&normalize(acronym)) {
            return true;
        }
    }

    // Tier 4: canonical skill name
    if let Some(canonical) = ontology.canonicalize(&keyword_norm) {
        if resume_normalized.contains(&canonical.to_lowercase()) {
            return true;
        }
    }

    false
}

/// Runs the embedding fallback over `missing`, moving semantic hits into
/// `matched` and `semantically_matched`. Returns the keywords still missing.
async fn semantic_pass(
    resume_text: &str,
    missing: Vec<String>,
    matched: &mut Vec<String>,
    semantically_matched: &mut Vec<String>,
    llm: &dyn GenerativeModel,
    threshold: f64,
) -> Vec<String> {
    let resume_embedding = match llm.embed_text(resume_text).await {
        Some(embedding) => embedding,
        None => {
            // No resume-level embedding means no partial semantic matching
            debug!("embeddings unavailable, skipping semantic fallback");
            return missing;
        }
    };

    let mut still_missing = Vec::new();
    for keyword in missing {
        let Some(keyword_embedding) = llm.embed_text(&keyword).await else {
            still_missing.push(keyword);
            continue;
        };

        let similarity = cosine_similarity(&resume_embedding, &keyword_embedding);
        if similarity >= threshold {
            debug!("semantic match '{keyword}' at {similarity:.3}");
            semantically_matched.push(keyword.clone());
            matched.push(keyword);
        } else {
            still_missing.push(keyword);
        }
    }
    still_missing
}

/// Cosine similarity in f64 to avoid accumulation error on long vectors.
/// Zero for mismatched lengths or zero-magnitude input.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let x64 = f64::from(x);
        let y64 = f64::from(y);
        dot += x64 * y64;
        norm_a += x64 * x64;
        norm_b += y64 * y64;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return 0.0;
    }
    dot / denom
}
