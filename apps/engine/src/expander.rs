//! JD keyword expansion — LLM-enriched, cached, with a deterministic
//! frequency fallback.
//!
//! The cache key is a content hash of the exact job-description bytes, so a
//! repeated posting never pays for a second expansion call within the TTL.
//! Partial results are never cached: the store is written once, after the
//! full expand → fallback → canonicalize pipeline has produced its result.

use tracing::{debug, warn};

use crate::cache::{content_key, CacheStore};
use crate::llm::GenerativeModel;
use crate::ontology::Ontology;
use crate::prompts::JD_KEYWORD_PROMPT_TEMPLATE;
use crate::text::{extract_keywords, normalize};

/// Expands a job description into an enriched skill-keyword list.
///
/// Read-through on the cache; on a miss, asks the model for a delimited
/// list, falls back to frequency extraction when the call fails or returns
/// nothing, maps every term through the ontology, then writes through.
pub async fn expand_jd_keywords(
    job_description: &str,
    max_keywords: usize,
    temperature: f32,
    llm: &dyn GenerativeModel,
    cache: &dyn CacheStore,
    ontology: &Ontology,
) -> Vec<String> {
    let key = content_key(job_description);
    if let Some(cached) = cache.get(&key) {
        debug!("keyword expansion served from cache");
        return cached;
    }

    let prompt = JD_KEYWORD_PROMPT_TEMPLATE
        .replace("{max_keywords}", &max_keywords.to_string())
        .replace("{job_description}", job_description);

    let mut keywords: Vec<String> = match llm.generate_text(&prompt, temperature).await {
        Ok(response) => parse_keyword_list(&response),
        Err(e) => {
            warn!("keyword expansion call failed, using frequency fallback: {e}");
            Vec::new()
        }
    };

    if keywords.is_empty() {
        keywords = extract_keywords(job_description, max_keywords);
    }

    let mapped: Vec<String> = keywords
        .into_iter()
        .map(|keyword| match ontology.canonicalize(&keyword) {
            Some(canonical) => canonical.to_string(),
            None => keyword,
        })
        .collect();

    cache.put(&key, &mapped);
    mapped
}

/// Produces the keyword list for a job description: the plain frequency pass
/// unioned with the cached LLM expansion, first-seen order preserved,
/// de-duplicated by normalized form.
pub async fn jd_keywords(
    job_description: &str,
    top_n: usize,
    temperature: f32,
    llm: &dyn GenerativeModel,
    cache: &dyn CacheStore,
    ontology: &Ontology,
) -> Vec<String> {
    let base = extract_keywords(job_description, top_n);
    let expanded =
        expand_jd_keywords(job_description, top_n, temperature, llm, cache, ontology).await;

    let mut seen = std::collections::HashSet::new();
    let mut result = Vec::new();
    for keyword in base.into_iter().chain(expanded) {
        let normalized = normalize(&keyword);
        if normalized.is_empty() || !seen.insert(normalized.clone()) {
            continue;
        }
        result.push(normalized);
    }
    result
}

/// Splits a comma/semicolon/newline-delimited model response into normalized,
/// non-empty terms.
fn parse_keyword_list(response: &str) -> Vec<String> {
    response
        .split(['\n', ',', ';'])
        .map(normalize)
        .filter(|term| !term.is_empty())
        .collect()
}
