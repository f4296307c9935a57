//! The scoring engine — entry points consumed by the service layer.
//!
//! Explicitly constructed and dependency-injected: the engine holds its
//! collaborators (language model, cache store, ontology) behind trait
//! objects rather than reaching into global state, so every seam can be
//! swapped in tests.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheStore, FileCacheStore};
use crate::config::EngineConfig;
use crate::expander;
use crate::llm::GenerativeModel;
use crate::matcher;
use crate::models::{AtsScore, MatchResult};
use crate::ontology::Ontology;
use crate::scoring;
use crate::text::extract_keywords;

pub struct ScoringEngine {
    llm: Arc<dyn GenerativeModel>,
    cache: Arc<dyn CacheStore>,
    ontology: Ontology,
    config: EngineConfig,
}

impl ScoringEngine {
    pub fn new(
        llm: Arc<dyn GenerativeModel>,
        cache: Arc<dyn CacheStore>,
        ontology: Ontology,
        config: EngineConfig,
    ) -> Self {
        Self {
            llm,
            cache,
            ontology,
            config,
        }
    }

    /// Convenience constructor: durable file cache and ontology at the
    /// configured paths.
    pub fn with_defaults(llm: Arc<dyn GenerativeModel>, config: EngineConfig) -> Self {
        let cache = Arc::new(FileCacheStore::new(
            config.cache_dir.clone(),
            config.cache_ttl_secs,
        ));
        let ontology = Ontology::load(&config.ontology_path);
        Self::new(llm, cache, ontology, config)
    }

    /// Scores a resume, optionally against a job description. Never fails:
    /// every fallible sub-step has a documented fallback.
    pub async fn score_resume(
        &self,
        resume_text: &str,
        job_description: Option<&str>,
    ) -> AtsScore {
        let keyword_match = match job_description {
            Some(jd) => {
                let keywords = self.jd_keywords(jd).await;
                let result = self.match_keywords(resume_text, &keywords).await;
                (result.match_percentage.round() as u32).min(100)
            }
            None => {
                // No target to match against: score keyword diversity instead
                let resume_keywords = extract_keywords(resume_text, self.config.jd_keyword_count);
                (40 + resume_keywords.len() as u32).min(100)
            }
        };

        let section_completeness = scoring::score_sections(resume_text);
        let formatting_score = scoring::score_formatting(resume_text, &self.config);

        let qualitative = scoring::resolve_qualitative(
            scoring::qualitative_scores(
                resume_text,
                job_description,
                self.config.scoring_temperature,
                self.llm.as_ref(),
            )
            .await,
            job_description.is_some(),
        );

        let overall_score = scoring::weighted_overall(
            keyword_match,
            section_completeness,
            formatting_score,
            qualitative.role_alignment,
            qualitative.content_quality,
        );

        debug!(
            "scored resume: overall={overall_score} keywords={keyword_match} \
             sections={section_completeness} formatting={formatting_score}"
        );

        AtsScore {
            overall_score,
            keyword_match,
            section_completeness,
            role_alignment: qualitative.role_alignment,
            formatting_score,
            content_quality: qualitative.content_quality,
            explanation: qualitative.explanation,
            missing_keywords: qualitative.missing_keywords,
            suggestions: qualitative.suggestions,
        }
    }

    /// Expands a job description into an enriched, cached keyword list.
    pub async fn expand_jd_keywords(&self, job_description: &str) -> Vec<String> {
        expander::expand_jd_keywords(
            job_description,
            self.config.jd_keyword_count,
            self.config.expansion_temperature,
            self.llm.as_ref(),
            self.cache.as_ref(),
            &self.ontology,
        )
        .await
    }

    /// Full keyword list for a job description: frequency pass plus cached
    /// expansion, de-duplicated.
    pub async fn jd_keywords(&self, job_description: &str) -> Vec<String> {
        expander::jd_keywords(
            job_description,
            self.config.jd_keyword_count,
            self.config.expansion_temperature,
            self.llm.as_ref(),
            self.cache.as_ref(),
            &self.ontology,
        )
        .await
    }

    /// Matches a keyword list against resume text through the literal tiers
    /// and the semantic fallback.
    pub async fn match_keywords(&self, resume_text: &str, keywords: &[String]) -> MatchResult {
        matcher::match_keywords(
            resume_text,
            keywords,
            self.llm.as_ref(),
            &self.ontology,
            self.config.semantic_similarity_threshold,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryCacheStore, KEYWORD_CACHE_TTL_SECS};
    use crate::llm::LlmError;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// End-to-end mock: text generation for expansion, structured output for
    /// qualitative scoring, no embeddings.
    struct FullMock {
        keyword_response: Result<&'static str, ()>,
        structured_response: Result<&'static str, ()>,
        text_calls: AtomicUsize,
    }

    impl FullMock {
        fn new(keywords: Result<&'static str, ()>, structured: Result<&'static str, ()>) -> Self {
            Self {
                keyword_response: keywords,
                structured_response: structured,
                text_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GenerativeModel for FullMock {
        async fn generate_text(&self, _: &str, _: f32) -> Result<String, LlmError> {
            self.text_calls.fetch_add(1, Ordering::SeqCst);
            self.keyword_response
                .map(str::to_string)
                .map_err(|_| LlmError::Unavailable { retries: 3 })
        }

        async fn generate_structured(&self, _: &str, _: f32) -> Result<Value, LlmError> {
            match self.structured_response {
                Ok(raw) => crate::llm::parse_structured(raw),
                Err(()) => Err(LlmError::Unavailable { retries: 3 }),
            }
        }

        async fn embed_text(&self, _: &str) -> Option<Vec<f32>> {
            None
        }
    }

    fn engine_with(llm: Arc<dyn GenerativeModel>) -> ScoringEngine {
        ScoringEngine::new(
            llm,
            Arc::new(MemoryCacheStore::new(KEYWORD_CACHE_TTL_SECS)),
            Ontology::empty(),
            EngineConfig::default(),
        )
    }

    const RESUME: &str = "\
Summary: Backend engineer focused on distributed systems.
Experience: Acme Corp, 03/2020 - Present. Built Python services with SQL and Docker.
Education: B.S. Computer Science, June 2016.
Skills: Python, SQL, Docker.
Projects: Maintains a popular open-source scheduler.";

    const JD: &str = "Looking for a Python engineer. Python and SQL required; \
                      Kubernetes is a plus for this Python-heavy role.";

    #[tokio::test]
    async fn test_score_resume_with_jd_honors_weighted_sum() {
        let mock = Arc::new(FullMock::new(
            Ok("Python, SQL, Kubernetes"),
            Ok(r#"{"role_alignment": 85, "content_quality": 60,
                   "explanation": "Good fit.", "missing_keywords": ["kubernetes"],
                   "suggestions": ["Mention container orchestration."]}"#),
        ));
        let engine = engine_with(mock);

        let score = engine.score_resume(RESUME, Some(JD)).await;

        assert_eq!(
            score.overall_score,
            scoring::weighted_overall(
                score.keyword_match,
                score.section_completeness,
                score.formatting_score,
                score.role_alignment,
                score.content_quality,
            )
        );
        assert_eq!(score.role_alignment, 85);
        assert_eq!(score.content_quality, 60);
        assert_eq!(score.section_completeness, 100);
        assert_eq!(score.formatting_score, 100);
        assert_eq!(score.missing_keywords, vec!["kubernetes"]);
        assert!(score.keyword_match <= 100);
    }

    #[tokio::test]
    async fn test_score_resume_qualitative_failure_uses_defaults() {
        let mock = Arc::new(FullMock::new(Ok("Python, SQL"), Err(())));
        let engine = engine_with(mock);

        let score = engine.score_resume(RESUME, Some(JD)).await;

        assert_eq!(score.role_alignment, 70);
        assert_eq!(score.content_quality, 70);
        assert!(score.explanation.contains("unavailable"));
        assert_eq!(
            score.suggestions,
            vec!["Ensure API credentials are configured correctly."]
        );
    }

    #[tokio::test]
    async fn test_score_resume_without_jd_uses_diversity_proxy() {
        let mock = Arc::new(FullMock::new(
            Err(()),
            Ok(r#"{"role_alignment": 75, "content_quality": 80,
                   "explanation": "Readable.", "suggestions": []}"#),
        ));
        let engine = engine_with(mock.clone());

        let score = engine.score_resume(RESUME, None).await;

        let distinct = extract_keywords(RESUME, 30).len() as u32;
        assert_eq!(score.keyword_match, (40 + distinct).min(100));
        assert!(score.missing_keywords.is_empty());
        // no JD → no expansion call
        assert_eq!(mock.text_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_score_resume_never_fails_on_total_service_outage() {
        let mock = Arc::new(FullMock::new(Err(()), Err(())));
        let engine = engine_with(mock);

        let score = engine.score_resume(RESUME, Some(JD)).await;

        // keyword matching fell back to frequency extraction, qualitative
        // scoring to its defaults; the request still produced a full score
        assert!(score.overall_score <= 100);
        assert_eq!(score.role_alignment, 70);
        assert!(score.keyword_match > 0);
    }

    #[tokio::test]
    async fn test_expand_jd_keywords_is_cached_across_calls() {
        let mock = Arc::new(FullMock::new(
            Ok("Python, Kubernetes"),
            Err(()),
        ));
        let engine = engine_with(mock.clone());

        let first = engine.expand_jd_keywords(JD).await;
        let second = engine.expand_jd_keywords(JD).await;

        assert_eq!(first, second);
        assert_eq!(mock.text_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_match_keywords_entry_point() {
        let mock = Arc::new(FullMock::new(Err(()), Err(())));
        let engine = engine_with(mock);

        let keywords: Vec<String> = ["python", "sql", "kubernetes"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let result = engine
            .match_keywords(
                "Experienced Python developer. Skills: Python, SQL, Docker.",
                &keywords,
            )
            .await;

        assert_eq!(result.matched, vec!["python", "sql"]);
        assert_eq!(result.missing, vec!["kubernetes"]);
        assert_eq!(result.match_percentage, 66.7);
    }
}
