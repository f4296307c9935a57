//! Hybrid ATS scoring engine: keyword matching, scoring, and caching.
//!
//! Combines a transparent algorithmic layer (normalization, frequency
//! extraction, tiered keyword matching, section/formatting checks) with
//! externally-sourced qualitative signals, behind a TTL-based durable cache
//! that keeps repeated scoring of the same job description cheap.
//!
//! The HTTP surface, file-format extraction, and document rendering live in
//! the hosting service; this crate exposes [`ScoringEngine`] and the traits
//! its collaborators implement.

pub mod cache;
pub mod config;
pub mod engine;
pub mod errors;
pub mod expander;
pub mod llm;
pub mod matcher;
pub mod models;
pub mod ontology;
pub mod prompts;
pub mod scoring;
pub mod text;

pub use cache::{CacheStore, FileCacheStore, MemoryCacheStore};
pub use config::EngineConfig;
pub use engine::ScoringEngine;
pub use errors::EngineError;
pub use llm::{GeminiClient, GenerativeModel, LlmError};
pub use models::{AtsScore, MatchResult, QualitativeScores};
pub use ontology::Ontology;
