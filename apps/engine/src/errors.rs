use thiserror::Error;

use crate::llm::LlmError;

/// Errors at the engine's sub-call boundaries.
///
/// These never escape the engine entry points: every sub-call with a defined
/// fallback (qualitative scoring, keyword expansion) catches its own variant
/// and substitutes the documented default. Making the failure a first-class
/// value keeps the fallback path an explicit, testable branch.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("language model service unavailable: {0}")]
    Service(#[from] LlmError),

    #[error("malformed structured response: {0}")]
    MalformedResponse(String),
}
