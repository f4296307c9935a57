//! Skill ontology — canonical names, known aliases, and acronym expansions.
//!
//! The ontology file is a JSON map of canonical skill name to its aliases:
//! `{ "kubernetes": ["k8s", "kube"], ... }`. It is loaded once at startup
//! into an immutable alias→canonical lookup and read without synchronization
//! thereafter. A missing or unreadable file degrades to an empty map — an
//! unknown alias is never an error, callers keep the original term.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

/// Built-in acronym expansions used as a matching fallback when a keyword
/// and a resume disagree on the spelled-out form.
pub const ACRONYM_EXPANSIONS: &[(&str, &str)] = &[
    ("ml", "machine learning"),
    ("ai", "artificial intelligence"),
    ("nlp", "natural language processing"),
    ("seo", "search engine optimization"),
    ("api", "application programming interface"),
    ("sql", "structured query language"),
    ("ci/cd", "continuous integration continuous deployment"),
    ("aws", "amazon web services"),
    ("gcp", "google cloud platform"),
];

/// Returns the spelled-out expansion for a known acronym.
pub fn expand_acronym(term: &str) -> Option<&'static str> {
    ACRONYM_EXPANSIONS
        .iter()
        .find(|(acronym, _)| *acronym == term)
        .map(|(_, expansion)| *expansion)
}

/// Returns the acronym for a known spelled-out expansion.
pub fn acronym_for(expansion: &str) -> Option<&'static str> {
    ACRONYM_EXPANSIONS
        .iter()
        .find(|(_, known)| *known == expansion)
        .map(|(acronym, _)| *acronym)
}

/// Immutable alias→canonical skill mapping, process-lifetime.
#[derive(Debug, Clone, Default)]
pub struct Ontology {
    alias_to_canonical: HashMap<String, String>,
}

impl Ontology {
    /// An empty ontology: every lookup misses, every term passes through.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the lookup from a canonical→aliases map. The canonical name is
    /// registered as an alias of itself, which makes `canonicalize`
    /// idempotent.
    pub fn from_map(map: HashMap<String, Vec<String>>) -> Self {
        let mut alias_to_canonical = HashMap::new();
        for (canonical, aliases) in map {
            alias_to_canonical.insert(canonical.to_lowercase(), canonical.clone());
            for alias in aliases {
                alias_to_canonical.insert(alias.to_lowercase(), canonical.clone());
            }
        }
        Self { alias_to_canonical }
    }

    /// Loads the ontology from a JSON file. Missing or malformed files are
    /// logged and degrade to an empty map — never a startup failure.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skills ontology not loaded from {}: {e}", path.display());
                return Self::empty();
            }
        };

        match serde_json::from_str::<HashMap<String, Vec<String>>>(&raw) {
            Ok(map) => {
                let ontology = Self::from_map(map);
                info!(
                    "skills ontology loaded: {} aliases",
                    ontology.alias_to_canonical.len()
                );
                ontology
            }
            Err(e) => {
                warn!("skills ontology at {} is malformed: {e}", path.display());
                Self::empty()
            }
        }
    }

    /// Maps a term to its canonical skill name, if the term is a known alias.
    /// Unknown terms return `None`; callers keep the original term.
    pub fn canonicalize(&self, term: &str) -> Option<&str> {
        self.alias_to_canonical
            .get(&term.to_lowercase())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.alias_to_canonical.is_empty()
    }
}
