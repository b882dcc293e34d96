//! relex Extractor - Relation extraction and anaphora resolution
//!
//! Reads dependency-parse trees and produces typed subject-predicate-object
//! relations (family ties, possession, preferences, locations, employment,
//! attributes, ...). Multi-sentence input runs a two-pass protocol that
//! resolves pronouns to named entities tracked across sentences.
//!
//! Flow: text → parse tree → raw candidates → typed and scored relations →
//! deduplicated relations → (multi-sentence) pronoun-resolved relations.

use std::collections::HashMap;
use std::fmt;

use relex_core::Result;
use serde::{Deserialize, Serialize};

pub mod anaphora;
pub mod lexicon;
pub mod patterns;
pub mod pipeline;
pub mod scoring;

pub use anaphora::{AnaphoraResolver, Entity, Gender, GenderLexicon, Number};
pub use lexicon::{Classification, Lexicon, RelationSubtype, RelationType};
pub use patterns::{Pattern, PatternKind, PatternLibrary};
pub use pipeline::{Message, RelationEngine};
pub use scoring::{deduplicate, score};

// ============================================================================
// Candidates and Relations
// ============================================================================

/// Grammatical tense of the verb a relation was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tense {
    Past,
    Present,
    Future,
}

impl Tense {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Past => "past",
            Self::Present => "present",
            Self::Future => "future",
        }
    }
}

impl fmt::Display for Tense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Prepositional phrase a relation was built from (`{prep: "in", object: "Austin"}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepPhrase {
    pub prep: String,
    pub object: String,
}

/// Unclassified relation produced by one pattern invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RawCandidate {
    pub subject: String,
    pub predicate: String,
    pub object: Option<String>,
    pub tense: Option<Tense>,
    pub negated: bool,
    /// Pattern that produced the candidate
    pub pattern: PatternKind,
    /// Adverbial modifiers of the verb
    pub modifiers: Vec<String>,
    pub prepositions: Vec<PrepPhrase>,
    /// Date or time expression attached to the verb
    pub temporal: Option<String>,
}

impl RawCandidate {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: Option<String>,
        pattern: PatternKind,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
            tense: None,
            negated: false,
            pattern,
            modifiers: Vec::new(),
            prepositions: Vec::new(),
            temporal: None,
        }
    }

    /// Attach the prepositional phrase the candidate was built from
    pub fn with_preposition(mut self, prep: impl Into<String>, object: impl Into<String>) -> Self {
        self.prepositions.push(PrepPhrase {
            prep: prep.into(),
            object: object.into(),
        });
        self
    }

    /// Subject and predicate are both present
    pub fn is_complete(&self) -> bool {
        !self.subject.trim().is_empty() && !self.predicate.trim().is_empty()
    }

    pub fn has_object(&self) -> bool {
        self.object.as_deref().is_some_and(|o| !o.trim().is_empty())
    }
}

/// Final extracted relation.
///
/// Field order matches the flat record consumed by storage collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub subject: String,
    pub predicate: String,
    pub object: Option<String>,
    pub relation_type: RelationType,
    pub subtype: Option<String>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub prepositions: Vec<PrepPhrase>,
    pub temporal: Option<String>,
    pub tense: Option<Tense>,
    pub negated: bool,
    pub confidence: f32,
    pub source_text: String,
    pub is_symmetric: bool,
}

impl Relation {
    /// Deduplication key
    pub fn key(&self) -> (String, String, Option<String>) {
        (
            self.subject.clone(),
            self.predicate.clone(),
            self.object.clone(),
        )
    }

    /// Multi-line human-readable rendering
    pub fn to_pretty(&self) -> String {
        let mut out = format!("{self}\n   Type: {}", self.relation_type);
        if let Some(subtype) = &self.subtype {
            out.push_str(&format!(" ({subtype})"));
        }
        out.push_str(&format!("\n   Confidence: {:.2}", self.confidence));
        if let Some(tense) = self.tense {
            out.push_str(&format!("\n   Tense: {tense}"));
        }
        if self.negated {
            out.push_str("\n   Negated: true");
        }
        out
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} --[{}]--> {}",
            self.subject,
            self.predicate,
            self.object.as_deref().unwrap_or("(none)")
        )
    }
}

// ============================================================================
// Context
// ============================================================================

/// Key holding the identifier substituted for `[speaker]`
pub const CURRENT_SPEAKER: &str = "current_speaker";

/// Free-form key/value context for one extraction call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionContext {
    values: HashMap<String, String>,
}

impl ExtractionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context with `current_speaker` set
    pub fn with_speaker(speaker: impl Into<String>) -> Self {
        let mut ctx = Self::new();
        ctx.insert(CURRENT_SPEAKER, speaker);
        ctx
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn current_speaker(&self) -> Option<&str> {
        self.get(CURRENT_SPEAKER)
    }
}

impl From<HashMap<String, String>> for ExtractionContext {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for relation extractors
pub trait RelationExtractor: Send + Sync {
    fn extract(&self, text: &str, ctx: &ExtractionContext) -> Result<Vec<Relation>>;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Relation {
        Relation {
            subject: "[speaker]".to_string(),
            predicate: "has_brother".to_string(),
            object: Some("Mike".to_string()),
            relation_type: RelationType::Family,
            subtype: Some("sibling".to_string()),
            modifiers: Vec::new(),
            prepositions: Vec::new(),
            temporal: None,
            tense: Some(Tense::Present),
            negated: false,
            confidence: 1.0,
            source_text: "Mike is my brother".to_string(),
            is_symmetric: true,
        }
    }

    #[test]
    fn test_outbound_record_fields() {
        let value = serde_json::to_value(sample()).unwrap();
        let fields: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        for field in [
            "subject",
            "predicate",
            "object",
            "relation_type",
            "subtype",
            "modifiers",
            "prepositions",
            "temporal",
            "tense",
            "negated",
            "confidence",
            "source_text",
            "is_symmetric",
        ] {
            assert!(fields.contains(&field), "missing {field}");
        }
        assert_eq!(fields.len(), 13);
        assert_eq!(value["relation_type"], "family");
        assert_eq!(value["tense"], "present");
    }

    #[test]
    fn test_pretty_rendering() {
        let pretty = sample().to_pretty();
        assert!(pretty.starts_with("[speaker] --[has_brother]--> Mike"));
        assert!(pretty.contains("Type: family (sibling)"));
        assert!(pretty.contains("Confidence: 1.00"));
        assert!(pretty.contains("Tense: present"));
        assert!(!pretty.contains("Negated"));
    }

    #[test]
    fn test_display_without_object() {
        let mut relation = sample();
        relation.object = None;
        assert_eq!(relation.to_string(), "[speaker] --[has_brother]--> (none)");
    }

    #[test]
    fn test_candidate_completeness() {
        let candidate = RawCandidate::new("John", "love", None, PatternKind::SimpleSvo);
        assert!(candidate.is_complete());
        assert!(!candidate.has_object());

        let empty = RawCandidate::new("", "love", Some("pizza".to_string()), PatternKind::SimpleSvo);
        assert!(!empty.is_complete());
    }

    #[test]
    fn test_context_speaker() {
        let ctx = ExtractionContext::with_speaker("user-42");
        assert_eq!(ctx.current_speaker(), Some("user-42"));
        assert_eq!(ctx.get("other"), None);

        let json = serde_json::to_string(&ctx).unwrap();
        assert_eq!(json, r#"{"current_speaker":"user-42"}"#);
    }
}
