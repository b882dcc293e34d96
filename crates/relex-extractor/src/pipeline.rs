//! Extraction pipeline
//!
//! Runs the pattern library over parsed sentences, classifies and scores the
//! candidates, deduplicates, and for multi-sentence text drives the two-pass
//! entity tracking / pronoun resolution protocol.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use relex_core::{Document, ExtractionConfig, ParseProvider, Result, Sentence};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::anaphora::{is_pronoun, AnaphoraResolver, GenderLexicon};
use crate::lexicon::Lexicon;
use crate::patterns::PatternLibrary;
use crate::scoring::{deduplicate, score};
use crate::{ExtractionContext, RawCandidate, Relation, RelationExtractor};

/// Placeholder for the current speaker
const SPEAKER_PLACEHOLDER: &str = "[speaker]";

/// Possessive placeholders resolvable through the pronoun resolver
const PRONOUN_PLACEHOLDERS: [(&str, &str); 4] = [
    ("[he]", "he"),
    ("[she]", "she"),
    ("[they]", "they"),
    ("[it]", "it"),
];

/// One conversation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub speaker: String,
    pub text: String,
}

impl Message {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Relation extraction engine over a parse provider
pub struct RelationEngine {
    provider: Arc<dyn ParseProvider>,
    lexicon: Lexicon,
    patterns: PatternLibrary,
    genders: GenderLexicon,
    min_confidence: f32,
}

impl RelationEngine {
    /// Create an engine with default settings.
    ///
    /// Fails when the provider reports it cannot serve requests.
    pub fn new(provider: Arc<dyn ParseProvider>) -> Result<Self> {
        Self::with_config(provider, &ExtractionConfig::default())
    }

    /// Create with extraction settings
    pub fn with_config(provider: Arc<dyn ParseProvider>, config: &ExtractionConfig) -> Result<Self> {
        provider.ensure_available()?;

        let patterns = PatternLibrary::standard().without(&config.disabled_patterns);
        let genders = GenderLexicon::standard().with_names(&config.male_names, &config.female_names);

        info!(
            provider = provider.name(),
            patterns = patterns.len(),
            min_confidence = config.min_confidence,
            "Relation engine ready"
        );

        Ok(Self {
            provider,
            lexicon: Lexicon::standard(),
            patterns,
            genders,
            min_confidence: config.min_confidence,
        })
    }

    /// Replace the pattern library
    pub fn with_patterns(mut self, patterns: PatternLibrary) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn patterns(&self) -> &PatternLibrary {
        &self.patterns
    }

    /// Fresh resolver for one conversation turn
    pub fn resolver(&self) -> AnaphoraResolver {
        AnaphoraResolver::with_lexicon(self.genders.clone())
    }

    /// Single-sentence extraction; no pronoun resolution
    pub fn extract(&self, text: &str, ctx: &ExtractionContext) -> Result<Vec<Relation>> {
        let doc = self.provider.parse(text)?;

        let mut relations = Vec::new();
        for sentence in doc.iter() {
            relations.extend(self.extract_sentence(sentence, text, ctx));
        }

        Ok(deduplicate(relations))
    }

    /// Multi-sentence extraction with pronoun resolution
    pub fn extract_multi(&self, text: &str, ctx: &ExtractionContext) -> Result<Vec<Relation>> {
        let doc = self.provider.parse(text)?;
        Ok(self.extract_document(&doc, ctx))
    }

    /// Two-pass protocol over an already parsed document.
    ///
    /// Pass 1 tracks the entities of every sentence before anything is
    /// resolved, so a pronoun can bind to an entity mentioned later in the
    /// document. Pass 2 extracts per sentence and substitutes resolved
    /// pronouns in subjects and objects.
    pub fn extract_document(&self, doc: &Document, ctx: &ExtractionContext) -> Vec<Relation> {
        let mut resolver = self.resolver();
        self.track_document(&mut resolver, doc);

        let mut all = Vec::new();
        for sentence in doc.iter() {
            let mut relations = self.extract_sentence(sentence, &sentence.text, ctx);

            for relation in &mut relations {
                if let Some(name) = resolve_mention(&mut resolver, &relation.subject) {
                    relation.subject = name;
                }
                if let Some(object) = relation.object.clone() {
                    if let Some(name) = resolve_mention(&mut resolver, &object) {
                        for phrase in relation
                            .prepositions
                            .iter_mut()
                            .filter(|p| p.object == object)
                        {
                            phrase.object = name.clone();
                        }
                        relation.object = Some(name);
                    }
                }
            }

            all.extend(relations);
            resolver.next_sentence();
        }

        info!(
            sentences = doc.len(),
            entities = resolver.entities().len(),
            relations = all.len(),
            "Multi-sentence extraction complete"
        );
        all
    }

    /// Run every pattern over one sentence and build deduplicated relations
    pub fn extract_sentence(
        &self,
        sentence: &Sentence,
        source_text: &str,
        ctx: &ExtractionContext,
    ) -> Vec<Relation> {
        let mut candidates = Vec::new();
        for pattern in self.patterns.iter() {
            match (pattern.extract)(sentence) {
                Ok(found) => candidates.extend(found),
                Err(e) => {
                    warn!(
                        pattern = pattern.name,
                        sentence = sentence.index,
                        error = %e,
                        "Pattern failed, skipping"
                    );
                }
            }
        }

        let candidate_count = candidates.len();
        let relations: Vec<Relation> = candidates
            .into_iter()
            .filter_map(|c| self.build_relation(c, source_text, ctx))
            .collect();

        let relations: Vec<Relation> = deduplicate(relations)
            .into_iter()
            .filter(|r| r.confidence >= self.min_confidence)
            .collect();

        debug!(
            sentence = sentence.index,
            candidates = candidate_count,
            relations = relations.len(),
            "Extracted relations"
        );
        relations
    }

    /// Classify, score and contextualise one candidate
    fn build_relation(
        &self,
        candidate: RawCandidate,
        source_text: &str,
        ctx: &ExtractionContext,
    ) -> Option<Relation> {
        if !candidate.is_complete() {
            return None;
        }

        let has_object = candidate.has_object();
        let object = candidate.object.filter(|_| has_object);
        let classification = self
            .lexicon
            .classify_full(&candidate.predicate, object.as_deref());
        let confidence = score(candidate.pattern, classification.relation_type, has_object);

        let speaker = ctx.current_speaker();
        let subject = substitute_speaker(candidate.subject, speaker);
        let object = object.map(|o| substitute_speaker(o, speaker));

        Some(Relation {
            subject,
            predicate: candidate.predicate,
            object,
            relation_type: classification.relation_type,
            subtype: classification.subtype.map(str::to_string),
            modifiers: candidate.modifiers,
            prepositions: candidate.prepositions,
            temporal: candidate.temporal,
            tense: candidate.tense,
            negated: candidate.negated,
            confidence,
            source_text: source_text.to_string(),
            is_symmetric: classification.is_symmetric,
        })
    }

    /// Extract each non-blank message with its speaker as context
    pub fn extract_conversation(
        &self,
        messages: &[Message],
        speaker_names: &HashMap<String, String>,
    ) -> Result<Vec<Relation>> {
        let mut all = Vec::new();

        for message in messages.iter().filter(|m| !m.text.trim().is_empty()) {
            let speaker = speaker_names
                .get(&message.speaker)
                .unwrap_or(&message.speaker);
            let ctx = ExtractionContext::with_speaker(speaker.as_str());
            all.extend(self.extract(&message.text, &ctx)?);
        }

        info!(
            messages = messages.len(),
            relations = all.len(),
            "Conversation extraction complete"
        );
        Ok(all)
    }

    /// Map every pronoun in `text` to the name it resolves to
    pub fn resolve_pronouns(&self, text: &str) -> Result<BTreeMap<String, String>> {
        let doc = self.provider.parse(text)?;

        let mut resolver = self.resolver();
        self.track_document(&mut resolver, &doc);

        let mut resolved = BTreeMap::new();
        for sentence in doc.iter() {
            resolved.extend(resolver.resolve_sentence(sentence));
            resolver.next_sentence();
        }
        Ok(resolved)
    }

    /// Pass 1: track entities of every sentence, then rewind the counter
    fn track_document(&self, resolver: &mut AnaphoraResolver, doc: &Document) {
        for sentence in doc.iter() {
            if let Err(e) = resolver.track_sentence(sentence) {
                warn!(sentence = sentence.index, error = %e, "Entity tracking failed, skipping");
            }
            resolver.next_sentence();
        }
        resolver.rewind();
    }
}

impl RelationExtractor for RelationEngine {
    fn extract(&self, text: &str, ctx: &ExtractionContext) -> Result<Vec<Relation>> {
        RelationEngine::extract(self, text, ctx)
    }
}

impl std::fmt::Debug for RelationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationEngine")
            .field("provider", &self.provider.name())
            .field("patterns", &self.patterns.names())
            .field("min_confidence", &self.min_confidence)
            .finish()
    }
}

/// Replace `[speaker]` (whole text or `[speaker]'s ...` prefix)
fn substitute_speaker(text: String, speaker: Option<&str>) -> String {
    let Some(speaker) = speaker else {
        return text;
    };
    match text.strip_prefix(SPEAKER_PLACEHOLDER) {
        Some(rest) if rest.is_empty() || rest.starts_with("'s") => format!("{speaker}{rest}"),
        _ => text,
    }
}

/// Resolved name for a pronoun or pronoun placeholder, if any
fn resolve_mention(resolver: &mut AnaphoraResolver, text: &str) -> Option<String> {
    let lower = text.trim().to_lowercase();
    if is_pronoun(&lower) {
        return resolver.resolve(&lower);
    }

    for (placeholder, pronoun) in PRONOUN_PLACEHOLDERS {
        if let Some(rest) = text.strip_prefix(placeholder) {
            if rest.is_empty() || rest.starts_with("'s") {
                return resolver.resolve(pronoun).map(|name| format!("{name}{rest}"));
            }
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================
