//! Anaphora resolution across sentences
//!
//! The resolver keeps an append-only stack of entity mentions and resolves
//! pronouns to the most recent entity that agrees in gender and number.
//! One resolver serves one conversation turn; it has no internal locking,
//! so concurrent turns each need their own instance.

use std::collections::{BTreeMap, HashMap, HashSet};

use relex_core::{DepLabel, Result, Sentence, Token};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// Pronoun Tables
// ============================================================================

const MALE_PRONOUNS: [&str; 4] = ["he", "him", "his", "himself"];
const FEMALE_PRONOUNS: [&str; 4] = ["she", "her", "hers", "herself"];
const NEUTRAL_PRONOUNS: [&str; 3] = ["it", "its", "itself"];
const PLURAL_PRONOUNS: [&str; 5] = ["they", "them", "their", "theirs", "themselves"];

const MALE_NAMES: [&str; 10] = [
    "john", "mike", "tom", "david", "james", "robert", "william", "richard", "daniel", "matthew",
];
const FEMALE_NAMES: [&str; 10] = [
    "sarah", "mary", "lisa", "emily", "jessica", "ashley", "amanda", "jennifer", "michelle",
    "karen",
];

const MALE_KINSHIP: [&str; 8] = [
    "brother",
    "father",
    "dad",
    "uncle",
    "son",
    "grandfather",
    "boyfriend",
    "husband",
];
const FEMALE_KINSHIP: [&str; 8] = [
    "sister",
    "mother",
    "mom",
    "aunt",
    "daughter",
    "grandmother",
    "girlfriend",
    "wife",
];

/// Any personal, possessive or reflexive pronoun the resolver handles
pub fn is_pronoun(word: &str) -> bool {
    let word = word.trim().to_lowercase();
    [
        &MALE_PRONOUNS[..],
        &FEMALE_PRONOUNS[..],
        &NEUTRAL_PRONOUNS[..],
        &PLURAL_PRONOUNS[..],
    ]
    .iter()
    .any(|set| set.contains(&word.as_str()))
}

/// Possessive forms collapse onto their base pronoun
fn base_pronoun(pronoun: &str) -> &str {
    match pronoun {
        "his" => "he",
        "her" | "hers" => "she",
        "its" => "it",
        "their" | "theirs" => "they",
        other => other,
    }
}

/// Every surface form sharing a base pronoun
fn related_forms(base: &str) -> &'static [&'static str] {
    match base {
        "he" => &MALE_PRONOUNS,
        "she" => &FEMALE_PRONOUNS,
        "it" => &NEUTRAL_PRONOUNS,
        "they" => &PLURAL_PRONOUNS,
        _ => &[],
    }
}

// ============================================================================
// Entities
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Neutral,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Number {
    Singular,
    Plural,
}

/// Agreement features a pronoun demands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PronounClass {
    Singular(Gender),
    Plural,
}

impl PronounClass {
    fn of(base: &str) -> Option<Self> {
        if MALE_PRONOUNS.contains(&base) {
            Some(Self::Singular(Gender::Male))
        } else if FEMALE_PRONOUNS.contains(&base) {
            Some(Self::Singular(Gender::Female))
        } else if NEUTRAL_PRONOUNS.contains(&base) {
            Some(Self::Singular(Gender::Neutral))
        } else if PLURAL_PRONOUNS.contains(&base) {
            Some(Self::Plural)
        } else {
            None
        }
    }
}

/// A tracked mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub gender: Gender,
    pub number: Number,
    /// NER annotation (PERSON, ORG, GPE, ...)
    pub entity_type: Option<String>,
    pub sentence_index: usize,
    pub token_position: usize,
}

/// First-name lists used to infer gender
#[derive(Debug, Clone)]
pub struct GenderLexicon {
    male_names: HashSet<String>,
    female_names: HashSet<String>,
}

impl GenderLexicon {
    pub fn standard() -> Self {
        Self {
            male_names: MALE_NAMES.iter().map(|n| n.to_string()).collect(),
            female_names: FEMALE_NAMES.iter().map(|n| n.to_string()).collect(),
        }
    }

    /// Extend the curated lists with extra names
    pub fn with_names(mut self, male: &[String], female: &[String]) -> Self {
        self.male_names
            .extend(male.iter().map(|n| n.trim().to_lowercase()));
        self.female_names
            .extend(female.iter().map(|n| n.trim().to_lowercase()));
        self
    }

    /// Gender from a known first name, then from kinship words inside the name
    pub fn infer(&self, name: &str) -> Gender {
        let name = name.trim().to_lowercase();

        if self.male_names.contains(&name) {
            return Gender::Male;
        }
        if self.female_names.contains(&name) {
            return Gender::Female;
        }

        if MALE_KINSHIP.iter().any(|term| name.contains(term)) {
            Gender::Male
        } else if FEMALE_KINSHIP.iter().any(|term| name.contains(term)) {
            Gender::Female
        } else {
            Gender::Unknown
        }
    }
}

impl Default for GenderLexicon {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Stack-based pronoun resolver with recency bias
#[derive(Debug, Clone, Default)]
pub struct AnaphoraResolver {
    lexicon: GenderLexicon,
    entities: Vec<Entity>,
    cache: HashMap<String, String>,
    sentence_index: usize,
}

impl AnaphoraResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lexicon(lexicon: GenderLexicon) -> Self {
        Self {
            lexicon,
            ..Self::default()
        }
    }

    /// Tracked entities in insertion order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn sentence_index(&self) -> usize {
        self.sentence_index
    }

    /// Record a mention; gender is inferred from the name when absent
    pub fn track(
        &mut self,
        name: impl Into<String>,
        gender: Option<Gender>,
        number: Number,
        entity_type: Option<String>,
        token_position: usize,
    ) {
        let name = name.into();
        let gender = gender.unwrap_or_else(|| self.lexicon.infer(&name));

        self.entities.push(Entity {
            name,
            gender,
            number,
            entity_type,
            sentence_index: self.sentence_index,
            token_position,
        });
    }

    /// Track every proper noun in a sentence.
    ///
    /// Pronouns are skipped and common nouns ("brother", "friend") are never
    /// tracked. A proper noun with coordinated proper-noun conjuncts also
    /// yields a plural group entity ("John and Sarah") after its members.
    /// On a malformed tree nothing from the sentence is recorded.
    pub fn track_sentence(&mut self, sentence: &Sentence) -> Result<Vec<String>> {
        let names: Vec<&Token> = sentence
            .iter()
            .filter(|t| t.is_proper_noun() && !is_pronoun(&t.text))
            .collect();

        let mut groups = Vec::new();
        for &token in &names {
            let conjuncts: Vec<&str> = sentence
                .children(token)?
                .into_iter()
                .filter(|c| c.dep == DepLabel::Conjunction && c.is_proper_noun())
                .map(|c| c.text.as_str())
                .collect();
            if conjuncts.is_empty() {
                continue;
            }

            let mut members = vec![token.text.as_str()];
            members.extend(conjuncts);
            groups.push((join_group(&members), token.index));
        }

        let mut tracked = Vec::with_capacity(names.len() + groups.len());
        for token in names {
            self.track(
                token.text.clone(),
                None,
                Number::Singular,
                token.entity_type.clone(),
                token.index,
            );
            tracked.push(token.text.clone());
        }
        for (name, position) in groups {
            self.track(name.clone(), Some(Gender::Unknown), Number::Plural, None, position);
            tracked.push(name);
        }

        debug!(
            sentence = self.sentence_index,
            entities = tracked.len(),
            "Tracked entities"
        );
        Ok(tracked)
    }

    /// Resolve a pronoun to the name of its antecedent
    pub fn resolve(&mut self, pronoun: &str) -> Option<String> {
        let pronoun = pronoun.trim().to_lowercase();

        if let Some(name) = self.cache.get(&pronoun) {
            return Some(name.clone());
        }

        let base = base_pronoun(&pronoun);
        let name = self.find_matching(base)?.name.clone();

        self.cache.insert(pronoun.clone(), name.clone());
        for form in related_forms(base) {
            self.cache.insert(form.to_string(), name.clone());
        }

        debug!(pronoun = %pronoun, resolved = %name, "Resolved pronoun");
        Some(name)
    }

    /// Most recent agreeing entity.
    ///
    /// Plural pronouns take the first plural entity. Singular pronouns take
    /// the first entity of the same gender; an unknown-gender entity is a
    /// fallback for neutral pronouns only.
    fn find_matching(&self, base: &str) -> Option<&Entity> {
        let class = PronounClass::of(base)?;
        let mut fallback = None;

        for entity in self.entities.iter().rev() {
            match class {
                PronounClass::Plural => {
                    if entity.number == Number::Plural {
                        return Some(entity);
                    }
                }
                PronounClass::Singular(gender) => {
                    if entity.number != Number::Singular {
                        continue;
                    }
                    if entity.gender == gender {
                        return Some(entity);
                    }
                    if entity.gender == Gender::Unknown && fallback.is_none() {
                        fallback = Some(entity);
                    }
                }
            }
        }

        match class {
            PronounClass::Singular(Gender::Neutral) => fallback,
            _ => None,
        }
    }

    /// Map every pronoun in a sentence to its resolution, skipping misses
    pub fn resolve_sentence(&mut self, sentence: &Sentence) -> BTreeMap<String, String> {
        let mut resolved = BTreeMap::new();
        for token in sentence.iter() {
            let word = token.lower();
            if is_pronoun(&word) {
                if let Some(name) = self.resolve(&word) {
                    resolved.insert(word, name);
                }
            }
        }
        resolved
    }

    pub fn next_sentence(&mut self) {
        self.sentence_index += 1;
    }

    /// Return the sentence counter to the start of the document
    pub fn rewind(&mut self) {
        self.sentence_index = 0;
    }

    /// Forget all entities and resolutions; starts a new turn
    pub fn reset(&mut self) {
        self.entities.clear();
        self.cache.clear();
        self.sentence_index = 0;
    }
}

/// "A and B", "A, B and C"
fn join_group(members: &[&str]) -> String {
    match members {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

// ============================================================================
// Tests
// ============================================================================
