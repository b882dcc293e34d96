//! Grammar pattern library
//!
//! Each pattern is a pure function from one parsed sentence to raw
//! candidates. Every pattern runs on every sentence; priority only fixes the
//! order in which candidates are appended.

use std::fmt;

use relex_core::{DepLabel, Result, Sentence, Token};

use crate::{RawCandidate, Tense};

/// Extraction function of a pattern
pub type PatternFn = fn(&Sentence) -> Result<Vec<RawCandidate>>;

// ============================================================================
// Pattern Kinds
// ============================================================================

/// Rule that produced a candidate (feeds the confidence scorer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    Possessive,
    CopulaRelation,
    CopulaAttribute,
    CopulaLocation,
    ActionLocation,
    RelativeClause,
    RelativeClauseLocation,
    CompoundSubject,
    SimpleSvo,
    /// Produced by a caller-registered pattern
    Custom(&'static str),
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Possessive => "possessive",
            Self::CopulaRelation => "copula_relation",
            Self::CopulaAttribute => "copula_attribute",
            Self::CopulaLocation => "copula_location",
            Self::ActionLocation => "action_location",
            Self::RelativeClause => "relative_clause",
            Self::RelativeClauseLocation => "relative_clause_location",
            Self::CompoundSubject => "compound_subject",
            Self::SimpleSvo => "simple_svo",
            Self::Custom(name) => *name,
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Pattern Registry
// ============================================================================

/// A named extraction rule
#[derive(Clone)]
pub struct Pattern {
    pub name: &'static str,
    pub description: &'static str,
    /// Higher runs first
    pub priority: u8,
    pub examples: &'static [&'static str],
    pub extract: PatternFn,
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Priority-ordered set of patterns
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    patterns: Vec<Pattern>,
}

impl PatternLibrary {
    /// The six standard English patterns
    pub fn standard() -> Self {
        let mut library = Self::empty();
        library.register(Pattern {
            name: "possessive",
            description: "Extract possessive relations (X's Y)",
            priority: 10,
            examples: &["Sarah's car", "my brother's house"],
            extract: extract_possessive,
        });
        library.register(Pattern {
            name: "copula_relations",
            description: "Extract relations using 'be' verbs",
            priority: 9,
            examples: &["Mike is my brother", "I am from Austin"],
            extract: extract_copula_relations,
        });
        library.register(Pattern {
            name: "action_location",
            description: "Extract actions with location",
            priority: 8,
            examples: &["I live in Austin", "She works at Google"],
            extract: extract_action_location,
        });
        library.register(Pattern {
            name: "relative_clauses",
            description: "Extract relations from relative clauses",
            priority: 7,
            examples: &["My friend who works at Google"],
            extract: extract_relative_clauses,
        });
        library.register(Pattern {
            name: "compound_subjects",
            description: "Extract relations with compound subjects",
            priority: 6,
            examples: &["John and Sarah are friends"],
            extract: extract_compound_subjects,
        });
        library.register(Pattern {
            name: "simple_svo",
            description: "Extract simple S-V-O patterns",
            priority: 5,
            examples: &["John loves pizza", "Sarah owns a car"],
            extract: extract_simple_svo,
        });
        library
    }

    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Add a pattern, keeping descending priority (stable for equal priority)
    pub fn register(&mut self, pattern: Pattern) {
        let at = self
            .patterns
            .iter()
            .position(|p| p.priority < pattern.priority)
            .unwrap_or(self.patterns.len());
        self.patterns.insert(at, pattern);
    }

    /// Drop patterns by name
    pub fn without(mut self, names: &[String]) -> Self {
        self.patterns
            .retain(|p| !names.iter().any(|n| n.trim() == p.name));
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pattern> {
        self.patterns.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.patterns.iter().map(|p| p.name).collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// Shared Helpers
// ============================================================================

/// Prepositions treated as locations on main and copula verbs
const LOCATION_PREPS: [&str; 3] = ["in", "at", "from"];

/// Prepositions read from relative clauses
const RELATIVE_CLAUSE_PREPS: [&str; 3] = ["at", "in", "for"];

/// Symbolic stand-in for a possessive pronoun
pub fn placeholder(token: &Token) -> Option<&'static str> {
    match token.lower().as_str() {
        "my" => Some("[speaker]"),
        "your" => Some("[listener]"),
        "his" => Some("[he]"),
        "her" => Some("[she]"),
        "their" => Some("[they]"),
        "our" => Some("[we]"),
        "its" => Some("[it]"),
        _ => None,
    }
}

/// Children of `token` carrying one of `labels`
fn children_with<'a>(
    sentence: &'a Sentence,
    token: &Token,
    labels: &[DepLabel],
) -> Result<Vec<&'a Token>> {
    Ok(sentence
        .children(token)?
        .into_iter()
        .filter(|child| labels.contains(&child.dep))
        .collect())
}

/// `token` plus selected children, joined in sentence order
fn phrase(
    sentence: &Sentence,
    token: &Token,
    labels: &[DepLabel],
    exclude: Option<usize>,
) -> Result<String> {
    let mut tokens = children_with(sentence, token, labels)?;
    tokens.push(sentence.token(token.index)?);
    tokens.retain(|t| Some(t.index) != exclude);
    tokens.sort_by_key(|t| t.index);

    Ok(tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" "))
}

/// Subject noun phrase: compounds, adjectives and possessors included
pub fn subject_phrase(sentence: &Sentence, token: &Token) -> Result<String> {
    phrase(
        sentence,
        token,
        &[
            DepLabel::Compound,
            DepLabel::AdjectivalModifier,
            DepLabel::Possessive,
        ],
        None,
    )
}

/// Object noun phrase: compounds, adjectives and determiners included
pub fn object_phrase(sentence: &Sentence, token: &Token) -> Result<String> {
    phrase(
        sentence,
        token,
        &[
            DepLabel::Compound,
            DepLabel::AdjectivalModifier,
            DepLabel::Determiner,
        ],
        None,
    )
}

/// Tense from the fine-grained tag, with a `will` auxiliary marking future
pub fn tense(sentence: &Sentence, verb: &Token) -> Result<Tense> {
    match verb.tag.as_str() {
        "VBD" | "VBN" => Ok(Tense::Past),
        "VBZ" | "VBP" | "VBG" => Ok(Tense::Present),
        _ => {
            let future = sentence
                .lefts(verb)?
                .iter()
                .any(|t| t.lower() == "will");
            Ok(if future { Tense::Future } else { Tense::Present })
        }
    }
}

pub fn is_negated(sentence: &Sentence, verb: &Token) -> Result<bool> {
    Ok(!children_with(sentence, verb, &[DepLabel::Negation])?.is_empty())
}

/// `(preposition, object phrase)` pairs attached to a verb
pub fn prepositional_objects(sentence: &Sentence, verb: &Token) -> Result<Vec<(String, String)>> {
    let mut phrases = Vec::new();
    for prep in children_with(sentence, verb, &[DepLabel::Preposition])? {
        for pobj in children_with(sentence, prep, &[DepLabel::PrepositionalObject])? {
            phrases.push((prep.lower(), object_phrase(sentence, pobj)?));
        }
    }
    Ok(phrases)
}

/// Texts of the verb's adverbial modifiers
fn modifiers(sentence: &Sentence, verb: &Token) -> Result<Vec<String>> {
    Ok(children_with(sentence, verb, &[DepLabel::AdverbialModifier])?
        .into_iter()
        .map(|t| t.text.clone())
        .collect())
}

/// First child of the verb annotated as a date or time
fn temporal(sentence: &Sentence, verb: &Token) -> Result<Option<String>> {
    for child in sentence.children(verb)? {
        if matches!(child.entity_type.as_deref(), Some("DATE" | "TIME")) {
            return Ok(Some(object_phrase(sentence, child)?));
        }
    }
    Ok(None)
}

/// Candidate read from a verb: tense, negation, modifiers and temporal filled in
fn verb_candidate(
    sentence: &Sentence,
    verb: &Token,
    subject: String,
    predicate: String,
    object: Option<String>,
    pattern: PatternKind,
) -> Result<RawCandidate> {
    let mut candidate = RawCandidate::new(subject, predicate, object, pattern);
    candidate.tense = Some(tense(sentence, verb)?);
    candidate.negated = is_negated(sentence, verb)?;
    candidate.modifiers = modifiers(sentence, verb)?;
    candidate.temporal = temporal(sentence, verb)?;
    Ok(candidate)
}

fn is_complement(token: &Token) -> bool {
    matches!(token.dep, DepLabel::Attribute | DepLabel::AdjectivalComplement)
}

fn lemma(token: &Token) -> String {
    token.lemma.to_lowercase()
}

// ============================================================================
// Patterns
// ============================================================================

/// "That's Sarah's car", "my brother Tom"
pub fn extract_possessive(sentence: &Sentence) -> Result<Vec<RawCandidate>> {
    let mut candidates = Vec::new();

    for token in sentence.iter().filter(|t| t.dep == DepLabel::Possessive) {
        let Some(head) = sentence.head(token)? else {
            continue;
        };

        let possessed = phrase(
            sentence,
            head,
            &[
                DepLabel::Compound,
                DepLabel::AdjectivalModifier,
                DepLabel::Determiner,
            ],
            Some(token.index),
        )?;

        let possessor = if token.is_pronoun() {
            placeholder(token).map_or_else(|| token.text.clone(), str::to_string)
        } else {
            token.text.clone()
        };

        let mut candidate =
            RawCandidate::new(possessor, "owns", Some(possessed), PatternKind::Possessive);
        candidate.tense = Some(Tense::Present);
        candidates.push(candidate);
    }

    Ok(candidates)
}

/// "Mike is my brother", "Sarah is a teacher", "I am from Austin"
pub fn extract_copula_relations(sentence: &Sentence) -> Result<Vec<RawCandidate>> {
    let mut candidates = Vec::new();

    for root in sentence.roots().filter(|t| lemma(t) == "be") {
        let mut subject = None;
        let mut complement = None;

        for child in sentence.children(root)? {
            if child.dep.is_subject() {
                let mut text = subject_phrase(sentence, child)?;
                for owner in children_with(sentence, child, &[DepLabel::Possessive])? {
                    if let Some(resolved) = placeholder(owner) {
                        text = format!("{resolved}'s {}", child.text);
                    }
                }
                subject = Some(text);
            } else if is_complement(child) {
                complement = Some(child);
            }
        }

        let Some(subject) = subject else {
            continue;
        };

        if let Some(complement) = complement {
            let complement_text = object_phrase(sentence, complement)?;
            let owners: Vec<&'static str> =
                children_with(sentence, complement, &[DepLabel::Possessive])?
                    .into_iter()
                    .filter_map(placeholder)
                    .collect();

            if owners.is_empty() {
                candidates.push(verb_candidate(
                    sentence,
                    root,
                    subject.clone(),
                    "is".to_string(),
                    Some(complement_text),
                    PatternKind::CopulaAttribute,
                )?);
            } else {
                // "Mike is my brother" -> [speaker] has_brother Mike
                for owner in owners {
                    candidates.push(verb_candidate(
                        sentence,
                        root,
                        owner.to_string(),
                        format!("has_{complement_text}"),
                        Some(subject.clone()),
                        PatternKind::CopulaRelation,
                    )?);
                }
            }
        }

        for (prep, object) in prepositional_objects(sentence, root)? {
            if LOCATION_PREPS.contains(&prep.as_str()) {
                let candidate = verb_candidate(
                    sentence,
                    root,
                    subject.clone(),
                    format!("{}_{prep}", lemma(root)),
                    Some(object.clone()),
                    PatternKind::CopulaLocation,
                )?;
                candidates.push(candidate.with_preposition(prep, object));
            }
        }
    }

    Ok(candidates)
}

/// "I live in Austin", "She works at Google"
pub fn extract_action_location(sentence: &Sentence) -> Result<Vec<RawCandidate>> {
    let mut candidates = Vec::new();

    for root in sentence.roots().filter(|t| t.is_verb()) {
        let mut subject = None;
        for child in sentence.children(root)? {
            if child.dep.is_subject() {
                subject = Some(subject_phrase(sentence, child)?);
            }
        }

        let Some(subject) = subject else {
            continue;
        };

        for (prep, object) in prepositional_objects(sentence, root)? {
            if LOCATION_PREPS.contains(&prep.as_str()) {
                let candidate = verb_candidate(
                    sentence,
                    root,
                    subject.clone(),
                    format!("{}_{prep}", lemma(root)),
                    Some(object.clone()),
                    PatternKind::ActionLocation,
                )?;
                candidates.push(candidate.with_preposition(prep, object));
            }
        }
    }

    Ok(candidates)
}

/// "My friend Tom, who works at Google, ..."
pub fn extract_relative_clauses(sentence: &Sentence) -> Result<Vec<RawCandidate>> {
    let mut candidates = Vec::new();

    for verb in sentence.iter().filter(|t| t.dep == DepLabel::RelativeClause) {
        let Some(head) = sentence.head(verb)? else {
            continue;
        };
        let subject = head.text.clone();

        let mut object = None;
        for child in sentence.children(verb)? {
            if child.dep.is_object() {
                object = Some(object_phrase(sentence, child)?);
            }
        }

        if object.is_some() {
            candidates.push(verb_candidate(
                sentence,
                verb,
                subject.clone(),
                lemma(verb),
                object,
                PatternKind::RelativeClause,
            )?);
        }

        for (prep, object) in prepositional_objects(sentence, verb)? {
            if RELATIVE_CLAUSE_PREPS.contains(&prep.as_str()) {
                let candidate = verb_candidate(
                    sentence,
                    verb,
                    subject.clone(),
                    format!("{}_{prep}", lemma(verb)),
                    Some(object.clone()),
                    PatternKind::RelativeClauseLocation,
                )?;
                candidates.push(candidate.with_preposition(prep, object));
            }
        }
    }

    Ok(candidates)
}

/// "John and Sarah are friends"
pub fn extract_compound_subjects(sentence: &Sentence) -> Result<Vec<RawCandidate>> {
    let mut candidates = Vec::new();

    for root in sentence.roots() {
        let mut subjects = Vec::new();
        let mut object = None;

        for child in sentence.children(root)? {
            if child.dep.is_subject() {
                subjects.push(child.text.clone());
                for conj in children_with(sentence, child, &[DepLabel::Conjunction])? {
                    subjects.push(conj.text.clone());
                }
            } else if child.dep.is_object() {
                object = Some(object_phrase(sentence, child)?);
            }
        }

        if subjects.len() > 1 && object.is_some() {
            candidates.push(verb_candidate(
                sentence,
                root,
                subjects.join(" + "),
                lemma(root),
                object,
                PatternKind::CompoundSubject,
            )?);
        }
    }

    Ok(candidates)
}

/// "John loves pizza", "Sarah owns a car"
pub fn extract_simple_svo(sentence: &Sentence) -> Result<Vec<RawCandidate>> {
    let mut candidates = Vec::new();

    for root in sentence.roots().filter(|t| t.is_verb()) {
        let mut subject: Option<(String, &Token)> = None;
        let mut object = None;

        for child in sentence.children(root)? {
            if child.dep.is_subject() {
                subject = Some((subject_phrase(sentence, child)?, child));
            } else if child.dep.is_object() {
                object = Some(object_phrase(sentence, child)?);
            }
        }

        let (Some((mut subject, subject_token)), Some(object)) = (subject, object) else {
            continue;
        };

        if subject_token.is_pronoun() {
            for owner in children_with(sentence, subject_token, &[DepLabel::Possessive])? {
                if let Some(resolved) = placeholder(owner) {
                    subject = resolved.to_string();
                }
            }
        }

        candidates.push(verb_candidate(
            sentence,
            root,
            subject,
            lemma(root),
            Some(object),
            PatternKind::SimpleSvo,
        )?);
    }

    Ok(candidates)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use relex_core::DepLabel as D;

    fn tok(text: &str, lemma: &str, pos: &str, tag: &str, dep: D, head: Option<usize>) -> Token {
        Token::new(0, text, lemma, pos, tag, dep, head)
    }

    fn sentence(text: &str, tokens: Vec<Token>) -> Sentence {
        Sentence::new(0, text, tokens).unwrap()
    }

    /// "John loves pizza"
    fn john_loves_pizza() -> Sentence {
        sentence(
            "John loves pizza",
            vec![
                tok("John", "John", "PROPN", "NNP", D::NominalSubject, Some(1)),
                tok("loves", "love", "VERB", "VBZ", D::Root, None),
                tok("pizza", "pizza", "NOUN", "NN", D::DirectObject, Some(1)),
            ],
        )
    }

    /// "Mike is my brother"
    fn mike_is_my_brother() -> Sentence {
        sentence(
            "Mike is my brother",
            vec![
                tok("Mike", "Mike", "PROPN", "NNP", D::NominalSubject, Some(1)),
                tok("is", "be", "AUX", "VBZ", D::Root, None),
                tok("my", "my", "PRON", "PRP$", D::Possessive, Some(3)),
                tok("brother", "brother", "NOUN", "NN", D::Attribute, Some(1)),
            ],
        )
    }

    /// "I live in Austin"
    fn i_live_in_austin() -> Sentence {
        sentence(
            "I live in Austin",
            vec![
                tok("I", "I", "PRON", "PRP", D::NominalSubject, Some(1)),
                tok("live", "live", "VERB", "VBP", D::Root, None),
                tok("in", "in", "ADP", "IN", D::Preposition, Some(1)),
                tok("Austin", "Austin", "PROPN", "NNP", D::PrepositionalObject, Some(2)),
            ],
        )
    }

    /// "My friend Tom, who works at Google, just got promoted"
    fn friend_tom_relative_clause() -> Sentence {
        sentence(
            "My friend Tom, who works at Google, just got promoted",
            vec![
                tok("My", "my", "PRON", "PRP$", D::Possessive, Some(1)),
                tok("friend", "friend", "NOUN", "NN", D::Compound, Some(2)),
                tok("Tom", "Tom", "PROPN", "NNP", D::PassiveSubject, Some(11)),
                tok(",", ",", "PUNCT", ",", D::from_label("punct"), Some(2)),
                tok("who", "who", "PRON", "WP", D::NominalSubject, Some(5)),
                tok("works", "work", "VERB", "VBZ", D::RelativeClause, Some(2)),
                tok("at", "at", "ADP", "IN", D::Preposition, Some(5)),
                tok("Google", "Google", "PROPN", "NNP", D::PrepositionalObject, Some(6)),
                tok(",", ",", "PUNCT", ",", D::from_label("punct"), Some(2)),
                tok("just", "just", "ADV", "RB", D::AdverbialModifier, Some(11)),
                tok("got", "get", "AUX", "VBD", D::from_label("auxpass"), Some(11)),
                tok("promoted", "promote", "VERB", "VBN", D::Root, None),
            ],
        )
    }

    #[test]
    fn test_library_order() {
        let library = PatternLibrary::standard();
        assert_eq!(
            library.names(),
            vec![
                "possessive",
                "copula_relations",
                "action_location",
                "relative_clauses",
                "compound_subjects",
                "simple_svo"
            ]
        );
    }

    #[test]
    fn test_register_keeps_priority_order() {
        fn nothing(_: &Sentence) -> Result<Vec<RawCandidate>> {
            Ok(Vec::new())
        }

        let mut library = PatternLibrary::standard();
        library.register(Pattern {
            name: "custom",
            description: "test pattern",
            priority: 8,
            examples: &[],
            extract: nothing,
        });
        let names = library.names();
        assert_eq!(names[2], "action_location");
        assert_eq!(names[3], "custom");
        assert_eq!(library.len(), 7);
    }

    #[test]
    fn test_without_disables_by_name() {
        let library =
            PatternLibrary::standard().without(&["simple_svo".to_string(), "unknown".to_string()]);
        assert_eq!(library.len(), 5);
        assert!(!library.names().contains(&"simple_svo"));
    }

    #[test]
    fn test_simple_svo() {
        let candidates = extract_simple_svo(&john_loves_pizza()).unwrap();
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.subject, "John");
        assert_eq!(c.predicate, "love");
        assert_eq!(c.object.as_deref(), Some("pizza"));
        assert_eq!(c.tense, Some(Tense::Present));
        assert!(!c.negated);
        assert_eq!(c.pattern, PatternKind::SimpleSvo);
    }

    #[test]
    fn test_copula_inversion() {
        let s = mike_is_my_brother();
        let candidates = extract_copula_relations(&s).unwrap();
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.subject, "[speaker]");
        assert_eq!(c.predicate, "has_brother");
        assert_eq!(c.object.as_deref(), Some("Mike"));
        assert_eq!(c.pattern, PatternKind::CopulaRelation);
    }

    #[test]
    fn test_copula_attribute() {
        let s = sentence(
            "Sarah is a teacher",
            vec![
                tok("Sarah", "Sarah", "PROPN", "NNP", D::NominalSubject, Some(1)),
                tok("is", "be", "AUX", "VBZ", D::Root, None),
                tok("a", "a", "DET", "DT", D::Determiner, Some(3)),
                tok("teacher", "teacher", "NOUN", "NN", D::Attribute, Some(1)),
            ],
        );
        let candidates = extract_copula_relations(&s).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].predicate, "is");
        assert_eq!(candidates[0].object.as_deref(), Some("a teacher"));
        assert_eq!(candidates[0].pattern, PatternKind::CopulaAttribute);
    }

    #[test]
    fn test_copula_possessive_subject() {
        let s = sentence(
            "My sister is tall",
            vec![
                tok("My", "my", "PRON", "PRP$", D::Possessive, Some(1)),
                tok("sister", "sister", "NOUN", "NN", D::NominalSubject, Some(2)),
                tok("is", "be", "AUX", "VBZ", D::Root, None),
                tok("tall", "tall", "ADJ", "JJ", D::AdjectivalComplement, Some(2)),
            ],
        );
        let candidates = extract_copula_relations(&s).unwrap();
        assert_eq!(candidates[0].subject, "[speaker]'s sister");
        assert_eq!(candidates[0].object.as_deref(), Some("tall"));
    }

    #[test]
    fn test_copula_location() {
        let s = sentence(
            "I am from Texas",
            vec![
                tok("I", "I", "PRON", "PRP", D::NominalSubject, Some(1)),
                tok("am", "be", "AUX", "VBP", D::Root, None),
                tok("from", "from", "ADP", "IN", D::Preposition, Some(1)),
                tok("Texas", "Texas", "PROPN", "NNP", D::PrepositionalObject, Some(2)),
            ],
        );
        let candidates = extract_copula_relations(&s).unwrap();
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.predicate, "be_from");
        assert_eq!(c.object.as_deref(), Some("Texas"));
        assert_eq!(c.pattern, PatternKind::CopulaLocation);
        assert_eq!(c.prepositions[0].prep, "from");
    }

    #[test]
    fn test_possessive_pronoun_and_name() {
        let candidates = extract_possessive(&mike_is_my_brother()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].subject, "[speaker]");
        assert_eq!(candidates[0].predicate, "owns");
        assert_eq!(candidates[0].object.as_deref(), Some("brother"));

        let s = sentence(
            "Sarah's red car",
            vec![
                tok("Sarah", "Sarah", "PROPN", "NNP", D::Possessive, Some(3)),
                tok("'s", "'s", "PART", "POS", D::from_label("case"), Some(0)),
                tok("red", "red", "ADJ", "JJ", D::AdjectivalModifier, Some(3)),
                tok("car", "car", "NOUN", "NN", D::Root, None),
            ],
        );
        let candidates = extract_possessive(&s).unwrap();
        assert_eq!(candidates[0].subject, "Sarah");
        assert_eq!(candidates[0].object.as_deref(), Some("red car"));
    }

    #[test]
    fn test_action_location() {
        let candidates = extract_action_location(&i_live_in_austin()).unwrap();
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.subject, "I");
        assert_eq!(c.predicate, "live_in");
        assert_eq!(c.object.as_deref(), Some("Austin"));
        assert_eq!(c.prepositions.len(), 1);
        assert_eq!(c.prepositions[0].object, "Austin");
    }

    #[test]
    fn test_relative_clause() {
        let s = friend_tom_relative_clause();
        let candidates = extract_relative_clauses(&s).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].subject, "Tom");
        assert_eq!(candidates[0].predicate, "work_at");
        assert_eq!(candidates[0].object.as_deref(), Some("Google"));
        assert_eq!(candidates[0].pattern, PatternKind::RelativeClauseLocation);

        // Root has no object, so SVO stays silent
        assert!(extract_simple_svo(&s).unwrap().is_empty());
    }

    #[test]
    fn test_compound_subjects() {
        let s = sentence(
            "John and Sarah are friends",
            vec![
                tok("John", "John", "PROPN", "NNP", D::NominalSubject, Some(3)),
                tok("and", "and", "CCONJ", "CC", D::from_label("cc"), Some(0)),
                tok("Sarah", "Sarah", "PROPN", "NNP", D::Conjunction, Some(0)),
                tok("are", "be", "AUX", "VBP", D::Root, None),
                tok("friends", "friend", "NOUN", "NNS", D::Attribute, Some(3)),
            ],
        );
        let candidates = extract_compound_subjects(&s).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].subject, "John + Sarah");
        assert_eq!(candidates[0].predicate, "be");
        assert_eq!(candidates[0].object.as_deref(), Some("friends"));

        // Single subjects produce nothing
        assert!(extract_compound_subjects(&john_loves_pizza())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_tense_and_negation() {
        let s = sentence(
            "John will not visit Paris",
            vec![
                tok("John", "John", "PROPN", "NNP", D::NominalSubject, Some(3)),
                tok("will", "will", "AUX", "MD", D::Auxiliary, Some(3)),
                tok("not", "not", "PART", "RB", D::Negation, Some(3)),
                tok("visit", "visit", "VERB", "VB", D::Root, None),
                tok("Paris", "Paris", "PROPN", "NNP", D::DirectObject, Some(3)),
            ],
        );
        let verb = s.token(3).unwrap();
        assert_eq!(tense(&s, verb).unwrap(), Tense::Future);
        assert!(is_negated(&s, verb).unwrap());

        let past = sentence(
            "Tom met Sarah",
            vec![
                tok("Tom", "Tom", "PROPN", "NNP", D::NominalSubject, Some(1)),
                tok("met", "meet", "VERB", "VBD", D::Root, None),
                tok("Sarah", "Sarah", "PROPN", "NNP", D::DirectObject, Some(1)),
            ],
        );
        assert_eq!(tense(&past, past.token(1).unwrap()).unwrap(), Tense::Past);

        // "got promoted": participle root
        let promoted = friend_tom_relative_clause();
        assert_eq!(
            tense(&promoted, promoted.token(11).unwrap()).unwrap(),
            Tense::Past
        );

        let progressive = sentence(
            "Sarah is dating Tom",
            vec![
                tok("Sarah", "Sarah", "PROPN", "NNP", D::NominalSubject, Some(2)),
                tok("is", "be", "AUX", "VBZ", D::Auxiliary, Some(2)),
                tok("dating", "date", "VERB", "VBG", D::Root, None),
                tok("Tom", "Tom", "PROPN", "NNP", D::DirectObject, Some(2)),
            ],
        );
        assert_eq!(
            tense(&progressive, progressive.token(2).unwrap()).unwrap(),
            Tense::Present
        );
    }

    #[test]
    fn test_modifiers_and_temporal() {
        let s = sentence(
            "I really met Sarah yesterday",
            vec![
                tok("I", "I", "PRON", "PRP", D::NominalSubject, Some(2)),
                tok("really", "really", "ADV", "RB", D::AdverbialModifier, Some(2)),
                tok("met", "meet", "VERB", "VBD", D::Root, None),
                tok("Sarah", "Sarah", "PROPN", "NNP", D::DirectObject, Some(2)),
                tok("yesterday", "yesterday", "NOUN", "NN", D::NounPhraseAdverbial, Some(2))
                    .with_entity_type("DATE"),
            ],
        );
        let candidates = extract_simple_svo(&s).unwrap();
        assert_eq!(candidates[0].modifiers, vec!["really"]);
        assert_eq!(candidates[0].temporal.as_deref(), Some("yesterday"));
    }

    #[test]
    fn test_placeholders() {
        let her = tok("Her", "her", "PRON", "PRP$", D::Possessive, None);
        assert_eq!(placeholder(&her), Some("[she]"));
        let the = tok("the", "the", "DET", "DT", D::Determiner, None);
        assert_eq!(placeholder(&the), None);
    }

    #[test]
    fn test_dangling_child_is_pattern_error() {
        let mut s = john_loves_pizza();
        s.tokens[1].children.push(9);
        assert!(extract_simple_svo(&s).is_err());
    }
}
