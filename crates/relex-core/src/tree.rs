//! Dependency-parse data model
//!
//! Tokens are identified by their position within a sentence. Heads and
//! children are stored as positions, so a sentence owns its whole tree and
//! navigation never needs reference cycles.

use serde::{Deserialize, Serialize};

use crate::{RelexError, Result};

// ============================================================================
// Dependency Labels
// ============================================================================

/// Dependency relation of a token to its head (spaCy/ClearNLP label set)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DepLabel {
    NominalSubject,       // nsubj
    PassiveSubject,       // nsubjpass
    DirectObject,         // dobj
    Attribute,            // attr
    AdjectivalComplement, // acomp
    Possessive,           // poss
    Preposition,          // prep
    PrepositionalObject,  // pobj
    Compound,             // compound
    AdjectivalModifier,   // amod
    Determiner,           // det
    Negation,             // neg
    Conjunction,          // conj
    RelativeClause,       // relcl
    AdverbialModifier,    // advmod
    NounPhraseAdverbial,  // npadvmod
    Auxiliary,            // aux
    Root,                 // ROOT
    Other(String),
}

impl DepLabel {
    /// Parse a label string as emitted by the parser
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "nsubj" => Self::NominalSubject,
            "nsubjpass" => Self::PassiveSubject,
            "dobj" => Self::DirectObject,
            "attr" => Self::Attribute,
            "acomp" => Self::AdjectivalComplement,
            "poss" => Self::Possessive,
            "prep" => Self::Preposition,
            "pobj" => Self::PrepositionalObject,
            "compound" => Self::Compound,
            "amod" => Self::AdjectivalModifier,
            "det" => Self::Determiner,
            "neg" => Self::Negation,
            "conj" => Self::Conjunction,
            "relcl" => Self::RelativeClause,
            "advmod" => Self::AdverbialModifier,
            "npadvmod" => Self::NounPhraseAdverbial,
            "aux" => Self::Auxiliary,
            "root" => Self::Root,
            other => Self::Other(other.to_string()),
        }
    }

    /// Get the label string
    pub fn as_str(&self) -> &str {
        match self {
            Self::NominalSubject => "nsubj",
            Self::PassiveSubject => "nsubjpass",
            Self::DirectObject => "dobj",
            Self::Attribute => "attr",
            Self::AdjectivalComplement => "acomp",
            Self::Possessive => "poss",
            Self::Preposition => "prep",
            Self::PrepositionalObject => "pobj",
            Self::Compound => "compound",
            Self::AdjectivalModifier => "amod",
            Self::Determiner => "det",
            Self::Negation => "neg",
            Self::Conjunction => "conj",
            Self::RelativeClause => "relcl",
            Self::AdverbialModifier => "advmod",
            Self::NounPhraseAdverbial => "npadvmod",
            Self::Auxiliary => "aux",
            Self::Root => "ROOT",
            Self::Other(label) => label.as_str(),
        }
    }

    /// Active or passive nominal subject
    pub fn is_subject(&self) -> bool {
        matches!(self, Self::NominalSubject | Self::PassiveSubject)
    }

    /// Direct object or attribute complement
    pub fn is_object(&self) -> bool {
        matches!(self, Self::DirectObject | Self::Attribute)
    }
}

impl From<String> for DepLabel {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<DepLabel> for String {
    fn from(label: DepLabel) -> Self {
        label.as_str().to_string()
    }
}

impl std::fmt::Display for DepLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Tokens
// ============================================================================

/// A single parsed token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Position within the sentence (0-based)
    pub index: usize,

    /// Surface text
    pub text: String,

    /// Lemma
    pub lemma: String,

    /// Coarse part of speech (UPOS: VERB, PROPN, PRON, ...)
    pub pos: String,

    /// Fine-grained tag (PTB: VBD, VBZ, ...)
    pub tag: String,

    /// Dependency label
    pub dep: DepLabel,

    /// Position of the head token, `None` for the root
    pub head: Option<usize>,

    /// Positions of child tokens in sentence order
    #[serde(default)]
    pub children: Vec<usize>,

    /// Named-entity annotation (PERSON, ORG, GPE, DATE, ...)
    #[serde(default)]
    pub entity_type: Option<String>,

    /// Index of the owning sentence within its document
    #[serde(default)]
    pub sentence_index: usize,
}

impl Token {
    /// Create a token; children are filled in by [`Sentence::new`]
    pub fn new(
        index: usize,
        text: impl Into<String>,
        lemma: impl Into<String>,
        pos: impl Into<String>,
        tag: impl Into<String>,
        dep: DepLabel,
        head: Option<usize>,
    ) -> Self {
        Self {
            index,
            text: text.into(),
            lemma: lemma.into(),
            pos: pos.into(),
            tag: tag.into(),
            dep,
            head,
            children: Vec::new(),
            entity_type: None,
            sentence_index: 0,
        }
    }

    /// Set the named-entity annotation
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Lowercased surface text
    pub fn lower(&self) -> String {
        self.text.to_lowercase()
    }

    pub fn is_pronoun(&self) -> bool {
        self.pos == "PRON"
    }

    pub fn is_proper_noun(&self) -> bool {
        self.pos == "PROPN"
    }

    pub fn is_verb(&self) -> bool {
        self.pos == "VERB"
    }

    pub fn is_root(&self) -> bool {
        self.dep == DepLabel::Root
    }
}

// ============================================================================
// Sentences and Documents
// ============================================================================

/// A parsed sentence owning its dependency tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    /// Index within the document
    pub index: usize,

    /// Sentence text
    pub text: String,

    /// Tokens in sentence order
    pub tokens: Vec<Token>,
}

impl Sentence {
    /// Build a sentence, deriving child lists from heads.
    ///
    /// Token positions are normalised to their order in `tokens`; heads must
    /// point inside the sentence and never at the token itself.
    pub fn new(index: usize, text: impl Into<String>, mut tokens: Vec<Token>) -> Result<Self> {
        let len = tokens.len();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); len];

        for (position, token) in tokens.iter_mut().enumerate() {
            token.index = position;
            token.sentence_index = index;
            token.children.clear();

            if let Some(head) = token.head {
                if head >= len || head == position {
                    return Err(RelexError::MalformedTree(format!(
                        "token {position} ('{}') has invalid head {head}",
                        token.text
                    )));
                }
                children[head].push(position);
            }
        }

        for (token, kids) in tokens.iter_mut().zip(children) {
            token.children = kids;
        }

        Ok(Self {
            index,
            text: text.into(),
            tokens,
        })
    }

    /// Move the sentence to another position in a document
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        for token in &mut self.tokens {
            token.sentence_index = index;
        }
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Token at a position
    pub fn token(&self, index: usize) -> Result<&Token> {
        self.tokens.get(index).ok_or_else(|| {
            RelexError::MalformedTree(format!(
                "token {index} out of range in sentence {} ({} tokens)",
                self.index,
                self.tokens.len()
            ))
        })
    }

    /// Children of a token in sentence order
    pub fn children(&self, token: &Token) -> Result<Vec<&Token>> {
        token.children.iter().map(|&i| self.token(i)).collect()
    }

    /// Children of a token that precede it
    pub fn lefts(&self, token: &Token) -> Result<Vec<&Token>> {
        Ok(self
            .children(token)?
            .into_iter()
            .filter(|child| child.index < token.index)
            .collect())
    }

    /// Head of a token, `None` for the root
    pub fn head(&self, token: &Token) -> Result<Option<&Token>> {
        token.head.map(|i| self.token(i)).transpose()
    }

    /// Root tokens (normally exactly one)
    pub fn roots(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| t.is_root())
    }
}

/// A parsed multi-sentence text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Full text
    pub text: String,

    /// Sentences in document order
    pub sentences: Vec<Sentence>,
}

impl Document {
    pub fn new(text: impl Into<String>, sentences: Vec<Sentence>) -> Self {
        Self {
            text: text.into(),
            sentences,
        }
    }

    /// Build a document whose text is the sentence texts joined by spaces
    pub fn from_sentences(sentences: Vec<Sentence>) -> Self {
        let text = sentences
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self { text, sentences }
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sentence> {
        self.sentences.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================
