//! Relation taxonomy and classifier
//!
//! Static word lists mapping predicates to relation types, plus the family
//! and romantic subtype tables. The `Lexicon` is built once and shared by
//! reference; nothing in it changes after construction.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// Relation Types
// ============================================================================

/// Semantic category of a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    // Interpersonal
    Family,
    Romantic,
    Social,
    Professional,

    // Possession
    Possession,

    // Preferences and opinions
    Preference,
    Opinion,

    // Location and space
    Location,
    Residence,
    Origin,

    // Employment and education
    Employment,
    Education,

    // Attributes
    Attribute,
    Characteristic,

    // Events and actions
    Event,
    Action,

    Temporal,
    Knowledge,
    Other,
}

impl RelationType {
    pub const ALL: [RelationType; 19] = [
        Self::Family,
        Self::Romantic,
        Self::Social,
        Self::Professional,
        Self::Possession,
        Self::Preference,
        Self::Opinion,
        Self::Location,
        Self::Residence,
        Self::Origin,
        Self::Employment,
        Self::Education,
        Self::Attribute,
        Self::Characteristic,
        Self::Event,
        Self::Action,
        Self::Temporal,
        Self::Knowledge,
        Self::Other,
    ];

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Family => "family",
            Self::Romantic => "romantic",
            Self::Social => "social",
            Self::Professional => "professional",
            Self::Possession => "possession",
            Self::Preference => "preference",
            Self::Opinion => "opinion",
            Self::Location => "location",
            Self::Residence => "residence",
            Self::Origin => "origin",
            Self::Employment => "employment",
            Self::Education => "education",
            Self::Attribute => "attribute",
            Self::Characteristic => "characteristic",
            Self::Event => "event",
            Self::Action => "action",
            Self::Temporal => "temporal",
            Self::Knowledge => "knowledge",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unrecognised relation type name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown relation type: {0}")]
pub struct UnknownRelationType(pub String);

impl FromStr for RelationType {
    type Err = UnknownRelationType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| UnknownRelationType(s.to_string()))
    }
}

// ============================================================================
// Subtypes
// ============================================================================

/// A specific relation within the family or romantic categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSubtype {
    /// Key used in relation records ("sibling", "married", ...)
    pub name: &'static str,
    /// Owning relation type
    pub relation_type: RelationType,
    /// Surface words that identify this subtype
    pub triggers: &'static [&'static str],
    /// Holds with subject and object swapped
    pub is_symmetric: bool,
    /// Subtype of the reverse direction, for asymmetric relations
    pub inverse: Option<&'static str>,
}

impl RelationSubtype {
    const fn new(
        name: &'static str,
        relation_type: RelationType,
        triggers: &'static [&'static str],
        is_symmetric: bool,
        inverse: Option<&'static str>,
    ) -> Self {
        Self {
            name,
            relation_type,
            triggers,
            is_symmetric,
            inverse,
        }
    }

    /// Exact membership of lowercased, trimmed text in the trigger set
    pub fn matches(&self, text: &str) -> bool {
        let text = text.trim().to_lowercase();
        self.triggers.iter().any(|t| *t == text)
    }
}

const FAMILY_SUBTYPES: [RelationSubtype; 6] = [
    RelationSubtype::new(
        "sibling",
        RelationType::Family,
        &["brother", "sister", "sibling"],
        true,
        None,
    ),
    RelationSubtype::new(
        "parent",
        RelationType::Family,
        &["mother", "father", "mom", "dad", "parent"],
        false,
        Some("child"),
    ),
    RelationSubtype::new(
        "child",
        RelationType::Family,
        &["son", "daughter", "child", "kid"],
        false,
        Some("parent"),
    ),
    RelationSubtype::new(
        "spouse",
        RelationType::Family,
        &["husband", "wife", "spouse"],
        true,
        None,
    ),
    RelationSubtype::new(
        "grandparent",
        RelationType::Family,
        &["grandmother", "grandfather", "grandma", "grandpa", "grandparent"],
        false,
        Some("grandchild"),
    ),
    RelationSubtype::new(
        "extended",
        RelationType::Family,
        &["uncle", "aunt", "cousin", "nephew", "niece"],
        false,
        None,
    ),
];

const ROMANTIC_SUBTYPES: [RelationSubtype; 4] = [
    RelationSubtype::new(
        "dating",
        RelationType::Romantic,
        &["dating", "seeing", "going out with"],
        true,
        None,
    ),
    RelationSubtype::new(
        "engaged",
        RelationType::Romantic,
        &["engaged to", "fiancé", "fiancée"],
        true,
        None,
    ),
    RelationSubtype::new(
        "married",
        RelationType::Romantic,
        &["married to", "married"],
        true,
        None,
    ),
    RelationSubtype::new(
        "partner",
        RelationType::Romantic,
        &["partner", "significant other", "boyfriend", "girlfriend"],
        true,
        None,
    ),
];

// ============================================================================
// Verb Rules
// ============================================================================

/// One step of the classification cascade
#[derive(Debug, Clone)]
pub struct VerbRule {
    /// Rule name for debugging ("preference_positive", "residence", ...)
    pub name: &'static str,
    /// Predicate forms that trigger the rule
    pub verbs: HashSet<&'static str>,
    /// Resulting type
    pub relation_type: RelationType,
}

impl VerbRule {
    fn new(name: &'static str, verbs: &[&'static str], relation_type: RelationType) -> Self {
        Self {
            name,
            verbs: verbs.iter().copied().collect(),
            relation_type,
        }
    }
}

/// Prepositions the pattern library appends to predicates (`live_in`)
const PREDICATE_PREPOSITIONS: [&str; 4] = ["in", "at", "from", "for"];

/// Prefix of the inverted copula predicate (`has_brother`)
pub const RELATIONAL_PREFIX: &str = "has_";

/// Outcome of classifying one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub relation_type: RelationType,
    pub subtype: Option<&'static str>,
    pub is_symmetric: bool,
}

// ============================================================================
// Lexicon
// ============================================================================

/// Immutable classification tables
#[derive(Debug, Clone)]
pub struct Lexicon {
    rules: Vec<VerbRule>,
    copulas: HashSet<&'static str>,
    family: Vec<RelationSubtype>,
    romantic: Vec<RelationSubtype>,
}

impl Lexicon {
    /// The standard English tables; rule order is significant
    pub fn standard() -> Self {
        let rules = vec![
            VerbRule::new(
                "preference_positive",
                &["like", "love", "enjoy", "prefer", "adore", "appreciate", "fancy"],
                RelationType::Preference,
            ),
            VerbRule::new(
                "preference_negative",
                &["hate", "dislike", "despise", "can't stand", "loathe"],
                RelationType::Preference,
            ),
            VerbRule::new(
                "preference_neutral",
                &["think about", "consider"],
                RelationType::Preference,
            ),
            VerbRule::new(
                "residence",
                &["live", "stay", "reside", "dwell", "inhabit"],
                RelationType::Residence,
            ),
            VerbRule::new("work", &["work", "based"], RelationType::Location),
            VerbRule::new(
                "origin",
                &["from", "born in", "native to", "grew up in"],
                RelationType::Origin,
            ),
            VerbRule::new(
                "temporary",
                &["visiting", "staying", "traveling to"],
                RelationType::Location,
            ),
            VerbRule::new(
                "employment",
                &["work", "employed", "job", "position", "role", "works at"],
                RelationType::Employment,
            ),
            VerbRule::new(
                "education",
                &[
                    "study", "studies", "student", "graduated", "degree", "attended", "enrolled",
                ],
                RelationType::Education,
            ),
            VerbRule::new(
                "possession",
                &["have", "has", "had", "own", "owns", "owned", "possess", "possesses"],
                RelationType::Possession,
            ),
        ];

        Self {
            rules,
            copulas: ["is", "are", "was", "were", "be", "been", "being", "am"]
                .into_iter()
                .collect(),
            family: FAMILY_SUBTYPES.to_vec(),
            romantic: ROMANTIC_SUBTYPES.to_vec(),
        }
    }

    /// First verb rule matching any form of `predicate`
    pub fn matching_rule(&self, predicate: &str) -> Option<&VerbRule> {
        let forms = predicate_forms(&predicate.trim().to_lowercase());
        self.rules
            .iter()
            .find(|rule| forms.iter().any(|f| rule.verbs.contains(f.as_str())))
    }

    pub fn is_copula(&self, word: &str) -> bool {
        self.copulas.contains(word.trim().to_lowercase().as_str())
    }

    /// Assign a relation type to a predicate and optional object
    pub fn classify(&self, predicate: &str, object: Option<&str>) -> RelationType {
        if let Some(rule) = self.matching_rule(predicate) {
            return rule.relation_type;
        }

        let predicate = predicate.trim().to_lowercase();

        // Copula step: the complement decides between family, romantic, attribute
        let Some(object) = object.filter(|o| !o.trim().is_empty()) else {
            return RelationType::Other;
        };
        let complement = match predicate.strip_prefix(RELATIONAL_PREFIX) {
            Some(complement) if !complement.is_empty() => complement,
            _ if self.is_copula(&predicate) => object,
            _ => return RelationType::Other,
        };

        if self.family.iter().any(|s| s.matches(complement)) {
            RelationType::Family
        } else if self.romantic.iter().any(|s| s.matches(complement)) {
            RelationType::Romantic
        } else {
            RelationType::Attribute
        }
    }

    /// First subtype of `relation_type` whose trigger set contains `text`
    pub fn subtype(&self, text: &str, relation_type: RelationType) -> Option<&RelationSubtype> {
        let table = match relation_type {
            RelationType::Family => &self.family,
            RelationType::Romantic => &self.romantic,
            _ => return None,
        };
        table.iter().find(|s| s.matches(text))
    }

    /// Type, subtype and symmetry for a candidate
    pub fn classify_full(&self, predicate: &str, object: Option<&str>) -> Classification {
        let relation_type = self.classify(predicate, object);

        let trigger = relational_complement(predicate).or(object);
        let subtype = trigger.and_then(|text| self.subtype(text, relation_type));

        Classification {
            relation_type,
            subtype: subtype.map(|s| s.name),
            is_symmetric: subtype.is_some_and(|s| s.is_symmetric),
        }
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::standard()
    }
}

/// Complement of a `has_<complement>` predicate
fn relational_complement(predicate: &str) -> Option<&str> {
    predicate
        .trim()
        .strip_prefix(RELATIONAL_PREFIX)
        .filter(|c| !c.is_empty())
}

/// Forms of a lowercased predicate matched against the verb rules.
///
/// `live_in` yields `live_in`, `live in`, `live` and `in`.
fn predicate_forms(predicate: &str) -> Vec<String> {
    let mut forms = vec![predicate.to_string()];

    if let Some((stem, prep)) = predicate.rsplit_once('_') {
        if !stem.is_empty() && PREDICATE_PREPOSITIONS.contains(&prep) {
            forms.push(format!("{stem} {prep}"));
            forms.push(stem.to_string());
            forms.push(prep.to_string());
        }
    }

    forms
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_type_round_trip() {
        for t in RelationType::ALL {
            assert_eq!(t.as_str().parse::<RelationType>().unwrap(), t);
        }
        assert_eq!("FAMILY".parse::<RelationType>().unwrap(), RelationType::Family);
        assert!("friendship".parse::<RelationType>().is_err());
    }

    #[test]
    fn test_relation_type_serializes_lowercase() {
        let json = serde_json::to_string(&RelationType::Preference).unwrap();
        assert_eq!(json, "\"preference\"");
    }

    #[test]
    fn test_preference_verbs() {
        let lexicon = Lexicon::standard();
        assert_eq!(lexicon.classify("love", Some("pizza")), RelationType::Preference);
        assert_eq!(lexicon.classify("Hate", None), RelationType::Preference);
        assert_eq!(lexicon.classify("can't stand", None), RelationType::Preference);
    }

    #[test]
    fn test_location_families() {
        let lexicon = Lexicon::standard();
        assert_eq!(lexicon.classify("live_in", Some("Austin")), RelationType::Residence);
        assert_eq!(lexicon.classify("be_from", Some("Texas")), RelationType::Origin);
        assert_eq!(lexicon.classify("born in", None), RelationType::Origin);
        assert_eq!(lexicon.classify("visiting", None), RelationType::Location);
    }

    #[test]
    fn test_work_is_location_before_employment() {
        let lexicon = Lexicon::standard();
        assert_eq!(lexicon.classify("work", None), RelationType::Location);
        assert_eq!(lexicon.classify("work_at", Some("Google")), RelationType::Location);
        assert_eq!(lexicon.classify("employed", None), RelationType::Employment);

        assert_eq!(lexicon.matching_rule("work_at").map(|r| r.name), Some("work"));
        assert_eq!(
            lexicon.matching_rule("Employed").map(|r| r.name),
            Some("employment")
        );
        assert!(lexicon.matching_rule("meet").is_none());
    }

    #[test]
    fn test_education_and_possession() {
        let lexicon = Lexicon::standard();
        assert_eq!(lexicon.classify("study_at", Some("MIT")), RelationType::Education);
        assert_eq!(lexicon.classify("owns", Some("car")), RelationType::Possession);
        assert_eq!(lexicon.classify("have", Some("dog")), RelationType::Possession);
    }

    #[test]
    fn test_copula_cascade() {
        let lexicon = Lexicon::standard();
        assert_eq!(lexicon.classify("is", Some("brother")), RelationType::Family);
        assert_eq!(lexicon.classify("was", Some("married")), RelationType::Romantic);
        assert_eq!(lexicon.classify("is", Some("tall")), RelationType::Attribute);
        // Copula without object falls through
        assert_eq!(lexicon.classify("is", None), RelationType::Other);

        assert!(lexicon.is_copula(" Am "));
        assert!(!lexicon.is_copula("seem"));
    }

    #[test]
    fn test_relational_copula_uses_complement() {
        let lexicon = Lexicon::standard();
        assert_eq!(lexicon.classify("has_brother", Some("Mike")), RelationType::Family);
        assert_eq!(
            lexicon.classify("has_girlfriend", Some("Lisa")),
            RelationType::Romantic
        );
        assert_eq!(lexicon.classify("has_friend", Some("Tom")), RelationType::Attribute);
    }

    #[test]
    fn test_unknown_verb_is_other() {
        let lexicon = Lexicon::standard();
        assert_eq!(lexicon.classify("meet", Some("Sarah")), RelationType::Other);
        assert_eq!(lexicon.classify("be_in", Some("Paris")), RelationType::Other);
    }

    #[test]
    fn test_subtype_lookup() {
        let lexicon = Lexicon::standard();
        let sibling = lexicon.subtype(" Brother ", RelationType::Family).unwrap();
        assert_eq!(sibling.name, "sibling");
        assert!(sibling.is_symmetric);

        let parent = lexicon.subtype("dad", RelationType::Family).unwrap();
        assert_eq!(parent.inverse, Some("child"));
        assert!(!parent.is_symmetric);

        assert!(lexicon.subtype("brother", RelationType::Attribute).is_none());
        assert!(lexicon.subtype("friend", RelationType::Family).is_none());
    }

    #[test]
    fn test_classify_full_relational() {
        let lexicon = Lexicon::standard();
        let c = lexicon.classify_full("has_brother", Some("Mike"));
        assert_eq!(c.relation_type, RelationType::Family);
        assert_eq!(c.subtype, Some("sibling"));
        assert!(c.is_symmetric);

        let c = lexicon.classify_full("is", Some("wife"));
        assert_eq!(c.subtype, Some("spouse"));

        let c = lexicon.classify_full("is", Some("uncle"));
        assert_eq!(c.subtype, Some("extended"));
        assert!(!c.is_symmetric);

        let c = lexicon.classify_full("love", Some("pizza"));
        assert_eq!(c.subtype, None);
        assert!(!c.is_symmetric);
    }

    #[test]
    fn test_predicate_forms() {
        assert_eq!(
            predicate_forms("live_in"),
            vec!["live_in", "live in", "live", "in"]
        );
        assert_eq!(predicate_forms("has_brother"), vec!["has_brother"]);
        assert_eq!(predicate_forms("love"), vec!["love"]);
    }
}
