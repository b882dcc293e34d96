//! Confidence scoring and deduplication

use std::collections::HashMap;

use crate::{PatternKind, Relation, RelationType};

const BASE_CONFIDENCE: f32 = 0.7;
const STRONG_PATTERN_BOOST: f32 = 0.2;
const PATTERN_BOOST: f32 = 0.1;
const CLASSIFIED_BOOST: f32 = 0.1;
const MISSING_OBJECT_PENALTY: f32 = 0.1;

/// Confidence in [0, 1] from pattern identity and completeness
pub fn score(pattern: PatternKind, relation_type: RelationType, has_object: bool) -> f32 {
    let mut confidence = BASE_CONFIDENCE;

    match pattern {
        PatternKind::Possessive | PatternKind::CopulaRelation => confidence += STRONG_PATTERN_BOOST,
        PatternKind::SimpleSvo | PatternKind::ActionLocation => confidence += PATTERN_BOOST,
        _ => {}
    }

    if relation_type != RelationType::Other {
        confidence += CLASSIFIED_BOOST;
    }

    if !has_object {
        confidence -= MISSING_OBJECT_PENALTY;
    }

    confidence.clamp(0.0, 1.0)
}

/// Collapse relations sharing (subject, predicate, object).
///
/// Each key keeps the relation with the strictly highest confidence; the
/// first one seen wins ties. Output follows first-appearance order of keys.
pub fn deduplicate(relations: Vec<Relation>) -> Vec<Relation> {
    let mut index: HashMap<(String, String, Option<String>), usize> = HashMap::new();
    let mut kept: Vec<Relation> = Vec::with_capacity(relations.len());

    for relation in relations {
        match index.get(&relation.key()) {
            Some(&at) => {
                if relation.confidence > kept[at].confidence {
                    kept[at] = relation;
                }
            }
            None => {
                index.insert(relation.key(), kept.len());
                kept.push(relation);
            }
        }
    }

    kept
}

// ============================================================================
// Tests
// ============================================================================
