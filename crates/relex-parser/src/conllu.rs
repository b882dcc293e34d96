//! CoNLL-U reader
//!
//! Reads the ten-column CoNLL-U format:
//! `ID FORM LEMMA UPOS XPOS FEATS HEAD DEPREL DEPS MISC`.
//! Blank lines end sentences, `#` lines are comments (`# text = ...` is
//! kept as the sentence text). Multi-word token ranges and empty nodes are
//! skipped; columns may be tab- or space-separated.

use std::path::Path;

use relex_core::{DepLabel, Document, Sentence, Token};

use crate::{ParserError, Result};

/// Minimum columns needed to build a tree (ID through DEPREL)
const MIN_COLUMNS: usize = 8;

/// MISC keys that carry a named-entity annotation
const ENTITY_KEYS: [&str; 3] = ["ner", "entity", "ent_type"];

/// One token line before the sentence is assembled
struct Row {
    form: String,
    lemma: String,
    upos: String,
    xpos: String,
    head: usize,
    deprel: String,
    entity_type: Option<String>,
    space_after: bool,
}

/// Sentence under construction
#[derive(Default)]
struct PendingSentence {
    text: Option<String>,
    rows: Vec<Row>,
}

impl PendingSentence {
    fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn finish(self, index: usize, line: usize) -> Result<Sentence> {
        let text = self.text.unwrap_or_else(|| rebuild_text(&self.rows));
        let tokens = self
            .rows
            .into_iter()
            .enumerate()
            .map(|(position, row)| {
                let head = if row.head == 0 {
                    None
                } else {
                    Some(row.head - 1)
                };
                let mut token = Token::new(
                    position,
                    row.form,
                    row.lemma,
                    row.upos,
                    row.xpos,
                    DepLabel::from_label(&row.deprel),
                    head,
                );
                token.entity_type = row.entity_type;
                token
            })
            .collect();

        Sentence::new(index, text, tokens).map_err(|e| ParserError::Syntax {
            line,
            message: e.to_string(),
        })
    }
}

/// Parse CoNLL-U content into sentences
pub fn parse_conllu(content: &str) -> Result<Vec<Sentence>> {
    let mut sentences = Vec::new();
    let mut pending = PendingSentence::default();
    let mut last_line = 0;

    for (line_idx, raw) in content.lines().enumerate() {
        let line_no = line_idx + 1;
        last_line = line_no;
        let line = raw.trim();

        // Empty line = sentence boundary
        if line.is_empty() {
            if !pending.is_empty() {
                let sentence = std::mem::take(&mut pending).finish(sentences.len(), line_no)?;
                sentences.push(sentence);
            }
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            if let Some(text) = comment.trim().strip_prefix("text") {
                if let Some(value) = text.trim_start().strip_prefix('=') {
                    pending.text = Some(value.trim().to_string());
                }
            }
            continue;
        }

        let columns: Vec<&str> = if line.contains('\t') {
            line.split('\t').map(str::trim).collect()
        } else {
            line.split_whitespace().collect()
        };

        if columns.len() < MIN_COLUMNS {
            return Err(ParserError::Syntax {
                line: line_no,
                message: format!(
                    "expected at least {MIN_COLUMNS} columns, found {}",
                    columns.len()
                ),
            });
        }

        // Multi-word token ranges (1-2) and empty nodes (1.1) carry no tree
        let id = columns[0];
        if id.contains('-') || id.contains('.') {
            continue;
        }

        let id: usize = id.parse().map_err(|_| ParserError::Syntax {
            line: line_no,
            message: format!("invalid token id '{id}'"),
        })?;
        if id != pending.rows.len() + 1 {
            return Err(ParserError::Syntax {
                line: line_no,
                message: format!("expected token id {}, found {id}", pending.rows.len() + 1),
            });
        }

        let head: usize = columns[6].parse().map_err(|_| ParserError::Syntax {
            line: line_no,
            message: format!("invalid head '{}'", columns[6]),
        })?;

        let form = columns[1].to_string();
        let lemma = match columns[2] {
            "_" => form.to_lowercase(),
            lemma => lemma.to_string(),
        };
        let upos = match columns[3] {
            "_" => "X".to_string(),
            upos => upos.to_string(),
        };
        let xpos = match columns[4] {
            "_" => String::new(),
            xpos => xpos.to_string(),
        };
        let misc = columns.get(9).copied().unwrap_or("_");
        let (entity_type, space_after) = parse_misc(misc);

        pending.rows.push(Row {
            form,
            lemma,
            upos,
            xpos,
            head,
            deprel: columns[7].to_string(),
            entity_type,
            space_after,
        });
    }

    // Don't forget the last sentence
    if !pending.is_empty() {
        sentences.push(pending.finish(sentences.len(), last_line)?);
    }

    Ok(sentences)
}

/// Parse CoNLL-U content into a document
pub fn parse_conllu_document(content: &str) -> Result<Document> {
    Ok(Document::from_sentences(parse_conllu(content)?))
}

/// Read a CoNLL-U file into a document
pub fn read_conllu_file(path: &Path) -> Result<Document> {
    let content = std::fs::read_to_string(path).map_err(|e| ParserError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_conllu_document(&content)
}

/// Read the entity annotation and `SpaceAfter` flag from the MISC column
fn parse_misc(misc: &str) -> (Option<String>, bool) {
    let mut entity_type = None;
    let mut space_after = true;

    if misc == "_" {
        return (entity_type, space_after);
    }

    for item in misc.split('|') {
        let Some((key, value)) = item.split_once('=') else {
            continue;
        };
        let key = key.trim().to_lowercase();

        if key == "spaceafter" {
            space_after = value.trim() != "No";
        } else if ENTITY_KEYS.contains(&key.as_str()) {
            entity_type = normalize_entity(value);
        }
    }

    (entity_type, space_after)
}

/// Strip BIO/BILOU prefixes; `O` means no entity
fn normalize_entity(value: &str) -> Option<String> {
    let value = value.trim();
    let label = match value.split_once('-') {
        Some((prefix, rest)) if matches!(prefix, "B" | "I" | "E" | "S" | "L" | "U") => rest,
        _ => value,
    };

    if label.is_empty() || label == "O" || label == "_" {
        None
    } else {
        Some(label.to_string())
    }
}

/// Rebuild sentence text from forms when no `# text` comment is present
fn rebuild_text(rows: &[Row]) -> String {
    let mut text = String::new();
    for row in rows {
        text.push_str(&row.form);
        if row.space_after {
            text.push(' ');
        }
    }
    text.trim_end().to_string()
}

// ============================================================================
// Tests
// ============================================================================
