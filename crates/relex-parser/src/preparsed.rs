//! Pre-parsed provider
//!
//! Serves parses that were produced ahead of time (CoNLL-U files, test
//! fixtures). A request is answered by tiling the input text with stored
//! sentences, always taking the longest sentence that matches at the
//! current position.

use std::path::Path;

use relex_core::{Document, ParseProvider, RelexError, Sentence};
use tracing::debug;

use crate::conllu::{parse_conllu, read_conllu_file};
use crate::{ParserError, Result};

/// Provider backed by a fixed set of parsed sentences
#[derive(Debug, Clone, Default)]
pub struct PreParsedProvider {
    sentences: Vec<Sentence>,
}

impl PreParsedProvider {
    /// Create from already-built sentences
    pub fn from_sentences(sentences: Vec<Sentence>) -> Self {
        Self { sentences }
    }

    /// Create from CoNLL-U content
    pub fn from_conllu(content: &str) -> Result<Self> {
        Ok(Self::from_sentences(parse_conllu(content)?))
    }

    /// Create from a CoNLL-U file
    pub fn from_file(path: &Path) -> Result<Self> {
        let doc = read_conllu_file(path)?;
        debug!(
            path = %path.display(),
            sentences = doc.len(),
            "Loaded pre-parsed sentences"
        );
        Ok(Self::from_sentences(doc.sentences))
    }

    /// Add sentences from more CoNLL-U content
    pub fn extend_conllu(&mut self, content: &str) -> Result<()> {
        self.sentences.extend(parse_conllu(content)?);
        Ok(())
    }

    /// Number of stored sentences
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Cover `text` with stored sentences, renumbering them in order
    fn tile(&self, text: &str) -> Result<Document> {
        let mut rest = text.trim_start();
        let mut sentences = Vec::new();

        while !rest.is_empty() {
            let found = self
                .sentences
                .iter()
                .filter(|s| !s.text.is_empty() && rest.starts_with(s.text.as_str()))
                .max_by_key(|s| s.text.len());

            let Some(sentence) = found else {
                return Err(ParserError::NoParse(truncate(rest, 60)));
            };

            sentences.push(sentence.clone().with_index(sentences.len()));
            rest = rest[sentence.text.len()..].trim_start();
        }

        Ok(Document::new(text, sentences))
    }
}

impl ParseProvider for PreParsedProvider {
    fn parse(&self, text: &str) -> relex_core::Result<Document> {
        Ok(self.tile(text)?)
    }

    fn name(&self) -> &str {
        "pre-parsed"
    }

    fn ensure_available(&self) -> relex_core::Result<()> {
        if self.sentences.is_empty() {
            return Err(RelexError::ProviderUnavailable(
                "pre-parsed provider holds no sentences".to_string(),
            ));
        }
        Ok(())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{head}...")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FIXTURES: &str = "\
# text = John met Sarah.
1\tJohn\tJohn\tPROPN\tNNP\t_\t2\tnsubj\t_\t_
2\tmet\tmeet\tVERB\tVBD\t_\t0\tROOT\t_\t_
3\tSarah\tSarah\tPROPN\tNNP\t_\t2\tdobj\t_\tSpaceAfter=No
4\t.\t.\tPUNCT\t.\t_\t2\tpunct\t_\t_

# text = John met
1\tJohn\tJohn\tPROPN\tNNP\t_\t2\tnsubj\t_\t_
2\tmet\tmeet\tVERB\tVBD\t_\t0\tROOT\t_\t_

# text = She smiled.
1\tShe\tshe\tPRON\tPRP\t_\t2\tnsubj\t_\t_
2\tsmiled\tsmile\tVERB\tVBD\t_\t0\tROOT\t_\tSpaceAfter=No
3\t.\t.\tPUNCT\t.\t_\t2\tpunct\t_\t_
";

    #[test]
    fn test_single_sentence_lookup() {
        let provider = PreParsedProvider::from_conllu(FIXTURES).unwrap();
        let doc = provider.parse("She smiled.").unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.sentences[0].index, 0);
        assert_eq!(doc.sentences[0].tokens[1].lemma, "smile");
    }

    #[test]
    fn test_longest_match_tiling() {
        let provider = PreParsedProvider::from_conllu(FIXTURES).unwrap();
        let doc = provider.parse("John met Sarah.  She smiled.").unwrap();

        let texts: Vec<&str> = doc.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["John met Sarah.", "She smiled."]);
        assert_eq!(doc.sentences[1].index, 1);
        assert!(doc.sentences[1].iter().all(|t| t.sentence_index == 1));
        assert_eq!(doc.text, "John met Sarah.  She smiled.");
    }

    #[test]
    fn test_unknown_text_is_parse_error() {
        let provider = PreParsedProvider::from_conllu(FIXTURES).unwrap();
        let err = provider.parse("Nobody knows.").unwrap_err();
        assert!(matches!(err, RelexError::ParseError(_)));
    }

    #[test]
    fn test_empty_text_gives_empty_document() {
        let provider = PreParsedProvider::from_conllu(FIXTURES).unwrap();
        let doc = provider.parse("   ").unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_empty_provider_unavailable() {
        let provider = PreParsedProvider::default();
        assert!(matches!(
            provider.ensure_available(),
            Err(RelexError::ProviderUnavailable(_))
        ));
    }

    #[test]
    fn test_from_file_and_extend() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{FIXTURES}").unwrap();

        let mut provider = PreParsedProvider::from_file(file.path()).unwrap();
        assert_eq!(provider.len(), 3);
        assert!(provider.ensure_available().is_ok());

        provider
            .extend_conllu("# text = Hi\n1\tHi\thi\tINTJ\tUH\t_\t0\tROOT\t_\t_\n")
            .unwrap();
        assert_eq!(provider.len(), 4);
        assert_eq!(provider.parse("Hi").unwrap().len(), 1);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefgh", 3), "abc...");
    }
}
