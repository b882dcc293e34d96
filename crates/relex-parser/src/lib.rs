//! relex Parser - Dependency-parse providers
//!
//! Supports:
//! - CoNLL-U documents (the interchange format of spaCy, Stanza, UDPipe)
//! - Pre-parsed fixtures served by sentence text
//! - External parser commands that emit CoNLL-U on stdout
//!
//! Each provider implements `relex_core::ParseProvider` and produces a
//! `Document` the extraction engine can walk.

pub mod command;
pub mod conllu;
pub mod preparsed;

pub use command::CommandParseProvider;
pub use conllu::{parse_conllu, parse_conllu_document, read_conllu_file};
pub use preparsed::PreParsedProvider;

use relex_core::RelexError;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while obtaining a parse
#[derive(Error, Debug)]
pub enum ParserError {
    /// IO error while reading a file
    #[error("IO error reading file: {path}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CoNLL-U input does not follow the format
    #[error("CoNLL-U syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// The external parser could not be located
    #[error("Parser command not found: {0}")]
    CommandNotFound(String),

    /// The external parser ran and failed
    #[error("Parser command '{program}' failed: {message}")]
    CommandFailed { program: String, message: String },

    /// No stored parse covers the requested text
    #[error("No parse available for text: {0}")]
    NoParse(String),

    /// Encoding error
    #[error("Text encoding error: {0}")]
    EncodingError(String),
}

pub type Result<T> = std::result::Result<T, ParserError>;

impl From<ParserError> for RelexError {
    fn from(err: ParserError) -> Self {
        match err {
            ParserError::CommandNotFound(_) => RelexError::ProviderUnavailable(err.to_string()),
            other => RelexError::ParseError(other.to_string()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_command_is_provider_unavailable() {
        let err: RelexError = ParserError::CommandNotFound("spacy-conllu".to_string()).into();
        assert!(matches!(err, RelexError::ProviderUnavailable(_)));
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let err: RelexError = ParserError::Syntax {
            line: 4,
            message: "expected at least 8 columns".to_string(),
        }
        .into();
        match err {
            RelexError::ParseError(message) => assert!(message.contains("line 4")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
