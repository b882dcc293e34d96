//! relex Core - Parse-tree model, provider trait, and shared types
//!
//! This crate defines the core abstractions used throughout relex:
//! - Dependency-parse data model (tokens, sentences, documents)
//! - The `ParseProvider` trait the extraction engine consumes
//! - Common error types
//! - Configuration management

pub mod config;
pub mod tree;

pub use config::{AppConfig, ConfigError, ExtractionConfig, LoggingConfig, ParserConfig};
pub use tree::{DepLabel, Document, Sentence, Token};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for relex operations
#[derive(Error, Debug)]
pub enum RelexError {
    /// The parse provider cannot be used at all (missing binary, model, ...)
    #[error("Parse provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The parse provider ran but produced unusable output
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A token references a head or child outside its sentence
    #[error("Malformed parse tree: {0}")]
    MalformedTree(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RelexError>;

// ============================================================================
// Traits
// ============================================================================

/// Source of dependency parses.
///
/// The extraction engine never tokenizes or parses text itself; it asks a
/// provider for a [`Document`] and works on the tree. Implementations must
/// expose at least the dependency labels enumerated by [`DepLabel`].
pub trait ParseProvider: Send + Sync {
    /// Parse raw text into sentences of tokens
    fn parse(&self, text: &str) -> Result<Document>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Check that the provider can serve requests.
    ///
    /// Called once when an engine is constructed so that a missing parser
    /// fails fast instead of yielding empty extractions later.
    fn ensure_available(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
