//! External parser command
//!
//! Runs a dependency parser as a child process: raw text goes to stdin,
//! CoNLL-U comes back on stdout. Any parser can be plugged in this way
//! (a small spaCy or Stanza script, UDPipe, ...).

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use relex_core::{Document, ParseProvider, ParserConfig, RelexError};
use tracing::{debug, warn};

use crate::conllu::parse_conllu;
use crate::{ParserError, Result};

/// Provider that shells out to a CoNLL-U emitting parser
#[derive(Debug, Clone)]
pub struct CommandParseProvider {
    program: String,
    args: Vec<String>,
}

impl CommandParseProvider {
    /// Create a provider for `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Set arguments passed on every invocation
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Build from the `[parser]` config section, if a program is set
    pub fn from_config(config: &ParserConfig) -> Option<Self> {
        config
            .program
            .as_ref()
            .map(|program| Self::new(program.clone()).with_args(config.args.clone()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Locate the executable, searching `PATH` for bare names
    pub fn resolve_program(&self) -> Result<PathBuf> {
        let candidate = Path::new(&self.program);
        if candidate.components().count() > 1 {
            return if candidate.is_file() {
                Ok(candidate.to_path_buf())
            } else {
                Err(ParserError::CommandNotFound(self.program.clone()))
            };
        }

        std::env::var_os("PATH")
            .and_then(|paths| {
                std::env::split_paths(&paths)
                    .map(|dir| dir.join(&self.program))
                    .find(|path| path.is_file())
            })
            .ok_or_else(|| ParserError::CommandNotFound(self.program.clone()))
    }

    /// Run the parser on `text` and read its CoNLL-U output
    fn run(&self, text: &str) -> Result<Document> {
        let executable = self.resolve_program()?;
        debug!(program = %self.program, bytes = text.len(), "Running parser command");

        let mut child = Command::new(&executable)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.failed(e.to_string()))?;

        // Feed stdin from a separate thread so a chatty parser can't block on stdout
        let writer = child.stdin.take().map(|mut stdin| {
            let input = text.to_string();
            std::thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| self.failed(e.to_string()))?;

        if let Some(handle) = writer {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(program = %self.program, error = %e, "Failed writing parser stdin"),
                Err(_) => warn!(program = %self.program, "Parser stdin writer panicked"),
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failed(format!("{}: {}", output.status, stderr.trim())));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| ParserError::EncodingError(e.to_string()))?;
        let sentences = parse_conllu(&stdout)?;

        debug!(program = %self.program, sentences = sentences.len(), "Parser command finished");
        Ok(Document::new(text, sentences))
    }

    fn failed(&self, message: String) -> ParserError {
        ParserError::CommandFailed {
            program: self.program.clone(),
            message,
        }
    }
}

impl ParseProvider for CommandParseProvider {
    fn parse(&self, text: &str) -> relex_core::Result<Document> {
        if text.trim().is_empty() {
            return Ok(Document::default());
        }
        Ok(self.run(text)?)
    }

    fn name(&self) -> &str {
        &self.program
    }

    fn ensure_available(&self) -> relex_core::Result<()> {
        self.resolve_program()
            .map(|_| ())
            .map_err(|e| RelexError::ProviderUnavailable(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let config = ParserConfig {
            program: Some("parse-conllu".to_string()),
            args: vec!["--model".to_string(), "en_core_web_sm".to_string()],
            conllu_path: None,
        };
        let provider = CommandParseProvider::from_config(&config).unwrap();
        assert_eq!(provider.program(), "parse-conllu");
        assert_eq!(provider.args.len(), 2);

        assert!(CommandParseProvider::from_config(&ParserConfig::default()).is_none());
    }

    #[test]
    fn test_missing_program_unavailable() {
        let provider = CommandParseProvider::new("relex-no-such-parser-binary");
        assert!(matches!(
            provider.ensure_available(),
            Err(RelexError::ProviderUnavailable(_))
        ));
        assert!(matches!(
            provider.parse("Hello there."),
            Err(RelexError::ProviderUnavailable(_))
        ));
    }

    #[test]
    fn test_missing_absolute_path() {
        let provider = CommandParseProvider::new("/nonexistent/bin/parser");
        assert!(matches!(
            provider.resolve_program(),
            Err(ParserError::CommandNotFound(_))
        ));
    }

    #[test]
    fn test_blank_text_skips_process() {
        let provider = CommandParseProvider::new("relex-no-such-parser-binary");
        let doc = provider.parse("  \n").unwrap();
        assert!(doc.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_script_emitting_conllu() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-parser");
        std::fs::write(
            &script,
            "#!/bin/sh\ncat > /dev/null\nprintf '# text = Hi\\n1\\tHi\\thi\\tINTJ\\tUH\\t_\\t0\\tROOT\\t_\\t_\\n\\n'\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let provider = CommandParseProvider::new(script.display().to_string());
        assert!(provider.ensure_available().is_ok());

        let doc = provider.parse("Hi").unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.sentences[0].tokens[0].lemma, "hi");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_command_reports_stderr() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("broken-parser");
        std::fs::write(&script, "#!/bin/sh\necho 'model missing' >&2\nexit 3\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let provider = CommandParseProvider::new(script.display().to_string());
        match provider.parse("Hello") {
            Err(RelexError::ParseError(message)) => assert!(message.contains("model missing")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
