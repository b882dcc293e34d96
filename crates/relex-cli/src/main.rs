//! relex CLI - Command-line interface
//!
//! Usage:
//!   relex extract [TEXT]... [--multi] [--speaker NAME]
//!   relex conversation <file> [--name ID=NAME]...
//!   relex resolve [TEXT]...
//!   relex patterns

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use regex::Regex;
use relex_core::{AppConfig, LoggingConfig, ParseProvider};
use relex_extractor::{ExtractionContext, Message, PatternLibrary, Relation, RelationEngine};
use relex_parser::{CommandParseProvider, PreParsedProvider};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "relex")]
#[command(about = "Relation extraction and pronoun resolution over dependency parses")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML); environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Serve parses from a pre-parsed CoNLL-U file
    #[arg(long, global = true)]
    conllu: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract relations from text (reads stdin when no text is given)
    Extract {
        text: Vec<String>,

        /// Resolve pronouns across sentences
        #[arg(long)]
        multi: bool,

        /// Identifier substituted for first-person possessives
        #[arg(long)]
        speaker: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
    /// Extract relations from a `speaker: text` transcript
    Conversation {
        file: PathBuf,

        /// Display name for a speaker id (`u1=Alice`)
        #[arg(long = "name", value_parser = parse_name)]
        names: Vec<(String, String)>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
    /// Show what each pronoun resolves to
    Resolve {
        text: Vec<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
    /// List the active extraction patterns
    Patterns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Extract {
            text,
            multi,
            speaker,
            format,
        } => {
            let engine = build_engine(&config, cli.conllu)?;
            let text = read_input(text)?;
            let ctx = speaker.map_or_else(ExtractionContext::new, ExtractionContext::with_speaker);

            let relations = if multi {
                engine.extract_multi(&text, &ctx)?
            } else {
                engine.extract(&text, &ctx)?
            };
            print_relations(&relations, format)?;
        }
        Commands::Conversation {
            file,
            names,
            format,
        } => {
            let engine = build_engine(&config, cli.conllu)?;
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let messages = TranscriptParser::new()?.parse(&content);
            info!(messages = messages.len(), "Loaded transcript");

            let names: HashMap<String, String> = names.into_iter().collect();
            let relations = engine.extract_conversation(&messages, &names)?;
            print_relations(&relations, format)?;
        }
        Commands::Resolve { text, format } => {
            let engine = build_engine(&config, cli.conllu)?;
            let text = read_input(text)?;
            let resolved = engine.resolve_pronouns(&text)?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resolved)?),
                OutputFormat::Pretty if resolved.is_empty() => println!("No pronouns resolved"),
                OutputFormat::Pretty => {
                    for (pronoun, name) in &resolved {
                        println!("{pronoun} -> {name}");
                    }
                }
            }
        }
        Commands::Patterns => {
            let library = PatternLibrary::standard().without(&config.extraction.disabled_patterns);
            for pattern in library.iter() {
                println!("{} (priority {})", pattern.name, pattern.priority);
                println!("   {}", pattern.description);
                if !pattern.examples.is_empty() {
                    println!("   e.g. {}", pattern.examples.join(", "));
                }
            }
        }
    }

    Ok(())
}

// ============================================================================
// Setup
// ============================================================================

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

/// Logs go to stderr so stdout stays machine-readable
fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// A CoNLL-U file wins over an external parser command
fn build_provider(
    config: &AppConfig,
    conllu: Option<PathBuf>,
) -> anyhow::Result<Arc<dyn ParseProvider>> {
    if let Some(path) = conllu.or_else(|| config.parser.conllu_path.clone()) {
        let provider = PreParsedProvider::from_file(&path)
            .with_context(|| format!("Failed to load parses from {}", path.display()))?;
        return Ok(Arc::new(provider));
    }

    if let Some(provider) = CommandParseProvider::from_config(&config.parser) {
        info!(program = provider.program(), "Using parser command");
        return Ok(Arc::new(provider));
    }

    bail!("No parse provider configured: pass --conllu or set RELEX_PARSER_CMD")
}

fn build_engine(config: &AppConfig, conllu: Option<PathBuf>) -> anyhow::Result<RelationEngine> {
    let provider = build_provider(config, conllu)?;
    Ok(RelationEngine::with_config(provider, &config.extraction)?)
}

// ============================================================================
// Input and Output
// ============================================================================

fn read_input(words: Vec<String>) -> anyhow::Result<String> {
    if !words.is_empty() {
        return Ok(words.join(" "));
    }

    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read stdin")?;
    Ok(text)
}

fn print_relations(relations: &[Relation], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(relations)?),
        OutputFormat::Pretty => {
            if relations.is_empty() {
                println!("No relations found");
            }
            for (i, relation) in relations.iter().enumerate() {
                println!("{}. {}", i + 1, relation.to_pretty());
            }
        }
    }
    Ok(())
}

/// `u1=Alice`
fn parse_name(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((id, name)) if !id.trim().is_empty() && !name.trim().is_empty() => {
            Ok((id.trim().to_string(), name.trim().to_string()))
        }
        _ => Err(format!("expected ID=NAME, got `{value}`")),
    }
}

/// Reads `speaker: text` lines into messages
struct TranscriptParser {
    line: Regex,
}

impl TranscriptParser {
    fn new() -> anyhow::Result<Self> {
        Ok(Self {
            line: Regex::new(r"^\s*([^:]+?)\s*:\s*(.+)$")?,
        })
    }

    fn parse(&self, content: &str) -> Vec<Message> {
        let mut messages = Vec::new();

        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match self.line.captures(line) {
                Some(caps) => messages.push(Message::new(&caps[1], caps[2].trim())),
                None => warn!(line = number + 1, "Skipping line without a speaker"),
            }
        }

        messages
    }
}

// ============================================================================
// Tests
// ============================================================================
