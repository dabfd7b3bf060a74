//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use xaitext_core::Config;

fn at_least_one(s: &str) -> Result<usize, String> {
    let val: usize = s.parse().map_err(|e| format!("{e}"))?;
    if val >= 1 {
        Ok(val)
    } else {
        Err("min length must be at least 1".to_string())
    }
}

#[derive(Parser)]
#[command(
    name = "xaitext",
    version,
    about = "Run ONNX text classifiers for attribution methods"
)]
pub struct Cli {
    /// Config file (TOML). Defaults to ~/.config/xaitext/config.toml if present
    #[arg(long, env = "XAITEXT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// ONNX model file
    #[arg(long, global = true)]
    pub model: Option<PathBuf>,

    /// Vocabulary or word-vector file
    #[arg(long, global = true)]
    pub vocab: Option<PathBuf>,

    /// `HuggingFace` tokenizer.json (word tokenization if unset)
    #[arg(long, global = true)]
    pub tokenizer: Option<PathBuf>,

    /// Pad sentences shorter than this many tokens
    #[arg(long, global = true, value_parser = at_least_one)]
    pub min_length: Option<usize>,

    /// Lowercase words before vocabulary lookup
    #[arg(long, global = true)]
    pub lowercase: bool,

    /// `HuggingFace` token for gated Hub repos
    #[arg(long, env = "HF_TOKEN", global = true, hide_env_values = true)]
    pub hf_token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Apply command-line overrides on top of file configuration.
    #[must_use]
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(path) = &self.model {
            config.model_path = Some(path.clone());
        }
        if let Some(path) = &self.vocab {
            config.vocab_path = Some(path.clone());
        }
        if let Some(path) = &self.tokenizer {
            config.tokenizer_path = Some(path.clone());
        }
        if let Some(min_length) = self.min_length {
            config.min_length = min_length;
        }
        if self.lowercase {
            config.lowercase = true;
        }
        if let Some(token) = self.hf_token.as_deref().map(str::trim) {
            if !token.is_empty() {
                config.hf_token = Some(token.to_string());
            }
        }
        config
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Print class probabilities for each sentence (args, or stdin lines)
    Score {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
        texts: Vec<String>,
    },
    /// Print tokens, char offsets and vocabulary indices after padding
    Tokenize {
        /// Emit JSON instead of one line per token
        #[arg(long)]
        json: bool,
        texts: Vec<String>,
    },
    /// Print vocabulary size and reserved indices
    Vocab,
}
