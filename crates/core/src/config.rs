//! Runtime configuration for the model runner.

use std::path::{Path, PathBuf};

use eyre::WrapErr;
use serde::Deserialize;
use tracing::debug;

use crate::error::XaiError;
use crate::vocab::VocabOptions;

pub const DEFAULT_MIN_LENGTH: usize = 5;
pub const DEFAULT_UNK_TOKEN: &str = "<unk>";
pub const DEFAULT_PAD_TOKEN: &str = "<pad>";

/// Element type of the model's token-index input tensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Int64,
    Int32,
    Float32,
}

impl InputType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Int64 => "int64",
            Self::Int32 => "int32",
            Self::Float32 => "float32",
        }
    }
}

/// Model files fetched from a Hugging Face Hub repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HubSource {
    /// Repo ID, e.g. `"org/movie-review-cnn"`.
    pub repo: String,
    pub revision: Option<String>,
    #[serde(default = "default_model_file")]
    pub model_file: String,
    #[serde(default = "default_vocab_file")]
    pub vocab_file: String,
    /// `tokenizer.json` in the repo; the word tokenizer is used when absent.
    pub tokenizer_file: Option<String>,
}

fn default_model_file() -> String {
    "model.onnx".to_string()
}

fn default_vocab_file() -> String {
    "vocab.txt".to_string()
}

/// Runner configuration, read from TOML and overridden by CLI flags.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub model_path: Option<PathBuf>,
    pub vocab_path: Option<PathBuf>,
    /// Hugging Face `tokenizer.json`. Word tokenization when unset.
    pub tokenizer_path: Option<PathBuf>,
    pub hub: Option<HubSource>,
    pub hf_token: Option<String>,
    /// Minimum sequence length fed to the model (the widest conv filter).
    pub min_length: usize,
    pub lowercase: bool,
    pub unk_token: String,
    pub pad_token: String,
    pub input_type: InputType,
    /// Named model input; the first input is used when unset.
    pub input_name: Option<String>,
    /// Class names, in model output order.
    pub labels: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: None,
            vocab_path: None,
            tokenizer_path: None,
            hub: None,
            hf_token: None,
            min_length: DEFAULT_MIN_LENGTH,
            lowercase: false,
            unk_token: DEFAULT_UNK_TOKEN.to_string(),
            pad_token: DEFAULT_PAD_TOKEN.to_string(),
            input_type: InputType::default(),
            input_name: None,
            labels: vec!["negative".to_string(), "positive".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location if it exists.
    ///
    /// An explicit path must exist. A missing default file yields `Config::default()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid config TOML.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        let config = Self::from_toml(&content)
            .wrap_err_with(|| format!("failed to parse {}", path.display()))?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if `content` is not valid config TOML.
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Check the invariants the runner relies on.
    ///
    /// # Errors
    ///
    /// Returns `XaiError::InvalidConfig` or `XaiError::ReservedTokenCollision`.
    pub fn validate(&self) -> crate::Result<()> {
        if self.min_length == 0 {
            return Err(XaiError::InvalidConfig("min_length must be at least 1".into()).into());
        }
        if self.unk_token == self.pad_token {
            return Err(XaiError::ReservedTokenCollision(self.unk_token.clone()).into());
        }
        if self.vocab_path.is_none() && self.hub.is_none() {
            return Err(
                XaiError::InvalidConfig("either vocab_path or [hub] must be set".into()).into(),
            );
        }
        if self.labels.len() < 2 {
            return Err(XaiError::InvalidConfig("at least two labels are required".into()).into());
        }
        Ok(())
    }

    /// [`Config::validate`], plus a model source.
    ///
    /// # Errors
    ///
    /// Returns `XaiError::InvalidConfig` if neither `model_path` nor `[hub]` is set.
    pub fn validate_for_scoring(&self) -> crate::Result<()> {
        self.validate()?;
        if self.model_path.is_none() && self.hub.is_none() {
            return Err(
                XaiError::InvalidConfig("either model_path or [hub] must be set".into()).into(),
            );
        }
        Ok(())
    }

    #[must_use]
    pub fn vocab_options(&self) -> VocabOptions {
        VocabOptions {
            unk_token: self.unk_token.clone(),
            pad_token: self.pad_token.clone(),
        }
    }
}

/// `~/.config/xaitext/config.toml`
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".config").join("xaitext").join("config.toml"))
}
