//! Model file resolution: local paths or `HuggingFace` Hub download.

use std::path::PathBuf;

use eyre::WrapErr;
use hf_hub::api::sync::{ApiBuilder, ApiRepo};
use hf_hub::{Repo, RepoType};
use tracing::{debug, info};
use xaitext_core::{Config, HubSource, Result};

/// Resolves each model file from its local path, or downloads it from the
/// configured Hub repo. Local paths win.
pub struct ModelFiles<'a> {
    config: &'a Config,
    repo: Option<ApiRepo>,
}

impl<'a> ModelFiles<'a> {
    /// # Errors
    ///
    /// Returns an error if the `HuggingFace` API client cannot be built.
    pub fn new(config: &'a Config) -> Result<Self> {
        let repo = config
            .hub
            .as_ref()
            .map(|hub| hf_repo(hub, config.hf_token.as_deref()))
            .transpose()?;
        Ok(Self { config, repo })
    }

    /// # Errors
    ///
    /// Returns an error if the model is neither local nor downloadable.
    pub fn model(&self) -> Result<PathBuf> {
        match &self.config.model_path {
            Some(path) => Ok(path.clone()),
            None => self.fetch(self.hub()?.model_file.as_str()),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the vocabulary is neither local nor downloadable.
    pub fn vocab(&self) -> Result<PathBuf> {
        match &self.config.vocab_path {
            Some(path) => Ok(path.clone()),
            None => self.fetch(self.hub()?.vocab_file.as_str()),
        }
    }

    /// `None` means word tokenization.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured Hub tokenizer cannot be downloaded.
    pub fn tokenizer(&self) -> Result<Option<PathBuf>> {
        if let Some(path) = &self.config.tokenizer_path {
            return Ok(Some(path.clone()));
        }
        match self.config.hub.as_ref().and_then(|h| h.tokenizer_file.as_deref()) {
            Some(file) => self.fetch(file).map(Some),
            None => Ok(None),
        }
    }

    fn hub(&self) -> Result<&'a HubSource> {
        self.config
            .hub
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no local path and no [hub] repo configured"))
    }

    fn fetch(&self, file: &str) -> Result<PathBuf> {
        let repo = self
            .repo
            .as_ref()
            .ok_or_else(|| eyre::eyre!("{file} not configured locally and no [hub] repo set"))?;
        info!(file, "fetching from HuggingFace Hub");
        let path = repo
            .get(file)
            .map_err(|e| eyre::eyre!("download of {file} failed: {e}"))?;
        debug!(path = %path.display(), "Hub file cached");
        Ok(path)
    }
}

fn hf_repo(hub: &HubSource, token: Option<&str>) -> Result<ApiRepo> {
    let mut builder = ApiBuilder::new();
    if let Some(token) = token {
        debug!("using HuggingFace token from config");
        builder = builder.with_token(Some(token.to_string()));
    } else {
        debug!("no HuggingFace token configured");
    }
    let api = builder
        .build()
        .wrap_err("failed to build HuggingFace API client")?;

    let repo = match &hub.revision {
        Some(rev) => Repo::with_revision(hub.repo.clone(), RepoType::Model, rev.clone()),
        None => Repo::model(hub.repo.clone()),
    };
    debug!(repo = %hub.repo, "HuggingFace repo handle created");
    Ok(api.repo(repo))
}
