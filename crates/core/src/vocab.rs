//! Token-to-index vocabulary with reserved unknown and padding entries.

use std::collections::HashMap;
use std::path::Path;

use eyre::WrapErr;
use tracing::{debug, instrument};

use crate::config::{DEFAULT_PAD_TOKEN, DEFAULT_UNK_TOKEN};
use crate::error::XaiError;

/// Names of the reserved vocabulary entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabOptions {
    pub unk_token: String,
    pub pad_token: String,
}

impl Default for VocabOptions {
    fn default() -> Self {
        Self {
            unk_token: DEFAULT_UNK_TOKEN.to_string(),
            pad_token: DEFAULT_PAD_TOKEN.to_string(),
        }
    }
}

/// Immutable mapping from token text to model input index.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    index: HashMap<String, u32>,
    tokens: Vec<String>,
    unk_index: u32,
    pad_index: u32,
}

impl Vocabulary {
    /// Load a vocabulary from a word-vector or plain token-list file.
    ///
    /// The first whitespace-separated field of each non-empty line is the
    /// token; any remaining fields (the vector) are ignored. A word2vec
    /// `count dim` header line is skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or holds no tokens.
    #[instrument(skip(options), fields(path = %path.display()))]
    pub fn load(path: &Path, options: &VocabOptions) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read vocabulary {}", path.display()))?;
        let vocab = Self::parse(&content, options)?;
        debug!(len = vocab.len(), "vocabulary loaded");
        Ok(vocab)
    }

    /// Parse vocabulary file contents. See [`Vocabulary::load`].
    ///
    /// # Errors
    ///
    /// Returns `XaiError::EmptyVocabulary` if no token lines are present.
    pub fn parse(content: &str, options: &VocabOptions) -> crate::Result<Self> {
        let mut lines = content.lines().filter(|l| !l.trim().is_empty()).peekable();
        if lines.peek().is_some_and(|l| is_word2vec_header(l)) {
            lines.next();
        }
        let tokens: Vec<&str> = lines.filter_map(|l| l.split_whitespace().next()).collect();
        if tokens.is_empty() {
            return Err(XaiError::EmptyVocabulary.into());
        }
        Self::from_tokens(tokens, options)
    }

    /// Build a vocabulary from tokens in index order.
    ///
    /// Reserved tokens missing from `tokens` are prepended (unknown at 0,
    /// padding next). Duplicates keep their first index.
    ///
    /// # Errors
    ///
    /// Returns an error if the reserved token names collide.
    pub fn from_tokens<I, S>(tokens: I, options: &VocabOptions) -> crate::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if options.unk_token == options.pad_token {
            return Err(XaiError::ReservedTokenCollision(options.unk_token.clone()).into());
        }

        let file_tokens: Vec<String> = tokens.into_iter().map(|t| t.as_ref().to_string()).collect();
        let mut ordered = Vec::with_capacity(file_tokens.len() + 2);
        for reserved in [&options.unk_token, &options.pad_token] {
            if !file_tokens.contains(reserved) {
                ordered.push(reserved.clone());
            }
        }
        ordered.extend(file_tokens);

        let mut index = HashMap::with_capacity(ordered.len());
        let mut kept = Vec::with_capacity(ordered.len());
        let mut duplicates = 0usize;
        for token in ordered {
            if index.contains_key(&token) {
                duplicates += 1;
                continue;
            }
            let id = u32::try_from(kept.len()).wrap_err("vocabulary exceeds u32 indices")?;
            index.insert(token.clone(), id);
            kept.push(token);
        }
        if duplicates > 0 {
            debug!(duplicates, "skipped duplicate vocabulary tokens");
        }

        let unk_index = index[&options.unk_token];
        let pad_index = index[&options.pad_token];
        Ok(Self {
            index,
            tokens: kept,
            unk_index,
            pad_index,
        })
    }

    /// Index of `token`, falling back to the unknown-token index.
    #[must_use]
    pub fn index(&self, token: &str) -> u32 {
        self.get(token).unwrap_or(self.unk_index)
    }

    #[must_use]
    pub fn get(&self, token: &str) -> Option<u32> {
        self.index.get(token).copied()
    }

    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    #[must_use]
    pub fn token(&self, index: u32) -> Option<&str> {
        self.tokens.get(index as usize).map(String::as_str)
    }

    #[must_use]
    pub const fn unk_index(&self) -> u32 {
        self.unk_index
    }

    #[must_use]
    pub const fn pad_index(&self) -> u32 {
        self.pad_index
    }

    #[must_use]
    pub fn pad_token(&self) -> &str {
        &self.tokens[self.pad_index as usize]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn is_word2vec_header(line: &str) -> bool {
    let fields: Vec<&str> = line.split_whitespace().collect();
    fields.len() == 2 && fields.iter().all(|f| f.parse::<u64>().is_ok())
}
