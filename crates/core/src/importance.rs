//! Per-token attribution scores handed to the visualization layer.

use serde::{Deserialize, Serialize};

use crate::error::XaiError;
use crate::tokenize::Token;

/// One highlighted token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenImportance {
    pub token: String,
    /// Char offset of the token in the explained text.
    pub offset: usize,
    /// Signed relevance; positive supports the explained class.
    pub score: f32,
}

/// Ordered token importances for one explained sentence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImportanceMap {
    entries: Vec<TokenImportance>,
}

impl ImportanceMap {
    #[must_use]
    pub const fn new(entries: Vec<TokenImportance>) -> Self {
        Self { entries }
    }

    /// Pair tokens with attribution scores.
    ///
    /// # Errors
    ///
    /// Returns `XaiError::ScoreLengthMismatch` if the lengths differ.
    pub fn from_tokens(tokens: &[Token], scores: &[f32]) -> crate::Result<Self> {
        if tokens.len() != scores.len() {
            return Err(XaiError::ScoreLengthMismatch {
                tokens: tokens.len(),
                scores: scores.len(),
            }
            .into());
        }
        let entries = tokens
            .iter()
            .zip(scores)
            .map(|(t, &score)| TokenImportance {
                token: t.text.clone(),
                offset: t.offset,
                score,
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TokenImportance> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `k` entries with the largest absolute score. Ties keep text order.
    #[must_use]
    pub fn top_k(&self, k: usize) -> Vec<&TokenImportance> {
        let mut ranked: Vec<&TokenImportance> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.score.abs().total_cmp(&a.score.abs()));
        ranked.truncate(k);
        ranked
    }

    /// Scale scores into `[-1, 1]` by the largest magnitude.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let max = self
            .entries
            .iter()
            .map(|e| e.score.abs())
            .fold(0.0_f32, f32::max);
        if max == 0.0 {
            return self.clone();
        }
        let entries = self
            .entries
            .iter()
            .map(|e| TokenImportance {
                score: e.score / max,
                ..e.clone()
            })
            .collect();
        Self { entries }
    }

    /// `(token, offset, score)` triples.
    #[must_use]
    pub fn to_triples(&self) -> Vec<(&str, usize, f32)> {
        self.entries
            .iter()
            .map(|e| (e.token.as_str(), e.offset, e.score))
            .collect()
    }
}

impl<'a> IntoIterator for &'a ImportanceMap {
    type Item = &'a TokenImportance;
    type IntoIter = std::slice::Iter<'a, TokenImportance>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
