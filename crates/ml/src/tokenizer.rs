use std::path::Path;

use tokenizers::Tokenizer;
use tracing::debug;
use xaitext_core::{Result, TextTokenizer, Token};

/// A Hugging Face `tokenizer.json` used as the sentence splitter.
///
/// Special tokens are not added; the vocabulary and padding rules of the
/// runner apply to the produced tokens as for the word tokenizer.
pub struct HfTokenizer {
    inner: Tokenizer,
}

impl HfTokenizer {
    /// # Errors
    ///
    /// Returns an error if the tokenizer file cannot be loaded.
    pub fn from_file(path: &Path) -> Result<Self> {
        let inner = Tokenizer::from_file(path)
            .map_err(|e| eyre::eyre!("failed to load tokenizer {}: {e}", path.display()))?;
        debug!(path = %path.display(), "tokenizer loaded");
        Ok(Self { inner })
    }
}

impl TextTokenizer for HfTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>> {
        let encoding = self
            .inner
            .encode_char_offsets(text, false)
            .map_err(|e| eyre::eyre!(e))?;

        Ok(encoding
            .get_tokens()
            .iter()
            .zip(encoding.get_offsets())
            .map(|(token, &(start, _))| Token::new(token.as_str(), start))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Word-level tokenizer whose post-processor would add `[CLS]`/`[SEP]`.
    const TOKENIZER_JSON: &str = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": {
            "type": "BertProcessing",
            "sep": ["[SEP]", 5],
            "cls": ["[CLS]", 4]
        },
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": { "[UNK]": 0, "café": 1, "au": 2, "lait": 3, "[CLS]": 4, "[SEP]": 5 },
            "unk_token": "[UNK]"
        }
    }"#;

    fn tokenizer() -> HfTokenizer {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokenizer.json");
        std::fs::write(&path, TOKENIZER_JSON).unwrap();
        HfTokenizer::from_file(&path).unwrap()
    }

    #[test]
    fn tokens_with_char_offsets() {
        let tokens = tokenizer().tokenize("café au lait").unwrap();
        assert_eq!(
            tokens,
            [Token::new("café", 0), Token::new("au", 5), Token::new("lait", 8)]
        );
    }

    #[test]
    fn special_tokens_not_added() {
        let tokens = tokenizer().tokenize("au lait").unwrap();
        assert!(tokens.iter().all(|t| t.text != "[CLS]" && t.text != "[SEP]"));
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn unknown_word_maps_to_unk() {
        let tokens = tokenizer().tokenize("au chocolat").unwrap();
        assert_eq!(tokens[1], Token::new("[UNK]", 3));
    }

    #[test]
    fn empty_text() {
        assert!(tokenizer().tokenize("").unwrap().is_empty());
    }

    #[test]
    fn missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = HfTokenizer::from_file(&dir.path().join("tokenizer.json"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("failed to load tokenizer"));
    }
}
