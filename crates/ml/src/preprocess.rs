//! Text to padded vocabulary indices.

use tracing::instrument;
use xaitext_core::tokenize::pad_to;
use xaitext_core::{Config, Result, TextTokenizer, Token, Vocabulary, WordTokenizer};

use crate::model::ModelFiles;
use crate::tokenizer::HfTokenizer;

/// A sentence as the model sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedSentence {
    /// Source tokens followed by `padded` pad tokens.
    pub tokens: Vec<Token>,
    pub ids: Vec<u32>,
    pub padded: usize,
}

impl TokenizedSentence {
    /// Tokens from the source text, without padding.
    #[must_use]
    pub fn words(&self) -> &[Token] {
        &self.tokens[..self.tokens.len() - self.padded]
    }
}

pub struct Preprocessor {
    tokenizer: Box<dyn TextTokenizer>,
    vocab: Vocabulary,
    min_length: usize,
}

impl Preprocessor {
    /// `min_length` is raised to 1 so the model never sees an empty sequence.
    pub fn new(tokenizer: Box<dyn TextTokenizer>, vocab: Vocabulary, min_length: usize) -> Self {
        Self {
            tokenizer,
            vocab,
            min_length: min_length.max(1),
        }
    }

    /// Load the configured vocabulary and tokenizer.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or a file cannot be loaded.
    #[instrument(skip_all)]
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Self::from_files(config, &ModelFiles::new(config)?)
    }

    pub(crate) fn from_files(config: &Config, files: &ModelFiles<'_>) -> Result<Self> {
        let options = config.vocab_options();
        let vocab = Vocabulary::load(&files.vocab()?, &options)?;
        let tokenizer: Box<dyn TextTokenizer> = match files.tokenizer()? {
            Some(path) => Box::new(HfTokenizer::from_file(&path)?),
            None => Box::new(WordTokenizer::for_vocab(config.lowercase, &options)?),
        };
        Ok(Self::new(tokenizer, vocab, config.min_length))
    }

    #[must_use]
    pub const fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    #[must_use]
    pub const fn min_length(&self) -> usize {
        self.min_length
    }

    /// Tokenize, right-pad to the minimum length and map tokens to indices.
    ///
    /// # Errors
    ///
    /// Returns an error if the tokenizer fails.
    pub fn prepare(&self, text: &str) -> Result<TokenizedSentence> {
        let mut tokens = self.tokenizer.tokenize(text)?;
        let padded = pad_to(&mut tokens, self.min_length, self.vocab.pad_token(), text);
        let words = tokens.len() - padded;
        let ids = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| {
                if i < words {
                    self.vocab.index(&t.text)
                } else {
                    self.vocab.pad_index()
                }
            })
            .collect();
        Ok(TokenizedSentence {
            tokens,
            ids,
            padded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xaitext_core::VocabOptions;

    fn preprocessor(min_length: usize) -> Preprocessor {
        let vocab =
            Vocabulary::from_tokens(["a", "thriller", "good"], &VocabOptions::default()).unwrap();
        Preprocessor::new(Box::new(WordTokenizer::new(true)), vocab, min_length)
    }

    #[test]
    fn review_needs_no_padding() {
        let p = preprocessor(5);
        let sentence = p
            .prepare("A delectable and intriguing thriller filled with surprises")
            .unwrap();
        assert_eq!(sentence.tokens.len(), 8);
        assert_eq!(sentence.padded, 0);
        assert_eq!(sentence.ids[0], p.vocab().index("a"));
        assert_eq!(sentence.ids[1], p.vocab().unk_index());
        assert_eq!(sentence.ids[4], p.vocab().index("thriller"));
    }

    #[test]
    fn short_sentence_padded_exactly() {
        let p = preprocessor(5);
        let sentence = p.prepare("good").unwrap();
        assert_eq!(sentence.ids.len(), 5);
        assert_eq!(sentence.padded, 4);
        assert!(sentence.ids[1..].iter().all(|&i| i == p.vocab().pad_index()));
        assert_eq!(sentence.words().len(), 1);
    }

    #[test]
    fn unknown_words_use_fallback() {
        let p = preprocessor(1);
        let sentence = p.prepare("utterly unseen words").unwrap();
        assert!(sentence.ids.iter().all(|&i| i == p.vocab().unk_index()));
    }

    #[test]
    fn empty_text_is_all_padding() {
        let p = preprocessor(3);
        let sentence = p.prepare("").unwrap();
        assert_eq!(sentence.padded, 3);
        assert!(sentence.words().is_empty());
    }

    #[test]
    fn reserved_token_in_text_maps_to_its_index() {
        let p = preprocessor(1);
        let sentence = p.prepare("a <unk> thriller").unwrap();
        assert_eq!(sentence.tokens.len(), 3);
        assert_eq!(sentence.tokens[1].text, "<unk>");
        assert_eq!(sentence.ids[1], p.vocab().unk_index());
        assert_eq!(sentence.ids[2], p.vocab().index("thriller"));
    }

    #[test]
    fn zero_min_length_still_pads_empty_text() {
        let p = preprocessor(0);
        assert_eq!(p.min_length(), 1);
        let sentence = p.prepare("").unwrap();
        assert_eq!(sentence.ids, [p.vocab().pad_index()]);
        assert_eq!(sentence.padded, 1);
    }

    #[test]
    fn from_config_keeps_custom_reserved_tokens_whole() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = dir.path().join("vocab.txt");
        std::fs::write(&vocab, "[UNK]\n[PAD]\ngood\n").unwrap();
        let config = Config {
            vocab_path: Some(vocab),
            unk_token: "[UNK]".into(),
            pad_token: "[PAD]".into(),
            lowercase: true,
            ..Config::default()
        };
        let p = Preprocessor::from_config(&config).unwrap();
        let sentence = p.prepare("Good [UNK] [PAD]").unwrap();
        assert_eq!(sentence.words().len(), 3);
        assert_eq!(sentence.ids[..3], [2, 0, 1]);
    }

    #[test]
    fn from_config_without_model() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = dir.path().join("vocab.txt");
        std::fs::write(&vocab, "good\nbad\n").unwrap();
        let config = Config {
            vocab_path: Some(vocab),
            lowercase: true,
            min_length: 2,
            ..Config::default()
        };
        let p = Preprocessor::from_config(&config).unwrap();
        assert_eq!(p.min_length(), 2);
        assert_eq!(p.prepare("GOOD").unwrap().ids, [2, 1]);
    }
}
