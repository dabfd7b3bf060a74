//! Sentence tokenization with character offsets.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{DEFAULT_PAD_TOKEN, DEFAULT_UNK_TOKEN};
use crate::vocab::VocabOptions;

/// Runs of word characters, or runs of punctuation.
const WORD_ALTERNATIVES: &str = r"\w+|[^\w\s]+";

static DEFAULT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    word_pattern(&[DEFAULT_UNK_TOKEN, DEFAULT_PAD_TOKEN]).expect("word pattern should compile")
});

/// Reserved tokens first so `<unk>` is not split into `<`, `unk`, `>`.
fn word_pattern(reserved: &[&str]) -> Result<Regex, regex::Error> {
    let mut alternatives: Vec<String> = reserved.iter().map(|t| regex::escape(t)).collect();
    alternatives.push(WORD_ALTERNATIVES.to_string());
    Regex::new(&alternatives.join("|"))
}

/// A token and the character offset of its first char in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub offset: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, offset: usize) -> Self {
        Self {
            text: text.into(),
            offset,
        }
    }
}

/// Splits raw text into tokens the vocabulary understands.
pub trait TextTokenizer: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the underlying tokenizer fails.
    fn tokenize(&self, text: &str) -> crate::Result<Vec<Token>>;
}

/// Regex word/punctuation splitter that keeps reserved vocabulary tokens whole.
#[derive(Debug, Clone)]
pub struct WordTokenizer {
    pattern: Regex,
    reserved: Vec<String>,
    lowercase: bool,
}

impl Default for WordTokenizer {
    fn default() -> Self {
        Self::new(false)
    }
}

impl WordTokenizer {
    /// Splitter for the default `<unk>` and `<pad>` names.
    #[must_use]
    pub fn new(lowercase: bool) -> Self {
        Self {
            pattern: DEFAULT_PATTERN.clone(),
            reserved: vec![DEFAULT_UNK_TOKEN.to_string(), DEFAULT_PAD_TOKEN.to_string()],
            lowercase,
        }
    }

    /// Splitter for the reserved token names of a vocabulary.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern exceeds the regex size limit.
    pub fn for_vocab(lowercase: bool, options: &VocabOptions) -> crate::Result<Self> {
        let reserved = vec![options.unk_token.clone(), options.pad_token.clone()];
        let names: Vec<&str> = reserved.iter().map(String::as_str).collect();
        Ok(Self {
            pattern: word_pattern(&names)?,
            reserved,
            lowercase,
        })
    }
}

impl TextTokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> crate::Result<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut chars_seen = 0;
        let mut bytes_seen = 0;
        for m in self.pattern.find_iter(text) {
            chars_seen += text[bytes_seen..m.start()].chars().count();
            bytes_seen = m.start();
            let word = m.as_str();
            let word = if self.lowercase && !self.reserved.iter().any(|r| r == word) {
                word.to_lowercase()
            } else {
                word.to_string()
            };
            tokens.push(Token::new(word, chars_seen));
        }
        Ok(tokens)
    }
}

/// Right-pad `tokens` with `pad` until it holds at least `min_len` entries.
///
/// Pad tokens sit at the end of the text. Returns the number of pads added.
pub fn pad_to(tokens: &mut Vec<Token>, min_len: usize, pad: &str, text: &str) -> usize {
    let missing = min_len.saturating_sub(tokens.len());
    if missing > 0 {
        let end = text.chars().count();
        tokens.extend(std::iter::repeat_with(|| Token::new(pad, end)).take(missing));
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        WordTokenizer::default()
            .tokenize(text)
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn splits_review_sentence() {
        let tokens = words("A delectable and intriguing thriller filled with surprises");
        assert_eq!(tokens.len(), 8);
        assert_eq!(tokens[0], "A");
        assert_eq!(tokens[7], "surprises");
    }

    #[test]
    fn separates_punctuation() {
        assert_eq!(words("Great, fun!"), ["Great", ",", "fun", "!"]);
    }

    #[test]
    fn offsets_are_char_based() {
        let tokens = WordTokenizer::default().tokenize("café au lait").unwrap();
        assert_eq!(tokens[0], Token::new("café", 0));
        assert_eq!(tokens[1], Token::new("au", 5));
        assert_eq!(tokens[2], Token::new("lait", 8));
    }

    #[test]
    fn lowercase_option() {
        let tokens = WordTokenizer::new(true).tokenize("The MOVIE").unwrap();
        assert_eq!(tokens[0].text, "the");
        assert_eq!(tokens[1].text, "movie");
        assert_eq!(tokens[1].offset, 4);
    }

    #[test]
    fn empty_text_has_no_tokens() {
        assert!(words("").is_empty());
        assert!(words("   \n\t").is_empty());
    }

    #[test]
    fn reserved_tokens_stay_whole() {
        let tokens = WordTokenizer::default().tokenize("a <unk> thriller <pad>").unwrap();
        assert_eq!(
            tokens,
            [
                Token::new("a", 0),
                Token::new("<unk>", 2),
                Token::new("thriller", 8),
                Token::new("<pad>", 17),
            ]
        );
    }

    #[test]
    fn other_angle_brackets_still_split() {
        assert_eq!(words("<b>bold</b>"), ["<", "b", ">", "bold", "</", "b", ">"]);
    }

    #[test]
    fn custom_reserved_names_not_lowercased() {
        let options = VocabOptions {
            unk_token: "[UNK]".into(),
            pad_token: "[PAD]".into(),
        };
        let tokenizer = WordTokenizer::for_vocab(true, &options).unwrap();
        let tokens = tokenizer.tokenize("Dull [UNK] film").unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["dull", "[UNK]", "film"]);
        assert_eq!(tokens[1].offset, 5);
        assert_eq!(tokenizer.tokenize("<unk>").unwrap().len(), 3);
    }

    #[test]
    fn pad_short_sentence() {
        let text = "so bad";
        let mut tokens = WordTokenizer::default().tokenize(text).unwrap();
        let added = pad_to(&mut tokens, 5, "<pad>", text);
        assert_eq!(added, 3);
        assert_eq!(tokens.len(), 5);
        assert!(tokens[2..].iter().all(|t| t.text == "<pad>" && t.offset == 6));
    }

    #[test]
    fn pad_leaves_long_sentence() {
        let text = "one two three four five six";
        let mut tokens = WordTokenizer::default().tokenize(text).unwrap();
        assert_eq!(pad_to(&mut tokens, 5, "<pad>", text), 0);
        assert_eq!(tokens.len(), 6);
    }
}
