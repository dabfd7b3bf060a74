//! Model runner adapter: raw sentences in, per-class probabilities out.
//!
//! Attribution methods call the runner as a black box on batches of
//! perturbed sentences and read back an N×C probability matrix.

pub mod model;
pub mod preprocess;
pub mod scorer;
pub mod tokenizer;

#[cfg(feature = "onnx")]
pub mod onnx;

pub use model::ModelFiles;
pub use preprocess::{Preprocessor, TokenizedSentence};
pub use scorer::{FnScorer, Scorer};
pub use tokenizer::HfTokenizer;

use tracing::{debug, info, instrument, trace};
use xaitext_core::probability::{self, class_count};
use xaitext_core::{Config, ImportanceMap, Result, ScoreMatrix, TextTokenizer, Vocabulary};

/// Runner behaviour independent of the loaded model.
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Sentences shorter than this are right-padded to exactly this length.
    /// Zero is treated as 1.
    pub min_length: usize,
    pub labels: Vec<String>,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        let config = Config::default();
        Self {
            min_length: config.min_length,
            labels: config.labels,
        }
    }
}

/// One or more sentences to score. A single string is a batch of one.
#[derive(Debug, Clone, Default)]
pub struct TextBatch<'a>(Vec<&'a str>);

impl<'a> TextBatch<'a> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> From<&'a str> for TextBatch<'a> {
    fn from(text: &'a str) -> Self {
        Self(vec![text])
    }
}

impl<'a, S: AsRef<str>> From<&'a [S]> for TextBatch<'a> {
    fn from(texts: &'a [S]) -> Self {
        Self(texts.iter().map(AsRef::as_ref).collect())
    }
}

impl<'a, S: AsRef<str>> From<&'a Vec<S>> for TextBatch<'a> {
    fn from(texts: &'a Vec<S>) -> Self {
        Self::from(texts.as_slice())
    }
}

pub struct ModelRunner {
    preprocessor: Preprocessor,
    scorer: Box<dyn Scorer>,
    labels: Vec<String>,
}

impl ModelRunner {
    pub fn new(
        tokenizer: Box<dyn TextTokenizer>,
        vocab: Vocabulary,
        scorer: Box<dyn Scorer>,
        options: RunnerOptions,
    ) -> Self {
        Self {
            preprocessor: Preprocessor::new(tokenizer, vocab, options.min_length),
            scorer,
            labels: options.labels,
        }
    }

    /// Load vocabulary, tokenizer and ONNX model as configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or any file cannot be
    /// resolved or loaded.
    #[instrument(skip(config), fields(min_length = config.min_length))]
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate_for_scoring()?;
        let files = ModelFiles::new(config)?;

        let preprocessor = Preprocessor::from_files(config, &files)?;
        let model = files.model()?;
        let scorer = load_onnx_scorer(config, &model)?;
        info!(
            vocab_len = preprocessor.vocab().len(),
            model = %model.display(),
            "model runner initialized"
        );

        Ok(Self {
            preprocessor,
            scorer,
            labels: config.labels.clone(),
        })
    }

    #[must_use]
    pub const fn vocab(&self) -> &Vocabulary {
        self.preprocessor.vocab()
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Tokenize, pad and numericalize one sentence.
    ///
    /// # Errors
    ///
    /// Returns an error if the tokenizer fails.
    pub fn prepare(&self, text: &str) -> Result<TokenizedSentence> {
        self.preprocessor.prepare(text)
    }

    /// Probabilities for a single sentence, as a 1×C matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if tokenization or scoring fails.
    pub fn score_one(&mut self, text: &str) -> Result<ScoreMatrix> {
        self.score(text)
    }

    /// Probabilities for each sentence, in input order.
    ///
    /// # Errors
    ///
    /// Returns an error if tokenization or scoring fails.
    pub fn score_batch<S: AsRef<str>>(&mut self, texts: &[S]) -> Result<ScoreMatrix> {
        self.score(texts)
    }

    /// Probabilities for a string or a batch of strings.
    ///
    /// # Errors
    ///
    /// Returns an error if tokenization or scoring fails, or if the model's
    /// output width changes between sentences.
    #[instrument(skip_all, fields(batch = tracing::field::Empty))]
    pub fn score<'a>(&mut self, input: impl Into<TextBatch<'a>>) -> Result<ScoreMatrix> {
        let batch = input.into();
        tracing::Span::current().record("batch", batch.len());

        let mut rows = Vec::with_capacity(batch.len());
        for text in &batch.0 {
            let sentence = self.prepare(text)?;
            let logits = self.scorer.logits(&sentence.ids)?;
            trace!(
                tokens = sentence.tokens.len(),
                padded = sentence.padded,
                ?logits,
                "sentence scored"
            );
            rows.push(probability::probabilities(&logits)?);
        }

        let classes = class_count(self.labels.len());
        let matrix = ScoreMatrix::from_rows(&rows, classes, &self.labels)?;
        debug!(rows = matrix.rows(), classes = matrix.classes(), "batch scored");
        Ok(matrix)
    }

    /// Pair per-token attribution scores with this runner's tokenization.
    ///
    /// `scores` covers the source tokens only; padding never appears in the map.
    ///
    /// # Errors
    ///
    /// Returns an error if tokenization fails or `scores` has the wrong length.
    pub fn importance_map(&self, text: &str, scores: &[f32]) -> Result<ImportanceMap> {
        let sentence = self.prepare(text)?;
        ImportanceMap::from_tokens(sentence.words(), scores)
    }
}

#[cfg(feature = "onnx")]
fn load_onnx_scorer(config: &Config, model: &std::path::Path) -> Result<Box<dyn Scorer>> {
    Ok(Box::new(onnx::OnnxScorer::load(
        model,
        config.input_type,
        config.input_name.clone(),
    )?))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx_scorer(_config: &Config, _model: &std::path::Path) -> Result<Box<dyn Scorer>> {
    Err(eyre::eyre!(
        "onnx scorer not compiled in (enable 'onnx' feature)"
    ))
}
