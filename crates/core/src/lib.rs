//! Core primitives for running text classifiers under attribution methods:
//! configuration, vocabulary, tokenization, probabilities and importance maps.
//! No ONNX or download dependencies.

pub mod config;
pub mod error;
pub mod importance;
pub mod probability;
pub mod scores;
pub mod tokenize;
pub mod vocab;

pub use config::{Config, HubSource, InputType};
pub use error::{Result, XaiError};
pub use importance::{ImportanceMap, TokenImportance};
pub use scores::ScoreMatrix;
pub use tokenize::{TextTokenizer, Token, WordTokenizer};
pub use vocab::{VocabOptions, Vocabulary};
