pub type Result<T> = eyre::Result<T>;

#[derive(Debug, thiserror::Error)]
pub enum XaiError {
    #[error("vocabulary has no tokens")]
    EmptyVocabulary,
    #[error("unknown and padding tokens must differ (both are {0:?})")]
    ReservedTokenCollision(String),
    #[error("scorer returned no logits")]
    EmptyLogits,
    #[error("scorer returned {got} classes, expected {expected}")]
    ClassCountMismatch { expected: usize, got: usize },
    #[error("{scores} importance scores for {tokens} tokens")]
    ScoreLengthMismatch { tokens: usize, scores: usize },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
