use xaitext_core::Result;

/// Raw model output for one numericalized sentence.
pub trait Scorer {
    /// Logits for a single `[1, len]` sequence of vocabulary indices.
    fn logits(&mut self, ids: &[u32]) -> Result<Vec<f32>>;
}

impl<S: Scorer + ?Sized> Scorer for Box<S> {
    fn logits(&mut self, ids: &[u32]) -> Result<Vec<f32>> {
        (**self).logits(ids)
    }
}

/// Adapts a closure into a [`Scorer`].
pub struct FnScorer<F>(F);

impl<F> FnScorer<F>
where
    F: FnMut(&[u32]) -> Result<Vec<f32>>,
{
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Scorer for FnScorer<F>
where
    F: FnMut(&[u32]) -> Result<Vec<f32>>,
{
    fn logits(&mut self, ids: &[u32]) -> Result<Vec<f32>> {
        (self.0)(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fn_scorer_forwards_ids() {
        let mut scorer = FnScorer::new(|ids: &[u32]| Ok(vec![ids.len() as f32]));
        assert_eq!(scorer.logits(&[1, 2, 3]).unwrap(), [3.0]);
    }

    #[test]
    fn boxed_scorer() {
        let mut scorer: Box<dyn Scorer> = Box::new(FnScorer::new(|_: &[u32]| Ok(vec![0.5, 0.5])));
        assert_eq!(scorer.logits(&[]).unwrap().len(), 2);
    }
}
