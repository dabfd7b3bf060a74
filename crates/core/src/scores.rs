//! Per-sentence class probabilities.

use ndarray::{Array2, ArrayView1};

use crate::error::XaiError;

/// N×C matrix of class probabilities, one row per input sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    probabilities: Array2<f32>,
    labels: Vec<String>,
}

impl ScoreMatrix {
    /// Stack per-sentence probability rows.
    ///
    /// `classes` fixes the width of an empty matrix. Labels beyond what the
    /// model outputs are dropped; missing ones are named `class_{i}`.
    ///
    /// # Errors
    ///
    /// Returns `XaiError::ClassCountMismatch` if rows differ in width.
    pub fn from_rows(rows: &[Vec<f32>], classes: usize, labels: &[String]) -> crate::Result<Self> {
        let width = rows.first().map_or(classes, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(XaiError::ClassCountMismatch {
                expected: width,
                got: bad.len(),
            }
            .into());
        }
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        let probabilities = Array2::from_shape_vec((rows.len(), width), flat)?;
        let labels = (0..width)
            .map(|i| labels.get(i).cloned().unwrap_or_else(|| format!("class_{i}")))
            .collect();
        Ok(Self {
            probabilities,
            labels,
        })
    }

    #[must_use]
    pub const fn probabilities(&self) -> &Array2<f32> {
        &self.probabilities
    }

    #[must_use]
    pub fn into_array(self) -> Array2<f32> {
        self.probabilities
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.probabilities.nrows()
    }

    #[must_use]
    pub fn classes(&self) -> usize {
        self.probabilities.ncols()
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<ArrayView1<'_, f32>> {
        (index < self.rows()).then(|| self.probabilities.row(index))
    }

    /// Index of the most probable class for each row.
    #[must_use]
    pub fn predicted(&self) -> Vec<usize> {
        self.probabilities
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0, f32::NEG_INFINITY), |best, (i, &p)| {
                        if p > best.1 { (i, p) } else { best }
                    })
                    .0
            })
            .collect()
    }
}
