use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{NetError, Result};
use crate::math::matrix::Matrix;

/// One labeled example: a column input, its column target and the class
/// index the target encodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub input: Matrix,
    pub target: Matrix,
    pub label: usize,
}

impl Sample {
    /// Uses `target` as-is; the label is its arg-max.
    pub fn new(input: Matrix, target: Matrix) -> Sample {
        let label = target.argmax().unwrap_or(0);
        Sample { input, target, label }
    }

    /// One-hot target of length `n_classes` with a 1 at `label`.
    pub fn from_label(input: Matrix, label: usize, n_classes: usize) -> Result<Sample> {
        if label >= n_classes {
            return Err(NetError::Dataset(format!(
                "label {label} is out of range for {n_classes} classes"
            )));
        }
        let mut target = Matrix::zeros(n_classes, 1);
        target.set(label, 0, 1.0);
        Ok(Sample { input, target, label })
    }
}

/// An in-memory labeled set with a re-shufflable access order.
///
/// `next_sample` walks the access order from a cursor; `shuffle` draws a new
/// order and rewinds the cursor.
#[derive(Debug, Clone)]
pub struct Dataset {
    samples: Vec<Sample>,
    order: Vec<usize>,
    cursor: usize,
}

impl Dataset {
    pub fn new(samples: Vec<Sample>) -> Dataset {
        let order = (0..samples.len()).collect();
        Dataset { samples, order, cursor: 0 }
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Fisher-Yates over the access order; resets the cursor.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.order.shuffle(rng);
        self.cursor = 0;
    }

    /// Next sample in access order, or `None` once the set is exhausted.
    pub fn next_sample(&mut self) -> Option<&Sample> {
        let idx = *self.order.get(self.cursor)?;
        self.cursor += 1;
        Some(&self.samples[idx])
    }

    /// All samples in the current access order, independent of the cursor.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> + '_ {
        self.order.iter().map(move |&i| &self.samples[i])
    }

    /// Consecutive full batches in access order. A trailing remainder
    /// shorter than `size` is not yielded.
    pub fn batches(&self, size: usize) -> Result<impl Iterator<Item = Vec<&Sample>> + '_> {
        if size == 0 {
            return Err(NetError::DivisionByZero);
        }
        Ok(self
            .order
            .chunks_exact(size)
            .map(move |chunk| chunk.iter().map(|&i| &self.samples[i]).collect()))
    }
}

impl From<Vec<Sample>> for Dataset {
    fn from(samples: Vec<Sample>) -> Self {
        Dataset::new(samples)
    }
}
