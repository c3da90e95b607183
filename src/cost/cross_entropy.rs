use crate::error::{NetError, Result};
use crate::math::matrix::Matrix;

/// Cross-entropy cost for sigmoid output units.
pub struct CrossEntropyCost;

/// Keeps `ln` finite when an output saturates at exactly 0 or 1.
const EPS: f64 = 1e-12;

impl CrossEntropyCost {
    /// Scalar cost: −Σ [y·ln(a) + (1 − y)·ln(1 − a)]
    pub fn value(a: &Matrix, y: &Matrix) -> Result<f64> {
        if !a.same_shape(y) {
            return Err(NetError::shape("cross-entropy cost", a.shape(), y.shape()));
        }
        Ok(a.iter()
            .zip(y.iter())
            .map(|(a, y)| {
                let a = a.clamp(EPS, 1.0 - EPS);
                -(y * a.ln() + (1.0 - y) * (1.0 - a).ln())
            })
            .sum())
    }

    /// Output delta: a − y.
    ///
    /// The sigmoid derivative cancels against ∂C/∂a, so `z` is not read.
    /// Only valid with a sigmoid output; `CostFunction::check_pairing`
    /// rejects anything else before a network is built.
    pub fn delta(dest: &mut Matrix, a: &Matrix, y: &Matrix) -> Result<()> {
        dest.copy_from(a)?;
        dest.sub_assign(y)
    }
}
