use crate::activation::activation::ActivationFunction;
use crate::error::{NetError, Result};
use crate::math::matrix::Matrix;

pub struct QuadraticCost;

impl QuadraticCost {
    /// Scalar cost: 0.5 · ‖a − y‖²
    pub fn value(a: &Matrix, y: &Matrix) -> Result<f64> {
        if !a.same_shape(y) {
            return Err(NetError::shape("quadratic cost", a.shape(), y.shape()));
        }
        Ok(0.5 * a.iter().zip(y.iter()).map(|(a, y)| (a - y).powi(2)).sum::<f64>())
    }

    /// Output delta: (a − y) ⊙ σ'(z), written into `dest`.
    pub fn delta(
        activation: ActivationFunction,
        dest: &mut Matrix,
        a: &Matrix,
        y: &Matrix,
        z: &Matrix,
    ) -> Result<()> {
        dest.copy_from(a)?;
        dest.sub_assign(y)?;
        if !dest.same_shape(z) {
            return Err(NetError::shape("quadratic delta", dest.shape(), z.shape()));
        }
        for i in 0..dest.rows() {
            for j in 0..dest.cols() {
                let sp = activation.derivative(z.get(i, j));
                dest.set(i, j, dest.get(i, j) * sp);
            }
        }
        Ok(())
    }
}
