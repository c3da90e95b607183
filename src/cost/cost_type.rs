use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::cost::cross_entropy::CrossEntropyCost;
use crate::cost::quadratic::QuadraticCost;
use crate::error::{NetError, Result};
use crate::math::matrix::Matrix;

/// Selects the cost the network is trained against.
///
/// - `Quadratic`    — 0.5·‖a − y‖²; works with any activation.
/// - `CrossEntropy` — binary cross-entropy summed over output units; its
///   output delta `a − y` assumes a sigmoid output layer, so pairing it with
///   any other activation is rejected by [`CostFunction::check_pairing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostFunction {
    Quadratic,
    CrossEntropy,
}

impl CostFunction {
    /// Cost of one sample's output activation `a` against target `y`.
    pub fn value(&self, a: &Matrix, y: &Matrix) -> Result<f64> {
        match self {
            CostFunction::Quadratic => QuadraticCost::value(a, y),
            CostFunction::CrossEntropy => CrossEntropyCost::value(a, y),
        }
    }

    /// Writes ∂C/∂z at the output layer into `dest`.
    pub fn output_delta(
        &self,
        activation: ActivationFunction,
        dest: &mut Matrix,
        a: &Matrix,
        y: &Matrix,
        z: &Matrix,
    ) -> Result<()> {
        match self {
            CostFunction::Quadratic => QuadraticCost::delta(activation, dest, a, y, z),
            CostFunction::CrossEntropy => CrossEntropyCost::delta(dest, a, y),
        }
    }

    pub fn check_pairing(&self, activation: ActivationFunction) -> Result<()> {
        match (self, activation) {
            (CostFunction::CrossEntropy, ActivationFunction::Sigmoid) => Ok(()),
            (CostFunction::CrossEntropy, other) => Err(NetError::IncompatibleCost {
                cost: self.name(),
                activation: other.name(),
            }),
            (CostFunction::Quadratic, _) => Ok(()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CostFunction::Quadratic => "quadratic",
            CostFunction::CrossEntropy => "cross_entropy",
        }
    }
}

impl std::str::FromStr for CostFunction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "quadratic" | "quad" | "mse" => Ok(CostFunction::Quadratic),
            "cross_entropy" | "crossentropy" => Ok(CostFunction::CrossEntropy),
            other => Err(format!("unknown cost '{other}' (expected quadratic or cross_entropy)")),
        }
    }
}
