use serde::{Serialize, Deserialize};
use std::f64::consts::E;

/// Elementwise nonlinearity shared by every layer of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Sigmoid,
    #[serde(rename = "relu")]
    ReLU,
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
        }
    }

    /// Derivative evaluated at the pre-activation `x`, not at `function(x)`.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            },
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::ReLU => "relu",
        }
    }
}

impl std::str::FromStr for ActivationFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sigmoid" => Ok(ActivationFunction::Sigmoid),
            "relu" => Ok(ActivationFunction::ReLU),
            other => Err(format!("unknown activation '{other}' (expected sigmoid or relu)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sigmoid_values() {
        let s = ActivationFunction::Sigmoid;
        assert_relative_eq!(s.function(0.0), 0.5);
        assert_relative_eq!(s.derivative(0.0), 0.25);
        assert_relative_eq!(s.function(2.0) + s.function(-2.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn sigmoid_derivative_matches_finite_difference() {
        let s = ActivationFunction::Sigmoid;
        let h = 1e-6;
        for &x in &[-3.0, -0.4, 0.0, 1.7] {
            let numeric = (s.function(x + h) - s.function(x - h)) / (2.0 * h);
            assert_relative_eq!(s.derivative(x), numeric, epsilon = 1e-8);
        }
    }

    #[test]
    fn relu_values() {
        let r = ActivationFunction::ReLU;
        assert_eq!(r.function(-2.0), 0.0);
        assert_eq!(r.function(3.5), 3.5);
        assert_eq!(r.derivative(-0.1), 0.0);
        assert_eq!(r.derivative(0.1), 1.0);
    }

    #[test]
    fn parses_and_serializes_names() {
        assert_eq!("ReLU".parse::<ActivationFunction>().unwrap(), ActivationFunction::ReLU);
        assert!("tanh".parse::<ActivationFunction>().is_err());
        let json = serde_json::to_string(&ActivationFunction::ReLU).unwrap();
        assert_eq!(json, "\"relu\"");
    }
}
