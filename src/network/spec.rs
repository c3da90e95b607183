use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::cost::cost_type::CostFunction;
use crate::error::Result;
use crate::network::network::Network;

/// A serializable description of a network architecture.
///
/// Fields:
/// - `layers`     — widths from input to output, e.g. `[784, 30, 10]`
/// - `activation` — nonlinearity used by every layer
/// - `cost`       — cost the network is trained against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub layers: Vec<usize>,
    pub activation: ActivationFunction,
    pub cost: CostFunction,
}

impl NetworkSpec {
    /// Validates the spec and builds a freshly initialized network from it.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Network> {
        Network::new(&self.layers, self.activation, self.cost, rng)
    }
}

impl Default for NetworkSpec {
    /// 784 → 30 → 30 → 10, sigmoid, cross-entropy.
    fn default() -> Self {
        NetworkSpec {
            layers: vec![28 * 28, 30, 30, 10],
            activation: ActivationFunction::Sigmoid,
            cost: CostFunction::CrossEntropy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn parses_from_json() {
        let spec: NetworkSpec = serde_json::from_str(
            r#"{ "layers": [4, 3, 2], "activation": "relu", "cost": "quadratic" }"#,
        )
        .unwrap();
        assert_eq!(spec.layers, vec![4, 3, 2]);
        assert_eq!(spec.activation, ActivationFunction::ReLU);

        let net = spec.build(&mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        assert_eq!(net.layers(), &[4, 3, 2]);
    }

    #[test]
    fn build_validates() {
        let spec = NetworkSpec {
            layers: vec![4],
            ..NetworkSpec::default()
        };
        assert!(spec.build(&mut ChaCha8Rng::seed_from_u64(1)).is_err());
    }
}
