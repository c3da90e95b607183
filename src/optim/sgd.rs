use std::borrow::Borrow;

use serde::{Serialize, Deserialize};

use crate::data::dataset::Sample;
use crate::error::{NetError, Result};
use crate::math::matrix::Matrix;
use crate::network::network::Network;

/// Per-layer velocity buffers, shaped like the network's weights and biases.
#[derive(Debug, Clone)]
pub struct Velocity {
    pub weights: Vec<Matrix>,
    pub biases: Vec<Matrix>,
}

impl Velocity {
    /// Zero velocity for every parameter of `net`.
    pub fn zeros_like(net: &Network) -> Velocity {
        let zeros = |ms: &[Matrix]| ms.iter().map(|m| Matrix::zeros(m.rows(), m.cols())).collect();
        Velocity {
            weights: zeros(net.weights()),
            biases: zeros(net.biases()),
        }
    }

    fn check_matches(&self, net: &Network) -> Result<()> {
        let pairs = self
            .weights
            .iter()
            .zip(net.weights())
            .chain(self.biases.iter().zip(net.biases()));
        if self.weights.len() != net.weights().len() || self.biases.len() != net.biases().len() {
            return Err(NetError::shape(
                "velocity",
                (self.weights.len(), self.biases.len()),
                (net.weights().len(), net.biases().len()),
            ));
        }
        for (v, p) in pairs {
            if !v.same_shape(p) {
                return Err(NetError::shape("velocity", v.shape(), p.shape()));
            }
        }
        Ok(())
    }
}

/// Mini-batch gradient descent with classical momentum:
///
/// ```text
/// v ← momentum·v − (learning_rate / batch_size)·∇
/// w ← w + v
/// ```
///
/// `momentum = 0` is plain SGD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sgd {
    pub learning_rate: f64,
    pub momentum: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate, momentum: 0.0 }
    }

    pub fn with_momentum(mut self, momentum: f64) -> Sgd {
        self.momentum = momentum;
        self
    }

    /// Accumulates the gradients of every sample in `batch`, then applies one
    /// momentum update to `net`. Parameters change only after every sample
    /// has been processed successfully.
    pub fn update_mini_batch<S: Borrow<Sample>>(
        &self,
        net: &mut Network,
        velocity: &mut Velocity,
        batch: &[S],
    ) -> Result<()> {
        if batch.is_empty() {
            return Err(NetError::DivisionByZero);
        }
        velocity.check_matches(net)?;

        net.zero_grad();
        for sample in batch {
            let sample = sample.borrow();
            net.accumulate(&sample.input, &sample.target)?;
        }

        let step = self.learning_rate / batch.len() as f64;
        self.step(net, velocity, step)
    }

    fn step(&self, net: &mut Network, velocity: &mut Velocity, step: f64) -> Result<()> {
        for l in 0..net.weights.len() {
            velocity.weights[l].scale_add(self.momentum, &net.weight_grads()[l], -step)?;
            velocity.biases[l].scale_add(self.momentum, &net.bias_grads()[l], -step)?;
        }
        for l in 0..net.weights.len() {
            net.weights[l].add_assign(&velocity.weights[l])?;
            net.biases[l].add_assign(&velocity.biases[l])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::cost::cost_type::CostFunction;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn net() -> Network {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        Network::new(&[2, 3, 2], ActivationFunction::Sigmoid, CostFunction::Quadratic, &mut rng).unwrap()
    }

    fn batch() -> Vec<Sample> {
        vec![
            Sample::from_label(Matrix::column(&[0.0, 1.0]), 1, 2).unwrap(),
            Sample::from_label(Matrix::column(&[1.0, 0.0]), 0, 2).unwrap(),
            Sample::from_label(Matrix::column(&[0.5, 0.5]), 1, 2).unwrap(),
        ]
    }

    /// Summed per-sample gradients, computed independently of the optimizer.
    fn summed_grads(net: &Network, batch: &[Sample]) -> (Vec<Matrix>, Vec<Matrix>) {
        let mut probe = net.clone();
        let mut gw: Vec<Matrix> = net.weights().iter().map(|m| Matrix::zeros(m.rows(), m.cols())).collect();
        let mut gb: Vec<Matrix> = net.biases().iter().map(|m| Matrix::zeros(m.rows(), m.cols())).collect();
        for s in batch {
            probe.forward_backward(&s.input, &s.target).unwrap();
            for l in 0..gw.len() {
                gw[l].add_assign(&probe.delta_weight_grads()[l]).unwrap();
                gb[l].add_assign(&probe.delta_bias_grads()[l]).unwrap();
            }
        }
        (gw, gb)
    }

    #[test]
    fn zero_momentum_is_plain_gradient_descent() {
        let mut net = net();
        let before = net.clone();
        let batch = batch();
        let (gw, gb) = summed_grads(&before, &batch);
        let eta = 0.7;

        let sgd = Sgd::new(eta);
        let mut velocity = Velocity::zeros_like(&net);
        sgd.update_mini_batch(&mut net, &mut velocity, &batch).unwrap();

        let scale = eta / batch.len() as f64;
        for l in 0..gw.len() {
            for ((w_new, w_old), g) in net.weights()[l].iter().zip(before.weights()[l].iter()).zip(gw[l].iter()) {
                assert_relative_eq!(w_new, w_old - scale * g, epsilon = 1e-14);
            }
            for ((b_new, b_old), g) in net.biases()[l].iter().zip(before.biases()[l].iter()).zip(gb[l].iter()) {
                assert_relative_eq!(b_new, b_old - scale * g, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn momentum_carries_previous_velocity() {
        let mut net = net();
        let batch = batch();
        let sgd = Sgd::new(0.5).with_momentum(0.9);
        let mut velocity = Velocity::zeros_like(&net);

        sgd.update_mini_batch(&mut net, &mut velocity, &batch).unwrap();
        let v1 = velocity.weights[0].clone();
        let (gw, _) = summed_grads(&net, &batch);
        let w1 = net.weights()[0].clone();

        sgd.update_mini_batch(&mut net, &mut velocity, &batch).unwrap();
        let scale = 0.5 / batch.len() as f64;
        for (((v2, v1), g), (w2, w1)) in velocity.weights[0]
            .iter()
            .zip(v1.iter())
            .zip(gw[0].iter())
            .zip(net.weights()[0].iter().zip(w1.iter()))
        {
            assert_relative_eq!(v2, 0.9 * v1 - scale * g, epsilon = 1e-14);
            assert_relative_eq!(w2, w1 + v2, epsilon = 1e-14);
        }
    }

    #[test]
    fn objective_accumulates_batch_cost() {
        let mut net = net();
        let batch = batch();
        let mut probe = net.clone();
        let expected: f64 = batch
            .iter()
            .map(|s| probe.forward_backward(&s.input, &s.target).unwrap())
            .sum::<f64>()
            / batch.len() as f64;

        Sgd::new(0.1)
            .update_mini_batch(&mut net, &mut Velocity::zeros_like(&probe), &batch)
            .unwrap();
        assert_eq!(net.objective_samples(), 3);
        assert_relative_eq!(net.objective(), expected, epsilon = 1e-12);
    }

    #[test]
    fn empty_batch_is_division_by_zero() {
        let mut net = net();
        let mut velocity = Velocity::zeros_like(&net);
        let empty: Vec<Sample> = Vec::new();
        let err = Sgd::new(0.1).update_mini_batch(&mut net, &mut velocity, &empty);
        assert!(matches!(err, Err(NetError::DivisionByZero)));
    }

    #[test]
    fn failed_sample_leaves_parameters_untouched() {
        let mut net = net();
        let before = net.clone();
        let mut velocity = Velocity::zeros_like(&net);
        let mut batch = batch();
        batch.push(Sample::new(Matrix::column(&[1.0, 2.0, 3.0]), Matrix::column(&[1.0, 0.0])));

        let err = Sgd::new(1.0).update_mini_batch(&mut net, &mut velocity, &batch);
        assert!(matches!(err, Err(NetError::ShapeMismatch { .. })));
        assert_eq!(net.weights(), before.weights());
        assert_eq!(net.biases(), before.biases());
        assert!(velocity.weights.iter().all(|v| v.iter().all(|x| x == 0.0)));
    }

    #[test]
    fn rejects_velocity_from_another_topology() {
        let mut net = net();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let other = Network::new(&[2, 4, 2], ActivationFunction::Sigmoid, CostFunction::Quadratic, &mut rng).unwrap();
        let mut velocity = Velocity::zeros_like(&other);
        assert!(Sgd::new(0.1).update_mini_batch(&mut net, &mut velocity, &batch()).is_err());
    }
}
