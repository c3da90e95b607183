use rand::Rng;
use tracing::debug;

use crate::activation::activation::ActivationFunction;
use crate::cost::cost_type::CostFunction;
use crate::error::{NetError, Result};
use crate::math::matrix::Matrix;

/// Standard deviation of the Gaussian used to initialize weights and biases.
pub const INIT_SIGMA: f64 = 1.0;

/// A fully-connected feed-forward network.
///
/// For `L = layers.len()`, index `i` in `0..L-1` addresses the transform
/// between layer `i` and layer `i + 1`:
/// - `weights[i]`: (layers[i+1], layers[i])
/// - `biases[i]`, `preactivations[i]`: (layers[i+1], 1)
/// - `activations[i]` for `i` in `0..L`: (layers[i], 1)
///
/// The network owns every buffer it computes with. Caches and gradient
/// scratch are allocated once here and overwritten on every call:
/// `feedforward` overwrites `activations`/`preactivations`, each sample in
/// `forward_backward` overwrites `delta_*_grad`, and the accumulated
/// `*_grad` buffers are zeroed at the start of every mini-batch.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<usize>,
    activation: ActivationFunction,
    cost: CostFunction,
    pub(crate) weights: Vec<Matrix>,
    pub(crate) biases: Vec<Matrix>,
    activations: Vec<Matrix>,
    preactivations: Vec<Matrix>,
    weight_grad: Vec<Matrix>,
    bias_grad: Vec<Matrix>,
    delta_weight_grad: Vec<Matrix>,
    delta_bias_grad: Vec<Matrix>,
    objective: f64,
    objective_samples: usize,
}

impl Network {
    /// Builds a network with every weight and bias drawn from
    /// N(0, INIT_SIGMA²) using `rng`.
    pub fn new<R: Rng + ?Sized>(
        layers: &[usize],
        activation: ActivationFunction,
        cost: CostFunction,
        rng: &mut R,
    ) -> Result<Network> {
        validate_topology(layers)?;
        cost.check_pairing(activation)?;

        let mut weights = Vec::with_capacity(layers.len() - 1);
        let mut biases = Vec::with_capacity(layers.len() - 1);
        for pair in layers.windows(2) {
            let (fan_in, fan_out) = (pair[0], pair[1]);
            biases.push(Matrix::random_gaussian(fan_out, 1, INIT_SIGMA, rng)?);
            weights.push(Matrix::random_gaussian(fan_out, fan_in, INIT_SIGMA, rng)?);
        }

        let net = Network::assemble(layers.to_vec(), activation, cost, weights, biases);
        debug!(
            layers = ?net.layers,
            activation = activation.name(),
            cost = cost.name(),
            parameters = net.parameter_count(),
            "network initialized"
        );
        Ok(net)
    }

    /// Rebuilds a network from existing parameters, with fresh zeroed caches.
    pub fn from_parameters(
        layers: &[usize],
        activation: ActivationFunction,
        cost: CostFunction,
        weights: Vec<Matrix>,
        biases: Vec<Matrix>,
    ) -> Result<Network> {
        validate_topology(layers)?;
        cost.check_pairing(activation)?;

        let expected = layers.len() - 1;
        if weights.len() != expected || biases.len() != expected {
            return Err(NetError::shape(
                "from_parameters",
                (weights.len(), biases.len()),
                (expected, expected),
            ));
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if weights[i].shape() != (pair[1], pair[0]) {
                return Err(NetError::shape("from_parameters weights", weights[i].shape(), (pair[1], pair[0])));
            }
            if biases[i].shape() != (pair[1], 1) {
                return Err(NetError::shape("from_parameters biases", biases[i].shape(), (pair[1], 1)));
            }
        }

        Ok(Network::assemble(layers.to_vec(), activation, cost, weights, biases))
    }

    fn assemble(
        layers: Vec<usize>,
        activation: ActivationFunction,
        cost: CostFunction,
        weights: Vec<Matrix>,
        biases: Vec<Matrix>,
    ) -> Network {
        let zeros_like = |ms: &[Matrix]| -> Vec<Matrix> {
            ms.iter().map(|m| Matrix::zeros(m.rows(), m.cols())).collect()
        };

        Network {
            activations: layers.iter().map(|&n| Matrix::zeros(n, 1)).collect(),
            preactivations: zeros_like(&biases),
            weight_grad: zeros_like(&weights),
            bias_grad: zeros_like(&biases),
            delta_weight_grad: zeros_like(&weights),
            delta_bias_grad: zeros_like(&biases),
            layers,
            activation,
            cost,
            weights,
            biases,
            objective: 0.0,
            objective_samples: 0,
        }
    }

    /// Propagates `input` (shape (layers[0], 1)) through every layer,
    /// refreshing the activation and pre-activation caches. Returns a view
    /// of the output activation.
    pub fn feedforward(&mut self, input: &Matrix) -> Result<&Matrix> {
        self.activations[0].copy_from(input)?;

        for i in 0..self.weights.len() {
            Matrix::matmul_into(false, false, &self.weights[i], &self.activations[i], &mut self.preactivations[i])?;
            self.preactivations[i].add_assign(&self.biases[i])?;
            let act = self.activation;
            self.activations[i + 1].map_from(&self.preactivations[i], |z| act.function(z))?;
        }

        Ok(self.output())
    }

    /// Runs `feedforward(input)` followed by backpropagation against
    /// `target`, leaving this sample's gradients in the delta scratch
    /// buffers. Returns the sample's cost.
    ///
    /// Backpropagation is only reachable through here, so the caches it
    /// reads always belong to `input`.
    pub fn forward_backward(&mut self, input: &Matrix, target: &Matrix) -> Result<f64> {
        let out_shape = (self.output_size(), 1);
        if target.shape() != out_shape {
            return Err(NetError::shape("target", target.shape(), out_shape));
        }

        self.feedforward(input)?;
        let cost = self.cost.value(self.output(), target)?;
        self.backprop(target)?;
        Ok(cost)
    }

    fn backprop(&mut self, target: &Matrix) -> Result<()> {
        let last = self.weights.len() - 1;

        // Output layer. delta_bias_grad[l] doubles as the delta of layer l.
        self.cost.output_delta(
            self.activation,
            &mut self.delta_bias_grad[last],
            &self.activations[last + 1],
            target,
            &self.preactivations[last],
        )?;
        Matrix::matmul_into(
            false,
            true,
            &self.delta_bias_grad[last],
            &self.activations[last],
            &mut self.delta_weight_grad[last],
        )?;

        // Hidden layers, strictly in decreasing order: each step consumes the
        // delta written by the step before it.
        for l in (0..last).rev() {
            let (lower, upper) = self.delta_bias_grad.split_at_mut(l + 1);
            let delta = &mut lower[l];
            Matrix::matmul_into(true, false, &self.weights[l + 1], &upper[0], delta)?;
            let act = self.activation;
            let z = &self.preactivations[l];
            for r in 0..delta.rows() {
                delta.set(r, 0, delta.get(r, 0) * act.derivative(z.get(r, 0)));
            }

            Matrix::matmul_into(
                false,
                true,
                &self.delta_bias_grad[l],
                &self.activations[l],
                &mut self.delta_weight_grad[l],
            )?;
        }

        Ok(())
    }

    /// Zeroes the mini-batch gradient accumulators.
    pub(crate) fn zero_grad(&mut self) {
        for m in self.weight_grad.iter_mut().chain(self.bias_grad.iter_mut()) {
            m.set_zero();
        }
    }

    /// `forward_backward` plus accumulation of the sample's gradients and
    /// cost. The live weights are not touched.
    pub(crate) fn accumulate(&mut self, input: &Matrix, target: &Matrix) -> Result<f64> {
        let cost = self.forward_backward(input, target)?;
        for l in 0..self.weights.len() {
            self.weight_grad[l].add_assign(&self.delta_weight_grad[l])?;
            self.bias_grad[l].add_assign(&self.delta_bias_grad[l])?;
        }
        self.objective += cost;
        self.objective_samples += 1;
        Ok(cost)
    }

    /// Mean cost over the samples accumulated since the last reset.
    pub fn objective(&self) -> f64 {
        if self.objective_samples == 0 {
            0.0
        } else {
            self.objective / self.objective_samples as f64
        }
    }

    pub fn objective_samples(&self) -> usize {
        self.objective_samples
    }

    pub fn reset_objective(&mut self) {
        self.objective = 0.0;
        self.objective_samples = 0;
    }

    pub fn layers(&self) -> &[usize] {
        &self.layers
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    pub fn cost(&self) -> CostFunction {
        self.cost
    }

    pub fn input_size(&self) -> usize {
        self.layers[0]
    }

    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1]
    }

    pub fn weights(&self) -> &[Matrix] {
        &self.weights
    }

    pub fn biases(&self) -> &[Matrix] {
        &self.biases
    }

    /// Output activation of the most recent forward pass.
    pub fn output(&self) -> &Matrix {
        &self.activations[self.activations.len() - 1]
    }

    pub fn activations(&self) -> &[Matrix] {
        &self.activations
    }

    pub fn preactivations(&self) -> &[Matrix] {
        &self.preactivations
    }

    /// Mini-batch accumulated weight gradients.
    pub fn weight_grads(&self) -> &[Matrix] {
        &self.weight_grad
    }

    pub fn bias_grads(&self) -> &[Matrix] {
        &self.bias_grad
    }

    /// Per-sample weight gradients of the last `forward_backward` call.
    pub fn delta_weight_grads(&self) -> &[Matrix] {
        &self.delta_weight_grad
    }

    pub fn delta_bias_grads(&self) -> &[Matrix] {
        &self.delta_bias_grad
    }

    pub fn parameter_count(&self) -> usize {
        self.weights
            .iter()
            .chain(self.biases.iter())
            .map(|m| m.rows() * m.cols())
            .sum()
    }
}

fn validate_topology(layers: &[usize]) -> Result<()> {
    if layers.len() < 2 || layers.iter().any(|&n| n == 0) {
        return Err(NetError::InvalidTopology { layers: layers.to_vec() });
    }
    Ok(())
}
