use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::error::{NetError, Result};
use crate::network::spec::NetworkSpec;
use crate::optim::sgd::Sgd;

/// Configuration for a `train` run.
///
/// # Fields
/// - `network`       — architecture to build (layers, activation, cost)
/// - `epochs`        — number of full passes over the training set
/// - `learning_rate` — eta; each update is scaled by `eta / batch_size`
/// - `momentum`      — velocity decay; `0.0` gives plain SGD
/// - `batch_size`    — samples per mini-batch; must be at least 1
/// - `seed`          — seeds weight initialization and shuffling
///
/// Missing fields take their `Default` values when read from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub network: NetworkSpec,
    pub epochs: usize,
    pub learning_rate: f64,
    pub momentum: f64,
    pub batch_size: usize,
    pub seed: u64,
}

impl TrainConfig {
    /// Creates a config with no momentum and seed 0.
    pub fn new(network: NetworkSpec, epochs: usize, batch_size: usize, learning_rate: f64) -> Self {
        TrainConfig {
            network,
            epochs,
            learning_rate,
            momentum: 0.0,
            batch_size,
            seed: 0,
        }
    }

    pub fn with_momentum(mut self, momentum: f64) -> Self {
        self.momentum = momentum;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(NetError::DivisionByZero);
        }
        Ok(())
    }

    pub fn optimizer(&self) -> Sgd {
        Sgd::new(self.learning_rate).with_momentum(self.momentum)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<TrainConfig> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            network: NetworkSpec::default(),
            epochs: 30,
            learning_rate: 1.0,
            momentum: 0.9,
            batch_size: 1000,
            seed: 0,
        }
    }
}
