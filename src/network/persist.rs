use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::cost::cost_type::CostFunction;
use crate::error::Result;
use crate::math::matrix::Matrix;
use crate::network::network::Network;

/// The persisted part of a network: topology, descriptors and parameters.
/// Caches and gradient buffers are rebuilt on load.
#[derive(Serialize, Deserialize)]
struct NetworkSnapshot {
    layers: Vec<usize>,
    activation: ActivationFunction,
    cost: CostFunction,
    weights: Vec<Matrix>,
    biases: Vec<Matrix>,
}

impl Network {
    /// Human-readable dump: every weight matrix row by row, a blank line,
    /// then every bias matrix the same way. There is no reader for this
    /// format; use `save_json` for a reloadable model.
    pub fn write_text<W: Write>(&self, out: &mut W) -> Result<()> {
        for w in self.weights() {
            w.write_rows(out)?;
        }
        writeln!(out)?;
        for b in self.biases() {
            b.write_rows(out)?;
        }
        Ok(())
    }

    pub fn save_text<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_text(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Serializes topology and parameters to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let snapshot = NetworkSnapshot {
            layers: self.layers().to_vec(),
            activation: self.activation(),
            cost: self.cost(),
            weights: self.weights().to_vec(),
            biases: self.biases().to_vec(),
        };
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &snapshot)?;
        Ok(())
    }

    /// Loads a network written by `save_json`, re-validating every shape.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Network> {
        let reader = BufReader::new(File::open(path)?);
        let snapshot: NetworkSnapshot = serde_json::from_reader(reader)?;
        Network::from_parameters(
            &snapshot.layers,
            snapshot.activation,
            snapshot.cost,
            snapshot.weights,
            snapshot.biases,
        )
    }
}
