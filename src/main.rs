//! Trains a digit classifier on MNIST.
//!
//! Usage:
//!   cargo run --release -- --data-dir data --epochs 30 --eta 1.0 --batch-size 1000
//!
//! The four IDX files (`train-images.idx3-ubyte`, `train-labels.idx1-ubyte`,
//! `t10k-images.idx3-ubyte`, `t10k-labels.idx1-ubyte`) must be present in
//! `--data-dir`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use digitnet::data::idx::MnistFiles;
use digitnet::{check_dataset, train, ActivationFunction, CostFunction, TrainConfig};

#[derive(Parser, Debug)]
#[command(name = "digitnet")]
#[command(about = "Train a feed-forward network on MNIST with mini-batch SGD and momentum")]
struct Args {
    /// JSON training config; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the MNIST IDX files
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    #[arg(short, long)]
    epochs: Option<usize>,

    /// Learning rate
    #[arg(long)]
    eta: Option<f64>,

    #[arg(short, long)]
    momentum: Option<f64>,

    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Seed for weight initialization and shuffling
    #[arg(short, long)]
    seed: Option<u64>,

    /// Layer sizes, input first, e.g. 784,30,10
    #[arg(long, value_delimiter = ',')]
    layers: Option<Vec<usize>>,

    /// sigmoid or relu
    #[arg(long)]
    activation: Option<ActivationFunction>,

    /// quadratic or cross_entropy
    #[arg(long)]
    cost: Option<CostFunction>,

    /// Write the trained weights and biases as plain text
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Write the trained network as reloadable JSON; the resolved training
    /// config is written beside it with a `.config.json` extension
    #[arg(long)]
    save: Option<PathBuf>,
}

impl Args {
    fn resolve_config(&self) -> Result<TrainConfig> {
        let mut config = match &self.config {
            Some(path) => TrainConfig::load_json(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => TrainConfig::default(),
        };

        if let Some(epochs) = self.epochs {
            config.epochs = epochs;
        }
        if let Some(eta) = self.eta {
            config.learning_rate = eta;
        }
        if let Some(momentum) = self.momentum {
            config.momentum = momentum;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(layers) = &self.layers {
            config.network.layers = layers.clone();
        }
        if let Some(activation) = self.activation {
            config.network.activation = activation;
        }
        if let Some(cost) = self.cost {
            config.network.cost = cost;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = args.resolve_config()?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    info!(
        layers = ?config.network.layers,
        activation = config.network.activation.name(),
        cost = config.network.cost.name(),
        "initializing network"
    );
    let mut network = config.network.build(&mut rng)?;

    let files = MnistFiles::in_dir(&args.data_dir);
    files
        .verify()
        .with_context(|| format!("verifying MNIST files in {}", args.data_dir.display()))?;
    let n_classes = network.output_size();
    let mut train_set = files.load_train(n_classes).context("loading training set")?;
    let test_set = files.load_test(n_classes).context("loading test set")?;
    check_dataset(&network, &train_set)
        .with_context(|| format!("training images in {} do not fit the network", args.data_dir.display()))?;
    check_dataset(&network, &test_set).context("test set does not fit the network")?;

    info!(
        epochs = config.epochs,
        eta = config.learning_rate,
        momentum = config.momentum,
        batch_size = config.batch_size,
        "training"
    );
    let history = train(&mut network, &mut train_set, &test_set, &config, &mut rng)?;

    if let Some(last) = history.last() {
        info!(correct = last.correct, total = last.total, accuracy = last.accuracy(), "final accuracy");
    }

    if let Some(path) = &args.dump {
        network
            .save_text(path)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = &args.save {
        network
            .save_json(path)
            .with_context(|| format!("writing {}", path.display()))?;
        let config_path = path.with_extension("config.json");
        config
            .save_json(&config_path)
            .with_context(|| format!("writing {}", config_path.display()))?;
    }

    Ok(())
}
