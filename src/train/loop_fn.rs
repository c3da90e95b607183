use std::time::Instant;

use rand::Rng;
use tracing::{debug, info};

use crate::data::dataset::Dataset;
use crate::error::{NetError, Result};
use crate::network::network::Network;
use crate::optim::sgd::{Sgd, Velocity};
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Trains `network` for exactly `config.epochs` epochs and returns one
/// `EpochStats` per epoch.
///
/// Each epoch shuffles `train_set`, splits it into
/// `count / batch_size` consecutive mini-batches (the shorter remainder is
/// skipped for that epoch), applies one momentum update per batch, then
/// scores the network on `test_set`.
///
/// # Errors
/// `DivisionByZero` if `batch_size == 0`; any shape error raised by a sample
/// aborts the run, leaving the parameters as they were after the last
/// completed batch.
pub fn train<R: Rng + ?Sized>(
    network: &mut Network,
    train_set: &mut Dataset,
    test_set: &Dataset,
    config: &TrainConfig,
    rng: &mut R,
) -> Result<Vec<EpochStats>> {
    config.validate()?;
    check_dataset(network, train_set)?;
    check_dataset(network, test_set)?;

    let optimizer = config.optimizer();
    let mut velocity = Velocity::zeros_like(network);
    let mut history = Vec::with_capacity(config.epochs);
    network.reset_objective();

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        train_set.shuffle(rng);
        let batches = run_one_epoch(network, train_set, &optimizer, &mut velocity, config.batch_size)?;

        let samples_used = network.objective_samples();
        let mean_cost = network.objective();
        network.reset_objective();

        let correct = evaluate(network, test_set)?;

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            batches,
            samples_used,
            mean_cost,
            correct,
            total: test_set.count(),
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        info!(
            epoch,
            total_epochs = config.epochs,
            mean_cost = stats.mean_cost,
            correct = stats.correct,
            total = stats.total,
            accuracy = stats.accuracy(),
            elapsed_ms = stats.elapsed_ms,
            "epoch complete"
        );
        history.push(stats);
    }

    Ok(history)
}

/// Checks that every sample's input and target widths match the network's
/// input and output layers.
pub fn check_dataset(network: &Network, dataset: &Dataset) -> Result<()> {
    let input = (network.input_size(), 1);
    let output = (network.output_size(), 1);
    for sample in dataset.iter() {
        if sample.input.shape() != input {
            return Err(NetError::shape("dataset input", sample.input.shape(), input));
        }
        if sample.target.shape() != output {
            return Err(NetError::shape("dataset target", sample.target.shape(), output));
        }
    }
    Ok(())
}

/// Counts the samples of `test_set` whose predicted class (arg-max of the
/// output activation, lowest index on ties) equals their label.
pub fn evaluate(network: &mut Network, test_set: &Dataset) -> Result<usize> {
    let mut correct = 0;
    for sample in test_set.iter() {
        let output = network.feedforward(&sample.input)?;
        if output.argmax() == Some(sample.label) {
            correct += 1;
        }
    }
    Ok(correct)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// One pass of mini-batch updates in the dataset's current order.
/// Returns the number of batches processed.
fn run_one_epoch(
    network: &mut Network,
    train_set: &Dataset,
    optimizer: &Sgd,
    velocity: &mut Velocity,
    batch_size: usize,
) -> Result<usize> {
    let mut processed = 0;
    for batch in train_set.batches(batch_size)? {
        optimizer.update_mini_batch(network, velocity, &batch)?;
        processed += 1;
    }
    debug!(batches = processed, skipped = train_set.count() % batch_size, "epoch updates done");
    Ok(processed)
}
