use digitnet::{train, ActivationFunction, CostFunction, Dataset, Matrix, NetworkSpec, Sample, TrainConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn main() -> digitnet::Result<()> {
    tracing_subscriber::fmt::init();

    let samples: Vec<Sample> = [
        ([0.0, 0.0], 0.0),
        ([0.0, 1.0], 1.0),
        ([1.0, 0.0], 1.0),
        ([1.0, 1.0], 0.0),
    ]
    .iter()
    .map(|(x, y)| Sample::new(Matrix::column(x), Matrix::column(&[*y])))
    .collect();
    let mut train_set = Dataset::new(samples.clone());
    let test_set = Dataset::new(Vec::new());

    let spec = NetworkSpec {
        layers: vec![2, 4, 1],
        activation: ActivationFunction::Sigmoid,
        cost: CostFunction::Quadratic,
    };
    let config = TrainConfig::new(spec, 500, 4, 0.5).with_momentum(0.95);

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut network = config.network.build(&mut rng)?;
    let history = train(&mut network, &mut train_set, &test_set, &config, &mut rng)?;

    for stats in history.iter().step_by(100) {
        println!("Epoch {}: cost = {:.6}", stats.epoch, stats.mean_cost);
    }

    for sample in &samples {
        let out = network.feedforward(&sample.input)?.get(0, 0);
        println!(
            "Input: [{}, {}] -> Output: {:.4}",
            sample.input.get(0, 0),
            sample.input.get(1, 0),
            out
        );
    }

    Ok(())
}
