pub mod error;
pub mod math;
pub mod activation;
pub mod cost;
pub mod network;
pub mod optim;
pub mod data;
pub mod train;

// Convenience re-exports
pub use error::{NetError, Result};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use cost::cost_type::CostFunction;
pub use network::network::Network;
pub use network::spec::NetworkSpec;
pub use optim::sgd::{Sgd, Velocity};
pub use data::dataset::{Dataset, Sample};
pub use train::epoch_stats::EpochStats;
pub use train::train_config::TrainConfig;
pub use train::loop_fn::{check_dataset, evaluate, train};
