pub mod dataset;
pub mod idx;

pub use dataset::{Dataset, Sample};
pub use idx::{load_idx_pair, parse_idx_pair, MnistFiles};
