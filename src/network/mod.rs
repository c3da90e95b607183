pub mod network;
pub mod persist;
pub mod spec;

pub use network::{Network, INIT_SIGMA};
pub use spec::NetworkSpec;
