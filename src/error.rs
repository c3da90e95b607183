use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NetError>;

/// Every failure the engine can report.
///
/// Shape and topology errors indicate a programming error on the caller's
/// side; they abort the current operation and leave the network parameters
/// untouched.
#[derive(Error, Debug)]
pub enum NetError {
    /// Fewer than two layers, or a layer of width zero.
    #[error("invalid topology {layers:?}: need at least 2 layers, each of size > 0")]
    InvalidTopology { layers: Vec<usize> },

    /// Operand dimensions disagree.
    #[error("shape mismatch in {op}: {left:?} vs {right:?}")]
    ShapeMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    /// A mini-batch of size zero was requested.
    #[error("batch size must be greater than zero")]
    DivisionByZero,

    /// Cost/activation pair whose output delta would be wrong.
    #[error("{cost} cost requires a sigmoid output activation, got {activation}")]
    IncompatibleCost {
        cost: &'static str,
        activation: &'static str,
    },

    /// Standard deviation rejected by the Gaussian sampler.
    #[error("invalid standard deviation {sigma} for weight initialization")]
    InvalidSigma { sigma: f64 },

    /// Malformed or inconsistent dataset input.
    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NetError {
    pub(crate) fn shape(op: &'static str, left: (usize, usize), right: (usize, usize)) -> Self {
        NetError::ShapeMismatch { op, left, right }
    }
}
