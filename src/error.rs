//! Error types.

use std::io;

use thiserror::Error;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures at the boundary between the numeric core and its inputs.
///
/// Length mismatches inside `feed_forward`/`back_prop` are caller bugs and
/// panic instead.
#[derive(Error, Debug)]
pub enum Error {
    /// A network needs an input and an output layer.
    #[error("topology needs at least two layers, got {0}")]
    TopologyTooShort(usize),

    /// Every layer must hold at least one neuron.
    #[error("layer {0} of the topology has no neurons")]
    EmptyLayer(usize),

    /// Learning rate, momentum or smoothing window out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A training example does not fit the network.
    #[error("example {index} has {actual} {kind} values, expected {expected}")]
    SampleShape {
        index: usize,
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A line of a text file could not be understood.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A weight file was written for a different topology.
    #[error("weight file holds {found} {kind} connections, network has {expected}")]
    WeightCount {
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    /// Training was asked to run on nothing.
    #[error("no training examples provided")]
    NoExamples,

    /// Reading or writing a file failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A configuration file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn parse<S: Into<String>>(line: usize, message: S) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}
