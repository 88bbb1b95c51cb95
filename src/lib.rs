extern crate itertools;
extern crate rand;
#[macro_use]
extern crate serde_derive;

pub mod config;
pub mod error;
pub mod layer;
pub mod learn_data;
pub mod network;
pub mod neuron;
pub mod trainer;
pub mod transfer;
pub mod weights;

pub use crate::config::NetConfig;
pub use crate::error::{Error, Result};
pub use crate::layer::Layer;
pub use crate::learn_data::LearnData;
pub use crate::network::Network;
pub use crate::neuron::{Connection, Neuron};
pub use crate::trainer::{Logging, StopCondition, Trainer, TrainingSummary};
pub use crate::weights::{load_weights, read_weights, save_weights, write_weights};
