//! Training hyperparameters owned by each network.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Learning rate, momentum and error smoothing for a `Network`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Overall net training rate, usually in `[0.0, 1.0]`.
    pub eta: f64,
    /// Multiplier of the last weight change (momentum), `>= 0.0`.
    pub alpha: f64,
    /// Number of training samples the recent average error is smoothed over.
    pub smoothing_window: f64,
}

impl Default for NetConfig {
    /// The defaults are:
    ///
    /// * A learning rate of 0.33.
    /// * A momentum of 0.55.
    /// * A smoothing window of 100 samples.
    fn default() -> Self {
        NetConfig {
            eta: 0.33,
            alpha: 0.55,
            smoothing_window: 100.0,
        }
    }
}

impl NetConfig {
    /// Sets the learning rate.
    pub fn eta(mut self, eta: f64) -> Self {
        self.eta = eta;
        self
    }

    /// Sets the momentum coefficient.
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the recent average error smoothing window.
    pub fn smoothing_window(mut self, window: f64) -> Self {
        self.smoothing_window = window;
        self
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: NetConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Returns an error if any parameter is negative or not finite.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("eta", self.eta),
            ("alpha", self.alpha),
            ("smoothing_window", self.smoothing_window),
        ];
        for &(name, value) in &fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be a finite, non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
