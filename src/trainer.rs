//! Utilities for training networks one sample at a time.

use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::network::Network;

use itertools::Itertools;
use tracing::info;

/// A builder for training runs.
#[derive(Copy, Clone, Debug)]
pub struct Trainer {
    logging: Logging,
    stop_condition: StopCondition,
}

/// What a finished training run did.
#[derive(Copy, Clone, Debug)]
pub struct TrainingSummary {
    /// Number of samples fed through the network.
    pub passes: usize,
    /// Number of complete passes over the examples.
    pub epochs: usize,
    /// Mean RMS error over the last epoch.
    pub training_error: f64,
    pub recent_average_error: f64,
    pub elapsed: Duration,
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new()
    }
}

impl Trainer {
    /// Creates a new Trainer instance.
    ///
    /// The trainer is initialized with some default values. These defaults are:
    ///
    /// * Stops after a single pass over the examples.
    /// * Logs on training completion.
    pub fn new() -> Self {
        Trainer {
            logging: Logging::Completion,
            stop_condition: StopCondition::Epochs(1),
        }
    }

    /// Sets the type of logging to be emitted during training.
    pub fn logging(mut self, logging: Logging) -> Self {
        self.logging = logging;
        self
    }

    /// Sets the condition to finish training.
    pub fn stop_condition<C>(mut self, condition: C) -> Self
    where
        C: Into<StopCondition>,
    {
        self.stop_condition = condition.into();
        self
    }

    /// Trains `network` on the provided labelled data.
    ///
    /// The provided `examples` should be a list of labelled data, where each
    /// element takes the form `(network input, expected output)`. Every
    /// sample is fed forward and immediately backpropagated.
    ///
    /// Returns an error, leaving the network untouched, if any example does
    /// not fit the network.
    pub fn train<I, O>(
        &self,
        network: &mut Network,
        examples: &[(I, O)],
    ) -> Result<TrainingSummary>
    where
        I: AsRef<[f64]>,
        O: AsRef<[f64]>,
    {
        validate(network, examples)?;

        let start_time = Instant::now();
        let mut passes = 0;
        let mut epochs = 0;
        let mut training_error;
        loop {
            training_error = 0.0;
            for (input, expected) in examples {
                let (input, expected) = (input.as_ref(), expected.as_ref());
                passes += 1;
                network.feed_forward(input);
                let outputs = network.results();
                network.back_prop(expected);
                training_error += network.error();
                self.logging.iteration(passes, input, &outputs, expected, network);
            }
            training_error /= examples.len() as f64;
            epochs += 1;

            if self
                .stop_condition
                .should_stop(epochs, training_error, start_time)
            {
                break;
            }
        }

        let summary = TrainingSummary {
            passes,
            epochs,
            training_error,
            recent_average_error: network.recent_average_error(),
            elapsed: start_time.elapsed(),
        };
        self.logging.completion(&summary);
        Ok(summary)
    }
}

/// Verifies that every example fits `network`.
fn validate<I, O>(network: &Network, examples: &[(I, O)]) -> Result<()>
where
    I: AsRef<[f64]>,
    O: AsRef<[f64]>,
{
    if examples.is_empty() {
        return Err(Error::NoExamples);
    }
    for (index, (input, output)) in examples.iter().enumerate() {
        let checks = [
            ("input", network.input_len(), input.as_ref().len()),
            ("target", network.output_len(), output.as_ref().len()),
        ];
        for &(kind, expected, actual) in &checks {
            if expected != actual {
                return Err(Error::SampleShape {
                    index,
                    kind,
                    expected,
                    actual,
                });
            }
        }
    }
    Ok(())
}

/// Logging frequency to use during training
#[derive(Copy, Clone, Debug)]
pub enum Logging {
    /// No logs will be emitted
    Silent,
    /// A summary will be logged at completion
    Completion,
    /// A summary will be logged at completion and the current sample every
    /// `n` passes
    Iterations(usize),
}

impl Logging {
    /// Performs logging at the current training `pass`.
    fn iteration(
        &self,
        pass: usize,
        inputs: &[f64],
        outputs: &[f64],
        targets: &[f64],
        network: &Network,
    ) {
        if let Logging::Iterations(freq) = *self {
            if freq > 0 && pass % freq == 0 {
                info!(
                    "Pass {}: inputs [{}] outputs [{}] targets [{}] recent average error {}",
                    pass,
                    inputs.iter().join(" "),
                    outputs.iter().join(" "),
                    targets.iter().join(" "),
                    network.recent_average_error()
                );
            }
        }
    }

    /// Performs logging at the end of training.
    fn completion(&self, summary: &TrainingSummary) {
        if let Logging::Silent = *self {
            return;
        }
        info!(
            "Ran {} passes ({} epochs) in {:.3} seconds, epoch error {}, recent average error {}",
            summary.passes,
            summary.epochs,
            summary.elapsed.as_secs_f64(),
            summary.training_error,
            summary.recent_average_error
        );
    }
}

/// When to stop training
#[derive(Copy, Clone, Debug)]
pub enum StopCondition {
    /// Stops after the provided number of passes over the examples
    Epochs(usize),
    /// Stops once the mean RMS error of an epoch drops below the provided
    /// threshold
    ErrorThreshold(f64),
    /// Stops after the provided duration
    Duration(Duration),
}

impl From<Duration> for StopCondition {
    fn from(duration: Duration) -> StopCondition {
        StopCondition::Duration(duration)
    }
}

impl StopCondition {
    /// Returns true if training is complete. Checked after every epoch.
    fn should_stop(&self, epochs: usize, training_error: f64, start_time: Instant) -> bool {
        use self::StopCondition::*;
        match *self {
            Epochs(limit) => epochs >= limit,
            ErrorThreshold(threshold) => training_error < threshold,
            Duration(duration) => start_time.elapsed() > duration,
        }
    }
}
