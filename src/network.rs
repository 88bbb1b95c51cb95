//! A fully connected [feedforward neural network]
//! (https://en.wikipedia.org/wiki/Feedforward_neural_network) trained one
//! sample at a time by backpropagation with momentum.
//!
//! # Example
//!
//! Let's teach a small network to map a single input to a target:
//!
//! ```
//! # use netprop::{NetConfig, Network};
//! let mut network = Network::new(&[2, 3, 1], NetConfig::default()).unwrap();
//!
//! for _ in 0..500 {
//!     network.feed_forward(&[1.0, 0.0]);
//!     network.back_prop(&[0.5]);
//! }
//!
//! network.feed_forward(&[1.0, 0.0]);
//! let out = network.results();
//! assert_eq!(out.len(), 1);
//! assert!((out[0] - 0.5).abs() < 0.05);
//! ```

use crate::config::NetConfig;
use crate::error::{Error, Result};
use crate::layer::Layer;

use itertools::Itertools;
use rand::Rng;
use tracing::debug;

/// A feedforward neural network with one bias neuron per layer.
#[derive(Clone, Debug)]
pub struct Network {
    topology: Vec<usize>,
    layers: Vec<Layer>,
    config: NetConfig,
    error: f64,
    recent_average_error: f64,
}

impl Network {
    /// Creates a new, untrained network with weights drawn from the thread
    /// local generator.
    ///
    /// Arguments:
    ///  * `topology` - the number of neurons in each layer, bias excluded.
    ///                 Must contain at least an input and an output layer.
    ///  * `config` - learning rate, momentum and error smoothing.
    pub fn new(topology: &[usize], config: NetConfig) -> Result<Self> {
        Self::with_rng(topology, config, &mut rand::thread_rng())
    }

    /// Like `new`, drawing initial weights from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(
        topology: &[usize],
        config: NetConfig,
        rng: &mut R,
    ) -> Result<Self> {
        validate_topology(topology)?;
        config.validate()?;

        let mut layers = Vec::with_capacity(topology.len());
        for (i, &width) in topology.iter().enumerate() {
            let num_outputs = topology.get(i + 1).copied().unwrap_or(0);
            layers.push(Layer::new(width, num_outputs, rng));
        }
        debug!(topology = %topology.iter().join(" "), ?config, "built network");

        Ok(Network {
            topology: topology.to_vec(),
            layers,
            config,
            error: 0.0,
            recent_average_error: 0.0,
        })
    }

    pub fn topology(&self) -> &[usize] {
        &self.topology
    }

    /// Returns the size of the input layer to the network.
    pub fn input_len(&self) -> usize {
        self.topology[0]
    }

    /// Returns the size of the output layer from the network.
    pub fn output_len(&self) -> usize {
        self.topology[self.topology.len() - 1]
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    /// Latches `inputs` into the input layer and propagates activations
    /// through every following layer.
    ///
    /// # Panics
    ///
    /// Panics if `inputs` does not match the input layer size.
    pub fn feed_forward(&mut self, inputs: &[f64]) {
        assert_eq!(inputs.len(), self.input_len(), "input length mismatch");
        for (neuron, &value) in self.layers[0].units_mut().iter_mut().zip(inputs) {
            neuron.set_output(value);
        }
        for i in 1..self.layers.len() {
            let (prev, layer) = mut_layers(&mut self.layers, i - 1);
            for neuron in layer.units_mut() {
                neuron.feed_forward(prev);
            }
        }
    }

    /// Trains the network towards `targets` using the activations left by
    /// the last `feed_forward`.
    ///
    /// # Panics
    ///
    /// Panics if `targets` does not match the output layer size.
    pub fn back_prop(&mut self, targets: &[f64]) {
        assert_eq!(targets.len(), self.output_len(), "target length mismatch");
        self.update_error(targets);
        self.calc_output_gradients(targets);
        self.calc_hidden_gradients();
        self.update_weights();
    }

    /// Feeds `inputs` forward and returns the output layer.
    pub fn run(&mut self, inputs: &[f64]) -> Vec<f64> {
        self.feed_forward(inputs);
        self.results()
    }

    /// Returns the output layer activations from the last `feed_forward`.
    pub fn results(&self) -> Vec<f64> {
        self.layers[self.layers.len() - 1].outputs()
    }

    /// RMS output error of the last `back_prop` sample.
    pub fn error(&self) -> f64 {
        self.error
    }

    /// Exponentially smoothed RMS error over recent samples.
    pub fn recent_average_error(&self) -> f64 {
        self.recent_average_error
    }

    fn update_error(&mut self, targets: &[f64]) {
        let output = &self.layers[self.layers.len() - 1];
        let sum: f64 = output
            .units()
            .iter()
            .zip(targets)
            .map(|(n, t)| (t - n.output()).powi(2))
            .sum();
        self.error = (sum / output.width() as f64).sqrt();

        let k = self.config.smoothing_window;
        self.recent_average_error = (self.recent_average_error * k + self.error) / (k + 1.0);
    }

    fn calc_output_gradients(&mut self, targets: &[f64]) {
        let last = self.layers.len() - 1;
        for (neuron, &target) in self.layers[last].units_mut().iter_mut().zip(targets) {
            neuron.calc_output_gradients(target);
        }
    }

    /// Hidden gradients depend on the next layer's, so this must walk from
    /// the last hidden layer down to the first.
    fn calc_hidden_gradients(&mut self) {
        for i in (1..self.layers.len() - 1).rev() {
            self.calc_layer_gradients(i);
        }
    }

    fn calc_layer_gradients(&mut self, i: usize) {
        let (hidden, next) = mut_layers(&mut self.layers, i);
        for neuron in hidden.units_mut() {
            neuron.calc_hidden_gradients(next);
        }
    }

    /// Updates the weights feeding every layer but the input layer. Only
    /// connections change here, so every update sees the same activations.
    fn update_weights(&mut self) {
        let config = self.config;
        for i in (1..self.layers.len()).rev() {
            let (prev, layer) = mut_layers(&mut self.layers, i - 1);
            for neuron in layer.units() {
                neuron.update_input_weights(prev, &config);
            }
        }
    }
}

/// Returns an error unless `topology` has at least two layers, none empty.
pub fn validate_topology(topology: &[usize]) -> Result<()> {
    if topology.len() < 2 {
        return Err(Error::TopologyTooShort(topology.len()));
    }
    if let Some(i) = topology.iter().position(|&width| width == 0) {
        return Err(Error::EmptyLayer(i));
    }
    Ok(())
}

/// Gets mutable access to layer `i` and the layer after it.
fn mut_layers(layers: &mut [Layer], i: usize) -> (&mut Layer, &mut Layer) {
    let (before, after) = layers[i..].split_at_mut(1);
    (&mut before[0], &mut after[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded(topology: &[usize], seed: u64) -> Network {
        let mut rng = StdRng::seed_from_u64(seed);
        Network::with_rng(topology, NetConfig::default(), &mut rng).unwrap()
    }

    fn fill_weights(network: &mut Network, weight: f64, delta_weight: f64) {
        for layer in network.layers_mut() {
            for neuron in layer.neurons_mut() {
                for conn in neuron.output_weights_mut() {
                    conn.weight = weight;
                    conn.delta_weight = delta_weight;
                }
            }
        }
    }

    #[test]
    fn too_few_layers() {
        assert!(matches!(
            Network::new(&[3], NetConfig::default()),
            Err(Error::TopologyTooShort(1))
        ));
        assert!(Network::new(&[], NetConfig::default()).is_err());
    }

    #[test]
    fn empty_layer() {
        assert!(matches!(
            Network::new(&[2, 0, 1], NetConfig::default()),
            Err(Error::EmptyLayer(1))
        ));
    }

    #[test]
    fn invalid_config() {
        let config = NetConfig::default().eta(-1.0);
        assert!(Network::new(&[2, 1], config).is_err());
    }

    #[test]
    fn layer_shapes() {
        let network = seeded(&[2, 2, 1], 0);
        let sizes: Vec<usize> = network.layers().iter().map(Layer::len).collect();
        assert_eq!(sizes, vec![3, 3, 2]);
        assert_eq!(network.input_len(), 2);
        assert_eq!(network.output_len(), 1);

        let expected_outputs = [2, 1, 0];
        for (layer, &outputs) in network.layers().iter().zip(&expected_outputs) {
            for neuron in layer.neurons() {
                assert_eq!(neuron.output_weights().len(), outputs);
            }
        }
    }

    #[test]
    fn bias_stays_pinned() {
        let mut network = seeded(&[2, 3, 2], 1);
        for layer in network.layers() {
            assert_eq!(layer.bias().output(), 1.0);
        }
        for i in 0..20 {
            let x = i as f64 / 10.0;
            network.feed_forward(&[x, -x]);
            network.back_prop(&[0.5, -0.5]);
        }
        for layer in network.layers() {
            assert_eq!(layer.bias().output(), 1.0);
        }
    }

    #[test]
    fn feed_forward_composes_layers() {
        let mut network = seeded(&[2, 2, 1], 2);
        fill_weights(&mut network, 1.0, 0.0);
        network.feed_forward(&[1.0, 0.0]);

        // The input bias contributes 1.0 to each hidden neuron.
        let hidden = (1.0f64 * 1.0 + 0.0 * 1.0 + 1.0 * 1.0).tanh();
        let expected = (hidden * 1.0 + hidden * 1.0 + 1.0 * 1.0).tanh();
        assert_relative_eq!(network.results()[0], expected, epsilon = 1e-15);
    }

    #[test]
    fn feed_forward_without_input_bias() {
        let mut network = seeded(&[2, 2, 1], 2);
        fill_weights(&mut network, 1.0, 0.0);
        for conn in network.layers_mut()[0].bias_mut().output_weights_mut() {
            conn.weight = 0.0;
        }
        network.feed_forward(&[1.0, 0.0]);

        let expected = (1.0f64.tanh() * 1.0 + 1.0f64.tanh() * 1.0 + 1.0 * 1.0).tanh();
        assert_relative_eq!(network.results()[0], expected, epsilon = 1e-15);
    }

    #[test]
    #[should_panic(expected = "input length mismatch")]
    fn wrong_input_size() {
        let mut network = seeded(&[2, 2, 1], 3);
        network.feed_forward(&[1.0]);
    }

    #[test]
    #[should_panic(expected = "target length mismatch")]
    fn wrong_target_size() {
        let mut network = seeded(&[2, 2, 1], 3);
        network.feed_forward(&[1.0, 1.0]);
        network.back_prop(&[1.0, 0.0]);
    }

    #[test]
    fn results_are_a_snapshot() {
        let mut network = seeded(&[3, 4, 2], 4);
        network.feed_forward(&[0.1, 0.2, 0.3]);
        let first = network.results();
        assert_eq!(first, network.results());
        assert_eq!(first, network.run(&[0.1, 0.2, 0.3]));
    }

    #[test]
    fn weight_update_arithmetic() {
        let mut network = seeded(&[2, 2, 1], 5);
        fill_weights(&mut network, 1.0, 0.1);
        network.feed_forward(&[1.0, -0.5]);
        let before = network.clone();
        network.back_prop(&[0.25]);

        let config = *network.config();
        for i in 1..network.layers().len() {
            for target in network.layers()[i].units() {
                let k = target.index();
                for (old, new) in before.layers()[i - 1]
                    .neurons()
                    .iter()
                    .zip(network.layers()[i - 1].neurons())
                {
                    // Activations are untouched by back_prop.
                    assert_eq!(old.output(), new.output());
                    let delta = config.eta * old.output() * target.gradient() + config.alpha * 0.1;
                    let conn = new.output_weights()[k];
                    assert_relative_eq!(conn.delta_weight, delta, epsilon = 1e-15);
                    assert_relative_eq!(conn.weight, 1.0 + delta, epsilon = 1e-15);
                }
            }
        }
    }

    #[test]
    fn gradients_follow_chain_rule() {
        let mut network = seeded(&[2, 2, 1], 6);
        fill_weights(&mut network, 0.5, 0.0);
        network.feed_forward(&[0.3, 0.9]);
        network.back_prop(&[-0.2]);

        let out = &network.layers()[2].units()[0];
        let out_grad = (-0.2 - out.output()) * (1.0 - out.output().powi(2));
        assert_relative_eq!(out.gradient(), out_grad, epsilon = 1e-15);

        // Hidden gradients use the weights as they were before the update.
        for hidden in network.layers()[1].units() {
            let expected = 0.5 * out_grad * (1.0 - hidden.output().powi(2));
            assert_relative_eq!(hidden.gradient(), expected, epsilon = 1e-15);
        }
    }

    #[test]
    fn hidden_gradients_must_run_back_to_front() {
        let targets = [0.7];
        let mut ordered = seeded(&[2, 3, 3, 1], 7);
        ordered.feed_forward(&[0.4, -0.8]);
        let mut shuffled = ordered.clone();

        ordered.calc_output_gradients(&targets);
        ordered.calc_hidden_gradients();

        shuffled.calc_output_gradients(&targets);
        shuffled.calc_layer_gradients(1);
        shuffled.calc_layer_gradients(2);

        let grads = |n: &Network, i: usize| -> Vec<f64> {
            n.layers()[i].units().iter().map(|u| u.gradient()).collect()
        };
        assert_eq!(grads(&ordered, 2), grads(&shuffled, 2));
        assert_ne!(grads(&ordered, 1), grads(&shuffled, 1));
        assert!(grads(&ordered, 1).iter().all(|&g| g != 0.0));

        ordered.update_weights();
        shuffled.update_weights();
        let first = ordered.layers()[0].neurons()[0].output_weights()[0].weight;
        let other = shuffled.layers()[0].neurons()[0].output_weights()[0].weight;
        assert_ne!(first, other);
    }

    #[test]
    fn recent_error_smoothing() {
        let mut network = seeded(&[1, 2], 8);
        network.feed_forward(&[0.5]);
        let outputs = network.results();
        network.back_prop(&[0.0, 0.0]);

        let rms = ((outputs[0].powi(2) + outputs[1].powi(2)) / 2.0).sqrt();
        assert_relative_eq!(network.error(), rms);
        assert_relative_eq!(network.recent_average_error(), rms / 101.0);
    }

    #[test]
    fn smoothing_window_is_per_network() {
        let mut rng = StdRng::seed_from_u64(9);
        let config = NetConfig::default().smoothing_window(0.0);
        let mut fast = Network::with_rng(&[1, 1], config, &mut rng).unwrap();
        let mut slow = seeded(&[1, 1], 9);
        for network in vec![&mut fast, &mut slow] {
            network.feed_forward(&[1.0]);
            network.back_prop(&[-1.0]);
        }
        assert_eq!(fast.recent_average_error(), fast.error());
        assert!(slow.recent_average_error() < slow.error());
    }

    #[test]
    fn recent_error_decreases_on_fixed_sample() {
        let mut network = seeded(&[2, 3, 1], 10);
        let mut history = Vec::new();
        for _ in 0..1000 {
            network.feed_forward(&[1.0, 0.0]);
            network.back_prop(&[0.5]);
            history.push(network.recent_average_error());
        }
        for pair in history[200..].windows(2) {
            assert!(pair[1] < pair[0], "{} !< {}", pair[1], pair[0]);
        }
        assert!(network.error() < 1e-3);
    }

    #[test]
    fn zero_learning_rate_freezes_weights() {
        let mut rng = StdRng::seed_from_u64(11);
        let config = NetConfig::default().eta(0.0);
        let mut network = Network::with_rng(&[2, 2, 1], config, &mut rng).unwrap();
        let before = network.clone();
        network.feed_forward(&[1.0, 1.0]);
        network.back_prop(&[0.0]);
        for (old, new) in before.layers().iter().zip(network.layers()) {
            for (a, b) in old.neurons().iter().zip(new.neurons()) {
                assert_eq!(a.output_weights(), b.output_weights());
            }
        }
    }
}
