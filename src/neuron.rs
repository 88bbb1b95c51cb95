//! Single neurons and the connections they own.

use crate::config::NetConfig;
use crate::layer::Layer;
use crate::transfer::{transfer, transfer_derivative};

use rand::Rng;

/// One directed edge to a neuron in the next layer.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Connection {
    pub weight: f64,
    /// The change applied by the most recent update, used for momentum.
    pub delta_weight: f64,
}

/// A neuron with its outbound connections.
///
/// A neuron never references other neurons. Upstream neurons reach the
/// connection that targets this one through `output_weights[index]`.
#[derive(Clone, Debug)]
pub struct Neuron {
    output: f64,
    gradient: f64,
    output_weights: Vec<Connection>,
    index: usize,
}

impl Neuron {
    /// Creates a neuron at position `index` in its layer, with `num_outputs`
    /// connections whose weights are drawn uniformly from `[0, 1)`.
    pub fn new<R: Rng + ?Sized>(num_outputs: usize, index: usize, rng: &mut R) -> Self {
        let output_weights = (0..num_outputs)
            .map(|_| Connection {
                weight: rng.gen::<f64>(),
                delta_weight: 0.0,
            })
            .collect();
        Neuron {
            output: 0.0,
            gradient: 0.0,
            output_weights,
            index,
        }
    }

    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn set_output(&mut self, value: f64) {
        self.output = value;
    }

    pub fn gradient(&self) -> f64 {
        self.gradient
    }

    /// Position of this neuron within its own layer.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn output_weights(&self) -> &[Connection] {
        &self.output_weights
    }

    pub fn output_weights_mut(&mut self) -> &mut [Connection] {
        &mut self.output_weights
    }

    /// Sums the previous layer's outputs, bias included, weighted by the
    /// connections that target this neuron, and activates the result.
    pub fn feed_forward(&mut self, prev_layer: &Layer) {
        let sum: f64 = prev_layer
            .neurons()
            .iter()
            .map(|n| n.output * n.output_weights[self.index].weight)
            .sum();
        self.output = transfer(sum);
    }

    pub fn calc_output_gradients(&mut self, target: f64) {
        let delta = target - self.output;
        self.gradient = delta * transfer_derivative(self.output);
    }

    /// Requires the gradients of `next_layer` to be current.
    pub fn calc_hidden_gradients(&mut self, next_layer: &Layer) {
        let dow = self.sum_dow(next_layer);
        self.gradient = dow * transfer_derivative(self.output);
    }

    /// Adjusts every connection in `prev_layer` that feeds this neuron,
    /// including the one from its bias neuron.
    pub fn update_input_weights(&self, prev_layer: &mut Layer, config: &NetConfig) {
        for neuron in prev_layer.neurons_mut() {
            let source = neuron.output;
            let conn = &mut neuron.output_weights[self.index];
            let delta = config.eta * source * self.gradient + config.alpha * conn.delta_weight;
            conn.delta_weight = delta;
            conn.weight += delta;
        }
    }

    /// Sum of our contributions to the errors at the neurons we feed.
    fn sum_dow(&self, next_layer: &Layer) -> f64 {
        next_layer
            .units()
            .iter()
            .zip(&self.output_weights)
            .map(|(n, conn)| conn.weight * n.gradient)
            .sum()
    }
}
