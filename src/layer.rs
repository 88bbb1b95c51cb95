use crate::neuron::Neuron;

use rand::Rng;

/// One layer of the network.
///
/// Holds `width + 1` neurons: the last one is a bias neuron whose output is
/// pinned to 1.0. The bias neuron feeds the next layer like any other
/// neuron, but it is never activated and never receives a gradient.
#[derive(Clone, Debug)]
pub struct Layer {
    neurons: Vec<Neuron>,
}

impl Layer {
    /// Initializes a new, untrained layer.
    ///
    /// Arguments:
    ///
    ///  * `width` - the number of neurons, not counting the bias neuron.
    ///  * `num_outputs` - the width of the next layer, or 0 for the output
    ///                    layer.
    pub fn new<R: Rng + ?Sized>(width: usize, num_outputs: usize, rng: &mut R) -> Self {
        let mut neurons: Vec<Neuron> = (0..=width)
            .map(|index| Neuron::new(num_outputs, index, rng))
            .collect();
        if let Some(bias) = neurons.last_mut() {
            bias.set_output(1.0);
        }
        Layer { neurons }
    }

    /// Returns the number of neurons, bias included.
    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    /// Always false: every layer holds at least its bias neuron.
    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    /// Returns the number of neurons, not counting the bias neuron.
    pub fn width(&self) -> usize {
        self.neurons.len() - 1
    }

    /// All neurons, bias last.
    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub(crate) fn neurons_mut(&mut self) -> &mut [Neuron] {
        &mut self.neurons
    }

    /// The neurons that are activated and trained, i.e. all but the bias.
    pub fn units(&self) -> &[Neuron] {
        let width = self.width();
        &self.neurons[..width]
    }

    pub(crate) fn units_mut(&mut self) -> &mut [Neuron] {
        let width = self.width();
        &mut self.neurons[..width]
    }

    pub fn bias(&self) -> &Neuron {
        &self.neurons[self.width()]
    }

    pub(crate) fn bias_mut(&mut self) -> &mut Neuron {
        let width = self.width();
        &mut self.neurons[width]
    }

    /// Outputs of the non-bias neurons, in order.
    pub fn outputs(&self) -> Vec<f64> {
        self.units().iter().map(Neuron::output).collect()
    }
}
