use crate::{
  activation::ActivationFunction,
  array::Array,
  error::{ Error, Result },
  function::ParameterizedFunction,
  init::Initializer,
  scalar::Number,
};

mod neuron;
mod backprop;

pub use neuron::{ Neuron, NeuronId, ActivationRecord };


/// Layered feed-forward graph of neurons.
///
/// Layer 0 holds the input neurons. Every other neuron is an
/// [AffineTransformation](crate::AffineTransformation) of neurons in earlier
/// layers, followed by an [ActivationFunction]. The last layer is the
/// network's output.
///
/// Neurons live in an arena and refer to each other by [NeuronId]. Each
/// computed neuron owns one trainable component, indexed in creation order.

#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNetwork<N: Number> {
  neurons: Vec<Neuron<N>>,
  layers: Vec<Vec<NeuronId>>,
  consumers: Vec<Vec<(NeuronId, usize)>>,
  components: Vec<NeuronId>,
  caching: bool,
}

impl<N: Number> NeuralNetwork<N> {
  /// A network consisting of `arity` input neurons only.
  pub fn new(arity: usize) -> Self {
    let neurons: Vec<_> = (0..arity).map(|i| Neuron::input(NeuronId(i)) ).collect();
    Self {
      layers: vec![neurons.iter().map(|n| n.id() ).collect()],
      consumers: vec![vec![]; arity],
      neurons,
      components: vec![],
      caching: false,
    }
  }

  /// Fully connected network with layer widths `widths`, the first of which
  /// is the arity.
  pub fn feed_forward(
    widths: &[usize],
    hidden: ActivationFunction,
    output: ActivationFunction,
  ) -> Result<Self> {
    let Some((&arity, rest)) = widths.split_first() else {
      return Err(Error::InvalidConfig("a network needs at least an input layer".to_string()))
    };
    let mut network = Self::new(arity);
    for (l, &width) in rest.iter().enumerate() {
      let activation = if l == rest.len() - 1 { output } else { hidden };
      network = network.dense(width, activation)?;
    }
    Ok(network)
  }

  /// Append a layer of `width` neurons, each connected to every neuron of
  /// the current last layer.
  pub fn dense(mut self, width: usize, activation: ActivationFunction) -> Result<Self> {
    let inputs = self.layers.last().cloned().unwrap_or_default();
    self.push_layer();
    for _ in 0..width {
      self.add_neuron(&inputs, activation)?;
    }
    Ok(self)
  }

  /// Open a new, empty output layer and return its index.
  pub fn push_layer(&mut self) -> usize {
    self.layers.push(vec![]);
    self.layers.len() - 1
  }

  /// Add a neuron to the last layer.
  ///
  /// All inputs must belong to earlier layers. Parameters start at zero.
  pub fn add_neuron(&mut self, inputs: &[NeuronId], activation: ActivationFunction) -> Result<NeuronId> {
    let layer = self.layers.len() - 1;
    if layer == 0 {
      return Err(Error::IllegalState("push a layer before adding computed neurons".to_string()))
    }
    for input in inputs {
      let source = self.neurons.get(input.0)
        .ok_or_else(|| Error::DimensionMismatch(format!("unknown input neuron {}", input.0)) )?;
      if source.layer() >= layer {
        return Err(Error::IllegalState(format!(
          "neuron {} in layer {} can't feed layer {layer}", input.0, source.layer()
        )))
      }
    }

    let id = NeuronId(self.neurons.len());
    let mut neuron = Neuron::computed(id, layer, inputs.to_vec(), activation, self.components.len());
    neuron.set_caching(self.caching);
    for (i, input) in inputs.iter().enumerate() {
      self.consumers[input.0].push((id, i));
    }
    self.neurons.push(neuron);
    self.consumers.push(vec![]);
    self.components.push(id);
    self.layers[layer].push(id);
    Ok(id)
  }

  pub fn arity(&self) -> usize {
    self.layers[0].len()
  }

  pub fn co_arity(&self) -> usize {
    self.output_layer().len()
  }

  pub fn layer_count(&self) -> usize {
    self.layers.len()
  }

  pub fn width(&self, layer: usize) -> Option<usize> {
    self.layers.get(layer).map(|l| l.len() )
  }

  pub fn layer(&self, layer: usize) -> Option<&[NeuronId]> {
    self.layers.get(layer).map(|l| l.as_slice() )
  }

  pub(crate) fn output_layer(&self) -> &[NeuronId] {
    self.layers.last().map(|l| l.as_slice() ).unwrap_or(&[])
  }

  /// Panics if `id` doesn't belong to this network.
  pub fn neuron(&self, id: NeuronId) -> &Neuron<N> {
    &self.neurons[id.0]
  }

  /// Downstream neurons of `id` and the position `id` takes among their inputs.
  pub fn consumers(&self, id: NeuronId) -> &[(NeuronId, usize)] {
    &self.consumers[id.0]
  }

  /// Trainable neurons in component order.
  pub fn components(&self) -> &[NeuronId] {
    &self.components
  }

  /// Call `cb` once for every trainable neuron, in component order.
  pub fn visit(&mut self, mut cb: impl FnMut(&mut Neuron<N>) -> Result<()>) -> Result<()> {
    for id in &self.components {
      cb(&mut self.neurons[id.0])?;
    }
    Ok(())
  }

  /// Draw fresh parameters for every trainable neuron.
  pub fn initialize(&mut self, initializer: &mut impl Initializer<N>) -> Result<()> {
    let fan_outs: Vec<_> = self.components.iter()
      .map(|id| self.consumers[id.0].len().max(1) )
      .collect();
    let mut fan_outs = fan_outs.into_iter();
    self.visit(|neuron| {
      let fan_out = fan_outs.next().unwrap_or(1);
      if let Some(function) = neuron.function_mut() {
        initializer.weights(&function.weights(), fan_out)?;
        function.set_bias(initializer.bias()?);
      }
      Ok(())
    })
  }

  /// Live view of the parameters of `component`, laid out as `[bias, weights…]`.
  pub fn parameters(&self, component: usize) -> Result<Array<N>> {
    let id = self.components.get(component)
      .ok_or_else(|| Error::mismatch("component index bound", self.components.len(), component) )?;
    self.neurons[id.0].function()
      .map(|function| function.parameters() )
      .ok_or_else(|| Error::IllegalState(format!("neuron {} is not trainable", id.0)) )
  }

  pub fn set_parameters(&mut self, component: usize, values: &Array<N>) -> Result<()> {
    self.parameters(component)?.assign(values)
  }

  pub fn is_caching(&self) -> bool {
    self.caching
  }

  /// Turn activation recording on or off for all neurons. Turning it off
  /// drops all pending records.
  pub fn set_caching(&mut self, caching: bool) {
    self.caching = caching;
    for neuron in &mut self.neurons {
      neuron.set_caching(caching);
    }
  }

  /// Activation records not yet consumed by a backward pass.
  pub fn pending_activations(&self) -> usize {
    self.neurons.iter().map(|n| n.pending_activations() ).sum()
  }

  pub fn clear_caches(&mut self) {
    for neuron in &mut self.neurons {
      neuron.clear_cache();
    }
  }

  /// Forward pass.
  pub fn evaluate(&mut self, features: &Array<N>) -> Result<Array<N>> {
    features.check_len(self.arity(), "network features")?;
    for neuron in &mut self.neurons {
      neuron.deactivate();
    }
    for (i, value) in features.iter().enumerate() {
      self.neurons[i].feed(value)?;
    }
    for l in 1..self.layers.len() {
      for k in 0..self.layers[l].len() {
        let id = self.layers[l][k];
        let inputs = self.neurons[id.0].inputs().iter()
          .map(|input| self.neurons[input.0].output() )
          .collect::<Result<Vec<_>>>()?;
        self.neurons[id.0].activate(&Array::from_vec(inputs))?;
      }
    }
    let outputs = self.output_layer().iter()
      .map(|id| self.neurons[id.0].output() )
      .collect::<Result<Vec<_>>>()?;
    Ok(Array::from_vec(outputs))
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::init::Constant;

  fn xor_network() -> NeuralNetwork<f64> {
    let mut network = NeuralNetwork::feed_forward(
      &[2, 2, 1], ActivationFunction::Relu, ActivationFunction::Identity,
    ).unwrap();
    network.set_parameters(0, &Array::vec(&[0.0, 1.0, 1.0])).unwrap();
    network.set_parameters(1, &Array::vec(&[-1.0, 1.0, 1.0])).unwrap();
    network.set_parameters(2, &Array::vec(&[0.0, 1.0, -2.0])).unwrap();
    network
  }

  #[test]
  fn topology() {
    let network = xor_network();
    assert_eq!((network.arity(), network.co_arity(), network.layer_count()), (2, 1, 3));
    assert_eq!(network.width(1), Some(2));
    assert_eq!(network.components().len(), 3);
    let output = network.layer(2).unwrap()[0];
    assert_eq!(network.neuron(output).inputs(), network.layer(1).unwrap());
    let hidden = network.layer(1).unwrap()[1];
    assert_eq!(network.consumers(hidden), &[(output, 1)]);
    assert_eq!(network.neuron(hidden).component(), Some(1));
  }

  #[test]
  fn forward_pass() {
    let mut network = xor_network();
    let outputs: Vec<f64> = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]].iter()
      .map(|x| network.evaluate(&Array::vec(x)).unwrap().get(0) )
      .collect();
    assert_eq!(outputs, vec![0.0, 1.0, 1.0, 0.0]);
    assert!(matches!(network.evaluate(&Array::vec(&[1.0])), Err(Error::DimensionMismatch(_))));
  }

  #[test]
  fn caching_records_every_evaluation() {
    let mut network = xor_network();
    network.set_caching(true);
    network.evaluate(&Array::vec(&[0.0, 1.0])).unwrap();
    network.evaluate(&Array::vec(&[1.0, 1.0])).unwrap();
    assert_eq!(network.pending_activations(), 6);
    network.clear_caches();
    assert_eq!(network.pending_activations(), 0);
    network.set_caching(false);
    network.evaluate(&Array::vec(&[0.0, 1.0])).unwrap();
    assert_eq!(network.pending_activations(), 0);
  }

  #[test]
  fn skip_connections() {
    let mut network = NeuralNetwork::<f64>::new(2);
    let inputs = network.layer(0).unwrap().to_vec();
    assert!(network.add_neuron(&inputs, ActivationFunction::Identity).is_err());
    network.push_layer();
    let hidden = network.add_neuron(&inputs[..1], ActivationFunction::Identity).unwrap();
    assert!(network.add_neuron(&[hidden], ActivationFunction::Identity).is_err());
    network.push_layer();
    let output = network.add_neuron(&[hidden, inputs[1]], ActivationFunction::Identity).unwrap();
    network.set_parameters(0, &Array::vec(&[1.0, 2.0])).unwrap();
    network.set_parameters(1, &Array::vec(&[0.0, 1.0, 10.0])).unwrap();
    assert_eq!(network.evaluate(&Array::vec(&[3.0, 4.0])).unwrap().to_vec(), vec![47.0]);
    assert_eq!(network.neuron(output).layer(), 2);
  }

  #[test]
  fn initialize_visits_every_component() {
    let mut network = NeuralNetwork::<f64>::feed_forward(
      &[3, 4, 2], ActivationFunction::Tanh, ActivationFunction::Sigmoid,
    ).unwrap();
    network.initialize(&mut Constant::new(0.5, 0.25)).unwrap();
    for c in 0..network.components().len() {
      let parameters = network.parameters(c).unwrap();
      assert_eq!(parameters.get(0), 0.25);
      assert!(parameters.iter().skip(1).all(|w| w == 0.5 ));
    }
    assert!(network.parameters(6).is_err());
  }

  #[test]
  fn empty_widths() {
    assert!(matches!(
      NeuralNetwork::<f64>::feed_forward(&[], ActivationFunction::Relu, ActivationFunction::Relu),
      Err(Error::InvalidConfig(_))
    ));
  }
}
