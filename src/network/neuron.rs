use std::collections::VecDeque;

use crate::{
  activation::ActivationFunction,
  array::Array,
  error::{ Error, Result },
  function::{ AffineTransformation, ParameterizedFunction },
  scalar::Number,
  vector::Vector,
};


/// Stable index of a neuron inside its [NeuralNetwork](crate::NeuralNetwork).

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NeuronId(pub(crate) usize);

impl NeuronId {
  pub fn index(&self) -> usize {
    self.0
  }
}


/// Everything the backward pass needs to know about one forward activation.

#[derive(Debug, Clone, PartialEq)]
pub struct ActivationRecord<N: Number> {
  pub inputs: Array<N>,
  pub output: N,
  /// `∂output/∂parameter` at this sample, before the error signal is known.
  pub raw_gradient: Vector<N>,
}


#[derive(Debug, Clone, PartialEq)]
enum State<N: Number> {
  Inactive,
  Activated { logit: N, output: N },
}


#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Kind<N: Number> {
  Input,
  Computed {
    function: AffineTransformation<N>,
    activation: ActivationFunction,
    inputs: Vec<NeuronId>,
    component: usize,
  },
}


#[derive(Debug, Clone, PartialEq)]
pub struct Neuron<N: Number> {
  id: NeuronId,
  layer: usize,
  kind: Kind<N>,
  state: State<N>,
  cache: Option<VecDeque<ActivationRecord<N>>>,
}

impl<N: Number> Neuron<N> {
  pub(crate) fn input(id: NeuronId) -> Self {
    Self { id, layer: 0, kind: Kind::Input, state: State::Inactive, cache: None }
  }

  pub(crate) fn computed(
    id: NeuronId,
    layer: usize,
    inputs: Vec<NeuronId>,
    activation: ActivationFunction,
    component: usize,
  ) -> Self {
    let function = AffineTransformation::zeros(inputs.len());
    Self {
      id,
      layer,
      kind: Kind::Computed { function, activation, inputs, component },
      state: State::Inactive,
      cache: None,
    }
  }

  pub fn id(&self) -> NeuronId {
    self.id
  }

  pub fn layer(&self) -> usize {
    self.layer
  }

  pub fn is_input(&self) -> bool {
    matches!(self.kind, Kind::Input)
  }

  /// Neurons feeding this one, in weight order.
  pub fn inputs(&self) -> &[NeuronId] {
    match &self.kind {
      Kind::Input => &[],
      Kind::Computed { inputs, .. } => inputs,
    }
  }

  /// Index of this neuron's parameters among the network's trainable components.
  pub fn component(&self) -> Option<usize> {
    match &self.kind {
      Kind::Input => None,
      Kind::Computed { component, .. } => Some(*component),
    }
  }

  pub fn activation(&self) -> Option<ActivationFunction> {
    match &self.kind {
      Kind::Input => None,
      Kind::Computed { activation, .. } => Some(*activation),
    }
  }

  pub fn function(&self) -> Option<&AffineTransformation<N>> {
    match &self.kind {
      Kind::Input => None,
      Kind::Computed { function, .. } => Some(function),
    }
  }

  pub fn function_mut(&mut self) -> Option<&mut AffineTransformation<N>> {
    match &mut self.kind {
      Kind::Input => None,
      Kind::Computed { function, .. } => Some(function),
    }
  }

  /// Weight of the connection at input position `i`.
  pub(crate) fn weight(&self, i: usize) -> Result<N> {
    let function = self.function().ok_or_else(|| self.input_error("has no weights") )?;
    let weights = function.weights();
    if i >= weights.len() { return Err(Error::mismatch("weight index bound", weights.len(), i)) }
    Ok(weights.get(i))
  }

  fn input_error(&self, what: &str) -> Error {
    Error::IllegalState(format!("input neuron {} {what}", self.id.0))
  }

  pub fn is_active(&self) -> bool {
    matches!(self.state, State::Activated { .. })
  }

  pub fn logit(&self) -> Result<N> {
    match &self.state {
      State::Activated { logit, .. } => Ok(logit.clone()),
      State::Inactive => Err(Error::IllegalState(format!("neuron {} has not been activated", self.id.0))),
    }
  }

  pub fn output(&self) -> Result<N> {
    match &self.state {
      State::Activated { output, .. } => Ok(output.clone()),
      State::Inactive => Err(Error::IllegalState(format!("neuron {} has not been activated", self.id.0))),
    }
  }

  /// Set the value of an input neuron.
  pub fn feed(&mut self, value: N) -> Result<()> {
    if !self.is_input() {
      return Err(Error::IllegalState(format!("neuron {} is computed and can't be fed", self.id.0)))
    }
    self.state = State::Activated { logit: value.clone(), output: value };
    Ok(())
  }

  /// Compute the output from the given input values.
  ///
  /// Does nothing if the neuron is already active. Caching neurons record
  /// one [ActivationRecord] per effective activation.
  pub fn activate(&mut self, inputs: &Array<N>) -> Result<()> {
    if self.is_active() { return Ok(()) }
    let Kind::Computed { function, activation, .. } = &self.kind else {
      return Err(self.input_error("must be fed before use"))
    };
    let logit = function.estimate(inputs)?;
    let output = activation.run(&logit)?;
    if let Some(cache) = &mut self.cache {
      let slope = activation.derive(&output)?;
      let raw_gradient = function.gradient(inputs)?.scale(&slope);
      cache.push_back(ActivationRecord { inputs: inputs.clone(), output: output.clone(), raw_gradient });
    }
    self.state = State::Activated { logit, output };
    Ok(())
  }

  pub fn deactivate(&mut self) {
    self.state = State::Inactive;
  }

  pub fn is_caching(&self) -> bool {
    self.cache.is_some()
  }

  /// Disabling the cache drops all pending records.
  pub fn set_caching(&mut self, caching: bool) {
    match (caching, &self.cache) {
      (true, None) => self.cache = Some(VecDeque::new()),
      (false, Some(_)) => self.cache = None,
      _ => {},
    }
  }

  pub fn pending_activations(&self) -> usize {
    self.cache.as_ref().map(|cache| cache.len() ).unwrap_or(0)
  }

  pub fn clear_cache(&mut self) {
    if let Some(cache) = &mut self.cache {
      cache.clear();
    }
  }

  /// Remove the oldest unconsumed activation record.
  pub fn pop_activation(&mut self) -> Result<ActivationRecord<N>> {
    let id = self.id.0;
    let cache = self.cache.as_mut()
      .ok_or_else(|| Error::IllegalState(format!("neuron {id} doesn't cache activations")) )?;
    cache.pop_front()
      .ok_or_else(|| Error::IllegalState(format!("neuron {id} has no pending activation")) )
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn neuron() -> Neuron<f64> {
    let mut neuron = Neuron::computed(NeuronId(2), 1, vec![NeuronId(0), NeuronId(1)], ActivationFunction::Relu, 0);
    neuron.function_mut().unwrap().set_parameters(&Array::vec(&[0.5, 1.0, -1.0])).unwrap();
    neuron
  }

  #[test]
  fn state_machine() {
    let mut neuron = neuron();
    assert!(matches!(neuron.output(), Err(Error::IllegalState(_))));
    neuron.activate(&Array::vec(&[3.0, 1.0])).unwrap();
    assert_eq!(neuron.logit(), Ok(2.5));
    assert_eq!(neuron.output(), Ok(2.5));
    neuron.activate(&Array::vec(&[0.0, 0.0])).unwrap();
    assert_eq!(neuron.output(), Ok(2.5));
    neuron.deactivate();
    neuron.activate(&Array::vec(&[0.0, 1.0])).unwrap();
    assert_eq!(neuron.logit(), Ok(-0.5));
    assert_eq!(neuron.output(), Ok(0.0));
  }

  #[test]
  fn caching_records_once_per_activation() {
    let mut neuron = neuron();
    neuron.set_caching(true);
    neuron.activate(&Array::vec(&[3.0, 1.0])).unwrap();
    neuron.activate(&Array::vec(&[3.0, 1.0])).unwrap();
    neuron.deactivate();
    neuron.activate(&Array::vec(&[0.0, 1.0])).unwrap();
    assert_eq!(neuron.pending_activations(), 2);

    let first = neuron.pop_activation().unwrap();
    assert_eq!(first.output, 2.5);
    assert_eq!(first.raw_gradient.to_vec(), vec![1.0, 3.0, 1.0]);
    let second = neuron.pop_activation().unwrap();
    assert_eq!(second.raw_gradient.to_vec(), vec![0.0, 0.0, 0.0]);
    assert!(matches!(neuron.pop_activation(), Err(Error::IllegalState(_))));
  }

  #[test]
  fn without_cache() {
    let mut neuron = neuron();
    neuron.activate(&Array::vec(&[3.0, 1.0])).unwrap();
    assert_eq!(neuron.pending_activations(), 0);
    assert!(neuron.pop_activation().is_err());
  }

  #[test]
  fn input_neurons() {
    let mut input = Neuron::<f64>::input(NeuronId(0));
    assert!(input.activate(&Array::vec(&[])).is_err());
    input.feed(4.0).unwrap();
    assert_eq!(input.output(), Ok(4.0));
    assert!(neuron().feed(1.0).is_err());
  }
}
