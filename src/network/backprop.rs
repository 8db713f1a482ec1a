use log::trace;

use crate::{
  array::Array,
  error::{ Error, Result },
  model::GradientDecomposition,
  network::NeuralNetwork,
  scalar::Number,
};


impl<N: Number> NeuralNetwork<N> {
  /// Backward pass for the oldest forward pass still cached.
  ///
  /// `output_gradient` holds `∂loss/∂output` for every output neuron. Every
  /// computed neuron gives up exactly one activation record and yields the
  /// gradient of the loss with respect to its parameters.
  pub fn decompose(&mut self, output_gradient: &Array<N>) -> Result<Vec<GradientDecomposition<N>>> {
    output_gradient.check_len(self.co_arity(), "output gradient")?;
    trace!("Backward pass through {} layers", self.layers.len());

    let mut deltas: Vec<Option<N>> = vec![None; self.neurons.len()];
    let mut decompositions = Vec::with_capacity(self.components.len());
    let last = self.layers.len() - 1;

    for l in (1..self.layers.len()).rev() {
      for k in 0..self.layers[l].len() {
        let id = self.layers[l][k];
        let record = self.neurons[id.0].pop_activation()?;

        // Error signal arriving at this neuron's output
        let upstream = if l == last {
          output_gradient.get(k)
        } else {
          self.consumers[id.0].iter().try_fold(N::zero(), |sum, &(consumer, position)| {
            let delta = deltas[consumer.0].as_ref().ok_or_else(|| Error::IllegalState(format!(
              "neuron {} was not processed before its input {}", consumer.0, id.0
            )))?;
            Ok::<_, Error>(sum.add(&delta.mul(&self.neurons[consumer.0].weight(position)?)))
          })?
        };

        let neuron = &self.neurons[id.0];
        let slope = neuron.activation()
          .ok_or_else(|| Error::IllegalState(format!("neuron {} is not trainable", id.0)) )?
          .derive(&record.output)?;
        let component = neuron.component()
          .ok_or_else(|| Error::IllegalState(format!("neuron {} is not trainable", id.0)) )?;

        deltas[id.0] = Some(upstream.mul(&slope));
        decompositions.push(GradientDecomposition {
          component,
          gradient: record.raw_gradient.scale(&upstream),
        });
      }
    }
    Ok(decompositions)
  }
}


#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;
  use crate::{
    activation::ActivationFunction,
    init::Xavier,
  };

  fn squared_error(network: &mut NeuralNetwork<f64>, x: &[f64], y: f64) -> f64 {
    let output = network.evaluate(&Array::vec(x)).unwrap().get(0);
    (output - y).powi(2)
  }

  fn check_against_finite_differences(hidden: ActivationFunction, seed: u64) {
    let mut network = NeuralNetwork::feed_forward(&[3, 4, 1], hidden, ActivationFunction::Sigmoid).unwrap();
    network.initialize(&mut Xavier::new(seed)).unwrap();
    let x = [0.3, -0.8, 0.5];
    let y = 0.9;

    network.set_caching(true);
    let output = network.evaluate(&Array::vec(&x)).unwrap().get(0);
    let output_gradient = Array::vec(&[2.0 * (output - y)]);
    let decompositions = network.decompose(&output_gradient).unwrap();
    network.set_caching(false);
    assert_eq!(decompositions.len(), 5);
    assert_eq!(network.pending_activations(), 0);

    let h = 1e-6;
    for decomposition in decompositions {
      let parameters = network.parameters(decomposition.component).unwrap();
      for (i, analytic) in decomposition.gradient.iter().enumerate() {
        let original = parameters.get(i);
        parameters.set(i, original + h);
        let plus = squared_error(&mut network, &x, y);
        parameters.set(i, original - h);
        let minus = squared_error(&mut network, &x, y);
        parameters.set(i, original);
        assert_abs_diff_eq!((plus - minus) / (2.0 * h), analytic, epsilon = 1e-3);
      }
    }
  }

  #[test]
  fn sigmoid_matches_finite_differences() {
    check_against_finite_differences(ActivationFunction::Sigmoid, 1);
  }

  #[test]
  fn relu_matches_finite_differences() {
    check_against_finite_differences(ActivationFunction::Relu, 2);
  }

  #[test]
  fn hand_computed_gradients() {
    // One identity hidden neuron h = 2x + 1 feeding o = 3h - 1
    let mut network = NeuralNetwork::<f64>::feed_forward(
      &[1, 1, 1], ActivationFunction::Identity, ActivationFunction::Identity,
    ).unwrap();
    network.set_parameters(0, &Array::vec(&[1.0, 2.0])).unwrap();
    network.set_parameters(1, &Array::vec(&[-1.0, 3.0])).unwrap();
    network.set_caching(true);
    assert_eq!(network.evaluate(&Array::vec(&[2.0])).unwrap().get(0), 14.0);
    let mut decompositions = network.decompose(&Array::vec(&[1.0])).unwrap();
    decompositions.sort_by_key(|d| d.component );
    assert_eq!(decompositions[0].gradient.to_vec(), vec![3.0, 6.0]);
    assert_eq!(decompositions[1].gradient.to_vec(), vec![1.0, 5.0]);
  }

  #[test]
  fn one_backward_pass_per_forward_pass() {
    let mut network = NeuralNetwork::<f64>::feed_forward(
      &[2, 2, 1], ActivationFunction::Sigmoid, ActivationFunction::Sigmoid,
    ).unwrap();
    network.set_caching(true);
    network.evaluate(&Array::vec(&[1.0, 0.0])).unwrap();
    network.evaluate(&Array::vec(&[0.0, 1.0])).unwrap();
    let gradient = Array::vec(&[1.0]);
    assert!(network.decompose(&gradient).is_ok());
    assert!(network.decompose(&gradient).is_ok());
    assert!(matches!(network.decompose(&gradient), Err(Error::IllegalState(_))));
    assert!(matches!(network.decompose(&Array::vec(&[1.0, 2.0])), Err(Error::DimensionMismatch(_))));
  }

  #[test]
  fn records_are_consumed_in_order() {
    let mut network = NeuralNetwork::<f64>::feed_forward(
      &[1, 1], ActivationFunction::Identity, ActivationFunction::Identity,
    ).unwrap();
    network.set_caching(true);
    network.evaluate(&Array::vec(&[2.0])).unwrap();
    network.evaluate(&Array::vec(&[5.0])).unwrap();
    let gradient = Array::vec(&[1.0]);
    assert_eq!(network.decompose(&gradient).unwrap()[0].gradient.to_vec(), vec![1.0, 2.0]);
    assert_eq!(network.decompose(&gradient).unwrap()[0].gradient.to_vec(), vec![1.0, 5.0]);
  }
}
