use crate::{
  array::Array,
  error::{ Error, Result },
  function::{ AffineTransformation, LinearCombination, ParameterizedFunction },
  network::NeuralNetwork,
  scalar::Number,
  vector::Vector,
};


/// Contribution of a single sample to the gradient of one trainable
/// component.

#[derive(Debug, Clone, PartialEq)]
pub struct GradientDecomposition<N: Number> {
  pub component: usize,
  pub gradient: Vector<N>,
}


/// Anything an [Optimizer](crate::optimize::Optimizer) can train.
///
/// Parameters are grouped into components, indexed `0..components()`.
/// A training step runs [forward](Model::forward) for every sample of a batch
/// before running [backward](Model::backward) for the same samples, in the
/// same order.

pub trait Model<N: Number> {
  fn arity(&self) -> usize;
  fn co_arity(&self) -> usize;
  fn components(&self) -> usize;

  fn forward(&mut self, features: &Array<N>) -> Result<Array<N>>;

  /// Gradients of the loss for the oldest sample not yet passed backward.
  fn backward(
    &mut self,
    features: &Array<N>,
    output_gradient: &Array<N>,
  ) -> Result<Vec<GradientDecomposition<N>>>;

  /// Live view of a component's parameters.
  fn component_parameters(&self, component: usize) -> Result<Array<N>>;

  fn adjust(&mut self, component: usize, delta: &Array<N>) -> Result<()> {
    self.component_parameters(component)?.add_assign(delta)
  }

  /// Called before the first forward pass of a training step.
  fn prepare(&mut self) -> Result<()> {
    Ok(())
  }

  /// Called after a training step, whether it succeeded or not.
  fn release(&mut self) {}
}


impl<N: Number> Model<N> for NeuralNetwork<N> {
  fn arity(&self) -> usize {
    NeuralNetwork::arity(self)
  }

  fn co_arity(&self) -> usize {
    NeuralNetwork::co_arity(self)
  }

  fn components(&self) -> usize {
    NeuralNetwork::components(self).len()
  }

  fn forward(&mut self, features: &Array<N>) -> Result<Array<N>> {
    self.evaluate(features)
  }

  fn backward(&mut self, _features: &Array<N>, output_gradient: &Array<N>) -> Result<Vec<GradientDecomposition<N>>> {
    self.decompose(output_gradient)
  }

  fn component_parameters(&self, component: usize) -> Result<Array<N>> {
    self.parameters(component)
  }

  /// Fails if activation records from outside of a training step are pending.
  fn prepare(&mut self) -> Result<()> {
    let pending = self.pending_activations();
    if pending > 0 {
      return Err(Error::IllegalState(format!("{pending} activation records were never consumed")))
    }
    self.set_caching(true);
    Ok(())
  }

  fn release(&mut self) {
    self.set_caching(false);
  }
}


macro_rules! function_model {
  ($t:ident) => {
    impl<N: Number> Model<N> for $t<N> {
      fn arity(&self) -> usize {
        ParameterizedFunction::arity(self)
      }

      fn co_arity(&self) -> usize {
        1
      }

      fn components(&self) -> usize {
        1
      }

      fn forward(&mut self, features: &Array<N>) -> Result<Array<N>> {
        Ok(Array::from_vec(vec![self.estimate(features)?]))
      }

      fn backward(&mut self, features: &Array<N>, output_gradient: &Array<N>) -> Result<Vec<GradientDecomposition<N>>> {
        output_gradient.check_len(1, "output gradient")?;
        let gradient = self.gradient(features)?.scale(&output_gradient.get(0));
        Ok(vec![GradientDecomposition { component: 0, gradient }])
      }

      fn component_parameters(&self, component: usize) -> Result<Array<N>> {
        if component != 0 { return Err(Error::mismatch("component index bound", 1, component)) }
        Ok(ParameterizedFunction::parameters(self))
      }
    }
  };
}

function_model!(LinearCombination);
function_model!(AffineTransformation);
