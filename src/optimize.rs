use log::{ debug, warn };

use crate::{
  array::Array,
  data::DataSet,
  error::{ Error, Result },
  model::Model,
  objective::Objective,
  regularization::Regularization,
  scalar::Number,
};

mod adaptive;
mod heuristic;

pub use adaptive::{ AdaGrad, RMSProp, Adam, AdamW };
pub use heuristic::{ ExpGrad, SameGrad };


/// An optimization strategy to be used with [Optimizer].
///
/// Strategies may keep state per component. That state lives as long as
/// the strategy and is never reset between steps.

pub trait Strategy<N: Number> {
  /// Parameter change for `component`, given its averaged and regularized
  /// `gradient` at step `step ≥ 1`.
  fn update(
    &mut self,
    component: usize,
    parameters: &Array<N>,
    gradient: &Array<N>,
    rate: &N,
    step: usize,
  ) -> Result<Array<N>>;
}

impl<N: Number> Strategy<N> for Box<dyn Strategy<N>> {
  fn update(
    &mut self,
    component: usize,
    parameters: &Array<N>,
    gradient: &Array<N>,
    rate: &N,
    step: usize,
  ) -> Result<Array<N>> {
    (**self).update(component, parameters, gradient, rate, step)
  }
}


/// Per-component state of a strategy, created with zeros on first use.

#[derive(Debug, Clone)]
pub(crate) struct Slots<N: Number>(Vec<Option<Array<N>>>);

impl<N: Number> Slots<N> {
  pub(crate) fn new() -> Self {
    Self(vec![])
  }

  /// View of the state of `component`.
  pub(crate) fn get(&mut self, component: usize, len: usize) -> Result<Array<N>> {
    if self.0.len() <= component {
      self.0.resize(component + 1, None);
    }
    let slot = self.0[component].get_or_insert_with(|| Array::zeros(len) );
    slot.check_len(len, "strategy state")?;
    Ok(slot.view())
  }
}

impl<N: Number> Default for Slots<N> {
  fn default() -> Self {
    Self::new()
  }
}


/// Generic optimizer that allows for several optimization [strategies](Strategy) to be used.

#[derive(Debug)]
pub struct Optimizer<N: Number, S: Strategy<N>> {
  strategy: S,
  pub learning_rate: N,
  pub regularization: Regularization<N>,
  iteration: usize,
}

impl<N: Number, S: Strategy<N>> Optimizer<N, S> {
  pub fn new(learning_rate: N, strategy: S) -> Self {
    Self { strategy, learning_rate, regularization: Regularization::None, iteration: 0 }
  }

  pub fn with_regularization(mut self, regularization: Regularization<N>) -> Self {
    self.regularization = regularization;
    self
  }

  pub fn strategy(&self) -> &S {
    &self.strategy
  }

  pub fn strategy_mut(&mut self) -> &mut S {
    &mut self.strategy
  }

  /// Number of steps taken through [minimize](Self::minimize).
  pub fn iteration(&self) -> usize {
    self.iteration
  }

  /// One full-batch gradient descent step over `data`.
  ///
  /// Parameters are only touched once every sample has been processed, so
  /// a failing step leaves `model` unchanged. `index` numbers the steps
  /// starting at 1 and drives the bias correction of adaptive strategies.
  pub fn step<M, O>(&mut self, model: &mut M, data: &DataSet<N>, objective: &O, index: usize) -> Result<()>
  where
    M: Model<N> + ?Sized,
    O: Objective<N> + ?Sized,
  {
    if index == 0 {
      return Err(Error::IllegalState("step indices start at 1".to_string()))
    }
    data.check_compatible(model.arity(), model.co_arity())?;
    if data.is_empty() {
      debug!("Step {index}: empty batch");
      return Ok(())
    }

    model.prepare()?;
    let result = self.run(model, data, objective, index);
    if let Err(error) = &result {
      warn!("Step {index} failed, discarding pending activations: {error}");
    }
    model.release();
    result
  }

  /// Take the next step in sequence.
  pub fn minimize<M, O>(&mut self, model: &mut M, data: &DataSet<N>, objective: &O) -> Result<()>
  where
    M: Model<N> + ?Sized,
    O: Objective<N> + ?Sized,
  {
    let index = self.iteration + 1;
    self.step(model, data, objective, index)?;
    self.iteration = index;
    Ok(())
  }

  fn run<M, O>(&mut self, model: &mut M, data: &DataSet<N>, objective: &O, index: usize) -> Result<()>
  where
    M: Model<N> + ?Sized,
    O: Objective<N> + ?Sized,
  {
    // Forward passes for the whole batch
    let output_gradients = data.iter()
      .map(|sample| {
        let estimated = model.forward(sample.features())?;
        objective.gradient(1, &estimated, sample.targets())
      })
      .collect::<Result<Vec<_>>>()?;

    // Backward passes, in the same order
    let mut gradients: Vec<Option<Array<N>>> = vec![None; model.components()];
    for (sample, output_gradient) in data.iter().zip(&output_gradients) {
      for decomposition in model.backward(sample.features(), output_gradient)? {
        let count = gradients.len();
        let slot = gradients.get_mut(decomposition.component)
          .ok_or_else(|| Error::mismatch("component index bound", count, decomposition.component) )?;
        match slot {
          Some(sum) => sum.add_assign(&decomposition.gradient)?,
          None => *slot = Some(decomposition.gradient.into_array()),
        }
      }
    }

    // Compute all changes before committing any of them
    let batch_size = data.len() as i64;
    let mut deltas = Vec::with_capacity(gradients.len());
    for (component, gradient) in gradients.into_iter().enumerate() {
      let Some(gradient) = gradient else { continue };
      let parameters = model.component_parameters(component)?;
      let gradient = self.regularization.apply(&gradient.div_int(batch_size), &parameters)?;
      let delta = self.strategy.update(component, &parameters, &gradient, &self.learning_rate, index)?;
      delta.check_len(parameters.len(), "parameter change")?;
      deltas.push((component, delta));
    }
    for (component, delta) in &deltas {
      model.adjust(*component, delta)?;
    }

    debug!("Step {index}: {} samples, {} components updated", data.len(), deltas.len());
    Ok(())
  }
}


/// Plain gradient descent, `Δθ = -η·g`.

#[derive(Debug, Clone, Default)]
pub struct Vanilla;

impl<N: Number> Strategy<N> for Vanilla {
  fn update(&mut self, _component: usize, _parameters: &Array<N>, gradient: &Array<N>, rate: &N, _step: usize) -> Result<Array<N>> {
    Ok(gradient.scale(&rate.negate()))
  }
}


/// Gradient descent with momentum

#[derive(Debug, Clone)]
pub struct Momentum<N: Number> {
  pub momentum: N,
  v: Slots<N>,
}

impl<N: Number> Momentum<N> {
  pub fn new(momentum: N) -> Self {
    Self { momentum, v: Slots::new() }
  }
}

impl<N: Number> Default for Momentum<N> {
  fn default() -> Self {
    Self::new(N::from_ratio(9, 10))
  }
}

impl<N: Number> Strategy<N> for Momentum<N> {
  fn update(&mut self, component: usize, _parameters: &Array<N>, gradient: &Array<N>, rate: &N, _step: usize) -> Result<Array<N>> {
    let v = self.v.get(component, gradient.len())?;
    v.assign(&v.zip_with(gradient, |v, g| self.momentum.mul(v).sub(&rate.mul(g)) )?)?;
    Ok(v.clone())
  }
}


/// Gradient descent with Nesterov momentum

#[derive(Debug, Clone)]
pub struct Nesterov<N: Number> {
  pub momentum: N,
  v: Slots<N>,
}

impl<N: Number> Nesterov<N> {
  pub fn new(momentum: N) -> Self {
    Self { momentum, v: Slots::new() }
  }
}

impl<N: Number> Default for Nesterov<N> {
  fn default() -> Self {
    Self::new(N::from_ratio(9, 10))
  }
}

impl<N: Number> Strategy<N> for Nesterov<N> {
  fn update(&mut self, component: usize, _parameters: &Array<N>, gradient: &Array<N>, rate: &N, _step: usize) -> Result<Array<N>> {
    let v = self.v.get(component, gradient.len())?;
    let v_prev = v.clone();
    v.assign(&v.zip_with(gradient, |v, g| self.momentum.mul(v).sub(&rate.mul(g)) )?)?;
    let ahead = N::one().add(&self.momentum);
    v_prev.zip_with(&v, |p, v| ahead.mul(v).sub(&self.momentum.mul(p)) )
  }
}
