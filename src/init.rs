use rand::{ Rng, SeedableRng, rngs::StdRng };

use crate::{
  array::Array,
  error::Result,
  internal::randn,
  scalar::Number,
};


/// Strategy for choosing the starting parameters of a trainable component.

pub trait Initializer<N: Number> {
  /// Fill `weights`, the input weights of a component feeding `fan_out`
  /// consumers.
  fn weights(&mut self, weights: &Array<N>, fan_out: usize) -> Result<()>;

  fn bias(&mut self) -> Result<N> {
    Ok(N::zero())
  }
}


/// Glorot uniform initialization with zero biases.

#[derive(Debug, Clone)]
pub struct Xavier {
  rng: StdRng,
}

impl Xavier {
  pub fn new(seed: u64) -> Self {
    Self { rng: StdRng::seed_from_u64(seed) }
  }
}

impl<N: Number> Initializer<N> for Xavier {
  fn weights(&mut self, weights: &Array<N>, fan_out: usize) -> Result<()> {
    let limit = (6.0 / (weights.len() + fan_out) as f64).sqrt();
    for i in 0..weights.len() {
      weights.set(i, N::value_of(self.rng.gen_range(-limit, limit))?);
    }
    Ok(())
  }
}


/// Normally distributed weights with zero biases.

#[derive(Debug, Clone)]
pub struct Gaussian {
  pub mean: f64,
  pub std_dev: f64,
  rng: StdRng,
  spare: Option<f64>,
}

impl Gaussian {
  pub fn new(mean: f64, std_dev: f64, seed: u64) -> Self {
    Self { mean, std_dev, rng: StdRng::seed_from_u64(seed), spare: None }
  }

  fn sample(&mut self) -> f64 {
    let z = self.spare.take().unwrap_or_else(|| {
      let (a, b) = randn(&mut self.rng);
      self.spare = Some(b);
      a
    });
    self.mean + z * self.std_dev
  }
}

impl<N: Number> Initializer<N> for Gaussian {
  fn weights(&mut self, weights: &Array<N>, _fan_out: usize) -> Result<()> {
    for i in 0..weights.len() {
      weights.set(i, N::value_of(self.sample())?);
    }
    Ok(())
  }
}


/// Same value for every weight and every bias.

#[derive(Debug, Clone)]
pub struct Constant<N: Number> {
  pub weight: N,
  pub bias: N,
}

impl<N: Number> Constant<N> {
  pub fn new(weight: N, bias: N) -> Self {
    Self { weight, bias }
  }
}

impl<N: Number> Initializer<N> for Constant<N> {
  fn weights(&mut self, weights: &Array<N>, _fan_out: usize) -> Result<()> {
    weights.apply(|_| self.weight.clone() );
    Ok(())
  }

  fn bias(&mut self) -> Result<N> {
    Ok(self.bias.clone())
  }
}
