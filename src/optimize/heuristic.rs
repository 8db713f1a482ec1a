//! Experimental momentum variants.
//!
//! Both scale the raw gradient by a per-parameter multiplier that grows as
//! long as consecutive gradients share their sign and drops back to one on
//! a sign flip. No convergence guarantees are claimed for either.

use crate::{
  array::Array,
  error::Result,
  optimize::{ Slots, Strategy },
  scalar::Number,
};


/// Advance the multipliers of one component and return `-η·multiplier·g`.
fn streak_step<N: Number>(
  multipliers: &Array<N>,
  previous: &Array<N>,
  gradient: &Array<N>,
  rate: &N,
  mut grow: impl FnMut(&N) -> N,
) -> Result<Array<N>> {
  let mut values = Vec::with_capacity(gradient.len());
  for (i, g) in gradient.iter().enumerate() {
    let p = previous.get(i);
    let m = if !g.is_zero() && g.has_same_sign(&p) { grow(&multipliers.get(i)) } else { N::one() };
    values.push(rate.mul(&m).mul(&g).negate());
    multipliers.set(i, m);
  }
  previous.assign(gradient)?;
  Ok(Array::from_vec(values))
}


/// Multiplies the step size by `growth` for every consecutive step with
/// the same gradient sign, up to `limit`.

#[derive(Debug, Clone)]
pub struct ExpGrad<N: Number> {
  pub growth: N,
  pub limit: N,
  multipliers: Slots<N>,
  previous: Slots<N>,
}

impl<N: Number> ExpGrad<N> {
  pub fn new(growth: N, limit: N) -> Self {
    Self { growth, limit, multipliers: Slots::new(), previous: Slots::new() }
  }
}

impl<N: Number> Default for ExpGrad<N> {
  fn default() -> Self {
    Self::new(N::from_ratio(11, 10), N::from_int(10))
  }
}

impl<N: Number> Strategy<N> for ExpGrad<N> {
  fn update(&mut self, component: usize, _parameters: &Array<N>, gradient: &Array<N>, rate: &N, _step: usize) -> Result<Array<N>> {
    let multipliers = self.multipliers.get(component, gradient.len())?;
    let previous = self.previous.get(component, gradient.len())?;
    streak_step(&multipliers, &previous, gradient, rate, |m| Number::min(&m.mul(&self.growth), &self.limit) )
  }
}


/// Adds `increment` to the step size for every consecutive step with the
/// same gradient sign, up to `limit`.

#[derive(Debug, Clone)]
pub struct SameGrad<N: Number> {
  pub increment: N,
  pub limit: N,
  multipliers: Slots<N>,
  previous: Slots<N>,
}

impl<N: Number> SameGrad<N> {
  pub fn new(increment: N, limit: N) -> Self {
    Self { increment, limit, multipliers: Slots::new(), previous: Slots::new() }
  }
}

impl<N: Number> Default for SameGrad<N> {
  fn default() -> Self {
    Self::new(N::from_ratio(1, 10), N::from_int(10))
  }
}

impl<N: Number> Strategy<N> for SameGrad<N> {
  fn update(&mut self, component: usize, _parameters: &Array<N>, gradient: &Array<N>, rate: &N, _step: usize) -> Result<Array<N>> {
    let multipliers = self.multipliers.get(component, gradient.len())?;
    let previous = self.previous.get(component, gradient.len())?;
    streak_step(&multipliers, &previous, gradient, rate, |m| Number::min(&m.add(&self.increment), &self.limit) )
  }
}
