use crate::{
  array::Array,
  error::{ Error, Result },
  optimize::{ Slots, Strategy },
  scalar::Number,
};


fn default_epsilon<N: Number>() -> N {
  N::from_ratio(1, 100_000_000)
}

/// `-η·g / (sqrt(G) + ε)`, elementwise.
fn scaled_step<N: Number>(gradient: &Array<N>, squares: &Array<N>, rate: &N, epsilon: &N) -> Result<Array<N>> {
  let denominators = squares.try_map(|s| Ok(s.sqrt()?.add(epsilon)) )?;
  gradient.zip_with(&denominators, |g, d| rate.mul(g).div(d).negate() )
}


/// Adaptive gradient strategy (AdaGrad)
///
/// Scales each parameter's step by the inverse root of the sum of all its
/// squared gradients so far.

#[derive(Debug, Clone)]
pub struct AdaGrad<N: Number> {
  pub epsilon: N,
  squares: Slots<N>,
}

impl<N: Number> AdaGrad<N> {
  pub fn new(epsilon: N) -> Self {
    Self { epsilon, squares: Slots::new() }
  }
}

impl<N: Number> Default for AdaGrad<N> {
  fn default() -> Self {
    Self::new(default_epsilon())
  }
}

impl<N: Number> Strategy<N> for AdaGrad<N> {
  fn update(&mut self, component: usize, _parameters: &Array<N>, gradient: &Array<N>, rate: &N, _step: usize) -> Result<Array<N>> {
    let squares = self.squares.get(component, gradient.len())?;
    squares.add_assign(&gradient.map(|g| g.square() ))?;
    scaled_step(gradient, &squares, rate, &self.epsilon)
  }
}


/// Root mean square propagation strategy (RMSProp)
///
/// Like [AdaGrad], with an exponentially decaying sum of squares.

#[derive(Debug, Clone)]
pub struct RMSProp<N: Number> {
  pub decay: N,
  pub epsilon: N,
  squares: Slots<N>,
}

impl<N: Number> RMSProp<N> {
  pub fn new(decay: N, epsilon: N) -> Self {
    Self { decay, epsilon, squares: Slots::new() }
  }
}

impl<N: Number> Default for RMSProp<N> {
  fn default() -> Self {
    Self::new(N::from_ratio(9, 10), default_epsilon())
  }
}

impl<N: Number> Strategy<N> for RMSProp<N> {
  fn update(&mut self, component: usize, _parameters: &Array<N>, gradient: &Array<N>, rate: &N, _step: usize) -> Result<Array<N>> {
    let squares = self.squares.get(component, gradient.len())?;
    let keep = N::one().sub(&self.decay);
    squares.assign(&squares.zip_with(gradient, |s, g| self.decay.mul(s).add(&keep.mul(&g.square())) )?)?;
    scaled_step(gradient, &squares, rate, &self.epsilon)
  }
}


/// `β^t`, updated incrementally while steps arrive in sequence.

#[derive(Debug, Clone)]
struct Power<N: Number> {
  step: usize,
  value: N,
}

impl<N: Number> Power<N> {
  fn new() -> Self {
    Self { step: 0, value: N::one() }
  }

  fn at(&mut self, base: &N, step: usize) -> Result<N> {
    if step == self.step + 1 {
      self.value = self.value.mul(base);
    } else if step != self.step {
      let exponent = i32::try_from(step)
        .map_err(|_| Error::IllegalState(format!("step {step} exceeds the bias correction range")) )?;
      self.value = base.pow(exponent);
    }
    self.step = step;
    Ok(self.value.clone())
  }
}


/// Adaptive Movement Estimation strategy (ADAM)

#[derive(Debug, Clone)]
pub struct Adam<N: Number> {
  pub beta1: N,
  pub beta2: N,
  pub epsilon: N,
  m: Slots<N>,
  v: Slots<N>,
  beta1_power: Power<N>,
  beta2_power: Power<N>,
}

impl<N: Number> Adam<N> {
  pub fn new(beta1: N, beta2: N, epsilon: N) -> Self {
    Self {
      beta1,
      beta2,
      epsilon,
      m: Slots::new(),
      v: Slots::new(),
      beta1_power: Power::new(),
      beta2_power: Power::new(),
    }
  }
}

impl<N: Number> Default for Adam<N> {
  fn default() -> Self {
    Self::new(N::from_ratio(9, 10), N::from_ratio(999, 1000), default_epsilon())
  }
}

impl<N: Number> Strategy<N> for Adam<N> {
  fn update(&mut self, component: usize, _parameters: &Array<N>, gradient: &Array<N>, rate: &N, step: usize) -> Result<Array<N>> {
    let m = self.m.get(component, gradient.len())?;
    let v = self.v.get(component, gradient.len())?;
    let keep1 = N::one().sub(&self.beta1);
    let keep2 = N::one().sub(&self.beta2);
    m.assign(&m.zip_with(gradient, |m, g| self.beta1.mul(m).add(&keep1.mul(g)) )?)?;
    v.assign(&v.zip_with(gradient, |v, g| self.beta2.mul(v).add(&keep2.mul(&g.square())) )?)?;

    let correction1 = N::one().sub(&self.beta1_power.at(&self.beta1, step)?);
    let correction2 = N::one().sub(&self.beta2_power.at(&self.beta2, step)?);
    let mt = m.divide(&correction1);
    let vt = v.divide(&correction2);
    scaled_step(&mt, &vt, rate, &self.epsilon)
  }
}


/// Adam with decoupled weight decay (AdamW)
///
/// Subtracts `η·λ·θ` outside of the adaptive term.

#[derive(Debug, Clone)]
pub struct AdamW<N: Number> {
  pub weight_decay: N,
  adam: Adam<N>,
}

impl<N: Number> AdamW<N> {
  pub fn new(adam: Adam<N>, weight_decay: N) -> Self {
    Self { weight_decay, adam }
  }
}

impl<N: Number> Default for AdamW<N> {
  fn default() -> Self {
    Self::new(Adam::default(), N::from_ratio(1, 100))
  }
}

impl<N: Number> Strategy<N> for AdamW<N> {
  fn update(&mut self, component: usize, parameters: &Array<N>, gradient: &Array<N>, rate: &N, step: usize) -> Result<Array<N>> {
    let adaptive = self.adam.update(component, parameters, gradient, rate, step)?;
    let decay = rate.mul(&self.weight_decay);
    adaptive.zip_with(parameters, |d, p| d.sub(&decay.mul(p)) )
  }
}
