use crate::{
  array::Array,
  error::Result,
  scalar::Number,
};


/// Explicit penalty on parameter magnitude, folded into the averaged
/// gradient before the update step runs.
///
/// Biases are penalized like every other parameter.

#[derive(Debug, Clone, PartialEq)]
pub enum Regularization<N: Number> {
  None,
  /// Adds `λ·sign(θ)`.
  L1(N),
  /// Adds `λ·θ`.
  L2(N),
  ElasticNet { l1: N, l2: N },
}

impl<N: Number> Regularization<N> {
  /// `gradient` plus the derivative of the penalty at `parameters`.
  pub fn apply(&self, gradient: &Array<N>, parameters: &Array<N>) -> Result<Array<N>> {
    match self {
      Self::None => {
        gradient.check_len(parameters.len(), "regularized parameters")?;
        Ok(gradient.clone())
      },
      Self::L1(lambda) => gradient.zip_with(parameters, |g, p| g.add(&lambda.mul(&p.signum())) ),
      Self::L2(lambda) => gradient.zip_with(parameters, |g, p| g.add(&lambda.mul(p)) ),
      Self::ElasticNet { l1, l2 } => gradient.zip_with(parameters, |g, p| {
        g.add(&l1.mul(&p.signum())).add(&l2.mul(p))
      }),
    }
  }

  /// Value of the penalty, `λ·Σ|θ|` for L1 and `λ/2·Σθ²` for L2.
  pub fn penalty(&self, parameters: &Array<N>) -> N {
    let l1 = || parameters.iter().fold(N::zero(), |sum, p| sum.add(&p.abs()) );
    let l2 = || parameters.iter().fold(N::zero(), |sum, p| sum.add(&p.square()) ).div_int(2);
    match self {
      Self::None => N::zero(),
      Self::L1(lambda) => lambda.mul(&l1()),
      Self::L2(lambda) => lambda.mul(&l2()),
      Self::ElasticNet { l1: a, l2: b } => a.mul(&l1()).add(&b.mul(&l2())),
    }
  }
}

impl<N: Number> Default for Regularization<N> {
  fn default() -> Self {
    Self::None
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn gradients() {
    let g = Array::vec(&[1.0, 1.0, 1.0]);
    let p = Array::vec(&[-2.0, 0.0, 4.0]);
    assert_eq!(Regularization::None.apply(&g, &p).unwrap(), g);
    assert_eq!(Regularization::L1(0.5).apply(&g, &p).unwrap().to_vec(), vec![0.5, 1.0, 1.5]);
    assert_eq!(Regularization::L2(0.5).apply(&g, &p).unwrap().to_vec(), vec![0.0, 1.0, 3.0]);
    let elastic = Regularization::ElasticNet { l1: 0.5, l2: 0.5 };
    assert_eq!(elastic.apply(&g, &p).unwrap().to_vec(), vec![-0.5, 1.0, 3.5]);
  }

  #[test]
  fn penalties() {
    let p = Array::vec(&[-2.0, 0.0, 4.0]);
    assert_eq!(Regularization::L1(0.5).penalty(&p), 3.0);
    assert_eq!(Regularization::L2(0.5).penalty(&p), 5.0);
    assert_eq!(Regularization::None.penalty(&p), 0.0);
  }

  #[test]
  fn mismatch() {
    let g = Array::vec(&[1.0]);
    let p = Array::vec(&[1.0, 2.0]);
    assert!(Regularization::None.apply(&g, &p).is_err());
    assert!(Regularization::L2(0.1).apply(&g, &p).is_err());
  }
}
