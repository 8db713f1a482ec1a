use serde::{ Serialize, Deserialize };

use crate::{
  error::Result,
  scalar::Number,
};


/// Non-linearity applied to a neuron's logit.
///
/// Derivatives are computed from the activation's output rather than from
/// the logit, which is all a cached activation record needs to keep.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
  Identity,
  #[default]
  Sigmoid,
  Tanh,
  Relu,
  LeakyRelu,
  Softplus,
}

impl ActivationFunction {
  pub fn run<N: Number>(&self, logit: &N) -> Result<N> {
    Ok(match self {
      Self::Identity => logit.clone(),
      Self::Sigmoid => sigmoid(logit)?,
      Self::Tanh => sigmoid(&logit.mul_int(2))?.mul_int(2).sub(&N::one()),
      Self::Relu => Number::max(logit, &N::zero()),
      Self::LeakyRelu => if logit.is_positive() { logit.clone() } else { logit.mul(&leak()) },
      Self::Softplus => logit.exp()?.add(&N::one()).ln()?,
    })
  }

  /// Derivative at the logit that produced `output`.
  pub fn derive<N: Number>(&self, output: &N) -> Result<N> {
    Ok(match self {
      Self::Identity => N::one(),
      Self::Sigmoid => output.mul(&N::one().sub(output)),
      Self::Tanh => N::one().sub(&output.square()),
      Self::Relu => if output.is_positive() { N::one() } else { N::zero() },
      Self::LeakyRelu => if output.is_positive() { N::one() } else { leak() },
      Self::Softplus => N::one().sub(&output.negate().exp()?),
    })
  }
}

fn sigmoid<N: Number>(logit: &N) -> Result<N> {
  Ok(N::one().add(&logit.negate().exp()?).inverse())
}

fn leak<N: Number>() -> N {
  N::from_ratio(1, 100)
}


#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;
  use crate::{ error::Error, scalar::Rational };

  const ALL: [ActivationFunction; 6] = [
    ActivationFunction::Identity,
    ActivationFunction::Sigmoid,
    ActivationFunction::Tanh,
    ActivationFunction::Relu,
    ActivationFunction::LeakyRelu,
    ActivationFunction::Softplus,
  ];

  #[test]
  fn values() {
    use ActivationFunction::*;
    assert_eq!(Sigmoid.run(&0.0), Ok(0.5));
    assert_abs_diff_eq!(Tanh.run(&0.7_f64).unwrap(), 0.7_f64.tanh(), epsilon = 1e-12);
    assert_eq!(Relu.run(&-2.0), Ok(0.0));
    assert_eq!(LeakyRelu.run(&-2.0), Ok(-0.02));
    assert_abs_diff_eq!(Softplus.run(&0.0_f64).unwrap(), 2.0_f64.ln(), epsilon = 1e-12);
  }

  #[test]
  fn derivative_from_output() {
    let h = 1e-6;
    for f in ALL {
      for x in [-1.3, -0.2, 0.4, 2.1] {
        let numeric = (f.run(&(x + h)).unwrap() - f.run(&(x - h)).unwrap()) / (2.0 * h);
        let analytic = f.derive(&f.run(&x).unwrap()).unwrap();
        assert_abs_diff_eq!(numeric, analytic, epsilon = 1e-6);
      }
    }
  }

  #[test]
  fn rational_support() {
    let x = Rational::new(-3, 2);
    assert_eq!(ActivationFunction::Relu.run(&x), Ok(Rational::from_int(0)));
    assert_eq!(ActivationFunction::LeakyRelu.run(&x), Ok(Rational::new(-3, 200)));
    assert!(matches!(ActivationFunction::Sigmoid.run(&x), Err(Error::UnsupportedOperation(_))));
  }

  #[test]
  fn config_names() {
    let f: ActivationFunction = serde_json::from_str("\"leaky_relu\"").unwrap();
    assert_eq!(f, ActivationFunction::LeakyRelu);
  }
}
