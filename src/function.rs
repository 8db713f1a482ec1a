use log::debug;

use crate::{
  array::Array,
  data::DataSet,
  error::{ Error, Result },
  matrix::Matrix,
  scalar::Number,
  vector::Vector,
};


/// Trainable scalar function of a fixed number of inputs.
///
/// Gradients are derived by hand for every implementation, there is no
/// tracing of the computation.

pub trait ParameterizedFunction<N: Number> {
  /// Number of inputs.
  fn arity(&self) -> usize;

  fn parameter_count(&self) -> usize;

  /// Live view of the parameters. Writes through it change the function.
  fn parameters(&self) -> Array<N>;

  fn estimate(&self, inputs: &Array<N>) -> Result<N>;

  /// Partial derivatives of [estimate](Self::estimate) with respect to each
  /// parameter, at `inputs`.
  fn gradient(&self, inputs: &Array<N>) -> Result<Vector<N>>;

  fn set_parameters(&mut self, values: &Array<N>) -> Result<()> {
    self.parameters().assign(values)
  }

  fn adjust_parameters(&mut self, delta: &Array<N>) -> Result<()> {
    self.parameters().add_assign(delta)
  }
}


fn check_arity<N: Number>(inputs: &Array<N>, arity: usize) -> Result<()> {
  if inputs.len() == arity { return Ok(()) }
  Err(Error::mismatch("function inputs", arity, inputs.len()))
}

fn fit_columns<N: Number>(
  data: &DataSet<N>,
  arity: usize,
  bias: bool,
) -> Result<(Matrix<N>, Vector<N>)> {
  data.check_compatible(arity, 1)?;
  let rows = data.iter()
    .map(|sample| {
      let mut row = if bias { vec![N::one()] } else { vec![] };
      row.extend(sample.features().iter());
      row
    })
    .collect();
  let targets = data.iter().map(|sample| sample.targets().get(0) ).collect();
  Ok((Matrix::from_rows(rows)?, Vector::column(Array::from_vec(targets))))
}


/// Weighted sum of the inputs, without bias.

#[derive(Debug, Clone, PartialEq)]
pub struct LinearCombination<N: Number> {
  weights: Array<N>,
}

impl<N: Number> LinearCombination<N> {
  pub fn new(weights: Array<N>) -> Self {
    Self { weights }
  }

  pub fn zeros(arity: usize) -> Self {
    Self::new(Array::zeros(arity))
  }

  /// Replace the weights by the least squares solution on `data`.
  pub fn fit(&mut self, data: &DataSet<N>) -> Result<()> {
    let (design, targets) = fit_columns(data, self.arity(), false)?;
    debug!("Fitting {} weights to {} samples", self.arity(), data.len());
    let solution = design.least_squares(&targets)?;
    self.weights.assign(&solution)
  }
}

impl<N: Number> ParameterizedFunction<N> for LinearCombination<N> {
  fn arity(&self) -> usize {
    self.weights.len()
  }

  fn parameter_count(&self) -> usize {
    self.weights.len()
  }

  fn parameters(&self) -> Array<N> {
    self.weights.view()
  }

  fn estimate(&self, inputs: &Array<N>) -> Result<N> {
    check_arity(inputs, self.arity())?;
    self.weights.dot(inputs)
  }

  fn gradient(&self, inputs: &Array<N>) -> Result<Vector<N>> {
    check_arity(inputs, self.arity())?;
    Ok(Vector::column(inputs.clone()))
  }
}


/// Weighted sum of the inputs plus a bias.
///
/// Parameters are laid out as `[bias, w₁, …, wₙ]`.

#[derive(Debug, Clone, PartialEq)]
pub struct AffineTransformation<N: Number> {
  parameters: Array<N>,
}

impl<N: Number> AffineTransformation<N> {
  pub fn new(bias: N, weights: &Array<N>) -> Self {
    let mut parameters = vec![bias];
    parameters.extend(weights.iter());
    Self { parameters: Array::from_vec(parameters) }
  }

  pub fn zeros(arity: usize) -> Self {
    Self { parameters: Array::zeros(arity + 1) }
  }

  pub fn bias(&self) -> N {
    self.parameters.get(0)
  }

  pub fn set_bias(&mut self, bias: N) {
    self.parameters.set(0, bias)
  }

  /// View of the weights, without the bias.
  pub fn weights(&self) -> Array<N> {
    // Parameters always hold at least the bias
    self.parameters.slice(1, self.arity(), 1)
      .unwrap_or_else(|_| Array::from_vec(vec![]) )
  }

  /// Replace all parameters by the least squares solution on `data`.
  pub fn fit(&mut self, data: &DataSet<N>) -> Result<()> {
    let (design, targets) = fit_columns(data, self.arity(), true)?;
    debug!("Fitting {} weights and bias to {} samples", self.arity(), data.len());
    let solution = design.least_squares(&targets)?;
    self.parameters.assign(&solution)
  }
}

impl<N: Number> ParameterizedFunction<N> for AffineTransformation<N> {
  fn arity(&self) -> usize {
    self.parameters.len() - 1
  }

  fn parameter_count(&self) -> usize {
    self.parameters.len()
  }

  fn parameters(&self) -> Array<N> {
    self.parameters.view()
  }

  fn estimate(&self, inputs: &Array<N>) -> Result<N> {
    check_arity(inputs, self.arity())?;
    Ok(self.bias().add(&self.weights().dot(inputs)?))
  }

  fn gradient(&self, inputs: &Array<N>) -> Result<Vector<N>> {
    check_arity(inputs, self.arity())?;
    let mut gradient = vec![N::one()];
    gradient.extend(inputs.iter());
    Ok(Vector::column(Array::from_vec(gradient)))
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::scalar::Rational;

  #[test]
  fn linear_combination() {
    let f = LinearCombination::new(Array::vec(&[2.0, -1.0]));
    let x = Array::vec(&[3.0, 4.0]);
    assert_eq!(f.estimate(&x), Ok(2.0));
    assert_eq!(f.gradient(&x).unwrap().to_vec(), vec![3.0, 4.0]);
    assert_eq!(f.parameter_count(), 2);
    assert!(matches!(f.estimate(&Array::vec(&[1.0])), Err(Error::DimensionMismatch(_))));
  }

  #[test]
  fn affine_transformation() {
    let mut f = AffineTransformation::new(0.5, &Array::vec(&[2.0, -1.0]));
    let x = Array::vec(&[3.0, 4.0]);
    assert_eq!((f.arity(), f.parameter_count()), (2, 3));
    assert_eq!(f.estimate(&x), Ok(2.5));
    assert_eq!(f.gradient(&x).unwrap().to_vec(), vec![1.0, 3.0, 4.0]);
    f.adjust_parameters(&Array::vec(&[0.5, 0.0, 1.0])).unwrap();
    assert_eq!(f.bias(), 1.0);
    assert_eq!(f.weights().to_vec(), vec![2.0, 0.0]);
  }

  #[test]
  fn parameters_are_live() {
    let mut f = AffineTransformation::<f64>::zeros(2);
    f.parameters().set(2, 3.0);
    assert_eq!(f.weights().get(1), 3.0);
    assert!(f.set_parameters(&Array::vec(&[1.0])).is_err());
    f.set_parameters(&Array::vec(&[1.0, 2.0, 3.0])).unwrap();
    assert_eq!(f.estimate(&Array::vec(&[1.0, 1.0])), Ok(6.0));
  }

  #[test]
  fn closed_form_fit() {
    // y = 1 + 2x, exactly
    let data = DataSet::<Rational>::from_f64(&[([0.0], [1.0]), ([1.0], [3.0]), ([2.0], [5.0])]).unwrap();
    let mut f = AffineTransformation::zeros(1);
    f.fit(&data).unwrap();
    assert_eq!(f.bias(), Rational::from_int(1));
    assert_eq!(f.weights().get(0), Rational::from_int(2));
  }

  #[test]
  fn fit_without_bias() {
    let data = DataSet::<f64>::from_f64(&[([1.0, 0.0], [2.0]), ([0.0, 1.0], [3.0]), ([1.0, 1.0], [5.0])]).unwrap();
    let mut f = LinearCombination::zeros(2);
    f.fit(&data).unwrap();
    assert!(f.parameters().approx_eq(&Array::vec(&[2.0, 3.0])));
  }

  #[test]
  fn fit_singular_design() {
    let data = DataSet::<f64>::from_f64(&[([1.0, 2.0], [1.0]), ([2.0, 4.0], [2.0]), ([3.0, 6.0], [3.0])]).unwrap();
    let mut f = LinearCombination::zeros(2);
    assert_eq!(f.fit(&data), Err(Error::SingularMatrix));
    assert_eq!(f.parameters().to_vec(), vec![0.0, 0.0]);
  }
}
