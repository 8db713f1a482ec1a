use crate::{
  array::Array,
  data::DataSet,
  error::{ Error, Result },
  model::Model,
  scalar::Number,
};


/// Loss function comparing a model's estimate with the expected output.
///
/// [gradient](Objective::gradient) returns `∂loss/∂estimated` scaled by
/// `1 / sample_count`. The [Optimizer](crate::optimize::Optimizer) passes a
/// count of one for each sample and averages the accumulated parameter
/// gradients over the batch afterwards.

pub trait Objective<N: Number> {
  fn loss(&self, estimated: &Array<N>, target: &Array<N>) -> Result<N>;

  fn gradient(&self, sample_count: usize, estimated: &Array<N>, target: &Array<N>) -> Result<Array<N>>;
}


fn batch_size(sample_count: usize) -> Result<i64> {
  match i64::try_from(sample_count) {
    Ok(0) => Err(Error::IllegalState("objective gradient over zero samples".to_string())),
    Ok(count) => Ok(count),
    Err(_) => Err(Error::IllegalState(format!("sample count {sample_count} out of range"))),
  }
}


/// Sum of squared errors over the outputs.

#[derive(Debug, Clone, Copy, Default)]
pub struct MeanSquaredError;

impl<N: Number> Objective<N> for MeanSquaredError {
  fn loss(&self, estimated: &Array<N>, target: &Array<N>) -> Result<N> {
    Ok(estimated.sub(target)?.iter().fold(N::zero(), |sum, e| sum.add(&e.square()) ))
  }

  fn gradient(&self, sample_count: usize, estimated: &Array<N>, target: &Array<N>) -> Result<Array<N>> {
    let count = batch_size(sample_count)?;
    estimated.zip_with(target, |e, t| e.sub(t).mul_int(2).div_int(count) )
  }
}


/// Sum of absolute errors over the outputs.

#[derive(Debug, Clone, Copy, Default)]
pub struct MeanAbsoluteError;

impl<N: Number> Objective<N> for MeanAbsoluteError {
  fn loss(&self, estimated: &Array<N>, target: &Array<N>) -> Result<N> {
    Ok(estimated.sub(target)?.iter().fold(N::zero(), |sum, e| sum.add(&e.abs()) ))
  }

  fn gradient(&self, sample_count: usize, estimated: &Array<N>, target: &Array<N>) -> Result<Array<N>> {
    let count = batch_size(sample_count)?;
    estimated.zip_with(target, |e, t| e.sub(t).signum().div_int(count) )
  }
}


/// Cross-entropy of binary targets in `[0, 1]`.
///
/// Estimates are clipped to `[1e-7, 1 - 1e-7]` so the loss stays finite.

#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCrossEntropy;

impl BinaryCrossEntropy {
  fn clip<N: Number>(estimated: &N) -> N {
    let limit = N::from_ratio(1, 10_000_000);
    let upper = N::one().sub(&limit);
    Number::min(&Number::max(estimated, &limit), &upper)
  }
}

impl<N: Number> Objective<N> for BinaryCrossEntropy {
  fn loss(&self, estimated: &Array<N>, target: &Array<N>) -> Result<N> {
    target.check_len(estimated.len(), "cross-entropy targets")?;
    estimated.iter().zip(target.iter()).try_fold(N::zero(), |sum, (e, t)| {
      let e = Self::clip(&e);
      let positive = t.mul(&e.ln()?);
      let negative = N::one().sub(&t).mul(&N::one().sub(&e).ln()?);
      Ok(sum.sub(&positive.add(&negative)))
    })
  }

  fn gradient(&self, sample_count: usize, estimated: &Array<N>, target: &Array<N>) -> Result<Array<N>> {
    let count = batch_size(sample_count)?;
    estimated.zip_with(target, |e, t| {
      let e = Self::clip(e);
      e.sub(t).div(&e.mul(&N::one().sub(&e))).div_int(count)
    })
  }
}


/// Average loss of `model` over `data`.
pub fn mean_loss<N, M, O>(model: &mut M, data: &DataSet<N>, objective: &O) -> Result<N>
where
  N: Number,
  M: Model<N> + ?Sized,
  O: Objective<N> + ?Sized,
{
  data.check_compatible(model.arity(), model.co_arity())?;
  if data.is_empty() { return Ok(N::zero()) }
  let mut total = N::zero();
  for sample in data {
    let estimated = model.forward(sample.features())?;
    total = total.add(&objective.loss(&estimated, sample.targets())?);
  }
  Ok(total.div_int(data.len() as i64))
}

/// Share of samples whose outputs all land on the right side of 0.5.
pub fn accuracy<N, M>(model: &mut M, data: &DataSet<N>) -> Result<f64>
where
  N: Number,
  M: Model<N> + ?Sized,
{
  data.check_compatible(model.arity(), model.co_arity())?;
  if data.is_empty() { return Ok(0.0) }
  let threshold = N::from_ratio(1, 2);
  let mut hits = 0;
  for sample in data {
    let estimated = model.forward(sample.features())?;
    let correct = estimated.iter().zip(sample.targets().iter())
      .all(|(e, t)| e.is_greater_than(&threshold) == t.is_greater_than(&threshold) );
    if correct { hits += 1 }
  }
  Ok(hits as f64 / data.len() as f64)
}


#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;
  use crate::{ function::LinearCombination, scalar::Rational };

  #[test]
  fn squared_error() {
    let e = Array::vec(&[1.0, 3.0]);
    let t = Array::vec(&[0.0, 1.0]);
    assert_eq!(MeanSquaredError.loss(&e, &t), Ok(5.0));
    assert_eq!(MeanSquaredError.gradient(1, &e, &t).unwrap().to_vec(), vec![2.0, 4.0]);
    assert_eq!(MeanSquaredError.gradient(2, &e, &t).unwrap().to_vec(), vec![1.0, 2.0]);
    assert!(matches!(MeanSquaredError.loss(&e, &Array::vec(&[0.0])), Err(Error::DimensionMismatch(_))));
  }

  #[test]
  fn absolute_error() {
    let e = Array::vec(&[1.0, -3.0]);
    let t = Array::vec(&[0.0, 1.0]);
    assert_eq!(MeanAbsoluteError.loss(&e, &t), Ok(5.0));
    assert_eq!(MeanAbsoluteError.gradient(1, &e, &t).unwrap().to_vec(), vec![1.0, -1.0]);
  }

  #[test]
  fn cross_entropy() {
    let e = Array::vec(&[0.8]);
    assert_abs_diff_eq!(BinaryCrossEntropy.loss(&e, &Array::vec(&[1.0])).unwrap(), -(0.8_f64.ln()), epsilon = 1e-12);
    assert_abs_diff_eq!(BinaryCrossEntropy.gradient(1, &e, &Array::vec(&[1.0])).unwrap().get(0), -1.25, epsilon = 1e-12);
    assert_abs_diff_eq!(BinaryCrossEntropy.gradient(1, &e, &Array::vec(&[0.0])).unwrap().get(0), 5.0, epsilon = 1e-12);
  }

  #[test]
  fn cross_entropy_is_clipped() {
    let loss: f64 = BinaryCrossEntropy.loss(&Array::vec(&[0.0]), &Array::vec(&[1.0])).unwrap();
    assert!(loss.is_finite());
    assert_abs_diff_eq!(loss, -(1e-7_f64.ln()), epsilon = 1e-6);
    assert!(BinaryCrossEntropy.gradient(1, &Array::vec(&[1.0_f64]), &Array::vec(&[0.0])).unwrap().get(0).is_finite());
  }

  #[test]
  fn zero_sample_count() {
    let e = Array::vec(&[0.5]);
    let t = Array::vec(&[1.0]);
    assert!(matches!(MeanSquaredError.gradient(0, &e, &t), Err(Error::IllegalState(_))));
    assert!(matches!(MeanAbsoluteError.gradient(0, &e, &t), Err(Error::IllegalState(_))));
    assert!(matches!(BinaryCrossEntropy.gradient(0, &e, &t), Err(Error::IllegalState(_))));
    let exact = Array::vec(&[Rational::new(1, 2)]);
    assert!(matches!(MeanSquaredError.gradient(0, &exact, &exact), Err(Error::IllegalState(_))));
  }

  #[test]
  fn loss_and_accuracy_over_data() {
    let mut f = LinearCombination::new(Array::vec(&[1.0]));
    let data = DataSet::<f64>::from_f64(&[([0.2], [0.0]), ([0.9], [1.0]), ([0.7], [0.0]), ([0.1], [1.0])]).unwrap();
    assert_eq!(accuracy(&mut f, &data), Ok(0.5));
    let loss = mean_loss(&mut f, &data, &MeanSquaredError).unwrap();
    assert_abs_diff_eq!(loss, (0.04 + 0.01 + 0.49 + 0.81) / 4.0, epsilon = 1e-12);
  }
}
