use crate::{
  array::Array,
  error::{ Error, Result },
  scalar::Number,
};


/// A single pair of model inputs and expected outputs.

#[derive(Debug, Clone, PartialEq)]
pub struct Sample<N: Number> {
  features: Array<N>,
  targets: Array<N>,
}

impl<N: Number> Sample<N> {
  pub fn new(features: Array<N>, targets: Array<N>) -> Self {
    Self { features, targets }
  }

  pub fn from_f64(features: &[f64], targets: &[f64]) -> Result<Self> {
    Ok(Self::new(Array::from_f64(features)?, Array::from_f64(targets)?))
  }

  pub fn features(&self) -> &Array<N> {
    &self.features
  }

  pub fn targets(&self) -> &Array<N> {
    &self.targets
  }
}


/// Ordered, finite collection of samples of equal shape.

#[derive(Debug, Clone, PartialEq)]
pub struct DataSet<N: Number> {
  arity: usize,
  co_arity: usize,
  samples: Vec<Sample<N>>,
}

impl<N: Number> DataSet<N> {
  pub fn new(arity: usize, co_arity: usize) -> Self {
    Self { arity, co_arity, samples: vec![] }
  }

  pub fn from_samples(arity: usize, co_arity: usize, samples: Vec<Sample<N>>) -> Result<Self> {
    let mut data = Self::new(arity, co_arity);
    for sample in samples {
      data.push(sample)?;
    }
    Ok(data)
  }

  /// Build a data set from literal `(features, targets)` pairs.
  pub fn from_f64<const A: usize, const C: usize>(pairs: &[([f64; A], [f64; C])]) -> Result<Self> {
    let samples = pairs.iter()
      .map(|(features, targets)| Sample::from_f64(features, targets) )
      .collect::<Result<Vec<_>>>()?;
    Self::from_samples(A, C, samples)
  }

  /// Fails unless the sample's shape matches the set's.
  pub fn push(&mut self, sample: Sample<N>) -> Result<()> {
    sample.features.check_len(self.arity, "sample features")?;
    sample.targets.check_len(self.co_arity, "sample targets")?;
    self.samples.push(sample);
    Ok(())
  }

  pub fn arity(&self) -> usize {
    self.arity
  }

  pub fn co_arity(&self) -> usize {
    self.co_arity
  }

  pub fn len(&self) -> usize {
    self.samples.len()
  }

  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }

  pub fn samples(&self) -> &[Sample<N>] {
    &self.samples
  }

  pub fn iter(&self) -> std::slice::Iter<Sample<N>> {
    self.samples.iter()
  }

  pub fn is_compatible(&self, arity: usize, co_arity: usize) -> bool {
    self.arity == arity && self.co_arity == co_arity
  }

  pub(crate) fn check_compatible(&self, arity: usize, co_arity: usize) -> Result<()> {
    if self.is_compatible(arity, co_arity) { return Ok(()) }
    Err(Error::DimensionMismatch(format!(
      "data set of shape {} -> {} doesn't fit model of shape {arity} -> {co_arity}",
      self.arity, self.co_arity
    )))
  }
}

impl<'a, N: Number> IntoIterator for &'a DataSet<N> {
  type Item = &'a Sample<N>;
  type IntoIter = std::slice::Iter<'a, Sample<N>>;

  fn into_iter(self) -> Self::IntoIter {
    self.samples.iter()
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn literal_pairs() {
    let data = DataSet::<f64>::from_f64(&[([0.0, 1.0], [1.0]), ([1.0, 1.0], [0.0])]).unwrap();
    assert_eq!((data.arity(), data.co_arity(), data.len()), (2, 1, 2));
    assert_eq!(data.samples()[1].features().to_vec(), vec![1.0, 1.0]);
    assert!(data.is_compatible(2, 1));
    assert!(data.check_compatible(1, 1).is_err());
  }

  #[test]
  fn push_checks_shape() {
    let mut data = DataSet::<f64>::new(2, 1);
    let sample = Sample::from_f64(&[1.0], &[1.0]).unwrap();
    assert!(matches!(data.push(sample), Err(Error::DimensionMismatch(_))));
    assert!(data.is_empty());
  }
}
