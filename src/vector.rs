use serde::{ Serialize, Deserialize };

use crate::{
  array::Array,
  error::{ Error, Result },
  matrix::Matrix,
  scalar::{ Inner, Number },
};


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
  Row,
  Column,
}

impl Orientation {
  pub fn flipped(self) -> Self {
    match self {
      Orientation::Row => Orientation::Column,
      Orientation::Column => Orientation::Row,
    }
  }
}


/// An [Array] tagged as either a row or a column.
///
/// Vectors dereference to their underlying array for all operations that
/// don't care about orientation.

#[derive(Debug, Clone, PartialEq)]
pub struct Vector<T: Inner> {
  array: Array<T>,
  orientation: Orientation,
}

impl<T: Inner> Vector<T> {
  pub fn new(array: Array<T>, orientation: Orientation) -> Self {
    Self { array, orientation }
  }

  pub fn column(array: Array<T>) -> Self {
    Self::new(array, Orientation::Column)
  }

  pub fn row(array: Array<T>) -> Self {
    Self::new(array, Orientation::Row)
  }

  pub fn orientation(&self) -> Orientation {
    self.orientation
  }

  pub fn is_row(&self) -> bool {
    self.orientation == Orientation::Row
  }

  pub fn is_column(&self) -> bool {
    self.orientation == Orientation::Column
  }

  /// Flip the orientation. The result shares storage with `self`.
  pub fn transpose(&self) -> Self {
    Self::new(self.array.view(), self.orientation.flipped())
  }

  pub fn array(&self) -> &Array<T> {
    &self.array
  }

  pub fn into_array(self) -> Array<T> {
    self.array
  }

  /// Single row or single column matrix sharing storage with `self`.
  pub fn to_matrix(&self) -> Matrix<T> {
    match self.orientation {
      Orientation::Row => Matrix::from_array(1, self.len(), self.array.view()),
      Orientation::Column => Matrix::from_array(self.len(), 1, self.array.view()),
    }
  }

  fn check_orientation(&self, rhs: &Self) -> Result<()> {
    if self.orientation == rhs.orientation { return Ok(()) }
    Err(Error::DimensionMismatch(format!(
      "cannot combine {:?} vector with {:?} vector", self.orientation, rhs.orientation
    )))
  }
}

impl<T: Number> Vector<T> {
  pub fn zeros(len: usize) -> Self {
    Self::column(Array::zeros(len))
  }

  pub fn add(&self, rhs: &Self) -> Result<Self> {
    self.check_orientation(rhs)?;
    Ok(Self::new(self.array.add(&rhs.array)?, self.orientation))
  }

  pub fn sub(&self, rhs: &Self) -> Result<Self> {
    self.check_orientation(rhs)?;
    Ok(Self::new(self.array.sub(&rhs.array)?, self.orientation))
  }

  pub fn scale(&self, factor: &T) -> Self {
    Self::new(self.array.scale(factor), self.orientation)
  }

  /// Inner product, regardless of orientation.
  pub fn dot(&self, rhs: &Self) -> Result<T> {
    self.array.dot(&rhs.array)
  }

  /// Euclidean length.
  pub fn norm(&self) -> Result<T> {
    self.array.dot(&self.array)?.sqrt()
  }

  /// `self · rhsᵗ` for column vectors, the `len × rhs.len` matrix of all
  /// pairwise products.
  pub fn outer(&self, rhs: &Self) -> Matrix<T> {
    let values = self.array.iter()
      .flat_map(|a| rhs.array.iter().map(move |b| a.mul(&b) ) )
      .collect();
    Matrix::from_array(self.len(), rhs.len(), Array::from_vec(values))
  }
}

impl<T: Inner> std::ops::Deref for Vector<T> {
  type Target = Array<T>;

  fn deref(&self) -> &Self::Target {
    &self.array
  }
}

impl<T: Inner> std::fmt::Display for Vector<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    match self.orientation {
      Orientation::Row => write!(f, "{}", self.array),
      Orientation::Column => write!(f, "{}ᵗ", self.array),
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn transpose_shares_storage() {
    let column = Vector::column(Array::vec(&[1.0, 2.0, 3.0]));
    let row = column.transpose();
    assert!(row.is_row());
    assert!(row.shares_storage(&column));
    row.set(0, 9.0);
    assert_eq!(column.get(0), 9.0);
    assert_eq!(row.transpose().orientation(), Orientation::Column);
  }

  #[test]
  fn orientation_must_match() {
    let a = Vector::column(Array::vec(&[1.0, 2.0]));
    let b = a.transpose();
    assert!(matches!(a.add(&b), Err(Error::DimensionMismatch(_))));
    assert_eq!(a.add(&a).unwrap().to_vec(), vec![2.0, 4.0]);
    assert_eq!(a.dot(&b), Ok(5.0));
  }

  #[test]
  fn outer_product() {
    let a = Vector::column(Array::vec(&[1.0, 2.0]));
    let b = Vector::row(Array::vec(&[3.0, 4.0, 5.0]));
    let m = a.outer(&b);
    assert_eq!((m.rows(), m.columns()), (2, 3));
    assert_eq!(m.get(1, 2), 10.0);
  }

  #[test]
  fn as_matrix() {
    let v = Vector::column(Array::vec(&[1.0, 2.0]));
    let m = v.to_matrix();
    assert_eq!((m.rows(), m.columns()), (2, 1));
    let r = v.transpose().to_matrix();
    assert_eq!((r.rows(), r.columns()), (1, 2));
    assert_eq!(r.multiply(&m).unwrap().get(0, 0), 5.0);
  }

  #[test]
  fn norm() {
    let v = Vector::column(Array::vec(&[3.0, 4.0]));
    assert_eq!(v.norm(), Ok(5.0));
  }
}
