use itertools::Itertools;

use crate::{
  array::Array,
  error::{ Error, Result },
  scalar::{ Inner, Number },
  vector::Vector,
};

mod linalg;


/// Rectangular matrix stored row-major in a single [Array].
///
/// Rows and columns can be borrowed as views, so writes through
/// [row](Matrix::row) or [column](Matrix::column) change the matrix.

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T: Inner> {
  rows: usize,
  columns: usize,
  data: Array<T>,
}

impl<T: Inner> Matrix<T> {
  pub(crate) fn from_array(rows: usize, columns: usize, data: Array<T>) -> Self {
    debug_assert_eq!(data.len(), rows * columns);
    Self { rows, columns, data }
  }

  pub fn new(rows: usize, columns: usize, values: Vec<T>) -> Result<Self> {
    if values.len() != rows * columns {
      return Err(Error::mismatch(&format!("{rows}x{columns} matrix data"), rows * columns, values.len()))
    }
    Ok(Self::from_array(rows, columns, Array::from_vec(values)))
  }

  /// Fails unless all rows have the same length.
  pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
    let columns = rows.first().map(|row| row.len() ).unwrap_or(0);
    if let Some(row) = rows.iter().find(|row| row.len() != columns ) {
      return Err(Error::mismatch("ragged matrix row", columns, row.len()))
    }
    let num_rows = rows.len();
    Ok(Self::from_array(num_rows, columns, Array::from_vec(rows.concat())))
  }

  pub fn rows(&self) -> usize {
    self.rows
  }

  pub fn columns(&self) -> usize {
    self.columns
  }

  pub fn is_square(&self) -> bool {
    self.rows == self.columns
  }

  /// Panics if the position is out of bounds.
  pub fn get(&self, row: usize, column: usize) -> T {
    self.check_position(row, column);
    self.data.get(row * self.columns + column)
  }

  /// Panics if the position is out of bounds.
  pub fn set(&self, row: usize, column: usize, value: T) {
    self.check_position(row, column);
    self.data.set(row * self.columns + column, value)
  }

  fn check_position(&self, row: usize, column: usize) {
    assert!(row < self.rows && column < self.columns,
      "Position ({row}, {column}) out of bounds for {}x{} matrix", self.rows, self.columns);
  }

  /// View of row `i`.
  pub fn row(&self, i: usize) -> Result<Array<T>> {
    if i >= self.rows { return Err(Error::mismatch("row index bound", self.rows, i)) }
    self.data.slice(i * self.columns, self.columns, 1)
  }

  /// Strided view of column `j`.
  pub fn column(&self, j: usize) -> Result<Array<T>> {
    if j >= self.columns { return Err(Error::mismatch("column index bound", self.columns, j)) }
    self.data.slice(j, self.rows, self.columns)
  }

  pub fn as_array(&self) -> &Array<T> {
    &self.data
  }

  pub fn to_rows(&self) -> Vec<Vec<T>> {
    let values = self.data.to_vec();
    if self.columns == 0 { return vec![vec![]; self.rows] }
    values.chunks(self.columns).map(|row| row.to_vec() ).collect()
  }

  pub fn transpose(&self) -> Self {
    let rows = self.to_rows();
    let values = (0..self.columns)
      .flat_map(|j| rows.iter().map(move |row| row[j].clone() ) )
      .collect();
    Self::from_array(self.columns, self.rows, Array::from_vec(values))
  }

  pub fn swap_rows(&self, a: usize, b: usize) {
    if a == b { return }
    for j in 0..self.columns {
      let tmp = self.get(a, j);
      self.set(a, j, self.get(b, j));
      self.set(b, j, tmp);
    }
  }
}

impl<T: Number> Matrix<T> {
  pub fn zeros(rows: usize, columns: usize) -> Self {
    Self::from_array(rows, columns, Array::zeros(rows * columns))
  }

  pub fn identity(size: usize) -> Self {
    let matrix = Self::zeros(size, size);
    for i in 0..size {
      matrix.set(i, i, T::one());
    }
    matrix
  }

  pub fn from_f64(rows: &[&[f64]]) -> Result<Self> {
    let rows = rows.iter()
      .map(|row| row.iter().map(|&value| T::value_of(value) ).collect::<Result<Vec<_>>>() )
      .collect::<Result<Vec<_>>>()?;
    Self::from_rows(rows)
  }

  /// Standard row-by-column product.
  pub fn multiply(&self, rhs: &Self) -> Result<Self> {
    if self.columns != rhs.rows {
      return Err(Error::DimensionMismatch(format!(
        "cannot multiply {}x{} by {}x{}", self.rows, self.columns, rhs.rows, rhs.columns
      )))
    }
    let lhs = self.to_rows();
    let rhs_rows = rhs.to_rows();
    let mut values = Vec::with_capacity(self.rows * rhs.columns);
    for row in &lhs {
      for j in 0..rhs.columns {
        let mut sum = T::zero();
        for (k, a) in row.iter().enumerate() {
          sum = sum.add(&a.mul(&rhs_rows[k][j]));
        }
        values.push(sum);
      }
    }
    Ok(Self::from_array(self.rows, rhs.columns, Array::from_vec(values)))
  }

  /// Product with a column vector.
  pub fn multiply_vector(&self, vector: &Vector<T>) -> Result<Vector<T>> {
    if !vector.is_column() {
      return Err(Error::DimensionMismatch("matrix can only be applied to a column vector".to_string()))
    }
    vector.check_len(self.columns, "matrix-vector product")?;
    let values = (0..self.rows)
      .map(|i| self.row(i)?.dot(vector) )
      .collect::<Result<Vec<_>>>()?;
    Ok(Vector::column(Array::from_vec(values)))
  }

  pub fn add(&self, rhs: &Self) -> Result<Self> {
    self.check_shape(rhs)?;
    Ok(Self::from_array(self.rows, self.columns, self.data.add(&rhs.data)?))
  }

  pub fn sub(&self, rhs: &Self) -> Result<Self> {
    self.check_shape(rhs)?;
    Ok(Self::from_array(self.rows, self.columns, self.data.sub(&rhs.data)?))
  }

  pub fn scale(&self, factor: &T) -> Self {
    Self::from_array(self.rows, self.columns, self.data.scale(factor))
  }

  /// Elementwise [equals](Number::equals).
  pub fn approx_eq(&self, rhs: &Self) -> bool {
    self.rows == rhs.rows && self.columns == rhs.columns && self.data.approx_eq(&rhs.data)
  }

  fn check_shape(&self, rhs: &Self) -> Result<()> {
    if self.rows == rhs.rows && self.columns == rhs.columns { return Ok(()) }
    Err(Error::DimensionMismatch(format!(
      "{}x{} and {}x{} matrices differ in shape", self.rows, self.columns, rhs.rows, rhs.columns
    )))
  }
}

impl<T: Inner> std::fmt::Display for Matrix<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "Matrix[{}x{}] ", self.rows, self.columns)?;
    for row in self.to_rows() {
      write!(f, "\n  [{}]", row.iter().join(", "))?;
    }
    Ok(())
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn arrange(rows: usize, columns: usize) -> Matrix<f64> {
    Matrix::new(rows, columns, (1..=rows * columns).map(|i| i as f64 ).collect()).unwrap()
  }

  #[test]
  fn multiply() {
    let x = arrange(2, 3);
    let y = arrange(3, 2);
    let product = x.multiply(&y).unwrap();
    assert_eq!(product, Matrix::new(2, 2, vec![22.0, 28.0, 49.0, 64.0]).unwrap());
  }

  #[test]
  fn multiply_mismatch() {
    let x = arrange(2, 3);
    assert!(matches!(x.multiply(&x), Err(Error::DimensionMismatch(_))));
  }

  #[test]
  fn multiply_vector() {
    let x = arrange(2, 3);
    let v = Vector::column(Array::vec(&[1.0, 2.0, 3.0]));
    assert_eq!(x.multiply_vector(&v).unwrap().to_vec(), vec![14.0, 32.0]);
    assert!(x.multiply_vector(&v.transpose()).is_err());
  }

  #[test]
  fn ragged_rows() {
    let rows = vec![vec![1.0, 2.0], vec![3.0]];
    assert!(matches!(Matrix::from_rows(rows), Err(Error::DimensionMismatch(_))));
  }

  #[test]
  fn column_view_is_strided() {
    let x = arrange(3, 3);
    let column = x.column(1).unwrap();
    assert_eq!(column.to_vec(), vec![2.0, 5.0, 8.0]);
    column.set(2, 0.0);
    assert_eq!(x.get(2, 1), 0.0);
    assert_eq!(x.row(2).unwrap().to_vec(), vec![7.0, 0.0, 9.0]);
    assert!(x.column(3).is_err());
  }

  #[test]
  fn transpose() {
    let x = arrange(2, 3);
    let t = x.transpose();
    assert_eq!((t.rows(), t.columns()), (3, 2));
    assert_eq!(t.to_rows(), vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]);
  }

  #[test]
  fn swap_rows() {
    let x = arrange(2, 2);
    x.swap_rows(0, 1);
    assert_eq!(x.to_rows(), vec![vec![3.0, 4.0], vec![1.0, 2.0]]);
  }

  #[test]
  fn identity() {
    let i = Matrix::<f64>::identity(3);
    let x = arrange(3, 3);
    assert_eq!(i.multiply(&x).unwrap(), x);
  }
}
