use log::trace;

use crate::{
  error::{ Error, Result },
  matrix::Matrix,
  scalar::Number,
  vector::Vector,
};


impl<T: Number> Matrix<T> {
  fn check_square(&self, operation: &str) -> Result<()> {
    if self.is_square() { return Ok(()) }
    Err(Error::DimensionMismatch(format!(
      "{operation} needs a square matrix, got {}x{}", self.rows(), self.columns()
    )))
  }

  /// Gaussian elimination with partial pivoting.
  pub fn determinant(&self) -> Result<T> {
    self.check_square("determinant")?;
    let n = self.rows();
    let mut rows = self.to_rows();
    let mut det = T::one();
    for col in 0..n {
      let pivot = (col + 1..n).fold(col, |best, r| {
        if rows[r][col].abs().is_greater_than(&rows[best][col].abs()) { r } else { best }
      });
      if rows[pivot][col] == T::zero() { return Ok(T::zero()) }
      if pivot != col {
        rows.swap(pivot, col);
        det = det.negate();
      }
      for r in col + 1..n {
        let factor = rows[r][col].div(&rows[col][col]);
        for c in col..n {
          rows[r][c] = rows[r][c].sub(&factor.mul(&rows[col][c]));
        }
      }
      det = det.mul(&rows[col][col]);
    }
    Ok(det)
  }

  /// Gauss-Jordan elimination of `[A | I]`.
  ///
  /// Pivots no larger than `epsilon` times the largest entry of the
  /// matrix count as zero.
  pub fn invert(&self) -> Result<Self> {
    self.check_square("inversion")?;
    let n = self.rows();
    let scale = self.to_rows().iter()
      .flatten()
      .fold(T::zero(), |max, value| Number::max(&max, &value.abs()) );
    let threshold = T::epsilon().mul(&scale);
    let usable = |value: &T| value.abs().is_greater_than(&threshold);
    let mut rows: Vec<Vec<T>> = self.to_rows().into_iter()
      .enumerate()
      .map(|(i, mut row)| {
        row.extend((0..n).map(|j| if i == j { T::one() } else { T::zero() } ));
        row
      })
      .collect();

    for col in 0..n {
      if !usable(&rows[col][col]) {
        let pivot = (col + 1..n)
          .find(|&r| usable(&rows[r][col]) )
          .ok_or(Error::SingularMatrix)?;
        rows.swap(col, pivot);
      }
      let pivot = rows[col][col].clone();
      for value in rows[col].iter_mut() {
        *value = value.div(&pivot);
      }
      for r in 0..n {
        if r == col || rows[r][col] == T::zero() { continue }
        let factor = rows[r][col].clone();
        for c in 0..2 * n {
          rows[r][c] = rows[r][c].sub(&factor.mul(&rows[col][c]));
        }
      }
    }

    let inverse = rows.into_iter().map(|row| row[n..].to_vec() ).collect();
    Self::from_rows(inverse)
  }

  /// Moore-Penrose inverse of a matrix with full rank.
  pub fn pseudo_invert(&self) -> Result<Self> {
    let transposed = self.transpose();
    if self.rows() > self.columns() {
      trace!("Pseudo-inverse of tall {}x{} matrix", self.rows(), self.columns());
      transposed.multiply(self)?.invert()?.multiply(&transposed)
    } else if self.columns() > self.rows() {
      trace!("Pseudo-inverse of wide {}x{} matrix", self.rows(), self.columns());
      transposed.multiply(&self.multiply(&transposed)?.invert()?)
    } else {
      self.invert()
    }
  }

  /// Coefficients `x` minimizing `|self · x - targets|²`.
  pub fn least_squares(&self, targets: &Vector<T>) -> Result<Vector<T>> {
    targets.check_len(self.rows(), "least squares targets")?;
    let targets = Vector::column(targets.array().view());
    self.pseudo_invert()?.multiply_vector(&targets)
  }
}
