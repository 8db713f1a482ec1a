use std::fmt;


/// Everything that can abort a computation or a training step.
///
/// None of these are retried internally. A failed training step leaves the
/// model's parameters untouched.

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
  /// Operand sizes don't fit together, or a sample doesn't fit a model.
  DimensionMismatch(String),
  /// No non-zero pivot could be found while inverting a matrix.
  SingularMatrix,
  /// An operation was called in a state that doesn't allow it, such as
  /// reading a neuron's output before activating it.
  IllegalState(String),
  /// A host value that has no representation in the target number type.
  InvalidNumericValue(String),
  /// The number type doesn't support the requested operation.
  UnsupportedOperation(String),
  /// A configuration that cannot be turned into a working component.
  InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
  pub(crate) fn mismatch(context: &str, expected: usize, found: usize) -> Self {
    Self::DimensionMismatch(format!("{context}: expected {expected}, found {found}"))
  }
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Error::DimensionMismatch(msg) => write!(f, "dimension mismatch: {msg}"),
      Error::SingularMatrix => write!(f, "singular matrix"),
      Error::IllegalState(msg) => write!(f, "illegal state: {msg}"),
      Error::InvalidNumericValue(msg) => write!(f, "invalid numeric value: {msg}"),
      Error::UnsupportedOperation(msg) => write!(f, "unsupported operation: {msg}"),
      Error::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
    }
  }
}

impl std::error::Error for Error {}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display() {
    let error = Error::mismatch("matrix product", 3, 2);
    assert_eq!(error.to_string(), "dimension mismatch: matrix product: expected 3, found 2");
    assert_eq!(Error::SingularMatrix.to_string(), "singular matrix");
  }
}
