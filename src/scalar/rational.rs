use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{ Zero, One, FromPrimitive, ToPrimitive };

use crate::{
  error::{ Error, Result },
  scalar::Number,
};


/// Exact arbitrary-precision rational number.
///
/// Arithmetic never rounds, so linear algebra over `Rational` yields exact
/// determinants and inverses. Transcendental functions are unsupported.

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rational(BigRational);

impl Rational {
  /// Decimal places kept when converting a host double.
  pub const DECIMAL_DIGITS: usize = 12;

  /// Panics if `denom` is zero.
  pub fn new(numer: i64, denom: i64) -> Self {
    Self(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
  }

  pub fn numer(&self) -> &BigInt {
    self.0.numer()
  }

  pub fn denom(&self) -> &BigInt {
    self.0.denom()
  }

  pub fn into_inner(self) -> BigRational {
    self.0
  }

  fn unsupported(operation: &str) -> Error {
    Error::UnsupportedOperation(format!("{operation} is undefined for exact rationals"))
  }
}

impl Number for Rational {
  fn zero() -> Self {
    Self(BigRational::zero())
  }

  fn one() -> Self {
    Self(BigRational::one())
  }

  fn epsilon() -> Self {
    Self::zero()
  }

  fn add(&self, rhs: &Self) -> Self {
    Self(&self.0 + &rhs.0)
  }

  fn sub(&self, rhs: &Self) -> Self {
    Self(&self.0 - &rhs.0)
  }

  fn mul(&self, rhs: &Self) -> Self {
    Self(&self.0 * &rhs.0)
  }

  fn div(&self, rhs: &Self) -> Self {
    Self(&self.0 / &rhs.0)
  }

  fn is_greater_than(&self, rhs: &Self) -> bool {
    self.0 > rhs.0
  }

  fn equals(&self, rhs: &Self) -> bool {
    self.0 == rhs.0
  }

  fn from_int(value: i64) -> Self {
    Self(BigRational::from_integer(BigInt::from(value)))
  }

  /// Rounds to [DECIMAL_DIGITS](Rational::DECIMAL_DIGITS) decimal places and
  /// reduces the fraction. Magnitudes too large to scale are converted exactly.
  fn value_of(value: f64) -> Result<Self> {
    if !value.is_finite() {
      return Err(Error::InvalidNumericValue(format!("{value} has no rational representation")))
    }
    let scale: BigInt = num_traits::pow(BigInt::from(10), Self::DECIMAL_DIGITS);
    let scaled = (value * 10f64.powi(Self::DECIMAL_DIGITS as i32)).round();
    let ratio = BigInt::from_f64(scaled)
      .map(|numer| BigRational::new(numer, scale) )
      .or_else(|| BigRational::from_float(value) );
    ratio
      .map(Self)
      .ok_or_else(|| Error::InvalidNumericValue(format!("{value} has no rational representation")) )
  }

  fn to_f64(&self) -> f64 {
    self.0.to_f64().unwrap_or(f64::NAN)
  }

  fn sqrt(&self) -> Result<Self> {
    Err(Self::unsupported("square root"))
  }

  fn ln(&self) -> Result<Self> {
    Err(Self::unsupported("logarithm"))
  }

  fn exp(&self) -> Result<Self> {
    Err(Self::unsupported("exponential"))
  }
}

impl From<BigRational> for Rational {
  fn from(ratio: BigRational) -> Self {
    Self(ratio)
  }
}

impl fmt::Display for Rational {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}
