use std::fmt::{ Debug, Display };

use num_traits::{ Float, NumCast };

use crate::error::{ Error, Result };

mod rational;

pub use rational::Rational;


/// All types that may be stored in an [Array](crate::Array).
///
/// This trait gets implemented automatically for all types
/// that satisfy its dependent traits.

pub trait Inner: Clone + Debug + Display + PartialEq + 'static {}
impl<T: Clone + Debug + Display + PartialEq + 'static> Inner for T {}


/// Capability table of a numeric precision.
///
/// Generic code never applies native operators to a `Number`. All arithmetic
/// goes through these methods, which makes `f32`, `f64` and [Rational]
/// interchangeable in every container, model and optimizer of this crate.
///
/// A new precision only needs to provide the primitives. Everything else
/// has a default that is expressed through them.

pub trait Number: Inner {
  fn zero() -> Self;
  fn one() -> Self;

  /// Tolerance of [equals](Number::equals). Zero for exact types.
  fn epsilon() -> Self;

  fn add(&self, rhs: &Self) -> Self;
  fn sub(&self, rhs: &Self) -> Self;
  fn mul(&self, rhs: &Self) -> Self;

  /// Exact types panic on a zero divisor, floats follow IEEE 754.
  fn div(&self, rhs: &Self) -> Self;

  fn is_greater_than(&self, rhs: &Self) -> bool;

  fn from_int(value: i64) -> Self;

  /// Convert a host double.
  ///
  /// Fails for values the type can't represent, such as non-finite
  /// values for [Rational].
  fn value_of(value: f64) -> Result<Self>;

  fn to_f64(&self) -> f64;

  fn sqrt(&self) -> Result<Self>;
  fn ln(&self) -> Result<Self>;
  fn exp(&self) -> Result<Self>;

  fn minus_one() -> Self {
    Self::zero().sub(&Self::one())
  }

  /// Exact quotient of two integers.
  fn from_ratio(numer: i64, denom: i64) -> Self {
    Self::from_int(numer).div(&Self::from_int(denom))
  }

  fn add_int(&self, rhs: i64) -> Self {
    self.add(&Self::from_int(rhs))
  }

  fn sub_int(&self, rhs: i64) -> Self {
    self.sub(&Self::from_int(rhs))
  }

  fn mul_int(&self, rhs: i64) -> Self {
    self.mul(&Self::from_int(rhs))
  }

  fn div_int(&self, rhs: i64) -> Self {
    self.div(&Self::from_int(rhs))
  }

  fn negate(&self) -> Self {
    Self::zero().sub(self)
  }

  fn inverse(&self) -> Self {
    Self::one().div(self)
  }

  fn square(&self) -> Self {
    self.mul(self)
  }

  fn is_less_than(&self, rhs: &Self) -> bool {
    rhs.is_greater_than(self)
  }

  fn is_positive(&self) -> bool {
    self.is_greater_than(&Self::zero())
  }

  fn is_negative(&self) -> bool {
    self.is_less_than(&Self::zero())
  }

  fn abs(&self) -> Self {
    if self.is_negative() { self.negate() } else { self.clone() }
  }

  fn signum(&self) -> Self {
    if self.is_positive() {
      Self::one()
    } else if self.is_negative() {
      Self::minus_one()
    } else {
      Self::zero()
    }
  }

  /// Equality within [epsilon](Number::epsilon).
  fn equals(&self, rhs: &Self) -> bool {
    !self.sub(rhs).abs().is_greater_than(&Self::epsilon())
  }

  fn is_zero(&self) -> bool {
    self.equals(&Self::zero())
  }

  fn has_same_sign(&self, rhs: &Self) -> bool {
    self.signum().equals(&rhs.signum())
  }

  fn max(&self, rhs: &Self) -> Self {
    if rhs.is_greater_than(self) { rhs.clone() } else { self.clone() }
  }

  fn min(&self, rhs: &Self) -> Self {
    if rhs.is_less_than(self) { rhs.clone() } else { self.clone() }
  }

  /// Integer power by repeated multiplication, linear in `exponent`.
  fn pow(&self, exponent: i32) -> Self {
    let mut result = Self::one();
    for _ in 0..exponent.unsigned_abs() {
      result = result.mul(self);
    }
    if exponent < 0 { result.inverse() } else { result }
  }

  fn clamp01(&self) -> Self {
    if self.is_negative() {
      Self::zero()
    } else if self.is_greater_than(&Self::one()) {
      Self::one()
    } else {
      self.clone()
    }
  }
}


macro_rules! float_number {
  ($t:ty, $eps:expr) => {
    impl Number for $t {
      fn zero() -> Self { 0.0 }
      fn one() -> Self { 1.0 }
      fn epsilon() -> Self { $eps }

      fn add(&self, rhs: &Self) -> Self { self + rhs }
      fn sub(&self, rhs: &Self) -> Self { self - rhs }
      fn mul(&self, rhs: &Self) -> Self { self * rhs }
      fn div(&self, rhs: &Self) -> Self { self / rhs }

      fn is_greater_than(&self, rhs: &Self) -> bool {
        self > rhs
      }

      fn from_int(value: i64) -> Self {
        value as $t
      }

      fn value_of(value: f64) -> Result<Self> {
        <$t as NumCast>::from(value).ok_or_else(||
          Error::InvalidNumericValue(format!("{value} is out of range for {}", stringify!($t)))
        )
      }

      fn to_f64(&self) -> f64 {
        *self as f64
      }

      fn sqrt(&self) -> Result<Self> {
        Ok(Float::sqrt(*self))
      }

      fn ln(&self) -> Result<Self> {
        Ok(Float::ln(*self))
      }

      fn exp(&self) -> Result<Self> {
        Ok(Float::exp(*self))
      }
    }
  };
}

float_number!(f32, 1e-6);
float_number!(f64, 1e-10);


#[cfg(test)]
mod tests {
  use super::*;

  fn roundtrip<N: Number>() {
    let two = N::from_int(2);
    let three = N::from_int(3);
    assert!(two.add(&three).equals(&N::from_int(5)));
    assert!(two.sub(&three).equals(&N::minus_one()));
    assert!(two.mul(&three).equals(&N::from_int(6)));
    assert!(three.div(&two).equals(&N::from_ratio(3, 2)));
    assert!(two.pow(10).equals(&N::from_int(1024)));
    assert!(two.pow(-2).equals(&N::from_ratio(1, 4)));
    assert!(three.negate().is_negative());
    assert!(three.inverse().mul(&three).equals(&N::one()));
    assert!(three.negate().has_same_sign(&N::minus_one()));
    assert!(!three.has_same_sign(&N::minus_one()));
    assert!(N::from_int(-7).abs().equals(&N::from_int(7)));
    assert!(N::from_int(4).clamp01().equals(&N::one()));
    assert!(N::from_int(-4).clamp01().is_zero());
    assert!(N::from_ratio(1, 3).clamp01().equals(&N::from_ratio(1, 3)));
  }

  #[test]
  fn float_arithmetic() {
    roundtrip::<f32>();
    roundtrip::<f64>();
  }

  #[test]
  fn rational_arithmetic() {
    roundtrip::<Rational>();
  }

  #[test]
  fn tolerant_equality() {
    let a = 0.1_f64 + 0.2;
    assert!(Number::equals(&a, &0.3));
    assert!(!Number::equals(&1.0_f64, &1.001));
    assert!(Number::is_zero(&1e-12_f64));
  }

  #[test]
  fn int_operands() {
    let x = 1.5_f64;
    assert_eq!(x.add_int(2), 3.5);
    assert_eq!(x.sub_int(2), -0.5);
    assert_eq!(x.mul_int(4), 6.0);
    assert_eq!(x.div_int(3), 0.5);
  }

  #[test]
  fn signum_and_extrema() {
    assert_eq!(Number::signum(&-2.0_f64), -1.0);
    assert_eq!(Number::signum(&0.0_f64), 0.0);
    assert_eq!(Number::max(&2.0_f64, &3.0), 3.0);
    assert_eq!(Number::min(&2.0_f64, &3.0), 2.0);
  }

  #[test]
  fn value_of_float() {
    assert_eq!(f64::value_of(0.25), Ok(0.25));
    assert!(Number::sqrt(&4.0_f64).unwrap().equals(&2.0));
  }
}
