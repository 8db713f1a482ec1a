use std::rc::Rc;
use std::cell::{ Ref, RefCell };
use std::iter::StepBy;
use std::ops::Range;

use itertools::Itertools;

use crate::{
  error::{ Error, Result },
  scalar::{ Inner, Number },
  span::Span,
};


/// One-dimensional strided view into shared, mutable storage.
///
/// Slicing never copies: any number of arrays may look at the same backing
/// buffer, and writes through one of them are visible through all others
/// that overlap it. [Clone] is the only way to obtain independent storage.
///
/// Storage is reference counted and borrowed per operation, so arrays are
/// confined to a single thread.

#[derive(Debug)]
pub struct Array<T: Inner> {
  span: Span,
  data: Rc<RefCell<Vec<T>>>,
}

impl<T: Inner> Array<T> {
  pub fn from_vec(vec: Vec<T>) -> Self {
    Self { span: Span::new(vec.len()), data: Rc::new(RefCell::new(vec)) }
  }

  pub fn vec(values: &[T]) -> Self {
    Self::from_vec(values.to_vec())
  }

  pub fn fill(len: usize, filler: T) -> Self {
    Self::from_vec(vec![filler; len])
  }

  pub fn init(len: usize, cb: impl FnMut(usize) -> T) -> Self {
    Self::from_vec((0..len).map(cb).collect())
  }

  pub fn len(&self) -> usize {
    self.span.len()
  }

  pub fn is_empty(&self) -> bool {
    self.span.is_empty()
  }

  pub fn span(&self) -> &Span {
    &self.span
  }

  /// Panics if `i` is out of bounds.
  pub fn get(&self, i: usize) -> T {
    self.check_index(i);
    self.data.borrow()[self.span.index(i)].clone()
  }

  /// Panics if `i` is out of bounds.
  pub fn set(&self, i: usize, value: T) {
    self.check_index(i);
    self.data.borrow_mut()[self.span.index(i)] = value;
  }

  fn check_index(&self, i: usize) {
    assert!(i < self.len(), "Index {i} out of bounds for array of length {}", self.len());
  }

  /// View of `len` elements, starting at `offset` and advancing by `stride`.
  /// Shares storage with `self`.
  pub fn slice(&self, offset: usize, len: usize, stride: usize) -> Result<Self> {
    Ok(Self { span: self.span.slice(offset, len, stride)?, data: self.data.clone() })
  }

  /// Another handle on exactly the same elements.
  pub fn view(&self) -> Self {
    Self { span: self.span, data: self.data.clone() }
  }

  pub fn shares_storage(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.data, &other.data)
  }

  /// Whether writes through one array may become visible through the other.
  pub fn overlaps(&self, other: &Self) -> bool {
    self.shares_storage(other) && self.span.overlaps(&other.span)
  }

  pub fn iter(&self) -> ArrayIterator<T> {
    ArrayIterator::new(self)
  }

  pub fn to_vec(&self) -> Vec<T> {
    self.iter().collect()
  }

  pub fn map<O, F>(&self, mut cb: F) -> Array<O>
  where
    O: Inner,
    F: FnMut(&T) -> O,
  {
    let data = self.data.borrow();
    Array::from_vec(self.span.iter().map(|i| cb(&data[i]) ).collect())
  }

  pub fn try_map<O, F>(&self, mut cb: F) -> Result<Array<O>>
  where
    O: Inner,
    F: FnMut(&T) -> Result<O>,
  {
    let data = self.data.borrow();
    let values = self.span.iter()
      .map(|i| cb(&data[i]) )
      .collect::<Result<Vec<_>>>()?;
    Ok(Array::from_vec(values))
  }

  /// Replace every element in place.
  pub fn apply(&self, mut cb: impl FnMut(&T) -> T) {
    let mut data = self.data.borrow_mut();
    for i in self.span.iter() {
      let value = cb(&data[i]);
      data[i] = value;
    }
  }

  /// Copy `other`'s elements into the storage viewed by `self`.
  pub fn assign(&self, other: &Self) -> Result<()> {
    self.check_len(other.len(), "assign")?;
    // Avoid clashing borrows and read-after-write when views share storage
    let other = if self.shares_storage(other) { other.clone() } else { other.view() };
    let mut data = self.data.borrow_mut();
    let source = other.data.borrow();
    for (i, j) in self.span.iter().zip(other.span.iter()) {
      data[i] = source[j].clone();
    }
    Ok(())
  }

  pub fn zip_with<O, F>(&self, rhs: &Self, mut cb: F) -> Result<Array<O>>
  where
    O: Inner,
    F: FnMut(&T, &T) -> O,
  {
    self.check_len(rhs.len(), "elementwise operation")?;
    let data_l = self.data.borrow();
    let data_r = rhs.data.borrow();
    let values = self.span.iter()
      .zip_eq(rhs.span.iter())
      .map(|(i, j)| cb(&data_l[i], &data_r[j]) )
      .collect();
    Ok(Array::from_vec(values))
  }

  pub(crate) fn check_len(&self, len: usize, context: &str) -> Result<()> {
    if self.len() == len { Ok(()) } else { Err(Error::mismatch(context, self.len(), len)) }
  }
}

impl<T: Number> Array<T> {
  pub fn zeros(len: usize) -> Self {
    Self::fill(len, T::zero())
  }

  pub fn ones(len: usize) -> Self {
    Self::fill(len, T::one())
  }

  pub fn from_f64(values: &[f64]) -> Result<Self> {
    let values = values.iter()
      .map(|&value| T::value_of(value) )
      .collect::<Result<Vec<_>>>()?;
    Ok(Self::from_vec(values))
  }

  pub fn to_f64(&self) -> Vec<f64> {
    self.iter().map(|a| a.to_f64() ).collect()
  }

  pub fn add(&self, rhs: &Self) -> Result<Self> {
    self.zip_with(rhs, |a, b| a.add(b) )
  }

  pub fn sub(&self, rhs: &Self) -> Result<Self> {
    self.zip_with(rhs, |a, b| a.sub(b) )
  }

  /// Elementwise product.
  pub fn mul(&self, rhs: &Self) -> Result<Self> {
    self.zip_with(rhs, |a, b| a.mul(b) )
  }

  pub fn scale(&self, factor: &T) -> Self {
    self.map(|a| a.mul(factor) )
  }

  pub fn divide(&self, divisor: &T) -> Self {
    self.map(|a| a.div(divisor) )
  }

  pub fn div_int(&self, divisor: i64) -> Self {
    self.divide(&T::from_int(divisor))
  }

  pub fn negate(&self) -> Self {
    self.map(|a| a.negate() )
  }

  /// Accumulate `rhs` into the storage viewed by `self`.
  pub fn add_assign(&self, rhs: &Self) -> Result<()> {
    self.check_len(rhs.len(), "accumulate")?;
    let rhs = if self.shares_storage(rhs) { rhs.clone() } else { rhs.view() };
    let mut data = self.data.borrow_mut();
    let source = rhs.data.borrow();
    for (i, j) in self.span.iter().zip(rhs.span.iter()) {
      let value = data[i].add(&source[j]);
      data[i] = value;
    }
    Ok(())
  }

  pub fn dot(&self, rhs: &Self) -> Result<T> {
    self.check_len(rhs.len(), "dot product")?;
    Ok(self.iter()
      .zip(rhs.iter())
      .fold(T::zero(), |acc, (a, b)| acc.add(&a.mul(&b)) ))
  }

  pub fn sum(&self) -> T {
    self.iter().fold(T::zero(), |acc, a| acc.add(&a) )
  }

  /// Elementwise [equals](Number::equals).
  pub fn approx_eq(&self, rhs: &Self) -> bool {
    self.len() == rhs.len() && self.iter().zip(rhs.iter()).all(|(a, b)| a.equals(&b) )
  }
}

/// Copies the viewed elements into fresh, contiguous storage.

impl<T: Inner> Clone for Array<T> {
  fn clone(&self) -> Self {
    Self::from_vec(self.to_vec())
  }
}

impl<T: Inner> PartialEq for Array<T> {
  fn eq(&self, rhs: &Self) -> bool {
    self.len() == rhs.len() && self.iter().zip(rhs.iter()).all(|(a, b)| a == b )
  }
}

impl<T: Inner> From<Vec<T>> for Array<T> {
  fn from(vec: Vec<T>) -> Self {
    Self::from_vec(vec)
  }
}

impl<T: Inner> std::fmt::Display for Array<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "[{}]", self.iter().join(", "))
  }
}


pub struct ArrayIterator<'a, T: Inner> {
  data: Ref<'a, Vec<T>>,
  indices: StepBy<Range<usize>>,
}

impl<'a, T: Inner> ArrayIterator<'a, T> {
  fn new(array: &'a Array<T>) -> Self {
    Self {
      data: array.data.borrow(),
      indices: array.span.iter(),
    }
  }
}

impl<T: Inner> Iterator for ArrayIterator<'_, T> {
  type Item = T;

  fn next(&mut self) -> Option<Self::Item> {
    self.indices.next().map(|i| self.data[i].clone() )
  }
}
