use std::iter::StepBy;
use std::ops::Range;

use crate::error::{ Error, Result };


/// Position of an [Array](crate::Array)'s elements inside its backing buffer.
///
/// Element `i` lives at `offset + i * stride`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
  pub(crate) offset: usize,
  pub(crate) len: usize,
  pub(crate) stride: usize,
}

impl Span {
  pub fn new(len: usize) -> Self {
    Self { offset: 0, len, stride: 1 }
  }

  pub fn offset(&self) -> usize {
    self.offset
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn stride(&self) -> usize {
    self.stride
  }

  pub fn contiguous(&self) -> bool {
    self.stride == 1 || self.len <= 1
  }

  #[inline]
  pub(crate) fn index(&self, i: usize) -> usize {
    self.offset + i * self.stride
  }

  /// One past the last buffer position covered by this span.
  pub fn end(&self) -> usize {
    if self.len == 0 { self.offset } else { self.index(self.len - 1) + 1 }
  }

  /// Sub-span relative to this one. `offset` and `stride` count elements of
  /// this span, not buffer positions.
  pub fn slice(&self, offset: usize, len: usize, stride: usize) -> Result<Self> {
    if stride == 0 {
      return Err(Error::DimensionMismatch("slice stride must be positive".to_string()))
    }
    let needed = if len == 0 { offset } else { offset + (len - 1) * stride + 1 };
    if needed > self.len {
      return Err(Error::DimensionMismatch(format!(
        "slice of {len} elements from {offset} by {stride} exceeds length {}", self.len
      )))
    }
    Ok(Self {
      offset: self.index(offset),
      len,
      stride: self.stride * stride,
    })
  }

  /// Whether both spans could touch a common buffer position.
  pub fn overlaps(&self, other: &Self) -> bool {
    !self.is_empty() && !other.is_empty() &&
      self.offset < other.end() && other.offset < self.end()
  }

  pub fn iter(&self) -> StepBy<Range<usize>> {
    (self.offset..self.end()).step_by(self.stride)
  }
}
