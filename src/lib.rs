//! Gradient descent for arbitrary number types.
//! Small. Few dependencies. CPU only.
//!
//! # Features
//!
//! - **Precision-generic** — Everything is written against the [Number] trait,
//! which is implemented for `f32`, `f64` and exact [Rational] numbers. Exact
//! types make results reproducible down to the last digit.
//!
//! - **Aliasing views** — [Array]s, [Vector]s and [Matrix] rows and columns
//! share storage with the array they were sliced from, strides included.
//!
//! - **Closed-form fitting** — Matrices can be inverted and pseudo-inverted,
//! so linear models can be fit by least squares without any iteration.
//!
//! - **Neuron graphs** — A [NeuralNetwork] is a layered graph of neurons with
//! arbitrary connections between earlier and later layers. Activations of a
//! training step get cached and consumed by back-propagation in order.
//!
//! - **Optimization** — Includes a range of standard strategies, such as ADAM
//! and Nesterov, plus L1 / L2 regularization. Optimizers and networks can be
//! set up from JSON through the [config] module.
//!
//! # Examples
//!
//! Fitting a line in closed form and by gradient descent:
//! ```
//! use microdescent::{
//!   Array, AffineTransformation, DataSet, ParameterizedFunction,
//!   objective::MeanSquaredError,
//!   optimize::{ Optimizer, Vanilla },
//! };
//!
//! let data = DataSet::<f64>::from_f64(&[([0.0], [1.0]), ([1.0], [3.0]), ([2.0], [5.0])]).unwrap();
//!
//! // Least squares
//! let mut exact = AffineTransformation::zeros(1);
//! exact.fit(&data).unwrap();
//! assert!((exact.bias() - 1.0).abs() < 1e-9);
//!
//! // Basic training loop
//! let mut f = AffineTransformation::zeros(1);
//! let mut optimizer = Optimizer::new(0.1, Vanilla);
//! for _ in 0..2000 {
//!   optimizer.minimize(&mut f, &data, &MeanSquaredError).unwrap();
//! }
//! let y = f.estimate(&Array::vec(&[3.0])).unwrap();
//! assert!((y - 7.0).abs() < 1e-6);
//! ```
//!
//! Exact inversion:
//! ```
//! use microdescent::{ Matrix, Rational };
//!
//! let r = |n| Rational::new(n, 1);
//! let m = Matrix::from_rows(vec![vec![r(2), r(1)], vec![r(1), r(1)]]).unwrap();
//! let inverse = m.invert().unwrap();
//! assert_eq!(inverse.to_rows(), vec![vec![r(1), r(-1)], vec![r(-1), r(2)]]);
//! ```
//!
//! ## More examples
//! Check the `/demos` folder for a network learning XOR.

mod internal;
mod error;
mod span;
mod array;
mod vector;
mod matrix;
mod function;
mod data;
mod network;
mod model;

pub mod scalar;
pub mod activation;
pub mod objective;
pub mod regularization;
pub mod init;
pub mod optimize;
pub mod config;

pub use error::{ Error, Result };
pub use span::Span;
pub use array::{ Array, ArrayIterator };
pub use vector::{ Vector, Orientation };
pub use matrix::Matrix;
pub use scalar::{ Inner, Number, Rational };
pub use function::{ ParameterizedFunction, LinearCombination, AffineTransformation };
pub use data::{ DataSet, Sample };
pub use network::{ NeuralNetwork, Neuron, NeuronId, ActivationRecord };
pub use model::{ Model, GradientDecomposition };
pub use activation::ActivationFunction;
