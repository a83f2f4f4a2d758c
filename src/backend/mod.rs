//! Storage and compute backends.
//!
//! A [`Backend`] decides where hierarchy operators and vectors live and how the
//! handful of kernels the cycle needs are executed. The hierarchy builder works
//! on [`CsrMatrix`] and hands every finished operator to the backend with
//! [`Backend::copy_matrix`]; after that only backend-resident objects are touched.
//!
//! Kernels are synchronous: results are fully visible when the call returns, no
//! matter how the backend parallelizes internally.

use crate::error::AmgError;
use crate::matrix::CsrMatrix;
use num_traits::Float;
use std::fmt::Debug;

pub mod cpu;
pub use cpu::{CpuBackend, DenseLu};

/// Matrix/vector types and kernels used by the hierarchy and the cycle.
pub trait Backend: Sized {
    /// Scalar type of matrix entries and vectors.
    type Value: Float + Debug + Send + Sync + 'static;
    /// Backend-resident sparse matrix.
    type Matrix;
    /// Backend-resident vector. `Default` must be a cheap empty placeholder.
    type Vector: Default;
    /// Direct solver used on the coarsest level.
    type DirectSolver: DirectSolver<Self>;
    /// Backend-specific parameters.
    type Params: Clone + Debug + Default;

    /// Move a build-time matrix into backend storage.
    fn copy_matrix(a: CsrMatrix<Self::Value>, prm: &Self::Params) -> Self::Matrix;
    /// Move a host vector into backend storage.
    fn copy_vector(v: Vec<Self::Value>, prm: &Self::Params) -> Self::Vector;
    /// Zero-filled vector of length `n`.
    fn create_vector(n: usize, prm: &Self::Params) -> Self::Vector;

    fn rows(a: &Self::Matrix) -> usize;
    fn cols(a: &Self::Matrix) -> usize;
    fn nonzeros(a: &Self::Matrix) -> usize;
    fn len(v: &Self::Vector) -> usize;

    /// `y <- alpha * A * x + beta * y`.
    fn spmv(
        alpha: Self::Value,
        a: &Self::Matrix,
        x: &Self::Vector,
        beta: Self::Value,
        y: &mut Self::Vector,
    );
    /// `r <- rhs - A * x`.
    fn residual(rhs: &Self::Vector, a: &Self::Matrix, x: &Self::Vector, r: &mut Self::Vector);
    /// `x <- 0`.
    fn clear(x: &mut Self::Vector);
    /// `dst <- src`.
    fn copy(src: &Self::Vector, dst: &mut Self::Vector);
    /// Euclidean norm.
    fn norm(x: &Self::Vector) -> Self::Value;
    /// `x . y`.
    fn inner_product(x: &Self::Vector, y: &Self::Vector) -> Self::Value;
    /// `y <- a * x + b * y`.
    fn axpby(a: Self::Value, x: &Self::Vector, b: Self::Value, y: &mut Self::Vector);
    /// Element-wise `y <- alpha * d .* x + beta * y`.
    fn vmul(
        alpha: Self::Value,
        d: &Self::Vector,
        x: &Self::Vector,
        beta: Self::Value,
        y: &mut Self::Vector,
    );
}

/// Direct solver for the coarsest level of a hierarchy.
pub trait DirectSolver<B: Backend>: Sized {
    /// Factorize `a`. Fails if the matrix cannot be factorized.
    fn new(a: CsrMatrix<B::Value>, prm: &B::Params) -> Result<Self, AmgError>;
    /// `x <- A^-1 rhs`.
    fn solve(&self, rhs: &B::Vector, x: &mut B::Vector);
    /// Largest system this solver is expected to handle comfortably; used as the
    /// default `coarse_enough` threshold.
    fn coarse_enough() -> usize {
        300
    }
}
