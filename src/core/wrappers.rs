//! Core trait implementations for `CsrMatrix` and `Vec<T>`.
//!
//! These let the Krylov solvers in [`crate::solver`] run against the same sparse
//! matrices the AMG hierarchy is built from, with Rayon-parallel products and
//! reductions when the `rayon` feature is enabled.

use crate::core::traits::{InnerProduct, MatVec};
use crate::matrix::CsrMatrix;
use num_traits::Float;

/// Implements matrix-vector multiplication for `CsrMatrix`.
///
/// Computes `y = A * x` row by row.
impl<T: Float + Send + Sync> MatVec<Vec<T>> for CsrMatrix<T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(self.nrows(), y.len(), "Output vector y has incorrect length");
        assert_eq!(self.ncols(), x.len(), "Input vector x has incorrect length");
        let row_dot = |i: usize| {
            let (cols, vals) = self.row(i);
            cols.iter()
                .zip(vals)
                .fold(T::zero(), |acc, (&j, &v)| acc + v * x[j])
        };
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            y.par_iter_mut().enumerate().for_each(|(i, yi)| *yi = row_dot(i));
        }
        #[cfg(not(feature = "rayon"))]
        {
            for (i, yi) in y.iter_mut().enumerate() {
                *yi = row_dot(i);
            }
        }
    }
}

/// Implements inner product and norm for vectors, with optional Rayon parallelism.
impl<T: Float + From<f64> + Send + Sync> InnerProduct<Vec<T>> for () {
    type Scalar = T;
    /// Computes the dot product of two vectors: `x^T y`.
    fn dot(&self, x: &Vec<T>, y: &Vec<T>) -> T {
        assert_eq!(x.len(), y.len(), "Vectors must have the same length");
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            x.as_slice()
                .par_iter()
                .zip(y.as_slice().par_iter())
                .map(|(xi, yi)| *xi * *yi)
                .reduce(|| T::zero(), |acc, v| acc + v)
        }
        #[cfg(not(feature = "rayon"))]
        {
            x.iter()
                .zip(y.iter())
                .map(|(xi, yi)| *xi * *yi)
                .fold(T::zero(), |acc, v| acc + v)
        }
    }
    /// Computes the Euclidean norm of a vector: `||x||_2`.
    fn norm(&self, x: &Vec<T>) -> T {
        self.dot(x, x).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn csr_matvec_and_norm() {
        let a = CsrMatrix::from_triplets(2, 2, &[(0, 0, 2.0), (0, 1, -1.0), (1, 0, -1.0), (1, 1, 2.0)]).unwrap();
        let x = vec![1.0, 2.0];
        let mut y = vec![0.0; 2];
        a.matvec(&x, &mut y);
        assert_eq!(y, vec![0.0, 3.0]);
        let ip = ();
        assert_relative_eq!(ip.norm(&y), 3.0);
        assert_relative_eq!(ip.dot(&x, &y), 6.0);
    }
}
