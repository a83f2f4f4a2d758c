//! Shared-memory CPU backend.
//!
//! Operators stay in [`CsrMatrix<f64>`] form and vectors are plain `Vec<f64>`.
//! Row-wise kernels switch to Rayon above [`PARALLEL_THRESHOLD`] rows when the
//! `rayon` feature is enabled. The coarsest level is solved with a dense LU
//! factorization with partial pivoting from Faer.

use crate::backend::{Backend, DirectSolver};
use crate::error::AmgError;
use crate::matrix::CsrMatrix;
use faer::linalg::solvers::{PartialPivLu, SolveCore};
use faer::{Conj, MatMut};

/// Rows below which kernels run sequentially.
pub const PARALLEL_THRESHOLD: usize = 4096;

#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

fn for_each_row<F>(y: &mut [f64], f: F)
where
    F: Fn(usize, &mut f64) + Send + Sync,
{
    #[cfg(feature = "rayon")]
    {
        if y.len() >= PARALLEL_THRESHOLD {
            use rayon::prelude::*;
            y.par_iter_mut().enumerate().for_each(|(i, yi)| f(i, yi));
            return;
        }
    }
    for (i, yi) in y.iter_mut().enumerate() {
        f(i, yi);
    }
}

#[inline]
fn row_dot(a: &CsrMatrix<f64>, i: usize, x: &[f64]) -> f64 {
    let (cols, vals) = a.row(i);
    cols.iter().zip(vals).map(|(&j, &v)| v * x[j]).sum()
}

impl Backend for CpuBackend {
    type Value = f64;
    type Matrix = CsrMatrix<f64>;
    type Vector = Vec<f64>;
    type DirectSolver = DenseLu;
    type Params = ();

    fn copy_matrix(a: CsrMatrix<f64>, _prm: &()) -> CsrMatrix<f64> {
        a
    }

    fn copy_vector(v: Vec<f64>, _prm: &()) -> Vec<f64> {
        v
    }

    fn create_vector(n: usize, _prm: &()) -> Vec<f64> {
        vec![0.0; n]
    }

    fn rows(a: &CsrMatrix<f64>) -> usize {
        a.nrows()
    }

    fn cols(a: &CsrMatrix<f64>) -> usize {
        a.ncols()
    }

    fn nonzeros(a: &CsrMatrix<f64>) -> usize {
        a.nnz()
    }

    fn len(v: &Vec<f64>) -> usize {
        v.len()
    }

    fn spmv(alpha: f64, a: &CsrMatrix<f64>, x: &Vec<f64>, beta: f64, y: &mut Vec<f64>) {
        assert_eq!(a.ncols(), x.len(), "spmv: input vector has incorrect length");
        assert_eq!(a.nrows(), y.len(), "spmv: output vector has incorrect length");
        // beta == 0 must overwrite y even if it holds non-finite garbage
        if beta == 0.0 {
            for_each_row(y, |i, yi| *yi = alpha * row_dot(a, i, x));
        } else {
            for_each_row(y, |i, yi| *yi = alpha * row_dot(a, i, x) + beta * *yi);
        }
    }

    fn residual(rhs: &Vec<f64>, a: &CsrMatrix<f64>, x: &Vec<f64>, r: &mut Vec<f64>) {
        assert_eq!(a.nrows(), rhs.len(), "residual: rhs has incorrect length");
        assert_eq!(a.nrows(), r.len(), "residual: output has incorrect length");
        for_each_row(r, |i, ri| *ri = rhs[i] - row_dot(a, i, x));
    }

    fn clear(x: &mut Vec<f64>) {
        x.iter_mut().for_each(|v| *v = 0.0);
    }

    fn copy(src: &Vec<f64>, dst: &mut Vec<f64>) {
        dst.copy_from_slice(src);
    }

    fn norm(x: &Vec<f64>) -> f64 {
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            if x.len() >= PARALLEL_THRESHOLD {
                return x.par_iter().map(|v| v * v).sum::<f64>().sqrt();
            }
        }
        x.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    fn inner_product(x: &Vec<f64>, y: &Vec<f64>) -> f64 {
        assert_eq!(x.len(), y.len(), "inner_product: vector lengths differ");
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            if x.len() >= PARALLEL_THRESHOLD {
                return x.par_iter().zip(y.par_iter()).map(|(a, b)| a * b).sum();
            }
        }
        x.iter().zip(y).map(|(a, b)| a * b).sum()
    }

    fn axpby(a: f64, x: &Vec<f64>, b: f64, y: &mut Vec<f64>) {
        assert_eq!(x.len(), y.len(), "axpby: vector lengths differ");
        if b == 0.0 {
            for_each_row(y, |i, yi| *yi = a * x[i]);
        } else {
            for_each_row(y, |i, yi| *yi = a * x[i] + b * *yi);
        }
    }

    fn vmul(alpha: f64, d: &Vec<f64>, x: &Vec<f64>, beta: f64, y: &mut Vec<f64>) {
        assert_eq!(d.len(), y.len());
        assert_eq!(x.len(), y.len());
        if beta == 0.0 {
            for_each_row(y, |i, yi| *yi = alpha * d[i] * x[i]);
        } else {
            for_each_row(y, |i, yi| *yi = alpha * d[i] * x[i] + beta * *yi);
        }
    }
}

/// Dense LU with partial pivoting for the coarsest level.
pub struct DenseLu {
    n: usize,
    factor: PartialPivLu<f64>,
}

impl DirectSolver<CpuBackend> for DenseLu {
    fn new(a: CsrMatrix<f64>, _prm: &()) -> Result<Self, AmgError> {
        if !a.is_square() {
            return Err(AmgError::InvalidInput(format!(
                "direct solver needs a square matrix, got {}x{}",
                a.nrows(),
                a.ncols()
            )));
        }
        let n = a.nrows();
        if let Some(row) = (0..n).find(|&i| a.row(i).1.iter().all(|&v| v == 0.0)) {
            return Err(AmgError::SingularMatrix { row });
        }
        let dense = a.to_dense();
        let factor = PartialPivLu::new(dense.as_ref());

        // numerically singular: a pivot vanishes relative to the largest one
        let u = factor.U();
        let pivots: Vec<f64> = (0..n).map(|i| u[(i, i)].abs()).collect();
        if pivots.iter().any(|d| !d.is_finite()) {
            return Err(AmgError::FactorError("LU factor has non-finite pivots".into()));
        }
        let max_pivot = pivots.iter().copied().fold(0.0, f64::max);
        let tol = n as f64 * f64::EPSILON * max_pivot;
        if let Some(row) = pivots.iter().position(|&d| d <= tol) {
            return Err(AmgError::SingularMatrix { row });
        }
        Ok(Self { n, factor })
    }

    fn solve(&self, rhs: &Vec<f64>, x: &mut Vec<f64>) {
        x.copy_from_slice(rhs);
        let x_mat = MatMut::from_column_major_slice_mut(x.as_mut_slice(), self.n, 1);
        self.factor.solve_in_place_with_conj(Conj::No, x_mat);
    }
}
