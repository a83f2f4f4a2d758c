//! Sparse approximate inverse smoother with diagonal pattern (SPAI-0).
//!
//! Finds the diagonal `M` minimizing `||I - M A||_F` row by row, which gives
//! `m_i = a_ii / sum_j a_ij^2`, and sweeps with `x <- x + M (rhs - A x)`.
//! Setup is one pass over the matrix; the sweep is a residual plus a scaled update,
//! so it runs entirely on backend kernels.

use crate::backend::Backend;
use crate::error::AmgError;
use crate::matrix::CsrMatrix;
use crate::relaxation::Relaxation;
use num_traits::{One, Zero};

pub struct Spai0<B: Backend> {
    m: B::Vector,
}

impl<B: Backend> Spai0<B> {
    /// The approximate inverse diagonal.
    pub fn diagonal(&self) -> &B::Vector {
        &self.m
    }

    fn sweep(&self, a: &B::Matrix, rhs: &B::Vector, x: &mut B::Vector, tmp: &mut B::Vector) {
        B::residual(rhs, a, x, tmp);
        B::vmul(B::Value::one(), &self.m, tmp, B::Value::one(), x);
    }
}

impl<B: Backend> Relaxation<B> for Spai0<B> {
    type Params = ();

    fn new(a: &CsrMatrix<B::Value>, _prm: &(), backend_prm: &B::Params) -> Result<Self, AmgError> {
        let m = (0..a.nrows())
            .map(|i| {
                let (cols, vals) = a.row(i);
                let (num, den) = cols.iter().zip(vals).fold(
                    (B::Value::zero(), B::Value::zero()),
                    |(num, den), (&j, &v)| (if j == i { num + v } else { num }, den + v * v),
                );
                if den > B::Value::zero() { num / den } else { B::Value::zero() }
            })
            .collect();
        Ok(Self { m: B::copy_vector(m, backend_prm) })
    }

    fn apply_pre(&self, a: &B::Matrix, rhs: &B::Vector, x: &mut B::Vector, tmp: &mut B::Vector, _prm: &()) {
        self.sweep(a, rhs, x, tmp);
    }

    fn apply_post(&self, a: &B::Matrix, rhs: &B::Vector, x: &mut B::Vector, tmp: &mut B::Vector, _prm: &()) {
        self.sweep(a, rhs, x, tmp);
    }
}
