//! Smoothed aggregation.
//!
//! The tentative prolongation of plain aggregation is improved by one damped
//! Jacobi step on the filtered matrix:
//!
//! `P = (I - omega * Df^-1 * Af) * P_tent`
//!
//! where `Af` keeps only the strong off-diagonal couplings and `Df` is the
//! diagonal with the weak couplings lumped into it. Restriction is `R = P^T`.
//!
//! # References
//! - P. Vanek, J. Mandel, M. Brezina, Algebraic multigrid by smoothed aggregation
//!   for second and fourth order elliptic problems, Computing 56, 1996.

use crate::coarsening::{AggregateParams, Coarsening, PlainAggregates};
use crate::config::{OptionGroup, parse_option};
use crate::error::AmgError;
use crate::matrix::CsrMatrix;
use crate::utils::scalar;
use num_traits::Float;

#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothedAggregation;

#[derive(Debug, Clone)]
pub struct SmoothedAggregationParams {
    pub aggr: AggregateParams,
    /// Damping factor of the prolongation smoother.
    pub relax: f64,
}

impl Default for SmoothedAggregationParams {
    fn default() -> Self {
        Self { aggr: AggregateParams::default(), relax: 2.0 / 3.0 }
    }
}

impl OptionGroup for SmoothedAggregationParams {
    fn set_option(&mut self, key: &str, value: &str) -> Result<(), AmgError> {
        match key {
            "relax" => self.relax = parse_option(key, value)?,
            _ => self.aggr.set_option(key, value)?,
        }
        Ok(())
    }
}

impl<T: Float> Coarsening<T> for SmoothedAggregation {
    type Params = SmoothedAggregationParams;

    fn transfer_operators(
        a: &CsrMatrix<T>,
        prm: &SmoothedAggregationParams,
    ) -> Result<(CsrMatrix<T>, CsrMatrix<T>), AmgError> {
        let aggr = PlainAggregates::new(a, &prm.aggr);
        let p_tent = aggr.tentative_prolongation();
        let smoother = prolongation_smoother(a, &aggr.strong, scalar(prm.relax));
        let p = smoother.matmul(&p_tent)?;
        let r = p.transpose();
        Ok((p, r))
    }
}

/// `I - omega * Df^-1 * Af` with the sparsity of the strong couplings plus the diagonal.
fn prolongation_smoother<T: Float>(a: &CsrMatrix<T>, strong: &[bool], omega: T) -> CsrMatrix<T> {
    let n = a.nrows();
    let mut row_ptr = Vec::with_capacity(n + 1);
    let mut col_idx = Vec::with_capacity(a.nnz());
    let mut values = Vec::with_capacity(a.nnz());
    row_ptr.push(0);

    for i in 0..n {
        let start = a.row_ptr()[i];
        let (cols, vals) = a.row(i);

        let filtered_diag = cols
            .iter()
            .zip(vals)
            .enumerate()
            .filter(|&(k, (&j, _))| j == i || !strong[start + k])
            .fold(T::zero(), |acc, (_, (_, &v))| acc + v);

        if filtered_diag == T::zero() {
            col_idx.push(i);
            values.push(T::one());
            row_ptr.push(col_idx.len());
            continue;
        }

        let scale = omega / filtered_diag;
        col_idx.push(i);
        values.push(T::one() - omega);
        for (k, (&j, &v)) in cols.iter().zip(vals).enumerate() {
            if strong[start + k] {
                col_idx.push(j);
                values.push(-scale * v);
            }
        }
        row_ptr.push(col_idx.len());
    }

    let mut s = CsrMatrix::from_parts_unchecked(n, n, row_ptr, col_idx, values);
    s.sort_rows();
    s
}
