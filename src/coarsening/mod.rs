//! Coarsening strategies.
//!
//! A [`Coarsening`] strategy turns a level matrix `A` into a prolongation `P`
//! (coarse to fine) and a restriction `R` (fine to coarse). The coarse operator
//! defaults to the Galerkin product `R A P`.
//!
//! Strategies provided:
//! - [`Aggregation`]: piecewise-constant prolongation over plain aggregates.
//! - [`SmoothedAggregation`]: the same aggregates with a Jacobi-smoothed prolongation.

use crate::config::OptionGroup;
use crate::error::AmgError;
use crate::matrix::CsrMatrix;
use num_traits::Float;
use std::fmt::Debug;

pub mod aggregates;
pub mod aggregation;
pub mod smoothed_aggregation;

pub use aggregates::{AggregateParams, PlainAggregates};
pub use aggregation::{Aggregation, AggregationParams};
pub use smoothed_aggregation::{SmoothedAggregation, SmoothedAggregationParams};

/// Produces transfer operators and the coarse operator for one level.
pub trait Coarsening<T: Float> {
    /// Strategy-specific parameters.
    type Params: Clone + Debug + Default + OptionGroup;

    /// Compute `(P, R)` for `a`. `P` is `rows(a) x n_coarse`, `R` is `n_coarse x rows(a)`.
    fn transfer_operators(
        a: &CsrMatrix<T>,
        prm: &Self::Params,
    ) -> Result<(CsrMatrix<T>, CsrMatrix<T>), AmgError>;

    /// Coarse operator; Galerkin `R A P` unless a strategy knows better.
    fn coarse_operator(
        a: &CsrMatrix<T>,
        p: &CsrMatrix<T>,
        r: &CsrMatrix<T>,
        _prm: &Self::Params,
    ) -> Result<CsrMatrix<T>, AmgError> {
        galerkin(a, p, r)
    }
}

/// Galerkin triple product `R A P` with sorted rows.
pub fn galerkin<T: Float>(
    a: &CsrMatrix<T>,
    p: &CsrMatrix<T>,
    r: &CsrMatrix<T>,
) -> Result<CsrMatrix<T>, AmgError> {
    let mut coarse = r.matmul(a)?.matmul(p)?;
    coarse.sort_rows();
    Ok(coarse)
}
