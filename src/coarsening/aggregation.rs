//! Unsmoothed aggregation: piecewise-constant prolongation, `R = P^T`.
//!
//! Cheap to set up, but the resulting V-cycle converges noticeably slower than
//! with [`SmoothedAggregation`](super::SmoothedAggregation).

use crate::coarsening::{AggregateParams, Coarsening, PlainAggregates};
use crate::config::OptionGroup;
use crate::error::AmgError;
use crate::matrix::CsrMatrix;
use num_traits::Float;

#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregation;

#[derive(Debug, Clone, Default)]
pub struct AggregationParams {
    pub aggr: AggregateParams,
}

impl OptionGroup for AggregationParams {
    fn set_option(&mut self, key: &str, value: &str) -> Result<(), AmgError> {
        self.aggr.set_option(key, value)
    }
}

impl<T: Float> Coarsening<T> for Aggregation {
    type Params = AggregationParams;

    fn transfer_operators(
        a: &CsrMatrix<T>,
        prm: &AggregationParams,
    ) -> Result<(CsrMatrix<T>, CsrMatrix<T>), AmgError> {
        let aggr = PlainAggregates::new(a, &prm.aggr);
        let p = aggr.tentative_prolongation();
        let r = p.transpose();
        Ok((p, r))
    }
}
