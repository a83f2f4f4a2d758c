//! Plain aggregation over the strong-connection graph.
//!
//! Entry `a_ij` (`i != j`) is a strong connection when
//! `a_ij^2 > eps_strong^2 * |a_ii * a_jj|`. Unknowns without strong connections
//! are left out of every aggregate; the smoother alone takes care of them.
//!
//! Aggregates are formed greedily in three passes:
//! 1. an unknown whose strong neighbours are all free seeds an aggregate with them;
//! 2. leftover unknowns join the seeded aggregate of a strong neighbour;
//! 3. anything still free forms a new aggregate with its free strong neighbours.
//!
//! The procedure visits unknowns in index order and is fully deterministic.

use crate::config::{OptionGroup, parse_option};
use crate::error::AmgError;
use crate::matrix::CsrMatrix;
use crate::utils::scalar;
use num_traits::Float;

const FREE: usize = usize::MAX;
const REMOVED: usize = usize::MAX - 1;

#[derive(Debug, Clone)]
pub struct AggregateParams {
    /// Strong connection threshold.
    pub eps_strong: f64,
}

impl Default for AggregateParams {
    fn default() -> Self {
        Self { eps_strong: 0.08 }
    }
}

impl OptionGroup for AggregateParams {
    fn set_option(&mut self, key: &str, value: &str) -> Result<(), AmgError> {
        match key {
            "eps_strong" => self.eps_strong = parse_option(key, value)?,
            _ => return Err(AmgError::invalid_option(key, value)),
        }
        Ok(())
    }
}

/// Aggregate assignment of the unknowns of one level.
#[derive(Debug, Clone)]
pub struct PlainAggregates {
    /// Number of aggregates (coarse unknowns).
    pub count: usize,
    /// Aggregate of each unknown; `None` for unknowns without strong connections.
    pub id: Vec<Option<usize>>,
    /// Strong-connection flag for every stored entry of the matrix.
    pub strong: Vec<bool>,
}

impl PlainAggregates {
    pub fn new<T: Float>(a: &CsrMatrix<T>, prm: &AggregateParams) -> Self {
        let n = a.nrows();
        let strong = strong_connections(a, prm.eps_strong);
        let (row_ptr, col_idx, flags) = (a.row_ptr(), a.col_idx(), strong.as_slice());
        let strong_neighbours = move |i: usize| {
            let range = row_ptr[i]..row_ptr[i + 1];
            col_idx[range.clone()]
                .iter()
                .zip(&flags[range])
                .filter(|&(_, &s)| s)
                .map(|(&j, _)| j)
        };

        let mut id = vec![FREE; n];
        for (i, slot) in id.iter_mut().enumerate() {
            if strong_neighbours(i).next().is_none() {
                *slot = REMOVED;
            }
        }

        let mut count = 0;
        for i in 0..n {
            if id[i] != FREE || strong_neighbours(i).any(|j| id[j] != FREE) {
                continue;
            }
            id[i] = count;
            for j in strong_neighbours(i) {
                id[j] = count;
            }
            count += 1;
        }

        let seeded = id.clone();
        for i in 0..n {
            if id[i] != FREE {
                continue;
            }
            if let Some(g) = strong_neighbours(i).map(|j| seeded[j]).find(|&g| g < REMOVED) {
                id[i] = g;
            }
        }

        for i in 0..n {
            if id[i] != FREE {
                continue;
            }
            id[i] = count;
            for j in strong_neighbours(i) {
                if id[j] == FREE {
                    id[j] = count;
                }
            }
            count += 1;
        }

        let id = id.into_iter().map(|g| (g < REMOVED).then_some(g)).collect();
        Self { count, id, strong }
    }

    /// Piecewise-constant prolongation: `P_ij = 1` if unknown `i` belongs to aggregate `j`.
    pub fn tentative_prolongation<T: Float>(&self) -> CsrMatrix<T> {
        let n = self.id.len();
        let mut row_ptr = Vec::with_capacity(n + 1);
        let mut col_idx = Vec::with_capacity(n);
        row_ptr.push(0);
        for g in &self.id {
            if let Some(g) = *g {
                col_idx.push(g);
            }
            row_ptr.push(col_idx.len());
        }
        let values = vec![T::one(); col_idx.len()];
        CsrMatrix::from_parts_unchecked(n, self.count, row_ptr, col_idx, values)
    }
}

/// Strong-connection flag per stored entry. Diagonal entries are never strong.
pub fn strong_connections<T: Float>(a: &CsrMatrix<T>, eps_strong: f64) -> Vec<bool> {
    let diag = a.diagonal();
    let eps2: T = scalar(eps_strong * eps_strong);
    let mut strong = vec![false; a.nnz()];
    for i in 0..a.nrows() {
        let start = a.row_ptr()[i];
        let (cols, vals) = a.row(i);
        for (k, (&j, &v)) in cols.iter().zip(vals).enumerate() {
            strong[start + k] = j != i && v * v > eps2 * (diag[i] * diag[j]).abs();
        }
    }
    strong
}
