//! Krylov solvers that consume a preconditioner.

use crate::error::AmgError;
use crate::preconditioner::Preconditioner;
use crate::utils::convergence::SolveStats;

/// Common interface for the iterative solvers.
pub trait LinearSolver<M, V> {
    type Scalar: Copy + PartialOrd + From<f64>;
    /// Solve A·x = b, writing result into `x`, which holds the initial guess.
    /// Returns iteration stats (including convergence info).
    fn solve(
        &mut self,
        a: &M,
        pc: Option<&mut dyn Preconditioner<V>>,
        b: &V,
        x: &mut V,
    ) -> Result<SolveStats<Self::Scalar>, AmgError>;
}

pub mod bicgstab;
pub mod pcg;

pub use bicgstab::BiCgStabSolver;
pub use pcg::PcgSolver;
