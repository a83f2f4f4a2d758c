//! Preconditioners for linear solvers.
//!
//! The AMG hierarchy lives in [`amg`]; Krylov solvers in [`crate::solver`] consume
//! it through the [`Preconditioner`] trait.

use crate::error::AmgError;

/// A preconditioner M ≈ A⁻¹.
///
/// `apply` takes `&mut self` because applying a multigrid cycle reuses scratch
/// vectors owned by the preconditioner.
pub trait Preconditioner<V> {
    /// Apply M⁻¹ to r, writing z = M⁻¹ r
    fn apply(&mut self, r: &V, z: &mut V) -> Result<(), AmgError>;
}

pub mod amg;

pub use amg::{Amg, AmgParamsFor, CpuAmg, LevelInfo};
