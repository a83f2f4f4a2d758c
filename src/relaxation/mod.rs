//! Relaxation (smoothing) schemes.
//!
//! A smoother is built once per level from the level matrix and applied in place
//! by the cycle before restriction (`apply_pre`) and after prolongation
//! (`apply_post`). Each call performs exactly one sweep; the cycle repeats it
//! `npre` / `npost` times.

use crate::backend::Backend;
use crate::config::OptionGroup;
use crate::error::AmgError;
use crate::matrix::CsrMatrix;
use std::fmt::Debug;

pub mod gauss_seidel;
pub mod jacobi;
pub mod spai0;

pub use gauss_seidel::{GaussSeidel, GaussSeidelParams, SweepDirection};
pub use jacobi::{DampedJacobi, DampedJacobiParams};
pub use spai0::Spai0;

/// Smoother bound to one level matrix.
pub trait Relaxation<B: Backend>: Sized {
    /// Scheme-specific parameters.
    type Params: Clone + Debug + Default + OptionGroup;

    /// Set the smoother up from the build-time form of the level matrix.
    fn new(
        a: &CsrMatrix<B::Value>,
        prm: &Self::Params,
        backend_prm: &B::Params,
    ) -> Result<Self, AmgError>;

    /// One pre-relaxation sweep on `A x = rhs`. `tmp` is scratch space.
    fn apply_pre(
        &self,
        a: &B::Matrix,
        rhs: &B::Vector,
        x: &mut B::Vector,
        tmp: &mut B::Vector,
        prm: &Self::Params,
    );

    /// One post-relaxation sweep on `A x = rhs`. `tmp` is scratch space.
    fn apply_post(
        &self,
        a: &B::Matrix,
        rhs: &B::Vector,
        x: &mut B::Vector,
        tmp: &mut B::Vector,
        prm: &Self::Params,
    );
}
