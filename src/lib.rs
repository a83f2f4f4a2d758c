//! kryst-amg: algebraic multigrid over sparse CSR matrices
//!
//! This crate builds an AMG hierarchy from a square sparse matrix and uses it either
//! as a standalone iterative solver or as a preconditioner for Krylov methods.
//! Coarsening strategy, relaxation scheme and the storage/compute backend are
//! independent type parameters of [`Amg`].
//!
//! Logging goes through the `log` facade; install any logger (e.g. `env_logger`)
//! to see the hierarchy summary and per-level details.

pub mod backend;
pub mod coarsening;
pub mod config;
pub mod core;
pub mod error;
pub mod matrix;
pub mod preconditioner;
pub mod relaxation;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use backend::{Backend, CpuBackend, DenseLu, DirectSolver};
pub use coarsening::{Aggregation, Coarsening, SmoothedAggregation};
pub use config::{AmgParams, OptionGroup};
pub use core::{InnerProduct, MatVec};
pub use error::AmgError;
pub use matrix::{CsrMatrix, SparseMatrix};
pub use preconditioner::{Amg, AmgParamsFor, CpuAmg, LevelInfo, Preconditioner};
pub use relaxation::{DampedJacobi, GaussSeidel, Relaxation, Spai0};
pub use solver::{BiCgStabSolver, LinearSolver, PcgSolver};
pub use utils::{NoProfiler, Profile, Profiler, SolveStats};
