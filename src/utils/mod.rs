//! Convergence bookkeeping, timing collection, and small numeric helpers.

pub mod convergence;
pub mod profiler;

pub use convergence::{Convergence, SolveStats};
pub use profiler::{NoProfiler, Profile, Profiler};

/// Convert an `f64` parameter into the working scalar type.
pub(crate) fn scalar<T: num_traits::Float>(v: f64) -> T {
    T::from(v).unwrap_or_else(T::nan)
}
