//! Convergence tracking & tolerance checks for iterative solvers.

/// Stopping criteria & stats.
#[derive(Clone, Debug)]
pub struct Convergence<T> {
    pub tol: T,
    pub max_iters: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolveStats<T> {
    pub iterations: usize,
    pub final_residual: T,
    pub converged: bool,
}

impl<T: Copy + num_traits::Float> Convergence<T> {
    /// Returns (should_stop, stats) given current `res_norm` and iteration `i`.
    ///
    /// The residual is measured relative to `res0_norm`; a zero reference
    /// norm falls back to the absolute residual.
    pub fn check(&self, res_norm: T, res0_norm: T, i: usize) -> (bool, SolveStats<T>) {
        let rel = if res0_norm > T::zero() { res_norm / res0_norm } else { res_norm };
        let converged = rel <= self.tol;
        (
            converged || i >= self.max_iters,
            SolveStats {
                iterations: i,
                final_residual: rel,
                converged,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_on_tolerance_or_cap() {
        let conv = Convergence { tol: 1e-6, max_iters: 10 };
        let (stop, stats) = conv.check(1e-8, 1.0, 3);
        assert!(stop && stats.converged);
        let (stop, stats) = conv.check(1e-2, 1.0, 10);
        assert!(stop && !stats.converged);
        let (stop, _) = conv.check(1e-2, 1.0, 4);
        assert!(!stop);
        let (_, stats) = conv.check(0.0, 0.0, 1);
        assert!(stats.converged);
    }
}
