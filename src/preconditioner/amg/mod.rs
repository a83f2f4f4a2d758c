//! Algebraic multigrid.
//!
//! [`Amg`] builds a hierarchy of successively coarser operators from a sparse
//! matrix and then either solves `A x = rhs` by repeated cycling ([`Amg::solve`])
//! or acts as a preconditioner ([`Amg::apply`]) for a Krylov method.
//!
//! The three building blocks are chosen through type parameters:
//! - `B`: a [`Backend`] holding the level operators and running the kernels,
//! - `C`: a [`Coarsening`] strategy producing transfer and coarse operators,
//! - `R`: a [`Relaxation`] scheme used as the smoother on every level.
//!
//! ```no_run
//! use kryst_amg::matrix::CsrMatrix;
//! use kryst_amg::preconditioner::CpuAmg;
//!
//! let a = CsrMatrix::from_triplets(2, 2, &[(0, 0, 2.0), (1, 1, 2.0)]).unwrap();
//! let mut amg = CpuAmg::new(a, CpuAmg::params()).unwrap();
//! let mut x = vec![0.0; 2];
//! let stats = amg.solve(&vec![1.0, 1.0], &mut x).unwrap();
//! assert!(stats.converged);
//! ```

use crate::backend::{Backend, CpuBackend, DirectSolver};
use crate::coarsening::{Coarsening, SmoothedAggregation};
use crate::config::AmgParams;
use crate::error::AmgError;
use crate::matrix::CsrMatrix;
use crate::preconditioner::Preconditioner;
use crate::relaxation::{Relaxation, Spai0};
use crate::utils::{Convergence, NoProfiler, Profiler, SolveStats, scalar};
use log::{trace, warn};
use std::fmt;
use std::marker::PhantomData;

pub mod builder;
pub mod cycle;
pub mod level;

pub use builder::Hierarchy;
pub use level::{Level, LevelKind};

/// Parameter record of an `Amg<B, C, R>`.
pub type AmgParamsFor<B, C, R> = AmgParams<
    <C as Coarsening<<B as Backend>::Value>>::Params,
    <R as Relaxation<B>>::Params,
    <B as Backend>::Params,
>;

/// Smoothed aggregation with SPAI-0 smoothing on the CPU backend.
pub type CpuAmg = Amg<CpuBackend, SmoothedAggregation, Spai0<CpuBackend>>;

/// Size of one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub rows: usize,
    pub nonzeros: usize,
}

pub struct Amg<B, C, R>
where
    B: Backend,
    C: Coarsening<B::Value>,
    R: Relaxation<B>,
{
    prm: AmgParamsFor<B, C, R>,
    hierarchy: Hierarchy<B, R>,
    _coarsening: PhantomData<C>,
}

impl<B, C, R> Amg<B, C, R>
where
    B: Backend,
    C: Coarsening<B::Value>,
    R: Relaxation<B>,
{
    /// Default parameters, with `coarse_enough` taken from the backend's direct solver.
    pub fn params() -> AmgParamsFor<B, C, R> {
        AmgParams::default().with_coarse_enough(<B::DirectSolver as DirectSolver<B>>::coarse_enough())
    }

    /// Build the hierarchy for `a`.
    pub fn new(a: CsrMatrix<B::Value>, prm: AmgParamsFor<B, C, R>) -> Result<Self, AmgError> {
        Self::with_profiler(a, prm, &mut NoProfiler)
    }

    /// Build the hierarchy for `a`, reporting setup phases to `prof`.
    pub fn with_profiler(
        a: CsrMatrix<B::Value>,
        prm: AmgParamsFor<B, C, R>,
        prof: &mut dyn Profiler,
    ) -> Result<Self, AmgError> {
        let hierarchy = Hierarchy::build::<C>(a, &prm, prof)?;
        Ok(Self { prm, hierarchy, _coarsening: PhantomData })
    }

    pub fn prm(&self) -> &AmgParamsFor<B, C, R> {
        &self.prm
    }

    pub fn hierarchy(&self) -> &Hierarchy<B, R> {
        &self.hierarchy
    }

    /// Number of unknowns on the finest level.
    pub fn rows(&self) -> usize {
        self.hierarchy.levels.first().map_or(0, |l| l.rows)
    }

    fn check_dims(&self, rhs: &B::Vector, x: &B::Vector) -> Result<(), AmgError> {
        let n = self.rows();
        if B::len(rhs) != n || B::len(x) != n {
            return Err(AmgError::InvalidInput(format!(
                "vector lengths {} (rhs) and {} (x) do not match {} unknowns",
                B::len(rhs),
                B::len(x),
                n
            )));
        }
        Ok(())
    }

    /// Solve `A x = rhs` with the hierarchy as a standalone iterative method.
    ///
    /// `x` holds the initial guess on entry. Cycles until the relative residual
    /// `|rhs - A x| / |rhs|` drops to `tol` or `maxiter` cycles have run; at least
    /// one cycle is always performed. Running out of iterations is reported in
    /// the returned stats, not as an error.
    pub fn solve(&mut self, rhs: &B::Vector, x: &mut B::Vector) -> Result<SolveStats<B::Value>, AmgError> {
        self.solve_with_profiler(rhs, x, &mut NoProfiler)
    }

    pub fn solve_with_profiler(
        &mut self,
        rhs: &B::Vector,
        x: &mut B::Vector,
        prof: &mut dyn Profiler,
    ) -> Result<SolveStats<B::Value>, AmgError> {
        self.check_dims(rhs, x)?;
        let conv = Convergence { tol: scalar(self.prm.tol), max_iters: self.prm.maxiter };
        let norm_rhs = B::norm(rhs);
        let mut r = B::create_vector(self.rows(), &self.prm.backend);

        prof.tic("solve");
        let mut iter = 0;
        let stats = loop {
            self.hierarchy.cycle(&self.prm, rhs, x, prof);
            iter += 1;

            B::residual(rhs, self.hierarchy.system_matrix()?, x, &mut r);
            let (stop, stats) = conv.check(B::norm(&r), norm_rhs, iter);
            trace!("AMG iteration {iter}: residual {:?}", stats.final_residual);
            if stop {
                break stats;
            }
        };
        prof.toc("solve");

        if !stats.converged {
            warn!(
                "AMG did not converge in {} iterations (residual {:?}, tolerance {})",
                stats.iterations, stats.final_residual, self.prm.tol
            );
        }
        Ok(stats)
    }

    /// Apply the preconditioner: `x ≈ A⁻¹ rhs`.
    ///
    /// Runs `pre_cycles` cycles from a zero initial guess. With `pre_cycles == 0`
    /// the preconditioner is the identity and `rhs` is copied into `x`.
    pub fn apply(&mut self, rhs: &B::Vector, x: &mut B::Vector) -> Result<(), AmgError> {
        self.check_dims(rhs, x)?;
        if self.prm.pre_cycles == 0 {
            B::copy(rhs, x);
            return Ok(());
        }
        B::clear(x);
        for _ in 0..self.prm.pre_cycles {
            self.hierarchy.cycle(&self.prm, rhs, x, &mut NoProfiler);
        }
        Ok(())
    }

    /// Run a single cycle on the finest level, improving `x` in place.
    pub fn cycle(&mut self, rhs: &B::Vector, x: &mut B::Vector) -> Result<(), AmgError> {
        self.check_dims(rhs, x)?;
        self.hierarchy.cycle(&self.prm, rhs, x, &mut NoProfiler);
        Ok(())
    }

    /// Number of levels, including the coarsest.
    pub fn levels(&self) -> usize {
        self.hierarchy.len()
    }

    pub fn level_info(&self) -> Vec<LevelInfo> {
        self.hierarchy
            .levels()
            .iter()
            .map(|l| LevelInfo { rows: l.rows(), nonzeros: l.nonzeros() })
            .collect()
    }

    /// Total nonzeros over all levels divided by the nonzeros of the finest level.
    pub fn operator_complexity(&self) -> f64 {
        let info = self.level_info();
        let total: usize = info.iter().map(|l| l.nonzeros).sum();
        total as f64 / info.first().map_or(1, |l| l.nonzeros.max(1)) as f64
    }

    /// Total unknowns over all levels divided by the unknowns of the finest level.
    pub fn grid_complexity(&self) -> f64 {
        let info = self.level_info();
        let total: usize = info.iter().map(|l| l.rows).sum();
        total as f64 / info.first().map_or(1, |l| l.rows.max(1)) as f64
    }
}

impl<B, C, R> fmt::Display for Amg<B, C, R>
where
    B: Backend,
    C: Coarsening<B::Value>,
    R: Relaxation<B>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self.level_info();
        let sum_nnz: usize = info.iter().map(|l| l.nonzeros).sum();

        writeln!(f, "Number of levels:    {}", info.len())?;
        writeln!(f, "Operator complexity: {:.2}", self.operator_complexity())?;
        writeln!(f, "Grid complexity:     {:.2}", self.grid_complexity())?;
        writeln!(f)?;
        writeln!(f, "level     unknowns       nonzeros")?;
        writeln!(f, "---------------------------------")?;
        for (depth, l) in info.iter().enumerate() {
            let share = 100.0 * l.nonzeros as f64 / sum_nnz.max(1) as f64;
            writeln!(f, "{:>5}{:>13}{:>15} ({:>5.2}%)", depth, l.rows, l.nonzeros, share)?;
        }
        Ok(())
    }
}

impl<B, C, R> Preconditioner<B::Vector> for Amg<B, C, R>
where
    B: Backend,
    C: Coarsening<B::Value>,
    R: Relaxation<B>,
{
    fn apply(&mut self, r: &B::Vector, z: &mut B::Vector) -> Result<(), AmgError> {
        Amg::apply(self, r, z)
    }
}
