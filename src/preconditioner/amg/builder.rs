//! Hierarchy construction.
//!
//! Starting from the finest matrix, the builder repeatedly asks the coarsening
//! strategy for transfer operators and a coarse operator until the level is small
//! enough for the direct solver. All intermediate matrices are [`CsrMatrix`]; each
//! finished operator is moved into backend storage as its level is pushed.

use crate::backend::Backend;
use crate::coarsening::Coarsening;
use crate::config::AmgParams;
use crate::error::AmgError;
use crate::matrix::CsrMatrix;
use crate::preconditioner::amg::level::Level;
use crate::relaxation::Relaxation;
use crate::utils::Profiler;
use log::{debug, info};

/// Levels ordered from finest (index 0) to coarsest (last).
pub struct Hierarchy<B: Backend, R> {
    pub(crate) levels: Vec<Level<B, R>>,
}

impl<B: Backend, R: Relaxation<B>> Hierarchy<B, R> {
    pub fn build<C: Coarsening<B::Value>>(
        a: CsrMatrix<B::Value>,
        prm: &AmgParams<C::Params, R::Params, B::Params>,
        prof: &mut dyn Profiler,
    ) -> Result<Self, AmgError> {
        prm.validate()?;
        if !a.is_square() {
            return Err(AmgError::InvalidInput(format!(
                "system matrix must be square, got {}x{}",
                a.nrows(),
                a.ncols()
            )));
        }
        if a.nrows() == 0 {
            return Err(AmgError::InvalidInput("system matrix is empty".into()));
        }

        prof.tic("setup");
        let result = Self::build_levels::<C>(a, prm, prof);
        prof.toc("setup");
        let hierarchy = result?;

        info!(
            "AMG hierarchy: {} levels, {} -> {} unknowns",
            hierarchy.levels.len(),
            hierarchy.levels.first().map_or(0, |l| l.rows),
            hierarchy.levels.last().map_or(0, |l| l.rows),
        );
        Ok(hierarchy)
    }

    fn build_levels<C: Coarsening<B::Value>>(
        mut a: CsrMatrix<B::Value>,
        prm: &AmgParams<C::Params, R::Params, B::Params>,
        prof: &mut dyn Profiler,
    ) -> Result<Self, AmgError> {
        a.sort_rows();
        let mut levels = Vec::new();

        while a.nrows() > prm.coarse_enough {
            let level = levels.len();
            let rows = a.nrows();

            prof.tic("transfer operators");
            let transfer = C::transfer_operators(&a, &prm.coarsening);
            prof.toc("transfer operators");
            let (p, r) = transfer?;

            if p.ncols() == 0 || p.ncols() >= rows {
                return Err(AmgError::DegenerateCoarsening { level, rows, cols: p.ncols() });
            }
            if p.nrows() != rows || r.nrows() != p.ncols() || r.ncols() != rows {
                return Err(AmgError::InvalidInput(format!(
                    "level {level}: transfer operators do not match a {rows}x{rows} matrix \
                     (P is {}x{}, R is {}x{})",
                    p.nrows(),
                    p.ncols(),
                    r.nrows(),
                    r.ncols()
                )));
            }

            prof.tic("coarse operator");
            let coarse = C::coarse_operator(&a, &p, &r, &prm.coarsening);
            prof.toc("coarse operator");
            let mut coarse = coarse?;
            coarse.sort_rows();

            debug!(
                "level {level}: {rows} rows, {} nonzeros, coarse size {}",
                a.nnz(),
                coarse.nrows()
            );

            // level `l` is K-cycle accelerated when its parent `l - 1` is a K-cycle level
            let krylov = prm.kcycle > 0 && level > 0 && (level - 1) % prm.kcycle == 0;

            prof.tic("relaxation setup");
            let built = Level::interior(a, p, r, &prm.relax, krylov, &prm.backend);
            prof.toc("relaxation setup");
            levels.push(built?);
            a = coarse;
        }

        debug!(
            "level {}: {} rows, {} nonzeros, direct solve",
            levels.len(),
            a.nrows(),
            a.nnz()
        );
        prof.tic("coarsest level");
        let keep_matrix = levels.is_empty();
        let coarsest = Level::coarsest(a, keep_matrix, &prm.backend);
        prof.toc("coarsest level");
        levels.push(coarsest?);

        Ok(Self { levels })
    }
}

impl<B: Backend, R> Hierarchy<B, R> {
    pub fn levels(&self) -> &[Level<B, R>] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always false once built.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Matrix of the finest level.
    pub fn system_matrix(&self) -> Result<&B::Matrix, AmgError> {
        self.levels
            .first()
            .and_then(|l| l.matrix())
            .ok_or(AmgError::Unsupported("hierarchy has no finest-level matrix"))
    }
}
