//! One level of the AMG hierarchy.

use crate::backend::{Backend, DirectSolver};
use crate::error::AmgError;
use crate::matrix::CsrMatrix;
use crate::relaxation::Relaxation;

/// Operators owned by a level.
pub enum LevelKind<B: Backend, R> {
    /// Every level except the last: system matrix, transfer operators to the
    /// next coarser level and the smoother bound to `a`.
    Interior {
        a: B::Matrix,
        p: B::Matrix,
        r: B::Matrix,
        relax: R,
    },
    /// The last level. `a` is kept only when this is also the finest level,
    /// where `solve` needs it to measure residuals.
    Coarsest {
        a: Option<B::Matrix>,
        solve: B::DirectSolver,
    },
}

/// Work vectors of the flexible CG iterations run on a level during a K-cycle.
pub(crate) struct KrylovScratch<B: Backend> {
    pub(crate) r: B::Vector,
    pub(crate) s: B::Vector,
    pub(crate) d: B::Vector,
    pub(crate) q: B::Vector,
}

impl<B: Backend> KrylovScratch<B> {
    fn new(rows: usize, prm: &B::Params) -> Self {
        Self {
            r: B::create_vector(rows, prm),
            s: B::create_vector(rows, prm),
            d: B::create_vector(rows, prm),
            q: B::create_vector(rows, prm),
        }
    }
}

pub struct Level<B: Backend, R> {
    pub(crate) rows: usize,
    pub(crate) nonzeros: usize,
    /// Right-hand side for this level during a cycle.
    pub(crate) f: B::Vector,
    /// Solution (coarse correction) for this level during a cycle.
    pub(crate) u: B::Vector,
    /// Residual scratch.
    pub(crate) t: B::Vector,
    /// Present when the coarse correction arriving at this level is
    /// Krylov-accelerated.
    pub(crate) krylov: Option<KrylovScratch<B>>,
    pub(crate) kind: LevelKind<B, R>,
}

impl<B: Backend, R: Relaxation<B>> Level<B, R> {
    pub(crate) fn interior(
        a: CsrMatrix<B::Value>,
        p: CsrMatrix<B::Value>,
        r: CsrMatrix<B::Value>,
        relax_prm: &R::Params,
        krylov: bool,
        prm: &B::Params,
    ) -> Result<Self, AmgError> {
        let rows = a.nrows();
        let nonzeros = a.nnz();
        debug_assert_eq!(p.nrows(), rows);
        debug_assert_eq!(r.ncols(), rows);
        debug_assert_eq!(r.nrows(), p.ncols());

        let relax = R::new(&a, relax_prm, prm)?;
        Ok(Self {
            rows,
            nonzeros,
            f: B::create_vector(rows, prm),
            u: B::create_vector(rows, prm),
            t: B::create_vector(rows, prm),
            krylov: krylov.then(|| KrylovScratch::new(rows, prm)),
            kind: LevelKind::Interior {
                a: B::copy_matrix(a, prm),
                p: B::copy_matrix(p, prm),
                r: B::copy_matrix(r, prm),
                relax,
            },
        })
    }

    pub(crate) fn coarsest(a: CsrMatrix<B::Value>, keep_matrix: bool, prm: &B::Params) -> Result<Self, AmgError> {
        let rows = a.nrows();
        let nonzeros = a.nnz();
        let kept = keep_matrix.then(|| B::copy_matrix(a.clone(), prm));
        let solve = B::DirectSolver::new(a, prm)?;
        Ok(Self {
            rows,
            nonzeros,
            f: B::create_vector(rows, prm),
            u: B::create_vector(rows, prm),
            t: B::create_vector(rows, prm),
            krylov: None,
            kind: LevelKind::Coarsest { a: kept, solve },
        })
    }
}

impl<B: Backend, R> Level<B, R> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn nonzeros(&self) -> usize {
        self.nonzeros
    }

    pub fn is_coarsest(&self) -> bool {
        matches!(self.kind, LevelKind::Coarsest { .. })
    }

    /// Whether cycles solve this level with flexible CG instead of a single cycle.
    pub fn is_krylov_accelerated(&self) -> bool {
        self.krylov.is_some()
    }

    /// System matrix of this level, if retained.
    pub fn matrix(&self) -> Option<&B::Matrix> {
        match &self.kind {
            LevelKind::Interior { a, .. } => Some(a),
            LevelKind::Coarsest { a, .. } => a.as_ref(),
        }
    }

    /// Prolongation to this level from the next coarser one.
    pub fn prolongation(&self) -> Option<&B::Matrix> {
        match &self.kind {
            LevelKind::Interior { p, .. } => Some(p),
            LevelKind::Coarsest { .. } => None,
        }
    }

    /// Restriction from this level to the next coarser one.
    pub fn restriction(&self) -> Option<&B::Matrix> {
        match &self.kind {
            LevelKind::Interior { r, .. } => Some(r),
            LevelKind::Coarsest { .. } => None,
        }
    }

    pub fn relaxation(&self) -> Option<&R> {
        match &self.kind {
            LevelKind::Interior { relax, .. } => Some(relax),
            LevelKind::Coarsest { .. } => None,
        }
    }
}
