//! Multigrid cycle.
//!
//! One call smooths on the current level, restricts the residual, recurses on the
//! coarser levels, prolongates the correction back and smooths again. With
//! `ncycle = 1` this is a V-cycle, with `ncycle = 2` a W-cycle. The coarsest
//! level is solved directly.
//!
//! With `kcycle = k > 0` the coarse correction of every level whose depth is a
//! multiple of `k` is computed by two flexible CG iterations on the coarser
//! system, each preconditioned by one cycle from that coarser level (K-cycle).
//!
//! The cycle never allocates: the right-hand side and solution of the next
//! level are that level's own scratch vectors, moved out for the duration of
//! the recursive call and moved back afterwards.

use crate::backend::{Backend, DirectSolver};
use crate::config::AmgParams;
use crate::preconditioner::amg::builder::Hierarchy;
use crate::preconditioner::amg::level::{KrylovScratch, Level, LevelKind};
use crate::relaxation::Relaxation;
use crate::utils::Profiler;
use num_traits::{One, Zero};
use std::mem;

/// Flexible CG iterations per K-cycle coarse correction.
const KCYCLE_ITERS: usize = 2;

impl<B: Backend, R: Relaxation<B>> Hierarchy<B, R> {
    /// Run one cycle on the finest level: improve `x` for `A x = rhs` in place.
    pub fn cycle<CP, BP>(
        &mut self,
        prm: &AmgParams<CP, R::Params, BP>,
        rhs: &B::Vector,
        x: &mut B::Vector,
        prof: &mut dyn Profiler,
    ) {
        cycle_levels(&mut self.levels, 0, prm, rhs, x, prof);
    }
}

/// `levels[0]` is the level being solved, at `depth` in the hierarchy; the rest
/// are coarser.
fn cycle_levels<B, R, CP, BP>(
    levels: &mut [Level<B, R>],
    depth: usize,
    prm: &AmgParams<CP, R::Params, BP>,
    rhs: &B::Vector,
    x: &mut B::Vector,
    prof: &mut dyn Profiler,
) where
    B: Backend,
    R: Relaxation<B>,
{
    let Some((level, coarser)) = levels.split_first_mut() else {
        return;
    };
    let Level { kind, t, .. } = level;

    match kind {
        LevelKind::Coarsest { solve, .. } => {
            prof.tic("coarse solve");
            solve.solve(rhs, x);
            prof.toc("coarse solve");
        }
        LevelKind::Interior { a, p, r, relax } => {
            let krylov = prm.kcycle > 0 && depth % prm.kcycle == 0;
            for _ in 0..prm.ncycle {
                prof.tic("relax");
                for _ in 0..prm.npre {
                    relax.apply_pre(a, rhs, x, t, &prm.relax);
                }
                prof.toc("relax");

                prof.tic("residual");
                B::residual(rhs, a, x, t);
                prof.toc("residual");

                debug_assert!(!coarser.is_empty(), "interior level {depth} has no coarser level");
                let Some(next) = coarser.first_mut() else {
                    return;
                };
                let mut f = mem::take(&mut next.f);
                let mut u = mem::take(&mut next.u);

                prof.tic("restrict");
                B::spmv(B::Value::one(), r, t, B::Value::zero(), &mut f);
                prof.toc("restrict");
                B::clear(&mut u);

                if krylov {
                    kcycle_levels(coarser, depth + 1, prm, &f, &mut u, prof);
                } else {
                    cycle_levels(coarser, depth + 1, prm, &f, &mut u, prof);
                }

                prof.tic("prolongate");
                B::spmv(B::Value::one(), p, &u, B::Value::one(), x);
                prof.toc("prolongate");

                if let Some(next) = coarser.first_mut() {
                    next.f = f;
                    next.u = u;
                }

                prof.tic("relax");
                for _ in 0..prm.npost {
                    relax.apply_post(a, rhs, x, t, &prm.relax);
                }
                prof.toc("relax");
            }
        }
    }
}

/// Approximately solve `levels[0].a x = rhs` from `x = 0` with flexible CG,
/// preconditioned by one cycle from `levels[0]`. Levels without Krylov
/// scratch (the coarsest one in particular) fall back to a single cycle.
fn kcycle_levels<B, R, CP, BP>(
    levels: &mut [Level<B, R>],
    depth: usize,
    prm: &AmgParams<CP, R::Params, BP>,
    rhs: &B::Vector,
    x: &mut B::Vector,
    prof: &mut dyn Profiler,
) where
    B: Backend,
    R: Relaxation<B>,
{
    let Some(KrylovScratch { mut r, mut s, mut d, mut q }) = levels.first_mut().and_then(|l| l.krylov.take())
    else {
        cycle_levels(levels, depth, prm, rhs, x, prof);
        return;
    };

    prof.tic("kcycle");
    B::copy(rhs, &mut r);
    B::clear(x);
    let mut rho_prev = B::Value::zero();
    for iter in 0..KCYCLE_ITERS {
        B::clear(&mut s);
        cycle_levels(levels, depth, prm, &r, &mut s, prof);

        let rho = B::inner_product(&r, &s);
        if rho == B::Value::zero() {
            break;
        }
        if iter == 0 {
            B::copy(&s, &mut d);
        } else {
            B::axpby(B::Value::one(), &s, rho / rho_prev, &mut d);
        }
        rho_prev = rho;

        let Some(a) = levels.first().and_then(|l| l.matrix()) else {
            break;
        };
        B::spmv(B::Value::one(), a, &d, B::Value::zero(), &mut q);
        let dq = B::inner_product(&d, &q);
        if dq == B::Value::zero() {
            break;
        }
        let alpha = rho / dq;
        B::axpby(alpha, &d, B::Value::one(), x);
        B::axpby(-alpha, &q, B::Value::one(), &mut r);
    }
    prof.toc("kcycle");

    if let Some(level) = levels.first_mut() {
        level.krylov = Some(KrylovScratch { r, s, d, q });
    }
}
