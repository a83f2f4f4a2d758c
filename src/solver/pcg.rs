//! Preconditioned Conjugate Gradient (PCG) per Saad §9.2

use crate::core::traits::{InnerProduct, MatVec};
use crate::error::AmgError;
use crate::preconditioner::Preconditioner;
use crate::solver::LinearSolver;
use crate::utils::convergence::{Convergence, SolveStats};

pub struct PcgSolver<T> {
    pub conv: Convergence<T>,
    /// Unpreconditioned residual norm after every iteration, starting with the initial one.
    pub residual_history: Vec<T>,
}

impl<T: Copy + num_traits::Float> PcgSolver<T> {
    pub fn new(tol: T, max_iters: usize) -> Self {
        Self { conv: Convergence { tol, max_iters }, residual_history: Vec::new() }
    }
}

fn precondition<V: Clone>(pc: &mut Option<&mut dyn Preconditioner<V>>, r: &V, z: &mut V) -> Result<(), AmgError> {
    match pc.as_deref_mut() {
        Some(pc) => pc.apply(r, z),
        None => {
            z.clone_from(r);
            Ok(())
        }
    }
}

impl<M, V, T> LinearSolver<M, V> for PcgSolver<T>
where
    M: MatVec<V>,
    (): InnerProduct<V, Scalar = T>,
    V: AsMut<[T]> + AsRef<[T]> + From<Vec<T>> + Clone,
    T: num_traits::Float + From<f64>,
{
    type Scalar = T;

    fn solve(
        &mut self,
        a: &M,
        mut pc: Option<&mut dyn Preconditioner<V>>,
        b: &V,
        x: &mut V,
    ) -> Result<SolveStats<T>, AmgError> {
        let n = b.as_ref().len();
        if x.as_ref().len() != n {
            return Err(AmgError::InvalidInput(format!("x has length {}, b has length {n}", x.as_ref().len())));
        }
        let ip = ();
        self.residual_history.clear();

        let mut r = V::from(vec![T::zero(); n]);
        a.matvec(x, &mut r);
        for (rj, &bj) in r.as_mut().iter_mut().zip(b.as_ref()) {
            *rj = bj - *rj;
        }
        let res0 = ip.norm(&r);
        self.residual_history.push(res0);
        let mut stats = SolveStats { iterations: 0, final_residual: res0, converged: false };
        if res0 == T::zero() {
            stats.converged = true;
            return Ok(stats);
        }

        let mut z = V::from(vec![T::zero(); n]);
        precondition(&mut pc, &r, &mut z)?;
        let mut p = z.clone();
        let mut rz = ip.dot(&r, &z);
        let mut ap = V::from(vec![T::zero(); n]);

        for i in 0..self.conv.max_iters {
            a.matvec(&p, &mut ap);
            let p_dot_ap = ip.dot(&p, &ap);
            // Indefinite-matrix detection
            if p_dot_ap <= T::zero() {
                return Err(AmgError::Breakdown("indefinite matrix"));
            }
            let alpha = rz / p_dot_ap;
            for (xj, &pj) in x.as_mut().iter_mut().zip(p.as_ref()) {
                *xj = *xj + alpha * pj;
            }
            for (rj, &apj) in r.as_mut().iter_mut().zip(ap.as_ref()) {
                *rj = *rj - alpha * apj;
            }

            let res_norm = ip.norm(&r);
            self.residual_history.push(res_norm);
            let (stop, s) = self.conv.check(res_norm, res0, i + 1);
            stats = s;
            if stop {
                break;
            }

            precondition(&mut pc, &r, &mut z)?;
            let rz_new = ip.dot(&r, &z);
            let beta = rz_new / rz;
            // Indefinite-preconditioner detection
            if beta < T::zero() {
                return Err(AmgError::Breakdown("indefinite preconditioner"));
            }
            for (pj, &zj) in p.as_mut().iter_mut().zip(z.as_ref()) {
                *pj = zj + beta * *pj;
            }
            rz = rz_new;
        }
        Ok(stats)
    }
}
