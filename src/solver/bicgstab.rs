//! Right-preconditioned BiCGStab (Saad §7.4.2)

use crate::core::traits::{InnerProduct, MatVec};
use crate::error::AmgError;
use crate::preconditioner::Preconditioner;
use crate::solver::LinearSolver;
use crate::utils::convergence::{Convergence, SolveStats};

pub struct BiCgStabSolver<T> {
    pub conv: Convergence<T>,
}

impl<T: num_traits::Float> BiCgStabSolver<T> {
    pub fn new(tol: T, max_iters: usize) -> Self {
        Self { conv: Convergence { tol, max_iters } }
    }
}

impl<M, V, T> LinearSolver<M, V> for BiCgStabSolver<T>
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
        let mut precondition = |r: &V, z: &mut V| -> Result<(), AmgError> {
            match pc.as_deref_mut() {
                Some(pc) => pc.apply(r, z),
                None => {
                    z.clone_from(r);
                    Ok(())
                }
            }
        };

        // r0 = b - A x0
        let mut r = V::from(vec![T::zero(); n]);
        a.matvec(x, &mut r);
        for (rj, &bj) in r.as_mut().iter_mut().zip(b.as_ref()) {
            *rj = bj - *rj;
        }
        let r_hat = r.clone(); // shadow residual
        let res0 = ip.norm(&r);
        let mut stats = SolveStats { iterations: 0, final_residual: res0, converged: false };
        if res0 == T::zero() {
            stats.converged = true;
            return Ok(stats);
        }

        let mut rho_prev = T::one();
        let mut alpha = T::one();
        let mut omega_prev = T::one();
        let mut v = V::from(vec![T::zero(); n]);
        let mut p = V::from(vec![T::zero(); n]);
        let mut p_hat = V::from(vec![T::zero(); n]);
        let mut s = V::from(vec![T::zero(); n]);
        let mut s_hat = V::from(vec![T::zero(); n]);
        let mut t = V::from(vec![T::zero(); n]);

        for i in 1..=self.conv.max_iters {
            let rho = ip.dot(&r_hat, &r);
            if rho.abs() < T::epsilon() * res0 * res0 {
                return Err(AmgError::Breakdown("rho vanished"));
            }
            let beta = (rho / rho_prev) * (alpha / omega_prev);
            // p = r + beta * (p - omega_prev * v)
            for ((p_j, &r_j), &v_j) in p.as_mut().iter_mut().zip(r.as_ref()).zip(v.as_ref()) {
                *p_j = r_j + beta * (*p_j - omega_prev * v_j);
            }
            precondition(&p, &mut p_hat)?;
            a.matvec(&p_hat, &mut v);
            let alpha_den = ip.dot(&r_hat, &v);
            if alpha_den == T::zero() {
                return Err(AmgError::Breakdown("(r_hat, v) vanished"));
            }
            alpha = rho / alpha_den;

            // s = r - alpha * v
            for ((s_j, &r_j), &v_j) in s.as_mut().iter_mut().zip(r.as_ref()).zip(v.as_ref()) {
                *s_j = r_j - alpha * v_j;
            }
            let (stop, st) = self.conv.check(ip.norm(&s), res0, i);
            if st.converged {
                for (xj, &pj) in x.as_mut().iter_mut().zip(p_hat.as_ref()) {
                    *xj = *xj + alpha * pj;
                }
                return Ok(st);
            }

            precondition(&s, &mut s_hat)?;
            a.matvec(&s_hat, &mut t);
            let omega_den = ip.dot(&t, &t);
            if omega_den == T::zero() {
                return Err(AmgError::Breakdown("(t, t) vanished"));
            }
            let omega = ip.dot(&t, &s) / omega_den;

            // x = x + alpha * p_hat + omega * s_hat
            for ((xj, &pj), &sj) in x.as_mut().iter_mut().zip(p_hat.as_ref()).zip(s_hat.as_ref()) {
                *xj = *xj + alpha * pj + omega * sj;
            }
            // r = s - omega * t
            for ((rj, &sj), &tj) in r.as_mut().iter_mut().zip(s.as_ref()).zip(t.as_ref()) {
                *rj = sj - omega * tj;
            }
            let (stop_r, st) = self.conv.check(ip.norm(&r), res0, i);
            stats = st;
            if stop || stop_r {
                break;
            }
            if omega == T::zero() {
                return Err(AmgError::Breakdown("omega vanished"));
            }
            rho_prev = rho;
            omega_prev = omega;
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[derive(Clone)]
    struct DenseMat {
        data: Vec<Vec<f64>>,
    }
    impl MatVec<Vec<f64>> for DenseMat {
        fn matvec(&self, x: &Vec<f64>, y: &mut Vec<f64>) {
            for (i, row) in self.data.iter().enumerate() {
                y[i] = row.iter().zip(x.iter()).map(|(a, b)| a * b).sum();
            }
        }
    }

    // Helper: well-conditioned non-symmetric 3x3 matrix
    fn nonsym_3x3() -> (DenseMat, Vec<f64>) {
        let data: Vec<Vec<f64>> = (0..3)
            .map(|i| (0..3).map(|j| if i == j { 4.0 } else { (i + 2 * j) as f64 * 0.25 + 0.5 }).collect())
            .collect();
        let a = DenseMat { data };
        let x_true = vec![1.0, 2.0, 3.0];
        let mut b = vec![0.0; 3];
        a.matvec(&x_true, &mut b);
        (a, b)
    }

    #[test]
    fn bicgstab_solves_well_conditioned_nonsym() {
        let (a, b) = nonsym_3x3();
        let mut x = vec![0.0; 3];
        let mut solver = BiCgStabSolver::new(1e-12, 100);
        let stats = solver.solve(&a, None, &b, &mut x).unwrap();
        let x_true = [1.0, 2.0, 3.0];
        for i in 0..3 {
            assert_abs_diff_eq!(x[i], x_true[i], epsilon = 1e-8);
        }
        assert!(stats.converged, "BiCGStab did not converge: stats = {:?}", stats);
    }

    struct ScalePc(f64);
    impl Preconditioner<Vec<f64>> for ScalePc {
        fn apply(&mut self, r: &Vec<f64>, z: &mut Vec<f64>) -> Result<(), AmgError> {
            for (zi, ri) in z.iter_mut().zip(r) {
                *zi = ri * self.0;
            }
            Ok(())
        }
    }

    #[test]
    fn preconditioned_solution_agrees() {
        let (a, b) = nonsym_3x3();
        let mut x = vec![0.0; 3];
        let mut pc = ScalePc(0.25);
        let stats = BiCgStabSolver::new(1e-12, 100).solve(&a, Some(&mut pc), &b, &mut x).unwrap();
        assert!(stats.converged);
        assert_abs_diff_eq!(x[2], 3.0, epsilon = 1e-8);
    }
}
