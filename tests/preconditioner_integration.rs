//! Integration tests for AMG used as a preconditioner inside Krylov solvers.
//!
//! The hierarchy is consumed only through `Preconditioner::apply`; these tests
//! check that PCG and BiCGStab converge with it, that it cuts the iteration count
//! compared to the unpreconditioned solvers, and that the solutions agree with
//! a direct factorization.

use approx::assert_abs_diff_eq;
use kryst_amg::coarsening::Aggregation;
use kryst_amg::matrix::CsrMatrix;
use kryst_amg::preconditioner::{Amg, CpuAmg, Preconditioner};
use kryst_amg::relaxation::DampedJacobi;
use kryst_amg::solver::{BiCgStabSolver, LinearSolver, PcgSolver};
use kryst_amg::{Backend, CpuBackend};
use rand::Rng;

/// 5-point Laplacian on an `m x m` grid. Returns the matrix, `b = A * 1` and the
/// true solution of ones.
fn spd_matrix(m: usize) -> (CsrMatrix<f64>, Vec<f64>, Vec<f64>) {
    let n = m * m;
    let mut t = Vec::with_capacity(5 * n);
    for j in 0..m {
        for i in 0..m {
            let k = j * m + i;
            t.push((k, k, 4.0));
            if i > 0 {
                t.push((k, k - 1, -1.0));
            }
            if i + 1 < m {
                t.push((k, k + 1, -1.0));
            }
            if j > 0 {
                t.push((k, k - m, -1.0));
            }
            if j + 1 < m {
                t.push((k, k + m, -1.0));
            }
        }
    }
    let a = CsrMatrix::from_triplets(n, n, &t).unwrap();
    let x_true = vec![1.0; n];
    let mut b = vec![0.0; n];
    CpuBackend::spmv(1.0, &a, &x_true, 0.0, &mut b);
    (a, b, x_true)
}

/// 1-D convection-diffusion with upwinded convection: non-symmetric, diagonally dominant.
fn nonsym_matrix(n: usize) -> (CsrMatrix<f64>, Vec<f64>, Vec<f64>) {
    let mut t = Vec::with_capacity(3 * n);
    for i in 0..n {
        t.push((i, i, 2.5));
        if i > 0 {
            t.push((i, i - 1, -1.5));
        }
        if i + 1 < n {
            t.push((i, i + 1, -1.0));
        }
    }
    let a = CsrMatrix::from_triplets(n, n, &t).unwrap();
    let mut rng = rand::thread_rng();
    let x_true: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let mut b = vec![0.0; n];
    CpuBackend::spmv(1.0, &a, &x_true, 0.0, &mut b);
    (a, b, x_true)
}

/// Compute the relative L2 error between two vectors.
fn rel_error(x: &[f64], x_true: &[f64]) -> f64 {
    let num: f64 = x.iter().zip(x_true).map(|(xi, ti)| (xi - ti).powi(2)).sum();
    let denom: f64 = x_true.iter().map(|ti| ti.powi(2)).sum();
    (num / denom).sqrt()
}

#[test]
fn pcg_with_amg_converges_fast() {
    let (a, b, x_true) = spd_matrix(64);
    let mut amg = CpuAmg::new(a.clone(), CpuAmg::params().with_coarse_enough(100)).unwrap();
    assert!(amg.levels() > 1);

    let mut x = vec![0.0; b.len()];
    let mut solver = PcgSolver::new(1e-8, 200);
    let stats = solver.solve(&a, Some(&mut amg), &b, &mut x).unwrap();
    assert!(stats.converged, "PCG + AMG did not converge: {stats:?}");
    assert!(stats.iterations <= 25, "PCG + AMG took {} iterations", stats.iterations);
    assert!(rel_error(&x, &x_true) < 1e-6);
}

#[test]
fn pcg_with_kcycle_amg_converges() {
    let (a, b, x_true) = spd_matrix(64);
    let prm = CpuAmg::params().with_coarse_enough(100).with_kcycle(1);
    let mut amg = CpuAmg::new(a.clone(), prm).unwrap();
    let mut x = vec![0.0; b.len()];
    let stats = PcgSolver::new(1e-8, 200).solve(&a, Some(&mut amg), &b, &mut x).unwrap();
    assert!(stats.converged, "PCG + K-cycle AMG did not converge: {stats:?}");
    assert!(rel_error(&x, &x_true) < 1e-6);
}

#[test]
fn amg_reduces_pcg_iterations() {
    let (a, b, _) = spd_matrix(48);
    let mut amg = CpuAmg::new(a.clone(), CpuAmg::params().with_coarse_enough(100)).unwrap();

    let mut x_plain = vec![0.0; b.len()];
    let plain = PcgSolver::new(1e-8, 1000).solve(&a, None, &b, &mut x_plain).unwrap();
    let mut x_amg = vec![0.0; b.len()];
    let pre = PcgSolver::new(1e-8, 1000).solve(&a, Some(&mut amg), &b, &mut x_amg).unwrap();

    assert!(plain.converged && pre.converged);
    assert!(pre.iterations * 2 < plain.iterations, "AMG: {}, none: {}", pre.iterations, plain.iterations);
    for (p, q) in x_plain.iter().zip(&x_amg) {
        assert_abs_diff_eq!(*p, *q, epsilon = 1e-6);
    }
}

#[test]
fn bicgstab_with_amg_on_nonsymmetric_system() {
    let (a, b, x_true) = nonsym_matrix(2000);
    let mut amg = CpuAmg::new(a.clone(), CpuAmg::params().with_coarse_enough(100)).unwrap();
    let mut x = vec![0.0; b.len()];
    let stats = BiCgStabSolver::new(1e-12, 100).solve(&a, Some(&mut amg), &b, &mut x).unwrap();
    assert!(stats.converged, "BiCGStab + AMG did not converge: {stats:?}");
    assert!(stats.iterations <= 40);
    assert!(rel_error(&x, &x_true) < 1e-6);
}

#[test]
fn unsmoothed_aggregation_with_jacobi_preconditions_pcg() {
    type Amg0 = Amg<CpuBackend, Aggregation, DampedJacobi<CpuBackend>>;
    let (a, b, x_true) = spd_matrix(40);
    let mut amg = Amg0::new(a.clone(), Amg0::params().with_coarse_enough(80)).unwrap();
    let mut x = vec![0.0; b.len()];
    let stats = PcgSolver::new(1e-8, 300).solve(&a, Some(&mut amg), &b, &mut x).unwrap();
    assert!(stats.converged);
    assert!(rel_error(&x, &x_true) < 1e-6);
}

#[test]
fn solution_matches_direct_factorization() {
    let (a, b, _) = spd_matrix(20);
    let dense = a.to_dense();
    let lu = faer::linalg::solvers::PartialPivLu::new(dense.as_ref());
    let mut x_direct = b.clone();
    {
        use faer::linalg::solvers::SolveCore;
        let n = x_direct.len();
        let x_mat = faer::MatMut::from_column_major_slice_mut(&mut x_direct, n, 1);
        lu.solve_in_place_with_conj(faer::Conj::No, x_mat);
    }

    let mut amg = CpuAmg::new(a.clone(), CpuAmg::params().with_coarse_enough(50)).unwrap();
    let mut x = vec![0.0; b.len()];
    PcgSolver::new(1e-12, 100).solve(&a, Some(&mut amg), &b, &mut x).unwrap();
    for (xi, di) in x.iter().zip(&x_direct) {
        assert_abs_diff_eq!(*xi, *di, epsilon = 1e-9);
    }
}

#[test]
fn preconditioner_trait_object_is_the_amg_apply() {
    let (a, b, _) = spd_matrix(16);
    let mut amg = CpuAmg::new(a, CpuAmg::params().with_coarse_enough(30).with_pre_cycles(2)).unwrap();
    let mut z_direct = vec![0.0; b.len()];
    amg.apply(&b, &mut z_direct).unwrap();

    let pc: &mut dyn Preconditioner<Vec<f64>> = &mut amg;
    let mut z_dyn = vec![1.0; b.len()];
    pc.apply(&b, &mut z_dyn).unwrap();
    assert_eq!(z_direct, z_dyn);
}
