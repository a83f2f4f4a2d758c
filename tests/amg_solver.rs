//! End-to-end behaviour of the AMG solver and preconditioner.
//!
//! Covers the direct single-level case, multigrid convergence on 1-D Poisson
//! (including iteration counts that do not grow with the problem size), the
//! fixed-point property of a cycle, the identity preconditioner obtained with
//! `pre_cycles = 0`, and the solve-time error paths.

use approx::assert_abs_diff_eq;
use kryst_amg::coarsening::SmoothedAggregation;
use kryst_amg::matrix::CsrMatrix;
use kryst_amg::preconditioner::{Amg, CpuAmg};
use kryst_amg::relaxation::GaussSeidel;
use kryst_amg::utils::Profile;
use kryst_amg::{AmgError, Backend, CpuBackend};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

type GsAmg = Amg<CpuBackend, SmoothedAggregation, GaussSeidel>;

fn poisson_1d(n: usize) -> CsrMatrix<f64> {
    let mut t = Vec::with_capacity(3 * n);
    for i in 0..n {
        t.push((i, i, 2.0));
        if i > 0 {
            t.push((i, i - 1, -1.0));
        }
        if i + 1 < n {
            t.push((i, i + 1, -1.0));
        }
    }
    CsrMatrix::from_triplets(n, n, &t).unwrap()
}

fn random_vector(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

fn residual_norm(a: &CsrMatrix<f64>, rhs: &[f64], x: &[f64]) -> f64 {
    let mut r = vec![0.0; rhs.len()];
    CpuBackend::residual(&rhs.to_vec(), a, &x.to_vec(), &mut r);
    CpuBackend::norm(&r)
}

/// Iterations a V(1,1) Gauss-Seidel cycle needs on 1-D Poisson of size `n`.
fn poisson_iterations(n: usize) -> usize {
    let prm = GsAmg::params().with_coarse_enough(50).with_tol(1e-6);
    let mut amg = GsAmg::new(poisson_1d(n), prm).unwrap();
    let rhs = random_vector(n, 7);
    let mut x = vec![0.0; n];
    let stats = amg.solve(&rhs, &mut x).unwrap();
    assert!(stats.converged, "n = {n}: {stats:?}");
    assert!(residual_norm(&poisson_1d(n), &rhs, &x) <= 1e-6 * CpuBackend::norm(&rhs));
    stats.iterations
}

#[test]
fn small_system_is_solved_directly() {
    let a = poisson_1d(5);
    let mut amg = CpuAmg::new(a.clone(), CpuAmg::params().with_coarse_enough(10)).unwrap();
    assert_eq!(amg.levels(), 1);
    assert!(amg.hierarchy().levels()[0].is_coarsest());

    for seed in 0..3 {
        let rhs = random_vector(5, seed);
        let mut x = vec![0.0; 5];
        let stats = amg.solve(&rhs, &mut x).unwrap();
        assert!(stats.converged);
        assert_eq!(stats.iterations, 1);
        assert_abs_diff_eq!(stats.final_residual, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(residual_norm(&a, &rhs, &x), 0.0, epsilon = 1e-12);
    }
}

#[test]
fn poisson_1000_converges_quickly() {
    let prm = GsAmg::params().with_coarse_enough(50).with_npre(1).with_npost(1).with_ncycle(1);
    let mut amg = GsAmg::new(poisson_1d(1000), prm.with_tol(1e-6)).unwrap();
    assert!(amg.levels() >= 3);
    let rhs = random_vector(1000, 1);
    let mut x = vec![0.0; 1000];
    let stats = amg.solve(&rhs, &mut x).unwrap();
    assert!(stats.converged);
    assert!(stats.iterations < 30, "took {} iterations", stats.iterations);
    assert!(stats.final_residual <= 1e-6);
}

#[test]
fn iteration_count_does_not_grow_with_size() {
    let small = poisson_iterations(1000);
    let large = poisson_iterations(8000);
    assert!(small < 30 && large < 30);
    assert!(large <= small + 4, "1000 rows: {small} iterations, 8000 rows: {large}");
}

#[test]
fn spai0_smoothing_converges() {
    let prm = CpuAmg::params().with_coarse_enough(50).with_tol(1e-6).with_maxiter(100);
    let mut amg = CpuAmg::new(poisson_1d(1000), prm).unwrap();
    let rhs = random_vector(1000, 3);
    let mut x = vec![0.0; 1000];
    let stats = amg.solve(&rhs, &mut x).unwrap();
    assert!(stats.converged, "{stats:?}");
}

#[test]
fn w_cycle_needs_no_more_iterations_than_v_cycle() {
    let run = |ncycle: usize| {
        let prm = GsAmg::params().with_coarse_enough(50).with_tol(1e-8).with_ncycle(ncycle);
        let mut amg = GsAmg::new(poisson_1d(2000), prm).unwrap();
        let rhs = random_vector(2000, 11);
        let mut x = vec![0.0; 2000];
        amg.solve(&rhs, &mut x).unwrap().iterations
    };
    assert!(run(2) <= run(1));
}

#[test]
fn kcycle_needs_no_more_iterations_than_v_cycle() {
    let run = |kcycle: usize| {
        let prm = GsAmg::params().with_coarse_enough(50).with_tol(1e-8).with_kcycle(kcycle);
        let mut amg = GsAmg::new(poisson_1d(2000), prm).unwrap();
        let rhs = random_vector(2000, 11);
        let mut x = vec![0.0; 2000];
        let stats = amg.solve(&rhs, &mut x).unwrap();
        assert!(stats.converged, "kcycle = {kcycle}: {stats:?}");
        stats.iterations
    };
    assert!(run(1) <= run(0));
}

#[test]
fn default_coarse_level_size_converges() {
    // coarsest level of up to 300 rows solved by the dense LU
    let mut amg = CpuAmg::new(poisson_1d(3000), CpuAmg::params().with_tol(1e-6)).unwrap();
    assert!(amg.levels() >= 2);
    let rhs = random_vector(3000, 17);
    let mut x = vec![0.0; 3000];
    let stats = amg.solve(&rhs, &mut x).unwrap();
    assert!(stats.converged, "{stats:?}");
    assert!(stats.final_residual.is_finite());
}

#[test]
fn exact_solution_is_a_fixed_point() {
    let n = 1000;
    let a = poisson_1d(n);
    let mut amg = CpuAmg::new(a.clone(), CpuAmg::params().with_coarse_enough(50)).unwrap();
    let x_exact = random_vector(n, 5);
    let mut rhs = vec![0.0; n];
    CpuBackend::spmv(1.0, &a, &x_exact, 0.0, &mut rhs);

    let mut x = x_exact.clone();
    let before = residual_norm(&a, &rhs, &x);
    amg.cycle(&rhs, &mut x).unwrap();
    let after = residual_norm(&a, &rhs, &x);
    assert!(after <= before + 1e-12 * CpuBackend::norm(&rhs), "before {before:e}, after {after:e}");
    for (xi, ei) in x.iter().zip(&x_exact) {
        assert_abs_diff_eq!(*xi, *ei, epsilon = 1e-8);
    }
}

#[test]
fn zero_pre_cycles_make_apply_the_identity() {
    let prm = CpuAmg::params().with_coarse_enough(50).with_pre_cycles(0);
    let mut amg = CpuAmg::new(poisson_1d(500), prm).unwrap();
    let rhs = random_vector(500, 9);
    let mut x = random_vector(500, 10);
    amg.apply(&rhs, &mut x).unwrap();
    assert_eq!(x, rhs);
}

#[test]
fn apply_ignores_the_initial_contents_of_x() {
    let mut amg = CpuAmg::new(poisson_1d(500), CpuAmg::params().with_coarse_enough(50)).unwrap();
    let rhs = random_vector(500, 12);
    let mut x1 = vec![0.0; 500];
    let mut x2 = random_vector(500, 13);
    amg.apply(&rhs, &mut x1).unwrap();
    amg.apply(&rhs, &mut x2).unwrap();
    assert_eq!(x1, x2);
}

#[test]
fn repeated_solves_are_reproducible() {
    let prm = CpuAmg::params().with_coarse_enough(50);
    let mut a = CpuAmg::new(poisson_1d(1500), prm.clone()).unwrap();
    let mut b = CpuAmg::new(poisson_1d(1500), prm).unwrap();
    let rhs = random_vector(1500, 21);
    let (mut xa, mut xb) = (vec![0.0; 1500], vec![0.0; 1500]);
    let sa = a.solve(&rhs, &mut xa).unwrap();
    let sb = b.solve(&rhs, &mut xb).unwrap();
    assert_eq!(sa, sb);
    assert_eq!(xa, xb);
}

#[test]
fn iteration_cap_is_reported_not_raised() {
    let prm = CpuAmg::params().with_coarse_enough(50).with_tol(1e-14).with_maxiter(2);
    let mut amg = CpuAmg::new(poisson_1d(1000), prm).unwrap();
    let rhs = random_vector(1000, 4);
    let mut x = vec![0.0; 1000];
    let stats = amg.solve(&rhs, &mut x).unwrap();
    assert!(!stats.converged);
    assert_eq!(stats.iterations, 2);
    assert!(stats.final_residual < 1.0);
}

#[test]
fn zero_rhs_gives_zero_solution() {
    let mut amg = CpuAmg::new(poisson_1d(600), CpuAmg::params().with_coarse_enough(50)).unwrap();
    let rhs = vec![0.0; 600];
    let mut x = vec![0.0; 600];
    let stats = amg.solve(&rhs, &mut x).unwrap();
    assert!(stats.converged);
    assert_eq!(stats.iterations, 1);
    assert!(x.iter().all(|&v| v == 0.0));
}

#[test]
fn mismatched_vectors_are_rejected() {
    let mut amg = CpuAmg::new(poisson_1d(100), CpuAmg::params().with_coarse_enough(20)).unwrap();
    let mut x = vec![0.0; 100];
    assert!(matches!(amg.solve(&vec![1.0; 99], &mut x), Err(AmgError::InvalidInput(_))));
    assert!(matches!(amg.cycle(&vec![1.0; 100], &mut vec![0.0; 101]), Err(AmgError::InvalidInput(_))));
    let mut short = vec![0.0; 10];
    assert!(matches!(amg.apply(&vec![1.0; 100], &mut short), Err(AmgError::InvalidInput(_))));
}

#[test]
fn solve_phases_are_profiled() {
    let mut amg = CpuAmg::new(poisson_1d(1000), CpuAmg::params().with_coarse_enough(50)).unwrap();
    let mut prof = Profile::new();
    let rhs = random_vector(1000, 2);
    let mut x = vec![0.0; 1000];
    let stats = amg.solve_with_profiler(&rhs, &mut x, &mut prof).unwrap();
    assert_eq!(prof.region("solve").unwrap().calls, 1);
    assert_eq!(prof.region("coarse solve").unwrap().calls, stats.iterations);
    assert_eq!(prof.region("restrict").unwrap().calls, stats.iterations * (amg.levels() - 1));
}
