//! Solve a 2-D Poisson problem with AMG, standalone and as a PCG preconditioner.
//!
//! Run with `RUST_LOG=debug cargo run --release --example poisson -- 200` to see
//! the hierarchy being built level by level.

use kryst_amg::matrix::CsrMatrix;
use kryst_amg::preconditioner::CpuAmg;
use kryst_amg::solver::{LinearSolver, PcgSolver};
use kryst_amg::utils::Profile;
use std::time::Instant;

fn poisson_2d(m: usize) -> CsrMatrix<f64> {
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
    CsrMatrix::from_triplets(n, n, &t).unwrap()
}

fn main() {
    env_logger::init();
    let m: usize = std::env::args().nth(1).and_then(|s| s.parse().ok()).unwrap_or(100);
    let a = poisson_2d(m);
    let n = a.nrows();
    let rhs = vec![1.0; n];

    let mut prof = Profile::new();
    let mut amg = CpuAmg::with_profiler(a.clone(), CpuAmg::params(), &mut prof).unwrap();
    println!("{amg}");

    let mut x = vec![0.0; n];
    let stats = amg.solve_with_profiler(&rhs, &mut x, &mut prof).unwrap();
    println!(
        "AMG:       {} iterations, relative residual {:.3e}",
        stats.iterations, stats.final_residual
    );

    let start = Instant::now();
    let mut x = vec![0.0; n];
    let stats = PcgSolver::new(1e-8, 100).solve(&a, Some(&mut amg), &rhs, &mut x).unwrap();
    println!(
        "PCG + AMG: {} iterations, relative residual {:.3e} ({:.3} s)",
        stats.iterations,
        stats.final_residual,
        start.elapsed().as_secs_f64()
    );

    // K-cycle on every level
    let mut kamg = CpuAmg::new(a.clone(), CpuAmg::params().with_kcycle(1)).unwrap();
    let start = Instant::now();
    let mut x = vec![0.0; n];
    let stats = PcgSolver::new(1e-8, 100).solve(&a, Some(&mut kamg), &rhs, &mut x).unwrap();
    println!(
        "PCG + AMG (K-cycle): {} iterations, relative residual {:.3e} ({:.3} s)",
        stats.iterations,
        stats.final_residual,
        start.elapsed().as_secs_f64()
    );

    println!("\n{prof}");
}
