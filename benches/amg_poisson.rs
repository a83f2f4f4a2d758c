use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use kryst_amg::coarsening::SmoothedAggregation;
use kryst_amg::matrix::CsrMatrix;
use kryst_amg::preconditioner::{Amg, CpuAmg};
use kryst_amg::relaxation::GaussSeidel;
use kryst_amg::CpuBackend;

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

fn bench_setup(c: &mut Criterion) {
    let mut group = c.benchmark_group("amg setup");
    for &n in &[10_000usize, 100_000] {
        let a = poisson_1d(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &a, |ben, a| {
            ben.iter(|| CpuAmg::new(black_box(a.clone()), CpuAmg::params()).unwrap())
        });
    }
    group.finish();
}

fn bench_solve(c: &mut Criterion) {
    let n = 100_000;
    let rhs: Vec<f64> = (0..n).map(|i| (i as f64 * 0.01).sin()).collect();

    let mut spai0 = CpuAmg::new(poisson_1d(n), CpuAmg::params().with_tol(1e-6)).unwrap();
    c.bench_function("amg solve spai0", |ben| {
        ben.iter(|| {
            let mut x = vec![0.0; n];
            spai0.solve(black_box(&rhs), &mut x).unwrap()
        })
    });

    type GsAmg = Amg<CpuBackend, SmoothedAggregation, GaussSeidel>;
    let mut gs = GsAmg::new(poisson_1d(n), GsAmg::params().with_tol(1e-6)).unwrap();
    c.bench_function("amg solve gauss-seidel", |ben| {
        ben.iter(|| {
            let mut x = vec![0.0; n];
            gs.solve(black_box(&rhs), &mut x).unwrap()
        })
    });
}

criterion_group!(benches, bench_setup, bench_solve);
criterion_main!(benches);
