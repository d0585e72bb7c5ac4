use criterion::{black_box, Criterion, criterion_group, criterion_main};
use faer::Mat;
use pipecg::matrix::CsrMatrix;
use pipecg::preconditioner::Jacobi;
use pipecg::solver::{LinearSolver, PipeCgSolver, PipePcgSolver, Variant};

fn laplacian_1d(n: usize) -> CsrMatrix<f64> {
    let mut row_ptr = vec![0];
    let mut col_idx = Vec::new();
    let mut values = Vec::new();
    for i in 0..n {
        for j in i.saturating_sub(1)..(i + 2).min(n) {
            col_idx.push(j);
            values.push(if i == j { 2.0 + 1e-3 * i as f64 } else { -1.0 });
        }
        row_ptr.push(col_idx.len());
    }
    CsrMatrix::from_csr(n, n, row_ptr, col_idx, values)
}

fn bench_variants(c: &mut Criterion) {
    let n = 10_000;
    let max_iter = 200;
    let a = laplacian_1d(n);
    let b: Vec<f64> = (0..n).map(|i| (i as f64).cos()).collect();
    let mut x = vec![0.0; n];

    for variant in Variant::all_variants() {
        let mut solver = PipeCgSolver::<f64>::new(variant, max_iter);
        c.bench_function(&solver.name(), |ben| {
            ben.iter(|| {
                x.fill(0.0);
                let _stats = solver.run(black_box(&a), black_box(&b), black_box(&mut x)).unwrap();
            })
        });
    }

    let pc = Jacobi::from_diagonal(&a.diagonal());
    for variant in [Variant::predict(), Variant::RECOMPUTE] {
        let mut solver = PipePcgSolver::<f64>::new(variant, max_iter);
        c.bench_function(&format!("{} jacobi", solver.name()), |ben| {
            ben.iter(|| {
                x.fill(0.0);
                let _stats = solver
                    .solve(black_box(&a), Some(&pc), black_box(&b), black_box(&mut x))
                    .unwrap();
            })
        });
    }
}

fn bench_dense_step(c: &mut Criterion) {
    let n = 200;
    let a = Mat::from_fn(n, n, |i, j| {
        if i == j { 4.0 } else { 1.0 / (1.0 + i.abs_diff(j) as f64) }
    });
    let b: Vec<f64> = (0..n).map(|i| (i as f64).sin()).collect();
    let mut x = vec![0.0; n];
    let mut solver = PipeCgSolver::<f64>::new(Variant::RECOMPUTE, 20);
    c.bench_function("pipe_pr_cg dense", |ben| {
        ben.iter(|| {
            x.fill(0.0);
            let _stats = solver.run(black_box(&a), black_box(&b), black_box(&mut x)).unwrap();
        })
    });
}

criterion_group!(benches, bench_variants, bench_dense_step);
criterion_main!(benches);
