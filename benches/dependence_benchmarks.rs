//! Benchmarks for the dependence analysis engine.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use loopdep::prelude::*;

/// A feasible chain system: 0 <= x_v <= 100 with x_v < x_{v+1}.
fn chain_matrix(vars: usize) -> ConstraintMatrix {
    let mut rows = Vec::new();
    for v in 0..vars {
        let mut low = vec![0i64; vars + 1];
        low[v] = -1;
        rows.push(low);
        let mut high = vec![0i64; vars + 1];
        high[v] = 1;
        high[vars] = 100;
        rows.push(high);
        if v + 1 < vars {
            let mut link = vec![0i64; vars + 1];
            link[v] = 1;
            link[v + 1] = -1;
            link[vars] = -1;
            rows.push(link);
        }
    }
    ConstraintMatrix::from_rows(vars, rows).unwrap()
}

/// In-place stencil over a cube nest: the first and last subscript read
/// one element behind the write.
fn stencil_system(depth: usize) -> DependenceSystem {
    let row_len = 1 + depth;
    let mut write = Vec::with_capacity(depth);
    let mut read = Vec::with_capacity(depth);
    for dim in 0..depth {
        let mut w = vec![0i64; row_len];
        w[1 + dim] = 1;
        let mut r = w.clone();
        if dim == 0 || dim == depth - 1 {
            r[0] = -1;
        }
        write.push(w);
        read.push(r);
    }
    DependenceSystem::with_integer_coeffs(vec![1; depth], vec![100; depth], write, read, 0)
        .unwrap()
}

/// a[i][j] = a[i-1][j] + a[i][j-1] + a[i+1][j] + a[i][j+1]
fn seidel_nest() -> Vec<Stmt> {
    let neighbor = |di: i64, dj: i64| {
        let row = if di == 0 {
            Expr::var("i")
        } else {
            Expr::add(Expr::var("i"), Expr::lit(di))
        };
        let col = if dj == 0 {
            Expr::var("j")
        } else {
            Expr::add(Expr::var("j"), Expr::lit(dj))
        };
        Expr::index("a", vec![row, col])
    };
    vec![Stmt::for_loop(
        1,
        LoopInfo::new("i", 1, 98),
        vec![Stmt::for_loop(
            2,
            LoopInfo::new("j", 1, 98),
            vec![Stmt::assign(
                3,
                AccessExpr::array("a", vec![Expr::var("i"), Expr::var("j")]),
                Expr::add(
                    Expr::add(neighbor(-1, 0), neighbor(0, -1)),
                    Expr::add(neighbor(1, 0), neighbor(0, 1)),
                ),
            )],
        )],
    )]
}

/// Benchmark raw Fourier-Motzkin elimination.
fn bench_elimination(c: &mut Criterion) {
    for vars in [4usize, 8, 12] {
        let matrix = chain_matrix(vars);
        c.bench_function(&format!("eliminate_{}_vars", vars), |b| {
            b.iter(|| has_real_solution(black_box(&matrix)))
        });
    }
}

/// Benchmark the direction-vector hierarchy search.
fn bench_direction_search(c: &mut Criterion) {
    for depth in [1usize, 2, 3] {
        let hierarchy = DirectionHierarchy::new(stencil_system(depth));
        let token = CancelToken::new();
        c.bench_function(&format!("search_depth_{}", depth), |b| {
            b.iter(|| hierarchy.feasible_directions(black_box(&token)).unwrap())
        });
    }
}

/// Benchmark whole-nest analysis.
fn bench_full_analysis(c: &mut Criterion) {
    let nest = seidel_nest();
    c.bench_function("analyze_seidel_2d", |b| {
        b.iter(|| analyze(black_box(&nest), &[]).unwrap())
    });
}

criterion_group!(
    benches,
    bench_elimination,
    bench_direction_search,
    bench_full_analysis
);
criterion_main!(benches);
