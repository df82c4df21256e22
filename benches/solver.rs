//! Benchmarks for the Lazor puzzle solver.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use lazor::enumerator::Placements;
use lazor::{bff, Direction, Grid, Laser, Point, Solver, SolverConfig, Tracer};

const CORNERS: &str = include_str!("../puzzles/corners.bff");

/// A 5x5 open board with four blocks: 151,800 candidates in total.
const OPEN_FIELD: &str = "
GRID START
o o o o o
o o o o o
o o o o o
o o o o o
o o o o o
GRID STOP
A 2
B 1
C 1
L 0 1 1 1
P 9 10
P 5 6
";

/// Benchmark the complete search on the corners puzzle.
fn bench_solve(c: &mut Criterion) {
    let puzzle = bff::parse(CORNERS).unwrap();
    c.bench_function("solve_corners", |b| {
        b.iter(|| Solver::new(black_box(&puzzle), SolverConfig::default()).solve())
    });
}

/// Benchmark a capped search on a large space, sequential and parallel.
fn bench_capped_search(c: &mut Criterion) {
    let puzzle = bff::parse(OPEN_FIELD).unwrap();
    let mut group = c.benchmark_group("open_field");
    group.sample_size(10);
    for workers in [1, 4] {
        let config = SolverConfig::default()
            .with_max_attempts(Some(20_000))
            .with_workers(workers);
        group.bench_function(format!("capped_{workers}_workers"), |b| {
            b.iter(|| Solver::new(black_box(&puzzle), config).solve())
        });
    }
    group.finish();
}

/// Benchmark a single trace with a refractive split and reflections.
fn bench_trace(c: &mut Criterion) {
    let grid = Grid::from_rows(&["o o o o", "o C o A", "A o o o", "o o B o"]).unwrap();
    let laser = Laser::new(Point::new(0, 1), Direction::new(1, 1).unwrap());
    let tracer = Tracer::default();

    c.bench_function("trace_split", |b| {
        b.iter(|| tracer.trace(black_box(&grid), laser))
    });
}

/// Benchmark enumerating candidates without tracing them.
fn bench_enumerate(c: &mut Criterion) {
    let puzzle = bff::parse(OPEN_FIELD).unwrap();
    c.bench_function("enumerate_10k", |b| {
        b.iter(|| {
            Placements::new(black_box(puzzle.grid()), puzzle.inventory())
                .take(10_000)
                .count()
        })
    });
}

criterion_group!(
    benches,
    bench_solve,
    bench_capped_search,
    bench_trace,
    bench_enumerate
);
criterion_main!(benches);
