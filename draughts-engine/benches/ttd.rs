//! Time-to-depth benchmarks for Engine's main search.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use draughts_engine::{Board, Color, EngineBuilder};

// Long enough that every benchmarked depth completes.
const BUDGET: Duration = Duration::from_secs(600);

pub fn start_pos_search_time_to_depth(c: &mut Criterion) {
    for depth in [2, 4, 6] {
        // Setup
        let engine_builder = EngineBuilder::new()
            .threads(1)
            .seed(1)
            .max_depth(depth)
            .transpositions(100_000);

        // Benchmarks
        c.bench_function(&format!("search start position ttd {depth}"), |b| {
            b.iter(|| {
                let mut engine = engine_builder.build().unwrap();
                let board = black_box(Board::start_position());
                engine.request_best_move(board, Color::Dark, &[], BUDGET)
            });
        });
    }
}

pub fn start_pos_search_time_to_depth_long(c: &mut Criterion) {
    for depth in [8, 10] {
        // Setup
        let engine_builder = EngineBuilder::new()
            .seed(1)
            .max_depth(depth)
            .transpositions(850_000);

        // Benchmarks
        c.bench_function(&format!("search start position ttd {depth} threads 4"), |b| {
            b.iter(|| {
                let mut engine = engine_builder.build().unwrap();
                let board = black_box(Board::start_position());
                engine.request_best_move(board, Color::Dark, &[], BUDGET)
            });
        });
    }
}

criterion_group! {
    name = time_to_depth;
    config = Criterion::default().without_plots().sample_size(30);
    targets = start_pos_search_time_to_depth
}

criterion_group! {
    name = time_to_depth_long;
    config = Criterion::default().without_plots().sample_size(10);
    targets = start_pos_search_time_to_depth_long
}

criterion_main!(time_to_depth, time_to_depth_long);
