use std::thread::available_parallelism;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use draughts_engine::perft::*;
use draughts_engine::*;

pub fn criterion_perft_small_benchmark(c: &mut Criterion) {
    // Setup
    let starting_position = Board::start_position();
    let num_threads = available_parallelism()
        .map(|inner| inner.get())
        .unwrap_or(1);

    // Benchmarks

    c.bench_function("start_position: perft(2) threads: 1", |b| {
        b.iter(|| {
            let info = perft(black_box(starting_position), Color::Dark, black_box(2), black_box(1));
            assert_eq!(info.nodes, 49);
        })
    });

    c.bench_function("start_position: perft(3) threads: 1", |b| {
        b.iter(|| {
            let info = perft(black_box(starting_position), Color::Dark, black_box(3), black_box(1));
            assert_eq!(info.nodes, 302);
        })
    });
    c.bench_function(
        &format!("start_position: perft(3) threads: {num_threads}"),
        |b| {
            b.iter(|| {
                let info = perft(
                    black_box(starting_position),
                    Color::Dark,
                    black_box(3),
                    black_box(num_threads),
                );
                assert_eq!(info.nodes, 302);
            })
        },
    );

    for ply in [6, 8] {
        c.bench_function(
            &format!("start_position: perft({ply}) threads: {num_threads}"),
            |b| {
                b.iter(|| {
                    perft(
                        black_box(starting_position),
                        Color::Dark,
                        black_box(ply),
                        black_box(num_threads),
                    )
                })
            },
        );
    }
}

/// Deep enough for kings and long capture chains to appear.
pub fn criterion_perft_large_benchmark(c: &mut Criterion) {
    // Setup
    let starting_position = Board::start_position();
    let num_threads = available_parallelism()
        .map(|inner| inner.get())
        .unwrap_or(1);

    c.bench_function(
        &format!("start_position: perft(10) threads: {num_threads}"),
        |b| {
            b.iter(|| {
                perft(
                    black_box(starting_position),
                    Color::Dark,
                    black_box(10),
                    black_box(num_threads),
                )
            })
        },
    );
}

criterion_group! {
    name = small_benches;
    config = Criterion::default().without_plots().sample_size(50);
    targets = criterion_perft_small_benchmark
}
criterion_group! {
    name = large_benches;
    config = Criterion::default().without_plots().sample_size(10);
    targets = criterion_perft_large_benchmark
}
criterion_main!(small_benches, large_benches);
