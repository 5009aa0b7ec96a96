//! Benchmarks for Zobrist Hash generation and incremental update.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use draughts_engine::zobrist::ZobristTable;
use draughts_engine::{Board, Color};

pub fn zobrist_generate_and_update(c: &mut Criterion) {
    // Setup
    let ztable = ZobristTable::with_seed(0);
    let initial_board = Board::start_position();
    let move_ = initial_board.legal_moves(Color::Dark)[0].clone();

    let mut final_board = initial_board;
    let record = final_board.do_move(&move_);

    let initial_hash = ztable.generate_hash(&initial_board, Color::Dark);
    let final_hash = ztable.generate_hash(&final_board, Color::Light);

    // Benchmarks

    c.bench_function("zobrist initial position generate hash", |b| {
        b.iter(|| {
            let hash = ztable.generate_hash(black_box(&initial_board), Color::Dark);
            assert_eq!(hash, initial_hash);
        });
    });

    c.bench_function("zobrist final position generate hash", |b| {
        b.iter(|| {
            let hash = ztable.generate_hash(black_box(&final_board), Color::Light);
            assert_eq!(hash, final_hash);
        });
    });

    c.bench_function("zobrist final position update hash", |b| {
        b.iter(|| {
            let mut hash = initial_hash;
            ztable.update_hash(black_box(&mut hash), black_box(&record));
            assert_eq!(hash, final_hash);
        });
    });
}

criterion_group! {
    name = zobrist_hashing;
    config = Criterion::default().without_plots().sample_size(100);
    targets = zobrist_generate_and_update
}

criterion_main!(zobrist_hashing);
