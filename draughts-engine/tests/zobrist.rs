//! Zobrist hashing over random play.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use draughts_engine::zobrist::{HashKind, ZobristTable};
use draughts_engine::*;

#[test]
fn equal_hashes_imply_equal_positions() {
    let ztable = ZobristTable::with_seed(11);
    let mut rng = StdRng::seed_from_u64(12);
    let mut seen: HashMap<HashKind, (Board, Color)> = HashMap::new();

    for _ in 0..50 {
        let mut board = Board::start_position();
        let mut player = Color::Light;
        let mut hash = ztable.generate_hash(&board, player);

        for _ in 0..150 {
            let previous = seen.insert(hash, (board, player));
            if let Some(previous) = previous {
                assert_eq!(previous, (board, player));
            }

            let moves = board.legal_moves(player);
            let Some(move_) = moves.choose(&mut rng) else {
                break;
            };
            let record = board.do_move(move_);
            ztable.update_hash(&mut hash, &record);
            player = !player;
            assert_eq!(hash, ztable.generate_hash(&board, player));
        }
    }

    assert!(seen.len() > 500);
}
