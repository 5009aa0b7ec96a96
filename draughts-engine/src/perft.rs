//! Move path enumeration for checking the move generator.
//!
//! Counts leaf positions of the full game tree to a fixed ply. Capture
//! chains, maximum capture filtering and promotion all show up in the totals.

use std::ops::{Add, AddAssign};
use std::sync::{Mutex, PoisonError};
use std::thread;

use crate::board::Board;
use crate::coretypes::{Color, PlyKind};
use crate::movelist::MoveList;

/// Leaf totals of a perft run. `captures` counts the leaf moves that capture.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PerftInfo {
    pub nodes: u64,
    pub captures: u64,
}

impl PerftInfo {
    fn new(nodes: u64, captures: u64) -> Self {
        PerftInfo { nodes, captures }
    }
}

impl Add for PerftInfo {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        PerftInfo {
            nodes: self.nodes + rhs.nodes,
            captures: self.captures + rhs.captures,
        }
    }
}

impl AddAssign for PerftInfo {
    fn add_assign(&mut self, rhs: Self) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
    }
}

/// Count move paths of exactly `ply` moves from board with player to move.
/// Games that end earlier contribute nothing. Root moves are shared out
/// between `threads` workers when the tree is deep enough to be worth it.
pub fn perft(mut board: Board, player: Color, ply: PlyKind, threads: usize) -> PerftInfo {
    if ply == 0 {
        return PerftInfo::new(1, 0);
    } else if ply <= 2 || threads <= 1 {
        return perft_recurse(&mut board, player, ply);
    }
    debug_assert!(ply > 2);
    debug_assert!(threads > 1);

    let legal_moves = board.legal_moves(player);
    if legal_moves.is_empty() {
        return PerftInfo::new(0, 0);
    }

    let legal_moves = Mutex::new(legal_moves);
    let mut total_perft_info = PerftInfo::new(0, 0);

    // Scoped threads borrow the move list and return their own counts.
    thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let legal_moves = &legal_moves;
                scope.spawn(move || perft_executor(board, player, ply, legal_moves))
            })
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(perft_info) => total_perft_info += perft_info,
                Err(_) => log::error!("perft thread panicked"),
            }
        }
    });

    total_perft_info
}

/// Pop root moves off the shared list until it is empty, counting below each
/// on this worker's own board. `ply` counts from the root and is at least 2.
fn perft_executor(
    mut board: Board,
    player: Color,
    ply: PlyKind,
    moves: &Mutex<MoveList>,
) -> PerftInfo {
    debug_assert!(ply > 1);
    let mut perft_info = PerftInfo::new(0, 0);
    let steal = || moves.lock().unwrap_or_else(PoisonError::into_inner).pop();

    while let Some(move_) = steal() {
        let record = board.do_move(&move_);
        perft_info += perft_recurse(&mut board, !player, ply - 1);
        board.undo_move(&record);
    }

    perft_info
}

fn perft_recurse(board: &mut Board, player: Color, ply: PlyKind) -> PerftInfo {
    debug_assert_ne!(ply, 0);
    let legal_moves = board.legal_moves(player);
    if ply == 1 {
        // Leaves are the legal moves themselves.
        let captures = legal_moves.iter().filter(|move_| move_.is_capture()).count();
        PerftInfo::new(legal_moves.len() as u64, captures as u64)
    } else {
        let mut perft_info = PerftInfo::new(0, 0);
        for legal_move in legal_moves {
            let record = board.do_move(&legal_move);
            perft_info += perft_recurse(board, !player, ply - 1);
            board.undo_move(&record);
        }
        perft_info
    }
}
