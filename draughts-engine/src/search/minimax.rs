//! Minimax with Alpha-Beta pruning and a transposition table.
//!
//! Scores are absolute. Dark is the maxing player and Light the minning player,
//! whichever side the engine plays.

use std::cmp;

use crate::board::Board;
use crate::coretypes::{Color, Cp, PlyKind};
use crate::evaluation::evaluate;
use crate::search::StopCondition;
use crate::transposition::{Bound, Entry, TranspositionTable};
use crate::zobrist::HashKind;

/// Score returned by a node that stopped early. It is not an evaluation,
/// so callers must discard it and it is never stored in the table.
pub const STOPPED: Cp = Cp(0);

/// Searcher holds the state of a single search thread.
/// Each root branch gets its own Searcher, while the table is shared.
pub struct Searcher<'a> {
    pub(super) tt: &'a TranspositionTable,
    pub(super) stop: &'a StopCondition,
    pub(super) nodes: u64,
    pub(super) q_nodes: u64,
}

impl<'a> Searcher<'a> {
    pub fn new(tt: &'a TranspositionTable, stop: &'a StopCondition) -> Self {
        Self {
            tt,
            stop,
            nodes: 0,
            q_nodes: 0,
        }
    }

    /// Nodes visited so far, quiescence nodes included.
    pub fn nodes(&self) -> u64 {
        self.nodes + self.q_nodes
    }

    /// Quiescence nodes visited so far.
    pub fn q_nodes(&self) -> u64 {
        self.q_nodes
    }

    /// Properties of Alpha-Beta pruning.
    /// * The maxing player can only update alpha from its children.
    /// * The minning player can only update beta from its children.
    /// * When alpha and beta are equal or cross, a cut off occurs.
    ///
    /// `board` is mutated in place and restored before returning.
    /// `hash` must be the hash of `board` with `player` to move.
    pub fn minimax(
        &mut self,
        board: &mut Board,
        player: Color,
        hash: HashKind,
        depth: PlyKind,
        alpha: Cp,
        beta: Cp,
    ) -> Cp {
        self.nodes += 1;
        if self.stop.should_stop() {
            return STOPPED;
        }

        let mut alpha = alpha;
        let mut beta = beta;

        // An entry is only trusted when it was searched at least as deep.
        if let Some(entry) = self.tt.get(hash) {
            if entry.depth >= depth {
                match entry.bound {
                    Bound::Exact => return entry.score,
                    Bound::Lower => alpha = cmp::max(alpha, entry.score),
                    Bound::Upper => beta = cmp::min(beta, entry.score),
                }
                if alpha >= beta {
                    return entry.score;
                }
            }
        }

        let status = board.status(player);
        if status.is_over() {
            return evaluate(board, status);
        }
        if depth == 0 {
            return self.quiescence(board, player, alpha, beta);
        }

        let (original_alpha, original_beta) = (alpha, beta);
        let maximizing = player.is_maximizing();
        let mut best_cp = if maximizing { Cp::MIN } else { Cp::MAX };

        for legal_move in board.legal_moves(player) {
            let record = board.do_move(&legal_move);
            let child_hash = self.tt.update_from_hash(hash, &record);
            let move_cp = self.minimax(board, !player, child_hash, depth - 1, alpha, beta);
            board.undo_move(&record);

            if self.stop.should_stop() {
                return STOPPED;
            }

            if maximizing {
                best_cp = cmp::max(best_cp, move_cp);
                alpha = cmp::max(alpha, move_cp);
            } else {
                best_cp = cmp::min(best_cp, move_cp);
                beta = cmp::min(beta, move_cp);
            }
            if beta <= alpha {
                break;
            }
        }

        let bound = Bound::classify(best_cp, original_alpha, original_beta);
        self.tt.replace(Entry::new(hash, best_cp, depth, bound));
        best_cp
    }
}
