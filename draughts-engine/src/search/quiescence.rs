//! Quiescence Search
//!
//! When a position is being searched, nodes at the final depth (leaf nodes)
//! can be either terminal or non-terminal.
//! Terminal nodes get an absolute score. Non-terminal nodes are scored
//! according to a static evaluation function that provides a best guess at
//! that node's value.
//!
//! Statically evaluating non-terminal leaf nodes leads to the horizon effect.
//! An engine may see a leaf node where a man was just won as a winning position,
//! while right over the horizon the opponent recaptures two.
//!
//! To reduce this horizon effect, a quiescence search is used in place of
//! a direct static evaluation of a leaf node. It follows capture moves only,
//! until the position is quiet.

use std::cmp;

use crate::board::Board;
use crate::coretypes::{Color, Cp};
use crate::evaluation::{evaluate, static_evaluate};
use crate::search::minimax::{Searcher, STOPPED};

impl Searcher<'_> {
    /// Search only capture moves from board, with the static evaluation as a
    /// stand-pat bound for the player to move. A quiet position returns its
    /// static evaluation. Results are never stored in the table.
    pub fn quiescence(&mut self, board: &mut Board, player: Color, alpha: Cp, beta: Cp) -> Cp {
        self.q_nodes += 1;
        if self.stop.should_stop() {
            return STOPPED;
        }

        let status = board.status(player);
        if status.is_over() {
            return evaluate(board, status);
        }

        let stand_pat = static_evaluate(board);
        let captures = board.capture_moves(player);
        if captures.is_empty() {
            return stand_pat;
        }

        let mut alpha = alpha;
        let mut beta = beta;

        if player.is_maximizing() {
            alpha = cmp::max(alpha, stand_pat);
            if alpha >= beta {
                return alpha;
            }
            for capture in captures {
                let record = board.do_move(&capture);
                let score = self.quiescence(board, !player, alpha, beta);
                board.undo_move(&record);

                alpha = cmp::max(alpha, score);
                if alpha >= beta {
                    break;
                }
            }
            alpha
        } else {
            beta = cmp::min(beta, stand_pat);
            if alpha >= beta {
                return beta;
            }
            for capture in captures {
                let record = board.do_move(&capture);
                let score = self.quiescence(board, !player, alpha, beta);
                board.undo_move(&record);

                beta = cmp::min(beta, score);
                if alpha >= beta {
                    break;
                }
            }
            beta
        }
    }
}
