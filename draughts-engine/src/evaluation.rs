//! Evaluation functions that return a centipawn.
//!
//! All scores are absolute: a positive value is an advantage for Dark,
//! 0 is even, and a negative value is an advantage for Light.

use crate::board::Board;
use crate::coretypes::{Color, Cp, GameStatus, PieceKind, BOARD_SIZE};
use crate::movegen as mg;

impl PieceKind {
    /// Default, color independent value per piece.
    pub const fn centipawns(&self) -> Cp {
        Cp(match self {
            PieceKind::Man => 100,
            PieceKind::King => 700,
        })
    }
}

// Evaluation Constants
const MOBILITY_WEIGHT: Cp = Cp(2);
const EDGE_BONUS: Cp = Cp(5);

/// Score of a position whose side to move has no legal move.
pub const fn terminal(winner: Color) -> Cp {
    match winner {
        Color::Dark => Cp::WIN,
        Color::Light => Cp(-Cp::WIN.0),
    }
}

/// Primary evaluate function for engine.
/// Decided games score `±Cp::WIN`, everything else is scored statically.
pub fn evaluate(board: &Board, status: GameStatus) -> Cp {
    match status {
        GameStatus::Won(winner) => terminal(winner),
        GameStatus::Ongoing => static_evaluate(board),
    }
}

/// Heuristic score of a position that is not decided.
pub fn static_evaluate(board: &Board) -> Cp {
    material(board) + mobility(board) + men_placement(board)
}

/// Returns relative strength difference of pieces on board.
/// Is equivalent of piece_centipawns(Dark) - piece_centipawns(Light).
pub fn material(board: &Board) -> Cp {
    Color::iter()
        .flat_map(|color| board.pieces(color))
        .fold(Cp::default(), |acc, (_, piece)| {
            acc + piece.kind().centipawns() * piece.color().sign()
        })
}

/// Difference in number of legal moves, Dark minus Light.
pub fn mobility(board: &Board) -> Cp {
    let dark = mg::legal_moves(board, Color::Dark).len() as i32;
    let light = mg::legal_moves(board, Color::Light).len() as i32;
    MOBILITY_WEIGHT * (dark - light)
}

/// Men gain one centipawn per row advanced toward promotion,
/// and a flat bonus while standing on an edge column.
pub fn men_placement(board: &Board) -> Cp {
    let last = (BOARD_SIZE - 1) as u8;
    Color::iter()
        .flat_map(|color| board.pieces(color))
        .filter(|(_, piece)| !piece.is_king())
        .fold(Cp::default(), |acc, (square, piece)| {
            let color = piece.color();
            let advanced = match color {
                Color::Dark => square.row(),
                Color::Light => last - square.row(),
            };
            let mut bonus = Cp(advanced as i32);
            if square.col() == 0 || square.col() == last {
                bonus += EDGE_BONUS;
            }
            acc + bonus * color.sign()
        })
}
