//! Move Generation Functions
//!
//! Captures are mandatory. If any piece of the side to move can capture,
//! only capture chains are legal, and among those only the chains capturing
//! the greatest number of pieces over all pieces of that side.
//!
//! Capture chains are enumerated depth first. Each jump is explored on a copy
//! of the board with the jumped piece removed, so sibling branches of a
//! branching chain never see each other's captures.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::coretypes::{Color, Move, Path, Piece, Square, BOARD_SIZE};
use crate::movelist::MoveList;

// A king can land on at most 6 squares beyond a jumped piece in each direction.
const MAX_JUMPS: usize = 4 * (BOARD_SIZE - 2);

/// A single jump available from a square.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Jump {
    land: Square,
    captured: Square,
}

type Jumps = ArrayVec<Jump, MAX_JUMPS>;

/// Set of squares captured earlier in the current chain.
type Visited = u64;

const fn bit(square: Square) -> Visited {
    1 << square.idx()
}

/// All legal moves for player.
pub(crate) fn legal_moves(board: &Board, player: Color) -> MoveList {
    let captures = capture_moves(board, player);
    if !captures.is_empty() {
        return captures;
    }
    simple_moves(board, player)
}

/// Returns true if player has at least one legal move, without generating them all.
pub(crate) fn has_legal_move(board: &Board, player: Color) -> bool {
    board.pieces(player).any(|(square, piece)| {
        !jumps(board, square, piece, 0).is_empty() || has_simple_move(board, square, piece)
    })
}

/// Maximum length capture chains for player. Empty if player cannot capture.
pub(crate) fn capture_moves(board: &Board, player: Color) -> MoveList {
    let mut chains = MoveList::new();
    for (square, _) in board.pieces(player) {
        let mut path = Path::new();
        path.push(square);
        capture_chains(board, square, &mut path, 0, &mut chains);
    }

    let longest = chains.iter().map(Move::captures).max().unwrap_or(0);
    chains.retain(|chain| chain.captures() == longest);
    chains
}

/// Recursively extend the chain in `path` from square `at`, pushing every
/// complete chain into `chains`.
///
/// A man landing on its promotion row ends its chain on that jump,
/// even when the new king could keep capturing.
fn capture_chains(
    board: &Board,
    at: Square,
    path: &mut Path,
    visited: Visited,
    chains: &mut MoveList,
) {
    let piece = match board[at] {
        Some(piece) => piece,
        None => return,
    };

    let jumps = jumps(board, at, piece, visited);
    if jumps.is_empty() {
        if path.len() > 1 {
            chains.push(Move::capture(path.clone()));
        }
        return;
    }

    for Jump { land, captured } in jumps {
        let mut next = *board;
        next.clear(at);
        next.clear(captured);
        next.put(land, piece);
        path.push(land);

        if piece.promotes_on(land) {
            chains.push(Move::capture(path.clone()));
        } else {
            capture_chains(&next, land, path, visited | bit(captured), chains);
        }

        path.pop();
    }
}

/// Jumps available to piece standing on square `at`.
fn jumps(board: &Board, at: Square, piece: Piece, visited: Visited) -> Jumps {
    let is_victim = |square: Square| match board[square] {
        Some(other) => other.color != piece.color && visited & bit(square) == 0,
        None => false,
    };

    let mut jumps = Jumps::new();
    if piece.is_king() {
        for (dr, dc) in Square::DIAGONALS {
            // Slide up to a single victim, then every empty square beyond it is a landing.
            let mut victim: Option<Square> = None;
            let mut cursor = at.offset(dr, dc);
            while let Some(square) = cursor {
                if board.is_empty(square) {
                    if let Some(captured) = victim {
                        jumps.push(Jump {
                            land: square,
                            captured,
                        });
                    }
                } else if victim.is_none() && is_victim(square) {
                    victim = Some(square);
                } else {
                    break;
                }
                cursor = square.offset(dr, dc);
            }
        }
    } else {
        for (dr, dc) in Square::DIAGONALS {
            let over = at.offset(dr, dc);
            let land = at.offset(2 * dr, 2 * dc);
            if let (Some(over), Some(land)) = (over, land) {
                if is_victim(over) && board.is_empty(land) {
                    jumps.push(Jump {
                        land,
                        captured: over,
                    });
                }
            }
        }
    }
    jumps
}

/// Simple steps for men (one square diagonally forward) and slides for kings.
pub(crate) fn simple_moves(board: &Board, player: Color) -> MoveList {
    let mut moves = MoveList::new();
    for (from, piece) in board.pieces(player) {
        if piece.is_king() {
            for (dr, dc) in Square::DIAGONALS {
                let mut cursor = from.offset(dr, dc);
                while let Some(to) = cursor {
                    if !board.is_empty(to) {
                        break;
                    }
                    moves.push(Move::simple(from, to));
                    cursor = to.offset(dr, dc);
                }
            }
        } else {
            let dr = piece.color.forward();
            for dc in [-1, 1] {
                if let Some(to) = from.offset(dr, dc) {
                    if board.is_empty(to) {
                        moves.push(Move::simple(from, to));
                    }
                }
            }
        }
    }
    moves
}

fn has_simple_move(board: &Board, from: Square, piece: Piece) -> bool {
    let steps: &[(i8, i8)] = if piece.is_king() {
        &Square::DIAGONALS
    } else if piece.color == Color::Light {
        &Square::DIAGONALS[..2]
    } else {
        &Square::DIAGONALS[2..]
    };
    steps.iter().any(|&(dr, dc)| {
        from.offset(dr, dc)
            .map(|to| board.is_empty(to))
            .unwrap_or(false)
    })
}
