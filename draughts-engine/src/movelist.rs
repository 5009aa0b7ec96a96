//! MoveList types used in Draughts engine.
//!
//! The underlying type of MoveList may change at any time during
//! pre-1.0 development, so a MoveList type alias makes changes easy.

use crate::coretypes::Move;
use crate::notation::MoveCode;

/// MoveList holds the moves generated for a position, in generation order.
/// Branching king captures have no small fixed bound, so it is growable.
pub type MoveList = Vec<Move>;
/// MoveHistory is the sequence of move codes played in a game, from the first move.
pub type MoveHistory = Vec<MoveCode>;
