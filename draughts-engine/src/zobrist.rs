//! Zobrist Hashing

use std::collections::HashSet;
use std::ops::Index;

use rand::prelude::*;

use crate::board::Board;
use crate::coretypes::{Color, MoveRecord, Piece, PieceKind, Square};
use crate::coretypes::{NUM_PIECES, NUM_PLAYABLE};

/// Width of a position hash.
pub type HashKind = u64;

/// Random keys for Zobrist hashing of draughts positions.
///
/// A position hash is the xor of one key per occupied square, picked by the
/// piece standing there, plus the side key when Dark is to move. A move
/// changes the hash by xoring out its vacated and captured squares and
/// xoring in its landing square, so search never rehashes a whole board.
/// All keys are distinct and non-zero.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ZobristTable {
    piece_hash: [[HashKind; NUM_PLAYABLE]; NUM_PIECES],
    pub(crate) player_hash: HashKind,
}

impl ZobristTable {
    const TOGGLE_PLAYER: Color = Color::Dark;

    /// Keys drawn from entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Keys drawn from a seeded generator. Equal seeds give equal tables.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(mut rng: StdRng) -> Self {
        let mut drawn = HashSet::new();
        let mut unique_value = || loop {
            let value: HashKind = rng.gen();
            if value != 0 && drawn.insert(value) {
                break value;
            }
        };

        let mut piece_hash = [[HashKind::default(); NUM_PLAYABLE]; NUM_PIECES];
        for item in piece_hash.iter_mut().flatten() {
            *item = unique_value();
        }
        let player_hash = unique_value();

        Self {
            piece_hash,
            player_hash,
        }
    }

    /// Generate a hash value for board with player to move.
    pub fn generate_hash(&self, board: &Board, player: Color) -> HashKind {
        let pieces = Color::iter().flat_map(|color| board.pieces(color));
        let hash = pieces.fold(0, |hash, (square, piece)| hash ^ self[(piece, square)]);

        // Light to move carries no side key, so every move flips it with one xor.
        if player == ZobristTable::TOGGLE_PLAYER {
            hash ^ self.player_hash
        } else {
            hash
        }
    }

    /// Apply the move of record to hash. Applying the same record again takes the move back.
    pub fn update_hash(&self, hash: &mut HashKind, record: &MoveRecord) {
        *hash ^= self.player_hash;

        *hash ^= self[(record.piece(), record.from())];
        *hash ^= self[(record.placed(), record.to())];
        for &(piece, square) in record.captured() {
            *hash ^= self[(piece, square)];
        }
    }

    /// Returns the hash after applying (or removing) the move of record.
    pub fn update_from_hash(&self, mut hash: HashKind, record: &MoveRecord) -> HashKind {
        self.update_hash(&mut hash, record);
        hash
    }
}

impl Default for ZobristTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Key of a piece standing on a playable square.
impl Index<(Piece, Square)> for ZobristTable {
    type Output = HashKind;
    fn index(&self, index: (Piece, Square)) -> &Self::Output {
        let (piece, square) = index;
        debug_assert!(square.is_playable());
        &self.piece_hash[piece.zobrist_offset()][square.number() as usize - 1]
    }
}

impl Piece {
    /// Row of the piece in the key table.
    #[inline(always)]
    const fn zobrist_offset(&self) -> usize {
        let block = match self.color {
            Color::Light => 0,
            Color::Dark => 2,
        };
        let offset = match self.kind {
            PieceKind::Man => 0,
            PieceKind::King => 1,
        };
        block + offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coretypes::Move;

    fn test_before_and_after(table: &ZobristTable, before: Board, player: Color, move_: &Move) {
        let after = before.make_move(move_);
        let hash_before = table.generate_hash(&before, player);
        let hash_after = table.generate_hash(&after, !player);

        assert_eq!(hash_before, table.generate_hash(&before, player));
        assert_ne!(hash_before, hash_after);

        let mut board = before;
        let mut hash = hash_before;
        let record = board.do_move(move_);
        table.update_hash(&mut hash, &record);
        assert_eq!(board, after);
        assert_eq!(hash, hash_after);

        // Taking the move back restores the original hash.
        table.update_hash(&mut hash, &record);
        assert_eq!(hash, hash_before);
        assert_eq!(table.update_from_hash(hash, &record), hash_after);
    }

    #[test]
    fn opening_moves_hash_incrementally() {
        let table = ZobristTable::with_seed(7);
        let board = Board::start_position();
        for move_ in board.legal_moves(Color::Light) {
            test_before_and_after(&table, board, Color::Light, &move_);
        }
    }

    #[test]
    fn hash_capture_and_promotion() {
        let table = ZobristTable::new();
        let board: Board = "
            . . . . . . . .
            . . d . d . . .
            . . . l . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
        "
        .parse()
        .unwrap();
        let moves = board.legal_moves(Color::Light);
        assert_eq!(moves.len(), 2);
        for move_ in moves {
            test_before_and_after(&table, board, Color::Light, &move_);
        }
    }

    #[test]
    fn player_to_move_changes_hash() {
        let table = ZobristTable::with_seed(1);
        let board = Board::start_position();
        assert_ne!(
            table.generate_hash(&board, Color::Light),
            table.generate_hash(&board, Color::Dark)
        );
    }

    #[test]
    fn seeded_tables_are_reproducible() {
        assert_eq!(ZobristTable::with_seed(42), ZobristTable::with_seed(42));
        assert_ne!(ZobristTable::with_seed(42), ZobristTable::with_seed(43));
    }
}
