//! Holds Board struct, the most important data structure for the engine.
//! Board represents the 8x8 grid of a draughts position.

use std::fmt::{self, Display};
use std::ops::Index;
use std::str::FromStr;

use crate::coretypes::{Captured, Color, GameStatus, Move, MoveRecord, Piece, PieceKind, Square};
use crate::coretypes::{BOARD_SIZE, MAX_CAPTURES, NUM_SQUARES};
use crate::error::{self, ErrorKind};
use crate::movegen as mg;
use crate::movelist::MoveList;

/// Content of a single cell.
pub type Cell = Option<Piece>;

/// struct Board
/// A mailbox of all 64 cells. Cells with even `row + col` are never occupied.
/// Board is small and `Copy`, so capture chain enumeration clones it freely,
/// while search mutates a single Board in place with `do_move` and `undo_move`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Board {
    cells: [Cell; NUM_SQUARES],
}

impl Board {
    /// Rows each side fills in the start position.
    const START_ROWS: u8 = 3;

    /// Board without any pieces.
    pub const fn empty() -> Self {
        Self {
            cells: [None; NUM_SQUARES],
        }
    }

    /// Standard start position: 12 Dark men on rows 0-2, 12 Light men on rows 5-7.
    pub fn start_position() -> Self {
        let mut board = Self::empty();
        let last_row = BOARD_SIZE as u8 - 1;
        for square in Square::playable() {
            if square.row() < Self::START_ROWS {
                board.put(square, Piece::new(Color::Dark, PieceKind::Man));
            } else if square.row() > last_row - Self::START_ROWS {
                board.put(square, Piece::new(Color::Light, PieceKind::Man));
            }
        }
        board
    }

    /// Place a piece on a playable square, replacing anything there.
    pub fn put(&mut self, square: Square, piece: Piece) {
        debug_assert!(square.is_playable());
        self.cells[square.idx()] = Some(piece);
    }

    /// Empty a square.
    pub fn clear(&mut self, square: Square) {
        self.cells[square.idx()] = None;
    }

    /// Remove and return the content of a square.
    pub fn take(&mut self, square: Square) -> Cell {
        self.cells[square.idx()].take()
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.cells[square.idx()].is_none()
    }

    /// Iterate over all pieces of a color with their squares.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::playable().filter_map(move |square| match self[square] {
            Some(piece) if piece.color == color => Some((square, piece)),
            _ => None,
        })
    }

    /// Count the pieces of one color and kind.
    pub fn count(&self, color: Color, kind: PieceKind) -> usize {
        self.pieces(color).filter(|(_, piece)| piece.kind == kind).count()
    }

    /// Apply a move to self, in place, and return the record needed to undo it.
    /// `do_move` does not check if the move is legal, it assumes legality.
    ///
    /// Every occupied cell strictly between two consecutive squares of the path
    /// is captured. For a man's jump this is the midpoint, for a king's long
    /// jump it is the single enemy piece on the diagonal.
    ///
    /// # Panics
    /// Panics if the start square of the move is empty.
    pub fn do_move(&mut self, move_: &Move) -> MoveRecord {
        let from = move_.from();
        let to = move_.to();
        let piece = self
            .take(from)
            .expect("do_move requires a piece on the start square");

        let mut captured = Captured::new();
        for step in move_.path().windows(2) {
            let (start, end) = (step[0], step[1]);
            let dr = (end.row() as i8 - start.row() as i8).signum();
            let dc = (end.col() as i8 - start.col() as i8).signum();

            let mut cursor = start.offset(dr, dc);
            while let Some(square) = cursor {
                if square == end {
                    break;
                }
                if let Some(victim) = self.take(square) {
                    captured.push((victim, square));
                }
                cursor = square.offset(dr, dc);
            }
        }

        let promoted = piece.promotes_on(to);
        self.put(to, if promoted { piece.crowned() } else { piece });

        MoveRecord {
            piece,
            from,
            to,
            captured,
            promoted,
        }
    }

    /// Undo the application of a move, in place.
    /// The record must come from the most recent `do_move` on this board.
    pub fn undo_move(&mut self, record: &MoveRecord) {
        // A king's chain may end on its own start square, so clear before restoring.
        self.clear(record.to);
        self.put(record.from, record.piece);
        for &(piece, square) in record.captured.iter() {
            self.put(square, piece);
        }
    }

    /// Generates a new Board from applying move on current Board.
    pub fn make_move(&self, move_: &Move) -> Self {
        let mut board = *self;
        board.do_move(move_);
        board
    }

    /// Checks that move is legal for player before applying it.
    pub fn do_legal_move(&mut self, player: Color, move_: &Move) -> Option<MoveRecord> {
        if self.is_legal_move(player, move_) {
            Some(self.do_move(move_))
        } else {
            None
        }
    }

    /// Checks if given move is legal for player on this board.
    pub fn is_legal_move(&self, player: Color, move_: &Move) -> bool {
        self.legal_moves(player).contains(move_)
    }

    /// All legal moves for player. Captures are mandatory, and only the longest
    /// capture chains are legal.
    pub fn legal_moves(&self, player: Color) -> MoveList {
        mg::legal_moves(self, player)
    }

    /// Legal capture chains for player, or an empty list if none exist.
    pub fn capture_moves(&self, player: Color) -> MoveList {
        mg::capture_moves(self, player)
    }

    /// Simple steps and king slides for player, ignoring mandatory captures.
    pub fn simple_moves(&self, player: Color) -> MoveList {
        mg::simple_moves(self, player)
    }

    /// Returns a terminal status if player, to move, has no legal move.
    pub fn status(&self, player: Color) -> GameStatus {
        if mg::has_legal_move(self, player) {
            GameStatus::Ongoing
        } else {
            GameStatus::Won(!player)
        }
    }

    /// Board rotated half a turn with the colors of every piece swapped.
    /// The result is the same position seen from the other side.
    pub fn mirrored(&self) -> Self {
        let mut board = Self::empty();
        for square in Square::playable() {
            if let Some(piece) = self[square] {
                board.put(square.mirrored(), Piece::new(!piece.color, piece.kind));
            }
        }
        board
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::start_position()
    }
}

impl Index<Square> for Board {
    type Output = Cell;
    fn index(&self, square: Square) -> &Self::Output {
        &self.cells[square.idx()]
    }
}

/// Parse a board diagram of 64 cells, row 0 first.
/// `.` is an empty cell, `l`/`L` a Light man/king and `d`/`D` a Dark man/king.
/// Whitespace is ignored, so rows may be written on separate lines.
impl FromStr for Board {
    type Err = error::Error;
    fn from_str(s: &str) -> error::Result<Self> {
        let cells: Vec<char> = s.chars().filter(|ch| !ch.is_whitespace()).collect();
        if cells.len() != NUM_SQUARES {
            return Err((
                ErrorKind::ParseBoardMalformed,
                format!("expected {NUM_SQUARES} cells, found {}", cells.len()),
            )
                .into());
        }

        let mut board = Self::empty();
        for (idx, ch) in cells.into_iter().enumerate() {
            let square = Square::new((idx / BOARD_SIZE) as u8, (idx % BOARD_SIZE) as u8);
            match (ch, Piece::from_char(ch)) {
                ('.', _) => (),
                (_, Some(piece)) if square.is_playable() => board.put(square, piece),
                (_, Some(_)) => {
                    return Err((
                        ErrorKind::ParseBoardMalformed,
                        format!("piece on unplayable cell {}", idx),
                    )
                        .into())
                }
                (_, None) => {
                    return Err((ErrorKind::ParseBoardMalformed, format!("bad cell {ch:?}")).into())
                }
            }
        }

        for color in Color::iter() {
            if board.pieces(color).count() > MAX_CAPTURES {
                return Err((
                    ErrorKind::ParseBoardMalformed,
                    format!("more than {MAX_CAPTURES} {color} pieces"),
                )
                    .into());
            }
        }

        Ok(board)
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in 0..BOARD_SIZE as u8 {
            let line: Vec<String> = (0..BOARD_SIZE as u8)
                .map(|col| match self[Square::new(row, col)] {
                    Some(piece) => piece.to_char().to_string(),
                    None => ".".to_string(),
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coretypes::Path;

    fn sq(number: u8) -> Square {
        Square::from_number(number).unwrap()
    }

    #[test]
    fn start_position_layout() {
        let board = Board::start_position();
        assert_eq!(board.count(Color::Dark, PieceKind::Man), 12);
        assert_eq!(board.count(Color::Light, PieceKind::Man), 12);
        assert_eq!(board.count(Color::Dark, PieceKind::King), 0);
        assert!(board[sq(1)].is_some());
        assert!(board[sq(13)].is_none());
        assert_eq!(board[sq(32)], Some(Piece::new(Color::Light, PieceKind::Man)));
    }

    #[test]
    fn diagram_round_trip() {
        let board = Board::start_position();
        let parsed: Board = board.to_string().parse().unwrap();
        assert_eq!(parsed, board);
    }

    #[test]
    fn diagram_rejects_bad_input() {
        assert!("d . d".parse::<Board>().is_err());
        // Piece on an unplayable cell (row 0, col 0).
        let mut cells = vec!['.'; NUM_SQUARES];
        cells[0] = 'd';
        let diagram: String = cells.into_iter().collect();
        assert!(diagram.parse::<Board>().is_err());
    }

    #[test]
    fn undo_restores_simple_move() {
        let mut board = Board::start_position();
        let original = board;
        let move_ = Move::simple(sq(9), sq(13));
        let record = board.do_move(&move_);
        assert!(board[sq(9)].is_none());
        assert!(board[sq(13)].is_some());
        board.undo_move(&record);
        assert_eq!(board, original);
    }

    #[test]
    fn do_move_captures_and_promotes() {
        let mut board = Board::empty();
        let light = Piece::new(Color::Light, PieceKind::Man);
        let dark = Piece::new(Color::Dark, PieceKind::Man);
        board.put(Square::new(2, 3), light);
        board.put(Square::new(1, 2), dark);
        let original = board;

        let mut path = Path::new();
        path.push(Square::new(2, 3));
        path.push(Square::new(0, 1));
        let record = board.do_move(&Move::capture(path));

        assert!(record.promoted());
        assert_eq!(record.captured(), &[(dark, Square::new(1, 2))]);
        assert_eq!(board[Square::new(0, 1)], Some(light.crowned()));
        assert!(board[Square::new(1, 2)].is_none());

        board.undo_move(&record);
        assert_eq!(board, original);
    }

    #[test]
    fn long_king_jump_captures_distant_piece() {
        let mut board = Board::empty();
        let king = Piece::new(Color::Dark, PieceKind::King);
        let light = Piece::new(Color::Light, PieceKind::Man);
        board.put(Square::new(0, 1), king);
        board.put(Square::new(3, 4), light);

        let mut path = Path::new();
        path.push(Square::new(0, 1));
        path.push(Square::new(5, 6));
        let record = board.do_move(&Move::capture(path));
        assert_eq!(record.captured(), &[(light, Square::new(3, 4))]);
        assert!(!record.promoted());
        assert_eq!(board[Square::new(5, 6)], Some(king));
    }

    #[test]
    fn mirrored_swaps_sides() {
        let board = Board::start_position();
        assert_eq!(board.mirrored(), board);

        let mut lone = Board::empty();
        lone.put(Square::new(2, 1), Piece::new(Color::Dark, PieceKind::Man));
        let mirrored = lone.mirrored();
        assert_eq!(
            mirrored[Square::new(5, 6)],
            Some(Piece::new(Color::Light, PieceKind::Man))
        );
        assert_eq!(mirrored.mirrored(), lone);
    }

    #[test]
    fn status_reports_side_without_moves() {
        let mut board = Board::empty();
        board.put(Square::new(4, 1), Piece::new(Color::Light, PieceKind::Man));
        assert_eq!(board.status(Color::Light), GameStatus::Ongoing);
        assert_eq!(board.status(Color::Dark), GameStatus::Won(Color::Light));
    }
}
