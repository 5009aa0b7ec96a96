//! Move codes.
//!
//! A move code is the compact text form of a move: the 1-based numbers of its
//! start and final squares, separated by `-` for a simple move or `x` for a
//! capture. Intermediate landing squares of a chain are not part of the code.
//! Move codes are the keys of the learning store.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::board::Board;
use crate::coretypes::{Color, Move, Square};
use crate::error::{self, ErrorKind};

/// Separator between move codes in a history key.
pub const HISTORY_SEPARATOR: char = ',';

/// Endpoints of a move and whether it captured.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct MoveCode {
    from: Square,
    to: Square,
    capture: bool,
}

impl MoveCode {
    pub const fn new(from: Square, to: Square, capture: bool) -> Self {
        Self { from, to, capture }
    }

    pub const fn from_square(&self) -> Square {
        self.from
    }

    pub const fn to_square(&self) -> Square {
        self.to
    }

    pub const fn is_capture(&self) -> bool {
        self.capture
    }

    /// Returns true if move starts and ends on the squares of this code.
    pub fn matches(&self, move_: &Move) -> bool {
        move_.from() == self.from && move_.to() == self.to
    }

    /// Find the first legal move for player on board that this code describes.
    /// Returns None if the code does not describe any legal move.
    pub fn resolve(&self, board: &Board, player: Color) -> Option<Move> {
        board
            .legal_moves(player)
            .into_iter()
            .find(|move_| self.matches(move_))
    }
}

impl From<&Move> for MoveCode {
    fn from(move_: &Move) -> Self {
        Self::new(move_.from(), move_.to(), move_.is_capture())
    }
}

/// # Example
/// MoveCode { from: 9, to: 13, capture: false } -> `9-13`.
impl Display for MoveCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let separator = if self.capture { 'x' } else { '-' };
        write!(f, "{}{}{}", self.from, separator, self.to)
    }
}

/// Parses `9-13` and `22x15`. A full chain such as `22x15x6` parses to its endpoints.
impl FromStr for MoveCode {
    type Err = error::Error;
    fn from_str(s: &str) -> error::Result<Self> {
        let s = s.trim();
        let capture = s.contains('x');
        let separator = if capture { 'x' } else { '-' };
        let parts: Vec<&str> = s.split(separator).collect();

        if parts.len() < 2 || (!capture && parts.len() != 2) {
            return Err((ErrorKind::ParseMoveCodeMalformed, s).into());
        }

        let from: Square = parts[0]
            .parse()
            .map_err(|_| error::Error::from((ErrorKind::ParseMoveCodeMalformed, s)))?;
        let to: Square = parts[parts.len() - 1]
            .parse()
            .map_err(|_| error::Error::from((ErrorKind::ParseMoveCodeMalformed, s)))?;

        Ok(Self::new(from, to, capture))
    }
}

/// Join a move history into the deterministic key used by the learning store.
/// The opening position, with no moves played, has the empty key.
pub fn history_key(history: &[MoveCode]) -> String {
    let codes: Vec<String> = history.iter().map(MoveCode::to_string).collect();
    codes.join(&HISTORY_SEPARATOR.to_string())
}

/// Parse a list of move codes separated by commas or whitespace.
pub fn parse_history(s: &str) -> error::Result<Vec<MoveCode>> {
    s.split(|ch: char| ch == HISTORY_SEPARATOR || ch.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(number: u8) -> Square {
        Square::from_number(number).unwrap()
    }

    #[test]
    fn parse_and_display() {
        let simple: MoveCode = "9-13".parse().unwrap();
        assert_eq!(simple, MoveCode::new(sq(9), sq(13), false));
        assert_eq!(simple.to_string(), "9-13");
        assert_eq!((simple.from_square(), simple.to_square()), (sq(9), sq(13)));

        let capture: MoveCode = "22x15".parse().unwrap();
        assert!(capture.is_capture());
        assert_eq!(capture.to_string(), "22x15");

        let chain: MoveCode = "22x15x6".parse().unwrap();
        assert_eq!(chain, MoveCode::new(sq(22), sq(6), true));
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", "9", "9-", "9-13-17", "0-4", "9~13", "a-b", "33x1"] {
            assert!(bad.parse::<MoveCode>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn history_keys() {
        assert_eq!(history_key(&[]), "");
        let history = parse_history("9-13, 22-17").unwrap();
        assert_eq!(history_key(&history), "9-13,22-17");
        assert_eq!(parse_history("9-13,22-17").unwrap(), history);
    }

    #[test]
    fn resolve_finds_legal_move() {
        let board = Board::start_position();
        let code: MoveCode = "9-13".parse().unwrap();
        let move_ = code.resolve(&board, Color::Dark).unwrap();
        assert_eq!(MoveCode::from(&move_), code);

        // Light cannot play a Dark move, and 9-18 is not a single step.
        assert_eq!(code.resolve(&board, Color::Light), None);
        let bad: MoveCode = "9-18".parse().unwrap();
        assert_eq!(bad.resolve(&board, Color::Dark), None);
    }
}
