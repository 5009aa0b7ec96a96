//! The fundamental and simple types of `draughts_engine`.

use std::fmt::{self, Display};
use std::ops::{Add, AddAssign, Mul, Neg, Not, Sub};
use std::str::FromStr;

use arrayvec::ArrayVec;

use crate::error::{self, ErrorKind};

///////////////
// Constants //
///////////////
pub const BOARD_SIZE: usize = 8;
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;

// Only squares of one colour parity hold pieces.
pub const NUM_PLAYABLE: usize = NUM_SQUARES / 2;

// Light Man, Light King, Dark Man, Dark King.
pub const NUM_PIECES: usize = 4;

// Each side starts with 12 men, so no chain can capture more than 12 pieces.
pub const MAX_CAPTURES: usize = 12;

// A chain visits its start square plus one landing square per capture.
pub const MAX_PATH: usize = MAX_CAPTURES + 1;

// The greatest depth reachable for the engine during search.
pub const MAX_DEPTH: PlyKind = 22;

/////////////////////////
// Data and Structures //
/////////////////////////

/// Type alias for max ply/depth.
pub type PlyKind = u8;

// Type alias to make changing Cp inner type easy if needed.
pub type CpKind = i32;

/// Centipawn-like score unit. 100 Cp is worth one man.
/// Scores are absolute: positive favors Dark, negative favors Light.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Cp(pub CpKind);

/// Color of a piece or a player.
/// Light starts on rows 5-7 and moves up the board (decreasing row),
/// Dark starts on rows 0-2 and moves down the board (increasing row).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Color {
    Light,
    Dark,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PieceKind {
    Man,
    King,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Piece {
    pub(crate) color: Color,
    pub(crate) kind: PieceKind,
}

/// A cell of the 8x8 grid, stored as `row * 8 + col`.
/// Row 0 is Dark's back row, row 7 is Light's back row.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Square(u8);

/// Sequence of squares visited by a moving piece, start square included.
pub type Path = ArrayVec<Square, MAX_PATH>;

/// Pieces removed by a move, alongside the squares they were removed from.
pub type Captured = ArrayVec<(Piece, Square), MAX_CAPTURES>;

/// Move
/// An ordered sequence of squares: a start square, zero or more intermediate
/// landing squares of a multi-jump, and a final square.
/// A move with two squares and no capture is a simple step.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Move {
    pub(crate) path: Path,
    pub(crate) captures: u8,
}

/// MoveRecord contains everything needed to exactly invert an applied move.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MoveRecord {
    /// Moved piece before any promotion.
    pub(crate) piece: Piece,
    pub(crate) from: Square,
    pub(crate) to: Square,
    /// Pieces removed along the path, in capture order.
    pub(crate) captured: Captured,
    pub(crate) promoted: bool,
}

/// Status of a game from the point of view of the side to move.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GameStatus {
    Ongoing,
    /// The opponent of this color has no legal move.
    Won(Color),
}

//////////////////////
/// Implementations //
//////////////////////

impl Cp {
    pub const MIN: Cp = Self(CpKind::MIN + 1); // + 1 to avoid overflow error on negate.
    pub const MAX: Cp = Self(CpKind::MAX);
    /// Score of a decided game.
    pub const WIN: Cp = Self(100_000);

    /// Returns the sign of the value, either 1, -1, or 0.
    pub const fn signum(&self) -> CpKind {
        self.0.signum()
    }

    /// Returns the color this score favors, or None if even.
    pub const fn leading(&self) -> Option<Color> {
        match self.signum() {
            1 => Some(Color::Dark),
            -1 => Some(Color::Light),
            _ => None,
        }
    }
}

impl Add for Cp {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}
impl AddAssign for Cp {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0
    }
}
impl Sub for Cp {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}
impl Mul for Cp {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}
impl Mul<CpKind> for Cp {
    type Output = Cp;
    fn mul(self, rhs: CpKind) -> Self::Output {
        Self(self.0 * rhs)
    }
}
impl Neg for Cp {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}
impl Display for Cp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:+}", self.0)
    }
}

impl Color {
    /// Row a man of this color must reach to be crowned.
    pub const fn promotion_row(&self) -> u8 {
        match self {
            Color::Light => 0,
            Color::Dark => (BOARD_SIZE - 1) as u8,
        }
    }

    /// Row direction a man of this color moves in.
    pub const fn forward(&self) -> i8 {
        match self {
            Color::Light => -1,
            Color::Dark => 1,
        }
    }

    /// Sign of this color in absolute scores. Dark is the maximizing player.
    pub const fn sign(&self) -> CpKind {
        match self {
            Color::Light => -1,
            Color::Dark => 1,
        }
    }

    pub const fn is_maximizing(&self) -> bool {
        matches!(self, Color::Dark)
    }

    pub fn iter() -> impl Iterator<Item = Color> {
        [Color::Light, Color::Dark].into_iter()
    }
}

impl Not for Color {
    type Output = Self;
    fn not(self) -> Self::Output {
        match self {
            Color::Light => Color::Dark,
            Color::Dark => Color::Light,
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Color::Light => write!(f, "light"),
            Color::Dark => write!(f, "dark"),
        }
    }
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }
    pub const fn color(&self) -> Color {
        self.color
    }
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }
    pub const fn is_king(&self) -> bool {
        matches!(self.kind, PieceKind::King)
    }

    /// Returns the crowned version of this piece.
    pub const fn crowned(&self) -> Self {
        Self::new(self.color, PieceKind::King)
    }

    /// Returns true if a man of this piece would be crowned on square.
    pub const fn promotes_on(&self, square: Square) -> bool {
        !self.is_king() && square.row() == self.color.promotion_row()
    }

    /// Diagram character: `l`/`L` for Light man/king, `d`/`D` for Dark man/king.
    pub const fn to_char(&self) -> char {
        match (self.color, self.kind) {
            (Color::Light, PieceKind::Man) => 'l',
            (Color::Light, PieceKind::King) => 'L',
            (Color::Dark, PieceKind::Man) => 'd',
            (Color::Dark, PieceKind::King) => 'D',
        }
    }

    pub const fn from_char(ch: char) -> Option<Self> {
        match ch {
            'l' => Some(Self::new(Color::Light, PieceKind::Man)),
            'L' => Some(Self::new(Color::Light, PieceKind::King)),
            'd' => Some(Self::new(Color::Dark, PieceKind::Man)),
            'D' => Some(Self::new(Color::Dark, PieceKind::King)),
            _ => None,
        }
    }
}

impl Square {
    /// Diagonal directions as (row, col) steps.
    pub const DIAGONALS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

    /// Create a square from row and column. Both must be less than 8.
    pub const fn new(row: u8, col: u8) -> Self {
        debug_assert!(row < BOARD_SIZE as u8 && col < BOARD_SIZE as u8);
        Self(row * BOARD_SIZE as u8 + col)
    }

    /// Create a square from signed coordinates, or None if off the board.
    pub const fn try_new(row: i8, col: i8) -> Option<Self> {
        let size = BOARD_SIZE as i8;
        if row >= 0 && row < size && col >= 0 && col < size {
            Some(Self::new(row as u8, col as u8))
        } else {
            None
        }
    }

    pub const fn row(&self) -> u8 {
        self.0 / BOARD_SIZE as u8
    }

    pub const fn col(&self) -> u8 {
        self.0 % BOARD_SIZE as u8
    }

    /// Index into a 64 cell array.
    pub const fn idx(&self) -> usize {
        self.0 as usize
    }

    /// Only squares with odd `row + col` hold pieces.
    pub const fn is_playable(&self) -> bool {
        (self.row() + self.col()) % 2 == 1
    }

    /// Step `(dr, dc)` away from this square, or None if that leaves the board.
    pub const fn offset(&self, dr: i8, dc: i8) -> Option<Self> {
        Self::try_new(self.row() as i8 + dr, self.col() as i8 + dc)
    }

    /// 1-based playable square number used in move codes, 1 through 32.
    pub const fn number(&self) -> u8 {
        self.row() * 4 + self.col() / 2 + 1
    }

    /// Inverse of `number`.
    pub const fn from_number(number: u8) -> Option<Self> {
        if number == 0 || number as usize > NUM_PLAYABLE {
            return None;
        }
        let row = (number - 1) / 4;
        let col = ((number - 1) % 4) * 2 + if row % 2 == 0 { 1 } else { 0 };
        Some(Self::new(row, col))
    }

    /// Square reflected through the center of the board.
    pub const fn mirrored(&self) -> Self {
        let last = (BOARD_SIZE - 1) as u8;
        Self::new(last - self.row(), last - self.col())
    }

    /// Iterate all playable squares in square number order.
    pub fn playable() -> impl Iterator<Item = Square> {
        (1..=NUM_PLAYABLE as u8).filter_map(Square::from_number)
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Parse a square from its 1-based playable number.
impl FromStr for Square {
    type Err = error::Error;
    fn from_str(s: &str) -> error::Result<Self> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(Square::from_number)
            .ok_or_else(|| (ErrorKind::ParseSquareMalformed, s).into())
    }
}

impl Move {
    /// A simple, non-capturing step or king slide.
    pub fn simple(from: Square, to: Square) -> Self {
        let mut path = Path::new();
        path.push(from);
        path.push(to);
        Self { path, captures: 0 }
    }

    /// A capture chain visiting every square of path, capturing once per step.
    pub fn capture(path: Path) -> Self {
        debug_assert!(path.len() >= 2);
        let captures = (path.len() - 1) as u8;
        Self { path, captures }
    }

    pub fn from(&self) -> Square {
        self.path[0]
    }

    pub fn to(&self) -> Square {
        self.path[self.path.len() - 1]
    }

    pub fn path(&self) -> &[Square] {
        &self.path
    }

    /// Number of pieces captured by this move.
    pub const fn captures(&self) -> u8 {
        self.captures
    }

    pub const fn is_capture(&self) -> bool {
        self.captures > 0
    }
}

/// # Example
/// A double jump from 22 over to 15 then to 6 displays as `22x15x6`.
impl Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let separator = if self.is_capture() { 'x' } else { '-' };
        let mut s = String::with_capacity(self.path.len() * 3);
        for (i, square) in self.path.iter().enumerate() {
            if i > 0 {
                s.push(separator);
            }
            s.push_str(&square.to_string());
        }
        write!(f, "{}", s)
    }
}

impl MoveRecord {
    pub const fn piece(&self) -> Piece {
        self.piece
    }
    pub const fn from(&self) -> Square {
        self.from
    }
    pub const fn to(&self) -> Square {
        self.to
    }
    pub fn captured(&self) -> &[(Piece, Square)] {
        &self.captured
    }
    pub const fn promoted(&self) -> bool {
        self.promoted
    }

    /// The piece standing on `to` after the move was applied.
    pub const fn placed(&self) -> Piece {
        if self.promoted {
            self.piece.crowned()
        } else {
            self.piece
        }
    }
}

impl GameStatus {
    pub const fn is_over(&self) -> bool {
        matches!(self, GameStatus::Won(_))
    }
}
