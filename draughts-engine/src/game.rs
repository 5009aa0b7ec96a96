//! Game structure.

use crate::board::Board;
use crate::book::Outcome;
use crate::coretypes::{Color, GameStatus, Move, MoveRecord};
use crate::error::{self, ErrorKind};
use crate::movelist::{MoveHistory, MoveList};
use crate::notation::MoveCode;

/// Game contains information for an in progress game:
/// The current board, the player to move, and every move played so far together
/// with the record needed to take it back.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Game {
    board: Board,
    player: Color,
    played: Vec<(Move, MoveRecord)>,
}

impl Game {
    /// Create a new game in the standard start position with `first` to move.
    pub fn new(first: Color) -> Self {
        Self::from_board(Board::start_position(), first)
    }

    /// Create a new game in the standard start position, Light moving first.
    pub fn start_position() -> Self {
        Self::new(Color::Light)
    }

    /// Create a game from any board, with no past moves.
    pub fn from_board(board: Board, player: Color) -> Self {
        Self {
            board,
            player,
            played: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Player to move.
    pub fn player(&self) -> Color {
        self.player
    }

    /// Number of moves played so far.
    pub fn len(&self) -> usize {
        self.played.len()
    }

    pub fn is_empty(&self) -> bool {
        self.played.is_empty()
    }

    /// Move codes of every move played so far, the key into the learning store.
    pub fn history(&self) -> MoveHistory {
        self.played.iter().map(|(move_, _)| MoveCode::from(move_)).collect()
    }

    pub fn status(&self) -> GameStatus {
        self.board.status(self.player)
    }

    pub fn legal_moves(&self) -> MoveList {
        self.board.legal_moves(self.player)
    }

    /// Play a move for the player to move.
    /// Returns Err if the game is over or the move is not legal.
    pub fn play(&mut self, move_: &Move) -> error::Result<()> {
        if self.status().is_over() {
            return Err(ErrorKind::GameOver.into());
        }
        let record = self
            .board
            .do_legal_move(self.player, move_)
            .ok_or((ErrorKind::GameIllegalMove, move_.to_string()))?;

        self.played.push((move_.clone(), record));
        self.player = !self.player;
        Ok(())
    }

    /// Play the legal move described by a move code, returning the full move.
    pub fn play_code(&mut self, move_code: MoveCode) -> error::Result<Move> {
        if self.status().is_over() {
            return Err(ErrorKind::GameOver.into());
        }
        let move_ = move_code
            .resolve(&self.board, self.player)
            .ok_or((ErrorKind::GameIllegalMove, move_code.to_string()))?;
        self.play(&move_)?;
        Ok(move_)
    }

    /// Take back the last move played. Returns the move, or None at the start of the game.
    pub fn undo(&mut self) -> Option<Move> {
        let (move_, record) = self.played.pop()?;
        self.board.undo_move(&record);
        self.player = !self.player;
        Some(move_)
    }

    /// Take back moves until it is the turn of the side not played by the engine,
    /// undoing the engine reply and the move before it.
    /// Returns the number of moves taken back.
    pub fn undo_turn(&mut self, engine_side: Color) -> usize {
        let mut undone = 0;
        while self.undo().is_some() {
            undone += 1;
            if self.player != engine_side {
                break;
            }
        }
        undone
    }

    /// Outcome of a finished game from the engine's point of view, or None if still ongoing.
    pub fn outcome_for(&self, engine_side: Color) -> Option<Outcome> {
        match self.status() {
            GameStatus::Ongoing => None,
            GameStatus::Won(winner) if winner == engine_side => Some(Outcome::Win),
            GameStatus::Won(_) => Some(Outcome::Loss),
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::start_position()
    }
}
