//! Draughts engine core: move generation, evaluation, a parallel alpha-beta
//! search with a shared transposition table, a self-learning move book and
//! background pondering.

pub mod board;
pub mod book;
pub mod coretypes;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod game;
pub(crate) mod movegen;
pub mod movelist;
pub mod notation;
pub mod perft;
pub mod ponder;
pub mod search;
pub mod threads;
pub mod timeman;
pub mod transposition;
pub mod zobrist;

pub use board::Board;
pub use book::{LearningStore, Outcome};
pub use coretypes::{Color, Cp, Move};
pub use engine::{Engine, EngineBuilder};
pub use game::Game;
pub use notation::MoveCode;
pub use search::SearchResult;
pub use timeman::Mode;
pub use transposition::TranspositionTable;
