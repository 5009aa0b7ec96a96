//! Engine struct acts as a simplified API for the various parts of the Draughts engine.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::board::Board;
use crate::book::{LearningStore, Outcome};
use crate::coretypes::{Color, Move, PlyKind, MAX_DEPTH};
use crate::error::{self, ErrorKind};
use crate::notation::MoveCode;
use crate::ponder::{Ponderer, DEFAULT_JOIN_TIMEOUT};
use crate::search::{self, SearchRequest, SearchResult, SearchShared};
use crate::threads::ThreadPool;
use crate::timeman::Mode;
use crate::transposition::TranspositionTable;
use crate::zobrist::ZobristTable;

/// EngineBuilder allows for parameters of an Engine to be set and built once,
/// avoiding repeating costly initialization steps of making then changing an Engine.
///
/// Default values:
///
/// * `num_threads`: 4
/// * `transpositions`: 850,000 entries
/// * `max_depth`: 22
/// * `move_time`: 10 seconds
/// * `book_path`: None, the book lives in memory only
/// * `seed`: None, seeded from entropy
/// * `ponder_timeout`: 100 milliseconds
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EngineBuilder {
    num_threads: usize,
    transpositions: usize,
    max_depth: PlyKind,
    move_time: Duration,
    book_path: Option<PathBuf>,
    seed: Option<u64>,
    ponder_timeout: Duration,
}

impl EngineBuilder {
    pub const DEFAULT_THREADS: usize = 4;
    pub const DEFAULT_MOVE_TIME: Duration = Duration::from_secs(10);

    /// Create a new default EngineBuilder.
    pub fn new() -> Self {
        Self {
            num_threads: Self::DEFAULT_THREADS,
            transpositions: TranspositionTable::DEFAULT_MAX_CAPACITY,
            max_depth: MAX_DEPTH,
            move_time: Self::DEFAULT_MOVE_TIME,
            book_path: None,
            seed: None,
            ponder_timeout: DEFAULT_JOIN_TIMEOUT,
        }
    }

    /// Create and return a new Engine.
    /// A book that cannot be read is logged and replaced by an empty book at the same path.
    pub fn build(&self) -> error::Result<Engine> {
        let (ztable, rng) = match self.seed {
            Some(seed) => (ZobristTable::with_seed(seed), StdRng::seed_from_u64(seed)),
            None => (ZobristTable::new(), StdRng::from_entropy()),
        };
        let tt = TranspositionTable::with_capacity_and_zobrist_table(self.transpositions, ztable);
        let pool = ThreadPool::new(self.num_threads)?;

        let book = match &self.book_path {
            Some(path) => {
                let store = LearningStore::open(path).unwrap_or_else(|err| {
                    log::error!("failed to load book {}: {err}", path.display());
                    LearningStore::empty_at(path)
                });
                Some(Arc::new(Mutex::new(store)))
            }
            None => Some(Arc::new(Mutex::new(LearningStore::in_memory()))),
        };

        Ok(Engine {
            shared: SearchShared {
                tt: Arc::new(tt),
                pool: Arc::new(pool),
                book,
            },
            stopper: Arc::new(AtomicBool::new(false)),
            search_handle: None,
            ponderer: Ponderer::new(self.ponder_timeout),
            rng,
            max_depth: self.max_depth,
            move_time: self.move_time,
        })
    }

    /// Set the engine's search thread pool size. At least one thread is used.
    pub fn threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads.max(1);
        self
    }

    /// Set the engine's transposition table capacity in entries.
    pub fn transpositions(mut self, transpositions: usize) -> Self {
        self.transpositions = transpositions;
        self
    }

    /// Set the deepest iteration of any search, capped at MAX_DEPTH.
    pub fn max_depth(mut self, max_depth: PlyKind) -> Self {
        self.max_depth = max_depth.clamp(1, MAX_DEPTH);
        self
    }

    /// Set the default thinking time of a move.
    pub fn move_time(mut self, move_time: Duration) -> Self {
        self.move_time = move_time;
        self
    }

    /// Set the file the learning store is loaded from and saved to.
    pub fn book_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.book_path = Some(path.into());
        self
    }

    /// Seed Zobrist keys and tie-breaking for reproducible play.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set how long stopping a ponder search may wait for it.
    pub fn ponder_timeout(mut self, ponder_timeout: Duration) -> Self {
        self.ponder_timeout = ponder_timeout;
        self
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Engine wraps up all parameters required for running any kind of search.
/// It owns the transposition table, the worker pool and the learning store,
/// which are shared by the foreground search and the ponder search.
///
/// If a new game is going to be started, the engine needs to be told so.
pub struct Engine {
    // Search fields
    shared: SearchShared,
    stopper: Arc<AtomicBool>,
    rng: StdRng,
    max_depth: PlyKind,
    move_time: Duration,

    // Meta fields
    search_handle: Option<JoinHandle<()>>,
    ponderer: Ponderer,
}

impl Engine {
    /// Returns reference to engine's transposition table.
    pub fn transposition_table(&self) -> &TranspositionTable {
        &self.shared.tt
    }

    /// Number of worker threads used by a search.
    pub fn num_threads(&self) -> usize {
        self.shared.pool.num_threads()
    }

    pub fn max_depth(&self) -> PlyKind {
        self.max_depth
    }

    /// Default thinking time of a move.
    pub fn move_time(&self) -> Duration {
        self.move_time
    }

    /// Find every best move for player on board, thinking for at most budget.
    /// A confident book move for history is returned without searching.
    /// Any ponder search is stopped first.
    pub fn request_best_move(
        &mut self,
        board: Board,
        player: Color,
        history: &[MoveCode],
        budget: Duration,
    ) -> error::Result<SearchResult> {
        self.stop_ponder();
        // Block until a search is ready to run.
        self.stop();
        self.wait();

        let mode = Mode::movetime(budget, Some(self.max_depth));
        let request = SearchRequest::new(board, player, mode).with_history(history.to_vec());

        let (sender, receiver) = mpsc::channel::<SearchResult>();
        self.search(request, sender)?;
        let result = receiver
            .recv()
            .map_err(|_| error::Error::from(ErrorKind::EngineSearchLost));
        self.wait();

        let result = result?;
        log::debug!(
            "best of {} moves at depth {} score {} nodes {}",
            result.best_moves.len(),
            result.depth,
            result.score,
            result.nodes
        );
        Ok(result)
    }

    /// Run a non-blocking search.
    /// The engine only runs one search at a time, so if it is not ready, it fails to begin.
    /// If the engine is available for searching, it ensures its stopper is unset.
    pub fn search<T>(&mut self, request: SearchRequest, sender: Sender<T>) -> error::Result<()>
    where
        T: From<SearchResult> + Send + 'static,
    {
        if self.search_handle.is_none() {
            self.unstop();

            let handle = search::search_nonblocking(
                request,
                self.shared.clone(),
                Arc::clone(&self.stopper),
                sender,
            )?;
            self.search_handle = Some(handle);

            Ok(())
        } else {
            Err((ErrorKind::EngineAlreadySearching, "failed to begin search").into())
        }
    }

    /// Pick one of the tied best moves of a search.
    pub fn choose_move(&mut self, result: &SearchResult) -> Option<Move> {
        result.pick(&mut self.rng).cloned()
    }

    /// Search board with player to move in the background until stopped.
    pub fn start_ponder(&mut self, board: Board, player: Color) -> error::Result<()> {
        self.ponderer.start(board, player, self.shared.clone())
    }

    /// Stop pondering, waiting only a short bounded time for the ponder thread.
    pub fn stop_ponder(&mut self) {
        self.ponderer.stop();
    }

    pub fn is_pondering(&self) -> bool {
        self.ponderer.is_pondering()
    }

    /// Informs the active search to stop searching as soon as possible.
    pub fn stop(&self) {
        self.stopper.store(true, Ordering::Relaxed);
    }

    /// Resets stopper flag.
    pub fn unstop(&self) {
        self.stopper.store(false, Ordering::Relaxed);
    }

    /// Engine blocks thread until search is completed.
    pub fn wait(&mut self) {
        let handle_opt = self.search_handle.take();

        if let Some(handle) = handle_opt {
            if handle.join().is_err() {
                log::error!("search thread panicked");
            }
        }
    }

    /// Returns true if the engine is ready to start a search.
    /// Only one search may run at a time, so if a search is in progress, engine is not ready.
    pub fn ready(&self) -> bool {
        self.search_handle.is_none()
    }

    /// Moves were taken back. Stops all searching and forgets every stored position.
    pub fn rewind(&mut self) {
        self.stop_ponder();
        self.stop();
        self.wait();
        self.shared.tt.clear();
    }

    /// Informs engine that next search will be from a new game.
    pub fn new_game(&mut self) {
        self.rewind();
    }

    /// Learn from a finished game and persist the learning store.
    /// A failed save is returned while the learned scores are kept in memory.
    pub fn record_game_outcome(&self, history: &[MoveCode], outcome: Outcome) -> error::Result<()> {
        match &self.shared.book {
            Some(book) => book
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .record_game(history, outcome),
            None => Ok(()),
        }
    }

    /// Confident book move for history, if any.
    pub fn book_suggestion(&self, history: &[MoveCode]) -> Option<MoveCode> {
        self.shared.book.as_ref().and_then(|book| {
            book.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .query_best_move(history)
        })
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop_ponder();
        self.stop();
        self.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coretypes::Cp;
    use crate::game::Game;
    use crate::notation::parse_history;
    use crate::transposition::{Bound, Entry};

    fn engine() -> Engine {
        EngineBuilder::new()
            .threads(2)
            .transpositions(50_000)
            .max_depth(4)
            .seed(7)
            .build()
            .unwrap()
    }

    #[test]
    fn builder_applies_settings() {
        let engine = engine();
        assert_eq!(engine.num_threads(), 2);
        assert_eq!(engine.transposition_table().capacity(), 50_000);
        assert_eq!(engine.max_depth(), 4);
        assert_eq!(engine.move_time(), EngineBuilder::DEFAULT_MOVE_TIME);
        assert!(engine.ready());
    }

    #[test]
    fn request_best_move_returns_legal_moves() {
        let mut engine = engine();
        let board = Board::start_position();
        let result = engine
            .request_best_move(board, Color::Light, &[], Duration::from_secs(5))
            .unwrap();

        assert_eq!(result.depth, 4);
        let legal = board.legal_moves(Color::Light);
        assert!(result.best_moves.iter().all(|m| legal.contains(m)));

        let chosen = engine.choose_move(&result).unwrap();
        assert!(result.best_moves.contains(&chosen));
        assert!(engine.ready());
    }

    #[test]
    fn zero_budget_still_moves() {
        let mut engine = engine();
        let board = Board::start_position();
        let result = engine
            .request_best_move(board, Color::Dark, &[], Duration::ZERO)
            .unwrap();
        assert!(!result.best_moves.is_empty());
    }

    #[test]
    fn learned_game_is_suggested() {
        let mut engine = engine();
        let game = parse_history("11-15,22-18").unwrap();
        assert_eq!(engine.book_suggestion(&[]), None);

        engine.record_game_outcome(&game, Outcome::Win).unwrap();
        assert_eq!(engine.book_suggestion(&[]), Some(game[0]));

        let result = engine
            .request_best_move(Board::start_position(), Color::Dark, &[], Duration::from_secs(5))
            .unwrap();
        assert!(result.from_book);
        assert_eq!(MoveCode::from(&result.best_moves[0]), game[0]);
    }

    #[test]
    fn new_game_clears_table_and_ponder() {
        let mut engine = engine();
        let board = Board::start_position();
        engine.start_ponder(board, Color::Light).unwrap();
        assert!(engine.is_pondering());

        let hash = engine.transposition_table().generate_hash(&board, Color::Light);
        let entry = Entry::new(hash, Cp(25), 3, Bound::Exact);
        engine.transposition_table().replace(entry);

        engine.new_game();
        assert!(!engine.is_pondering());
        assert!(!engine.transposition_table().contains(hash));
    }

    #[test]
    fn rewind_stops_ponder_and_clears_table() {
        let mut engine = engine();
        let mut game = Game::new(Color::Light);
        game.play_code("22-18".parse().unwrap()).unwrap();
        let hash = engine.transposition_table().generate_hash(game.board(), game.player());
        engine.transposition_table().replace(Entry::new(hash, Cp(-40), 4, Bound::Lower));
        engine.start_ponder(*game.board(), game.player()).unwrap();

        game.undo().unwrap();
        engine.rewind();
        assert!(!engine.is_pondering());
        assert!(engine.ready());
        assert!(!engine.transposition_table().contains(hash));
    }
}
