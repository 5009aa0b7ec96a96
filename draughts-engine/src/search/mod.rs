//! Search functions.

mod ids;
mod minimax;
mod quiescence;

pub use ids::*;
pub use minimax::*;

use std::fmt::{self, Display};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::Board;
use crate::book::LearningStore;
use crate::coretypes::{Color, Cp, Move, PlyKind};
use crate::error::{self, ErrorKind};
use crate::movelist::{MoveHistory, MoveList};
use crate::threads::ThreadPool;
use crate::timeman::Mode;
use crate::transposition::TranspositionTable;

/// The results found from running a search on some root position.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Every root move sharing the best score at the deepest completed depth.
    /// Empty only when the side to move has no legal move.
    pub best_moves: MoveList,
    /// The score of making a best move, with absolute Cp (+Dark, -Light).
    pub score: Cp,
    /// The player to move for the root position that was searched.
    pub player: Color,
    /// Deepest fully searched depth. 0 if no depth completed.
    pub depth: PlyKind,
    /// Total number of nodes visited in a search, including quiescence nodes.
    pub nodes: u64,
    /// Total number of nodes visited in a quiescence search.
    pub q_nodes: u64,
    /// Total time elapsed from the start to the end of a search.
    pub elapsed: Duration,
    /// Flag that indicates this search was cut short by time or a stop signal.
    pub stopped: bool,
    /// Flag that indicates the move came from the learning store without search.
    pub from_book: bool,
}

impl SearchResult {
    /// A result with no search performed.
    pub(crate) fn unsearched(player: Color, score: Cp) -> Self {
        Self {
            best_moves: MoveList::new(),
            score,
            player,
            depth: 0,
            nodes: 0,
            q_nodes: 0,
            elapsed: Duration::ZERO,
            stopped: false,
            from_book: false,
        }
    }

    /// The first best move, if any.
    pub fn best_move(&self) -> Option<&Move> {
        self.best_moves.first()
    }

    /// Pick one of the tied best moves uniformly at random.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Move> {
        self.best_moves.choose(rng)
    }

    /// Get average nodes per second of search.
    pub fn nps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            (self.nodes as f64 / secs).round()
        } else {
            0.0
        }
    }

    /// Converts the score of the search into one that is relative to search's root player.
    pub fn relative_score(&self) -> Cp {
        self.score * self.player.sign()
    }

    /// Returns the color who is leading in the search of the root position, or None if even.
    pub fn leading(&self) -> Option<Color> {
        self.score.leading()
    }
}

impl Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let moves: Vec<String> = self.best_moves.iter().map(Move::to_string).collect();

        let mut displayed = String::new();
        displayed.push_str("SearchResult {\n");
        displayed.push_str(&format!("    best_moves: {}\n", moves.join(" ")));
        displayed.push_str(&format!("    abs_score : {}\n", self.score));
        displayed.push_str(&format!("    player    : {}\n", self.player));
        displayed.push_str(&format!("    depth     : {}\n", self.depth));
        displayed.push_str(&format!("    nodes     : {}\n", self.nodes));
        displayed.push_str(&format!("    q_nodes   : {}\n", self.q_nodes));
        displayed.push_str(&format!("    nps       : {}\n", self.nps()));
        displayed.push_str(&format!(
            "    elapsed   : {}.{:03}s\n",
            self.elapsed.as_secs(),
            self.elapsed.subsec_millis()
        ));
        displayed.push_str(&format!("    stopped   : {}\n", self.stopped));
        displayed.push_str(&format!("    from_book : {}\n", self.from_book));
        displayed.push_str("}\n");

        write!(f, "{displayed}")
    }
}

/// Cooperative stop signal checked at every node of a search.
///
/// A search stops once its deadline passes, once its owner raises `stopper`,
/// or once the root abandons the current iteration.
#[derive(Debug, Clone)]
pub struct StopCondition {
    deadline: Option<Instant>,
    stopper: Arc<AtomicBool>,
    abandoned: Arc<AtomicBool>,
}

impl StopCondition {
    pub fn new(deadline: Option<Instant>, stopper: Arc<AtomicBool>) -> Self {
        Self {
            deadline,
            stopper,
            abandoned: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns true if every node of this search should return at once.
    pub fn should_stop(&self) -> bool {
        self.stopper.load(Ordering::Relaxed)
            || self.abandoned.load(Ordering::Relaxed)
            || self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
    }

    /// Cancel every outstanding job of this search without touching the shared stopper.
    pub fn abandon(&self) {
        self.abandoned.store(true, Ordering::Relaxed);
    }
}

/// Everything a search needs to know about the position it searches.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub board: Board,
    pub player: Color,
    /// Move codes played so far, used to consult the learning store.
    pub history: MoveHistory,
    pub mode: Mode,
    /// When false the learning store is never consulted.
    pub use_book: bool,
}

impl SearchRequest {
    /// A request to search board with player to move, without consulting the book.
    pub fn new(board: Board, player: Color, mode: Mode) -> Self {
        Self {
            board,
            player,
            history: MoveHistory::new(),
            mode,
            use_book: false,
        }
    }

    /// Attach the game history and allow a book move to short-circuit search.
    pub fn with_history(mut self, history: MoveHistory) -> Self {
        self.history = history;
        self.use_book = true;
        self
    }
}

/// Long lived components shared by every search of an engine.
#[derive(Clone)]
pub struct SearchShared {
    pub tt: Arc<TranspositionTable>,
    pub pool: Arc<ThreadPool>,
    pub book: Option<Arc<Mutex<LearningStore>>>,
}

/// Find a confident book move for the request that is still legal on its board.
/// A suggestion that no longer matches a legal move is ignored.
pub fn book_move(book: &Mutex<LearningStore>, request: &SearchRequest) -> Option<Move> {
    let move_code = {
        book.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .query_best_move(&request.history)
    }?;

    match move_code.resolve(&request.board, request.player) {
        Some(move_) => {
            log::debug!("book move {move_code}");
            Some(move_)
        }
        None => {
            log::debug!("book move {move_code} is not legal here, searching instead");
            None
        }
    }
}

/// Draughts Engine primary position search function.
/// Plays a confident book move when allowed, otherwise runs iterative deepening.
pub fn search(
    request: &SearchRequest,
    shared: &SearchShared,
    stopper: Arc<AtomicBool>,
) -> SearchResult {
    let start_time = Instant::now();

    if request.use_book {
        if let Some(book) = &shared.book {
            if let Some(move_) = book_move(book, request) {
                let mut result = SearchResult::unsearched(request.player, Cp(0));
                result.best_moves.push(move_);
                result.from_book = true;
                result.elapsed = start_time.elapsed();
                return result;
            }
        }
    }

    ids(
        request.board,
        request.player,
        request.mode,
        &shared.tt,
        &shared.pool,
        stopper,
        start_time,
    )
}

/// Draughts Engine non-blocking search function. This runs the search on a separate thread.
/// When the search has been completed, it returns the value by sending it over the given Sender.
///
/// # Arguments
///
/// * `request`: Position, history and mode of the search
/// * `shared`: Transposition table, worker pool and book shared with other searches
/// * `stopper`: Tell search to stop early from an external source
/// * `sender`: Channel to send search result over
pub fn search_nonblocking<T>(
    request: SearchRequest,
    shared: SearchShared,
    stopper: Arc<AtomicBool>,
    sender: mpsc::Sender<T>,
) -> error::Result<thread::JoinHandle<()>>
where
    T: 'static + Send + From<SearchResult>,
{
    thread::Builder::new()
        .name("search".to_string())
        .spawn(move || {
            let search_result = search(&request, &shared, stopper);
            if sender.send(search_result.into()).is_err() {
                log::debug!("search result dropped, receiver closed");
            }
        })
        .map_err(|err| error::Error::new(ErrorKind::ThreadSpawnFailed, err))
}
