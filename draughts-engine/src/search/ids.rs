//! Iterative Deepening Search.
//!
//! Each iteration dispatches every root move to the worker pool as its own job,
//! with its own copy of the board. An iteration only replaces the previous
//! result once every root branch has reported a complete score. An iteration
//! cut short by time or a stop signal is discarded whole.

use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::board::Board;
use crate::coretypes::{Color, Cp, Move, PlyKind};
use crate::evaluation::evaluate;
use crate::movelist::MoveList;
use crate::search::{SearchResult, Searcher, StopCondition};
use crate::threads::{Job, ThreadPool};
use crate::timeman::Mode;
use crate::transposition::TranspositionTable;

// Longest wait for a branch result before rechecking the stop condition.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Score and metrics of one root branch.
#[derive(Debug, Copy, Clone)]
struct BranchResult {
    index: usize,
    score: Cp,
    nodes: u64,
    q_nodes: u64,
    interrupted: bool,
}

/// Outcome of a single iteration of the root loop.
struct Iteration {
    /// Scores in root move order, or None if the iteration did not complete.
    scores: Option<Vec<Cp>>,
    nodes: u64,
    q_nodes: u64,
}

/// Searches the game tree using iterative deepening, from depth 1 to the max depth of mode.
/// It returns every root move sharing the best score of the deepest completed depth.
///
/// Without legal moves the result has no moves and the terminal score.
/// With one legal move it is returned at once without searching.
/// If not even depth 1 completes, the first legal move is returned.
pub fn ids(
    board: Board,
    player: Color,
    mode: Mode,
    tt: &Arc<TranspositionTable>,
    pool: &ThreadPool,
    stopper: Arc<AtomicBool>,
    start_time: Instant,
) -> SearchResult {
    let legal_moves = board.legal_moves(player);
    let mut result = SearchResult::unsearched(player, evaluate(&board, board.status(player)));

    if legal_moves.is_empty() {
        result.elapsed = start_time.elapsed();
        return result;
    }
    result.best_moves.push(legal_moves[0].clone());
    if legal_moves.len() == 1 {
        result.elapsed = start_time.elapsed();
        return result;
    }

    let stop = StopCondition::new(mode.deadline(start_time), stopper);
    let legal_moves = Arc::new(legal_moves);

    for depth in 1..=mode.max_depth() {
        if mode.stop(depth, start_time) || stop.should_stop() {
            result.stopped = true;
            break;
        }

        let iteration = search_depth(&board, player, depth, &legal_moves, tt, pool, &stop);
        result.nodes += iteration.nodes;
        result.q_nodes += iteration.q_nodes;

        let scores = match iteration.scores {
            Some(scores) => scores,
            None => {
                log::debug!("depth {depth} incomplete, keeping depth {}", result.depth);
                result.stopped = true;
                break;
            }
        };

        let best = if player.is_maximizing() {
            scores.iter().max()
        } else {
            scores.iter().min()
        };
        let best = match best {
            Some(best) => *best,
            None => break,
        };

        result.best_moves = legal_moves
            .iter()
            .zip(&scores)
            .filter(|(_, score)| **score == best)
            .map(|(move_, _)| move_.clone())
            .collect();
        result.score = best;
        result.depth = depth;

        log::debug!(
            "depth {depth} score {best} best {} nodes {} elapsed {:?}",
            display_moves(&result.best_moves),
            result.nodes,
            start_time.elapsed()
        );
    }

    result.elapsed = start_time.elapsed();
    result
}

/// Run one iteration at `depth`, fanning every root move out to the pool.
fn search_depth(
    board: &Board,
    player: Color,
    depth: PlyKind,
    legal_moves: &Arc<MoveList>,
    tt: &Arc<TranspositionTable>,
    pool: &ThreadPool,
    stop: &StopCondition,
) -> Iteration {
    let num_moves = legal_moves.len();
    let mut iteration = Iteration {
        scores: None,
        nodes: 0,
        q_nodes: 0,
    };
    let (sender, receiver) = mpsc::channel();

    for index in 0..num_moves {
        let mut board = *board;
        let legal_moves = Arc::clone(legal_moves);
        let tt = Arc::clone(tt);
        let job_stop = stop.clone();
        let sender = sender.clone();

        let job: Job = Box::new(move || {
            let move_ = &legal_moves[index];
            let branch = search_branch(&mut board, player, move_, index, depth, &tt, &job_stop);
            // The root may have stopped listening after a timeout.
            let _ = sender.send(branch);
        });

        if let Err(err) = pool.run(job) {
            log::error!("failed to dispatch root move: {err}");
            stop.abandon();
            return iteration;
        }
    }
    // Only jobs hold senders now, so a lost job disconnects the channel.
    drop(sender);

    let mut scores = vec![Cp(0); num_moves];
    let mut received = 0;
    let mut interrupted = false;

    while received < num_moves {
        if stop.should_stop() {
            // Cancel outstanding jobs, they return as soon as they start or next check.
            stop.abandon();
            return iteration;
        }

        match receiver.recv_timeout(POLL_INTERVAL) {
            Ok(branch) => {
                received += 1;
                iteration.nodes += branch.nodes;
                iteration.q_nodes += branch.q_nodes;
                interrupted |= branch.interrupted;
                scores[branch.index] = branch.score;
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                log::error!("root branch lost at depth {depth}");
                stop.abandon();
                return iteration;
            }
        }
    }

    if !interrupted {
        iteration.scores = Some(scores);
    }
    iteration
}

/// Apply a root move to this job's own board and search the reply.
fn search_branch(
    board: &mut Board,
    player: Color,
    root_move: &Move,
    index: usize,
    depth: PlyKind,
    tt: &TranspositionTable,
    stop: &StopCondition,
) -> BranchResult {
    if stop.should_stop() {
        return BranchResult {
            index,
            score: Cp(0),
            nodes: 0,
            q_nodes: 0,
            interrupted: true,
        };
    }

    let mut searcher = Searcher::new(tt, stop);
    let record = board.do_move(root_move);
    let hash = tt.generate_hash(board, !player);
    let score = searcher.minimax(board, !player, hash, depth - 1, Cp::MIN, Cp::MAX);
    board.undo_move(&record);

    BranchResult {
        index,
        score,
        nodes: searcher.nodes(),
        q_nodes: searcher.q_nodes(),
        interrupted: stop.should_stop(),
    }
}

fn display_moves(moves: &MoveList) -> String {
    let moves: Vec<String> = moves.iter().map(Move::to_string).collect();
    moves.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coretypes::{Piece, PieceKind, Square};

    fn setup() -> (Arc<TranspositionTable>, ThreadPool) {
        (
            Arc::new(TranspositionTable::with_capacity(50_000)),
            ThreadPool::new(2).unwrap(),
        )
    }

    /// Search on a fresh table and pool with a lowered stopper.
    fn run(board: Board, player: Color, mode: Mode) -> SearchResult {
        let (tt, pool) = setup();
        let stopper = Arc::new(AtomicBool::new(false));
        ids(board, player, mode, &tt, &pool, stopper, Instant::now())
    }

    #[test]
    fn zero_budget_returns_first_legal_move() {
        let board = Board::start_position();
        let mode = Mode::movetime(Duration::ZERO, None);

        let result = run(board, Color::Light, mode);
        assert_eq!(result.best_moves, vec![board.legal_moves(Color::Light)[0].clone()]);
        assert_eq!(result.depth, 0);
        assert!(result.stopped);
    }

    #[test]
    fn single_legal_move_returns_without_search() {
        let board: Board = "
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . d . . . . . .
            l . . . . . . .
        "
        .parse()
        .unwrap();

        let result = run(board, Color::Light, Mode::depth(6, None));
        assert_eq!(result.best_moves.len(), 1);
        assert_eq!(result.best_moves[0].to_string(), "29x22");
        assert_eq!(result.depth, 0);
        assert_eq!(result.nodes, 0);
    }

    #[test]
    fn no_legal_moves_is_terminal() {
        let mut board = Board::empty();
        board.put(Square::new(0, 1), Piece::new(Color::Light, PieceKind::Man));

        let result = run(board, Color::Light, Mode::depth(3, None));
        assert!(result.best_moves.is_empty());
        assert_eq!(result.score, Cp::WIN);
    }

    #[test]
    fn depth_mode_completes_every_depth() {
        let board = Board::start_position();
        let result = run(board, Color::Dark, Mode::depth(3, None));

        assert_eq!(result.depth, 3);
        assert!(!result.stopped);
        assert!(!result.best_moves.is_empty());
        let legal = board.legal_moves(Color::Dark);
        assert!(result.best_moves.iter().all(|m| legal.contains(m)));
    }

    #[test]
    fn raised_stopper_keeps_fallback() {
        let (tt, pool) = setup();
        let board = Board::start_position();
        let stopper = Arc::new(AtomicBool::new(true));
        let result = ids(board, Color::Dark, Mode::infinite(), &tt, &pool, stopper, Instant::now());

        assert!(result.stopped);
        assert_eq!(result.best_moves.len(), 1);
    }
}
