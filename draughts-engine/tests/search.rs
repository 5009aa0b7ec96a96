//! Search behavior from the public API.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use draughts_engine::search::{search, SearchRequest, SearchShared};
use draughts_engine::threads::ThreadPool;
use draughts_engine::*;

fn shared(threads: usize) -> SearchShared {
    SearchShared {
        tt: Arc::new(TranspositionTable::with_capacity(200_000)),
        pool: Arc::new(ThreadPool::new(threads).unwrap()),
        book: None,
    }
}

fn run(board: Board, player: Color, mode: Mode) -> SearchResult {
    let request = SearchRequest::new(board, player, mode);
    search(&request, &shared(4), Arc::new(AtomicBool::new(false)))
}

#[test]
fn zero_budget_returns_legal_move() {
    let board = Board::start_position();
    let result = run(board, Color::Dark, Mode::movetime(Duration::ZERO, None));

    assert!(!result.best_moves.is_empty());
    let legal = board.legal_moves(Color::Dark);
    assert!(result.best_moves.iter().all(|m| legal.contains(m)));
}

#[test]
fn avoids_losing_last_man() {
    // Stepping to 19 is captured from 24, stepping to 18 is safe.
    let board: Board = "
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
        . . . . d . . .
        . . . . . . . .
        . . . . . . l .
        . . . . . . . .
        . . . . . . . .
    "
    .parse()
    .unwrap();

    let result = run(board, Color::Dark, Mode::depth(4, None));
    assert_eq!(result.depth, 4);
    let best: Vec<String> = result.best_moves.iter().map(Move::to_string).collect();
    assert_eq!(best, vec!["15-18"]);
    assert!(result.score > -Cp::WIN);
}

#[test]
fn takes_last_man_without_searching() {
    let board: Board = "
        . . . . . . . .
        . . . . . . . .
        . . . d . . . .
        . . . . l . . .
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
    "
    .parse()
    .unwrap();

    let result = run(board, Color::Light, Mode::depth(3, None));
    // Light to move has a single legal capture.
    assert_eq!(result.best_moves.len(), 1);
    assert_eq!(result.best_moves[0].to_string(), "15x6");
    assert_eq!(result.nodes, 0);
}

#[test]
fn deeper_search_keeps_ties_in_generation_order() {
    let board = Board::start_position();
    let result = run(board, Color::Light, Mode::depth(2, None));
    let legal = board.legal_moves(Color::Light);

    let positions: Vec<usize> = result
        .best_moves
        .iter()
        .map(|m| legal.iter().position(|l| l == m).unwrap())
        .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
}

#[test]
fn score_favors_material_advantage() {
    let board: Board = "
        . . . . . . . .
        . . d . . . . .
        . . . . . . . .
        . . . . . . . .
        . . . . . D . .
        . . . . . . . .
        . . . . . . . .
        l . . . . . . .
    "
    .parse()
    .unwrap();

    let result = run(board, Color::Dark, Mode::depth(4, None));
    assert_eq!(result.leading(), Some(Color::Dark));
    assert!(result.relative_score() > Cp(0));
}
