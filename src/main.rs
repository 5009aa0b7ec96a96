//! Terminal draughts game against the self-learning engine.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use draughts_engine::coretypes::GameStatus;
use draughts_engine::evaluation::static_evaluate;
use draughts_engine::{Color, Engine, EngineBuilder, Game, MoveCode, Outcome};

/// Think time for a hint, kept short so the human is not kept waiting.
const HINT_TIME: Duration = Duration::from_millis(1500);

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Engine thinking time per move, in milliseconds
    #[arg(long, default_value_t = 10_000)]
    think_ms: u64,

    /// Learning book file, created on the first finished game
    #[arg(long, default_value = "draughts_book.txt")]
    book: PathBuf,

    /// Worker threads for the search
    #[arg(long, default_value_t = EngineBuilder::DEFAULT_THREADS)]
    threads: usize,

    /// Deepest search iteration
    #[arg(long)]
    depth: Option<u8>,

    /// Engine plays Light and moves first
    #[arg(long)]
    engine_first: bool,

    /// Seed hashing and tie-breaking for reproducible play
    #[arg(long)]
    seed: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

enum InputKind {
    Quit,
    Newgame,
    Help,
    Undo,
    Draw,
    Hint,
    Error,
    GameMove(MoveCode),
}

impl From<&str> for InputKind {
    fn from(s: &str) -> Self {
        let maybe_move: Result<MoveCode, _> = s.trim().parse();
        if let Ok(move_code) = maybe_move {
            Self::GameMove(move_code)
        } else {
            match s {
                "quit" | "exit" => Self::Quit,
                "new" | "newgame" | "ng" => Self::Newgame,
                "help" => Self::Help,
                "undo" => Self::Undo,
                "draw" => Self::Draw,
                "hint" => Self::Hint,
                _ => Self::Error,
            }
        }
    }
}

fn main() {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .init();

    if let Err(err) = run(args) {
        log::error!("fatal error: {err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    println!("Draughts CLI {}\n", env!("CARGO_PKG_VERSION"));

    let mut builder = EngineBuilder::new()
        .threads(args.threads)
        .move_time(Duration::from_millis(args.think_ms))
        .book_path(&args.book);
    if let Some(depth) = args.depth {
        builder = builder.max_depth(depth);
    }
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    let mut engine = builder.build()?;

    let engine_side = if args.engine_first { Color::Light } else { Color::Dark };
    let human_side = !engine_side;
    let mut game = Game::new(Color::Light);
    let mut input = String::new();
    println!("You play {human_side}. Type help for commands.");

    loop {
        if let Some(outcome) = game.outcome_for(engine_side) {
            println!("{}", game.board());
            match outcome {
                Outcome::Win => println!("The engine won. Starting a new game."),
                _ => println!("Congrats!! You won. Starting a new game."),
            }
            finish_game(&mut engine, &mut game, outcome, engine_side)?;
            continue;
        }

        // Have computer play its move.
        if game.player() == engine_side {
            println!("{}\nthinking...", game.board());
            let result = engine.request_best_move(
                *game.board(),
                game.player(),
                &game.history(),
                engine.move_time(),
            )?;
            let Some(move_) = engine.choose_move(&result) else {
                continue;
            };
            game.play(&move_)?;

            println!("Engine played move {move_}.");
            log::debug!("{result}");
            ponder_if_human(&mut engine, &game, engine_side)?;
            continue;
        }

        // Wait for user input.
        println!("Current Static cp  : {}", static_evaluate(game.board()));
        println!("{}", game.board());
        print!("{human_side}> ");
        io::stdout().flush()?;
        input.clear();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        match InputKind::from(input.trim()) {
            InputKind::Quit => break,
            InputKind::Newgame => {
                engine.new_game();
                game = Game::new(Color::Light);
                println!("Starting new game...");
                ponder_if_human(&mut engine, &game, engine_side)?;
            }
            InputKind::Help => print_help(),
            InputKind::Undo => {
                let undone = game.undo_turn(engine_side);
                engine.rewind();
                println!("Undid {undone} moves.");
                ponder_if_human(&mut engine, &game, engine_side)?;
            }
            InputKind::Draw => {
                println!("Game agreed drawn. Starting a new game.");
                finish_game(&mut engine, &mut game, Outcome::Draw, engine_side)?;
            }
            InputKind::Hint => {
                let hint = match engine.book_suggestion(&game.history()) {
                    Some(move_code) => Some(move_code.to_string()),
                    None => {
                        let history = game.history();
                        let result = engine.request_best_move(
                            *game.board(),
                            game.player(),
                            &history,
                            HINT_TIME,
                        )?;
                        result.best_move().map(ToString::to_string)
                    }
                };
                match hint {
                    Some(hint) => println!("Try {hint}."),
                    None => println!("No move available."),
                }
                ponder_if_human(&mut engine, &game, engine_side)?;
            }
            InputKind::Error => {
                let legal_moves = game.legal_moves();
                let moves: Vec<String> = legal_moves.iter().map(ToString::to_string).collect();
                println!("Invalid command: {}", input.trim());
                println!("Legal moves: {}", moves.join(" "));
            }
            InputKind::GameMove(move_code) => {
                if let Err(err) = game.play_code(move_code) {
                    println!("That move was illegal! No action taken. ({err})");
                }
            }
        }
    }

    engine.stop_ponder();
    Ok(())
}

/// Teach the book the result of the game, then start over.
fn finish_game(
    engine: &mut Engine,
    game: &mut Game,
    outcome: Outcome,
    engine_side: Color,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = engine.record_game_outcome(&game.history(), outcome) {
        println!("Could not save the book: {err}");
    }
    engine.new_game();
    *game = Game::new(Color::Light);
    ponder_if_human(engine, game, engine_side)
}

/// Think on the human's time while they decide.
fn ponder_if_human(
    engine: &mut Engine,
    game: &Game,
    engine_side: Color,
) -> Result<(), Box<dyn std::error::Error>> {
    if game.player() != engine_side && game.status() == GameStatus::Ongoing {
        engine.start_ponder(*game.board(), game.player())?;
    }
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("new | ng => Begin a new game.");
    println!("undo => Take back your last move and the engine reply.");
    println!("draw => Agree to a draw and begin a new game.");
    println!("hint => Suggest a move.");
    println!("help => Print this help text.");
    println!("quit => End CLI.");
    println!("\nTo make a move, enter its square numbers, 1 to 32 from the top left.");
    println!("Examples: 22-18 -> step from 22 to 18, 22x15 -> capture from 22 to 15.");
}
