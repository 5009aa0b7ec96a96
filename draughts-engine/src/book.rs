//! Learning Store
//!
//! A persistent table that maps a move history key (the move codes played so
//! far, joined by `,`) to the moves played from that position and a score for
//! each. After every finished game, each move played gets the game outcome
//! added to its score at the history it was played from. A move with a
//! positive score may be replayed later without searching.
//!
//! The durable format is one line per history key:
//! `9-13,22-17:11-15,2;10-14,-1`. The opening position has the empty key.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt::{self, Display};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error;
use crate::notation::{history_key, parse_history, MoveCode};

/// Lowest score a move needs before it is suggested.
pub const CONFIDENCE_THRESHOLD: i32 = 1;

/// Result of a finished game from the point of view of the learning side.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// Score change applied to every move of a game with this outcome.
    pub const fn delta(&self) -> i32 {
        match self {
            Outcome::Win => 1,
            Outcome::Loss => -1,
            Outcome::Draw => 0,
        }
    }
}

type Scores = BTreeMap<MoveCode, i32>;

/// The learning store, fully held in memory and rewritten whole on every save.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct LearningStore {
    path: Option<PathBuf>,
    book: BTreeMap<String, Scores>,
}

impl LearningStore {
    /// A store that is never written to storage.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the store backed by the file at path.
    /// A missing file is an empty store, the file is created on the first save.
    pub fn open<P: AsRef<Path>>(path: P) -> error::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let book = match fs::read_to_string(&path) {
            Ok(text) => parse_book(&text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("no book at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(err) => return Err(err.into()),
        };
        log::info!("loaded book with {} known positions", book.len());

        Ok(Self {
            path: Some(path),
            book,
        })
    }

    /// An empty store that saves to path, ignoring any existing file.
    pub fn empty_at<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            book: BTreeMap::new(),
        }
    }

    /// File backing this store, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of known history keys.
    pub fn len(&self) -> usize {
        self.book.len()
    }

    pub fn is_empty(&self) -> bool {
        self.book.is_empty()
    }

    /// Score of move played from history, if it was ever played there.
    pub fn score(&self, history: &[MoveCode], move_code: MoveCode) -> Option<i32> {
        self.book
            .get(&history_key(history))
            .and_then(|scores| scores.get(&move_code))
            .copied()
    }

    /// Add the outcome to every move of a game, at the history it was played from.
    /// The store is only changed in memory.
    pub fn learn(&mut self, moves: &[MoveCode], outcome: Outcome) {
        for (i, move_code) in moves.iter().enumerate() {
            let scores = self.book.entry(history_key(&moves[..i])).or_default();
            *scores.entry(*move_code).or_insert(0) += outcome.delta();
        }
    }

    /// Learn from a finished game then persist the entire store.
    /// An empty game changes nothing and writes nothing.
    ///
    /// A failed save is returned, but the learned scores stay in memory
    /// and are written by the next successful save.
    pub fn record_game(&mut self, moves: &[MoveCode], outcome: Outcome) -> error::Result<()> {
        if moves.is_empty() {
            return Ok(());
        }
        log::debug!("learning {} moves with outcome {:?}", moves.len(), outcome);
        self.learn(moves, outcome);
        self.save()
    }

    /// The highest scoring move for exactly this history.
    /// Returns None if the history is unknown or its best score is under the confidence threshold.
    /// Ties go to the lowest move code.
    pub fn query_best_move(&self, history: &[MoveCode]) -> Option<MoveCode> {
        let scores = self.book.get(&history_key(history))?;
        let mut best: Option<(MoveCode, i32)> = None;
        for (&move_code, &score) in scores {
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((move_code, score));
            }
        }

        match best {
            Some((move_code, score)) if score >= CONFIDENCE_THRESHOLD => Some(move_code),
            _ => None,
        }
    }

    /// Rewrite the whole store to its file.
    /// The table is written to a sibling temporary file which then replaces the book,
    /// so an interrupted save leaves the previous book intact.
    pub fn save(&self) -> error::Result<()> {
        let path = match &self.path {
            Some(path) => path,
            None => return Ok(()),
        };

        let mut tmp_name = OsString::from(path.as_os_str());
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let written = (|| -> io::Result<()> {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            write!(writer, "{}", self)?;
            let file = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
            file.sync_all()?;
            fs::rename(&tmp_path, path)
        })();

        match written {
            Ok(()) => {
                log::info!("saved book with {} known positions", self.book.len());
                Ok(())
            }
            Err(err) => {
                log::error!("failed to save book to {}: {err}", path.display());
                let _ = fs::remove_file(&tmp_path);
                Err(err.into())
            }
        }
    }
}

/// Displays the store in its durable line format, keys and moves in sorted order.
impl Display for LearningStore {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (key, scores) in &self.book {
            let entries: Vec<String> = scores
                .iter()
                .map(|(move_code, score)| format!("{move_code},{score}"))
                .collect();
            writeln!(f, "{key}:{}", entries.join(";"))?;
        }
        Ok(())
    }
}

/// Parse the durable line format.
/// Malformed lines and entries are skipped on their own, the rest still loads.
fn parse_book(text: &str) -> BTreeMap<String, Scores> {
    let mut book = BTreeMap::new();

    for (line_number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (key, entries) = match line.split_once(':') {
            Some(parts) => parts,
            None => {
                log::warn!("book line {}: missing ':', skipped", line_number + 1);
                continue;
            }
        };
        let key = match parse_history(key) {
            Ok(history) => history_key(&history),
            Err(err) => {
                log::warn!("book line {}: bad history, skipped: {err}", line_number + 1);
                continue;
            }
        };

        let mut scores = Scores::new();
        for entry in entries.split(';').filter(|entry| !entry.trim().is_empty()) {
            match parse_entry(entry) {
                Some((move_code, score)) => {
                    scores.insert(move_code, score);
                }
                None => log::warn!("book line {}: bad entry {entry:?}, skipped", line_number + 1),
            }
        }

        if !scores.is_empty() {
            book.entry(key).or_insert_with(Scores::new).extend(scores);
        }
    }

    book
}

fn parse_entry(entry: &str) -> Option<(MoveCode, i32)> {
    let (move_code, score) = entry.split_once(',')?;
    let move_code = move_code.parse().ok()?;
    let score = score.trim().parse().ok()?;
    Some((move_code, score))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(s: &str) -> Vec<MoveCode> {
        parse_history(s).unwrap()
    }

    fn code(s: &str) -> MoveCode {
        s.parse().unwrap()
    }

    #[test]
    fn learn_updates_every_prefix() {
        let mut store = LearningStore::in_memory();
        store.learn(&codes("9-13,22-17"), Outcome::Loss);

        assert_eq!(store.score(&[], code("9-13")), Some(-1));
        assert_eq!(store.score(&codes("9-13"), code("22-17")), Some(-1));
        assert_eq!(store.score(&[], code("22-17")), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn query_respects_threshold() {
        let mut store = LearningStore::in_memory();
        let game = codes("9-13,22-17,10-14");

        store.learn(&game, Outcome::Draw);
        assert_eq!(store.query_best_move(&[]), None);

        store.learn(&game, Outcome::Win);
        assert_eq!(store.query_best_move(&[]), Some(code("9-13")));
        assert_eq!(store.query_best_move(&codes("9-13,22-17")), Some(code("10-14")));

        store.learn(&game, Outcome::Loss);
        assert_eq!(store.query_best_move(&[]), None);
        assert_eq!(store.query_best_move(&codes("11-15")), None);
    }

    #[test]
    fn query_prefers_highest_score() {
        let store = LearningStore {
            path: None,
            book: parse_book(":9-13,1;10-14,3;11-15,-2\n"),
        };
        assert_eq!(store.query_best_move(&[]), Some(code("10-14")));
    }

    #[test]
    fn parse_skips_malformed_lines_and_entries() {
        let text = "\
            :9-13,2;garbage;10-14,x;11-15,-1\n\
            no colon here\n\
            9-13:22-17,1\n\
            a-b:22-18,4\n\
            \n\
            9-13,22-17:\n";
        let book = parse_book(text);

        assert_eq!(book.len(), 2);
        assert_eq!(book[""].len(), 2);
        assert_eq!(book[""][&code("9-13")], 2);
        assert_eq!(book[""][&code("11-15")], -1);
        assert_eq!(book["9-13"][&code("22-17")], 1);
    }

    #[test]
    fn display_is_sorted_line_format() {
        let mut store = LearningStore::in_memory();
        store.learn(&codes("9-13,22-17"), Outcome::Win);
        store.learn(&codes("10-14"), Outcome::Loss);
        assert_eq!(store.to_string(), ":9-13,1;10-14,-1\n9-13:22-17,1\n");
    }

    #[test]
    fn in_memory_save_is_noop() {
        let mut store = LearningStore::in_memory();
        assert!(store.record_game(&codes("9-13"), Outcome::Win).is_ok());
        assert_eq!(store.path(), None);
    }
}
