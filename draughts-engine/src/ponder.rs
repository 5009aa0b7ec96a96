//! Pondering
//!
//! While the opponent thinks, the engine searches the current position in the
//! background with no time limit. The ponder search fills the shared
//! transposition table, so the search for the real move reaches deeper in the
//! same time. Pondering is stopped whenever a real move is required, a move is
//! undone, or a new game starts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::board::Board;
use crate::coretypes::Color;
use crate::error;
use crate::search::{self, SearchRequest, SearchResult, SearchShared};
use crate::timeman::Mode;

/// Longest time stop waits for the ponder thread before detaching it.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_millis(100);

/// Ponderer owns the background search thread and its stop flag.
/// The ponder search gets its own copy of the board, never the caller's.
pub struct Ponderer {
    stopper: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    receiver: Option<Receiver<SearchResult>>,
    join_timeout: Duration,
}

impl Ponderer {
    pub fn new(join_timeout: Duration) -> Self {
        Self {
            stopper: Arc::new(AtomicBool::new(false)),
            handle: None,
            receiver: None,
            join_timeout,
        }
    }

    /// Returns true if a ponder search is running.
    pub fn is_pondering(&self) -> bool {
        self.handle.is_some()
    }

    /// Start searching board with player to move in the background.
    /// A ponder search that is already running is stopped first.
    pub fn start(
        &mut self,
        board: Board,
        player: Color,
        shared: SearchShared,
    ) -> error::Result<()> {
        self.stop();

        // Every ponder search gets a fresh flag, so a detached search stays stopped.
        self.stopper = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = mpsc::channel();
        let request = SearchRequest::new(board, player, Mode::infinite());

        let stopper = Arc::clone(&self.stopper);
        let handle = search::search_nonblocking(request, shared, stopper, sender)?;
        self.handle = Some(handle);
        self.receiver = Some(receiver);
        log::info!("pondering for {player}");
        Ok(())
    }

    /// Stop the ponder search, waiting at most the join timeout for it to finish.
    /// A search that does not finish in time is detached and ends on its own.
    /// Returns the result of the ponder search if it finished in time.
    pub fn stop(&mut self) -> Option<SearchResult> {
        let handle = self.handle.take()?;
        let receiver = self.receiver.take()?;
        self.stopper.store(true, Ordering::Relaxed);

        match receiver.recv_timeout(self.join_timeout) {
            Ok(result) => {
                if handle.join().is_err() {
                    log::error!("ponder thread panicked");
                }
                log::info!("pondering stopped at depth {}", result.depth);
                Some(result)
            }
            Err(RecvTimeoutError::Timeout) => {
                log::warn!("ponder thread did not stop within {:?}, detaching", self.join_timeout);
                None
            }
            Err(RecvTimeoutError::Disconnected) => {
                if handle.join().is_err() {
                    log::error!("ponder thread panicked");
                }
                None
            }
        }
    }
}

impl Default for Ponderer {
    fn default() -> Self {
        Self::new(DEFAULT_JOIN_TIMEOUT)
    }
}

impl Drop for Ponderer {
    fn drop(&mut self) {
        self.stop();
    }
}
