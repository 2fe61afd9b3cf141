//! Think-ahead search during the opponent's turn.
//!
//! A [`Ponderer`] moves a driver onto a background thread and searches the
//! current position without a budget until the real move arrives. The
//! resulting tree is then rebased onto that move so the next search starts
//! warm.

use std::thread::{self, JoinHandle};

use engine_core::GameState;
use tracing::debug;

use crate::search::{MctsSearch, SearchError, SearchResult, StopHandle};

type PonderOutcome<S> = (
    MctsSearch<S>,
    Result<SearchResult<<S as GameState>::Move>, SearchError>,
);

/// Background search that runs until [`Ponderer::finish`].
pub struct Ponderer<S: GameState> {
    handle: JoinHandle<PonderOutcome<S>>,
    stop: StopHandle,
}

impl<S: GameState> Ponderer<S> {
    /// Start pondering `state` with `search`.
    ///
    /// The driver runs single-threaded and unbounded; its own budgets are
    /// restored when it is handed back.
    pub fn start(mut search: MctsSearch<S>, state: S) -> Self {
        let stop = search.stop_handle();
        stop.reset();

        let handle = thread::spawn(move || {
            let budget = search.config().clone();
            let config = search.config_mut();
            config.iterations = 0;
            config.time_budget = None;
            config.root_threads = 1;

            let result = search.search(&state);
            *search.config_mut() = budget;
            (search, result)
        });

        Self { handle, stop }
    }

    /// Handle for signaling memory pressure to the background search.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Stop pondering and rebase the tree onto the move actually played.
    ///
    /// Returns the driver, ready for the next search. A position with no
    /// moves to ponder is not an error.
    pub fn finish(self, played: &S::Move) -> Result<MctsSearch<S>, SearchError> {
        self.stop.request_completion();
        let (mut search, result) = self.handle.join().map_err(|_| SearchError::WorkerPanicked)?;
        self.stop.reset();

        match result {
            Ok(result) => debug!(
                iterations = result.iterations,
                elapsed_ms = result.elapsed.as_millis() as u64,
                expected = ?result.best_move,
                played = ?played,
                "Pondering finished"
            ),
            Err(SearchError::NoLegalMoves) => {}
            Err(e) => return Err(e),
        }

        search.advance(played);
        Ok(search)
    }
}
