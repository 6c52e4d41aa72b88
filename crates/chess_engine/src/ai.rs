use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use chess_core::{GameState, Move};
use log::{debug, info};
use rand::rngs::StdRng;

use crate::error::{EngineError, EngineResult};
use crate::search::{
    find_random_move, search, search_with_cancel, SearchConfig, MAX_DEPTH, MIN_DEPTH,
};

/// Picks moves for one side: search first, a random legal move if the
/// search comes back empty-handed.
#[derive(Clone)]
pub struct ChessAI {
    config: SearchConfig,
    rng: StdRng,
}

impl ChessAI {
    pub fn new(depth: u8) -> Self {
        Self::with_config(SearchConfig::new(depth))
    }

    pub fn with_config(config: SearchConfig) -> Self {
        let config = SearchConfig {
            depth: config.depth.clamp(MIN_DEPTH, MAX_DEPTH),
            ..config
        };
        ChessAI {
            rng: config.rng(),
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn set_depth(&mut self, depth: u8) {
        self.config.depth = depth.clamp(MIN_DEPTH, MAX_DEPTH);
    }

    pub fn get_move(&mut self, state: &mut GameState) -> Option<Move> {
        let valid_moves = state.get_valid_moves();
        if valid_moves.is_empty() {
            return None;
        }

        let outcome = search(state, &valid_moves, &self.config);
        match outcome.best_move {
            Some(mv) => {
                info!("AI plays {} (score {}, {} nodes)", mv, outcome.score, outcome.nodes);
                Some(mv)
            }
            None => {
                debug!("search found nothing, falling back to a random move");
                find_random_move(&valid_moves, &mut self.rng)
            }
        }
    }

    /// Starts a background search on a copy of `state`.
    pub fn spawn_search(&self, state: &GameState) -> SearchTask {
        SearchTask::spawn(state.clone(), self.config)
    }
}

impl Default for ChessAI {
    fn default() -> Self {
        Self::with_config(SearchConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Thinking,
    Finished(Option<Move>),
    Cancelled,
}

/// A search running on the rayon pool.
///
/// The worker owns its own copy of the game state and sends exactly one
/// result back. Once [`SearchTask::cancel`] is called, that result is
/// dropped unread. Before playing a finished result, check
/// [`SearchTask::is_stale_for`] against the live game.
pub struct SearchTask {
    receiver: Receiver<Option<Move>>,
    cancel: Arc<AtomicBool>,
    ply: usize,
    fingerprint: String,
    white_to_move: bool,
}

impl SearchTask {
    pub fn spawn(mut state: GameState, config: SearchConfig) -> Self {
        let (sender, receiver) = mpsc::sync_channel(1);
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);

        let task = SearchTask {
            receiver,
            cancel,
            ply: state.move_log().len(),
            fingerprint: state.board().fingerprint(),
            white_to_move: state.white_to_move(),
        };

        rayon::spawn(move || {
            let valid_moves = state.get_valid_moves();
            let outcome =
                search_with_cancel(&mut state, &valid_moves, &config, Some(&worker_cancel));
            if outcome.cancelled {
                debug!("background search cancelled after {} nodes", outcome.nodes);
                return;
            }
            let chosen = outcome
                .best_move
                .or_else(|| find_random_move(&valid_moves, &mut config.rng()));
            // The receiver is gone if the driver dropped the task.
            let _ = sender.send(chosen);
        });

        task
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Non-blocking check for the result.
    pub fn poll(&self) -> EngineResult<TaskStatus> {
        if self.is_cancelled() {
            return Ok(TaskStatus::Cancelled);
        }
        match self.receiver.try_recv() {
            Ok(mv) => Ok(TaskStatus::Finished(mv)),
            Err(TryRecvError::Empty) => Ok(TaskStatus::Thinking),
            Err(TryRecvError::Disconnected) => Err(EngineError::WorkerLost),
        }
    }

    /// Blocks until the worker answers.
    pub fn wait(self) -> EngineResult<Option<Move>> {
        if self.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let result = self.receiver.recv().map_err(|_| EngineError::WorkerLost)?;
        if self.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        Ok(result)
    }

    /// True once `state` has moved on from the position this task was
    /// started for.
    pub fn is_stale_for(&self, state: &GameState) -> bool {
        state.move_log().len() != self.ply
            || state.white_to_move() != self.white_to_move
            || state.board().fingerprint() != self.fingerprint
    }
}

impl Drop for SearchTask {
    fn drop(&mut self) {
        // Nobody is left to read the result; let the worker stop early.
        self.cancel();
    }
}
