//! Engine-vs-engine games.
//!
//! Every player gets its own [`MctsSearch`]. After each move all engines
//! rebase their trees onto it, so a search starts from whatever the engine
//! already learned about the new position. With pondering on, the engines
//! that are not to move keep searching until the mover commits.

use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use engine_core::{is_chance, GameState};
use mcts::{weighted_index, Heuristic, MctsConfig, MctsSearch, Ponderer};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, trace};

use crate::stats::GameRecord;

enum Seat<S: GameState> {
    Idle(MctsSearch<S>),
    Pondering(Ponderer<S>),
}

/// A table of engines, one per player.
pub struct Arena<S: GameState> {
    seats: Vec<Seat<S>>,
    ponder: bool,
    rng: ChaCha20Rng,
}

impl<S: GameState> Arena<S> {
    /// Seat `players` engines sharing `config`.
    ///
    /// With a seed, engine `i` is seeded with `seed + i + 1` and chance
    /// moves draw from `seed`; without one everything seeds from entropy.
    pub fn new(
        config: &MctsConfig,
        players: usize,
        seed: Option<u64>,
        heuristic: Option<Arc<dyn Heuristic<S>>>,
        ponder: bool,
    ) -> Self {
        let seats = (0..players)
            .map(|i| {
                let mut search = MctsSearch::new(config.clone());
                if let Some(seed) = seed {
                    search = search.with_seed(seed.wrapping_add(i as u64 + 1));
                }
                if let Some(heuristic) = &heuristic {
                    search = search.with_heuristic(Arc::clone(heuristic));
                }
                Seat::Idle(search)
            })
            .collect();

        let rng = match seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };

        Self { seats, ponder, rng }
    }

    /// Play one game to completion from `initial`.
    pub fn play_game(&mut self, initial: S) -> Result<GameRecord> {
        if initial.player_count() != self.seats.len() {
            bail!(
                "game has {} players but the arena seats {}",
                initial.player_count(),
                self.seats.len()
            );
        }
        for seat in &mut self.seats {
            if let Seat::Idle(search) = seat {
                search.clear_tree();
            }
        }

        let mut state = initial;
        let mut plies = 0u32;
        while !state.is_terminal() {
            let actor = state.acting_player();
            let mv = if is_chance(actor) {
                self.chance_move(&state)?
            } else {
                self.engine_move(&state, actor as usize)?
            };
            trace!(player = actor, mv = ?mv, "Move played");

            state.apply_move(&mv)?;
            self.advance_all(&mv)?;
            plies += 1;
        }

        let record = GameRecord {
            plies,
            score: state.terminal_score(),
        };
        debug!(plies, score = ?record.score, "Game finished");
        Ok(record)
    }

    fn chance_move(&mut self, state: &S) -> Result<S::Move> {
        let moves = state.legal_moves();
        let weights = state.chance_weights();
        weighted_index(&weights, &mut self.rng)
            .and_then(|i| moves.get(i).cloned())
            .ok_or_else(|| anyhow!("chance node offered no outcome with positive weight"))
    }

    fn engine_move(&mut self, state: &S, actor: usize) -> Result<S::Move> {
        if actor >= self.seats.len() {
            bail!("player {actor} has no engine");
        }
        if self.ponder {
            self.start_pondering(state, actor);
        }

        let Some(Seat::Idle(search)) = self.seats.get_mut(actor) else {
            bail!("engine for player {actor} is busy");
        };
        let result = search.search(state)?;
        debug!(
            player = actor,
            best = ?result.best_move,
            iterations = result.iterations,
            elapsed_ms = result.elapsed.as_millis() as u64,
            stop_reason = ?result.stop_reason,
            tree_size = result.tree_size,
            proven = ?result.proven,
            "Engine moved"
        );
        Ok(result.best_move)
    }

    fn start_pondering(&mut self, state: &S, actor: usize) {
        let seats = std::mem::take(&mut self.seats);
        self.seats = seats
            .into_iter()
            .enumerate()
            .map(|(i, seat)| match seat {
                Seat::Idle(search) if i != actor => {
                    Seat::Pondering(Ponderer::start(search, state.clone()))
                }
                other => other,
            })
            .collect();
    }

    fn advance_all(&mut self, mv: &S::Move) -> Result<()> {
        let seats = std::mem::take(&mut self.seats);
        self.seats = seats
            .into_iter()
            .map(|seat| match seat {
                Seat::Idle(mut search) => {
                    search.advance(mv);
                    Ok(Seat::Idle(search))
                }
                Seat::Pondering(ponderer) => Ok(Seat::Idle(ponderer.finish(mv)?)),
            })
            .collect::<Result<_>>()?;
        Ok(())
    }
}
