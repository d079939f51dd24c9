// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Pools of interchangeable players and the per-player state machine.

use std::{sync::Arc, time::Duration};

use rand::{rngs::StdRng, Rng};
use tracing::{debug, warn};

use super::error::SampleError;
use super::SampleId;
use crate::player::Player;

/// Pauses the player if it is currently playing. Pausing a player that
/// isn't playing is a no-op.
pub(crate) fn pause(player: &dyn Player) {
    if player.is_playing() {
        player.pause();
    }
}

/// Resumes a paused player. A player that was stopped had its position
/// reset to zero and is intentionally not resumable: resume only
/// un-pauses, it never restarts.
pub(crate) fn resume(player: &dyn Player) {
    if !player.is_playing() && player.position() != Duration::ZERO {
        player.start();
    }
}

/// Stops the player, then re-prepares it so it is immediately ready for a
/// future play. Stopping a player that isn't playing is a no-op. A player
/// whose re-preparation fails is unusable for playback until the caller
/// intervenes, so the failure is surfaced rather than swallowed.
pub(crate) fn stop(player: &dyn Player) -> Result<(), SampleError> {
    if player.is_playing() {
        player.stop();
        player.prepare().map_err(|source| SampleError::Prepare {
            player: player.to_string(),
            source,
        })?;
    }
    Ok(())
}

/// A pool of interchangeable players all backing the same logical sample.
/// Keeping more than one player per sample allows overlapping playback of
/// that sample; which player serves a given request is a uniform random
/// draw on every call.
pub struct SamplePool {
    /// The sample id this pool backs.
    id: SampleId,
    /// The players owned by this pool.
    players: Vec<Arc<dyn Player>>,
    /// Source of randomness for player selection.
    rng: StdRng,
}

impl SamplePool {
    /// Creates a new, empty pool for the given sample id.
    pub fn new(id: SampleId, rng: StdRng) -> SamplePool {
        SamplePool {
            id,
            players: Vec::new(),
            rng,
        }
    }

    /// Adds a player to the pool. The pool owns the player from here on
    /// and is responsible for releasing it.
    pub fn add(&mut self, player: Arc<dyn Player>) {
        self.players.push(player);
    }

    /// Returns the number of players in the pool.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns true if the pool holds no players.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Plays one of the players in the pool, selected uniformly at random.
    ///
    /// If the selected player is already playing and `reset` is set, it is
    /// seeked back to the start before being started again. If it is
    /// already playing and `reset` is not set, it is returned untouched so
    /// the caller gets a handle to the live playback.
    pub fn play(&mut self, looping: bool, reset: bool) -> Result<Arc<dyn Player>, SampleError> {
        if self.players.is_empty() {
            return Err(SampleError::EmptyPool(self.id));
        }

        let index = self.rng.gen_range(0..self.players.len());
        let player = self.players[index].clone();

        if player.is_playing() {
            if reset {
                player.seek_to(Duration::ZERO);
            } else {
                debug!(
                    sample = self.id,
                    player = %player,
                    "Player already active, leaving untouched."
                );
                return Ok(player);
            }
        }

        player.set_looping(looping);
        player.start();
        debug!(sample = self.id, player = %player, looping, "Playing sample.");

        Ok(player)
    }

    /// Pauses every player in the pool.
    pub fn pause_all(&self) {
        for player in &self.players {
            pause(player.as_ref());
        }
    }

    /// Resumes every paused player in the pool. Stopped players stay
    /// stopped.
    pub fn resume_all(&self) {
        for player in &self.players {
            resume(player.as_ref());
        }
    }

    /// Stops every player in the pool. Every player present receives
    /// exactly one stop attempt; a failing player does not prevent the
    /// rest from being stopped. Returns the collected failures.
    pub fn stop_all(&self) -> Vec<SampleError> {
        let mut failures = Vec::new();
        for player in &self.players {
            if let Err(e) = stop(player.as_ref()) {
                warn!(sample = self.id, err = %e, "Error stopping player.");
                failures.push(e);
            }
        }
        failures
    }

    /// Releases every player in the pool and empties it. The pool cannot
    /// play again until players are re-added. Calling this on an already
    /// emptied pool is a no-op, so no player can be released twice.
    pub fn release_all(&mut self) {
        for player in self.players.drain(..) {
            player.release();
        }
    }
}

impl std::fmt::Debug for SamplePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SamplePool")
            .field("id", &self.id)
            .field("players", &self.players.len())
            .finish()
    }
}
