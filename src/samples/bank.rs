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

//! The sample bank: routes playback requests by sample id and owns every
//! pool.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use parking_lot::{Mutex, RwLock};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::error::SampleError;
use super::pool::{self, SamplePool};
use super::SampleId;
use crate::config::Config;
use crate::player::Player;

/// The sample bank maps sample ids to pools of interchangeable players and
/// exposes the playback surface of the crate. Playback requests are gated
/// by the bank's sound-enabled flag; bulk operations fan out to every pool.
pub struct SampleBank {
    /// The pools by sample id.
    pools: RwLock<HashMap<SampleId, SamplePool>>,
    /// Gates all play requests. Toggling does not affect playback already
    /// in flight.
    sound_enabled: AtomicBool,
    /// Master RNG used to seed each pool's own selection RNG.
    rng: Mutex<StdRng>,
}

impl SampleBank {
    /// Creates a new sample bank with sound enabled and entropy-seeded
    /// player selection.
    pub fn new() -> SampleBank {
        SampleBank::with_rng(StdRng::from_entropy(), true)
    }

    /// Creates a new sample bank whose player selection is deterministic
    /// for a given seed.
    pub fn with_seed(seed: u64) -> SampleBank {
        SampleBank::with_rng(StdRng::seed_from_u64(seed), true)
    }

    /// Creates a new sample bank from the given configuration.
    pub fn with_config(config: &Config) -> SampleBank {
        let rng = match config.seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        SampleBank::with_rng(rng, config.sound_enabled())
    }

    fn with_rng(rng: StdRng, sound_enabled: bool) -> SampleBank {
        SampleBank {
            pools: RwLock::new(HashMap::new()),
            sound_enabled: AtomicBool::new(sound_enabled),
            rng: Mutex::new(rng),
        }
    }

    /// Returns true if sound is enabled.
    pub fn is_sound_enabled(&self) -> bool {
        self.sound_enabled.load(Ordering::Relaxed)
    }

    /// Sets whether sound is enabled. Disabling sound gates future play
    /// requests only; it does not stop anything currently playing.
    pub fn set_sound_enabled(&self, sound_enabled: bool) {
        self.sound_enabled.store(sound_enabled, Ordering::Relaxed);
        debug!(sound_enabled, "Sound toggled.");
    }

    /// Adds a player under the given sample id, creating the pool on first
    /// registration. The bank owns the player from here on.
    pub fn add(&self, id: SampleId, player: Arc<dyn Player>) {
        let mut pools = self.pools.write();
        let pool = pools.entry(id).or_insert_with(|| {
            let seed = self.rng.lock().gen();
            SamplePool::new(id, StdRng::seed_from_u64(seed))
        });
        pool.add(player);
        debug!(sample = id, players = pool.len(), "Player added.");
    }

    /// Plays one of the players registered under the given sample id,
    /// without looping and restarting the selected player if it is already
    /// playing. Returns `None` if sound is disabled.
    pub fn play(&self, id: SampleId) -> Result<Option<Arc<dyn Player>>, SampleError> {
        self.play_with(id, false, true)
    }

    /// Plays one of the players registered under the given sample id.
    ///
    /// If sound is disabled this returns `None` without side effects.
    /// `looping` makes the selected player repeat at the end; `reset`
    /// controls whether an already-playing selection is restarted from the
    /// top or returned as-is.
    pub fn play_with(
        &self,
        id: SampleId,
        looping: bool,
        reset: bool,
    ) -> Result<Option<Arc<dyn Player>>, SampleError> {
        if !self.is_sound_enabled() {
            return Ok(None);
        }

        let mut pools = self.pools.write();
        let pool = pools.get_mut(&id).ok_or(SampleError::UnknownSample(id))?;
        pool.play(looping, reset).map(Some)
    }

    /// Pauses the given player if it is currently playing.
    pub fn pause(&self, player: &dyn Player) {
        debug!(player = %player, "Pausing player.");
        pool::pause(player);
    }

    /// Resumes the given player if it is paused. A stopped player is not
    /// restarted.
    pub fn resume(&self, player: &dyn Player) {
        debug!(player = %player, "Resuming player.");
        pool::resume(player);
    }

    /// Stops the given player and re-prepares it for future playback.
    pub fn stop(&self, player: &dyn Player) -> Result<(), SampleError> {
        debug!(player = %player, "Stopping player.");
        pool::stop(player)
    }

    /// Pauses every player in every pool.
    pub fn pause_all(&self) {
        debug!("Pausing all players.");
        for pool in self.pools.read().values() {
            pool.pause_all();
        }
    }

    /// Resumes every paused player in every pool.
    pub fn resume_all(&self) {
        debug!("Resuming all players.");
        for pool in self.pools.read().values() {
            pool.resume_all();
        }
    }

    /// Stops every player in every pool. Failures do not abort the fan-out;
    /// the collected failures are returned once every player has received
    /// its stop attempt.
    pub fn stop_all(&self) -> Vec<SampleError> {
        debug!("Stopping all players.");
        let pools = self.pools.read();
        let mut failures = Vec::new();
        for pool in pools.values() {
            failures.extend(pool.stop_all());
        }
        if !failures.is_empty() {
            warn!(failures = failures.len(), "Some players failed to stop.");
        }
        failures
    }

    /// Tears the bank down: stops every player, releases every player, and
    /// empties the registry. Any stop failures are returned; release itself
    /// cannot fail. Subsequent play requests fail until samples are
    /// registered again.
    pub fn clear_all(&self) -> Vec<SampleError> {
        info!("Clearing all sample pools.");
        let mut pools = self.pools.write();

        let mut failures = Vec::new();
        for pool in pools.values() {
            failures.extend(pool.stop_all());
        }
        for pool in pools.values_mut() {
            pool.release_all();
        }
        pools.clear();

        failures
    }

    /// Returns the number of registered sample pools.
    pub fn pool_count(&self) -> usize {
        self.pools.read().len()
    }

    /// Returns the number of players registered under the given sample id,
    /// or `None` if the id is unknown.
    pub fn player_count(&self, id: SampleId) -> Option<usize> {
        self.pools.read().get(&id).map(SamplePool::len)
    }

    /// Returns true if the given sample id has been registered.
    pub fn contains(&self, id: SampleId) -> bool {
        self.pools.read().contains_key(&id)
    }
}

impl Default for SampleBank {
    fn default() -> SampleBank {
        SampleBank::new()
    }
}

impl std::fmt::Debug for SampleBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pools = self.pools.read();
        let players: usize = pools.values().map(SamplePool::len).sum();
        f.debug_struct("SampleBank")
            .field("pools", &pools.len())
            .field("players", &players)
            .field("sound_enabled", &self.is_sound_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::player::mock;

    use super::*;

    fn make_bank(entries: &[(SampleId, &Arc<mock::Player>)]) -> SampleBank {
        let bank = SampleBank::with_seed(42);
        for (id, player) in entries {
            bank.add(*id, (**player).clone());
        }
        bank
    }

    #[test]
    fn test_play_unknown_sample() {
        let player = mock::Player::get("kick");
        let bank = make_bank(&[(1, &player)]);

        match bank.play(2) {
            Err(SampleError::UnknownSample(id)) => assert_eq!(id, 2),
            other => panic!(
                "expected unknown sample error, got {:?}",
                other.map(|p| p.map(|p| p.to_string()))
            ),
        }
    }

    #[test]
    fn test_play_routes_to_registered_pool() {
        let kick = mock::Player::get("kick");
        let snare = mock::Player::get("snare");
        let bank = make_bank(&[(1, &kick), (2, &snare)]);

        let handle = bank.play(2).expect("play failed").expect("sound disabled");
        assert_eq!(handle.to_string(), "snare (Mock)");
        assert!(snare.is_playing());
        assert!(!kick.is_playing());
    }

    #[test]
    fn test_play_disabled_sound_is_side_effect_free() {
        let player = mock::Player::get("kick");
        let bank = make_bank(&[(1, &player)]);

        bank.set_sound_enabled(false);
        assert!(!bank.is_sound_enabled());
        assert!(bank.play(1).expect("play failed").is_none());
        // Even unknown ids don't error while sound is off.
        assert!(bank.play(99).expect("play failed").is_none());
        assert_eq!(player.start_count(), 0);

        bank.set_sound_enabled(true);
        assert!(bank.play(1).expect("play failed").is_some());
        assert!(player.is_playing());
    }

    #[test]
    fn test_disabling_sound_leaves_playback_running() {
        let player = mock::Player::get("kick");
        let bank = make_bank(&[(1, &player)]);

        bank.play(1).expect("play failed");
        bank.set_sound_enabled(false);
        assert!(player.is_playing());
    }

    #[test]
    fn test_add_creates_pools_lazily() {
        let bank = SampleBank::with_seed(42);
        assert_eq!(bank.pool_count(), 0);
        assert!(!bank.contains(1));
        assert_eq!(bank.player_count(1), None);

        bank.add(1, mock::Player::get("a"));
        bank.add(1, mock::Player::get("b"));
        bank.add(2, mock::Player::get("c"));

        assert_eq!(bank.pool_count(), 2);
        assert!(bank.contains(1));
        assert_eq!(bank.player_count(1), Some(2));
        assert_eq!(bank.player_count(2), Some(1));
    }

    #[test]
    fn test_play_empty_pool_distinct_from_unknown() {
        let player = mock::Player::get("kick");
        let bank = make_bank(&[(1, &player)]);
        bank.clear_all();

        // After a full teardown the id itself is gone.
        assert!(matches!(bank.play(1), Err(SampleError::UnknownSample(1))));
    }

    #[test]
    fn test_seeded_selection_is_deterministic() {
        let mut sequences = Vec::new();
        for _ in 0..2 {
            let bank = SampleBank::with_seed(7);
            let players = [
                mock::Player::get("a"),
                mock::Player::get("b"),
                mock::Player::get("c"),
            ];
            for player in &players {
                bank.add(1, (*player).clone());
            }

            let mut names = Vec::new();
            for _ in 0..20 {
                let handle = bank.play(1).expect("play failed").expect("sound disabled");
                names.push(handle.to_string());
            }
            sequences.push(names);
        }
        assert_eq!(sequences[0], sequences[1]);
    }

    #[test]
    fn test_pause_all_and_resume_all() {
        let kick = mock::Player::get("kick");
        let snare = mock::Player::get("snare");
        let idle = mock::Player::get("idle");
        let bank = make_bank(&[(1, &kick), (2, &snare), (3, &idle)]);

        bank.play(1).expect("play failed");
        bank.play(2).expect("play failed");
        kick.advance(Duration::from_millis(50));
        snare.advance(Duration::from_millis(80));

        bank.pause_all();
        assert!(!kick.is_playing());
        assert!(!snare.is_playing());
        assert_eq!(kick.position(), Duration::from_millis(50));

        bank.resume_all();
        assert!(kick.is_playing());
        assert!(snare.is_playing());
        // The player that never started stays stopped.
        assert!(!idle.is_playing());
    }

    #[test]
    fn test_single_player_transitions_via_bank() {
        let player = mock::Player::get("kick");
        let bank = make_bank(&[(1, &player)]);

        let handle = bank.play(1).expect("play failed").expect("sound disabled");
        handle.seek_to(Duration::from_millis(30));

        bank.pause(handle.as_ref());
        assert!(!handle.is_playing());

        bank.resume(handle.as_ref());
        assert!(handle.is_playing());

        bank.stop(handle.as_ref()).expect("stop failed");
        assert!(!handle.is_playing());
        assert_eq!(handle.position(), Duration::ZERO);

        // Stop then resume is a no-op: stopped players don't restart.
        bank.resume(handle.as_ref());
        assert!(!handle.is_playing());
    }

    #[test]
    fn test_stop_all_reports_failures_and_keeps_going() {
        let good = mock::Player::get("good");
        let bad = mock::Player::get("bad");
        let bank = make_bank(&[(1, &good), (2, &bad)]);

        bank.play(1).expect("play failed");
        bank.play(2).expect("play failed");
        bad.set_fail_prepare(true);

        let failures = bank.stop_all();
        assert_eq!(failures.len(), 1);
        assert!(!good.is_playing());
        assert!(!bad.is_playing());
    }

    #[test]
    fn test_clear_all_releases_every_player_once() {
        let players: Vec<_> = (0..6)
            .map(|i| mock::Player::get(&format!("player{}", i)))
            .collect();
        let bank = SampleBank::with_seed(42);
        for (i, player) in players.iter().enumerate() {
            bank.add((i / 2) as SampleId, (*player).clone());
        }
        assert_eq!(bank.pool_count(), 3);

        bank.play(0).expect("play failed");
        assert!(bank.clear_all().is_empty());

        assert_eq!(bank.pool_count(), 0);
        for player in &players {
            assert!(player.is_released());
            assert_eq!(player.release_count(), 1);
        }

        // Tearing down twice is harmless.
        assert!(bank.clear_all().is_empty());
        for player in &players {
            assert_eq!(player.release_count(), 1);
        }

        assert!(matches!(bank.play(0), Err(SampleError::UnknownSample(0))));
    }

    #[test]
    fn test_with_config() {
        let config = Config::from_yaml("sound_enabled: false\nseed: 9\n").expect("parse failed");
        let bank = SampleBank::with_config(&config);
        assert!(!bank.is_sound_enabled());

        bank.add(1, mock::Player::get("kick"));
        assert!(bank.play(1).expect("play failed").is_none());
    }
}
