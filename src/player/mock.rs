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
use std::{
    error::Error,
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use parking_lot::Mutex;

/// A mock player. Doesn't actually play anything, but tracks every
/// transition so tests and host applications can observe what a pool did
/// with it. Any use after release panics, since a released player must
/// never be touched again.
pub struct Player {
    name: String,
    playing: AtomicBool,
    looping: AtomicBool,
    prepared: AtomicBool,
    released: AtomicBool,
    position: Mutex<Duration>,
    fail_prepare: AtomicBool,
    start_count: AtomicUsize,
    seek_count: AtomicUsize,
    release_count: AtomicUsize,
}

impl Player {
    /// Gets the given mock player. Mock players start out stopped, prepared
    /// and at position zero.
    pub fn get(name: &str) -> Arc<Player> {
        Arc::new(Player {
            name: name.to_string(),
            playing: AtomicBool::new(false),
            looping: AtomicBool::new(false),
            prepared: AtomicBool::new(true),
            released: AtomicBool::new(false),
            position: Mutex::new(Duration::ZERO),
            fail_prepare: AtomicBool::new(false),
            start_count: AtomicUsize::new(0),
            seek_count: AtomicUsize::new(0),
            release_count: AtomicUsize::new(0),
        })
    }

    /// Makes every subsequent prepare attempt fail.
    pub fn set_fail_prepare(&self, fail: bool) {
        self.fail_prepare.store(fail, Ordering::Relaxed);
    }

    /// Simulates playback progress by moving the position forward.
    pub fn advance(&self, elapsed: Duration) {
        self.ensure_usable();
        let mut position = self.position.lock();
        *position += elapsed;
    }

    /// Returns true if the player is looping.
    pub fn is_looping(&self) -> bool {
        self.looping.load(Ordering::Relaxed)
    }

    /// Returns true if the player is prepared to start.
    pub fn is_prepared(&self) -> bool {
        self.prepared.load(Ordering::Relaxed)
    }

    /// Returns true if the player has been released.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Relaxed)
    }

    /// Returns how many times the player was started.
    pub fn start_count(&self) -> usize {
        self.start_count.load(Ordering::Relaxed)
    }

    /// Returns how many times the player was seeked.
    pub fn seek_count(&self) -> usize {
        self.seek_count.load(Ordering::Relaxed)
    }

    /// Returns how many times the player was released.
    pub fn release_count(&self) -> usize {
        self.release_count.load(Ordering::Relaxed)
    }

    fn ensure_usable(&self) {
        assert!(
            !self.released.load(Ordering::Relaxed),
            "mock player {} used after release",
            self.name
        );
    }
}

impl crate::player::Player for Player {
    fn is_playing(&self) -> bool {
        self.ensure_usable();
        self.playing.load(Ordering::Relaxed)
    }

    fn start(&self) {
        self.ensure_usable();
        self.playing.store(true, Ordering::Relaxed);
        self.start_count.fetch_add(1, Ordering::Relaxed);
    }

    fn pause(&self) {
        self.ensure_usable();
        self.playing.store(false, Ordering::Relaxed);
    }

    fn stop(&self) {
        self.ensure_usable();
        self.playing.store(false, Ordering::Relaxed);
        self.prepared.store(false, Ordering::Relaxed);
        *self.position.lock() = Duration::ZERO;
    }

    fn prepare(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.ensure_usable();
        if self.fail_prepare.load(Ordering::Relaxed) {
            return Err(format!("mock player {} failed to prepare", self.name).into());
        }
        self.prepared.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn seek_to(&self, position: Duration) {
        self.ensure_usable();
        *self.position.lock() = position;
        self.seek_count.fetch_add(1, Ordering::Relaxed);
    }

    fn set_looping(&self, looping: bool) {
        self.ensure_usable();
        self.looping.store(looping, Ordering::Relaxed);
    }

    fn position(&self) -> Duration {
        self.ensure_usable();
        *self.position.lock()
    }

    fn release(&self) {
        self.ensure_usable();
        self.released.store(true, Ordering::Relaxed);
        self.release_count.fetch_add(1, Ordering::Relaxed);
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}
