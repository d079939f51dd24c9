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
use std::error::Error;

use serde::{Deserialize, Serialize};

/// A YAML representation of the sample bank configuration.
#[derive(Deserialize, Clone, Serialize, Debug)]
pub struct Config {
    /// Whether sound is enabled when the bank is created.
    #[serde(default = "default_sound_enabled")]
    sound_enabled: bool,

    /// Seed for player selection. Fixing the seed makes selection
    /// deterministic, which is mostly useful for tests and replays.
    /// If not set, the bank seeds itself from entropy.
    seed: Option<u64>,
}

fn default_sound_enabled() -> bool {
    true
}

impl Config {
    /// Parses a configuration from its YAML representation.
    pub fn from_yaml(contents: &str) -> Result<Config, Box<dyn Error>> {
        Ok(serde_yml::from_str(contents)?)
    }

    /// Returns whether sound should start out enabled.
    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    /// Returns the selection seed, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            sound_enabled: default_sound_enabled(),
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_yaml("sound_enabled: false\nseed: 1234\n").expect("parse failed");
        assert!(!config.sound_enabled());
        assert_eq!(config.seed(), Some(1234));
    }

    #[test]
    fn test_parse_applies_defaults() {
        let config = Config::from_yaml("{}").expect("parse failed");
        assert!(config.sound_enabled());
        assert_eq!(config.seed(), None);
    }

    #[test]
    fn test_default_matches_empty_parse() {
        let config = Config::default();
        assert!(config.sound_enabled());
        assert_eq!(config.seed(), None);
    }
}
