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
use super::SampleId;

/// Error types for sample playback operations
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("No sample registered with id {0}")]
    UnknownSample(SampleId),

    #[error("Sample {0} has no players in its pool")]
    EmptyPool(SampleId),

    #[error("Player {player} failed to prepare after stop: {source}")]
    Prepare {
        player: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
