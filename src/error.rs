//! Error types for configuration, level mutation and generation.
//!
//! Expected outcomes are not errors: an unreachable goal is `None` from the
//! pathfinder and a degenerate triangulation is simply empty.

use std::path::PathBuf;

use glam::IVec3;
use thiserror::Error;

use crate::segment::SegmentId;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    #[error("segment would claim position {position} outside the level")]
    OutOfBounds { position: IVec3 },

    #[error("no segment with id {0}")]
    UnknownSegment(SegmentId),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Level(#[from] LevelError),
}
