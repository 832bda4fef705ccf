/*
 * Error Module
 *
 * Error types for configuration loading, spatial index construction and the
 * simulation lifecycle. Numeric edge cases inside a tick (zero distances, zero
 * neighbor counts) are guarded in place and never surface here.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Problems with a configuration value or the file it came from.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A dimension, radius, count or interval that must be strictly positive.
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("{field} must be at most {max}, got {value}")]
    TooLarge { field: &'static str, value: u64, max: u64 },
}

/// Errors emitted by the quadtree.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("quadtree bounds must have positive, finite width and height (got {width}x{height})")]
    InvalidBounds { width: f32, height: f32 },
}

/// Errors raised while creating or driving a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error("boid in slot {slot}: {reason}")]
    InvalidBoid { slot: usize, reason: &'static str },
    #[error("failed to spawn tick driver thread: {0}")]
    Spawn(#[source] std::io::Error),
}
