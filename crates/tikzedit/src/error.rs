//! Error types for tikzedit operations.
//!
//! Parsing, resolution and regeneration never fail; anomalies they absorb are
//! reported as diagnostics on the [`crate::Model`]. [`TikzEditError`] only
//! covers the outer surfaces: I/O, configuration, and checked edit commands.

use std::io;

use thiserror::Error;

/// The main error type for tikzedit operations.
#[derive(Debug, Error)]
pub enum TikzEditError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown node `{0}`")]
    UnknownNode(String),

    #[error("Unknown group `{0}`")]
    UnknownGroup(String),
}
