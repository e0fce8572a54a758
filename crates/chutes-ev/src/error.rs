//! Error types for board validation and the linear solve.

use thiserror::Error;

/// Which kind of shortcut a board error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKind {
    Chute,
    Ladder,
}

impl std::fmt::Display for ShortcutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShortcutKind::Chute => f.write_str("chute"),
            ShortcutKind::Ladder => f.write_str("ladder"),
        }
    }
}

/// Errors raised when a board description is not well formed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("start square {start} must be below finish square {finish}")]
    EmptyTrack { start: u32, finish: u32 },

    #[error("spinner must have at least one position")]
    NoSpinPositions,

    #[error("{kind} origin {origin} must lie strictly between start {start} and finish {finish}")]
    OriginOutOfRange {
        kind: ShortcutKind,
        origin: u32,
        start: u32,
        finish: u32,
    },

    #[error("{kind} at {origin} leads to {destination}, outside the track [{start}, {finish}]")]
    DestinationOutOfRange {
        kind: ShortcutKind,
        origin: u32,
        destination: u32,
        start: u32,
        finish: u32,
    },

    #[error("{kind} at {origin} leads to {destination}, which is the wrong direction")]
    WrongDirection {
        kind: ShortcutKind,
        origin: u32,
        destination: u32,
    },

    #[error("square {square} is both a chute and a ladder origin")]
    ConflictingShortcuts { square: u32 },

    #[error("{kind} at {origin} leads to {destination}, which is itself a shortcut origin")]
    ChainedShortcut {
        kind: ShortcutKind,
        origin: u32,
        destination: u32,
    },
}

/// Errors raised while solving the equation system.
#[derive(Debug, Error)]
pub enum SolveError {
    /// The coefficients could not be assembled into a `dim`x`dim` matrix
    #[error("failed to assemble {dim}x{dim} matrix: {message}")]
    Assembly { dim: usize, message: String },

    /// The system is singular: a non-finite value or one that fails the residual check
    #[error("system is singular at square {square}")]
    Singular { square: u32 },
}

/// Top-level error for the build-then-solve pipeline
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid board: {0}")]
    Board(#[from] BoardError),

    #[error("numerical failure: {0}")]
    Solve(#[from] SolveError),

    #[error("Monte Carlo estimate needs at least one trial")]
    NoTrials,
}

/// Result type for the build-then-solve pipeline
pub type Result<T> = std::result::Result<T, Error>;
