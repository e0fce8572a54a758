//! Expected spins to finish a Chutes and Ladders track.
//!
//! Each square before the finish gets one linear equation relating its
//! expected remaining spin count to the squares a single spin can reach.
//! [`build`] assembles that sparse system from a [`Board`] and [`solve`]
//! hands it to a full-pivot LU. A seeded Monte Carlo player in [`simulation`]
//! provides an independent statistical cross-check.

pub mod board;
pub mod equations;
pub mod error;
pub mod simulation;
pub mod solver;

// Re-export main types
pub use board::{Board, OverrunRule, Shortcut};
pub use equations::{build, EquationSystem, Row, RowKind};
pub use error::{BoardError, Error, Result, ShortcutKind, SolveError};
pub use simulation::{
    cross_check, estimate, simulate_game, CrossCheck, MonteCarloEstimate, ValidationConfig,
};
pub use solver::{expected_values, solve, ExpectedValues};
