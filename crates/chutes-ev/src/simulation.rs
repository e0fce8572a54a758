//! Monte Carlo cross-check of the analytic expected values.
//!
//! Plays single-player games with a seeded RNG and compares the average
//! number of spins from the start square against the solved EV. This is not
//! used by the builder or the solver.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::board::{Board, OverrunRule};
use crate::error::{Error, Result};
use crate::solver::expected_values;

/// Configuration for a Monte Carlo run
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Number of independent games to play
    pub trials: u64,
    /// Seed for the game RNG
    pub seed: u64,
    /// Largest accepted gap between analytic and simulated EV(start)
    pub tolerance: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            trials: 100_000,
            seed: 0x5EED,
            tolerance: 0.5,
        }
    }
}

/// Sample mean of the spins needed to finish
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloEstimate {
    pub trials: u64,
    pub mean: f64,
    pub std_error: f64,
}

/// Analytic EV(start) next to its simulated estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossCheck {
    pub analytic: f64,
    pub estimate: MonteCarloEstimate,
    pub difference: f64,
    pub tolerance: f64,
    pub within_tolerance: bool,
}

/// Play one game from `from` and return the number of spins taken.
///
/// A spin that would overrun the finish leaves the player in place; under
/// [`OverrunRule::Forfeit`] it still counts as a spin. A game that starts
/// on or past the finish takes no spins. The board must be valid, otherwise
/// the game may never end.
pub fn simulate_game<R: Rng>(board: &Board, from: u32, rng: &mut R) -> u64 {
    let mut position = board.resolve(from);
    let mut spins = 0u64;

    while position < board.finish {
        let spin = rng.gen_range(1..=board.spin_positions);
        let target = position + spin;

        if target > board.finish {
            if board.overrun == OverrunRule::Forfeit {
                spins += 1;
            }
            continue;
        }

        spins += 1;
        position = board.resolve(target);
    }

    spins
}

/// Estimate EV(start) by playing `config.trials` independent games.
pub fn estimate(board: &Board, config: &ValidationConfig) -> Result<MonteCarloEstimate> {
    board.validate()?;
    if config.trials == 0 {
        return Err(Error::NoTrials);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    // Welford running mean/variance
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for n in 1..=config.trials {
        let x = simulate_game(board, board.start, &mut rng) as f64;
        let delta = x - mean;
        mean += delta / n as f64;
        m2 += delta * (x - mean);
    }

    let n = config.trials as f64;
    let std_error = if config.trials > 1 {
        (m2 / (n - 1.0) / n).sqrt()
    } else {
        0.0
    };

    log::debug!(
        "simulated {} games: mean {:.4} +/- {:.4}",
        config.trials,
        mean,
        std_error
    );

    Ok(MonteCarloEstimate {
        trials: config.trials,
        mean,
        std_error,
    })
}

/// Compare the solved EV(start) against a Monte Carlo estimate.
pub fn cross_check(board: &Board, config: &ValidationConfig) -> Result<CrossCheck> {
    let analytic = expected_values(board)?
        .get(board.start)
        .unwrap_or_default();
    let estimate = estimate(board, config)?;
    let difference = (analytic - estimate.mean).abs();
    let within_tolerance = difference <= config.tolerance;

    if within_tolerance {
        log::info!(
            "EV({}) = {:.4}, simulated {:.4} over {} games",
            board.start,
            analytic,
            estimate.mean,
            estimate.trials
        );
    } else {
        log::warn!(
            "EV({}) = {:.4} differs from simulated {:.4} by {:.4} (tolerance {})",
            board.start,
            analytic,
            estimate.mean,
            difference,
            config.tolerance
        );
    }

    Ok(CrossCheck {
        analytic,
        estimate,
        difference,
        tolerance: config.tolerance,
        within_tolerance,
    })
}
