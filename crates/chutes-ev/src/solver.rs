//! Direct solve of the expected-value system.
//!
//! The system is densified and factored with faer's full-pivot LU. A track
//! has one unknown per square, so the dense factorization is cheap, and full
//! pivoting degrades gracefully on a rank-deficient matrix where faer's
//! sparse LU aborts on the zero pivot. There is no retry or iterative
//! refinement: a well-formed board always yields a non-singular system, so
//! any failure here points at a builder or input defect.

use faer::prelude::*;

use crate::board::Board;
use crate::equations::{build, EquationSystem};
use crate::error::{Result, SolveError};

/// Largest accepted residual of `A·x - b`, relative to the constants
const RESIDUAL_TOLERANCE: f64 = 1e-8;

/// Solved expected spin counts for squares `start..finish`
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedValues {
    start: u32,
    finish: u32,
    values: Vec<f64>,
}

impl ExpectedValues {
    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn finish(&self) -> u32 {
        self.finish
    }

    /// Expected spins from `square`; the finish is always zero
    pub fn get(&self, square: u32) -> Option<f64> {
        if square == self.finish {
            return Some(0.0);
        }
        square
            .checked_sub(self.start)
            .and_then(|i| self.values.get(i as usize))
            .copied()
    }

    /// `(square, ev)` pairs in increasing square order, finish excluded
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        (self.start..).zip(self.values.iter().copied())
    }

    /// Raw solution vector, indexed by `square - start`
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Solve `A·x = b` for the expected spin count of every non-finish square.
pub fn solve(system: &EquationSystem) -> std::result::Result<ExpectedValues, SolveError> {
    let dim = system.dim();
    let mut matrix = Mat::<f64>::zeros(dim, dim);
    for (row, col, val) in system.triplets() {
        if row >= dim || col >= dim {
            return Err(SolveError::Assembly {
                dim,
                message: format!("entry ({row}, {col}) out of bounds"),
            });
        }
        matrix[(row, col)] += val;
    }

    let lu = matrix.full_piv_lu();
    let constants = system.constants();
    let mut rhs = Mat::<f64>::from_fn(dim, 1, |i, _| constants[i]);
    lu.solve_in_place(rhs.as_mut());

    let values: Vec<f64> = (0..dim).map(|i| rhs[(i, 0)]).collect();
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(SolveError::Singular {
            square: system.start() + i as u32,
        });
    }

    // A zero pivot can also leave finite values that do not satisfy the system
    let scale = constants.iter().fold(1.0_f64, |m, b| m.max(b.abs()));
    let mut residual = constants.iter().map(|b| -b).collect::<Vec<f64>>();
    for (row, col, val) in system.triplets() {
        residual[row] += val * values[col];
    }
    if let Some(i) = residual
        .iter()
        .position(|r| r.abs() > RESIDUAL_TOLERANCE * scale)
    {
        return Err(SolveError::Singular {
            square: system.start() + i as u32,
        });
    }

    log::debug!("solved {dim} expected values");

    Ok(ExpectedValues {
        start: system.start(),
        finish: system.finish(),
        values,
    })
}

/// Build and solve in one step.
pub fn expected_values(board: &Board) -> Result<ExpectedValues> {
    let system = build(board)?;
    Ok(solve(&system)?)
}
