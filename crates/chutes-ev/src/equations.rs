//! Expected-value equation builder.
//!
//! Every square before the finish gets one linear equation over the unknown
//! expected spin counts. For a plain square the recurrence is
//! `EV(s) = 1 + mean(EV(s + 1) ..= EV(s + K))`; multiplied through by the
//! spinner size `K` this becomes `K·EV(s) - Σ EV(s + k) = K`. Landing on a
//! shortcut origin costs nothing, so its row just ties `EV(s)` to the
//! destination. Past the cusp, spins that would overrun the finish are
//! forfeited and only the squares up to the finish appear in the sum. With
//! `n` landing squares the row is `n·EV(s) - Σ EV(s + j) = K`, the forfeited
//! spins still counting; under [`OverrunRule::Respin`] they are not counted
//! and the constant drops to `n`.
//!
//! `EV(finish)` is zero by definition, so the finish is neither a row nor a
//! column and any term referring to it is dropped.

use smallvec::SmallVec;

use crate::board::{Board, OverrunRule, Shortcut};
use crate::error::BoardError;

/// Column/coefficient pairs of one row. A row touches at most `K + 1` columns.
pub type RowEntries = SmallVec<[(usize, f64); 8]>;

/// Which recurrence produced a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Chute or ladder origin: `EV(s) - EV(e) = 0`
    Shortcut(Shortcut),
    /// Every spin lands strictly before the finish
    Interior,
    /// At or past the cusp: `n` spins land, the rest are forfeited
    Overrun { landing: u32 },
}

/// One equation of the system
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub square: u32,
    pub kind: RowKind,
    pub entries: RowEntries,
}

impl Row {
    /// Coefficient on a column, zero when absent
    pub fn coefficient(&self, column: usize) -> f64 {
        self.entries
            .iter()
            .filter(|(c, _)| *c == column)
            .map(|(_, v)| v)
            .sum()
    }
}

/// Sparse square system `A·x = b`, one row per square in `[start, finish)`.
#[derive(Debug, Clone)]
pub struct EquationSystem {
    start: u32,
    finish: u32,
    rows: Vec<Row>,
    constants: Vec<f64>,
}

impl EquationSystem {
    /// Number of rows (and columns)
    pub fn dim(&self) -> usize {
        self.rows.len()
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn finish(&self) -> u32 {
        self.finish
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Right-hand side `b`
    pub fn constants(&self) -> &[f64] {
        &self.constants
    }

    /// Number of stored coefficients
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(|r| r.entries.len()).sum()
    }

    /// System from hand-written rows, finish one past the last row
    #[cfg(test)]
    pub(crate) fn from_rows(start: u32, rows: Vec<Row>, constants: Vec<f64>) -> Self {
        Self {
            start,
            finish: start + rows.len() as u32,
            rows,
            constants,
        }
    }

    /// All coefficients as `(row, column, value)`, row-major
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.rows.iter().enumerate().flat_map(|(i, row)| {
            row.entries.iter().map(move |&(col, val)| (i, col, val))
        })
    }
}

/// Build the expected-value system for a board.
///
/// The board is validated first; a malformed board never reaches matrix
/// construction.
pub fn build(board: &Board) -> Result<EquationSystem, BoardError> {
    board.validate()?;

    let spins = board.spin_positions;
    let dim = board.len();
    let mut rows = Vec::with_capacity(dim);
    let mut constants = Vec::with_capacity(dim);

    for s in board.start..board.finish {
        let row = match board.shortcut_at(s) {
            Some(shortcut) => shortcut_row(board, s, shortcut),
            None => spin_row(board, s),
        };
        constants.push(match row.kind {
            RowKind::Shortcut(_) => 0.0,
            RowKind::Interior => f64::from(spins),
            RowKind::Overrun { landing } => match board.overrun {
                // Forfeited spins still count towards the total
                OverrunRule::Forfeit => f64::from(spins),
                OverrunRule::Respin => f64::from(landing),
            },
        });
        rows.push(row);
    }

    let system = EquationSystem {
        start: board.start,
        finish: board.finish,
        rows,
        constants,
    };
    log::debug!(
        "built {}x{} system with {} non-zeros (cusp {:?})",
        system.dim(),
        system.dim(),
        system.nnz(),
        board.cusp()
    );
    Ok(system)
}

fn shortcut_row(board: &Board, s: u32, shortcut: Shortcut) -> Row {
    let mut entries = RowEntries::new();
    entries.push((board.index_of(s), 1.0));

    let e = shortcut.destination();
    if e < board.finish {
        entries.push((board.index_of(e), -1.0));
    }

    Row {
        square: s,
        kind: RowKind::Shortcut(shortcut),
        entries,
    }
}

fn spin_row(board: &Board, s: u32) -> Row {
    let spins = board.spin_positions;
    // Squares reachable without overrunning, the finish included
    let landing = spins.min(board.finish - s);
    let kind = if landing == spins && s + spins < board.finish {
        RowKind::Interior
    } else {
        RowKind::Overrun { landing }
    };

    let mut entries = RowEntries::new();
    entries.push((board.index_of(s), f64::from(landing)));
    for s1 in (s + 1..=s + landing).filter(|&s1| s1 < board.finish) {
        entries.push((board.index_of(s1), -1.0));
    }

    Row {
        square: s,
        kind,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_row() {
        let board = Board::new(0, 20, 6);
        let system = build(&board).unwrap();
        let row = &system.rows()[3];

        assert_eq!(row.kind, RowKind::Interior);
        assert_eq!(row.coefficient(3), 6.0);
        for col in 4..=9 {
            assert_eq!(row.coefficient(col), -1.0);
        }
        assert_eq!(row.coefficient(10), 0.0);
        assert_eq!(system.constants()[3], 6.0);
    }

    #[test]
    fn test_cusp_rows_drop_finish() {
        let board = Board::new(0, 20, 6);
        let system = build(&board).unwrap();

        // Square 14 is the cusp: all six spins land, the last one on the finish
        let cusp = &system.rows()[14];
        assert_eq!(cusp.kind, RowKind::Overrun { landing: 6 });
        assert_eq!(cusp.coefficient(14), 6.0);
        assert_eq!(cusp.entries.len(), 6);

        let near = &system.rows()[17];
        assert_eq!(near.kind, RowKind::Overrun { landing: 3 });
        assert_eq!(near.coefficient(17), 3.0);
        assert_eq!(near.coefficient(18), -1.0);
        assert_eq!(near.coefficient(19), -1.0);
        assert_eq!(near.entries.len(), 3);
        assert_eq!(system.constants()[17], 6.0);

        let last = &system.rows()[19];
        assert_eq!(last.entries.as_slice(), &[(19, 1.0)]);
        assert_eq!(system.constants()[19], 6.0);
    }

    #[test]
    fn test_shortcut_rows() {
        let board = Board::new(0, 20, 6)
            .with_chute(12, 4)
            .with_ladder(2, 9)
            .with_ladder(17, 20);
        let system = build(&board).unwrap();

        let chute = &system.rows()[12];
        assert_eq!(chute.kind, RowKind::Shortcut(Shortcut::Chute(4)));
        assert_eq!(chute.coefficient(12), 1.0);
        assert_eq!(chute.coefficient(4), -1.0);
        assert_eq!(system.constants()[12], 0.0);

        let ladder = &system.rows()[2];
        assert_eq!(ladder.coefficient(2), 1.0);
        assert_eq!(ladder.coefficient(9), -1.0);
        assert_eq!(system.constants()[2], 0.0);

        // Ladder straight to the finish degenerates to EV(17) = 0
        let to_finish = &system.rows()[17];
        assert_eq!(to_finish.entries.as_slice(), &[(17, 1.0)]);
        assert_eq!(system.constants()[17], 0.0);
    }

    #[test]
    fn test_shape_invariant() {
        for board in [Board::standard(), Board::blank(), Board::new(3, 11, 4)] {
            let system = build(&board).unwrap();
            let dim = (board.finish - board.start) as usize;
            assert_eq!(system.dim(), dim);
            assert_eq!(system.constants().len(), dim);
            assert!(system.triplets().all(|(r, c, _)| r < dim && c < dim));
            for (i, row) in system.rows().iter().enumerate() {
                assert_eq!(row.square, board.start + i as u32);
            }
        }
    }

    #[test]
    fn test_spinner_larger_than_track() {
        let board = Board::new(0, 3, 6);
        let system = build(&board).unwrap();
        assert_eq!(system.dim(), 3);
        assert!(system
            .rows()
            .iter()
            .all(|r| matches!(r.kind, RowKind::Overrun { .. })));
        assert_eq!(system.rows()[0].coefficient(0), 3.0);
    }

    #[test]
    fn test_offset_start_uses_relative_columns() {
        let board = Board::new(10, 14, 2).with_ladder(11, 13);
        let system = build(&board).unwrap();
        assert_eq!(system.rows()[1].entries.as_slice(), &[(1, 1.0), (3, -1.0)]);
        assert_eq!(system.rows()[0].entries.as_slice(), &[(0, 2.0), (1, -1.0), (2, -1.0)]);
    }

    #[test]
    fn test_invalid_board_is_rejected() {
        let board = Board::new(0, 10, 6).with_chute(4, 2).with_ladder(2, 8);
        assert!(matches!(
            build(&board),
            Err(BoardError::ChainedShortcut { .. })
        ));
    }

    #[test]
    fn test_respin_rule_constants() {
        let board = Board::new(0, 20, 6).with_overrun(OverrunRule::Respin);
        let system = build(&board).unwrap();
        assert_eq!(system.constants()[3], 6.0);
        assert_eq!(system.constants()[14], 6.0);
        assert_eq!(system.constants()[17], 3.0);
        assert_eq!(system.constants()[19], 1.0);
        assert_eq!(system.rows()[17], build(&Board::new(0, 20, 6)).unwrap().rows()[17]);
    }
}
