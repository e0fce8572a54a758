//! Board description types.
//!
//! A board is a linear track of squares from `start` to `finish` with
//! chutes and ladders keyed by their origin square. Boards deserialize from
//! JSON so custom tracks can be fed to the CLI.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{BoardError, ShortcutKind};

/// A shortcut the player takes on landing on its origin square
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Chute(u32),
    Ladder(u32),
}

impl Shortcut {
    /// Square the player ends up on
    pub fn destination(self) -> u32 {
        match self {
            Shortcut::Chute(e) | Shortcut::Ladder(e) => e,
        }
    }

    pub fn kind(self) -> ShortcutKind {
        match self {
            Shortcut::Chute(_) => ShortcutKind::Chute,
            Shortcut::Ladder(_) => ShortcutKind::Ladder,
        }
    }
}

/// What happens to a spin that would carry the player past the finish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrunRule {
    /// The spin is used up and the player stays put
    #[default]
    Forfeit,
    /// The player spins again and the overrun spin is not counted
    Respin,
}

/// The complete board configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub start: u32,
    pub finish: u32,
    #[serde(rename = "spinPositions")]
    pub spin_positions: u32,
    /// Chute top (origin) to chute bottom
    #[serde(default)]
    pub chutes: BTreeMap<u32, u32>,
    /// Ladder bottom (origin) to ladder top
    #[serde(default)]
    pub ladders: BTreeMap<u32, u32>,
    #[serde(default)]
    pub overrun: OverrunRule,
}

impl Board {
    /// Board with no shortcuts
    pub fn new(start: u32, finish: u32, spin_positions: u32) -> Self {
        Self {
            start,
            finish,
            spin_positions,
            chutes: BTreeMap::new(),
            ladders: BTreeMap::new(),
            overrun: OverrunRule::Forfeit,
        }
    }

    pub fn with_chute(mut self, origin: u32, destination: u32) -> Self {
        self.chutes.insert(origin, destination);
        self
    }

    pub fn with_ladder(mut self, origin: u32, destination: u32) -> Self {
        self.ladders.insert(origin, destination);
        self
    }

    pub fn with_overrun(mut self, overrun: OverrunRule) -> Self {
        self.overrun = overrun;
        self
    }

    /// The classic 100-square board played with a 6-position spinner.
    pub fn standard() -> Self {
        let chutes = [
            (16, 6),
            (47, 26),
            (49, 11),
            (56, 53),
            (62, 19),
            (64, 60),
            (87, 24),
            (93, 73),
            (95, 75),
            (98, 78),
        ];
        let ladders = [
            (1, 38),
            (4, 14),
            (9, 31),
            (21, 42),
            (28, 84),
            (36, 44),
            (51, 67),
            (71, 91),
            (80, 100),
        ];
        Self {
            chutes: chutes.into_iter().collect(),
            ladders: ladders.into_iter().collect(),
            ..Self::blank()
        }
    }

    /// The standard track and spinner with every shortcut removed
    pub fn blank() -> Self {
        Self::new(0, 100, 6)
    }

    /// Number of squares that get an equation (every square but the finish)
    pub(crate) fn len(&self) -> usize {
        self.finish.saturating_sub(self.start) as usize
    }

    /// Last square from which every spin still lands on the board.
    ///
    /// Returns `None` when the spinner is larger than the track, in which
    /// case every square can overrun.
    pub fn cusp(&self) -> Option<u32> {
        self.finish
            .checked_sub(self.spin_positions)
            .filter(|&c| c >= self.start)
    }

    /// Look up the shortcut starting on `square`, chutes first
    pub fn shortcut_at(&self, square: u32) -> Option<Shortcut> {
        if let Some(&e) = self.chutes.get(&square) {
            return Some(Shortcut::Chute(e));
        }
        self.ladders.get(&square).map(|&e| Shortcut::Ladder(e))
    }

    /// Square the player ends up on after landing on `square`
    pub fn resolve(&self, square: u32) -> u32 {
        self.shortcut_at(square)
            .map_or(square, Shortcut::destination)
    }

    /// Offset of a square into the equation system
    pub fn index_of(&self, square: u32) -> usize {
        (square - self.start) as usize
    }

    fn shortcuts(&self) -> impl Iterator<Item = (u32, Shortcut)> + '_ {
        self.chutes
            .iter()
            .map(|(&s, &e)| (s, Shortcut::Chute(e)))
            .chain(self.ladders.iter().map(|(&s, &e)| (s, Shortcut::Ladder(e))))
    }

    /// Check every board invariant the equation builder relies on.
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.start >= self.finish {
            return Err(BoardError::EmptyTrack {
                start: self.start,
                finish: self.finish,
            });
        }
        if self.spin_positions == 0 {
            return Err(BoardError::NoSpinPositions);
        }

        if let Some(&square) = self.chutes.keys().find(|&s| self.ladders.contains_key(s)) {
            return Err(BoardError::ConflictingShortcuts { square });
        }

        for (origin, shortcut) in self.shortcuts() {
            let kind = shortcut.kind();
            let destination = shortcut.destination();

            if origin <= self.start || origin >= self.finish {
                return Err(BoardError::OriginOutOfRange {
                    kind,
                    origin,
                    start: self.start,
                    finish: self.finish,
                });
            }
            if destination < self.start || destination > self.finish {
                return Err(BoardError::DestinationOutOfRange {
                    kind,
                    origin,
                    destination,
                    start: self.start,
                    finish: self.finish,
                });
            }
            let downhill = destination < origin;
            if destination == origin || downhill != (kind == ShortcutKind::Chute) {
                return Err(BoardError::WrongDirection {
                    kind,
                    origin,
                    destination,
                });
            }
            if self.shortcut_at(destination).is_some() {
                return Err(BoardError::ChainedShortcut {
                    kind,
                    origin,
                    destination,
                });
            }
        }

        Ok(())
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}
