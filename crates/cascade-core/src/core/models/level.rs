use std::fmt;
use thiserror::Error;

/// Quantization steps per keV used for level identity (micro-keV resolution).
pub const KEY_STEPS_PER_KEV: f64 = 1e6;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LevelError {
    #[error(
        "Level {energy} keV has {transitions} transition(s) but {branching} branching weight(s)"
    )]
    BranchingMismatch {
        energy: f64,
        transitions: usize,
        branching: usize,
    },
    #[error("Level {energy} keV has an invalid branching weight at index {index}: {weight}")]
    InvalidBranching {
        energy: f64,
        index: usize,
        weight: f64,
    },
    #[error("Level {energy} keV has an unrepresentable transition energy at index {index}")]
    InvalidTransition { energy: f64, index: usize },
    #[error("Level energy must be finite and within the key range, got {0}")]
    InvalidEnergy(f64),
    #[error("Level {energy} keV has an invalid half-life: {half_life}")]
    InvalidHalfLife { energy: f64, half_life: f64 },
}

/// Stable identity of a level, derived once from its energy.
///
/// The energy is quantized to integer micro-keV, so two
/// independently parsed copies of the same textual value always produce the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelKey(i64);

impl LevelKey {
    /// `None` for non-finite energies and for energies whose micro-keV count overflows `i64`.
    pub fn from_energy(energy_kev: f64) -> Option<Self> {
        let steps = (energy_kev * KEY_STEPS_PER_KEV).round();
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
        if steps.is_finite() && steps >= i64::MIN as f64 && steps < i64::MAX as f64 {
            Some(Self(steps as i64))
        } else {
            None
        }
    }

    pub fn energy(self) -> f64 {
        self.0 as f64 / KEY_STEPS_PER_KEV
    }
}

impl fmt::Display for LevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} keV", self.energy())
    }
}

/// One nuclear energy level and its outgoing gamma transitions.
///
/// `transitions` holds destination level energies (keV) and `branching` the relative,
/// not necessarily normalized, weight of each. Both are index-aligned, which
/// [`LevelRecord::new`] enforces.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelRecord {
    key: LevelKey,
    energy: f64,
    half_life: f64,
    transitions: Vec<f64>,
    branching: Vec<f64>,
}

impl LevelRecord {
    pub fn new(
        energy: f64,
        half_life: f64,
        transitions: Vec<f64>,
        branching: Vec<f64>,
    ) -> Result<Self, LevelError> {
        let key = LevelKey::from_energy(energy).ok_or(LevelError::InvalidEnergy(energy))?;
        if half_life.is_nan() || half_life < 0.0 {
            return Err(LevelError::InvalidHalfLife { energy, half_life });
        }
        if transitions.len() != branching.len() {
            return Err(LevelError::BranchingMismatch {
                energy,
                transitions: transitions.len(),
                branching: branching.len(),
            });
        }
        if let Some(index) = transitions
            .iter()
            .position(|&t| LevelKey::from_energy(t).is_none()) {
            return Err(LevelError::InvalidTransition { energy, index });
        }
        if let Some((index, &weight)) = branching
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(LevelError::InvalidBranching {
                energy,
                index,
                weight,
            });
        }

        Ok(Self {
            key,
            energy,
            half_life,
            transitions,
            branching,
        })
    }

    /// A level with no outgoing transitions, e.g. the ground state.
    pub fn stable(energy: f64) -> Result<Self, LevelError> {
        Self::new(energy, f64::INFINITY, Vec::new(), Vec::new())
    }

    pub fn key(&self) -> LevelKey {
        self.key
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn half_life(&self) -> f64 {
        self.half_life
    }

    pub fn transitions(&self) -> &[f64] {
        &self.transitions
    }

    pub fn branching(&self) -> &[f64] {
        &self.branching
    }

    pub fn total_branching(&self) -> f64 {
        self.branching.iter().sum()
    }

    pub fn is_terminal_ground(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Whether a cascade passes straight through this level under `threshold`.
    pub fn is_short_lived(&self, threshold: f64) -> bool {
        self.half_life < threshold
    }

    /// Destination energies paired with their weights, in declaration order.
    pub fn outgoing(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.transitions
            .iter()
            .copied()
            .zip(self.branching.iter().copied())
    }
}
