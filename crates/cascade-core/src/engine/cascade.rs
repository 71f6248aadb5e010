use super::config::{DEFAULT_MAX_CASCADE_STEPS, SimulationConfig};
use super::error::EngineError;
use super::utils::sampling::weighted_choice;
use crate::core::models::database::LevelDatabase;
use crate::core::models::level::LevelRecord;
use crate::core::utils::geometry::sample_isotropic_direction;
use nalgebra::{Unit, Vector3};
use rand::Rng;
use tracing::trace;

/// Conversion factor between photon energy and momentum. Energies stay in keV, so
/// momenta carry keV·s/m; multiplying back by this constant yields keV again.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Consecutive degenerate direction draws tolerated before giving up.
pub const MAX_DIRECTION_ATTEMPTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// The level just reached is short-lived; the cascade proceeds through it.
    Continuing,
    /// The level just reached has `half_life >= threshold`; the cascade stops there.
    Terminated,
}

/// One gamma emission of a cascade.
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    pub from_energy: f64,
    pub to_energy: f64,
    /// `from_energy - to_energy` in keV. Not rejected when zero or negative.
    pub gamma_energy: f64,
    pub direction: Unit<Vector3<f64>>,
    /// `|total momentum| * c` after this emission, in keV.
    pub running_kinetic_energy: f64,
}

/// Full record of one cascade, as produced by [`CascadeGenerator::run_traced`].
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeTrace {
    pub start_energy: f64,
    pub stop_energy: f64,
    pub emissions: Vec<Emission>,
    pub momentum: Vector3<f64>,
    pub effective_kinetic_energy: f64,
}

/// Ephemeral state of a single cascade. Never outlives the call that created it.
struct CascadeState<'db> {
    current: &'db LevelRecord,
    momentum: Vector3<f64>,
    steps: usize,
    phase: Phase,
}

impl<'db> CascadeState<'db> {
    fn new(start: &'db LevelRecord) -> Self {
        Self {
            current: start,
            momentum: Vector3::zeros(),
            steps: 0,
            phase: Phase::Continuing,
        }
    }

    fn effective_kinetic_energy(&self) -> f64 {
        self.momentum.norm() * SPEED_OF_LIGHT
    }

    /// Emits a photon towards `next` and advances to it.
    fn emit(
        &mut self,
        next: &'db LevelRecord,
        direction: Unit<Vector3<f64>>,
        phase: Phase,
    ) -> Emission {
        let gamma_energy = self.current.energy() - next.energy();
        let momentum_magnitude = gamma_energy / SPEED_OF_LIGHT;
        self.momentum += direction.into_inner() * momentum_magnitude;

        let emission = Emission {
            from_energy: self.current.energy(),
            to_energy: next.energy(),
            gamma_energy,
            direction,
            running_kinetic_energy: self.effective_kinetic_energy(),
        };
        self.current = next;
        self.steps += 1;
        self.phase = phase;
        emission
    }
}

/// Runs single stochastic gamma cascades over a read-only [`LevelDatabase`].
///
/// Each call walks from the start level, choosing every next level by branching
/// weight and emitting one isotropic photon per transition, until it lands on a level
/// whose half-life is at least the threshold. The result is the magnitude of the
/// accumulated recoil momentum times `c`, in keV.
#[derive(Debug, Clone, Copy)]
pub struct CascadeGenerator<'db> {
    database: &'db LevelDatabase,
    half_life_threshold: f64,
    max_steps: usize,
}

impl<'db> CascadeGenerator<'db> {
    pub fn new(database: &'db LevelDatabase, half_life_threshold: f64) -> Self {
        Self {
            database,
            half_life_threshold,
            max_steps: DEFAULT_MAX_CASCADE_STEPS,
        }
    }

    pub fn from_config(database: &'db LevelDatabase, config: &SimulationConfig) -> Self {
        Self::new(database, config.half_life_threshold).with_max_steps(config.max_cascade_steps)
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn database(&self) -> &'db LevelDatabase {
        self.database
    }

    pub fn half_life_threshold(&self) -> f64 {
        self.half_life_threshold
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// The explicit start level, or the highest level in the database.
    pub fn resolve_start(&self, start_energy: Option<f64>) -> Result<&'db LevelRecord, EngineError> {
        let energy = match start_energy {
            Some(energy) => energy,
            None => self.database.highest_energy()?,
        };
        Ok(self.database.lookup(energy)?)
    }

    /// Runs one cascade and returns its effective kinetic energy (keV, always >= 0).
    pub fn run(&self, start_energy: Option<f64>, rng: &mut impl Rng) -> Result<f64, EngineError> {
        self.walk(start_energy, rng, |_| {})
            .map(|state| state.effective_kinetic_energy())
    }

    /// Same walk as [`run`](Self::run), drawing identically from `rng`, but keeps
    /// every emission.
    pub fn run_traced(
        &self,
        start_energy: Option<f64>,
        rng: &mut impl Rng,
    ) -> Result<CascadeTrace, EngineError> {
        let mut emissions = Vec::new();
        let start = self.resolve_start(start_energy)?.energy();
        let state = self.walk(start_energy, rng, |e| emissions.push(e))?;
        Ok(CascadeTrace {
            start_energy: start,
            stop_energy: state.current.energy(),
            emissions,
            momentum: state.momentum,
            effective_kinetic_energy: state.effective_kinetic_energy(),
        })
    }

    fn walk<R: Rng>(
        &self,
        start_energy: Option<f64>,
        rng: &mut R,
        mut on_emission: impl FnMut(Emission),
    ) -> Result<CascadeState<'db>, EngineError> {
        let start = self.resolve_start(start_energy)?;
        let mut state = CascadeState::new(start);

        while state.phase == Phase::Continuing {
            if state.steps >= self.max_steps {
                return Err(EngineError::CascadeTooLong {
                    start_energy: start.energy(),
                    max_steps: self.max_steps,
                });
            }

            let next = self.choose_next(state.current, rng)?;
            let direction = retry_direction(|| sample_isotropic_direction(rng))?;
            let emission = state.emit(next, direction, self.classify(next));
            trace!(
                from = emission.from_energy,
                to = emission.to_energy,
                gamma_kev = emission.gamma_energy,
                running_ke_kev = emission.running_kinetic_energy,
                "Gamma emitted."
            );
            on_emission(emission);
        }

        Ok(state)
    }

    fn choose_next<R: Rng>(
        &self,
        current: &LevelRecord,
        rng: &mut R,
    ) -> Result<&'db LevelRecord, EngineError> {
        if current.is_terminal_ground() {
            return Err(EngineError::NoOutgoingTransition {
                energy: current.energy(),
            });
        }
        let index =
            weighted_choice(current.branching(), rng).map_err(|source| EngineError::Sampling {
                energy: current.energy(),
                source,
            })?;
        Ok(self.database.lookup(current.transitions()[index])?)
    }

    fn classify(&self, level: &LevelRecord) -> Phase {
        if level.is_short_lived(self.half_life_threshold) {
            Phase::Continuing
        } else {
            Phase::Terminated
        }
    }
}

/// Redraws degenerate directions, giving up after [`MAX_DIRECTION_ATTEMPTS`] in a row.
fn retry_direction(
    mut draw: impl FnMut() -> Option<Unit<Vector3<f64>>>,
) -> Result<Unit<Vector3<f64>>, EngineError> {
    (0..MAX_DIRECTION_ATTEMPTS)
        .find_map(|_| draw())
        .ok_or(EngineError::DegenerateDirectionSample {
            attempts: MAX_DIRECTION_ATTEMPTS,
        })
}
