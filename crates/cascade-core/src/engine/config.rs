use thiserror::Error;

/// Half-life (s) at or above which a level ends a prompt cascade.
pub const DEFAULT_HALF_LIFE_THRESHOLD: f64 = 1e-10;

/// Upper bound on emissions per cascade before it is reported as runaway.
pub const DEFAULT_MAX_CASCADE_STEPS: usize = 10_000;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Everything needed to run one seeded Monte Carlo batch.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Starting level energy (keV). `None` starts at the highest level in the database.
    pub start_energy: Option<f64>,
    pub half_life_threshold: f64,
    pub sample_count: usize,
    pub max_cascade_steps: usize,
    pub seed: u64,
}

#[derive(Default)]
pub struct SimulationConfigBuilder {
    start_energy: Option<f64>,
    half_life_threshold: Option<f64>,
    sample_count: Option<usize>,
    max_cascade_steps: Option<usize>,
    seed: Option<u64>,
}

impl SimulationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_energy(mut self, energy: Option<f64>) -> Self {
        self.start_energy = energy;
        self
    }
    pub fn half_life_threshold(mut self, threshold: f64) -> Self {
        self.half_life_threshold = Some(threshold);
        self
    }
    pub fn sample_count(mut self, count: usize) -> Self {
        self.sample_count = Some(count);
        self
    }
    pub fn max_cascade_steps(mut self, steps: usize) -> Self {
        self.max_cascade_steps = Some(steps);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let half_life_threshold = self
            .half_life_threshold
            .unwrap_or(DEFAULT_HALF_LIFE_THRESHOLD);
        if half_life_threshold.is_nan() || half_life_threshold < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "half_life_threshold",
                reason: format!("must be a non-negative number, got {}", half_life_threshold),
            });
        }

        if let Some(energy) = self.start_energy {
            if !energy.is_finite() {
                return Err(ConfigError::InvalidParameter {
                    name: "start_energy",
                    reason: format!("must be finite, got {}", energy),
                });
            }
        }

        let sample_count = self
            .sample_count
            .ok_or(ConfigError::MissingParameter("sample_count"))?;
        if sample_count == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "sample_count",
                reason: "at least one cascade must be requested".to_string(),
            });
        }

        let max_cascade_steps = self.max_cascade_steps.unwrap_or(DEFAULT_MAX_CASCADE_STEPS);
        if max_cascade_steps == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_cascade_steps",
                reason: "a cascade needs at least one step".to_string(),
            });
        }

        Ok(SimulationConfig {
            start_energy: self.start_energy,
            half_life_threshold,
            sample_count,
            max_cascade_steps,
            seed: self.seed.ok_or(ConfigError::MissingParameter("seed"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_applies_defaults() {
        let config = SimulationConfigBuilder::new()
            .sample_count(100)
            .seed(7)
            .build()
            .unwrap();
        assert_eq!(config.half_life_threshold, DEFAULT_HALF_LIFE_THRESHOLD);
        assert_eq!(config.max_cascade_steps, DEFAULT_MAX_CASCADE_STEPS);
        assert_eq!(config.start_energy, None);
    }

    #[test]
    fn build_requires_sample_count_and_seed() {
        assert_eq!(
            SimulationConfigBuilder::new().seed(1).build(),
            Err(ConfigError::MissingParameter("sample_count"))
        );
        assert_eq!(
            SimulationConfigBuilder::new().sample_count(1).build(),
            Err(ConfigError::MissingParameter("seed"))
        );
    }

    #[test]
    fn build_rejects_invalid_values() {
        let base = || SimulationConfigBuilder::new().sample_count(10).seed(1);
        assert!(matches!(
            base().half_life_threshold(-1.0).build(),
            Err(ConfigError::InvalidParameter {
                name: "half_life_threshold",
                ..
            })
        ));
        assert!(matches!(
            base().half_life_threshold(f64::NAN).build(),
            Err(ConfigError::InvalidParameter { .. })
        ));
        assert!(matches!(
            base().sample_count(0).build(),
            Err(ConfigError::InvalidParameter {
                name: "sample_count",
                ..
            })
        ));
        assert!(matches!(
            base().max_cascade_steps(0).build(),
            Err(ConfigError::InvalidParameter {
                name: "max_cascade_steps",
                ..
            })
        ));
        assert!(matches!(
            base().start_energy(Some(f64::INFINITY)).build(),
            Err(ConfigError::InvalidParameter {
                name: "start_energy",
                ..
            })
        ));
    }

    #[test]
    fn infinite_threshold_is_allowed() {
        let config = SimulationConfigBuilder::new()
            .sample_count(1)
            .seed(1)
            .half_life_threshold(f64::INFINITY)
            .build()
            .unwrap();
        assert!(config.half_life_threshold.is_infinite());
    }
}
