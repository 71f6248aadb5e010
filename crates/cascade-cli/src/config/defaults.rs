use gamma_cascade::engine::config::{DEFAULT_HALF_LIFE_THRESHOLD, DEFAULT_MAX_CASCADE_STEPS};

pub struct DefaultsConfig {
    pub half_life_threshold: f64,
    pub samples: usize,
    pub max_cascade_steps: usize,
    pub bin_width: f64,
    pub max_energy: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            half_life_threshold: DEFAULT_HALF_LIFE_THRESHOLD,
            samples: 10_000,
            max_cascade_steps: DEFAULT_MAX_CASCADE_STEPS,
            bin_width: 5.0,
            max_energy: 6100.0,
        }
    }
}
