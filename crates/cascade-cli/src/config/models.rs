use gamma_cascade::engine::config::SimulationConfig;
use std::path::PathBuf;

/// Upper bound on histogram bins accepted from configuration.
pub const MAX_HISTOGRAM_BINS: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramConfig {
    pub bin_width: f64,
    pub max_energy: f64,
}

impl HistogramConfig {
    /// Bins needed to cover `[0, max_energy)`; the last one may be partial.
    pub fn bin_count(&self) -> f64 {
        (self.max_energy / self.bin_width).ceil().max(1.0)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub level_sources: Vec<PathBuf>,
    pub simulation: SimulationConfig,
    pub histogram: HistogramConfig,
    /// True when no seed was configured and one was drawn for this run.
    pub seed_generated: bool,
}
