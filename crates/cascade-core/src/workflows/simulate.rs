use crate::core::models::database::{LevelDatabase, SchemeReport};
use crate::engine::cascade::CascadeGenerator;
use crate::engine::config::{ConfigError, SimulationConfig};
use crate::engine::driver::MonteCarloDriver;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use itertools::{Itertools, MinMaxResult};
use tracing::{info, instrument, warn};

/// Descriptive statistics of a batch of recoil energies (keV).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSummary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl SampleSummary {
    /// Returns `None` for an empty slice.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let (min, max) = match samples.iter().copied().minmax_by(f64::total_cmp) {
            MinMaxResult::NoElements => return None,
            MinMaxResult::OneElement(x) => (x, x),
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
        };
        let count = samples.len();
        let mean = samples.iter().sum::<f64>() / count as f64;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count as f64;
        Some(Self {
            count,
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub start_energy: f64,
    pub seed: u64,
    /// Effective recoil kinetic energies in keV, in deterministic chunk order.
    pub samples: Vec<f64>,
    pub summary: SampleSummary,
    pub scheme_report: SchemeReport,
}

#[instrument(skip_all, name = "simulation_workflow")]
pub fn run(
    database: &LevelDatabase,
    config: &SimulationConfig,
    reporter: &ProgressReporter,
) -> Result<SimulationResult, EngineError> {
    // === Phase 1: Level scheme checks ===
    reporter.report(Progress::PhaseStart {
        name: "Scheme Validation",
    });
    let generator = CascadeGenerator::from_config(database, config);
    let start_energy = generator.resolve_start(config.start_energy)?.energy();
    let scheme_report = database.validate(config.half_life_threshold);
    if scheme_report.is_clean() {
        info!("Level scheme passed validation.");
    } else {
        warn!(
            findings = scheme_report.finding_count(),
            "Level scheme has problems; affected cascades will fail. {}", scheme_report
        );
    }
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Monte Carlo batch ===
    reporter.report(Progress::PhaseStart {
        name: "Cascade Sampling",
    });
    info!(
        "Running {} cascade(s) from {} keV (threshold {:e} s, seed {}).",
        config.sample_count, start_energy, config.half_life_threshold, config.seed
    );
    let samples = MonteCarloDriver::new(&generator).run_seeded(
        Some(start_energy),
        config.sample_count,
        config.seed,
        reporter,
    )?;
    reporter.report(Progress::PhaseFinish);

    let summary =
        SampleSummary::from_samples(&samples).ok_or(ConfigError::InvalidParameter {
            name: "sample_count",
            reason: "at least one cascade must be requested".to_string(),
        })?;
    info!(
        "Mean recoil energy {:.3} keV (std dev {:.3}, range {:.3}..{:.3}).",
        summary.mean, summary.std_dev, summary.min, summary.max
    );

    Ok(SimulationResult {
        start_energy,
        seed: config.seed,
        samples,
        summary,
        scheme_report,
    })
}
