use super::cascade::CascadeGenerator;
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Cascades per independently seeded chunk in [`MonteCarloDriver::run_seeded`].
pub const SAMPLES_PER_CHUNK: usize = 4096;

const SEED_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// Seed of the `chunk_index`-th chunk of a batch seeded with `master_seed`.
pub fn derive_chunk_seed(master_seed: u64, chunk_index: u64) -> u64 {
    master_seed ^ chunk_index.wrapping_mul(SEED_MIX)
}

/// Repeats a [`CascadeGenerator`] to build an empirical sample of recoil energies.
#[derive(Debug, Clone, Copy)]
pub struct MonteCarloDriver<'db> {
    generator: CascadeGenerator<'db>,
}

impl<'db> MonteCarloDriver<'db> {
    pub fn new(generator: &CascadeGenerator<'db>) -> Self {
        Self {
            generator: *generator,
        }
    }

    pub fn generator(&self) -> &CascadeGenerator<'db> {
        &self.generator
    }

    /// Runs `count` cascades in sequence from one random stream.
    ///
    /// The first failing cascade aborts the batch; partial results are discarded.
    #[instrument(level = "debug", skip_all, fields(count))]
    pub fn run_batch(
        &self,
        start_energy: Option<f64>,
        count: usize,
        rng: &mut impl Rng,
    ) -> Result<Vec<f64>, EngineError> {
        let mut samples = Vec::with_capacity(count);
        for _ in 0..count {
            samples.push(self.generator.run(start_energy, rng)?);
        }
        Ok(samples)
    }

    /// Runs `count` cascades split into chunks of [`SAMPLES_PER_CHUNK`], each with its
    /// own generator seeded by [`derive_chunk_seed`].
    ///
    /// Every chunk writes only its own slice of the output, so the result is the same
    /// bit for bit whether or not chunks run in parallel. When several chunks fail,
    /// which error is returned may depend on scheduling.
    #[instrument(level = "debug", skip_all, fields(count, seed))]
    pub fn run_seeded(
        &self,
        start_energy: Option<f64>,
        count: usize,
        seed: u64,
        reporter: &ProgressReporter,
    ) -> Result<Vec<f64>, EngineError> {
        self.generator.resolve_start(start_energy)?;

        reporter.report(Progress::BatchStart {
            total_cascades: count as u64,
        });

        let mut samples = vec![0.0; count];
        let fill_chunk = |(index, chunk): (usize, &mut [f64])| -> Result<(), EngineError> {
            let mut rng = StdRng::seed_from_u64(derive_chunk_seed(seed, index as u64));
            for slot in chunk.iter_mut() {
                *slot = self.generator.run(start_energy, &mut rng)?;
            }
            reporter.report(Progress::CascadesCompleted(chunk.len() as u64));
            Ok(())
        };

        #[cfg(not(feature = "parallel"))]
        let result = samples
            .chunks_mut(SAMPLES_PER_CHUNK)
            .enumerate()
            .try_for_each(fill_chunk);

        #[cfg(feature = "parallel")]
        let result = samples
            .par_chunks_mut(SAMPLES_PER_CHUNK)
            .enumerate()
            .try_for_each(fill_chunk);

        result?;

        debug!(
            chunks = count.div_ceil(SAMPLES_PER_CHUNK),
            "Seeded batch complete."
        );
        reporter.report(Progress::BatchFinish);
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::database::{DatabaseError, LevelDatabase};
    use crate::core::models::level::LevelRecord;
    use std::sync::Mutex;

    fn branching_scheme() -> LevelDatabase {
        LevelDatabase::from_records(vec![
            LevelRecord::new(300.0, 1e-12, vec![100.0, 0.0], vec![0.6, 0.4]).unwrap(),
            LevelRecord::new(100.0, 1e-12, vec![0.0], vec![1.0]).unwrap(),
            LevelRecord::stable(0.0).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn run_batch_returns_requested_number_of_non_negative_samples() {
        let db = branching_scheme();
        let generator = CascadeGenerator::new(&db, 1e-10);
        let driver = MonteCarloDriver::new(&generator);
        let mut rng = StdRng::seed_from_u64(1);
        let samples = driver.run_batch(None, 1_000, &mut rng).unwrap();
        assert_eq!(samples.len(), 1_000);
        assert!(samples.iter().all(|&ke| ke >= 0.0));
    }

    #[test]
    fn run_batch_with_zero_count_is_empty() {
        let db = branching_scheme();
        let generator = CascadeGenerator::new(&db, 1e-10);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(
            MonteCarloDriver::new(&generator)
                .run_batch(None, 0, &mut rng)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn run_batch_matches_repeated_single_runs() {
        let db = branching_scheme();
        let generator = CascadeGenerator::new(&db, 1e-10);
        let driver = MonteCarloDriver::new(&generator);

        let mut a = StdRng::seed_from_u64(11);
        let batch = driver.run_batch(Some(300.0), 200, &mut a).unwrap();

        let mut b = StdRng::seed_from_u64(11);
        let single: Vec<f64> = (0..200)
            .map(|_| generator.run(Some(300.0), &mut b).unwrap())
            .collect();
        assert_eq!(batch, single);
    }

    #[test]
    fn run_batch_aborts_on_first_failure() {
        let db = branching_scheme();
        let generator = CascadeGenerator::new(&db, 1e-10);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            MonteCarloDriver::new(&generator).run_batch(Some(42.0), 10, &mut rng),
            Err(EngineError::Database(DatabaseError::UnknownLevel { .. }))
        ));
    }

    #[test]
    fn run_seeded_matches_chunkwise_sequential_reference() {
        let db = branching_scheme();
        let generator = CascadeGenerator::new(&db, 1e-10);
        let driver = MonteCarloDriver::new(&generator);
        let count = 2 * SAMPLES_PER_CHUNK + 17;

        let samples = driver
            .run_seeded(None, count, 99, &ProgressReporter::new())
            .unwrap();

        let mut reference = Vec::with_capacity(count);
        for (index, start) in (0..count).step_by(SAMPLES_PER_CHUNK).enumerate() {
            let len = SAMPLES_PER_CHUNK.min(count - start);
            let mut rng = StdRng::seed_from_u64(derive_chunk_seed(99, index as u64));
            reference.extend(driver.run_batch(None, len, &mut rng).unwrap());
        }

        assert_eq!(samples.len(), count);
        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&samples), bits(&reference));
    }

    #[test]
    fn run_seeded_is_reproducible_and_seed_sensitive() {
        let db = branching_scheme();
        let generator = CascadeGenerator::new(&db, 1e-10);
        let driver = MonteCarloDriver::new(&generator);
        let reporter = ProgressReporter::new();
        let a = driver.run_seeded(None, 5_000, 7, &reporter).unwrap();
        let b = driver.run_seeded(None, 5_000, 7, &reporter).unwrap();
        let c = driver.run_seeded(None, 5_000, 8, &reporter).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn run_seeded_reports_every_cascade() {
        let db = branching_scheme();
        let generator = CascadeGenerator::new(&db, 1e-10);
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|p| {
            events.lock().unwrap().push(p);
        }));
        let count = SAMPLES_PER_CHUNK + 1;
        MonteCarloDriver::new(&generator)
            .run_seeded(None, count, 3, &reporter)
            .unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        assert_eq!(
            events.first(),
            Some(&Progress::BatchStart {
                total_cascades: count as u64
            })
        );
        assert_eq!(events.last(), Some(&Progress::BatchFinish));
        let completed: u64 = events
            .iter()
            .filter_map(|p| match p {
                Progress::CascadesCompleted(n) => Some(*n),
                _ => None,
            })
            .sum();
        assert_eq!(completed, count as u64);
    }

    #[test]
    fn run_seeded_fails_before_reporting_for_unknown_start() {
        let db = branching_scheme();
        let generator = CascadeGenerator::new(&db, 1e-10);
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|p| {
            events.lock().unwrap().push(p);
        }));
        let result = MonteCarloDriver::new(&generator).run_seeded(Some(1.0), 10, 3, &reporter);
        drop(reporter);
        assert!(result.is_err());
        assert!(events.into_inner().unwrap().is_empty());
    }

    #[test]
    fn run_seeded_propagates_cascade_errors() {
        let db = LevelDatabase::from_records(vec![
            LevelRecord::new(100.0, 1e-12, vec![100.0], vec![1.0]).unwrap(),
        ])
        .unwrap();
        let generator = CascadeGenerator::new(&db, 1e-10).with_max_steps(10);
        assert!(matches!(
            MonteCarloDriver::new(&generator).run_seeded(None, 100, 1, &ProgressReporter::new()),
            Err(EngineError::CascadeTooLong { max_steps: 10, .. })
        ));
    }

    #[test]
    fn chunk_seeds_are_distinct() {
        let seeds: std::collections::HashSet<u64> =
            (0..1_000).map(|i| derive_chunk_seed(12345, i)).collect();
        assert_eq!(seeds.len(), 1_000);
        assert_eq!(derive_chunk_seed(12345, 0), 12345);
    }
}
