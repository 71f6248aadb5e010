use rand::{distributions::WeightedIndex, prelude::*};
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SamplingError {
    #[error("Weight list is empty, cannot perform sampling")]
    EmptyWeights,
    #[error("All branching weights are zero, resulting in zero total weight for sampling")]
    ZeroTotalWeight,
    #[error("Failed to create weighted distribution: {source}")]
    DistributionError {
        #[from]
        source: rand::distributions::WeightedError,
    },
}

/// Picks an index with probability `weights[i] / sum(weights)`.
///
/// Weights are relative and need not be normalized. A single candidate is returned
/// without consuming randomness.
#[instrument(level = "trace", skip_all, fields(candidates = weights.len()))]
pub fn weighted_choice(weights: &[f64], rng: &mut impl Rng) -> Result<usize, SamplingError> {
    match weights {
        [] => Err(SamplingError::EmptyWeights),
        [only] if *only > 0.0 => Ok(0),
        _ => {
            let dist = WeightedIndex::new(weights).map_err(|e| match e {
                rand::distributions::WeightedError::AllWeightsZero => SamplingError::ZeroTotalWeight,
                other => SamplingError::from(other),
            })?;
            Ok(dist.sample(rng))
        }
    }
}
