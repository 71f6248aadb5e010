use super::config::ConfigError;
use super::utils::sampling::SamplingError;
use crate::core::models::database::DatabaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Unknown level references and empty databases.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Cascade reached level {energy} keV, which has no outgoing transitions")]
    NoOutgoingTransition { energy: f64 },

    #[error(
        "Cascade starting at {start_energy} keV did not reach a long-lived level within {max_steps} steps"
    )]
    CascadeTooLong { start_energy: f64, max_steps: usize },

    #[error("Isotropic direction sampling produced {attempts} consecutive degenerate draws")]
    DegenerateDirectionSample { attempts: usize },

    #[error("Branching selection failed at level {energy} keV: {source}")]
    Sampling {
        energy: f64,
        #[source]
        source: SamplingError,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
