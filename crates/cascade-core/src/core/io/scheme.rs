use crate::core::io::traits::LevelFile;
use crate::core::models::level::{LevelError, LevelRecord};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Read, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid level record: {0}")]
    Level(#[from] LevelError),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct SchemeLevel {
    energy: f64,
    /// Omitted for stable levels, which read back as infinitely long-lived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    half_life: Option<f64>,
    #[serde(default)]
    transitions: Vec<f64>,
    #[serde(default)]
    branching: Vec<f64>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields)]
struct SchemeDocument {
    #[serde(default, rename = "level")]
    levels: Vec<SchemeLevel>,
}

/// A whole level scheme in one TOML document:
///
/// ```toml
/// [[level]]
/// energy = 6098.9
/// half-life = 1e-15
/// transitions = [1354.0, 167.3]
/// branching = [0.6, 0.4]
///
/// [[level]]
/// energy = 0.0
/// ```
pub struct SchemeFile;

impl LevelFile for SchemeFile {
    type Error = SchemeError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<LevelRecord>, Self::Error> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        let document: SchemeDocument = toml::from_str(&content)?;

        document
            .levels
            .into_iter()
            .map(|l| {
                LevelRecord::new(
                    l.energy,
                    l.half_life.unwrap_or(f64::INFINITY),
                    l.transitions,
                    l.branching,
                )
                .map_err(SchemeError::from)
            })
            .collect()
    }

    fn write_to(records: &[LevelRecord], writer: &mut impl Write) -> Result<(), Self::Error> {
        let document = SchemeDocument {
            levels: records
                .iter()
                .map(|r| SchemeLevel {
                    energy: r.energy(),
                    half_life: r.half_life().is_finite().then_some(r.half_life()),
                    transitions: r.transitions().to_vec(),
                    branching: r.branching().to_vec(),
                })
                .collect(),
        };
        writer.write_all(toml::to_string(&document)?.as_bytes())?;
        Ok(())
    }
}
