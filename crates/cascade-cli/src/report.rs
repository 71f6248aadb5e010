use crate::config::HistogramConfig;
use crate::error::{CliError, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Serialize)]
struct SampleRow {
    index: usize,
    recoil_energy_kev: f64,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct HistogramBin {
    pub lower_kev: f64,
    pub upper_kev: f64,
    pub count: u64,
    pub density: f64,
}

/// Fixed-width histogram over `[0, max_energy)`, normalized as a probability density.
#[derive(Debug, Clone)]
pub struct Histogram {
    bin_width: f64,
    max_energy: f64,
    counts: Vec<u64>,
    in_range: u64,
    out_of_range: u64,
}

impl Histogram {
    pub fn from_samples(samples: &[f64], config: &HistogramConfig) -> Self {
        let bins = config.bin_count() as usize;
        let mut counts = vec![0u64; bins];
        let mut out_of_range = 0u64;
        for &sample in samples {
            let index = (sample / config.bin_width).floor();
            if sample < 0.0 || sample >= config.max_energy || index as usize >= bins {
                out_of_range += 1;
            } else {
                counts[index as usize] += 1;
            }
        }
        let in_range = samples.len() as u64 - out_of_range;
        Self {
            bin_width: config.bin_width,
            max_energy: config.max_energy,
            counts,
            in_range,
            out_of_range,
        }
    }

    pub fn out_of_range(&self) -> u64 {
        self.out_of_range
    }

    /// The last bin ends at `max_energy`. Densities use each bin's own width, so
    /// `sum(density * (upper - lower)) == 1` whenever any sample fell in range.
    pub fn bins(&self) -> impl Iterator<Item = HistogramBin> + '_ {
        let in_range = self.in_range as f64;
        self.counts.iter().enumerate().map(move |(i, &count)| {
            let lower_kev = i as f64 * self.bin_width;
            let upper_kev = ((i + 1) as f64 * self.bin_width).min(self.max_energy);
            let norm = in_range * (upper_kev - lower_kev);
            HistogramBin {
                lower_kev,
                upper_kev,
                count,
                density: if norm > 0.0 { count as f64 / norm } else { 0.0 },
            }
        })
    }
}

fn csv_error(path: &Path, e: csv::Error) -> CliError {
    CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    }
}

pub fn write_samples_csv(path: &Path, samples: &[f64]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    for (index, &recoil_energy_kev) in samples.iter().enumerate() {
        writer
            .serialize(SampleRow {
                index,
                recoil_energy_kev,
            })
            .map_err(|e| csv_error(path, e))?;
    }
    writer.flush()?;
    debug!("Wrote {} sample(s) to {:?}", samples.len(), path);
    Ok(())
}

pub fn write_histogram_csv(path: &Path, histogram: &Histogram) -> Result<()> {
    if histogram.out_of_range() > 0 {
        warn!(
            "{} sample(s) fell outside the histogram range and were not binned.",
            histogram.out_of_range()
        );
    }
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    for bin in histogram.bins() {
        writer.serialize(bin).map_err(|e| csv_error(path, e))?;
    }
    writer.flush()?;
    Ok(())
}
