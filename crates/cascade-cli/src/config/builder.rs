use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileSimulationConfig};
use super::models::{AppConfig, HistogramConfig, MAX_HISTOGRAM_BINS};
use crate::cli::SimulateArgs;
use crate::error::{CliError, Result};
use gamma_cascade::engine::config::SimulationConfigBuilder;
use std::str::FromStr;

pub fn build_config(args: &SimulateArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let file_config = apply_set_values(file_config, &args.set_values)?;
    let sim_file = file_config.simulation.unwrap_or_default();
    let hist_file = file_config.histogram.unwrap_or_default();

    let level_sources = if args.levels.is_empty() {
        file_config.levels.unwrap_or_default()
    } else {
        args.levels.clone()
    };
    if level_sources.is_empty() {
        return Err(CliError::Config(
            "No level sources given. Pass --levels or set `levels` in the config file."
                .to_string(),
        ));
    }

    let configured_seed = args.seed.or(sim_file.seed);
    let seed = configured_seed.unwrap_or_else(rand::random::<u64>);

    let simulation = SimulationConfigBuilder::new()
        .start_energy(args.start_energy.or(sim_file.start_energy))
        .half_life_threshold(
            args.half_life_threshold
                .or(sim_file.half_life_threshold)
                .unwrap_or(defaults.half_life_threshold),
        )
        .sample_count(args.samples.or(sim_file.samples).unwrap_or(defaults.samples))
        .max_cascade_steps(
            args.max_steps
                .or(sim_file.max_cascade_steps)
                .unwrap_or(defaults.max_cascade_steps),
        )
        .seed(seed)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let histogram = HistogramConfig {
        bin_width: args
            .bin_width
            .or(hist_file.bin_width)
            .unwrap_or(defaults.bin_width),
        max_energy: args
            .max_energy
            .or(hist_file.max_energy)
            .unwrap_or(defaults.max_energy),
    };
    validate_histogram(&histogram)?;

    Ok(AppConfig {
        level_sources,
        simulation,
        histogram,
        seed_generated: configured_seed.is_none(),
    })
}

fn validate_histogram(histogram: &HistogramConfig) -> Result<()> {
    if !(histogram.bin_width.is_finite() && histogram.bin_width > 0.0) {
        return Err(CliError::Config(format!(
            "`histogram.bin-width` must be a positive number, got {}",
            histogram.bin_width
        )));
    }
    if !(histogram.max_energy.is_finite() && histogram.max_energy > 0.0) {
        return Err(CliError::Config(format!(
            "`histogram.max-energy` must be a positive number, got {}",
            histogram.max_energy
        )));
    }
    if histogram.bin_count() > MAX_HISTOGRAM_BINS as f64 {
        return Err(CliError::Config(format!(
            "Histogram would need {} bins (max-energy {} / bin-width {}); at most {} are allowed",
            histogram.bin_count(),
            histogram.max_energy,
            histogram.bin_width,
            MAX_HISTOGRAM_BINS
        )));
    }
    Ok(())
}

fn parse_value<T: FromStr>(key: &str, value_str: &str, kind: &str) -> Result<T> {
    value_str.parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value_str))
    })
}

fn simulation(config: &mut FileConfig) -> &mut FileSimulationConfig {
    config.simulation.get_or_insert_with(Default::default)
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "simulation.start-energy" => {
                let value = parse_value(key, value_str, "float")?;
                simulation(&mut config).start_energy = Some(value);
            }
            "simulation.half-life-threshold" => {
                let value = parse_value(key, value_str, "float")?;
                simulation(&mut config).half_life_threshold = Some(value);
            }
            "simulation.samples" => {
                let value = parse_value(key, value_str, "integer")?;
                simulation(&mut config).samples = Some(value);
            }
            "simulation.max-cascade-steps" => {
                let value = parse_value(key, value_str, "integer")?;
                simulation(&mut config).max_cascade_steps = Some(value);
            }
            "simulation.seed" => {
                let value = parse_value(key, value_str, "integer")?;
                simulation(&mut config).seed = Some(value);
            }
            "histogram.bin-width" => {
                config
                    .histogram
                    .get_or_insert_with(Default::default)
                    .bin_width = Some(parse_value(key, value_str, "float")?);
            }
            "histogram.max-energy" => {
                config
                    .histogram
                    .get_or_insert_with(Default::default)
                    .max_energy = Some(parse_value(key, value_str, "float")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
