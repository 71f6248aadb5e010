mod builder;
mod defaults;
mod file;
mod models;

pub use builder::build_config;
pub use defaults::DefaultsConfig;
pub use models::{AppConfig, HistogramConfig, MAX_HISTOGRAM_BINS};
