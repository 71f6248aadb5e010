use crate::cli::SimulateArgs;
use crate::config::build_config;
use crate::error::{CliError, Result};
use crate::report::{self, Histogram};
use crate::utils::progress::CliProgressHandler;
use gamma_cascade::{
    core::{io::sources::load_database, models::database::DuplicatePolicy},
    engine::progress::ProgressReporter,
    workflows,
};
use tracing::info;

pub async fn run(args: SimulateArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app = build_config(&args)?;
    if app.seed_generated {
        info!(
            "No seed configured; drawing seed {} for this run.",
            app.simulation.seed
        );
        println!(
            "Using random seed {} (pass --seed {} to reproduce).",
            app.simulation.seed, app.simulation.seed
        );
    }

    info!("Loading level scheme from {:?}", &app.level_sources);
    let database = load_database(&app.level_sources, DuplicatePolicy::Replace)?;

    if args.strict {
        let scheme_report = database.validate(app.simulation.half_life_threshold);
        if !scheme_report.is_clean() {
            return Err(CliError::Validation(scheme_report.to_string()));
        }
    }

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Simulating {} cascade(s) over {} level(s)...",
        app.simulation.sample_count,
        database.len()
    );
    let result = tokio::task::block_in_place(|| {
        workflows::simulate::run(&database, &app.simulation, &reporter)
    })?;

    let summary = &result.summary;
    println!(
        "✓ Start level {} keV, seed {}: mean recoil energy {:.4} keV (std dev {:.4}, min {:.4}, max {:.4}) over {} cascade(s).",
        result.start_energy,
        result.seed,
        summary.mean,
        summary.std_dev,
        summary.min,
        summary.max,
        summary.count
    );

    if let Some(path) = &args.output {
        report::write_samples_csv(path, &result.samples)?;
        println!("  Samples written to: {}", path.display());
    }

    if let Some(path) = &args.histogram {
        let histogram = Histogram::from_samples(&result.samples, &app.histogram);
        report::write_histogram_csv(path, &histogram)?;
        println!("  Histogram written to: {}", path.display());
    }

    Ok(())
}
