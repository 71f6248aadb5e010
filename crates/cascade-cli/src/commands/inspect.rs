use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use gamma_cascade::core::io::scheme::SchemeFile;
use gamma_cascade::core::io::sources::load_database;
use gamma_cascade::core::io::traits::LevelFile;
use gamma_cascade::core::models::database::{DuplicatePolicy, LevelDatabase};
use gamma_cascade::core::models::level::LevelRecord;
use gamma_cascade::engine::config::DEFAULT_HALF_LIFE_THRESHOLD;
use itertools::Itertools;
use tracing::info;

fn describe_level(level: &LevelRecord, threshold: f64) -> String {
    let kind = if level.is_short_lived(threshold) {
        "prompt"
    } else {
        "stops"
    };
    let branches = level
        .outgoing()
        .map(|(to, weight)| format!("{} ({})", to, weight))
        .join(", ");
    format!(
        "{:>12.3} keV  t1/2 = {:<10e} s  [{}]  -> {}",
        level.energy(),
        level.half_life(),
        kind,
        if branches.is_empty() { "-" } else { &branches }
    )
}

fn render(database: &LevelDatabase, threshold: f64) -> String {
    let mut lines = vec![format!("{} level(s) loaded.", database.len())];
    lines.extend(database.iter().rev().map(|l| describe_level(l, threshold)));
    if !database.duplicates().is_empty() {
        lines.push(format!(
            "Replaced duplicate level(s): {}",
            database.duplicates().iter().join(", ")
        ));
    }
    lines.push(database.validate(threshold).to_string());
    lines.join("\n")
}

pub async fn run(args: InspectArgs) -> Result<()> {
    let threshold = args
        .half_life_threshold
        .unwrap_or(DEFAULT_HALF_LIFE_THRESHOLD);
    let database = load_database(&args.levels, DuplicatePolicy::Replace)?;
    println!("{}", render(&database, threshold));

    if let Some(path) = &args.export {
        let records: Vec<LevelRecord> = database.iter().cloned().collect();
        SchemeFile::write_to_path(&records, path).map_err(|e| CliError::FileParsing {
            path: path.clone(),
            source: e.into(),
        })?;
        info!("Exported {} level(s) to {:?}", records.len(), path);
        println!("✓ Level scheme exported to: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamma_cascade::core::io::dat::DatFile;
    use tempfile::tempdir;

    fn sample_database() -> LevelDatabase {
        LevelDatabase::from_records(vec![
            LevelRecord::new(300.0, 1e-12, vec![100.0, 0.0], vec![0.25, 0.75]).unwrap(),
            LevelRecord::new(100.0, 2.0, vec![0.0], vec![1.0]).unwrap(),
            LevelRecord::stable(0.0).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn render_lists_levels_from_highest_and_reports_health() {
        let text = render(&sample_database(), 1e-10);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "3 level(s) loaded.");
        assert!(lines[1].contains("300.000 keV"));
        assert!(lines[1].contains("[prompt]"));
        assert!(lines[1].contains("100 (0.25), 0 (0.75)"));
        assert!(lines[2].contains("[stops]"));
        assert!(lines[3].ends_with("-> -"));
        assert_eq!(*lines.last().unwrap(), "level scheme is consistent");
    }

    #[tokio::test]
    async fn export_merges_dat_files_into_one_scheme() {
        let dir = tempdir().unwrap();
        DatFile::write_to_path(
            &[LevelRecord::new(100.0, 1e-12, vec![0.0], vec![1.0]).unwrap()],
            dir.path().join("a.dat"),
        )
        .unwrap();
        DatFile::write_to_path(
            &[LevelRecord::stable(0.0).unwrap()],
            dir.path().join("b.dat"),
        )
        .unwrap();
        let export = dir.path().join("out").with_extension("toml");

        run(InspectArgs {
            levels: vec![dir.path().to_path_buf()],
            half_life_threshold: None,
            export: Some(export.clone()),
        })
        .await
        .unwrap();

        let records = SchemeFile::read_from_path(&export).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].energy(), 100.0);
    }
}
