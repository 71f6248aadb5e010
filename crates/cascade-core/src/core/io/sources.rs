use crate::core::io::dat::{DatError, DatFile};
use crate::core::io::scheme::{SchemeError, SchemeFile};
use crate::core::io::traits::LevelFile;
use crate::core::models::database::{
    DatabaseError, DuplicatePolicy, LevelDatabase, LevelDatabaseBuilder,
};
use crate::core::models::level::LevelRecord;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to read level file '{path}': {source}")]
    Dat { path: String, source: DatError },
    #[error("Failed to read level scheme '{path}': {source}")]
    Scheme { path: String, source: SchemeError },
    #[error("Unsupported level source '{0}' (expected a directory, .dat or .toml file)")]
    UnsupportedSource(String),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Dat,
    Scheme,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "dat" => Some(Self::Dat),
            "toml" => Some(Self::Scheme),
            _ => None,
        }
    }
}

/// Expands the given sources into the level files they name.
///
/// Files are kept as given. Directories contribute their `.dat` and `.toml`
/// entries (not recursively), sorted by file name so that duplicate resolution does
/// not depend on directory iteration order.
pub fn discover_level_files<P: AsRef<Path>>(sources: &[P]) -> Result<Vec<PathBuf>, SourceError> {
    let mut files = Vec::new();
    for source in sources {
        let source = source.as_ref();
        if source.is_dir() {
            let io_err = |e| SourceError::Io {
                path: source.to_string_lossy().to_string(),
                source: e,
            };
            let mut entries = Vec::new();
            for entry in std::fs::read_dir(source).map_err(io_err)? {
                let path = entry.map_err(io_err)?.path();
                if path.is_file() && SourceFormat::from_path(&path).is_some() {
                    entries.push(path);
                }
            }
            entries.sort();
            debug!(
                "Found {} level file(s) in directory {:?}",
                entries.len(),
                source
            );
            files.extend(entries);
        } else if SourceFormat::from_path(source).is_some() {
            files.push(source.to_path_buf());
        } else {
            return Err(SourceError::UnsupportedSource(
                source.to_string_lossy().to_string(),
            ));
        }
    }
    Ok(files)
}

pub fn read_level_file(path: &Path) -> Result<Vec<LevelRecord>, SourceError> {
    let path_str = || path.to_string_lossy().to_string();
    match SourceFormat::from_path(path) {
        Some(SourceFormat::Dat) => DatFile::read_from_path(path).map_err(|source| match source {
            DatError::Io(e) => SourceError::Io {
                path: path_str(),
                source: e,
            },
            other => SourceError::Dat {
                path: path_str(),
                source: other,
            },
        }),
        Some(SourceFormat::Scheme) => {
            SchemeFile::read_from_path(path).map_err(|source| SourceError::Scheme {
                path: path_str(),
                source,
            })
        }
        None => Err(SourceError::UnsupportedSource(path_str())),
    }
}

/// Builds a [`LevelDatabase`] from an explicit list of files and directories.
#[instrument(skip_all, name = "load_level_database")]
pub fn load_database<P: AsRef<Path>>(
    sources: &[P],
    policy: DuplicatePolicy,
) -> Result<LevelDatabase, SourceError> {
    let files = discover_level_files(sources)?;
    let mut builder = LevelDatabaseBuilder::new().duplicate_policy(policy);
    for file in &files {
        let records = read_level_file(file)?;
        debug!("Read {} level(s) from {:?}", records.len(), file);
        builder = builder.extend(records);
    }
    let database = builder.build()?;
    info!(
        "Loaded {} level(s) from {} file(s).",
        database.len(),
        files.len()
    );
    Ok(database)
}
