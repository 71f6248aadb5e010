use crate::core::models::level::LevelRecord;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing level-record file formats.
///
/// A single file may describe one level (the `.dat` format) or a whole scheme, so
/// both directions work on slices of [`LevelRecord`]s.
pub trait LevelFile {
    /// The error type for I/O and parse failures.
    type Error: Error + From<io::Error>;

    /// Reads every level record contained in the input.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails, a record violates the level invariants, or
    /// the reader fails.
    fn read_from(reader: &mut impl BufRead) -> Result<Vec<LevelRecord>, Self::Error>;

    /// Writes the given records in this format.
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be represented in this format or the
    /// writer fails.
    fn write_to(records: &[LevelRecord], writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads every level record from a file path.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<LevelRecord>, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes records to a file path, creating or truncating it.
    fn write_to_path<P: AsRef<Path>>(
        records: &[LevelRecord],
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(records, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
