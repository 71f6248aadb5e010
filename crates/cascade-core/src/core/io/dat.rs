use crate::core::io::traits::LevelFile;
use crate::core::models::level::{LevelError, LevelRecord};
use itertools::Itertools;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: DatParseErrorKind },
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
    #[error("Invalid level record: {0}")]
    Level(#[from] LevelError),
    #[error("The .dat format holds exactly one level per file, got {0}")]
    RecordCount(usize),
}

#[derive(Debug, Error)]
pub enum DatParseErrorKind {
    #[error("Invalid number for '{field}' (value: '{value}')")]
    InvalidNumber { field: &'static str, value: String },
    #[error("List for '{field}' must be enclosed in square brackets (value: '{value}')")]
    UnbracketedList { field: &'static str, value: String },
}

/// Reader and writer for single-level `.dat` files:
///
/// ```text
/// level: 6098.9
/// t12: 1e-15
/// transitions: [1354.0, 167.3]
/// branching: [0.6, 0.4]
/// ```
///
/// All whitespace is stripped before parsing and keys are case-insensitive. Lines
/// that do not split into exactly one `key:value` pair, and unknown keys, are
/// ignored.
pub struct DatFile;

fn parse_number(value: &str, field: &'static str, line: usize) -> Result<f64, DatError> {
    value.parse().map_err(|_| DatError::Parse {
        line,
        kind: DatParseErrorKind::InvalidNumber {
            field,
            value: value.to_string(),
        },
    })
}

fn parse_list(value: &str, field: &'static str, line: usize) -> Result<Vec<f64>, DatError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or_else(|| DatError::Parse {
            line,
            kind: DatParseErrorKind::UnbracketedList {
                field,
                value: value.to_string(),
            },
        })?;
    if inner.is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(',')
        .map(|item| parse_number(item, field, line))
        .collect()
}

impl DatFile {
    pub fn read_record(reader: &mut impl BufRead) -> Result<LevelRecord, DatError> {
        let mut energy = None;
        let mut half_life = None;
        let mut transitions = Vec::new();
        let mut branching = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();

            let Some((key, value)) = compact.split(':').collect_tuple() else {
                continue;
            };

            match key.to_ascii_lowercase().as_str() {
                "level" => energy = Some(parse_number(value, "level", line_num)?),
                "t12" => half_life = Some(parse_number(value, "t12", line_num)?),
                "transitions" => transitions = parse_list(value, "transitions", line_num)?,
                "branching" => branching = parse_list(value, "branching", line_num)?,
                _ => {}
            }
        }

        let energy = energy.ok_or(DatError::MissingField("level"))?;
        let half_life = half_life.ok_or(DatError::MissingField("t12"))?;
        Ok(LevelRecord::new(energy, half_life, transitions, branching)?)
    }

    fn format_list(values: &[f64]) -> String {
        format!("[{}]", values.iter().join(", "))
    }
}

impl LevelFile for DatFile {
    type Error = DatError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<LevelRecord>, Self::Error> {
        Self::read_record(reader).map(|record| vec![record])
    }

    fn write_to(records: &[LevelRecord], writer: &mut impl Write) -> Result<(), Self::Error> {
        let [record] = records else {
            return Err(DatError::RecordCount(records.len()));
        };
        writeln!(writer, "level: {}", record.energy())?;
        writeln!(writer, "t12: {:e}", record.half_life())?;
        writeln!(
            writer,
            "transitions: {}",
            Self::format_list(record.transitions())
        )?;
        writeln!(writer, "branching: {}", Self::format_list(record.branching()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(content: &str) -> Result<LevelRecord, DatError> {
        DatFile::read_record(&mut Cursor::new(content))
    }

    #[test]
    fn reads_well_formed_level() {
        let record = parse(
            "level: 6098.9\nt12: 1e-15\ntransitions: [1354.0, 167.3]\nbranching: [0.6, 0.4]\n",
        )
        .unwrap();
        assert_eq!(record.energy(), 6098.9);
        assert_eq!(record.half_life(), 1e-15);
        assert_eq!(record.transitions(), &[1354.0, 167.3]);
        assert_eq!(record.branching(), &[0.6, 0.4]);
    }

    #[test]
    fn keys_are_case_insensitive_and_whitespace_is_ignored() {
        let record = parse("LEVEL : 1 354 .0\nT12:  2e-13 \nTransitions:[ 0 ]\nBRANCHING : [1]\n")
            .unwrap();
        assert_eq!(record.energy(), 1354.0);
        assert_eq!(record.half_life(), 2e-13);
        assert_eq!(record.transitions(), &[0.0]);
    }

    #[test]
    fn ground_state_accepts_empty_lists_and_infinite_half_life() {
        let record = parse("level: 0\nt12: inf\ntransitions: []\nbranching: []\n").unwrap();
        assert!(record.is_terminal_ground());
        assert_eq!(record.half_life(), f64::INFINITY);
    }

    #[test]
    fn malformed_lines_and_unknown_keys_are_skipped() {
        let record = parse(
            "# Ar-41 capture state\nlevel: 100\nnote: a:b\nsource: ENSDF\nt12: 1e-12\ntransitions: [0]\nbranching: [1]\n",
        )
        .unwrap();
        assert_eq!(record.energy(), 100.0);
    }

    #[test]
    fn missing_level_or_half_life_is_reported() {
        assert!(matches!(
            parse("t12: 1\ntransitions: []\nbranching: []\n"),
            Err(DatError::MissingField("level"))
        ));
        assert!(matches!(
            parse("level: 1\ntransitions: []\nbranching: []\n"),
            Err(DatError::MissingField("t12"))
        ));
    }

    #[test]
    fn invalid_numbers_report_their_line() {
        let err = parse("level: 100\nt12: 1e-12\ntransitions: [0, abc]\nbranching: [1, 1]\n")
            .unwrap_err();
        assert!(matches!(
            err,
            DatError::Parse {
                line: 3,
                kind: DatParseErrorKind::InvalidNumber {
                    field: "transitions",
                    ..
                }
            }
        ));
    }

    #[test]
    fn unbracketed_list_is_rejected() {
        let err = parse("level: 100\nt12: 1e-12\ntransitions: 0\nbranching: [1]\n").unwrap_err();
        assert!(matches!(
            err,
            DatError::Parse {
                kind: DatParseErrorKind::UnbracketedList { .. },
                ..
            }
        ));
    }

    #[test]
    fn mismatched_lists_fail_at_read_time() {
        let err = parse("level: 100\nt12: 1e-12\ntransitions: [0, 50]\nbranching: [1]\n")
            .unwrap_err();
        assert!(matches!(
            err,
            DatError::Level(LevelError::BranchingMismatch { .. })
        ));
    }

    #[test]
    fn written_file_reads_back_identically() {
        let record = LevelRecord::new(6098.9, 1.5e-15, vec![1354.0, 167.3], vec![0.6, 0.4]).unwrap();
        let mut buffer = Vec::new();
        DatFile::write_to(std::slice::from_ref(&record), &mut buffer).unwrap();

        let records = DatFile::read_from(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(records, vec![record]);
    }

    #[test]
    fn writing_more_than_one_record_is_rejected() {
        let records = vec![
            LevelRecord::stable(0.0).unwrap(),
            LevelRecord::stable(1.0).unwrap(),
        ];
        assert!(matches!(
            DatFile::write_to(&records, &mut Vec::new()),
            Err(DatError::RecordCount(2))
        ));
    }
}
