// src/input.rs
//! Line-oriented record source
//!
//! The first line is the genesis payload; every further line becomes one
//! more block, in order.

use crate::utils::error::MinerError;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Reads one record per line, stripping a trailing `\r`.
///
/// Fails with [`MinerError::InputError`] when there is no line at all, since
/// the genesis block needs a payload.
pub fn read_records(reader: impl BufRead) -> Result<Vec<String>, MinerError> {
    let records = reader
        .lines()
        .map(|line| line.map(|l| l.trim_end_matches('\r').to_string()))
        .collect::<Result<Vec<_>, _>>()?;

    if records.is_empty() {
        return Err(MinerError::InputError(
            "no records: the first line supplies the genesis block".into(),
        ));
    }
    Ok(records)
}

/// Reads records from `path`, or from standard input when no path is given.
pub fn open(path: Option<&Path>) -> Result<Vec<String>, MinerError> {
    match path {
        Some(path) => {
            let file = File::open(path).map_err(|e| {
                MinerError::InputError(format!("Failed to open {}: {}", path.display(), e))
            })?;
            read_records(BufReader::new(file))
        }
        None => read_records(io::stdin().lock()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn one_record_per_line() {
        let records = read_records(Cursor::new("genesis\na\r\nb")).unwrap();
        assert_eq!(records, ["genesis", "a", "b"]);
    }

    #[test]
    fn blank_lines_are_records() {
        let records = read_records(Cursor::new("genesis\n\nc\n")).unwrap();
        assert_eq!(records, ["genesis", "", "c"]);
    }

    #[test]
    fn empty_input_has_no_genesis() {
        assert!(matches!(
            read_records(Cursor::new("")),
            Err(MinerError::InputError(_))
        ));
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let path = Path::new("/nonexistent/records.txt");
        assert!(matches!(open(Some(path)), Err(MinerError::InputError(_))));
    }
}
