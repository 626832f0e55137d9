//! Pipe-delimited record format for ECG signal batches
//!
//! One signal per line, samples separated by `|`, no header row. The source
//! format carries a reserved sentinel column at the end of every line which
//! is not part of the signal; it is dropped on load.

use crate::error::{EcgError, EcgResult};
use crate::signal_batch::SignalBatch;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read a signal batch from pipe-delimited text.
///
/// Blank lines are skipped. The trailing sentinel column of each line is
/// dropped, so a line with `n` fields produces a row of `n - 1` samples.
pub fn read_signal_batch<R: BufRead>(reader: R) -> EcgResult<SignalBatch> {
    let mut rows = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| EcgError::FormatError {
            line: line_no,
            reason: e.to_string(),
        })?;

        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() < 2 {
            return Err(EcgError::FormatError {
                line: line_no,
                reason: "expected at least one sample and the sentinel column".to_string(),
            });
        }

        // Drop the reserved trailing column
        let mut row = Vec::with_capacity(fields.len() - 1);
        for field in &fields[..fields.len() - 1] {
            let value = field.trim().parse::<f64>().map_err(|_| EcgError::FormatError {
                line: line_no,
                reason: format!("'{}' is not a number", field.trim()),
            })?;
            row.push(value);
        }
        rows.push(row);
    }

    SignalBatch::from_rows(rows)
}

/// Load a signal batch from a pipe-delimited file on disk.
pub fn load_signal_batch<P: AsRef<Path>>(path: P) -> EcgResult<SignalBatch> {
    let file = File::open(path.as_ref()).map_err(|e| EcgError::FormatError {
        line: 0,
        reason: format!("cannot open '{}': {}", path.as_ref().display(), e),
    })?;
    read_signal_batch(BufReader::new(file))
}
