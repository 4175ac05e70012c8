/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Measurement log: one `value,timestamp_ns` record per line, in buffer
//! order.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::OutputError;
use crate::measurement::{MeasurementBuffer, Sample};

/// Drain `buffer` into `path`, truncating any existing file.
///
/// Consumes the buffer; its storage is released once the file is flushed.
/// Returns the number of records written.
///
/// # Errors
/// [`OutputError::Open`] if the file cannot be created, [`OutputError::Write`]
/// if writing or flushing fails.
pub fn write_log(path: &Path, buffer: MeasurementBuffer) -> Result<usize, OutputError> {
    let file = File::create(path).map_err(|source| OutputError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let write_err = |source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut out = BufWriter::new(file);
    let samples = buffer.into_samples();
    for s in &samples {
        writeln!(out, "{},{}", s.value, s.timestamp_ns).map_err(write_err)?;
    }
    out.flush().map_err(write_err)?;

    info!(path = %path.display(), records = samples.len(), "measurement log written");
    Ok(samples.len())
}

/// Read a log produced by [`write_log`].
///
/// # Errors
/// [`OutputError::Open`] / [`OutputError::Write`] for I/O failures, and
/// [`OutputError::Malformed`] for a line that is not two unsigned integers.
pub fn read_log(path: &Path) -> Result<Vec<Sample>, OutputError> {
    let file = File::open(path).map_err(|source| OutputError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut samples = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| OutputError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let sample = parse_record(&line).ok_or_else(|| OutputError::Malformed {
            path: path.to_path_buf(),
            line: idx + 1,
            content: line.clone(),
        })?;
        samples.push(sample);
    }
    Ok(samples)
}

fn parse_record(line: &str) -> Option<Sample> {
    let (value, ts) = line.trim().split_once(',')?;
    Some(Sample {
        value: value.trim().parse().ok()?,
        timestamp_ns: ts.trim().parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn filled(samples: &[(u64, u64)]) -> MeasurementBuffer {
        let mut buf = MeasurementBuffer::with_capacity(samples.len()).unwrap();
        for &(value, timestamp_ns) in samples {
            buf.push(Sample { value, timestamp_ns });
        }
        buf
    }

    #[test]
    fn writes_one_line_per_sample_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("publish.csv");
        let n = write_log(&path, filled(&[(1, 1_000_000), (2, 2_000_000), (3, 3_000_123)])).unwrap();

        assert_eq!(n, 3);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "1,1000000\n2,2000000\n3,3000123\n");
    }

    #[test]
    fn empty_buffer_creates_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subscribe.csv");
        write_log(&path, MeasurementBuffer::with_capacity(0).unwrap()).unwrap();
        assert!(path.exists());
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn existing_file_is_truncated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("publish.csv");
        std::fs::write(&path, "stale\nstale\nstale\n").unwrap();
        write_log(&path, filled(&[(9, 9)])).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "9,9\n");
    }

    #[test]
    fn unopenable_destination_is_an_open_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("publish.csv");
        let err = write_log(&path, filled(&[(1, 1)])).unwrap_err();
        assert!(matches!(err, OutputError::Open { .. }));
    }

    #[test]
    fn read_back_parses_every_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("publish.csv");
        write_log(&path, filled(&[(u64::MAX, 0), (7, u64::MAX)])).unwrap();

        let samples = read_log(&path).unwrap();
        assert_eq!(
            samples,
            vec![
                Sample { value: u64::MAX, timestamp_ns: 0 },
                Sample { value: 7, timestamp_ns: u64::MAX },
            ]
        );
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "1,100\n2;200\n").unwrap();
        match read_log(&path).unwrap_err() {
            OutputError::Malformed { line, content, .. } => {
                assert_eq!(line, 2);
                assert_eq!(content, "2;200");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_values_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("neg.csv");
        std::fs::write(&path, "-1,100\n").unwrap();
        assert!(read_log(&path).is_err());
    }
}
