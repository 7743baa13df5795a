//! Sweep recording input.
//!
//! A recording is a text file of `index, channelA, channelB` records preceded by a
//! few header lines. Channel A is the voltage across the reference resistor,
//! channel B the voltage across resistor and device together. The file is parsed
//! once into memory; batches then borrow overlapping ranges of it.

use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;
use std::fs::File;
use std::io::{BufReader, Read};
use std::ops::Range;
use std::path::Path;
use crate::error::{SweepError, SweepResult};
use crate::traits::SampleSource;

/// One record of the recording.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    /// Voltage across the reference resistor
    pub a: f64,
    /// Voltage across reference and device
    pub b: f64,
}

impl RawSample {
    pub fn new(a: f64, b: f64) -> Self {
        RawSample { a, b }
    }
}

/// Parse one `index, channelA, channelB` record. `line` is only used for error reporting.
pub fn parse_record(record: &StringRecord, line: usize) -> SweepResult<RawSample> {
    let (a, b) = match (record.get(1), record.get(2)) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(SweepError::Parse {
                line,
                reason: format!("expected 3 comma-separated fields, got {}", record.len()),
            })
        }
    };

    Ok(RawSample::new(parse_channel(a, "A", line)?, parse_channel(b, "B", line)?))
}

fn parse_channel(field: &str, channel: &str, line: usize) -> SweepResult<f64> {
    let trimmed = field.trim();
    let value: f64 = trimmed.parse().map_err(|_| SweepError::Parse {
        line,
        reason: format!("channel {} value {:?} is not a number", channel, trimmed),
    })?;
    if !value.is_finite() {
        return Err(SweepError::Parse {
            line,
            reason: format!("channel {} value {:?} is not finite", channel, trimmed),
        });
    }
    Ok(value)
}

/// Whole recording held in memory.
#[derive(Debug, Clone, Default)]
pub struct SampleStore {
    samples: Vec<RawSample>,
}

impl SampleStore {
    pub fn from_samples(samples: Vec<RawSample>) -> Self {
        SampleStore { samples }
    }

    /// Read every record after `header_lines`. Any malformed record aborts the read:
    /// dropping a sample would shift the timing of every later cycle.
    pub fn from_reader<R: Read>(reader: R, header_lines: usize) -> SweepResult<Self> {
        // Header lines can have any shape, so records are not length-checked and
        // quotes are plain characters.
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .trim(Trim::All)
            .from_reader(reader);

        let mut samples = Vec::new();
        for (i, record) in reader.records().enumerate().skip(header_lines) {
            let record = record?;
            let line = record.position().map(|p| p.line() as usize).unwrap_or(i + 1);
            samples.push(parse_record(&record, line)?);
        }
        debug!("Parsed {} samples ({} header lines skipped)", samples.len(), header_lines);
        Ok(SampleStore { samples })
    }

    pub fn open(path: &Path, header_lines: usize) -> SweepResult<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), header_lines)
    }

    pub fn samples(&self) -> &[RawSample] {
        &self.samples
    }
}

impl SampleSource for SampleStore {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn slice(&self, range: Range<usize>) -> &[RawSample] {
        &self.samples[range]
    }
}
