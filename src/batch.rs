//! Logarithmic batch partitioning
//!
//! A sweep spans several decades, so the recording is split into equal line
//! ranges that each cover an equal slice of log-frequency. Batches exist for two
//! reasons: they can run in parallel, and each one can size its median filter
//! for the narrow band of frequencies it actually contains.
//!
//! Ranges overlap. Each batch starts one lowest-frequency cycle early and ends one
//! low plus one high frequency cycle late, so the cycles at a core boundary are
//! complete in at least one batch (the first and last cycle of every batch are
//! discarded later).

use log::debug;
use std::ops::Range;
use crate::config::SweepConfig;
use crate::error::{SweepError, SweepResult};
use crate::median;

/// Upper bound on the batch count, far beyond any real sweep.
pub const MAX_BATCHES: usize = 100_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub index: usize,
    /// Lines of the recording this batch reads, overlap included
    pub lines: Range<usize>,
    /// Lines this batch is responsible for, before overlap
    pub core: Range<usize>,
    pub min_frequency: f64,
    pub max_frequency: f64,
}

impl Batch {
    /// Shortest cycle expected in this batch, in samples.
    pub fn min_cycle_samples(&self, samples_per_second: f64) -> usize {
        (samples_per_second / self.max_frequency).round() as usize
    }

    /// Median filter length for this batch.
    pub fn filter_len(&self, samples_per_second: f64) -> usize {
        median::window_for_cycle(self.min_cycle_samples(samples_per_second))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Split `line_count` samples into overlapping log-frequency batches.
pub fn partition(line_count: usize, config: &SweepConfig) -> SweepResult<Vec<Batch>> {
    if !(config.max_frequency > config.min_frequency)
        || !(config.min_frequency > 0.0)
        || !config.max_frequency.is_finite()
    {
        return Err(SweepError::InvalidRange { min: config.min_frequency, max: config.max_frequency });
    }
    if !(config.samples_per_second.is_finite() && config.samples_per_second > 0.0) {
        return Err(SweepError::InvalidSetting {
            name: "samples_per_second",
            value: config.samples_per_second,
        });
    }
    if line_count == 0 {
        return Err(SweepError::EmptyInput);
    }

    let decades = config.decades();
    let wanted = (decades * config.batches_per_decade as f64).floor();
    if !(wanted <= MAX_BATCHES as f64) {
        return Err(SweepError::TooManyBatches { batches: wanted, limit: MAX_BATCHES });
    }
    let batch_count = wanted as usize;
    if batch_count == 0 {
        return Err(SweepError::NoBatches { decades, batches_per_decade: config.batches_per_decade });
    }

    let lines_per_batch = line_count / batch_count;
    let decades_per_batch = decades / batch_count as f64;
    let log_min = config.min_frequency.log10();

    debug!(
        "{} lines, {:.3} decades -> {} batches of {} lines ({:.3} decades each)",
        line_count, decades, batch_count, lines_per_batch, decades_per_batch
    );

    let mut batches = Vec::with_capacity(batch_count);
    for i in 0..batch_count {
        let min_frequency = 10f64.powf(decades_per_batch * i as f64 + log_min);
        let max_frequency = 10f64.powf(decades_per_batch * (i + 1) as f64 + log_min);
        let lead = (config.samples_per_second / min_frequency).round() as usize;
        let trail = (config.samples_per_second / max_frequency).round() as usize;

        let core_start = i * lines_per_batch;
        // The last batch also owns the division remainder.
        let core_end = if i + 1 == batch_count { line_count } else { core_start + lines_per_batch };

        let start = core_start.saturating_sub(lead);
        let end = (core_start + lines_per_batch)
            .saturating_add(lead)
            .saturating_add(trail)
            .max(core_end)
            .min(line_count);
        if start >= end {
            return Err(SweepError::EmptyBatch { index: i });
        }

        batches.push(Batch {
            index: i,
            lines: start..end,
            core: core_start..core_end,
            min_frequency,
            max_frequency,
        });
    }

    Ok(batches)
}
