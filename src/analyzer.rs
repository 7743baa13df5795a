//! Sweep analysis pipeline
//!
//! recording -> batches -> {median filter -> cycle detector -> impedance} per batch
//! -> aggregation. Each batch owns its filters and detector; only the worker pool
//! is shared.

use log::{debug, info, warn};
use crate::aggregate::{aggregate, AggregatedPoint};
use crate::batch::{partition, Batch};
use crate::config::SweepConfig;
use crate::cycle::CycleDetector;
use crate::error::SweepResult;
use crate::impedance::{self, ImpedancePoint};
use crate::median::MedianFilter;
use crate::scheduler::run_batches;
use crate::source::RawSample;
use crate::traits::{ProgressSink, SampleSource};

/// Logs batch progress at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn batch_started(&self, batch: &Batch) {
        info!(
            "Batch {}, {}-{}Hz",
            batch.index, batch.min_frequency as u64, batch.max_frequency as u64
        );
    }

    fn batch_finished(&self, batch: &Batch, points: usize) {
        if points == 0 {
            warn!("Batch {} produced no complete cycles", batch.index);
        } else {
            debug!("Batch {} done: {} cycles", batch.index, points);
        }
    }
}

/// Measure every interior cycle of one batch.
///
/// The first and last detected cycles are dropped: the first starts wherever the
/// batch happens to begin and both edges see a median filter that is still
/// filling or holds samples from outside the cycle.
pub fn process_batch(
    samples: &[RawSample],
    batch: &Batch,
    samples_per_second: f64,
    resistance: f64,
) -> SweepResult<Vec<ImpedancePoint>> {
    let min_samples = batch.min_cycle_samples(samples_per_second);
    let filter_len = batch.filter_len(samples_per_second);
    let mut filter_a = MedianFilter::new(filter_len);
    let mut filter_b = MedianFilter::new(filter_len);
    let mut detector = CycleDetector::new(min_samples);

    debug!(
        "Batch {}: {} samples, min cycle {} samples, median window {}",
        batch.index,
        samples.len(),
        min_samples,
        filter_len
    );

    let mut measured = Vec::new();
    for sample in samples {
        let a = filter_a.push(sample.a);
        let b = filter_b.push(sample.b);
        detector.push(a, b, |cycle| {
            measured.push(impedance::from_cycle(cycle, samples_per_second, resistance));
        });
    }

    if measured.len() <= 2 {
        return Ok(Vec::new());
    }
    let interior = measured.len() - 2;
    measured.into_iter().skip(1).take(interior).collect()
}

/// Run the whole pipeline over a recording and return the frequency response table.
pub fn analyze<S, P>(source: &S, config: &SweepConfig, progress: &P) -> SweepResult<Vec<AggregatedPoint>>
where
    S: SampleSource + ?Sized,
    P: ProgressSink + Sync + ?Sized,
{
    config.validate()?;
    let batches = partition(source.len(), config)?;

    info!(
        "Splitting {} lines into {} batches of {}, to be processed up to {} in parallel",
        source.len(),
        batches.len(),
        batches[0].core.len(),
        config.threads
    );

    let points = run_batches(&batches, config.threads, progress, |batch| {
        process_batch(
            source.slice(batch.lines.clone()),
            batch,
            config.samples_per_second,
            config.resistance,
        )
    })?;

    debug!("{} cycles measured across all batches", points.len());
    Ok(aggregate(&points))
}
