//! Bounded parallel batch execution
//!
//! Batches run on a dedicated rayon pool of `threads` workers. A worker runs one
//! batch start to finish before taking the next, so at most `threads` batches are
//! active at once. Batches share no mutable state.
//!
//! The first failing batch stops the run: no new batches are started once an error
//! is seen, and the failure is returned. Results are concatenated in batch order
//! whatever the completion order, so the output does not depend on `threads`.

use log::debug;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::panic::{self, AssertUnwindSafe};
use crate::batch::Batch;
use crate::error::{SweepError, SweepResult};
use crate::impedance::ImpedancePoint;
use crate::traits::ProgressSink;

/// Run `job` over every batch with at most `threads` running concurrently and
/// concatenate the results in batch order.
pub fn run_batches<P, F>(
    batches: &[Batch],
    threads: usize,
    progress: &P,
    job: F,
) -> SweepResult<Vec<ImpedancePoint>>
where
    P: ProgressSink + Sync + ?Sized,
    F: Fn(&Batch) -> SweepResult<Vec<ImpedancePoint>> + Sync,
{
    if threads == 0 {
        return Err(SweepError::InvalidSetting { name: "threads", value: 0.0 });
    }
    if batches.is_empty() {
        return Ok(Vec::new());
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(threads.min(batches.len()))
        .thread_name(|i| format!("sweep-batch-{}", i))
        .build()?;
    debug!("Running {} batches on {} workers", batches.len(), pool.current_num_threads());

    let per_batch: Vec<Vec<ImpedancePoint>> = pool.install(|| {
        batches
            .par_iter()
            .map(|batch| run_one(batch, progress, &job))
            .collect::<SweepResult<_>>()
    })?;

    Ok(per_batch.into_iter().flatten().collect())
}

fn run_one<P, F>(batch: &Batch, progress: &P, job: &F) -> SweepResult<Vec<ImpedancePoint>>
where
    P: ProgressSink + Sync + ?Sized,
    F: Fn(&Batch) -> SweepResult<Vec<ImpedancePoint>> + Sync,
{
    progress.batch_started(batch);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(batch)))
        .map_err(|_| SweepError::WorkerPanicked)?;
    match outcome {
        Ok(points) => {
            progress.batch_finished(batch, points.len());
            Ok(points)
        }
        Err(e) => Err(SweepError::Batch { index: batch.index, source: Box::new(e) }),
    }
}
