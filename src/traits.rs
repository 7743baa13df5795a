use std::ops::Range;
use crate::batch::Batch;
use crate::source::RawSample;

/// Random-access view over a whole sweep recording.
///
/// Batches overlap, so each worker borrows its own line range instead of
/// re-reading the input.
pub trait SampleSource: Sync {
    fn len(&self) -> usize;

    /// Samples in `range`. Callers only pass ranges inside `0..len()`.
    fn slice(&self, range: Range<usize>) -> &[RawSample];

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SampleSource for [RawSample] {
    fn len(&self) -> usize {
        <[RawSample]>::len(self)
    }

    fn slice(&self, range: Range<usize>) -> &[RawSample] {
        &self[range]
    }
}

/// Receives batch lifecycle events from the scheduler workers.
#[cfg_attr(test, mockall::automock)]
pub trait ProgressSink {
    fn batch_started(&self, batch: &Batch);

    /// `points` is the number of impedance points the batch contributed.
    fn batch_finished(&self, batch: &Batch, points: usize);
}
