//! Sliding median filter
//!
//! Zero-crossing detection is very sensitive to single-sample spikes near zero.
//! A short running median removes them without smearing the crossing point the way
//! an averaging filter would.
//!
//! ## Algorithm
//! 1. Keep a ring buffer of the last `len` inputs (zero-filled at start)
//! 2. Overwrite the oldest slot with each new input
//! 3. Copy the ring into scratch storage and sort it
//! 4. Output the middle element

/// Smallest usable window.
pub const MIN_WINDOW: usize = 3;

/// Window growth step: one extra pair of taps per this many samples of expected cycle length.
const SAMPLES_PER_TAP_PAIR: usize = 512;

/// Window length for a batch whose shortest expected cycle is `min_cycle_samples` long.
///
/// Longer cycles (lower frequency batches) tolerate more smoothing. Always odd and >= 3.
pub fn window_for_cycle(min_cycle_samples: usize) -> usize {
    MIN_WINDOW.max(2 * (min_cycle_samples / SAMPLES_PER_TAP_PAIR) + 1)
}

/// Fixed-length running median over one channel.
#[derive(Debug, Clone)]
pub struct MedianFilter {
    ring: Vec<f64>,
    scratch: Vec<f64>,
    next: usize,
}

impl MedianFilter {
    /// `len` is rounded up to the next odd number and to at least [`MIN_WINDOW`].
    pub fn new(len: usize) -> Self {
        let len = (len | 1).max(MIN_WINDOW);
        MedianFilter {
            ring: vec![0.0; len],
            scratch: vec![0.0; len],
            next: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Push a raw value and return the median of the most recent `len()` values.
    pub fn push(&mut self, value: f64) -> f64 {
        self.ring[self.next] = value;
        self.next = (self.next + 1) % self.ring.len();

        self.scratch.copy_from_slice(&self.ring);
        self.scratch.sort_unstable_by(|a, b| a.total_cmp(b));
        self.scratch[self.scratch.len() / 2]
    }
}
