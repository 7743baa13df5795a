//! Zero-crossing cycle detector
//!
//! Consumes median-filtered sample pairs and splits channel B into complete
//! cycles, each delimited by two positive-going zero crossings. The sample that
//! closes a cycle is the first sample of the next one.
//!
//! Both channels share the stream position, so even when the device is reactive and
//! channel A is phase shifted against channel B, every emitted cycle contains
//! exactly one period of each.
//!
//! ## Noise rejection
//! - The first half-cycle must be longer than half the shortest expected cycle
//!   before a crossing is accepted.
//! - Once the first half is measured, the closing crossing is only accepted while
//!   the cycle is longer than 90% of that first half.

/// One filtered sample of a cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSample {
    /// Voltage across the reference resistor
    pub v_r: f64,
    /// Voltage across the device (channel B minus channel A)
    pub v_z: f64,
}

/// Samples of one cycle in stream order.
#[derive(Debug, Clone, Default)]
pub struct Cycle {
    samples: Vec<CycleSample>,
}

impl Cycle {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[CycleSample] {
        &self.samples
    }

    pub fn rms_reference(&self) -> f64 {
        rms(self.samples.iter().map(|s| s.v_r), self.samples.len())
    }

    pub fn rms_device(&self) -> f64 {
        rms(self.samples.iter().map(|s| s.v_z), self.samples.len())
    }

    fn push(&mut self, sample: CycleSample) {
        self.samples.push(sample);
    }

    fn clear(&mut self) {
        self.samples.clear();
    }
}

impl FromIterator<CycleSample> for Cycle {
    fn from_iter<I: IntoIterator<Item = CycleSample>>(iter: I) -> Self {
        Cycle { samples: iter.into_iter().collect() }
    }
}

fn rms(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (values.map(|v| v * v).sum::<f64>() / count as f64).sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// Waiting for channel B to drop to or below zero
    InFirstHalf,
    /// Waiting for channel B to rise above zero again
    InSecondHalf,
}

#[derive(Debug)]
pub struct CycleDetector {
    state: DetectorState,
    cycle: Cycle,
    /// Shortest cycle the batch expects, in samples
    min_samples: usize,
    /// Length the cycle must exceed before the closing crossing counts
    expected_end: usize,
}

impl CycleDetector {
    pub fn new(min_samples: usize) -> Self {
        CycleDetector {
            state: DetectorState::InFirstHalf,
            cycle: Cycle::default(),
            min_samples,
            expected_end: 0,
        }
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    /// Samples accumulated for the cycle in progress.
    pub fn pending(&self) -> usize {
        self.cycle.len()
    }

    /// Feed one filtered sample pair. When it closes a cycle, `on_cycle` is called with
    /// the completed cycle before the sample is added to the next one.
    pub fn push<F>(&mut self, filtered_a: f64, filtered_b: f64, mut on_cycle: F)
    where
        F: FnMut(&Cycle),
    {
        let positive = filtered_b > 0.0;
        match self.state {
            DetectorState::InFirstHalf => {
                if !positive && self.cycle.len() > self.min_samples / 2 {
                    self.state = DetectorState::InSecondHalf;
                    self.expected_end = self.cycle.len() * 9 / 10;
                }
            }
            DetectorState::InSecondHalf => {
                if positive && self.cycle.len() > self.expected_end {
                    on_cycle(&self.cycle);
                    self.cycle.clear();
                    self.state = DetectorState::InFirstHalf;
                }
            }
        }

        self.cycle.push(CycleSample {
            v_r: filtered_a,
            v_z: filtered_b - filtered_a,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::PI;

    fn run(detector: &mut CycleDetector, b: impl IntoIterator<Item = f64>) -> Vec<usize> {
        let mut lengths = Vec::new();
        for v in b {
            detector.push(0.5 * v, v, |cycle| lengths.push(cycle.len()));
        }
        lengths
    }

    fn sine(period: f64, phase: f64, count: usize) -> impl Iterator<Item = f64> {
        (0..count).map(move |n| (2.0 * PI * n as f64 / period + phase).sin())
    }

    #[test]
    fn test_initial_state() {
        let detector = CycleDetector::new(100);
        assert_eq!(detector.state(), DetectorState::InFirstHalf);
        assert_eq!(detector.pending(), 0);
    }

    #[test]
    fn test_sine_cycles_have_period_length() {
        let mut detector = CycleDetector::new(143);
        let lengths = run(&mut detector, sine(200.0, 0.3, 200 * 50));

        assert!(lengths.len() >= 48, "only {} cycles", lengths.len());
        // The first cycle starts mid-waveform.
        for &len in &lengths[1..] {
            assert_eq!(len, 200);
        }
    }

    #[test]
    fn test_partial_cycle_not_emitted() {
        let mut detector = CycleDetector::new(143);
        // 3.5 periods: three rising crossings, the tail stays pending.
        let lengths = run(&mut detector, sine(200.0, 0.3, 700));
        assert_eq!(lengths.len(), 3);
        assert!(detector.pending() > 0);
    }

    #[test]
    fn test_trigger_sample_opens_next_cycle() {
        let mut detector = CycleDetector::new(4);
        let b = [1.0, 1.0, 1.0, -1.0, -1.0, -1.0, 1.0];
        let mut closed = Vec::new();
        for v in b {
            detector.push(0.0, v, |cycle| closed.push(cycle.len()));
        }
        // 3 positive + 3 negative samples close the cycle; the final positive sample
        // belongs to the next one.
        assert_eq!(closed, vec![6]);
        assert_eq!(detector.pending(), 1);
        assert_eq!(detector.state(), DetectorState::InFirstHalf);
    }

    #[test]
    fn test_early_crossing_ignored() {
        let mut detector = CycleDetector::new(10);
        // Dips below zero after 2 samples: too early for min_samples / 2 = 5.
        let b = [1.0, 1.0, -1.0, 1.0, 1.0, 1.0];
        let mut closed = 0;
        for v in b {
            detector.push(0.0, v, |_| closed += 1);
        }
        assert_eq!(detector.state(), DetectorState::InFirstHalf);
        assert_eq!(closed, 0);
    }

    #[test]
    fn test_expected_end_set_from_first_half() {
        let mut detector = CycleDetector::new(4);
        for v in [1.0; 10] {
            detector.push(0.0, v, |_| {});
        }
        detector.push(0.0, -1.0, |_| {});
        assert_eq!(detector.state(), DetectorState::InSecondHalf);
        assert_eq!(detector.expected_end, 9);
    }

    #[test]
    fn test_channel_split() {
        let mut detector = CycleDetector::new(2);
        let mut captured = Vec::new();
        for (a, b) in [(0.5, 2.0), (0.5, 2.0), (-0.5, -2.0), (-0.5, -2.0), (0.5, 2.0)] {
            detector.push(a, b, |cycle| captured = cycle.samples().to_vec());
        }
        assert_eq!(captured.len(), 4);
        assert_eq!(captured[0], CycleSample { v_r: 0.5, v_z: 1.5 });
        assert_eq!(captured[2], CycleSample { v_r: -0.5, v_z: -1.5 });
    }

    #[test]
    fn test_noisy_sine_lengths_stay_close() {
        let mut rng = StdRng::seed_from_u64(7);
        let noisy: Vec<f64> = sine(400.0, 0.3, 400 * 40)
            .map(|v| v + rng.random_range(-0.005..0.005))
            .collect();
        let mut detector = CycleDetector::new(286);
        let lengths = run(&mut detector, noisy);

        assert!(lengths.len() >= 38);
        for &len in &lengths[1..] {
            assert!((398..=402).contains(&len), "cycle of {} samples", len);
        }
    }

    #[test]
    fn test_cycle_rms() {
        let cycle: Cycle = [
            CycleSample { v_r: 1.0, v_z: 3.0 },
            CycleSample { v_r: -1.0, v_z: -3.0 },
        ]
        .into_iter()
        .collect();
        assert_eq!(cycle.rms_reference(), 1.0);
        assert_eq!(cycle.rms_device(), 3.0);
        assert_eq!(Cycle::default().rms_reference(), 0.0);
    }
}
