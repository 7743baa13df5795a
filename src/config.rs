use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use crate::error::{SweepError, SweepResult};

pub const DEFAULT_SAMPLES_PER_SECOND: f64 = 200_000.0;
pub const DEFAULT_RESISTANCE: f64 = 10.0;
pub const DEFAULT_MIN_FREQUENCY: f64 = 10.0;
pub const DEFAULT_MAX_FREQUENCY: f64 = 30_000.0;
pub const DEFAULT_HEADER_LINES: usize = 3;
/// Resolution of the logarithmic batch split.
pub const DEFAULT_BATCHES_PER_DECADE: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub samples_per_second: f64,
    /// Reference resistor in ohms (channel A is measured across it)
    pub resistance: f64,
    pub min_frequency: f64,
    pub max_frequency: f64,
    /// Upper bound on concurrently processed batches
    pub threads: usize,
    pub header_lines: usize,
    pub batches_per_decade: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            samples_per_second: DEFAULT_SAMPLES_PER_SECOND,
            resistance: DEFAULT_RESISTANCE,
            min_frequency: DEFAULT_MIN_FREQUENCY,
            max_frequency: DEFAULT_MAX_FREQUENCY,
            threads: default_threads(),
            header_lines: DEFAULT_HEADER_LINES,
            batches_per_decade: DEFAULT_BATCHES_PER_DECADE,
        }
    }
}

/// Half of the available hardware threads: SMT siblings don't help this workload.
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() / 2)
        .unwrap_or(1)
        .max(1)
}

fn is_positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl SweepConfig {
    /// Load a JSON config file. Keys that are absent keep their defaults.
    pub fn load(path: &Path) -> SweepResult<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Reject settings that would make the analysis meaningless before any batch runs.
    pub fn validate(&self) -> SweepResult<()> {
        if !is_positive_finite(self.samples_per_second) {
            return Err(SweepError::InvalidSetting { name: "samples_per_second", value: self.samples_per_second });
        }
        if !is_positive_finite(self.resistance) {
            return Err(SweepError::InvalidSetting { name: "resistance", value: self.resistance });
        }
        if self.threads == 0 {
            return Err(SweepError::InvalidSetting { name: "threads", value: 0.0 });
        }
        if self.batches_per_decade == 0 {
            return Err(SweepError::InvalidSetting { name: "batches_per_decade", value: 0.0 });
        }
        if !is_positive_finite(self.min_frequency) {
            return Err(SweepError::InvalidSetting { name: "min_frequency", value: self.min_frequency });
        }
        if !self.max_frequency.is_finite() {
            return Err(SweepError::InvalidSetting { name: "max_frequency", value: self.max_frequency });
        }
        if !(self.max_frequency > self.min_frequency) {
            return Err(SweepError::InvalidRange { min: self.min_frequency, max: self.max_frequency });
        }
        Ok(())
    }

    /// Width of the sweep in decades (log10 units).
    pub fn decades(&self) -> f64 {
        self.max_frequency.log10() - self.min_frequency.log10()
    }
}
