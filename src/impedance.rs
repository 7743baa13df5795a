use crate::cycle::Cycle;
use crate::error::{SweepError, SweepResult};

/// Impedance magnitude measured over one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpedancePoint {
    /// Hz
    pub frequency: f64,
    /// Ohms
    pub impedance: f64,
}

/// Compute |Z| and the fundamental frequency of one complete cycle.
///
/// The current is taken from the RMS voltage across the known `resistance`; |Z| is
/// the device RMS voltage divided by that current. The cycle length in samples gives
/// the frequency directly.
pub fn from_cycle(cycle: &Cycle, samples_per_second: f64, resistance: f64) -> SweepResult<ImpedancePoint> {
    let v_r_rms = cycle.rms_reference();
    let v_z_rms = cycle.rms_device();
    let current = v_r_rms / resistance;

    if cycle.is_empty() || !(current > 0.0) || !current.is_finite() {
        return Err(SweepError::ZeroCurrent { samples: cycle.len() });
    }

    Ok(ImpedancePoint {
        frequency: samples_per_second / cycle.len() as f64,
        impedance: v_z_rms / current,
    })
}
