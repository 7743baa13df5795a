//! Merging per-cycle measurements into the final table
//!
//! Overlapping batches and a steady sweep produce many cycles at nearly the same
//! frequency. Frequencies are rounded to [`FREQUENCY_SIG_FIGS`] significant figures
//! and all cycles that land in the same bucket are averaged. Impedance is reported
//! to [`IMPEDANCE_SIG_FIGS`] significant figures; more digits are not meaningful.
//!
//! ## Rounding
//! Rounding works on the shortest decimal representation that round-trips the
//! value, and ties round away from zero: `0.012345` becomes `0.01235` at 4
//! significant figures even though its binary value is slightly below the tie.

use crate::impedance::ImpedancePoint;

pub const FREQUENCY_SIG_FIGS: usize = 3;
pub const IMPEDANCE_SIG_FIGS: usize = 4;

/// One row of the output table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregatedPoint {
    pub frequency: f64,
    pub impedance: f64,
}

/// Round `value` to `digits` significant figures.
///
/// Zero, non-finite values and `digits == 0` are returned unchanged.
pub fn round_sig(value: f64, digits: usize) -> f64 {
    if value == 0.0 || !value.is_finite() || digits == 0 {
        return value;
    }

    // Shortest round-trip form, e.g. "-1.2345e-2"
    let repr = format!("{:e}", value);
    let (mantissa, exponent) = match repr.split_once('e') {
        Some(parts) => parts,
        None => return value,
    };
    let exponent: i32 = match exponent.parse() {
        Ok(e) => e,
        Err(_) => return value,
    };
    let negative = mantissa.starts_with('-');
    let mut figures: Vec<u8> = mantissa
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|d| d - b'0')
        .collect();

    if figures.len() <= digits {
        return value;
    }

    let round_up = figures[digits] >= 5;
    figures.truncate(digits);
    let mut exponent = exponent;
    if round_up {
        let mut i = digits;
        loop {
            if i == 0 {
                // 9.99 -> 10.0: carry out of the leading digit
                figures.insert(0, 1);
                figures.truncate(digits);
                exponent += 1;
                break;
            }
            i -= 1;
            if figures[i] == 9 {
                figures[i] = 0;
            } else {
                figures[i] += 1;
                break;
            }
        }
    }

    let digits_text: String = figures.iter().map(|d| char::from(b'0' + d)).collect();
    let scale = exponent - (digits as i32 - 1);
    let text = format!("{}{}e{}", if negative { "-" } else { "" }, digits_text, scale);
    text.parse().unwrap_or(value)
}

/// Group points by rounded frequency, average each group's impedance and sort by frequency.
///
/// Applying this to its own output (viewed as points) returns the same table.
pub fn aggregate(points: &[ImpedancePoint]) -> Vec<AggregatedPoint> {
    let mut keyed: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (round_sig(p.frequency, FREQUENCY_SIG_FIGS), p.impedance))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut table = Vec::new();
    let mut i = 0;
    while i < keyed.len() {
        let frequency = keyed[i].0;
        let mut sum = 0.0;
        let mut count = 0usize;
        while i < keyed.len() && keyed[i].0 == frequency {
            sum += keyed[i].1;
            count += 1;
            i += 1;
        }
        table.push(AggregatedPoint {
            frequency,
            impedance: round_sig(sum / count as f64, IMPEDANCE_SIG_FIGS),
        });
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(frequency: f64, impedance: f64) -> ImpedancePoint {
        ImpedancePoint { frequency, impedance }
    }

    #[test]
    fn test_round_sig_examples() {
        assert_eq!(round_sig(1234.5, 3), 1230.0);
        assert_eq!(round_sig(0.012345, 4), 0.01235);
        assert_eq!(round_sig(0.01234, 4), 0.01234);
        assert_eq!(round_sig(987_654.0, 2), 990_000.0);
    }

    #[test]
    fn test_round_sig_ties_away_from_zero() {
        assert_eq!(round_sig(2.5, 1), 3.0);
        assert_eq!(round_sig(-2.5, 1), -3.0);
        assert_eq!(round_sig(1.25, 2), 1.3);
        assert_eq!(round_sig(1005.0, 3), 1010.0);
    }

    #[test]
    fn test_round_sig_carry() {
        assert_eq!(round_sig(9.996, 3), 10.0);
        assert_eq!(round_sig(999.7, 3), 1000.0);
        assert_eq!(round_sig(-0.09999, 2), -0.1);
    }

    #[test]
    fn test_round_sig_passthrough() {
        assert_eq!(round_sig(0.0, 3), 0.0);
        assert_eq!(round_sig(1000.0, 3), 1000.0);
        assert_eq!(round_sig(20.0, 4), 20.0);
        assert!(round_sig(f64::NAN, 3).is_nan());
        assert_eq!(round_sig(f64::INFINITY, 3), f64::INFINITY);
    }

    #[test]
    fn test_round_sig_is_idempotent() {
        for v in [1234.5, 0.012345, 3.14159, 29_999.0, 1.0e-7 * 4.4445] {
            let once = round_sig(v, 3);
            assert_eq!(round_sig(once, 3), once);
        }
    }

    #[test]
    fn test_groups_and_averages() {
        let points = [
            point(1001.0, 19.0),
            point(999.8, 21.0),
            point(502.0, 40.0),
            point(1004.0, 20.0),
        ];
        let table = aggregate(&points);
        assert_eq!(
            table,
            vec![
                AggregatedPoint { frequency: 502.0, impedance: 40.0 },
                AggregatedPoint { frequency: 1000.0, impedance: 20.0 },
            ]
        );
    }

    #[test]
    fn test_average_rounded_to_four_figures() {
        let table = aggregate(&[point(50.0, 10.0), point(50.0, 10.0), point(50.0, 10.00005)]);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].impedance, 10.0);

        let table = aggregate(&[point(50.0, 1.0), point(50.0, 2.0), point(50.0, 2.0)]);
        assert_eq!(table[0].impedance, 1.667);
    }

    #[test]
    fn test_sorted_unique_frequencies() {
        let points: Vec<ImpedancePoint> = [3000.0, 10.0, 250.4, 250.0, 10.01, 17_000.0]
            .iter()
            .map(|&f| point(f, 1.0))
            .collect();
        let table = aggregate(&points);
        let freqs: Vec<f64> = table.iter().map(|p| p.frequency).collect();
        assert_eq!(freqs, vec![10.0, 250.0, 3000.0, 17_000.0]);
    }

    #[test]
    fn test_aggregating_twice_is_a_no_op() {
        let points = [
            point(1001.0, 19.5),
            point(999.8, 21.25),
            point(15.04, 1234.56),
            point(15.01, 1234.44),
            point(27_123.0, 0.012345),
        ];
        let once = aggregate(&points);
        let as_points: Vec<ImpedancePoint> = once.iter().map(|p| point(p.frequency, p.impedance)).collect();
        assert_eq!(aggregate(&as_points), once);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[]).is_empty());
    }
}
