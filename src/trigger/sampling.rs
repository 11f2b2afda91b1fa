use std::thread;
use std::time::Duration;

use super::sensors::{LoadCell, SensorResult};

pub const BASELINE_SAMPLES: usize = 10;
pub const POLL_SAMPLES: usize = 5;
pub const SAMPLE_GAP: Duration = Duration::from_millis(10);

/// Average after dropping the lowest and highest value, once at least three
/// values are available. An empty slice averages to 0.0.
pub fn trimmed_mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let kept = if sorted.len() >= 3 {
        &sorted[1..sorted.len() - 1]
    } else {
        &sorted[..]
    };
    kept.iter().sum::<f64>() / kept.len() as f64
}

/// Take `samples` readings `gap` apart and return their trimmed mean.
/// Any failed sample fails the whole reading. Blocks the calling thread.
pub fn read_smoothed(cell: &mut dyn LoadCell, samples: usize, gap: Duration) -> SensorResult<f64> {
    let mut values = Vec::with_capacity(samples);
    for index in 0..samples {
        if index > 0 && !gap.is_zero() {
            thread::sleep(gap);
        }
        values.push(cell.read_weight()?);
    }
    Ok(trimmed_mean(&values))
}
