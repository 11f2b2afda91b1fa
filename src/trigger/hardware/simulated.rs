use std::time::{Duration, Instant};

use rand::Rng;

use crate::trigger::sensors::{BeamSensor, LoadCell, SensorResult};

const RESTING_GRAMS: f64 = 500.0;
const EVENT_GRAMS: f64 = 120.0;
const JITTER_GRAMS: f64 = 2.0;

/// Repeating bench scenario: most of each period is idle, then for
/// `event_length` the beam is broken and the scale carries extra weight.
#[derive(Debug, Clone, Copy)]
pub struct BenchScript {
    started: Instant,
    period: Duration,
    event_length: Duration,
}

impl BenchScript {
    pub fn new(period: Duration, event_length: Duration) -> Self {
        Self {
            started: Instant::now(),
            period,
            event_length: event_length.min(period),
        }
    }

    fn in_event(&self, now: Instant) -> bool {
        if self.period.is_zero() {
            return false;
        }
        let elapsed = now.saturating_duration_since(self.started).as_nanos();
        let into_period = elapsed % self.period.as_nanos();
        into_period >= (self.period - self.event_length).as_nanos()
    }

    pub fn sensors(self) -> (SimulatedBeam, SimulatedScale) {
        (SimulatedBeam { script: self }, SimulatedScale { script: self })
    }
}

impl Default for BenchScript {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), Duration::from_secs(1))
    }
}

pub struct SimulatedBeam {
    script: BenchScript,
}

impl BeamSensor for SimulatedBeam {
    fn is_broken(&mut self) -> SensorResult<bool> {
        Ok(self.script.in_event(Instant::now()))
    }
}

pub struct SimulatedScale {
    script: BenchScript,
}

impl LoadCell for SimulatedScale {
    fn read_weight(&mut self) -> SensorResult<f64> {
        let load = if self.script.in_event(Instant::now()) {
            RESTING_GRAMS + EVENT_GRAMS
        } else {
            RESTING_GRAMS
        };
        Ok(load + rand::thread_rng().gen_range(-JITTER_GRAMS..JITTER_GRAMS))
    }
}
