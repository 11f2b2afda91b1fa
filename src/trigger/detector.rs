use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerRule {
    pub threshold_grams: f64,
    pub cooldown: Duration,
}

/// What one poll saw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub beam_broken: bool,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerDecision {
    Fire { delta: f64 },
    Hold { delta: f64 },
}

impl TriggerDecision {
    pub fn fired(&self) -> bool {
        matches!(self, TriggerDecision::Fire { .. })
    }
}

/// Fires when the beam is broken, the weight has risen at least the threshold
/// over the startup baseline, and the cooldown since the last fire has passed.
/// Keeps firing once per cooldown while that holds.
#[derive(Debug, Clone)]
pub struct TriggerDetector {
    rule: TriggerRule,
    baseline_weight: f64,
    last_fire: Option<Instant>,
}

impl TriggerDetector {
    pub fn new(rule: TriggerRule, baseline_weight: f64) -> Self {
        Self {
            rule,
            baseline_weight,
            last_fire: None,
        }
    }

    pub fn baseline_weight(&self) -> f64 {
        self.baseline_weight
    }

    pub fn last_fire(&self) -> Option<Instant> {
        self.last_fire
    }

    pub fn evaluate(&mut self, reading: SensorReading, now: Instant) -> TriggerDecision {
        let delta = reading.weight - self.baseline_weight;
        let cooled_down = self
            .last_fire
            .map(|at| now.saturating_duration_since(at) >= self.rule.cooldown)
            .unwrap_or(true);

        if reading.beam_broken && delta >= self.rule.threshold_grams && cooled_down {
            self.last_fire = Some(now);
            TriggerDecision::Fire { delta }
        } else {
            TriggerDecision::Hold { delta }
        }
    }
}
