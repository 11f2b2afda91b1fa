use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use log::{error, info, trace, warn};
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::award::protocol::DEFAULT_AWARD_POINTS;

use super::detector::{SensorReading, TriggerDecision, TriggerDetector};
use super::sampling::{read_smoothed, BASELINE_SAMPLES, POLL_SAMPLES};
use super::sender::AwardSender;
use super::sensors::{BeamSensor, LoadCell};

/// Beam and scale together. Every read blocks the calling thread.
pub struct Sensors {
    beam: Box<dyn BeamSensor>,
    scale: Box<dyn LoadCell>,
    sample_gap: Duration,
}

impl Sensors {
    pub fn new(beam: Box<dyn BeamSensor>, scale: Box<dyn LoadCell>, sample_gap: Duration) -> Self {
        Self {
            beam,
            scale,
            sample_gap,
        }
    }

    /// Startup baseline; a failed read counts as an empty scale.
    pub fn baseline(&mut self) -> f64 {
        match read_smoothed(self.scale.as_mut(), BASELINE_SAMPLES, self.sample_gap) {
            Ok(weight) => weight,
            Err(err) => {
                warn!("baseline weight read failed, using 0.0: {err}");
                0.0
            }
        }
    }

    /// One poll. Sensor failures become neutral readings for this tick.
    pub fn read(&mut self) -> SensorReading {
        let beam_broken = match self.beam.is_broken() {
            Ok(broken) => broken,
            Err(err) => {
                warn!("beam read failed: {err}");
                false
            }
        };

        let weight = match read_smoothed(self.scale.as_mut(), POLL_SAMPLES, self.sample_gap) {
            Ok(weight) => weight,
            Err(err) => {
                warn!("weight read failed: {err}");
                0.0
            }
        };

        SensorReading {
            beam_broken,
            weight,
        }
    }
}

fn lock(sensors: &Mutex<Sensors>) -> MutexGuard<'_, Sensors> {
    sensors.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Monitor {
    sensors: Arc<Mutex<Sensors>>,
    detector: TriggerDetector,
    sender: AwardSender,
}

impl Monitor {
    pub fn new(sensors: Sensors, detector: TriggerDetector, sender: AwardSender) -> Self {
        Self {
            sensors: Arc::new(Mutex::new(sensors)),
            detector,
            sender,
        }
    }

    pub fn detector(&self) -> &TriggerDetector {
        &self.detector
    }

    async fn read_sensors(&self) -> SensorReading {
        let sensors = Arc::clone(&self.sensors);
        let worker = tokio::task::spawn_blocking(move || {
            let mut guard = lock(&sensors);
            guard.read()
        });
        match worker.await {
            Ok(reading) => reading,
            Err(err) => {
                error!("sensor read worker failed: {err}");
                SensorReading {
                    beam_broken: false,
                    weight: 0.0,
                }
            }
        }
    }

    pub async fn poll_once(&mut self) -> TriggerDecision {
        let reading = self.read_sensors().await;
        let decision = self.detector.evaluate(reading, Instant::now());

        match decision {
            TriggerDecision::Hold { delta } => {
                trace!(
                    "beam_broken={} weight={:.2} delta={delta:.2}",
                    reading.beam_broken,
                    reading.weight
                );
            }
            TriggerDecision::Fire { delta } => {
                info!("trigger: beam broken, weight up {delta:.2}g");
                // the cooldown has already restarted; a lost datagram stays lost
                match self.sender.send_award(DEFAULT_AWARD_POINTS).await {
                    Ok(message) => info!("Sent award to {}: {message}", self.sender.describe_destination()),
                    Err(err) => error!("Failed to send UDP message: {err:#}"),
                }
            }
        }

        decision
    }
}

/// Poll on every tick until cancelled. A poll still reading sensors is
/// abandoned on cancel; its blocking read finishes in the background.
pub async fn monitor_loop(mut monitor: Monitor, poll_interval: Duration, cancel_token: CancellationToken) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            _ = async {
                ticker.tick().await;
                monitor.poll_once().await;
            } => {}
        }
    }
    info!("monitor loop shutting down");
}
