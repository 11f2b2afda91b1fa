pub mod detector;
pub mod hardware;
pub mod loop_worker;
pub mod sampling;
pub mod sender;
pub mod sensors;

use anyhow::{Context, Result};
use log::info;
use tokio_util::sync::CancellationToken;

use crate::settings::MonitorSettings;

pub use detector::{SensorReading, TriggerDecision, TriggerDetector, TriggerRule};
pub use loop_worker::{monitor_loop, Monitor, Sensors};
pub use sender::{AwardSender, Destination};
pub use sensors::{BeamSensor, LoadCell, SensorError};

/// Remote device entry point: open sensors, take the baseline, then poll until
/// `stop` is cancelled.
pub async fn run_monitor(settings: MonitorSettings, stop: CancellationToken) -> Result<()> {
    settings.validate()?;
    let rule = TriggerRule {
        threshold_grams: settings.threshold_grams,
        cooldown: settings.cooldown()?,
    };
    let sender = AwardSender::bind(Destination::from_host(settings.host.as_deref()), settings.port).await?;

    info!(
        "Starting monitor: beam_pin={} dout={} pd_sck={} -> {}",
        settings.beam_pin,
        settings.dout_pin,
        settings.sck_pin,
        sender.describe_destination()
    );

    let setup = settings.clone();
    let (sensors, baseline) = tokio::task::spawn_blocking(move || -> Result<(Sensors, f64)> {
        let (beam, scale) = hardware::open_sensors(&setup)?;
        let mut sensors = Sensors::new(beam, scale, sampling::SAMPLE_GAP);
        let baseline = sensors.baseline();
        Ok((sensors, baseline))
    })
    .await
    .context("sensor setup worker failed")??;
    info!("Baseline weight: {baseline:.2}");

    let monitor = Monitor::new(sensors, TriggerDetector::new(rule, baseline), sender);
    monitor_loop(monitor, settings.poll_interval(), stop).await;
    Ok(())
}
