pub mod beam;
pub mod hx711;
#[cfg(target_os = "linux")]
pub mod rpi;
pub mod simulated;

use anyhow::Result;
use log::{info, warn};

use crate::settings::MonitorSettings;

use super::sensors::{BeamSensor, LoadCell};

pub use beam::GpioBeam;
pub use hx711::Hx711;
pub use simulated::BenchScript;

/// Open the beam and scale the settings ask for. Missing hardware is fatal here,
/// before the monitor loop starts. Blocks while the scale tares.
pub fn open_sensors(settings: &MonitorSettings) -> Result<(Box<dyn BeamSensor>, Box<dyn LoadCell>)> {
    if settings.simulate {
        info!("using simulated beam and scale");
        let (beam, scale) = BenchScript::default().sensors();
        return Ok((Box::new(beam), Box::new(scale)));
    }

    let (beam, mut scale) = open_gpio_sensors(settings)?;
    if let Err(err) = scale.tare() {
        warn!("hx711 tare failed, continuing untared: {err}");
    }
    Ok((beam, scale))
}

#[cfg(target_os = "linux")]
fn open_gpio_sensors(settings: &MonitorSettings) -> Result<(Box<dyn BeamSensor>, Box<dyn LoadCell>)> {
    use anyhow::Context;

    let gpio = rppal::gpio::Gpio::new().context("failed to open the GPIO controller")?;
    let beam = rpi::open_beam(&gpio, settings.beam_pin)?;
    let scale = rpi::open_scale(&gpio, settings.dout_pin, settings.sck_pin, settings.reference_unit)?;
    Ok((Box::new(beam), Box::new(scale)))
}

#[cfg(not(target_os = "linux"))]
fn open_gpio_sensors(_settings: &MonitorSettings) -> Result<(Box<dyn BeamSensor>, Box<dyn LoadCell>)> {
    anyhow::bail!("GPIO sensors need a Raspberry Pi; set SCANWARD_SIMULATE=1 to run without them")
}
