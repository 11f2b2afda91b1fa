//! Raspberry Pi GPIO through the character device, BCM numbering.

use anyhow::{Context, Result};
use rppal::gpio::{Gpio, InputPin, OutputPin};
use rppal::hal::Delay;

use super::beam::GpioBeam;
use super::hx711::Hx711;

pub type PiScale = Hx711<InputPin, OutputPin, Delay>;

pub fn open_beam(gpio: &Gpio, pin: u8) -> Result<GpioBeam<InputPin>> {
    let line = gpio
        .get(pin)
        .with_context(|| format!("failed to claim beam pin BCM {pin}"))?
        .into_input_pullup();
    Ok(GpioBeam::new(line))
}

pub fn open_scale(gpio: &Gpio, dout: u8, sck: u8, reference_unit: f64) -> Result<PiScale> {
    let dout_line = gpio
        .get(dout)
        .with_context(|| format!("failed to claim hx711 DOUT pin BCM {dout}"))?
        .into_input();
    let sck_line = gpio
        .get(sck)
        .with_context(|| format!("failed to claim hx711 PD_SCK pin BCM {sck}"))?
        .into_output_low();
    Ok(Hx711::new(dout_line, sck_line, Delay::new(), reference_unit)?)
}
