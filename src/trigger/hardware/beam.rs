use embedded_hal::digital::InputPin;

use crate::trigger::sensors::{BeamSensor, SensorError, SensorResult};

/// Break-beam receiver wired active-low: the line idles high through the
/// pull-up and reads low while the beam is interrupted.
pub struct GpioBeam<P> {
    pin: P,
}

impl<P: InputPin> GpioBeam<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: InputPin + Send> BeamSensor for GpioBeam<P> {
    fn is_broken(&mut self) -> SensorResult<bool> {
        self.pin.is_low().map_err(SensorError::from_pin)
    }
}
