use thiserror::Error;

#[derive(Error, Debug)]
pub enum SensorError {
    #[error("gpio error: {0}")]
    Pin(String),

    #[error("sensor not ready: {0}")]
    NotReady(String),
}

impl SensorError {
    pub fn from_pin<E: embedded_hal::digital::Error>(err: E) -> Self {
        SensorError::Pin(format!("{:?}", err.kind()))
    }
}

pub type SensorResult<T> = std::result::Result<T, SensorError>;

/// Break-beam input. `true` means the light path is interrupted.
pub trait BeamSensor: Send {
    fn is_broken(&mut self) -> SensorResult<bool>;
}

/// One instantaneous weight sample per call, in grams. Reads may block.
pub trait LoadCell: Send {
    fn read_weight(&mut self) -> SensorResult<f64>;

    /// Zero the scale at its current load. Drivers without tare support do nothing.
    fn tare(&mut self) -> SensorResult<()> {
        Ok(())
    }
}
