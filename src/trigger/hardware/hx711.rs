use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::debug;

use crate::trigger::sampling::trimmed_mean;
use crate::trigger::sensors::{LoadCell, SensorError, SensorResult};

const READY_TIMEOUT: Duration = Duration::from_millis(500);
const DATA_BITS: u32 = 24;
/// Extra clock pulses after the data bits: 1 selects channel A, gain 128.
const GAIN_PULSES: u32 = 1;
const TARE_SAMPLES: usize = 10;
/// Clock high/low time; the chip wants 0.2us to 50us.
const HALF_PERIOD_US: u32 = 1;

/// Sign-extend a 24-bit two's complement HX711 word.
pub fn decode_raw(word: u32) -> i32 {
    let word = word & 0x00ff_ffff;
    if word & 0x0080_0000 != 0 {
        (word | 0xff00_0000) as i32
    } else {
        word as i32
    }
}

/// Bit-banged HX711 load-cell amplifier on a data input and a clock output.
pub struct Hx711<Dout, Sck, D> {
    dout: Dout,
    sck: Sck,
    delay: D,
    reference_unit: f64,
    offset: f64,
    ready_timeout: Duration,
}

impl<Dout, Sck, D> Hx711<Dout, Sck, D>
where
    Dout: InputPin,
    Sck: OutputPin,
    D: DelayNs,
{
    pub fn new(dout: Dout, mut sck: Sck, delay: D, reference_unit: f64) -> SensorResult<Self> {
        // clock held high for >60us powers the chip down
        sck.set_low().map_err(SensorError::from_pin)?;
        Ok(Self {
            dout,
            sck,
            delay,
            reference_unit,
            offset: 0.0,
            ready_timeout: READY_TIMEOUT,
        })
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    fn wait_ready(&mut self) -> SensorResult<()> {
        let polls = self.ready_timeout.as_millis().max(1);
        // DOUT goes low when a conversion is ready
        for _ in 0..polls {
            if self.dout.is_low().map_err(SensorError::from_pin)? {
                return Ok(());
            }
            self.delay.delay_ms(1);
        }
        Err(SensorError::NotReady(format!(
            "hx711 not ready after {:?}",
            self.ready_timeout
        )))
    }

    fn pulse(&mut self) -> SensorResult<()> {
        self.sck.set_high().map_err(SensorError::from_pin)?;
        self.delay.delay_us(HALF_PERIOD_US);
        self.sck.set_low().map_err(SensorError::from_pin)?;
        self.delay.delay_us(HALF_PERIOD_US);
        Ok(())
    }

    pub fn read_raw(&mut self) -> SensorResult<i32> {
        self.wait_ready()?;

        let mut word = 0u32;
        for _ in 0..DATA_BITS {
            self.pulse()?;
            let bit = self.dout.is_high().map_err(SensorError::from_pin)?;
            word = (word << 1) | u32::from(bit);
        }
        for _ in 0..GAIN_PULSES {
            self.pulse()?;
        }

        Ok(decode_raw(word))
    }
}

impl<Dout, Sck, D> LoadCell for Hx711<Dout, Sck, D>
where
    Dout: InputPin + Send,
    Sck: OutputPin + Send,
    D: DelayNs + Send,
{
    fn read_weight(&mut self) -> SensorResult<f64> {
        let raw = f64::from(self.read_raw()?);
        Ok((raw - self.offset) / self.reference_unit)
    }

    fn tare(&mut self) -> SensorResult<()> {
        let mut samples = Vec::with_capacity(TARE_SAMPLES);
        for _ in 0..TARE_SAMPLES {
            samples.push(f64::from(self.read_raw()?));
        }
        self.offset = trimmed_mean(&samples);
        debug!("hx711 tared at raw offset {:.1}", self.offset);
        Ok(())
    }
}
