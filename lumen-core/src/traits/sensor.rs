//! Analog input and measurement sensor traits

use crate::measurement::Measurement;

/// Errors that can occur while sampling the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Requested ADC channel does not exist on this converter
    InvalidChannel,
    /// Sampled before `init`
    NotInitialized,
    /// ADC conversion error
    ConversionError,
}

/// One channel of an analog-to-digital converter
///
/// Implementations wrap the board's ADC peripheral. Sampling is async so a
/// conversion suspends the calling task instead of spinning.
#[allow(async_fn_in_trait)]
pub trait AnalogInput {
    /// Select and configure the channel to sample
    fn init(&mut self, channel: u8) -> Result<(), SensorError>;

    /// Take one raw sample (0..=full scale)
    async fn sample(&mut self) -> Result<u16, SensorError>;
}

/// Anything that yields complete measurements
#[allow(async_fn_in_trait)]
pub trait MeasurementSensor {
    /// Sample the input and derive voltage, resistance and current
    async fn read(&mut self) -> Result<Measurement, SensorError>;
}
