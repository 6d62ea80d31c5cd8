//! LDR (photoresistor) divider sensor
//!
//! Circuit: VCC -- fixed resistor -- ADC_PIN -- LDR -- GND
//!
//! The divider math lives in `lumen_core::measurement`; this driver only
//! owns the ADC channel and the divider parameters.

use lumen_core::measurement::{DividerConfig, Measurement};
use lumen_core::traits::{AnalogInput, MeasurementSensor, SensorError};

/// Photoresistor on one ADC channel
pub struct LdrSensor<ADC> {
    adc: ADC,
    divider: DividerConfig,
}

impl<ADC: AnalogInput> LdrSensor<ADC> {
    /// Create a new LDR sensor
    ///
    /// # Arguments
    /// - `adc`: ADC the divider is wired to
    /// - `channel`: ADC input selected for the divider (GPIO26 is channel 0)
    /// - `divider`: supply, full-scale code and fixed resistor
    pub fn new(mut adc: ADC, channel: u8, divider: DividerConfig) -> Result<Self, SensorError> {
        adc.init(channel)?;
        Ok(Self { adc, divider })
    }

    pub fn divider(&self) -> &DividerConfig {
        &self.divider
    }

    /// Read the raw ADC code without converting it
    pub async fn read_raw(&mut self) -> Result<u16, SensorError> {
        self.adc.sample().await
    }
}

impl<ADC: AnalogInput> MeasurementSensor for LdrSensor<ADC> {
    async fn read(&mut self) -> Result<Measurement, SensorError> {
        let raw = self.adc.sample().await?;
        Ok(Measurement::from_raw(raw, &self.divider))
    }
}

/// Dummy ADC for testing (returns a fixed value)
#[cfg(test)]
pub struct DummyAdc {
    pub value: Result<u16, SensorError>,
    pub channel: Option<u8>,
}

#[cfg(test)]
impl DummyAdc {
    pub fn new(value: u16) -> Self {
        Self {
            value: Ok(value),
            channel: None,
        }
    }
}

#[cfg(test)]
impl AnalogInput for DummyAdc {
    fn init(&mut self, channel: u8) -> Result<(), SensorError> {
        // RP2040 has four external ADC inputs
        if channel > 3 {
            return Err(SensorError::InvalidChannel);
        }
        self.channel = Some(channel);
        Ok(())
    }

    async fn sample(&mut self) -> Result<u16, SensorError> {
        if self.channel.is_none() {
            return Err(SensorError::NotInitialized);
        }
        self.value
    }
}
