//! Value formatting into fixed-capacity strings

use core::fmt::Write;

use heapless::String;

use crate::traits::DisplayError;

/// Capacity of one formatted screen value
pub const LABEL_CAPACITY: usize = 32;

/// One formatted screen value
pub type Label = String<LABEL_CAPACITY>;

/// Resistance at and above which the value is shown in kilo-ohms
pub const KILO_OHM_THRESHOLD: f32 = 1000.0;

/// How a quantity is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValueFormat {
    /// `1.65 V`
    Volts,
    /// `950.0 ohm` below 1 kΩ, `10.0 k` from there on
    Ohms,
    /// `0.17 mA`
    MilliAmps,
    /// `V: 1.65 V`
    LabeledVolts,
    /// `R: 9709 Ohm`
    LabeledOhms,
    /// `I: 0.17 mA`
    LabeledMilliAmps,
}

impl ValueFormat {
    pub fn render(self, value: f32) -> Result<Label, DisplayError> {
        let mut out = Label::new();
        let written = match self {
            ValueFormat::Volts => write!(out, "{:.2} V", value),
            ValueFormat::Ohms if value < KILO_OHM_THRESHOLD => write!(out, "{:.1} ohm", value),
            ValueFormat::Ohms => write!(out, "{:.1} k", value / 1000.0),
            ValueFormat::MilliAmps => write!(out, "{:.2} mA", value),
            ValueFormat::LabeledVolts => write!(out, "V: {:.2} V", value),
            ValueFormat::LabeledOhms => write!(out, "R: {:.0} Ohm", value),
            ValueFormat::LabeledMilliAmps => write!(out, "I: {:.2} mA", value),
        };
        written.map_err(|_| DisplayError::BufferOverflow)?;
        Ok(out)
    }
}

/// `Luz: 42%`
pub fn light_level(percent: u8) -> Result<Label, DisplayError> {
    let mut out = Label::new();
    write!(out, "Luz: {}%", percent).map_err(|_| DisplayError::BufferOverflow)?;
    Ok(out)
}

/// `X:007 Y:120`
pub fn touch_position(x: u16, y: u16) -> Result<Label, DisplayError> {
    let mut out = Label::new();
    write!(out, "X:{:03} Y:{:03}", x, y).map_err(|_| DisplayError::BufferOverflow)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_formats() {
        assert_eq!(ValueFormat::Volts.render(1.6504).unwrap(), "1.65 V");
        assert_eq!(ValueFormat::MilliAmps.render(0.16496).unwrap(), "0.16 mA");
        assert_eq!(ValueFormat::Volts.render(0.0).unwrap(), "0.00 V");
    }

    #[test]
    fn test_resistance_switches_unit_at_one_kilo_ohm() {
        assert_eq!(ValueFormat::Ohms.render(950.3).unwrap(), "950.3 ohm");
        assert_eq!(ValueFormat::Ohms.render(999.0).unwrap(), "999.0 ohm");
        assert_eq!(ValueFormat::Ohms.render(1000.0).unwrap(), "1.0 k");
        assert_eq!(ValueFormat::Ohms.render(10_004.9).unwrap(), "10.0 k");
        assert_eq!(ValueFormat::Ohms.render(0.0).unwrap(), "0.0 ohm");
    }

    #[test]
    fn test_labeled_formats() {
        assert_eq!(ValueFormat::LabeledVolts.render(3.3).unwrap(), "V: 3.30 V");
        assert_eq!(ValueFormat::LabeledOhms.render(9708.7).unwrap(), "R: 9709 Ohm");
        assert_eq!(ValueFormat::LabeledMilliAmps.render(0.17).unwrap(), "I: 0.17 mA");
    }

    #[test]
    fn test_oversized_value_reports_overflow() {
        assert_eq!(
            ValueFormat::LabeledOhms.render(f32::MAX),
            Err(DisplayError::BufferOverflow)
        );
    }

    #[test]
    fn test_light_and_touch_labels() {
        assert_eq!(light_level(0).unwrap(), "Luz: 0%");
        assert_eq!(light_level(100).unwrap(), "Luz: 100%");
        assert_eq!(touch_position(7, 120).unwrap(), "X:007 Y:120");
        assert_eq!(touch_position(240, 0).unwrap(), "X:240 Y:000");
    }
}
