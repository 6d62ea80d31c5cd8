//! Photoresistor divider measurement
//!
//! Circuit: VCC -- fixed resistor -- ADC_PIN -- LDR -- GND
//!
//! The ADC code maps linearly onto `0..=supply_voltage`. The LDR resistance
//! follows from the divider ratio and the current through it from Ohm's law.
//! Both derived quantities collapse to zero at the supply rails instead of
//! dividing by zero.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Voltage divider and converter parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DividerConfig {
    /// Divider supply voltage (V)
    pub supply_voltage: f32,
    /// ADC code corresponding to the supply voltage (4095 for 12-bit)
    pub full_scale: u16,
    /// Fixed divider resistor (ohms)
    pub fixed_resistor_ohms: f32,
}

impl Default for DividerConfig {
    fn default() -> Self {
        Self {
            supply_voltage: 3.3,
            full_scale: 4095,
            fixed_resistor_ohms: 10_000.0,
        }
    }
}

/// One acquisition cycle's reading
///
/// Plain value: copied into the store or moved through the queue, never
/// shared by reference between tasks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Measurement {
    /// Voltage at the ADC pin (V)
    pub voltage: f32,
    /// LDR resistance (ohms), zero when the input sits on a rail
    pub resistance_ohms: f32,
    /// Current through the LDR (mA), zero when the resistance is zero
    pub current_ma: f32,
}

impl Measurement {
    /// The value a store holds before the first commit
    pub const ZERO: Self = Self {
        voltage: 0.0,
        resistance_ohms: 0.0,
        current_ma: 0.0,
    };

    /// Derive a full measurement from a raw ADC code
    pub fn from_raw(raw: u16, divider: &DividerConfig) -> Self {
        Self::from_voltage(adc_to_voltage(raw, divider), divider)
    }

    /// Derive resistance and current from an already converted voltage
    pub fn from_voltage(voltage: f32, divider: &DividerConfig) -> Self {
        let resistance_ohms = divider_resistance(voltage, divider);
        Self {
            voltage,
            resistance_ohms,
            current_ma: ohmic_current_ma(voltage, resistance_ohms),
        }
    }
}

/// Convert an ADC code to volts
///
/// Codes above full scale are clamped so the result never exceeds the supply.
pub fn adc_to_voltage(raw: u16, divider: &DividerConfig) -> f32 {
    if divider.full_scale == 0 {
        return 0.0;
    }
    let raw = raw.min(divider.full_scale);
    raw as f32 * divider.supply_voltage / divider.full_scale as f32
}

/// LDR resistance from the divider output voltage
///
/// R_ldr = R_fixed * V / (VCC - V), defined only strictly between the rails.
pub fn divider_resistance(voltage: f32, divider: &DividerConfig) -> f32 {
    if voltage > 0.0 && voltage < divider.supply_voltage {
        divider.fixed_resistor_ohms * voltage / (divider.supply_voltage - voltage)
    } else {
        0.0
    }
}

/// Current through the LDR in milliamps
pub fn ohmic_current_ma(voltage: f32, resistance_ohms: f32) -> f32 {
    if resistance_ohms > 0.0 {
        voltage / resistance_ohms * 1000.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f32, b: f32, tol: f32) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_mid_scale_reading() {
        let divider = DividerConfig::default();
        let m = Measurement::from_raw(2048, &divider);

        assert!(close(m.voltage, 1.6502, 0.0005));

        // R = Rf * V / (VCC - V)
        let expected_r = 10_000.0 * m.voltage / (3.3 - m.voltage);
        assert!(close(m.resistance_ohms, expected_r, 0.5));
        assert!(m.resistance_ohms > 9_900.0 && m.resistance_ohms < 10_100.0);

        let expected_i = m.voltage / m.resistance_ohms * 1000.0;
        assert!(close(m.current_ma, expected_i, 1e-6));
        assert!(close(m.current_ma, 0.165, 0.001));
    }

    #[test]
    fn test_zero_code_takes_guard_path() {
        let m = Measurement::from_raw(0, &DividerConfig::default());
        assert_eq!(m, Measurement::ZERO);
    }

    #[test]
    fn test_full_scale_code_has_no_resistance() {
        let m = Measurement::from_raw(4095, &DividerConfig::default());
        assert!(close(m.voltage, 3.3, 1e-5));
        assert_eq!(m.resistance_ohms, 0.0);
        assert_eq!(m.current_ma, 0.0);
    }

    #[test]
    fn test_code_above_full_scale_is_clamped() {
        let divider = DividerConfig::default();
        assert_eq!(adc_to_voltage(4096, &divider), adc_to_voltage(4095, &divider));
        assert_eq!(adc_to_voltage(u16::MAX, &divider), adc_to_voltage(4095, &divider));
    }

    #[test]
    fn test_degenerate_full_scale() {
        let divider = DividerConfig {
            full_scale: 0,
            ..DividerConfig::default()
        };
        assert_eq!(adc_to_voltage(1234, &divider), 0.0);
    }

    #[test]
    fn test_current_at_known_point() {
        // 1.65 V across 10k = 0.165 mA
        assert!(close(ohmic_current_ma(1.65, 10_000.0), 0.165, 1e-6));
        assert_eq!(ohmic_current_ma(1.65, 0.0), 0.0);
    }

    proptest! {
        #[test]
        fn voltage_is_monotonic_and_bounded(a in 0u16..=4095, b in 0u16..=4095) {
            let divider = DividerConfig::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let v_lo = adc_to_voltage(lo, &divider);
            let v_hi = adc_to_voltage(hi, &divider);
            prop_assert!(v_lo <= v_hi);
            prop_assert!(v_lo >= 0.0);
            prop_assert!(v_hi <= divider.supply_voltage);
        }

        #[test]
        fn resistance_positive_strictly_between_rails(v in 0.001f32..3.299) {
            let divider = DividerConfig::default();
            prop_assert!(divider_resistance(v, &divider) > 0.0);
        }

        #[test]
        fn current_follows_resistance(raw in 0u16..=4095) {
            let m = Measurement::from_raw(raw, &DividerConfig::default());
            if m.resistance_ohms == 0.0 {
                prop_assert_eq!(m.current_ma, 0.0);
            } else {
                prop_assert_eq!(m.current_ma, m.voltage / m.resistance_ohms * 1000.0);
            }
        }
    }

    #[test]
    fn test_rails_give_zero_resistance() {
        let divider = DividerConfig::default();
        assert_eq!(divider_resistance(0.0, &divider), 0.0);
        assert_eq!(divider_resistance(3.3, &divider), 0.0);
        assert_eq!(divider_resistance(4.0, &divider), 0.0);
    }
}
