//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific implementations.

pub mod display;
pub mod sensor;
pub mod touch;

pub use display::{Color, DisplayDriver, DisplayError, DisplayExt, Rotation, TextStyle};
pub use sensor::{AnalogInput, MeasurementSensor, SensorError};
pub use touch::{TouchInput, TouchPoint};
