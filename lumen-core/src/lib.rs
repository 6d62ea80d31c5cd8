//! Board-agnostic core logic for the Lumen sensor monitor firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Measurement math for the photoresistor voltage divider
//! - Runtime primitives: task registry, task state machine, bounded-wait
//!   mutex, bounded measurement queue, cooperative cancellation
//! - The shared measurement store and the link strategies tying the
//!   acquisition and presentation tasks together
//! - Collaborator traits (analog input, display, touch)
//! - Screen layout and render sequencing
//! - The task bodies themselves
//! - Configuration type definitions and the `monitor.toml` parser
//!
//! # Testing
//!
//! Everything here runs on the host:
//! ```bash
//! cargo test -p lumen-core
//! ```

#![no_std]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to every module below
#[macro_use]
mod fmt;

pub mod config;
pub mod link;
pub mod measurement;
pub mod scheduler;
pub mod screen;
pub mod store;
pub mod tasks;
pub mod traits;

pub use link::{MeasurementChannel, MeasurementLink, Pacing, Publish};
pub use measurement::{DividerConfig, Measurement};
pub use store::MeasurementStore;

#[cfg(test)]
extern crate std;

#[cfg(test)]
mod testing;
