//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in lumen-core:
//!
//! - Photoresistor divider sensor over any analog input
//! - Display adapter over any `embedded-graphics` RGB565 draw target

#![no_std]
#![deny(unsafe_code)]

pub mod display;
pub mod sensor;
