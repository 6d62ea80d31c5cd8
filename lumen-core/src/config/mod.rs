//! Configuration
//!
//! Monitor configuration types and the `monitor.toml` parser. The firmware
//! embeds the file at build time and parses it at boot.

pub mod parser;
pub mod types;

pub use parser::{parse_config, ParseError};
pub use types::*;
