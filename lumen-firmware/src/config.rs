//! Embedded configuration
//!
//! `monitor.toml` is compiled into the image and checked by build.rs. A
//! parse or validation failure here still falls back to the built-in
//! store-linked monitor so the board always comes up.

use defmt::*;

use lumen_core::config::{parse_config, MonitorConfig};

/// Edit monitor.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../monitor.toml");

pub fn load() -> MonitorConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            warn!("Using built-in defaults");
            return MonitorConfig::default();
        }
    };

    match config.validate() {
        Ok(()) => {
            info!(
                "Configuration loaded: {:?} link, {:?} screen",
                config.link.kind, config.display.layout
            );
            config
        }
        Err(e) => {
            error!("Embedded config rejected: {:?}", e);
            warn!("Using built-in defaults");
            MonitorConfig::default()
        }
    }
}
