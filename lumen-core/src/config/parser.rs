//! Simple TOML parser for the monitor configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `monitor.toml`. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer, float, boolean)
//! - [section] headers
//! - Comments (# ...)
//!
//! NOT supported:
//! - Arrays and inline tables (ladder bands are a string: "70:green,30:yellow")
//! - Multi-line strings
//! - Dotted keys

use heapless::Vec;

use super::types::{LinkKind, MonitorConfig, SendPolicyKind};
use crate::scheduler::Priority;
use crate::screen::{BarSource, ColorBand, ColorLadder, LayoutKind, MAX_BANDS};
use crate::traits::{Color, Rotation};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown section header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Invalid value type
    InvalidValue,
    /// Too many items (exceeded heapless capacity)
    TooManyItems,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Divider,
    Acquisition,
    Presentation,
    Link,
    Display,
    Bar,
    Boot,
}

/// Most `[bar]` entries a file may carry
const MAX_BAR_ENTRIES: usize = 16;

/// Parse TOML configuration into MonitorConfig
///
/// Keys that are absent keep their default. The bar starts from the one
/// that goes with the final layout and divider, then takes the `[bar]`
/// entries, so section order does not matter.
pub fn parse_config(input: &str) -> Result<MonitorConfig, ParseError> {
    let mut config = MonitorConfig::default();
    let mut section = Section::Root;
    let mut bar_entries: Vec<(&str, &str), MAX_BAR_ENTRIES> = Vec::new();

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Check for section header
        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        // Parse key = value
        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        if section == Section::Bar {
            bar_entries
                .push((key, value))
                .map_err(|_| ParseError::TooManyItems)?;
        } else {
            apply_value(section, key, value, &mut config)?;
        }
    }

    config.bar = MonitorConfig::default_bar(config.display.layout, &config.divider);
    for (key, value) in bar_entries {
        apply_value(Section::Bar, key, value, &mut config)?;
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "divider" => Ok(Section::Divider),
        "acquisition" => Ok(Section::Acquisition),
        "presentation" => Ok(Section::Presentation),
        "link" => Ok(Section::Link),
        "display" => Ok(Section::Display),
        "bar" => Ok(Section::Bar),
        "boot" => Ok(Section::Boot),
        _ => Err(ParseError::InvalidSection),
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_string(value: &str) -> &str {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_float(value: &str) -> Result<f32, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_priority(value: &str) -> Result<Priority, ParseError> {
    match parse_string(value) {
        "low" => Ok(Priority::Low),
        "normal" => Ok(Priority::Normal),
        "high" => Ok(Priority::High),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_link_kind(value: &str) -> Result<LinkKind, ParseError> {
    match parse_string(value) {
        "store" => Ok(LinkKind::Store),
        "channel" => Ok(LinkKind::Channel),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_send_policy(value: &str) -> Result<SendPolicyKind, ParseError> {
    match parse_string(value) {
        "block" => Ok(SendPolicyKind::Block),
        "drop_newest" => Ok(SendPolicyKind::DropNewest),
        "drop_oldest" => Ok(SendPolicyKind::DropOldest),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_layout(value: &str) -> Result<LayoutKind, ParseError> {
    match parse_string(value) {
        "light" => Ok(LayoutKind::Light),
        "voltage" => Ok(LayoutKind::Voltage),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_rotation(value: &str) -> Result<Rotation, ParseError> {
    Rotation::from_index(parse_int(value)?).ok_or(ParseError::InvalidValue)
}

fn parse_source(value: &str) -> Result<BarSource, ParseError> {
    match parse_string(value) {
        "voltage" => Ok(BarSource::Voltage),
        "resistance" => Ok(BarSource::Resistance),
        "current" => Ok(BarSource::Current),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_color(value: &str) -> Result<Color, ParseError> {
    Color::from_name(parse_string(value).trim()).ok_or(ParseError::InvalidValue)
}

/// Parse ladder bands like "70:green,30:yellow"
fn parse_bands(value: &str) -> Result<Vec<ColorBand, MAX_BANDS>, ParseError> {
    let mut bands = Vec::new();
    let value = parse_string(value).trim();
    if value.is_empty() {
        return Ok(bands);
    }

    for entry in value.split(',') {
        let (threshold, color) = entry.split_once(':').ok_or(ParseError::InvalidValue)?;
        let above_percent: u8 = parse_int(threshold.trim())?;
        if above_percent > 100 {
            return Err(ParseError::InvalidValue);
        }
        bands
            .push(ColorBand {
                above_percent,
                color: parse_color(color)?,
            })
            .map_err(|_| ParseError::TooManyItems)?;
    }
    Ok(bands)
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut MonitorConfig,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Divider, "supply_voltage") => config.divider.supply_voltage = parse_float(value)?,
        (Section::Divider, "full_scale") => config.divider.full_scale = parse_int(value)?,
        (Section::Divider, "fixed_resistor_ohms") => {
            config.divider.fixed_resistor_ohms = parse_float(value)?
        }

        (Section::Acquisition, "period_ms") => config.acquisition.period_ms = parse_int(value)?,
        (Section::Acquisition, "adc_channel") => config.acquisition.adc_channel = parse_int(value)?,
        (Section::Acquisition, "priority") => config.acquisition.task.priority = parse_priority(value)?,
        (Section::Acquisition, "stack_bytes") => {
            config.acquisition.task.stack_bytes = parse_int(value)?
        }

        (Section::Presentation, "period_ms") => config.presentation.period_ms = parse_int(value)?,
        (Section::Presentation, "display_lock_ms") => {
            config.presentation.display_lock_ms = parse_int(value)?
        }
        (Section::Presentation, "priority") => {
            config.presentation.task.priority = parse_priority(value)?
        }
        (Section::Presentation, "stack_bytes") => {
            config.presentation.task.stack_bytes = parse_int(value)?
        }

        (Section::Link, "kind") => config.link.kind = parse_link_kind(value)?,
        (Section::Link, "lock_bound_ms") => config.link.lock_bound_ms = parse_int(value)?,
        (Section::Link, "send_policy") => config.link.send_policy = parse_send_policy(value)?,
        (Section::Link, "send_wait_ms") => config.link.send_wait_ms = parse_int(value)?,

        (Section::Display, "layout") => config.display.layout = parse_layout(value)?,
        (Section::Display, "rotation") => config.display.rotation = Some(parse_rotation(value)?),

        (Section::Bar, "source") => config.bar.source = parse_source(value)?,
        (Section::Bar, "lo") => config.bar.lo = parse_float(value)?,
        (Section::Bar, "hi") => config.bar.hi = parse_float(value)?,
        (Section::Bar, "inverted") => config.bar.inverted = parse_bool(value)?,
        (Section::Bar, "bands") => config.bar.ladder.bands = parse_bands(value)?,
        (Section::Bar, "fallback") => config.bar.ladder.fallback = parse_color(value)?,
        (Section::Bar, "solid") => config.bar.ladder = ColorLadder::solid(parse_color(value)?),

        (Section::Boot, "settle_ms") => config.boot.settle_ms = parse_int(value)?,
        (Section::Boot, "stack_budget") => config.boot.stack_budget = parse_int(value)?,

        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}
