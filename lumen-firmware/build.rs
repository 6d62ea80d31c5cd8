//! Build script for lumen-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates monitor.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys each section accepts
const SECTIONS: &[(&str, &[&str])] = &[
    ("divider", &["supply_voltage", "full_scale", "fixed_resistor_ohms"]),
    ("acquisition", &["period_ms", "adc_channel", "priority", "stack_bytes"]),
    ("presentation", &["period_ms", "display_lock_ms", "priority", "stack_bytes"]),
    ("link", &["kind", "lock_bound_ms", "send_policy", "send_wait_ms"]),
    ("display", &["layout", "rotation"]),
    ("bar", &["source", "lo", "hi", "inverted", "bands", "fallback", "solid"]),
    ("boot", &["settle_ms", "stack_budget"]),
];

/// Ladder capacity in the firmware
const MAX_BANDS: usize = 4;

/// Smallest stack a task may declare
const MIN_STACK_BYTES: i64 = 512;

const COLORS: &[&str] = &[
    "black", "blue", "red", "green", "cyan", "magenta", "yellow", "white",
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate monitor.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=monitor.toml");

    let config_path = Path::new("monitor.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: monitor.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds a monitor.toml configuration file.          ║\n\
            ║  Please create one in the lumen-firmware directory.              ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read monitor.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in monitor.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_keys(&config, &mut errors);
    validate_enums(&config, &mut errors);
    validate_ranges(&config, &mut errors);
    validate_bar_range(&config, &mut errors);
    validate_budget(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid monitor configuration                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=monitor.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn get<'a>(config: &'a toml::Value, section: &str, key: &str) -> Option<&'a toml::Value> {
    config.get(section).and_then(|s| s.get(key))
}

/// Every section and key must be one the firmware parser knows
fn validate_keys(config: &toml::Value, errors: &mut Vec<String>) {
    let table = match config.as_table() {
        Some(t) => t,
        None => return,
    };

    for (name, section) in table {
        let known = match SECTIONS.iter().find(|(s, _)| s == name) {
            Some((_, keys)) => keys,
            None => {
                errors.push(format!("unknown section [{}]", name));
                continue;
            }
        };
        let section = match section.as_table() {
            Some(t) => t,
            None => {
                errors.push(format!("[{}] must be a table", name));
                continue;
            }
        };
        for key in section.keys() {
            if !known.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", name, key));
            }
        }
    }
}

fn check_choice(
    config: &toml::Value,
    section: &str,
    key: &str,
    choices: &[&str],
    errors: &mut Vec<String>,
) {
    match get(config, section, key) {
        None => {}
        Some(toml::Value::String(v)) if choices.contains(&v.as_str()) => {}
        Some(_) => errors.push(format!(
            "[{}] {} must be one of: {}",
            section,
            key,
            choices.join(", ")
        )),
    }
}

/// String-valued keys must name a known variant
fn validate_enums(config: &toml::Value, errors: &mut Vec<String>) {
    let priorities = ["low", "normal", "high"];
    check_choice(config, "acquisition", "priority", &priorities, errors);
    check_choice(config, "presentation", "priority", &priorities, errors);
    check_choice(config, "link", "kind", &["store", "channel"], errors);
    check_choice(
        config,
        "link",
        "send_policy",
        &["block", "drop_newest", "drop_oldest"],
        errors,
    );
    check_choice(config, "display", "layout", &["light", "voltage"], errors);
    check_choice(
        config,
        "bar",
        "source",
        &["voltage", "resistance", "current"],
        errors,
    );
    check_choice(config, "bar", "fallback", COLORS, errors);
    check_choice(config, "bar", "solid", COLORS, errors);

    if let Some(bands) = get(config, "bar", "bands") {
        validate_bands(bands, errors);
    }
}

/// Same rules the firmware parser and ladder apply
fn validate_bands(bands: &toml::Value, errors: &mut Vec<String>) {
    let bands = match bands.as_str() {
        Some(s) if s.trim().is_empty() => return,
        Some(s) => s,
        None => {
            errors.push("[bar] bands must be a string".to_string());
            return;
        }
    };

    let mut thresholds = Vec::new();
    for band in bands.split(',') {
        let parsed = band.split_once(':').and_then(|(pct, color)| {
            let pct = pct.trim().parse::<u8>().ok().filter(|p| *p <= 100)?;
            COLORS.contains(&color.trim()).then_some(pct)
        });
        match parsed {
            Some(pct) => thresholds.push(pct),
            None => errors.push(format!(
                "[bar] bad band '{}' (want <0-100>:<color>)",
                band.trim()
            )),
        }
    }

    if thresholds.len() > MAX_BANDS {
        errors.push(format!("[bar] at most {} bands", MAX_BANDS));
    }
    if thresholds.windows(2).any(|pair| pair[0] <= pair[1]) {
        errors.push("[bar] band thresholds must be strictly descending".to_string());
    }
}

/// Numeric keys must be in range
fn validate_ranges(config: &toml::Value, errors: &mut Vec<String>) {
    let positive_ints = [
        ("acquisition", "period_ms"),
        ("presentation", "period_ms"),
        ("presentation", "display_lock_ms"),
        ("link", "lock_bound_ms"),
        ("divider", "full_scale"),
    ];
    for (section, key) in positive_ints {
        match get(config, section, key) {
            None => {}
            Some(toml::Value::Integer(v)) if *v > 0 => {}
            Some(_) => errors.push(format!("[{}] {} must be a positive integer", section, key)),
        }
    }

    for (section, key) in [("divider", "supply_voltage"), ("divider", "fixed_resistor_ohms")] {
        let value = match get(config, section, key) {
            None => continue,
            Some(toml::Value::Float(f)) => *f,
            Some(toml::Value::Integer(i)) => *i as f64,
            Some(_) => f64::NAN,
        };
        if !(value > 0.0) {
            errors.push(format!("[{}] {} must be positive", section, key));
        }
    }

    let unsigned_ints = [
        ("link", "send_wait_ms"),
        ("boot", "settle_ms"),
        ("boot", "stack_budget"),
    ];
    for (section, key) in unsigned_ints {
        match get(config, section, key) {
            None => {}
            Some(toml::Value::Integer(v)) if (0..=u32::MAX as i64).contains(v) => {}
            Some(_) => errors.push(format!("[{}] {} must be a non-negative integer", section, key)),
        }
    }

    // The board wires the divider to GPIO26 only
    if let Some(channel) = get(config, "acquisition", "adc_channel") {
        if !matches!(channel, toml::Value::Integer(0)) {
            errors.push("[acquisition] adc_channel must be 0 (GPIO26)".to_string());
        }
    }

    if let Some(rotation) = get(config, "display", "rotation") {
        if !matches!(rotation, toml::Value::Integer(0..=3)) {
            errors.push("[display] rotation must be 0-3".to_string());
        }
    }
}

fn as_float(value: &toml::Value) -> Option<f64> {
    match value {
        toml::Value::Float(f) => Some(*f),
        toml::Value::Integer(i) => Some(*i as f64),
        _ => None,
    }
}

/// Bar bounds must be numbers with lo < hi once layout defaults fill the gaps
fn validate_bar_range(config: &toml::Value, errors: &mut Vec<String>) {
    let supply = get(config, "divider", "supply_voltage")
        .and_then(as_float)
        .unwrap_or(3.3);
    let (default_lo, default_hi) = match get(config, "display", "layout").and_then(|v| v.as_str()) {
        Some("light") => (100.0, 10_000.0),
        _ => (0.0, supply),
    };

    let mut bound = |key: &str, default: f64| match get(config, "bar", key) {
        None => Some(default),
        Some(v) => {
            let value = as_float(v);
            if value.is_none() {
                errors.push(format!("[bar] {} must be a number", key));
            }
            value
        }
    };
    let lo = bound("lo", default_lo);
    let hi = bound("hi", default_hi);

    if let (Some(lo), Some(hi)) = (lo, hi) {
        if !(lo < hi) {
            errors.push(format!("[bar] lo ({}) must be below hi ({})", lo, hi));
        }
    }
}

/// Per-task budgets must fit the total
fn validate_budget(config: &toml::Value, errors: &mut Vec<String>) {
    let stack = |section: &str, default: i64| {
        get(config, section, "stack_bytes")
            .and_then(|v| v.as_integer())
            .unwrap_or(default)
    };
    let acquisition = stack("acquisition", 2048);
    let presentation = stack("presentation", 4096);
    let budget = get(config, "boot", "stack_budget")
        .and_then(|v| v.as_integer())
        .unwrap_or(16 * 1024);

    for (name, bytes) in [("acquisition", acquisition), ("presentation", presentation)] {
        if bytes < MIN_STACK_BYTES {
            errors.push(format!(
                "[{}] stack_bytes must be at least {}",
                name, MIN_STACK_BYTES
            ));
        }
    }
    if acquisition.saturating_add(presentation) > budget {
        errors.push(format!(
            "task stacks ({} bytes) exceed [boot] stack_budget ({})",
            acquisition.saturating_add(presentation),
            budget
        ));
    }
}
