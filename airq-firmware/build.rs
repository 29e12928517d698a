//! Build script for airq-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates sensor.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const VARIANTS: [&str; 3] = ["m702", "m702uart", "n702b"];

const OUTPUTS: [&str; 9] = [
    "eco2",
    "ozone",
    "tvoc",
    "pm_2_5",
    "pm_10",
    "temperature",
    "humidity",
    "data_valid",
    "sensor_status",
];

const SENSOR_KEYS: [&str; 7] = [
    "variant",
    "update_interval",
    "update_interval_ms",
    "stale_timeout",
    "stale_timeout_ms",
    "max_noise_bytes",
    "outputs",
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

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate sensor.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=sensor.toml");

    let config_path = Path::new("sensor.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: sensor.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a sensor.toml configuration file.         ║\n\
            ║  Please create one in the airq-firmware directory.               ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read sensor.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in sensor.toml                       ║\n\
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
    validate_sensor(&config, &mut errors);
    validate_outputs(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid sensor configuration                             ║\n\
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

    println!("cargo:warning=sensor.toml validated successfully");
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

/// Validate the [sensor] table
fn validate_sensor(config: &toml::Value, errors: &mut Vec<String>) {
    let sensor = match config.get("sensor") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[sensor] must be a table".to_string());
            return;
        }
        None => {
            errors.push("Missing [sensor] section".to_string());
            return;
        }
    };

    for key in sensor.keys() {
        if !SENSOR_KEYS.contains(&key.as_str()) {
            errors.push(format!("[sensor] unknown key '{}'", key));
        }
    }

    match sensor.get("variant") {
        Some(toml::Value::String(name)) => {
            if !VARIANTS.contains(&name.to_ascii_lowercase().as_str()) {
                errors.push(format!("[sensor] variant must be 'm702' or 'n702b', not '{}'", name));
            }
        }
        Some(_) => errors.push("[sensor] variant must be a string".to_string()),
        None => {}
    }

    for key in ["update_interval", "update_interval_ms", "stale_timeout", "stale_timeout_ms"] {
        if let Some(value) = sensor.get(key) {
            match duration_ms(value) {
                Some(0) if key.starts_with("update") => {
                    errors.push(format!("[sensor] {} must be greater than zero", key));
                }
                Some(_) => {}
                None => errors.push(format!("[sensor] {} is not a valid duration", key)),
            }
        }
    }

    if let Some(value) = sensor.get("max_noise_bytes") {
        match value {
            toml::Value::Integer(n) if (0..=i64::from(u16::MAX)).contains(n) => {}
            _ => errors.push("[sensor] max_noise_bytes must be 0-65535".to_string()),
        }
    }
}

/// Validate the optional [sensor.outputs] table
fn validate_outputs(config: &toml::Value, errors: &mut Vec<String>) {
    let outputs = match config.get("sensor").and_then(|s| s.get("outputs")) {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[sensor.outputs] must be a table".to_string());
            return;
        }
        None => return,
    };

    for (key, value) in outputs {
        if !OUTPUTS.contains(&key.as_str()) {
            errors.push(format!("[sensor.outputs] unknown output '{}'", key));
        } else if !value.is_bool() {
            errors.push(format!("[sensor.outputs] {} must be true or false", key));
        }
    }
}

/// Duration in milliseconds from `"30s"`, `"500ms"`, `"2min"`, `"1h"` or an integer
fn duration_ms(value: &toml::Value) -> Option<u64> {
    match value {
        toml::Value::Integer(ms) => u64::try_from(*ms).ok(),
        toml::Value::String(text) => {
            let text = text.trim();
            let split = text
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(text.len());
            let (digits, unit) = text.split_at(split);
            let amount: u64 = digits.parse().ok()?;
            let scale = match unit.trim() {
                "" | "ms" => 1,
                "s" => 1_000,
                "min" => 60_000,
                "h" => 3_600_000,
                _ => return None,
            };
            amount
                .checked_mul(scale)
                .filter(|ms| *ms <= u64::from(u32::MAX))
        }
        _ => None,
    }
}
