//! Simple TOML parser for sensor configuration
//!
//! This is a minimal parser that handles only the subset needed for the
//! sensor configuration. It does NOT support the full TOML spec and needs
//! no allocator.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - `[sensor]` and `[sensor.outputs]` section headers
//! - Comments (# ...), including trailing comments
//! - Durations as strings: `"30s"`, `"500ms"`, `"2min"`, or bare milliseconds
//!
//! ```toml
//! [sensor]
//! variant = "n702b"
//! update_interval = "30s"
//! stale_timeout = "60s"
//!
//! [sensor.outputs]
//! eco2 = true
//! temperature = true
//! sensor_status = true
//! ```
//!
//! Outputs not listed are disabled once an `[sensor.outputs]` section is
//! present; without one, every output stays enabled.

use airq_protocol::{Quantity, Variant};

use super::types::{QuantitySet, SensorConfig};

/// What went wrong while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseErrorKind {
    /// Unknown or malformed section header
    InvalidSection,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Key not recognised in this section
    UnknownKey,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Duration string could not be parsed
    InvalidDuration,
    /// Variant name not supported
    UnknownVariant,
}

/// Parse error with the 1-based line it occurred on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Sensor,
    Outputs,
}

/// Values collected before defaults can be resolved
#[derive(Default)]
struct Pending {
    variant: Option<Variant>,
    update_interval_ms: Option<u32>,
    stale_timeout_ms: Option<u32>,
    max_noise_bytes: Option<u16>,
    quantities: Option<QuantitySet>,
    data_valid: Option<bool>,
    sensor_status: Option<bool>,
}

/// Parse TOML configuration into a [`SensorConfig`]
pub fn parse_config(input: &str) -> Result<SensorConfig, ParseError> {
    let mut section = Section::Root;
    let mut pending = Pending::default();

    for (index, line) in input.lines().enumerate() {
        let at = |kind| ParseError {
            line: index + 1,
            kind,
        };
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = strip_comment(line);
            if !header.ends_with(']') {
                return Err(at(ParseErrorKind::InvalidSection));
            }
            section = parse_section_header(&header[1..header.len() - 1]).map_err(at)?;
            if section == Section::Outputs && pending.quantities.is_none() {
                // Listing outputs switches to opt-in
                pending.quantities = Some(QuantitySet::empty());
                pending.data_valid = pending.data_valid.or(Some(false));
                pending.sensor_status = pending.sensor_status.or(Some(false));
            }
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(at(ParseErrorKind::InvalidLine))?;
        apply_value(section, key, value, &mut pending).map_err(at)?;
    }

    Ok(resolve(pending))
}

fn resolve(pending: Pending) -> SensorConfig {
    let mut config = SensorConfig::new(pending.variant.unwrap_or_default());

    if let Some(ms) = pending.update_interval_ms {
        config.update_interval_ms = ms;
    }
    if let Some(ms) = pending.stale_timeout_ms {
        config.stale_timeout_ms = ms;
    }
    if let Some(bytes) = pending.max_noise_bytes {
        config.max_noise_bytes = bytes;
    }
    if let Some(quantities) = pending.quantities {
        config.quantities = quantities;
    }
    if let Some(enabled) = pending.data_valid {
        config.data_valid = enabled;
    }
    if let Some(enabled) = pending.sensor_status {
        config.sensor_status = enabled;
    }

    config
}

fn parse_section_header(header: &str) -> Result<Section, ParseErrorKind> {
    match header.trim() {
        "sensor" => Ok(Section::Sensor),
        "sensor.outputs" => Ok(Section::Outputs),
        _ => Err(ParseErrorKind::InvalidSection),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    pending: &mut Pending,
) -> Result<(), ParseErrorKind> {
    match section {
        Section::Root => Err(ParseErrorKind::UnknownKey),
        Section::Sensor => match key {
            "variant" => {
                let name = parse_string(value);
                let variant = Variant::from_name(name).ok_or(ParseErrorKind::UnknownVariant)?;
                pending.variant = Some(variant);
                Ok(())
            }
            "update_interval" | "update_interval_ms" => {
                let ms = parse_duration_ms(value)?;
                if ms == 0 {
                    return Err(ParseErrorKind::InvalidValue);
                }
                pending.update_interval_ms = Some(ms);
                Ok(())
            }
            "stale_timeout" | "stale_timeout_ms" => {
                pending.stale_timeout_ms = Some(parse_duration_ms(value)?);
                Ok(())
            }
            "max_noise_bytes" => {
                pending.max_noise_bytes = Some(parse_int(value)?);
                Ok(())
            }
            _ => Err(ParseErrorKind::UnknownKey),
        },
        Section::Outputs => {
            let enabled = parse_bool(value)?;
            match key {
                "data_valid" => pending.data_valid = Some(enabled),
                "sensor_status" => pending.sensor_status = Some(enabled),
                _ => {
                    let quantity = Quantity::from_key(key).ok_or(ParseErrorKind::UnknownKey)?;
                    let set = pending.quantities.get_or_insert(QuantitySet::empty());
                    if enabled {
                        set.insert(quantity);
                    } else {
                        set.remove(quantity);
                    }
                }
            }
            Ok(())
        }
    }
}

/// Remove a trailing comment that is not inside a string
fn strip_comment(text: &str) -> &str {
    match text.find('#') {
        Some(hash_pos) if text[..hash_pos].matches('"').count() % 2 == 0 => {
            text[..hash_pos].trim()
        }
        _ => text,
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(line[eq_pos + 1..].trim());

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

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseErrorKind> {
    value.parse().map_err(|_| ParseErrorKind::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ParseErrorKind> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseErrorKind::InvalidValue),
    }
}

/// Parse `"30s"`, `"500ms"`, `"2min"`, `"1h"` or a bare integer (milliseconds)
fn parse_duration_ms(value: &str) -> Result<u32, ParseErrorKind> {
    let text = parse_string(value).trim();
    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (digits, unit) = text.split_at(split);

    let amount: u32 = digits.parse().map_err(|_| ParseErrorKind::InvalidDuration)?;
    let scale = match unit.trim() {
        "" | "ms" => 1,
        "s" => 1_000,
        "min" => 60_000,
        "h" => 3_600_000,
        _ => return Err(ParseErrorKind::InvalidDuration),
    };

    amount
        .checked_mul(scale)
        .ok_or(ParseErrorKind::InvalidDuration)
}
