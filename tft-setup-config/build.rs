//! Build script for tft-setup-config
//!
//! Validates user_setup.toml at compile time so a broken display setup
//! fails the build instead of the first boot.

use std::fs;
use std::path::Path;

use tft_setup_core::config::{check_output_pin, is_valid_info, DriverKind, Font, SetupError};

#[path = "src/syntax.rs"]
mod syntax;

use syntax::{clip, parse_line, SyntaxError, SECTIONS};

/// Inner width of the report box
const BOX_WIDTH: usize = 64;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/syntax.rs");
    validate_config();
}

/// Validate user_setup.toml at compile time
fn validate_config() {
    // Re-run if user_setup.toml changes
    println!("cargo:rerun-if-changed=user_setup.toml");

    let config_path = Path::new("user_setup.toml");

    if !config_path.exists() {
        fail(
            "user_setup.toml not found",
            &["Expected next to Cargo.toml in tft-setup-config".to_string()],
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read user_setup.toml", &[e.to_string()]),
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let lines: Vec<String> = e.to_string().lines().map(str::to_string).collect();
            fail("Invalid TOML syntax in user_setup.toml", &lines);
        }
    };

    // Valid TOML is not enough: the firmware reads the file with a subset parser
    validate_subset(&config_content);
    validate_sections(&config);

    validate_setup(&config);
    validate_pins(&config);
    validate_display(&config);
    validate_fonts(&config);
    validate_backlight(&config);

    println!("cargo:warning=user_setup.toml validated successfully");
}

/// Cut a message to fit the report box
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        format!("{}...", clip(text, width - 3))
    } else {
        text.to_string()
    }
}

/// Abort the build with a boxed list of errors
fn fail(title: &str, errors: &[String]) -> ! {
    let rule = "═".repeat(BOX_WIDTH + 2);
    let body = errors
        .iter()
        .map(|e| format!("║  • {:<w$} ║", fit(e, BOX_WIDTH - 3), w = BOX_WIDTH - 3))
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n╔{rule}╗\n║  ERROR: {:<w$} ║\n╠{rule}╣\n{}\n╚{rule}╝\n",
        fit(title, BOX_WIDTH - 8),
        body,
        rule = rule,
        w = BOX_WIDTH - 8,
    );
}

/// Check every line against the syntax the runtime parser accepts
fn validate_subset(content: &str) {
    let errors: Vec<String> = content
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let reason = match parse_line(line).err()? {
                SyntaxError::UnknownSection => "unknown section",
                SyntaxError::Malformed => "not `[section]` or `key = value`",
                SyntaxError::UnsupportedValue => "value not supported by the firmware parser",
            };
            Some(format!("line {}: {}", i + 1, reason))
        })
        .collect();

    if !errors.is_empty() {
        fail("Unsupported TOML in user_setup.toml", &errors);
    }
}

fn section<'a>(config: &'a toml::Value, name: &str) -> Option<&'a toml::value::Table> {
    config.get(name).and_then(|s| s.as_table())
}

/// Validate that required sections exist and nothing else does
fn validate_sections(config: &toml::Value) {
    let mut errors: Vec<String> = ["setup", "pins", "display"]
        .iter()
        .filter(|name| section(config, name).is_none())
        .map(|name| format!("Missing [{}] section", name))
        .collect();

    if let Some(root) = config.as_table() {
        for (name, value) in root {
            if value.is_table() && !SECTIONS.contains(&name.as_str()) {
                errors.push(format!("Unknown [{}] section", name));
            }
        }
    }

    if !errors.is_empty() {
        fail("Invalid sections in user_setup.toml", &errors);
    }
}

/// Validate the [setup] section
fn validate_setup(config: &toml::Value) {
    let Some(setup) = section(config, "setup") else {
        return;
    };

    let mut errors = Vec::new();

    match setup.get("driver") {
        Some(toml::Value::String(name)) => {
            if DriverKind::from_name(name).is_none() {
                errors.push(format!("[setup] unknown driver '{}'", name));
            }
        }
        Some(_) => errors.push("[setup] driver must be a string".to_string()),
        None => errors.push("[setup] missing 'driver'".to_string()),
    }

    if let Some(info) = setup.get("info") {
        match info.as_str() {
            Some(s) if s.len() > tft_setup_core::config::MAX_INFO_LEN => {
                errors.push("[setup] info is too long".to_string())
            }
            Some(s) if !is_valid_info(s) => errors.push(
                "[setup] info must be printable ASCII without quotes or comments".to_string(),
            ),
            Some(_) => {}
            None => errors.push("[setup] info must be a string".to_string()),
        }
    }

    if !errors.is_empty() {
        fail("Invalid [setup] section", &errors);
    }
}

/// Read a pin given as `23`, `"gpio23"` or `-1`
fn pin_number(value: &toml::Value) -> Option<i64> {
    match value {
        toml::Value::Integer(n) => Some(*n),
        toml::Value::String(s) => s.strip_prefix("gpio").unwrap_or(s.as_str()).parse().ok(),
        _ => None,
    }
}

/// Validate the [pins] section
fn validate_pins(config: &toml::Value) {
    let Some(pins) = section(config, "pins") else {
        return;
    };

    let mut errors = Vec::new();
    let mut used: Vec<(i64, String)> = Vec::new();

    for (key, required) in [
        ("mosi", true),
        ("sclk", true),
        ("cs", false),
        ("dc", true),
        ("rst", false),
    ] {
        let Some(value) = pins.get(key) else {
            if required {
                errors.push(format!("[pins] missing '{}'", key));
            }
            continue;
        };

        match pin_number(value) {
            Some(-1) if !required => {}
            Some(pin) => check_pin(&format!("[pins] {}", key), pin, &mut used, &mut errors),
            None => errors.push(format!("[pins] {} must be a pin number", key)),
        }
    }

    if let Some(value) = section(config, "backlight").and_then(|b| b.get("pin")) {
        match pin_number(value) {
            Some(-1) => {}
            Some(pin) => check_pin("[backlight] pin", pin, &mut used, &mut errors),
            None => errors.push("[backlight] pin must be a pin number".to_string()),
        }
    }

    if !errors.is_empty() {
        fail("Invalid pin assignment", &errors);
    }
}

fn check_pin(what: &str, pin: i64, used: &mut Vec<(i64, String)>, errors: &mut Vec<String>) {
    let Ok(gpio) = u8::try_from(pin) else {
        errors.push(format!("{} = {} is not a GPIO", what, pin));
        return;
    };

    match check_output_pin(gpio) {
        Ok(()) => {}
        Err(SetupError::InputOnlyPin(_)) => {
            errors.push(format!("{} = {} is input-only", what, pin))
        }
        Err(SetupError::FlashPin(_)) => {
            errors.push(format!("{} = {} is reserved for flash", what, pin))
        }
        Err(_) => errors.push(format!("{} = {} is not a GPIO", what, pin)),
    }

    if let Some((_, other)) = used.iter().find(|(p, _)| *p == pin) {
        errors.push(format!("{} = {} already used by {}", what, pin, other));
    }
    used.push((pin, what.to_string()));
}

/// Validate the [display] section
fn validate_display(config: &toml::Value) {
    let Some(display) = section(config, "display") else {
        return;
    };

    let mut errors = Vec::new();

    for key in ["width", "height"] {
        match display.get(key) {
            Some(toml::Value::Integer(n)) if (1..=i64::from(u16::MAX)).contains(n) => {}
            Some(_) => errors.push(format!("[display] {} must be 1-65535", key)),
            None => errors.push(format!("[display] missing '{}'", key)),
        }
    }

    match display.get("rotation") {
        None | Some(toml::Value::Integer(0..=3)) => {}
        Some(_) => errors.push("[display] rotation must be 0-3".to_string()),
    }

    match display.get("spi_frequency") {
        None => {}
        Some(toml::Value::Integer(n)) if (1..=80_000_000).contains(n) => {}
        Some(_) => errors.push("[display] spi_frequency must be 1-80000000".to_string()),
    }

    if !errors.is_empty() {
        fail("Invalid [display] section", &errors);
    }
}

/// Validate the [fonts] section
fn validate_fonts(config: &toml::Value) {
    let Some(fonts) = section(config, "fonts") else {
        return;
    };

    let mut errors = Vec::new();

    match fonts.get("load") {
        None => {}
        Some(toml::Value::Array(names)) => {
            for name in names {
                match name.as_str() {
                    Some(n) if Font::from_name(n).is_some() => {}
                    Some(n) => errors.push(format!("[fonts] unknown font '{}'", n)),
                    None => errors.push("[fonts] load entries must be strings".to_string()),
                }
            }
        }
        Some(_) => errors.push("[fonts] load must be an array".to_string()),
    }

    if let Some(smooth) = fonts.get("smooth") {
        if !smooth.is_bool() {
            errors.push("[fonts] smooth must be true or false".to_string());
        }
    }

    if !errors.is_empty() {
        fail("Invalid [fonts] section", &errors);
    }
}

/// Validate the [backlight] section
fn validate_backlight(config: &toml::Value) {
    let Some(backlight) = section(config, "backlight") else {
        return;
    };

    if let Some(level) = backlight.get("on") {
        let valid = matches!(
            level.as_str(),
            Some(l) if l.eq_ignore_ascii_case("high") || l.eq_ignore_ascii_case("low")
        );
        if !valid {
            fail(
                "Invalid [backlight] section",
                &["[backlight] on must be 'high' or 'low'".to_string()],
            );
        }
    }
}
