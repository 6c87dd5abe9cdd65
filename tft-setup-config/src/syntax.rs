//! Line syntax of setup files
//!
//! The subset of TOML the runtime parser understands, one line at a time.
//! `build.rs` includes this file too, so a setup file that passes the build
//! is always one the runtime parser reads the same way.
//!
//! Values are limited to:
//! - decimal integers, optionally negative
//! - `true` / `false`
//! - double-quoted strings without escapes
//! - single-line arrays of such strings

/// Sections a setup file may contain
pub const SECTIONS: [&str; 5] = ["setup", "pins", "display", "fonts", "backlight"];

/// One line of a setup file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Empty or comment-only line
    Blank,
    /// `[name]`
    Section(&'a str),
    /// `key = value` with any trailing comment removed
    KeyValue(&'a str, &'a str),
}

/// Line syntax errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    /// `[name]` for a section that does not exist
    UnknownSection,
    /// Neither a section header nor `key = value`
    Malformed,
    /// Value outside the supported subset (literal strings, escapes,
    /// multi-line arrays, hex or underscored integers, ...)
    UnsupportedValue,
}

/// Classify a single line
pub fn parse_line(line: &str) -> Result<Line<'_>, SyntaxError> {
    let line = line.trim();

    if line.is_empty() || line.starts_with('#') {
        return Ok(Line::Blank);
    }

    if line.starts_with('[') {
        let name = strip_comment(line)
            .strip_prefix('[')
            .and_then(|l| l.strip_suffix(']'))
            .ok_or(SyntaxError::Malformed)?
            .trim();
        return if SECTIONS.contains(&name) {
            Ok(Line::Section(name))
        } else {
            Err(SyntaxError::UnknownSection)
        };
    }

    let (key, value) = line.split_once('=').ok_or(SyntaxError::Malformed)?;
    let key = key.trim();
    let value = strip_comment(value);

    let bare = |b: u8| b.is_ascii_alphanumeric() || b == b'_' || b == b'-';
    if key.is_empty() || !key.bytes().all(bare) {
        return Err(SyntaxError::Malformed);
    }
    check_value(value)?;

    Ok(Line::KeyValue(key, value))
}

/// Remove a trailing `# ...` that is not inside a string
fn strip_comment(text: &str) -> &str {
    let mut in_string = false;
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return text[..i].trim(),
            _ => {}
        }
    }
    text.trim()
}

fn check_value(value: &str) -> Result<(), SyntaxError> {
    if value == "true" || value == "false" || is_integer(value) || is_string(value) {
        return Ok(());
    }

    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(SyntaxError::UnsupportedValue)?;

    let mut items = inner.split(',').map(str::trim).peekable();
    while let Some(item) = items.next() {
        // Trailing comma or empty array
        if item.is_empty() && items.peek().is_none() {
            break;
        }
        if !is_string(item) {
            return Err(SyntaxError::UnsupportedValue);
        }
    }
    Ok(())
}

fn is_integer(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_string(value: &str) -> bool {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .is_some_and(|inner| !inner.contains('"') && !inner.contains('\\'))
}

/// Longest prefix of `text` with at most `max` characters
///
/// Cuts on a character boundary, so messages quoting non-ASCII keys can be
/// shortened for the build report.
pub fn clip(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
