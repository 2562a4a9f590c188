//! Line-oriented config file parser.
//!
//! ```text
//!   W = 15                    # watchdog timeout (seconds)
//!   L = /var/log/plant.log    # event log
//!   S = /var/log/plant.stat   # pump statistics
//! ```
//!
//! The first character of a line selects the field.  Any other leading
//! character (blank lines and comments included) makes the line inert.
//! Each line is tokenized once into `(key, value)` and the key dispatches
//! to a setter; a line that cannot produce a value leaves its field as it
//! was and is reported as a [`ConfigWarning`].

use core::fmt;
use std::io::{self, BufRead};

use super::{ConfigPath, Configuration};

/// Longest accepted line, in bytes, excluding the `\n` or `\r\n` terminator.
pub const MAX_LINE_LEN: usize = 255;

const COMMENT: char = '#';
const SEPARATOR: char = '=';

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    WatchdogTimeout,
    LogFile,
    StatFile,
}

impl ConfigKey {
    /// Classify a line by its first byte.
    pub fn from_marker(byte: u8) -> Option<Self> {
        match byte {
            b'W' => Some(Self::WatchdogTimeout),
            b'L' => Some(Self::LogFile),
            b'S' => Some(Self::StatFile),
            _ => None,
        }
    }

    pub fn marker(self) -> char {
        match self {
            Self::WatchdogTimeout => 'W',
            Self::LogFile => 'L',
            Self::StatFile => 'S',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A recognised key and the raw text between `=` and the terminator.
    Entry { key: ConfigKey, value: &'a str },
    /// A recognised key with no `=` before the terminator.
    MissingSeparator(ConfigKey),
    /// Not a config line.
    Ignored,
}

/// Split one line into a token.  The value ends at `#`, `\n`, `\r` or the
/// end of the line, whichever comes first.
pub fn tokenize_line(line: &str) -> Token<'_> {
    let Some(key) = line.bytes().next().and_then(ConfigKey::from_marker) else {
        return Token::Ignored;
    };

    let end = line
        .find([COMMENT, '\n', '\r'])
        .unwrap_or(line.len());
    let body = &line[..end];

    match body.find(SEPARATOR) {
        Some(eq) => Token::Entry {
            key,
            value: &body[eq + 1..],
        },
        None => Token::MissingSeparator(key),
    }
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Key present but no `=` before the comment / end of line.
    MissingSeparator,
    /// Timeout value contains no digits.
    NoDigits,
    /// Timeout value does not fit in 32 bits.
    Overflow,
    /// Path value is empty after removing spaces.
    EmptyValue,
    /// Path value exceeds the path buffer.
    PathTooLong,
    /// Line exceeds [`MAX_LINE_LEN`].
    LineTooLong,
    /// Line is not valid UTF-8.
    Unreadable,
}

/// A config line that was recognised but could not be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigWarning {
    /// 1-based line number.
    pub line: usize,
    pub key: ConfigKey,
    pub kind: WarningKind,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            WarningKind::MissingSeparator => "has no '=', ignored",
            WarningKind::NoDigits => "timeout has no digits, ignored",
            WarningKind::Overflow => "timeout is too large, ignored",
            WarningKind::EmptyValue => "path is empty, ignored",
            WarningKind::PathTooLong => "path is too long, ignored",
            WarningKind::LineTooLong => "line is too long, ignored",
            WarningKind::Unreadable => "line is not valid text, ignored",
        };
        write!(f, "config line {} ('{}'): {}", self.line, self.key.marker(), what)
    }
}

/// Outcome of parsing a whole file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReport {
    pub config: Configuration,
    pub warnings: Vec<ConfigWarning>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse `reader` line by line on top of `base`.
///
/// Only I/O failures are errors; malformed lines become warnings.
pub fn parse<R: BufRead>(mut reader: R, base: Configuration) -> io::Result<ParseReport> {
    let mut config = base;
    let mut warnings = Vec::new();
    let mut raw = Vec::with_capacity(MAX_LINE_LEN + 1);
    let mut line_no = 0;

    while let Some(overflowed) = read_bounded_line(&mut reader, &mut raw)? {
        line_no += 1;
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }

        let Some(key) = raw.first().copied().and_then(ConfigKey::from_marker) else {
            continue;
        };
        let mut warn = |kind| {
            log::warn!("{}", ConfigWarning { line: line_no, key, kind });
            warnings.push(ConfigWarning {
                line: line_no,
                key,
                kind,
            });
        };

        if overflowed || raw.len() > MAX_LINE_LEN {
            warn(WarningKind::LineTooLong);
            continue;
        }
        let Ok(line) = core::str::from_utf8(&raw) else {
            warn(WarningKind::Unreadable);
            continue;
        };

        match tokenize_line(line) {
            Token::Entry { key, value } => {
                if let Err(kind) = apply(&mut config, key, value) {
                    warn(kind);
                }
            }
            Token::MissingSeparator(_) => warn(WarningKind::MissingSeparator),
            Token::Ignored => {}
        }
    }

    Ok(ParseReport { config, warnings })
}

/// Read up to the next `\n` into `buf`, keeping at most one byte more than
/// [`MAX_LINE_LEN`] (room for a trailing `\r`) and discarding the rest.
///
/// Returns `None` at end of input, otherwise whether bytes were discarded.
fn read_bounded_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Option<bool>> {
    const CAP: usize = MAX_LINE_LEN + 1;

    buf.clear();
    let mut overflowed = false;
    let mut any = false;
    loop {
        let chunk = match reader.fill_buf() {
            Ok(chunk) => chunk,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if chunk.is_empty() {
            return Ok(any.then_some(overflowed));
        }
        any = true;

        let newline = chunk.iter().position(|&b| b == b'\n');
        let body = newline.unwrap_or(chunk.len());
        let keep = body.min(CAP - buf.len());
        buf.extend_from_slice(&chunk[..keep]);
        overflowed |= keep < body;

        reader.consume(newline.map_or(body, |n| n + 1));
        if newline.is_some() {
            return Ok(Some(overflowed));
        }
    }
}

/// Key → setter dispatch.
fn apply(config: &mut Configuration, key: ConfigKey, value: &str) -> Result<(), WarningKind> {
    match key {
        ConfigKey::WatchdogTimeout => config.watchdog_timeout_secs = parse_timeout(value)?,
        ConfigKey::LogFile => config.log_file_path = parse_path(value)?,
        ConfigKey::StatFile => config.stat_file_path = parse_path(value)?,
    }
    Ok(())
}

/// Accumulate every decimal digit left to right; anything else is skipped.
fn parse_timeout(value: &str) -> Result<u32, WarningKind> {
    let mut digits = value.bytes().filter(u8::is_ascii_digit).peekable();
    if digits.peek().is_none() {
        return Err(WarningKind::NoDigits);
    }
    digits.try_fold(0u32, |acc, d| {
        acc.checked_mul(10)
            .and_then(|v| v.checked_add(u32::from(d - b'0')))
            .ok_or(WarningKind::Overflow)
    })
}

/// Copy the value, dropping spaces and stray separators.
fn parse_path(value: &str) -> Result<ConfigPath, WarningKind> {
    let mut path = ConfigPath::new();
    for c in value.chars().filter(|&c| c != ' ' && c != SEPARATOR) {
        path.push(c).map_err(|()| WarningKind::PathTooLong)?;
    }
    if path.is_empty() {
        return Err(WarningKind::EmptyValue);
    }
    Ok(path)
}
