//! Log level definitions.
//!
//! Levels are plain signed integers so front-ends can define custom severities
//! between (or beyond) the four named thresholds, e.g. `Level::INFO + 1`.

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Log severity, ordered from most to least verbose.
///
/// The named thresholds mirror the conventional spacing of four between
/// levels; any other value is a valid custom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Level(i32);

impl Level {
    /// Debugging information.
    pub const DEBUG: Self = Self(-4);
    /// Informational messages.
    pub const INFO: Self = Self(0);
    /// Warning messages.
    pub const WARN: Self = Self(4);
    /// Error messages.
    pub const ERROR: Self = Self(8);

    /// Creates a level from a raw severity value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Returns the raw severity value.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Returns the four named thresholds in order of verbosity.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::DEBUG, Self::INFO, Self::WARN, Self::ERROR]
    }
}

impl Add<i32> for Level {
    type Output = Self;

    /// Offsets saturate at the severity bounds; a level never wraps.
    fn add(self, rhs: i32) -> Self {
        Self(self.0.saturating_add(rhs))
    }
}

impl Sub<i32> for Level {
    type Output = Self;

    /// Offsets saturate at the severity bounds; a level never wraps.
    fn sub(self, rhs: i32) -> Self {
        Self(self.0.saturating_sub(rhs))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, base) = if self.0 < Self::INFO.0 {
            ("DEBUG", Self::DEBUG.0)
        } else if self.0 < Self::WARN.0 {
            ("INFO", Self::INFO.0)
        } else if self.0 < Self::ERROR.0 {
            ("WARN", Self::WARN.0)
        } else {
            ("ERROR", Self::ERROR.0)
        };

        f.write_str(name)?;
        let delta = self.0 - base;
        if delta != 0 {
            write!(f, "{delta:+}")?;
        }
        Ok(())
    }
}

/// Error returned when parsing an invalid level string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(String);

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log level: '{}'", self.0)
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Parses a level name with an optional signed offset, e.g. `"warn"` or
    /// `"INFO+2"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, offset) = match s.find(['+', '-']) {
            Some(idx) => {
                let offset = s[idx..]
                    .parse::<i32>()
                    .map_err(|_| ParseLevelError(s.to_string()))?;
                (&s[..idx], offset)
            }
            None => (s, 0),
        };

        let base = match name.to_ascii_lowercase().as_str() {
            "debug" | "dbg" => Self::DEBUG,
            "info" | "inf" => Self::INFO,
            "warn" | "warning" | "wrn" => Self::WARN,
            "error" | "err" => Self::ERROR,
            _ => return Err(ParseLevelError(s.to_string())),
        };
        Ok(base + offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ordering() {
        assert!(Level::DEBUG < Level::INFO);
        assert!(Level::INFO < Level::WARN);
        assert!(Level::WARN < Level::ERROR);
        assert!(Level::INFO < Level::INFO + 1);
        assert!(Level::DEBUG - 1 < Level::DEBUG);
    }

    #[test]
    fn level_display() {
        assert_eq!(Level::DEBUG.to_string(), "DEBUG");
        assert_eq!(Level::INFO.to_string(), "INFO");
        assert_eq!(Level::WARN.to_string(), "WARN");
        assert_eq!(Level::ERROR.to_string(), "ERROR");
        assert_eq!((Level::INFO + 1).to_string(), "INFO+1");
        assert_eq!((Level::DEBUG - 1).to_string(), "DEBUG-1");
        assert_eq!((Level::ERROR + 4).to_string(), "ERROR+4");
    }

    #[test]
    fn level_from_str() {
        assert_eq!("debug".parse::<Level>().unwrap(), Level::DEBUG);
        assert_eq!("INFO".parse::<Level>().unwrap(), Level::INFO);
        assert_eq!("warning".parse::<Level>().unwrap(), Level::WARN);
        assert_eq!("err".parse::<Level>().unwrap(), Level::ERROR);
        assert_eq!("info+2".parse::<Level>().unwrap(), Level::INFO + 2);
        assert_eq!("DEBUG-4".parse::<Level>().unwrap(), Level::DEBUG - 4);
    }

    #[test]
    fn level_from_str_invalid() {
        assert!("invalid".parse::<Level>().is_err());
        assert!("info+x".parse::<Level>().is_err());
    }

    #[test]
    fn level_offsets_saturate() {
        assert_eq!(Level::ERROR + i32::MAX, Level::new(i32::MAX));
        assert_eq!(Level::DEBUG - i32::MAX, Level::new(i32::MIN));
        assert_eq!(
            "err+2147483640".parse::<Level>().unwrap(),
            Level::new(i32::MAX)
        );
        assert_eq!(
            "dbg-2147483640".parse::<Level>().unwrap(),
            Level::new(i32::MIN)
        );
    }

    #[test]
    fn level_default() {
        assert_eq!(Level::default(), Level::INFO);
    }
}
