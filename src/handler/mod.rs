//! The back-end contract for consuming log records, and its configuration.

mod console;

pub use console::ConsoleHandler;

use crate::level::Level;
use crate::record::Record;
use crate::value::Attr;
use std::fmt;
use std::sync::Arc;

/// Default time layout: compact timestamp with milliseconds
/// (`Nov 10 23:00:00.000`).
pub const DEFAULT_TIME_FORMAT: &str = "%b %e %H:%M:%S%.3f";

/// Per-field rewrite hook.
///
/// Called for every built-in field and every leaf attribute, never for group
/// nodes. The first argument is the list of group names currently open (always
/// empty for built-in fields). Returning `None` drops the field.
pub type ReplaceAttr = Arc<dyn Fn(&[String], Attr) -> Option<Attr> + Send + Sync>;

/// The structured-log back-end contract.
///
/// Derivation methods take `Arc<Self>` so a no-op derivation can hand back the
/// identical instance.
pub trait Handler: Send + Sync {
    /// True iff records at `level` would be processed.
    fn enabled(&self, level: Level) -> bool;

    /// Renders and emits a record.
    ///
    /// # Errors
    /// Returns an error if the underlying stream write fails.
    fn handle(&self, record: &Record) -> Result<(), Error>;

    /// Returns a handler with the given attributes bound to every future line.
    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> Arc<dyn Handler>;

    /// Returns a handler whose future attributes are keyed under `name.`.
    fn with_group(self: Arc<Self>, name: &str) -> Arc<dyn Handler>;
}

/// Error type for handler operations.
#[derive(Debug)]
pub enum Error {
    /// The output stream write failed.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Handler configuration, fixed at construction time.
///
/// An explicit defaults value plus chainable setters; there is no process-wide
/// mutable state behind it.
pub struct Options {
    pub(crate) level: Level,
    pub(crate) time_format: String,
    pub(crate) add_source: bool,
    pub(crate) no_color: bool,
    pub(crate) replace_attr: Option<ReplaceAttr>,
}

impl Options {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum level to emit.
    #[must_use]
    pub const fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the strftime layout for the time segment.
    #[must_use]
    pub fn time_format(mut self, layout: impl Into<String>) -> Self {
        self.time_format = layout.into();
        self
    }

    /// Enables the source-location segment.
    #[must_use]
    pub const fn add_source(mut self, enabled: bool) -> Self {
        self.add_source = enabled;
        self
    }

    /// Disables all ANSI styling.
    #[must_use]
    pub const fn no_color(mut self, disabled: bool) -> Self {
        self.no_color = disabled;
        self
    }

    /// Installs a per-field rewrite hook.
    #[must_use]
    pub fn replace_attr<F>(mut self, hook: F) -> Self
    where
        F: Fn(&[String], Attr) -> Option<Attr> + Send + Sync + 'static,
    {
        self.replace_attr = Some(Arc::new(hook));
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            add_source: false,
            no_color: false,
            replace_attr: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("level", &self.level)
            .field("time_format", &self.time_format)
            .field("add_source", &self.add_source)
            .field("no_color", &self.no_color)
            .field("replace_attr", &self.replace_attr.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = Options::new();
        assert_eq!(opts.level, Level::INFO);
        assert_eq!(opts.time_format, DEFAULT_TIME_FORMAT);
        assert!(!opts.add_source);
        assert!(!opts.no_color);
        assert!(opts.replace_attr.is_none());
    }

    #[test]
    fn chained_setters() {
        let opts = Options::new()
            .level(Level::DEBUG)
            .time_format("%H:%M")
            .add_source(true)
            .no_color(true)
            .replace_attr(|_, attr| Some(attr));

        assert_eq!(opts.level, Level::DEBUG);
        assert_eq!(opts.time_format, "%H:%M");
        assert!(opts.add_source);
        assert!(opts.no_color);
        assert!(opts.replace_attr.is_some());
    }

    #[test]
    fn debug_hides_the_hook() {
        let opts = Options::new().replace_attr(|_, attr| Some(attr));
        let printed = format!("{opts:?}");
        assert!(printed.contains("replace_attr: true"));
    }
}
