//! Log records as consumed from the structured-logging front-end.

use crate::level::Level;
use crate::value::Attr;
use chrono::{DateTime, FixedOffset, Local};
use std::path::Path;

/// Key the rewrite hook sees for the time field.
pub const TIME_KEY: &str = "time";
/// Key the rewrite hook sees for the level field.
pub const LEVEL_KEY: &str = "level";
/// Key the rewrite hook sees for the message field.
pub const MESSAGE_KEY: &str = "msg";
/// Key the rewrite hook sees for the source-location field.
pub const SOURCE_KEY: &str = "source";

/// Program location a record originated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Source file path, typically from `file!()`.
    pub file: String,
    /// Line number, typically from `line!()`.
    pub line: u32,
}

impl Source {
    /// Creates a source location.
    #[must_use]
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Returns the compact `dir/file:line` form used in output.
    ///
    /// Only the last directory component is kept so lines stay short without
    /// becoming ambiguous within a project.
    #[must_use]
    pub fn short_path(&self) -> String {
        let path = Path::new(&self.file);
        let file = path
            .file_name()
            .map_or_else(|| self.file.clone(), |f| f.to_string_lossy().into_owned());
        let dir = path
            .parent()
            .and_then(Path::file_name)
            .map(|d| d.to_string_lossy().into_owned());

        match dir {
            Some(dir) if !dir.is_empty() => format!("{dir}/{file}:{}", self.line),
            _ => format!("{file}:{}", self.line),
        }
    }
}

/// A structured log event, immutable from the handler's perspective.
#[derive(Debug, Clone)]
pub struct Record {
    /// Event timestamp; `None` skips the time segment entirely.
    pub time: Option<DateTime<FixedOffset>>,
    /// Event severity.
    pub level: Level,
    /// Message text.
    pub message: String,
    /// Optional program location.
    pub source: Option<Source>,
    attrs: Vec<Attr>,
}

impl Record {
    /// Creates a record with an explicit timestamp.
    #[must_use]
    pub fn new(time: Option<DateTime<FixedOffset>>, level: Level, message: impl Into<String>) -> Self {
        Self {
            time,
            level,
            message: message.into(),
            source: None,
            attrs: Vec::new(),
        }
    }

    /// Creates a record timestamped with the current local time.
    #[must_use]
    pub fn now(level: Level, message: impl Into<String>) -> Self {
        Self::new(Some(Local::now().fixed_offset()), level, message)
    }

    /// Appends an attribute.
    #[must_use]
    pub fn with_attr(mut self, attr: Attr) -> Self {
        self.attrs.push(attr);
        self
    }

    /// Appends several attributes.
    #[must_use]
    pub fn with_attrs(mut self, attrs: impl IntoIterator<Item = Attr>) -> Self {
        self.attrs.extend(attrs);
        self
    }

    /// Sets the program location.
    #[must_use]
    pub fn with_source(mut self, file: impl Into<String>, line: u32) -> Self {
        self.source = Some(Source::new(file, line));
        self
    }

    /// Appends an attribute in place.
    pub fn add_attr(&mut self, attr: Attr) {
        self.attrs.push(attr);
    }

    /// Calls `f` for each attribute, in order.
    pub fn attrs<F: FnMut(&Attr)>(&self, mut f: F) {
        for attr in &self.attrs {
            f(attr);
        }
    }

    /// Number of attributes attached to this record.
    #[must_use]
    pub fn attr_count(&self) -> usize {
        self.attrs.len()
    }
}
