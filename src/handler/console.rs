//! Console handler: renders records as tinted, single-line text.

use super::{Error, Handler, Options};
use crate::buffer::LineBuf;
use crate::level::Level;
use crate::record::{LEVEL_KEY, MESSAGE_KEY, Record, SOURCE_KEY, TIME_KEY};
use crate::style;
use crate::value::{Attr, Highlight, Value};
use chrono::{DateTime, FixedOffset, SecondsFormat};
use std::borrow::Cow;
use std::fmt::Write as _;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// State shared by every handler derived from a common ancestor. The writer
/// lock lives here so concurrent emissions through any derived handler
/// serialize against each other.
struct Shared<W> {
    writer: Mutex<W>,
    opts: Options,
}

/// A handler that renders each record into one human-readable line.
///
/// Derivation ([`Self::with_attrs`], [`Self::with_group`]) is cheap: the
/// configuration and writer are shared, and the pre-rendered attribute prefix
/// is shared structurally. A parent is never mutated by deriving from it.
pub struct ConsoleHandler<W: Write> {
    shared: Arc<Shared<W>>,
    /// Pre-rendered `key=val ` segments inherited from `with_attrs` calls.
    attr_prefix: Arc<str>,
    /// Dot-joined group names, e.g. `request.peer.`.
    group_prefix: Arc<str>,
    /// Group names as a list, passed to the rewrite hook.
    groups: Arc<[String]>,
}

impl<W: Write> Clone for ConsoleHandler<W> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            attr_prefix: Arc::clone(&self.attr_prefix),
            group_prefix: Arc::clone(&self.group_prefix),
            groups: Arc::clone(&self.groups),
        }
    }
}

impl<W: Write + Send> ConsoleHandler<W> {
    /// Creates a handler writing to an already-open stream.
    #[must_use]
    pub fn new(writer: W, opts: Options) -> Self {
        Self {
            shared: Arc::new(Shared {
                writer: Mutex::new(writer),
                opts,
            }),
            attr_prefix: Arc::from(""),
            group_prefix: Arc::from(""),
            groups: Vec::new().into(),
        }
    }

    /// True iff records at `level` would be processed.
    ///
    /// No locking and no allocation, so front-ends can consult it before
    /// constructing a record at all.
    #[must_use]
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.shared.opts.level
    }

    /// Renders the record and writes it as one line.
    ///
    /// The record is not mutated. If rewriting reduces the line to nothing,
    /// no write happens at all.
    ///
    /// # Errors
    /// Returns [`Error::Io`] if the stream write fails.
    pub fn handle(&self, record: &Record) -> Result<(), Error> {
        let opts = &self.shared.opts;
        let color = !opts.no_color;
        let rep = opts.replace_attr.as_ref();
        let mut buf = LineBuf::acquire();

        // time
        if let Some(time) = record.time {
            match rep {
                None => {
                    if self.append_time(&mut buf, time, color, None) {
                        buf.push(' ');
                    }
                }
                Some(rep) => {
                    if let Some(attr) = rep(&[], Attr::new(TIME_KEY, Value::Time(time))) {
                        if !attr.key.is_empty() {
                            let hint = hint_color(&attr);
                            match attr.value.resolve() {
                                Value::Time(time) => {
                                    if self.append_time(&mut buf, time, color, hint) {
                                        buf.push(' ');
                                    }
                                }
                                value => {
                                    append_value(&mut buf, &value, false);
                                    buf.push(' ');
                                }
                            }
                        }
                    }
                }
            }
        }

        // level
        match rep {
            None => {
                append_level(&mut buf, record.level, color, None);
                buf.push(' ');
            }
            Some(rep) => {
                let current = Value::Int(i64::from(record.level.value()));
                if let Some(attr) = rep(&[], Attr::new(LEVEL_KEY, current)) {
                    if !attr.key.is_empty() {
                        let hint = hint_color(&attr);
                        match attr.value.resolve() {
                            Value::Int(n) => {
                                let n = i32::try_from(n)
                                    .unwrap_or(if n < 0 { i32::MIN } else { i32::MAX });
                                append_level(&mut buf, Level::new(n), color, hint);
                            }
                            Value::Str(s) => match hint {
                                Some(c) if color => {
                                    push_sgr(&mut buf, &style::fg_params(c));
                                    buf.push_str(&s);
                                    buf.push_str(style::RESET);
                                }
                                _ => buf.push_str(&s),
                            },
                            value => append_value(&mut buf, &value, false),
                        }
                        buf.push(' ');
                    }
                }
            }
        }

        // source location
        if opts.add_source {
            if let Some(source) = &record.source {
                let text = source.short_path();
                match rep {
                    None => {
                        append_source(&mut buf, &text, color, None);
                        buf.push(' ');
                    }
                    Some(rep) => {
                        if let Some(attr) = rep(&[], Attr::new(SOURCE_KEY, text)) {
                            if !attr.key.is_empty() {
                                let hint = hint_color(&attr);
                                match attr.value.resolve() {
                                    Value::Str(s) => append_source(&mut buf, &s, color, hint),
                                    value => append_value(&mut buf, &value, false),
                                }
                                buf.push(' ');
                            }
                        }
                    }
                }
            }
        }

        // message
        match rep {
            None => {
                buf.push_str(&record.message);
                buf.push(' ');
            }
            Some(rep) => {
                if let Some(attr) = rep(&[], Attr::new(MESSAGE_KEY, record.message.clone())) {
                    if !attr.key.is_empty() {
                        let hint = hint_color(&attr);
                        match attr.value.resolve() {
                            Value::Str(s) => match hint {
                                Some(c) if color => {
                                    push_sgr(&mut buf, &style::fg_params(c));
                                    buf.push_str(&s);
                                    buf.push_str(style::RESET);
                                }
                                _ => buf.push_str(&s),
                            },
                            value => append_value(&mut buf, &value, false),
                        }
                        buf.push(' ');
                    }
                }
            }
        }

        // attributes bound via with_attrs, already rendered
        buf.push_str(&self.attr_prefix);

        // this record's attributes
        record.attrs(|attr| {
            self.append_attr(&mut buf, attr.clone(), &self.group_prefix, &self.groups, color);
        });

        // Nothing survived rendering: skip the write entirely.
        if buf.is_empty() {
            return Ok(());
        }

        // The line ends with a segment separator; turn it into the newline.
        if buf.ends_with(' ') {
            buf.pop();
        }
        buf.push('\n');

        let mut writer = match self.shared.writer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        writer.write_all(buf.as_bytes())?;
        Ok(())
    }

    /// Returns a handler with `attrs` bound to every future line.
    ///
    /// The attributes are rendered once, here, through the same pipeline as
    /// normal emission (rewrite hook and group prefix included), so loggers
    /// reused across many emissions pay for them once. An empty `attrs`
    /// returns an identical handler without rendering anything.
    #[must_use]
    pub fn with_attrs(&self, attrs: Vec<Attr>) -> Self {
        if attrs.is_empty() {
            return self.clone();
        }

        let color = !self.shared.opts.no_color;
        let mut buf = LineBuf::acquire();
        for attr in attrs {
            self.append_attr(&mut buf, attr, &self.group_prefix, &self.groups, color);
        }

        let mut prefix = String::with_capacity(self.attr_prefix.len() + buf.len());
        prefix.push_str(&self.attr_prefix);
        prefix.push_str(&buf);

        Self {
            shared: Arc::clone(&self.shared),
            attr_prefix: prefix.into(),
            group_prefix: Arc::clone(&self.group_prefix),
            groups: Arc::clone(&self.groups),
        }
    }

    /// Returns a handler whose future attributes are keyed under `name.`.
    ///
    /// Nothing is rendered yet; the group only affects how later attributes
    /// are keyed. An empty name returns an identical handler.
    #[must_use]
    pub fn with_group(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }

        let mut group_prefix = String::with_capacity(self.group_prefix.len() + name.len() + 1);
        group_prefix.push_str(&self.group_prefix);
        group_prefix.push_str(name);
        group_prefix.push('.');

        let mut groups = self.groups.to_vec();
        groups.push(name.to_string());

        Self {
            shared: Arc::clone(&self.shared),
            attr_prefix: Arc::clone(&self.attr_prefix),
            group_prefix: group_prefix.into(),
            groups: groups.into(),
        }
    }

    /// Time segment. Returns false (writing nothing) when the configured
    /// layout is invalid; a logging subsystem must not panic over it.
    fn append_time(
        &self,
        buf: &mut String,
        time: DateTime<FixedOffset>,
        color: bool,
        hint: Option<u8>,
    ) -> bool {
        let segment_start = buf.len();
        if color {
            match hint {
                Some(c) => push_sgr(buf, &format!("2;{}", style::fg_params(c))),
                None => buf.push_str(style::FAINT),
            }
        }
        if write!(buf, "{}", time.format(&self.shared.opts.time_format)).is_err() {
            buf.truncate(segment_start);
            return false;
        }
        if color {
            buf.push_str(style::RESET);
        }
        true
    }

    /// Recursive attribute walk: rewrite, group unfolding, key prefixing,
    /// value rendering. Each rendered leaf leaves one trailing space.
    fn append_attr(
        &self,
        buf: &mut String,
        attr: Attr,
        group_prefix: &str,
        groups: &[String],
        color: bool,
    ) {
        let mut attr = attr;
        attr.value = attr.value.resolve();

        // The rewrite hook sees leaves only, never group nodes.
        if !attr.value.is_group() {
            if let Some(rep) = self.shared.opts.replace_attr.as_ref() {
                match rep(groups, attr) {
                    None => return,
                    Some(replaced) => attr = replaced,
                }
                attr.value = attr.value.resolve();
            }
        }

        match attr.value {
            Value::Group(children) => {
                if attr.key.is_empty() {
                    // An anonymous group is transparent: children keep the
                    // enclosing prefix.
                    for child in children {
                        self.append_attr(buf, child, group_prefix, groups, color);
                    }
                } else {
                    let prefix = format!("{group_prefix}{}.", attr.key);
                    let mut nested = groups.to_vec();
                    nested.push(attr.key);
                    for child in children {
                        self.append_attr(buf, child, &prefix, &nested, color);
                    }
                }
            }
            // An anonymous non-group attribute carries no information.
            _ if attr.key.is_empty() => {}
            value => match attr.highlight {
                Some(Highlight::Error) => {
                    append_hinted(buf, group_prefix, &attr.key, &value, style::RED, color);
                }
                Some(Highlight::Color(c)) => {
                    append_hinted(buf, group_prefix, &attr.key, &value, &style::fg_params(c), color);
                }
                None => {
                    if color {
                        buf.push_str(style::FAINT);
                    }
                    append_string(buf, &format!("{group_prefix}{}", attr.key), true);
                    buf.push('=');
                    if color {
                        buf.push_str(style::RESET);
                    }
                    append_value(buf, &value, true);
                    buf.push(' ');
                }
            },
        }
    }
}

impl<W: Write + Send + 'static> Handler for ConsoleHandler<W> {
    fn enabled(&self, level: Level) -> bool {
        Self::enabled(self, level)
    }

    fn handle(&self, record: &Record) -> Result<(), Error> {
        Self::handle(self, record)
    }

    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        if attrs.is_empty() {
            self
        } else {
            Arc::new(Self::with_attrs(&self, attrs))
        }
    }

    fn with_group(self: Arc<Self>, name: &str) -> Arc<dyn Handler> {
        if name.is_empty() {
            self
        } else {
            Arc::new(Self::with_group(&self, name))
        }
    }
}

/// Returns the color-hint parameter, if the attribute carries one.
const fn hint_color(attr: &Attr) -> Option<u8> {
    match attr.highlight {
        Some(Highlight::Color(c)) => Some(c),
        _ => None,
    }
}

fn push_sgr(buf: &mut String, params: &str) {
    buf.push_str("\x1b[");
    buf.push_str(params);
    buf.push('m');
}

/// Level segment: 3-letter mnemonic chosen by range, with a signed decimal
/// suffix when the level is off the named threshold (`INF+1`, `DBG-1`).
fn append_level(buf: &mut String, level: Level, color: bool, hint: Option<u8>) {
    let v = level.value();
    let (name, base, default_params) = if v < Level::INFO.value() {
        ("DBG", Level::DEBUG.value(), None)
    } else if v < Level::WARN.value() {
        ("INF", Level::INFO.value(), Some(style::GREEN))
    } else if v < Level::ERROR.value() {
        ("WRN", Level::WARN.value(), Some(style::YELLOW))
    } else {
        ("ERR", Level::ERROR.value(), Some(style::RED))
    };

    let params: Option<Cow<'_, str>> = if color {
        hint.map(style::fg_params)
            .map(Cow::Owned)
            .or(default_params.map(Cow::Borrowed))
    } else {
        None
    };

    if let Some(params) = &params {
        push_sgr(buf, params);
    }
    buf.push_str(name);
    let delta = v - base;
    if delta != 0 {
        let _ = write!(buf, "{delta:+}");
    }
    if params.is_some() {
        buf.push_str(style::RESET);
    }
}

/// Source segment, rendered faint.
fn append_source(buf: &mut String, text: &str, color: bool, hint: Option<u8>) {
    if color {
        match hint {
            Some(c) => push_sgr(buf, &format!("2;{}", style::fg_params(c))),
            None => buf.push_str(style::FAINT),
        }
    }
    buf.push_str(text);
    if color {
        buf.push_str(style::RESET);
    }
}

/// Highlighted `key=value` with a colored, faint key: the error-field scheme
/// and the per-attribute color hint share this shape.
fn append_hinted(
    buf: &mut String,
    group_prefix: &str,
    key: &str,
    value: &Value,
    params: &str,
    color: bool,
) {
    if color {
        push_sgr(buf, &format!("2;{params}"));
    }
    append_string(buf, &format!("{group_prefix}{key}"), true);
    buf.push('=');
    if color {
        buf.push_str(style::UNFAINT);
    }
    append_value(buf, value, true);
    if color {
        buf.push_str(style::RESET);
    }
    buf.push(' ');
}

/// Value renderer. `quote` is false for built-in field substitutions, which
/// are written verbatim.
fn append_value(buf: &mut String, value: &Value, quote: bool) {
    match value {
        Value::Str(s) => append_string(buf, s, quote),
        Value::Int(n) => {
            let _ = write!(buf, "{n}");
        }
        Value::Uint(n) => {
            let _ = write!(buf, "{n}");
        }
        Value::Float(n) => {
            let _ = write!(buf, "{n}");
        }
        Value::Bool(b) => buf.push_str(if *b { "true" } else { "false" }),
        Value::Duration(d) => append_string(buf, &format!("{d:?}"), quote),
        Value::Time(t) => {
            append_string(buf, &t.to_rfc3339_opts(SecondsFormat::Millis, true), quote);
        }
        Value::Any(opaque) => match opaque.marshal_text() {
            Some(Ok(text)) => append_string(buf, &text, quote),
            // Marshal failure degrades to an empty value, never an error.
            Some(Err(_)) => {}
            None => append_string(buf, &format!("{opaque:?}"), quote),
        },
        // Groups are unfolded before the value renderer, and lazy values are
        // resolved by every caller.
        Value::Group(_) | Value::Lazy(_) => {}
    }
}

fn append_string(buf: &mut String, s: &str, quote: bool) {
    if quote && needs_quoting(s) {
        append_quoted(buf, s);
    } else {
        buf.push_str(s);
    }
}

/// Quoting rule: empty, whitespace, `"`, `=`, or non-printable characters
/// force a quoted literal. Characters inside ANSI SGR sequences do not count;
/// values may carry their own styling and it passes through untouched.
fn needs_quoting(s: &str) -> bool {
    if s.is_empty() {
        return true;
    }
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' && chars.peek() == Some(&'[') {
            chars.next();
            for follow in chars.by_ref() {
                if follow.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        if c.is_whitespace() || c == '"' || c == '=' || c.is_control() {
            return true;
        }
    }
    false
}

/// Quoted literal: `"` and `\` are escaped, control characters use their
/// default escapes, ANSI SGR sequences pass through raw.
fn append_quoted(buf: &mut String, s: &str) {
    buf.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' && chars.peek() == Some(&'[') {
            buf.push(c);
            buf.push('[');
            chars.next();
            for follow in chars.by_ref() {
                buf.push(follow);
                if follow.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        match c {
            '"' => buf.push_str("\\\""),
            '\\' => buf.push_str("\\\\"),
            c if c.is_control() => {
                for escaped in c.escape_default() {
                    buf.push(escaped);
                }
            }
            c => buf.push(c),
        }
    }
    buf.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting_plain_strings() {
        assert!(!needs_quoting("val"));
        assert!(!needs_quoting("/path/to/file"));
        assert!(needs_quoting(""));
        assert!(needs_quoting("two words"));
        assert!(needs_quoting("tab\there"));
        assert!(needs_quoting("a=b"));
        assert!(needs_quoting("say \"hi\""));
        assert!(needs_quoting("bell\u{7}"));
    }

    #[test]
    fn quoting_skips_ansi_sequences() {
        assert!(!needs_quoting("\x1b[92mgreen\x1b[0m"));
        assert!(needs_quoting("\x1b[92mgreen quoted\x1b[0m"));
    }

    #[test]
    fn quoted_escapes() {
        let mut buf = String::new();
        append_quoted(&mut buf, "say \"hi\"\n");
        assert_eq!(buf, "\"say \\\"hi\\\"\\n\"");
    }

    #[test]
    fn quoted_keeps_ansi_raw() {
        let mut buf = String::new();
        append_quoted(&mut buf, "\x1b[92mgreen quoted\x1b[0m");
        assert_eq!(buf, "\"\x1b[92mgreen quoted\x1b[0m\"");
    }

    #[test]
    fn mnemonic_offsets() {
        let mut buf = String::new();
        append_level(&mut buf, Level::INFO + 1, false, None);
        assert_eq!(buf, "INF+1");

        buf.clear();
        append_level(&mut buf, Level::DEBUG - 1, false, None);
        assert_eq!(buf, "DBG-1");

        buf.clear();
        append_level(&mut buf, Level::ERROR + 4, false, None);
        assert_eq!(buf, "ERR+4");
    }

    #[test]
    fn mnemonic_colors() {
        let mut buf = String::new();
        append_level(&mut buf, Level::INFO, true, None);
        assert_eq!(buf, "\x1b[92mINF\x1b[0m");

        buf.clear();
        append_level(&mut buf, Level::DEBUG, true, None);
        assert_eq!(buf, "DBG");

        buf.clear();
        append_level(&mut buf, Level::DEBUG, true, Some(13));
        assert_eq!(buf, "\x1b[95mDBG\x1b[0m");
    }

    #[test]
    fn float_shortest_roundtrip() {
        let mut buf = String::new();
        append_value(&mut buf, &Value::Float(123.456), true);
        assert_eq!(buf, "123.456");
    }

    #[test]
    fn duration_is_human_readable() {
        let mut buf = String::new();
        append_value(&mut buf, &Value::Duration(std::time::Duration::from_millis(497)), true);
        assert_eq!(buf, "497ms");

        buf.clear();
        append_value(&mut buf, &Value::Duration(std::time::Duration::from_millis(1500)), true);
        assert_eq!(buf, "1.5s");
    }
}
