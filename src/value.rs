//! Attribute values and the key/value pairs attached to log records.

use chrono::{DateTime, FixedOffset};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on chained lazy resolution, to keep cycles from spinning.
const MAX_RESOLVE_DEPTH: usize = 100;

/// Key used for error attributes built with [`Attr::err`].
pub const ERR_KEY: &str = "err";

/// Error reported by a failed [`Opaque::marshal_text`] call.
///
/// A failed marshal never surfaces to the caller; the value renders as empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarshalError(String);

impl MarshalError {
    /// Creates a marshal error with the given message.
    #[must_use]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl fmt::Display for MarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "text marshal failed: {}", self.0)
    }
}

impl std::error::Error for MarshalError {}

/// Capability probe for opaque values.
///
/// The renderer asks for a canonical text form first; values without one fall
/// back to their `Debug` representation.
pub trait Opaque: fmt::Debug + Send + Sync {
    /// Returns the canonical text form, if the value has one.
    ///
    /// `None` means "no text-marshaling capability" and selects the `Debug`
    /// fallback. `Some(Err(_))` makes the value render as empty.
    fn marshal_text(&self) -> Option<Result<String, MarshalError>> {
        None
    }
}

/// A value whose computation is deferred until the record is rendered.
pub trait LazyValue: Send + Sync {
    /// Produces the value. May itself return another lazy value; resolution
    /// is bounded by a fixed depth.
    fn resolve(&self) -> Value;
}

impl<F> LazyValue for F
where
    F: Fn() -> Value + Send + Sync,
{
    fn resolve(&self) -> Value {
        self()
    }
}

/// A kind-tagged attribute value.
#[derive(Clone)]
pub enum Value {
    /// UTF-8 text, subject to the quoting rule.
    Str(String),
    /// Signed integer, rendered as unquoted decimal.
    Int(i64),
    /// Unsigned integer, rendered as unquoted decimal.
    Uint(u64),
    /// Float, rendered as the shortest round-trip decimal.
    Float(f64),
    /// Boolean, rendered as `true`/`false`.
    Bool(bool),
    /// Duration, rendered human-readable (`497ms`, `1.5s`).
    Duration(Duration),
    /// Timestamp, rendered as RFC 3339 with milliseconds.
    Time(DateTime<FixedOffset>),
    /// Nested group of attributes; only affects key prefixing.
    Group(Vec<Attr>),
    /// Opaque value rendered through the [`Opaque`] capability probe.
    Any(Arc<dyn Opaque>),
    /// Deferred value, resolved before rendering.
    Lazy(Arc<dyn LazyValue>),
}

impl Value {
    /// Wraps an opaque value.
    #[must_use]
    pub fn any(value: impl Opaque + 'static) -> Self {
        Self::Any(Arc::new(value))
    }

    /// Wraps a deferred value.
    #[must_use]
    pub fn lazy(value: impl LazyValue + 'static) -> Self {
        Self::Lazy(Arc::new(value))
    }

    /// Forces any deferred computation, bounded by a fixed depth.
    #[must_use]
    pub fn resolve(self) -> Self {
        let mut value = self;
        for _ in 0..MAX_RESOLVE_DEPTH {
            match value {
                Self::Lazy(lazy) => value = lazy.resolve(),
                other => return other,
            }
        }
        Self::Str("<unresolved>".to_string())
    }

    /// True if this is a group value.
    #[must_use]
    pub const fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Self::Uint(n) => f.debug_tuple("Uint").field(n).finish(),
            Self::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Duration(d) => f.debug_tuple("Duration").field(d).finish(),
            Self::Time(t) => f.debug_tuple("Time").field(t).finish(),
            Self::Group(attrs) => f.debug_tuple("Group").field(attrs).finish(),
            Self::Any(v) => f.debug_tuple("Any").field(v).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Uint(u64::from(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Uint(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Self::Duration(d)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(t: DateTime<FixedOffset>) -> Self {
        Self::Time(t)
    }
}

impl From<crate::level::Level> for Value {
    fn from(level: crate::level::Level) -> Self {
        Self::Str(level.to_string())
    }
}

/// Rendering hint attached to an attribute.
///
/// Hints redirect styling only; they never change the attribute's meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// Render as a highlighted error field (faint bright-red key scheme).
    Error,
    /// Render key and value in the given ANSI color (0-15 basic, else 256-color).
    Color(u8),
}

/// A key/value pair attached to a log record.
///
/// An empty key on a non-group value marks the attribute as anonymous; the
/// renderer drops it. An empty key on a group is transparent: its children are
/// rendered under the enclosing prefix.
#[derive(Debug, Clone)]
pub struct Attr {
    /// Attribute key; prefixed with the enclosing group names on output.
    pub key: String,
    /// Attribute value.
    pub value: Value,
    /// Optional rendering hint.
    pub highlight: Option<Highlight>,
}

impl Attr {
    /// Creates an attribute.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            highlight: None,
        }
    }

    /// Creates a named group of attributes.
    #[must_use]
    pub fn group(key: impl Into<String>, attrs: Vec<Self>) -> Self {
        Self {
            key: key.into(),
            value: Value::Group(attrs),
            highlight: None,
        }
    }

    /// Creates a highlighted error attribute keyed `err`.
    ///
    /// The key can still be overridden with [`Attr::with_key`] and is honored
    /// by the renderer.
    #[must_use]
    pub fn err(err: &dyn std::error::Error) -> Self {
        Self {
            key: ERR_KEY.to_string(),
            value: Value::Str(err.to_string()),
            highlight: Some(Highlight::Error),
        }
    }

    /// Applies a per-attribute color hint.
    #[must_use]
    pub fn colored(color: u8, mut attr: Self) -> Self {
        attr.highlight = Some(Highlight::Color(color));
        attr
    }

    /// Replaces the key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Countdown(u32);

    impl LazyValue for Countdown {
        fn resolve(&self) -> Value {
            if self.0 == 0 {
                Value::Str("done".to_string())
            } else {
                Value::lazy(Self(self.0 - 1))
            }
        }
    }

    #[test]
    fn resolve_passthrough() {
        assert!(matches!(Value::from(1i64).resolve(), Value::Int(1)));
    }

    #[test]
    fn resolve_chained_lazy() {
        let value = Value::lazy(Countdown(3)).resolve();
        match value {
            Value::Str(s) => assert_eq!(s, "done"),
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn resolve_gives_up_on_cycles() {
        struct Forever;
        impl LazyValue for Forever {
            fn resolve(&self) -> Value {
                Value::lazy(Self)
            }
        }

        match Value::lazy(Forever).resolve() {
            Value::Str(s) => assert_eq!(s, "<unresolved>"),
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn err_attr_defaults() {
        let source = std::io::Error::other("fail");
        let attr = Attr::err(&source);
        assert_eq!(attr.key, ERR_KEY);
        assert_eq!(attr.highlight, Some(Highlight::Error));

        let renamed = Attr::err(&source).with_key("cause");
        assert_eq!(renamed.key, "cause");
    }

    #[test]
    fn colored_replaces_hint() {
        let attr = Attr::colored(10, Attr::new("key", "val"));
        assert_eq!(attr.highlight, Some(Highlight::Color(10)));
    }

    #[test]
    fn group_detection() {
        assert!(Attr::group("g", vec![]).value.is_group());
        assert!(!Attr::new("k", "v").value.is_group());
    }
}
