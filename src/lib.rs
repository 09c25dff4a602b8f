#![forbid(unsafe_code)]

//! `tinct` - Tinted console handler for structured log records.
//!
//! A pluggable back-end for a structured-logging front-end: each record
//! (timestamp, level, message, nested key/value attributes) is rendered into a
//! single human-readable, optionally colorized line and written to an output
//! stream with exactly one synchronized write.
//!
//! # Example
//!
//! ```
//! use tinct::{Attr, ConsoleHandler, Level, Options, Record};
//!
//! let handler = ConsoleHandler::new(std::io::stderr(), Options::new().level(Level::DEBUG));
//!
//! let record = Record::now(Level::INFO, "Starting server")
//!     .with_attr(Attr::new("addr", ":8080"))
//!     .with_attr(Attr::new("env", "production"));
//! let _ = handler.handle(&record);
//! ```
//!
//! Handlers derived via [`ConsoleHandler::with_attrs`] and
//! [`ConsoleHandler::with_group`] share the parent's output stream and lock, so
//! a logger can be split across threads without torn lines.

mod buffer;
mod style;

pub mod handler;
pub mod level;
pub mod record;
pub mod value;

// Re-exports for convenience
pub use handler::{ConsoleHandler, DEFAULT_TIME_FORMAT, Error, Handler, Options, ReplaceAttr};
pub use level::{Level, ParseLevelError};
pub use record::{LEVEL_KEY, MESSAGE_KEY, Record, SOURCE_KEY, Source, TIME_KEY};
pub use value::{Attr, ERR_KEY, Highlight, LazyValue, MarshalError, Opaque, Value};
