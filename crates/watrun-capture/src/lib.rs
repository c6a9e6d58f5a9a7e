//! Debug-capture protocol core for sandboxed WAT guests.
//!
//! A guest program cannot write text directly. Instead it streams a format
//! pattern plus typed scalar values through the `host.debug_*` imports:
//! `begin` hands over the pattern, each `value` call appends one tagged
//! value, and `end` renders exactly one newline-terminated line. This crate
//! owns that capture state and the rendering rules; the wasm wiring lives in
//! the `watrun` crate.

pub mod error;
pub mod render;
pub mod session;
pub mod value;

pub use error::CaptureError;
pub use render::{count_placeholders, render};
pub use session::{CaptureStats, FormatSession};
pub use value::TypedValue;
