use std::str;

use serde::{Deserialize, Serialize};

use crate::error::CaptureError;
use crate::render;
use crate::value::TypedValue;

/// Per-run capture counters, reported by the harness after execution.
/// Counters never influence rendered output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureStats {
    pub sessions_begun: u64,
    pub sessions_rendered: u64,
    pub sessions_discarded: u64,
    pub values_captured: u64,
    pub bytes_written: u64,
}

/// The stateful accumulator behind the begin/value/end protocol.
///
/// Exactly one capture is in flight at a time, so one session instance is
/// owned by each guest execution context. The state machine is
/// `Idle --begin--> Open --add_value*--> Open --end--> Idle`: `end` while
/// idle is a no-op, `begin` while open discards the undrained session and
/// re-arms.
#[derive(Debug, Default)]
pub struct FormatSession {
    pattern: Option<String>,
    values: Vec<TypedValue>,
    stats: CaptureStats,
}

impl FormatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `pattern_bytes` and opens a fresh session.
    ///
    /// A decode failure leaves any prior session untouched. A successful
    /// begin over an undrained session discards it silently (counted in
    /// [`CaptureStats::sessions_discarded`], never printed).
    pub fn begin(&mut self, pattern_bytes: &[u8]) -> Result<(), CaptureError> {
        let pattern = str::from_utf8(pattern_bytes).map_err(CaptureError::Decode)?;
        if self.pattern.is_some() {
            self.stats.sessions_discarded += 1;
        }
        self.pattern = Some(pattern.to_string());
        self.values.clear();
        self.stats.sessions_begun += 1;
        Ok(())
    }

    /// Appends one captured value in call order.
    pub fn add_value(&mut self, value: TypedValue) -> Result<(), CaptureError> {
        if self.pattern.is_none() {
            return Err(CaptureError::NoActiveSession);
        }
        self.values.push(value);
        self.stats.values_captured += 1;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.pattern.is_some()
    }

    /// Renders and drains the current session.
    ///
    /// With no open session this is a no-op returning `None` (nothing to
    /// render if no pattern was ever begun). Otherwise the session is
    /// consumed whether or not rendering succeeds.
    pub fn end(&mut self) -> Result<Option<String>, CaptureError> {
        let Some(pattern) = self.pattern.take() else {
            return Ok(None);
        };
        let values = std::mem::take(&mut self.values);
        let line = render::render(&pattern, &values)?;
        self.stats.sessions_rendered += 1;
        self.stats.bytes_written += line.len() as u64;
        Ok(Some(line))
    }

    pub fn stats(&self) -> CaptureStats {
        self.stats
    }
}
