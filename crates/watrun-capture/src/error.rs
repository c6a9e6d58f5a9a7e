use std::fmt;
use std::str::Utf8Error;

/// Failures of the begin/value/end capture protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The pattern bytes read at `begin` were not valid UTF-8.
    Decode(Utf8Error),
    /// A value call arrived with no open session.
    NoActiveSession,
    /// Placeholder count and captured value count disagree.
    ArityMismatch { expected: usize, got: usize },
}

impl CaptureError {
    /// An unrecoverable guest defect. The harness must surface the
    /// diagnostic and halt the run; resuming the guest would violate the
    /// no-partial-output guarantee.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CaptureError::ArityMismatch { .. })
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Decode(err) => {
                write!(f, "format pattern is not valid UTF-8: {err}")
            }
            CaptureError::NoActiveSession => {
                f.write_str("debug value received with no open capture session")
            }
            CaptureError::ArityMismatch { expected, got } => {
                write!(
                    f,
                    "format string has {expected} placeholders but got {got} values"
                )
            }
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_mismatch_names_both_counts() {
        let err = CaptureError::ArityMismatch {
            expected: 2,
            got: 0,
        };
        assert_eq!(
            err.to_string(),
            "format string has 2 placeholders but got 0 values"
        );
        assert!(err.is_fatal());
    }

    #[test]
    fn protocol_misuse_is_not_the_fatal_kind() {
        assert!(!CaptureError::NoActiveSession.is_fatal());
        let err = std::str::from_utf8(&[0xff]).unwrap_err();
        assert!(!CaptureError::Decode(err).is_fatal());
    }
}
