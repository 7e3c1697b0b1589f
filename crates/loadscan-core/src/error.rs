//! Error types for scanning operations.

use thiserror::Error;

/// Errors that end a whole scan.
///
/// The listing operations never surface these; they degrade to an empty
/// result. The fallible `scan` entry points return them so callers can tell
/// "no matches" apart from "scan did not finish".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The root task did not finish within the configured bound.
    #[error("Scan timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The caller cancelled the scan.
    #[error("Scan cancelled")]
    Cancelled,

    /// The worker running the root task went away without a result.
    #[error("Scan worker exited without producing a result")]
    WorkerLost,

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {message}")]
    PoolBuild { message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ScanError {
    /// Whether this error is the scan running out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Failure to turn one element into a structural view.
///
/// Always local to a single element: the engine logs it, skips the element
/// and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InspectError {
    /// The host could not produce a view for this element.
    #[error("Element unavailable: {name}")]
    Unavailable { name: String },

    /// The element's owning context was torn down underneath it.
    #[error("Owner '{owner}' of {name} is no longer loaded")]
    Unloaded { name: String, owner: String },

    /// Inspection or matching code panicked.
    #[error("Inspection of {name} panicked: {message}")]
    Panicked { name: String, message: String },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl InspectError {
    /// Create an unavailable error for the named element.
    pub fn unavailable(name: impl Into<String>) -> Self {
        Self::Unavailable { name: name.into() }
    }

    /// Create a panicked error from an unwinding payload.
    pub fn panicked(name: impl Into<String>, payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked {
            name: name.into(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panicked_extracts_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        let err = InspectError::panicked("a::B", payload.as_ref());
        assert_eq!(
            err,
            InspectError::Panicked {
                name: "a::B".into(),
                message: "boom".into()
            }
        );

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        let err = InspectError::panicked("a::C", payload.as_ref());
        assert!(err.to_string().contains("owned"));

        let payload: Box<dyn std::any::Any + Send> = Box::new(42u32);
        let err = InspectError::panicked("a::D", payload.as_ref());
        assert!(err.to_string().contains("non-string"));
    }

    #[test]
    fn test_timeout_display() {
        let err = ScanError::Timeout { timeout_ms: 1500 };
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Scan timed out after 1500ms");
        assert!(!ScanError::Cancelled.is_timeout());
    }
}
