//! Unified error handling for the cheer planner.
//!
//! Geometry and indexing never fail for well-formed courses; the variants here
//! cover user input (pace strings, toggled spots), configuration documents and
//! the external routing collaborator.

use std::fmt;

/// Unified error type for planner operations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
pub enum PlannerError {
    /// A pace string could not be turned into seconds per metre
    InvalidPace { input: String, reason: String },
    /// A selected distance is not one of the current candidate keys
    UnknownCandidate { distance: f64 },
    /// The travel profile has no routing or heuristic support
    UnsupportedProfile { profile: String },
    /// Routing service error
    Routing {
        message: String,
        status_code: Option<u16>,
    },
    /// Configuration error
    Config { message: String },
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::InvalidPace { input, reason } => {
                write!(f, "Invalid pace '{}': {}", input, reason)
            }
            PlannerError::UnknownCandidate { distance } => {
                write!(f, "No candidate position at {:.1}m", distance)
            }
            PlannerError::UnsupportedProfile { profile } => {
                write!(f, "Travel profile '{}' is not supported here", profile)
            }
            PlannerError::Routing {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "Routing error ({}): {}", code, message)
                } else {
                    write!(f, "Routing error: {}", message)
                }
            }
            PlannerError::Config { message } => {
                write!(f, "Configuration error: {}", message)
            }
        }
    }
}

impl std::error::Error for PlannerError {}

/// Result type alias for planner operations.
pub type Result<T> = std::result::Result<T, PlannerError>;

impl PlannerError {
    pub(crate) fn invalid_pace(input: &str, reason: &str) -> Self {
        PlannerError::InvalidPace {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn routing(message: impl Into<String>) -> Self {
        PlannerError::Routing {
            message: message.into(),
            status_code: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlannerError::invalid_pace("abc", "expected MM:SS");
        assert!(err.to_string().contains("'abc'"));
        assert!(err.to_string().contains("MM:SS"));

        let err = PlannerError::UnsupportedProfile {
            profile: "transit".to_string(),
        };
        assert_eq!(err.to_string(), "Travel profile 'transit' is not supported here");
    }

    #[test]
    fn test_routing_display_with_status() {
        let err = PlannerError::Routing {
            message: "rate limited".to_string(),
            status_code: Some(429),
        };
        assert_eq!(err.to_string(), "Routing error (429): rate limited");
        assert_eq!(
            PlannerError::routing("no route").to_string(),
            "Routing error: no route"
        );
    }
}
