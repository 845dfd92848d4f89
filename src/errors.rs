//! # Error Handling for List Views
//!
//! Every fallible operation in this crate returns [`ListError`]. The enum follows
//! one rule: **what a user sees is sanitised, what a developer needs is logged**.
//!
//! - [`ListError::user_message`] is the text shown in a toast/notification.
//! - [`ListError::log_internal`] writes transport and decoding details through
//!   `tracing`, so nothing is printed unless the application installs a subscriber.
//!
//! ```rust,ignore
//! match controller.begin_load().resolve().await {
//!     Ok(_) => {}
//!     Err(err) => toast(err.user_message()),
//! }
//! ```
//!
//! `ListError` is `Clone`: callers deduplicated onto one in-flight request all
//! receive the same error value.

use axum::http::StatusCode;
use std::fmt;

/// Error type for list state, query building, fetching and dialog transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListError {
    /// The request never produced a response (connection refused, service error)
    Transport {
        /// User-facing generic message
        message: String,
        /// Internal details (logged, not shown)
        internal: Option<String>,
    },

    /// The backend answered with a non-success status
    Status {
        /// HTTP status returned by the backend
        status: StatusCode,
        /// Endpoint that was requested
        endpoint: String,
    },

    /// The response body did not match the `{ payload: { items, count } }` envelope
    MalformedResponse {
        /// Endpoint that was requested
        endpoint: String,
        /// Decoder error (logged, not shown)
        internal: String,
    },

    /// A page number below 1 was requested
    InvalidPage {
        /// The rejected page number
        page: i64,
    },

    /// A page size of zero, or above the configured maximum
    InvalidLimit {
        /// The rejected page size
        limit: u64,
    },

    /// A predicate string could not be parsed from its wire form
    InvalidPredicate {
        /// The offending input
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// A dialog transition that is not allowed from the current state
    InvalidTransition {
        /// State the dialog was in
        from: &'static str,
        /// Transition that was attempted
        action: &'static str,
    },

    /// Configuration could not be loaded or failed validation
    Config {
        /// What is wrong with it
        message: String,
    },
}

impl ListError {
    // ============================================================================
    // Constructors
    // ============================================================================

    /// Create a transport error with optional internal details
    pub fn transport(internal: impl Into<Option<String>>) -> Self {
        Self::Transport {
            message: "Could not reach the server".to_string(),
            internal: internal.into(),
        }
    }

    pub fn status(status: StatusCode, endpoint: impl Into<String>) -> Self {
        Self::Status {
            status,
            endpoint: endpoint.into(),
        }
    }

    /// Create a malformed-response error
    ///
    /// # Example
    /// ```rust,ignore
    /// let envelope: Envelope<_> = serde_json::from_slice(&body)
    ///     .map_err(|e| ListError::malformed("/employees", e.to_string()))?;
    /// ```
    pub fn malformed(endpoint: impl Into<String>, internal: impl Into<String>) -> Self {
        Self::MalformedResponse {
            endpoint: endpoint.into(),
            internal: internal.into(),
        }
    }

    pub fn invalid_predicate(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPredicate {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    // ============================================================================
    // Presentation
    // ============================================================================

    /// Whether the error came from talking to the backend (as opposed to bad local input)
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Status { .. } | Self::MalformedResponse { .. }
        )
    }

    /// The sanitised message suitable for a toast
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { message, .. } => message.clone(),
            Self::Status { status, .. } => match *status {
                StatusCode::UNAUTHORIZED => "Your session has expired".to_string(),
                StatusCode::FORBIDDEN => "You do not have access to this list".to_string(),
                StatusCode::NOT_FOUND => "List not found".to_string(),
                s if s.is_server_error() => "The server failed to load the list".to_string(),
                _ => "The list request was rejected".to_string(),
            },
            Self::MalformedResponse { .. } => "The server sent an unexpected response".to_string(),
            Self::InvalidPage { page } => format!("Page {page} does not exist"),
            Self::InvalidLimit { limit } => format!("Page size {limit} is not allowed"),
            Self::InvalidPredicate { input, reason } => {
                format!("Invalid filter '{input}': {reason}")
            }
            Self::InvalidTransition { from, action } => {
                format!("Cannot {action} while the dialog is {from}")
            }
            Self::Config { message } => format!("Invalid list configuration: {message}"),
        }
    }

    /// Log internal details. Only emits output if a `tracing` subscriber is installed.
    pub fn log_internal(&self) {
        match self {
            Self::Transport {
                internal: Some(details),
                ..
            } => {
                tracing::warn!(details = %details, "List transport failure");
            }
            Self::Status { status, endpoint } => {
                tracing::warn!(status = %status, endpoint = %endpoint, "List request rejected");
            }
            Self::MalformedResponse { endpoint, internal } => {
                tracing::warn!(endpoint = %endpoint, details = %internal, "Malformed list response");
            }
            _ => {
                tracing::debug!(error = %self.user_message(), "List error");
            }
        }
    }
}

impl fmt::Display for ListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ListError {}

impl From<serde_json::Error> for ListError {
    fn from(err: serde_json::Error) -> Self {
        Self::config(err.to_string())
    }
}
