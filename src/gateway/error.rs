//! Error types for the assistant gateway.

use thiserror::Error;

use super::types::RunState;

/// Additional context from service errors for debugging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// HTTP status code from the service.
    pub http_status: Option<u16>,
    /// Service-specific error code (e.g. "invalid_api_key").
    pub provider_code: Option<String>,
    /// Request ID from the service (x-request-id header).
    pub request_id: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }
}

/// Errors that can occur while requesting a recommendation.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Configuration error (missing API key or assistant id, etc.).
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP/network error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service rejected the credential (401/403).
    #[error("authentication failed: {message}")]
    Authentication {
        message: String,
        context: ErrorContext,
    },

    /// Any other non-success response.
    #[error("assistant service error: {message}")]
    Api {
        message: String,
        retryable: bool,
        context: ErrorContext,
    },

    /// The service answered with something we could not interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The run reached a terminal state other than `completed`.
    #[error("run ended as {state}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    RunFailed {
        state: RunState,
        message: Option<String>,
    },

    /// The run was still pending after the poll budget ran out.
    #[error("run still pending after {polls} polls")]
    TimedOut { polls: u32 },

    /// The caller abandoned the request.
    #[error("request cancelled")]
    Cancelled,

    /// The run completed without any assistant text.
    #[error("assistant returned no recommendation text")]
    EmptyRecommendation,
}

impl AssistantError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn api(message: impl Into<String>, retryable: bool, context: ErrorContext) -> Self {
        Self::Api {
            message: message.into(),
            retryable,
            context,
        }
    }

    /// Whether trying again later could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Api { retryable, .. } => *retryable,
            Self::TimedOut { .. } => true,
            Self::Config(_)
            | Self::Authentication { .. }
            | Self::InvalidResponse(_)
            | Self::RunFailed { .. }
            | Self::Cancelled
            | Self::EmptyRecommendation => false,
        }
    }

    /// Short error code for logging.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_error",
            Self::Http(_) => "http_error",
            Self::Authentication { .. } => "authentication_error",
            Self::Api { .. } => "api_error",
            Self::InvalidResponse(_) => "invalid_response",
            Self::RunFailed { .. } => "run_failed",
            Self::TimedOut { .. } => "timeout",
            Self::Cancelled => "cancelled",
            Self::EmptyRecommendation => "empty_recommendation",
        }
    }

    /// Get the error context if available.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Authentication { context, .. } | Self::Api { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the request ID if available.
    pub fn request_id(&self) -> Option<&str> {
        self.context().and_then(|c| c.request_id.as_deref())
    }

    /// Message suitable for showing to the person who asked.
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(msg) => format!("Recommendations are not configured: {msg}."),
            Self::Http(_) | Self::InvalidResponse(_) => {
                "Recommendation unavailable, please retry later.".to_string()
            }
            Self::Api { retryable: true, .. } => {
                "Recommendation unavailable, please retry later.".to_string()
            }
            Self::Api { message, .. } => {
                format!("The assistant service rejected the request: {message}")
            }
            Self::Authentication { .. } => {
                "The assistant service rejected the configured credential; check OPENAI_API_KEY."
                    .to_string()
            }
            Self::RunFailed { .. } | Self::EmptyRecommendation => {
                "The assistant could not produce a recommendation.".to_string()
            }
            Self::TimedOut { .. } => {
                "The assistant took too long to respond; please retry later.".to_string()
            }
            Self::Cancelled => "Recommendation request cancelled.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_failed_message_includes_reason() {
        let err = AssistantError::RunFailed {
            state: RunState::Failed,
            message: Some("rate limit".into()),
        };
        assert_eq!(err.to_string(), "run ended as failed: rate limit");

        let bare = AssistantError::RunFailed {
            state: RunState::Expired,
            message: None,
        };
        assert_eq!(bare.to_string(), "run ended as expired");
    }

    #[test]
    fn user_messages_are_distinct_per_class() {
        let config = AssistantError::config("OPENAI_API_KEY not set").user_message();
        let auth = AssistantError::Authentication {
            message: "bad key".into(),
            context: ErrorContext::new().with_status(401),
        }
        .user_message();
        let failed = AssistantError::RunFailed {
            state: RunState::Failed,
            message: None,
        }
        .user_message();
        let timeout = AssistantError::TimedOut { polls: 3 }.user_message();
        let transient =
            AssistantError::api("overloaded", true, ErrorContext::new().with_status(503))
                .user_message();

        let all = [&config, &auth, &failed, &timeout, &transient];
        for (i, a) in all.iter().enumerate() {
            for b in all.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert!(transient.contains("retry later"));
        assert!(failed.contains("could not produce a recommendation"));
    }

    #[test]
    fn request_id_comes_from_context() {
        let err = AssistantError::api(
            "boom",
            false,
            ErrorContext::new().with_status(400).with_request_id("req_1"),
        );
        assert_eq!(err.request_id(), Some("req_1"));
        assert!(!err.is_retryable());
        assert_eq!(err.code(), "api_error");
    }
}
