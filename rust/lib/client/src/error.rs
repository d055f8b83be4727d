use thiserror::Error;

/// Client-side API error.
///
/// Variants are split by who reacts to them: `Validation` never reaches
/// the network and keeps the operator's input, `Unauthorized` tears down
/// the session, `Server` carries the backend's own reason, and
/// `Cancelled` is silent by contract.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Locally detected bad input; no network call was made.
    #[error("{0}")]
    Validation(String),

    /// The backend rejected the bearer credential (HTTP 401).
    #[error("session rejected by backend")]
    Unauthorized,

    /// Non-success response with the backend-supplied reason when present.
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// Transport-level failure (connect, DNS, TLS).
    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    /// The request was cancelled by a superseding cycle or teardown.
    #[error("cancelled")]
    Cancelled,

    /// A response body did not match the expected shape.
    #[error("decode: {0}")]
    Decode(String),
}

impl ApiError {
    /// True for input rejected before any network activity.
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }

    /// True for deliberate cancellation, which is never reported.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_backend_reason() {
        let err = ApiError::Server {
            status: 422,
            message: "ip_limit must be >= 0".into(),
        };
        assert_eq!(err.to_string(), "HTTP 422: ip_limit must be >= 0");
    }

    #[test]
    fn validation_display_is_the_message() {
        let err = ApiError::Validation("system name must not be blank".into());
        assert_eq!(err.to_string(), "system name must not be blank");
        assert!(err.is_validation());
        assert!(!err.is_cancelled());
    }

    #[test]
    fn cancelled_is_flagged() {
        assert!(ApiError::Cancelled.is_cancelled());
        assert!(!ApiError::Unauthorized.is_cancelled());
    }
}
