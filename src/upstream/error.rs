//! Upstream failure taxonomy.

use thiserror::Error;

/// Failure reported by a [`Forwarder`](super::Forwarder).
///
/// Never retried by the firewall; the variant decides the client-facing status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// Upstream answered with a non-200 status.
    #[error("Model endpoint returned error: {status} {body}")]
    Status { status: u16, body: String },

    /// Connection or transport failure.
    #[error("Error connecting to model endpoint: {0}")]
    Unreachable(String),

    /// No complete response within the deadline.
    #[error("Model endpoint timed out after {0}s")]
    Timeout(u64),

    /// 200 response whose body is not JSON.
    #[error("Model endpoint returned invalid JSON: {0}")]
    InvalidResponse(String),
}

impl UpstreamError {
    /// HTTP status surfaced to the client.
    pub fn status_code(&self) -> u16 {
        match self {
            UpstreamError::Status { status, .. } => *status,
            UpstreamError::Unreachable(_) | UpstreamError::InvalidResponse(_) => 502,
            UpstreamError::Timeout(_) => 504,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Status { .. } => "status",
            UpstreamError::Unreachable(_) => "unreachable",
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::InvalidResponse(_) => "invalid_response",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_by_variant() {
        let status = UpstreamError::Status { status: 503, body: "overloaded".into() };
        assert_eq!(status.status_code(), 503);
        assert_eq!(status.to_string(), "Model endpoint returned error: 503 overloaded");

        assert_eq!(UpstreamError::Unreachable("refused".into()).status_code(), 502);
        assert_eq!(UpstreamError::InvalidResponse("eof".into()).status_code(), 502);
        assert_eq!(UpstreamError::Timeout(30).status_code(), 504);
        assert_eq!(UpstreamError::Timeout(30).to_string(), "Model endpoint timed out after 30s");
    }
}
