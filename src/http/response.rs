//! Mapping pipeline outcomes onto HTTP responses.
//!
//! # Responsibilities
//! - One status code and JSON shape per rejection category
//! - Upstream failures keep the upstream status when there is one
//!
//! # Design Decisions
//! - Bodies use a single `detail` field so clients can branch on status alone
//! - Upstream timeouts result in 504 Gateway Timeout

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::pipeline::Outcome;
use crate::upstream::UpstreamError;

pub const INVALID_JSON_DETAIL: &str = "Request must be valid json";
pub const RATE_LIMITED_DETAIL: &str = "Rate limit exceeded. Please try again later.";
pub const BLOCKED_ERROR: &str = "Prompt blocked by MIF";

/// Client-facing rejection.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    InvalidJson,
    RateLimited,
    Blocked { reason: String },
    Upstream(UpstreamError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Blocked { .. } => StatusCode::FORBIDDEN,
            ApiError::Upstream(err) => {
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }

    fn detail(&self) -> Value {
        match self {
            ApiError::InvalidJson => json!(INVALID_JSON_DETAIL),
            ApiError::RateLimited => json!(RATE_LIMITED_DETAIL),
            ApiError::Blocked { reason } => json!({ "error": BLOCKED_ERROR, "reason": reason }),
            ApiError::Upstream(err) => json!(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.detail() }))).into_response()
    }
}

/// Successful upstream body, or the rejection for every other outcome.
pub fn outcome_result(outcome: Outcome) -> Result<Json<Value>, ApiError> {
    match outcome {
        Outcome::Forwarded(body) => Ok(Json(body)),
        Outcome::MalformedInput => Err(ApiError::InvalidJson),
        Outcome::RateLimited => Err(ApiError::RateLimited),
        Outcome::Blocked(reason) => Err(ApiError::Blocked { reason }),
        Outcome::UpstreamFailed(err) => Err(ApiError::Upstream(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_per_category() {
        assert_eq!(ApiError::InvalidJson.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            ApiError::Blocked { reason: "x".into() }.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Upstream(UpstreamError::Timeout(30)).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::Upstream(UpstreamError::Unreachable("refused".into())).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn upstream_status_passes_through() {
        let err = ApiError::Upstream(UpstreamError::Status {
            status: 503,
            body: "busy".into(),
        });
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.detail(), json!("Model endpoint returned error: 503 busy"));
    }

    #[test]
    fn blocked_detail_shape() {
        let err = ApiError::Blocked {
            reason: "injection: bypass".into(),
        };
        assert_eq!(
            err.detail(),
            json!({ "error": "Prompt blocked by MIF", "reason": "injection: bypass" })
        );
    }

    #[test]
    fn forwarded_is_ok() {
        let result = outcome_result(Outcome::Forwarded(json!({ "ok": true })));
        assert_eq!(result.unwrap().0, json!({ "ok": true }));
    }
}
