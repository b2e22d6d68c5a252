use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DashboardError {
    #[error("City is required")]
    MissingParameter,

    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("synthesis failed: {0}")]
    SynthesisFailure(String),
}

impl DashboardError {
    pub fn provider(msg: impl Into<String>) -> Self {
        DashboardError::ProviderUnavailable(msg.into())
    }

    pub fn synthesis(msg: impl Into<String>) -> Self {
        DashboardError::SynthesisFailure(msg.into())
    }
}

// Only MissingParameter is expected to reach this, the other variants are
// recovered inside the fallback pipeline.
impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match self {
            DashboardError::MissingParameter => StatusCode::BAD_REQUEST,
            DashboardError::ProviderUnavailable(_) => StatusCode::BAD_GATEWAY,
            DashboardError::SynthesisFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameter_is_bad_request() {
        let response = DashboardError::MissingParameter.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn messages() {
        assert_eq!(DashboardError::MissingParameter.to_string(), "City is required");
        assert_eq!(
            DashboardError::provider("no API key configured").to_string(),
            "provider unavailable: no API key configured"
        );
    }
}
