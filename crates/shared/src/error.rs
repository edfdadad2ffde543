use serde_json::Value;
use thiserror::Error;

/// Failure surface of the remote gateway. Endpoints are inconsistent about
/// failure bodies (`{error: "..."}`, `{error: [...]}`, or nothing at all),
/// so the structured variant keeps the raw body for the normalizer.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{route}: server rejected request with status {status}")]
    Status {
        route: String,
        status: u16,
        body: Option<Value>,
    },
    #[error("{route}: transport failure: {message}")]
    Transport { route: String, message: String },
    #[error("{route}: malformed response body: {message}")]
    Decode { route: String, message: String },
}

impl GatewayError {
    pub fn route(&self) -> &str {
        match self {
            GatewayError::Status { route, .. }
            | GatewayError::Transport { route, .. }
            | GatewayError::Decode { route, .. } => route,
        }
    }
}
