use serde_json::Value;
use shared::error::GatewayError;

/// Fallback shown whenever a failure carries no usable message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong";

/// Collapses the gateway's heterogeneous failure shapes into one display
/// string. Endpoints disagree about failure bodies, so precedence is: the
/// message inside the `error` structure, then the first entry of an
/// array-shaped `error`, then the generic fallback. Transport failures and
/// anything unrecognized fall straight through to the fallback.
pub fn normalize_failure(failure: &GatewayError) -> String {
    let body = match failure {
        GatewayError::Status {
            body: Some(body), ..
        } => body,
        _ => return GENERIC_FAILURE_MESSAGE.to_string(),
    };

    message_from_body(body).unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
}

fn message_from_body(body: &Value) -> Option<String> {
    let error = body.get("error")?;

    if let Some(text) = error.as_str() {
        return non_empty(text);
    }
    if let Some(text) = error.get("message").and_then(Value::as_str) {
        return non_empty(text);
    }
    if let Some(text) = error
        .as_array()
        .and_then(|messages| messages.first())
        .and_then(Value::as_str)
    {
        return non_empty(text);
    }

    None
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
