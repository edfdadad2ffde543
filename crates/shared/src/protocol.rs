use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{EntityRecord, RecordId};

/// Success envelope returned by every endpoint:
/// `{success, message, data}` with `data` shaped per operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// `list` payload. Paginated collections wrap the records with a separate
/// server-side count; the rest return a bare array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListPayload {
    Paged {
        items: Vec<EntityRecord>,
        total_records: u64,
    },
    Plain(Vec<EntityRecord>),
}

/// Partial payload for status changes, sent as the request body and echoed
/// back verbatim as the `data` of a successful response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub id: RecordId,
    pub status: String,
}
