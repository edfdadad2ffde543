use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::{
    domain::{EntityKind, RecordId},
    error::GatewayError,
    protocol::{ApiEnvelope, StatusUpdate},
};
use url::Url;

/// One logical operation against the remote API: an operation identifier,
/// an optional path parameter, and an optional body.
#[derive(Debug, Clone)]
pub enum GatewayCall {
    List {
        kind: EntityKind,
        filter: Option<Value>,
    },
    Create {
        kind: EntityKind,
        input: Value,
    },
    Update {
        kind: EntityKind,
        id: RecordId,
        patch: Value,
    },
    SetStatus {
        kind: EntityKind,
        id: RecordId,
        status: String,
    },
    Delete {
        kind: EntityKind,
        id: RecordId,
    },
}

impl GatewayCall {
    pub fn kind(&self) -> EntityKind {
        match self {
            GatewayCall::List { kind, .. }
            | GatewayCall::Create { kind, .. }
            | GatewayCall::Update { kind, .. }
            | GatewayCall::SetStatus { kind, .. }
            | GatewayCall::Delete { kind, .. } => *kind,
        }
    }

    /// Operation identifier used in logs and failure values. Embeds the
    /// collection path, so no two entity kinds ever share an identifier.
    pub fn route(&self) -> String {
        match self {
            GatewayCall::List { kind, .. } => format!("GET /{}", kind.collection()),
            GatewayCall::Create { kind, .. } => format!("POST /{}", kind.collection()),
            GatewayCall::Update { kind, id, .. } => {
                format!("PUT /{}/{}", kind.collection(), id.0)
            }
            GatewayCall::SetStatus { kind, id, .. } => {
                format!("PATCH /{}/{}/status", kind.collection(), id.0)
            }
            GatewayCall::Delete { kind, id } => {
                format!("DELETE /{}/{}", kind.collection(), id.0)
            }
        }
    }
}

/// The external HTTP boundary. Implemented by `HttpGateway` in production
/// and by trait doubles in tests.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn execute(&self, call: GatewayCall) -> Result<ApiEnvelope, GatewayError>;
}

pub struct HttpGateway {
    http: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let parsed =
            Url::parse(base_url).with_context(|| format!("invalid server url '{base_url}'"))?;
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn collection_url(&self, kind: EntityKind) -> String {
        format!("{}/{}", self.base_url, kind.collection())
    }

    fn record_url(&self, kind: EntityKind, id: RecordId) -> String {
        format!("{}/{}/{}", self.base_url, kind.collection(), id.0)
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn execute(&self, call: GatewayCall) -> Result<ApiEnvelope, GatewayError> {
        let route = call.route();
        let request = match &call {
            GatewayCall::List { kind, filter } => {
                let mut request = self.http.get(self.collection_url(*kind));
                if let Some(filter) = filter {
                    request = request.query(&filter_pairs(filter));
                }
                request
            }
            GatewayCall::Create { kind, input } => {
                self.http.post(self.collection_url(*kind)).json(input)
            }
            GatewayCall::Update { kind, id, patch } => {
                self.http.put(self.record_url(*kind, *id)).json(patch)
            }
            GatewayCall::SetStatus { kind, id, status } => self
                .http
                .patch(format!("{}/status", self.record_url(*kind, *id)))
                .json(&StatusUpdate {
                    id: *id,
                    status: status.clone(),
                }),
            GatewayCall::Delete { kind, id } => self.http.delete(self.record_url(*kind, *id)),
        };

        let response = request.send().await.map_err(|err| GatewayError::Transport {
            route: route.clone(),
            message: err.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<Value>().await.ok();
            return Err(GatewayError::Status {
                route,
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<ApiEnvelope>()
            .await
            .map_err(|err| GatewayError::Decode {
                route,
                message: err.to_string(),
            })
    }
}

/// Flattens a JSON object filter into query pairs. Non-string scalars keep
/// their JSON rendering; non-object filters produce no pairs.
fn filter_pairs(filter: &Value) -> Vec<(String, String)> {
    match filter {
        Value::Object(fields) => fields
            .iter()
            .map(|(name, value)| {
                let rendered = match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                (name.clone(), rendered)
            })
            .collect(),
        _ => Vec::new(),
    }
}
