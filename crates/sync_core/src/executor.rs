use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use serde_json::Value;
use shared::{
    domain::{EntityKind, EntityRecord, RecordId},
    error::GatewayError,
    protocol::{ListPayload, StatusUpdate},
};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{
    gateway::{GatewayCall, RemoteGateway},
    normalize::{normalize_failure, GENERIC_FAILURE_MESSAGE},
    notify::NotificationSink,
    store::{CommandEffect, EntityState},
};

/// One entity kind's cache plus the per-entity sequence counter used to
/// discard stale settlements. Every kind owns exactly one of these.
pub struct EntityStore {
    kind: EntityKind,
    state: RwLock<EntityState>,
    seq: AtomicU64,
}

impl EntityStore {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            state: RwLock::new(EntityState::default()),
            seq: AtomicU64::new(0),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub async fn snapshot(&self) -> EntityState {
        self.state.read().await.clone()
    }

    pub(crate) async fn reset(&self) {
        *self.state.write().await = EntityState::default();
    }

    fn issue_token(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn latest_token(&self) -> u64 {
        self.seq.load(Ordering::SeqCst)
    }
}

/// A requested operation against one entity kind. The lifecycle is identical
/// for every variant; only the wire call and the success effect differ.
#[derive(Debug, Clone)]
pub enum Command {
    List { filter: Option<Value> },
    Create { input: Value },
    Update { id: RecordId, patch: Value },
    SetStatus { id: RecordId, status: String },
    Delete { id: RecordId },
}

impl Command {
    pub fn op(&self) -> &'static str {
        match self {
            Command::List { .. } => "list",
            Command::Create { .. } => "create",
            Command::Update { .. } => "update",
            Command::SetStatus { .. } => "set-status",
            Command::Delete { .. } => "delete",
        }
    }

    fn call(&self, kind: EntityKind) -> GatewayCall {
        match self {
            Command::List { filter } => GatewayCall::List {
                kind,
                filter: filter.clone(),
            },
            Command::Create { input } => GatewayCall::Create {
                kind,
                input: input.clone(),
            },
            Command::Update { id, patch } => GatewayCall::Update {
                kind,
                id: *id,
                patch: patch.clone(),
            },
            Command::SetStatus { id, status } => GatewayCall::SetStatus {
                kind,
                id: *id,
                status: status.clone(),
            },
            Command::Delete { id } => GatewayCall::Delete { kind, id: *id },
        }
    }

    fn default_success_message(&self) -> &'static str {
        match self {
            Command::List { .. } => "Records loaded",
            Command::Create { .. } => "Record created",
            Command::Update { .. } => "Record updated",
            Command::SetStatus { .. } => "Status updated",
            Command::Delete { .. } => "Record deleted",
        }
    }

    /// Decodes the envelope `data` into this command's success effect. The
    /// payload shape depends on the operation: array (optionally paginated)
    /// for list, a single record for create/update, an `{id, status}` echo
    /// for set-status, and the raw id for delete.
    fn effect(&self, data: Value, route: &str) -> Result<CommandEffect, GatewayError> {
        let decode = |message: String| GatewayError::Decode {
            route: route.to_string(),
            message,
        };

        match self {
            Command::List { .. } => {
                let payload: ListPayload =
                    serde_json::from_value(data).map_err(|err| decode(err.to_string()))?;
                Ok(match payload {
                    ListPayload::Paged {
                        items,
                        total_records,
                    } => CommandEffect::Replace {
                        records: items,
                        total_records: Some(total_records),
                    },
                    ListPayload::Plain(records) => CommandEffect::Replace {
                        records,
                        total_records: None,
                    },
                })
            }
            Command::Create { .. } => {
                let record: EntityRecord =
                    serde_json::from_value(data).map_err(|err| decode(err.to_string()))?;
                Ok(CommandEffect::Prepend(record))
            }
            Command::Update { .. } => {
                let record: EntityRecord =
                    serde_json::from_value(data).map_err(|err| decode(err.to_string()))?;
                Ok(CommandEffect::ReplaceById(record))
            }
            Command::SetStatus { .. } => {
                let echo: StatusUpdate =
                    serde_json::from_value(data).map_err(|err| decode(err.to_string()))?;
                Ok(CommandEffect::SetStatus {
                    id: echo.id,
                    status: echo.status,
                })
            }
            Command::Delete { .. } => {
                let id = data
                    .as_i64()
                    .ok_or_else(|| decode(format!("expected raw record id, got {data}")))?;
                Ok(CommandEffect::Remove(RecordId(id)))
            }
        }
    }
}

/// What became of a dispatched command. Remote failures are not surfaced
/// here; callers observe them through `EntityState::error` and the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The settlement (success or failure) was applied to the store.
    Applied,
    /// A newer command was issued for the same entity while this one was in
    /// flight; the settlement was discarded wholesale.
    Superseded,
}

/// Drives one command through Pending → Fulfilled/Rejected against a store,
/// the gateway, and the sink. One instance serves every entity kind.
pub struct CommandExecutor {
    gateway: Arc<dyn RemoteGateway>,
    sink: Arc<dyn NotificationSink>,
}

impl CommandExecutor {
    pub fn new(gateway: Arc<dyn RemoteGateway>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { gateway, sink }
    }

    pub async fn dispatch(&self, store: &EntityStore, command: Command) -> CommandOutcome {
        let token = store.issue_token();
        let call = command.call(store.kind());
        let route = call.route();

        {
            let mut state = store.state.write().await;
            *state = state.begin();
        }
        info!(entity = %store.kind(), op = command.op(), seq = token, "command submitted");

        let settled: Result<(CommandEffect, Option<String>), String> =
            match self.gateway.execute(call).await {
                Ok(envelope) if envelope.success => command
                    .effect(envelope.data, &route)
                    .map(|effect| (effect, envelope.message))
                    .map_err(|err| normalize_failure(&err)),
                // A well-formed response can still declare failure; its
                // message is already display-ready.
                Ok(envelope) => Err(envelope
                    .message
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())),
                Err(err) => {
                    warn!(
                        entity = %store.kind(),
                        op = command.op(),
                        seq = token,
                        route = err.route(),
                        error = %err,
                        "gateway call failed"
                    );
                    Err(normalize_failure(&err))
                }
            };

        let mut state = store.state.write().await;
        if store.latest_token() != token {
            info!(
                entity = %store.kind(),
                op = command.op(),
                seq = token,
                latest = store.latest_token(),
                "discarding stale settlement"
            );
            return CommandOutcome::Superseded;
        }

        match settled {
            Ok((effect, message)) => {
                *state = state.settle_ok(&effect);
                drop(state);
                let text = message
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| command.default_success_message().to_string());
                info!(entity = %store.kind(), op = command.op(), seq = token, "command fulfilled");
                self.sink.success(&text);
            }
            Err(message) => {
                *state = state.settle_err(message.clone());
                drop(state);
                warn!(
                    entity = %store.kind(),
                    op = command.op(),
                    seq = token,
                    error = %message,
                    "command rejected"
                );
                self.sink.error(&message);
            }
        }

        CommandOutcome::Applied
    }
}
