use std::sync::Arc;

use serde_json::Value;
use shared::domain::{EntityKind, RecordId};
use tokio::sync::broadcast;

pub mod executor;
pub mod gateway;
pub mod normalize;
pub mod notify;
pub mod store;

pub use executor::{Command, CommandExecutor, CommandOutcome, EntityStore};
pub use gateway::{GatewayCall, HttpGateway, RemoteGateway};
pub use normalize::{normalize_failure, GENERIC_FAILURE_MESSAGE};
pub use notify::{BroadcastSink, Notice, NoticeKind, NotificationSink, TracingSink};
pub use store::{CommandEffect, EntityState};

const NOTICE_CHANNEL_CAPACITY: usize = 64;

/// Mirrors every notice into the client's broadcast channel before handing
/// it to the injected sink.
struct FanoutSink {
    notices: Arc<BroadcastSink>,
    delegate: Arc<dyn NotificationSink>,
}

impl NotificationSink for FanoutSink {
    fn notify(&self, kind: NoticeKind, text: &str) {
        self.notices.notify(kind, text);
        self.delegate.notify(kind, text);
    }
}

struct StoreSet {
    users: EntityStore,
    grades: EntityStore,
    units: EntityStore,
    links: EntityStore,
    labour_logs: EntityStore,
    attachments: EntityStore,
    settings: EntityStore,
}

impl StoreSet {
    fn new() -> Self {
        Self {
            users: EntityStore::new(EntityKind::Users),
            grades: EntityStore::new(EntityKind::Grades),
            units: EntityStore::new(EntityKind::Units),
            links: EntityStore::new(EntityKind::Links),
            labour_logs: EntityStore::new(EntityKind::LabourLogs),
            attachments: EntityStore::new(EntityKind::Attachments),
            settings: EntityStore::new(EntityKind::Settings),
        }
    }

    fn get(&self, kind: EntityKind) -> &EntityStore {
        match kind {
            EntityKind::Users => &self.users,
            EntityKind::Grades => &self.grades,
            EntityKind::Units => &self.units,
            EntityKind::Links => &self.links,
            EntityKind::LabourLogs => &self.labour_logs,
            EntityKind::Attachments => &self.attachments,
            EntityKind::Settings => &self.settings,
        }
    }

    fn all(&self) -> [&EntityStore; 7] {
        [
            &self.users,
            &self.grades,
            &self.units,
            &self.links,
            &self.labour_logs,
            &self.attachments,
            &self.settings,
        ]
    }
}

/// Composition root and the only door presentation code has into the core.
///
/// Owns one independently evolving store per entity kind plus the injected
/// gateway and sink. Commands settle into the store and the sink only;
/// remote failures are never re-thrown to the caller.
pub struct SyncClient {
    executor: CommandExecutor,
    stores: StoreSet,
    notices: Arc<BroadcastSink>,
}

impl SyncClient {
    pub fn new(gateway: Arc<dyn RemoteGateway>, sink: Arc<dyn NotificationSink>) -> Self {
        let notices = Arc::new(BroadcastSink::new(NOTICE_CHANNEL_CAPACITY));
        let fanout = Arc::new(FanoutSink {
            notices: Arc::clone(&notices),
            delegate: sink,
        });
        Self {
            executor: CommandExecutor::new(gateway, fanout),
            stores: StoreSet::new(),
            notices,
        }
    }

    /// Live feed of every notice the core emits. Only notices issued after
    /// the call are delivered, so subscribe before dispatching.
    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Replaces the cached collection with the remote one.
    pub async fn list(&self, kind: EntityKind, filter: Option<Value>) -> CommandOutcome {
        self.dispatch(kind, Command::List { filter }).await
    }

    /// Creates a record remotely; the server echo lands at the front of the
    /// cached collection.
    pub async fn create(&self, kind: EntityKind, input: Value) -> CommandOutcome {
        self.dispatch(kind, Command::Create { input }).await
    }

    /// Patches a record remotely; the echoed record replaces the cached one
    /// in place.
    pub async fn update(&self, kind: EntityKind, id: RecordId, patch: Value) -> CommandOutcome {
        self.dispatch(kind, Command::Update { id, patch }).await
    }

    /// Changes only the status field of a record.
    pub async fn set_status(
        &self,
        kind: EntityKind,
        id: RecordId,
        status: impl Into<String>,
    ) -> CommandOutcome {
        self.dispatch(
            kind,
            Command::SetStatus {
                id,
                status: status.into(),
            },
        )
        .await
    }

    /// Deletes a record remotely and drops it from the cache.
    pub async fn delete(&self, kind: EntityKind, id: RecordId) -> CommandOutcome {
        self.dispatch(kind, Command::Delete { id }).await
    }

    /// Cloned view of one entity's state. `loading` is observable from the
    /// moment a command is issued, not from when it settles.
    pub async fn snapshot(&self, kind: EntityKind) -> EntityState {
        self.stores.get(kind).snapshot().await
    }

    /// Wholesale replacement of every entity state, e.g. on logout.
    pub async fn reset(&self) {
        for store in self.stores.all() {
            store.reset().await;
        }
    }

    async fn dispatch(&self, kind: EntityKind, command: Command) -> CommandOutcome {
        self.executor.dispatch(self.stores.get(kind), command).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
