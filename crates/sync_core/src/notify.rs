use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub issued_at: DateTime<Utc>,
}

/// Display boundary the core pushes messages through. Fire-and-forget: the
/// core never waits on, or learns about, delivery.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, kind: NoticeKind, text: &str);

    fn success(&self, text: &str) {
        self.notify(NoticeKind::Success, text);
    }

    fn info(&self, text: &str) {
        self.notify(NoticeKind::Info, text);
    }

    fn error(&self, text: &str) {
        self.notify(NoticeKind::Error, text);
    }
}

/// Fans notices out to any number of shell subscribers. Sends into a channel
/// with no receivers are dropped, which matches the fire-and-forget contract.
pub struct BroadcastSink {
    tx: broadcast::Sender<Notice>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}

impl NotificationSink for BroadcastSink {
    fn notify(&self, kind: NoticeKind, text: &str) {
        let _ = self.tx.send(Notice {
            kind,
            text: text.to_string(),
            issued_at: Utc::now(),
        });
    }
}

/// Headless sink that routes notices into the log stream.
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, kind: NoticeKind, text: &str) {
        match kind {
            NoticeKind::Success => info!(notice = "success", "{text}"),
            NoticeKind::Info => info!(notice = "info", "{text}"),
            NoticeKind::Error => error!(notice = "error", "{text}"),
        }
    }
}
