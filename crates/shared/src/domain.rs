use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(RecordId);

/// The domain collections the synchronization core manages. Each kind owns an
/// independently evolving local cache of its remote collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Users,
    Grades,
    Units,
    Links,
    LabourLogs,
    Attachments,
    Settings,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Users,
        EntityKind::Grades,
        EntityKind::Units,
        EntityKind::Links,
        EntityKind::LabourLogs,
        EntityKind::Attachments,
        EntityKind::Settings,
    ];

    /// Collection path segment on the remote API. Also used as the entity
    /// label in logs, so every operation identifier stays unique per kind.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Users => "users",
            EntityKind::Grades => "grades",
            EntityKind::Units => "units",
            EntityKind::Links => "links",
            EntityKind::LabourLogs => "labour-logs",
            EntityKind::Attachments => "attachments",
            EntityKind::Settings => "settings",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.collection() == value)
            .ok_or_else(|| format!("unknown entity kind '{value}'"))
    }
}

/// One cached record: an opaque JSON object with a required numeric `id`
/// assigned by the remote side on creation and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRecord(pub Map<String, Value>);

impl EntityRecord {
    pub fn id(&self) -> Option<RecordId> {
        self.0.get("id").and_then(Value::as_i64).map(RecordId)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }
}

impl From<Map<String, Value>> for EntityRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
