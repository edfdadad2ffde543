use serde_json::Value;
use shared::domain::{EntityRecord, RecordId};

/// Observable cache of one remote collection plus its lifecycle flags.
///
/// Transitions are pure: every method returns the next state and never
/// touches anything outside it, so one state per entity kind can evolve
/// independently of all the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityState {
    pub data: Vec<EntityRecord>,
    pub loading: bool,
    pub error: Option<String>,
    /// Server-side count for paginated collections. Not kept consistent with
    /// `data` after local mutations.
    pub total_records: Option<u64>,
}

/// Success effect of a settled command, applied to the cached collection.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandEffect {
    Replace {
        records: Vec<EntityRecord>,
        total_records: Option<u64>,
    },
    Prepend(EntityRecord),
    ReplaceById(EntityRecord),
    SetStatus { id: RecordId, status: String },
    Remove(RecordId),
}

impl EntityState {
    /// Pending: the in-flight window opens and any previous failure is
    /// cleared before the remote call resolves.
    pub fn begin(&self) -> Self {
        Self {
            data: self.data.clone(),
            loading: true,
            error: None,
            total_records: self.total_records,
        }
    }

    /// Fulfilled: the window closes and the success effect lands.
    pub fn settle_ok(&self, effect: &CommandEffect) -> Self {
        let mut next = Self {
            data: self.data.clone(),
            loading: false,
            error: None,
            total_records: self.total_records,
        };
        match effect {
            CommandEffect::Replace {
                records,
                total_records,
            } => {
                next.data = records.clone();
                next.total_records = *total_records;
            }
            CommandEffect::Prepend(record) => {
                next.data.insert(0, record.clone());
            }
            CommandEffect::ReplaceById(record) => {
                // No match leaves the collection structurally unchanged.
                if let Some(id) = record.id() {
                    if let Some(slot) =
                        next.data.iter_mut().find(|existing| existing.id() == Some(id))
                    {
                        *slot = record.clone();
                    }
                }
            }
            CommandEffect::SetStatus { id, status } => {
                if let Some(record) = next.data.iter_mut().find(|record| record.id() == Some(*id)) {
                    record.set_field("status", Value::String(status.clone()));
                }
            }
            CommandEffect::Remove(id) => {
                next.data.retain(|record| record.id() != Some(*id));
            }
        }
        next
    }

    /// Rejected: the window closes with a message; the collection is never
    /// mutated on failure.
    pub fn settle_err(&self, message: impl Into<String>) -> Self {
        Self {
            data: self.data.clone(),
            loading: false,
            error: Some(message.into()),
            total_records: self.total_records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> EntityRecord {
        match value {
            Value::Object(fields) => EntityRecord(fields),
            other => panic!("record fixture must be a JSON object, got {other}"),
        }
    }

    #[test]
    fn begin_sets_loading_and_clears_previous_error() {
        let state = EntityState {
            data: vec![record(json!({"id": 1, "name": "A"}))],
            loading: false,
            error: Some("previous failure".into()),
            total_records: Some(9),
        };

        let next = state.begin();

        assert!(next.loading);
        assert_eq!(next.error, None);
        assert_eq!(next.data, state.data);
        assert_eq!(next.total_records, Some(9));
    }

    #[test]
    fn settle_err_preserves_data_and_sets_message() {
        let state = EntityState {
            data: vec![record(json!({"id": 1, "name": "A"}))],
            loading: true,
            error: None,
            total_records: None,
        };

        let next = state.settle_err("Something went wrong");

        assert!(!next.loading);
        assert_eq!(next.error.as_deref(), Some("Something went wrong"));
        assert_eq!(next.data, state.data);
    }

    #[test]
    fn replace_swaps_collection_and_records_server_count() {
        let state = EntityState {
            data: vec![record(json!({"id": 7}))],
            loading: true,
            error: None,
            total_records: None,
        };

        let next = state.settle_ok(&CommandEffect::Replace {
            records: vec![record(json!({"id": 1})), record(json!({"id": 2}))],
            total_records: Some(42),
        });

        assert_eq!(next.data.len(), 2);
        assert_eq!(next.total_records, Some(42));
        assert!(!next.loading);
    }

    #[test]
    fn prepend_inserts_new_record_at_front_preserving_order() {
        let empty = EntityState::default();
        let after_a =
            empty.settle_ok(&CommandEffect::Prepend(record(json!({"id": 1, "name": "A"}))));
        let after_b =
            after_a.settle_ok(&CommandEffect::Prepend(record(json!({"id": 2, "name": "B"}))));

        assert_eq!(
            after_b.data,
            vec![
                record(json!({"id": 2, "name": "B"})),
                record(json!({"id": 1, "name": "A"})),
            ]
        );
    }

    #[test]
    fn remove_deletes_exactly_the_matching_record() {
        let state = EntityState {
            data: vec![
                record(json!({"id": 2, "name": "B"})),
                record(json!({"id": 1, "name": "A"})),
                record(json!({"id": 3, "name": "C"})),
            ],
            ..EntityState::default()
        };

        let next = state.settle_ok(&CommandEffect::Remove(RecordId(1)));

        assert_eq!(
            next.data,
            vec![
                record(json!({"id": 2, "name": "B"})),
                record(json!({"id": 3, "name": "C"})),
            ]
        );
    }

    #[test]
    fn remove_of_unknown_id_leaves_data_untouched() {
        let state = EntityState {
            data: vec![record(json!({"id": 2, "name": "B"}))],
            ..EntityState::default()
        };

        let next = state.settle_ok(&CommandEffect::Remove(RecordId(99)));

        assert_eq!(next.data, state.data);
    }

    #[test]
    fn replace_by_id_keeps_record_position() {
        let state = EntityState {
            data: vec![
                record(json!({"id": 1, "name": "A"})),
                record(json!({"id": 2, "name": "B"})),
                record(json!({"id": 3, "name": "C"})),
            ],
            ..EntityState::default()
        };

        let next = state.settle_ok(&CommandEffect::ReplaceById(record(
            json!({"id": 2, "name": "B-renamed"}),
        )));

        assert_eq!(next.data[1], record(json!({"id": 2, "name": "B-renamed"})));
        assert_eq!(next.data[0], state.data[0]);
        assert_eq!(next.data[2], state.data[2]);
    }

    #[test]
    fn replace_by_id_without_match_is_a_silent_no_op() {
        let state = EntityState {
            data: vec![record(json!({"id": 1, "name": "A"}))],
            loading: true,
            ..EntityState::default()
        };

        let next = state.settle_ok(&CommandEffect::ReplaceById(record(
            json!({"id": 42, "name": "missing"}),
        )));

        assert_eq!(next.data, state.data);
        // The lifecycle flags still transition.
        assert!(!next.loading);
    }

    #[test]
    fn set_status_touches_only_the_status_field() {
        let state = EntityState {
            data: vec![
                record(json!({"id": 2, "name": "B", "status": "active", "rate": 17.5})),
                record(json!({"id": 4, "name": "D", "status": "active"})),
            ],
            ..EntityState::default()
        };

        let next = state.settle_ok(&CommandEffect::SetStatus {
            id: RecordId(2),
            status: "inactive".into(),
        });

        assert_eq!(
            next.data[0],
            record(json!({"id": 2, "name": "B", "status": "inactive", "rate": 17.5}))
        );
        assert_eq!(next.data[1], state.data[1]);
    }
}
