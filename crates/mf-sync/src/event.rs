//! Synchronization Events
//!
//! The tagged events exchanged between surfaces, and their wire names.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Client, ClientId, StateSnapshot};

/// Event kind, serialized with the wire names every surface understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "client:created")]
    Created,
    #[serde(rename = "client:updated")]
    Updated,
    #[serde(rename = "client:deleted")]
    Deleted,
    #[serde(rename = "client:selected")]
    Selected,
    #[serde(rename = "client:unselected")]
    Unselected,
    #[serde(rename = "clients:cleared")]
    Cleared,
    #[serde(rename = "state:sync")]
    StateSync,
}

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        EventKind::Created,
        EventKind::Updated,
        EventKind::Deleted,
        EventKind::Selected,
        EventKind::Unselected,
        EventKind::Cleared,
        EventKind::StateSync,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Created => "client:created",
            EventKind::Updated => "client:updated",
            EventKind::Deleted => "client:deleted",
            EventKind::Selected => "client:selected",
            EventKind::Unselected => "client:unselected",
            EventKind::Cleared => "clients:cleared",
            EventKind::StateSync => "state:sync",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A synchronization event with its kind-specific payload
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Created(Client),
    Updated(Client),
    Deleted(ClientId),
    Selected(ClientId),
    Unselected(ClientId),
    Cleared,
    StateSync(StateSnapshot),
}

impl SyncEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SyncEvent::Created(_) => EventKind::Created,
            SyncEvent::Updated(_) => EventKind::Updated,
            SyncEvent::Deleted(_) => EventKind::Deleted,
            SyncEvent::Selected(_) => EventKind::Selected,
            SyncEvent::Unselected(_) => EventKind::Unselected,
            SyncEvent::Cleared => EventKind::Cleared,
            SyncEvent::StateSync(_) => EventKind::StateSync,
        }
    }

    /// Encode the payload as it travels in the `data` field.
    /// `clients:cleared` carries no payload and encodes as `null`.
    pub fn payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            SyncEvent::Created(client) | SyncEvent::Updated(client) => serde_json::to_value(client),
            SyncEvent::Deleted(id) | SyncEvent::Selected(id) | SyncEvent::Unselected(id) => {
                serde_json::to_value(id)
            }
            SyncEvent::Cleared => Ok(Value::Null),
            SyncEvent::StateSync(snapshot) => serde_json::to_value(snapshot),
        }
    }

    /// Rebuild an event from its wire kind and `data` field
    pub fn from_parts(kind: EventKind, data: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            EventKind::Created => SyncEvent::Created(serde_json::from_value(data)?),
            EventKind::Updated => SyncEvent::Updated(serde_json::from_value(data)?),
            EventKind::Deleted => SyncEvent::Deleted(serde_json::from_value(data)?),
            EventKind::Selected => SyncEvent::Selected(serde_json::from_value(data)?),
            EventKind::Unselected => SyncEvent::Unselected(serde_json::from_value(data)?),
            EventKind::Cleared => SyncEvent::Cleared,
            EventKind::StateSync => SyncEvent::StateSync(serde_json::from_value(data)?),
        })
    }

    /// Id of the client the event is about, if any
    pub fn client_id(&self) -> Option<ClientId> {
        match self {
            SyncEvent::Created(client) | SyncEvent::Updated(client) => Some(client.id),
            SyncEvent::Deleted(id) | SyncEvent::Selected(id) | SyncEvent::Unselected(id) => Some(*id),
            SyncEvent::Cleared | SyncEvent::StateSync(_) => None,
        }
    }
}
