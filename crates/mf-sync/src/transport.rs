//! Relay Transports
//!
//! The wire envelope, the transport and scheduler seams, and the storage
//! echo transport. Browser transports live in `mf-web`.

use std::rc::Rc;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::event::{EventKind, SyncEvent};
use crate::storage::{DurableStorage, StorageError};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to encode `{kind}` payload: {source}")]
    Encode {
        kind: EventKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed `{kind}` payload: {source}")]
    Payload {
        kind: EventKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed relay envelope: {0}")]
    Envelope(#[source] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("{transport} transport failed: {message}")]
    Transport {
        transport: &'static str,
        message: String,
    },
}

/// What travels between browsing contexts: `{source, event, data, timestamp}`.
///
/// The same shape is used for the storage echo, window messages and the
/// broadcast channel; receivers ignore anything with a foreign `source`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayEnvelope {
    #[serde(default)]
    pub source: String,
    pub event: EventKind,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub timestamp: u64,
}

impl RelayEnvelope {
    pub fn new(source: &str, event: &SyncEvent, timestamp: u64) -> Result<Self, RelayError> {
        let kind = event.kind();
        let data = event
            .payload()
            .map_err(|source| RelayError::Encode { kind, source })?;
        Ok(Self {
            source: source.to_string(),
            event: kind,
            data,
            timestamp,
        })
    }

    pub fn to_event(&self) -> Result<SyncEvent, RelayError> {
        SyncEvent::from_parts(self.event, self.data.clone()).map_err(|source| RelayError::Payload {
            kind: self.event,
            source,
        })
    }

    pub fn to_json(&self) -> Result<String, RelayError> {
        serde_json::to_string(self).map_err(|source| RelayError::Encode {
            kind: self.event,
            source,
        })
    }
}

/// One way of reaching other browsing contexts
pub trait RelayTransport {
    fn name(&self) -> &'static str;

    fn send(&self, envelope: &RelayEnvelope) -> Result<(), RelayError>;

    /// Release platform resources held by the transport
    fn close(&self) {}
}

/// Clock and deferred execution of the hosting event loop
pub trait Scheduler {
    fn now_millis(&self) -> u64;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>);
}

/// Writes each envelope under one storage key; other contexts observe the
/// storage-change notification. The key is removed after `ttl_ms` unless it
/// has been overwritten meanwhile, so a reload does not replay it.
pub struct StorageEchoTransport<S> {
    storage: S,
    key: String,
    ttl_ms: u32,
    scheduler: Rc<dyn Scheduler>,
}

impl<S> StorageEchoTransport<S>
where
    S: DurableStorage + Clone + 'static,
{
    pub fn new(storage: S, key: impl Into<String>, ttl_ms: u32, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            storage,
            key: key.into(),
            ttl_ms,
            scheduler,
        }
    }
}

impl<S> RelayTransport for StorageEchoTransport<S>
where
    S: DurableStorage + Clone + 'static,
{
    fn name(&self) -> &'static str {
        "storage-echo"
    }

    fn send(&self, envelope: &RelayEnvelope) -> Result<(), RelayError> {
        let raw = envelope.to_json()?;
        self.storage.set_item(&self.key, &raw)?;

        let storage = self.storage.clone();
        let key = self.key.clone();
        self.scheduler.schedule(
            self.ttl_ms,
            Box::new(move || match storage.get_item(&key) {
                Ok(Some(current)) if current == raw => {
                    if let Err(err) = storage.remove_item(&key) {
                        warn!("[relay] failed to clear echo `{}`: {}", key, err);
                    }
                }
                Ok(_) => {}
                Err(err) => warn!("[relay] failed to read echo `{}`: {}", key, err),
            }),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryEventLoop, MemoryStorage};
    use crate::models::Client;

    fn envelope(event: &SyncEvent, ts: u64) -> RelayEnvelope {
        RelayEnvelope::new("micro-frontend-event", event, ts).unwrap()
    }

    #[test]
    fn test_envelope_wire_shape() {
        let env = envelope(&SyncEvent::Selected(5), 42);
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"source": "micro-frontend-event", "event": "client:selected", "data": 5, "timestamp": 42})
        );
        assert_eq!(env.to_event().unwrap(), SyncEvent::Selected(5));
    }

    #[test]
    fn test_envelope_without_timestamp_parses() {
        // window messages from other bundles carry no timestamp
        let env: RelayEnvelope =
            serde_json::from_str(r#"{"source":"micro-frontend-event","event":"client:deleted","data":9}"#).unwrap();
        assert_eq!(env.timestamp, 0);
        assert_eq!(env.to_event().unwrap(), SyncEvent::Deleted(9));
    }

    #[test]
    fn test_echo_is_removed_after_ttl() {
        let event_loop = MemoryEventLoop::new();
        let storage = MemoryStorage::default();
        let transport = StorageEchoTransport::new(storage.clone(), "relay-channel", 1000, Rc::new(event_loop.clone()));

        transport.send(&envelope(&SyncEvent::Cleared, 1)).unwrap();
        assert!(storage.get_item("relay-channel").unwrap().is_some());

        event_loop.advance(999);
        assert!(storage.get_item("relay-channel").unwrap().is_some());
        event_loop.advance(1);
        assert!(storage.get_item("relay-channel").unwrap().is_none());
    }

    #[test]
    fn test_echo_cleanup_keeps_newer_value() {
        let event_loop = MemoryEventLoop::new();
        let storage = MemoryStorage::default();
        let transport = StorageEchoTransport::new(storage.clone(), "relay-channel", 1000, Rc::new(event_loop.clone()));

        transport.send(&envelope(&SyncEvent::Selected(1), 1)).unwrap();
        event_loop.advance(500);
        let client = Client {
            id: 2,
            name: "Jorge".to_string(),
            ..Default::default()
        };
        transport.send(&envelope(&SyncEvent::Created(client), 501)).unwrap();

        // first cleanup fires but the key now holds the second envelope
        event_loop.advance(500);
        let raw = storage.get_item("relay-channel").unwrap().unwrap();
        assert!(raw.contains("client:created"));

        event_loop.advance(500);
        assert!(storage.get_item("relay-channel").unwrap().is_none());
    }

    #[test]
    fn test_echo_reports_storage_failure() {
        let event_loop = MemoryEventLoop::new();
        let storage = MemoryStorage::with_quota(8);
        let transport = StorageEchoTransport::new(storage, "relay-channel", 1000, Rc::new(event_loop));
        let err = transport.send(&envelope(&SyncEvent::Cleared, 1)).unwrap_err();
        assert!(matches!(err, RelayError::Storage(StorageError::QuotaExceeded { .. })));
    }
}
