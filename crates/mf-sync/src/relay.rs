//! Cross-Context Relay
//!
//! Publishes events locally and to other browsing contexts, and re-injects
//! events received from them into the local dispatcher.

use std::rc::Rc;

use log::{debug, warn};
use serde_json::Value;

use crate::config::SyncConfig;
use crate::dispatcher::EventDispatcher;
use crate::event::SyncEvent;
use crate::transport::{RelayEnvelope, RelayTransport, Scheduler};

pub struct Relay {
    dispatcher: EventDispatcher,
    transports: Vec<Box<dyn RelayTransport>>,
    scheduler: Rc<dyn Scheduler>,
    relay_key: String,
    source: String,
}

impl Relay {
    pub fn new(dispatcher: EventDispatcher, scheduler: Rc<dyn Scheduler>, config: &SyncConfig) -> Self {
        Self {
            dispatcher,
            transports: Vec::new(),
            scheduler,
            relay_key: config.relay_key.clone(),
            source: config.message_source.clone(),
        }
    }

    pub fn with_transport<T: RelayTransport + 'static>(mut self, transport: T) -> Self {
        self.add_transport(Box::new(transport));
        self
    }

    pub fn add_transport(&mut self, transport: Box<dyn RelayTransport>) {
        debug!("[relay] using {} transport", transport.name());
        self.transports.push(transport);
    }

    pub fn transport_names(&self) -> Vec<&'static str> {
        self.transports.iter().map(|t| t.name()).collect()
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Emit `event` locally, then hand it to every transport.
    ///
    /// Local delivery happens first and does not depend on any transport:
    /// storage notifications never reach the writing context. Transport
    /// failures are logged and skipped.
    pub fn broadcast(&self, event: SyncEvent) {
        self.dispatcher.emit(&event);

        let envelope = match RelayEnvelope::new(&self.source, &event, self.scheduler.now_millis()) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!("[relay] not relaying {}: {}", event.kind(), err);
                return;
            }
        };
        for transport in &self.transports {
            if let Err(err) = transport.send(&envelope) {
                warn!("[relay] {} failed for {}: {}", transport.name(), envelope.event, err);
            }
        }
    }

    /// Handle a storage-change notification. Returns whether an event was
    /// re-emitted.
    pub fn receive_storage_change(&self, key: &str, new_value: Option<&str>) -> bool {
        if key != self.relay_key {
            return false;
        }
        // removal of the echo by its writer
        let Some(raw) = new_value else {
            return false;
        };
        match serde_json::from_str::<RelayEnvelope>(raw) {
            Ok(envelope) => self.receive_envelope(&envelope),
            Err(err) => {
                warn!("[relay] ignoring unreadable storage echo: {}", err);
                false
            }
        }
    }

    /// Handle a window or channel message. Returns whether an event was
    /// re-emitted.
    pub fn receive_message(&self, message: &Value) -> bool {
        // unrelated traffic is common on window messages, drop it quietly
        if message.get("source").and_then(Value::as_str) != Some(self.source.as_str()) {
            return false;
        }
        match serde_json::from_value::<RelayEnvelope>(message.clone()) {
            Ok(envelope) => self.receive_envelope(&envelope),
            Err(err) => {
                warn!("[relay] ignoring malformed message: {}", err);
                false
            }
        }
    }

    pub fn receive_envelope(&self, envelope: &RelayEnvelope) -> bool {
        if envelope.source != self.source {
            debug!("[relay] ignoring envelope from `{}`", envelope.source);
            return false;
        }
        match envelope.to_event() {
            Ok(event) => {
                self.dispatcher.emit(&event);
                true
            }
            Err(err) => {
                warn!("[relay] dropping {}: {}", envelope.event, err);
                false
            }
        }
    }

    /// Close every transport
    pub fn close(&self) {
        for transport in &self.transports {
            transport.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::memory::{MemoryEventLoop, MemoryStorage, MemoryWindow};
    use crate::storage::DurableStorage;
    use crate::transport::{RelayError, StorageEchoTransport};
    use std::cell::RefCell;

    struct FailingTransport;

    impl RelayTransport for FailingTransport {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn send(&self, _envelope: &RelayEnvelope) -> Result<(), RelayError> {
            Err(RelayError::Transport {
                transport: "failing",
                message: "boom".to_string(),
            })
        }
    }

    fn recorded(dispatcher: &EventDispatcher) -> Rc<RefCell<Vec<SyncEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let set = dispatcher.subscribe_all(move |event| seen_clone.borrow_mut().push(event.clone()));
        std::mem::forget(set);
        seen
    }

    #[test]
    fn test_broadcast_emits_locally_even_if_transport_fails() {
        let event_loop = MemoryEventLoop::new();
        let dispatcher = EventDispatcher::new();
        let seen = recorded(&dispatcher);
        let relay = Relay::new(dispatcher, Rc::new(event_loop), &SyncConfig::default())
            .with_transport(FailingTransport);

        relay.broadcast(SyncEvent::Selected(5));
        assert_eq!(*seen.borrow(), vec![SyncEvent::Selected(5)]);
    }

    #[test]
    fn test_storage_change_filters_key_and_removals() {
        let event_loop = MemoryEventLoop::new();
        let dispatcher = EventDispatcher::new();
        let seen = recorded(&dispatcher);
        let relay = Relay::new(dispatcher, Rc::new(event_loop), &SyncConfig::default());

        let raw = r#"{"source":"micro-frontend-event","event":"client:deleted","data":4,"timestamp":1}"#;
        assert!(!relay.receive_storage_change("selected-ids", Some(raw)));
        assert!(!relay.receive_storage_change("relay-channel", None));
        assert!(!relay.receive_storage_change("relay-channel", Some("{oops")));
        assert!(relay.receive_storage_change("relay-channel", Some(raw)));
        assert_eq!(*seen.borrow(), vec![SyncEvent::Deleted(4)]);
    }

    #[test]
    fn test_messages_require_source_tag() {
        let event_loop = MemoryEventLoop::new();
        let dispatcher = EventDispatcher::new();
        let seen = recorded(&dispatcher);
        let relay = Relay::new(dispatcher, Rc::new(event_loop), &SyncConfig::default());

        let foreign = serde_json::json!({"source": "react-devtools", "event": "client:selected", "data": 1});
        let unrelated = serde_json::json!("just a string");
        let bad_payload = serde_json::json!({"source": "micro-frontend-event", "event": "client:selected", "data": "x"});
        let ours = serde_json::json!({"source": "micro-frontend-event", "event": "clients:cleared"});

        assert!(!relay.receive_message(&foreign));
        assert!(!relay.receive_message(&unrelated));
        assert!(!relay.receive_message(&bad_payload));
        assert!(relay.receive_message(&ours));
        assert_eq!(*seen.borrow(), vec![SyncEvent::Cleared]);
    }

    #[test]
    fn test_legacy_transports_reach_other_contexts() {
        let event_loop = MemoryEventLoop::new();
        let scheduler: Rc<dyn Scheduler> = Rc::new(event_loop.clone());
        let config = SyncConfig::default();
        let storage_a = MemoryStorage::attached(&event_loop);
        let storage_b = storage_a.open_context();
        let window = MemoryWindow::new(&event_loop);

        let relay_a = Relay::new(EventDispatcher::new(), scheduler.clone(), &config)
            .with_transport(StorageEchoTransport::new(storage_a.clone(), config.relay_key.clone(), 1000, scheduler.clone()))
            .with_transport(window.transport());

        // tab B only listens to storage; it sits in another window
        let dispatcher_b = EventDispatcher::new();
        let seen_b = recorded(&dispatcher_b);
        let relay_b = Rc::new(Relay::new(dispatcher_b, scheduler.clone(), &config));
        let relay_b_clone = relay_b.clone();
        storage_b.on_change(move |key, value| {
            relay_b_clone.receive_storage_change(key, value);
        });

        // same-window listener of A sees its own message back
        let seen_a = recorded(relay_a.dispatcher());
        let window_relay = Rc::new(relay_a);
        let window_relay_clone = window_relay.clone();
        window.add_listener(move |message| {
            window_relay_clone.receive_message(message);
        });

        window_relay.broadcast(SyncEvent::Unselected(3));
        event_loop.run_until_idle();
        assert_eq!(*seen_b.borrow(), vec![SyncEvent::Unselected(3)]);
        assert_eq!(seen_a.borrow().len(), 2, "local emit plus window echo");

        // echo removal notifies B with a removal, which is ignored
        event_loop.advance(1000);
        assert!(storage_a.get_item(&config.relay_key).unwrap().is_none());
        assert_eq!(seen_b.borrow().len(), 1);
        assert!(seen_b.borrow().iter().all(|e| e.kind() == EventKind::Unselected));
    }
}
