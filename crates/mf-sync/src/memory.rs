//! In-Memory Platform
//!
//! Stand-ins for the browser pieces the sync layer talks to: an event loop
//! with timers, `localStorage` with cross-context change notifications,
//! `window.postMessage` and `BroadcastChannel`. Used by tests and by
//! native hosts; every delivery is queued on the event loop, never inline.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use serde_json::Value;

use crate::storage::{DurableStorage, StorageError};
use crate::transport::{RelayEnvelope, RelayError, RelayTransport, Scheduler};

// ========================
// Event loop
// ========================

struct Timer {
    due: u64,
    seq: u64,
    task: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct LoopInner {
    now: u64,
    next_seq: u64,
    queue: VecDeque<Box<dyn FnOnce()>>,
    timers: Vec<Timer>,
}

/// Single-threaded task queue with a manual clock
#[derive(Clone, Default)]
pub struct MemoryEventLoop {
    inner: Rc<RefCell<LoopInner>>,
}

impl MemoryEventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task for the next turn of the loop
    pub fn post(&self, task: impl FnOnce() + 'static) {
        self.inner.borrow_mut().queue.push_back(Box::new(task));
    }

    /// Run queued tasks (including ones they queue) until none are left.
    /// Timers are not fired. Returns the number of tasks run.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.inner.borrow_mut().queue.pop_front();
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    /// Move the clock forward, firing due timers in order
    pub fn advance(&self, ms: u64) {
        self.run_until_idle();
        let target = self.inner.borrow().now + ms;
        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                let due = inner
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.due <= target)
                    .min_by_key(|(_, timer)| (timer.due, timer.seq))
                    .map(|(idx, _)| idx);
                due.map(|idx| {
                    let timer = inner.timers.remove(idx);
                    inner.now = timer.due;
                    timer.task
                })
            };
            match next {
                Some(task) => {
                    task();
                    self.run_until_idle();
                }
                None => break,
            }
        }
        self.inner.borrow_mut().now = target;
    }

    pub fn pending_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }
}

impl Scheduler for MemoryEventLoop {
    fn now_millis(&self) -> u64 {
        self.inner.borrow().now
    }

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) {
        let mut inner = self.inner.borrow_mut();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let due = inner.now + u64::from(delay_ms);
        inner.timers.push(Timer { due, seq, task });
    }
}

// ========================
// Storage
// ========================

type ChangeCallback = Rc<dyn Fn(&str, Option<&str>)>;

struct Watcher {
    context: u64,
    callback: ChangeCallback,
}

struct StorageShared {
    items: BTreeMap<String, String>,
    quota: Option<usize>,
    watchers: Vec<Watcher>,
    next_context: u64,
    event_loop: Option<MemoryEventLoop>,
}

/// `localStorage` of one browser profile.
///
/// Each handle belongs to a browsing context; change notifications go to
/// watchers of the *other* contexts only, like the `storage` DOM event.
#[derive(Clone)]
pub struct MemoryStorage {
    shared: Rc<RefCell<StorageShared>>,
    context: u64,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::build(None, None)
    }
}

impl MemoryStorage {
    fn build(event_loop: Option<MemoryEventLoop>, quota: Option<usize>) -> Self {
        Self {
            shared: Rc::new(RefCell::new(StorageShared {
                items: BTreeMap::new(),
                quota,
                watchers: Vec::new(),
                next_context: 1,
                event_loop,
            })),
            context: 0,
        }
    }

    /// Storage whose change notifications are delivered on `event_loop`
    pub fn attached(event_loop: &MemoryEventLoop) -> Self {
        Self::build(Some(event_loop.clone()), None)
    }

    /// Detached storage rejecting writes that would exceed `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        Self::build(None, Some(bytes))
    }

    /// Handle for another browsing context sharing the same data
    pub fn open_context(&self) -> Self {
        let context = {
            let mut shared = self.shared.borrow_mut();
            let context = shared.next_context;
            shared.next_context += 1;
            context
        };
        Self {
            shared: self.shared.clone(),
            context,
        }
    }

    /// Watch changes made by other contexts
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(&str, Option<&str>) + 'static,
    {
        self.shared.borrow_mut().watchers.push(Watcher {
            context: self.context,
            callback: Rc::new(callback),
        });
    }

    pub fn keys(&self) -> Vec<String> {
        self.shared.borrow().items.keys().cloned().collect()
    }

    fn notify(&self, key: &str, value: Option<String>) {
        let (event_loop, callbacks) = {
            let shared = self.shared.borrow();
            let Some(event_loop) = shared.event_loop.clone() else {
                return;
            };
            let callbacks: Vec<ChangeCallback> = shared
                .watchers
                .iter()
                .filter(|w| w.context != self.context)
                .map(|w| w.callback.clone())
                .collect();
            (event_loop, callbacks)
        };
        for callback in callbacks {
            let key = key.to_string();
            let value = value.clone();
            event_loop.post(move || callback(&key, value.as_deref()));
        }
    }
}

impl DurableStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.shared.borrow().items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let changed = {
            let mut shared = self.shared.borrow_mut();
            if let Some(quota) = shared.quota {
                let used: usize = shared
                    .items
                    .iter()
                    .filter(|(k, _)| k.as_str() != key)
                    .map(|(k, v)| k.len() + v.len())
                    .sum();
                if used + key.len() + value.len() > quota {
                    return Err(StorageError::QuotaExceeded { key: key.to_string() });
                }
            }
            let previous = shared.items.insert(key.to_string(), value.to_string());
            previous.as_deref() != Some(value)
        };
        if changed {
            self.notify(key, Some(value.to_string()));
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let removed = self.shared.borrow_mut().items.remove(key).is_some();
        if removed {
            self.notify(key, None);
        }
        Ok(())
    }
}

// ========================
// Window messages
// ========================

type MessageCallback = Rc<dyn Fn(&Value)>;

struct WindowShared {
    listeners: Vec<MessageCallback>,
}

/// `window.postMessage` within one page: every listener receives every
/// message, the sender's own listener included
#[derive(Clone)]
pub struct MemoryWindow {
    shared: Rc<RefCell<WindowShared>>,
    event_loop: MemoryEventLoop,
}

impl MemoryWindow {
    pub fn new(event_loop: &MemoryEventLoop) -> Self {
        Self {
            shared: Rc::new(RefCell::new(WindowShared {
                listeners: Vec::new(),
            })),
            event_loop: event_loop.clone(),
        }
    }

    pub fn add_listener<F>(&self, callback: F)
    where
        F: Fn(&Value) + 'static,
    {
        self.shared.borrow_mut().listeners.push(Rc::new(callback));
    }

    pub fn post_message(&self, message: Value) {
        let shared = self.shared.clone();
        self.event_loop.post(move || {
            let listeners: Vec<MessageCallback> =
                shared.borrow().listeners.iter().cloned().collect();
            for listener in listeners {
                listener(&message);
            }
        });
    }

    /// Relay transport posting on this window
    pub fn transport(&self) -> MemoryWindowTransport {
        MemoryWindowTransport { window: self.clone() }
    }
}

pub struct MemoryWindowTransport {
    window: MemoryWindow,
}

impl RelayTransport for MemoryWindowTransport {
    fn name(&self) -> &'static str {
        "window-message"
    }

    fn send(&self, envelope: &RelayEnvelope) -> Result<(), RelayError> {
        let message = serde_json::to_value(envelope).map_err(|source| RelayError::Encode {
            kind: envelope.event,
            source,
        })?;
        self.window.post_message(message);
        Ok(())
    }
}

// ========================
// Broadcast channel
// ========================

struct ChannelShared {
    endpoints: Vec<(u64, Option<MessageCallback>)>,
    next_id: u64,
}

/// Named broadcast channel: messages reach every endpoint except the sender
#[derive(Clone)]
pub struct MemoryChannel {
    shared: Rc<RefCell<ChannelShared>>,
    event_loop: MemoryEventLoop,
}

impl MemoryChannel {
    pub fn new(event_loop: &MemoryEventLoop) -> Self {
        Self {
            shared: Rc::new(RefCell::new(ChannelShared {
                endpoints: Vec::new(),
                next_id: 0,
            })),
            event_loop: event_loop.clone(),
        }
    }

    pub fn endpoint(&self) -> MemoryChannelEndpoint {
        let mut shared = self.shared.borrow_mut();
        let id = shared.next_id;
        shared.next_id += 1;
        shared.endpoints.push((id, None));
        MemoryChannelEndpoint {
            id,
            channel: self.clone(),
        }
    }

    pub fn endpoint_count(&self) -> usize {
        self.shared.borrow().endpoints.len()
    }
}

#[derive(Clone)]
pub struct MemoryChannelEndpoint {
    id: u64,
    channel: MemoryChannel,
}

impl MemoryChannelEndpoint {
    pub fn on_message<F>(&self, callback: F)
    where
        F: Fn(&Value) + 'static,
    {
        let mut shared = self.channel.shared.borrow_mut();
        if let Some(slot) = shared.endpoints.iter_mut().find(|(id, _)| *id == self.id) {
            slot.1 = Some(Rc::new(callback));
        }
    }
}

impl RelayTransport for MemoryChannelEndpoint {
    fn name(&self) -> &'static str {
        "broadcast-channel"
    }

    fn send(&self, envelope: &RelayEnvelope) -> Result<(), RelayError> {
        let message = serde_json::to_value(envelope).map_err(|source| RelayError::Encode {
            kind: envelope.event,
            source,
        })?;
        let shared = self.channel.shared.clone();
        let sender = self.id;
        self.channel.event_loop.post(move || {
            let receivers: Vec<MessageCallback> = shared
                .borrow()
                .endpoints
                .iter()
                .filter(|(id, _)| *id != sender)
                .filter_map(|(_, cb)| cb.clone())
                .collect();
            for receiver in receivers {
                receiver(&message);
            }
        });
        Ok(())
    }

    fn close(&self) {
        self.channel
            .shared
            .borrow_mut()
            .endpoints
            .retain(|(id, _)| *id != self.id);
    }
}
