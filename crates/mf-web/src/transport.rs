//! Browser Transports
//!
//! Window messages, the broadcast channel, and the timer-backed scheduler
//! the storage echo uses.

use gloo_timers::callback::Timeout;
use mf_sync::{RelayEnvelope, RelayError, RelayTransport, Scheduler};
use serde::Serialize;
use wasm_bindgen::JsValue;

/// `Date.now()` clock and `setTimeout` tasks
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    fn now_millis(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) {
        Timeout::new(delay_ms, task).forget();
    }
}

/// Envelope as a plain JS object. Maps become objects, not `Map`s, so
/// receivers in other bundles can read it.
pub fn envelope_to_js(envelope: &RelayEnvelope, transport: &'static str) -> Result<JsValue, RelayError> {
    envelope
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| RelayError::Transport {
            transport,
            message: err.to_string(),
        })
}

pub(crate) fn js_error_text(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

// ========================
// Window messages
// ========================

/// `window.postMessage(envelope, "*")`, reaching every listener of this
/// window (the sender included) and parent/child frames that relay it
pub struct WindowMessageTransport {
    window: web_sys::Window,
}

impl WindowMessageTransport {
    const NAME: &'static str = "window-message";

    pub fn new() -> Option<Self> {
        web_sys::window().map(|window| Self { window })
    }
}

impl RelayTransport for WindowMessageTransport {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn send(&self, envelope: &RelayEnvelope) -> Result<(), RelayError> {
        let message = envelope_to_js(envelope, Self::NAME)?;
        self.window
            .post_message(&message, "*")
            .map_err(|err| RelayError::Transport {
                transport: Self::NAME,
                message: js_error_text(&err),
            })
    }
}

// ========================
// Broadcast channel
// ========================

/// Same-origin `BroadcastChannel`. Delivers to every other channel object
/// of the same name, in this page or another tab, never to itself.
pub struct BroadcastChannelTransport {
    channel: web_sys::BroadcastChannel,
}

impl BroadcastChannelTransport {
    const NAME: &'static str = "broadcast-channel";

    pub fn open(name: &str) -> Result<Self, RelayError> {
        web_sys::BroadcastChannel::new(name)
            .map(|channel| Self { channel })
            .map_err(|err| RelayError::Transport {
                transport: Self::NAME,
                message: js_error_text(&err),
            })
    }

    /// The underlying channel, for attaching a `message` listener
    pub fn channel(&self) -> web_sys::BroadcastChannel {
        self.channel.clone()
    }
}

impl RelayTransport for BroadcastChannelTransport {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn send(&self, envelope: &RelayEnvelope) -> Result<(), RelayError> {
        let message = envelope_to_js(envelope, Self::NAME)?;
        self.channel
            .post_message(&message)
            .map_err(|err| RelayError::Transport {
                transport: Self::NAME,
                message: js_error_text(&err),
            })
    }

    fn close(&self) {
        self.channel.close();
    }
}
