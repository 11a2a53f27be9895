//! DOM Event Listeners
//!
//! Listeners that detach themselves when dropped, plus typed helpers for
//! the events a surface listens to.

use log::{debug, warn};
use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

/// An attached DOM event listener. Dropping it removes the listener.
pub struct ListenerGuard {
    target: web_sys::EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl ListenerGuard {
    pub fn attach<F>(target: &web_sys::EventTarget, event: &'static str, handler: F) -> Result<Self, JsValue>
    where
        F: FnMut(web_sys::Event) + 'static,
    {
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
        debug!("[listener] detached `{}`", self.event);
    }
}

/// `storage` events of the window: `(key, new_value)`. The key is `None`
/// when another context cleared the storage.
pub fn on_storage<F>(handler: F) -> Option<ListenerGuard>
where
    F: Fn(Option<&str>, Option<&str>) + 'static,
{
    let window = web_sys::window()?;
    attach_logged(window.as_ref(), "storage", move |event| {
        let Some(event) = event.dyn_ref::<web_sys::StorageEvent>() else {
            return;
        };
        handler(event.key().as_deref(), event.new_value().as_deref());
    })
}

/// `message` events of the window, decoded to JSON
pub fn on_window_message<F>(handler: F) -> Option<ListenerGuard>
where
    F: Fn(&Value) + 'static,
{
    let window = web_sys::window()?;
    attach_logged(window.as_ref(), "message", message_handler(handler))
}

/// `message` events of a broadcast channel, decoded to JSON
pub fn on_channel_message<F>(channel: &web_sys::BroadcastChannel, handler: F) -> Option<ListenerGuard>
where
    F: Fn(&Value) + 'static,
{
    attach_logged(channel.as_ref(), "message", message_handler(handler))
}

/// Fires when the document becomes visible again
pub fn on_visible<F>(handler: F) -> Option<ListenerGuard>
where
    F: Fn() + 'static,
{
    let document = web_sys::window()?.document()?;
    let doc = document.clone();
    attach_logged(document.as_ref(), "visibilitychange", move |_| {
        if !doc.hidden() {
            handler();
        }
    })
}

/// `resize` of the window, reporting the new inner width
pub fn on_resize<F>(handler: F) -> Option<ListenerGuard>
where
    F: Fn(u32) + 'static,
{
    let window = web_sys::window()?;
    attach_logged(window.as_ref(), "resize", move |_| {
        if let Some(width) = inner_width() {
            handler(width);
        }
    })
}

pub fn inner_width() -> Option<u32> {
    web_sys::window()?
        .inner_width()
        .ok()?
        .as_f64()
        .map(|w| w.max(0.0) as u32)
}

fn message_handler<F>(handler: F) -> impl FnMut(web_sys::Event) + 'static
where
    F: Fn(&Value) + 'static,
{
    move |event: web_sys::Event| {
        let Some(event) = event.dyn_ref::<web_sys::MessageEvent>() else {
            return;
        };
        // other scripts post all kinds of things; only JSON-shaped data is ours
        if let Ok(value) = serde_wasm_bindgen::from_value::<Value>(event.data()) {
            handler(&value);
        }
    }
}

fn attach_logged<F>(target: &web_sys::EventTarget, event: &'static str, handler: F) -> Option<ListenerGuard>
where
    F: FnMut(web_sys::Event) + 'static,
{
    match ListenerGuard::attach(target, event, handler) {
        Ok(guard) => Some(guard),
        Err(err) => {
            warn!("[listener] failed to attach `{}`: {:?}", event, err);
            None
        }
    }
}
