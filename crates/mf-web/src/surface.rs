//! Surface Context
//!
//! Mounts a [`SyncContext`] for one Leptos component tree: browser storage,
//! the transports of the configured relay mode and their DOM listeners.
//! Everything is released when the owning component is cleaned up.

use std::rc::Rc;

use leptos::prelude::*;
use log::info;
use mf_sync::projection::PaginatedView;
use mf_sync::{
    ClientId, ClientStore, EventDispatcher, Relay, RelayError, RelayMode, Scheduler, StorageEchoTransport,
    SyncConfig, SyncContext, ViewState,
};
use thiserror::Error;

use crate::config::WebConfig;
use crate::listener::{self, ListenerGuard};
use crate::storage::WebStorage;
use crate::transport::{BroadcastChannelTransport, BrowserScheduler, WindowMessageTransport};

pub type WebSync = SyncContext<WebStorage>;

/// Width assumed when the window cannot be measured
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

#[derive(Debug, Error)]
pub enum MountError {
    #[error("no browser window")]
    NoWindow,
    #[error(transparent)]
    Relay(#[from] RelayError),
}

/// Check that a surface could be mounted with `config`, without keeping
/// anything open
pub fn check_platform(config: &SyncConfig) -> Result<(), MountError> {
    web_sys::window().ok_or(MountError::NoWindow)?;
    if config.relay_mode == RelayMode::Channel {
        let channel = BroadcastChannelTransport::open(&config.relay_key)?;
        mf_sync::RelayTransport::close(&channel);
    }
    Ok(())
}

/// Build the sync context for `config` and attach its listeners
pub fn assemble(name: &str, config: &SyncConfig) -> Result<(Rc<WebSync>, Vec<ListenerGuard>), MountError> {
    web_sys::window().ok_or(MountError::NoWindow)?;
    let storage = WebStorage::local();
    let scheduler: Rc<dyn Scheduler> = Rc::new(BrowserScheduler);
    let mut relay = Relay::new(EventDispatcher::new(), scheduler.clone(), config);

    let mut channel = None;
    match config.relay_mode {
        RelayMode::Channel => {
            let transport = BroadcastChannelTransport::open(&config.relay_key)?;
            channel = Some(transport.channel());
            relay.add_transport(Box::new(transport));
        }
        RelayMode::Legacy => {
            relay.add_transport(Box::new(StorageEchoTransport::new(
                storage.clone(),
                config.relay_key.clone(),
                config.echo_ttl_ms,
                scheduler,
            )));
            if let Some(transport) = WindowMessageTransport::new() {
                relay.add_transport(Box::new(transport));
            }
        }
    }

    let sync = SyncContext::mount(name, ClientStore::load(storage, config), relay);

    let mut guards = Vec::new();
    // other tabs changing the cache, and the legacy storage echo
    let weak = Rc::downgrade(&sync);
    guards.extend(listener::on_storage(move |key, value| {
        if let Some(sync) = weak.upgrade() {
            sync.handle_storage_event(key, value);
        }
    }));

    let weak = Rc::downgrade(&sync);
    let on_message = move |message: &serde_json::Value| {
        if let Some(sync) = weak.upgrade() {
            sync.relay().receive_message(message);
        }
    };
    match channel {
        Some(channel) => guards.extend(listener::on_channel_message(&channel, on_message)),
        None => guards.extend(listener::on_window_message(on_message)),
    }

    Ok((sync, guards))
}

/// Reactive handle to a mounted surface. Reads through it are tracked and
/// re-run after every synchronization event.
#[derive(Clone, Copy)]
pub struct SurfaceContext {
    sync: StoredValue<Rc<WebSync>, LocalStorage>,
    listeners: StoredValue<Vec<ListenerGuard>, LocalStorage>,
    revision: RwSignal<u64>,
}

impl SurfaceContext {
    /// Mount under the current reactive owner; torn down with it
    pub fn mount(name: &str, config: &SyncConfig) -> Result<Self, MountError> {
        let (sync, guards) = assemble(name, config)?;
        let revision = RwSignal::new(0u64);
        sync.watch(move |_| {
            revision.try_update(|rev| *rev += 1);
        });

        let surface = Self {
            sync: StoredValue::new_local(sync),
            listeners: StoredValue::new_local(guards),
            revision,
        };
        on_cleanup(move || surface.teardown());
        Ok(surface)
    }

    pub fn teardown(&self) {
        self.sync.try_with_value(|sync| sync.teardown());
        self.listeners.try_update_value(|guards| guards.clear());
    }

    /// Untracked access, for actions
    pub fn sync(&self) -> Rc<WebSync> {
        self.sync.get_value()
    }

    /// Tracked read of the sync context
    pub fn with<R>(&self, f: impl FnOnce(&WebSync) -> R) -> R {
        self.revision.track();
        self.sync.with_value(|sync| f(sync))
    }

    pub fn client_count(&self) -> usize {
        self.with(|sync| sync.store().len())
    }

    pub fn selected_ids(&self) -> Vec<ClientId> {
        self.with(|sync| sync.store().selected_ids())
    }

    pub fn selected_count(&self) -> usize {
        self.with(|sync| sync.store().selected_count())
    }

    pub fn is_selected(&self, id: ClientId) -> bool {
        self.with(|sync| sync.store().is_selected(id))
    }

    /// Page of the full list, or of the selection only
    pub fn project(&self, view: &ViewState, selection_only: bool, viewport_width: u32) -> PaginatedView {
        self.with(|sync| {
            let store = sync.store();
            let selection = selection_only.then(|| store.selection());
            view.project(store.clients(), selection, viewport_width)
        })
    }
}

/// Shared config if the host provided one, else the build-time one
pub fn use_web_config() -> WebConfig {
    use_context::<WebConfig>().unwrap_or_else(WebConfig::from_env)
}

/// Keep a listener attached until the current owner is cleaned up
pub fn hold_listener(guard: Option<ListenerGuard>) {
    let Some(guard) = guard else {
        return;
    };
    let held = StoredValue::new_local(Some(guard));
    on_cleanup(move || {
        held.try_update_value(|guard| guard.take());
    });
}

/// Window inner width, updated on resize
pub fn use_viewport_width() -> ReadSignal<u32> {
    let (width, set_width) = signal(listener::inner_width().unwrap_or(DEFAULT_VIEWPORT_WIDTH));
    hold_listener(listener::on_resize(move |w| {
        set_width.try_set(w);
    }));
    width
}

/// Run `callback` whenever the tab becomes visible again
pub fn use_visibility_refresh<F>(callback: F)
where
    F: Fn() + 'static,
{
    hold_listener(listener::on_visible(callback));
}

/// Log how a surface is wired, once
pub fn log_mount(name: &str, config: &WebConfig) {
    info!(
        "[{}] api {} relay {} key `{}`",
        name, config.api_base_url, config.sync.relay_mode, config.sync.relay_key
    );
}
