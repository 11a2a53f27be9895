//! Multi-surface synchronization over the in-memory platform

use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::executor::block_on;

use mf_sync::memory::{MemoryChannel, MemoryEventLoop, MemoryStorage, MemoryWindow};
use mf_sync::{
    Client, ClientId, ClientSource, ClientStore, EventDispatcher, Relay, StorageEchoTransport, SyncConfig,
    SyncContext, SyncEvent,
};

type Surface = Rc<SyncContext<MemoryStorage>>;

fn make_client(id: ClientId, name: &str) -> Client {
    Client {
        id,
        name: name.to_string(),
        salary: 3500.0,
        company_valuation: 120000.0,
    }
}

fn roster() -> Vec<Client> {
    vec![
        make_client(1, "Ana"),
        make_client(2, "Bruno"),
        make_client(5, "Jorge"),
        make_client(7, "João"),
    ]
}

/// Surface relaying over one broadcast channel
fn channel_surface(name: &str, storage: MemoryStorage, event_loop: &MemoryEventLoop, channel: &MemoryChannel) -> Surface {
    let config = SyncConfig::default();
    let endpoint = channel.endpoint();
    let relay = Relay::new(EventDispatcher::new(), Rc::new(event_loop.clone()), &config).with_transport(endpoint.clone());
    let ctx = SyncContext::mount(name, ClientStore::load(storage, &config), relay);

    let weak = Rc::downgrade(&ctx);
    endpoint.on_message(move |message| {
        if let Some(ctx) = weak.upgrade() {
            ctx.relay().receive_message(message);
        }
    });
    ctx
}

/// Surface relaying through the storage echo plus window messages
fn legacy_surface(name: &str, storage: MemoryStorage, event_loop: &MemoryEventLoop, window: &MemoryWindow) -> Surface {
    let config = SyncConfig::default();
    let scheduler: Rc<MemoryEventLoop> = Rc::new(event_loop.clone());
    let relay = Relay::new(EventDispatcher::new(), scheduler.clone(), &config)
        .with_transport(StorageEchoTransport::new(
            storage.clone(),
            config.relay_key.clone(),
            config.echo_ttl_ms,
            scheduler,
        ))
        .with_transport(window.transport());
    let ctx = SyncContext::mount(name, ClientStore::load(storage.clone(), &config), relay);

    let weak = Rc::downgrade(&ctx);
    storage.on_change(move |key, value| {
        if let Some(ctx) = weak.upgrade() {
            ctx.handle_storage_change(key, value);
        }
    });
    let weak = Rc::downgrade(&ctx);
    window.add_listener(move |message| {
        if let Some(ctx) = weak.upgrade() {
            ctx.relay().receive_message(message);
        }
    });
    ctx
}

struct CountingSource {
    clients: Vec<Client>,
    calls: Cell<usize>,
}

impl CountingSource {
    fn new(clients: Vec<Client>) -> Self {
        Self {
            clients,
            calls: Cell::new(0),
        }
    }
}

#[async_trait(?Send)]
impl ClientSource for CountingSource {
    type Error = String;

    async fn fetch_all(&self) -> Result<Vec<Client>, String> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.clients.clone())
    }
}

#[test]
fn surfaces_converge_after_a_burst_of_actions() {
    let event_loop = MemoryEventLoop::new();
    let channel = MemoryChannel::new(&event_loop);
    let storage = MemoryStorage::attached(&event_loop);
    let clients = channel_surface("clients", storage.clone(), &event_loop, &channel);
    let selected = channel_surface("selected", storage, &event_loop, &channel);

    clients.load_clients(roster());
    clients.select(1);
    clients.select(2);
    clients.toggle(2);
    clients.client_created(make_client(9, "Maria"));
    event_loop.run_until_idle();

    selected.select(9);
    clients.client_updated(make_client(1, "Ana Paula"));
    event_loop.run_until_idle();

    assert_eq!(clients.store().snapshot(), selected.store().snapshot());
    assert_eq!(selected.store().selected_ids(), vec![1, 9]);
    assert_eq!(selected.store().get(1).map(|c| c.name.clone()), Some("Ana Paula".to_string()));
}

#[test]
fn deleted_client_leaves_every_selection() {
    let event_loop = MemoryEventLoop::new();
    let channel = MemoryChannel::new(&event_loop);
    let tab_a = MemoryStorage::attached(&event_loop);
    let tab_b = tab_a.open_context();
    let a = channel_surface("a", tab_a, &event_loop, &channel);
    let b = channel_surface("b", tab_b, &event_loop, &channel);

    a.load_clients(roster());
    a.select(5);
    event_loop.run_until_idle();
    assert!(b.store().is_selected(5));

    b.client_deleted(5);
    event_loop.run_until_idle();

    for surface in [&a, &b] {
        assert!(surface.store().get(5).is_none());
        assert!(!surface.store().is_selected(5));
    }
}

#[test]
fn duplicate_delivery_is_harmless() {
    let event_loop = MemoryEventLoop::new();
    let window = MemoryWindow::new(&event_loop);
    let storage = MemoryStorage::attached(&event_loop);
    // same window: every window message also comes back to its sender
    let a = legacy_surface("a", storage.clone(), &event_loop, &window);
    let b = legacy_surface("b", storage, &event_loop, &window);

    a.load_clients(roster());
    a.client_created(make_client(11, "Lia"));
    a.select(11);
    event_loop.run_until_idle();
    let once = b.store().snapshot();

    let replay = serde_json::json!({
        "source": "micro-frontend-event",
        "event": "client:created",
        "data": {"id": 11, "name": "Lia", "salary": 3500.0, "companyValuation": 120000.0},
    });
    assert!(b.relay().receive_message(&replay));
    assert!(b.relay().receive_message(&replay));
    b.dispatcher().emit(&SyncEvent::Selected(11));

    assert_eq!(b.store().snapshot(), once);
    assert_eq!(a.store().snapshot(), once);
    assert_eq!(b.store().clients().iter().filter(|c| c.id == 11).count(), 1);
}

#[test]
fn legacy_mode_reaches_another_tab() {
    let event_loop = MemoryEventLoop::new();
    let tab_a = MemoryStorage::attached(&event_loop);
    let tab_b = tab_a.open_context();
    // different tabs do not share a window
    let a = legacy_surface("a", tab_a, &event_loop, &MemoryWindow::new(&event_loop));
    let b = legacy_surface("b", tab_b.clone(), &event_loop, &MemoryWindow::new(&event_loop));

    a.load_clients(roster());
    a.toggle(7);
    event_loop.run_until_idle();
    assert_eq!(b.store().selected_ids(), vec![7]);
    assert_eq!(b.store().len(), 4);

    // echo is gone after a second, the cached state is not
    event_loop.advance(1000);
    assert!(tab_b.keys().iter().all(|k| k != "relay-channel"));
    assert_eq!(b.store().selected_ids(), vec![7]);
}

#[test]
fn select_in_one_surface_read_in_another() {
    let event_loop = MemoryEventLoop::new();
    let channel = MemoryChannel::new(&event_loop);
    let tab_a = MemoryStorage::attached(&event_loop);
    let tab_b = tab_a.open_context();
    let a = channel_surface("clients", tab_a, &event_loop, &channel);
    let b = channel_surface("selected", tab_b, &event_loop, &channel);
    let source = CountingSource::new(roster());

    // A knows the list but never announced it
    a.adopt_clients(roster());
    a.select(7);
    event_loop.run_until_idle();

    assert!(b.store().is_selected(7));
    assert!(b.store().get(7).is_none());
    let entities = block_on(b.selected_entities_or_fetch(&source));
    assert_eq!(entities.iter().map(|c| c.id).collect::<Vec<_>>(), vec![7]);
    assert_eq!(source.calls.get(), 1);

    // cached now, no second fetch
    let entities = block_on(b.selected_entities_or_fetch(&source));
    assert_eq!(entities.len(), 1);
    assert_eq!(source.calls.get(), 1);
}

#[test]
fn relayed_select_of_uncached_client_asks_for_a_fetch() {
    let event_loop = MemoryEventLoop::new();
    let channel = MemoryChannel::new(&event_loop);
    let tab_a = MemoryStorage::attached(&event_loop);
    let tab_b = tab_a.open_context();
    let a = channel_surface("clients", tab_a, &event_loop, &channel);
    let b = channel_surface("selected", tab_b, &event_loop, &channel);
    let source = CountingSource::new(roster());

    // what the selected surface does: fetch when an event leaves a gap
    let requested = Rc::new(Cell::new(0));
    let requested_clone = requested.clone();
    let weak = Rc::downgrade(&b);
    b.watch(move |event| {
        let Some(b) = weak.upgrade() else {
            return;
        };
        if matches!(event, SyncEvent::Selected(_) | SyncEvent::StateSync(_)) && b.needs_fetch() {
            requested_clone.set(requested_clone.get() + 1);
        }
    });

    a.adopt_clients(vec![make_client(5, "Jorge")]);
    a.select(5);
    event_loop.run_until_idle();
    assert_eq!(requested.get(), 1);
    assert_eq!(b.store().selected_count(), 1);
    assert!(b.store().selected_entities().is_empty());

    let entities = block_on(b.selected_entities_or_fetch(&source));
    assert_eq!(entities.iter().map(|c| c.id).collect::<Vec<_>>(), vec![5]);
    assert_eq!(source.calls.get(), 1);
    // the StateSync announcing the fetched list does not ask again
    assert_eq!(requested.get(), 1);
    assert!(!b.needs_fetch());
}

#[test]
fn refresh_publishes_state_to_other_surfaces() {
    let event_loop = MemoryEventLoop::new();
    let channel = MemoryChannel::new(&event_loop);
    let storage = MemoryStorage::attached(&event_loop);
    let a = channel_surface("a", storage.clone(), &event_loop, &channel);
    let b = channel_surface("b", storage, &event_loop, &channel);
    let source = CountingSource::new(roster());

    block_on(a.refresh_from(&source)).unwrap();
    event_loop.run_until_idle();
    assert_eq!(b.store().len(), 4);
}

#[test]
fn unmounted_surface_stops_listening() {
    let event_loop = MemoryEventLoop::new();
    let channel = MemoryChannel::new(&event_loop);
    let tab_a = MemoryStorage::attached(&event_loop);
    let tab_b = tab_a.open_context();
    let a = channel_surface("a", tab_a, &event_loop, &channel);
    let b = channel_surface("b", tab_b, &event_loop, &channel);

    b.teardown();
    assert_eq!(channel.endpoint_count(), 1);

    a.select(1);
    event_loop.run_until_idle();
    assert!(!b.store().is_selected(1));
}
