//! Surface Sync Context
//!
//! Everything one mounted surface needs to take part in synchronization:
//! its dispatcher and relay, its store, and the subscriptions tying them
//! together. Built on mount, torn down on unmount; nothing is global.

use std::cell::{Cell, Ref, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use log::{debug, error, info};

use crate::dispatcher::{EventDispatcher, SubscriptionSet};
use crate::event::SyncEvent;
use crate::models::{Client, ClientId};
use crate::relay::Relay;
use crate::source::ClientSource;
use crate::storage::DurableStorage;
use crate::store::ClientStore;

pub struct SyncContext<S> {
    name: String,
    relay: Relay,
    store: Rc<RefCell<ClientStore<S>>>,
    subscriptions: RefCell<SubscriptionSet>,
    mounted: Cell<bool>,
    fetching: Cell<bool>,
    /// Selected ids the last fetch did not return
    unresolved: RefCell<BTreeSet<ClientId>>,
}

impl<S: DurableStorage + 'static> SyncContext<S> {
    /// Wire `store` to every event the relay's dispatcher delivers
    pub fn mount(name: impl Into<String>, store: ClientStore<S>, relay: Relay) -> Rc<Self> {
        let name = name.into();
        let store = Rc::new(RefCell::new(store));

        let store_clone = store.clone();
        let tag = name.clone();
        let subscriptions = relay.dispatcher().subscribe_all(move |event| {
            if store_clone.borrow_mut().apply(event) {
                debug!("[{}] applied {}", tag, event.kind());
            }
        });

        info!(
            "[{}] mounted with {} clients, {} selected, transports {:?}",
            name,
            store.borrow().len(),
            store.borrow().selected_count(),
            relay.transport_names()
        );

        Rc::new(Self {
            name,
            relay,
            store,
            subscriptions: RefCell::new(subscriptions),
            mounted: Cell::new(true),
            fetching: Cell::new(false),
            unresolved: RefCell::new(BTreeSet::new()),
        })
    }

    // ========================
    // Accessors
    // ========================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> Ref<'_, ClientStore<S>> {
        self.store.borrow()
    }

    pub fn with_store<R>(&self, f: impl FnOnce(&ClientStore<S>) -> R) -> R {
        f(&self.store.borrow())
    }

    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        self.relay.dispatcher()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    /// Call `callback` after every event, once the store has applied it.
    /// Released on teardown.
    pub fn watch<F>(&self, callback: F)
    where
        F: Fn(&SyncEvent) + 'static,
    {
        let set = self.dispatcher().subscribe_all(callback);
        self.subscriptions.borrow_mut().extend(set);
    }

    // ========================
    // Actions
    // ========================

    pub fn select(&self, id: ClientId) {
        self.store.borrow_mut().select(id);
        self.relay.broadcast(SyncEvent::Selected(id));
    }

    pub fn unselect(&self, id: ClientId) {
        self.store.borrow_mut().unselect(id);
        self.relay.broadcast(SyncEvent::Unselected(id));
    }

    /// Flip the selection of `id` and announce the new state
    pub fn toggle(&self, id: ClientId) -> bool {
        let selected = self.store.borrow_mut().toggle(id);
        let event = if selected {
            SyncEvent::Selected(id)
        } else {
            SyncEvent::Unselected(id)
        };
        self.relay.broadcast(event);
        selected
    }

    pub fn clear_selection(&self) {
        self.store.borrow_mut().clear();
        self.relay.broadcast(SyncEvent::Cleared);
    }

    pub fn client_created(&self, client: Client) {
        self.store.borrow_mut().upsert(client.clone());
        self.relay.broadcast(SyncEvent::Created(client));
    }

    pub fn client_updated(&self, client: Client) {
        self.store.borrow_mut().upsert(client.clone());
        self.relay.broadcast(SyncEvent::Updated(client));
    }

    pub fn client_deleted(&self, id: ClientId) {
        self.store.borrow_mut().remove(id);
        self.relay.broadcast(SyncEvent::Deleted(id));
    }

    /// Announce the whole list and selection to every surface
    pub fn publish_state(&self) {
        let snapshot = self.store.borrow().snapshot();
        self.relay.broadcast(SyncEvent::StateSync(snapshot));
    }

    /// Replace the cached list with a fresh fetch result and publish it
    pub fn load_clients(&self, clients: Vec<Client>) {
        self.store.borrow_mut().replace_all(clients);
        self.publish_state();
    }

    /// Take over a selection handed in by the host, without relaying it.
    /// Local watchers are notified when it changed anything.
    pub fn adopt_selection(&self, ids: impl IntoIterator<Item = ClientId>) -> bool {
        let changed = self.store.borrow_mut().set_selection(ids);
        if changed {
            self.notify_local_state();
        }
        changed
    }

    /// Take over a client list handed in by the host, without relaying it
    pub fn adopt_clients(&self, clients: Vec<Client>) -> bool {
        let changed = self.store.borrow_mut().replace_all(clients);
        if changed {
            self.notify_local_state();
        }
        changed
    }

    /// Route a storage-change notification from another context: relay
    /// echoes go to the relay, cache keys trigger a reload.
    pub fn handle_storage_change(&self, key: &str, new_value: Option<&str>) -> bool {
        let is_state_key = self.store.borrow().is_state_key(key);
        if !is_state_key {
            return self.relay.receive_storage_change(key, new_value);
        }
        self.reload_state();
        true
    }

    /// Storage event as the DOM reports it: no key means another context
    /// cleared the whole storage
    pub fn handle_storage_event(&self, key: Option<&str>, new_value: Option<&str>) -> bool {
        match key {
            Some(key) => self.handle_storage_change(key, new_value),
            None => {
                self.reload_state();
                true
            }
        }
    }

    /// Re-read list and selection from durable storage and tell local
    /// watchers, e.g. after another context cleared it
    pub fn reload_state(&self) {
        self.store.borrow_mut().reload_from_storage();
        self.notify_local_state();
    }

    fn notify_local_state(&self) {
        let snapshot = self.store.borrow().snapshot();
        self.dispatcher().emit(&SyncEvent::StateSync(snapshot));
    }

    // ========================
    // Network
    // ========================

    /// Whether a selected id is neither cached nor already looked up in
    /// vain, with no fetch running
    pub fn needs_fetch(&self) -> bool {
        if self.fetching.get() {
            return false;
        }
        let unresolved = self.unresolved.borrow();
        self.store
            .borrow()
            .missing_selected_ids()
            .iter()
            .any(|id| !unresolved.contains(id))
    }

    /// Selected clients in list order, fetching the list first when some
    /// selected id is not cached. Only one fetch runs at a time; a caller
    /// arriving meanwhile gets the cached subset.
    pub async fn selected_entities_or_fetch<C>(&self, source: &C) -> Vec<Client>
    where
        C: ClientSource + ?Sized,
    {
        let missing = self.store.borrow().missing_selected_ids();
        if !missing.is_empty() && !self.fetching.replace(true) {
            debug!("[{}] selected ids {:?} not cached, fetching", self.name, missing);
            let changed = match source.fetch_all().await {
                Ok(clients) => self.store.borrow_mut().replace_all(clients),
                Err(err) => {
                    error!("[{}] failed to fetch clients: {}", self.name, err);
                    false
                }
            };
            let still_missing = self.store.borrow().missing_selected_ids();
            *self.unresolved.borrow_mut() = still_missing.into_iter().collect();
            self.fetching.set(false);
            if changed {
                self.notify_local_state();
            }
        }
        self.store.borrow().selected_entities()
    }

    /// Fetch the full list and publish it
    pub async fn refresh_from<C>(&self, source: &C) -> Result<(), C::Error>
    where
        C: ClientSource + ?Sized,
    {
        let clients = source.fetch_all().await?;
        debug!("[{}] fetched {} clients", self.name, clients.len());
        self.load_clients(clients);
        Ok(())
    }

    /// Drop every subscription and close the transports. Idempotent.
    pub fn teardown(&self) {
        if !self.mounted.replace(false) {
            return;
        }
        self.subscriptions.borrow_mut().unsubscribe_all();
        self.relay.close();
        info!("[{}] unmounted", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::event::EventKind;
    use crate::memory::{MemoryEventLoop, MemoryStorage};

    fn make_client(id: ClientId, name: &str) -> Client {
        Client {
            id,
            name: name.to_string(),
            salary: 2500.0,
            company_valuation: 100000.0,
        }
    }

    struct ListSource(Result<Vec<Client>, String>);

    #[async_trait::async_trait(?Send)]
    impl ClientSource for ListSource {
        type Error = String;

        async fn fetch_all(&self) -> Result<Vec<Client>, String> {
            self.0.clone()
        }
    }

    fn mount(storage: MemoryStorage) -> Rc<SyncContext<MemoryStorage>> {
        let config = SyncConfig::default();
        let relay = Relay::new(EventDispatcher::new(), Rc::new(MemoryEventLoop::new()), &config);
        SyncContext::mount("test", ClientStore::load(storage, &config), relay)
    }

    #[test]
    fn test_watchers_see_applied_state() {
        let ctx = mount(MemoryStorage::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let ctx_clone = ctx.clone();
        ctx.watch(move |_| seen_clone.borrow_mut().push(ctx_clone.store().selected_count()));

        ctx.select(3);
        ctx.select(4);
        ctx.unselect(3);
        assert_eq!(*seen.borrow(), vec![1, 2, 1]);
    }

    #[test]
    fn test_toggle_announces_new_state() {
        let ctx = mount(MemoryStorage::default());
        let kinds = Rc::new(RefCell::new(Vec::new()));
        let kinds_clone = kinds.clone();
        ctx.watch(move |event| kinds_clone.borrow_mut().push(event.kind()));

        assert!(ctx.toggle(8));
        assert!(!ctx.toggle(8));
        assert_eq!(*kinds.borrow(), vec![EventKind::Selected, EventKind::Unselected]);
    }

    #[test]
    fn test_delete_clears_selection() {
        let ctx = mount(MemoryStorage::default());
        ctx.load_clients(vec![make_client(1, "Ana"), make_client(2, "Bruno")]);
        ctx.select(1);
        ctx.client_deleted(1);
        assert!(ctx.store().get(1).is_none());
        assert!(!ctx.store().is_selected(1));
    }

    #[test]
    fn test_adopt_does_not_relay() {
        let ctx = mount(MemoryStorage::default());
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        ctx.watch(move |_| count_clone.set(count_clone.get() + 1));

        assert!(ctx.adopt_selection([1, 2]));
        assert!(!ctx.adopt_selection([2, 1]));
        assert_eq!(count.get(), 1);
        assert_eq!(ctx.store().selected_ids(), vec![1, 2]);
    }

    #[test]
    fn test_storage_change_of_cache_key_reloads() {
        let storage = MemoryStorage::default();
        let ctx = mount(storage.clone());
        storage.set_item("selected-ids", "[5,6]").unwrap();

        assert!(ctx.handle_storage_change("selected-ids", Some("[5,6]")));
        assert_eq!(ctx.store().selected_ids(), vec![5, 6]);
        assert!(!ctx.handle_storage_change("user-name", Some("Ana")));
    }

    #[test]
    fn test_storage_cleared_elsewhere() {
        let storage = MemoryStorage::default();
        let ctx = mount(storage.clone());
        ctx.load_clients(vec![make_client(1, "Ana")]);
        ctx.select(1);

        let other_tab = storage.open_context();
        other_tab.remove_item("selected-ids").unwrap();
        other_tab.remove_item("all-clients-cache").unwrap();
        assert!(ctx.handle_storage_event(None, None));
        assert_eq!(ctx.store().selected_count(), 0);
        assert!(ctx.store().is_empty());
    }

    #[test]
    fn test_fetch_fills_uncached_selection() {
        let ctx = mount(MemoryStorage::default());
        let syncs = Rc::new(Cell::new(0));
        let syncs_clone = syncs.clone();
        ctx.watch(move |event| {
            if event.kind() == EventKind::StateSync {
                syncs_clone.set(syncs_clone.get() + 1);
            }
        });
        let source = ListSource(Ok(vec![make_client(5, "Eva"), make_client(6, "Fábio")]));

        assert!(!ctx.needs_fetch());
        ctx.select(5);
        assert!(ctx.needs_fetch());

        let entities = futures::executor::block_on(ctx.selected_entities_or_fetch(&source));
        assert_eq!(entities, vec![make_client(5, "Eva")]);
        assert!(!ctx.needs_fetch());
        assert_eq!(syncs.get(), 1);
    }

    #[test]
    fn test_unknown_id_is_fetched_once() {
        let ctx = mount(MemoryStorage::default());
        let source = ListSource(Ok(vec![make_client(5, "Eva")]));

        ctx.select(9);
        assert!(ctx.needs_fetch());
        assert!(futures::executor::block_on(ctx.selected_entities_or_fetch(&source)).is_empty());
        // the server does not know 9; asking again would loop
        assert!(!ctx.needs_fetch());

        ctx.select(10);
        assert!(ctx.needs_fetch());
    }

    #[test]
    fn test_failed_fetch_is_not_retried_automatically() {
        let ctx = mount(MemoryStorage::default());
        ctx.select(3);
        let source = ListSource(Err("offline".to_string()));
        assert!(futures::executor::block_on(ctx.selected_entities_or_fetch(&source)).is_empty());
        assert!(!ctx.needs_fetch());
        assert!(ctx.store().is_selected(3));
    }

    #[test]
    fn test_teardown_stops_delivery() {
        let ctx = mount(MemoryStorage::default());
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        ctx.watch(move |_| count_clone.set(count_clone.get() + 1));

        ctx.teardown();
        ctx.teardown();
        assert!(!ctx.is_mounted());
        assert_eq!(ctx.dispatcher().subscriber_count(EventKind::Selected), 0);

        ctx.select(1);
        assert_eq!(count.get(), 0);
        // the store is still usable directly
        assert!(ctx.store().is_selected(1));
    }
}
