//! Shared List Store
//!
//! One surface's copy of the full client list and of the selection set.
//! Every mutation is persisted before the call returns; persistence
//! failures are logged and the in-memory state stays authoritative.

use std::collections::BTreeSet;

use log::{debug, error, warn};

use crate::config::SyncConfig;
use crate::event::SyncEvent;
use crate::models::{Client, ClientId, StateSnapshot};
use crate::storage::{read_json, write_json, DurableStorage};

pub struct ClientStore<S> {
    storage: S,
    clients_key: String,
    selected_key: String,
    clients: Vec<Client>,
    selected: BTreeSet<ClientId>,
}

impl<S: DurableStorage> ClientStore<S> {
    /// Build a store from whatever durable storage currently holds
    pub fn load(storage: S, config: &SyncConfig) -> Self {
        let mut store = Self {
            storage,
            clients_key: config.clients_cache_key.clone(),
            selected_key: config.selected_ids_key.clone(),
            clients: Vec::new(),
            selected: BTreeSet::new(),
        };
        store.reload_from_storage();
        store
    }

    /// Re-read list and selection, e.g. after another tab changed them.
    /// Unreadable values are treated as empty.
    pub fn reload_from_storage(&mut self) {
        self.clients = match read_json::<_, Vec<Client>>(&self.storage, &self.clients_key) {
            Ok(clients) => clients.unwrap_or_default(),
            Err(err) => {
                warn!("[store] discarding cached clients: {}", err);
                Vec::new()
            }
        };
        self.selected = match read_json::<_, Vec<ClientId>>(&self.storage, &self.selected_key) {
            Ok(ids) => ids.unwrap_or_default().into_iter().collect(),
            Err(err) => {
                warn!("[store] discarding cached selection: {}", err);
                BTreeSet::new()
            }
        };
        debug!(
            "[store] loaded {} clients, {} selected",
            self.clients.len(),
            self.selected.len()
        );
    }

    // ========================
    // Accessors
    // ========================

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn get(&self, id: ClientId) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn selection(&self) -> &BTreeSet<ClientId> {
        &self.selected
    }

    pub fn selected_ids(&self) -> Vec<ClientId> {
        self.selected.iter().copied().collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_selected(&self, id: ClientId) -> bool {
        self.selected.contains(&id)
    }

    /// Selected clients in list order (not selection order)
    pub fn selected_entities(&self) -> Vec<Client> {
        self.clients
            .iter()
            .filter(|c| self.selected.contains(&c.id))
            .cloned()
            .collect()
    }

    /// Selected ids with no cached client
    pub fn missing_selected_ids(&self) -> Vec<ClientId> {
        self.selected
            .iter()
            .copied()
            .filter(|id| self.get(*id).is_none())
            .collect()
    }

    /// Whether `key` is one of the storage keys this store persists to
    pub fn is_state_key(&self, key: &str) -> bool {
        key == self.clients_key || key == self.selected_key
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            clients: self.clients.clone(),
            selected_ids: self.selected_ids(),
        }
    }

    // ========================
    // Mutators
    // ========================

    pub fn replace_all(&mut self, clients: Vec<Client>) -> bool {
        if self.clients == clients {
            return false;
        }
        self.clients = clients;
        self.persist_clients();
        true
    }

    /// Insert, or replace in place when the id is already cached
    pub fn upsert(&mut self, client: Client) -> bool {
        match self.clients.iter().position(|c| c.id == client.id) {
            Some(idx) if self.clients[idx] == client => return false,
            Some(idx) => self.clients[idx] = client,
            None => self.clients.push(client),
        }
        self.persist_clients();
        true
    }

    /// Drop a client from the list and the selection together
    pub fn remove(&mut self, id: ClientId) -> bool {
        let before = self.clients.len();
        self.clients.retain(|c| c.id != id);
        let list_changed = self.clients.len() != before;
        let selection_changed = self.selected.remove(&id);
        if list_changed {
            self.persist_clients();
        }
        if selection_changed {
            self.persist_selection();
        }
        list_changed || selection_changed
    }

    pub fn select(&mut self, id: ClientId) -> bool {
        let changed = self.selected.insert(id);
        if changed {
            self.persist_selection();
        }
        changed
    }

    pub fn unselect(&mut self, id: ClientId) -> bool {
        let changed = self.selected.remove(&id);
        if changed {
            self.persist_selection();
        }
        changed
    }

    /// Flip the selection of `id`, returning whether it is now selected
    pub fn toggle(&mut self, id: ClientId) -> bool {
        if self.is_selected(id) {
            self.unselect(id);
            false
        } else {
            self.select(id);
            true
        }
    }

    pub fn clear(&mut self) -> bool {
        if self.selected.is_empty() {
            return false;
        }
        self.selected.clear();
        self.persist_selection();
        true
    }

    pub fn set_selection<I>(&mut self, ids: I) -> bool
    where
        I: IntoIterator<Item = ClientId>,
    {
        let ids: BTreeSet<ClientId> = ids.into_iter().collect();
        if ids == self.selected {
            return false;
        }
        self.selected = ids;
        self.persist_selection();
        true
    }

    /// Apply a synchronization event. Safe to call any number of times
    /// with the same event; returns whether local state changed.
    pub fn apply(&mut self, event: &SyncEvent) -> bool {
        match event {
            SyncEvent::Created(client) | SyncEvent::Updated(client) => self.upsert(client.clone()),
            SyncEvent::Deleted(id) => self.remove(*id),
            SyncEvent::Selected(id) => self.select(*id),
            SyncEvent::Unselected(id) => self.unselect(*id),
            SyncEvent::Cleared => self.clear(),
            SyncEvent::StateSync(snapshot) => {
                let list_changed = self.replace_all(snapshot.clients.clone());
                let selection_changed = self.set_selection(snapshot.selected_ids.iter().copied());
                list_changed || selection_changed
            }
        }
    }

    fn persist_clients(&self) {
        if let Err(err) = write_json(&self.storage, &self.clients_key, &self.clients) {
            error!("[store] failed to persist clients: {}", err);
        }
    }

    fn persist_selection(&self) {
        let ids: Vec<ClientId> = self.selected.iter().copied().collect();
        if let Err(err) = write_json(&self.storage, &self.selected_key, &ids) {
            error!("[store] failed to persist selection: {}", err);
        }
    }
}
