//! mf-sync
//!
//! Keeps independently rendered surfaces of the client admin in agreement:
//! an in-page event dispatcher, a relay to other browsing contexts, a
//! persisted client/selection store and the paginated view projection.
//!
//! Nothing in this crate touches the browser. Platform pieces sit behind
//! [`DurableStorage`], [`RelayTransport`], [`Scheduler`] and
//! [`ClientSource`]; [`memory`] provides in-process versions of each.

pub mod config;
pub mod context;
pub mod dispatcher;
pub mod event;
pub mod memory;
pub mod models;
pub mod projection;
pub mod relay;
pub mod source;
pub mod storage;
pub mod store;
pub mod transport;

pub use config::{RelayMode, SyncConfig};
pub use context::SyncContext;
pub use dispatcher::{EventDispatcher, Subscription, SubscriptionSet};
pub use event::{EventKind, SyncEvent};
pub use models::{Client, ClientId, ClientPage, CreateClientRequest, StateSnapshot, UpdateClientRequest};
pub use projection::{PageLink, PageSize, PaginatedView, ViewState};
pub use relay::Relay;
pub use source::ClientSource;
pub use storage::{DurableStorage, StorageError};
pub use store::ClientStore;
pub use transport::{RelayEnvelope, RelayError, RelayTransport, Scheduler, StorageEchoTransport};
