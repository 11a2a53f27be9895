//! Shell State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::models::{Notice, ShellPage};

/// Shell-level state with field-level reactivity. Client data lives in the
/// synchronized store, not here.
#[derive(Clone, Debug, Default, Store)]
pub struct ShellState {
    /// Operator name from the welcome page
    pub user_name: Option<String>,
    /// Page currently shown
    pub page: ShellPage,
    /// Success banner, if one is showing
    pub notice: Option<Notice>,
    /// Last notice id handed out
    pub notice_seq: u64,
}

impl ShellState {
    /// Start on the clients page when a name was remembered
    pub fn new(user_name: Option<String>) -> Self {
        let page = if user_name.is_some() {
            ShellPage::Clients
        } else {
            ShellPage::Welcome
        };
        Self {
            user_name,
            page,
            ..Default::default()
        }
    }
}

/// Type alias for the store
pub type ShellStore = Store<ShellState>;

/// Get the shell store from context
pub fn use_shell_store() -> ShellStore {
    expect_context::<ShellStore>()
}

// ========================
// Store Helper Functions
// ========================

pub fn store_sign_in(store: &ShellStore, name: String) {
    store.user_name().set(Some(name));
    store.page().set(ShellPage::Clients);
}

pub fn store_sign_out(store: &ShellStore) {
    store.user_name().set(None);
    store.notice().set(None);
    store.page().set(ShellPage::Welcome);
}

/// Show `page`, or the welcome page when it needs a user and none is
/// signed in
pub fn store_navigate(store: &ShellStore, page: ShellPage) {
    let signed_in = store.user_name().with_untracked(|name| name.is_some());
    store.page().set(page.resolve(signed_in));
}

/// Replace the current notice; returns its id for a later dismissal
pub fn store_show_notice(store: &ShellStore, message: &'static str) -> u64 {
    store.notice_seq().update(|seq| *seq += 1);
    let id = store.notice_seq().get_untracked();
    store.notice().set(Some(Notice { id, message }));
    id
}

/// Dismiss the notice `id` unless a newer one replaced it
pub fn store_dismiss_notice(store: &ShellStore, id: u64) {
    let current = store.notice().with_untracked(|notice| notice.as_ref().map(|n| n.id));
    if current == Some(id) {
        store.notice().set(None);
    }
}
