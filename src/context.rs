//! Shell Context
//!
//! Shared handles provided via Leptos Context API.

use leptos::prelude::*;
use log::info;
use mf_web::{SurfaceContext, WebStorage};

use crate::session::Session;
use crate::store::{store_sign_in, store_sign_out, ShellStore};

/// The shell's own synchronized surface plus the operator session
#[derive(Clone, Copy)]
pub struct ShellContext {
    /// Mounted like any remote so the header badge and notices follow
    /// every other surface
    pub surface: SurfaceContext,
    session: StoredValue<Session<WebStorage>, LocalStorage>,
    store: ShellStore,
}

impl ShellContext {
    pub fn new(surface: SurfaceContext, session: Session<WebStorage>, store: ShellStore) -> Self {
        Self {
            surface,
            session: StoredValue::new_local(session),
            store,
        }
    }

    /// Remember `name` and go to the clients page. False for a blank name.
    pub fn sign_in(&self, name: &str) -> bool {
        let Some(name) = self.session.with_value(|session| session.sign_in(name)) else {
            return false;
        };
        info!("[shell] signed in as {}", name);
        store_sign_in(&self.store, name);
        true
    }

    /// Forget the operator and the selection
    pub fn sign_out(&self) {
        self.session.with_value(|session| session.sign_out());
        self.surface.sync().clear_selection();
        store_sign_out(&self.store);
        info!("[shell] signed out");
    }

    pub fn selected_count(&self) -> usize {
        self.surface.selected_count()
    }
}

pub fn use_shell_context() -> ShellContext {
    use_context::<ShellContext>().expect("ShellContext should be provided")
}
