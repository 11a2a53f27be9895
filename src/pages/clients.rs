//! Clients Page

use clients_remote::ClientsApp;
use leptos::prelude::*;

use crate::components::RemoteSurface;
use crate::context::use_shell_context;

#[component]
pub fn ClientsPage() -> impl IntoView {
    let shell = use_shell_context();

    view! {
        <RemoteSurface name="clients">
            // hand over the selection the shell already knows; the remote adopts it on mount
            {move || {
                let selected_ids = shell.surface.sync().with_store(|store| store.selected_ids());
                view! { <ClientsApp selected_ids=selected_ids /> }
            }}
        </RemoteSurface>
    }
}
