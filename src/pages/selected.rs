//! Selected Page

use leptos::prelude::*;
use selected_remote::SelectedApp;

use crate::components::RemoteSurface;
use crate::context::use_shell_context;

#[component]
pub fn SelectedPage() -> impl IntoView {
    let shell = use_shell_context();

    view! {
        <RemoteSurface name="selected">
            {move || {
                let (clients, selected_ids) = shell
                    .surface
                    .sync()
                    .with_store(|store| (store.clients().to_vec(), store.selected_ids()));
                // shell notices come from its own watch in App
                view! { <SelectedApp clients=clients selected_ids=selected_ids /> }
            }}
        </RemoteSurface>
    }
}
