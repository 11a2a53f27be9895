//! Confirm Delete Modal Component

use leptos::prelude::*;
use mf_sync::Client;

/// Asks before deleting `client`; hidden while it is `None`
#[component]
pub fn ConfirmDeleteModal(
    #[prop(into)] client: Signal<Option<Client>>,
    #[prop(into)] busy: Signal<bool>,
    #[prop(into)] on_confirm: Callback<Client>,
    #[prop(into)] on_cancel: Callback<()>,
) -> impl IntoView {
    view! {
        {move || client.get().map(|target| {
            let name = target.name.clone();
            let target = StoredValue::new(target);
            view! {
                <div class="modal-backdrop" on:click=move |_| on_cancel.run(())>
                    <div class="modal" on:click=|ev| ev.stop_propagation()>
                        <h2>"Excluir cliente:"</h2>
                        <p>"Você está prestes a excluir o cliente: " <strong>{name}</strong></p>
                        <div class="modal-actions">
                            <button class="btn secondary" on:click=move |_| on_cancel.run(())>
                                "Cancelar"
                            </button>
                            <button
                                class="btn danger"
                                disabled=move || busy.get()
                                on:click=move |_| on_confirm.run(target.get_value())
                            >
                                {move || if busy.get() { "Excluindo..." } else { "Excluir cliente" }}
                            </button>
                        </div>
                    </div>
                </div>
            }
        })}
    }
}
