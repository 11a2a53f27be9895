//! Client Card Component

use leptos::prelude::*;
use mf_sync::Client;

use crate::format::format_brl;

/// One client with its amounts and whichever actions the caller wires up
#[component]
pub fn ClientCard(
    client: Client,
    #[prop(into)] selected: Signal<bool>,
    #[prop(into, optional)] on_toggle: Option<Callback<Client>>,
    #[prop(into, optional)] on_edit: Option<Callback<Client>>,
    #[prop(into, optional)] on_delete: Option<Callback<Client>>,
    #[prop(into, optional)] on_remove: Option<Callback<Client>>,
) -> impl IntoView {
    let salary = format_brl(client.salary);
    let valuation = format_brl(client.company_valuation);
    let name = client.name.clone();
    let client = StoredValue::new(client);

    view! {
        <div class=move || if selected.get() { "client-card selected" } else { "client-card" }>
            <h3 class="client-name">{name}</h3>
            <p><strong>"Salário: "</strong>{salary}</p>
            <p><strong>"Empresa: "</strong>{valuation}</p>
            <div class="client-actions">
                {on_toggle.map(|cb| view! {
                    <button
                        class="card-btn"
                        title=move || if selected.get() { "Remover da seleção" } else { "Selecionar" }
                        on:click=move |_| cb.run(client.get_value())
                    >
                        {move || if selected.get() { "−" } else { "+" }}
                    </button>
                })}
                {on_edit.map(|cb| view! {
                    <button class="card-btn" title="Editar" on:click=move |_| cb.run(client.get_value())>
                        "✎"
                    </button>
                })}
                {on_delete.map(|cb| view! {
                    <button class="card-btn danger" title="Excluir" on:click=move |_| cb.run(client.get_value())>
                        "🗑"
                    </button>
                })}
                {on_remove.map(|cb| view! {
                    <button class="card-btn danger" on:click=move |_| cb.run(client.get_value())>
                        "Remover"
                    </button>
                })}
            </div>
        </div>
    }
}
