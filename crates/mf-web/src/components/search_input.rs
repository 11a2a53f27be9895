//! Search Input Component

use leptos::prelude::*;

/// Text box reporting every keystroke
#[component]
pub fn SearchInput(
    #[prop(into)] value: Signal<String>,
    #[prop(into)] on_input: Callback<String>,
    #[prop(into, optional)] placeholder: Option<String>,
) -> impl IntoView {
    let placeholder = placeholder.unwrap_or_else(|| "Buscar clientes...".to_string());

    view! {
        <div class="search-input">
            <input
                type="search"
                placeholder=placeholder
                prop:value=move || value.get()
                on:input=move |ev| on_input.run(event_target_value(&ev))
            />
            <Show when=move || !value.get().is_empty()>
                <button
                    type="button"
                    class="search-clear"
                    title="Limpar busca"
                    on:click=move |_| on_input.run(String::new())
                >
                    "×"
                </button>
            </Show>
        </div>
    }
}
