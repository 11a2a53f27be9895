//! Client Modal Component
//!
//! Create/edit form. Validation runs on submit; the request only reaches
//! `on_submit` once every field is valid.

use leptos::prelude::*;
use mf_sync::{Client, CreateClientRequest};

use crate::format::{ClientDraft, DraftErrors};

#[component]
pub fn ClientModal(
    #[prop(into)] open: Signal<bool>,
    /// Client being edited; `None` creates a new one
    #[prop(into)] editing: Signal<Option<Client>>,
    #[prop(into)] busy: Signal<bool>,
    #[prop(into)] on_submit: Callback<CreateClientRequest>,
    #[prop(into)] on_close: Callback<()>,
) -> impl IntoView {
    let draft = RwSignal::new(ClientDraft::default());
    let errors = RwSignal::new(DraftErrors::default());

    // reset the form whenever it opens
    Effect::new(move |_| {
        if open.get() {
            let fresh = editing.get().map(|c| ClientDraft::from_client(&c)).unwrap_or_default();
            draft.set(fresh);
            errors.set(DraftErrors::default());
        }
    });

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        match draft.get_untracked().validate() {
            Ok(request) => {
                errors.set(DraftErrors::default());
                on_submit.run(request);
            }
            Err(found) => errors.set(found),
        }
    };

    let title = move || if editing.get().is_some() { "Editar cliente" } else { "Criar cliente" };

    view! {
        <Show when=move || open.get()>
            <div class="modal-backdrop" on:click=move |_| on_close.run(())>
                <div class="modal" on:click=|ev| ev.stop_propagation()>
                    <h2>{title}</h2>
                    <form on:submit=submit>
                        <label>
                            "Nome completo *"
                            <input
                                type="text"
                                placeholder="Digite o nome completo"
                                prop:value=move || draft.with(|d| d.name.clone())
                                on:input=move |ev| draft.update(|d| d.name = event_target_value(&ev))
                            />
                        </label>
                        {move || errors.with(|e| e.name).map(|msg| view! { <div class="field-error">{msg}</div> })}
                        <label>
                            "Salário (R$) *"
                            <input
                                type="number"
                                step="0.01"
                                min="0"
                                placeholder="Digite o salário"
                                prop:value=move || draft.with(|d| d.salary.clone())
                                on:input=move |ev| draft.update(|d| d.salary = event_target_value(&ev))
                            />
                        </label>
                        {move || errors.with(|e| e.salary).map(|msg| view! { <div class="field-error">{msg}</div> })}
                        <label>
                            "Valor da empresa (R$) *"
                            <input
                                type="number"
                                step="0.01"
                                min="0"
                                placeholder="Digite o valor da empresa"
                                prop:value=move || draft.with(|d| d.company_valuation.clone())
                                on:input=move |ev| draft.update(|d| d.company_valuation = event_target_value(&ev))
                            />
                        </label>
                        {move || {
                            errors
                                .with(|e| e.company_valuation)
                                .map(|msg| view! { <div class="field-error">{msg}</div> })
                        }}
                        <div class="modal-actions">
                            <button type="button" class="btn secondary" on:click=move |_| on_close.run(())>
                                "Cancelar"
                            </button>
                            <button type="submit" class="btn primary" disabled=move || busy.get()>
                                {move || if busy.get() { "Salvando..." } else { title() }}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </Show>
    }
}
