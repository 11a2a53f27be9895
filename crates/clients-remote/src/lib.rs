//! Clients Remote
//!
//! The clients surface: full list with search, pagination, selection
//! toggles and create/edit/delete. Exposes one entry component,
//! [`ClientsApp`].

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, info};
use mf_sync::projection::{PageSize, ViewState, CLIENTS_PAGE_SIZE_OPTIONS};
use mf_sync::{Client, ClientId, CreateClientRequest};
use mf_web::components::{ClientCard, ClientModal, ConfirmDeleteModal, PageSizeSelector, Pagination, SearchInput};
use mf_web::format::selected_label;
use mf_web::surface::log_mount;
use mf_web::{use_viewport_width, use_web_config, RestClient, SurfaceContext};

pub const LOAD_ERROR: &str = "Erro ao carregar clientes";
pub const CREATE_ERROR: &str = "Erro ao criar cliente";
pub const UPDATE_ERROR: &str = "Erro ao atualizar cliente";
pub const DELETE_ERROR: &str = "Erro ao excluir cliente";

/// "N clientes encontrados", plus the match count while searching
pub fn summary_line(total: usize, search: &str, shown: usize, matches: usize) -> String {
    let mut line = format!("{} clientes encontrados", total);
    if !search.trim().is_empty() {
        line.push_str(&format!(" • Mostrando {} de {} resultados", shown, matches));
    }
    line
}

#[component]
pub fn ClientsApp(
    /// Selection handed down by the host; adopted on mount when non-empty
    #[prop(optional)]
    selected_ids: Option<Vec<ClientId>>,
) -> impl IntoView {
    let config = use_web_config();
    log_mount("clients", &config);

    let surface = match SurfaceContext::mount("clients", &config.sync) {
        Ok(surface) => surface,
        Err(err) => {
            error!("[clients] failed to mount: {}", err);
            return view! { <div class="surface-error">{LOAD_ERROR}</div> }.into_any();
        }
    };
    if let Some(ids) = selected_ids.filter(|ids| !ids.is_empty()) {
        surface.sync().adopt_selection(ids);
    }

    let api = StoredValue::new(RestClient::new(config.api_base_url.clone()));
    let width = use_viewport_width();
    let view_state = RwSignal::new(ViewState::new(PageSize::Auto));

    let (loading, set_loading) = signal(false);
    let (error_msg, set_error_msg) = signal(None::<String>);
    let (busy, set_busy) = signal(false);
    let (modal_open, set_modal_open) = signal(false);
    let (editing, set_editing) = signal(None::<Client>);
    let (deleting, set_deleting) = signal(None::<Client>);

    // ========================
    // Loading
    // ========================

    let load = move || {
        set_loading.set(true);
        set_error_msg.set(None);
        let sync = surface.sync();
        let api = api.get_value();
        spawn_local(async move {
            match sync.refresh_from(&api).await {
                Ok(()) => info!("[clients] loaded {} clients", sync.store().len()),
                Err(err) => {
                    error!("[clients] load failed: {}", err);
                    set_error_msg.set(Some(LOAD_ERROR.to_string()));
                }
            }
            set_loading.set(false);
        });
    };
    load();

    // ========================
    // Projection
    // ========================

    let page = Memo::new(move |_| view_state.with(|state| surface.project(state, false, width.get())));

    // pull the page back when deletions or a narrower filter shrink the list
    Effect::new(move |_| {
        let total = page.with(|p| p.total_pages);
        if view_state.with_untracked(|state| state.page > total.max(1)) {
            view_state.update(|state| {
                state.clamp_page(total);
            });
        }
    });

    let search = Signal::derive(move || view_state.with(|state| state.search.clone()));
    let page_size = Signal::derive(move || view_state.with(|state| state.page_size.resolve(width.get())));
    let current_page = Signal::derive(move || view_state.with(|state| state.page));
    let total_pages = Signal::derive(move || page.with(|p| p.total_pages));

    // ========================
    // Actions
    // ========================

    let toggle = Callback::new(move |client: Client| {
        surface.sync().toggle(client.id);
    });

    let open_create = move |_| {
        set_editing.set(None);
        set_modal_open.set(true);
    };

    let open_edit = Callback::new(move |client: Client| {
        set_editing.set(Some(client));
        set_modal_open.set(true);
    });

    let close_modal = Callback::new(move |_: ()| {
        set_modal_open.set(false);
        set_editing.set(None);
    });

    let submit = Callback::new(move |request: CreateClientRequest| {
        let target = editing.get_untracked();
        let sync = surface.sync();
        let api = api.get_value();
        set_busy.set(true);
        spawn_local(async move {
            let outcome = match target {
                Some(existing) => api
                    .update_client(existing.id, &request.into())
                    .await
                    .map(|client| sync.client_updated(client))
                    .map_err(|err| (UPDATE_ERROR, err)),
                None => api
                    .create_client(&request)
                    .await
                    .map(|client| sync.client_created(client))
                    .map_err(|err| (CREATE_ERROR, err)),
            };
            set_busy.set(false);
            match outcome {
                Ok(()) => {
                    set_modal_open.set(false);
                    set_editing.set(None);
                }
                Err((message, err)) => {
                    error!("[clients] {}: {}", message, err);
                    set_error_msg.set(Some(message.to_string()));
                }
            }
        });
    });

    let ask_delete = Callback::new(move |client: Client| set_deleting.set(Some(client)));
    let cancel_delete = Callback::new(move |_: ()| set_deleting.set(None));

    let confirm_delete = Callback::new(move |client: Client| {
        let sync = surface.sync();
        let api = api.get_value();
        set_busy.set(true);
        spawn_local(async move {
            match api.delete_client(client.id).await {
                Ok(()) => {
                    sync.client_deleted(client.id);
                    set_deleting.set(None);
                }
                Err(err) => {
                    error!("[clients] {}: {}", DELETE_ERROR, err);
                    set_error_msg.set(Some(DELETE_ERROR.to_string()));
                }
            }
            set_busy.set(false);
        });
    });

    view! {
        <div class="clients-app">
            <header class="surface-header">
                <div>
                    <h1>"Clientes"</h1>
                    <p class="surface-summary">
                        {move || {
                            let (shown, matches) = page.with(|p| (p.items.len(), p.total_count));
                            summary_line(surface.client_count(), &search.get(), shown, matches)
                        }}
                        <Show when=move || { surface.selected_count() > 0 }>
                            <span class="selected-pill">{move || selected_label(surface.selected_count())}</span>
                        </Show>
                    </p>
                </div>
                <div class="surface-tools">
                    <SearchInput
                        value=search
                        on_input=move |term: String| view_state.update(|state| state.set_search(term))
                    />
                    <button class="btn primary" on:click=open_create>"Criar cliente"</button>
                </div>
            </header>

            {move || error_msg.get().map(|msg| view! { <div class="notice error">{msg}</div> })}

            <Show
                when=move || { !loading.get() || surface.client_count() > 0 }
                fallback=|| view! { <div class="loading">"Carregando clientes..."</div> }
            >
                <Show
                    when=move || { page.with(|p| p.total_count > 0) || search.get().trim().is_empty() }
                    fallback=move || view! {
                        <div class="empty-state">
                            <p>"Nenhum cliente encontrado com o termo \"" {search.get()} "\""</p>
                            <p>"Tente um termo diferente ou limpe a busca para ver todos os clientes."</p>
                        </div>
                    }
                >
                    <div class="clients-grid">
                        {move || {
                            page.get()
                                .items
                                .into_iter()
                                .map(|client| {
                                    let id = client.id;
                                    view! {
                                        <ClientCard
                                            client=client
                                            selected=Signal::derive(move || surface.is_selected(id))
                                            on_toggle=toggle
                                            on_edit=open_edit
                                            on_delete=ask_delete
                                        />
                                    }
                                })
                                .collect_view()
                        }}
                    </div>
                </Show>
            </Show>

            <Pagination
                current_page=current_page
                total_pages=total_pages
                on_page_change=move |p: usize| view_state.update(|state| state.set_page(p))
            />
            <PageSizeSelector
                options=&CLIENTS_PAGE_SIZE_OPTIONS
                value=page_size
                on_change=move |size: usize| view_state.update(|state| state.set_page_size(PageSize::Fixed(size)))
            />

            <ClientModal
                open=modal_open
                editing=editing
                busy=busy
                on_submit=submit
                on_close=close_modal
            />
            <ConfirmDeleteModal
                client=deleting
                busy=busy
                on_confirm=confirm_delete
                on_cancel=cancel_delete
            />
        </div>
    }
    .into_any()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line() {
        assert_eq!(summary_line(20, "", 16, 20), "20 clientes encontrados");
        assert_eq!(
            summary_line(20, "jo", 2, 2),
            "20 clientes encontrados • Mostrando 2 de 2 resultados"
        );
        assert_eq!(summary_line(0, "   ", 0, 0), "0 clientes encontrados");
    }
}
