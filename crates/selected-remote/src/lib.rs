//! Selected Remote
//!
//! Read-mostly view over the current selection: search inside it, page
//! through it, remove single clients or clear everything.

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error};
use mf_sync::projection::{PageSize, ViewState, SELECTED_PAGE_SIZE_OPTIONS};
use mf_sync::{Client, ClientId, SyncEvent};
use mf_web::components::{ClientCard, PageSizeSelector, Pagination, SearchInput};
use mf_web::surface::log_mount;
use mf_web::{use_viewport_width, use_visibility_refresh, use_web_config, RestClient, SurfaceContext};

pub const DEFAULT_PAGE_SIZE: usize = 8;

/// Events that can add a selected id this surface has no client for
pub fn refetch_after(event: &SyncEvent) -> bool {
    matches!(event, SyncEvent::Selected(_) | SyncEvent::StateSync(_))
}

pub fn selected_heading(count: usize) -> String {
    format!("Clientes Selecionados ({})", count)
}

pub fn page_caption(current: usize, total: usize) -> String {
    format!("Página {} de {}", current, total.max(1))
}

#[component]
pub fn SelectedApp(
    /// Client list handed down by the host
    #[prop(optional)]
    clients: Option<Vec<Client>>,
    #[prop(optional)] selected_ids: Option<Vec<ClientId>>,
    #[prop(into, optional)] on_client_update: Option<Callback<Client>>,
    #[prop(into, optional)] on_client_delete: Option<Callback<ClientId>>,
) -> impl IntoView {
    let config = use_web_config();
    log_mount("selected", &config);

    let surface = match SurfaceContext::mount("selected", &config.sync) {
        Ok(surface) => surface,
        Err(err) => {
            error!("[selected] failed to mount: {}", err);
            return view! { <div class="surface-error">"Não foi possível carregar os selecionados"</div> }
                .into_any();
        }
    };

    let api = StoredValue::new(RestClient::new(config.api_base_url.clone()));
    let width = use_viewport_width();
    let view_state = RwSignal::new(ViewState::new(PageSize::Fixed(DEFAULT_PAGE_SIZE)));

    // selected ids can arrive before their clients; fill the gap from the API
    let fill_missing = move || {
        let sync = surface.sync();
        let api = api.get_value();
        spawn_local(async move {
            let entities = sync.selected_entities_or_fetch(&api).await;
            debug!("[selected] {} selected clients available", entities.len());
        });
    };

    let sync = surface.sync();
    if let Some(clients) = clients.filter(|clients| !clients.is_empty()) {
        sync.adopt_clients(clients);
    }
    if let Some(ids) = selected_ids.filter(|ids| !ids.is_empty()) {
        sync.adopt_selection(ids);
    }
    sync.watch(move |event| {
        match event {
            SyncEvent::Updated(client) => {
                if let Some(cb) = on_client_update {
                    cb.run(client.clone());
                }
            }
            SyncEvent::Deleted(id) => {
                if let Some(cb) = on_client_delete {
                    cb.run(*id);
                }
            }
            _ => {}
        }
        // storage reloads arrive as StateSync too
        if refetch_after(event) && surface.sync().needs_fetch() {
            fill_missing();
        }
    });
    drop(sync);

    fill_missing();
    use_visibility_refresh(fill_missing);

    let page = Memo::new(move |_| view_state.with(|state| surface.project(state, true, width.get())));

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

    let remove = Callback::new(move |client: Client| surface.sync().unselect(client.id));
    let clear_all = move |_| surface.sync().clear_selection();

    view! {
        <div class="selected-app">
            <Show
                when=move || { surface.selected_count() > 0 }
                fallback=|| view! {
                    <div class="empty-state">
                        <h2>"Nenhum cliente selecionado"</h2>
                        <p>"Selecione clientes na página de gerenciamento para vê-los aqui."</p>
                    </div>
                }
            >
                <header class="surface-header">
                    <h1>{move || selected_heading(surface.selected_count())}</h1>
                    <div class="surface-tools">
                        <SearchInput
                            value=search
                            placeholder="Buscar nos selecionados..."
                            on_input=move |term: String| view_state.update(|state| state.set_search(term))
                        />
                        <button class="btn danger" on:click=clear_all>"Limpar Todos"</button>
                    </div>
                </header>

                <Show
                    when=move || { page.with(|p| p.total_count > 0) || search.get().trim().is_empty() }
                    fallback=move || view! {
                        <div class="empty-state">
                            <p>"Nenhum cliente encontrado com o termo \"" {search.get()} "\""</p>
                        </div>
                    }
                >
                    <div class="clients-grid">
                        {move || {
                            page.get()
                                .items
                                .into_iter()
                                .map(|client| view! { <ClientCard client=client selected=true on_remove=remove /> })
                                .collect_view()
                        }}
                    </div>
                </Show>

                <div class="pagination-bar">
                    <span class="page-caption">
                        {move || page_caption(current_page.get(), total_pages.get())}
                    </span>
                    <Pagination
                        current_page=current_page
                        total_pages=total_pages
                        on_page_change=move |p: usize| view_state.update(|state| state.set_page(p))
                    />
                    <PageSizeSelector
                        options=&SELECTED_PAGE_SIZE_OPTIONS
                        value=page_size
                        label="Por página"
                        on_change=move |size: usize| view_state.update(|state| state.set_page_size(PageSize::Fixed(size)))
                    />
                </div>
            </Show>
        </div>
    }
    .into_any()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refetch_after() {
        assert!(refetch_after(&SyncEvent::Selected(4)));
        assert!(refetch_after(&SyncEvent::StateSync(Default::default())));
        assert!(!refetch_after(&SyncEvent::Unselected(4)));
        assert!(!refetch_after(&SyncEvent::Deleted(4)));
        assert!(!refetch_after(&SyncEvent::Cleared));
    }

    #[test]
    fn test_selected_heading() {
        assert_eq!(selected_heading(0), "Clientes Selecionados (0)");
        assert_eq!(selected_heading(12), "Clientes Selecionados (12)");
    }

    #[test]
    fn test_page_caption() {
        assert_eq!(page_caption(2, 5), "Página 2 de 5");
        // an empty selection still reads as one page
        assert_eq!(page_caption(1, 0), "Página 1 de 1");
    }
}
