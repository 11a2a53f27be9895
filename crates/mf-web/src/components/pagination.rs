//! Pagination Component
//!
//! Previous/next buttons around the page links of `visible_pages`.

use leptos::prelude::*;
use mf_sync::projection::{visible_pages, PageLink};

/// Hidden when everything fits on one page
#[component]
pub fn Pagination(
    #[prop(into)] current_page: Signal<usize>,
    #[prop(into)] total_pages: Signal<usize>,
    #[prop(into)] on_page_change: Callback<usize>,
) -> impl IntoView {
    let links = move || visible_pages(current_page.get(), total_pages.get());

    view! {
        <Show when=move || { total_pages.get() > 1 }>
            <nav class="pagination">
                <button
                    class="page-btn"
                    disabled=move || current_page.get() <= 1
                    on:click=move |_| on_page_change.run(current_page.get_untracked().saturating_sub(1).max(1))
                >
                    "Anterior"
                </button>
                {move || {
                    links()
                        .into_iter()
                        .map(|link| match link {
                            PageLink::Page(page) => {
                                view! {
                                    <button
                                        class=move || {
                                            if current_page.get() == page { "page-btn active" } else { "page-btn" }
                                        }
                                        on:click=move |_| on_page_change.run(page)
                                    >
                                        {page}
                                    </button>
                                }
                                    .into_any()
                            }
                            PageLink::Ellipsis => view! { <span class="page-ellipsis">"..."</span> }.into_any(),
                        })
                        .collect_view()
                }}
                <button
                    class="page-btn"
                    disabled=move || current_page.get() >= total_pages.get()
                    on:click=move |_| {
                        on_page_change.run((current_page.get_untracked() + 1).min(total_pages.get_untracked()))
                    }
                >
                    "Próxima"
                </button>
            </nav>
        </Show>
    }
}
