//! Shell Layout Component
//!
//! Sidebar navigation with the selection badge, header and notice banner.

use leptos::prelude::*;

use crate::components::NoticeBanner;
use crate::context::use_shell_context;
use crate::models::ShellPage;
use crate::store::{store_navigate, use_shell_store, ShellStateStoreFields};

#[component]
fn NavLink(page: ShellPage, children: Children) -> impl IntoView {
    let store = use_shell_store();
    let class = move || {
        if store.page().get() == page {
            "nav-link active"
        } else {
            "nav-link"
        }
    };

    view! {
        <button class=class on:click=move |_| store_navigate(&store, page)>
            {children()}
        </button>
    }
}

#[component]
pub fn Layout(children: Children) -> impl IntoView {
    let store = use_shell_store();
    let shell = use_shell_context();
    let selected_count = move || shell.selected_count();

    view! {
        <div class="shell-layout">
            <aside class="sidebar">
                <div class="brand">"Client Admin"</div>
                <nav>
                    <NavLink page=ShellPage::Clients>"Clientes"</NavLink>
                    <NavLink page=ShellPage::Selected>
                        "Clientes selecionados"
                        <Show when=move || { selected_count() > 0 }>
                            <span class="badge">{selected_count}</span>
                        </Show>
                    </NavLink>
                </nav>
                <div class="sidebar-user">
                    <span class="user-name">{move || store.user_name().get().unwrap_or_default()}</span>
                    <span class="user-role">"Usuário"</span>
                    <button class="btn ghost" on:click=move |_| shell.sign_out()>"Sair"</button>
                </div>
            </aside>

            <div class="shell-main">
                <header class="shell-header">
                    <h1>{move || store.page().get().title()}</h1>
                    <span class="greeting">
                        {move || store.user_name().get().map(|name| format!("Olá, {}!", name))}
                    </span>
                </header>
                <NoticeBanner />
                <main class="shell-content">{children()}</main>
            </div>
        </div>
    }
}
