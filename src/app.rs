//! Client Admin Shell
//!
//! Owns the operator session and its own synchronized surface, and switches
//! between the welcome page and the two remote surfaces.

use leptos::prelude::*;
use log::error;
use mf_web::{SurfaceContext, WebStorage};

use crate::components::{flash_notice, Layout};
use crate::config::AppConfig;
use crate::context::ShellContext;
use crate::models::{notice_for_event, ShellPage};
use crate::pages::{ClientsPage, SelectedPage, WelcomePage};
use crate::session::Session;
use crate::store::{ShellState, ShellStateStoreFields, ShellStore};

#[component]
pub fn App(config: AppConfig) -> impl IntoView {
    // remotes read this instead of rebuilding it from the environment
    provide_context(config.web.clone());

    let session = Session::new(WebStorage::local());
    let store: ShellStore = ShellStore::new(ShellState::new(session.user_name()));
    provide_context(store);

    let surface = match SurfaceContext::mount("shell", &config.web.sync) {
        Ok(surface) => surface,
        Err(err) => {
            error!("[shell] failed to mount: {}", err);
            return view! {
                <div class="remote-error">
                    <h2>"Não foi possível iniciar a aplicação"</h2>
                    <p>{err.to_string()}</p>
                </div>
            }
            .into_any();
        }
    };
    provide_context(ShellContext::new(surface, session, store));

    surface.sync().watch(move |event| {
        if let Some(message) = notice_for_event(event) {
            flash_notice(store, message);
        }
    });

    view! {
        <div class="app">
            {move || match store.page().get() {
                ShellPage::Welcome => view! { <WelcomePage /> }.into_any(),
                ShellPage::Clients => view! { <Layout><ClientsPage /></Layout> }.into_any(),
                ShellPage::Selected => view! { <Layout><SelectedPage /></Layout> }.into_any(),
            }}
        </div>
    }
    .into_any()
}
