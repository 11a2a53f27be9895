//! Notice Banner Component

use gloo_timers::callback::Timeout;
use leptos::prelude::*;

use crate::store::{store_dismiss_notice, store_show_notice, use_shell_store, ShellStore, ShellStateStoreFields};

pub const NOTICE_DISMISS_MS: u32 = 3_000;

/// Show `message` and dismiss it after a few seconds unless replaced
pub fn flash_notice(store: ShellStore, message: &'static str) {
    let id = store_show_notice(&store, message);
    Timeout::new(NOTICE_DISMISS_MS, move || store_dismiss_notice(&store, id)).forget();
}

#[component]
pub fn NoticeBanner() -> impl IntoView {
    let store = use_shell_store();

    move || {
        store.notice().get().map(|notice| {
            let id = notice.id;
            view! {
                <div class="notice success" role="status">
                    <span>{notice.message}</span>
                    <button class="notice-close" on:click=move |_| store_dismiss_notice(&store, id)>"×"</button>
                </div>
            }
        })
    }
}
