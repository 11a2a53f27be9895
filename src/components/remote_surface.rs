//! Remote Surface Boundary
//!
//! Both remotes are linked into the shell. The boundary holds a fallback
//! while it checks the platform a surface needs (a window, plus a
//! BroadcastChannel in channel mode) and shows a blocking error with a
//! full-page reload when that check fails.

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, info};
use mf_web::surface::{check_platform, MountError};
use mf_web::use_web_config;

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteState {
    Pending,
    Ready,
    Failed(String),
}

impl RemoteState {
    pub fn from_check(result: Result<(), MountError>) -> Self {
        match result {
            Ok(()) => RemoteState::Ready,
            Err(err) => RemoteState::Failed(err.to_string()),
        }
    }
}

fn reload_page() {
    let reloaded = web_sys::window().map(|window| window.location().reload());
    if let Some(Err(err)) = reloaded {
        error!("[remote] reload failed: {:?}", err);
    }
}

#[component]
pub fn RemoteSurface(
    /// Name used in logs
    name: &'static str,
    children: ChildrenFn,
) -> impl IntoView {
    let config = use_web_config();
    let (state, set_state) = signal(RemoteState::Pending);

    spawn_local(async move {
        // let the fallback paint before the surface opens its channels
        gloo_timers::future::TimeoutFuture::new(0).await;
        let next = RemoteState::from_check(check_platform(&config.sync));
        match &next {
            RemoteState::Failed(reason) => error!("[remote] {} failed to load: {}", name, reason),
            _ => info!("[remote] {} ready", name),
        }
        set_state.try_set(next);
    });

    move || match state.get() {
        RemoteState::Pending => view! { <div class="loading">"Carregando micro-frontend..."</div> }.into_any(),
        RemoteState::Ready => children().into_any(),
        RemoteState::Failed(reason) => view! {
            <div class="remote-error">
                <h2>"Erro ao carregar o módulo"</h2>
                <p>{reason}</p>
                <button class="btn primary" on:click=|_| reload_page()>"Recarregar página"</button>
            </div>
        }
        .into_any(),
    }
}
