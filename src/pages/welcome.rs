//! Welcome Page

use leptos::ev::SubmitEvent;
use leptos::prelude::*;

use crate::context::use_shell_context;

#[component]
pub fn WelcomePage() -> impl IntoView {
    let shell = use_shell_context();
    let (name, set_name) = signal(String::new());
    let blank = move || name.with(|name| name.trim().is_empty());

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if shell.sign_in(&name.get_untracked()) {
            set_name.set(String::new());
        }
    };

    view! {
        <div class="welcome-page">
            <div class="welcome-card">
                <h1>"Olá, seja bem-vindo!"</h1>
                <form on:submit=on_submit>
                    <input
                        type="text"
                        placeholder="Digite o seu nome:"
                        required
                        prop:value=move || name.get()
                        on:input=move |ev| set_name.set(event_target_value(&ev))
                    />
                    <button type="submit" class="btn primary" disabled=blank>"Entrar"</button>
                </form>
            </div>
        </div>
    }
}
