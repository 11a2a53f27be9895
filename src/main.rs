//! Client Admin Frontend Entry Point

mod app;
mod components;
mod config;
mod context;
mod models;
mod pages;
mod session;
mod store;

use app::App;
use config::AppConfig;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    let config = AppConfig::from_env();
    _ = console_log::init_with_level(config.log_level);
    log::info!("[shell] starting, api {}", config.web.api_base_url);
    mount_to_body(move || view! { <App config=config.clone() /> });
}
