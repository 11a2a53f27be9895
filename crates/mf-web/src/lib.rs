//! mf-web
//!
//! Browser side of the client admin surfaces: `localStorage`, broadcast
//! channel and window-message transports, DOM listeners, the REST client,
//! the reactive [`SurfaceContext`] and the widgets both remotes share.

pub mod api;
pub mod components;
pub mod config;
pub mod format;
pub mod listener;
pub mod storage;
pub mod surface;
pub mod transport;

pub use api::{ApiError, RestClient};
pub use config::WebConfig;
pub use storage::WebStorage;
pub use surface::{use_viewport_width, use_visibility_refresh, use_web_config, MountError, SurfaceContext, WebSync};
