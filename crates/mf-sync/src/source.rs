//! Client Source
//!
//! Where a surface fetches the full client list from when its cache cannot
//! answer. The web build implements it over REST.

use std::fmt::Display;

use async_trait::async_trait;

use crate::models::Client;

#[async_trait(?Send)]
pub trait ClientSource {
    type Error: Display;

    async fn fetch_all(&self) -> Result<Vec<Client>, Self::Error>;
}
