//! Browser Storage
//!
//! `localStorage` behind the `DurableStorage` seam.

use log::warn;
use mf_sync::{DurableStorage, StorageError};
use wasm_bindgen::{JsCast, JsValue};

/// Handle to `window.localStorage`; every call fails with
/// [`StorageError::Unavailable`] when the browser denies access.
#[derive(Clone)]
pub struct WebStorage {
    inner: Option<web_sys::Storage>,
}

impl WebStorage {
    pub fn local() -> Self {
        let inner = web_sys::window().and_then(|win| win.local_storage().ok().flatten());
        if inner.is_none() {
            warn!("[storage] localStorage is unavailable, nothing will persist");
        }
        Self { inner }
    }

    fn storage(&self) -> Result<&web_sys::Storage, StorageError> {
        self.inner.as_ref().ok_or(StorageError::Unavailable)
    }
}

impl DurableStorage for WebStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?
            .get_item(key)
            .map_err(|err| storage_error(key, &err))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|err| storage_error(key, &err))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.storage()?
            .remove_item(key)
            .map_err(|err| storage_error(key, &err))
    }
}

fn storage_error(key: &str, err: &JsValue) -> StorageError {
    match err.dyn_ref::<web_sys::DomException>() {
        Some(dom) => classify_dom_error(key, &dom.name(), &dom.message()),
        None => StorageError::Backend(format!("{:?}", err)),
    }
}

/// Map a `DOMException` name to a storage error. Firefox reports a full
/// quota under its own name.
pub fn classify_dom_error(key: &str, name: &str, message: &str) -> StorageError {
    match name {
        "QuotaExceededError" | "NS_ERROR_DOM_QUOTA_REACHED" => StorageError::QuotaExceeded { key: key.to_string() },
        "SecurityError" => StorageError::Unavailable,
        _ => StorageError::Backend(format!("{}: {}", name, message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_dom_error() {
        assert!(matches!(
            classify_dom_error("selected-ids", "QuotaExceededError", "full"),
            StorageError::QuotaExceeded { key } if key == "selected-ids"
        ));
        assert!(matches!(
            classify_dom_error("k", "NS_ERROR_DOM_QUOTA_REACHED", ""),
            StorageError::QuotaExceeded { .. }
        ));
        assert!(matches!(classify_dom_error("k", "SecurityError", ""), StorageError::Unavailable));
        assert!(matches!(classify_dom_error("k", "InvalidStateError", "x"), StorageError::Backend(_)));
    }
}
