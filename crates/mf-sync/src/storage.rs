//! Durable Storage
//!
//! Key/value persistence behind a trait so the store runs on browser
//! `localStorage` in the app and on [`crate::memory::MemoryStorage`] in tests.

use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("durable storage is unavailable")]
    Unavailable,
    #[error("storage quota exceeded while writing `{key}`")]
    QuotaExceeded { key: String },
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("failed to encode `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode `{key}`: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String key/value storage with `localStorage` semantics
pub trait DurableStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: DurableStorage + ?Sized> DurableStorage for Rc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

/// Read and decode a JSON value. A missing key is `Ok(None)`.
pub fn read_json<S, T>(storage: &S, key: &str) -> Result<Option<T>, StorageError>
where
    S: DurableStorage + ?Sized,
    T: DeserializeOwned,
{
    match storage.get_item(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Decode {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encode a value as JSON and write it under `key`
pub fn write_json<S, T>(storage: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    S: DurableStorage + ?Sized,
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    storage.set_item(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStorage;

    #[test]
    fn test_json_helpers() {
        let storage = MemoryStorage::default();
        write_json(&storage, "ids", &vec![3u32, 1]).unwrap();
        let ids: Option<Vec<u32>> = read_json(&storage, "ids").unwrap();
        assert_eq!(ids, Some(vec![3, 1]));

        let missing: Option<Vec<u32>> = read_json(&storage, "nope").unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_decode_error_names_the_key() {
        let storage = MemoryStorage::default();
        storage.set_item("ids", "not json").unwrap();
        let err = read_json::<_, Vec<u32>>(&storage, "ids").unwrap_err();
        assert!(matches!(err, StorageError::Decode { ref key, .. } if key == "ids"));
        assert!(err.to_string().contains("`ids`"));
    }
}
