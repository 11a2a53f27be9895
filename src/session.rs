//! Operator Session
//!
//! The name typed on the welcome page, kept in durable storage so a reload
//! does not send the operator back to it.

use log::warn;
use mf_sync::DurableStorage;

pub const USER_NAME_KEY: &str = "user-name";

pub struct Session<S> {
    storage: S,
}

impl<S: DurableStorage> Session<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Stored name, if any. Storage failures read as signed out.
    pub fn user_name(&self) -> Option<String> {
        match self.storage.get_item(USER_NAME_KEY) {
            Ok(name) => name.filter(|name| !name.trim().is_empty()),
            Err(err) => {
                warn!("[session] failed to read user name: {}", err);
                None
            }
        }
    }

    /// Trim and remember `name`. Blank names are refused. A failed write
    /// still signs in for the lifetime of the page.
    pub fn sign_in(&self, name: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        if let Err(err) = self.storage.set_item(USER_NAME_KEY, name) {
            warn!("[session] failed to store user name: {}", err);
        }
        Some(name.to_string())
    }

    pub fn sign_out(&self) {
        if let Err(err) = self.storage.remove_item(USER_NAME_KEY) {
            warn!("[session] failed to clear user name: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_sync::memory::MemoryStorage;

    #[test]
    fn test_sign_in_persists_trimmed_name() {
        let storage = MemoryStorage::default();
        let session = Session::new(storage.clone());
        assert_eq!(session.user_name(), None);

        assert_eq!(session.sign_in("  Marina "), Some("Marina".to_string()));
        assert_eq!(storage.get_item(USER_NAME_KEY).unwrap(), Some("Marina".to_string()));

        // a fresh session over the same storage is still signed in
        assert_eq!(Session::new(storage).user_name(), Some("Marina".to_string()));
    }

    #[test]
    fn test_blank_name_is_refused() {
        let session = Session::new(MemoryStorage::default());
        assert_eq!(session.sign_in("   "), None);
        assert_eq!(session.user_name(), None);
    }

    #[test]
    fn test_sign_out() {
        let session = Session::new(MemoryStorage::default());
        session.sign_in("Marina");
        session.sign_out();
        assert_eq!(session.user_name(), None);
    }

    #[test]
    fn test_full_storage_still_signs_in() {
        let session = Session::new(MemoryStorage::with_quota(0));
        assert_eq!(session.sign_in("Marina"), Some("Marina".to_string()));
        assert_eq!(session.user_name(), None);
    }
}
