// Identity: signing keys, the signer seam, and key persistence

mod keys;
mod signer;
mod store;

pub use keys::{KeyError, Keys, SecretKey};
pub use signer::{sign_with_secret, Signer, SigningError};
pub use store::KeyStore;

#[cfg(test)]
pub use signer::MockSigner;

use anyhow::Result;

/// Tracks the logged-in identity and keeps the store in sync
pub struct IdentityManager {
    store: KeyStore,
    keys: Option<Keys>,
}

impl IdentityManager {
    /// Create an identity manager with in-memory storage
    pub fn new() -> Self {
        Self {
            store: KeyStore::memory(),
            keys: None,
        }
    }

    /// Create an identity manager over an existing store
    pub fn with_store(store: KeyStore) -> Self {
        Self { store, keys: None }
    }

    /// Load a previously stored key, if any
    pub fn initialize(&mut self) -> Result<()> {
        self.keys = self.store.load()?;
        if let Some(keys) = &self.keys {
            tracing::info!("🔑 Loaded existing identity {}", keys.public_key_hex());
        }
        Ok(())
    }

    /// Log in with `nsec1...` or hex secret and remember it
    pub fn login(&mut self, secret: &str) -> Result<&Keys> {
        let keys = Keys::parse(secret)?;
        self.store.save(&keys)?;
        let keys = self.keys.insert(keys);
        Ok(&*keys)
    }

    /// Forget the current identity
    pub fn logout(&mut self) -> Result<()> {
        self.store.clear()?;
        self.keys = None;
        Ok(())
    }

    /// Current keys (if logged in)
    pub fn keys(&self) -> Option<&Keys> {
        self.keys.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.keys.is_some()
    }
}

impl Default for IdentityManager {
    fn default() -> Self {
        Self::new()
    }
}
