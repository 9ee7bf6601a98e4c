// Key storage: remembers the logged-in secret key between runs

use super::Keys;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Storage backend for the signing key
pub enum KeyStore {
    /// Process-local storage, forgotten on exit
    Memory(Mutex<Option<Keys>>),
    /// Hex secret in a single file
    File(PathBuf),
}

impl KeyStore {
    /// Create in-memory storage
    pub fn memory() -> Self {
        Self::Memory(Mutex::new(None))
    }

    /// Create file-backed storage at `path`
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    /// Save keys to storage, replacing any previous key
    pub fn save(&self, keys: &Keys) -> Result<()> {
        match self {
            Self::Memory(slot) => {
                *slot.lock() = Some(keys.clone());
                Ok(())
            }
            Self::File(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .context("Failed to create key directory")?;
                }
                std::fs::write(path, keys.secret_hex().as_bytes())
                    .context("Failed to write key file")?;
                restrict_permissions(path)?;
                tracing::info!("🔑 Stored key for {}", keys.public_key_hex());
                Ok(())
            }
        }
    }

    /// Load keys from storage
    pub fn load(&self) -> Result<Option<Keys>> {
        match self {
            Self::Memory(slot) => Ok(slot.lock().clone()),
            Self::File(path) => {
                if !path.exists() {
                    return Ok(None);
                }
                let contents = Zeroizing::new(
                    std::fs::read_to_string(path).context("Failed to read key file")?,
                );
                let keys = Keys::parse(&contents).context("Stored key is corrupt")?;
                Ok(Some(keys))
            }
        }
    }

    /// Forget the stored key
    pub fn clear(&self) -> Result<()> {
        match self {
            Self::Memory(slot) => {
                *slot.lock() = None;
                Ok(())
            }
            Self::File(path) => {
                if path.exists() {
                    std::fs::remove_file(path).context("Failed to remove key file")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .context("Failed to restrict key file permissions")
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
