// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`TokenStore`] implementations.
//!
//! [`FileTokenStore`] persists tokens as a flat JSON object so a session
//! survives restarts; [`MemoryTokenStore`] keeps them for the life of the process.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;
use vetdesk_core::{TokenStore, VetdeskError};

/// Token store backed by a JSON file (`{"accessToken": "...", "refreshToken": "..."}`).
///
/// The file is re-read on every `get` so that several processes sharing the
/// file see each other's refreshes.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, VetdeskError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| VetdeskError::Storage {
                source: Box::new(e),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(VetdeskError::Storage {
                source: Box::new(e),
            }),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), VetdeskError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| VetdeskError::Storage {
                    source: Box::new(e),
                })?;
            }
        }
        let content = serde_json::to_string_pretty(entries).map_err(|e| VetdeskError::Storage {
            source: Box::new(e),
        })?;
        // Write-then-rename so a crash never leaves a truncated credentials file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(|e| VetdeskError::Storage {
            source: Box::new(e),
        })?;
        restrict_to_owner(&tmp)?;
        std::fs::rename(&tmp, &self.path).map_err(|e| VetdeskError::Storage {
            source: Box::new(e),
        })
    }

    fn modify(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), VetdeskError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| VetdeskError::Internal("token store lock poisoned".into()))?;
        let mut entries = self.read_all()?;
        f(&mut entries);
        self.write_all(&entries)
    }
}

/// Tokens are bearer credentials: owner read/write only.
#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> Result<(), VetdeskError> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(|e| {
        VetdeskError::Storage {
            source: Box::new(e),
        }
    })
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> Result<(), VetdeskError> {
    Ok(())
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_all() {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                debug!(error = %e, path = %self.path.display(), "credentials file unreadable");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), VetdeskError> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), VetdeskError> {
        self.modify(|entries| {
            entries.remove(key);
        })
    }
}

/// In-process token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with an access and optional refresh token.
    pub fn with_tokens(access: &str, refresh: Option<&str>) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(vetdesk_core::ACCESS_TOKEN_KEY.to_string(), access.to_string());
            if let Some(refresh) = refresh {
                entries.insert(vetdesk_core::REFRESH_TOKEN_KEY.to_string(), refresh.to_string());
            }
        }
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), VetdeskError> {
        self.entries
            .lock()
            .map_err(|_| VetdeskError::Internal("token store lock poisoned".into()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), VetdeskError> {
        self.entries
            .lock()
            .map_err(|_| VetdeskError::Internal("token store lock poisoned".into()))?
            .remove(key);
        Ok(())
    }
}
