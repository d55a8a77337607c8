//! Durable registry of users who have talked to the bot.
//!
//! The store is a single JSON object mapping user-id strings to display names.
//! Every registration check reads the whole file and, for a first-seen user,
//! rewrites it. Calls within one process are serialized; separate processes
//! sharing the file are not coordinated.

use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tokio::sync::Mutex;

use crate::errors::{Error, Result};

pub type RegistryMap = BTreeMap<String, String>;

#[derive(Debug)]
pub struct UserRegistry {
    path: PathBuf,
    lock: Mutex<()>,
}

impl UserRegistry {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record `user_id` if it has not been seen before.
    ///
    /// Returns `true` when the user was added, `false` when already present.
    /// A missing store is created empty; a corrupt one is an error and is left
    /// untouched.
    pub async fn ensure_registered(&self, user_id: &str, display_name: &str) -> Result<bool> {
        if user_id.trim().is_empty() {
            return Err(Error::InvalidInput("user id must not be empty".to_string()));
        }

        let _guard = self.lock.lock().await;

        let mut users = match read_existing(&self.path).await? {
            Some(users) => users,
            None => {
                let empty = RegistryMap::new();
                save_store(&self.path, &empty).await?;
                empty
            }
        };

        if users.contains_key(user_id) {
            return Ok(false);
        }

        users.insert(user_id.to_string(), display_name.to_string());
        save_store(&self.path, &users).await?;
        Ok(true)
    }

    /// Number of registered users (0 when the store does not exist yet).
    pub async fn count(&self) -> Result<usize> {
        let _guard = self.lock.lock().await;
        Ok(read_existing(&self.path).await?.map_or(0, |m| m.len()))
    }

    pub async fn contains(&self, user_id: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        Ok(read_existing(&self.path)
            .await?
            .is_some_and(|m| m.contains_key(user_id)))
    }
}

/// Read the store. A missing file is an error here; see [`UserRegistry`] for
/// create-on-first-access behavior.
pub async fn load_store(path: &Path) -> Result<RegistryMap> {
    read_existing(path)
        .await?
        .ok_or_else(|| Error::storage(path, "registry file does not exist"))
}

/// Replace the whole store with `users`.
pub async fn save_store(path: &Path, users: &RegistryMap) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::storage(path, e))?;
    }
    let txt = serde_json::to_string(users).map_err(|e| Error::storage(path, e))?;
    tokio::fs::write(path, txt)
        .await
        .map_err(|e| Error::storage(path, e))
}

async fn read_existing(path: &Path) -> Result<Option<RegistryMap>> {
    let txt = match tokio::fs::read_to_string(path).await {
        Ok(txt) => txt,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::storage(path, e)),
    };
    let users = serde_json::from_str::<RegistryMap>(&txt)
        .map_err(|e| Error::storage(path, format!("corrupt registry: {e}")))?;
    Ok(Some(users))
}
