use std::{
    collections::BTreeMap,
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{anyhow, bail, Result};
use fs4::tokio::AsyncFileExt;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{debug, trace};

/// Interface for the local key/value space every collection lives in. Values are opaque strings.
pub trait KeyValueStore {
    /// Returns the value stored under `key`. Absence is not an error.
    fn get_item(&self, key: &str) -> impl Future<Output = Result<Option<String>>>;

    /// Replaces the value under `key` as a whole.
    fn set_item(&self, key: &str, value: &str) -> impl Future<Output = Result<()>>;

    /// Removing a key that isn't present succeeds.
    fn remove_item(&self, key: &str) -> impl Future<Output = Result<()>>;

    /// Returns every key currently present in ascending order.
    fn keys(&self) -> impl Future<Output = Result<Vec<String>>>;

    /// Drops every key. Irreversible.
    fn clear(&self) -> impl Future<Output = Result<()>>;
}

impl<T: Deref> KeyValueStore for T
where
    T::Target: KeyValueStore,
{
    fn get_item(&self, key: &str) -> impl Future<Output = Result<Option<String>>> {
        self.deref().get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> impl Future<Output = Result<()>> {
        self.deref().set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> impl Future<Output = Result<()>> {
        self.deref().remove_item(key)
    }

    fn keys(&self) -> impl Future<Output = Result<Vec<String>>> {
        self.deref().keys()
    }

    fn clear(&self) -> impl Future<Output = Result<()>> {
        self.deref().clear()
    }
}

/// The main realization of [KeyValueStore]. Each key is a file inside `dir`.
///
/// Writers of a key are serialized through an exclusive lock on `.<key>.lock`, across processes
/// through `fs4` and inside the process through `writes`. The value is staged in `.<key>.tmp` and
/// renamed over the key, so readers see either the old or the new value and need no lock.
pub struct FileStore {
    dir: PathBuf,
    writes: tokio::sync::Mutex<()>,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            writes: tokio::sync::Mutex::new(()),
        })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        // Leading dots are reserved for lock and staging files, separators would escape the
        // directory.
        if key.is_empty() || key.starts_with('.') || key.contains(['/', '\\']) {
            bail!("Illegal storage key {key:?}");
        }
        Ok(self.dir.join(key))
    }

    async fn lock_key(&self, key: &str) -> Result<File, std::io::Error> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.dir.join(format!(".{key}.lock")))
            .await?;
        file.lock_exclusive()?;
        Ok(file)
    }

    async fn replace(&self, key: &str, path: &Path, value: &str) -> Result<(), std::io::Error> {
        let staging = self.dir.join(format!(".{key}.tmp"));
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&staging)
            .await?;
        file.write_all(value.as_bytes()).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&staging, path).await
    }

    async fn remove_file(path: &Path) -> Result<(), std::io::Error> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!("Removed {path:?}");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl KeyValueStore for FileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        trace!("Reading {path:?}");
        match tokio::fs::read(&path).await {
            Ok(value) => Ok(Some(String::from_utf8_lossy(&value).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)?,
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        debug!("Writing {} bytes into {path:?}", value.len());

        let _writing = self.writes.lock().await;
        let lock = self.lock_key(key).await?;
        let result = self.replace(key, &path, value).await;
        lock.unlock_async().await?;
        Ok(result?)
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;

        let _writing = self.writes.lock().await;
        let lock = self.lock_key(key).await?;
        let result = Self::remove_file(&path).await;
        lock.unlock_async().await?;
        Ok(result?)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut keys = vec![];
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            keys.push(name);
        }
        keys.sort();
        Ok(keys)
    }

    async fn clear(&self) -> Result<()> {
        for key in self.keys().await? {
            self.remove_item(&key).await?;
        }
        Ok(())
    }
}

/// Keeps everything in memory. Used in tests and anywhere persistence isn't wanted.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_values<T>(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> T) -> Result<T> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow!("Memory store lock was poisoned"))?;
        Ok(f(&mut values))
    }
}

impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.with_values(|values| values.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.with_values(|values| {
            values.insert(key.to_owned(), value.to_owned());
        })
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.with_values(|values| {
            values.remove(key);
        })
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.with_values(|values| values.keys().cloned().collect())
    }

    async fn clear(&self) -> Result<()> {
        self.with_values(|values| values.clear())
    }
}
