//! File-backed store backends.
//!
//! Each store is a single JSON object on disk. Every operation reads the file,
//! applies the change and writes it back while holding a per-store lock, so
//! concurrent tasks in one process never interleave partial updates.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use super::{Cookie, CookieStore, LocalStore};
use crate::error::StoreError;

/// A JSON map persisted to one file.
#[derive(Debug)]
struct JsonFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFile {
    fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load<T: DeserializeOwned>(&self) -> Result<BTreeMap<String, T>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save<T: Serialize>(&self, map: &BTreeMap<String, T>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(map)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load::<T>().await?.remove(key))
    }

    async fn update<T, F>(&self, change: F) -> Result<(), StoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut BTreeMap<String, T>) + Send,
    {
        let _guard = self.lock.lock().await;
        let mut map = self.load::<T>().await?;
        change(&mut map);
        self.save(&map).await
    }
}

/// Cookie jar persisted as a JSON file.
#[derive(Debug)]
pub struct FileCookieStore {
    file: JsonFile,
}

impl FileCookieStore {
    /// Open (lazily) the cookie jar at `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file.path
    }
}

#[async_trait::async_trait]
impl CookieStore for FileCookieStore {
    async fn get(&self, name: &str) -> Result<Option<Cookie>, StoreError> {
        let cookie: Option<Cookie> = self.file.get(name).await?;
        Ok(cookie.filter(|c| !c.is_expired()))
    }

    async fn set(&self, cookie: Cookie) -> Result<(), StoreError> {
        self.file
            .update(move |map: &mut BTreeMap<String, Cookie>| {
                // Expired cookies are pruned whenever the jar is rewritten.
                map.retain(|_, c| !c.is_expired());
                map.insert(cookie.name.clone(), cookie);
            })
            .await
    }

    async fn remove(&self, name: &str) -> Result<(), StoreError> {
        self.file
            .update(|map: &mut BTreeMap<String, Cookie>| {
                map.remove(name);
            })
            .await
    }
}

/// Key/value store persisted as a JSON file.
#[derive(Debug)]
pub struct FileLocalStore {
    file: JsonFile,
}

impl FileLocalStore {
    /// Open (lazily) the store at `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file.path
    }
}

#[async_trait::async_trait]
impl LocalStore for FileLocalStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.file.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.file
            .update(|map: &mut BTreeMap<String, String>| {
                map.insert(key.to_owned(), value.to_owned());
            })
            .await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.file
            .update(|map: &mut BTreeMap<String, String>| {
                map.remove(key);
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cookies = FileCookieStore::new(dir.path().join("cookies.json"));
        let local = FileLocalStore::new(dir.path().join("local.json"));

        assert_eq!(cookies.get("userToken").await.unwrap(), None);
        assert_eq!(local.get("user").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("local.json");

        FileLocalStore::new(&path).set("user", "{\"id\":1}").await.unwrap();

        let reopened = FileLocalStore::new(&path);
        assert_eq!(
            reopened.get("user").await.unwrap().as_deref(),
            Some("{\"id\":1}")
        );
    }

    #[tokio::test]
    async fn test_cookie_round_trip_and_expiry() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCookieStore::new(dir.path().join("cookies.json"));

        store
            .set(Cookie::new("userToken", "tok").with_max_age(Duration::days(7)))
            .await
            .unwrap();
        store
            .set(Cookie::new("isLoggedIn", "true").with_max_age(Duration::seconds(-1)))
            .await
            .unwrap();

        assert_eq!(store.get("userToken").await.unwrap().unwrap().value, "tok");
        assert_eq!(store.get("isLoggedIn").await.unwrap(), None);

        store.remove("userToken").await.unwrap();
        assert_eq!(store.get("userToken").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let result = FileLocalStore::new(&path).get("user").await;
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }
}
