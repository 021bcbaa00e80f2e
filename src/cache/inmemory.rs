use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{
    cache::{Cache, CacheStorage},
    error::SWError,
    http::RequestKey,
    io::Response,
};

use crate::Result;

type Entries = Arc<Mutex<HashMap<RequestKey, Response>>>;

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| SWError::CacheStorageError(format!("in-memory {what} lock poisoned")).into())
}

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    caches: Arc<Mutex<HashMap<String, Entries>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStorage for InMemoryStorage {
    type Store = InMemoryCache;

    fn open(&self, name: &str) -> Result<InMemoryCache> {
        let mut caches = lock(&self.caches, "storage")?;
        let entries = caches.entry(name.to_string()).or_default().clone();
        Ok(InMemoryCache { entries })
    }

    fn has(&self, name: &str) -> Result<bool> {
        Ok(lock(&self.caches, "storage")?.contains_key(name))
    }

    fn delete(&self, name: &str) -> Result<bool> {
        Ok(lock(&self.caches, "storage")?.remove(name).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut names = lock(&self.caches, "storage")?
            .keys()
            .cloned()
            .collect::<Vec<String>>();
        names.sort();
        Ok(names)
    }
}

/// Handle to one in-memory cache. Handles opened on the same name share
/// their entries.
#[derive(Clone)]
pub struct InMemoryCache {
    entries: Entries,
}

impl Cache for InMemoryCache {
    fn get(&self, key: &RequestKey) -> Result<Option<Response>> {
        Ok(lock(&self.entries, "cache")?.get(key).cloned())
    }

    fn put(&self, key: &RequestKey, value: &Response) -> Result<()> {
        lock(&self.entries, "cache")?.insert(key.clone(), value.clone());
        Ok(())
    }

    fn delete(&self, key: &RequestKey) -> Result<bool> {
        Ok(lock(&self.entries, "cache")?.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<RequestKey>> {
        let mut keys = lock(&self.entries, "cache")?
            .keys()
            .cloned()
            .collect::<Vec<RequestKey>>();
        keys.sort_by(|a, b| a.url.cmp(&b.url));
        Ok(keys)
    }
}
