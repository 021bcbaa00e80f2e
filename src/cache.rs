use crate::http::RequestKey;
use crate::io::Response;

pub mod filesystem;
pub mod inmemory;

use crate::Result;
pub use filesystem::{FileCache, FileStorage};
pub use inmemory::{InMemoryCache, InMemoryStorage};

/// A single named cache generation. Entries are independent: `put` replaces
/// whatever was stored under the key (last writer wins) and there is no
/// multi-key transaction.
pub trait Cache {
    fn get(&self, key: &RequestKey) -> Result<Option<Response>>;
    fn put(&self, key: &RequestKey, value: &Response) -> Result<()>;
    fn delete(&self, key: &RequestKey) -> Result<bool>;
    fn keys(&self) -> Result<Vec<RequestKey>>;
}

/// The set of named caches owned by the controller's origin.
pub trait CacheStorage {
    type Store: Cache;

    /// Open the cache with the given name, creating it if absent.
    fn open(&self, name: &str) -> Result<Self::Store>;
    fn has(&self, name: &str) -> Result<bool>;
    fn delete(&self, name: &str) -> Result<bool>;
    /// Names of all existing caches.
    fn keys(&self) -> Result<Vec<String>>;
}
