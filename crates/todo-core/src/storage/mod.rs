//! Client-local key-value storage
//!
//! The session token is the only durable client state. It is kept behind
//! the `KeyValueStore` trait so tests can run against memory while the CLI
//! persists to disk.
//!
//! ## Implementations
//!
//! - `MemoryStore`: process-local, used in tests
//! - `FileStore`: JSON file written atomically, used in production

pub mod error;
pub mod file;
pub mod memory;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;

/// String key-value persistence
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> StorageResult<()>;
}
