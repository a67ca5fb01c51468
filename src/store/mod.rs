//! The variable store seam.
//!
//! The store is owned by the host application. The engine only reads and writes
//! dot-path keys (e.g. `user.streak`) through the `VariableStore` trait; how the
//! values are persisted is the implementation's concern.

mod memory;
mod seed;

pub use memory::InMemoryStore;
pub use seed::StoreSeed;

use crate::ast::Value;
use crate::error::StoreError;
use async_trait::async_trait;

/// A namespaced key-value map with typed get and set.
///
/// Keys are flat dot-path strings; lookups are direct, no nesting is implied.
#[async_trait]
pub trait VariableStore: Send + Sync {
    /// Reads a key. `Ok(None)` means the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Writes a key, replacing any previous value and type.
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}
