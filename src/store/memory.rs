use super::VariableStore;
use crate::ast::Value;
use crate::error::StoreError;
use ahash::AHashMap;
use async_trait::async_trait;
use std::sync::RwLock;
use tracing::trace;

/// A process-local `VariableStore`, used by tests and the CLI.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<AHashMap<String, Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given entries.
    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let data = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            data: RwLock::new(data),
        }
    }

    /// A copy of every entry currently held.
    pub fn snapshot(&self) -> Result<AHashMap<String, Value>, StoreError> {
        self.data
            .read()
            .map(|data| data.clone())
            .map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl VariableStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let data = self.data.read().map_err(|_| StoreError::Poisoned)?;
        Ok(data.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        trace!(key = %key, value = %value, "Setting variable");
        let mut data = self.data.write().map_err(|_| StoreError::Poisoned)?;
        data.insert(key.to_string(), value);
        Ok(())
    }
}
