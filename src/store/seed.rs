use super::InMemoryStore;
use crate::ast::Value;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;

/// Initial variables for a store, matching the JSON object format `{"user.name": "Ada"}`.
#[derive(Deserialize, Debug, Default)]
#[serde(transparent)]
pub struct StoreSeed {
    pub variables: BTreeMap<String, serde_json::Value>,
}

impl StoreSeed {
    /// Load seed variables from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let seed = serde_json::from_str(&content)?;
        Ok(seed)
    }

    /// Builds an in-memory store holding the seed variables.
    pub fn into_store(self) -> InMemoryStore {
        InMemoryStore::with_values(
            self.variables
                .into_iter()
                .map(|(key, value)| (key, Value::from(value))),
        )
    }
}
