use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

use crate::config::Config;
use crate::error::StoreError;
use crate::search::predicate::Predicate;
use crate::store::{CollectionKind, DocumentStore};

/// In-memory document store loaded from one JSON array file per collection.
/// The collections are read-only snapshots: there is no write path, so no
/// locking is needed after construction.
#[derive(Debug)]
pub struct MemoryStore {
    notices: Vec<Value>,
    instructions: Vec<Value>,
    regulation: Vec<Value>,
}

impl MemoryStore {
    /// Load all three collection files from the configured data directory.
    pub fn open(config: &Config) -> Result<Self, StoreError> {
        Ok(Self {
            notices: load_collection(&config.notices_path())?,
            instructions: load_collection(&config.instructions_path())?,
            regulation: load_collection(&config.regulation_path())?,
        })
    }

    /// Build a store from in-memory documents. Used by tests and seeds.
    pub fn from_collections(
        notices: Vec<Value>,
        instructions: Vec<Value>,
        regulation: Vec<Value>,
    ) -> Self {
        Self {
            notices,
            instructions,
            regulation,
        }
    }

    fn docs(&self, collection: CollectionKind) -> &[Value] {
        match collection {
            CollectionKind::Notice => &self.notices,
            CollectionKind::Instruction => &self.instructions,
            CollectionKind::Regulation => &self.regulation,
        }
    }
}

fn load_collection(path: &Path) -> Result<Vec<Value>, StoreError> {
    if !path.exists() {
        return Err(StoreError::CollectionNotFound(path.to_path_buf()));
    }
    let data = std::fs::read_to_string(path)?;
    let docs: Vec<Value> = serde_json::from_str(&data)?;
    Ok(docs)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: CollectionKind,
        filter: &Predicate,
    ) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .docs(collection)
            .iter()
            .filter(|doc| filter.eval(doc))
            .cloned()
            .collect())
    }

    async fn find_sorted_desc(
        &self,
        collection: CollectionKind,
        filter: &Predicate,
        sort_field: &str,
        limit: usize,
    ) -> Result<Vec<Value>, StoreError> {
        let mut matched: Vec<&Value> = self
            .docs(collection)
            .iter()
            .filter(|doc| filter.eval(doc))
            .collect();

        // ISO-8601 strings order chronologically under plain string
        // comparison. Stable sort keeps storage order among ties.
        matched.sort_by(|a, b| {
            let ka = a.get(sort_field).and_then(Value::as_str);
            let kb = b.get(sort_field).and_then(Value::as_str);
            kb.cmp(&ka)
        });

        Ok(matched.into_iter().take(limit).cloned().collect())
    }

    async fn count(
        &self,
        collection: CollectionKind,
        filter: &Predicate,
    ) -> Result<u64, StoreError> {
        Ok(self
            .docs(collection)
            .iter()
            .filter(|doc| filter.eval(doc))
            .count() as u64)
    }

    async fn count_articles(&self) -> Result<u64, StoreError> {
        Ok(self
            .regulation
            .iter()
            .map(|doc| {
                doc.get("articles")
                    .and_then(Value::as_array)
                    .map(|a| a.len() as u64)
                    .unwrap_or(0)
            })
            .sum())
    }
}
