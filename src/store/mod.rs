//! Document store boundary.
//!
//! The pipeline only ever reads: it filters, sorts and counts documents.
//! Everything it needs from a backing store fits in the [`DocumentStore`]
//! trait; [`MemoryStore`] is the JSON-file-backed implementation used by the
//! binary and by tests.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::search::predicate::Predicate;

pub mod memory;

pub use memory::MemoryStore;

/// The three backing collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Notice,
    Instruction,
    Regulation,
}

impl CollectionKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Notice => "notices",
            Self::Instruction => "instructions",
            Self::Regulation => "regulation",
        }
    }
}

/// Read-only access to the document collections. One instance is built at
/// process start and shared for the process lifetime.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents of `collection` matching `filter`, in storage order.
    async fn find(
        &self,
        collection: CollectionKind,
        filter: &Predicate,
    ) -> Result<Vec<Value>, StoreError>;

    /// Matching documents sorted descending by the string value at
    /// `sort_field`, capped at `limit`. Documents without the field sort
    /// last.
    async fn find_sorted_desc(
        &self,
        collection: CollectionKind,
        filter: &Predicate,
        sort_field: &str,
        limit: usize,
    ) -> Result<Vec<Value>, StoreError>;

    /// Number of documents of `collection` matching `filter`.
    async fn count(
        &self,
        collection: CollectionKind,
        filter: &Predicate,
    ) -> Result<u64, StoreError>;

    /// The one fixed aggregation: total number of individual articles
    /// across all regulation sections (unwind + count).
    async fn count_articles(&self) -> Result<u64, StoreError>;
}
