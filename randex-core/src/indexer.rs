//! Capability surface of the delegate indexer the sampling store wraps.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ContextId, IndexRecord, Multihash, ProviderId};

/// Aggregate statistics reported by an indexer backend.
#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    /// Estimated number of indexed multihashes.
    pub multihash_count: u64,
}

/// Snapshot iterator over (multihash, records) associations.
pub type IndexIter = Box<dyn Iterator<Item = (Multihash, Vec<IndexRecord>)> + Send>;

/// A (content identifier -> provider records) index.
///
/// This is the authoritative store for retrieval; the sampling decorator
/// implements the same trait and fans writes and removals out to its manifest
/// sidecar. Cancellation of an in-flight call follows normal future-drop
/// semantics.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Records advertised for a multihash, or `None` when unindexed.
    async fn get(&self, multihash: &Multihash) -> Result<Option<Vec<IndexRecord>>>;

    /// Associate every multihash with the record.
    async fn put(&self, record: IndexRecord, multihashes: &[Multihash]) -> Result<()>;

    /// Drop the record's association for the listed multihashes.
    async fn remove(&self, record: &IndexRecord, multihashes: &[Multihash]) -> Result<()>;

    /// Drop everything advertised by a provider.
    async fn remove_provider(&self, provider: &ProviderId) -> Result<()>;

    /// Drop everything advertised by a provider under one context.
    async fn remove_provider_context(
        &self,
        provider: &ProviderId,
        context: &ContextId,
    ) -> Result<()>;

    /// Number of indexed multihashes.
    async fn size(&self) -> Result<u64>;

    async fn flush(&self) -> Result<()>;

    async fn iter(&self) -> Result<IndexIter>;

    async fn stats(&self) -> Result<IndexStats>;

    async fn close(&self) -> Result<()>;
}
