//! Randex Core - sampling-capable decorator for content-address indexers
//!
//! This crate augments a (content identifier -> provider records) index with
//! verifiable random sampling: for every write it persists the written
//! identifiers as immutable per-(provider, context) manifest batches, and it
//! can draw a bounded, beacon-seeded random sample from everything a provider
//! has advertised under a context. A verifier supplies the beacon, so the
//! party answering cannot bias the draw.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use randex_core::{
//!     ContextId, IndexRecord, Indexer, MemoryIndexer, Multihash, Population,
//!     ProviderId, Sampler, SamplingStore,
//! };
//!
//! # async fn example() -> randex_core::Result<()> {
//! let store = SamplingStore::new("/var/lib/randex", Arc::new(MemoryIndexer::new()))?;
//!
//! let record = IndexRecord {
//!     provider_id: ProviderId::parse("12D3KooWKTMKoNRJUwdGjuoY3FdtXzARas9UczGsPLw2MgPaLCnh")?,
//!     context_id: ContextId::new(b"dataset-a".to_vec())?,
//!     metadata: Vec::new(),
//! };
//! store
//!     .put(record.clone(), &[Multihash::from(vec![0x12, 0x20, 0x01])])
//!     .await?;
//!
//! let samples = store
//!     .sample(Population {
//!         provider_id: record.provider_id,
//!         context_id: record.context_id,
//!         beacon: vec![0xab; 32],
//!         max_samples: 5,
//!         federation_epoch: None,
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod indexer;
pub mod layout;
pub mod manifest;
pub mod memory;
pub mod sampler;
pub mod seed;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use error::{RandexError, Result};
pub use indexer::{IndexIter, IndexStats, Indexer};
pub use memory::MemoryIndexer;
pub use seed::derive_seed;
pub use store::{Sampler, SamplingStore};
pub use types::{
    ContextId, IndexRecord, Multihash, Population, ProviderId, MAX_BEACON_BYTES, MAX_SAMPLE_COUNT,
};
