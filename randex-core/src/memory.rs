//! In-memory delegate indexer.
//!
//! Reference implementation of [`Indexer`] used by tests and as the server's
//! fallback backend when no external index is wired in. Associations do not
//! survive a restart.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::Result;
use crate::indexer::{IndexIter, IndexStats, Indexer};
use crate::types::{ContextId, IndexRecord, Multihash, ProviderId};

#[derive(Debug, Default)]
pub struct MemoryIndexer {
    entries: DashMap<Multihash, Vec<IndexRecord>>,
}

impl MemoryIndexer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Indexer for MemoryIndexer {
    async fn get(&self, multihash: &Multihash) -> Result<Option<Vec<IndexRecord>>> {
        Ok(self.entries.get(multihash).map(|entry| entry.value().clone()))
    }

    async fn put(&self, record: IndexRecord, multihashes: &[Multihash]) -> Result<()> {
        for multihash in multihashes {
            let mut records = self.entries.entry(multihash.clone()).or_default();
            match records.iter_mut().find(|r| {
                r.provider_id == record.provider_id && r.context_id == record.context_id
            }) {
                Some(existing) => existing.metadata = record.metadata.clone(),
                None => records.push(record.clone()),
            }
        }
        Ok(())
    }

    async fn remove(&self, record: &IndexRecord, multihashes: &[Multihash]) -> Result<()> {
        for multihash in multihashes {
            if let Some(mut records) = self.entries.get_mut(multihash) {
                records.retain(|r| {
                    r.provider_id != record.provider_id || r.context_id != record.context_id
                });
            }
        }
        self.entries.retain(|_, records| !records.is_empty());
        Ok(())
    }

    async fn remove_provider(&self, provider: &ProviderId) -> Result<()> {
        self.entries.retain(|_, records| {
            records.retain(|r| r.provider_id != *provider);
            !records.is_empty()
        });
        Ok(())
    }

    async fn remove_provider_context(
        &self,
        provider: &ProviderId,
        context: &ContextId,
    ) -> Result<()> {
        self.entries.retain(|_, records| {
            records.retain(|r| r.provider_id != *provider || r.context_id != *context);
            !records.is_empty()
        });
        Ok(())
    }

    async fn size(&self) -> Result<u64> {
        Ok(self.entries.len() as u64)
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    async fn iter(&self) -> Result<IndexIter> {
        let snapshot: Vec<(Multihash, Vec<IndexRecord>)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        Ok(Box::new(snapshot.into_iter()))
    }

    async fn stats(&self) -> Result<IndexStats> {
        Ok(IndexStats {
            multihash_count: self.entries.len() as u64,
        })
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(provider: &str, context: &[u8]) -> IndexRecord {
        IndexRecord {
            provider_id: ProviderId::parse(provider).unwrap(),
            context_id: ContextId::new(context.to_vec()).unwrap(),
            metadata: b"meta".to_vec(),
        }
    }

    #[tokio::test]
    async fn put_get_remove_round_trip() {
        let indexer = MemoryIndexer::new();
        let record = record("12D3KooWKTMKoNRJUwdGjuoY3FdtXzARas9UczGsPLw2MgPaLCnh", b"ctx");
        let mh = Multihash::from(vec![0x12, 0x20, 1]);

        indexer.put(record.clone(), &[mh.clone()]).await.unwrap();
        assert_eq!(
            indexer.get(&mh).await.unwrap(),
            Some(vec![record.clone()])
        );
        assert_eq!(indexer.size().await.unwrap(), 1);

        indexer.remove(&record, &[mh.clone()]).await.unwrap();
        assert_eq!(indexer.get(&mh).await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_updates_metadata_in_place() {
        let indexer = MemoryIndexer::new();
        let mut record = record("12D3KooWKTMKoNRJUwdGjuoY3FdtXzARas9UczGsPLw2MgPaLCnh", b"ctx");
        let mh = Multihash::from(vec![0x12, 0x20, 2]);

        indexer.put(record.clone(), &[mh.clone()]).await.unwrap();
        record.metadata = b"updated".to_vec();
        indexer.put(record.clone(), &[mh.clone()]).await.unwrap();

        let records = indexer.get(&mh).await.unwrap().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].metadata, b"updated");
    }

    #[tokio::test]
    async fn remove_provider_drops_every_context() {
        let indexer = MemoryIndexer::new();
        let a = record("12D3KooWKTMKoNRJUwdGjuoY3FdtXzARas9UczGsPLw2MgPaLCnh", b"a");
        let b = record("12D3KooWKTMKoNRJUwdGjuoY3FdtXzARas9UczGsPLw2MgPaLCnh", b"b");
        let mh = Multihash::from(vec![0x12, 0x20, 3]);

        indexer.put(a.clone(), &[mh.clone()]).await.unwrap();
        indexer.put(b, &[mh.clone()]).await.unwrap();
        indexer.remove_provider(&a.provider_id).await.unwrap();
        assert_eq!(indexer.get(&mh).await.unwrap(), None);
        assert_eq!(indexer.stats().await.unwrap().multihash_count, 0);
    }
}
