//! The sampling-capable storage decorator.
//!
//! `SamplingStore` wraps a delegate [`Indexer`] behind the same capability
//! surface and keeps a manifest sidecar alongside it: every successful write
//! appends an immutable batch of the written content identifiers, and
//! removals delete the corresponding manifest directories. On top of that it
//! exposes the [`Sampler`] capability: a deterministic-seed, bounded-size
//! random draw over everything a provider has advertised under a context.
//!
//! The delegate remains the source of truth for retrieval. A manifest append
//! that fails after a successful delegate write is surfaced distinctly (the
//! index and the sampling population diverge until reconciled) but the
//! delegate write is never rolled back.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::{RandexError, Result};
use crate::indexer::{IndexIter, IndexStats, Indexer};
use crate::layout::ManifestLayout;
use crate::manifest::ManifestWriter;
use crate::sampler::ReservoirSampler;
use crate::seed::derive_seed;
use crate::types::{ContextId, IndexRecord, Multihash, Population, ProviderId};

/// Verifiable random sampling over a provider's advertised identifiers.
#[async_trait]
pub trait Sampler: Send + Sync {
    /// Draw at most `population.max_samples` content identifiers, fixed by
    /// the population's beacon. An unwritten (provider, context) pair yields
    /// an empty draw, not an error.
    async fn sample(&self, population: Population) -> Result<Vec<Multihash>>;
}

pub struct SamplingStore {
    delegate: Arc<dyn Indexer>,
    layout: ManifestLayout,
    writer: ManifestWriter,
    sampler: ReservoirSampler,
    closed: AtomicBool,
}

impl SamplingStore {
    /// Create the store over `home`, wrapping `delegate`.
    ///
    /// The manifest root is created eagerly; failure here is fatal to
    /// startup since the store cannot serve without it.
    pub fn new(home: impl Into<PathBuf>, delegate: Arc<dyn Indexer>) -> Result<Self> {
        let root = home.into();
        std::fs::create_dir_all(&root)?;
        let layout = ManifestLayout::new(root);
        Ok(Self {
            delegate,
            writer: ManifestWriter::new(layout.clone()),
            sampler: ReservoirSampler::new(layout.clone()),
            layout,
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(RandexError::Closed);
        }
        Ok(())
    }

    async fn remove_manifest_dir(&self, dir: PathBuf) -> Result<()> {
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            // Re-deleting an already-removed directory is a no-op so
            // removal stays idempotent on retry.
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Sampler for SamplingStore {
    async fn sample(&self, population: Population) -> Result<Vec<Multihash>> {
        self.ensure_open()?;
        population.validate()?;
        let seed = derive_seed(&population.beacon)?;
        if let Some(epoch) = population.federation_epoch {
            tracing::trace!(federation_epoch = epoch, "federation epoch not yet consumed");
        }

        let sampler = self.sampler.clone();
        let Population {
            provider_id,
            context_id,
            max_samples,
            ..
        } = population;

        // Dropping this future cancels the blocking scan at its next
        // checkpoint instead of letting it run to completion unobserved.
        let cancel = CancellationToken::new();
        let _guard = cancel.clone().drop_guard();
        tokio::task::spawn_blocking(move || {
            sampler.sample(&cancel, &provider_id, &context_id, seed, max_samples)
        })
        .await
        .map_err(|e| RandexError::Task(e.to_string()))?
    }
}

#[async_trait]
impl Indexer for SamplingStore {
    async fn get(&self, multihash: &Multihash) -> Result<Option<Vec<IndexRecord>>> {
        self.delegate.get(multihash).await
    }

    async fn put(&self, record: IndexRecord, multihashes: &[Multihash]) -> Result<()> {
        self.ensure_open()?;
        // Delegate first: the sampling population must never contain
        // identifiers absent from the authoritative index.
        self.delegate.put(record.clone(), multihashes).await?;

        let writer = self.writer.clone();
        let multihashes = multihashes.to_vec();
        let cancel = CancellationToken::new();
        let _guard = cancel.clone().drop_guard();
        let appended = tokio::task::spawn_blocking(move || {
            writer.append(&cancel, &record, &multihashes)
        })
        .await
        .map_err(|e| RandexError::Task(e.to_string()))?;

        match appended {
            Ok(_) => Ok(()),
            Err(e) => {
                // The delegate write stands; the pair is under-represented in
                // samples until an operator reconciles.
                tracing::warn!(error = %e, "manifest append failed after delegate write");
                Err(RandexError::ManifestAppend(Box::new(e)))
            }
        }
    }

    async fn remove(&self, record: &IndexRecord, multihashes: &[Multihash]) -> Result<()> {
        // Delegated only. Manifest batches are immutable; removing a single
        // identifier would mean rewriting a batch, which is out of scope by
        // design. Use remove_provider_context to shrink the population.
        self.delegate.remove(record, multihashes).await
    }

    async fn remove_provider(&self, provider: &ProviderId) -> Result<()> {
        self.delegate.remove_provider(provider).await?;
        self.remove_manifest_dir(self.layout.provider_dir(provider))
            .await
    }

    async fn remove_provider_context(
        &self,
        provider: &ProviderId,
        context: &ContextId,
    ) -> Result<()> {
        self.delegate.remove_provider_context(provider, context).await?;
        self.remove_manifest_dir(self.layout.context_dir(provider, context))
            .await
    }

    async fn size(&self) -> Result<u64> {
        self.delegate.size().await
    }

    async fn flush(&self) -> Result<()> {
        self.delegate.flush().await
    }

    async fn iter(&self) -> Result<IndexIter> {
        self.delegate.iter().await
    }

    async fn stats(&self) -> Result<IndexStats> {
        self.delegate.stats().await
    }

    /// Release the sampling side, then close the delegate. After this every
    /// `put` and `sample` fails with [`RandexError::Closed`].
    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        self.delegate.close().await
    }
}
