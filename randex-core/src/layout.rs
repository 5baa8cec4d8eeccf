//! On-disk manifest layout.
//!
//! Maps a (provider, context) pair to a stable directory under the configured
//! root: the provider's canonical string is the first segment, the URL-safe
//! base64 form of the context the second. The mapping is a pure function, so
//! batches written by earlier calls are found by later sampling and removal
//! calls issued with the same identifiers.

use std::io;
use std::path::{Path, PathBuf};

use crate::types::{ContextId, ProviderId};

/// File extension of immutable manifest batches. Everything else in a
/// manifest directory (temp files in particular) is ignored by scans.
pub const BATCH_EXTENSION: &str = "parquet";

#[derive(Debug, Clone)]
pub struct ManifestLayout {
    root: PathBuf,
}

impl ManifestLayout {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every context's manifests for one provider.
    pub fn provider_dir(&self, provider: &ProviderId) -> PathBuf {
        self.root.join(provider.as_str())
    }

    /// Manifest directory for one (provider, context) pair.
    pub fn context_dir(&self, provider: &ProviderId, context: &ContextId) -> PathBuf {
        self.provider_dir(provider).join(context.encoded())
    }

    /// Batch files currently present in a manifest directory, sorted by file
    /// name so scans see a deterministic order. A missing directory means no
    /// prior writes and yields an empty list.
    pub fn list_batches(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let mut batches = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(BATCH_EXTENSION) {
                batches.push(path);
            }
        }
        batches.sort();
        Ok(batches)
    }
}
