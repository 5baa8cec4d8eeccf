//! Bounded reservoir sampling over manifest batches.
//!
//! Algorithm R, streaming: batches are read one row at a time in file-name
//! order, so the scan never materializes the full population and the result
//! is a pure function of (population contents, seed, max_count). A missing
//! manifest directory means no prior writes and yields an empty sample.

use std::fs::File;
use std::io;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::RowAccessor;
use tokio_util::sync::CancellationToken;

use crate::error::{RandexError, Result};
use crate::layout::ManifestLayout;
use crate::types::{ContextId, Multihash, ProviderId};

/// How many rows to stream between cancellation checks.
const CANCEL_CHECK_ROWS: usize = 4096;

#[derive(Debug, Clone)]
pub struct ReservoirSampler {
    layout: ManifestLayout,
}

impl ReservoirSampler {
    pub fn new(layout: ManifestLayout) -> Self {
        Self { layout }
    }

    /// Draw at most `max_count` content identifiers from everything written
    /// for the pair. The same seed against the same batch set reproduces the
    /// same draw; a population smaller than `max_count` is returned whole.
    pub fn sample(
        &self,
        cancel: &CancellationToken,
        provider: &ProviderId,
        context: &ContextId,
        seed: i32,
        max_count: usize,
    ) -> Result<Vec<Multihash>> {
        let dir = self.layout.context_dir(provider, context);
        let batches = self.layout.list_batches(&dir)?;

        let mut rng = Pcg32::seed_from_u64(u64::from(seed as u32));
        let mut reservoir: Vec<Multihash> = Vec::with_capacity(max_count.min(64));
        let mut seen: u64 = 0;

        for path in batches {
            if cancel.is_cancelled() {
                return Err(RandexError::Cancelled);
            }
            // A batch deleted between listing and open (a concurrent
            // provider removal) simply drops out of the population.
            let file = match File::open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            let reader = SerializedFileReader::new(file)?;
            for (i, row) in reader.get_row_iter(None)?.enumerate() {
                if i % CANCEL_CHECK_ROWS == 0 && cancel.is_cancelled() {
                    return Err(RandexError::Cancelled);
                }
                let row = row?;
                let multihash = Multihash::from(row.get_bytes(0)?.data().to_vec());
                if reservoir.len() < max_count {
                    reservoir.push(multihash);
                } else {
                    let j = rng.gen_range(0..=seen);
                    if (j as usize) < max_count {
                        reservoir[j as usize] = multihash;
                    }
                }
                seen += 1;
            }
        }

        tracing::debug!(
            provider = %provider,
            context = %context.encoded(),
            population = seen,
            samples = reservoir.len(),
            "sampled manifest"
        );
        Ok(reservoir)
    }
}
