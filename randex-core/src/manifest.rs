//! Append-only manifest batches.
//!
//! Every successful `put` for a (provider, context) pair lands as one
//! immutable parquet file in that pair's manifest directory: a single binary
//! column of content identifiers, zstd-compressed, with the provider string,
//! encoded context and metadata blob embedded as key/value tags so each batch
//! is self-describing. Batches are written to a hidden temp name and renamed
//! into place, so a concurrent scan never observes a half-written file and a
//! failed append leaves earlier batches untouched.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64_STD;
use base64::Engine;
use chrono::Utc;
use parquet::basic::{Compression, ZstdLevel};
use parquet::data_type::{ByteArray, ByteArrayType};
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::parser::parse_message_type;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{RandexError, Result};
use crate::layout::{ManifestLayout, BATCH_EXTENSION};
use crate::types::{IndexRecord, Multihash};

/// Parquet schema of a manifest batch: one required binary column.
const BATCH_SCHEMA: &str = "message manifest { required binary multihash; }";

/// Key/value tags embedded in every batch.
const TAG_PROVIDER_ID: &str = "ProviderID";
const TAG_CONTEXT_ID: &str = "ContextID";
const TAG_METADATA: &str = "Metadata";

#[derive(Debug, Clone)]
pub struct ManifestWriter {
    layout: ManifestLayout,
}

impl ManifestWriter {
    pub fn new(layout: ManifestLayout) -> Self {
        Self { layout }
    }

    /// Append one immutable batch for the record's (provider, context) pair,
    /// creating the manifest directory on first write.
    ///
    /// The batch name combines a microsecond timestamp with a UUID so
    /// concurrent writes to the same pair cannot collide. Cancellation before
    /// the final rename aborts the append without leaving a visible batch.
    pub fn append(
        &self,
        cancel: &CancellationToken,
        record: &IndexRecord,
        multihashes: &[Multihash],
    ) -> Result<PathBuf> {
        if cancel.is_cancelled() {
            return Err(RandexError::Cancelled);
        }

        let dir = self
            .layout
            .context_dir(&record.provider_id, &record.context_id);
        std::fs::create_dir_all(&dir)?;

        let name = format!(
            "{}-{}.{}",
            Utc::now().timestamp_micros(),
            Uuid::new_v4().simple(),
            BATCH_EXTENSION
        );
        let tmp = dir.join(format!(".{name}.tmp"));
        let out = dir.join(&name);

        if let Err(e) = write_batch(&tmp, record, multihashes) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }

        // Last checkpoint before the batch becomes visible to scans.
        if cancel.is_cancelled() {
            let _ = std::fs::remove_file(&tmp);
            return Err(RandexError::Cancelled);
        }
        std::fs::rename(&tmp, &out)?;

        tracing::debug!(
            provider = %record.provider_id,
            context = %record.context_id.encoded(),
            batch = %name,
            multihashes = multihashes.len(),
            "appended manifest batch"
        );
        Ok(out)
    }
}

fn write_batch(path: &Path, record: &IndexRecord, multihashes: &[Multihash]) -> Result<()> {
    let schema = Arc::new(parse_message_type(BATCH_SCHEMA)?);
    let tags = vec![
        KeyValue {
            key: TAG_PROVIDER_ID.to_string(),
            value: Some(record.provider_id.to_string()),
        },
        KeyValue {
            key: TAG_CONTEXT_ID.to_string(),
            value: Some(record.context_id.encoded()),
        },
        KeyValue {
            key: TAG_METADATA.to_string(),
            value: Some(BASE64_STD.encode(&record.metadata)),
        },
    ];
    let props = Arc::new(
        WriterProperties::builder()
            .set_compression(Compression::ZSTD(ZstdLevel::try_new(3)?))
            .set_key_value_metadata(Some(tags))
            .build(),
    );

    let file = File::create(path)?;
    let mut writer = SerializedFileWriter::new(file, schema, props)?;
    let mut row_group = writer.next_row_group()?;
    if let Some(mut column) = row_group.next_column()? {
        let values: Vec<ByteArray> = multihashes
            .iter()
            .map(|mh| ByteArray::from(mh.as_bytes().to_vec()))
            .collect();
        column
            .typed::<ByteArrayType>()
            .write_batch(&values, None, None)?;
        column.close()?;
    }
    row_group.close()?;
    writer.close()?;
    Ok(())
}
