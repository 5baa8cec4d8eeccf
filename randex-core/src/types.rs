//! Domain types shared by the delegate indexer surface and the sampler.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE as BASE64_URL;
use base64::Engine;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{RandexError, Result};

/// Maximum number of samples a single request may ask for.
pub const MAX_SAMPLE_COUNT: usize = 10;

/// Maximum beacon length in bytes.
pub const MAX_BEACON_BYTES: usize = 32;

/// Opaque, stringifiable identifier of a content provider.
///
/// The canonical form is a base58btc string (a peer identity in the source
/// system). The string form doubles as the first path segment of the
/// provider's manifest subtree, so it must parse cleanly before any storage
/// access happens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderId(String);

impl ProviderId {
    /// Parse and validate a provider identity from its canonical string form.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(RandexError::InvalidProviderId("empty".to_string()));
        }
        let decoded = bs58::decode(s)
            .into_vec()
            .map_err(|e| RandexError::InvalidProviderId(e.to_string()))?;
        if decoded.is_empty() {
            return Err(RandexError::InvalidProviderId("empty".to_string()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProviderId {
    type Err = RandexError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ProviderId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ProviderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(D::Error::custom)
    }
}

/// Opaque byte string distinguishing otherwise-identical advertisements from
/// the same provider. Non-empty, arbitrary length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(Vec<u8>);

impl ContextId {
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(RandexError::InvalidContextId("empty".to_string()));
        }
        Ok(Self(bytes))
    }

    /// Decode a context identifier from its URL-safe base64 wire form.
    pub fn decode(encoded: &str) -> Result<Self> {
        let bytes = BASE64_URL
            .decode(encoded)
            .map_err(|e| RandexError::InvalidContextId(e.to_string()))?;
        Self::new(bytes)
    }

    /// The reversible, filesystem-safe encoding used for directory names and
    /// request paths. Arbitrary context bytes must never introduce path
    /// separators.
    pub fn encoded(&self) -> String {
        BASE64_URL.encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A self-describing content hash, compared by byte equality.
///
/// Treated as opaque bytes: the store never inspects the hash-function tag or
/// digest, it only persists, samples and returns identifiers verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Multihash(Vec<u8>);

impl Multihash {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Multihash {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Multihash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(&self.0).into_string())
    }
}

impl FromStr for Multihash {
    type Err = RandexError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| RandexError::InvalidMultihash(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Multihash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Multihash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// One (provider, context) advertisement record, the value type of the
/// delegate indexer. The metadata blob is passed through opaquely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub provider_id: ProviderId,
    pub context_id: ContextId,
    pub metadata: Vec<u8>,
}

/// A validated sampling request: which (provider, context) manifest to draw
/// from, the random beacon fixing the draw, and how many identifiers to
/// return at most.
#[derive(Debug, Clone)]
pub struct Population {
    pub provider_id: ProviderId,
    pub context_id: ContextId,
    /// Caller-supplied randomness, 1..=32 bytes. Assumed unpredictable before
    /// the caller reveals it.
    pub beacon: Vec<u8>,
    /// 1..=[`MAX_SAMPLE_COUNT`].
    pub max_samples: usize,
    /// Reserved for filtering by advertisement freshness. Carried through,
    /// not yet consumed by the sampling logic.
    pub federation_epoch: Option<u64>,
}

impl Population {
    /// Reject malformed requests before any storage access.
    pub fn validate(&self) -> Result<()> {
        let beacon_len = self.beacon.len();
        if beacon_len < 1 || beacon_len > MAX_BEACON_BYTES {
            return Err(RandexError::InvalidBeacon(beacon_len));
        }
        if self.max_samples < 1 || self.max_samples > MAX_SAMPLE_COUNT {
            return Err(RandexError::InvalidSampleCount {
                got: self.max_samples,
                max: MAX_SAMPLE_COUNT,
            });
        }
        Ok(())
    }
}
