//! Deterministic beacon-to-seed derivation.
//!
//! The verifier supplies a short random beacon; sampling must be a pure
//! function of it. The beacon is folded into the two 64-bit seed words of a
//! PCG generator so that all of its entropy participates, and one
//! non-negative 32-bit value is drawn as the sampler seed. No cryptographic
//! unpredictability is required here: the beacon itself is assumed
//! unpredictable until the caller reveals it.

use rand::RngCore;
use rand_pcg::Pcg32;

use crate::error::{RandexError, Result};
use crate::types::MAX_BEACON_BYTES;

/// Derive the sampler seed from a 1..=32 byte beacon.
///
/// Identical beacons always produce identical seeds; beacons differing in any
/// byte are overwhelmingly likely to produce different seeds.
pub fn derive_seed(beacon: &[u8]) -> Result<i32> {
    let len = beacon.len();
    if len < 1 || len > MAX_BEACON_BYTES {
        return Err(RandexError::InvalidBeacon(len));
    }

    let (left, right) = beacon.split_at(len / 2);
    let mut rng = Pcg32::new(pad_le(left), pad_le(right));
    // Keep the seed non-negative, mirroring a 31-bit draw.
    Ok((rng.next_u32() >> 1) as i32)
}

/// Zero-left-pad up to eight bytes of a beacon half into a little-endian u64.
fn pad_le(half: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    let n = half.len().min(8);
    word[8 - n..].copy_from_slice(&half[..n]);
    u64::from_le_bytes(word)
}
