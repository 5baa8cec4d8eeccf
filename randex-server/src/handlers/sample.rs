//! Sampling handler
//!
//! Handles GET /ipni/v0/sample/{provider_id}/{context_id}: parses and
//! validates the path and query into a sampling population, generates a
//! beacon when the caller supplies none, and renders the drawn content
//! identifiers as JSON.

use axum::extract::{Path, Query, State};
use axum::Json;
use rand::rngs::OsRng;
use rand::RngCore;
use randex_core::{
    ContextId, Multihash, Population, ProviderId, Sampler, MAX_BEACON_BYTES, MAX_SAMPLE_COUNT,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::state::AppState;

/// Sample count used when the caller does not ask for one.
const DEFAULT_MAX_SAMPLES: usize = 1;

/// Query parameters of a sampling request. Parsed leniently as strings so
/// every rejection carries a JSON error body instead of an extractor default.
#[derive(Deserialize)]
pub struct SampleParams {
    /// Hex-encoded beacon, 1..=32 bytes once decoded.
    beacon: Option<String>,
    /// Maximum sample count, 1..=10.
    max: Option<String>,
    /// Federation epoch, forwarded for forward compatibility.
    federation_epoch: Option<String>,
}

/// Response for a sampling query.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SampleResponse {
    /// Sampled content identifiers, base58btc-encoded.
    #[schema(value_type = Vec<String>, example = json!(["QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG"]))]
    pub samples: Vec<Multihash>,
}

/// Draw a verifiable random sample of the content identifiers a provider
/// has advertised under a context.
///
/// The context identifier path segment is URL-safe base64. The caller may
/// pin the draw with a hex-encoded `beacon`; otherwise the service draws a
/// uniformly random 32-byte beacon for this request.
#[utoipa::path(
    get,
    path = "/ipni/v0/sample/{provider_id}/{context_id}",
    params(
        ("provider_id" = String, Path, description = "Provider identity in canonical base58 form"),
        ("context_id" = String, Path, description = "URL-safe base64 context identifier"),
        ("beacon" = Option<String>, Query, description = "Hex-encoded beacon, 1 to 32 bytes"),
        ("max" = Option<String>, Query, description = "Maximum sample count, 1 to 10 (default 1)"),
        ("federation_epoch" = Option<String>, Query, description = "Reserved; forwarded, not yet consumed")
    ),
    responses(
        (status = 200, description = "Sampled content identifiers", body = SampleResponse),
        (status = 400, description = "Malformed provider, context, beacon, max or federation epoch"),
        (status = 500, description = "Sampling failed")
    ),
    tag = "sample"
)]
pub async fn sample_handler(
    State(state): State<AppState>,
    Path((provider_id, context_id)): Path<(String, String)>,
    Query(params): Query<SampleParams>,
) -> Result<Json<SampleResponse>, ApiError> {
    let provider_id = ProviderId::parse(&provider_id)
        .map_err(|_| ApiError::bad_request("invalid provider ID"))?;
    let context_id =
        ContextId::decode(&context_id).map_err(|_| ApiError::bad_request("invalid context ID"))?;

    let beacon = match &params.beacon {
        Some(encoded) => {
            let beacon = hex::decode(encoded).map_err(|_| invalid_beacon())?;
            if beacon.is_empty() || beacon.len() > MAX_BEACON_BYTES {
                return Err(invalid_beacon());
            }
            beacon
        }
        None => {
            let mut beacon = vec![0u8; MAX_BEACON_BYTES];
            OsRng
                .try_fill_bytes(&mut beacon)
                .map_err(|e| ApiError::internal(format!("beacon generation failed: {e}")))?;
            beacon
        }
    };

    let max_samples = match &params.max {
        Some(raw) => match raw.parse::<usize>() {
            Ok(max) if (1..=MAX_SAMPLE_COUNT).contains(&max) => max,
            _ => {
                return Err(ApiError::bad_request(format!(
                    "invalid max sample count: must be at least 1 and no more than {MAX_SAMPLE_COUNT}"
                )))
            }
        },
        None => DEFAULT_MAX_SAMPLES,
    };

    let federation_epoch = match &params.federation_epoch {
        Some(raw) => Some(
            raw.parse::<u64>()
                .map_err(|_| ApiError::bad_request("invalid federation epoch"))?,
        ),
        None => None,
    };

    let samples = state
        .store
        .sample(Population {
            provider_id,
            context_id,
            beacon,
            max_samples,
            federation_epoch,
        })
        .await?;

    Ok(Json(SampleResponse { samples }))
}

fn invalid_beacon() -> ApiError {
    ApiError::bad_request(format!(
        "invalid beacon: must be at least 1 and at most {MAX_BEACON_BYTES} hex encoded bytes"
    ))
}
