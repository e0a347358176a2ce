//! Cache key derivation.
//!
//! A key is the SHA-256 digest of the canonical query serialized as JSON.
//! Struct fields serialize in declaration order and every list is sorted by
//! [`QueryParams::canonical`], so equal queries always produce equal bytes.

use eventdeck_providers::QueryParams;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Search-only inputs that change the manual event filter without
/// appearing in [`QueryParams`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchFlags {
    /// The caller typed a start date.
    pub explicit_start: bool,
    /// The caller typed an end date.
    pub explicit_end: bool,
}

#[derive(Serialize)]
struct KeyInput<'a> {
    params: &'a QueryParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<SearchFlags>,
}

/// Returns the canonical JSON bytes of a query.
pub fn canonical_json(params: &QueryParams, search: Option<SearchFlags>) -> Vec<u8> {
    let canonical = params.canonical();
    let input = KeyInput {
        params: &canonical,
        search,
    };
    // Serializing plain data with string keys cannot fail
    serde_json::to_vec(&input).unwrap_or_default()
}

/// Returns the hex-encoded cache key of a query.
pub fn cache_key(params: &QueryParams, search: Option<SearchFlags>) -> String {
    let digest = Sha256::digest(canonical_json(params, search));
    format!("{:x}", digest)
}
