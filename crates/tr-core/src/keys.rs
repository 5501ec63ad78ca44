//! Object-key derivation for the two storage collections.
//!
//! The storage backend restricts object keys to `[A-Za-z0-9._-]`, while
//! callers pass identifiers drawn from multiple external systems that may
//! contain `/`, `:`, `@` and similar. Tracked-entity keys are sanitized
//! into that charset; dedup keys are hashed and hex-encoded, which lands
//! inside the charset without sanitization.

use md5::{Digest, Md5};
use regex::Regex;
use std::sync::OnceLock;

use crate::store::StoreError;

/// Maximum object-key length accepted by the storage backend.
pub const MAX_OBJECT_KEY_LEN: usize = 1000;

static KEY_CHARSET: OnceLock<Regex> = OnceLock::new();

fn disallowed_chars() -> &'static Regex {
    KEY_CHARSET.get_or_init(|| Regex::new("[^A-Za-z0-9._-]").expect("valid key charset pattern"))
}

/// Replaces every character outside `[A-Za-z0-9._-]` with `_` and enforces
/// the backend's length limit.
///
/// The replacement is total on the character domain, so distinct inputs
/// that differ only in disallowed characters may collide.
pub fn sanitize_object_key(input: &str) -> Result<String, StoreError> {
    let sanitized = disallowed_chars().replace_all(input, "_").into_owned();

    if sanitized.len() > MAX_OBJECT_KEY_LEN {
        return Err(StoreError::KeyTooLong(sanitized.len()));
    }

    Ok(sanitized)
}

/// Derives the tracked-entities key for an `(external_system_id,
/// internal_entity_id)` pair.
pub fn tracked_entity_key(
    external_system_id: &str,
    internal_entity_id: &str,
) -> Result<String, StoreError> {
    sanitize_object_key(&format!("{}.{}", external_system_id, internal_entity_id))
}

/// Derives the dedup-store key for a composite dedup identity within one
/// bucket window.
///
/// MD5 is used as a deterministic keying hash here, not as a security
/// primitive; the hex digest is already within the permitted key charset.
pub fn dedup_key(
    internal_entity_id: &str,
    dedup_obj_type: &str,
    dedup_obj_id: &str,
    bucket_label: &str,
) -> String {
    let combined = [
        internal_entity_id,
        dedup_obj_type,
        dedup_obj_id,
        bucket_label,
    ]
    .join(":");

    hex::encode(Md5::digest(combined.as_bytes()))
}
