/*!
 * Optimized JSON Serialization
 * Smart JSON parsing with SIMD acceleration for large payloads
 */

use serde::{de::DeserializeOwned, Serialize};

use crate::core::limits::JSON_SIMD_THRESHOLD as SIMD_THRESHOLD;

/// Result type for JSON operations
pub type JsonResult<T> = Result<T, JsonError>;

/// JSON operation errors
#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("deserialization error: {0}")]
    Deserialization(String),
}

// ============================================================================
// Serialization Functions
// ============================================================================

/// Serialize to a single-line JSON string
///
/// Envelopes are newline-delimited on the wire, so this never pretty-prints.
#[inline]
pub fn to_string<T: Serialize>(value: &T) -> JsonResult<String> {
    serde_json::to_string(value).map_err(|e| JsonError::Serialization(e.to_string()))
}

// ============================================================================
// Deserialization Functions
// ============================================================================

/// Deserialize from JSON bytes with automatic optimization
///
/// Uses SIMD-JSON for large payloads, serde_json for small ones.
#[inline]
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> JsonResult<T> {
    if bytes.len() > SIMD_THRESHOLD {
        from_slice_simd(bytes)
    } else {
        from_slice_std(bytes)
    }
}

/// Deserialize from JSON bytes using SIMD acceleration
///
/// simd-json parses in place, so the input is copied first.
#[inline]
pub fn from_slice_simd<T: DeserializeOwned>(bytes: &[u8]) -> JsonResult<T> {
    let mut mutable_bytes = bytes.to_vec();
    simd_json::from_slice(&mut mutable_bytes).map_err(|e| JsonError::Deserialization(e.to_string()))
}

/// Deserialize from JSON bytes using standard serde_json
#[inline]
pub fn from_slice_std<T: DeserializeOwned>(bytes: &[u8]) -> JsonResult<T> {
    serde_json::from_slice(bytes).map_err(|e| JsonError::Deserialization(e.to_string()))
}

/// Deserialize from JSON string with automatic optimization
#[inline]
pub fn from_str<T: DeserializeOwned>(s: &str) -> JsonResult<T> {
    from_slice(s.as_bytes())
}
