//! Self-describing value encoding.
//!
//! Isolates `serde_json` behind a narrow interface so the store and graph
//! modules never reference the encoding form directly (see SPEC_FULL.md §9,
//! "dynamic collections over dynamic maps").

use crate::error::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};

/// Encode a value to its self-describing on-disk representation.
pub fn encode<T: Serialize>(entity_type: &'static str, value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| Error::encoding(entity_type, e))
}

/// Decode a value from its self-describing on-disk representation.
pub fn decode<T: DeserializeOwned>(entity_type: &'static str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| Error::encoding(entity_type, e))
}
