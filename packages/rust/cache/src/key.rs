//! Content-addressed cache keys.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of digest bytes kept in a key (128 bits).
const KEY_BYTES: usize = 16;

/// Opaque identifier of a cacheable unit of content.
///
/// Keys built with [`CacheKey::for_query`] are always 32 lowercase hex
/// characters. Keys built from caller-supplied strings are taken as-is and
/// may be empty; the batch coordinator rejects empty keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Hash a query's text and parameters into a key.
    ///
    /// Top-level parameter names are sorted before hashing, so equal
    /// parameter objects always hash the same.
    pub fn for_query(query: &str, params: &serde_json::Value) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(query.as_bytes());
        hasher.update([0u8]);
        hasher.update(canonical_params(params).as_bytes());
        let digest = hasher.finalize();

        let mut hex = String::with_capacity(KEY_BYTES * 2);
        for byte in &digest[..KEY_BYTES] {
            let _ = write!(hex, "{byte:02x}");
        }
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

fn canonical_params(params: &serde_json::Value) -> String {
    match params {
        serde_json::Value::Object(map) => {
            let sorted: BTreeMap<&String, &serde_json::Value> = map.iter().collect();
            serde_json::to_string(&sorted).unwrap_or_default()
        }
        other => other.to_string(),
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}
