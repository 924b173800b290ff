//! Canonical serialization for deterministic fingerprints.
//!
//! Policies, graph snapshots and selection reports are fingerprinted by
//! hashing their canonical JSON bytes with xxh64.
//!
//! ## Determinism Guarantees
//!
//! - Struct fields serialize in declaration order
//! - Vectors serialize in index order
//! - Maps in hashed data are BTreeMap, never HashMap
//! - Floats that feed a hash are quantized first (see `policy`)

use serde::Serialize;
use xxhash_rust::xxh64::{xxh64, Xxh64};

use crate::types::NodeId;

/// Serialize a value to canonical JSON bytes.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("Canonical serialization failed")
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    let bytes = to_canonical_bytes(value);
    xxh64(&bytes, 0)
}

/// Compute canonical hash and return as hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}

/// Order-independent hash of a set of node ids.
///
/// Used as the evaluation cache key, so it avoids the JSON round trip.
pub fn node_set_hash(ids: &[NodeId], salt: u64) -> u64 {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    let mut hasher = Xxh64::new(salt);
    for id in sorted {
        hasher.update(&id.as_u64().to_le_bytes());
    }
    hasher.digest()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct TestStruct {
        name: String,
        value: i32,
    }

    #[test]
    fn test_determinism() {
        let s = TestStruct {
            name: "test".to_string(),
            value: 42,
        };

        let h1 = canonical_hash(&s);
        let h2 = canonical_hash(&s);
        assert_eq!(h1, h2);
        assert_eq!(canonical_hash_hex(&s).len(), 16);
    }

    #[test]
    fn test_node_set_hash_order_independent() {
        let a = [NodeId::new(3), NodeId::new(1), NodeId::new(2)];
        let b = [NodeId::new(1), NodeId::new(2), NodeId::new(3)];
        assert_eq!(node_set_hash(&a, 7), node_set_hash(&b, 7));
        assert_ne!(node_set_hash(&a, 7), node_set_hash(&a, 8));
        assert_ne!(node_set_hash(&a, 7), node_set_hash(&a[..2], 7));
    }
}
