//! Graph snapshot identity for reproducible selections.
//!
//! A `GraphSnapshot` fingerprints the loaded graph before any search
//! runs, so a report can prove which dataset it was computed against.

use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_hash_hex, to_canonical_bytes};
use crate::policy::diffusion::quantize_float;
use crate::store::SocialGraph;
use crate::types::{NodeId, Role};
use crate::EXPOSURE_KERNEL_SCHEMA_VERSION;

/// A deterministic fingerprint of the graph state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Unique identifier for this snapshot (xxh64 of all components).
    pub snapshot_id: String,
    /// Total number of nodes.
    pub node_count: u64,
    /// Total number of undirected edges.
    pub edge_count: u64,
    /// Number of influencers.
    pub influencer_count: u64,
    /// Number of haters.
    pub hater_count: u64,
    /// Schema version used for types.
    pub schema_version: String,
    /// Hash of sorted node ids with roles and quantized attributes.
    pub node_hash: String,
    /// Hash of sorted (low, high) edge pairs.
    pub edge_pair_hash: String,
    /// Unix timestamp when this snapshot was computed.
    pub computed_at: i64,
}

#[derive(Serialize)]
struct NodeRecord {
    id: NodeId,
    role: Role,
    cost: Option<i64>,
    hater_weight: i64,
}

/// Internal struct for computing snapshot_id hash.
#[derive(Serialize)]
struct SnapshotIdInput<'a> {
    node_count: u64,
    edge_count: u64,
    influencer_count: u64,
    hater_count: u64,
    schema_version: &'a str,
    node_hash: &'a str,
    edge_pair_hash: &'a str,
}

impl GraphSnapshot {
    /// Compute a snapshot of a graph.
    ///
    /// The snapshot ID covers counts, the schema version, every node's
    /// role and attributes, and every edge. It does not cover
    /// `computed_at`.
    pub fn compute(graph: &SocialGraph) -> Self {
        let records: Vec<NodeRecord> = graph
            .all_nodes()
            .map(|node| NodeRecord {
                id: node.id,
                role: node.role,
                cost: node.cost.map(quantize_float),
                hater_weight: quantize_float(node.hater_weight),
            })
            .collect();
        let node_hash = canonical_hash_hex(&records);
        let edge_pair_hash = canonical_hash_hex(&graph.all_edges());

        let node_count = records.len() as u64;
        let edge_count = graph.all_edges().len() as u64;
        let influencer_count = records.iter().filter(|r| r.role == Role::Influencer).count() as u64;
        let hater_count = graph.haters().len() as u64;

        let snapshot_id = canonical_hash_hex(&SnapshotIdInput {
            node_count,
            edge_count,
            influencer_count,
            hater_count,
            schema_version: EXPOSURE_KERNEL_SCHEMA_VERSION,
            node_hash: &node_hash,
            edge_pair_hash: &edge_pair_hash,
        });

        Self {
            snapshot_id,
            node_count,
            edge_count,
            influencer_count,
            hater_count,
            schema_version: EXPOSURE_KERNEL_SCHEMA_VERSION.to_string(),
            node_hash,
            edge_pair_hash,
            computed_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Serialize to canonical JSON bytes.
    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        to_canonical_bytes(self)
    }

    /// Verify that this snapshot matches a graph.
    pub fn verify(&self, graph: &SocialGraph) -> bool {
        self.snapshot_id == Self::compute(graph).snapshot_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::GraphBuilder;

    fn id(n: u64) -> NodeId {
        NodeId::new(n)
    }

    fn build(cost: f64) -> SocialGraph {
        let mut builder = GraphBuilder::new();
        builder.add_influencer(id(1), cost).unwrap();
        builder.add_hater(id(2), 0.3).unwrap();
        builder.add_edge(id(1), id(2)).unwrap();
        builder.add_edge(id(2), id(3)).unwrap();
        builder.build()
    }

    #[test]
    fn test_snapshot_determinism() {
        let a = GraphSnapshot::compute(&build(1.0));
        let b = GraphSnapshot::compute(&build(1.0));
        assert_eq!(a.snapshot_id, b.snapshot_id);
        assert_eq!(a.node_count, 3);
        assert_eq!(a.edge_count, 2);
        assert_eq!(a.influencer_count, 1);
        assert_eq!(a.hater_count, 1);
        assert!(a.verify(&build(1.0)));
    }

    #[test]
    fn test_snapshot_changes_with_attributes() {
        let a = GraphSnapshot::compute(&build(1.0));
        let b = GraphSnapshot::compute(&build(2.0));
        assert_ne!(a.snapshot_id, b.snapshot_id);
        assert_eq!(a.edge_pair_hash, b.edge_pair_hash);
        assert!(!a.verify(&build(2.0)));
    }
}
