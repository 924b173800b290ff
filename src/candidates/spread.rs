//! Spreadness: how far apart the members of a group sit in the graph.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::store::{GraphError, GraphModel};
use crate::types::NodeId;

/// Average shortest-path hop distance over the connected pairs of a group.
///
/// Returns `Some(0.0)` for groups with fewer than two distinct members and
/// `None` when no pair of members is connected.
pub fn spreadness<G: GraphModel + ?Sized>(graph: &G, group: &[NodeId]) -> Result<Option<f64>, GraphError> {
    let members: BTreeSet<NodeId> = group.iter().copied().collect();
    for &id in &members {
        if !graph.contains(id) {
            return Err(GraphError::UnknownNode(id));
        }
    }
    if members.len() < 2 {
        return Ok(Some(0.0));
    }

    let mut total_dist = 0u64;
    let mut pairs = 0u64;

    // One BFS per member; each pair is counted from its lower endpoint.
    for &source in &members {
        let mut remaining = members.range(source..).skip(1).count();
        if remaining == 0 {
            break;
        }

        let mut dist: BTreeMap<NodeId, u64> = BTreeMap::new();
        let mut queue = VecDeque::new();
        dist.insert(source, 0);
        queue.push_back(source);

        while let Some(v) = queue.pop_front() {
            let d = dist[&v];
            for &w in graph.neighbors(v)? {
                if dist.contains_key(&w) {
                    continue;
                }
                dist.insert(w, d + 1);
                if w > source && members.contains(&w) {
                    total_dist += d + 1;
                    pairs += 1;
                    remaining -= 1;
                }
                queue.push_back(w);
            }
            if remaining == 0 {
                break;
            }
        }
    }

    if pairs == 0 {
        return Ok(None);
    }
    Ok(Some(total_dist as f64 / pairs as f64))
}
