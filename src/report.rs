//! Selection reports and output tables.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use crate::policy::diffusion::quantize_float;
use crate::selector::{GreedySelector, SearchStats, Selection};
use crate::snapshot::GraphSnapshot;
use crate::store::GraphModel;
use crate::types::{NodeId, TrialResult};

/// A completed selection with provenance.
///
/// `fingerprint` covers the chosen ids, the graph snapshot, both policy
/// hashes and the quantized mean score, so two reports with the same
/// fingerprint describe the same decision on the same data. The
/// timestamp and search statistics are not covered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionReport {
    /// Chosen influencer ids (sorted).
    pub selected: Vec<NodeId>,
    /// Total cost of the chosen set.
    pub total_cost: f64,
    /// Budget the search ran with; `None` when unlimited.
    pub budget: Option<f64>,
    /// Aggregated simulation result of the chosen set.
    pub result: TrialResult,
    /// Search statistics.
    pub stats: SearchStats,
    /// Snapshot id of the graph searched.
    pub snapshot_id: String,
    /// Diffusion policy id.
    pub diffusion_policy_id: String,
    /// Diffusion policy parameter hash.
    pub diffusion_params_hash: String,
    /// Search policy id.
    pub search_policy_id: String,
    /// Search policy parameter hash.
    pub search_params_hash: String,
    /// Deterministic fingerprint of the decision.
    pub fingerprint: String,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    selected: &'a [NodeId],
    snapshot_id: &'a str,
    diffusion_params_hash: &'a str,
    search_params_hash: &'a str,
    mean_score: i64,
}

impl SelectionReport {
    /// Package a selection made by `selector` on the graph described by
    /// `snapshot`.
    pub fn new<G: GraphModel + ?Sized>(
        selection: Selection,
        selector: &GreedySelector<'_, G>,
        snapshot: &GraphSnapshot,
    ) -> Self {
        let diffusion = selector.diffusion();
        let search = selector.search();
        let selected = selection.set.sorted_members();
        let diffusion_params_hash = diffusion.params_hash();
        let search_params_hash = search.params_hash();

        let fingerprint = canonical_hash_hex(&FingerprintInput {
            selected: &selected,
            snapshot_id: &snapshot.snapshot_id,
            diffusion_params_hash: &diffusion_params_hash,
            search_params_hash: &search_params_hash,
            mean_score: quantize_float(selection.result.mean_score),
        });

        Self {
            total_cost: selection.set.total_cost(),
            budget: Some(selection.set.budget()).filter(|b| b.is_finite()),
            selected,
            result: selection.result,
            stats: selection.stats,
            snapshot_id: snapshot.snapshot_id.clone(),
            diffusion_policy_id: diffusion.policy_id().to_string(),
            diffusion_params_hash,
            search_policy_id: search.policy_id().to_string(),
            search_params_hash,
            fingerprint,
            created_at: Utc::now(),
        }
    }

    /// Mean exposure score of the chosen set.
    pub fn score(&self) -> f64 {
        self.result.mean_score
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Write selected ids as a one-column table with a `user_id` header,
/// sorted ascending.
pub fn write_selection_csv<W: Write>(mut writer: W, selected: &[NodeId]) -> io::Result<()> {
    let mut sorted = selected.to_vec();
    sorted.sort_unstable();
    writeln!(writer, "user_id")?;
    for id in sorted {
        writeln!(writer, "{id}")?;
    }
    writer.flush()
}
