//! Golden tests for the exposure kernel.
//!
//! These tests pin down the diffusion rule and the selection contract on
//! small graphs whose outcome can be worked out by hand.

use exposure_kernel::{
    select, CandidateSet, DiffusionPolicy, DiffusionSimulator, GraphBuilder, GraphModel,
    GreedySelector, NodeId, SearchPolicy, SocialGraph,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn id(n: u64) -> NodeId {
    NodeId::new(n)
}

fn rng() -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(42)
}

/// A(1) and B(2) are influencers of cost 1, C(3) is a hater, D(4) is a
/// plain user. Edges: A - D, B - C.
fn build_scenario_graph() -> SocialGraph {
    let mut builder = GraphBuilder::new();
    builder.add_influencer(id(1), 1.0).unwrap();
    builder.add_influencer(id(2), 1.0).unwrap();
    builder.add_hater(id(3), 0.0).unwrap();
    builder.add_node(id(4));
    builder.add_edge(id(1), id(4)).unwrap();
    builder.add_edge(id(2), id(3)).unwrap();
    builder.build()
}

//      10(h)     11(h)
//      /   \    /   \
//     1     2 ─┘     3
fn build_hater_fringe_graph() -> SocialGraph {
    let mut builder = GraphBuilder::new();
    for n in 1..=3 {
        builder.add_influencer(id(n), 1.0).unwrap();
    }
    builder.add_hater(id(10), 0.0).unwrap();
    builder.add_hater(id(11), 0.0).unwrap();
    builder.add_edge(id(1), id(10)).unwrap();
    builder.add_edge(id(2), id(10)).unwrap();
    builder.add_edge(id(2), id(11)).unwrap();
    builder.add_edge(id(3), id(11)).unwrap();
    builder.build()
}

/// Ring of `n` plain users with influencers of varying cost on every
/// third position.
fn build_ring_graph(n: u64) -> SocialGraph {
    let mut builder = GraphBuilder::new();
    for i in (0..n).step_by(3) {
        builder.add_influencer(id(i), 1.0 + (i % 4) as f64).unwrap();
    }
    for i in 0..n {
        builder.add_edge(id(i), id((i + 1) % n)).unwrap();
    }
    builder.build()
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_scenario_selects_a() {
    let graph = build_scenario_graph();
    let selector = GreedySelector::new(&graph, DiffusionPolicy::deterministic(), SearchPolicy::new(1, 10));
    let selection = selector.select(1.0).unwrap();

    assert_eq!(selection.set.sorted_members(), vec![id(1)]);
    assert_eq!(selection.score(), 2.0);
    assert_eq!(selection.set.total_cost(), 1.0);
}

#[test]
fn test_scenario_b_alone_scores_zero() {
    let graph = build_scenario_graph();
    let sim = DiffusionSimulator::new(&graph, DiffusionPolicy::deterministic());
    let outcome = sim.run_trial(&[id(2)], &mut rng()).unwrap();
    assert_eq!(outcome.active, 1);
    assert_eq!(outcome.active_haters, 1);
    assert_eq!(outcome.score, 0.0);
}

#[test]
fn test_zero_budget_returns_empty_set() {
    let graph = build_scenario_graph();
    let selector = GreedySelector::new(&graph, DiffusionPolicy::default(), SearchPolicy::default());
    let selection = selector.select(0.0).unwrap();
    assert!(selection.set.is_empty());
    assert_eq!(selection.score(), 0.0);

    let set = select(&graph, 0.0, 10, 10).unwrap();
    assert!(set.is_empty());
}

#[test]
fn test_hater_penalty_n_minus_h() {
    let graph = build_hater_fringe_graph();
    let sim = DiffusionSimulator::new(&graph, DiffusionPolicy::deterministic().with_penalty_weight(1.0));
    let set = CandidateSet::from_members(&graph, 3.0, [id(1), id(2), id(3)]).unwrap();
    let result = sim.simulate(&set, 5, &mut rng()).unwrap();

    // N = 3 seeds active, H = 2 haters reached.
    assert_eq!(result.mean_active, 3.0);
    assert_eq!(result.haters.max, 2);
    assert_eq!(result.mean_score, 1.0);
}

#[test]
fn test_penalty_weight_scales_hater_cost() {
    let graph = build_hater_fringe_graph();
    let sim = DiffusionSimulator::new(&graph, DiffusionPolicy::deterministic().with_penalty_weight(2.5));
    let outcome = sim.run_trial(&[id(1), id(2), id(3)], &mut rng()).unwrap();
    assert_eq!(outcome.score, 3.0 - 2.5 * 2.0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Determinism Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_deterministic_rule_is_idempotent() {
    let graph = build_ring_graph(12);
    let sim = DiffusionSimulator::new(&graph, DiffusionPolicy::deterministic());
    let set = CandidateSet::from_members(&graph, 10.0, [id(0), id(6)]).unwrap();

    let a = sim.simulate(&set, 1, &mut ChaCha20Rng::seed_from_u64(1)).unwrap();
    let b = sim.simulate(&set, 1, &mut ChaCha20Rng::seed_from_u64(2)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.mean_active, 12.0);
}

#[test]
fn test_stochastic_rule_is_reproducible_with_seed() {
    let graph = build_ring_graph(30);
    let sim = DiffusionSimulator::new(&graph, DiffusionPolicy::new(0.4, 1.0, None));
    let set = CandidateSet::from_members(&graph, 10.0, [id(0), id(15)]).unwrap();

    let a = sim.simulate(&set, 100, &mut rng()).unwrap();
    let b = sim.simulate(&set, 100, &mut rng()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_selection_is_reproducible() {
    let graph = build_ring_graph(30);
    let search = SearchPolicy::new(30, 20).with_restarts(2);
    let run = || {
        GreedySelector::new(&graph, DiffusionPolicy::new(0.3, 1.0, None), search.clone())
            .select(6.0)
            .unwrap()
    };
    let a = run();
    let b = run();
    assert_eq!(a.set.sorted_members(), b.set.sorted_members());
    assert_eq!(a.result, b.result);
    assert_eq!(a.stats.passes, b.stats.passes);
}

#[test]
fn test_round_bound_limits_reach() {
    let graph = build_ring_graph(12);
    let policy = DiffusionPolicy::deterministic().with_max_rounds(Some(2));
    let sim = DiffusionSimulator::new(&graph, policy);
    let outcome = sim.run_trial(&[id(0)], &mut rng()).unwrap();
    // Two hops in both directions around the ring.
    assert_eq!(outcome.active, 5);
    assert_eq!(outcome.rounds, 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// Property Tests
// ─────────────────────────────────────────────────────────────────────────────

/// Graph without edges: `influencers` nodes of cost 1 followed by
/// `haters` hater nodes.
fn build_edgeless_graph(influencers: u64, haters: u64) -> SocialGraph {
    let mut builder = GraphBuilder::new();
    for n in 0..influencers {
        builder.add_influencer(id(n), 1.0).unwrap();
    }
    for n in influencers..influencers + haters {
        builder.add_hater(id(n), 0.5).unwrap();
    }
    builder.build()
}

fn build_random_graph(costs: &[f64], edges: &[(u64, u64)]) -> SocialGraph {
    let mut builder = GraphBuilder::new();
    for (n, cost) in costs.iter().enumerate() {
        builder.add_influencer(id(n as u64), *cost).unwrap();
    }
    builder.add_hater(id(20), 0.3).unwrap();
    for &(a, b) in edges {
        if a != b && !builder.contains_edge(id(a), id(b)) {
            builder.add_edge(id(a), id(b)).unwrap();
        }
    }
    builder.build()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_zero_edges_activates_exactly_the_seeds(
        influencers in 1u64..8,
        haters in 0u64..4,
        mask in proptest::collection::vec(any::<bool>(), 12),
        p in 0.0f64..=1.0,
        penalty in 0.0f64..3.0,
    ) {
        let graph = build_edgeless_graph(influencers, haters);
        let seeds: Vec<NodeId> = (0..influencers + haters)
            .filter(|n| mask[*n as usize])
            .map(id)
            .collect();
        let seeded_haters = seeds.iter().filter(|s| s.as_u64() >= influencers).count();

        let sim = DiffusionSimulator::new(&graph, DiffusionPolicy::new(p, penalty, None));
        let (state, rounds) = sim.propagate(&seeds, &mut rng()).unwrap();
        prop_assert_eq!(state.activated(), seeds.clone());
        prop_assert_eq!(rounds, 0);

        let outcome = sim.run_trial(&seeds, &mut rng()).unwrap();
        let expected = (seeds.len() - seeded_haters) as f64 - penalty * seeded_haters as f64;
        prop_assert!((outcome.score - expected).abs() < 1e-9);
    }

    #[test]
    fn prop_selection_respects_budget(
        costs in proptest::collection::vec(0.0f64..5.0, 1..7),
        edges in proptest::collection::vec((0u64..12, 0u64..12), 0..20),
        extra_edges in proptest::collection::vec(0u64..12, 0..3),
        budget in 0.0f64..10.0,
    ) {
        let mut all_edges = edges;
        all_edges.extend(extra_edges.into_iter().map(|n| (20, n)));
        let graph = build_random_graph(&costs, &all_edges);

        let search = SearchPolicy::new(4, 10).with_restarts(1);
        let selector = GreedySelector::new(&graph, DiffusionPolicy::new(0.3, 1.0, None), search);
        let selection = selector.select(budget).unwrap();

        let total: f64 = selection.set.members().iter().map(|m| graph.cost(*m).unwrap()).sum();
        prop_assert!(total <= budget);
        prop_assert!(selection.set.members().iter().all(|m| graph.influencers().contains(m)));

        let mut sorted = selection.set.sorted_members();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), selection.set.len());
    }
}
