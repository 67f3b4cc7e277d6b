//! Routing Selection Tests
//!
//! Tests for plan selection invariants:
//! - BEST returns the first minimum of the effective costs
//! - PROBABILITY is uniform over equal costs and favors cheap plans
//! - Historical costs take over as the post-cost ratio grows
//! - Analyze mode publishes without changing the decision

use std::sync::Arc;

use polystore::observability::MetricsRegistry;
use polystore::routing::{
    calculate_probabilities, CandidatePlan, MemoryDebugSink, PlanSelectionStrategy,
    PostCostStore, RoutingConfig, RoutingErrorCode, RoutingPlanSelector, TransactionContext,
};

// =============================================================================
// Helper Functions
// =============================================================================

const DRAWS: usize = 10_000;

fn plans(classes: &[&str]) -> Vec<CandidatePlan> {
    classes
        .iter()
        .enumerate()
        .map(|(i, class)| CandidatePlan::new(format!("plan_{}", i), *class))
        .collect()
}

fn selector(ratio: f64, strategy: PlanSelectionStrategy, store: PostCostStore) -> RoutingPlanSelector {
    RoutingPlanSelector::with_seed(RoutingConfig::new(ratio, strategy), Arc::new(store), 0xC0FFEE)
        .unwrap()
}

fn frequencies(
    selector: &RoutingPlanSelector,
    plans: &[CandidatePlan],
    costs: &[f64],
) -> Vec<f64> {
    let mut hits = vec![0usize; plans.len()];
    let tx = TransactionContext::new();
    for _ in 0..DRAWS {
        hits[selector.select_index(plans, costs, &tx).unwrap()] += 1;
    }
    hits.iter().map(|h| *h as f64 / DRAWS as f64).collect()
}

// =============================================================================
// BEST Strategy Tests
// =============================================================================

/// Pre-costs [10, 5, 20] with ratio 0 select the plan costing 5.
#[test]
fn test_best_selects_minimum_pre_cost() {
    let plans = plans(&["a", "b", "c"]);
    let selector = selector(0.0, PlanSelectionStrategy::Best, PostCostStore::new());

    let sink = MemoryDebugSink::new();
    let chosen = selector
        .select_plan_based_on_costs(&plans, &[10.0, 5.0, 20.0], &TransactionContext::analyzing(&sink))
        .unwrap();
    assert_eq!(chosen.id, "plan_1");

    let record = sink.last().unwrap();
    let expected = [10.0 / 35.0, 5.0 / 35.0, 20.0 / 35.0];
    for (got, want) in record.pre_costs.iter().zip(expected) {
        assert!((got - want).abs() < 1e-9);
    }
    assert_eq!(record.effective_costs, record.pre_costs);
    assert!(record.post_costs.iter().all(|c| *c == 0.0));
}

/// Ties keep the first minimum.
#[test]
fn test_best_tie_keeps_first() {
    let plans = plans(&["a", "b", "c"]);
    let selector = selector(0.0, PlanSelectionStrategy::Best, PostCostStore::new());
    let index = selector
        .select_index(&plans, &[7.0, 3.0, 3.0], &TransactionContext::new())
        .unwrap();
    assert_eq!(index, 1);
}

/// Pure historical routing follows observed execution times.
#[test]
fn test_best_with_history_only() {
    let plans = plans(&["scan", "index", "join"]);
    let store = PostCostStore::from_history([("scan", 120.0), ("index", 8.0), ("join", 40.0)]);
    let selector = selector(1.0, PlanSelectionStrategy::Best, store);

    // Static costs point the other way
    let index = selector
        .select_index(&plans, &[1.0, 100.0, 50.0], &TransactionContext::new())
        .unwrap();
    assert_eq!(index, 1);
}

/// Blended costs weigh both sources.
#[test]
fn test_best_blend() {
    let plans = plans(&["p", "q"]);
    let store = PostCostStore::from_history([("p", 10.0), ("q", 30.0)]);
    let costs = [30.0, 10.0];

    // Pre says q, post says p; the heavier weight wins
    let mostly_pre = selector(0.2, PlanSelectionStrategy::Best, PostCostStore::from_history([("p", 10.0), ("q", 30.0)]));
    assert_eq!(mostly_pre.select_index(&plans, &costs, &TransactionContext::new()).unwrap(), 1);

    let mostly_post = selector(0.8, PlanSelectionStrategy::Best, store);
    assert_eq!(mostly_post.select_index(&plans, &costs, &TransactionContext::new()).unwrap(), 0);
}

/// The feedback loop changes later decisions.
#[test]
fn test_recorded_history_shifts_selection() {
    let plans = plans(&["fast_store", "slow_store"]);
    let store = Arc::new(PostCostStore::new());
    let selector = RoutingPlanSelector::with_seed(
        RoutingConfig::new(1.0, PlanSelectionStrategy::Best),
        store.clone(),
        1,
    )
    .unwrap();

    store.record("fast_store", 400.0);
    store.record("slow_store", 20.0);
    let tx = TransactionContext::new();
    assert_eq!(selector.select_index(&plans, &[1.0, 1.0], &tx).unwrap(), 1);

    for _ in 0..20 {
        store.record("slow_store", 2_000.0);
    }
    assert_eq!(selector.select_index(&plans, &[1.0, 1.0], &tx).unwrap(), 0);
}

// =============================================================================
// PROBABILITY Strategy Tests
// =============================================================================

/// Equal costs give a uniform distribution within 5%.
#[test]
fn test_probability_uniform_for_equal_costs() {
    let plans = plans(&["a", "b", "c"]);
    let selector = selector(0.0, PlanSelectionStrategy::Probability, PostCostStore::new());

    for share in frequencies(&selector, &plans, &[4.0, 4.0, 4.0]) {
        assert!((share - 1.0 / 3.0).abs() < 0.05, "share {}", share);
    }
}

/// All-zero pre and post costs are treated as uniform.
#[test]
fn test_probability_all_zero_costs() {
    let plans = plans(&["a", "b", "c"]);
    let selector = selector(0.5, PlanSelectionStrategy::Probability, PostCostStore::from_history([
        ("a", 0.0),
        ("b", 0.0),
        ("c", 0.0),
    ]));

    for share in frequencies(&selector, &plans, &[0.0, 0.0, 0.0]) {
        assert!((share - 1.0 / 3.0).abs() < 0.05, "share {}", share);
    }
}

/// Cheaper plans are chosen more often, expensive ones still sometimes.
#[test]
fn test_probability_favors_cheap_plans() {
    let plans = plans(&["cheap", "pricey"]);
    let selector = selector(0.0, PlanSelectionStrategy::Probability, PostCostStore::new());

    // Weights are proportional to 1/p: 3:1
    let shares = frequencies(&selector, &plans, &[1.0, 3.0]);
    assert!((shares[0] - 0.75).abs() < 0.05, "share {}", shares[0]);
    assert!(shares[1] > 0.0);
}

/// The same seed reproduces the same sequence.
#[test]
fn test_probability_reproducible_with_seed() {
    let plans = plans(&["a", "b", "c", "d"]);
    let costs = [3.0, 1.0, 2.0, 5.0];
    let tx = TransactionContext::new();

    let first = selector(0.0, PlanSelectionStrategy::Probability, PostCostStore::new());
    let second = selector(0.0, PlanSelectionStrategy::Probability, PostCostStore::new());
    let a: Vec<usize> = (0..200).map(|_| first.select_index(&plans, &costs, &tx).unwrap()).collect();
    let b: Vec<usize> = (0..200).map(|_| second.select_index(&plans, &costs, &tx).unwrap()).collect();
    assert_eq!(a, b);
}

/// Debug records carry percentages summing to 100.
#[test]
fn test_probability_debug_percentages() {
    let plans = plans(&["a", "b"]);
    let selector = selector(0.0, PlanSelectionStrategy::Probability, PostCostStore::new());
    let sink = MemoryDebugSink::new();

    selector
        .select_index(&plans, &[2.0, 6.0], &TransactionContext::analyzing(&sink))
        .unwrap();

    let percentages = sink.last().unwrap().percentages.unwrap();
    assert!((percentages.iter().sum::<f64>() - 100.0).abs() < 1e-9);
    assert!((percentages[0] - 75.0).abs() < 1e-9);
}

// =============================================================================
// Cold Start and Failure Tests
// =============================================================================

/// Unknown classes count as 1.0 under pure historical routing.
#[test]
fn test_cold_start_fallback() {
    let plans = plans(&["seen", "unseen"]);
    let store = PostCostStore::from_history([("seen", 3.0)]);
    let metrics = Arc::new(MetricsRegistry::new());
    let selector = selector(1.0, PlanSelectionStrategy::Best, store).with_metrics(metrics.clone());
    let sink = MemoryDebugSink::new();

    let index = selector
        .select_index(&plans, &[1.0, 1.0], &TransactionContext::analyzing(&sink))
        .unwrap();

    // 3.0 vs 1.0 normalized: the unseen plan is cheaper
    assert_eq!(index, 1);
    let record = sink.last().unwrap();
    assert_eq!(record.historical_costs, vec![Some(3.0), None]);
    assert!((record.post_costs[1] - 0.25).abs() < 1e-9);
    assert_eq!(metrics.snapshot().routing_cold_starts, 1);
}

/// Missing strategy, empty candidates and mismatched lengths fail.
#[test]
fn test_selection_errors() {
    let plans = plans(&["a", "b"]);
    let tx = TransactionContext::new();

    let unconfigured = RoutingPlanSelector::with_seed(
        RoutingConfig {
            pre_cost_post_cost_ratio: 0.0,
            plan_selection_strategy: None,
        },
        Arc::new(PostCostStore::new()),
        1,
    )
    .unwrap();
    let err = unconfigured.select_index(&plans, &[1.0, 2.0], &tx).unwrap_err();
    assert_eq!(err.code(), RoutingErrorCode::StrategyNotConfigured);
    assert!(err.is_fatal());

    let selector = selector(0.0, PlanSelectionStrategy::Best, PostCostStore::new());
    let empty: Vec<CandidatePlan> = Vec::new();
    assert_eq!(
        selector.select_index(&empty, &[], &tx).unwrap_err().code(),
        RoutingErrorCode::NoCandidates
    );
    assert_eq!(
        selector.select_index(&plans, &[1.0], &tx).unwrap_err().code(),
        RoutingErrorCode::CostLengthMismatch
    );
    assert_eq!(
        selector.select_index(&plans, &[1.0, f64::NAN], &tx).unwrap_err().code(),
        RoutingErrorCode::InvalidCost
    );
}

/// Ratio outside [0, 1] is rejected at construction.
#[test]
fn test_invalid_ratio_rejected() {
    let err = RoutingPlanSelector::new(
        RoutingConfig::new(1.2, PlanSelectionStrategy::Best),
        Arc::new(PostCostStore::new()),
    )
    .err()
    .unwrap();
    assert_eq!(err.code(), RoutingErrorCode::InvalidRatio);
}

// =============================================================================
// Probability Helper Tests
// =============================================================================

#[test]
fn test_calculate_probabilities_sums_to_one() {
    let p = calculate_probabilities(&[3.0, 1.0, 6.0, 10.0]);
    assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
}

#[test]
fn test_calculate_probabilities_all_zero_unchanged() {
    assert_eq!(calculate_probabilities(&[0.0, 0.0]), vec![0.0, 0.0]);
}
