//! Routing plan selector
//!
//! Blends each candidate's static estimate (pre-cost) with its observed
//! execution time (post-cost) and picks one plan.
//!
//! # Algorithm
//!
//! 1. `ratio_post` comes from configuration, `ratio_pre = 1 - ratio_post`
//! 2. Pre-costs are normalized to sum to 1, or all zero when `ratio_pre`
//!    is negligible
//! 3. Post-costs are looked up per physical query class and normalized
//!    the same way, or all zero when `ratio_post` is negligible. Under
//!    pure historical routing a never-seen class counts as 1.0
//! 4. `effective_i = ratio_pre * pre_i + ratio_post * post_i`
//! 5. BEST takes the first minimum; PROBABILITY draws with weights
//!    inversely proportional to the effective cost
//!
//! Selection is O(N) and never blocks beyond the monitoring lookup.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::{PlanSelectionStrategy, RoutingConfig, NEGLIGIBLE};
use super::debug::{RoutingDebugRecord, TransactionContext};
use super::errors::{RoutingError, RoutingResult};
use super::monitoring::MonitoringCostProvider;
use super::plan::RoutingPlan;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};

/// Normalize `costs` so they sum to 1.
///
/// An input summing to (numerically) zero is returned unchanged.
pub fn calculate_probabilities(costs: &[f64]) -> Vec<f64> {
    let sum: f64 = costs.iter().sum();
    if sum.abs() < f64::EPSILON {
        return costs.to_vec();
    }
    costs.iter().map(|c| c / sum).collect()
}

/// Selection weights (summing to 100) for PROBABILITY.
///
/// Cheaper plans weigh more. All-zero costs give a uniform
/// distribution; a zero cost among non-zero ones maps to weight 0 via the
/// infinite inverse.
pub fn calculate_selection_weights(effective: &[f64]) -> Vec<f64> {
    let uniform = effective.iter().all(|c| c.abs() < NEGLIGIBLE);
    let costs: Vec<f64> = if uniform {
        vec![1.0; effective.len()]
    } else {
        effective.to_vec()
    };

    let inverted: Vec<f64> = calculate_probabilities(&costs)
        .into_iter()
        .map(|p| {
            let inverse = 1.0 / p;
            if inverse.is_finite() {
                inverse
            } else {
                0.0
            }
        })
        .collect();

    let total: f64 = inverted.iter().sum();
    if total.is_nan() || total <= 0.0 {
        let share = 100.0 / effective.len().max(1) as f64;
        return vec![share; effective.len()];
    }
    inverted.iter().map(|w| w / total * 100.0).collect()
}

/// Index of the first minimum.
fn arg_min(costs: &[f64]) -> usize {
    let mut best = 0;
    for (index, cost) in costs.iter().enumerate().skip(1) {
        if *cost < costs[best] {
            best = index;
        }
    }
    best
}

/// Plan selector with an injected, seedable random source
pub struct RoutingPlanSelector {
    config: RoutingConfig,
    monitoring: Arc<dyn MonitoringCostProvider>,
    rng: Mutex<StdRng>,
    metrics: Arc<MetricsRegistry>,
}

impl RoutingPlanSelector {
    /// Selector drawing from OS entropy.
    pub fn new(config: RoutingConfig, monitoring: Arc<dyn MonitoringCostProvider>) -> RoutingResult<Self> {
        Self::with_rng(config, monitoring, StdRng::from_entropy())
    }

    /// Selector whose PROBABILITY draws are reproducible.
    pub fn with_seed(
        config: RoutingConfig,
        monitoring: Arc<dyn MonitoringCostProvider>,
        seed: u64,
    ) -> RoutingResult<Self> {
        Self::with_rng(config, monitoring, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        config: RoutingConfig,
        monitoring: Arc<dyn MonitoringCostProvider>,
        rng: StdRng,
    ) -> RoutingResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            monitoring,
            rng: Mutex::new(rng),
            metrics: Arc::new(MetricsRegistry::new()),
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Pick one of `plans` given their static `costs`.
    pub fn select_plan_based_on_costs<'p, P: RoutingPlan>(
        &self,
        plans: &'p [P],
        costs: &[f64],
        tx: &TransactionContext<'_>,
    ) -> RoutingResult<&'p P> {
        let index = self.select_index(plans, costs, tx)?;
        Ok(&plans[index])
    }

    /// Index of the selected plan.
    pub fn select_index<P: RoutingPlan>(
        &self,
        plans: &[P],
        costs: &[f64],
        tx: &TransactionContext<'_>,
    ) -> RoutingResult<usize> {
        let strategy = self
            .config
            .plan_selection_strategy
            .ok_or_else(RoutingError::strategy_not_configured)?;
        if plans.is_empty() {
            return Err(RoutingError::no_candidates());
        }
        if plans.len() != costs.len() {
            return Err(RoutingError::cost_length_mismatch(plans.len(), costs.len()));
        }
        if let Some((index, cost)) = costs
            .iter()
            .enumerate()
            .find(|(_, c)| !c.is_finite() || **c < 0.0)
        {
            return Err(RoutingError::invalid_cost(index, *cost));
        }

        let ratio_post = self.config.ratio_post();
        let ratio_pre = self.config.ratio_pre();

        let pre_costs = if ratio_pre < NEGLIGIBLE {
            vec![0.0; costs.len()]
        } else {
            calculate_probabilities(costs)
        };

        let historical = self.historical_costs(plans);
        let post_costs = if ratio_post < NEGLIGIBLE {
            vec![0.0; plans.len()]
        } else {
            let cold_start = if 1.0 - ratio_post < NEGLIGIBLE { 1.0 } else { 0.0 };
            let raw: Vec<f64> = historical
                .iter()
                .zip(plans)
                .map(|(cost, plan)| match cost {
                    Some(cost) => *cost,
                    None => {
                        self.metrics.increment_routing_cold_starts();
                        log_event_with_fields(
                            Event::RoutingColdStart,
                            &[("physical_query_class", plan.physical_query_class())],
                        );
                        cold_start
                    }
                })
                .collect();
            calculate_probabilities(&raw)
        };

        let effective: Vec<f64> = pre_costs
            .iter()
            .zip(&post_costs)
            .map(|(pre, post)| ratio_pre * pre + ratio_post * post)
            .collect();

        let (selected, percentages) = match strategy {
            PlanSelectionStrategy::Best => {
                self.metrics.increment_plans_selected_best();
                (arg_min(&effective), None)
            }
            PlanSelectionStrategy::Probability => {
                self.metrics.increment_plans_selected_probability();
                let weights = calculate_selection_weights(&effective);
                (self.draw(&weights), Some(weights))
            }
        };

        log_event_with_fields(
            Event::PlanSelected,
            &[
                ("candidates", plans.len().to_string().as_str()),
                ("physical_query_class", plans[selected].physical_query_class()),
                ("selected", selected.to_string().as_str()),
                ("strategy", strategy.as_str()),
            ],
        );

        tx.publish(|| RoutingDebugRecord {
            strategy,
            ratio_post,
            pre_costs,
            post_costs,
            historical_costs: historical,
            effective_costs: effective,
            percentages,
            selected_index: selected,
        });
        Ok(selected)
    }

    /// Raw historical execution time per candidate.
    fn historical_costs<P: RoutingPlan>(&self, plans: &[P]) -> Vec<Option<f64>> {
        if self.config.ratio_post() < NEGLIGIBLE {
            return vec![None; plans.len()];
        }
        plans
            .iter()
            .map(|plan| {
                self.monitoring
                    .get_query_post_costs(plan.physical_query_class())
                    .map(|c| c.execution_time)
            })
            .collect()
    }

    /// Walk the weights until the running sum reaches a uniform draw.
    fn draw(&self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        if total.is_nan() || total <= 0.0 {
            return 0;
        }
        let target = {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            rng.gen_range(0.0..total)
        };

        let mut running = 0.0;
        for (index, weight) in weights.iter().enumerate() {
            running += weight;
            if running >= target {
                return index;
            }
        }
        weights.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{CandidatePlan, MemoryDebugSink, PostCostStore};

    fn plans(n: usize) -> Vec<CandidatePlan> {
        (0..n)
            .map(|i| CandidatePlan::new(format!("plan-{}", i), format!("class-{}", i)))
            .collect()
    }

    fn selector(ratio: f64, strategy: PlanSelectionStrategy) -> RoutingPlanSelector {
        RoutingPlanSelector::with_seed(
            RoutingConfig::new(ratio, strategy),
            Arc::new(PostCostStore::new()),
            7,
        )
        .unwrap()
    }

    #[test]
    fn test_calculate_probabilities_sums_to_one() {
        let p = calculate_probabilities(&[10.0, 5.0, 20.0]);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!((p[0] - 0.2857).abs() < 1e-3);
        assert!((p[1] - 0.1428).abs() < 1e-3);
        assert!((p[2] - 0.5714).abs() < 1e-3);
    }

    #[test]
    fn test_calculate_probabilities_all_zero_unchanged() {
        assert_eq!(calculate_probabilities(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_weights_favor_cheap_plans() {
        let w = calculate_selection_weights(&[0.1, 0.9]);
        assert!((w.iter().sum::<f64>() - 100.0).abs() < 1e-9);
        assert!(w[0] > w[1]);
    }

    #[test]
    fn test_weights_zero_cost_maps_to_zero() {
        let w = calculate_selection_weights(&[0.0, 0.5, 0.5]);
        assert_eq!(w[0], 0.0);
        assert!((w[1] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_weights_all_zero_uniform() {
        let w = calculate_selection_weights(&[0.0, 0.0, 0.0, 0.0]);
        for weight in w {
            assert!((weight - 25.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_best_first_minimum_wins_ties() {
        let s = selector(0.0, PlanSelectionStrategy::Best);
        let index = s
            .select_index(&plans(3), &[4.0, 2.0, 2.0], &TransactionContext::new())
            .unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn test_unconfigured_strategy_is_error() {
        let config = RoutingConfig {
            pre_cost_post_cost_ratio: 0.0,
            plan_selection_strategy: None,
        };
        let s = RoutingPlanSelector::with_seed(config, Arc::new(PostCostStore::new()), 1).unwrap();
        let err = s
            .select_index(&plans(2), &[1.0, 2.0], &TransactionContext::new())
            .unwrap_err();
        assert_eq!(err.code(), crate::routing::RoutingErrorCode::StrategyNotConfigured);
    }

    #[test]
    fn test_input_validation() {
        let s = selector(0.0, PlanSelectionStrategy::Best);
        let tx = TransactionContext::new();
        assert!(s.select_index::<CandidatePlan>(&[], &[], &tx).is_err());
        assert!(s.select_index(&plans(2), &[1.0], &tx).is_err());
        assert!(s.select_index(&plans(2), &[1.0, f64::NAN], &tx).is_err());
        assert!(RoutingPlanSelector::with_seed(
            RoutingConfig::new(-0.1, PlanSelectionStrategy::Best),
            Arc::new(PostCostStore::new()),
            1
        )
        .is_err());
    }

    #[test]
    fn test_cold_start_under_pure_history() {
        let store = Arc::new(PostCostStore::from_history([("class-0", 50.0), ("class-1", 10.0)]));
        let s = RoutingPlanSelector::with_seed(
            RoutingConfig::new(1.0, PlanSelectionStrategy::Best),
            store,
            1,
        )
        .unwrap();
        let sink = MemoryDebugSink::new();

        let index = s
            .select_index(&plans(3), &[1.0, 1.0, 1.0], &TransactionContext::analyzing(&sink))
            .unwrap();

        let record = sink.last().unwrap();
        assert_eq!(record.historical_costs, vec![Some(50.0), Some(10.0), None]);
        // class-2 counts as 1.0, cheaper than both observed classes
        assert_eq!(index, 2);
        assert!(record.pre_costs.iter().all(|c| *c == 0.0));
        assert_eq!(s.metrics().snapshot().routing_cold_starts, 1);
    }

    #[test]
    fn test_debug_record_only_in_analyze_mode() {
        let s = selector(0.0, PlanSelectionStrategy::Probability);
        let sink = MemoryDebugSink::new();
        let quiet = TransactionContext {
            analyze: false,
            sink: Some(&sink),
        };
        s.select_index(&plans(2), &[1.0, 2.0], &quiet).unwrap();
        assert!(sink.records().is_empty());

        s.select_index(&plans(2), &[1.0, 2.0], &TransactionContext::analyzing(&sink))
            .unwrap();
        let record = sink.last().unwrap();
        assert_eq!(record.percentages.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_seeded_selection_is_reproducible() {
        let a = selector(0.0, PlanSelectionStrategy::Probability);
        let b = selector(0.0, PlanSelectionStrategy::Probability);
        let tx = TransactionContext::new();
        for _ in 0..50 {
            assert_eq!(
                a.select_index(&plans(4), &[1.0, 2.0, 3.0, 4.0], &tx).unwrap(),
                b.select_index(&plans(4), &[1.0, 2.0, 3.0, 4.0], &tx).unwrap()
            );
        }
    }
}
