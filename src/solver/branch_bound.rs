//! Depth-first branch-and-bound search.

use super::config::SolverConfig;
use super::types::{LinearConstraint, Relation, Solution, SolveOutcome, SolveReport};
use crate::instance::Instance;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "parallel")]
use std::sync::atomic::AtomicU64;

/// The deadline check samples the clock at this node interval to keep the
/// per-node overhead negligible.
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// Exact maximizer for linear objectives over boolean item decisions.
///
/// Searches the full decision tree depth-first, include-branch first, with
/// items in descending objective-density order. Subtrees are pruned when
/// the fractional-relaxation upper bound cannot beat the incumbent, or when
/// a side constraint is already unsatisfiable for every completion of the
/// partial assignment.
pub struct BranchAndBound;

impl BranchAndBound {
    /// Maximizes `objective · x` subject to the capacity bound and `constraints`.
    ///
    /// Returns the certified global optimum, proven infeasibility, or a
    /// truncated outcome when a configured budget expired first. Malformed
    /// input (invalid instance, non-finite coefficients, dimensionality
    /// mismatch) is rejected before any search.
    pub fn maximize(
        instance: &Instance,
        objective: &[f64],
        constraints: &[LinearConstraint],
        config: &SolverConfig,
    ) -> Result<SolveReport, String> {
        Self::maximize_with_cancel(instance, objective, constraints, config, None)
    }

    /// Like [`BranchAndBound::maximize`], with an optional cancellation token.
    ///
    /// Cancellation is observed between nodes and yields a `Truncated`
    /// outcome carrying the incumbent found so far.
    pub fn maximize_with_cancel(
        instance: &Instance,
        objective: &[f64],
        constraints: &[LinearConstraint],
        config: &SolverConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SolveReport, String> {
        instance.validate()?;
        config.validate()?;

        let n = instance.len();
        if objective.len() != n {
            return Err(format!(
                "objective has {} coefficients for {n} items",
                objective.len()
            ));
        }
        if let Some(c) = objective.iter().find(|c| !c.is_finite()) {
            return Err(format!("objective coefficients must be finite, got {c}"));
        }
        for (k, constraint) in constraints.iter().enumerate() {
            if constraint.coeffs.len() != n {
                return Err(format!(
                    "constraint {k} has {} coefficients for {n} items",
                    constraint.coeffs.len()
                ));
            }
            if !constraint.rhs.is_finite() {
                return Err(format!(
                    "constraint {k}: rhs must be finite, got {}",
                    constraint.rhs
                ));
            }
            if let Some(c) = constraint.coeffs.iter().find(|c| !c.is_finite()) {
                return Err(format!(
                    "constraint {k}: coefficients must be finite, got {c}"
                ));
            }
        }

        let search = Search::new(instance, objective, constraints, config, cancel);
        Ok(run(search))
    }
}

#[cfg(not(feature = "parallel"))]
fn run(mut search: Search) -> SolveReport {
    search.run_root(None);
    search.into_report()
}

/// Root split: the include/exclude subtrees of the first (densest) item are
/// explored concurrently, sharing the best objective value through an atomic
/// so each worker prunes against the global incumbent.
#[cfg(feature = "parallel")]
fn run(search: Search) -> SolveReport {
    if search.weights.len() < 2 {
        let mut search = search;
        search.run_root(None);
        return search.into_report();
    }

    let shared = Arc::new(AtomicU64::new(f64::NEG_INFINITY.to_bits()));
    let mut include = search.clone();
    let mut exclude = search;
    include.shared_best = Some(shared.clone());
    exclude.shared_best = Some(shared);

    let (include, exclude) = rayon::join(
        move || {
            include.run_root(Some(true));
            include
        },
        move || {
            exclude.run_root(Some(false));
            exclude
        },
    );

    let (better, other) = if include.best_value >= exclude.best_value {
        (include, exclude)
    } else {
        (exclude, include)
    };
    let mut merged = better;
    merged.nodes += other.nodes;
    merged.truncated |= other.truncated;
    merged.into_report()
}

/// One side constraint, re-indexed to search order, with the running
/// left-hand side and suffix sums of its positive/negative coefficients.
#[derive(Clone)]
struct ConstraintState {
    coeffs: Vec<f64>,
    relation: Relation,
    rhs: f64,
    /// Comparison tolerance, pre-scaled by `max(1, |rhs|)`.
    tol: f64,
    /// `pos_suffix[p]` = sum of positive coefficients at positions `p..n`.
    pos_suffix: Vec<f64>,
    /// `neg_suffix[p]` = sum of negative coefficients at positions `p..n`.
    neg_suffix: Vec<f64>,
    /// Accumulated lhs of the current partial assignment.
    acc: f64,
}

impl ConstraintState {
    /// Whether some completion of the partial assignment at `pos` can still
    /// satisfy the constraint. At `pos == n` the reachable range collapses
    /// to the accumulated lhs, so this is also the final feasibility check.
    fn reachable(&self, pos: usize) -> bool {
        let lo = self.acc + self.neg_suffix[pos];
        let hi = self.acc + self.pos_suffix[pos];
        match self.relation {
            Relation::Le => lo <= self.rhs + self.tol,
            Relation::Ge => hi >= self.rhs - self.tol,
            Relation::Eq => lo <= self.rhs + self.tol && hi >= self.rhs - self.tol,
        }
    }
}

#[derive(Clone)]
struct Search {
    /// Search position -> original item index.
    order: Vec<usize>,
    /// Item weights in search order.
    weights: Vec<f64>,
    /// Objective coefficients in search order.
    gains: Vec<f64>,
    constraints: Vec<ConstraintState>,
    capacity: f64,
    /// Capacity slack tolerance, pre-scaled by `max(1, capacity)`.
    cap_tol: f64,
    tolerance: f64,

    deadline: Option<Instant>,
    node_limit: u64,
    cancel: Option<Arc<AtomicBool>>,
    #[cfg(feature = "parallel")]
    shared_best: Option<Arc<AtomicU64>>,

    nodes: u64,
    truncated: bool,
    best_value: f64,
    /// Incumbent decision, in original index order.
    best_decision: Option<Vec<bool>>,
    /// Scratch decision for the current path, in search order.
    decision: Vec<bool>,
}

impl Search {
    fn new(
        instance: &Instance,
        objective: &[f64],
        constraints: &[LinearConstraint],
        config: &SolverConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Self {
        let n = instance.len();
        let items = instance.items();

        // Descending objective-density order improves both the relaxation
        // bound and how early the incumbent becomes competitive. Zero-weight
        // items with positive gain are free and sort first.
        let density = |i: usize| -> f64 {
            let weight = items[i].weight;
            let gain = objective[i];
            if weight > 0.0 {
                gain / weight
            } else if gain > 0.0 {
                f64::INFINITY
            } else {
                0.0
            }
        };
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            density(b)
                .partial_cmp(&density(a))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let weights: Vec<f64> = order.iter().map(|&i| items[i].weight).collect();
        let gains: Vec<f64> = order.iter().map(|&i| objective[i]).collect();

        let constraints = constraints
            .iter()
            .map(|c| {
                let coeffs: Vec<f64> = order.iter().map(|&i| c.coeffs[i]).collect();
                let mut pos_suffix = vec![0.0; n + 1];
                let mut neg_suffix = vec![0.0; n + 1];
                for p in (0..n).rev() {
                    pos_suffix[p] = pos_suffix[p + 1] + coeffs[p].max(0.0);
                    neg_suffix[p] = neg_suffix[p + 1] + coeffs[p].min(0.0);
                }
                ConstraintState {
                    coeffs,
                    relation: c.relation,
                    rhs: c.rhs,
                    tol: config.tolerance * c.rhs.abs().max(1.0),
                    pos_suffix,
                    neg_suffix,
                    acc: 0.0,
                }
            })
            .collect();

        let deadline = if config.time_limit_ms > 0 {
            Some(Instant::now() + std::time::Duration::from_millis(config.time_limit_ms))
        } else {
            None
        };

        Self {
            order,
            weights,
            gains,
            constraints,
            capacity: instance.capacity(),
            cap_tol: config.tolerance * instance.capacity().max(1.0),
            tolerance: config.tolerance,
            deadline,
            node_limit: config.node_limit,
            cancel,
            #[cfg(feature = "parallel")]
            shared_best: None,
            nodes: 0,
            truncated: false,
            best_value: f64::NEG_INFINITY,
            best_decision: None,
            decision: vec![false; n],
        }
    }

    /// Runs the search. `force_first` pins the decision for the first
    /// position instead of branching on it (used by the parallel root split).
    fn run_root(&mut self, force_first: Option<bool>) {
        let capacity = self.capacity;
        match force_first {
            None => self.dfs(0, capacity, 0.0),
            Some(false) => self.dfs(1, capacity, 0.0),
            Some(true) => {
                let weight = self.weights[0];
                if weight <= capacity + self.cap_tol {
                    self.decision[0] = true;
                    for c in &mut self.constraints {
                        c.acc += c.coeffs[0];
                    }
                    let gain = self.gains[0];
                    self.dfs(1, (capacity - weight).max(0.0), gain);
                }
            }
        }
    }

    fn dfs(&mut self, pos: usize, cap_left: f64, obj_acc: f64) {
        if self.truncated {
            return;
        }
        self.nodes += 1;
        if self.budget_exhausted() {
            self.truncated = true;
            return;
        }

        // At pos == n the suffix sums are zero and this doubles as the
        // final feasibility check.
        if !self.constraints.iter().all(|c| c.reachable(pos)) {
            return;
        }

        if pos == self.weights.len() {
            if obj_acc > self.best_value {
                self.accept(obj_acc);
            }
            return;
        }

        let best = self.current_best();
        if best > f64::NEG_INFINITY {
            let bound = obj_acc + self.relaxation_bound(pos, cap_left);
            if bound <= best + self.tolerance * best.abs().max(1.0) {
                return;
            }
        }

        // Include branch first: with density ordering it reaches strong
        // incumbents early.
        let weight = self.weights[pos];
        if weight <= cap_left + self.cap_tol {
            self.decision[pos] = true;
            for c in &mut self.constraints {
                c.acc += c.coeffs[pos];
            }
            self.dfs(pos + 1, (cap_left - weight).max(0.0), obj_acc + self.gains[pos]);
            for c in &mut self.constraints {
                c.acc -= c.coeffs[pos];
            }
            self.decision[pos] = false;
        }

        self.dfs(pos + 1, cap_left, obj_acc);
    }

    /// Fractional (greedy) relaxation of the remaining items: the classical
    /// knapsack upper bound. Side constraints are ignored, which only
    /// loosens the bound.
    fn relaxation_bound(&self, pos: usize, cap_left: f64) -> f64 {
        let mut bound = 0.0;
        let mut room = cap_left;
        for p in pos..self.weights.len() {
            let gain = self.gains[p];
            if gain <= 0.0 {
                continue;
            }
            let weight = self.weights[p];
            if weight <= room {
                bound += gain;
                room -= weight;
            } else {
                if room > 0.0 {
                    bound += gain * room / weight;
                }
                break;
            }
        }
        bound
    }

    fn accept(&mut self, objective: f64) {
        let mut decision = vec![false; self.order.len()];
        for (pos, &take) in self.decision.iter().enumerate() {
            if take {
                decision[self.order[pos]] = true;
            }
        }
        self.best_value = objective;
        self.best_decision = Some(decision);

        #[cfg(feature = "parallel")]
        if let Some(shared) = &self.shared_best {
            let _ = shared.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                if objective > f64::from_bits(bits) {
                    Some(objective.to_bits())
                } else {
                    None
                }
            });
        }
    }

    /// Best known objective value: the local incumbent, raised to the
    /// shared one when subtrees run in parallel.
    fn current_best(&self) -> f64 {
        #[cfg(feature = "parallel")]
        if let Some(shared) = &self.shared_best {
            return f64::from_bits(shared.load(Ordering::Relaxed)).max(self.best_value);
        }
        self.best_value
    }

    fn budget_exhausted(&self) -> bool {
        if self.node_limit > 0 && self.nodes > self.node_limit {
            return true;
        }
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                return true;
            }
        }
        if self.nodes % DEADLINE_CHECK_INTERVAL == 0 {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    return true;
                }
            }
        }
        false
    }

    fn into_report(self) -> SolveReport {
        let incumbent = self.best_decision.map(|decision| Solution {
            decision,
            objective: self.best_value,
        });
        let outcome = if self.truncated {
            SolveOutcome::Truncated(incumbent)
        } else {
            match incumbent {
                Some(solution) => SolveOutcome::Optimal(solution),
                None => SolveOutcome::Infeasible,
            }
        };
        SolveReport {
            outcome,
            nodes: self.nodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Item;

    fn solve(
        instance: &Instance,
        objective: &[f64],
        constraints: &[LinearConstraint],
    ) -> SolveReport {
        BranchAndBound::maximize(instance, objective, constraints, &SolverConfig::default())
            .expect("valid input")
    }

    /// Exhaustive reference optimum for small instances.
    fn brute_force(
        instance: &Instance,
        objective: &[f64],
        constraints: &[LinearConstraint],
    ) -> Option<f64> {
        let n = instance.len();
        let mut best: Option<f64> = None;
        for mask in 0u32..(1 << n) {
            let decision: Vec<bool> = (0..n).map(|i| mask & (1 << i) != 0).collect();
            if instance.selected_weight(&decision) > instance.capacity() + 1e-9 {
                continue;
            }
            if !constraints.iter().all(|c| c.is_satisfied(&decision, 1e-9)) {
                continue;
            }
            let value: f64 = (0..n).filter(|&i| decision[i]).map(|i| objective[i]).sum();
            if best.is_none_or(|b| value > b) {
                best = Some(value);
            }
        }
        best
    }

    #[test]
    fn test_single_item_fits() {
        let instance = Instance::new(vec![Item::new(3.0, 7.0, 1.0)], 5.0);
        let report = solve(&instance, &[7.0], &[]);
        let solution = report.outcome.optimal().expect("optimal");
        assert_eq!(solution.decision, vec![true]);
        assert!((solution.objective - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_item_too_heavy() {
        let instance = Instance::new(vec![Item::new(6.0, 7.0, 1.0)], 5.0);
        let report = solve(&instance, &[7.0], &[]);
        let solution = report.outcome.optimal().expect("empty selection is optimal");
        assert_eq!(solution.decision, vec![false]);
        assert!(solution.objective.abs() < 1e-9);
    }

    #[test]
    fn test_empty_instance() {
        let instance = Instance::new(vec![], 5.0);
        let report = solve(&instance, &[], &[]);
        let solution = report.outcome.optimal().expect("empty selection");
        assert!(solution.decision.is_empty());
        assert!(solution.objective.abs() < 1e-9);
    }

    #[test]
    fn test_classic_instance() {
        let instance = Instance::new(
            vec![
                Item::new(2.0, 3.0, 4.0),
                Item::new(3.0, 5.0, 2.0),
                Item::new(4.0, 2.0, 6.0),
            ],
            5.0,
        );
        let report = solve(&instance, &[3.0, 5.0, 2.0], &[]);
        let solution = report.outcome.optimal().expect("optimal");
        assert_eq!(solution.decision, vec![true, true, false]);
        assert!((solution.objective - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_matches_brute_force() {
        let instance = Instance::new(
            vec![
                Item::new(4.1, 9.0, 2.0),
                Item::new(1.3, 3.5, 7.0),
                Item::new(2.7, 5.2, 1.1),
                Item::new(3.3, 6.6, 4.4),
                Item::new(0.9, 1.0, 8.8),
                Item::new(5.5, 9.9, 0.5),
                Item::new(2.2, 4.0, 4.0),
            ],
            8.0,
        );
        let objective = instance.z1_coefficients();
        let report = solve(&instance, &objective, &[]);
        let solution = report.outcome.optimal().expect("optimal");
        let expected = brute_force(&instance, &objective, &[]).expect("feasible");
        assert!(
            (solution.objective - expected).abs() < 1e-9,
            "got {}, brute force {}",
            solution.objective,
            expected
        );
    }

    #[test]
    fn test_equality_constraint_lexicographic_step() {
        // Maximize Z2 among Z1-optimal selections.
        let instance = Instance::new(
            vec![
                Item::new(2.0, 3.0, 4.0),
                Item::new(3.0, 5.0, 2.0),
                Item::new(4.0, 2.0, 6.0),
            ],
            5.0,
        );
        let z1 = instance.z1_coefficients();
        let z2 = instance.z2_coefficients();
        let constraint = LinearConstraint::eq(z1, 8.0);
        let report = solve(&instance, &z2, std::slice::from_ref(&constraint));
        let solution = report.outcome.optimal().expect("the Z1 optimum is feasible");
        assert_eq!(solution.decision, vec![true, true, false]);
        assert!((solution.objective - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_ge_constraint_infeasible() {
        let instance = Instance::new(
            vec![Item::new(2.0, 3.0, 4.0), Item::new(3.0, 5.0, 2.0)],
            5.0,
        );
        // No selection reaches Z2 >= 7.
        let floor = LinearConstraint::ge(instance.z2_coefficients(), 7.0);
        let report = solve(&instance, &instance.z1_coefficients(), &[floor]);
        assert!(report.outcome.is_infeasible());
    }

    #[test]
    fn test_ge_constraint_changes_optimum() {
        let instance = Instance::new(
            vec![
                Item::new(2.0, 3.0, 4.0),
                Item::new(3.0, 5.0, 2.0),
                Item::new(4.0, 2.0, 6.0),
            ],
            5.0,
        );
        // No capacity-feasible selection exceeds Z2 = 6, so a 6.5 floor is
        // infeasible while a 6.0 floor still admits the Z1 optimum {0, 1}.
        let floor = LinearConstraint::ge(instance.z2_coefficients(), 6.5);
        let report = solve(&instance, &instance.z1_coefficients(), &[floor]);
        assert!(report.outcome.is_infeasible());

        let floor = LinearConstraint::ge(instance.z2_coefficients(), 6.0);
        let report = solve(&instance, &instance.z1_coefficients(), &[floor]);
        let solution = report.outcome.optimal().expect("optimal");
        assert!((solution.objective - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_constraint_brute_force_cross_check() {
        let instance = Instance::new(
            vec![
                Item::new(1.0, 2.0, 5.0),
                Item::new(2.0, 4.0, 1.0),
                Item::new(3.0, 1.0, 6.0),
                Item::new(1.5, 3.0, 2.5),
                Item::new(2.5, 5.5, 0.5),
            ],
            6.0,
        );
        let z1 = instance.z1_coefficients();
        let z2 = instance.z2_coefficients();
        for floor in [0.0, 2.0, 4.5, 6.0, 8.0, 11.0, 20.0] {
            let constraint = LinearConstraint::ge(z2.clone(), floor);
            let report = solve(&instance, &z1, std::slice::from_ref(&constraint));
            let expected = brute_force(&instance, &z1, std::slice::from_ref(&constraint));
            match (report.outcome.optimal(), expected) {
                (Some(solution), Some(value)) => assert!(
                    (solution.objective - value).abs() < 1e-9,
                    "floor {floor}: got {}, brute force {value}",
                    solution.objective
                ),
                (None, None) => assert!(report.outcome.is_infeasible()),
                (got, expected) => {
                    panic!("floor {floor}: solver {got:?} disagrees with brute force {expected:?}")
                }
            }
        }
    }

    #[test]
    fn test_le_constraint_cross_check() {
        // A secondary budget (volume cap) alongside the weight capacity.
        let instance = Instance::new(
            vec![
                Item::new(1.0, 6.0, 1.0),
                Item::new(2.0, 5.0, 2.0),
                Item::new(1.5, 4.0, 3.0),
                Item::new(3.0, 7.5, 1.5),
                Item::new(0.5, 2.0, 4.0),
            ],
            6.0,
        );
        let objective = instance.z1_coefficients();
        let volumes = vec![3.0, 1.0, 2.0, 2.5, 0.5];
        for budget in [0.0, 1.0, 2.5, 4.0, 5.5, 9.0] {
            let cap = LinearConstraint::le(volumes.clone(), budget);
            let report = solve(&instance, &objective, std::slice::from_ref(&cap));
            let solution = report
                .outcome
                .optimal()
                .expect("the empty selection satisfies every non-negative budget");
            let expected =
                brute_force(&instance, &objective, std::slice::from_ref(&cap)).expect("feasible");
            assert!(
                (solution.objective - expected).abs() < 1e-9,
                "budget {budget}: got {}, brute force {expected}",
                solution.objective
            );
            assert!(cap.is_satisfied(&solution.decision, 1e-9));
        }
    }

    #[test]
    fn test_zero_weight_item() {
        let instance = Instance::new(
            vec![Item::new(0.0, 2.0, 1.0), Item::new(4.0, 5.0, 1.0)],
            4.0,
        );
        let report = solve(&instance, &[2.0, 5.0], &[]);
        let solution = report.outcome.optimal().expect("optimal");
        assert_eq!(solution.decision, vec![true, true]);
        assert!((solution.objective - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let instance = Instance::new(vec![Item::new(1.0, 1.0, 1.0)], 5.0);
        assert!(BranchAndBound::maximize(
            &instance,
            &[1.0, 2.0],
            &[],
            &SolverConfig::default()
        )
        .is_err());
        let short = LinearConstraint::ge(vec![], 1.0);
        assert!(
            BranchAndBound::maximize(&instance, &[1.0], &[short], &SolverConfig::default())
                .is_err()
        );
    }

    #[test]
    fn test_invalid_instance_rejected() {
        let instance = Instance::new(vec![Item::new(-1.0, 1.0, 1.0)], 5.0);
        assert!(
            BranchAndBound::maximize(&instance, &[1.0], &[], &SolverConfig::default()).is_err()
        );
    }

    #[test]
    fn test_non_finite_objective_rejected() {
        let instance = Instance::new(vec![Item::new(1.0, 1.0, 1.0)], 5.0);
        assert!(
            BranchAndBound::maximize(&instance, &[f64::NAN], &[], &SolverConfig::default())
                .is_err()
        );
    }

    #[test]
    fn test_node_limit_truncates() {
        let items: Vec<Item> = (0..20)
            .map(|i| Item::new(1.0 + (i % 5) as f64, 2.0 + (i % 7) as f64, 1.0))
            .collect();
        let instance = Instance::new(items, 20.0);
        let objective = instance.z1_coefficients();
        let config = SolverConfig::default().with_node_limit(3);
        let report =
            BranchAndBound::maximize(&instance, &objective, &[], &config).expect("valid input");
        assert!(matches!(report.outcome, SolveOutcome::Truncated(_)));
    }

    #[test]
    fn test_cancellation_truncates() {
        let items: Vec<Item> = (0..22)
            .map(|i| Item::new(1.0 + (i % 5) as f64, 2.0 + (i % 7) as f64, 1.0))
            .collect();
        let instance = Instance::new(items, 25.0);
        let objective = instance.z1_coefficients();
        let cancel = Arc::new(AtomicBool::new(true));
        let report = BranchAndBound::maximize_with_cancel(
            &instance,
            &objective,
            &[],
            &SolverConfig::default(),
            Some(cancel),
        )
        .expect("valid input");
        assert!(matches!(report.outcome, SolveOutcome::Truncated(_)));
    }

    #[test]
    fn test_report_counts_nodes() {
        let instance = Instance::new(
            vec![Item::new(1.0, 1.0, 1.0), Item::new(2.0, 2.0, 2.0)],
            3.0,
        );
        let report = solve(&instance, &[1.0, 2.0], &[]);
        assert!(report.nodes >= 3, "expected a real search, got {} nodes", report.nodes);
    }
}
