//! Lexicographic seeding and the epsilon-constraint execution loop.

use super::types::{ParetoFrontier, ParetoPoint};
use crate::instance::Instance;
use crate::solver::{BranchAndBound, LinearConstraint, SolveOutcome, SolverConfig};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The first Pareto point, from the two-stage lexicographic solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedPoint {
    /// The seed point: Z2-best among Z1-optimal selections.
    pub point: ParetoPoint,

    /// The unconstrained Z1 optimum, as certified by the first stage.
    pub z1_star: f64,

    /// Search nodes visited across both stages.
    pub nodes: u64,
}

/// Outcome of the lexicographic seed.
///
/// A validated instance is always feasible (the empty selection satisfies
/// every capacity bound), so the only non-seeded outcome is truncation by a
/// configured budget or cancellation.
#[derive(Debug, Clone, PartialEq)]
pub enum SeedOutcome {
    /// Both stages certified their optimum.
    Found(SeedPoint),

    /// A budget expired or the search was cancelled before the seed was
    /// certified.
    Truncated {
        /// Search nodes visited before truncation.
        nodes: u64,
    },
}

/// Computes the first Pareto point lexicographically: maximize Z1 alone,
/// then maximize Z2 subject to the tolerance-bounded equality `Z1 == z1*`.
///
/// # Examples
///
/// ```
/// use u_biknap::instance::{Instance, Item};
/// use u_biknap::pareto::{lexicographic_seed, SeedOutcome};
/// use u_biknap::solver::SolverConfig;
///
/// let instance = Instance::new(
///     vec![Item::new(2.0, 3.0, 4.0), Item::new(3.0, 5.0, 2.0)],
///     5.0,
/// );
/// let seed = lexicographic_seed(&instance, &SolverConfig::default()).unwrap();
/// let SeedOutcome::Found(seed) = seed else { unreachable!() };
/// assert_eq!(seed.point.objectives(), (8.0, 6.0));
/// ```
pub fn lexicographic_seed(
    instance: &Instance,
    config: &SolverConfig,
) -> Result<SeedOutcome, String> {
    seed_with_cancel(instance, config, None).map(|(outcome, _)| outcome)
}

/// Returns the seed outcome together with the number of optimizer calls
/// actually made (1 when the first stage truncates, 2 otherwise).
fn seed_with_cancel(
    instance: &Instance,
    config: &SolverConfig,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<(SeedOutcome, usize), String> {
    let z1 = instance.z1_coefficients();
    let z2 = instance.z2_coefficients();

    let first = BranchAndBound::maximize_with_cancel(instance, &z1, &[], config, cancel.clone())?;
    let mut nodes = first.nodes;
    let z1_star = match first.outcome {
        SolveOutcome::Optimal(solution) => solution.objective,
        SolveOutcome::Truncated(_) => return Ok((SeedOutcome::Truncated { nodes }, 1)),
        SolveOutcome::Infeasible => {
            unreachable!("the empty selection is feasible for a validated instance")
        }
    };

    let anchor = LinearConstraint::eq(z1, z1_star);
    let second = BranchAndBound::maximize_with_cancel(
        instance,
        &z2,
        std::slice::from_ref(&anchor),
        config,
        cancel,
    )?;
    nodes += second.nodes;
    match second.outcome {
        SolveOutcome::Optimal(solution) => Ok((
            SeedOutcome::Found(SeedPoint {
                point: point_from(instance, solution.decision),
                z1_star,
                nodes,
            }),
            2,
        )),
        SolveOutcome::Truncated(_) => Ok((SeedOutcome::Truncated { nodes }, 2)),
        SolveOutcome::Infeasible => {
            unreachable!("the Z1-optimal selection satisfies its own anchor equality")
        }
    }
}

/// Result of a complete bi-objective solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    /// The accepted frontier, in sweep order (seed first).
    pub frontier: ParetoFrontier,

    /// Wall-clock duration of the full solve (seed + all epsilon iterations).
    pub duration: Duration,

    /// Number of optimizer calls, including the two seed stages.
    pub optimizer_calls: usize,

    /// Total search nodes visited across all calls.
    pub nodes: u64,

    /// Whether a budget or cancellation cut the sweep short. A truncated
    /// frontier is a prefix of the true one and must not be presented as
    /// complete.
    pub truncated: bool,
}

/// Executes the epsilon-constraint sweep.
///
/// Starting from the lexicographic seed, each iteration re-maximizes Z1
/// under `Z2 >= z2_prev + epsilon`. An optimal outcome appends a point and
/// raises the floor; infeasibility completes the frontier. Termination is
/// guaranteed for positive epsilon because Z2 is bounded above and each
/// accepted point raises the floor by at least epsilon.
pub struct EpsilonSweep;

impl EpsilonSweep {
    /// Runs the full bi-objective solve.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_biknap::instance::{Instance, Item};
    /// use u_biknap::pareto::EpsilonSweep;
    /// use u_biknap::solver::SolverConfig;
    ///
    /// let instance = Instance::new(
    ///     vec![Item::new(1.0, 3.0, 1.0), Item::new(1.0, 1.0, 3.0)],
    ///     1.0,
    /// );
    /// let result = EpsilonSweep::run(&instance, 1.0, &SolverConfig::default()).unwrap();
    /// assert_eq!(result.frontier.z1_values(), vec![3.0, 1.0]);
    /// assert_eq!(result.frontier.z2_values(), vec![1.0, 3.0]);
    /// ```
    pub fn run(
        instance: &Instance,
        epsilon: f64,
        config: &SolverConfig,
    ) -> Result<SweepResult, String> {
        Self::run_with_cancel(instance, epsilon, config, None)
    }

    /// Runs the sweep with an optional cancellation token, observed inside
    /// every optimizer call.
    pub fn run_with_cancel(
        instance: &Instance,
        epsilon: f64,
        config: &SolverConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SweepResult, String> {
        let start = Instant::now();
        instance.validate()?;
        config.validate()?;
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(format!(
                "epsilon must be finite and positive, got {epsilon}"
            ));
        }

        let mut frontier = ParetoFrontier::new();

        let (seed_outcome, mut optimizer_calls) =
            seed_with_cancel(instance, config, cancel.clone())?;
        let seed = match seed_outcome {
            SeedOutcome::Found(seed) => seed,
            SeedOutcome::Truncated { nodes } => {
                return Ok(SweepResult {
                    frontier,
                    duration: start.elapsed(),
                    optimizer_calls,
                    nodes,
                    truncated: true,
                });
            }
        };
        let mut nodes = seed.nodes;
        let mut z2_prev = seed.point.z2;
        frontier.push(seed.point);

        let z1 = instance.z1_coefficients();
        let z2 = instance.z2_coefficients();
        loop {
            let floor = LinearConstraint::ge(z2.clone(), z2_prev + epsilon);
            let report = BranchAndBound::maximize_with_cancel(
                instance,
                &z1,
                std::slice::from_ref(&floor),
                config,
                cancel.clone(),
            )?;
            optimizer_calls += 1;
            nodes += report.nodes;

            match report.outcome {
                SolveOutcome::Optimal(solution) => {
                    let point = point_from(instance, solution.decision);
                    // An epsilon below the solver's rhs-scaled tolerance lets
                    // the floor re-accept the previous point. A non-advancing
                    // Z2 means no attainable point clears the floor, so the
                    // frontier is complete.
                    if point.z2 <= z2_prev {
                        return Ok(SweepResult {
                            frontier,
                            duration: start.elapsed(),
                            optimizer_calls,
                            nodes,
                            truncated: false,
                        });
                    }
                    z2_prev = point.z2;
                    frontier.push(point);
                }
                SolveOutcome::Infeasible => {
                    return Ok(SweepResult {
                        frontier,
                        duration: start.elapsed(),
                        optimizer_calls,
                        nodes,
                        truncated: false,
                    });
                }
                SolveOutcome::Truncated(_) => {
                    return Ok(SweepResult {
                        frontier,
                        duration: start.elapsed(),
                        optimizer_calls,
                        nodes,
                        truncated: true,
                    });
                }
            }
        }
    }
}

/// Builds a Pareto point with z1/z2 recomputed from the decision in index
/// order, so the frontier invariants hold on the reported values.
fn point_from(instance: &Instance, decision: Vec<bool>) -> ParetoPoint {
    let z1 = instance.z1_value(&decision);
    let z2 = instance.z2_value(&decision);
    ParetoPoint { decision, z1, z2 }
}
