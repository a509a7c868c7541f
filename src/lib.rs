//! Exact bi-objective 0/1 knapsack solver.
//!
//! Enumerates the full Pareto-efficient frontier of the bi-objective
//! 0/1 knapsack problem with the epsilon-constraint method, backed by a
//! self-contained exact branch-and-bound engine:
//!
//! - **Instance**: immutable item store (weight, two values) plus capacity,
//!   with fail-fast input validation.
//! - **Solver**: depth-first branch-and-bound maximizing a linear objective
//!   over boolean decisions under the capacity bound plus arbitrary linear
//!   side constraints (≤, =, ≥), with the classical fractional-relaxation
//!   upper bound for pruning.
//! - **Pareto**: lexicographic seeding (Z1 first, then Z2 among Z1-optimal
//!   selections) and the epsilon-constraint sweep that re-maximizes Z1 under
//!   a monotonically rising Z2 floor until infeasibility, collecting the
//!   non-dominated frontier in order.
//!
//! # Exactness
//!
//! Every accepted point carries a certified optimum: the engine searches the
//! complete decision tree, pruning only subtrees proven unable to beat the
//! incumbent. Time/node budgets and cancellation are supported but surface a
//! distinct truncated outcome, never silently degraded optima.
//!
//! # References
//!
//! - Haimes, Lasdon & Wismer (1971), "On a Bicriterion Formulation of the
//!   Problems of Integrated System Identification and System Optimization"
//! - Martello & Toth (1990), "Knapsack Problems: Algorithms and Computer
//!   Implementations"
//! - Ehrgott (2005), "Multicriteria Optimization"

pub mod instance;
pub mod pareto;
pub mod solver;
