//! Exact single-objective 0/1 knapsack optimizer.
//!
//! Maximizes a linear objective over boolean item decisions subject to the
//! capacity bound plus arbitrary linear side constraints (≤, =, ≥), via
//! depth-first branch-and-bound with the classical fractional-relaxation
//! upper bound.
//!
//! # Key Components
//!
//! - **Constraints**: [`LinearConstraint`], [`Relation`] — linear side
//!   constraints over the decision vector
//! - **Outcome**: [`SolveOutcome`] — `Optimal`, `Infeasible`, or `Truncated`
//! - **Engine**: [`BranchAndBound`] — the exact search
//! - **Config**: [`SolverConfig`] — tolerance and time/node budgets
//!
//! # Design
//!
//! The engine is the only producer of decision vectors; callers express
//! problem variants (lexicographic equality, epsilon floors) purely through
//! side constraints, so alternative exact backends can be swapped in behind
//! the same contract.
//!
//! # References
//!
//! - Martello & Toth (1990), "Knapsack Problems"
//! - Kolesar (1967), "A Branch and Bound Algorithm for the Knapsack Problem"

mod branch_bound;
mod config;
mod types;

pub use branch_bound::BranchAndBound;
pub use config::SolverConfig;
pub use types::{LinearConstraint, Relation, Solution, SolveOutcome, SolveReport};
