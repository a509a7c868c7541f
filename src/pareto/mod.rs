//! Pareto frontier enumeration via the epsilon-constraint method.
//!
//! # Key Components
//!
//! - **Frontier**: [`ParetoPoint`], [`ParetoFrontier`] — the ordered
//!   non-dominated set handed back to callers
//! - **Seeding**: [`lexicographic_seed`] — Z1 first, then Z2 among
//!   Z1-optimal selections
//! - **Sweep**: [`EpsilonSweep`] — repeated re-maximization of Z1 under a
//!   rising Z2 floor until infeasibility
//!
//! # Method
//!
//! With a fixed epsilon step the sweep visits supported non-dominated
//! points in decreasing-Z1/increasing-Z2 order; efficient solutions that are
//! not epsilon-step-aligned may be skipped. This matches the classical
//! fixed-step epsilon-constraint method and is intentional.
//!
//! # References
//!
//! - Haimes, Lasdon & Wismer (1971), "On a Bicriterion Formulation..."
//! - Ehrgott (2005), "Multicriteria Optimization", ch. 4

mod driver;
mod types;

pub use driver::{lexicographic_seed, EpsilonSweep, SeedOutcome, SeedPoint, SweepResult};
pub use types::{ParetoFrontier, ParetoPoint};
