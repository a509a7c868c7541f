//! Solver outcome and constraint types.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction of a linear side constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Relation {
    /// `coeffs · x <= rhs`
    Le,
    /// `coeffs · x == rhs` (tolerance-bounded at solve time)
    Eq,
    /// `coeffs · x >= rhs`
    Ge,
}

/// A linear constraint `coeffs · x ⋈ rhs` over the decision vector.
///
/// The capacity bound, the lexicographic `Z1 == z1*` equality, and the
/// epsilon-constraint `Z2 >= floor` inequality are all instances of this
/// shape; the engine treats them uniformly.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinearConstraint {
    /// One coefficient per item, in index order.
    pub coeffs: Vec<f64>,

    /// Constraint direction.
    pub relation: Relation,

    /// Right-hand side.
    pub rhs: f64,
}

impl LinearConstraint {
    /// `coeffs · x <= rhs`
    pub fn le(coeffs: Vec<f64>, rhs: f64) -> Self {
        Self {
            coeffs,
            relation: Relation::Le,
            rhs,
        }
    }

    /// `coeffs · x == rhs`
    pub fn eq(coeffs: Vec<f64>, rhs: f64) -> Self {
        Self {
            coeffs,
            relation: Relation::Eq,
            rhs,
        }
    }

    /// `coeffs · x >= rhs`
    pub fn ge(coeffs: Vec<f64>, rhs: f64) -> Self {
        Self {
            coeffs,
            relation: Relation::Ge,
            rhs,
        }
    }

    /// Left-hand side value for a complete decision vector.
    pub fn lhs(&self, decision: &[bool]) -> f64 {
        self.coeffs
            .iter()
            .zip(decision)
            .filter(|(_, &take)| take)
            .map(|(&c, _)| c)
            .sum()
    }

    /// Whether a complete decision satisfies the constraint within `tol`.
    ///
    /// `tol` is scaled by `max(1, |rhs|)` so it acts relatively for large
    /// right-hand sides.
    pub fn is_satisfied(&self, decision: &[bool], tol: f64) -> bool {
        let lhs = self.lhs(decision);
        let scaled = tol * self.rhs.abs().max(1.0);
        match self.relation {
            Relation::Le => lhs <= self.rhs + scaled,
            Relation::Eq => (lhs - self.rhs).abs() <= scaled,
            Relation::Ge => lhs >= self.rhs - scaled,
        }
    }
}

/// A feasible complete assignment together with its objective value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solution {
    /// Item inclusion flags, in index order. Never mutated after creation.
    pub decision: Vec<bool>,

    /// Objective value of the decision.
    pub objective: f64,
}

/// Outcome of one optimizer call.
///
/// The feasible region is bounded and the search exhaustive, so absent a
/// budget the only outcomes are a certified optimum or proven infeasibility.
/// `Infeasible` is a recoverable control value, not an error: it is the
/// normal stopping signal for the epsilon-constraint sweep.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolveOutcome {
    /// Certified global optimum.
    Optimal(Solution),

    /// No boolean assignment satisfies all constraints.
    Infeasible,

    /// A time/node budget expired or the search was cancelled before
    /// optimality was certified. Carries the incumbent, if any; it must
    /// never be mistaken for an optimum.
    Truncated(Option<Solution>),
}

impl SolveOutcome {
    /// Whether the outcome is a certified optimum.
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveOutcome::Optimal(_))
    }

    /// Whether the outcome is proven infeasibility.
    pub fn is_infeasible(&self) -> bool {
        matches!(self, SolveOutcome::Infeasible)
    }

    /// The certified optimal solution, if any.
    pub fn optimal(&self) -> Option<&Solution> {
        match self {
            SolveOutcome::Optimal(solution) => Some(solution),
            _ => None,
        }
    }
}

/// Result of one optimizer call: outcome plus search statistics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveReport {
    /// Outcome of the search.
    pub outcome: SolveOutcome,

    /// Number of decision-tree nodes visited.
    pub nodes: u64,
}
