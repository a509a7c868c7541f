//! Pareto point and frontier types.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One accepted efficient solution: the selection and both objective values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParetoPoint {
    /// Item inclusion flags, in index order.
    pub decision: Vec<bool>,

    /// First objective value of the selection.
    pub z1: f64,

    /// Second objective value of the selection.
    pub z2: f64,
}

impl ParetoPoint {
    /// Both objective values as a pair.
    pub fn objectives(&self) -> (f64, f64) {
        (self.z1, self.z2)
    }

    /// Pareto dominance for maximization: at least as good in both
    /// objectives and strictly better in one.
    pub fn dominates(&self, other: &ParetoPoint) -> bool {
        self.z1 >= other.z1
            && self.z2 >= other.z2
            && (self.z1 > other.z1 || self.z2 > other.z2)
    }
}

/// Ordered sequence of Pareto points, append-only during a sweep and
/// read-only once handed to the caller.
///
/// Invariant over the accepted order: `z1` is non-increasing and `z2` is
/// non-decreasing, and no two points share an identical `(z1, z2)` pair.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParetoFrontier {
    points: Vec<ParetoPoint>,
}

impl ParetoFrontier {
    pub(crate) fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub(crate) fn push(&mut self, point: ParetoPoint) {
        self.points.push(point);
    }

    /// Number of accepted points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the frontier holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The accepted points, in sweep order (seed first).
    pub fn points(&self) -> &[ParetoPoint] {
        &self.points
    }

    /// The point at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&ParetoPoint> {
        self.points.get(index)
    }

    /// Iterates the points in sweep order.
    pub fn iter(&self) -> std::slice::Iter<'_, ParetoPoint> {
        self.points.iter()
    }

    /// Z1 values in frontier order, for plotting collaborators.
    pub fn z1_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.z1).collect()
    }

    /// Z2 values in frontier order, for plotting collaborators.
    pub fn z2_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.z2).collect()
    }
}

impl<'a> IntoIterator for &'a ParetoFrontier {
    type Item = &'a ParetoPoint;
    type IntoIter = std::slice::Iter<'a, ParetoPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
