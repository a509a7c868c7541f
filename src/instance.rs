//! Problem instance: item store and capacity.
//!
//! An [`Instance`] is constructed once per solve from validated input and
//! never mutated afterwards. Items are identified by their index `0..n-1`;
//! the two value coordinates define the objectives Z1 and Z2.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single knapsack item: weight plus one value per objective.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Item {
    /// Weight consumed against the capacity. Must be finite and >= 0.
    pub weight: f64,

    /// Contribution to the first objective (Z1). Must be finite and >= 0.
    pub value1: f64,

    /// Contribution to the second objective (Z2). Must be finite and >= 0.
    pub value2: f64,
}

impl Item {
    pub fn new(weight: f64, value1: f64, value2: f64) -> Self {
        Self {
            weight,
            value1,
            value2,
        }
    }
}

/// An immutable bi-objective knapsack instance.
///
/// # Examples
///
/// ```
/// use u_biknap::instance::{Instance, Item};
///
/// let instance = Instance::new(
///     vec![Item::new(2.0, 3.0, 4.0), Item::new(3.0, 5.0, 2.0)],
///     5.0,
/// );
/// assert!(instance.validate().is_ok());
/// assert_eq!(instance.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Instance {
    items: Vec<Item>,
    capacity: f64,
}

impl Instance {
    /// Creates an instance from an item list and a capacity.
    ///
    /// Call [`Instance::validate`] before handing the instance to a solver;
    /// solver entry points also validate and fail fast on malformed input.
    pub fn new(items: Vec<Item>, capacity: f64) -> Self {
        Self { items, capacity }
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the instance has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item list, in index order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// The knapsack capacity.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Weight coefficients in index order.
    pub fn weights(&self) -> Vec<f64> {
        self.items.iter().map(|it| it.weight).collect()
    }

    /// Z1 objective coefficients in index order.
    pub fn z1_coefficients(&self) -> Vec<f64> {
        self.items.iter().map(|it| it.value1).collect()
    }

    /// Z2 objective coefficients in index order.
    pub fn z2_coefficients(&self) -> Vec<f64> {
        self.items.iter().map(|it| it.value2).collect()
    }

    /// Total weight of a selection.
    pub fn selected_weight(&self, decision: &[bool]) -> f64 {
        self.items
            .iter()
            .zip(decision)
            .filter(|(_, &take)| take)
            .map(|(it, _)| it.weight)
            .sum()
    }

    /// Z1 value of a selection.
    pub fn z1_value(&self, decision: &[bool]) -> f64 {
        self.items
            .iter()
            .zip(decision)
            .filter(|(_, &take)| take)
            .map(|(it, _)| it.value1)
            .sum()
    }

    /// Z2 value of a selection.
    pub fn z2_value(&self, decision: &[bool]) -> f64 {
        self.items
            .iter()
            .zip(decision)
            .filter(|(_, &take)| take)
            .map(|(it, _)| it.value2)
            .sum()
    }

    /// Validates the instance.
    ///
    /// Rejects non-finite or negative capacity and any item with a
    /// non-finite or negative weight or value. Validation performs no
    /// search work; solvers call this before touching the decision tree.
    pub fn validate(&self) -> Result<(), String> {
        if !self.capacity.is_finite() || self.capacity < 0.0 {
            return Err(format!(
                "capacity must be finite and non-negative, got {}",
                self.capacity
            ));
        }
        for (i, item) in self.items.iter().enumerate() {
            if !item.weight.is_finite() || item.weight < 0.0 {
                return Err(format!(
                    "item {i}: weight must be finite and non-negative, got {}",
                    item.weight
                ));
            }
            if !item.value1.is_finite() || item.value1 < 0.0 {
                return Err(format!(
                    "item {i}: value1 must be finite and non-negative, got {}",
                    item.value1
                ));
            }
            if !item.value2.is_finite() || item.value2 < 0.0 {
                return Err(format!(
                    "item {i}: value2 must be finite and non-negative, got {}",
                    item.value2
                ));
            }
        }
        Ok(())
    }
}
