//! Solver configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the branch-and-bound engine.
///
/// # Examples
///
/// ```
/// use u_biknap::solver::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_tolerance(1e-9)
///     .with_time_limit_ms(60_000)
///     .with_node_limit(10_000_000);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverConfig {
    /// Relative tolerance for floating-point comparisons.
    ///
    /// Each comparison scales this by `max(1, |reference value|)`, so it
    /// behaves relatively for large magnitudes and absolutely near zero.
    /// Equality side constraints are tolerance-bounded, never exact binary
    /// equality.
    pub tolerance: f64,

    /// Wall-clock budget per optimizer call, in milliseconds. 0 = no limit.
    ///
    /// Exceeding the budget yields a `Truncated` outcome carrying the
    /// incumbent found so far, distinct from `Optimal`.
    pub time_limit_ms: u64,

    /// Maximum number of search nodes per optimizer call. 0 = no limit.
    pub node_limit: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            time_limit_ms: 0,
            node_limit: 0,
        }
    }
}

impl SolverConfig {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = nodes;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(format!(
                "tolerance must be finite and positive, got {}",
                self.tolerance
            ));
        }
        if self.tolerance >= 1.0 {
            return Err(format!("tolerance must be less than 1, got {}", self.tolerance));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();
        assert!((config.tolerance - 1e-9).abs() < 1e-18);
        assert_eq!(config.time_limit_ms, 0);
        assert_eq!(config.node_limit, 0);
    }

    #[test]
    fn test_builder() {
        let config = SolverConfig::default()
            .with_tolerance(1e-6)
            .with_time_limit_ms(500)
            .with_node_limit(1_000);
        assert!((config.tolerance - 1e-6).abs() < 1e-15);
        assert_eq!(config.time_limit_ms, 500);
        assert_eq!(config.node_limit, 1_000);
    }

    #[test]
    fn test_validate_ok() {
        assert!(SolverConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_bad_tolerance() {
        assert!(SolverConfig::default().with_tolerance(0.0).validate().is_err());
        assert!(SolverConfig::default().with_tolerance(-1e-9).validate().is_err());
        assert!(SolverConfig::default().with_tolerance(f64::NAN).validate().is_err());
        assert!(SolverConfig::default().with_tolerance(2.0).validate().is_err());
    }
}
