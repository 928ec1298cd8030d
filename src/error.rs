//! Errors reported by optimizers.

use thiserror::Error;

/// An invalid setting detected while constructing an optimizer or starting a
/// run. Nothing is evaluated when this error is returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
  /// Search space must have at least one dimension.
  #[error("search space dimension must be positive")]
  ZeroDimension,

  /// Population must have at least one member.
  #[error("number of individuals must be positive")]
  ZeroIndividuals,

  /// A run must execute at least one iteration.
  #[error("iteration count must be positive")]
  ZeroIterations,

  /// An explicit bound sequence does not match the search space dimension.
  #[error("{which} bound has {len} values, expected {dim}")]
  BoundLength {
    /// `"lower"` or `"upper"`.
    which: &'static str,
    /// Number of values supplied.
    len: usize,
    /// Search space dimension.
    dim: usize,
  },

  /// A bound is NaN or infinite, or the distance between the bounds of an
  /// axis overflows.
  #[error("bounds of axis {axis} or their range are not finite")]
  NonFiniteBound {
    /// Offending axis.
    axis: usize,
  },

  /// Lower bound is not strictly below the upper bound.
  #[error(
    "lower bound {lower} of axis {axis} is not below upper bound {upper}"
  )]
  InvertedBounds {
    /// Offending axis.
    axis: usize,
    /// Lower bound of the axis.
    lower: f64,
    /// Upper bound of the axis.
    upper: f64,
  },

  /// A numeric hyperparameter is outside of its valid range.
  #[error("{name} = {value} is out of range, expected {expected}")]
  OutOfRange {
    /// Hyperparameter name.
    name: &'static str,
    /// Supplied value.
    value: f64,
    /// Human readable description of the valid range.
    expected: &'static str,
  },

  /// Number of elites exceeds the population size.
  #[error("elitism count {elitism} exceeds population size {population}")]
  TooManyElites {
    /// Requested number of elites.
    elitism: usize,
    /// Population size.
    population: usize,
  },
}

/// An error returned by [`Optimizer::optimize`] and
/// [`Optimizer::optimize_for`].
///
/// [`Optimizer::optimize`]: crate::optimizer::Optimizer::optimize
/// [`Optimizer::optimize_for`]: crate::optimizer::Optimizer::optimize_for
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptimizeError {
  /// Run was configured with invalid settings.
  #[error(transparent)]
  Config(#[from] ConfigError),

  /// Run was started before an objective was registered.
  #[error("objective function is not set")]
  ObjectiveNotSet,
}
