//! Mutation of offspring positions.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::{error::ConfigError, space::SearchSpace};

/// Per-coordinate mutation applied to an offspring. Each coordinate mutates
/// independently with the mutation rate of the optimizer.
#[derive(Clone, Debug)]
pub enum Mutation {
  /// A mutated coordinate is redrawn uniformly from its axis bounds.
  RandomReset,
  /// A mutated coordinate is shifted by a normally distributed offset with
  /// a per-axis standard deviation.
  Gaussian(Vec<Normal<f64>>),
}

impl Mutation {
  /// Creates a gaussian mutation. A non-positive `std` defaults to a tenth of
  /// each axis range.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::OutOfRange`] if `std` is not finite.
  pub fn gaussian(space: &SearchSpace, std: f64) -> Result<Self, ConfigError> {
    let out_of_range = || ConfigError::OutOfRange {
      name: "mutation_std",
      value: std,
      expected: "a finite number",
    };
    if !std.is_finite() {
      return Err(out_of_range());
    }
    (0..space.dim())
      .map(|axis| {
        let sigma = if std > 0.0 { std } else { 0.1 * space.range(axis) };
        Normal::new(0.0, sigma).map_err(|_| out_of_range())
      })
      .collect::<Result<_, _>>()
      .map(Self::Gaussian)
  }

  /// Mutates each coordinate of `genes` with probability `rate`. The result
  /// may leave the search space and must be clamped afterwards.
  pub fn mutate<R: Rng + ?Sized>(
    &self,
    genes: &mut [f64],
    rate: f64,
    space: &SearchSpace,
    rng: &mut R,
  ) {
    for (axis, gene) in genes.iter_mut().enumerate() {
      if rng.gen::<f64>() >= rate {
        continue;
      }
      match self {
        Self::RandomReset => {
          *gene = rng.gen_range(space.lower()[axis]..=space.upper()[axis]);
        }
        Self::Gaussian(offsets) => *gene += offsets[axis].sample(rng),
      }
    }
  }
}
