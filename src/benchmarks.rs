//! Objective functions for trying out and comparing optimizers.

use std::f64::consts::PI;

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal, NormalError};

/// Sum of squares. Unimodal, minimum `0` at the origin.
///
/// # Examples
/// ```
/// # use bioopt::benchmarks::sphere;
/// assert_eq!(sphere(&[1.0, -2.0]), 5.0);
/// ```
pub fn sphere(x: &[f64]) -> f64 {
  x.iter().map(|v| v * v).sum()
}

/// Rosenbrock's valley. Minimum `0` at `(1, 1, ..., 1)`.
pub fn rosenbrock(x: &[f64]) -> f64 {
  x.windows(2)
    .map(|w| {
      let a = w[1] - w[0] * w[0];
      let b = 1.0 - w[0];
      100.0 * a * a + b * b
    })
    .sum()
}

/// Rastrigin function. Highly multimodal, minimum `0` at the origin.
pub fn rastrigin(x: &[f64]) -> f64 {
  10.0 * x.len() as f64
    + x
      .iter()
      .map(|v| v * v - 10.0 * (2.0 * PI * v).cos())
      .sum::<f64>()
}

/// Noisy samples of a line `y = slope * x + intercept`, used to fit the
/// line back by minimizing [`LinearData::mse`] over `(slope, intercept)`.
///
/// # Examples
/// ```
/// # use bioopt::benchmarks::LinearData;
/// let data = LinearData::generate(2.0, 3.0, 0.0, 10, 42).unwrap();
/// assert!(data.mse(2.0, 3.0) < 1e-12);
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct LinearData {
  xs: Vec<f64>,
  ys: Vec<f64>,
}

impl LinearData {
  /// Samples `points` values of `x` uniformly from `[-5, 5]` and adds
  /// normal noise with standard deviation `noise_std` to each `y`.
  ///
  /// # Errors
  ///
  /// Returns [`NormalError`] if `noise_std` is negative or not finite.
  pub fn generate(
    slope: f64,
    intercept: f64,
    noise_std: f64,
    points: usize,
    seed: u64,
  ) -> Result<Self, NormalError> {
    if noise_std < 0.0 {
      return Err(NormalError::BadVariance);
    }
    let noise = Normal::new(0.0, noise_std)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let xs: Vec<f64> = (0..points).map(|_| rng.gen_range(-5.0..=5.0)).collect();
    let ys = xs
      .iter()
      .map(|x| slope * x + intercept + noise.sample(&mut rng))
      .collect();
    Ok(Self { xs, ys })
  }

  /// Returns sampled `x` values.
  pub fn xs(&self) -> &[f64] {
    &self.xs
  }

  /// Returns sampled `y` values.
  pub fn ys(&self) -> &[f64] {
    &self.ys
  }

  /// Mean squared error of the line `slope * x + intercept` over the samples.
  /// `0` for empty data.
  pub fn mse(&self, slope: f64, intercept: f64) -> f64 {
    if self.xs.is_empty() {
      return 0.0;
    }
    let sum: f64 = self
      .xs
      .iter()
      .zip(&self.ys)
      .map(|(x, y)| (slope * x + intercept - y).powi(2))
      .sum();
    sum / self.xs.len() as f64
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_minima() {
    assert_eq!(sphere(&[0.0; 4]), 0.0);
    assert_eq!(rosenbrock(&[1.0; 4]), 0.0);
    assert!(rastrigin(&[0.0; 4]).abs() < 1e-12);
    assert!(rastrigin(&[1.0, 0.0]) > 0.0);
  }

  #[test]
  fn test_linear_data_is_reproducible() {
    let a = LinearData::generate(2.0, 3.0, 0.5, 100, 42).unwrap();
    let b = LinearData::generate(2.0, 3.0, 0.5, 100, 42).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.xs().len(), 100);
    assert!(a.xs().iter().all(|x| (-5.0..=5.0).contains(x)));
    assert!(a.mse(2.0, 3.0) < a.mse(0.0, 0.0));
  }

  #[test]
  fn test_invalid_noise() {
    assert_eq!(
      LinearData::generate(1.0, 0.0, -1.0, 10, 0),
      Err(NormalError::BadVariance)
    );
    assert_eq!(
      LinearData::generate(1.0, 0.0, f64::NAN, 10, 0),
      Err(NormalError::BadVariance)
    );
    let empty = LinearData::generate(1.0, 0.0, 0.0, 0, 0).unwrap();
    assert_eq!(empty.mse(5.0, 5.0), 0.0);
  }
}
