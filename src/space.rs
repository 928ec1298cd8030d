//! Box-bounded continuous search space.

use rand::Rng;

use crate::error::ConfigError;

/// A bound supplied in configuration: either one value broadcast to every
/// axis or an explicit value per axis.
///
/// # Examples
/// ```
/// # use bioopt::space::Bound;
/// let scalar: Bound = (-5.0).into();
/// let per_axis: Bound = vec![-1.0, 0.0].into();
/// # let _ = (scalar, per_axis);
/// ```
#[derive(Clone, PartialEq, Debug)]
pub enum Bound {
  /// The same value on every axis.
  Scalar(f64),
  /// One value per axis.
  PerAxis(Vec<f64>),
}

impl Bound {
  fn expand(
    &self,
    dim: usize,
    which: &'static str,
  ) -> Result<Vec<f64>, ConfigError> {
    match self {
      Self::Scalar(v) => Ok(vec![*v; dim]),
      Self::PerAxis(vs) if vs.len() == dim => Ok(vs.clone()),
      Self::PerAxis(vs) => Err(ConfigError::BoundLength {
        which,
        len: vs.len(),
        dim,
      }),
    }
  }
}

impl From<f64> for Bound {
  fn from(value: f64) -> Self {
    Self::Scalar(value)
  }
}

impl From<Vec<f64>> for Bound {
  fn from(values: Vec<f64>) -> Self {
    Self::PerAxis(values)
  }
}

impl From<&[f64]> for Bound {
  fn from(values: &[f64]) -> Self {
    Self::PerAxis(values.to_vec())
  }
}

impl<const N: usize> From<[f64; N]> for Bound {
  fn from(values: [f64; N]) -> Self {
    Self::PerAxis(values.to_vec())
  }
}

/// Per-axis lower and upper bounds. `lower[i] < upper[i]` holds for every
/// axis and never changes after construction.
#[derive(Clone, PartialEq, Debug)]
pub struct SearchSpace {
  lower: Vec<f64>,
  upper: Vec<f64>,
}

impl SearchSpace {
  /// Creates a search space of `dim` axes.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError`] if `dim` is zero, a bound sequence has a wrong
  /// length, the range of an axis is not finite or a lower bound is not
  /// strictly below its upper bound.
  pub fn new(
    dim: usize,
    lower: impl Into<Bound>,
    upper: impl Into<Bound>,
  ) -> Result<Self, ConfigError> {
    if dim == 0 {
      return Err(ConfigError::ZeroDimension);
    }
    let lower = lower.into().expand(dim, "lower")?;
    let upper = upper.into().expand(dim, "upper")?;
    for (axis, (&lo, &hi)) in lower.iter().zip(&upper).enumerate() {
      if !(hi - lo).is_finite() {
        return Err(ConfigError::NonFiniteBound { axis });
      }
      if lo >= hi {
        return Err(ConfigError::InvertedBounds {
          axis,
          lower: lo,
          upper: hi,
        });
      }
    }
    Ok(Self { lower, upper })
  }

  /// Returns the number of axes.
  pub fn dim(&self) -> usize {
    self.lower.len()
  }

  /// Returns lower bounds.
  pub fn lower(&self) -> &[f64] {
    &self.lower
  }

  /// Returns upper bounds.
  pub fn upper(&self) -> &[f64] {
    &self.upper
  }

  /// Returns `upper[axis] - lower[axis]`.
  pub fn range(&self, axis: usize) -> f64 {
    self.upper[axis] - self.lower[axis]
  }

  /// Returns `true` if every coordinate of `position` lies within bounds.
  pub fn contains(&self, position: &[f64]) -> bool {
    position.len() == self.dim()
      && position
        .iter()
        .zip(self.lower.iter().zip(&self.upper))
        .all(|(x, (lo, hi))| (lo..=hi).contains(&x))
  }

  /// Projects `value` onto the bounds of `axis`. Returns `None` if the value
  /// is already within bounds, otherwise the nearest bound.
  pub fn clamp_axis(&self, axis: usize, value: f64) -> Option<f64> {
    let (lo, hi) = (self.lower[axis], self.upper[axis]);
    if value < lo {
      Some(lo)
    } else if value > hi {
      Some(hi)
    } else if value.is_nan() {
      Some(lo + 0.5 * (hi - lo))
    } else {
      None
    }
  }

  /// Projects each out-of-range coordinate of `position` onto its nearest
  /// bound. NaN coordinates are moved to the middle of their axis.
  pub fn clamp(&self, position: &mut [f64]) {
    for (axis, x) in position.iter_mut().enumerate() {
      if let Some(bound) = self.clamp_axis(axis, *x) {
        *x = bound;
      }
    }
  }

  /// Draws a position uniformly from the box.
  pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
    self
      .lower
      .iter()
      .zip(&self.upper)
      .map(|(&lo, &hi)| rng.gen_range(lo..=hi))
      .collect()
  }

  /// Returns the `index`-th of `count` positions evenly spaced along the
  /// box diagonal. A single position sits in the middle of the box.
  pub fn diagonal_point(&self, index: usize, count: usize) -> Vec<f64> {
    let t = (index as f64 + 0.5) / count.max(1) as f64;
    self
      .lower
      .iter()
      .zip(&self.upper)
      .map(|(&lo, &hi)| lo + t * (hi - lo))
      .collect()
  }
}
