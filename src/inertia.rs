//! Inertia weight schedules.

/// Inertia weight used at each iteration of a run.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Inertia {
  /// The same weight at every iteration.
  Constant(f64),
  /// Weight interpolated linearly from `start` at the first iteration to
  /// `end` at the last one.
  Linear {
    /// Weight at the first iteration.
    start: f64,
    /// Weight at the last iteration.
    end: f64,
  },
}

impl Inertia {
  /// Picks a constant or a decreasing schedule from configuration values.
  pub fn from_config(w: f64, decrement: bool, start: f64, end: f64) -> Self {
    if decrement {
      Self::Linear { start, end }
    } else {
      Self::Constant(w)
    }
  }

  /// Returns weight at `iteration` of a run of `iterations` iterations.
  /// A single-iteration run uses the start weight.
  pub fn at(self, iteration: usize, iterations: usize) -> f64 {
    match self {
      Self::Constant(w) => w,
      Self::Linear { start, .. } if iterations <= 1 => start,
      Self::Linear { start, end } => {
        let ratio = iteration as f64 / (iterations - 1) as f64;
        start + ratio * (end - start)
      }
    }
  }
}
