//! Fitness values and optimization direction.

use std::cmp::Ordering;

use itertools::Itertools;

/// An alias for a fitness value returned by an objective function.
pub type Fitness = f64;

/// Direction in which fitness is optimized.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Direction {
  /// Lower fitness is better.
  #[default]
  Minimize,
  /// Higher fitness is better.
  Maximize,
}

impl Direction {
  /// Returns `Minimize` if `minimize` is true, otherwise `Maximize`.
  pub fn from_minimize(minimize: bool) -> Self {
    if minimize {
      Self::Minimize
    } else {
      Self::Maximize
    }
  }

  /// Returns the worst possible fitness: `+inf` when minimizing and `-inf`
  /// when maximizing.
  pub fn worst(self) -> Fitness {
    match self {
      Self::Minimize => Fitness::INFINITY,
      Self::Maximize => Fitness::NEG_INFINITY,
    }
  }

  /// Returns `true` if `candidate` is strictly better than `incumbent`.
  pub fn is_better(self, candidate: Fitness, incumbent: Fitness) -> bool {
    match self {
      Self::Minimize => candidate < incumbent,
      Self::Maximize => candidate > incumbent,
    }
  }

  /// Orders fitness values from best to worst. Sorting with this comparator
  /// puts the best fitness first.
  pub fn rank_order(self, a: Fitness, b: Fitness) -> Ordering {
    match self {
      Self::Minimize => a.total_cmp(&b),
      Self::Maximize => b.total_cmp(&a),
    }
  }

  /// Returns indices of `fitness` ordered from best to worst. Equal values
  /// keep their original order.
  pub fn ranking(self, fitness: &[Fitness]) -> Vec<usize> {
    (0..fitness.len())
      .sorted_by(|&a, &b| self.rank_order(fitness[a], fitness[b]))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_worst_fitness() {
    assert_eq!(Direction::Minimize.worst(), f64::INFINITY);
    assert_eq!(Direction::Maximize.worst(), f64::NEG_INFINITY);
    assert!(!Direction::Minimize.is_better(Direction::Minimize.worst(), 1e300));
    assert!(
      !Direction::Maximize.is_better(Direction::Maximize.worst(), -1e300)
    );
  }

  #[test]
  fn test_strict_improvement() {
    assert!(Direction::Minimize.is_better(1.0, 2.0));
    assert!(!Direction::Minimize.is_better(2.0, 2.0));
    assert!(Direction::Maximize.is_better(2.0, 1.0));
    assert!(!Direction::Maximize.is_better(1.0, 1.0));
  }

  #[test]
  fn test_rank_order() {
    let mut v = vec![3.0, -1.0, 2.0];
    v.sort_by(|a, b| Direction::Minimize.rank_order(*a, *b));
    assert_eq!(v, [-1.0, 2.0, 3.0]);
    v.sort_by(|a, b| Direction::Maximize.rank_order(*a, *b));
    assert_eq!(v, [3.0, 2.0, -1.0]);
    assert_eq!(Direction::from_minimize(false), Direction::Maximize);
  }

  #[test]
  fn test_ranking_is_stable() {
    let fitness = [2.0, 1.0, 2.0, f64::INFINITY, 1.0];
    assert_eq!(Direction::Minimize.ranking(&fitness), [1, 4, 0, 2, 3]);
    assert_eq!(Direction::Maximize.ranking(&fitness), [3, 0, 2, 1, 4]);
    assert!(Direction::Minimize.ranking(&[]).is_empty());
  }
}
