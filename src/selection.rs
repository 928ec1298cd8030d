//! Parent selection for the genetic algorithm.

use rand::Rng;

use crate::fitness::{Direction, Fitness};

/// Selects parents by tournaments: each pick draws `self.0` individuals
/// uniformly with replacement and keeps the best of them. Ties keep the
/// earlier drawn individual.
///
/// A tournament of size 1 is uniform random selection. Larger tournaments
/// increase selection pressure.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TournamentSelector(pub usize);

impl TournamentSelector {
  /// Returns indices of `count` selected individuals. `fitness` must not be
  /// empty.
  pub fn select<R: Rng + ?Sized>(
    &self,
    fitness: &[Fitness],
    direction: Direction,
    count: usize,
    rng: &mut R,
  ) -> Vec<usize> {
    let n = fitness.len();
    (0..count)
      .map(|_| {
        let mut winner = rng.gen_range(0..n);
        for _ in 1..self.0 {
          let challenger = rng.gen_range(0..n);
          if direction.is_better(fitness[challenger], fitness[winner]) {
            winner = challenger;
          }
        }
        winner
      })
      .collect()
  }
}
