//! Population members and their initialization.

use rand::Rng;

use crate::{
  fitness::{Direction, Fitness},
  space::SearchSpace,
};

/// A member of a population: a position in the search space and its last
/// evaluated fitness.
#[derive(Clone, PartialEq, Debug)]
pub struct Individual {
  pub(crate) position: Vec<f64>,
  pub(crate) fitness: Fitness,
}

impl Individual {
  pub(crate) fn new(position: Vec<f64>, direction: Direction) -> Self {
    Self {
      position,
      fitness: direction.worst(),
    }
  }

  /// Returns current position.
  pub fn position(&self) -> &[f64] {
    &self.position
  }

  /// Returns fitness from the last evaluation. Stale after the position has
  /// been updated and until the next evaluation.
  pub fn fitness(&self) -> Fitness {
    self.fitness
  }
}

/// A member of a particle swarm. Besides its position it carries a velocity
/// and remembers the best position it has visited.
#[derive(Clone, PartialEq, Debug)]
pub struct Particle {
  pub(crate) position: Vec<f64>,
  pub(crate) fitness: Fitness,
  pub(crate) velocity: Vec<f64>,
  pub(crate) best_position: Vec<f64>,
  pub(crate) best_fitness: Fitness,
}

impl Particle {
  pub(crate) fn new(
    position: Vec<f64>,
    velocity: Vec<f64>,
    direction: Direction,
  ) -> Self {
    Self {
      best_position: position.clone(),
      position,
      fitness: direction.worst(),
      velocity,
      best_fitness: direction.worst(),
    }
  }

  /// Returns current position.
  pub fn position(&self) -> &[f64] {
    &self.position
  }

  /// Returns fitness from the last evaluation.
  pub fn fitness(&self) -> Fitness {
    self.fitness
  }

  /// Returns current velocity.
  pub fn velocity(&self) -> &[f64] {
    &self.velocity
  }

  /// Returns the best position this particle has visited.
  pub fn best_position(&self) -> &[f64] {
    &self.best_position
  }

  /// Returns fitness of [`Particle::best_position`].
  pub fn best_fitness(&self) -> Fitness {
    self.best_fitness
  }

  /// Records the last evaluation, replacing the personal best on strict
  /// improvement.
  pub(crate) fn assess(&mut self, fitness: Fitness, direction: Direction) {
    self.fitness = fitness;
    if direction.is_better(fitness, self.best_fitness) {
      self.best_fitness = fitness;
      self.best_position.clone_from(&self.position);
    }
  }
}

/// Creates `count` initial positions, either sampled uniformly from the
/// search space or laid out evenly along its diagonal.
pub(crate) fn initial_positions<R: Rng + ?Sized>(
  space: &SearchSpace,
  count: usize,
  random: bool,
  rng: &mut R,
) -> Vec<Vec<f64>> {
  (0..count)
    .map(|i| {
      if random {
        space.sample(rng)
      } else {
        space.diagonal_point(i, count)
      }
    })
    .collect()
}

/// Creates a velocity for a new particle: zero, or uniform within a tenth of
/// each axis range in both directions.
pub(crate) fn initial_velocity<R: Rng + ?Sized>(
  space: &SearchSpace,
  random: bool,
  rng: &mut R,
) -> Vec<f64> {
  (0..space.dim())
    .map(|axis| {
      if random {
        let limit = 0.1 * space.range(axis);
        rng.gen_range(-limit..=limit)
      } else {
        0.0
      }
    })
    .collect()
}
