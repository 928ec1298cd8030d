//! Slime mould foraging optimizer.

use rand::Rng;
use typed_builder::TypedBuilder;

use super::{
  finite, non_negative, run, Metaheuristic, Optimizer, RunState, Solution,
};
use crate::{
  error::{ConfigError, OptimizeError},
  fitness::Fitness,
  history::{History, Snapshot},
  inertia::Inertia,
  objective::IntoEvaluator,
  population::{initial_positions, Individual},
  space::{Bound, SearchSpace},
  termination::Terminator,
};

/// Probability that an individual abandons its food source and heads for a
/// random point of the search space.
const RELOCATION_PROBABILITY: f64 = 0.03;

/// Configuration of [`Sma`].
///
/// # Examples
/// ```
/// # use bioopt::optimizer::sma::SmaConfig;
/// let config = SmaConfig::builder()
///   .num_individuals(30)
///   .dim(2)
///   .lower_bound(-5.0)
///   .upper_bound(5.0)
///   .max_iter(50)
///   .c1(1.5)
///   .c2(1.5)
///   .w(0.5)
///   .build();
/// # let _ = config;
/// ```
#[derive(TypedBuilder, Clone, PartialEq, Debug)]
pub struct SmaConfig {
  /// Number of individuals in the population.
  pub num_individuals: usize,
  /// Dimension of the search space.
  pub dim: usize,
  /// Lower bound, either one for all axes or one per axis.
  #[builder(setter(into))]
  pub lower_bound: Bound,
  /// Upper bound, either one for all axes or one per axis.
  #[builder(setter(into))]
  pub upper_bound: Bound,
  /// Default number of iterations of a run.
  pub max_iter: usize,
  /// Scales the pull toward the best solution.
  pub c1: f64,
  /// Scales exploratory moves.
  pub c2: f64,
  /// Step size multiplier, unless `use_w_decrement` is set.
  pub w: f64,
  /// Minimize if `true`, maximize otherwise.
  #[builder(default = true)]
  pub minimize: bool,
  /// Log every iteration at `info` level instead of `debug`.
  #[builder(default = false)]
  pub verbose: bool,
  /// Seed of the random generator; each run starts from it.
  #[builder(default = 42)]
  pub seed: u64,
  /// Sample the initial population uniformly. Otherwise individuals are
  /// spread evenly along the diagonal of the search space.
  #[builder(default = true)]
  pub random_init_positions: bool,
  /// Interpolate the step size from `w_start` to `w_end` over a run.
  #[builder(default = false)]
  pub use_w_decrement: bool,
  /// Step size at the first iteration when `use_w_decrement` is set.
  #[builder(default = 0.9)]
  pub w_start: f64,
  /// Step size at the last iteration when `use_w_decrement` is set.
  #[builder(default = 0.4)]
  pub w_end: f64,
  /// Record positions of the population after every iteration.
  #[builder(default = false)]
  pub store_history_each_iter: bool,
}

/// Slime mould optimizer.
///
/// Individuals are ranked by fitness every iteration. Better ranked ones
/// mostly exploit: they move toward the best solution found so far while
/// oscillating by the difference of two random individuals, with an
/// amplitude shrinking over the run. Worse ranked ones mostly explore by
/// moving toward another random individual. Occasionally an individual
/// heads for a random point of the search space instead.
///
/// # Examples
/// ```
/// # use bioopt::optimizer::{sma::{Sma, SmaConfig}, Optimizer};
/// let config = SmaConfig::builder()
///   .num_individuals(30)
///   .dim(2)
///   .lower_bound(-5.0)
///   .upper_bound(5.0)
///   .max_iter(50)
///   .c1(1.5)
///   .c2(1.5)
///   .w(0.5)
///   .build();
/// let mut sma = Sma::new(config).unwrap();
/// sma.set_objective(|x: &[f64]| x.iter().map(|v| v * v).sum::<f64>());
/// sma.optimize().unwrap();
/// assert!(sma.best_fitness() < 1e-2);
/// ```
pub struct Sma {
  c1: f64,
  c2: f64,
  inertia: Inertia,
  num_individuals: usize,
  random_init_positions: bool,
  state: RunState,
  population: Vec<Individual>,
}

impl Sma {
  /// Creates an optimizer from `config`.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError`] if the population or the search space is
  /// empty, bounds are invalid, `max_iter` is zero or a coefficient is out
  /// of range.
  pub fn new(config: SmaConfig) -> Result<Self, ConfigError> {
    if config.num_individuals == 0 {
      return Err(ConfigError::ZeroIndividuals);
    }
    let space =
      SearchSpace::new(config.dim, config.lower_bound, config.upper_bound)?;
    let inertia = Inertia::from_config(
      finite("w", config.w)?,
      config.use_w_decrement,
      finite("w_start", config.w_start)?,
      finite("w_end", config.w_end)?,
    );
    Ok(Self {
      c1: non_negative("c1", config.c1)?,
      c2: non_negative("c2", config.c2)?,
      inertia,
      num_individuals: config.num_individuals,
      random_init_positions: config.random_init_positions,
      state: RunState::new(
        space,
        config.minimize,
        config.max_iter,
        config.seed,
        config.store_history_each_iter,
        config.verbose,
      )?,
      population: Vec::new(),
    })
  }

  /// Returns the search space.
  pub fn space(&self) -> &SearchSpace {
    &self.state.space
  }

  /// Returns the population as left by the last run.
  pub fn population(&self) -> &[Individual] {
    &self.population
  }

  /// Moves the population by a single step, as at `iteration` of a run of
  /// `max_iter` iterations, ranking individuals by their last evaluated
  /// fitness. Iterations past the last one are treated as the last one.
  ///
  /// Nothing is evaluated or recorded, so the best solution, history and
  /// convergence trace stay as they are. Does nothing before the first run.
  pub fn update_positions(&mut self, iteration: usize) {
    let iterations = self.state.max_iter;
    self.update(iteration.min(iterations - 1), iterations);
  }
}

/// Position of `value` between the best and the worst fitness of an
/// iteration, `0` being the best. Not finite gaps count as the worst.
fn fitness_gap(best: Fitness, worst: Fitness, value: Fitness) -> f64 {
  if best == worst {
    return 0.0;
  }
  let gap = (value - best) / (worst - best);
  if gap.is_finite() {
    gap.clamp(0.0, 1.0)
  } else {
    1.0
  }
}

impl Metaheuristic for Sma {
  const NAME: &'static str = "sma";

  fn state(&self) -> &RunState {
    &self.state
  }

  fn state_mut(&mut self) -> &mut RunState {
    &mut self.state
  }

  fn initialize(&mut self) {
    let state = &mut self.state;
    self.population = initial_positions(
      &state.space,
      self.num_individuals,
      self.random_init_positions,
      &mut state.rng,
    )
    .into_iter()
    .map(|position| Individual::new(position, state.direction))
    .collect();
  }

  fn evaluate(&mut self) -> Result<(), OptimizeError> {
    let positions: Vec<&[f64]> =
      self.population.iter().map(|i| i.position()).collect();
    let fitness = self.state.evaluate(&positions)?;
    for (individual, fitness) in self.population.iter_mut().zip(fitness) {
      individual.fitness = fitness;
      self.state.offer(&individual.position, fitness);
    }
    Ok(())
  }

  fn update(&mut self, iteration: usize, iterations: usize) {
    let Some(food) = self.state.best().map(|s| s.position().to_vec()) else {
      return;
    };
    let n = self.population.len();
    let fitness: Vec<Fitness> =
      self.population.iter().map(Individual::fitness).collect();
    let order = self.state.direction.ranking(&fitness);
    let mut ranks = vec![0; n];
    for (rank, &i) in order.iter().enumerate() {
      ranks[i] = rank;
    }
    let best_fitness = fitness[order[0]];
    let worst_fitness = fitness[order[n - 1]];

    let step = self.inertia.at(iteration, iterations);
    let progress = (iteration + 1) as f64 / (iterations + 1) as f64;
    let amplitude = (1.0 - progress).atanh();
    // moves are computed from positions at the start of the iteration
    let previous: Vec<Vec<f64>> =
      self.population.iter().map(|i| i.position.clone()).collect();

    let space = &self.state.space;
    let rng = &mut self.state.rng;
    for (i, individual) in self.population.iter_mut().enumerate() {
      let rank = ranks[i];
      let q = if n > 1 {
        rank as f64 / (n - 1) as f64
      } else {
        0.0
      };
      let gap = fitness_gap(best_fitness, worst_fitness, fitness[i]);
      let spread = rng.gen::<f64>() * gap.ln_1p();
      let weight = if 2 * rank < n {
        1.0 + spread
      } else {
        1.0 - spread
      };

      let x = &mut individual.position;
      if rng.gen::<f64>() < RELOCATION_PROBABILITY {
        let target = space.sample(rng);
        for (x, t) in x.iter_mut().zip(target) {
          *x += step * self.c2 * rng.gen::<f64>() * (t - *x);
        }
      } else if rng.gen::<f64>() >= q {
        let vb = rng.gen_range(-amplitude..=amplitude);
        let a = &previous[rng.gen_range(0..n)];
        let b = &previous[rng.gen_range(0..n)];
        for (d, x) in x.iter_mut().enumerate() {
          let pull = self.c1 * rng.gen::<f64>() * (food[d] - *x);
          *x += step * (pull + vb * weight * (a[d] - b[d]));
        }
      } else {
        let other = match rng.gen_range(0..n.max(2) - 1) {
          j if j >= i => (j + 1).min(n - 1),
          j => j,
        };
        let target = &previous[other];
        for (x, t) in x.iter_mut().zip(target) {
          *x += step * self.c2 * rng.gen::<f64>() * (t - *x);
        }
      }
      space.clamp(x);
    }
  }

  fn snapshot(&self) -> Snapshot {
    self
      .population
      .iter()
      .map(|i| i.position.clone())
      .collect::<Vec<_>>()
      .into()
  }
}

impl Optimizer for Sma {
  fn set_objective<ES>(&mut self, objective: impl IntoEvaluator<ES>) {
    self.state.set_objective(objective);
  }

  fn set_terminator(&mut self, terminator: impl Terminator + Send + 'static) {
    self.state.set_terminator(terminator);
  }

  fn optimize(&mut self) -> Result<(), OptimizeError> {
    run(self, None)
  }

  fn optimize_for(&mut self, iterations: usize) -> Result<(), OptimizeError> {
    run(self, Some(iterations))
  }

  fn best(&self) -> Option<&Solution> {
    self.state.best()
  }

  fn best_fitness(&self) -> Fitness {
    self.state.best_fitness()
  }

  fn population_history(&self) -> &History {
    self.state.history()
  }

  fn convergence(&self) -> &[Fitness] {
    self.state.convergence()
  }

  fn evaluations(&self) -> usize {
    self.state.evaluations()
  }
}
