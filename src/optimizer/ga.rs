//! Genetic algorithm.

use rand::Rng;
use typed_builder::TypedBuilder;

use super::{probability, run, Metaheuristic, Optimizer, RunState, Solution};
use crate::{
  error::{ConfigError, OptimizeError},
  fitness::Fitness,
  history::{History, Snapshot},
  mutation::Mutation,
  objective::IntoEvaluator,
  population::{initial_positions, Individual},
  recombination::Crossover,
  selection::TournamentSelector,
  space::{Bound, SearchSpace},
  termination::Terminator,
};

/// Configuration of [`Ga`].
///
/// # Examples
/// ```
/// # use bioopt::optimizer::ga::GaConfig;
/// let config = GaConfig::builder()
///   .num_individuals(50)
///   .dim(3)
///   .lower_bound(-5.0)
///   .upper_bound(5.0)
///   .max_iter(100)
///   .use_gaussian_mutation(true)
///   .mutation_rate(0.2)
///   .build();
/// # let _ = config;
/// ```
#[derive(TypedBuilder, Clone, PartialEq, Debug)]
pub struct GaConfig {
  /// Number of individuals in every generation.
  pub num_individuals: usize,
  /// Dimension of the search space.
  pub dim: usize,
  /// Lower bound, either one for all axes or one per axis.
  #[builder(setter(into))]
  pub lower_bound: Bound,
  /// Upper bound, either one for all axes or one per axis.
  #[builder(setter(into))]
  pub upper_bound: Bound,
  /// Default number of generations of a run.
  pub max_iter: usize,
  /// Probability that two parents are recombined. Otherwise the offspring
  /// is a copy of the first parent.
  #[builder(default = 0.7)]
  pub crossover_rate: f64,
  /// Probability that a single coordinate of an offspring mutates.
  #[builder(default = 0.01)]
  pub mutation_rate: f64,
  /// Number of contestants in a selection tournament.
  #[builder(default = 2)]
  pub tournament_size: usize,
  /// Number of best individuals copied unchanged into the next generation.
  #[builder(default = 1)]
  pub elitism_count: usize,
  /// Use uniform crossover if `true`, single point crossover otherwise.
  #[builder(default = true)]
  pub use_uniform_crossover: bool,
  /// Use gaussian mutation if `true`, random reset otherwise.
  #[builder(default = false)]
  pub use_gaussian_mutation: bool,
  /// Standard deviation of gaussian mutation. Non-positive values mean a
  /// tenth of each axis range.
  #[builder(default = 0.0)]
  pub mutation_std: f64,
  /// Minimize if `true`, maximize otherwise.
  #[builder(default = true)]
  pub minimize: bool,
  /// Log every generation at `info` level instead of `debug`.
  #[builder(default = false)]
  pub verbose: bool,
  /// Seed of the random generator; each run starts from it.
  #[builder(default = 42)]
  pub seed: u64,
  /// Sample the first generation uniformly. Otherwise individuals are
  /// spread evenly along the diagonal of the search space.
  #[builder(default = true)]
  pub random_init_positions: bool,
  /// Record positions of every generation.
  #[builder(default = false)]
  pub store_history_each_iter: bool,
}

/// Genetic algorithm.
///
/// Every generation keeps `elitism_count` best individuals and fills the
/// rest with offspring of parents drawn from a tournament mating pool.
/// Offspring are recombined, mutated and clamped to the search space.
///
/// # Examples
/// ```
/// # use bioopt::optimizer::{ga::{Ga, GaConfig}, Optimizer};
/// let config = GaConfig::builder()
///   .num_individuals(50)
///   .dim(2)
///   .lower_bound(-5.0)
///   .upper_bound(5.0)
///   .max_iter(100)
///   .use_gaussian_mutation(true)
///   .mutation_rate(0.2)
///   .build();
/// let mut ga = Ga::new(config).unwrap();
/// ga.set_objective(|x: &[f64]| x.iter().map(|v| v * v).sum::<f64>());
/// ga.optimize().unwrap();
/// assert!(ga.best_fitness() < 1.0);
/// ```
pub struct Ga {
  crossover: Crossover,
  crossover_rate: f64,
  mutation: Mutation,
  mutation_rate: f64,
  selector: TournamentSelector,
  elitism_count: usize,
  num_individuals: usize,
  random_init_positions: bool,
  state: RunState,
  population: Vec<Individual>,
}

impl Ga {
  /// Creates an optimizer from `config`.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError`] if the population or the search space is
  /// empty, bounds are invalid, `max_iter` or `tournament_size` is zero, a
  /// rate is not a probability or there are more elites than individuals.
  pub fn new(config: GaConfig) -> Result<Self, ConfigError> {
    if config.num_individuals == 0 {
      return Err(ConfigError::ZeroIndividuals);
    }
    if config.tournament_size == 0 {
      return Err(ConfigError::OutOfRange {
        name: "tournament_size",
        value: 0.0,
        expected: "at least 1",
      });
    }
    if config.elitism_count > config.num_individuals {
      return Err(ConfigError::TooManyElites {
        elitism: config.elitism_count,
        population: config.num_individuals,
      });
    }
    let space =
      SearchSpace::new(config.dim, config.lower_bound, config.upper_bound)?;
    let mutation = if config.use_gaussian_mutation {
      Mutation::gaussian(&space, config.mutation_std)?
    } else {
      Mutation::RandomReset
    };
    let crossover = if config.use_uniform_crossover {
      Crossover::Uniform
    } else {
      Crossover::SinglePoint
    };
    Ok(Self {
      crossover,
      crossover_rate: probability("crossover_rate", config.crossover_rate)?,
      mutation,
      mutation_rate: probability("mutation_rate", config.mutation_rate)?,
      selector: TournamentSelector(config.tournament_size),
      elitism_count: config.elitism_count,
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

  /// Returns the last generation of the last run.
  pub fn population(&self) -> &[Individual] {
    &self.population
  }
}

impl Metaheuristic for Ga {
  const NAME: &'static str = "ga";

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

  fn update(&mut self, _iteration: usize, _iterations: usize) {
    let n = self.population.len();
    let direction = self.state.direction;
    let fitness: Vec<Fitness> =
      self.population.iter().map(Individual::fitness).collect();
    let space = &self.state.space;
    let rng = &mut self.state.rng;

    let pool = self.selector.select(&fitness, direction, n, rng);
    let mut next: Vec<Individual> = direction
      .ranking(&fitness)
      .into_iter()
      .take(self.elitism_count)
      .map(|i| self.population[i].clone())
      .collect();
    while next.len() < n {
      let first = &self.population[pool[rng.gen_range(0..n)]].position;
      let second = &self.population[pool[rng.gen_range(0..n)]].position;
      let mut child = if rng.gen::<f64>() < self.crossover_rate {
        self.crossover.recombine(first, second, rng)
      } else {
        first.clone()
      };
      self.mutation.mutate(&mut child, self.mutation_rate, space, rng);
      space.clamp(&mut child);
      next.push(Individual::new(child, direction));
    }
    self.population = next;
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

impl Optimizer for Ga {
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

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{benchmarks::sphere, objective::IntoPar};

  fn sphere_config() -> GaConfig {
    GaConfig::builder()
      .num_individuals(50)
      .dim(2)
      .lower_bound(-5.0)
      .upper_bound(5.0)
      .max_iter(100)
      .use_gaussian_mutation(true)
      .mutation_rate(0.2)
      .store_history_each_iter(true)
      .build()
  }

  fn sphere_ga(config: GaConfig) -> Ga {
    let mut ga = Ga::new(config).unwrap();
    ga.set_objective(sphere);
    ga
  }

  #[test]
  fn test_sphere_improves() {
    let mut ga = sphere_ga(sphere_config());
    ga.optimize().unwrap();
    assert!(ga.best_fitness() < 0.25, "best {}", ga.best_fitness());
    assert_eq!(ga.evaluations(), 50 * 100);

    let mut ga = sphere_ga(GaConfig {
      use_uniform_crossover: false,
      use_gaussian_mutation: false,
      ..sphere_config()
    });
    ga.optimize().unwrap();
    assert!(ga.best_fitness() < 1.0, "best {}", ga.best_fitness());
  }

  #[test]
  fn test_history_stays_within_bounds() {
    let mut ga = sphere_ga(GaConfig {
      lower_bound: vec![0.5, -1.0].into(),
      upper_bound: vec![2.0, 1.0].into(),
      mutation_std: 5.0,
      ..sphere_config()
    });
    ga.optimize().unwrap();
    assert_eq!(ga.population_history().len(), 100);
    for snapshot in ga.population_history() {
      assert_eq!(snapshot.len(), 50);
      assert!(snapshot.positions().iter().all(|p| ga.space().contains(p)));
    }
    assert!(ga.space().contains(ga.best_solution()));
  }

  #[test]
  fn test_elites_survive() {
    let mut ga = sphere_ga(GaConfig {
      elitism_count: 2,
      max_iter: 1,
      ..sphere_config()
    });
    ga.optimize().unwrap();
    // the best of the first generation is copied into the second one first
    assert_eq!(ga.population()[0].position(), ga.best_solution());
    assert_eq!(ga.population().len(), 50);
  }

  #[test]
  fn test_full_elitism_freezes_population() {
    let mut ga = sphere_ga(GaConfig {
      num_individuals: 5,
      elitism_count: 5,
      max_iter: 3,
      ..sphere_config()
    });
    ga.optimize().unwrap();
    let history = ga.population_history();
    let mut first = history[0].positions().to_vec();
    let mut last = history[2].positions().to_vec();
    first.sort_by(|a, b| a[0].total_cmp(&b[0]));
    last.sort_by(|a, b| a[0].total_cmp(&b[0]));
    assert_eq!(first, last);
  }

  #[test]
  fn test_runs_are_deterministic() {
    let mut a = sphere_ga(sphere_config());
    let mut b = Ga::new(sphere_config()).unwrap();
    b.set_objective(sphere.par_each());
    a.optimize().unwrap();
    b.optimize().unwrap();
    assert_eq!(a.best(), b.best());
    assert_eq!(a.population_history(), b.population_history());
  }

  #[test]
  fn test_convergence_is_monotonic_when_maximizing() {
    let mut ga = Ga::new(GaConfig {
      minimize: false,
      ..sphere_config()
    })
    .unwrap();
    ga.set_objective(|x: &[f64]| -sphere(x));
    ga.optimize().unwrap();
    assert!(ga.convergence().windows(2).all(|w| w[1] >= w[0]));
    assert!(ga.best_fitness() > -0.25);
  }

  #[test]
  fn test_single_individual() {
    let mut ga = sphere_ga(GaConfig {
      num_individuals: 1,
      elitism_count: 0,
      ..sphere_config()
    });
    ga.optimize().unwrap();
    assert_eq!(ga.population().len(), 1);
    assert!(ga.best_fitness().is_finite());
  }

  #[test]
  fn test_invalid_configs() {
    let invalid = [
      (
        GaConfig {
          elitism_count: 51,
          ..sphere_config()
        },
        ConfigError::TooManyElites {
          elitism: 51,
          population: 50,
        },
      ),
      (
        GaConfig {
          tournament_size: 0,
          ..sphere_config()
        },
        ConfigError::OutOfRange {
          name: "tournament_size",
          value: 0.0,
          expected: "at least 1",
        },
      ),
      (
        GaConfig {
          crossover_rate: 1.5,
          ..sphere_config()
        },
        ConfigError::OutOfRange {
          name: "crossover_rate",
          value: 1.5,
          expected: "a probability in [0, 1]",
        },
      ),
      (
        GaConfig {
          mutation_std: f64::INFINITY,
          ..sphere_config()
        },
        ConfigError::OutOfRange {
          name: "mutation_std",
          value: f64::INFINITY,
          expected: "a finite number",
        },
      ),
    ];
    for (config, expected) in invalid {
      assert_eq!(Ga::new(config).err(), Some(expected));
    }
    assert!(Ga::new(GaConfig {
      mutation_rate: -0.1,
      ..sphere_config()
    })
    .is_err());
  }

  #[test]
  fn test_objective_is_required() {
    let mut ga = Ga::new(sphere_config()).unwrap();
    assert_eq!(ga.optimize(), Err(OptimizeError::ObjectiveNotSet));
  }
}
