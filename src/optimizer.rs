//! Optimizers and the run loop they share.
//!
//! Every optimizer runs the same loop, repeated for the requested number of
//! iterations:
//! 1. **Evaluate** each individual and update the best solution found so far
//! 2. **Update** positions according to the algorithm
//! 3. **Clamp** updated positions to the search space
//! 4. **Record** a population snapshot if history is enabled
//! 5. **Terminate** early if a registered [`Terminator`] says so

pub mod ga;
pub mod pso;
pub mod sma;

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info, info_span};

use crate::{
  error::{ConfigError, OptimizeError},
  fitness::{Direction, Fitness},
  history::{History, Snapshot},
  objective::{IntoEvaluator, ObjectiveFunction},
  space::SearchSpace,
  termination::{Progress, Terminator},
};

/// A position together with its fitness.
#[derive(Clone, PartialEq, Debug)]
pub struct Solution {
  position: Vec<f64>,
  fitness: Fitness,
}

impl Solution {
  /// Returns position of the solution.
  pub fn position(&self) -> &[f64] {
    &self.position
  }

  /// Returns fitness of the solution.
  pub fn fitness(&self) -> Fitness {
    self.fitness
  }
}

/// Represents an abstract optimizer of a bounded continuous objective.
pub trait Optimizer {
  /// Registers the objective to optimize, replacing the previous one.
  /// Wrap it with [`par_each()`] to evaluate individuals in parallel.
  ///
  /// [`par_each()`]: crate::objective::IntoPar::par_each
  fn set_objective<ES>(&mut self, objective: impl IntoEvaluator<ES>);

  /// Registers a terminator consulted once per iteration.
  fn set_terminator(&mut self, terminator: impl Terminator + Send + 'static);

  /// Runs for the configured `max_iter` iterations.
  ///
  /// # Errors
  ///
  /// Returns [`OptimizeError::ObjectiveNotSet`] if no objective is registered.
  fn optimize(&mut self) -> Result<(), OptimizeError>;

  /// Runs for `iterations` iterations, ignoring the configured `max_iter` for
  /// this call only.
  ///
  /// # Errors
  ///
  /// Returns [`OptimizeError::ObjectiveNotSet`] if no objective is registered
  /// and [`ConfigError::ZeroIterations`] if `iterations` is zero.
  fn optimize_for(&mut self, iterations: usize) -> Result<(), OptimizeError>;

  /// Returns the best solution of the last run, if there was one.
  fn best(&self) -> Option<&Solution>;

  /// Returns position of the best solution of the last run. Empty before
  /// the first run.
  fn best_solution(&self) -> &[f64] {
    self.best().map(Solution::position).unwrap_or_default()
  }

  /// Returns fitness of the best solution of the last run. Before the first
  /// run, returns the worst fitness of the configured direction.
  fn best_fitness(&self) -> Fitness;

  /// Returns snapshots recorded during the last run.
  fn population_history(&self) -> &History;

  /// Returns best fitness after each iteration of the last run.
  fn convergence(&self) -> &[Fitness];

  /// Returns the number of objective evaluations of the last run.
  fn evaluations(&self) -> usize;
}

/// Settings and per-run state shared by all optimizers.
pub(crate) struct RunState {
  pub(crate) space: SearchSpace,
  pub(crate) direction: Direction,
  pub(crate) rng: StdRng,
  max_iter: usize,
  seed: u64,
  verbose: bool,
  objective: Option<ObjectiveFunction>,
  terminator: Option<Box<dyn Terminator + Send>>,
  best: Option<Solution>,
  history: History,
  convergence: Vec<Fitness>,
  iteration: usize,
}

impl RunState {
  pub(crate) fn new(
    space: SearchSpace,
    minimize: bool,
    max_iter: usize,
    seed: u64,
    store_history: bool,
    verbose: bool,
  ) -> Result<Self, ConfigError> {
    if max_iter == 0 {
      return Err(ConfigError::ZeroIterations);
    }
    Ok(Self {
      space,
      direction: Direction::from_minimize(minimize),
      rng: StdRng::seed_from_u64(seed),
      max_iter,
      seed,
      verbose,
      objective: None,
      terminator: None,
      best: None,
      history: History::new(store_history),
      convergence: Vec::new(),
      iteration: 0,
    })
  }

  pub(crate) fn set_objective<ES>(
    &mut self,
    objective: impl IntoEvaluator<ES>,
  ) {
    self.objective = Some(ObjectiveFunction::new(objective));
  }

  pub(crate) fn set_terminator(
    &mut self,
    terminator: impl Terminator + Send + 'static,
  ) {
    self.terminator = Some(Box::new(terminator));
  }

  /// Checks preconditions and resets state left from the previous run.
  fn begin(&mut self, iterations: usize) -> Result<(), OptimizeError> {
    if iterations == 0 {
      return Err(ConfigError::ZeroIterations.into());
    }
    self
      .objective
      .as_mut()
      .ok_or(OptimizeError::ObjectiveNotSet)?
      .reset();
    self.rng = StdRng::seed_from_u64(self.seed);
    self.best = None;
    self.history.clear();
    self.convergence.clear();
    self.iteration = 0;
    Ok(())
  }

  /// Evaluates positions, returning their fitness in the same order.
  pub(crate) fn evaluate(
    &mut self,
    positions: &[&[f64]],
  ) -> Result<Vec<Fitness>, OptimizeError> {
    let direction = self.direction;
    Ok(
      self
        .objective
        .as_mut()
        .ok_or(OptimizeError::ObjectiveNotSet)?
        .evaluate_all(positions, direction),
    )
  }

  /// Replaces the best solution if `fitness` is a strict improvement. The
  /// first offered solution is always accepted.
  pub(crate) fn offer(&mut self, position: &[f64], fitness: Fitness) {
    let improves = self
      .best
      .as_ref()
      .map_or(true, |best| self.direction.is_better(fitness, best.fitness));
    if improves {
      self.best = Some(Solution {
        position: position.to_vec(),
        fitness,
      });
    }
  }

  pub(crate) fn best(&self) -> Option<&Solution> {
    self.best.as_ref()
  }

  pub(crate) fn best_fitness(&self) -> Fitness {
    self
      .best
      .as_ref()
      .map_or(self.direction.worst(), Solution::fitness)
  }

  pub(crate) fn history(&self) -> &History {
    &self.history
  }

  pub(crate) fn convergence(&self) -> &[Fitness] {
    &self.convergence
  }

  pub(crate) fn evaluations(&self) -> usize {
    self
      .objective
      .as_ref()
      .map_or(0, ObjectiveFunction::evaluations)
  }

  /// Closes an iteration. Returns `true` if the run must stop early.
  fn end_iteration(
    &mut self,
    iterations: usize,
    snapshot: Option<Snapshot>,
  ) -> bool {
    if let Some(snapshot) = snapshot {
      self.history.record(snapshot);
    }
    self.iteration += 1;
    let best_fitness = self.best_fitness();
    self.convergence.push(best_fitness);
    let evaluations = self.evaluations();
    if self.verbose {
      info!(iteration = self.iteration, best_fitness, "iteration finished");
    } else {
      debug!(iteration = self.iteration, best_fitness, evaluations);
    }

    let Some(terminator) = self.terminator.as_mut() else {
      return false;
    };
    let progress = Progress {
      iteration: self.iteration,
      iterations,
      best_fitness,
      best_position: self
        .best
        .as_ref()
        .map(Solution::position)
        .unwrap_or_default(),
      evaluations,
      direction: self.direction,
    };
    terminator.terminate(&progress)
  }
}

/// Steps of an optimization algorithm driven by [`run`].
pub(crate) trait Metaheuristic {
  /// Algorithm name used in logs.
  const NAME: &'static str;

  fn state(&self) -> &RunState;

  fn state_mut(&mut self) -> &mut RunState;

  /// Creates a fresh population.
  fn initialize(&mut self);

  /// Evaluates the population and updates best solutions.
  fn evaluate(&mut self) -> Result<(), OptimizeError>;

  /// Moves the population and clamps it to the search space.
  fn update(&mut self, iteration: usize, iterations: usize);

  /// Copies positions of the population.
  fn snapshot(&self) -> Snapshot;
}

/// Runs `optimizer` for `iterations` iterations or, if `None`, for its
/// configured maximum.
pub(crate) fn run<M: Metaheuristic>(
  optimizer: &mut M,
  iterations: Option<usize>,
) -> Result<(), OptimizeError> {
  let iterations = iterations.unwrap_or(optimizer.state().max_iter);
  optimizer.state_mut().begin(iterations)?;

  let span = info_span!("optimize", algorithm = M::NAME, iterations);
  let _enter = span.enter();

  optimizer.initialize();
  for iteration in 0..iterations {
    optimizer.evaluate()?;
    optimizer.update(iteration, iterations);
    let snapshot = optimizer
      .state()
      .history
      .is_enabled()
      .then(|| optimizer.snapshot());
    if optimizer.state_mut().end_iteration(iterations, snapshot) {
      info!(iteration = iteration + 1, "terminated early");
      break;
    }
  }

  let state = optimizer.state();
  debug!(
    best_fitness = state.best_fitness(),
    evaluations = state.evaluations(),
    "optimization finished"
  );
  Ok(())
}

/// Checks that a coefficient is finite and not negative.
pub(crate) fn non_negative(
  name: &'static str,
  value: f64,
) -> Result<f64, ConfigError> {
  if value.is_finite() && value >= 0.0 {
    Ok(value)
  } else {
    Err(ConfigError::OutOfRange {
      name,
      value,
      expected: "a finite non-negative number",
    })
  }
}

/// Checks that a value is finite.
pub(crate) fn finite(
  name: &'static str,
  value: f64,
) -> Result<f64, ConfigError> {
  if value.is_finite() {
    Ok(value)
  } else {
    Err(ConfigError::OutOfRange {
      name,
      value,
      expected: "a finite number",
    })
  }
}

/// Checks that a probability lies in `[0, 1]`.
pub(crate) fn probability(
  name: &'static str,
  value: f64,
) -> Result<f64, ConfigError> {
  if (0.0..=1.0).contains(&value) {
    Ok(value)
  } else {
    Err(ConfigError::OutOfRange {
      name,
      value,
      expected: "a probability in [0, 1]",
    })
  }
}
