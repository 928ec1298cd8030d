//! Objective functions and their evaluation.

use std::fmt::Display;

use rayon::prelude::*;
use tracing::warn;

use crate::fitness::{Direction, Fitness};

/// A scalar objective of a position in the search space.
///
/// Implemented for every closure of type `Fn(&[f64]) -> f64`, so usually you
/// don't need to implement it yourself.
///
/// # Examples
/// ```
/// # use bioopt::objective::Objective;
/// let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
/// assert_eq!(sphere.evaluate(&[1.0, 2.0]), 5.0);
/// ```
///
/// **Note that you always can implement this trait instead of using closures.**
pub trait Objective {
  /// Returns fitness of given position. Non-finite values are replaced with
  /// the worst possible fitness by the optimizer.
  fn evaluate(&self, position: &[f64]) -> Fitness;
}

impl<F> Objective for F
where
  F: Fn(&[f64]) -> Fitness,
{
  fn evaluate(&self, position: &[f64]) -> Fitness {
    self(position)
  }
}

/// An [`Objective`] wrapper around a closure that may fail. A failed
/// evaluation is logged and scored as the worst possible fitness.
///
/// # Examples
/// ```
/// # use bioopt::objective::{Fallible, Objective};
/// let log = Fallible(|x: &[f64]| {
///   if x[0] > 0.0 {
///     Ok(x[0].ln())
///   } else {
///     Err("logarithm of a non-positive number")
///   }
/// });
/// assert_eq!(log.evaluate(&[1.0]), 0.0);
/// assert!(log.evaluate(&[-1.0]).is_nan());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Fallible<F>(pub F);

impl<F, E> Objective for Fallible<F>
where
  F: Fn(&[f64]) -> Result<Fitness, E>,
  E: Display,
{
  fn evaluate(&self, position: &[f64]) -> Fitness {
    match (self.0)(position) {
      Ok(fitness) => fitness,
      Err(e) => {
        warn!(error = %e, "objective evaluation failed");
        Fitness::NAN
      }
    }
  }
}

/// Sequential execution strategy marker, i.e. no parallelization involved.
pub enum SequentialExecution {}

/// Parallel execution strategy marker, evaluates each individual on the
/// [rayon] thread pool.
pub enum ParallelEachExecution {}

/// A wrapper around an objective that marks it to be evaluated in parallel
/// for **each** individual.
#[derive(Clone, Copy, Debug)]
pub struct ParEach<O> {
  objective: O,
}

impl<O> ParEach<O> {
  /// Returns wrapped objective.
  pub fn objective(&self) -> &O {
    &self.objective
  }
}

/// Converts an objective into its parallelized version.
pub trait IntoPar: Objective + Sync + Send + Sized {
  /// Creates a wrapper around given objective that marks it to be evaluated
  /// in parallel for **each** individual of the population.
  ///
  /// **Parallelization is implemented with [rayon]. As a result, for cheap
  /// objectives parallelization may only decrease performance because of
  /// additional overhead introduced. Benchmark if in doubt.**
  fn par_each(self) -> ParEach<Self> {
    ParEach { objective: self }
  }
}

impl<O> IntoPar for O where O: Objective + Sync + Send {}

/// Turns an objective into an evaluator according to its execution strategy.
/// Implemented for every [`Objective`] and for [`ParEach`] wrappers.
pub trait IntoEvaluator<ExecutionStrategy> {
  /// Boxes the objective, remembering how it must be executed.
  fn into_evaluator(self) -> Evaluator;
}

impl<O> IntoEvaluator<SequentialExecution> for O
where
  O: Objective + Send + 'static,
{
  fn into_evaluator(self) -> Evaluator {
    Evaluator::Sequential(Box::new(self))
  }
}

impl<O> IntoEvaluator<ParallelEachExecution> for ParEach<O>
where
  O: Objective + Sync + Send + 'static,
{
  fn into_evaluator(self) -> Evaluator {
    Evaluator::ParallelEach(Box::new(self.objective))
  }
}

/// A boxed objective together with its execution strategy.
pub enum Evaluator {
  /// Evaluated on the calling thread.
  Sequential(Box<dyn Objective + Send>),
  /// Evaluated on the rayon thread pool.
  ParallelEach(Box<dyn Objective + Sync + Send>),
}

impl std::fmt::Debug for Evaluator {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Sequential(_) => f.write_str("Evaluator::Sequential"),
      Self::ParallelEach(_) => f.write_str("Evaluator::ParallelEach"),
    }
  }
}

/// Adapter around a registered objective. Counts evaluations and replaces
/// failed or non-finite results with the worst fitness of the direction.
#[derive(Debug)]
pub struct ObjectiveFunction {
  evaluator: Evaluator,
  evaluations: usize,
}

impl ObjectiveFunction {
  /// Wraps given objective.
  pub fn new<ES>(objective: impl IntoEvaluator<ES>) -> Self {
    Self {
      evaluator: objective.into_evaluator(),
      evaluations: 0,
    }
  }

  /// Number of evaluations since creation or the last reset.
  pub fn evaluations(&self) -> usize {
    self.evaluations
  }

  /// Resets the evaluation counter.
  pub fn reset(&mut self) {
    self.evaluations = 0;
  }

  /// Evaluates a single position.
  pub fn evaluate(
    &mut self,
    position: &[f64],
    direction: Direction,
  ) -> Fitness {
    self.evaluations += 1;
    let fitness = match &self.evaluator {
      Evaluator::Sequential(o) => o.evaluate(position),
      Evaluator::ParallelEach(o) => o.evaluate(position),
    };
    sanitize(fitness, direction)
  }

  /// Evaluates every position, returning fitness values in the same order.
  /// All results are collected before returning.
  pub fn evaluate_all(
    &mut self,
    positions: &[&[f64]],
    direction: Direction,
  ) -> Vec<Fitness> {
    self.evaluations += positions.len();
    match &self.evaluator {
      Evaluator::Sequential(o) => positions
        .iter()
        .map(|p| sanitize(o.evaluate(p), direction))
        .collect(),
      Evaluator::ParallelEach(o) => positions
        .par_iter()
        .map(|p| sanitize(o.evaluate(p), direction))
        .collect(),
    }
  }
}

fn sanitize(fitness: Fitness, direction: Direction) -> Fitness {
  if fitness.is_finite() {
    fitness
  } else {
    warn!(%fitness, "non-finite fitness replaced with the worst value");
    direction.worst()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;

  fn as_evaluator<ES, E: IntoEvaluator<ES>>(e: E) -> ObjectiveFunction {
    ObjectiveFunction::new(e)
  }

  #[test]
  fn test_objective_from_closure() {
    let o = |x: &[f64]| x[0] * 2.0;
    assert_eq!(o.evaluate(&[1.5]), 3.0);
    as_evaluator(o);
    as_evaluator(o.par_each());
  }

  #[test]
  fn test_custom_objective() {
    struct Constant(f64);
    impl Objective for Constant {
      fn evaluate(&self, _: &[f64]) -> Fitness {
        self.0
      }
    }

    let mut f = as_evaluator(Constant(4.0));
    assert_eq!(f.evaluate(&[0.0], Direction::Minimize), 4.0);
    let mut f = as_evaluator(Constant(4.0).par_each());
    assert_eq!(f.evaluate(&[0.0], Direction::Minimize), 4.0);
  }

  #[test]
  fn test_non_finite_fitness_is_worst() {
    let mut f = as_evaluator(|x: &[f64]| x[0].ln());
    assert_eq!(f.evaluate(&[-1.0], Direction::Minimize), f64::INFINITY);
    assert_eq!(f.evaluate(&[0.0], Direction::Maximize), f64::NEG_INFINITY);
    assert_eq!(f.evaluate(&[1.0], Direction::Maximize), 0.0);
    assert_eq!(f.evaluations(), 3);
  }

  #[test]
  fn test_failed_evaluation_is_worst() {
    let o = Fallible(|x: &[f64]| {
      if x[0] >= 0.0 {
        Ok(x[0].sqrt())
      } else {
        Err(format!("negative input {}", x[0]))
      }
    });
    let mut f = as_evaluator(o);
    assert_eq!(f.evaluate(&[4.0], Direction::Minimize), 2.0);
    assert_eq!(f.evaluate(&[-4.0], Direction::Minimize), f64::INFINITY);
    assert_eq!(f.evaluate(&[-4.0], Direction::Maximize), f64::NEG_INFINITY);
  }

  #[test]
  fn test_evaluate_all_keeps_order_and_counts() {
    let positions: Vec<Vec<f64>> = (0..64).map(|i| vec![i as f64]).collect();
    let refs: Vec<&[f64]> = positions.iter().map(Vec::as_slice).collect();

    let mut seq = as_evaluator(|x: &[f64]| x[0] * x[0]);
    let mut par = as_evaluator((|x: &[f64]| x[0] * x[0]).par_each());
    let a = seq.evaluate_all(&refs, Direction::Minimize);
    let b = par.evaluate_all(&refs, Direction::Minimize);
    assert_eq!(a, b);
    assert_eq!(a[7], 49.0);
    assert_eq!(seq.evaluations(), 64);
    assert_eq!(par.evaluations(), 64);
    par.reset();
    assert_eq!(par.evaluations(), 0);
  }

  #[test]
  fn test_parallel_objective_is_called_once_per_position() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    let o = |x: &[f64]| {
      CALLS.fetch_add(1, Ordering::Relaxed);
      x[0]
    };
    let positions = vec![vec![1.0]; 10];
    let refs: Vec<&[f64]> = positions.iter().map(Vec::as_slice).collect();
    as_evaluator(o.par_each()).evaluate_all(&refs, Direction::Minimize);
    assert_eq!(CALLS.load(Ordering::Relaxed), 10);
  }
}
