//! Cooperative early termination.
//!
//! A run always stops after its iteration count. A [`Terminator`] can stop it
//! earlier: it is consulted once at the end of every iteration, after the
//! snapshot of that iteration has been recorded.

use crate::fitness::{Direction, Fitness};

/// State of a run at an iteration boundary.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Progress<'a> {
  /// Number of completed iterations, starting at 1.
  pub iteration: usize,
  /// Iteration count the run was started with.
  pub iterations: usize,
  /// Best fitness found so far.
  pub best_fitness: Fitness,
  /// Position of the best fitness found so far.
  pub best_position: &'a [f64],
  /// Number of objective evaluations so far.
  pub evaluations: usize,
  /// Optimization direction of the run.
  pub direction: Direction,
}

/// An operator that decides whether a run should stop early.
///
/// # Examples
/// ```
/// # use bioopt::termination::{Progress, Terminator};
/// // stop once the objective has been called 1000 times
/// let t = |p: &Progress| p.evaluations >= 1000;
/// # fn takes<T: Terminator>(_: T) {}
/// # takes(t);
/// ```
///
/// **Note that you always can implement this trait instead of using closures.**
pub trait Terminator {
  /// If returns `true`, the run is terminated.
  fn terminate(&mut self, progress: &Progress) -> bool;
}

impl<F> Terminator for F
where
  F: FnMut(&Progress) -> bool,
{
  fn terminate(&mut self, progress: &Progress) -> bool {
    self(progress)
  }
}

/// A `Terminator` that stops a run as soon as the best fitness is at least
/// as good as the target.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TargetTerminator(pub Fitness);

impl Terminator for TargetTerminator {
  fn terminate(&mut self, progress: &Progress) -> bool {
    !progress.direction.is_better(self.0, progress.best_fitness)
  }
}

/// A `Terminator` that stops a run after `patience` consecutive iterations
/// without strict improvement of the best fitness.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct StagnationTerminator {
  patience: usize,
  stalled: usize,
  best: Option<Fitness>,
}

impl StagnationTerminator {
  /// Creates a terminator tolerating `patience` iterations without
  /// improvement.
  pub fn new(patience: usize) -> Self {
    Self {
      patience,
      stalled: 0,
      best: None,
    }
  }
}

impl Terminator for StagnationTerminator {
  fn terminate(&mut self, progress: &Progress) -> bool {
    // a new run starts
    if progress.iteration <= 1 {
      self.stalled = 0;
      self.best = None;
    }
    match self.best {
      Some(best)
        if !progress.direction.is_better(progress.best_fitness, best) =>
      {
        self.stalled += 1;
      }
      _ => {
        self.best = Some(progress.best_fitness);
        self.stalled = 0;
      }
    }
    self.stalled >= self.patience
  }
}
