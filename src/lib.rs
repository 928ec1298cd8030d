//! **bioopt** is a collection of nature-inspired optimizers for bounded
//! continuous problems: a slime mould optimizer, a particle swarm optimizer
//! and a genetic algorithm. It strives to be simple, reproducible and
//! focused on usage of closures.
//!
//! Here's a [quick start example](#example) for the impatient.
//!
//! # Optimizers
//!
//! Every optimizer implements the [`Optimizer`] trait and runs the same loop
//! over a population of candidate positions:
//! 1. **Evaluate** each position with the objective and remember the best
//!    solution found so far
//! 2. **Update** positions according to the algorithm
//! 3. **Clamp** updated positions to the search space
//! 4. **Record** a snapshot of the population, if asked to
//! 5. **Terminate** when the iteration budget is spent or a [`Terminator`]
//!    says so
//!
//! This crate features three implementations of [`Optimizer`]:
//! - [`Sma`] - ranks the population and blends exploitation of the best
//!   solution with exploration toward other individuals
//! - [`Pso`] - particles accelerate toward their own best and the best of the
//!   swarm or of a ring neighborhood
//! - [`Ga`] - elitism, tournament selection, crossover and mutation
//!
//! Each of them is configured with a builder from `typed-builder` crate, so
//! missing required settings are caught at compile time. Invalid values are
//! rejected with a [`ConfigError`] when an optimizer is created.
//!
//! Runs are deterministic: every run reseeds the random generator of an
//! optimizer with the configured seed, so the same configuration and
//! objective always give the same results.
//!
//! # Closures
//!
//! An objective is anything implementing [`Objective`], and closures of type
//! `Fn(&[f64]) -> f64` do. If your objective may fail, wrap a closure
//! returning `Result` into [`Fallible`]; failed evaluations count as the worst
//! fitness. So do NaN values. [`Terminator`] is implemented for closures of
//! type `FnMut(&Progress) -> bool` as well.
//!
//! # Parallelization
//!
//! Call [`par_each()`] on an objective to evaluate the population in
//! parallel with [rayon]. Results stay the same, only faster for expensive
//! objectives:
//! ```
//! # use bioopt::objective::IntoPar;
//! # use bioopt::optimizer::{pso::{Pso, PsoConfig}, Optimizer};
//! # let mut pso = Pso::new(PsoConfig::builder()
//! #   .num_individuals(10).dim(2).lower_bound(-1.0).upper_bound(1.0)
//! #   .max_iter(5).c1(1.5).c2(1.5).w(0.5).build()).unwrap();
//! let objective = |x: &[f64]| x.iter().map(|v| v.abs()).sum::<f64>();
//! pso.set_objective(objective.par_each());
//! # pso.optimize().unwrap();
//! ```
//!
//! For cheap objectives the overhead of parallelization usually only
//! decreases performance. Benchmark, if in doubt.
//!
//! # Logging
//!
//! Progress is reported through [tracing]. Each run is wrapped into an
//! `optimize` span; iterations are logged at `debug` level, or at `info` if
//! the optimizer is `verbose`. Install a subscriber to see them.
//!
//! # Example
//!
//! Fit a line `y = m * x + b` to noisy samples with the slime mould
//! optimizer:
//! ```no_run
//! # fn main() {
//! use bioopt::{
//!   benchmarks::LinearData,
//!   optimizer::{
//!     sma::{Sma, SmaConfig},
//!     Optimizer,
//!   },
//! };
//! // samples of `y = 2x + 3` with gaussian noise
//! let data = LinearData::generate(2.0, 3.0, 0.5, 100, 42).unwrap();
//! let config = SmaConfig::builder()
//!   .num_individuals(50)
//!   .dim(2)
//!   .lower_bound(-10.0)
//!   .upper_bound(10.0)
//!   .max_iter(200)
//!   .c1(1.5)
//!   .c2(1.5)
//!   .w(0.5)
//!   .store_history_each_iter(true)
//!   .build();
//! let mut sma = Sma::new(config).unwrap();
//! // a position is a pair `(m, b)`, its fitness is the mean squared error
//! sma.set_objective(move |p: &[f64]| data.mse(p[0], p[1]));
//! sma.optimize().unwrap();
//! println!("m = {}, b = {}", sma.best_solution()[0], sma.best_solution()[1]);
//! println!("{} snapshots recorded", sma.population_history().len());
//! # }
//! ```
//!
//! More examples live in the *demos* folder in the root of the project.
//!
//! [`Optimizer`]: crate::optimizer::Optimizer
//! [`Sma`]: crate::optimizer::sma::Sma
//! [`Pso`]: crate::optimizer::pso::Pso
//! [`Ga`]: crate::optimizer::ga::Ga
//! [`ConfigError`]: crate::error::ConfigError
//! [`Objective`]: crate::objective::Objective
//! [`Fallible`]: crate::objective::Fallible
//! [`Terminator`]: crate::termination::Terminator
//! [`par_each()`]: crate::objective::IntoPar::par_each
//! [rayon]: https://docs.rs/rayon
//! [tracing]: https://docs.rs/tracing

#![warn(missing_docs)]

pub mod benchmarks;
pub mod error;
pub mod fitness;
pub mod history;
pub mod inertia;
pub mod mutation;
pub mod objective;
pub mod optimizer;
pub mod population;
pub mod recombination;
pub mod selection;
pub mod space;
pub mod termination;
