//! Particle swarm optimizer.

use rand::Rng;
use typed_builder::TypedBuilder;

use super::{
  finite, non_negative, run, Metaheuristic, Optimizer, RunState, Solution,
};
use crate::{
  error::{ConfigError, OptimizeError},
  fitness::{Direction, Fitness},
  history::{History, Snapshot},
  inertia::Inertia,
  objective::IntoEvaluator,
  population::{initial_positions, initial_velocity, Particle},
  space::{Bound, SearchSpace},
  termination::Terminator,
};

/// Configuration of [`Pso`].
///
/// # Examples
/// ```
/// # use bioopt::optimizer::pso::PsoConfig;
/// let config = PsoConfig::builder()
///   .num_individuals(30)
///   .dim(2)
///   .lower_bound(vec![-5.0, 0.0])
///   .upper_bound(vec![5.0, 1.0])
///   .max_iter(50)
///   .c1(1.5)
///   .c2(1.5)
///   .w(0.5)
///   .v_max(0.5)
///   .use_ring_topology(true)
///   .build();
/// # let _ = config;
/// ```
#[derive(TypedBuilder, Clone, PartialEq, Debug)]
pub struct PsoConfig {
  /// Number of particles in the swarm.
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
  /// Cognitive coefficient, the pull toward a particle's own best.
  pub c1: f64,
  /// Social coefficient, the pull toward the global or neighborhood best.
  pub c2: f64,
  /// Inertia weight, unless `use_w_decrement` is set.
  pub w: f64,
  /// Velocity cap per component. `0` disables the cap.
  #[builder(default = 0.0)]
  pub v_max: f64,
  /// Minimize if `true`, maximize otherwise.
  #[builder(default = true)]
  pub minimize: bool,
  /// Log every iteration at `info` level instead of `debug`.
  #[builder(default = false)]
  pub verbose: bool,
  /// Seed of the random generator; each run starts from it.
  #[builder(default = 42)]
  pub seed: u64,
  /// Sample initial positions uniformly. Otherwise particles are spread
  /// evenly along the diagonal of the search space.
  #[builder(default = true)]
  pub random_init_positions: bool,
  /// Start with random velocities instead of zero ones.
  #[builder(default = true)]
  pub velocity_init_random: bool,
  /// Interpolate the inertia weight from `w_start` to `w_end` over a run.
  #[builder(default = false)]
  pub use_w_decrement: bool,
  /// Inertia weight at the first iteration when `use_w_decrement` is set.
  #[builder(default = 0.9)]
  pub w_start: f64,
  /// Inertia weight at the last iteration when `use_w_decrement` is set.
  #[builder(default = 0.4)]
  pub w_end: f64,
  /// Record positions of the swarm after every iteration.
  #[builder(default = false)]
  pub store_history_each_iter: bool,
  /// Attract each particle to the best of its ring neighborhood instead of
  /// the global best.
  #[builder(default = false)]
  pub use_ring_topology: bool,
  /// Number of neighbors on each side of a particle in the ring.
  #[builder(default = 1)]
  pub neighbor_size: usize,
}

/// Particle swarm optimizer.
///
/// Each particle keeps a velocity and accelerates toward the best position
/// it has visited and toward the best position known to the swarm. With
/// ring topology the latter is the best personal best among
/// `neighbor_size` neighbors on either side, which slows down the spread of
/// information and helps on multimodal objectives.
///
/// The global best is tracked for reporting regardless of the topology.
///
/// # Examples
/// ```
/// # use bioopt::optimizer::{pso::{Pso, PsoConfig}, Optimizer};
/// let config = PsoConfig::builder()
///   .num_individuals(30)
///   .dim(2)
///   .lower_bound(-5.0)
///   .upper_bound(5.0)
///   .max_iter(50)
///   .c1(1.5)
///   .c2(1.5)
///   .w(0.5)
///   .build();
/// let mut pso = Pso::new(config).unwrap();
/// pso.set_objective(|x: &[f64]| x.iter().map(|v| v * v).sum::<f64>());
/// pso.optimize().unwrap();
/// assert!(pso.best_fitness() < 1e-2);
/// ```
pub struct Pso {
  c1: f64,
  c2: f64,
  v_max: f64,
  inertia: Inertia,
  num_individuals: usize,
  random_init_positions: bool,
  velocity_init_random: bool,
  neighbor_size: Option<usize>,
  state: RunState,
  swarm: Vec<Particle>,
}

impl Pso {
  /// Creates an optimizer from `config`.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError`] if the swarm or the search space is empty,
  /// bounds are invalid, `max_iter` is zero or a coefficient is out of range.
  pub fn new(config: PsoConfig) -> Result<Self, ConfigError> {
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
      v_max: non_negative("v_max", config.v_max)?,
      inertia,
      num_individuals: config.num_individuals,
      random_init_positions: config.random_init_positions,
      velocity_init_random: config.velocity_init_random,
      neighbor_size: config.use_ring_topology.then_some(config.neighbor_size),
      state: RunState::new(
        space,
        config.minimize,
        config.max_iter,
        config.seed,
        config.store_history_each_iter,
        config.verbose,
      )?,
      swarm: Vec::new(),
    })
  }

  /// Returns the search space.
  pub fn space(&self) -> &SearchSpace {
    &self.state.space
  }

  /// Returns the swarm as left by the last run.
  pub fn population(&self) -> &[Particle] {
    &self.swarm
  }
}

/// Returns the index of the particle with the best personal best among
/// `k` neighbors on each side of `i`, wrapping around the swarm. The window
/// is scanned from `i - k` to `i + k` and ties keep the first found.
fn neighborhood_best(
  swarm: &[Particle],
  i: usize,
  k: usize,
  direction: Direction,
) -> usize {
  let n = swarm.len();
  let k = k.min(n);
  (0..=2 * k)
    .map(|offset| (i + n + offset - k) % n)
    .reduce(|best, j| {
      if direction.is_better(swarm[j].best_fitness, swarm[best].best_fitness) {
        j
      } else {
        best
      }
    })
    .unwrap_or(i)
}

impl Metaheuristic for Pso {
  const NAME: &'static str = "pso";

  fn state(&self) -> &RunState {
    &self.state
  }

  fn state_mut(&mut self) -> &mut RunState {
    &mut self.state
  }

  fn initialize(&mut self) {
    let state = &mut self.state;
    let positions = initial_positions(
      &state.space,
      self.num_individuals,
      self.random_init_positions,
      &mut state.rng,
    );
    self.swarm = positions
      .into_iter()
      .map(|position| {
        let velocity = initial_velocity(
          &state.space,
          self.velocity_init_random,
          &mut state.rng,
        );
        Particle::new(position, velocity, state.direction)
      })
      .collect();
  }

  fn evaluate(&mut self) -> Result<(), OptimizeError> {
    let positions: Vec<&[f64]> =
      self.swarm.iter().map(|p| p.position()).collect();
    let fitness = self.state.evaluate(&positions)?;
    let direction = self.state.direction;
    for (particle, fitness) in self.swarm.iter_mut().zip(fitness) {
      particle.assess(fitness, direction);
      self.state.offer(&particle.position, fitness);
    }
    Ok(())
  }

  fn update(&mut self, iteration: usize, iterations: usize) {
    let Some(global) = self.state.best().map(|s| s.position().to_vec()) else {
      return;
    };
    let attractors: Vec<usize> = match self.neighbor_size {
      Some(k) => (0..self.swarm.len())
        .map(|i| neighborhood_best(&self.swarm, i, k, self.state.direction))
        .collect(),
      None => Vec::new(),
    };
    let attractors: Vec<Vec<f64>> = attractors
      .into_iter()
      .map(|j| self.swarm[j].best_position.clone())
      .collect();

    let w = self.inertia.at(iteration, iterations);
    let space = &self.state.space;
    let rng = &mut self.state.rng;
    for (i, particle) in self.swarm.iter_mut().enumerate() {
      let social = attractors.get(i).unwrap_or(&global);
      for d in 0..space.dim() {
        let x = particle.position[d];
        let cognitive =
          self.c1 * rng.gen::<f64>() * (particle.best_position[d] - x);
        let pull = self.c2 * rng.gen::<f64>() * (social[d] - x);
        let mut v = w * particle.velocity[d] + cognitive + pull;
        if self.v_max > 0.0 {
          v = v.clamp(-self.v_max, self.v_max);
        }
        match space.clamp_axis(d, x + v) {
          Some(bound) => {
            particle.position[d] = bound;
            particle.velocity[d] = 0.0;
          }
          None => {
            particle.position[d] = x + v;
            particle.velocity[d] = v;
          }
        }
      }
    }
  }

  fn snapshot(&self) -> Snapshot {
    self
      .swarm
      .iter()
      .map(|p| p.position.clone())
      .collect::<Vec<_>>()
      .into()
  }
}

impl Optimizer for Pso {
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
  use crate::{
    benchmarks::{rastrigin, sphere, LinearData},
    objective::IntoPar,
    termination::StagnationTerminator,
  };

  fn sphere_config() -> PsoConfig {
    PsoConfig::builder()
      .num_individuals(30)
      .dim(2)
      .lower_bound(-5.0)
      .upper_bound(5.0)
      .max_iter(50)
      .c1(1.5)
      .c2(1.5)
      .w(0.5)
      .store_history_each_iter(true)
      .build()
  }

  fn sphere_pso(config: PsoConfig) -> Pso {
    let mut pso = Pso::new(config).unwrap();
    pso.set_objective(sphere);
    pso
  }

  fn particle(best_fitness: Fitness) -> Particle {
    let mut p =
      Particle::new(vec![best_fitness], vec![0.0], Direction::Minimize);
    p.assess(best_fitness, Direction::Minimize);
    p
  }

  #[test]
  fn test_sphere_converges_near_origin() {
    let mut pso = sphere_pso(sphere_config());
    pso.optimize().unwrap();
    assert!(pso.best_fitness() < 1e-2, "best {}", pso.best_fitness());
    assert!(sphere(pso.best_solution()).sqrt() < 0.5);
    assert_eq!(pso.evaluations(), 30 * 50);
  }

  #[test]
  fn test_linear_regression_recovers_parameters() {
    let data = LinearData::generate(2.0, 3.0, 0.5, 100, 42).unwrap();
    let config = PsoConfig::builder()
      .num_individuals(50)
      .dim(2)
      .lower_bound(-10.0)
      .upper_bound(10.0)
      .max_iter(200)
      .c1(1.5)
      .c2(1.5)
      .w(0.5)
      .build();
    let mut pso = Pso::new(config).unwrap();
    pso.set_objective(move |p: &[f64]| data.mse(p[0], p[1]));
    pso.optimize().unwrap();
    let (m, b) = (pso.best_solution()[0], pso.best_solution()[1]);
    assert!((m - 2.0).abs() < 0.5, "m = {m}");
    assert!((b - 3.0).abs() < 0.5, "b = {b}");
  }

  #[test]
  fn test_ring_topology_on_sphere() {
    let mut pso = sphere_pso(PsoConfig {
      use_ring_topology: true,
      neighbor_size: 2,
      max_iter: 100,
      ..sphere_config()
    });
    pso.optimize().unwrap();
    assert!(pso.best_fitness() < 1e-2, "best {}", pso.best_fitness());
  }

  #[test]
  fn test_neighborhood_best() {
    let swarm: Vec<Particle> =
      [5.0, 1.0, 4.0, 1.0, 3.0, 0.5].into_iter().map(particle).collect();
    let min = Direction::Minimize;
    assert_eq!(neighborhood_best(&swarm, 2, 1, min), 1);
    // window of particle 0 wraps around to the last one
    assert_eq!(neighborhood_best(&swarm, 0, 1, min), 5);
    assert_eq!(neighborhood_best(&swarm, 4, 0, min), 4);
    // ties keep the first particle in window order
    assert_eq!(neighborhood_best(&swarm, 2, 2, min), 1);
    assert_eq!(neighborhood_best(&swarm, 3, 1, Direction::Maximize), 2);
    // neighborhoods wider than the swarm cover all of it
    assert_eq!(neighborhood_best(&swarm, 1, 100, min), 5);
  }

  #[test]
  fn test_history_stays_within_bounds() {
    let mut pso = Pso::new(PsoConfig {
      lower_bound: vec![-1.0, 2.0].into(),
      upper_bound: vec![1.0, 3.0].into(),
      ..sphere_config()
    })
    .unwrap();
    // optimum lies outside the box, so particles keep hitting its walls
    pso.set_objective(|x: &[f64]| (x[0] - 4.0).powi(2) + x[1].powi(2));
    pso.optimize().unwrap();
    assert_eq!(pso.population_history().len(), 50);
    for snapshot in pso.population_history() {
      assert!(snapshot.positions().iter().all(|p| pso.space().contains(p)));
    }
    let best = pso.best_solution();
    assert!((best[0] - 1.0).abs() < 1e-2 && (best[1] - 2.0).abs() < 1e-2);
  }

  #[test]
  fn test_clamped_coordinates_stop() {
    let mut pso = Pso::new(PsoConfig {
      lower_bound: vec![-1.0, 2.0].into(),
      upper_bound: vec![1.0, 3.0].into(),
      max_iter: 1,
      ..sphere_config()
    })
    .unwrap();
    pso.set_objective(sphere);
    pso.optimize().unwrap();
    let space = pso.space();
    for p in pso.population() {
      let coordinates = p.position().iter().zip(p.velocity());
      for (axis, (&x, &v)) in coordinates.enumerate() {
        let on_bound = x == space.lower()[axis] || x == space.upper()[axis];
        assert!(!on_bound || v == 0.0);
      }
    }
  }

  #[test]
  fn test_velocity_cap() {
    let mut pso = sphere_pso(PsoConfig {
      v_max: 0.1,
      max_iter: 5,
      ..sphere_config()
    });
    pso.optimize().unwrap();
    let capped = pso
      .population()
      .iter()
      .flat_map(Particle::velocity)
      .all(|v| v.abs() <= 0.1);
    assert!(capped);
  }

  #[test]
  fn test_runs_are_deterministic() {
    for ring in [false, true] {
      let config = PsoConfig {
        use_ring_topology: ring,
        ..sphere_config()
      };
      let mut a = sphere_pso(config.clone());
      let mut b = Pso::new(config).unwrap();
      b.set_objective(sphere.par_each());
      a.optimize().unwrap();
      b.optimize().unwrap();
      assert_eq!(a.best(), b.best());
      assert_eq!(a.population_history(), b.population_history());
    }
  }

  #[test]
  fn test_convergence_is_monotonic() {
    let mut pso = sphere_pso(sphere_config());
    pso.optimize().unwrap();
    assert!(pso.convergence().windows(2).all(|w| w[1] <= w[0]));

    let mut pso = Pso::new(PsoConfig {
      minimize: false,
      ..sphere_config()
    })
    .unwrap();
    pso.set_objective(|x: &[f64]| -rastrigin(x));
    pso.optimize().unwrap();
    assert!(pso.convergence().windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(pso.convergence().last(), Some(&pso.best_fitness()));
  }

  #[test]
  fn test_personal_bests_never_worse_than_current() {
    let mut pso = sphere_pso(PsoConfig {
      max_iter: 10,
      ..sphere_config()
    });
    pso.optimize().unwrap();
    for p in pso.population() {
      assert!(p.best_fitness() >= pso.best_fitness());
      assert_eq!(sphere(p.best_position()), p.best_fitness());
    }
  }

  #[test]
  fn test_deterministic_initialization() {
    let mut pso = sphere_pso(PsoConfig {
      num_individuals: 4,
      random_init_positions: false,
      velocity_init_random: false,
      max_iter: 1,
      ..sphere_config()
    });
    pso.optimize().unwrap();
    // evenly spaced along the diagonal: -3.75, -1.25, 1.25, 3.75
    assert_eq!(pso.best_solution(), [-1.25, -1.25]);
    assert_eq!(pso.best_fitness(), 3.125);
  }

  #[test]
  fn test_single_particle_and_iteration() {
    let mut pso = sphere_pso(PsoConfig {
      num_individuals: 1,
      use_ring_topology: true,
      ..sphere_config()
    });
    pso.optimize().unwrap();
    assert_eq!(pso.population().len(), 1);
    assert!(pso.space().contains(pso.best_solution()));

    let mut pso = sphere_pso(PsoConfig {
      max_iter: 1,
      ..sphere_config()
    });
    pso.optimize().unwrap();
    assert_eq!(pso.population_history().len(), 1);
    assert_eq!(pso.evaluations(), 30);
  }

  #[test]
  fn test_stagnation_stops_early() {
    let mut pso = Pso::new(sphere_config()).unwrap();
    // a flat objective never improves after the first evaluation
    pso.set_objective(|_: &[f64]| 1.0);
    pso.set_terminator(StagnationTerminator::new(3));
    pso.optimize().unwrap();
    assert_eq!(pso.convergence().len(), 4);
    assert_eq!(pso.population_history().len(), 4);
  }

  #[test]
  fn test_invalid_configs() {
    assert_eq!(
      Pso::new(PsoConfig {
        v_max: -1.0,
        ..sphere_config()
      })
      .err(),
      Some(ConfigError::OutOfRange {
        name: "v_max",
        value: -1.0,
        expected: "a finite non-negative number",
      })
    );
    assert_eq!(
      Pso::new(PsoConfig {
        num_individuals: 0,
        ..sphere_config()
      })
      .err(),
      Some(ConfigError::ZeroIndividuals)
    );
    assert_eq!(
      Pso::new(PsoConfig {
        upper_bound: vec![1.0, 2.0, 3.0].into(),
        ..sphere_config()
      })
      .err(),
      Some(ConfigError::BoundLength {
        which: "upper",
        len: 3,
        dim: 2,
      })
    );
  }

  #[test]
  fn test_huge_bounds() {
    let config = PsoConfig {
      dim: 1,
      lower_bound: (-1e308).into(),
      upper_bound: 1e308.into(),
      random_init_positions: false,
      max_iter: 3,
      ..sphere_config()
    };
    assert_eq!(
      Pso::new(config.clone()).err(),
      Some(ConfigError::NonFiniteBound { axis: 0 })
    );

    let mut pso = Pso::new(PsoConfig {
      lower_bound: (-8e307).into(),
      upper_bound: 8e307.into(),
      ..config
    })
    .unwrap();
    pso.set_objective(|x: &[f64]| x[0].abs());
    pso.optimize().unwrap();
    assert!(pso.space().contains(pso.best_solution()));
  }

  #[test]
  fn test_objective_is_required() {
    let mut pso = Pso::new(sphere_config()).unwrap();
    assert_eq!(pso.optimize_for(3), Err(OptimizeError::ObjectiveNotSet));
    assert!(pso.population_history().is_empty());
    assert_eq!(pso.evaluations(), 0);
  }
}
