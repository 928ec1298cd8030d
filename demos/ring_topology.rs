use bioopt::{
  benchmarks::rastrigin,
  optimizer::{
    pso::{Pso, PsoConfig},
    Optimizer,
  },
};
use tracing_subscriber::EnvFilter;

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  // rastrigin has a lattice of local minima around the global one at the
  // origin, which traps a fully connected swarm more often than a ring
  for ring in [false, true] {
    let mut pso = Pso::new(
      PsoConfig::builder()
        .num_individuals(40)
        .dim(5)
        .lower_bound(-5.12)
        .upper_bound(5.12)
        .max_iter(300)
        .c1(1.5)
        .c2(1.5)
        .w(0.7)
        .v_max(1.0)
        .use_ring_topology(ring)
        .neighbor_size(2)
        .build(),
    )
    .unwrap();
    pso.set_objective(rastrigin);
    pso.optimize().unwrap();

    let topology = if ring { "ring" } else { "global" };
    let trace = pso.convergence();
    println!(
      "{topology:>6}: best {:.4} (after 50 iterations {:.4})",
      pso.best_fitness(),
      trace[49],
    );
  }
}
