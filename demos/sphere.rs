use bioopt::{
  benchmarks::sphere,
  optimizer::{
    ga::{Ga, GaConfig},
    pso::{Pso, PsoConfig},
    sma::{Sma, SmaConfig},
    Optimizer,
  },
};
use tracing_subscriber::EnvFilter;

fn report(name: &str, optimizer: &impl Optimizer) {
  println!(
    "{name}: f({:.4?}) = {:.3e} after {} evaluations",
    optimizer.best_solution(),
    optimizer.best_fitness(),
    optimizer.evaluations(),
  );
}

fn main() {
  // RUST_LOG=bioopt=debug prints every iteration
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  // minimize f(x, y) = x^2 + y^2 on [-5, 5]^2
  let mut sma = Sma::new(
    SmaConfig::builder()
      .num_individuals(30)
      .dim(2)
      .lower_bound(-5.0)
      .upper_bound(5.0)
      .max_iter(50)
      .c1(1.5)
      .c2(1.5)
      .w(0.5)
      .verbose(true)
      .build(),
  )
  .unwrap();
  sma.set_objective(sphere);
  sma.optimize().unwrap();
  report("sma", &sma);

  let mut pso = Pso::new(
    PsoConfig::builder()
      .num_individuals(30)
      .dim(2)
      .lower_bound(-5.0)
      .upper_bound(5.0)
      .max_iter(50)
      .c1(1.5)
      .c2(1.5)
      .w(0.5)
      .build(),
  )
  .unwrap();
  pso.set_objective(sphere);
  pso.optimize().unwrap();
  report("pso", &pso);

  let mut ga = Ga::new(
    GaConfig::builder()
      .num_individuals(30)
      .dim(2)
      .lower_bound(-5.0)
      .upper_bound(5.0)
      .max_iter(50)
      .use_gaussian_mutation(true)
      .mutation_rate(0.2)
      .build(),
  )
  .unwrap();
  ga.set_objective(sphere);
  ga.optimize().unwrap();
  report("ga", &ga);
}
