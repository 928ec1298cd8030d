use bioopt::{
  benchmarks::LinearData,
  objective::IntoPar,
  optimizer::{
    pso::{Pso, PsoConfig},
    sma::{Sma, SmaConfig},
    Optimizer,
  },
  termination::StagnationTerminator,
};
use tracing_subscriber::EnvFilter;

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  // 100 noisy samples of y = 2x + 3
  let data = LinearData::generate(2.0, 3.0, 0.5, 100, 42).unwrap();
  // a position is a pair (m, b), its fitness is the mean squared error
  let mse = move |p: &[f64]| data.mse(p[0], p[1]);

  let mut sma = Sma::new(
    SmaConfig::builder()
      .num_individuals(50)
      .dim(2)
      .lower_bound(-10.0)
      .upper_bound(10.0)
      .max_iter(200)
      .c1(1.5)
      .c2(1.5)
      .w(0.5)
      .store_history_each_iter(true)
      .build(),
  )
  .unwrap();
  sma.set_objective(mse.clone());
  sma.optimize().unwrap();
  let (m, b) = (sma.best_solution()[0], sma.best_solution()[1]);
  println!("sma: y = {m:.3}x + {b:.3}, mse {:.4}", sma.best_fitness());

  // trajectory of the population's mean slope
  for (i, snapshot) in sma.population_history().iter().enumerate().step_by(40) {
    let slopes = snapshot.positions().iter().map(|p| p[0]);
    let mean = slopes.sum::<f64>() / snapshot.len() as f64;
    println!("  iteration {:3}: mean m = {mean:.3}", i + 1);
  }

  // the same fit with a swarm that decelerates over time and gives up
  // after 30 iterations without improvement
  let mut pso = Pso::new(
    PsoConfig::builder()
      .num_individuals(50)
      .dim(2)
      .lower_bound(-10.0)
      .upper_bound(10.0)
      .max_iter(200)
      .c1(1.5)
      .c2(1.5)
      .w(0.7)
      .use_w_decrement(true)
      .v_max(2.0)
      .build(),
  )
  .unwrap();
  pso.set_objective(mse.par_each());
  pso.set_terminator(StagnationTerminator::new(30));
  pso.optimize().unwrap();
  let (m, b) = (pso.best_solution()[0], pso.best_solution()[1]);
  println!(
    "pso: y = {m:.3}x + {b:.3}, mse {:.4}, stopped after {} iterations",
    pso.best_fitness(),
    pso.convergence().len(),
  );
}
