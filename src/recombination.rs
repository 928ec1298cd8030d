//! Recombination of two parents into an offspring.

use rand::Rng;

/// Crossover of two parent positions of equal length.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Crossover {
  /// Each coordinate is taken from either parent with equal probability.
  #[default]
  Uniform,
  /// Coordinates before a random cut point come from the first parent, the
  /// rest from the second. The cut point is never at either end, so both
  /// parents contribute. One-dimensional parents fall back to `Uniform`.
  SinglePoint,
}

impl Crossover {
  /// Creates an offspring from two parents.
  pub fn recombine<R: Rng + ?Sized>(
    &self,
    first: &[f64],
    second: &[f64],
    rng: &mut R,
  ) -> Vec<f64> {
    debug_assert_eq!(first.len(), second.len(), "parents' lengths differ");
    match self {
      Self::SinglePoint if first.len() >= 2 => {
        let cut = rng.gen_range(1..first.len());
        first[..cut].iter().chain(&second[cut..]).copied().collect()
      }
      _ => first
        .iter()
        .zip(second)
        .map(|(&a, &b)| if rng.gen_bool(0.5) { a } else { b })
        .collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use rand::{rngs::StdRng, SeedableRng};

  use super::*;

  #[test]
  fn test_uniform_crossover_takes_genes_from_parents() {
    let mut rng = StdRng::seed_from_u64(3);
    let a = [0.0; 16];
    let b = [1.0; 16];
    let child = Crossover::Uniform.recombine(&a, &b, &mut rng);
    assert_eq!(child.len(), 16);
    assert!(child.iter().all(|&g| g == 0.0 || g == 1.0));
  }

  #[test]
  fn test_single_point_crossover_keeps_prefix_and_suffix() {
    let mut rng = StdRng::seed_from_u64(3);
    let a = [1.0, 2.0, 3.0, 4.0];
    let b = [-1.0, -2.0, -3.0, -4.0];
    for _ in 0..20 {
      let child = Crossover::SinglePoint.recombine(&a, &b, &mut rng);
      let cut = child.iter().position(|g| *g < 0.0).unwrap();
      assert!((1..4).contains(&cut));
      assert_eq!(child[..cut], a[..cut]);
      assert_eq!(child[cut..], b[cut..]);
    }
  }

  #[test]
  fn test_single_point_crossover_in_one_dimension() {
    let mut rng = StdRng::seed_from_u64(3);
    let child = Crossover::SinglePoint.recombine(&[1.0], &[2.0], &mut rng);
    assert!(child == [1.0] || child == [2.0]);
  }
}
