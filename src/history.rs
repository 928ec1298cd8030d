//! Per-iteration population snapshots.

use std::{ops::Index, slice};

/// Positions of all individuals at the end of one iteration.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Snapshot {
  positions: Vec<Vec<f64>>,
}

impl Snapshot {
  /// Returns positions of all individuals in population order.
  pub fn positions(&self) -> &[Vec<f64>] {
    &self.positions
  }

  /// Returns the number of individuals in the snapshot.
  pub fn len(&self) -> usize {
    self.positions.len()
  }

  /// Returns `true` if the snapshot has no individuals.
  pub fn is_empty(&self) -> bool {
    self.positions.is_empty()
  }
}

impl From<Vec<Vec<f64>>> for Snapshot {
  fn from(positions: Vec<Vec<f64>>) -> Self {
    Self { positions }
  }
}

/// Append-only sequence of snapshots in iteration order.
///
/// Recording is disabled by default since memory grows with
/// `iterations * individuals * dim`.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct History {
  enabled: bool,
  snapshots: Vec<Snapshot>,
}

impl History {
  pub(crate) fn new(enabled: bool) -> Self {
    Self {
      enabled,
      snapshots: Vec::new(),
    }
  }

  /// Returns `true` if snapshots are recorded.
  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  /// Appends a snapshot if recording is enabled.
  pub(crate) fn record(&mut self, snapshot: Snapshot) {
    if self.enabled {
      self.snapshots.push(snapshot);
    }
  }

  pub(crate) fn clear(&mut self) {
    self.snapshots.clear();
  }

  /// Returns the number of recorded snapshots.
  pub fn len(&self) -> usize {
    self.snapshots.len()
  }

  /// Returns `true` if nothing has been recorded.
  pub fn is_empty(&self) -> bool {
    self.snapshots.is_empty()
  }

  /// Returns recorded snapshots.
  pub fn snapshots(&self) -> &[Snapshot] {
    &self.snapshots
  }

  /// Iterates over recorded snapshots. Can be called any number of times.
  pub fn iter(&self) -> slice::Iter<'_, Snapshot> {
    self.snapshots.iter()
  }

  /// Returns the last recorded snapshot.
  pub fn last(&self) -> Option<&Snapshot> {
    self.snapshots.last()
  }
}

impl Index<usize> for History {
  type Output = Snapshot;

  fn index(&self, iteration: usize) -> &Self::Output {
    &self.snapshots[iteration]
  }
}

impl<'a> IntoIterator for &'a History {
  type Item = &'a Snapshot;
  type IntoIter = slice::Iter<'a, Snapshot>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}
