//! Build generations.
//!
//! A generation is one pass of manifest, assets and compilation. It owns its
//! step counter, so a new generation never inherits counts from an older one.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
pub struct BuildGeneration {
  id: u64,
  total: usize,
  completed: AtomicUsize,
  started: Instant,
}

impl BuildGeneration {
  pub fn new(total: usize) -> Self {
    Self {
      id: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
      total,
      completed: AtomicUsize::new(0),
      started: Instant::now(),
    }
  }

  pub fn id(&self) -> u64 {
    self.id
  }

  pub fn total(&self) -> usize {
    self.total
  }

  pub fn completed(&self) -> usize {
    self.completed.load(Ordering::SeqCst)
  }

  /// Record one finished step and return its 1-based number.
  pub fn complete_step(&self) -> usize {
    self.completed.fetch_add(1, Ordering::SeqCst) + 1
  }

  pub fn is_complete(&self) -> bool {
    self.completed() >= self.total
  }

  pub fn elapsed(&self) -> Duration {
    self.started.elapsed()
  }
}
