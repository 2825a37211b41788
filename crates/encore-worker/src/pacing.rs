//! Write pacing — a minimum-interval gate in front of store writes.
//!
//! The backing store shares throughput with interactive traffic, so the
//! coordinator spaces its writes out instead of bursting a whole batch.
//! This is resource protection, not correctness: a store with headroom
//! can run with the interval set to zero.

use std::time::Duration;

use tokio::{
  sync::Mutex,
  time::{Instant, sleep_until},
};

pub struct WritePacer {
  interval: Duration,
  last:     Mutex<Option<Instant>>,
}

impl WritePacer {
  pub fn new(interval: Duration) -> Self {
    Self { interval, last: Mutex::new(None) }
  }

  /// A pacer that never waits.
  pub fn disabled() -> Self { Self::new(Duration::ZERO) }

  /// Wait until at least the configured interval has elapsed since the
  /// previous `pace` call. The first call never waits.
  pub async fn pace(&self) {
    if self.interval.is_zero() {
      return;
    }
    let mut last = self.last.lock().await;
    if let Some(prev) = *last {
      sleep_until(prev + self.interval).await;
    }
    *last = Some(Instant::now());
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test(start_paused = true)]
  async fn paces_consecutive_calls_by_the_interval() {
    let pacer = WritePacer::new(Duration::from_millis(500));
    let start = Instant::now();

    pacer.pace().await; // first call is free
    pacer.pace().await;
    pacer.pace().await;

    assert!(Instant::now() - start >= Duration::from_millis(1000));
  }

  #[tokio::test(start_paused = true)]
  async fn zero_interval_never_waits() {
    let pacer = WritePacer::disabled();
    let start = Instant::now();

    for _ in 0..10 {
      pacer.pace().await;
    }

    assert_eq!(Instant::now(), start);
  }
}
