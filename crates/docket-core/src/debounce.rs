use std::time::{
  Duration,
  Instant
};

use tracing::trace;

pub const DEFAULT_SEARCH_DELAY: Duration =
  Duration::from_millis(100);

/// Single-slot debouncer. Pushing a new
/// value replaces whatever was pending
/// and restarts the delay, so only the
/// latest value is ever released.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
  delay:   Duration,
  pending: Option<(T, Instant)>
}

impl<T> Default for Debouncer<T> {
  fn default() -> Self {
    Self::new(DEFAULT_SEARCH_DELAY)
  }
}

impl<T> Debouncer<T> {
  pub fn new(delay: Duration) -> Self {
    Self {
      delay,
      pending: None
    }
  }

  pub fn delay(&self) -> Duration {
    self.delay
  }

  pub fn push(
    &mut self,
    value: T,
    now: Instant
  ) {
    if self.pending.is_some() {
      trace!("superseding pending value");
    }
    self.pending =
      Some((value, now + self.delay));
  }

  /// Releases the pending value once its
  /// deadline has passed.
  pub fn poll(
    &mut self,
    now: Instant
  ) -> Option<T> {
    let ready = self
      .pending
      .as_ref()
      .is_some_and(|(_, deadline)| {
        now >= *deadline
      });
    if !ready {
      return None;
    }

    self
      .pending
      .take()
      .map(|(value, _)| value)
  }

  /// Time left before the pending value
  /// fires, if any.
  pub fn remaining(
    &self,
    now: Instant
  ) -> Option<Duration> {
    self.pending.as_ref().map(
      |(_, deadline)| {
        deadline.saturating_duration_since(
          now
        )
      }
    )
  }

  pub fn is_pending(&self) -> bool {
    self.pending.is_some()
  }

  pub fn cancel(&mut self) -> Option<T> {
    self
      .pending
      .take()
      .map(|(value, _)| value)
  }
}

#[cfg(test)]
mod tests {
  use std::time::{
    Duration,
    Instant
  };

  use super::Debouncer;

  #[test]
  fn releases_only_after_delay() {
    let start = Instant::now();
    let mut debouncer =
      Debouncer::new(Duration::from_millis(100));
    debouncer.push("lea", start);

    assert_eq!(
      debouncer.poll(start + Duration::from_millis(99)),
      None
    );
    assert_eq!(
      debouncer.poll(start + Duration::from_millis(100)),
      Some("lea")
    );
    assert!(!debouncer.is_pending());
    assert_eq!(
      debouncer.poll(start + Duration::from_millis(500)),
      None
    );
  }

  #[test]
  fn latest_value_wins_and_restarts_timer() {
    let start = Instant::now();
    let mut debouncer = Debouncer::default();
    debouncer.push("l", start);
    debouncer.push(
      "le",
      start + Duration::from_millis(60)
    );
    debouncer.push(
      "lease",
      start + Duration::from_millis(120)
    );

    assert_eq!(
      debouncer.poll(start + Duration::from_millis(200)),
      None
    );
    assert_eq!(
      debouncer.remaining(start + Duration::from_millis(200)),
      Some(Duration::from_millis(20))
    );
    assert_eq!(
      debouncer.poll(start + Duration::from_millis(220)),
      Some("lease")
    );
  }

  #[test]
  fn cancel_discards_pending() {
    let start = Instant::now();
    let mut debouncer = Debouncer::default();
    debouncer.push(1, start);
    assert_eq!(debouncer.cancel(), Some(1));
    assert_eq!(
      debouncer.poll(start + Duration::from_secs(1)),
      None
    );
  }
}
