// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for pairing sessions.
#[derive(Debug, Default)]
pub struct PairingMetrics {
	started: AtomicU64,
	superseded: AtomicU64,
	succeeded: AtomicU64,
	timed_out: AtomicU64,
	cancelled: AtomicU64,
	failed: AtomicU64,
	polls: AtomicU64,
	skipped_ticks: AtomicU64,
	discarded: AtomicU64,
}
impl PairingMetrics {
	/// Returns the number of `start()` calls.
	pub fn started(&self) -> u64 {
		self.started.load(Ordering::Relaxed)
	}

	/// Returns the number of sessions replaced by a newer `start()`.
	pub fn superseded(&self) -> u64 {
		self.superseded.load(Ordering::Relaxed)
	}

	/// Returns the number of sessions that produced a credential.
	pub fn succeeded(&self) -> u64 {
		self.succeeded.load(Ordering::Relaxed)
	}

	/// Returns the number of sessions that hit their deadline.
	pub fn timed_out(&self) -> u64 {
		self.timed_out.load(Ordering::Relaxed)
	}

	/// Returns the number of sessions cancelled by the caller.
	pub fn cancelled(&self) -> u64 {
		self.cancelled.load(Ordering::Relaxed)
	}

	/// Returns the number of sessions that failed to start or poll.
	pub fn failed(&self) -> u64 {
		self.failed.load(Ordering::Relaxed)
	}

	/// Returns the number of poll requests dispatched.
	pub fn polls(&self) -> u64 {
		self.polls.load(Ordering::Relaxed)
	}

	/// Returns the number of ticks skipped because a poll was still in flight.
	pub fn skipped_ticks(&self) -> u64 {
		self.skipped_ticks.load(Ordering::Relaxed)
	}

	/// Returns the number of start or poll results dropped as stale.
	pub fn discarded(&self) -> u64 {
		self.discarded.load(Ordering::Relaxed)
	}

	pub(crate) fn record_started(&self) {
		self.started.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_superseded(&self) {
		self.superseded.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_succeeded(&self) {
		self.succeeded.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_timed_out(&self) {
		self.timed_out.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_cancelled(&self) {
		self.cancelled.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failed(&self) {
		self.failed.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_poll(&self) {
		self.polls.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_skipped_tick(&self) {
		self.skipped_ticks.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_discarded(&self) {
		self.discarded.fetch_add(1, Ordering::Relaxed);
	}
}
