// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for silent-acquisition outcomes.
#[derive(Debug, Default)]
pub struct AcquireMetrics {
	cache_hits: AtomicU64,
	attempts: AtomicU64,
	successes: AtomicU64,
	failures: AtomicU64,
	interaction_denials: AtomicU64,
}
impl AcquireMetrics {
	/// Number of requests satisfied by a fresh cached token.
	pub fn cache_hits(&self) -> u64 {
		self.cache_hits.load(Ordering::Relaxed)
	}

	/// Number of acquisition attempts that missed the cache.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Number of successful silent acquisitions.
	pub fn successes(&self) -> u64 {
		self.successes.load(Ordering::Relaxed)
	}

	/// Number of failed or rejected acquisitions.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	/// Number of calls denied pending an interactive sign-in.
	pub fn interaction_denials(&self) -> u64 {
		self.interaction_denials.load(Ordering::Relaxed)
	}

	pub(crate) fn record_cache_hit(&self) {
		self.cache_hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.successes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_interaction_denial(&self) {
		self.interaction_denials.fetch_add(1, Ordering::Relaxed);
	}
}
