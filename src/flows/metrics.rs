//! Always-on challenge counters, independent of the optional `metrics` feature.

// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for step-up challenge outcomes.
#[derive(Debug, Default)]
pub struct ChallengeMetrics {
	detected: AtomicU64,
	resolved: AtomicU64,
	failed: AtomicU64,
}
impl ChallengeMetrics {
	/// Returns the number of challenges detected.
	pub fn detected(&self) -> u64 {
		self.detected.load(Ordering::Relaxed)
	}

	/// Returns the number of challenges resolved by a successful retry.
	pub fn resolved(&self) -> u64 {
		self.resolved.load(Ordering::Relaxed)
	}

	/// Returns the number of challenges that ended in failure (missing key, signing failure,
	/// or a failed retry).
	pub fn failed(&self) -> u64 {
		self.failed.load(Ordering::Relaxed)
	}

	pub(crate) fn record_detected(&self) {
		self.detected.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_resolved(&self) {
		self.resolved.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failed(&self) {
		self.failed.fetch_add(1, Ordering::Relaxed);
	}
}
