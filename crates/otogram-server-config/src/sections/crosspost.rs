// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Background cross-post queue configuration.

use serde::Deserialize;
use std::time::Duration;

const DEFAULT_QUEUE_CAPACITY: usize = 64;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct CrossPostConfig {
	/// Jobs beyond this many pending are dropped with a warning.
	pub queue_capacity: usize,
	/// How long shutdown waits for queued jobs to drain.
	pub shutdown_timeout: Duration,
}

impl Default for CrossPostConfig {
	fn default() -> Self {
		CrossPostConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrossPostConfigLayer {
	#[serde(default)]
	pub queue_capacity: Option<usize>,
	#[serde(default)]
	pub shutdown_timeout_secs: Option<u64>,
}

impl CrossPostConfigLayer {
	pub fn merge(&mut self, other: CrossPostConfigLayer) {
		if other.queue_capacity.is_some() {
			self.queue_capacity = other.queue_capacity;
		}
		if other.shutdown_timeout_secs.is_some() {
			self.shutdown_timeout_secs = other.shutdown_timeout_secs;
		}
	}

	pub fn finalize(self) -> CrossPostConfig {
		CrossPostConfig {
			queue_capacity: self.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY),
			shutdown_timeout: Duration::from_secs(
				self
					.shutdown_timeout_secs
					.unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
			),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = CrossPostConfigLayer::default().finalize();
		assert_eq!(config.queue_capacity, 64);
		assert_eq!(config.shutdown_timeout, Duration::from_secs(10));
	}
}
