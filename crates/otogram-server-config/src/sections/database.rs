// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database configuration.

use serde::Deserialize;
use std::time::Duration;

const DEFAULT_URL: &str = "sqlite:./otogram.db";
const DEFAULT_CONNECT_ATTEMPTS: u32 = 5;
const DEFAULT_CONNECT_RETRY_DELAY_SECS: u64 = 2;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
	pub url: String,
	/// Startup connection attempts before giving up.
	pub connect_attempts: u32,
	pub connect_retry_delay: Duration,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		DatabaseConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub connect_attempts: Option<u32>,
	#[serde(default)]
	pub connect_retry_delay_secs: Option<u64>,
}

impl DatabaseConfigLayer {
	pub fn merge(&mut self, other: DatabaseConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
		if other.connect_attempts.is_some() {
			self.connect_attempts = other.connect_attempts;
		}
		if other.connect_retry_delay_secs.is_some() {
			self.connect_retry_delay_secs = other.connect_retry_delay_secs;
		}
	}

	pub fn finalize(self) -> DatabaseConfig {
		DatabaseConfig {
			url: self.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
			connect_attempts: self.connect_attempts.unwrap_or(DEFAULT_CONNECT_ATTEMPTS),
			connect_retry_delay: Duration::from_secs(
				self
					.connect_retry_delay_secs
					.unwrap_or(DEFAULT_CONNECT_RETRY_DELAY_SECS),
			),
		}
	}
}
