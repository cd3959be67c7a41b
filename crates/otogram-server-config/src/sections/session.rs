// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session cookie configuration.

use otogram_common_secret::SecretString;
use serde::Deserialize;

const DEFAULT_COOKIE_NAME: &str = "otogram_session";
const DEFAULT_MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct SessionConfig {
	pub cookie_name: String,
	/// Signing key. `None` means a random key is generated at startup and
	/// sessions do not survive a restart.
	pub secret: Option<SecretString>,
	pub max_age_secs: u64,
	/// Adds the `Secure` attribute. Off by default so plain-http local
	/// development keeps working.
	pub secure: bool,
}

impl Default for SessionConfig {
	fn default() -> Self {
		SessionConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfigLayer {
	#[serde(default)]
	pub cookie_name: Option<String>,
	#[serde(default)]
	pub secret: Option<SecretString>,
	#[serde(default)]
	pub max_age_secs: Option<u64>,
	#[serde(default)]
	pub secure: Option<bool>,
}

impl SessionConfigLayer {
	pub fn merge(&mut self, other: SessionConfigLayer) {
		if other.cookie_name.is_some() {
			self.cookie_name = other.cookie_name;
		}
		if other.secret.is_some() {
			self.secret = other.secret;
		}
		if other.max_age_secs.is_some() {
			self.max_age_secs = other.max_age_secs;
		}
		if other.secure.is_some() {
			self.secure = other.secure;
		}
	}

	pub fn finalize(self) -> SessionConfig {
		SessionConfig {
			cookie_name: self
				.cookie_name
				.filter(|s| !s.is_empty())
				.unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string()),
			secret: self.secret.filter(|s| !s.is_blank()),
			max_age_secs: self.max_age_secs.unwrap_or(DEFAULT_MAX_AGE_SECS),
			secure: self.secure.unwrap_or(false),
		}
	}
}
