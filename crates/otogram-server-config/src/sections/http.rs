// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP listener and public URL configuration.

use serde::Deserialize;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_FRONTEND_URL: &str = "http://127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct HttpConfig {
	pub host: String,
	pub port: u16,
	/// Public URL of this backend; uploaded image links are built from it.
	pub base_url: String,
	/// Browser application origin. Used for CORS, login redirects and
	/// cross-post permalinks.
	pub frontend_url: String,
}

impl Default for HttpConfig {
	fn default() -> Self {
		HttpConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfigLayer {
	#[serde(default)]
	pub host: Option<String>,
	#[serde(default)]
	pub port: Option<u16>,
	#[serde(default)]
	pub base_url: Option<String>,
	#[serde(default)]
	pub frontend_url: Option<String>,
}

impl HttpConfigLayer {
	pub fn merge(&mut self, other: HttpConfigLayer) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
		if other.frontend_url.is_some() {
			self.frontend_url = other.frontend_url;
		}
	}

	pub fn finalize(self) -> HttpConfig {
		HttpConfig {
			host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
			port: self.port.unwrap_or(DEFAULT_PORT),
			base_url: trim_trailing_slash(self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string())),
			frontend_url: trim_trailing_slash(
				self
					.frontend_url
					.unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
			),
		}
	}
}

fn trim_trailing_slash(mut url: String) -> String {
	while url.ends_with('/') {
		url.pop();
	}
	url
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = HttpConfigLayer::default().finalize();
		assert_eq!(config.host, "0.0.0.0");
		assert_eq!(config.port, 8080);
		assert_eq!(config.base_url, "http://127.0.0.1:8080");
		assert_eq!(config.frontend_url, "http://127.0.0.1:3000");
	}

	#[test]
	fn trailing_slashes_are_dropped() {
		let config = HttpConfigLayer {
			frontend_url: Some("https://otogram.example/".to_string()),
			base_url: Some("https://api.otogram.example//".to_string()),
			..Default::default()
		}
		.finalize();
		assert_eq!(config.frontend_url, "https://otogram.example");
		assert_eq!(config.base_url, "https://api.otogram.example");
	}

	#[test]
	fn merge_overwrites_only_present_fields() {
		let mut base = HttpConfigLayer {
			host: Some("127.0.0.1".to_string()),
			port: Some(3001),
			..Default::default()
		};
		base.merge(HttpConfigLayer {
			port: Some(9000),
			frontend_url: Some("https://example.com".to_string()),
			..Default::default()
		});
		assert_eq!(base.host.as_deref(), Some("127.0.0.1"));
		assert_eq!(base.port, Some(9000));
		assert_eq!(base.frontend_url.as_deref(), Some("https://example.com"));
	}
}
