// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_DIR: &str = "./uploads";
const DEFAULT_MAX_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct UploadsConfig {
	pub dir: PathBuf,
	pub max_bytes: usize,
}

impl Default for UploadsConfig {
	fn default() -> Self {
		UploadsConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadsConfigLayer {
	#[serde(default)]
	pub dir: Option<String>,
	#[serde(default)]
	pub max_bytes: Option<usize>,
}

impl UploadsConfigLayer {
	pub fn merge(&mut self, other: UploadsConfigLayer) {
		if other.dir.is_some() {
			self.dir = other.dir;
		}
		if other.max_bytes.is_some() {
			self.max_bytes = other.max_bytes;
		}
	}

	pub fn finalize(self) -> UploadsConfig {
		UploadsConfig {
			dir: PathBuf::from(self.dir.unwrap_or_else(|| DEFAULT_DIR.to_string())),
			max_bytes: self.max_bytes.unwrap_or(DEFAULT_MAX_BYTES),
		}
	}
}
