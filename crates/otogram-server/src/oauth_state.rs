// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Anti-forgery `state` for the OAuth redirect round-trip.
//!
//! One value is generated per process and sent with every authorization
//! redirect; callbacks must echo it back exactly. The comparison runs in
//! constant time.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use otogram_common_secret::SecretString;
use rand::RngCore;
use subtle::ConstantTimeEq;

const STATE_BYTES: usize = 16;

#[derive(Debug, Clone)]
pub struct OAuthState {
	value: SecretString,
}

impl OAuthState {
	/// 16 random bytes, URL-safe base64 without padding.
	pub fn generate() -> Self {
		let mut bytes = [0u8; STATE_BYTES];
		rand::thread_rng().fill_bytes(&mut bytes);
		Self::from_value(URL_SAFE_NO_PAD.encode(bytes))
	}

	pub fn from_value(value: impl Into<String>) -> Self {
		Self {
			value: SecretString::new(value.into()),
		}
	}

	/// The value to put in the authorization URL.
	pub fn value(&self) -> &str {
		self.value.expose()
	}

	pub fn verify(&self, candidate: &str) -> bool {
		let expected = self.value.expose().as_bytes();
		let candidate = candidate.as_bytes();
		expected.len() == candidate.len() && bool::from(expected.ct_eq(candidate))
	}
}

impl Default for OAuthState {
	fn default() -> Self {
		Self::generate()
	}
}
