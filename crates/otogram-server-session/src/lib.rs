// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Signed cookie sessions.
//!
//! A session is not stored server side. The cookie value is
//! `<payload>.<signature>` where `payload` is URL-safe base64 of the JSON
//! [`SessionClaims`] and `signature` is hex HMAC-SHA256 of the payload text
//! under the process signing key. Logout clears the cookie; a copied cookie
//! stays valid until it expires.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use otogram_common_secret::SecretString;
use otogram_server_auth::{CurrentUser, Provider, UserId};
use otogram_server_config::SessionConfig;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum SessionError {
	#[error("failed to encode session: {0}")]
	Encode(#[from] serde_json::Error),

	#[error("invalid signing key")]
	InvalidKey,

	#[error("malformed session token")]
	Malformed,

	#[error("session signature mismatch")]
	BadSignature,

	#[error("session expired")]
	Expired,
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// What a session remembers about its user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
	pub user_id: UserId,
	pub display_name: String,
	pub issued_at: i64,
	pub expires_at: i64,
}

impl SessionClaims {
	pub fn current_user(&self) -> CurrentUser {
		CurrentUser::new(self.user_id, self.display_name.clone())
	}
}

#[derive(Debug)]
pub struct SessionRequest {
	pub user_id: UserId,
	pub display_name: String,
	pub provider: Provider,
}

impl SessionRequest {
	pub fn new(user_id: UserId, display_name: impl Into<String>, provider: Provider) -> Self {
		Self {
			user_id,
			display_name: display_name.into(),
			provider,
		}
	}
}

pub struct SessionResponse {
	pub claims: SessionClaims,
	pub token: String,
	pub cookie_header: String,
}

pub struct SessionService {
	key: SecretString,
	cookie_name: String,
	max_age_secs: u64,
	secure: bool,
}

impl SessionService {
	pub fn new(
		key: SecretString,
		cookie_name: impl Into<String>,
		max_age_secs: u64,
		secure: bool,
	) -> Self {
		Self {
			key,
			cookie_name: cookie_name.into(),
			max_age_secs,
			secure,
		}
	}

	/// Uses the configured key, or generates one for this process.
	pub fn from_config(config: &SessionConfig) -> Self {
		let key = match &config.secret {
			Some(secret) => secret.clone(),
			None => {
				tracing::warn!(
					"no session secret configured, generated a random key; sessions will not survive a restart"
				);
				generate_signing_key()
			}
		};
		Self::new(key, &config.cookie_name, config.max_age_secs, config.secure)
	}

	pub fn cookie_name(&self) -> &str {
		&self.cookie_name
	}

	#[tracing::instrument(skip(self, request), fields(user_id = %request.user_id, provider = %request.provider))]
	pub fn create_session(&self, request: SessionRequest) -> Result<SessionResponse> {
		let issued_at = Utc::now().timestamp();
		let claims = SessionClaims {
			user_id: request.user_id,
			display_name: request.display_name,
			issued_at,
			expires_at: issued_at.saturating_add(self.max_age_secs as i64),
		};

		let token = self.sign(&claims)?;
		let cookie_header = self.cookie(&token, self.max_age_secs);

		tracing::info!(
			user_id = %claims.user_id,
			provider = %request.provider,
			"Session created"
		);

		Ok(SessionResponse {
			claims,
			token,
			cookie_header,
		})
	}

	/// Check signature and expiry of a cookie value.
	pub fn verify(&self, token: &str) -> Result<SessionClaims> {
		self.verify_at(token, Utc::now().timestamp())
	}

	fn verify_at(&self, token: &str, now: i64) -> Result<SessionClaims> {
		let (payload, signature) = token.split_once('.').ok_or(SessionError::Malformed)?;
		let signature = hex::decode(signature).map_err(|_| SessionError::Malformed)?;

		self
			.mac(payload)?
			.verify_slice(&signature)
			.map_err(|_| SessionError::BadSignature)?;

		let json = URL_SAFE_NO_PAD
			.decode(payload)
			.map_err(|_| SessionError::Malformed)?;
		let claims: SessionClaims =
			serde_json::from_slice(&json).map_err(|_| SessionError::Malformed)?;

		if claims.expires_at <= now {
			return Err(SessionError::Expired);
		}
		Ok(claims)
	}

	/// `Set-Cookie` value that removes the session from the browser.
	pub fn clear_cookie_header(&self) -> String {
		self.cookie("", 0)
	}

	fn sign(&self, claims: &SessionClaims) -> Result<String> {
		let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
		let signature = hex::encode(self.mac(&payload)?.finalize().into_bytes());
		Ok(format!("{payload}.{signature}"))
	}

	fn mac(&self, payload: &str) -> Result<HmacSha256> {
		let mut mac = HmacSha256::new_from_slice(self.key.expose().as_bytes())
			.map_err(|_| SessionError::InvalidKey)?;
		mac.update(payload.as_bytes());
		Ok(mac)
	}

	fn cookie(&self, value: &str, max_age: u64) -> String {
		let mut header = format!(
			"{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
			self.cookie_name, value, max_age
		);
		if self.secure {
			header.push_str("; Secure");
		}
		header
	}
}

/// 32 random bytes, hex encoded.
pub fn generate_signing_key() -> SecretString {
	let mut bytes = [0u8; 32];
	rand::thread_rng().fill_bytes(&mut bytes);
	SecretString::new(hex::encode(bytes))
}


#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn any_display_name_survives_signing(name in "\\PC{0,40}", id in 1i64..1_000_000) {
			let svc = SessionService::new(SecretString::from("key"), "otogram_session", 3600, false);
			let token = svc
				.create_session(SessionRequest::new(UserId::new(id), name.clone(), Provider::Twitter))
				.unwrap()
				.token;
			let claims = svc.verify(&token).unwrap();
			prop_assert_eq!(claims.user_id, UserId::new(id));
			prop_assert_eq!(claims.display_name, name);
		}

		#[test]
		fn flipping_a_signature_char_breaks_verification(pos in 0usize..64) {
			let svc = SessionService::new(SecretString::from("key"), "otogram_session", 3600, false);
			let token = svc
				.create_session(SessionRequest::new(UserId::new(1), "x", Provider::Spotify))
				.unwrap()
				.token;
			let (payload, signature) = token.split_once('.').unwrap();
			let mut chars: Vec<char> = signature.chars().collect();
			chars[pos] = if chars[pos] == '0' { '1' } else { '0' };
			let tampered = format!("{payload}.{}", chars.into_iter().collect::<String>());
			prop_assert!(svc.verify(&tampered).is_err());
		}
	}
}
