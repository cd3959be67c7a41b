// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The login-facing view of an OAuth provider.
//!
//! Both providers run the same redirect round-trip, so the callback handler
//! works against [`IdentityProvider`] and never against a concrete client.

use async_trait::async_trait;
use otogram_common_secret::SecretString;
use otogram_server_auth::Provider;
use otogram_server_auth_spotify::{OAuthError as SpotifyError, SpotifyOAuthClient};
use otogram_server_auth_twitter::{OAuthError as TwitterError, TwitterOAuthClient};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
	#[error("provider request failed: {0}")]
	Http(String),

	#[error("provider rejected request: {0}")]
	Provider(String),
}

impl From<SpotifyError> for IdentityError {
	fn from(e: SpotifyError) -> Self {
		match e {
			SpotifyError::HttpRequest(e) => IdentityError::Http(e.to_string()),
			SpotifyError::ParseError(msg) | SpotifyError::ProviderError(msg) => {
				IdentityError::Provider(msg)
			}
		}
	}
}

impl From<TwitterError> for IdentityError {
	fn from(e: TwitterError) -> Self {
		match e {
			TwitterError::HttpRequest(e) => IdentityError::Http(e.to_string()),
			TwitterError::ParseError(msg) | TwitterError::ProviderError(msg) => {
				IdentityError::Provider(msg)
			}
		}
	}
}

/// Tokens granted by a successful code exchange.
#[derive(Debug, Clone)]
pub struct ProviderTokens {
	pub access_token: SecretString,
	pub refresh_token: Option<SecretString>,
	/// How long the access token lives, when the provider says so.
	pub lifetime: Option<Duration>,
}

/// What the provider's "who am I" endpoint told us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
	pub external_id: String,
	pub display_name: String,
	pub profile_image: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
	fn provider(&self) -> Provider;

	/// Whether the access token is kept after login for acting on the
	/// user's behalf.
	fn persists_token(&self) -> bool {
		false
	}

	fn authorization_url(&self, state: &str) -> Result<String, IdentityError>;

	async fn exchange_code(&self, code: &str) -> Result<ProviderTokens, IdentityError>;

	async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity, IdentityError>;
}

#[async_trait]
impl IdentityProvider for SpotifyOAuthClient {
	fn provider(&self) -> Provider {
		Provider::Spotify
	}

	fn authorization_url(&self, state: &str) -> Result<String, IdentityError> {
		Ok(SpotifyOAuthClient::authorization_url(self, state)?)
	}

	async fn exchange_code(&self, code: &str) -> Result<ProviderTokens, IdentityError> {
		let response = SpotifyOAuthClient::exchange_code(self, code).await?;
		Ok(ProviderTokens {
			access_token: response.access_token,
			refresh_token: response.refresh_token,
			lifetime: response
				.expires_in
				.map(|secs| Duration::from_secs(secs.max(0) as u64)),
		})
	}

	async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity, IdentityError> {
		let user = self.get_user(access_token).await?;
		Ok(ProviderIdentity {
			profile_image: user.profile_image(),
			display_name: user.display_name.clone().unwrap_or_default(),
			external_id: user.id,
		})
	}
}

#[async_trait]
impl IdentityProvider for TwitterOAuthClient {
	fn provider(&self) -> Provider {
		Provider::Twitter
	}

	fn persists_token(&self) -> bool {
		true
	}

	fn authorization_url(&self, state: &str) -> Result<String, IdentityError> {
		Ok(TwitterOAuthClient::authorization_url(self, state)?)
	}

	async fn exchange_code(&self, code: &str) -> Result<ProviderTokens, IdentityError> {
		let response = TwitterOAuthClient::exchange_code(self, code).await?;
		let lifetime = response.lifetime();
		Ok(ProviderTokens {
			access_token: response.access_token,
			refresh_token: response.refresh_token,
			lifetime: Some(lifetime),
		})
	}

	async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity, IdentityError> {
		let user = self.get_user(access_token).await?;
		Ok(ProviderIdentity {
			profile_image: user.profile_image(),
			display_name: user.name.clone(),
			external_id: user.id,
		})
	}
}
