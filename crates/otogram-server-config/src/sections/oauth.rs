// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OAuth provider credentials for the two login providers.

use crate::error::ConfigError;
use otogram_common_secret::SecretString;
use serde::Deserialize;

pub const SPOTIFY_DEFAULT_SCOPES: &[&str] = &["user-read-private", "user-read-email"];

/// `tweet.write` is needed for cross-posting, `offline.access` for a refresh
/// token.
pub const TWITTER_DEFAULT_SCOPES: &[&str] =
	&["tweet.read", "tweet.write", "users.read", "offline.access"];

/// Partial credentials for one provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderOAuthConfigLayer {
	pub client_id: Option<String>,
	pub client_secret: Option<SecretString>,
	/// Callback URL registered with the provider.
	pub redirect_uri: Option<String>,
	pub scopes: Option<Vec<String>>,
}

impl ProviderOAuthConfigLayer {
	pub fn merge(&mut self, other: ProviderOAuthConfigLayer) {
		if other.client_id.is_some() {
			self.client_id = other.client_id;
		}
		if other.client_secret.is_some() {
			self.client_secret = other.client_secret;
		}
		if other.redirect_uri.is_some() {
			self.redirect_uri = other.redirect_uri;
		}
		if other.scopes.is_some() {
			self.scopes = other.scopes;
		}
	}

	pub fn is_configured(&self) -> bool {
		self.client_id.as_ref().is_some_and(|s| !s.is_empty())
	}

	/// `Ok(None)` when no client id is set. Once a client id is present the
	/// secret and redirect URI become mandatory.
	pub fn build(
		self,
		provider: &str,
		default_scopes: &[&str],
	) -> Result<Option<ProviderOAuthConfig>, ConfigError> {
		let Some(client_id) = self.client_id.filter(|s| !s.is_empty()) else {
			return Ok(None);
		};

		let client_secret = self.client_secret.ok_or_else(|| {
			ConfigError::Validation(format!(
				"{provider} OAuth client_secret is required when client_id is set"
			))
		})?;

		if client_secret.is_blank() {
			return Err(ConfigError::Validation(format!(
				"{provider} OAuth client_secret cannot be empty"
			)));
		}

		let redirect_uri = self
			.redirect_uri
			.filter(|s| !s.is_empty())
			.ok_or_else(|| {
				ConfigError::Validation(format!(
					"{provider} OAuth redirect_uri is required when client_id is set"
				))
			})?;

		let scopes = self
			.scopes
			.unwrap_or_else(|| default_scopes.iter().map(|s| s.to_string()).collect());

		Ok(Some(ProviderOAuthConfig {
			client_id,
			client_secret,
			redirect_uri,
			scopes,
		}))
	}
}

/// Validated credentials for one provider.
#[derive(Debug, Clone)]
pub struct ProviderOAuthConfig {
	pub client_id: String,
	pub client_secret: SecretString,
	pub redirect_uri: String,
	pub scopes: Vec<String>,
}

impl ProviderOAuthConfig {
	pub fn scopes_string(&self) -> String {
		self.scopes.join(" ")
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthConfigLayer {
	#[serde(default)]
	pub spotify: ProviderOAuthConfigLayer,
	#[serde(default)]
	pub twitter: ProviderOAuthConfigLayer,
}

impl OAuthConfigLayer {
	pub fn merge(&mut self, other: OAuthConfigLayer) {
		self.spotify.merge(other.spotify);
		self.twitter.merge(other.twitter);
	}

	pub fn build(self) -> Result<OAuthConfig, ConfigError> {
		Ok(OAuthConfig {
			spotify: self.spotify.build("Spotify", SPOTIFY_DEFAULT_SCOPES)?,
			twitter: self.twitter.build("Twitter", TWITTER_DEFAULT_SCOPES)?,
		})
	}
}

/// A provider left unconfigured answers its login routes with 501.
#[derive(Debug, Clone, Default)]
pub struct OAuthConfig {
	pub spotify: Option<ProviderOAuthConfig>,
	pub twitter: Option<ProviderOAuthConfig>,
}

impl OAuthConfig {
	pub fn has_any_provider(&self) -> bool {
		self.spotify.is_some() || self.twitter.is_some()
	}
}
