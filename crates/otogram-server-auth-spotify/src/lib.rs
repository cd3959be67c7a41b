// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Spotify OAuth 2.0 authentication for otogram.
//!
//! Authorization code flow:
//!
//! 1. **Authorization URL**: redirect the browser to Spotify with the client
//!    id, redirect URI, scopes and the anti-forgery `state`.
//! 2. **Callback**: Spotify redirects back with `code` and `state`.
//! 3. **Code Exchange**: POST the code to the token endpoint, authenticating
//!    with HTTP Basic client credentials.
//! 4. **Profile**: GET `/v1/me` with the access token. The stable external id
//!    is the Spotify user id; the profile image is the first listed image.
//!
//! Spotify tokens are only used for login; they are not stored.
//!
//! ```rust,no_run
//! use otogram_server_auth_spotify::{SpotifyOAuthClient, SpotifyOAuthConfig};
//!
//! # async fn example(config: SpotifyOAuthConfig) -> Result<(), Box<dyn std::error::Error>> {
//! let client = SpotifyOAuthClient::new(config)?;
//! let url = client.authorization_url("state")?;
//! // ... redirect, then on callback:
//! let token = client.exchange_code("code-from-callback").await?;
//! let me = client.get_user(token.access_token.expose()).await?;
//! println!("{} {}", me.id, me.profile_image());
//! # Ok(())
//! # }
//! ```

use otogram_common_secret::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

pub const SPOTIFY_AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const SPOTIFY_PROFILE_URL: &str = "https://api.spotify.com/v1/me";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
	/// The HTTP request to Spotify failed (network error, timeout, etc.).
	#[error("HTTP request failed: {0}")]
	HttpRequest(#[from] reqwest::Error),

	#[error("failed to parse response: {0}")]
	ParseError(String),

	/// Spotify rejected the request (invalid code, expired token, etc.).
	#[error("Spotify API error: {0}")]
	ProviderError(String),
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct SpotifyOAuthConfig {
	pub client_id: String,
	pub client_secret: SecretString,
	pub redirect_uri: String,
	pub scopes: Vec<String>,
}

impl SpotifyOAuthConfig {
	pub fn scopes_string(&self) -> String {
		self.scopes.join(" ")
	}
}

/// Where the client sends requests. Overridden in tests to point at a mock
/// server.
#[derive(Debug, Clone)]
pub struct SpotifyEndpoints {
	pub authorize_url: String,
	pub token_url: String,
	pub profile_url: String,
}

impl Default for SpotifyEndpoints {
	fn default() -> Self {
		Self {
			authorize_url: SPOTIFY_AUTHORIZE_URL.to_string(),
			token_url: SPOTIFY_TOKEN_URL.to_string(),
			profile_url: SPOTIFY_PROFILE_URL.to_string(),
		}
	}
}

impl SpotifyEndpoints {
	/// All three endpoints under one base URL, for mock servers.
	pub fn with_base(base: &str) -> Self {
		let base = base.trim_end_matches('/');
		Self {
			authorize_url: format!("{base}/authorize"),
			token_url: format!("{base}/api/token"),
			profile_url: format!("{base}/v1/me"),
		}
	}
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTokenResponse {
	pub access_token: SecretString,
	#[serde(default)]
	pub token_type: String,
	/// Lifetime in seconds.
	#[serde(default)]
	pub expires_in: Option<i64>,
	#[serde(default)]
	pub refresh_token: Option<SecretString>,
	#[serde(default)]
	pub scope: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyImage {
	pub url: String,
	#[serde(default)]
	pub height: Option<u32>,
	#[serde(default)]
	pub width: Option<u32>,
}

/// The `/v1/me` response, reduced to the fields otogram uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyUser {
	pub id: String,
	#[serde(default)]
	pub display_name: Option<String>,
	#[serde(default)]
	pub images: Vec<SpotifyImage>,
}

impl SpotifyUser {
	/// First image URL, or empty when the account has no picture.
	pub fn profile_image(&self) -> String {
		self
			.images
			.first()
			.map(|img| img.url.clone())
			.unwrap_or_default()
	}
}

#[derive(Debug, Deserialize)]
struct SpotifyTokenErrorResponse {
	error: String,
	error_description: Option<String>,
}

// =============================================================================
// Client
// =============================================================================

#[derive(Debug, Clone)]
pub struct SpotifyOAuthClient {
	config: SpotifyOAuthConfig,
	endpoints: SpotifyEndpoints,
	http_client: reqwest::Client,
}

impl SpotifyOAuthClient {
	#[tracing::instrument(skip_all, name = "SpotifyOAuthClient::new")]
	pub fn new(config: SpotifyOAuthConfig) -> Result<Self, OAuthError> {
		let http_client = otogram_common_http::new_client()?;
		Ok(Self {
			config,
			endpoints: SpotifyEndpoints::default(),
			http_client,
		})
	}

	pub fn with_endpoints(mut self, endpoints: SpotifyEndpoints) -> Self {
		self.endpoints = endpoints;
		self
	}

	pub fn config(&self) -> &SpotifyOAuthConfig {
		&self.config
	}

	/// Build the authorize URL with `response_type=code`, client id, scopes,
	/// redirect URI and `state`.
	#[tracing::instrument(skip(self, state), fields(client_id = %self.config.client_id))]
	pub fn authorization_url(&self, state: &str) -> Result<String, OAuthError> {
		let mut url = Url::parse(&self.endpoints.authorize_url)
			.map_err(|e| OAuthError::ParseError(format!("invalid authorize URL: {e}")))?;

		url
			.query_pairs_mut()
			.append_pair("response_type", "code")
			.append_pair("client_id", &self.config.client_id)
			.append_pair("scope", &self.config.scopes_string())
			.append_pair("redirect_uri", &self.config.redirect_uri)
			.append_pair("state", state);

		Ok(url.to_string())
	}

	/// Exchange an authorization code for an access token.
	///
	/// # Errors
	///
	/// - [`OAuthError::HttpRequest`]: network error or timeout.
	/// - [`OAuthError::ProviderError`]: Spotify rejected the code.
	/// - [`OAuthError::ParseError`]: unexpected response format.
	#[tracing::instrument(skip(self, code), name = "SpotifyOAuthClient::exchange_code")]
	pub async fn exchange_code(&self, code: &str) -> Result<SpotifyTokenResponse, OAuthError> {
		tracing::debug!("exchanging authorization code for access token");

		let response = self
			.http_client
			.post(&self.endpoints.token_url)
			.basic_auth(
				&self.config.client_id,
				Some(self.config.client_secret.expose()),
			)
			.header("Accept", "application/json")
			.form(&[
				("grant_type", "authorization_code"),
				("code", code),
				("redirect_uri", self.config.redirect_uri.as_str()),
			])
			.send()
			.await?;

		let status = response.status();
		let body = response.text().await?;

		if !status.is_success() {
			let message = serde_json::from_str::<SpotifyTokenErrorResponse>(&body)
				.map(|e| e.error_description.unwrap_or(e.error))
				.unwrap_or_else(|_| format!("token endpoint returned {status}"));
			return Err(OAuthError::ProviderError(message));
		}

		serde_json::from_str(&body)
			.map_err(|e| OAuthError::ParseError(format!("failed to parse token response: {e}")))
	}

	/// Fetch the signed-in user's profile.
	#[tracing::instrument(skip(self, access_token), name = "SpotifyOAuthClient::get_user")]
	pub async fn get_user(&self, access_token: &str) -> Result<SpotifyUser, OAuthError> {
		tracing::debug!("fetching Spotify user profile");

		let response = self
			.http_client
			.get(&self.endpoints.profile_url)
			.bearer_auth(access_token)
			.send()
			.await?;

		if !response.status().is_success() {
			let status = response.status();
			let body = response.text().await.unwrap_or_default();
			return Err(OAuthError::ProviderError(format!(
				"failed to get user ({status}): {body}"
			)));
		}

		response
			.json()
			.await
			.map_err(|e| OAuthError::ParseError(format!("failed to parse user response: {e}")))
	}
}
