// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Twitter (X) OAuth 2.0 authentication for otogram, plus the one write call
//! the server makes on a user's behalf: creating a tweet.
//!
//! # OAuth Flow
//!
//! Twitter requires PKCE on the authorization code flow. otogram uses a fixed
//! `plain` challenge ([`PKCE_CHALLENGE`]); the verifier sent on exchange is
//! the same string.
//!
//! 1. Redirect to `https://twitter.com/i/oauth2/authorize` with client id,
//!    redirect URI, scopes, `state`, `code_challenge` and
//!    `code_challenge_method=plain`.
//! 2. Exchange the returned `code` at `https://api.twitter.com/2/oauth2/token`
//!    with HTTP Basic client authentication and `code_verifier`.
//! 3. Fetch `/2/users/me?user.fields=profile_image_url`.
//!
//! The access token (and refresh token when `offline.access` was granted) is
//! stored by the server so posts can later be cross-posted with
//! [`TwitterOAuthClient::create_tweet`].

use otogram_common_secret::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const TWITTER_AUTHORIZE_URL: &str = "https://twitter.com/i/oauth2/authorize";
pub const TWITTER_TOKEN_URL: &str = "https://api.twitter.com/2/oauth2/token";
pub const TWITTER_PROFILE_URL: &str =
	"https://api.twitter.com/2/users/me?user.fields=profile_image_url";
pub const TWITTER_TWEETS_URL: &str = "https://api.twitter.com/2/tweets";

/// Fixed PKCE challenge, sent with `code_challenge_method=plain`.
pub const PKCE_CHALLENGE: &str = "challenge";

/// Lifetime assumed when the token response omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(2 * 60 * 60);

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
	#[error("HTTP request failed: {0}")]
	HttpRequest(#[from] reqwest::Error),

	#[error("failed to parse response: {0}")]
	ParseError(String),

	/// Twitter answered with an unexpected status.
	#[error("Twitter API error: {0}")]
	ProviderError(String),
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct TwitterOAuthConfig {
	pub client_id: String,
	pub client_secret: SecretString,
	pub redirect_uri: String,
	pub scopes: Vec<String>,
}

impl TwitterOAuthConfig {
	pub fn scopes_string(&self) -> String {
		self.scopes.join(" ")
	}
}

#[derive(Debug, Clone)]
pub struct TwitterEndpoints {
	pub authorize_url: String,
	pub token_url: String,
	pub profile_url: String,
	pub tweets_url: String,
}

impl Default for TwitterEndpoints {
	fn default() -> Self {
		Self {
			authorize_url: TWITTER_AUTHORIZE_URL.to_string(),
			token_url: TWITTER_TOKEN_URL.to_string(),
			profile_url: TWITTER_PROFILE_URL.to_string(),
			tweets_url: TWITTER_TWEETS_URL.to_string(),
		}
	}
}

impl TwitterEndpoints {
	/// All endpoints under one base URL, for mock servers.
	pub fn with_base(base: &str) -> Self {
		let base = base.trim_end_matches('/');
		Self {
			authorize_url: format!("{base}/i/oauth2/authorize"),
			token_url: format!("{base}/2/oauth2/token"),
			profile_url: format!("{base}/2/users/me?user.fields=profile_image_url"),
			tweets_url: format!("{base}/2/tweets"),
		}
	}
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterTokenResponse {
	pub access_token: SecretString,
	#[serde(default)]
	pub token_type: String,
	/// Lifetime in seconds. Absent responses fall back to
	/// [`DEFAULT_TOKEN_LIFETIME`].
	#[serde(default)]
	pub expires_in: Option<u64>,
	#[serde(default)]
	pub refresh_token: Option<SecretString>,
	#[serde(default)]
	pub scope: Option<String>,
}

impl TwitterTokenResponse {
	pub fn lifetime(&self) -> Duration {
		self
			.expires_in
			.map(Duration::from_secs)
			.unwrap_or(DEFAULT_TOKEN_LIFETIME)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitterUser {
	pub id: String,
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub username: String,
	#[serde(default)]
	pub profile_image_url: Option<String>,
}

impl TwitterUser {
	pub fn profile_image(&self) -> String {
		self.profile_image_url.clone().unwrap_or_default()
	}
}

#[derive(Debug, Deserialize)]
struct TwitterUserEnvelope {
	data: TwitterUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedTweet {
	pub id: String,
	#[serde(default)]
	pub text: String,
}

#[derive(Debug, Deserialize)]
struct CreatedTweetEnvelope {
	data: CreatedTweet,
}

#[derive(Debug, Serialize)]
struct CreateTweetRequest<'a> {
	text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TwitterTokenErrorResponse {
	error: String,
	error_description: Option<String>,
}

// =============================================================================
// Client
// =============================================================================

#[derive(Debug, Clone)]
pub struct TwitterOAuthClient {
	config: TwitterOAuthConfig,
	endpoints: TwitterEndpoints,
	http_client: reqwest::Client,
}

impl TwitterOAuthClient {
	#[tracing::instrument(skip_all, name = "TwitterOAuthClient::new")]
	pub fn new(config: TwitterOAuthConfig) -> Result<Self, OAuthError> {
		let http_client = otogram_common_http::new_client()?;
		Ok(Self {
			config,
			endpoints: TwitterEndpoints::default(),
			http_client,
		})
	}

	pub fn with_endpoints(mut self, endpoints: TwitterEndpoints) -> Self {
		self.endpoints = endpoints;
		self
	}

	pub fn config(&self) -> &TwitterOAuthConfig {
		&self.config
	}

	#[tracing::instrument(skip(self, state), fields(client_id = %self.config.client_id))]
	pub fn authorization_url(&self, state: &str) -> Result<String, OAuthError> {
		let mut url = Url::parse(&self.endpoints.authorize_url)
			.map_err(|e| OAuthError::ParseError(format!("invalid authorize URL: {e}")))?;

		url
			.query_pairs_mut()
			.append_pair("response_type", "code")
			.append_pair("client_id", &self.config.client_id)
			.append_pair("redirect_uri", &self.config.redirect_uri)
			.append_pair("scope", &self.config.scopes_string())
			.append_pair("state", state)
			.append_pair("code_challenge", PKCE_CHALLENGE)
			.append_pair("code_challenge_method", "plain");

		Ok(url.to_string())
	}

	/// Exchange an authorization code for an access token.
	///
	/// # Errors
	///
	/// - [`OAuthError::HttpRequest`]: network error or timeout.
	/// - [`OAuthError::ProviderError`]: Twitter rejected the code.
	/// - [`OAuthError::ParseError`]: unexpected response format.
	#[tracing::instrument(skip(self, code), name = "TwitterOAuthClient::exchange_code")]
	pub async fn exchange_code(&self, code: &str) -> Result<TwitterTokenResponse, OAuthError> {
		tracing::debug!("exchanging authorization code for access token");

		let response = self
			.http_client
			.post(&self.endpoints.token_url)
			.basic_auth(
				&self.config.client_id,
				Some(self.config.client_secret.expose()),
			)
			.form(&[
				("grant_type", "authorization_code"),
				("code", code),
				("redirect_uri", self.config.redirect_uri.as_str()),
				("code_verifier", PKCE_CHALLENGE),
			])
			.send()
			.await?;

		let status = response.status();
		let body = response.text().await?;

		if !status.is_success() {
			let message = serde_json::from_str::<TwitterTokenErrorResponse>(&body)
				.map(|e| e.error_description.unwrap_or(e.error))
				.unwrap_or_else(|_| format!("token endpoint returned {status}"));
			return Err(OAuthError::ProviderError(message));
		}

		serde_json::from_str(&body)
			.map_err(|e| OAuthError::ParseError(format!("failed to parse token response: {e}")))
	}

	#[tracing::instrument(skip(self, access_token), name = "TwitterOAuthClient::get_user")]
	pub async fn get_user(&self, access_token: &str) -> Result<TwitterUser, OAuthError> {
		tracing::debug!("fetching Twitter user profile");

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

		let envelope: TwitterUserEnvelope = response
			.json()
			.await
			.map_err(|e| OAuthError::ParseError(format!("failed to parse user response: {e}")))?;
		Ok(envelope.data)
	}

	/// Post `text` as the token's owner. Anything other than `201 Created` is
	/// an error.
	#[tracing::instrument(skip(self, access_token, text), fields(len = text.chars().count()), name = "TwitterOAuthClient::create_tweet")]
	pub async fn create_tweet(
		&self,
		access_token: &str,
		text: &str,
	) -> Result<CreatedTweet, OAuthError> {
		let response = self
			.http_client
			.post(&self.endpoints.tweets_url)
			.bearer_auth(access_token)
			.json(&CreateTweetRequest { text })
			.send()
			.await?;

		let status = response.status();
		if status != reqwest::StatusCode::CREATED {
			let body = response.text().await.unwrap_or_default();
			return Err(OAuthError::ProviderError(format!(
				"tweet not created ({status}): {body}"
			)));
		}

		let envelope: CreatedTweetEnvelope = response
			.json()
			.await
			.map_err(|e| OAuthError::ParseError(format!("failed to parse tweet response: {e}")))?;
		tracing::debug!(tweet_id = %envelope.data.id, "tweet created");
		Ok(envelope.data)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn config() -> TwitterOAuthConfig {
		TwitterOAuthConfig {
			client_id: "twitter-client".to_string(),
			client_secret: SecretString::new("twitter-secret".to_string()),
			redirect_uri: "http://127.0.0.1:8080/auth/twitter/callback".to_string(),
			scopes: vec![
				"tweet.read".to_string(),
				"tweet.write".to_string(),
				"users.read".to_string(),
				"offline.access".to_string(),
			],
		}
	}

	fn client_for(server: &MockServer) -> TwitterOAuthClient {
		TwitterOAuthClient::new(config())
			.unwrap()
			.with_endpoints(TwitterEndpoints::with_base(&server.uri()))
	}

	#[test]
	fn authorization_url_includes_plain_pkce() {
		let client = TwitterOAuthClient::new(config()).unwrap();
		let url = client.authorization_url("s1").unwrap();

		assert!(url.starts_with("https://twitter.com/i/oauth2/authorize?"));
		assert!(url.contains("response_type=code"));
		assert!(url.contains("client_id=twitter-client"));
		assert!(url.contains("scope=tweet.read+tweet.write+users.read+offline.access"));
		assert!(url.contains("state=s1"));
		assert!(url.contains("code_challenge=challenge"));
		assert!(url.contains("code_challenge_method=plain"));
	}

	#[test]
	fn token_lifetime_defaults_to_two_hours() {
		let with: TwitterTokenResponse =
			serde_json::from_str(r#"{"access_token": "a", "token_type": "bearer", "expires_in": 7200}"#)
				.unwrap();
		assert_eq!(with.lifetime(), Duration::from_secs(7200));

		let without: TwitterTokenResponse =
			serde_json::from_str(r#"{"access_token": "a"}"#).unwrap();
		assert_eq!(without.lifetime(), DEFAULT_TOKEN_LIFETIME);
	}

	#[tokio::test]
	async fn exchange_code_sends_verifier_and_basic_auth() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/2/oauth2/token"))
			.and(header(
				"authorization",
				"Basic dHdpdHRlci1jbGllbnQ6dHdpdHRlci1zZWNyZXQ=",
			))
			.and(body_string_contains("grant_type=authorization_code"))
			.and(body_string_contains("code=abc"))
			.and(body_string_contains("code_verifier=challenge"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"token_type": "bearer",
				"expires_in": 7200,
				"access_token": "tw-access",
				"refresh_token": "tw-refresh",
				"scope": "tweet.read tweet.write users.read offline.access"
			})))
			.expect(1)
			.mount(&server)
			.await;

		let token = client_for(&server).exchange_code("abc").await.unwrap();
		assert_eq!(token.access_token.expose(), "tw-access");
		assert_eq!(token.refresh_token.unwrap().expose(), "tw-refresh");
	}

	#[tokio::test]
	async fn get_user_unwraps_data_envelope() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/2/users/me"))
			.and(query_param("user.fields", "profile_image_url"))
			.and(header("authorization", "Bearer tw-access"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"data": {
					"id": "2244994945",
					"name": "Twitter Dev",
					"username": "TwitterDev",
					"profile_image_url": "https://pbs.twimg.com/profile_images/x_normal.jpg"
				}
			})))
			.mount(&server)
			.await;

		let user = client_for(&server).get_user("tw-access").await.unwrap();
		assert_eq!(user.id, "2244994945");
		assert_eq!(user.username, "TwitterDev");
		assert_eq!(
			user.profile_image(),
			"https://pbs.twimg.com/profile_images/x_normal.jpg"
		);
	}

	#[tokio::test]
	async fn create_tweet_accepts_only_created() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/2/tweets"))
			.and(header("authorization", "Bearer tw-access"))
			.and(body_json(serde_json::json!({"text": "hello\nhttps://x"})))
			.respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
				"data": {"id": "1445880548472328192", "text": "hello\nhttps://x"}
			})))
			.mount(&server)
			.await;

		let tweet = client_for(&server)
			.create_tweet("tw-access", "hello\nhttps://x")
			.await
			.unwrap();
		assert_eq!(tweet.id, "1445880548472328192");
	}

	#[tokio::test]
	async fn create_tweet_treats_200_as_failure() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/2/tweets"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"data": {"id": "1", "text": "x"}
			})))
			.mount(&server)
			.await;

		let err = client_for(&server)
			.create_tweet("tw-access", "x")
			.await
			.unwrap_err();
		assert!(matches!(err, OAuthError::ProviderError(_)));
	}

	#[tokio::test]
	async fn create_tweet_reports_forbidden() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/2/tweets"))
			.respond_with(ResponseTemplate::new(403).set_body_string("duplicate content"))
			.mount(&server)
			.await;

		let err = client_for(&server)
			.create_tweet("tw-access", "x")
			.await
			.unwrap_err();
		match err {
			OAuthError::ProviderError(msg) => {
				assert!(msg.contains("403"));
				assert!(msg.contains("duplicate content"));
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}
}

#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn lifetime_uses_expires_in_when_present(secs in 1u64..1_000_000) {
			let token = TwitterTokenResponse {
				access_token: SecretString::new("a".to_string()),
				token_type: "bearer".to_string(),
				expires_in: Some(secs),
				refresh_token: None,
				scope: None,
			};
			prop_assert_eq!(token.lifetime(), Duration::from_secs(secs));
		}
	}
}
