// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stored provider tokens, one per `(user_id, provider)`.
//!
//! Tokens are written on each successful code exchange for providers the
//! server later acts on (Twitter cross-posting) and removed on disconnect.

use async_trait::async_trait;
use chrono::Utc;
use otogram_common_secret::SecretString;
use otogram_server_auth::{Provider, UserId};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::types::{format_timestamp, parse_provider, parse_timestamp, OAuthToken};

#[async_trait]
pub trait OAuthTokenStore: Send + Sync {
	async fn upsert_token(&self, token: &OAuthToken) -> Result<(), DbError>;
	async fn get_token(
		&self,
		user_id: UserId,
		provider: Provider,
	) -> Result<Option<OAuthToken>, DbError>;
	async fn delete_token(&self, user_id: UserId, provider: Provider) -> Result<bool, DbError>;
}

#[derive(Clone)]
pub struct OAuthTokenRepository {
	pool: SqlitePool,
}

impl OAuthTokenRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, token), fields(user_id = %token.user_id, provider = %token.provider))]
	pub async fn upsert_token(&self, token: &OAuthToken) -> Result<(), DbError> {
		let now = format_timestamp(Utc::now());
		sqlx::query(
			r#"
			INSERT INTO oauth_tokens (
				user_id, provider, access_token, refresh_token, expires_at, created_at, updated_at
			) VALUES (?, ?, ?, ?, ?, ?, ?)
			ON CONFLICT (user_id, provider) DO UPDATE SET
				access_token = excluded.access_token,
				refresh_token = excluded.refresh_token,
				expires_at = excluded.expires_at,
				updated_at = excluded.updated_at
			"#,
		)
		.bind(token.user_id.into_inner())
		.bind(token.provider.as_str())
		.bind(token.access_token.expose())
		.bind(token.refresh_token.as_ref().map(|t| t.expose().as_str()))
		.bind(format_timestamp(token.expires_at))
		.bind(&now)
		.bind(&now)
		.execute(&self.pool)
		.await?;

		tracing::debug!("oauth token stored");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id, provider = %provider))]
	pub async fn get_token(
		&self,
		user_id: UserId,
		provider: Provider,
	) -> Result<Option<OAuthToken>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT user_id, provider, access_token, refresh_token, expires_at
			FROM oauth_tokens
			WHERE user_id = ? AND provider = ?
			"#,
		)
		.bind(user_id.into_inner())
		.bind(provider.as_str())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| self.row_to_token(&r)).transpose()
	}

	/// # Returns
	/// `true` if a token was deleted, `false` if none was stored.
	#[tracing::instrument(skip(self), fields(user_id = %user_id, provider = %provider))]
	pub async fn delete_token(&self, user_id: UserId, provider: Provider) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM oauth_tokens WHERE user_id = ? AND provider = ?")
			.bind(user_id.into_inner())
			.bind(provider.as_str())
			.execute(&self.pool)
			.await?;

		let deleted = result.rows_affected() > 0;
		if deleted {
			tracing::debug!("oauth token deleted");
		}
		Ok(deleted)
	}

	fn row_to_token(&self, row: &sqlx::sqlite::SqliteRow) -> Result<OAuthToken, DbError> {
		let provider: String = row.get("provider");
		let expires_at: String = row.get("expires_at");
		let refresh_token: Option<String> = row.get("refresh_token");

		Ok(OAuthToken {
			user_id: UserId::new(row.get("user_id")),
			provider: parse_provider(&provider)?,
			access_token: SecretString::new(row.get("access_token")),
			refresh_token: refresh_token.map(SecretString::new),
			expires_at: parse_timestamp(&expires_at)?,
		})
	}
}

#[async_trait]
impl OAuthTokenStore for OAuthTokenRepository {
	async fn upsert_token(&self, token: &OAuthToken) -> Result<(), DbError> {
		self.upsert_token(token).await
	}

	async fn get_token(
		&self,
		user_id: UserId,
		provider: Provider,
	) -> Result<Option<OAuthToken>, DbError> {
		self.get_token(user_id, provider).await
	}

	async fn delete_token(&self, user_id: UserId, provider: Provider) -> Result<bool, DbError> {
		self.delete_token(user_id, provider).await
	}
}
