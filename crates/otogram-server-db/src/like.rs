// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use chrono::Utc;
use otogram_server_auth::{PostId, UserId};
use sqlx::sqlite::SqlitePool;

use crate::error::DbError;
use crate::types::format_timestamp;

#[async_trait]
pub trait LikeStore: Send + Sync {
	async fn toggle_like(&self, user_id: UserId, post_id: PostId) -> Result<bool, DbError>;
}

/// Repository for likes. A user likes a post at most once, enforced by
/// `UNIQUE (user_id, post_id)`.
#[derive(Clone)]
pub struct LikeRepository {
	pool: SqlitePool,
}

impl LikeRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Flip the like for `(user_id, post_id)`.
	///
	/// # Returns
	/// `true` if the post is now liked, `false` if the like was removed.
	///
	/// The existence check and the write are separate statements. Two
	/// concurrent toggles by the same user may both see "not liked"; the
	/// second insert then hits the unique constraint, is ignored, and still
	/// reports `true`.
	#[tracing::instrument(skip(self), fields(user_id = %user_id, post_id = %post_id))]
	pub async fn toggle_like(&self, user_id: UserId, post_id: PostId) -> Result<bool, DbError> {
		let exists: bool =
			sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM likes WHERE user_id = ? AND post_id = ?)")
				.bind(user_id.into_inner())
				.bind(post_id.into_inner())
				.fetch_one(&self.pool)
				.await?;

		if exists {
			sqlx::query("DELETE FROM likes WHERE user_id = ? AND post_id = ?")
				.bind(user_id.into_inner())
				.bind(post_id.into_inner())
				.execute(&self.pool)
				.await?;
			tracing::debug!("like removed");
			return Ok(false);
		}

		let result = sqlx::query(
			r#"
			INSERT INTO likes (user_id, post_id, created_at)
			VALUES (?, ?, ?)
			ON CONFLICT (user_id, post_id) DO NOTHING
			"#,
		)
		.bind(user_id.into_inner())
		.bind(post_id.into_inner())
		.bind(format_timestamp(Utc::now()))
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			tracing::debug!("like already present");
		} else {
			tracing::debug!("like added");
		}
		Ok(true)
	}

	#[cfg(test)]
	pub(crate) async fn count_likes(&self, user_id: UserId, post_id: PostId) -> Result<i64, DbError> {
		let count: i64 =
			sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE user_id = ? AND post_id = ?")
				.bind(user_id.into_inner())
				.bind(post_id.into_inner())
				.fetch_one(&self.pool)
				.await?;
		Ok(count)
	}
}

#[async_trait]
impl LikeStore for LikeRepository {
	async fn toggle_like(&self, user_id: UserId, post_id: PostId) -> Result<bool, DbError> {
		self.toggle_like(user_id, post_id).await
	}
}
