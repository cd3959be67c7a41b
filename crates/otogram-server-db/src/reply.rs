// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reply repository. Replies are immutable once written.

use async_trait::async_trait;
use chrono::Utc;
use otogram_server_auth::{PostId, ReplyId, UserId, UserProfile};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::types::{format_timestamp, parse_timestamp, Reply};

#[async_trait]
pub trait ReplyStore: Send + Sync {
	async fn create_reply(
		&self,
		post_id: PostId,
		user_id: UserId,
		content: &str,
	) -> Result<Reply, DbError>;
	async fn list_replies(&self, post_id: PostId) -> Result<Vec<Reply>, DbError>;
}

#[derive(Clone)]
pub struct ReplyRepository {
	pool: SqlitePool,
}

impl ReplyRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a reply and return it with the author's public profile.
	#[tracing::instrument(skip(self, content), fields(post_id = %post_id, user_id = %user_id))]
	pub async fn create_reply(
		&self,
		post_id: PostId,
		user_id: UserId,
		content: &str,
	) -> Result<Reply, DbError> {
		let now = format_timestamp(Utc::now());
		let id: i64 = sqlx::query_scalar(
			r#"
			INSERT INTO replies (post_id, user_id, content, created_at)
			VALUES (?, ?, ?, ?)
			RETURNING id
			"#,
		)
		.bind(post_id.into_inner())
		.bind(user_id.into_inner())
		.bind(content)
		.bind(&now)
		.fetch_one(&self.pool)
		.await?;

		tracing::debug!(reply_id = id, "reply created");

		let row = sqlx::query(
			r#"
			SELECT r.id, r.post_id, r.user_id, r.content, r.created_at,
				u.id AS author_id, u.display_name AS author_display_name,
				u.profile_image AS author_profile_image, u.bio AS author_bio
			FROM replies r
			LEFT JOIN users u ON u.id = r.user_id
			WHERE r.id = ?
			"#,
		)
		.bind(id)
		.fetch_one(&self.pool)
		.await?;

		self.row_to_reply(&row)
	}

	/// Replies to a post, oldest first.
	#[tracing::instrument(skip(self), fields(post_id = %post_id))]
	pub async fn list_replies(&self, post_id: PostId) -> Result<Vec<Reply>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT r.id, r.post_id, r.user_id, r.content, r.created_at,
				u.id AS author_id, u.display_name AS author_display_name,
				u.profile_image AS author_profile_image, u.bio AS author_bio
			FROM replies r
			LEFT JOIN users u ON u.id = r.user_id
			WHERE r.post_id = ?
			ORDER BY r.created_at ASC, r.id ASC
			"#,
		)
		.bind(post_id.into_inner())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(|r| self.row_to_reply(r)).collect()
	}

	fn row_to_reply(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Reply, DbError> {
		let created_at: String = row.get("created_at");
		let author_id: Option<i64> = row.get("author_id");

		Ok(Reply {
			id: ReplyId::new(row.get("id")),
			user_id: UserId::new(row.get("user_id")),
			post_id: PostId::new(row.get("post_id")),
			content: row.get("content"),
			created_at: parse_timestamp(&created_at)?,
			user: author_id.map(|id| UserProfile {
				id: UserId::new(id),
				display_name: row.get("author_display_name"),
				profile_image: row.get("author_profile_image"),
				bio: row.get("author_bio"),
			}),
		})
	}
}

#[async_trait]
impl ReplyStore for ReplyRepository {
	async fn create_reply(
		&self,
		post_id: PostId,
		user_id: UserId,
		content: &str,
	) -> Result<Reply, DbError> {
		self.create_reply(post_id, user_id, content).await
	}

	async fn list_replies(&self, post_id: PostId) -> Result<Vec<Reply>, DbError> {
		self.list_replies(post_id).await
	}
}
