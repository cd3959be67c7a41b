// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Post repository for database operations.
//!
//! Reads are viewer-aware: each returned [`Post`] carries live like and
//! reply counts, and `liked_by_current_user` for the given [`Viewer`]
//! (always `false` for anonymous viewers).

use async_trait::async_trait;
use chrono::Utc;
use otogram_server_auth::{PostId, UserId, UserProfile, Viewer};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::post_query::{build_post_query, PostFilter, QueryArg, SearchScope};
use crate::types::{format_timestamp, parse_timestamp, NewPost, Post};

#[async_trait]
pub trait PostStore: Send + Sync {
	async fn create_post(&self, post: &NewPost) -> Result<Post, DbError>;
	async fn get_post(&self, id: PostId, viewer: &Viewer) -> Result<Option<Post>, DbError>;
	async fn list_posts(
		&self,
		author: Option<UserId>,
		viewer: &Viewer,
	) -> Result<Vec<Post>, DbError>;
	async fn search_posts(
		&self,
		scope: SearchScope,
		term: &str,
		viewer: &Viewer,
	) -> Result<Vec<Post>, DbError>;
	async fn post_exists(&self, id: PostId) -> Result<bool, DbError>;
}

/// Repository for post database operations.
#[derive(Clone)]
pub struct PostRepository {
	pool: SqlitePool,
}

impl PostRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a post and return it as stored, with the author attached.
	///
	/// Callers validate with [`NewPost::validate`] first; the schema also
	/// rejects more than ten tags.
	#[tracing::instrument(skip(self, post), fields(user_id = %post.user_id, song_type = %post.song_type))]
	pub async fn create_post(&self, post: &NewPost) -> Result<Post, DbError> {
		let tags = serde_json::to_string(&post.tags)?;
		let now = format_timestamp(Utc::now());

		let id: i64 = sqlx::query_scalar(
			r#"
			INSERT INTO posts (user_id, title, song_id, song_type, comment, tags, created_at)
			VALUES (?, ?, ?, ?, ?, ?, ?)
			RETURNING id
			"#,
		)
		.bind(post.user_id.into_inner())
		.bind(&post.title)
		.bind(&post.song_id)
		.bind(post.song_type.as_str())
		.bind(&post.comment)
		.bind(&tags)
		.bind(&now)
		.fetch_one(&self.pool)
		.await?;

		let id = PostId::new(id);
		tracing::debug!(post_id = %id, "post created");

		self
			.get_post(id, &Viewer::Anonymous)
			.await?
			.ok_or_else(|| DbError::NotFound(format!("post {id}")))
	}

	#[tracing::instrument(skip(self, viewer), fields(post_id = %id))]
	pub async fn get_post(&self, id: PostId, viewer: &Viewer) -> Result<Option<Post>, DbError> {
		let mut posts = self.fetch(&PostFilter::ById(id), viewer).await?;
		Ok(posts.pop())
	}

	/// The global feed, or one user's posts, newest first.
	#[tracing::instrument(skip(self, viewer))]
	pub async fn list_posts(
		&self,
		author: Option<UserId>,
		viewer: &Viewer,
	) -> Result<Vec<Post>, DbError> {
		let filter = match author {
			Some(user_id) => PostFilter::ByUser(user_id),
			None => PostFilter::Feed,
		};
		self.fetch(&filter, viewer).await
	}

	/// Case-insensitive substring search on title/comment, exact
	/// case-sensitive membership on tags.
	#[tracing::instrument(skip(self, term, viewer))]
	pub async fn search_posts(
		&self,
		scope: SearchScope,
		term: &str,
		viewer: &Viewer,
	) -> Result<Vec<Post>, DbError> {
		self.fetch(&PostFilter::Search { scope, term }, viewer).await
	}

	#[tracing::instrument(skip(self), fields(post_id = %id))]
	pub async fn post_exists(&self, id: PostId) -> Result<bool, DbError> {
		let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM posts WHERE id = ?)")
			.bind(id.into_inner())
			.fetch_one(&self.pool)
			.await?;
		Ok(exists)
	}

	async fn fetch(&self, filter: &PostFilter<'_>, viewer: &Viewer) -> Result<Vec<Post>, DbError> {
		let built = build_post_query(filter, viewer);

		let mut query = sqlx::query(&built.sql);
		for arg in built.args {
			query = match arg {
				QueryArg::Int(value) => query.bind(value),
				QueryArg::Text(value) => query.bind(value),
			};
		}

		let rows = query.fetch_all(&self.pool).await?;
		rows.iter().map(|r| self.row_to_post(r)).collect()
	}

	fn row_to_post(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Post, DbError> {
		let song_type: String = row.get("song_type");
		let tags: String = row.get("tags");
		let created_at: String = row.get("created_at");

		let author_id: Option<i64> = row.get("author_id");
		let user = author_id.map(|id| UserProfile {
			id: UserId::new(id),
			display_name: row.get("author_display_name"),
			profile_image: row.get("author_profile_image"),
			bio: row.get("author_bio"),
		});

		Ok(Post {
			id: PostId::new(row.get("id")),
			user_id: UserId::new(row.get("user_id")),
			title: row.get("title"),
			song_id: row.get("song_id"),
			song_type: song_type.parse()?,
			comment: row.get("comment"),
			tags: serde_json::from_str(&tags)?,
			created_at: parse_timestamp(&created_at)?,
			user,
			like_count: row.get("like_count"),
			reply_count: row.get("reply_count"),
			liked_by_current_user: row.get("liked_by_current_user"),
		})
	}
}

#[async_trait]
impl PostStore for PostRepository {
	async fn create_post(&self, post: &NewPost) -> Result<Post, DbError> {
		self.create_post(post).await
	}

	async fn get_post(&self, id: PostId, viewer: &Viewer) -> Result<Option<Post>, DbError> {
		self.get_post(id, viewer).await
	}

	async fn list_posts(
		&self,
		author: Option<UserId>,
		viewer: &Viewer,
	) -> Result<Vec<Post>, DbError> {
		self.list_posts(author, viewer).await
	}

	async fn search_posts(
		&self,
		scope: SearchScope,
		term: &str,
		viewer: &Viewer,
	) -> Result<Vec<Post>, DbError> {
		self.search_posts(scope, term, viewer).await
	}

	async fn post_exists(&self, id: PostId) -> Result<bool, DbError> {
		self.post_exists(id).await
	}
}
