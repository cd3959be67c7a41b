// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User repository for database operations.
//!
//! A user row is anchored by `(oauth_provider, oauth_id)`. It is created on
//! the first successful OAuth callback and never deleted.

use async_trait::async_trait;
use chrono::Utc;
use otogram_server_auth::{Provider, User, UserId};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::post_query::search_pattern;
use crate::types::{format_timestamp, parse_provider, parse_timestamp};

#[async_trait]
pub trait UserStore: Send + Sync {
	async fn upsert_oauth_user(
		&self,
		provider: Provider,
		oauth_id: &str,
		profile_image: &str,
	) -> Result<User, DbError>;
	async fn get_user_by_id(&self, id: UserId) -> Result<Option<User>, DbError>;
	async fn update_profile(
		&self,
		id: UserId,
		display_name: &str,
		profile_image: &str,
		bio: &str,
	) -> Result<Option<User>, DbError>;
	async fn search_users(&self, query: Option<&str>) -> Result<Vec<User>, DbError>;
}

const USER_COLUMNS: &str =
	"id, oauth_id, oauth_provider, display_name, profile_image, bio, created_at";

/// Repository for user database operations.
#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	/// Create a new repository with the given connection pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create the user for `(provider, oauth_id)` or refresh its profile image.
	///
	/// New rows start with an empty display name and bio, which sends the
	/// client through profile setup. Existing rows only get the new
	/// `profile_image`; a chosen display name and bio are kept.
	///
	/// A single `INSERT ... ON CONFLICT` statement, so concurrent first logins
	/// for the same identity resolve to one row.
	#[tracing::instrument(skip(self, profile_image), fields(provider = %provider))]
	pub async fn upsert_oauth_user(
		&self,
		provider: Provider,
		oauth_id: &str,
		profile_image: &str,
	) -> Result<User, DbError> {
		let now = format_timestamp(Utc::now());
		let row = sqlx::query(&format!(
			r#"
			INSERT INTO users (oauth_id, oauth_provider, display_name, profile_image, bio, created_at)
			VALUES (?, ?, '', ?, '', ?)
			ON CONFLICT (oauth_provider, oauth_id)
			DO UPDATE SET profile_image = excluded.profile_image
			RETURNING {USER_COLUMNS}
			"#
		))
		.bind(oauth_id)
		.bind(provider.as_str())
		.bind(profile_image)
		.bind(&now)
		.fetch_one(&self.pool)
		.await?;

		let user = self.row_to_user(&row)?;
		tracing::debug!(user_id = %user.id, "oauth user upserted");
		Ok(user)
	}

	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_user_by_id(&self, id: UserId) -> Result<Option<User>, DbError> {
		let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
			.bind(id.into_inner())
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| self.row_to_user(&r)).transpose()
	}

	/// Overwrite the editable profile fields in one statement.
	///
	/// # Returns
	/// The refreshed user, or `None` if no such user exists.
	#[tracing::instrument(skip(self, display_name, profile_image, bio), fields(user_id = %id))]
	pub async fn update_profile(
		&self,
		id: UserId,
		display_name: &str,
		profile_image: &str,
		bio: &str,
	) -> Result<Option<User>, DbError> {
		let row = sqlx::query(&format!(
			r#"
			UPDATE users
			SET display_name = ?, profile_image = ?, bio = ?
			WHERE id = ?
			RETURNING {USER_COLUMNS}
			"#
		))
		.bind(display_name)
		.bind(profile_image)
		.bind(bio)
		.bind(id.into_inner())
		.fetch_optional(&self.pool)
		.await?;

		let user = row.map(|r| self.row_to_user(&r)).transpose()?;
		if user.is_some() {
			tracing::debug!(user_id = %id, "profile updated");
		}
		Ok(user)
	}

	/// Search users by display name.
	///
	/// An empty or missing query lists everyone by display name. Otherwise
	/// the query is a Unicode case-insensitive substring match and results
	/// are newest account first.
	#[tracing::instrument(skip(self, query))]
	pub async fn search_users(&self, query: Option<&str>) -> Result<Vec<User>, DbError> {
		let rows = match query.filter(|q| !q.is_empty()) {
			None => {
				sqlx::query(&format!(
					"SELECT {USER_COLUMNS} FROM users ORDER BY display_name ASC, id ASC"
				))
				.fetch_all(&self.pool)
				.await?
			}
			Some(q) => {
				sqlx::query(&format!(
					r#"
					SELECT {USER_COLUMNS} FROM users
					WHERE display_name REGEXP ?
					ORDER BY created_at DESC, id DESC
					"#
				))
				.bind(search_pattern(q))
				.fetch_all(&self.pool)
				.await?
			}
		};

		rows.iter().map(|r| self.row_to_user(r)).collect()
	}

	fn row_to_user(&self, row: &sqlx::sqlite::SqliteRow) -> Result<User, DbError> {
		let provider: String = row.get("oauth_provider");
		let created_at: String = row.get("created_at");

		Ok(User {
			id: UserId::new(row.get("id")),
			oauth_id: row.get("oauth_id"),
			oauth_provider: parse_provider(&provider)?,
			display_name: row.get("display_name"),
			profile_image: row.get("profile_image"),
			bio: row.get("bio"),
			created_at: parse_timestamp(&created_at)?,
		})
	}
}

#[async_trait]
impl UserStore for UserRepository {
	async fn upsert_oauth_user(
		&self,
		provider: Provider,
		oauth_id: &str,
		profile_image: &str,
	) -> Result<User, DbError> {
		self
			.upsert_oauth_user(provider, oauth_id, profile_image)
			.await
	}

	async fn get_user_by_id(&self, id: UserId) -> Result<Option<User>, DbError> {
		self.get_user_by_id(id).await
	}

	async fn update_profile(
		&self,
		id: UserId,
		display_name: &str,
		profile_image: &str,
		bio: &str,
	) -> Result<Option<User>, DbError> {
		self
			.update_profile(id, display_name, profile_image, bio)
			.await
	}

	async fn search_users(&self, query: Option<&str>) -> Result<Vec<User>, DbError> {
		self.search_users(query).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_test_pool;
	use proptest::prelude::*;

	async fn count_users(pool: &SqlitePool) -> i64 {
		sqlx::query_scalar("SELECT COUNT(*) FROM users")
			.fetch_one(pool)
			.await
			.unwrap()
	}

	#[tokio::test]
	async fn first_login_creates_user_needing_setup() {
		let pool = create_test_pool().await;
		let repo = UserRepository::new(pool);

		let user = repo
			.upsert_oauth_user(Provider::Spotify, "spotify-abc", "https://img/1")
			.await
			.unwrap();

		assert_eq!(user.id, UserId::new(1));
		assert_eq!(user.oauth_provider, Provider::Spotify);
		assert_eq!(user.profile_image, "https://img/1");
		assert!(user.needs_profile_setup());
		assert_eq!(user.bio, "");
	}

	#[tokio::test]
	async fn second_login_keeps_id_and_profile_but_refreshes_image() {
		let pool = create_test_pool().await;
		let repo = UserRepository::new(pool.clone());

		let first = repo
			.upsert_oauth_user(Provider::Twitter, "42", "https://img/old")
			.await
			.unwrap();
		repo
			.update_profile(first.id, "ayumi", "https://img/custom", "hello")
			.await
			.unwrap();

		let second = repo
			.upsert_oauth_user(Provider::Twitter, "42", "https://img/new")
			.await
			.unwrap();

		assert_eq!(second.id, first.id);
		assert_eq!(second.display_name, "ayumi");
		assert_eq!(second.bio, "hello");
		assert_eq!(second.profile_image, "https://img/new");
		assert_eq!(second.created_at, first.created_at);
		assert_eq!(count_users(&pool).await, 1);
	}

	#[tokio::test]
	async fn same_external_id_on_other_provider_is_another_user() {
		let pool = create_test_pool().await;
		let repo = UserRepository::new(pool.clone());

		let a = repo
			.upsert_oauth_user(Provider::Spotify, "same", "")
			.await
			.unwrap();
		let b = repo
			.upsert_oauth_user(Provider::Twitter, "same", "")
			.await
			.unwrap();

		assert_ne!(a.id, b.id);
		assert_eq!(count_users(&pool).await, 2);
	}

	#[tokio::test]
	async fn update_profile_missing_user_returns_none() {
		let pool = create_test_pool().await;
		let repo = UserRepository::new(pool);

		let result = repo
			.update_profile(UserId::new(99), "ghost", "", "")
			.await
			.unwrap();
		assert!(result.is_none());
		assert!(repo.get_user_by_id(UserId::new(99)).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn empty_search_lists_all_by_display_name() {
		let pool = create_test_pool().await;
		let repo = UserRepository::new(pool);

		for (oauth_id, name) in [("1", "charlie"), ("2", "alice"), ("3", "bob")] {
			let u = repo
				.upsert_oauth_user(Provider::Spotify, oauth_id, "")
				.await
				.unwrap();
			repo.update_profile(u.id, name, "", "").await.unwrap();
		}

		let names: Vec<String> = repo
			.search_users(None)
			.await
			.unwrap()
			.into_iter()
			.map(|u| u.display_name)
			.collect();
		assert_eq!(names, vec!["alice", "bob", "charlie"]);

		let via_empty = repo.search_users(Some("")).await.unwrap();
		assert_eq!(via_empty.len(), 3);
	}

	#[tokio::test]
	async fn search_is_case_insensitive_substring_newest_first() {
		let pool = create_test_pool().await;
		let repo = UserRepository::new(pool);

		for (oauth_id, name) in [("1", "JazzCat"), ("2", "rocker"), ("3", "smooth jazz")] {
			let u = repo
				.upsert_oauth_user(Provider::Spotify, oauth_id, "")
				.await
				.unwrap();
			repo.update_profile(u.id, name, "", "").await.unwrap();
		}

		let names: Vec<String> = repo
			.search_users(Some("JAZZ"))
			.await
			.unwrap()
			.into_iter()
			.map(|u| u.display_name)
			.collect();
		assert_eq!(names, vec!["smooth jazz", "JazzCat"]);
	}

	#[tokio::test]
	async fn search_treats_wildcards_literally() {
		let pool = create_test_pool().await;
		let repo = UserRepository::new(pool);

		for (oauth_id, name) in [("1", "100%"), ("2", "1000")] {
			let u = repo
				.upsert_oauth_user(Provider::Spotify, oauth_id, "")
				.await
				.unwrap();
			repo.update_profile(u.id, name, "", "").await.unwrap();
		}

		let found = repo.search_users(Some("0%")).await.unwrap();
		assert_eq!(found.len(), 1);
		assert_eq!(found[0].display_name, "100%");

		let underscore = repo.search_users(Some("_")).await.unwrap();
		assert!(underscore.is_empty());
	}

	#[tokio::test]
	async fn search_folds_non_ascii_case() {
		let pool = create_test_pool().await;
		let repo = UserRepository::new(pool);

		for (oauth_id, name) in [("1", "Émilie"), ("2", "emilie"), ("3", "ЁЛКА")] {
			let u = repo
				.upsert_oauth_user(Provider::Spotify, oauth_id, "")
				.await
				.unwrap();
			repo.update_profile(u.id, name, "", "").await.unwrap();
		}

		let accented: Vec<String> = repo
			.search_users(Some("émilie"))
			.await
			.unwrap()
			.into_iter()
			.map(|u| u.display_name)
			.collect();
		assert_eq!(accented, vec!["Émilie"]);

		let cyrillic = repo.search_users(Some("ёлк")).await.unwrap();
		assert_eq!(cyrillic.len(), 1);
		assert_eq!(cyrillic[0].display_name, "ЁЛКА");
	}

	proptest! {
		#![proptest_config(ProptestConfig::with_cases(16))]

		#[test]
		fn repeated_logins_never_duplicate(oauth_id in "[a-zA-Z0-9]{1,24}", logins in 1usize..5) {
			let rt = tokio::runtime::Builder::new_current_thread()
				.enable_all()
				.build()
				.unwrap();
			rt.block_on(async {
				let pool = create_test_pool().await;
				let repo = UserRepository::new(pool.clone());
				let mut ids = Vec::new();
				for i in 0..logins {
					let u = repo
						.upsert_oauth_user(Provider::Spotify, &oauth_id, &format!("img{i}"))
						.await
						.unwrap();
					ids.push(u.id);
				}
				assert!(ids.iter().all(|id| *id == ids[0]));
				assert_eq!(count_users(&pool).await, 1);
			});
		}
	}
}
