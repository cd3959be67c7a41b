// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use otogram_server_auth::{Provider, User};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::migrations::run_migrations;
use crate::user::UserRepository;

/// In-memory database with the full schema. A single connection, since each
/// `:memory:` connection is its own database.
pub async fn create_test_pool() -> SqlitePool {
	let options = SqliteConnectOptions::from_str("sqlite::memory:")
		.unwrap()
		.foreign_keys(true)
		.with_regexp();
	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.connect_with(options)
		.await
		.unwrap();
	run_migrations(&pool).await.unwrap();
	pool
}

/// Insert a user who has finished profile setup.
pub async fn seed_user(pool: &SqlitePool, oauth_id: &str, display_name: &str) -> User {
	let repo = UserRepository::new(pool.clone());
	let user = repo
		.upsert_oauth_user(Provider::Spotify, oauth_id, "")
		.await
		.unwrap();
	repo
		.update_profile(user.id, display_name, "", "")
		.await
		.unwrap()
		.unwrap()
}

/// Overwrite a post's timestamp so ordering tests do not depend on the clock.
pub async fn set_post_created_at(pool: &SqlitePool, post_id: i64, at: DateTime<Utc>) {
	sqlx::query("UPDATE posts SET created_at = ? WHERE id = ?")
		.bind(crate::types::format_timestamp(at))
		.bind(post_id)
		.execute(pool)
		.await
		.unwrap();
}
