// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

const INITIAL_SCHEMA: &str = include_str!("../migrations/001_initial_schema.sql");

/// Apply the schema. Every statement is `IF NOT EXISTS`, so this is safe to
/// run on each startup.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
	for stmt in statements(INITIAL_SCHEMA) {
		sqlx::query(&stmt).execute(pool).await?;
	}
	tracing::debug!("migrations applied");
	Ok(())
}

/// Split a migration file into statements, dropping `--` comment lines.
fn statements(sql: &str) -> Vec<String> {
	let without_comments: String = sql
		.lines()
		.filter(|line| !line.trim_start().starts_with("--"))
		.collect::<Vec<_>>()
		.join("\n");

	without_comments
		.split(';')
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::to_string)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_test_pool;

	#[test]
	fn splits_schema_into_statements() {
		let stmts = statements(INITIAL_SCHEMA);
		assert!(stmts.iter().all(|s| !s.starts_with("--")));
		for table in ["users", "posts", "likes", "replies", "oauth_tokens"] {
			assert!(
				stmts
					.iter()
					.any(|s| s.contains(&format!("CREATE TABLE IF NOT EXISTS {table}"))),
				"missing {table}"
			);
		}
	}

	#[tokio::test]
	async fn migrations_are_idempotent() {
		let pool = create_test_pool().await;
		run_migrations(&pool).await.unwrap();
		run_migrations(&pool).await.unwrap();
	}
}
