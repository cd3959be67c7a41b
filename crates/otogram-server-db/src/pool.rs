// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqliteSynchronous};
use std::str::FromStr;
use std::time::Duration;

use crate::error::DbError;

/// Create a SqlitePool with WAL mode, foreign keys, create-if-missing and
/// the `REGEXP` function used by search.
///
/// # Errors
/// Returns `DbError::Internal` if the URL is invalid, `DbError::Sqlx` if
/// the connection fails.
#[tracing::instrument(skip(database_url))]
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, DbError> {
	let options = SqliteConnectOptions::from_str(database_url)
		.map_err(|e| DbError::Internal(format!("Invalid database URL: {e}")))?
		.journal_mode(SqliteJournalMode::Wal)
		.synchronous(SqliteSynchronous::Normal)
		.foreign_keys(true)
		.create_if_missing(true)
		.with_regexp();

	let pool = SqlitePool::connect_with(options).await?;

	tracing::debug!("database pool created");
	Ok(pool)
}

/// [`create_pool`] with a fixed number of attempts and a fixed delay between
/// them, for deployments where the database volume may come up after the
/// server. The last error is returned once attempts are exhausted.
#[tracing::instrument(skip(database_url))]
pub async fn connect_with_retry(
	database_url: &str,
	attempts: u32,
	delay: Duration,
) -> Result<SqlitePool, DbError> {
	let attempts = attempts.max(1);
	let mut attempt = 1;
	loop {
		match create_pool(database_url).await {
			Ok(pool) => {
				tracing::info!(attempt, "connected to database");
				return Ok(pool);
			}
			Err(e) if attempt < attempts => {
				tracing::warn!(
					error = %e,
					attempt,
					max_attempts = attempts,
					delay_ms = delay.as_millis() as u64,
					"failed to connect to database, retrying"
				);
				tokio::time::sleep(delay).await;
				attempt += 1;
			}
			Err(e) => {
				tracing::error!(error = %e, attempts, "could not connect to database");
				return Err(e);
			}
		}
	}
}
