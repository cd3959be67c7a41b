// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database layer for the otogram server.
//!
//! SQLite through `sqlx`. Each table has a repository holding a cloned
//! [`SqlitePool`](sqlx::SqlitePool) and a matching `*Store` trait so the
//! HTTP layer can depend on `Arc<dyn XStore>`:
//!
//! | Repository | Trait | Table |
//! |------------|-------|-------|
//! | [`UserRepository`] | [`UserStore`] | `users` |
//! | [`PostRepository`] | [`PostStore`] | `posts` (+ counts from `likes`, `replies`) |
//! | [`LikeRepository`] | [`LikeStore`] | `likes` |
//! | [`ReplyRepository`] | [`ReplyStore`] | `replies` |
//! | [`OAuthTokenRepository`] | [`OAuthTokenStore`] | `oauth_tokens` |
//!
//! Statements run individually; there are no multi-statement transactions.

mod error;
pub mod like;
pub mod migrations;
pub mod oauth_token;
pub mod pool;
pub mod post;
pub mod post_query;
pub mod reply;
pub mod types;
pub mod user;

#[cfg(test)]
mod testing;

pub use error::{DbError, Result};
pub use like::{LikeRepository, LikeStore};
pub use migrations::run_migrations;
pub use oauth_token::{OAuthTokenRepository, OAuthTokenStore};
pub use pool::{connect_with_retry, create_pool};
pub use post::{PostRepository, PostStore};
pub use post_query::{PostFilter, SearchScope};
pub use reply::{ReplyRepository, ReplyStore};
pub use sqlx::SqlitePool;
pub use types::{NewPost, OAuthToken, Post, PostValidationError, Reply, SongType, MAX_TAGS};
pub use user::{UserRepository, UserStore};
