// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Post, reply and token records stored by this crate.

use chrono::{DateTime, SecondsFormat, Utc};
use otogram_common_secret::SecretString;
use otogram_server_auth::{PostId, Provider, ReplyId, UserId, UserProfile};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::DbError;

/// Maximum number of tags on a post.
pub const MAX_TAGS: usize = 10;

// =============================================================================
// Timestamps
// =============================================================================

/// Timestamps are stored with fixed precision so that text order in SQLite
/// matches chronological order.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
	at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(raw)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("Invalid timestamp {raw:?}: {e}")))
}

pub(crate) fn parse_provider(raw: &str) -> Result<Provider, DbError> {
	raw
		.parse()
		.map_err(|e| DbError::Internal(format!("Invalid provider: {e}")))
}

// =============================================================================
// Songs
// =============================================================================

/// Where a post's `song_id` points. `Other` posts carry a full URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SongType {
	Spotify,
	Youtube,
	Applemusic,
	Other,
}

impl SongType {
	pub fn as_str(&self) -> &'static str {
		match self {
			SongType::Spotify => "spotify",
			SongType::Youtube => "youtube",
			SongType::Applemusic => "applemusic",
			SongType::Other => "other",
		}
	}
}

impl fmt::Display for SongType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SongType {
	type Err = DbError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"spotify" => Ok(SongType::Spotify),
			"youtube" => Ok(SongType::Youtube),
			"applemusic" => Ok(SongType::Applemusic),
			"other" => Ok(SongType::Other),
			other => Err(DbError::Internal(format!("Unknown song type: {other}"))),
		}
	}
}

// =============================================================================
// Posts
// =============================================================================

/// A post as returned to clients. `like_count`, `reply_count` and
/// `liked_by_current_user` are computed per read for the requesting viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Post {
	pub id: PostId,
	pub user_id: UserId,
	pub title: String,
	pub song_id: String,
	pub song_type: SongType,
	pub comment: String,
	pub tags: Vec<String>,
	pub created_at: DateTime<Utc>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user: Option<UserProfile>,
	pub like_count: i64,
	pub reply_count: i64,
	pub liked_by_current_user: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PostValidationError {
	#[error("Too many tags (max {MAX_TAGS})")]
	TooManyTags,
}

/// Fields supplied when creating a post. The owner always comes from the
/// session, never from the request body.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
	pub user_id: UserId,
	pub title: String,
	pub song_id: String,
	pub song_type: SongType,
	pub comment: String,
	pub tags: Vec<String>,
}

impl NewPost {
	pub fn validate(&self) -> Result<(), PostValidationError> {
		if self.tags.len() > MAX_TAGS {
			return Err(PostValidationError::TooManyTags);
		}
		Ok(())
	}
}

// =============================================================================
// Replies
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Reply {
	pub id: ReplyId,
	pub user_id: UserId,
	pub post_id: PostId,
	pub content: String,
	pub created_at: DateTime<Utc>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user: Option<UserProfile>,
}

// =============================================================================
// OAuth tokens
// =============================================================================

/// Provider credentials kept so the server can act for the user later.
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthToken {
	pub user_id: UserId,
	pub provider: Provider,
	pub access_token: SecretString,
	pub refresh_token: Option<SecretString>,
	pub expires_at: DateTime<Utc>,
}

impl OAuthToken {
	pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
		self.expires_at <= now
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	fn new_post(tags: usize) -> NewPost {
		NewPost {
			user_id: UserId::new(1),
			title: "Blue in Green".to_string(),
			song_id: "4sPmO7WMQUAf45kwMOtONw".to_string(),
			song_type: SongType::Spotify,
			comment: String::new(),
			tags: (0..tags).map(|i| format!("tag{i}")).collect(),
		}
	}

	#[test]
	fn ten_tags_allowed_eleven_rejected() {
		assert!(new_post(0).validate().is_ok());
		assert!(new_post(MAX_TAGS).validate().is_ok());
		assert_eq!(
			new_post(MAX_TAGS + 1).validate(),
			Err(PostValidationError::TooManyTags)
		);
		assert_eq!(
			PostValidationError::TooManyTags.to_string(),
			"Too many tags (max 10)"
		);
	}

	#[test]
	fn song_type_round_trips_through_text() {
		for ty in [
			SongType::Spotify,
			SongType::Youtube,
			SongType::Applemusic,
			SongType::Other,
		] {
			assert_eq!(ty.as_str().parse::<SongType>().unwrap(), ty);
			assert_eq!(
				serde_json::to_value(ty).unwrap(),
				serde_json::Value::String(ty.as_str().to_string())
			);
		}
		assert!("soundcloud".parse::<SongType>().is_err());
		assert!(serde_json::from_str::<SongType>("\"soundcloud\"").is_err());
	}

	#[test]
	fn timestamps_sort_lexically() {
		let a = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
		let b = a + chrono::Duration::microseconds(1);
		let c = Utc.with_ymd_and_hms(2024, 11, 2, 3, 4, 5).unwrap();
		assert!(format_timestamp(a) < format_timestamp(b));
		assert!(format_timestamp(b) < format_timestamp(c));
		assert_eq!(parse_timestamp(&format_timestamp(b)).unwrap(), b);
	}

	#[test]
	fn post_without_author_omits_user_field() {
		let post = Post {
			id: PostId::new(3),
			user_id: UserId::new(1),
			title: "t".to_string(),
			song_id: "s".to_string(),
			song_type: SongType::Youtube,
			comment: String::new(),
			tags: vec![],
			created_at: Utc::now(),
			user: None,
			like_count: 0,
			reply_count: 0,
			liked_by_current_user: false,
		};
		let value = serde_json::to_value(&post).unwrap();
		assert!(value.get("user").is_none());
		assert_eq!(value["song_type"], "youtube");
		assert_eq!(value["liked_by_current_user"], false);
	}

	#[test]
	fn token_expiry() {
		let now = Utc::now();
		let token = OAuthToken {
			user_id: UserId::new(1),
			provider: Provider::Twitter,
			access_token: SecretString::from("a"),
			refresh_token: None,
			expires_at: now,
		};
		assert!(token.is_expired_at(now));
		assert!(!token.is_expired_at(now - chrono::Duration::seconds(1)));
	}
}
